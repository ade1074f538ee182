//! Kit entity type - A bill of materials assembled and shipped as one unit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::component::{Component, SourcingType};
use crate::pricing::{BomLineItem, DEFAULT_BUFFER_PERCENT};

/// How kits reach the end recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionModel {
    /// Shipped in bulk to the customer
    Bulk,
    /// Shipped direct to consumers
    Dtc,
}

impl Default for DistributionModel {
    fn default() -> Self {
        DistributionModel::Bulk
    }
}

impl std::fmt::Display for DistributionModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DistributionModel::Bulk => write!(f, "bulk"),
            DistributionModel::Dtc => write!(f, "dtc"),
        }
    }
}

impl std::str::FromStr for DistributionModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bulk" => Ok(DistributionModel::Bulk),
            "dtc" => Ok(DistributionModel::Dtc),
            _ => Err(format!("Invalid distribution model: {}. Use 'bulk' or 'dtc'", s)),
        }
    }
}

/// How fulfillment orders are triggered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentModel {
    /// One bulk shipment to the customer
    B2bBulk,
    /// Per-order shipments driven by the customer's API
    B2cApi,
}

impl Default for FulfillmentModel {
    fn default() -> Self {
        FulfillmentModel::B2bBulk
    }
}

impl FulfillmentModel {
    /// Human readable label used in SOW documents
    pub fn label(&self) -> &'static str {
        match self {
            FulfillmentModel::B2bBulk => "B2B Bulk Shipment",
            FulfillmentModel::B2cApi => "B2C API-Driven",
        }
    }
}

impl std::fmt::Display for FulfillmentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentModel::B2bBulk => write!(f, "b2b_bulk"),
            FulfillmentModel::B2cApi => write!(f, "b2c_api"),
        }
    }
}

impl std::str::FromStr for FulfillmentModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "b2b_bulk" => Ok(FulfillmentModel::B2bBulk),
            "b2c_api" => Ok(FulfillmentModel::B2cApi),
            _ => Err(format!(
                "Invalid fulfillment model: {}. Use 'b2b_bulk' or 'b2c_api'",
                s
            )),
        }
    }
}

fn default_buffer_percent() -> f64 {
    DEFAULT_BUFFER_PERCENT
}

fn default_true() -> bool {
    true
}

/// One component's role within a kit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomEntry {
    /// Line identifier, unique within the kit
    pub id: String,

    /// The component this line uses
    pub component_id: EntityId,

    /// Units required per assembled kit
    pub units_per_kit: f64,

    /// Scrap/QA overage in percent
    #[serde(default = "default_buffer_percent")]
    pub buffer_percent: f64,

    /// Effective sourcing for this line
    pub sourcing: SourcingType,

    /// Replaces the component unit cost when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost_override: Option<f64>,

    /// Handling surcharge per ordered unit
    #[serde(default)]
    pub handling_surcharge: f64,

    /// Line needs receiving on arrival
    #[serde(default)]
    pub requires_receiving: bool,

    /// Line needs incoming QA inspection
    #[serde(default)]
    pub requires_qa: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl BomEntry {
    /// New line for a component, inheriting its default sourcing
    pub fn new(component: &Component, units_per_kit: f64) -> Self {
        let customer = component.sourcing == SourcingType::CustomerProvided;
        Self {
            id: Ulid::new().to_string(),
            component_id: component.id.clone(),
            units_per_kit,
            buffer_percent: DEFAULT_BUFFER_PERCENT,
            sourcing: component.sourcing,
            unit_cost_override: None,
            handling_surcharge: 0.0,
            requires_receiving: customer,
            requires_qa: customer,
            notes: None,
        }
    }

    /// Build the pricing input for this line from an optionally resolved component
    pub fn line_item(&self, component: Option<Component>) -> BomLineItem {
        BomLineItem {
            component,
            units_per_kit: self.units_per_kit,
            buffer_percent: self.buffer_percent,
            sourcing: self.sourcing,
            unit_cost_override: self.unit_cost_override,
            handling_surcharge: self.handling_surcharge,
            requires_receiving: self.requires_receiving,
            requires_qa: self.requires_qa,
        }
    }
}

/// A kit: a named bill of materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kit {
    /// Unique identifier
    pub id: EntityId,

    /// Kit name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub distribution: DistributionModel,

    #[serde(default)]
    pub fulfillment: FulfillmentModel,

    /// Inactive kits are hidden from default listings
    #[serde(default = "default_true")]
    pub active: bool,

    /// Bill of materials
    #[serde(default)]
    pub bom: Vec<BomEntry>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,
}

impl Entity for Kit {
    const PREFIX: EntityPrefix = EntityPrefix::Kit;
    const LABEL: &'static str = "kit";

    fn id(&self) -> &EntityId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }

    fn author(&self) -> &str {
        &self.author
    }
}

impl Kit {
    /// Create a new, empty, active kit
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Kit),
            name: name.into(),
            description: None,
            distribution: DistributionModel::default(),
            fulfillment: FulfillmentModel::default(),
            active: true,
            bom: Vec::new(),
            created: Utc::now(),
            author: author.into(),
        }
    }

    /// Find a BOM line by line id prefix or by component id
    pub fn find_line(&self, reference: &str) -> Option<usize> {
        let needle = reference.to_uppercase();
        if needle.is_empty() {
            return None;
        }
        self.bom.iter().position(|line| {
            line.id.to_uppercase().starts_with(&needle) || line.component_id.to_string() == needle
        })
    }

    /// Remove a BOM line, returning it if present
    pub fn remove_line(&mut self, reference: &str) -> Option<BomEntry> {
        self.find_line(reference).map(|idx| self.bom.remove(idx))
    }

    /// Check whether any line uses the given component
    pub fn uses_component(&self, component_id: &EntityId) -> bool {
        self.bom.iter().any(|line| &line.component_id == component_id)
    }
}
