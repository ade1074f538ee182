//! Quote entity type - A customer project pricing one or more kit runs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::entities::kit::{FulfillmentModel, Kit};
use crate::pricing::PricingResult;

/// Quote lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Quoted,
    Approved,
    InProduction,
    Completed,
}

impl Default for QuoteStatus {
    fn default() -> Self {
        QuoteStatus::Draft
    }
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteStatus::Draft => write!(f, "draft"),
            QuoteStatus::Quoted => write!(f, "quoted"),
            QuoteStatus::Approved => write!(f, "approved"),
            QuoteStatus::InProduction => write!(f, "in_production"),
            QuoteStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "quoted" => Ok(QuoteStatus::Quoted),
            "approved" => Ok(QuoteStatus::Approved),
            "in_production" => Ok(QuoteStatus::InProduction),
            "completed" => Ok(QuoteStatus::Completed),
            _ => Err(format!(
                "Invalid status: {}. Use draft, quoted, approved, in_production, or completed",
                s
            )),
        }
    }
}

/// A priced production run of one kit within a quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteKit {
    /// Line identifier, unique within the quote
    pub id: String,

    /// Kit being produced
    pub kit_id: EntityId,

    /// Kit name at the time of pricing
    pub kit_name: String,

    /// Number of kits to build
    pub quantity: u64,

    /// Assembly & fulfillment rate used for this run
    pub assembly_cost_per_kit: f64,

    /// Component cost plus handling
    #[serde(default)]
    pub manufacture_cost: f64,

    #[serde(default)]
    pub assembly_cost: f64,

    /// Manufacture plus assembly
    #[serde(default)]
    pub extended_total: f64,

    /// Advisory warnings from the last pricing run
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl QuoteKit {
    /// Snapshot a pricing result for a kit run
    pub fn from_pricing(
        kit: &Kit,
        quantity: u64,
        assembly_cost_per_kit: f64,
        pricing: &PricingResult,
    ) -> Self {
        let mut line = Self {
            id: Ulid::new().to_string(),
            kit_id: kit.id.clone(),
            kit_name: kit.name.clone(),
            quantity,
            assembly_cost_per_kit,
            manufacture_cost: 0.0,
            assembly_cost: 0.0,
            extended_total: 0.0,
            warnings: Vec::new(),
        };
        line.apply_pricing(kit, pricing);
        line
    }

    /// Refresh the cost snapshot from a new pricing result
    pub fn apply_pricing(&mut self, kit: &Kit, pricing: &PricingResult) {
        self.kit_name = kit.name.clone();
        self.manufacture_cost = pricing.total_manufacture_cost;
        self.assembly_cost = pricing.assembly_cost;
        self.extended_total = pricing.total_cost;
        self.warnings = pricing.warnings.clone();
    }

    /// Manufacturing cost per kit (zero for an empty run)
    pub fn unit_manufacture_cost(&self) -> f64 {
        if self.quantity == 0 {
            0.0
        } else {
            self.manufacture_cost / self.quantity as f64
        }
    }
}

/// A customer quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier
    pub id: EntityId,

    /// Quote/project name
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,

    #[serde(default)]
    pub status: QuoteStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_ship_date: Option<NaiveDate>,

    #[serde(default)]
    pub fulfillment: FulfillmentModel,

    /// Priced kit runs
    #[serde(default)]
    pub kits: Vec<QuoteKit>,

    #[serde(default)]
    pub total_manufacture_cost: f64,

    #[serde(default)]
    pub total_assembly_cost: f64,

    #[serde(default)]
    pub total_project_cost: f64,

    /// When a SOW document was last generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sow_generated_at: Option<DateTime<Utc>>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,
}

impl Entity for Quote {
    const PREFIX: EntityPrefix = EntityPrefix::Quot;
    const LABEL: &'static str = "quote";

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

impl Quote {
    /// Create a new draft quote
    pub fn new(name: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Quot),
            name: name.into(),
            customer: None,
            status: QuoteStatus::Draft,
            target_ship_date: None,
            fulfillment: FulfillmentModel::default(),
            kits: Vec::new(),
            total_manufacture_cost: 0.0,
            total_assembly_cost: 0.0,
            total_project_cost: 0.0,
            sow_generated_at: None,
            created: Utc::now(),
            author: author.into(),
        }
    }

    /// Recompute quote totals from the kit runs
    pub fn recalculate_totals(&mut self) {
        self.total_manufacture_cost = self.kits.iter().map(|k| k.manufacture_cost).sum();
        self.total_assembly_cost = self.kits.iter().map(|k| k.assembly_cost).sum();
        self.total_project_cost = self.total_manufacture_cost + self.total_assembly_cost;
    }

    /// Total kits across all runs
    pub fn total_kits(&self) -> u64 {
        self.kits.iter().map(|k| k.quantity).sum()
    }

    /// Add a kit run and refresh totals
    pub fn add_kit(&mut self, line: QuoteKit) {
        self.kits.push(line);
        self.recalculate_totals();
    }

    /// Remove a kit run by line id prefix or kit id, refreshing totals
    pub fn remove_kit(&mut self, reference: &str) -> Option<QuoteKit> {
        let needle = reference.to_uppercase();
        if needle.is_empty() {
            return None;
        }
        let idx = self.kits.iter().position(|line| {
            line.id.to_uppercase().starts_with(&needle) || line.kit_id.to_string() == needle
        })?;
        let removed = self.kits.remove(idx);
        self.recalculate_totals();
        Some(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(manufacture: f64, assembly: f64) -> PricingResult {
        PricingResult {
            component_cost: manufacture,
            handling_cost: 0.0,
            total_manufacture_cost: manufacture,
            assembly_cost: assembly,
            total_cost: manufacture + assembly,
            order_quantity: 0,
            warnings: vec!["Dot-sourced: Standard lead time applies".to_string()],
        }
    }

    #[test]
    fn test_totals_follow_kit_lines() {
        let kit_a = Kit::new("Bulk Fit Kit", "test");
        let kit_b = Kit::new("DTC Fit Kit", "test");
        let mut quote = Quote::new("Fitness Program", "test");

        quote.add_kit(QuoteKit::from_pricing(&kit_a, 100, 15.0, &priced(500.0, 1500.0)));
        quote.add_kit(QuoteKit::from_pricing(&kit_b, 50, 15.0, &priced(250.0, 750.0)));

        assert_eq!(quote.total_kits(), 150);
        assert_eq!(quote.total_manufacture_cost, 750.0);
        assert_eq!(quote.total_assembly_cost, 2250.0);
        assert_eq!(quote.total_project_cost, 3000.0);
    }

    #[test]
    fn test_remove_kit_updates_totals() {
        let kit = Kit::new("Bulk KED Kit", "test");
        let mut quote = Quote::new("KED Program", "test");
        quote.add_kit(QuoteKit::from_pricing(&kit, 10, 15.0, &priced(20.0, 150.0)));

        let removed = quote.remove_kit(&kit.id.to_string().to_lowercase());
        assert!(removed.is_some());
        assert_eq!(quote.total_project_cost, 0.0);
        assert!(quote.remove_kit("nothing").is_none());
    }

    #[test]
    fn test_unit_manufacture_cost_of_empty_run() {
        let kit = Kit::new("Empty", "test");
        let line = QuoteKit::from_pricing(&kit, 0, 15.0, &priced(0.0, 0.0));
        assert_eq!(line.unit_manufacture_cost(), 0.0);
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("in-production".parse::<QuoteStatus>().unwrap(), QuoteStatus::InProduction);
        assert_eq!(QuoteStatus::InProduction.to_string(), "in_production");
        assert!("shipped".parse::<QuoteStatus>().is_err());
    }
}
