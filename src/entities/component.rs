//! Component entity type - Catalog parts that kits are built from

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};

/// Who procures a component for a production run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourcingType {
    /// Purchased by Dot from an outside vendor
    DotSourced,
    /// Produced in-house by Dot
    DotManufactured,
    /// Supplied by the customer; excluded from sourcing cost
    CustomerProvided,
}

impl Default for SourcingType {
    fn default() -> Self {
        SourcingType::DotSourced
    }
}

impl SourcingType {
    /// All recognized sourcing types
    pub fn all() -> &'static [SourcingType] {
        &[
            SourcingType::DotSourced,
            SourcingType::DotManufactured,
            SourcingType::CustomerProvided,
        ]
    }

    /// The wire/storage form (`dot_sourced`, ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            SourcingType::DotSourced => "dot_sourced",
            SourcingType::DotManufactured => "dot_manufactured",
            SourcingType::CustomerProvided => "customer_provided",
        }
    }

    /// Short label used in BOM tables and the SOW document
    pub fn label(&self) -> &'static str {
        match self {
            SourcingType::DotSourced => "Dot Sourced",
            SourcingType::DotManufactured => "Dot Mfg",
            SourcingType::CustomerProvided => "Customer",
        }
    }

    /// True when Dot buys or makes the part (and therefore pays for it)
    pub fn is_dot(&self) -> bool {
        !matches!(self, SourcingType::CustomerProvided)
    }
}

impl std::fmt::Display for SourcingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SourcingType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "dot_sourced" => Ok(SourcingType::DotSourced),
            "dot_manufactured" => Ok(SourcingType::DotManufactured),
            "customer_provided" => Ok(SourcingType::CustomerProvided),
            _ => Err(format!(
                "Invalid sourcing type: {}. Use dot_sourced, dot_manufactured, or customer_provided",
                s
            )),
        }
    }
}

/// A sourceable part in the component catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Unique identifier
    pub id: EntityId,

    /// Display name
    pub name: String,

    /// Stock keeping unit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,

    /// Free-text category (e.g. "Tubes", "Labels")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Default sourcing for new BOM lines using this component
    #[serde(default)]
    pub sourcing: SourcingType,

    /// Unit cost in the quoting currency
    #[serde(default)]
    pub unit_cost: f64,

    /// Vendor minimum order quantity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moq: Option<u64>,

    /// Vendor lead time in days
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_time_days: Option<u32>,

    /// Supply is at risk (single source, allocation, etc.)
    #[serde(default)]
    pub at_risk: bool,

    /// Vendor name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,

    /// Notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Creation timestamp
    pub created: DateTime<Utc>,

    /// Author
    pub author: String,
}

impl Entity for Component {
    const PREFIX: EntityPrefix = EntityPrefix::Cmp;
    const LABEL: &'static str = "component";

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

impl Component {
    /// Create a new component with the given parameters
    pub fn new(
        name: impl Into<String>,
        sourcing: SourcingType,
        unit_cost: f64,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: EntityId::new(EntityPrefix::Cmp),
            name: name.into(),
            sku: None,
            category: None,
            sourcing,
            unit_cost,
            moq: None,
            lead_time_days: None,
            at_risk: false,
            vendor: None,
            notes: None,
            created: Utc::now(),
            author: author.into(),
        }
    }

    /// Set the vendor minimum order quantity
    pub fn with_moq(mut self, moq: u64) -> Self {
        self.moq = Some(moq);
        self
    }

    /// Set the vendor lead time
    pub fn with_lead_time(mut self, days: u32) -> Self {
        self.lead_time_days = Some(days);
        self
    }

    /// Flag the component as at risk
    pub fn at_risk(mut self) -> Self {
        self.at_risk = true;
        self
    }

    /// MOQ that actually constrains ordering (a zero MOQ means none)
    pub fn effective_moq(&self) -> Option<u64> {
        self.moq.filter(|&m| m > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sourcing_type_roundtrip_strings() {
        for sourcing in SourcingType::all() {
            let parsed: SourcingType = sourcing.as_str().parse().unwrap();
            assert_eq!(parsed, *sourcing);
        }
        assert_eq!(
            "Customer-Provided".parse::<SourcingType>().unwrap(),
            SourcingType::CustomerProvided
        );
    }

    #[test]
    fn test_sourcing_type_rejects_unknown() {
        let err = "drop_shipped".parse::<SourcingType>().unwrap_err();
        assert!(err.contains("drop_shipped"));

        let yaml = "drop_shipped";
        assert!(serde_yml::from_str::<SourcingType>(yaml).is_err());
    }

    #[test]
    fn test_sourcing_labels() {
        assert_eq!(SourcingType::CustomerProvided.label(), "Customer");
        assert_eq!(SourcingType::DotManufactured.label(), "Dot Mfg");
        assert!(SourcingType::DotSourced.is_dot());
        assert!(!SourcingType::CustomerProvided.is_dot());
    }

    #[test]
    fn test_component_yaml_roundtrip() {
        let cmp = Component::new("Gel Ice Pack", SourcingType::DotSourced, 1.2, "test")
            .with_moq(1000)
            .with_lead_time(14)
            .at_risk();

        let yaml = serde_yml::to_string(&cmp).unwrap();
        assert!(yaml.contains("sourcing: dot_sourced"));

        let parsed: Component = serde_yml::from_str(&yaml).unwrap();
        assert_eq!(parsed.id, cmp.id);
        assert_eq!(parsed.moq, Some(1000));
        assert!(parsed.at_risk);
    }

    #[test]
    fn test_zero_moq_is_not_a_constraint() {
        let cmp = Component::new("Label", SourcingType::DotManufactured, 0.15, "test").with_moq(0);
        assert_eq!(cmp.effective_moq(), None);
    }
}
