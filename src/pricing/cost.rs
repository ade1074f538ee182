//! Per-line cost calculation

use serde::{Deserialize, Serialize};

use crate::entities::component::{Component, SourcingType};
use crate::pricing::quantity::{calculate_order_quantity, DEFAULT_BUFFER_PERCENT};

/// Lead times strictly above this many days are flagged
pub const LONG_LEAD_TIME_DAYS: u32 = 14;

fn default_buffer_percent() -> f64 {
    DEFAULT_BUFFER_PERCENT
}

/// One BOM line ready for pricing
///
/// `component` is the resolved catalog snapshot; `None` means the line's
/// component could not be found and the line prices to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BomLineItem {
    pub component: Option<Component>,
    pub units_per_kit: f64,
    #[serde(default = "default_buffer_percent")]
    pub buffer_percent: f64,
    pub sourcing: SourcingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_cost_override: Option<f64>,
    #[serde(default)]
    pub handling_surcharge: f64,
    #[serde(default)]
    pub requires_receiving: bool,
    #[serde(default)]
    pub requires_qa: bool,
}

impl BomLineItem {
    /// Line for a component using its default sourcing and the default buffer
    pub fn new(component: Component, units_per_kit: f64) -> Self {
        Self {
            sourcing: component.sourcing,
            component: Some(component),
            units_per_kit,
            buffer_percent: DEFAULT_BUFFER_PERCENT,
            unit_cost_override: None,
            handling_surcharge: 0.0,
            requires_receiving: false,
            requires_qa: false,
        }
    }

    /// Line whose component could not be resolved
    pub fn unresolved(units_per_kit: f64, sourcing: SourcingType) -> Self {
        Self {
            component: None,
            units_per_kit,
            buffer_percent: DEFAULT_BUFFER_PERCENT,
            sourcing,
            unit_cost_override: None,
            handling_surcharge: 0.0,
            requires_receiving: false,
            requires_qa: false,
        }
    }

    pub fn with_sourcing(mut self, sourcing: SourcingType) -> Self {
        self.sourcing = sourcing;
        self
    }

    pub fn with_buffer(mut self, buffer_percent: f64) -> Self {
        self.buffer_percent = buffer_percent;
        self
    }

    pub fn with_unit_cost(mut self, unit_cost: f64) -> Self {
        self.unit_cost_override = Some(unit_cost);
        self
    }

    pub fn with_handling(mut self, surcharge: f64) -> Self {
        self.handling_surcharge = surcharge;
        self
    }

    pub fn with_receiving_qa(mut self, receiving: bool, qa: bool) -> Self {
        self.requires_receiving = receiving;
        self.requires_qa = qa;
        self
    }

    /// Component name, if resolved
    pub fn component_name(&self) -> Option<&str> {
        self.component.as_ref().map(|c| c.name.as_str())
    }
}

/// Cost split for one BOM line over a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineCost {
    /// Sourcing cost, excluding handling
    pub cost: f64,
    pub handling_cost: f64,
    pub order_quantity: u64,
    pub warnings: Vec<String>,
}

/// Price one BOM line for a run of `total_kits`
///
/// Customer-provided lines never carry sourcing cost and ignore the vendor
/// MOQ; they still pay the handling surcharge on every ordered unit.
pub fn calculate_component_cost(item: &BomLineItem, total_kits: u64) -> LineCost {
    let Some(component) = item.component.as_ref() else {
        return LineCost {
            warnings: vec!["Component not found".to_string()],
            ..LineCost::default()
        };
    };

    match item.sourcing {
        SourcingType::CustomerProvided => {
            let order = calculate_order_quantity(
                item.units_per_kit,
                total_kits,
                item.buffer_percent,
                None,
            );

            let mut warnings = order.warnings;
            warnings.push("Customer-provided: Delivery date required".to_string());
            warnings.push("Production timeline dependent on customer delivery".to_string());
            if item.requires_receiving || item.requires_qa {
                warnings.push("Includes receiving/inspection/QA handling".to_string());
            }

            LineCost {
                cost: 0.0,
                handling_cost: order.quantity as f64 * item.handling_surcharge,
                order_quantity: order.quantity,
                warnings,
            }
        }
        SourcingType::DotSourced | SourcingType::DotManufactured => {
            let order = calculate_order_quantity(
                item.units_per_kit,
                total_kits,
                item.buffer_percent,
                component.moq,
            );
            let unit_price = item.unit_cost_override.unwrap_or(component.unit_cost);

            let mut warnings = order.warnings;
            if component.at_risk {
                warnings.push(format!("⚠️ AT-RISK COMPONENT: {}", component.name));
            }
            if let Some(days) = component.lead_time_days.filter(|&d| d > LONG_LEAD_TIME_DAYS) {
                warnings.push(format!("Lead time: {} days (may impact schedule)", days));
            }
            warnings.push(
                match item.sourcing {
                    SourcingType::DotManufactured => "Dot-manufactured: Internal production",
                    _ => "Dot-sourced: Standard lead time applies",
                }
                .to_string(),
            );

            LineCost {
                cost: order.quantity as f64 * unit_price,
                handling_cost: order.quantity as f64 * item.handling_surcharge,
                order_quantity: order.quantity,
                warnings,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component(sourcing: SourcingType, unit_cost: f64) -> Component {
        Component::new("Test Part", sourcing, unit_cost, "test")
    }

    #[test]
    fn test_missing_component_is_zero_with_warning() {
        let item = BomLineItem::unresolved(3.0, SourcingType::DotSourced).with_handling(1.0);
        let cost = calculate_component_cost(&item, 500);

        assert_eq!(cost.cost, 0.0);
        assert_eq!(cost.handling_cost, 0.0);
        assert_eq!(cost.order_quantity, 0);
        assert_eq!(cost.warnings, vec!["Component not found"]);
    }

    #[test]
    fn test_customer_provided_excludes_cost() {
        let reagent = component(SourcingType::CustomerProvided, 9.99).with_moq(50_000);
        let item = BomLineItem::new(reagent, 1.0).with_handling(0.75);

        let cost = calculate_component_cost(&item, 3000);
        assert_eq!(cost.cost, 0.0);
        assert_eq!(cost.order_quantity, 3100);
        assert_eq!(cost.handling_cost, 2325.0);
        assert_eq!(
            cost.warnings,
            vec![
                "Rounding to 3100 units for print efficiency (saves setup costs)",
                "Customer-provided: Delivery date required",
                "Production timeline dependent on customer delivery",
            ]
        );
    }

    #[test]
    fn test_customer_provided_receiving_note() {
        let item = BomLineItem::new(component(SourcingType::CustomerProvided, 0.0), 1.0)
            .with_receiving_qa(false, true);
        let cost = calculate_component_cost(&item, 10);
        assert_eq!(
            cost.warnings.last().map(String::as_str),
            Some("Includes receiving/inspection/QA handling")
        );
    }

    #[test]
    fn test_line_sourcing_overrides_component_default() {
        let part = component(SourcingType::DotSourced, 4.0);
        let item = BomLineItem::new(part, 1.0).with_sourcing(SourcingType::CustomerProvided);
        assert_eq!(calculate_component_cost(&item, 100).cost, 0.0);
    }

    #[test]
    fn test_dot_sourced_uses_moq_and_unit_cost() {
        let tube = component(SourcingType::DotSourced, 2.5).with_moq(1000);
        let item = BomLineItem::new(tube, 1.0);

        let cost = calculate_component_cost(&item, 100);
        assert_eq!(cost.order_quantity, 1000);
        assert_eq!(cost.cost, 2500.0);
        assert_eq!(
            cost.warnings,
            vec![
                "Order quantity (102) is below MOQ (1000). Recommended: 1000 units.",
                "Dot-sourced: Standard lead time applies",
            ]
        );
    }

    #[test]
    fn test_unit_cost_override_and_handling() {
        let label = component(SourcingType::DotManufactured, 0.15);
        let item = BomLineItem::new(label, 2.0)
            .with_buffer(0.0)
            .with_unit_cost(0.10)
            .with_handling(0.05);

        let cost = calculate_component_cost(&item, 100);
        assert_eq!(cost.order_quantity, 200);
        assert!((cost.cost - 20.0).abs() < 1e-9);
        assert!((cost.handling_cost - 10.0).abs() < 1e-9);
        assert_eq!(cost.warnings, vec!["Dot-manufactured: Internal production"]);
    }

    #[test]
    fn test_at_risk_without_long_lead() {
        let ice = component(SourcingType::DotSourced, 1.2).with_lead_time(14).at_risk();
        let cost = calculate_component_cost(&BomLineItem::new(ice, 1.0), 10);

        assert!(cost.warnings.iter().any(|w| w.contains("AT-RISK COMPONENT")));
        assert!(!cost.warnings.iter().any(|w| w.starts_with("Lead time")));
    }

    #[test]
    fn test_long_lead_time_warning_order() {
        let ice = Component {
            name: "Gel Ice Pack".to_string(),
            ..component(SourcingType::DotSourced, 1.2).with_lead_time(21).at_risk()
        };
        let cost = calculate_component_cost(&BomLineItem::new(ice, 1.0), 10);

        assert_eq!(
            cost.warnings,
            vec![
                "⚠️ AT-RISK COMPONENT: Gel Ice Pack",
                "Lead time: 21 days (may impact schedule)",
                "Dot-sourced: Standard lead time applies",
            ]
        );
    }
}
