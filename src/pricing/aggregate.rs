//! Quote-level aggregation of line costs

use serde::{Deserialize, Serialize};

use crate::pricing::cost::{calculate_component_cost, BomLineItem};

/// Default assembly & fulfillment cost per kit
pub const DEFAULT_ASSEMBLY_COST_PER_KIT: f64 = 15.0;

/// Pricing for one kit-quantity request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    /// Sourcing cost of Dot-supplied components, before handling
    pub component_cost: f64,
    /// Handling surcharges across all lines
    pub handling_cost: f64,
    /// `component_cost + handling_cost`
    pub total_manufacture_cost: f64,
    /// `total_kits * assembly_cost_per_kit`
    pub assembly_cost: f64,
    /// Manufacture plus assembly
    pub total_cost: f64,
    /// Units ordered across all lines
    pub order_quantity: u64,
    /// Advisories in line order
    pub warnings: Vec<String>,
}

/// Price a whole BOM for a run of `total_kits`
///
/// Never fails: unresolved lines contribute zero cost plus a warning, and an
/// empty BOM yields only the assembly cost.
pub fn calculate_project_pricing(
    items: &[BomLineItem],
    total_kits: u64,
    assembly_cost_per_kit: f64,
) -> PricingResult {
    let mut result = PricingResult::default();

    for item in items {
        let line = calculate_component_cost(item, total_kits);
        result.component_cost += line.cost;
        result.handling_cost += line.handling_cost;
        result.order_quantity += line.order_quantity;
        result.warnings.extend(line.warnings);
    }

    result.total_manufacture_cost = result.component_cost + result.handling_cost;
    result.assembly_cost = total_kits as f64 * assembly_cost_per_kit;
    result.total_cost = result.component_cost + result.handling_cost + result.assembly_cost;

    tracing::debug!(
        lines = items.len(),
        total_kits,
        component_cost = result.component_cost,
        handling_cost = result.handling_cost,
        total_cost = result.total_cost,
        "priced BOM"
    );

    result
}
