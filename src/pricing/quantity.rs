//! Order quantity calculation
//!
//! Turns a per-kit usage into a purchasable quantity: scrap/QA buffer, vendor
//! MOQ floor, then print-run rounding for large orders.

use serde::{Deserialize, Serialize};

/// Default scrap/QA buffer, in percent
pub const DEFAULT_BUFFER_PERCENT: f64 = 2.0;

/// Quantities strictly above this are rounded up to a whole hundred
pub const PRINT_RUN_THRESHOLD: u64 = 1000;

const PRINT_RUN_STEP: u64 = 100;

/// A computed order quantity with the advisories produced along the way
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQuantity {
    pub quantity: u64,
    pub warnings: Vec<String>,
}

/// Compute how many units to order for a run of `total_kits`
///
/// 1. `base = units_per_kit * total_kits`, plus `buffer_percent` of base,
///    rounded up.
/// 2. If below `moq`, raise to the MOQ (with a warning).
/// 3. If above [`PRINT_RUN_THRESHOLD`], round up to the next hundred (with a
///    warning when that changes the quantity).
///
/// An MOQ of zero imposes no floor.
pub fn calculate_order_quantity(
    units_per_kit: f64,
    total_kits: u64,
    buffer_percent: f64,
    moq: Option<u64>,
) -> OrderQuantity {
    let mut warnings = Vec::new();

    let base_quantity = units_per_kit * total_kits as f64;
    let buffer = base_quantity * (buffer_percent / 100.0);
    let mut quantity = (base_quantity + buffer).ceil() as u64;

    if let Some(moq) = moq.filter(|&m| m > 0) {
        if quantity < moq {
            warnings.push(format!(
                "Order quantity ({}) is below MOQ ({}). Recommended: {} units.",
                quantity, moq, moq
            ));
            quantity = moq;
        }
    }

    if quantity > PRINT_RUN_THRESHOLD {
        let optimized = quantity.div_ceil(PRINT_RUN_STEP) * PRINT_RUN_STEP;
        if optimized > quantity {
            warnings.push(format!(
                "Rounding to {} units for print efficiency (saves setup costs)",
                optimized
            ));
            quantity = optimized;
        }
    }

    OrderQuantity { quantity, warnings }
}
