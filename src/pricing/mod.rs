//! Pricing engine
//!
//! Pure calculations over caller-supplied values: order quantities, per-line
//! cost splits, quote-level aggregation, and the SOW clause text that depends
//! on a BOM's sourcing mix. Nothing in this module performs I/O or keeps state
//! between calls.

pub mod aggregate;
pub mod cost;
pub mod quantity;
pub mod sow;

pub use aggregate::{calculate_project_pricing, PricingResult, DEFAULT_ASSEMBLY_COST_PER_KIT};
pub use cost::{calculate_component_cost, BomLineItem, LineCost};
pub use quantity::{
    calculate_order_quantity, OrderQuantity, DEFAULT_BUFFER_PERCENT, PRINT_RUN_THRESHOLD,
};
pub use sow::{generate_customer_furnished_clause, generate_dot_sourcing_clause};
