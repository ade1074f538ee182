//! SOW clauses that depend on a BOM's sourcing mix

use crate::entities::component::SourcingType;
use crate::pricing::cost::BomLineItem;

const UNKNOWN_COMPONENT: &str = "Unknown component";

/// Clause listing customer-furnished components, if the BOM has any
pub fn generate_customer_furnished_clause(items: &[BomLineItem]) -> Option<String> {
    let names: Vec<&str> = items
        .iter()
        .filter(|item| item.sourcing == SourcingType::CustomerProvided)
        .map(|item| {
            item.component_name()
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_COMPONENT)
        })
        .collect();

    if names.is_empty() {
        return None;
    }

    Some(format!(
        "**Customer-Furnished Components**\n\n\
The following components will be supplied by the customer and are excluded from sourcing costs: {}.\n\n\
Dot will receive, inspect, and kit these components as part of the assembly process. \
Production timelines are dependent on timely delivery of customer-furnished materials.\n\n\
**Requirements:**\n\
- Delivery date must be confirmed\n\
- Packaging format must be specified\n\
- Components must meet quality specifications\n\n\
**Note:** Delays in customer-furnished materials may impact delivery schedule.",
        names.join(", ")
    ))
}

/// Clause describing Dot sourcing, if the BOM has any Dot-supplied line
pub fn generate_dot_sourcing_clause(items: &[BomLineItem]) -> Option<String> {
    if !items.iter().any(|item| item.sourcing.is_dot()) {
        return None;
    }

    Some(
        "**Component Sourcing**\n\n\
Dot will source and/or manufacture all components listed in the BOM. \
Order quantities may exceed initial build quantities to account for print efficiency, \
spoilage, and future program needs."
            .to_string(),
    )
}
