//! Entity type definitions
//!
//! KITQ manages three entity types, each stored as one YAML file:
//!
//! - [`Component`] - Catalog parts with cost, MOQ, lead time and default sourcing
//! - [`Kit`] - A bill of materials built from catalog components
//! - [`Quote`] - A customer project pricing runs of one or more kits

pub mod component;
pub mod kit;
pub mod quote;

pub use component::{Component, SourcingType};
pub use kit::{BomEntry, DistributionModel, FulfillmentModel, Kit};
pub use quote::{Quote, QuoteKit, QuoteStatus};
