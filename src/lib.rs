//! KITQ: Kit Quoting Toolkit
//!
//! A plain-text toolkit for quoting kit-based manufacturing runs: a component
//! catalog, kit bills of materials, and customer quotes stored as YAML files,
//! priced by a pure pricing engine.

pub mod cli;
pub mod core;
pub mod entities;
pub mod logging;
pub mod pricing;
pub mod sample;
pub mod sow;
