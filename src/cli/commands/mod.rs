//! CLI command implementations

pub mod cmp;
pub mod completions;
pub mod config;
pub mod import;
pub mod init;
pub mod kit;
pub mod price;
pub mod quote;
pub mod sow;
