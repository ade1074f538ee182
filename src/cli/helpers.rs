//! Shared helper functions for CLI commands
//!
//! This module contains utility functions that are used across multiple
//! command modules to avoid code duplication.

use miette::Result;

use crate::cli::GlobalOpts;
use crate::core::identity::EntityId;
use crate::core::project::Project;
use crate::core::store::FsStore;

/// Discover the project (honoring `--project`) and open its store
pub fn open_store(global: &GlobalOpts) -> Result<FsStore> {
    let project = Project::open(global.project.as_deref()).map_err(|e| miette::miette!("{}", e))?;
    Ok(FsStore::open(project))
}

/// Format an EntityId for display, truncating if too long
///
/// IDs longer than 16 characters are truncated to 13 chars with "..." suffix.
/// This provides a consistent display format across all list/table outputs.
pub fn format_short_id(id: &EntityId) -> String {
    let s = id.to_string();
    if s.len() > 16 {
        format!("{}...", &s[..13])
    } else {
        s
    }
}

/// Truncate a string to max_len characters, adding "..." if truncated
///
/// Useful for table columns that need fixed-width output.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Escape a string for CSV output
///
/// Handles commas, quotes, and newlines according to RFC 4180.
pub fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// clap value parser for money amounts and percentages (finite, >= 0)
pub fn parse_non_negative(s: &str) -> std::result::Result<f64, String> {
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Ok(_) => Err(format!("{} must be a non-negative number", s)),
        Err(_) => Err(format!("'{}' is not a number", s)),
    }
}

/// clap value parser for MOQs (integer, > 0)
pub fn parse_positive_count(s: &str) -> std::result::Result<u64, String> {
    match s.parse::<u64>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(v) => Ok(v),
        Err(_) => Err(format!("'{}' is not a positive whole number", s)),
    }
}

/// clap value parser for calendar dates (YYYY-MM-DD)
pub fn parse_date(s: &str) -> std::result::Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("'{}' is not a date (expected YYYY-MM-DD)", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::EntityPrefix;

    #[test]
    fn test_format_short_id() {
        let id = EntityId::new(EntityPrefix::Kit);
        let formatted = format_short_id(&id);
        // KIT- plus a 26 char ULID, so should truncate
        assert!(formatted.len() <= 16);
        assert!(formatted.ends_with("..."));
    }

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("hello", 10), "hello");
        assert_eq!(truncate_str("hello world", 8), "hello...");
        assert_eq!(truncate_str("hi", 2), "hi");
        assert_eq!(truncate_str("⚠️ AT-RISK COMPONENT", 8), "⚠️ AT...");
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("simple"), "simple");
        assert_eq!(escape_csv("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv("with\nnewline"), "\"with\nnewline\"");
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_non_negative("2.5"), Ok(2.5));
        assert!(parse_non_negative("-1").is_err());
        assert!(parse_non_negative("abc").is_err());
        assert_eq!(parse_positive_count("500"), Ok(500));
        assert!(parse_positive_count("0").is_err());
        assert!(parse_positive_count("1.5").is_err());
        assert!(parse_date("2026-03-15").is_ok());
        assert!(parse_date("03/15/2026").is_err());
    }
}
