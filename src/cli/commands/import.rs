//! `kitq import` command - Import catalog components from CSV

use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::helpers::{open_store, truncate_str};
use crate::cli::GlobalOpts;
use crate::core::{CatalogStore, Config};
use crate::entities::component::{Component, SourcingType};

/// CSV columns understood by the importer, in template order
pub const CSV_HEADERS: [&str; 10] = [
    "name",
    "sku",
    "category",
    "sourcing",
    "unit_cost",
    "moq",
    "lead_time_days",
    "at_risk",
    "vendor",
    "notes",
];

const CSV_EXAMPLE: [&str; 10] = [
    "Gel Ice Pack",
    "ICE-GEL-4OZ",
    "Cold Chain",
    "dot_sourced",
    "0.75",
    "1000",
    "21",
    "false",
    "Polar Supply Co",
    "",
];

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file to import
    pub file: Option<PathBuf>,

    /// Print a CSV template with the expected headers
    #[arg(long)]
    pub template: bool,

    /// Validate CSV without creating files
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,
}

/// Import statistics
#[derive(Debug, Default)]
struct ImportStats {
    rows_processed: usize,
    entities_created: usize,
    errors: usize,
}

pub fn run(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if args.template {
        return generate_template();
    }

    let file_path = args
        .file
        .clone()
        .ok_or_else(|| miette::miette!("CSV file required. Usage: kitq import components.csv"))?;

    if !file_path.exists() {
        return Err(miette::miette!("File not found: {}", file_path.display()));
    }

    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let author = config.author();

    println!(
        "{} Importing components from {}{}",
        style("→").blue(),
        style(file_path.display()).yellow(),
        if args.dry_run { style(" (dry run)").dim().to_string() } else { String::new() }
    );
    println!();

    let file = File::open(&file_path).into_diagnostic()?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("name") || !header_map.contains_key("unit_cost") {
        return Err(miette::miette!(
            "CSV must have at least 'name' and 'unit_cost' columns (see `kitq import --template`)"
        ));
    }

    let mut stats = ImportStats::default();

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let parsed = result
            .map_err(|e| format!("CSV parse error: {}", e))
            .and_then(|record| parse_component(&record, &header_map, &author));

        let component = match parsed {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                stats.errors += 1;
                if !args.skip_errors {
                    return Err(miette::miette!("Import failed at row {}: {}", row_num, e));
                }
                continue;
            }
        };

        if args.dry_run {
            println!(
                "{} Row {}: Would create {} ({}, ${:.2})",
                style("○").dim(),
                row_num,
                truncate_str(&component.name, 30),
                component.sourcing.label(),
                component.unit_cost
            );
        } else {
            store
                .save_component(&component)
                .map_err(|e| miette::miette!("{}", e))?;
            println!(
                "{} Row {}: Created {} - {}",
                style("✓").green(),
                row_num,
                style(store.short_id_of(&component)).cyan(),
                truncate_str(&component.name, 30)
            );
        }
        stats.entities_created += 1;
    }

    println!();
    println!("{}", style("─".repeat(50)).dim());
    println!("{}", style("Import Summary").bold());
    println!("{}", style("─".repeat(50)).dim());
    println!("  Rows processed:   {}", style(stats.rows_processed).cyan());
    println!("  Entities created: {}", style(stats.entities_created).green());
    if stats.errors > 0 {
        println!("  Errors:           {}", style(stats.errors).red());
    }

    if args.dry_run {
        println!();
        println!("{}", style("Dry run complete. No files were created.").yellow());
    }

    tracing::info!(
        rows = stats.rows_processed,
        created = stats.entities_created,
        errors = stats.errors,
        "component import finished"
    );

    Ok(())
}

fn generate_template() -> Result<()> {
    println!("{}", CSV_HEADERS.join(","));
    println!("{}", CSV_EXAMPLE.join(","));

    eprintln!();
    eprintln!(
        "{} Template generated. Redirect to file: kitq import --template > components.csv",
        style("→").blue()
    );

    Ok(())
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Build a component from one CSV row, validating every typed column
fn parse_component(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    author: &str,
) -> std::result::Result<Component, String> {
    let field = |name: &str| get_field(record, header_map, name);

    let name = field("name").ok_or("missing required field 'name'")?;

    let unit_cost = match field("unit_cost") {
        Some(raw) => match raw.trim_start_matches('$').parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => v,
            _ => return Err(format!("invalid unit_cost '{}': expected a non-negative number", raw)),
        },
        None => return Err("missing required field 'unit_cost'".to_string()),
    };

    let sourcing = match field("sourcing") {
        Some(raw) => raw.parse::<SourcingType>()?,
        None => SourcingType::default(),
    };

    let moq = match field("moq") {
        Some(raw) => match raw.parse::<u64>() {
            Ok(m) if m > 0 => Some(m),
            _ => return Err(format!("invalid moq '{}': expected a positive whole number", raw)),
        },
        None => None,
    };

    let lead_time_days = match field("lead_time_days") {
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| format!("invalid lead_time_days '{}': expected whole days", raw))?,
        ),
        None => None,
    };

    let at_risk = match field("at_risk").map(|s| s.to_lowercase()) {
        None => false,
        Some(v) => match v.as_str() {
            "true" | "yes" | "y" | "1" => true,
            "false" | "no" | "n" | "0" => false,
            _ => return Err(format!("invalid at_risk '{}': expected true or false", v)),
        },
    };

    let mut component = Component::new(name, sourcing, unit_cost, author);
    component.sku = field("sku");
    component.category = field("category");
    component.moq = moq;
    component.lead_time_days = lead_time_days;
    component.at_risk = at_risk;
    component.vendor = field("vendor");
    component.notes = field("notes");
    Ok(component)
}
