//! `kitq price` command - Ad-hoc pricing of a kit run

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{open_store, parse_non_negative, truncate_str};
use crate::cli::output::{markdown_table, print_json, print_warnings, print_yaml, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CatalogStore, Config};
use crate::entities::SourcingType;
use crate::pricing::{calculate_component_cost, calculate_project_pricing, LineCost, PricingResult};
use crate::sow::{format_count, format_currency, format_units};

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    /// Kit ID or short ID (KIT@N)
    pub kit: String,

    /// Number of kits to produce
    #[arg(long, short = 'k')]
    pub kits: u64,

    /// Assembly & fulfillment cost per kit (default from config, 15.00)
    #[arg(long, value_parser = parse_non_negative)]
    pub assembly_cost: Option<f64>,
}

/// Per-line detail in machine-readable output
#[derive(Debug, Serialize)]
struct PricedLine {
    component: String,
    component_id: String,
    sourcing: SourcingType,
    units_per_kit: f64,
    #[serde(flatten)]
    cost: LineCost,
}

/// Machine-readable pricing report
#[derive(Debug, Serialize)]
struct PriceReport {
    kit_id: String,
    kit_name: String,
    total_kits: u64,
    assembly_cost_per_kit: f64,
    lines: Vec<PricedLine>,
    #[serde(flatten)]
    pricing: PricingResult,
}

pub fn run(args: PriceArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let kit = store.kit(&args.kit).map_err(|e| miette::miette!("{}", e))?;

    let rate = args
        .assembly_cost
        .unwrap_or_else(|| config.assembly_cost_per_kit());
    let items = store.resolve_bom(&kit).map_err(|e| miette::miette!("{}", e))?;
    let pricing = calculate_project_pricing(&items, args.kits, rate);

    let lines: Vec<PricedLine> = kit
        .bom
        .iter()
        .zip(&items)
        .map(|(entry, item)| PricedLine {
            component: item
                .component_name()
                .unwrap_or("Unknown component")
                .to_string(),
            component_id: entry.component_id.to_string(),
            sourcing: item.sourcing,
            units_per_kit: item.units_per_kit,
            cost: calculate_component_cost(item, args.kits),
        })
        .collect();

    let report = PriceReport {
        kit_id: kit.id.to_string(),
        kit_name: kit.name.clone(),
        total_kits: args.kits,
        assembly_cost_per_kit: rate,
        lines,
        pricing,
    };

    match resolve_format(global.format, &config, OutputFormat::Auto) {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Yaml => print_yaml(&report)?,
        OutputFormat::Md => print_markdown(&report),
        _ => print_human(&report),
    }

    Ok(())
}

fn line_rows(report: &PriceReport) -> Vec<Vec<String>> {
    report
        .lines
        .iter()
        .map(|line| {
            vec![
                line.component.clone(),
                line.sourcing.label().to_string(),
                format_units(line.units_per_kit),
                format_count(line.cost.order_quantity),
                format_currency(line.cost.cost),
                format_currency(line.cost.handling_cost),
            ]
        })
        .collect()
}

const LINE_HEADERS: [&str; 6] = [
    "Component",
    "Sourcing",
    "Units/Kit",
    "Order Qty",
    "Cost",
    "Handling",
];

fn print_markdown(report: &PriceReport) {
    println!("## {} × {}", report.kit_name, format_count(report.total_kits));
    println!();
    println!("{}", markdown_table(&LINE_HEADERS, &line_rows(report)));
    println!();
    let p = &report.pricing;
    let totals = vec![
        vec!["Component Cost".to_string(), format_currency(p.component_cost)],
        vec!["Handling".to_string(), format_currency(p.handling_cost)],
        vec!["Manufacturing".to_string(), format_currency(p.total_manufacture_cost)],
        vec!["Assembly".to_string(), format_currency(p.assembly_cost)],
        vec!["Total".to_string(), format_currency(p.total_cost)],
    ];
    println!("{}", markdown_table(&["", "Amount"], &totals));
    if !p.warnings.is_empty() {
        println!();
        for warning in &p.warnings {
            println!("- {}", warning);
        }
    }
}

fn print_human(report: &PriceReport) {
    let p = &report.pricing;

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} × {} kits",
        style("Kit").bold(),
        style(&report.kit_name).yellow(),
        format_count(report.total_kits)
    );
    println!(
        "{}: {} per kit",
        style("Assembly Rate").bold(),
        format_currency(report.assembly_cost_per_kit)
    );
    println!("{}", style("─".repeat(60)).dim());

    if report.lines.is_empty() {
        println!();
        println!("{}", style("Kit has no BOM lines.").dim());
    } else {
        println!();
        println!(
            "{:<30} {:<12} {:>10} {:>14} {:>12}",
            style("COMPONENT").bold(),
            style("SOURCING").bold(),
            style("ORDER QTY").bold(),
            style("COST").bold(),
            style("HANDLING").bold(),
        );
        println!("{}", "-".repeat(82));
        for line in &report.lines {
            println!(
                "{:<30} {:<12} {:>10} {:>14} {:>12}",
                truncate_str(&line.component, 28),
                line.sourcing.label(),
                format_count(line.cost.order_quantity),
                format_currency(line.cost.cost),
                format_currency(line.cost.handling_cost),
            );
        }
    }

    println!();
    println!("  {:<22} {:>14}", "Component cost", format_currency(p.component_cost));
    println!("  {:<22} {:>14}", "Handling", format_currency(p.handling_cost));
    println!("  {:<22} {:>14}", "Manufacturing", format_currency(p.total_manufacture_cost));
    println!("  {:<22} {:>14}", "Assembly", format_currency(p.assembly_cost));
    println!(
        "  {:<22} {:>14}",
        style("Total").bold(),
        style(format_currency(p.total_cost)).green().bold()
    );
    println!(
        "  {:<22} {:>14}",
        "Units ordered",
        format_count(p.order_quantity)
    );
    if report.total_kits > 0 {
        println!(
            "  {:<22} {:>14}",
            "Per kit",
            format_currency(p.total_cost / report.total_kits as f64)
        );
    }

    print_warnings(&p.warnings);
}
