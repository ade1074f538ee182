//! `kitq quote` command - Customer quote management
//!
//! A quote prices one or more kit runs for a customer. Every kit run is
//! priced through the pricing engine at the moment it is added or repriced,
//! and the result is snapshotted on the quote.

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::commands::kit::CliFulfillment;
use crate::cli::helpers::{
    escape_csv, format_short_id, open_store, parse_date, parse_non_negative, truncate_str,
};
use crate::cli::output::{markdown_table, print_json, print_yaml, print_warnings, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CatalogStore, Config, FsStore};
use crate::entities::kit::Kit;
use crate::entities::quote::{Quote, QuoteKit, QuoteStatus};
use crate::pricing::{calculate_project_pricing, PricingResult};
use crate::sow::{format_count, format_currency};

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// List quotes
    List(ListArgs),

    /// Create a new draft quote
    New(NewArgs),

    /// Show a quote with its kit runs and totals
    Show(ShowArgs),

    /// Price a kit run and add it to a quote
    AddKit(AddKitArgs),

    /// Remove a kit run from a quote
    RemoveKit(RemoveKitArgs),

    /// Re-price every kit run against the current catalog
    Reprice(ShowArgs),

    /// Change a quote's status
    Status(StatusArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliQuoteStatus {
    Draft,
    Quoted,
    Approved,
    InProduction,
    Completed,
}

impl From<CliQuoteStatus> for QuoteStatus {
    fn from(value: CliQuoteStatus) -> Self {
        match value {
            CliQuoteStatus::Draft => QuoteStatus::Draft,
            CliQuoteStatus::Quoted => QuoteStatus::Quoted,
            CliQuoteStatus::Approved => QuoteStatus::Approved,
            CliQuoteStatus::InProduction => QuoteStatus::InProduction,
            CliQuoteStatus::Completed => QuoteStatus::Completed,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's')]
    pub status: Option<CliQuoteStatus>,

    /// Search in quote name and customer
    #[arg(long)]
    pub search: Option<String>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Quote (project) name
    #[arg(long, short = 'N')]
    pub name: String,

    /// Customer name
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Target ship date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub ship_date: Option<NaiveDate>,

    /// Fulfillment model
    #[arg(long, default_value = "b2b-bulk")]
    pub fulfillment: CliFulfillment,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Quote ID or short ID (QUOT@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AddKitArgs {
    /// Quote ID or short ID (QUOT@N)
    pub quote: String,

    /// Kit ID or short ID (KIT@N)
    pub kit: String,

    /// Number of kits to produce
    #[arg(long, alias = "quantity")]
    pub qty: u64,

    /// Assembly & fulfillment cost per kit (default from config, 15.00)
    #[arg(long, value_parser = parse_non_negative)]
    pub assembly_cost: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveKitArgs {
    /// Quote ID or short ID (QUOT@N)
    pub quote: String,

    /// 1-based run number from `quote show`, a line ID prefix, or a kit ID
    pub line: String,
}

#[derive(clap::Args, Debug)]
pub struct StatusArgs {
    /// Quote ID or short ID (QUOT@N)
    pub id: String,

    /// New status
    pub status: CliQuoteStatus,
}

/// Run a quote subcommand
pub fn run(cmd: QuoteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QuoteCommands::List(args) => run_list(args, global),
        QuoteCommands::New(args) => run_new(args, global),
        QuoteCommands::Show(args) => run_show(args, global),
        QuoteCommands::AddKit(args) => run_add_kit(args, global),
        QuoteCommands::RemoveKit(args) => run_remove_kit(args, global),
        QuoteCommands::Reprice(args) => run_reprice(args, global),
        QuoteCommands::Status(args) => run_status(args, global),
    }
}

/// Warning recorded on a kit run whose kit has no BOM lines
pub const EMPTY_BOM_WARNING: &str = "Kit has no BOM defined - cannot calculate component costs";

/// Resolve a kit's BOM and run the pricing engine over it
///
/// A kit without BOM lines prices as assembly only and carries
/// [`EMPTY_BOM_WARNING`].
pub fn price_kit(
    store: &FsStore,
    kit: &Kit,
    quantity: u64,
    assembly_cost_per_kit: f64,
) -> Result<PricingResult> {
    let lines = store.resolve_bom(kit).map_err(|e| miette::miette!("{}", e))?;
    let mut pricing = calculate_project_pricing(&lines, quantity, assembly_cost_per_kit);
    if kit.bom.is_empty() {
        pricing.warnings.push(EMPTY_BOM_WARNING.to_string());
    }
    Ok(pricing)
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));

    let mut quotes: Vec<Quote> = store
        .quotes()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|q| args.status.map_or(true, |s| q.status == QuoteStatus::from(s)))
        .filter(|q| {
            args.search.as_ref().map_or(true, |search| {
                let search_lower = search.to_lowercase();
                q.name.to_lowercase().contains(&search_lower)
                    || q.customer
                        .as_ref()
                        .map_or(false, |c| c.to_lowercase().contains(&search_lower))
            })
        })
        .collect();
    quotes.sort_by(|a, b| a.created.cmp(&b.created));

    if args.count {
        println!("{}", quotes.len());
        return Ok(());
    }

    if quotes.is_empty() {
        println!("No quotes found.");
        return Ok(());
    }

    let _ = store.register_short_ids(&quotes);

    match resolve_format(global.format, &config, OutputFormat::Tsv) {
        OutputFormat::Json => print_json(&quotes)?,
        OutputFormat::Yaml => print_yaml(&quotes)?,
        OutputFormat::Csv => {
            println!(
                "short_id,id,name,customer,status,target_ship_date,total_kits,total_project_cost"
            );
            for quote in &quotes {
                println!(
                    "{},{},{},{},{},{},{},{:.2}",
                    store.short_id_of(quote),
                    quote.id,
                    escape_csv(&quote.name),
                    escape_csv(quote.customer.as_deref().unwrap_or("")),
                    quote.status,
                    quote.target_ship_date.map(|d| d.to_string()).unwrap_or_default(),
                    quote.total_kits(),
                    quote.total_project_cost
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<8} {:<17} {:<26} {:<22} {:<14} {:>8} {:>14}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("CUSTOMER").bold(),
                style("STATUS").bold(),
                style("KITS").bold(),
                style("TOTAL").bold(),
            );
            println!("{}", "-".repeat(115));
            for quote in &quotes {
                println!(
                    "{:<8} {:<17} {:<26} {:<22} {:<14} {:>8} {:>14}",
                    style(store.short_id_of(quote)).cyan(),
                    format_short_id(&quote.id),
                    truncate_str(&quote.name, 24),
                    truncate_str(quote.customer.as_deref().unwrap_or("-"), 20),
                    quote.status.to_string(),
                    format_count(quote.total_kits()),
                    format_currency(quote.total_project_cost)
                );
            }
            println!();
            println!(
                "{} quote(s) found. Use {} to reference by short ID.",
                style(quotes.len()).cyan(),
                style("QUOT@N").cyan()
            );
        }
        OutputFormat::Id => {
            for quote in &quotes {
                println!("{}", quote.id);
            }
        }
        OutputFormat::Md => {
            let rows: Vec<Vec<String>> = quotes
                .iter()
                .map(|quote| {
                    vec![
                        store.short_id_of(quote),
                        quote.name.clone(),
                        quote.customer.clone().unwrap_or_default(),
                        quote.status.to_string(),
                        format_count(quote.total_kits()),
                        format_currency(quote.total_project_cost),
                    ]
                })
                .collect();
            println!(
                "{}",
                markdown_table(&["Short", "Name", "Customer", "Status", "Kits", "Total"], &rows)
            );
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));

    let mut quote = Quote::new(args.name, config.author());
    quote.customer = args.customer;
    quote.target_ship_date = args.ship_date;
    quote.fulfillment = args.fulfillment.into();

    store.save_quote(&quote).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Created quote {}",
        style("✓").green(),
        style(store.short_id_of(&quote)).cyan()
    );
    println!("   {}", style(store.project().entity_path(&quote.id).display()).dim());
    println!(
        "   Add kits with {}",
        style(format!("kitq quote add-kit {} KIT@N --qty 1000", store.short_id_of(&quote))).yellow()
    );

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let quote = store.quote(&args.id).map_err(|e| miette::miette!("{}", e))?;

    match resolve_format(global.format, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print_yaml(&quote)?,
        OutputFormat::Json => print_json(&quote)?,
        OutputFormat::Id => println!("{}", quote.id),
        _ => print_quote(&quote),
    }

    Ok(())
}

fn print_quote(quote: &Quote) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&quote.id.to_string()).cyan());
    println!("{}: {}", style("Name").bold(), style(&quote.name).yellow());
    if let Some(ref customer) = quote.customer {
        println!("{}: {}", style("Customer").bold(), customer);
    }
    println!("{}: {}", style("Status").bold(), quote.status);
    if let Some(date) = quote.target_ship_date {
        println!("{}: {}", style("Target Ship").bold(), date);
    }
    println!("{}: {}", style("Fulfillment").bold(), quote.fulfillment.label());
    if let Some(at) = quote.sow_generated_at {
        println!("{}: {}", style("SOW Generated").bold(), at.format("%Y-%m-%d %H:%M"));
    }
    println!("{}", style("─".repeat(60)).dim());

    if quote.kits.is_empty() {
        println!();
        println!("{}", style("No kit runs yet.").dim());
        return;
    }

    let rows: Vec<Vec<String>> = quote
        .kits
        .iter()
        .enumerate()
        .map(|(idx, run)| {
            vec![
                (idx + 1).to_string(),
                run.kit_name.clone(),
                format_count(run.quantity),
                format_currency(run.unit_manufacture_cost()),
                format_currency(run.manufacture_cost),
                format_currency(run.assembly_cost),
                format_currency(run.extended_total),
            ]
        })
        .collect();

    println!();
    println!(
        "{}",
        markdown_table(
            &["#", "Kit", "Qty", "Mfg/Kit", "Manufacturing", "Assembly", "Extended"],
            &rows
        )
    );

    println!();
    println!(
        "{}: {}",
        style("Manufacturing").bold(),
        format_currency(quote.total_manufacture_cost)
    );
    println!("{}: {}", style("Assembly").bold(), format_currency(quote.total_assembly_cost));
    println!(
        "{}: {}",
        style("Total Project Cost").bold(),
        style(format_currency(quote.total_project_cost)).green().bold()
    );

    let warnings: Vec<String> = quote
        .kits
        .iter()
        .flat_map(|run| run.warnings.iter().map(move |w| format!("[{}] {}", run.kit_name, w)))
        .collect();
    print_warnings(&warnings);
}

fn run_add_kit(args: AddKitArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let mut quote = store.quote(&args.quote).map_err(|e| miette::miette!("{}", e))?;
    let kit = store.kit(&args.kit).map_err(|e| miette::miette!("{}", e))?;

    if !kit.active {
        tracing::warn!(kit = %kit.id, "adding an inactive kit to a quote");
    }

    let rate = args
        .assembly_cost
        .unwrap_or_else(|| config.assembly_cost_per_kit());
    let pricing = price_kit(&store, &kit, args.qty, rate)?;
    let run = QuoteKit::from_pricing(&kit, args.qty, rate, &pricing);
    quote.add_kit(run);
    store.save_quote(&quote).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added {} × {} to {}",
        style("✓").green(),
        format_count(args.qty),
        style(&kit.name).cyan(),
        style(&quote.name).yellow()
    );
    println!(
        "   Extended total {} | Quote total {}",
        format_currency(pricing.total_cost),
        style(format_currency(quote.total_project_cost)).green()
    );
    print_warnings(&pricing.warnings);

    Ok(())
}

fn run_remove_kit(args: RemoveKitArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut quote = store.quote(&args.quote).map_err(|e| miette::miette!("{}", e))?;

    let removed = match args.line.parse::<usize>() {
        Ok(n) if n >= 1 && n <= quote.kits.len() => {
            let line_id = quote.kits[n - 1].id.clone();
            quote.remove_kit(&line_id)
        }
        Ok(n) => {
            return Err(miette::miette!(
                "Run {} out of range (quote has {} kit run(s))",
                n,
                quote.kits.len()
            ))
        }
        Err(_) => {
            let reference = store
                .expand_reference(&args.line)
                .unwrap_or_else(|_| args.line.clone());
            quote.remove_kit(&reference)
        }
    };

    let removed = removed
        .ok_or_else(|| miette::miette!("No kit run matching '{}' in {}", args.line, quote.name))?;
    store.save_quote(&quote).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Removed {} × {} from {} (new total {})",
        style("✓").green(),
        format_count(removed.quantity),
        removed.kit_name,
        style(&quote.name).yellow(),
        format_currency(quote.total_project_cost)
    );

    Ok(())
}

fn run_reprice(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut quote = store.quote(&args.id).map_err(|e| miette::miette!("{}", e))?;
    let previous = quote.total_project_cost;

    let mut missing = Vec::new();
    for i in 0..quote.kits.len() {
        let kit_id = quote.kits[i].kit_id.to_string();
        let kit = match store.kit(&kit_id) {
            Ok(kit) => kit,
            Err(e) => {
                tracing::warn!(
                    kit = %kit_id,
                    error = %e,
                    "kit run references a missing kit, keeping old pricing"
                );
                missing.push(quote.kits[i].kit_name.clone());
                continue;
            }
        };
        let run = &quote.kits[i];
        let pricing = price_kit(&store, &kit, run.quantity, run.assembly_cost_per_kit)?;
        quote.kits[i].apply_pricing(&kit, &pricing);
    }
    quote.recalculate_totals();
    store.save_quote(&quote).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Repriced {} ({} → {})",
        style("✓").green(),
        style(&quote.name).yellow(),
        format_currency(previous),
        style(format_currency(quote.total_project_cost)).green()
    );
    for name in missing {
        println!(
            "   {} kit '{}' no longer exists; kept previous pricing",
            style("!").yellow(),
            name
        );
    }

    Ok(())
}

fn run_status(args: StatusArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut quote = store.quote(&args.id).map_err(|e| miette::miette!("{}", e))?;

    let previous = quote.status;
    quote.status = args.status.into();
    store.save_quote(&quote).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {} {} → {}",
        style("✓").green(),
        style(&quote.name).yellow(),
        previous,
        style(quote.status).cyan()
    );

    Ok(())
}
