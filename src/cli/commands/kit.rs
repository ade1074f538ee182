//! `kitq kit` command - Kit bill of materials management

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::commands::cmp::CliSourcing;
use crate::cli::helpers::{
    escape_csv, format_short_id, open_store, parse_non_negative, truncate_str,
};
use crate::cli::output::{markdown_table, print_json, print_yaml, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CatalogStore, Config, FsStore};
use crate::entities::kit::{BomEntry, DistributionModel, FulfillmentModel, Kit};
use crate::entities::SourcingType;
use crate::sow::{format_currency, format_units};

#[derive(Subcommand, Debug)]
pub enum KitCommands {
    /// List kits
    List(ListArgs),

    /// Create a new, empty kit
    New(NewArgs),

    /// Show a kit and its bill of materials
    Show(ShowArgs),

    /// Add a component line to a kit's BOM
    Add(AddArgs),

    /// Remove a line from a kit's BOM
    Remove(RemoveArgs),

    /// Mark a kit active
    Activate(ShowArgs),

    /// Mark a kit inactive (hidden from default listings)
    Deactivate(ShowArgs),
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliDistribution {
    Bulk,
    Dtc,
}

impl From<CliDistribution> for DistributionModel {
    fn from(value: CliDistribution) -> Self {
        match value {
            CliDistribution::Bulk => DistributionModel::Bulk,
            CliDistribution::Dtc => DistributionModel::Dtc,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliFulfillment {
    B2bBulk,
    B2cApi,
}

impl From<CliFulfillment> for FulfillmentModel {
    fn from(value: CliFulfillment) -> Self {
        match value {
            CliFulfillment::B2bBulk => FulfillmentModel::B2bBulk,
            CliFulfillment::B2cApi => FulfillmentModel::B2cApi,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Include inactive kits
    #[arg(long, short = 'a')]
    pub all: bool,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Kit name
    #[arg(long, short = 'N')]
    pub name: String,

    /// Description
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Distribution model
    #[arg(long, default_value = "bulk")]
    pub distribution: CliDistribution,

    /// Fulfillment model
    #[arg(long, default_value = "b2b-bulk")]
    pub fulfillment: CliFulfillment,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Kit ID or short ID (KIT@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct AddArgs {
    /// Kit ID or short ID (KIT@N)
    pub kit: String,

    /// Component ID or short ID (CMP@N)
    pub component: String,

    /// Units required per kit
    #[arg(long, short = 'u', value_parser = parse_non_negative)]
    pub units: f64,

    /// Scrap/QA overage in percent (default from config, 2.0)
    #[arg(long, short = 'b', value_parser = parse_non_negative)]
    pub buffer: Option<f64>,

    /// Override the component's default sourcing
    #[arg(long, short = 's')]
    pub sourcing: Option<CliSourcing>,

    /// Override the component's unit cost for this kit
    #[arg(long, value_parser = parse_non_negative)]
    pub unit_cost: Option<f64>,

    /// Handling surcharge per ordered unit
    #[arg(long, value_parser = parse_non_negative)]
    pub handling: Option<f64>,

    /// Line needs receiving on arrival
    #[arg(long)]
    pub receiving: bool,

    /// Line needs incoming QA inspection
    #[arg(long)]
    pub qa: bool,

    /// Dependency notes
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Kit ID or short ID (KIT@N)
    pub kit: String,

    /// 1-based line number from `kit show`, a line ID prefix, or a component ID
    pub line: String,
}

/// Run a kit subcommand
pub fn run(cmd: KitCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        KitCommands::List(args) => run_list(args, global),
        KitCommands::New(args) => run_new(args, global),
        KitCommands::Show(args) => run_show(args, global),
        KitCommands::Add(args) => run_add(args, global),
        KitCommands::Remove(args) => run_remove(args, global),
        KitCommands::Activate(args) => run_set_active(args, global, true),
        KitCommands::Deactivate(args) => run_set_active(args, global, false),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));

    let mut kits: Vec<Kit> = store
        .kits()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|k| args.all || k.active)
        .collect();
    kits.sort_by(|a, b| a.name.cmp(&b.name));

    if args.count {
        println!("{}", kits.len());
        return Ok(());
    }

    if kits.is_empty() {
        println!("No kits found.");
        return Ok(());
    }

    let _ = store.register_short_ids(&kits);

    match resolve_format(global.format, &config, OutputFormat::Tsv) {
        OutputFormat::Json => print_json(&kits)?,
        OutputFormat::Yaml => print_yaml(&kits)?,
        OutputFormat::Csv => {
            println!("short_id,id,name,distribution,fulfillment,lines,active");
            for kit in &kits {
                println!(
                    "{},{},{},{},{},{},{}",
                    store.short_id_of(kit),
                    kit.id,
                    escape_csv(&kit.name),
                    kit.distribution,
                    kit.fulfillment,
                    kit.bom.len(),
                    kit.active
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<8} {:<17} {:<30} {:<6} {:<10} {:>5} {:<8}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("DIST").bold(),
                style("FULFILL").bold(),
                style("LINES").bold(),
                style("STATUS").bold(),
            );
            println!("{}", "-".repeat(90));
            for kit in &kits {
                let status = if kit.active {
                    style("active").green()
                } else {
                    style("inactive").dim()
                };
                println!(
                    "{:<8} {:<17} {:<30} {:<6} {:<10} {:>5} {:<8}",
                    style(store.short_id_of(kit)).cyan(),
                    format_short_id(&kit.id),
                    truncate_str(&kit.name, 28),
                    kit.distribution.to_string(),
                    kit.fulfillment.to_string(),
                    kit.bom.len(),
                    status
                );
            }
            println!();
            println!(
                "{} kit(s) found. Use {} to reference by short ID.",
                style(kits.len()).cyan(),
                style("KIT@N").cyan()
            );
        }
        OutputFormat::Id => {
            for kit in &kits {
                println!("{}", kit.id);
            }
        }
        OutputFormat::Md => {
            let rows: Vec<Vec<String>> = kits
                .iter()
                .map(|kit| {
                    vec![
                        store.short_id_of(kit),
                        kit.name.clone(),
                        kit.distribution.to_string(),
                        kit.fulfillment.label().to_string(),
                        kit.bom.len().to_string(),
                        if kit.active { "active" } else { "inactive" }.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                markdown_table(
                    &["Short", "Name", "Distribution", "Fulfillment", "Lines", "Status"],
                    &rows
                )
            );
        }
    }

    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));

    let mut kit = Kit::new(args.name, config.author());
    kit.description = args.description;
    kit.distribution = args.distribution.into();
    kit.fulfillment = args.fulfillment.into();

    store.save_kit(&kit).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Created kit {}",
        style("✓").green(),
        style(store.short_id_of(&kit)).cyan()
    );
    println!("   {}", style(store.project().entity_path(&kit.id).display()).dim());
    println!(
        "   Add components with {}",
        style(format!("kitq kit add {} CMP@N --units 1", store.short_id_of(&kit))).yellow()
    );

    Ok(())
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let kit = store.kit(&args.id).map_err(|e| miette::miette!("{}", e))?;

    match resolve_format(global.format, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print_yaml(&kit)?,
        OutputFormat::Json => print_json(&kit)?,
        OutputFormat::Id => println!("{}", kit.id),
        _ => print_kit(&store, &kit)?,
    }

    Ok(())
}

fn print_kit(store: &FsStore, kit: &Kit) -> Result<()> {
    let lines = store.resolve_bom(kit).map_err(|e| miette::miette!("{}", e))?;

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {}", style("ID").bold(), style(&kit.id.to_string()).cyan());
    println!("{}: {}", style("Name").bold(), style(&kit.name).yellow());
    if let Some(ref description) = kit.description {
        println!("{}: {}", style("Description").bold(), description);
    }
    println!("{}: {}", style("Distribution").bold(), kit.distribution);
    println!("{}: {}", style("Fulfillment").bold(), kit.fulfillment.label());
    println!(
        "{}: {}",
        style("Status").bold(),
        if kit.active { style("active").green() } else { style("inactive").dim() }
    );
    println!("{}", style("─".repeat(60)).dim());

    if kit.bom.is_empty() {
        println!();
        println!("{}", style("No BOM lines yet.").dim());
        return Ok(());
    }

    let rows: Vec<Vec<String>> = kit
        .bom
        .iter()
        .zip(&lines)
        .enumerate()
        .map(|(idx, (entry, item))| {
            let price = item
                .unit_cost_override
                .or(item.component.as_ref().map(|c| c.unit_cost));
            let mut flags = Vec::new();
            if entry.requires_receiving {
                flags.push("RCV");
            }
            if entry.requires_qa {
                flags.push("QA");
            }
            if item.component.as_ref().map_or(false, |c| c.at_risk) {
                flags.push("AT-RISK");
            }
            vec![
                (idx + 1).to_string(),
                entry.id.chars().take(8).collect(),
                item.component_name().unwrap_or("Unknown component").to_string(),
                format_units(entry.units_per_kit),
                format!("{}%", entry.buffer_percent),
                entry.sourcing.label().to_string(),
                match (entry.sourcing, price) {
                    (SourcingType::CustomerProvided, _) => "-".to_string(),
                    (_, Some(p)) => format_currency(p),
                    (_, None) => "?".to_string(),
                },
                flags.join(" "),
            ]
        })
        .collect();

    println!();
    println!("{}", style("Bill of Materials:").bold());
    println!(
        "{}",
        markdown_table(
            &["#", "Line", "Component", "Units/Kit", "Buffer", "Sourcing", "Unit Cost", "Flags"],
            &rows
        )
    );

    for entry in kit.bom.iter().filter(|e| e.notes.is_some()) {
        if let Some(ref notes) = entry.notes {
            println!("  {} {}", style(&entry.id[..8.min(entry.id.len())]).dim(), notes);
        }
    }

    Ok(())
}

fn run_add(args: AddArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let mut kit = store.kit(&args.kit).map_err(|e| miette::miette!("{}", e))?;
    let component = store
        .component(&args.component)
        .map_err(|e| miette::miette!("{}", e))?;

    if kit.uses_component(&component.id) {
        tracing::info!(
            kit = %kit.id,
            component = %component.id,
            "component already in BOM, adding another line"
        );
    }

    let mut entry = BomEntry::new(&component, args.units);
    entry.buffer_percent = args.buffer.unwrap_or_else(|| config.buffer_percent());
    if let Some(sourcing) = args.sourcing {
        entry.sourcing = sourcing.into();
        let customer = entry.sourcing == SourcingType::CustomerProvided;
        entry.requires_receiving = customer;
        entry.requires_qa = customer;
    }
    entry.unit_cost_override = args.unit_cost;
    entry.handling_surcharge = args.handling.unwrap_or(0.0);
    entry.requires_receiving |= args.receiving;
    entry.requires_qa |= args.qa;
    entry.notes = args.notes;

    let line_no = kit.bom.len() + 1;
    let sourcing = entry.sourcing;
    let units = entry.units_per_kit;
    kit.bom.push(entry);
    store.save_kit(&kit).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Added line {} to {}: {} × {} ({})",
        style("✓").green(),
        line_no,
        style(&kit.name).yellow(),
        format_units(units),
        style(&component.name).cyan(),
        sourcing.label()
    );

    Ok(())
}

fn run_remove(args: RemoveArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut kit = store.kit(&args.kit).map_err(|e| miette::miette!("{}", e))?;

    let removed = match args.line.parse::<usize>() {
        Ok(n) if n >= 1 && n <= kit.bom.len() => Some(kit.bom.remove(n - 1)),
        Ok(n) => {
            return Err(miette::miette!(
                "Line {} out of range (kit has {} line(s))",
                n,
                kit.bom.len()
            ))
        }
        Err(_) => {
            let reference = store
                .expand_reference(&args.line)
                .unwrap_or_else(|_| args.line.clone());
            kit.remove_line(&reference)
        }
    };

    let removed = removed.ok_or_else(|| {
        miette::miette!("No BOM line matching '{}' in {}", args.line, kit.name)
    })?;
    store.save_kit(&kit).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Removed line {} ({}) from {}",
        style("✓").green(),
        &removed.id[..8.min(removed.id.len())],
        removed.component_id,
        style(&kit.name).yellow()
    );

    Ok(())
}

fn run_set_active(args: ShowArgs, global: &GlobalOpts, active: bool) -> Result<()> {
    let mut store = open_store(global)?;
    let mut kit = store.kit(&args.id).map_err(|e| miette::miette!("{}", e))?;

    kit.active = active;
    store.save_kit(&kit).map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {} is now {}",
        style("✓").green(),
        style(&kit.name).yellow(),
        if active { "active" } else { "inactive" }
    );

    Ok(())
}
