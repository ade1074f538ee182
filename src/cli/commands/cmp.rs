//! `kitq cmp` command - Component catalog management

use clap::{Subcommand, ValueEnum};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{
    escape_csv, format_short_id, open_store, parse_non_negative, parse_positive_count, truncate_str,
};
use crate::cli::output::{markdown_table, print_json, print_yaml, resolve_format};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::{CatalogStore, Config};
use crate::entities::component::{Component, SourcingType};
use crate::sow::format_currency;

#[derive(Subcommand, Debug)]
pub enum CmpCommands {
    /// List catalog components with filtering
    List(ListArgs),

    /// Add a component to the catalog
    New(NewArgs),

    /// Show a component's details
    Show(ShowArgs),

    /// Edit a component in your editor
    Edit(EditArgs),

    /// Update a component's unit cost
    SetCost(SetCostArgs),
}

/// Sourcing choice for command-line arguments
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CliSourcing {
    DotSourced,
    DotManufactured,
    CustomerProvided,
}

impl From<CliSourcing> for SourcingType {
    fn from(value: CliSourcing) -> Self {
        match value {
            CliSourcing::DotSourced => SourcingType::DotSourced,
            CliSourcing::DotManufactured => SourcingType::DotManufactured,
            CliSourcing::CustomerProvided => SourcingType::CustomerProvided,
        }
    }
}

impl std::fmt::Display for CliSourcing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", SourcingType::from(*self))
    }
}

/// Sort field for list output
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    Name,
    Sku,
    Category,
    Sourcing,
    Cost,
    Moq,
    LeadTime,
    Created,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by sourcing type
    #[arg(long, short = 's')]
    pub sourcing: Option<CliSourcing>,

    /// Show only at-risk components
    #[arg(long)]
    pub at_risk: bool,

    /// Search in name, SKU, category and vendor
    #[arg(long)]
    pub search: Option<String>,

    /// Sort by field
    #[arg(long, default_value = "name")]
    pub sort: SortField,

    /// Reverse sort order
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit number of results
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show only count
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Component name
    #[arg(long, short = 'N')]
    pub name: Option<String>,

    /// Unit cost in dollars
    #[arg(long, short = 'c', value_parser = parse_non_negative)]
    pub unit_cost: Option<f64>,

    /// Stock keeping unit
    #[arg(long)]
    pub sku: Option<String>,

    /// Free-form category (e.g. Tubes, Labels)
    #[arg(long)]
    pub category: Option<String>,

    /// Default sourcing for BOM lines using this component
    #[arg(long, short = 's', default_value = "dot-sourced")]
    pub sourcing: CliSourcing,

    /// Vendor minimum order quantity
    #[arg(long, value_parser = parse_positive_count)]
    pub moq: Option<u64>,

    /// Vendor lead time in days
    #[arg(long)]
    pub lead_time: Option<u32>,

    /// Flag the component as a supply risk
    #[arg(long)]
    pub at_risk: bool,

    /// Vendor name
    #[arg(long)]
    pub vendor: Option<String>,

    /// Notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Interactive mode (prompt for fields)
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Component ID or short ID (CMP@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Component ID or short ID (CMP@N)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetCostArgs {
    /// Component ID or short ID (CMP@N)
    pub id: String,

    /// New unit cost in dollars
    #[arg(value_parser = parse_non_negative)]
    pub amount: f64,
}

/// Run a component subcommand
pub fn run(cmd: CmpCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CmpCommands::List(args) => run_list(args, global),
        CmpCommands::New(args) => run_new(args, global),
        CmpCommands::Show(args) => run_show(args, global),
        CmpCommands::Edit(args) => run_edit(args, global),
        CmpCommands::SetCost(args) => run_set_cost(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));

    let mut components: Vec<Component> = store
        .components()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|c| {
            args.sourcing
                .map_or(true, |s| c.sourcing == SourcingType::from(s))
        })
        .filter(|c| !args.at_risk || c.at_risk)
        .filter(|c| {
            if let Some(ref search) = args.search {
                let search_lower = search.to_lowercase();
                let matches = |field: &Option<String>| {
                    field
                        .as_ref()
                        .map_or(false, |v| v.to_lowercase().contains(&search_lower))
                };
                c.name.to_lowercase().contains(&search_lower)
                    || matches(&c.sku)
                    || matches(&c.category)
                    || matches(&c.vendor)
            } else {
                true
            }
        })
        .collect();

    match args.sort {
        SortField::Name => components.sort_by(|a, b| a.name.cmp(&b.name)),
        SortField::Sku => components.sort_by(|a, b| a.sku.cmp(&b.sku)),
        SortField::Category => components.sort_by(|a, b| a.category.cmp(&b.category)),
        SortField::Sourcing => {
            components.sort_by(|a, b| a.sourcing.as_str().cmp(b.sourcing.as_str()))
        }
        SortField::Cost => components.sort_by(|a, b| a.unit_cost.total_cmp(&b.unit_cost)),
        SortField::Moq => components.sort_by(|a, b| a.moq.cmp(&b.moq)),
        SortField::LeadTime => components.sort_by(|a, b| a.lead_time_days.cmp(&b.lead_time_days)),
        SortField::Created => components.sort_by(|a, b| a.created.cmp(&b.created)),
    }

    if args.reverse {
        components.reverse();
    }

    if let Some(limit) = args.limit {
        components.truncate(limit);
    }

    if args.count {
        println!("{}", components.len());
        return Ok(());
    }

    if components.is_empty() {
        println!("No components found.");
        return Ok(());
    }

    // Update short ID index
    let _ = store.register_short_ids(&components);

    match resolve_format(global.format, &config, OutputFormat::Tsv) {
        OutputFormat::Json => print_json(&components)?,
        OutputFormat::Yaml => print_yaml(&components)?,
        OutputFormat::Csv => {
            println!(
                "short_id,id,name,sku,category,sourcing,unit_cost,moq,lead_time_days,at_risk,vendor"
            );
            for cmp in &components {
                println!(
                    "{},{},{},{},{},{},{},{},{},{},{}",
                    store.short_id_of(cmp),
                    cmp.id,
                    escape_csv(&cmp.name),
                    escape_csv(cmp.sku.as_deref().unwrap_or("")),
                    escape_csv(cmp.category.as_deref().unwrap_or("")),
                    cmp.sourcing,
                    cmp.unit_cost,
                    cmp.moq.map(|m| m.to_string()).unwrap_or_default(),
                    cmp.lead_time_days.map(|d| d.to_string()).unwrap_or_default(),
                    cmp.at_risk,
                    escape_csv(cmp.vendor.as_deref().unwrap_or("")),
                );
            }
        }
        OutputFormat::Tsv | OutputFormat::Auto => {
            println!(
                "{:<8} {:<17} {:<30} {:<12} {:<12} {:>10} {:>8} {:>5}",
                style("SHORT").bold().dim(),
                style("ID").bold(),
                style("NAME").bold(),
                style("CATEGORY").bold(),
                style("SOURCING").bold(),
                style("UNIT COST").bold(),
                style("MOQ").bold(),
                style("LEAD").bold(),
            );
            println!("{}", "-".repeat(110));

            for cmp in &components {
                let name = truncate_str(&cmp.name, 28);
                let name = if cmp.at_risk {
                    style(format!("{:<30}", name)).red().to_string()
                } else {
                    format!("{:<30}", name)
                };
                println!(
                    "{:<8} {:<17} {} {:<12} {:<12} {:>10} {:>8} {:>5}",
                    style(store.short_id_of(cmp)).cyan(),
                    format_short_id(&cmp.id),
                    name,
                    truncate_str(cmp.category.as_deref().unwrap_or("-"), 10),
                    cmp.sourcing.label(),
                    format_currency(cmp.unit_cost),
                    cmp.moq.map(|m| m.to_string()).unwrap_or_else(|| "-".to_string()),
                    cmp.lead_time_days
                        .map(|d| format!("{}d", d))
                        .unwrap_or_else(|| "-".to_string()),
                );
            }

            println!();
            println!(
                "{} component(s) found. Use {} to reference by short ID.",
                style(components.len()).cyan(),
                style("CMP@N").cyan()
            );
        }
        OutputFormat::Id => {
            for cmp in &components {
                println!("{}", cmp.id);
            }
        }
        OutputFormat::Md => {
            let rows: Vec<Vec<String>> = components
                .iter()
                .map(|cmp| {
                    vec![
                        store.short_id_of(cmp),
                        format_short_id(&cmp.id),
                        cmp.name.clone(),
                        cmp.category.clone().unwrap_or_default(),
                        cmp.sourcing.label().to_string(),
                        format_currency(cmp.unit_cost),
                        cmp.moq.map(|m| m.to_string()).unwrap_or_default(),
                        if cmp.at_risk { "yes".to_string() } else { String::new() },
                    ]
                })
                .collect();
            println!(
                "{}",
                markdown_table(
                    &["Short", "ID", "Name", "Category", "Sourcing", "Unit Cost", "MOQ", "At Risk"],
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

    let mut component = if args.interactive {
        prompt_component(&config)?
    } else {
        let name = args
            .name
            .ok_or_else(|| miette::miette!("Name is required (use --name or -N)"))?;
        let unit_cost = args
            .unit_cost
            .ok_or_else(|| miette::miette!("Unit cost is required (use --unit-cost or -c)"))?;
        let mut component = Component::new(name, args.sourcing.into(), unit_cost, config.author());
        component.sku = args.sku;
        component.category = args.category;
        component.moq = args.moq;
        component.lead_time_days = args.lead_time;
        component.at_risk = args.at_risk;
        component.vendor = args.vendor;
        component
    };
    if args.notes.is_some() {
        component.notes = args.notes;
    }

    store
        .save_component(&component)
        .map_err(|e| miette::miette!("{}", e))?;
    let path = store.project().entity_path(&component.id);

    println!(
        "{} Created component {}",
        style("✓").green(),
        style(store.short_id_of(&component)).cyan()
    );
    println!("   {}", style(path.display()).dim());
    println!(
        "   {} | {} | {}",
        style(&component.name).yellow(),
        component.sourcing.label(),
        format_currency(component.unit_cost)
    );

    Ok(())
}

fn prompt_component(config: &Config) -> Result<Component> {
    let theme = ColorfulTheme::default();

    let name: String = Input::with_theme(&theme)
        .with_prompt("Component name")
        .interact_text()
        .into_diagnostic()?;

    let labels: Vec<&str> = SourcingType::all().iter().map(|s| s.label()).collect();
    let choice = Select::with_theme(&theme)
        .with_prompt("Sourcing")
        .items(&labels)
        .default(0)
        .interact()
        .into_diagnostic()?;
    let sourcing = SourcingType::all()[choice];

    let unit_cost: f64 = Input::with_theme(&theme)
        .with_prompt("Unit cost ($)")
        .default(0.0)
        .validate_with(|v: &f64| parse_non_negative(&v.to_string()).map(|_| ()))
        .interact_text()
        .into_diagnostic()?;

    let category: String = Input::with_theme(&theme)
        .with_prompt("Category")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;

    let moq: u64 = Input::with_theme(&theme)
        .with_prompt("MOQ (0 for none)")
        .default(0)
        .interact_text()
        .into_diagnostic()?;

    let lead_time: u32 = Input::with_theme(&theme)
        .with_prompt("Lead time in days (0 for none)")
        .default(0)
        .interact_text()
        .into_diagnostic()?;

    let at_risk = Confirm::with_theme(&theme)
        .with_prompt("At risk?")
        .default(false)
        .interact()
        .into_diagnostic()?;

    let mut component = Component::new(name, sourcing, unit_cost, config.author());
    component.category = Some(category).filter(|c| !c.is_empty());
    component.moq = Some(moq).filter(|&m| m > 0);
    component.lead_time_days = Some(lead_time).filter(|&d| d > 0);
    component.at_risk = at_risk;
    Ok(component)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let cmp = store
        .component(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    match resolve_format(global.format, &config, OutputFormat::Auto) {
        OutputFormat::Yaml => print_yaml(&cmp)?,
        OutputFormat::Json => print_json(&cmp)?,
        OutputFormat::Id => println!("{}", cmp.id),
        _ => {
            println!("{}", style("─".repeat(60)).dim());
            println!("{}: {}", style("ID").bold(), style(&cmp.id.to_string()).cyan());
            println!("{}: {}", style("Name").bold(), style(&cmp.name).yellow());
            if let Some(ref sku) = cmp.sku {
                println!("{}: {}", style("SKU").bold(), sku);
            }
            if let Some(ref category) = cmp.category {
                println!("{}: {}", style("Category").bold(), category);
            }
            println!("{}: {}", style("Sourcing").bold(), cmp.sourcing.label());
            println!("{}", style("─".repeat(60)).dim());

            println!();
            println!("{}", style("Purchasing:").bold());
            println!("  {}: {}", style("Unit Cost").dim(), format_currency(cmp.unit_cost));
            if let Some(moq) = cmp.effective_moq() {
                println!("  {}: {}", style("MOQ").dim(), moq);
            }
            if let Some(days) = cmp.lead_time_days {
                println!("  {}: {} days", style("Lead Time").dim(), days);
            }
            if let Some(ref vendor) = cmp.vendor {
                println!("  {}: {}", style("Vendor").dim(), vendor);
            }
            if cmp.at_risk {
                println!("  {}", style("⚠️ AT-RISK COMPONENT").red().bold());
            }

            if let Some(ref notes) = cmp.notes {
                println!();
                println!("{}", style("Notes:").bold());
                println!("  {}", notes);
            }

            // Kits using this component
            let kits = store.kits().map_err(|e| miette::miette!("{}", e))?;
            let used_in: Vec<_> = kits.iter().filter(|k| k.uses_component(&cmp.id)).collect();
            if !used_in.is_empty() {
                println!();
                println!("{}", style("Used In Kits:").bold());
                for kit in used_in {
                    let short_id = store.short_id_of(kit);
                    let label = if short_id.is_empty() {
                        format_short_id(&kit.id)
                    } else {
                        short_id
                    };
                    println!("  • {} {}", style(label).cyan(), kit.name);
                }
            }

            println!();
            println!(
                "{} {} | {} {}",
                style("Created:").dim(),
                cmp.created.format("%Y-%m-%d %H:%M"),
                style("Author:").dim(),
                cmp.author
            );
        }
    }

    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let store = open_store(global)?;
    let config = Config::load_for(Some(store.project()));
    let path = store
        .path_of::<Component>(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(config.editor()).yellow()
    );

    config.run_editor(&path).into_diagnostic()?;

    Ok(())
}

fn run_set_cost(args: SetCostArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut cmp = store
        .component(&args.id)
        .map_err(|e| miette::miette!("{}", e))?;

    let previous = cmp.unit_cost;
    cmp.unit_cost = args.amount;
    store
        .save_component(&cmp)
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} {} unit cost {} → {}",
        style("✓").green(),
        style(&cmp.name).yellow(),
        format_currency(previous),
        style(format_currency(cmp.unit_cost)).cyan()
    );
    if !global.quiet {
        println!(
            "   {}",
            style("Run `kitq quote reprice <QUOT>` to refresh affected quotes.").dim()
        );
    }

    Ok(())
}
