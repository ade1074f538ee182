//! `kitq sow` command - Statement of Work generation

use chrono::{Local, NaiveDate, Utc};
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{open_store, parse_date};
use crate::cli::GlobalOpts;
use crate::core::CatalogStore;
use crate::pricing::BomLineItem;
use crate::entities::Kit;
use crate::sow::{SowDocument, SowRenderer};

#[derive(clap::Args, Debug)]
pub struct SowArgs {
    /// Quote ID or short ID (QUOT@N)
    pub quote: String,

    /// Write the document to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Prepared date (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

pub fn run(args: SowArgs, global: &GlobalOpts) -> Result<()> {
    let mut store = open_store(global)?;
    let mut quote = store.quote(&args.quote).map_err(|e| miette::miette!("{}", e))?;

    if quote.kits.is_empty() {
        tracing::warn!(quote = %quote.id, "generating a SOW for a quote with no kits");
    }

    let mut kits: Vec<(Kit, Vec<BomLineItem>)> = Vec::new();
    for run in &quote.kits {
        if kits.iter().any(|(kit, _)| kit.id == run.kit_id) {
            continue;
        }
        match store.kit(&run.kit_id.to_string()) {
            Ok(kit) => {
                let lines = store.resolve_bom(&kit).map_err(|e| miette::miette!("{}", e))?;
                kits.push((kit, lines));
            }
            Err(e) => {
                tracing::warn!(
                    kit = %run.kit_id,
                    error = %e,
                    "kit missing, SOW omits its configuration"
                );
            }
        }
    }

    let prepared = args.date.unwrap_or_else(|| Local::now().date_naive());
    let document = SowDocument::build(&quote, &kits, prepared);
    let renderer = SowRenderer::new().map_err(|e| miette::miette!("{}", e))?;
    let markdown = renderer
        .render(&document)
        .map_err(|e| miette::miette!("{}", e))?;

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &markdown).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote SOW for {} to {}",
                    style("✓").green(),
                    style(&quote.name).yellow(),
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", markdown),
    }

    quote.sow_generated_at = Some(Utc::now());
    store.save_quote(&quote).map_err(|e| miette::miette!("{}", e))?;

    Ok(())
}
