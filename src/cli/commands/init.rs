//! `kitq init` command - Initialize a new KITQ project

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::Path;

use crate::core::project::{Project, ProjectError};
use crate::core::{Config, FsStore};
use crate::sample;

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    #[arg(default_value = ".")]
    pub path: std::path::PathBuf,

    /// Force initialization even if .kitq/ already exists
    #[arg(long)]
    pub force: bool,

    /// Seed the demo catalog, kits and quotes
    #[arg(long)]
    pub sample: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let path = if args.path.as_os_str() == "." {
        std::env::current_dir().into_diagnostic()?
    } else {
        args.path.clone()
    };

    // Create directory if it doesn't exist
    if !path.exists() {
        std::fs::create_dir_all(&path).into_diagnostic()?;
        println!(
            "{} Created directory {}",
            style("✓").green(),
            style(path.display()).cyan()
        );
    }

    let project = if args.force {
        Project::init_force(&path)
    } else {
        Project::init(&path)
    };

    match project {
        Ok(project) => {
            println!(
                "{} Initialized KITQ project at {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created project structure:");
            print_structure(project.root());

            if args.sample {
                let config = Config::load_for(Some(&project));
                let mut store = FsStore::open(project);
                let summary =
                    sample::seed(&mut store, &config.author(), config.assembly_cost_per_kit())
                        .map_err(|e| miette::miette!("{}", e))?;
                println!();
                println!(
                    "{} Seeded {} components, {} kits and {} quotes",
                    style("✓").green(),
                    summary.components,
                    summary.kits,
                    summary.quotes
                );
            }

            println!();
            println!("Next steps:");
            println!(
                "  {} Add a catalog component",
                style("kitq cmp new --name \"Gel Ice Pack\" --unit-cost 0.75").yellow()
            );
            println!("  {} Create a kit", style("kitq kit new --name \"Bulk Fit Kit\"").yellow());
            println!(
                "  {} Price a kit run",
                style("kitq price KIT@1 --kits 5000").yellow()
            );
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} KITQ project already exists at {}",
                style("!").yellow(),
                style(path.display()).cyan()
            );
            println!();
            println!("Use {} to reinitialize", style("kitq init --force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

fn print_structure(root: &Path) {
    let dirs = [
        ".kitq/",
        ".kitq/config.yaml",
        "catalog/components/",
        "kits/",
        "quotes/",
    ];

    for dir in dirs {
        if root.join(dir).exists() {
            let prefix = if dir.ends_with('/') { "📁" } else { "📄" };
            println!("  {} {}", prefix, style(dir).dim());
        }
    }
}
