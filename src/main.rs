use clap::Parser;
use miette::Result;
use kitq::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE so piping into `head` and friends exits quietly
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;

    kitq::logging::init(global.verbose, global.quiet);

    match cli.command {
        Commands::Init(args) => kitq::cli::commands::init::run(args),
        Commands::Cmp(cmd) => kitq::cli::commands::cmp::run(cmd, &global),
        Commands::Kit(cmd) => kitq::cli::commands::kit::run(cmd, &global),
        Commands::Quote(cmd) => kitq::cli::commands::quote::run(cmd, &global),
        Commands::Price(args) => kitq::cli::commands::price::run(args, &global),
        Commands::Sow(args) => kitq::cli::commands::sow::run(args, &global),
        Commands::Import(args) => kitq::cli::commands::import::run(args, &global),
        Commands::Config(cmd) => kitq::cli::commands::config::run(cmd, &global),
        Commands::Completions(args) => kitq::cli::commands::completions::run(args),
    }
}
