#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "sg: who works with whom, from issue tracker exports",
    long_about = None
)]
struct Cli {
    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format. Defaults to pretty on a terminal, text when piped.
    #[arg(long, value_enum, global = true)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (defaults to ./sociogram.toml, then the user config dir).
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Full social analysis report",
        long_about = "Build the interaction graph from event bundles and report influence, groups, communities and fragmentation.",
        after_help = "EXAMPLES:\n    # Analyze one export\n    sg analyze --events export.json\n\n    # Include a per-contributor section\n    sg analyze -e export.json --focus alice\n\n    # Emit machine-readable output\n    sg analyze -e export.json --format json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Graph size, density and ingestion counts",
        after_help = "EXAMPLES:\n    # Summary statistics\n    sg stats --events export.json\n\n    # List identities by activity\n    sg stats -e export.json --identities"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Natural groups or communities",
        after_help = "EXAMPLES:\n    # Strongly connected components\n    sg groups --events export.json\n\n    # Label-propagation communities of three or more\n    sg groups -e export.json --kind communities --min-size 3"
    )]
    Groups(cmd::groups::GroupsArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Nearest contributors to one identity",
        after_help = "EXAMPLES:\n    # Five closest contributors\n    sg closest --events export.json alice\n\n    # Suggest people alice has not worked with yet\n    sg closest -e export.json alice --non-interacting"
    )]
    Closest(cmd::closest::ClosestArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    sg completions bash\n    sg completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("SOCIOGRAM_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "sociogram_core=debug,sociogram_analytics=debug,sg=debug,info"
        } else {
            "sociogram_core=info,sociogram_analytics=info,sg=info,warn"
        })
    });
    let format = env::var("SOCIOGRAM_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());
    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = cli.output_mode();
    let config = cli.config.as_deref();
    debug!(?output, "starting");

    match &cli.command {
        Commands::Analyze(args) => cmd::analyze::run_analyze(args, config, output),
        Commands::Stats(args) => cmd::stats::run_stats(args, config, output),
        Commands::Groups(args) => cmd::groups::run_groups(args, config, output),
        Commands::Closest(args) => cmd::closest::run_closest(args, config, output),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    }
}
