use anyhow::Result;
use clap::{Parser, Subcommand};
use mondeploy::commands::{agent, deploy, doctor, status};
use mondeploy::config::{load_config, Config};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mondeploy")]
#[command(about = "Deploy file-transfer monitors in bulk and verify they start", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// File listing one monitor per line (prompted for if omitted)
    list: Option<PathBuf>,

    /// Configuration file (defaults to ./mondeploy.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Re-deploys attempted when the agent answers a ping
    #[arg(short, long)]
    retries: Option<u32>,

    /// Deploy-and-check rounds for a deployed but stopped monitor
    #[arg(long)]
    convergence_retries: Option<u32>,

    /// Directory receiving the deployment report
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show monitor status across the fleet or on one agent
    Status {
        /// Monitor name
        monitor: String,

        /// Restrict the query to this agent
        #[arg(short, long)]
        agent: Option<String>,
    },

    /// Show agent availability and queue manager
    Agent {
        /// Agent name
        name: String,

        /// Also ping the agent
        #[arg(short, long)]
        ping: bool,
    },

    /// Check that fleet tools and staging repo are reachable
    Doctor,
}

fn init_logging(verbose: bool) {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, directives.as_deref()))
        .with_target(false)
        .init();
}

/// `RUST_LOG` directives when set and valid, `info` otherwise; `--verbose`
/// raises the floor to debug.
fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let filter = directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    if verbose {
        filter.add_directive(tracing::Level::DEBUG.into())
    } else {
        filter
    }
}

fn apply_overrides(cli: &Cli, mut config: Config) -> Config {
    if let Some(retries) = cli.retries {
        config.deploy_retries = retries;
    }
    if let Some(retries) = cli.convergence_retries {
        config.convergence_retries = retries;
    }
    if let Some(dir) = &cli.report_dir {
        config.report_dir = dir.clone();
    }
    config
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = apply_overrides(&cli, load_config(cli.config.as_deref())?);

    match cli.command {
        Some(Commands::Status { monitor, agent }) => {
            status::execute(&monitor, agent.as_deref(), &config)
        }
        Some(Commands::Agent { name, ping }) => agent::execute(&name, ping, &config),
        Some(Commands::Doctor) => doctor::execute(&config),
        None => deploy::execute(cli.list, &config),
    }
}
