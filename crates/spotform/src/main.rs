mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spotform")]
#[command(version)]
#[command(about = "Reconcile Spot resource configurations against their remote objects", long_about = None)]
struct Cli {
    /// Log descriptor invocations at debug level (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Resource types with a field registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    /// elastigroup_aws_launch_configuration
    LaunchConfiguration,
    /// managed_instance_aws_integrations (Route53)
    Route53,
    /// ocean_gke_launch_spec with the strategy extension
    GkeLaunchSpec,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the create payload for a configuration
    Plan {
        #[arg(short, long, value_enum)]
        resource: ResourceKind,
        /// Configuration document (JSON or YAML); discovered when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the update diff between a configuration and recorded state
    Diff {
        #[arg(short, long, value_enum)]
        resource: ResourceKind,
        /// Configuration document (JSON or YAML)
        #[arg(short, long)]
        config: PathBuf,
        /// Observed state, as printed by `spotform read`
        #[arg(short, long)]
        state: Option<PathBuf>,
    },
    /// Flatten a remote API object into observed state
    Read {
        #[arg(short, long, value_enum)]
        resource: ResourceKind,
        /// Remote object as returned by the API (JSON)
        #[arg(long)]
        remote: PathBuf,
        /// Configuration to compare the observed state against
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the schema of a resource as JSON
    Schema {
        #[arg(short, long, value_enum)]
        resource: ResourceKind,
    },
}

impl Commands {
    fn resource(&self) -> ResourceKind {
        match self {
            Commands::Plan { resource, .. }
            | Commands::Diff { resource, .. }
            | Commands::Read { resource, .. }
            | Commands::Schema { resource } => *resource,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries JSON only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    tracing::debug!("resource: {:?}", cli.command.resource());
    match cli.command.resource() {
        ResourceKind::LaunchConfiguration => {
            commands::run(spotform_aws::launch_configuration::registry(), &cli.command)
        }
        ResourceKind::Route53 => commands::run(spotform_aws::route53::registry(), &cli.command),
        ResourceKind::GkeLaunchSpec => commands::run(spotform_gcp::registry(), &cli.command),
    }
}
