mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "safetorun")]
#[command(about = "Manage Safetorun organisations and applications declaratively", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Manifest file (defaults to safetorun.yaml discovery)
    #[arg(short, long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what apply would change
    Plan,
    /// Create, update and delete resources to match the manifest
    Apply {
        /// Apply without stopping at the plan
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete every resource recorded in state
    Destroy {
        /// Destroy without stopping at the plan
        #[arg(short, long)]
        yes: bool,
    },
    /// Bring an existing resource under management
    Import {
        /// Resource type (safetorun_organisation, safetorun_application)
        resource_type: String,
        /// Local resource name
        name: String,
        /// Remote id (`<org>` or `<org>/<application>`)
        id: String,
    },
    /// Re-read every recorded resource
    Refresh,
    /// Print an organisation's provisioning status
    Status {
        /// Organisation id
        organisation_id: String,
    },
    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Version needs neither manifest nor settings
    if matches!(cli.command, Commands::Version) {
        println!("safetorun {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if let Commands::Status { organisation_id } = &cli.command {
        let provider = commands::build_provider()?;
        return commands::status::handle(&provider, organisation_id).await;
    }

    let project = commands::Project::load(cli.manifest.as_deref())?;
    let provider = commands::build_provider()?;

    match cli.command {
        Commands::Plan => commands::plan::handle(&project, &provider).await?,
        Commands::Apply { yes } => commands::apply::handle(&project, &provider, yes).await?,
        Commands::Destroy { yes } => commands::destroy::handle(&project, &provider, yes).await?,
        Commands::Import {
            resource_type,
            name,
            id,
        } => commands::import::handle(&project, &provider, &resource_type, &name, &id).await?,
        Commands::Refresh => commands::refresh::handle(&project, &provider).await?,
        Commands::Status { .. } | Commands::Version => {
            unreachable!("handled before the manifest is loaded")
        }
    }

    Ok(())
}
