//! IPAM reconciliation CLI (ipamctl)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use ipam_store::{GraphQlStore, IpamStore};
use ipamctl::commands::{HierarchyCommand, PopulateCommand, StatusCommand};
use ipamctl::config::CliConfig;

#[derive(Parser)]
#[command(name = "ipamctl")]
#[command(about = "IPAM reconciliation CLI")]
#[command(version)]
#[command(long_about = "
IPAM reconciliation CLI

This tool keeps an IPAM store in step with the live network: it populates
prefixes, subnets and IP addresses from a device inventory, ping sweeps and
routing-table dumps, and maintains the subnet parent/child hierarchy.

Examples:
  ipamctl status                            # Show store summary
  ipamctl status --detailed                 # List prefixes, subnets and IPs
  ipamctl populate                          # Populate from the inventory
  ipamctl populate --scan                   # Also ping-sweep known networks
  ipamctl populate --routing-tables r1.txt  # Also ingest routing dumps
  ipamctl hierarchy setup                   # Roles, links and IP relinking
  ipamctl hierarchy reset                   # Clear all parent links
")]
struct Cli {
    /// Enable verbose output
    #[arg(short = 'V', long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Configuration file (defaults to ipamctl.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store status
    Status {
        /// List prefixes, subnets and IPs instead of the summary
        #[arg(long)]
        detailed: bool,
    },

    /// Populate the store from inventory, scans and routing tables
    Populate {
        /// Ping-sweep every /24 implied by the known hosts
        #[arg(long)]
        scan: bool,

        /// Concurrent probes during a scan
        #[arg(short, long, default_value_t = 50)]
        workers: usize,

        /// Routing-table dump files to ingest
        #[arg(long, num_args = 0.., value_name = "FILE")]
        routing_tables: Vec<PathBuf>,
    },

    /// Maintain the subnet parent/child hierarchy
    Hierarchy {
        #[command(subcommand)]
        command: HierarchyCommands,
    },
}

#[derive(Subcommand)]
enum HierarchyCommands {
    /// Show hierarchy status
    Status,
    /// Run roles, links and IP relinking in one pass
    Setup,
    /// Correct subnet roles from prefix lengths
    Types,
    /// Attach child subnets to their parents
    Subnets,
    /// Point IPs at their most specific subnet
    Ips,
    /// Clear all parent links
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = run(&cli).await;

    // Handle errors with appropriate exit codes
    match result {
        Ok(()) => {
            if !cli.quiet {
                log::info!("Command completed successfully");
            }
            std::process::exit(0);
        }
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {}", e);

                // Print error chain if in verbose mode
                if cli.verbose || cli.debug {
                    let mut source = e.source();
                    while let Some(err) = source {
                        eprintln!("  Caused by: {}", err);
                        source = err.source();
                    }
                }
            }
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let store: Arc<dyn IpamStore> = Arc::new(GraphQlStore::new(&config.store_config())?);

    match &cli.command {
        Commands::Status { detailed } => {
            let cmd = StatusCommand::new(store);
            cmd.execute(*detailed).await
        }

        Commands::Populate {
            scan,
            workers,
            routing_tables,
        } => {
            let cmd = PopulateCommand::new(store, config);
            cmd.execute(*scan, *workers, routing_tables).await
        }

        Commands::Hierarchy { command } => {
            let cmd = HierarchyCommand::new(store);
            match command {
                HierarchyCommands::Status => cmd.status().await,
                HierarchyCommands::Setup => cmd.setup().await,
                HierarchyCommands::Types => cmd.types().await,
                HierarchyCommands::Subnets => cmd.subnets().await,
                HierarchyCommands::Ips => cmd.ips().await,
                HierarchyCommands::Reset => cmd.reset().await,
            }
        }
    }
}
