//! hgsync CLI - Command line interface for hgsync
//!
//! Clones or updates a Mercurial working copy and reports what changed.

mod commands;

use clap::{Parser, Subcommand};
use hgsync_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::SyncArgs;

/// hgsync: keep a Mercurial working copy in step with its source
#[derive(Parser, Debug)]
#[command(name = "hgsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to hg executable (overrides config and env)
    #[arg(long, global = true, env = "HGSYNC_HG_PATH")]
    executable: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Clone or update a working copy
    #[command(visible_alias = "s")]
    Sync(SyncArgs),

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean result
    let default_filter = if cli.verbose {
        "hgsync=debug,hgsync_core=debug"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let (force, purge) = cleanup_overrides(&cli);
    let config = Config::load_with_overrides(cli.executable.clone(), force, purge)?;

    if cli.verbose {
        tracing::info!(
            executable = %config.hg.executable,
            force = config.defaults.force,
            purge = config.defaults.purge,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("hgsync {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Sync(args)) => {
            if !args.execute(cli.verbose, &config)? {
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            println!("hgsync Configuration");
            println!("====================");
            println!();
            println!("hg Settings:");
            println!("  executable: {}", config.hg.executable);
            println!();
            println!("Defaults:");
            println!("  force: {}", config.defaults.force);
            println!("  purge: {}", config.defaults.purge);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("hgsync - Clone or update Mercurial working copies");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}

/// `--force`/`--purge` given on the sync command line, if any
fn cleanup_overrides(cli: &Cli) -> (Option<bool>, Option<bool>) {
    match &cli.command {
        Some(Commands::Sync(args)) => (args.force, args.purge),
        _ => (None, None),
    }
}
