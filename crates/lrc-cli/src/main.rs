use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use lrc_reconcile::AccountCheckMode;

mod commands;

#[derive(Parser)]
#[command(name = "lrc")]
#[command(about = "Lending protocol reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order (base -> env -> local)
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Compare subgraph market figures with the contracts at one block
    Markets {
        #[command(flatten)]
        run: RunArgs,

        /// Bisect for the first failing block when the probed block has errors
        #[arg(long, default_value_t = false)]
        bisect: bool,
    },

    /// Compare every subgraph account balance with its contract snapshot
    Accounts {
        #[command(flatten)]
        run: RunArgs,

        /// What counts as an error: count | values
        #[arg(long, default_value = "count")]
        mode: AccountCheckMode,

        /// Bisect for the first failing block when the probed block has errors
        #[arg(long, default_value_t = false)]
        bisect: bool,
    },

    /// Diff subgraph and partner API account sets, arbitrated by the contracts
    CompareSources {
        #[command(flatten)]
        run: RunArgs,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Layered config paths in merge order
    #[arg(long = "config", required = true, num_args = 1..)]
    config_paths: Vec<String>,

    /// Block to analyse. Defaults to bisection.known_bad_block.
    #[arg(long)]
    block: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // dev-time convenience; absent file is fine
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let path_refs: Vec<&str> = paths.iter().map(|s| s.as_str()).collect();
            let loaded = lrc_config::load_layered_yaml(&path_refs)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::Markets { run, bisect } => {
            commands::markets(&run.config_paths, run.block, bisect).await?;
        }

        Commands::Accounts { run, mode, bisect } => {
            commands::accounts(&run.config_paths, run.block, mode, bisect).await?;
        }

        Commands::CompareSources { run } => {
            commands::compare_sources(&run.config_paths, run.block).await?;
        }
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the `key=value` results.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
