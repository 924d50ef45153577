use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;
mod logging;
mod manifest_toml;
mod workspace;

use commands::ExitStatus;

#[derive(Parser)]
#[command(author, version, about, name = "corral")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use verbose (debug-level) logging.
    #[arg(global = true, long, short)]
    verbose: bool,

    /// Directory holding `corral.toml`; defaults to the current directory.
    #[arg(global = true, long, value_name = "DIR")]
    root: Option<PathBuf>,

    /// Override the cache directory (`CORRAL_CACHE_DIR` does the same).
    #[arg(global = true, long, env = "CORRAL_CACHE_DIR")]
    cache_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a skeleton `corral.toml` naming this project's own import path.
    Init {
        /// The project's own import path, e.g. `example.com/widget`.
        import_path: String,
    },
    /// Resolve every dependency and write `corral.lock`.
    Ensure {
        /// Prefer older versions instead of the default newest-match policy.
        #[arg(long)]
        downgrade: bool,
    },
    /// Compare the workspace's current memo digest against `corral.lock`.
    Status,
    /// Print the recorded constraint and override for one import path.
    Require {
        import_path: String,
    },
    /// Print the workspace's current memo digest.
    HashInputs,
}

async fn inner() -> anyhow::Result<ExitStatus> {
    let cli = Cli::parse();
    logging::setup(cli.verbose);

    let root_dir = match cli.root {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { import_path } => commands::init(&root_dir, &import_path),
        Commands::Ensure { downgrade } => commands::ensure(&root_dir, cli.cache_dir, downgrade).await,
        Commands::Status => commands::status(&root_dir),
        Commands::Require { import_path } => commands::require(&root_dir, &import_path),
        Commands::HashInputs => commands::hash_inputs(&root_dir),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match inner().await {
        Ok(status) => status.into(),
        Err(err) => {
            let mut causes = err.chain();
            eprintln!("error: {}", causes.next().unwrap());
            for cause in causes {
                eprintln!("  caused by: {cause}");
            }
            ExitStatus::IoFailure.into()
        }
    }
}
