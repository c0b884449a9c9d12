//! warehouse-gate - role and warehouse authorization gateway

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use warehouse_gate::Config;
use warehouse_gate::auth::rbac::RbacSystem;
use warehouse_gate::server;
use warehouse_gate::storage::InMemoryStore;
use warehouse_gate::utils::logging::init_tracing;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "warehouse-gate", version, about)]
struct Args {
    /// Configuration file; environment variables are used when absent
    #[arg(short, long, env = "WAREHOUSE_GATE_CONFIG")]
    config: Option<PathBuf>,

    /// Run database migrations before serving
    #[arg(long)]
    migrate: bool,

    /// Print the generated storage-level policies and exit
    #[arg(long)]
    print_policies: bool,
}

async fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .await
            .with_context(|| format!("loading {}", path.display()))?,
        None => Config::from_env().context("loading configuration from environment")?,
    };
    Ok(config)
}

fn policies(config: &Config) -> anyhow::Result<String> {
    let rbac = RbacSystem::new(config.rbac(), std::sync::Arc::new(InMemoryStore::new()))?;
    Ok(rbac.policy_set()?.render())
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = load_config(args.config.as_ref()).await?;
    init_tracing(config.logging())?;

    if args.print_policies {
        println!("{}", policies(&config)?);
        return Ok(());
    }

    server::run_server(config, args.migrate).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
