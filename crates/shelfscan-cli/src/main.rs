mod auth;
mod inventory;
mod lookup;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::auth::AuthCommands;
use crate::inventory::InventoryCommands;

#[derive(Debug, Parser)]
#[command(name = "shelfscan")]
#[command(about = "Resolve scanned barcodes to products and track inventory")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve one scanned code (Ctrl-C cancels)
    Lookup {
        /// Raw scanner output; non-digits are ignored
        code: String,
    },
    /// Resolve codes read from stdin, one scan per line
    Scan,
    /// Print the identifiers a scanned code expands to
    Candidates { code: String },
    /// Manage a user's inventory
    Inventory {
        #[command(subcommand)]
        command: InventoryCommands,
    },
    /// Account operations against the auth server
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("shelfscan: run with --help to list commands");
        return Ok(());
    };

    // Expanding a code needs neither configuration nor a database.
    if let Commands::Candidates { code } = &command {
        lookup::run_candidates(code);
        return Ok(());
    }

    let config = shelfscan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Auth { command } = command {
        return auth::run_auth(&config, command).await;
    }

    let pool_config = shelfscan_db::PoolConfig::from_app_config(&config);
    let pool = shelfscan_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Lookup { code } => lookup::run_lookup(&pool, &config, &code).await,
        Commands::Scan => lookup::run_scan(&pool, &config).await,
        Commands::Inventory { command } => inventory::run_inventory(&pool, command).await,
        Commands::Db { command } => run_db(&pool, &command).await,
        Commands::Candidates { .. } | Commands::Auth { .. } => Ok(()),
    }
}

async fn run_db(pool: &sqlx::PgPool, command: &DbCommands) -> anyhow::Result<()> {
    match command {
        DbCommands::Ping => {
            shelfscan_db::ping(pool).await?;
            println!("database ok");
        }
        DbCommands::Migrate => {
            let applied = shelfscan_db::run_migrations(pool).await?;
            println!("applied {applied} migration(s)");
        }
    }
    Ok(())
}
