use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod cart;
mod checkout;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Order administration against the hosted backend
    Orders {
        #[command(subcommand)]
        command: orders::OrdersCommands,
    },
    /// Offline cart pricing
    Cart {
        #[command(subcommand)]
        command: cart::CartCommands,
    },
    /// Place an order from catalog, selection and renter detail files
    Checkout {
        /// Catalog JSON (array of catalog items)
        catalog: PathBuf,
        /// Selections JSON (array of cart selections)
        selections: PathBuf,
        /// Renter details, payment choice and document paths
        details: PathBuf,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Cart { command }) => {
            init_tracing("info")?;
            match command {
                cart::CartCommands::Menu { catalog, currency } => {
                    cart::run_menu(&catalog, &currency)?;
                }
                cart::CartCommands::Quote {
                    catalog,
                    selections,
                    currency,
                } => cart::run_quote(&catalog, &selections, &currency)?,
            }
        }
        Some(Commands::Orders { command }) => {
            let config = storefront_core::load_app_config_from_env()?;
            init_tracing(&config.log_level)?;
            orders::run(&config, command).await?;
        }
        Some(Commands::Checkout {
            catalog,
            selections,
            details,
        }) => {
            let config = storefront_core::load_app_config_from_env()?;
            init_tracing(&config.log_level)?;
            checkout::run_checkout(&config, &catalog, &selections, &details).await?;
        }
        None => println!("storefront-cli: pass --help for available commands"),
    }

    Ok(())
}
