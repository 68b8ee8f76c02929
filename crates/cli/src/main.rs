//! RocketShoes CLI - drive the cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rs-cli show
//!
//! # Add one unit of product 3
//! rs-cli add 3
//!
//! # Set product 3 to 2 units (checked against stock)
//! rs-cli update 3 2
//!
//! # Remove product 3
//! rs-cli remove 3
//! ```
//!
//! Configuration comes from the environment, see `rocketshoes_cart::config`.
//! The cart listing goes to stdout; notifications and logs go to stderr. The
//! command exits with status 1 if the operation produced a notification.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cli")]
#[command(author, version, about = "RocketShoes cart CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        product_id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product ID
        product_id: ProductId,

        /// New amount (non-positive amounts are ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i32,
    },
}

#[tokio::main]
async fn main() {
    let config = match rocketshoes_cart::CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt().with_writer(std::io::stderr).init();
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let _sentry_guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "rs_cli=info,rocketshoes_cart=warn".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(sentry_tracing::layer())
        .init();

    let cli = Cli::parse();

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    match commands::run(&config, cli.command, &mut stdout, &mut stderr).await {
        Ok(commands::Outcome::Clean) => {}
        Ok(commands::Outcome::Notified) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(1);
        }
    }
}
