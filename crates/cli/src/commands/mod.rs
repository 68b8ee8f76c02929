//! Cart commands.
//!
//! Each command opens the store from configuration, runs one operation,
//! writes any notifications it produced to stderr and then the resulting cart
//! to stdout.

use std::io::Write;

use rocketshoes_cart::{
    CartConfig, CartError, CartStore, ChannelNotifier, Notification, UpdateProductAmount,
};
use rocketshoes_core::Cart;
use thiserror::Error;

use crate::Commands;

/// Errors that prevent a command from running at all.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Failed to open cart: {0}")]
    Open(#[from] CartError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation produced no notifications.
    Clean,
    /// The operation reported at least one notification to the shopper.
    Notified,
}

/// Run a command against the configured cart.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the output cannot be
/// written.
pub async fn run(
    config: &CartConfig,
    command: Commands,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<Outcome, CommandError> {
    let (notifier, mut notifications) = ChannelNotifier::channel();
    let store = CartStore::from_config(config, notifier)?;

    match command {
        Commands::Show => {}
        Commands::Add { product_id } => store.add_product(product_id).await,
        Commands::Remove { product_id } => store.remove_product(product_id),
        Commands::Update { product_id, amount } => {
            store
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await;
        }
    }

    let mut pending = Vec::new();
    while let Ok(notification) = notifications.try_recv() {
        pending.push(notification);
    }

    Ok(write_report(&pending, &store.cart(), out, err)?)
}

/// Write notifications to `err` and the cart listing to `out`.
///
/// # Errors
///
/// Returns an error if either writer fails.
pub fn write_report(
    notifications: &[Notification],
    cart: &Cart,
    out: &mut impl Write,
    err: &mut impl Write,
) -> std::io::Result<Outcome> {
    for notification in notifications {
        writeln!(err, "{notification}")?;
    }

    for line in render_cart(cart) {
        writeln!(out, "{line}")?;
    }

    Ok(if notifications.is_empty() {
        Outcome::Clean
    } else {
        Outcome::Notified
    })
}

/// Format the cart as display lines, one per product plus a summary.
pub fn render_cart(cart: &Cart) -> Vec<String> {
    if cart.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines: Vec<String> = cart
        .iter()
        .map(|product| {
            format!(
                "#{:<4} {:>3} x R$ {:>8.2}  {}",
                product.id, product.amount, product.price, product.title
            )
        })
        .collect();

    lines.push(format!(
        "{} product(s), {} item(s)",
        cart.len(),
        cart.total_items()
    ));
    lines
}
