//! Order administration: listing, status changes, and a live view driven by
//! change notifications.

use std::pin::Pin;

use clap::Subcommand;
use futures::Stream;
use storefront_core::{display_amount, AppConfig, OrderWithItems};
use storefront_store::{run_refetch_loop, ChangeEvent, StoreClient};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

#[derive(Debug, Subcommand)]
pub enum OrdersCommands {
    /// List orders, newest first
    List {
        /// Only show orders with this status
        #[arg(long)]
        status: Option<String>,
    },
    /// Change an order's status
    SetStatus {
        /// Order id
        id: String,
        /// New status (e.g. confirmed, completed, cancelled)
        status: String,
    },
    /// Reprint the order list whenever a change event arrives on stdin
    /// (one JSON object per line, e.g. `{"table":"orders"}`)
    Watch,
}

pub(crate) fn format_order_row(entry: &OrderWithItems, currency: &str) -> String {
    let order = &entry.order;
    let items: u32 = entry.order_items.iter().map(|i| i.quantity).sum();
    format!(
        "#{}  {}  {:<10} {:<8} {:<20} {currency}{:>10}  {items} item(s)",
        order.order_code(),
        order.created_at.format("%Y-%m-%d %H:%M"),
        order.status,
        order.service_type.label(),
        order.customer_name,
        display_amount(order.total),
    )
}

fn print_orders(orders: &[OrderWithItems], status: Option<&str>, currency: &str) {
    let shown: Vec<&OrderWithItems> = orders
        .iter()
        .filter(|o| status.is_none_or(|s| o.order.status.eq_ignore_ascii_case(s)))
        .collect();
    if shown.is_empty() {
        println!("No orders.");
        return;
    }
    for entry in shown {
        println!("{}", format_order_row(entry, currency));
    }
}

/// Newline-delimited change events from stdin. Malformed lines are skipped.
fn stdin_events() -> Pin<Box<dyn Stream<Item = ChangeEvent> + Send>> {
    let lines = BufReader::new(tokio::io::stdin()).lines();
    Box::pin(futures::stream::unfold(lines, |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match serde_json::from_str::<ChangeEvent>(&line) {
                    Ok(event) => return Some((event, lines)),
                    Err(e) => tracing::warn!(error = %e, "skipping malformed change event"),
                },
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!(error = %e, "failed to read change events");
                    return None;
                }
            }
        }
    }))
}

async fn watch_orders(client: &StoreClient, currency: String) -> anyhow::Result<()> {
    let (tx, mut rx) = watch::channel(Vec::new());
    let printer = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let orders = rx.borrow_and_update().clone();
            println!("--- {} order(s) ---", orders.len());
            print_orders(&orders, None, &currency);
        }
    });

    let loads = run_refetch_loop(client, stdin_events(), tx).await;
    printer.await?;
    tracing::info!(loads, "change stream closed");
    Ok(())
}

pub(crate) async fn run(config: &AppConfig, command: OrdersCommands) -> anyhow::Result<()> {
    let client = StoreClient::new(config)?;
    match command {
        OrdersCommands::List { status } => {
            let orders = client.fetch_orders().await?;
            print_orders(&orders, status.as_deref(), &config.currency_symbol);
        }
        OrdersCommands::SetStatus { id, status } => {
            let orders = client.update_order_status(&id, &status).await?;
            print_orders(&orders, None, &config.currency_symbol);
        }
        OrdersCommands::Watch => watch_orders(&client, config.currency_symbol.clone()).await?,
    }
    Ok(())
}
