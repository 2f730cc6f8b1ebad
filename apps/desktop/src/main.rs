use std::{str::FromStr, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    table::{build_rows, ProductRow, HEADINGS},
    CatalogService, ChangeOutcome, GatewayCatalogService, Notification, NotificationKind,
    Notifier, StatusStore, SyncController,
};
use futures::future::join_all;
use shared::domain::{ProductId, ProductStatus};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Review recent catalog products and change their publication status")]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8787")]
    gateway_url: String,
    /// How many of the newest products to load.
    #[arg(long, default_value_t = 10)]
    limit: u32,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the latest products.
    List,
    /// Change statuses, e.g. `set gid://shopify/Product/1=active`.
    Set {
        #[arg(required = true)]
        changes: Vec<StatusChange>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StatusChange {
    product_id: ProductId,
    status: ProductStatus,
}

impl FromStr for StatusChange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, status) = s
            .rsplit_once('=')
            .ok_or_else(|| format!("expected <product-id>=<status>, got '{s}'"))?;
        let id = id.trim();
        if id.is_empty() {
            return Err(format!("missing product id in '{s}'"));
        }
        let status = status.parse::<ProductStatus>().map_err(|e| e.to_string())?;
        Ok(Self {
            product_id: ProductId::new(id),
            status,
        })
    }
}

struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn show(&self, notification: &Notification) {
        match notification.kind {
            NotificationKind::Success => println!("[ok] {notification}"),
            NotificationKind::Failure => eprintln!("[error] {notification}"),
        }
    }
}

fn render_table(rows: &[ProductRow]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|row| {
            let status = if row.pending {
                format!("{} (saving…)", row.status)
            } else {
                row.status.to_string()
            };
            [
                row.title.clone(),
                row.price.clone(),
                row.published.clone(),
                status,
            ]
        })
        .collect();

    let mut widths = HEADINGS.map(|h| h.chars().count());
    for line in &cells {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |columns: [&str; 4]| {
        let padded: Vec<String> = columns
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    };
    push_line(HEADINGS);
    for line in &cells {
        push_line([&line[0], &line[1], &line[2], &line[3]].map(String::as_str));
    }
    out
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();
    let args = Args::parse();

    let catalog = Arc::new(GatewayCatalogService::new(&args.gateway_url)?);
    let products = catalog
        .list_recent(args.limit)
        .await
        .context("failed to load recent products")?;
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }

    let controller = SyncController::new(
        StatusStore::from_products(&products),
        catalog,
        Arc::new(ConsoleNotifier),
    );

    match args.command {
        Command::List => {}
        Command::Set { changes } => {
            let requests = changes
                .iter()
                .map(|change| controller.request_change(&change.product_id, change.status));
            for (change, result) in changes.iter().zip(join_all(requests).await) {
                match result {
                    Ok(ChangeOutcome::Committed { .. }) => {}
                    Ok(ChangeOutcome::RolledBack { restored, .. }) => {
                        warn!(product_id = %change.product_id, %restored, "status kept");
                    }
                    Err(err) => eprintln!("[skipped] {err}"),
                }
            }
        }
    }

    print!("{}", render_table(&build_rows(&products, &controller.snapshot())));
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
