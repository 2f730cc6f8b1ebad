//! Read-path row model for the recent-products table.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use shared::{
    domain::{ProductId, ProductStatus},
    protocol::ProductSummary,
};

use crate::status_store::ItemView;

pub const HEADINGS: [&str; 4] = ["Title", "Price", "Published Date", "Status"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub published: String,
    pub status: ProductStatus,
    pub pending: bool,
}

impl ProductRow {
    /// The status control stays disabled while a change is in flight.
    pub fn control_enabled(&self) -> bool {
        !self.pending
    }
}

pub fn format_price(price: Option<&str>) -> String {
    match price.map(str::trim) {
        Some(price) if !price.is_empty() => format!("${price}"),
        _ => "N/A".to_string(),
    }
}

pub fn format_published(created_at: &DateTime<Utc>) -> String {
    created_at.format("%Y-%m-%d").to_string()
}

/// Joins the loaded products with the current status snapshot. Products the
/// snapshot does not know keep their loaded status.
pub fn build_rows(products: &[ProductSummary], snapshot: &[ItemView]) -> Vec<ProductRow> {
    let views: HashMap<&ProductId, &ItemView> = snapshot.iter().map(|v| (&v.id, v)).collect();
    products
        .iter()
        .map(|product| {
            let view = views.get(&product.id);
            ProductRow {
                id: product.id.clone(),
                title: product.title.clone(),
                price: format_price(product.price.as_deref()),
                published: format_published(&product.created_at),
                status: view.map(|v| v.display_status).unwrap_or(product.status),
                pending: view.map(|v| v.pending).unwrap_or(false),
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
