//! In-memory view of every tracked product's status.
//!
//! The store is the only place that mutates an item's status fields. It keeps
//! two values per item: the status shown to the operator, which may be
//! optimistic, and the last status the remote system acknowledged. The latter
//! is the rollback target and only moves on [`StatusStore::commit`].

use std::collections::HashMap;

use shared::{
    domain::{ProductId, ProductStatus},
    protocol::ProductSummary,
};
use tracing::{debug, warn};

use crate::error::StatusError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedItem {
    pub id: ProductId,
    pub display_status: ProductStatus,
    pub confirmed_status: ProductStatus,
    pub pending: bool,
}

/// What a renderer needs for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: ProductId,
    pub display_status: ProductStatus,
    pub pending: bool,
}

#[derive(Debug, Default)]
pub struct StatusStore {
    items: Vec<TrackedItem>,
    index: HashMap<ProductId, usize>,
}

impl StatusStore {
    /// Builds a store from `(id, confirmed status)` pairs, keeping load order.
    /// A repeated id keeps its first entry.
    pub fn new(entries: impl IntoIterator<Item = (ProductId, ProductStatus)>) -> Self {
        let mut store = Self::default();
        for (id, status) in entries {
            if store.index.contains_key(&id) {
                warn!(product_id = %id, "ignoring duplicate product id");
                continue;
            }
            store.index.insert(id.clone(), store.items.len());
            store.items.push(TrackedItem {
                id,
                display_status: status,
                confirmed_status: status,
                pending: false,
            });
        }
        store
    }

    pub fn from_products(products: &[ProductSummary]) -> Self {
        Self::new(products.iter().map(|p| (p.id.clone(), p.status)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ProductId) -> Option<&TrackedItem> {
        self.index.get(id).map(|&slot| &self.items[slot])
    }

    pub fn is_pending(&self, id: &ProductId) -> Result<bool, StatusError> {
        Ok(self.item(id)?.pending)
    }

    /// Shows `status` immediately and marks the item in flight. The confirmed
    /// status is left alone and returned as the rollback target.
    pub fn optimistic_set(
        &mut self,
        id: &ProductId,
        status: ProductStatus,
    ) -> Result<ProductStatus, StatusError> {
        let item = self.item_mut(id)?;
        if item.pending {
            return Err(StatusError::AlreadyPending(id.clone()));
        }
        item.display_status = status;
        item.pending = true;
        debug!(product_id = %id, status = status.as_graphql(), "applied optimistic status");
        Ok(item.confirmed_status)
    }

    /// Accepts the displayed status as confirmed. No-op unless pending.
    pub fn commit(&mut self, id: &ProductId) -> Result<(), StatusError> {
        let item = self.item_mut(id)?;
        if !item.pending {
            return Ok(());
        }
        item.confirmed_status = item.display_status;
        item.pending = false;
        Ok(())
    }

    /// Restores the last confirmed status. No-op unless pending.
    pub fn rollback(&mut self, id: &ProductId) -> Result<(), StatusError> {
        let item = self.item_mut(id)?;
        if !item.pending {
            return Ok(());
        }
        item.display_status = item.confirmed_status;
        item.pending = false;
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<ItemView> {
        self.items
            .iter()
            .map(|item| ItemView {
                id: item.id.clone(),
                display_status: item.display_status,
                pending: item.pending,
            })
            .collect()
    }

    fn item(&self, id: &ProductId) -> Result<&TrackedItem, StatusError> {
        self.get(id)
            .ok_or_else(|| StatusError::UnknownItem(id.clone()))
    }

    fn item_mut(&mut self, id: &ProductId) -> Result<&mut TrackedItem, StatusError> {
        match self.index.get(id) {
            Some(&slot) => Ok(&mut self.items[slot]),
            None => Err(StatusError::UnknownItem(id.clone())),
        }
    }
}

#[cfg(test)]
#[path = "tests/status_store_tests.rs"]
mod tests;
