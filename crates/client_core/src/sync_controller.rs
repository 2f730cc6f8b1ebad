//! Drives one status change end to end: optimistic apply, remote call,
//! then commit or rollback plus exactly one notification.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{ProductId, ProductStatus},
    protocol::StatusUpdateOutcome,
};
use tracing::{info, warn};

use crate::{
    error::StatusError,
    notifier::{Notification, Notifier},
    status_store::{ItemView, StatusStore, TrackedItem},
    CatalogService,
};

const ABANDONED_REASON: &str = "request was abandoned before the server answered";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    Rejected { messages: Vec<String> },
    Transport { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    Committed {
        status: ProductStatus,
    },
    RolledBack {
        restored: ProductStatus,
        reason: FailureReason,
    },
}

pub struct SyncController {
    store: Mutex<StatusStore>,
    catalog: Arc<dyn CatalogService>,
    notifier: Arc<dyn Notifier>,
}

impl SyncController {
    pub fn new(
        store: StatusStore,
        catalog: Arc<dyn CatalogService>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            catalog,
            notifier,
        }
    }

    pub fn snapshot(&self) -> Vec<ItemView> {
        self.lock_store().snapshot()
    }

    pub fn item(&self, id: &ProductId) -> Option<TrackedItem> {
        self.lock_store().get(id).cloned()
    }

    pub fn is_pending(&self, id: &ProductId) -> Result<bool, StatusError> {
        self.lock_store().is_pending(id)
    }

    /// Requests `status` for `id`.
    ///
    /// Fails with [`StatusError::AlreadyPending`] while an earlier request for
    /// the same product is unresolved, and with [`StatusError::UnknownItem`]
    /// for ids the store does not track; neither case touches the remote
    /// service or notifies. Every remote failure is recovered here and
    /// reported as [`ChangeOutcome::RolledBack`].
    pub async fn request_change(
        &self,
        id: &ProductId,
        status: ProductStatus,
    ) -> Result<ChangeOutcome, StatusError> {
        let previous = {
            let mut store = self.lock_store();
            if store.is_pending(id)? {
                return Err(StatusError::AlreadyPending(id.clone()));
            }
            store.optimistic_set(id, status)?
        };

        let in_flight = InFlight {
            controller: self,
            id,
            previous,
            armed: true,
        };
        let outcome = self.catalog.update_status(id, status).await;
        Ok(in_flight.resolve(status, outcome))
    }

    fn lock_store(&self) -> MutexGuard<'_, StatusStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(&self, id: &ProductId, commit: bool) {
        let mut store = self.lock_store();
        let settled = if commit {
            store.commit(id)
        } else {
            store.rollback(id)
        };
        if let Err(err) = settled {
            warn!(product_id = %id, error = %err, "item vanished while in flight");
        }
    }
}

/// Guarantees the pending flag is cleared even if the request future is
/// dropped or unwinds before the remote call answers.
struct InFlight<'a> {
    controller: &'a SyncController,
    id: &'a ProductId,
    previous: ProductStatus,
    armed: bool,
}

impl InFlight<'_> {
    fn resolve(
        mut self,
        requested: ProductStatus,
        outcome: StatusUpdateOutcome,
    ) -> ChangeOutcome {
        self.armed = false;
        let controller = self.controller;
        let id = self.id;

        match outcome {
            StatusUpdateOutcome::Ok { confirmed_status } => {
                if confirmed_status != requested {
                    warn!(
                        product_id = %id,
                        requested = requested.as_graphql(),
                        reported = confirmed_status.as_graphql(),
                        "server reported a different status than requested"
                    );
                }
                controller.settle(id, true);
                info!(product_id = %id, status = requested.as_graphql(), "status change committed");
                controller.notifier.show(&Notification::success());
                ChangeOutcome::Committed { status: requested }
            }
            StatusUpdateOutcome::ValidationFailed { messages } => {
                controller.settle(id, false);
                warn!(product_id = %id, ?messages, "status change rejected; rolled back");
                controller.notifier.show(&Notification::rejected(&messages));
                ChangeOutcome::RolledBack {
                    restored: self.previous,
                    reason: FailureReason::Rejected { messages },
                }
            }
            StatusUpdateOutcome::TransportFailed { reason } => {
                controller.settle(id, false);
                warn!(product_id = %id, %reason, "status change failed in transport; rolled back");
                controller
                    .notifier
                    .show(&Notification::transport_failed(&reason));
                ChangeOutcome::RolledBack {
                    restored: self.previous,
                    reason: FailureReason::Transport { reason },
                }
            }
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        self.controller.settle(self.id, false);
        warn!(product_id = %self.id, "status change abandoned; rolled back");
        self.controller
            .notifier
            .show(&Notification::transport_failed(ABANDONED_REASON));
    }
}

#[cfg(test)]
#[path = "tests/sync_controller_tests.rs"]
mod tests;
