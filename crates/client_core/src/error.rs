use shared::domain::ProductId;
use thiserror::Error;

/// Local guard violations. These are caller bugs, never remote failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatusError {
    #[error("product {0} is not tracked by this store")]
    UnknownItem(ProductId),
    /// A change for this product is already in flight.
    #[error("a status change for product {0} is already in flight")]
    AlreadyPending(ProductId),
}
