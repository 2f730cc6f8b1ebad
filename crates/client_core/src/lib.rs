use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{ProductId, ProductStatus},
    error::ApiError,
    protocol::{
        classify_product_update, GraphqlResponse, ListProductsQuery, ProductListResponse,
        ProductSummary, ProductUpdateData, StatusUpdateOutcome, UpdateStatusRequest,
    },
};
use tracing::debug;
use url::Url;

pub mod error;
pub mod notifier;
pub mod status_store;
pub mod sync_controller;
pub mod table;

pub use error::StatusError;
pub use notifier::{Notification, NotificationKind, Notifier, TracingNotifier};
pub use status_store::{ItemView, StatusStore, TrackedItem};
pub use sync_controller::{ChangeOutcome, FailureReason, SyncController};

/// Remote system of record for catalog products.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn list_recent(&self, limit: u32) -> Result<Vec<ProductSummary>>;

    /// Single attempt, never retried. Every failure is folded into the
    /// returned outcome.
    async fn update_status(&self, id: &ProductId, status: ProductStatus) -> StatusUpdateOutcome;
}

/// [`CatalogService`] backed by the catalog gateway's HTTP routes.
pub struct GatewayCatalogService {
    http: Client,
    base_url: Url,
}

impl GatewayCatalogService {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid gateway url '{base_url}'"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: Client::new(),
            base_url,
        })
    }

    fn route(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build gateway route '{path}'"))
    }

    async fn send_update(
        &self,
        id: &ProductId,
        status: ProductStatus,
    ) -> std::result::Result<GraphqlResponse<ProductUpdateData>, String> {
        let url = self
            .route("update-product-status")
            .map_err(|e| format!("{e:#}"))?;
        let res = self
            .http
            .post(url)
            .json(&UpdateStatusRequest {
                product_id: id.clone(),
                status,
            })
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let code = res.status();
        if !code.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(match serde_json::from_str::<ApiError>(&body) {
                Ok(api_error) => api_error.message,
                Err(_) => format!("gateway responded with {code}"),
            });
        }

        res.json()
            .await
            .map_err(|e| format!("invalid gateway response: {e}"))
    }
}

#[async_trait]
impl CatalogService for GatewayCatalogService {
    async fn list_recent(&self, limit: u32) -> Result<Vec<ProductSummary>> {
        let res = self
            .http
            .get(self.route("products")?)
            .query(&ListProductsQuery { limit: Some(limit) })
            .send()
            .await
            .context("failed to reach catalog gateway")?;

        let code = res.status();
        if !code.is_success() {
            let body = res.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            anyhow::bail!("listing products failed with {code}: {message}");
        }

        let body: ProductListResponse = res.json().await.context("invalid product list")?;
        Ok(body.products)
    }

    async fn update_status(&self, id: &ProductId, status: ProductStatus) -> StatusUpdateOutcome {
        debug!(product_id = %id, status = status.as_graphql(), "sending status update");
        match self.send_update(id, status).await {
            Ok(response) => classify_product_update(status, response),
            Err(reason) => StatusUpdateOutcome::TransportFailed { reason },
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
