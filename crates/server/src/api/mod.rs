//! Gateway operations, independent of the HTTP layer.

use std::sync::Arc;

use admin_api::{AdminApiClient, AdminApiError};
use async_trait::async_trait;
use shared::{
    domain::{ProductId, ProductStatus},
    error::{ApiError, ErrorCode},
    protocol::{
        GraphqlResponse, ProductListResponse, ProductSummary, ProductUpdateData,
        UpdateStatusRequest,
    },
};
use tracing::{info, warn};

pub const DEFAULT_PRODUCT_LIMIT: u32 = 10;
pub const MAX_PRODUCT_LIMIT: u32 = 250;

/// Upstream catalog as the gateway needs it.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn recent_products(&self, limit: u32) -> Result<Vec<ProductSummary>, AdminApiError>;
    async fn set_product_status(
        &self,
        product_id: &ProductId,
        status: ProductStatus,
    ) -> Result<GraphqlResponse<ProductUpdateData>, AdminApiError>;
}

#[async_trait]
impl ProductCatalog for AdminApiClient {
    async fn recent_products(&self, limit: u32) -> Result<Vec<ProductSummary>, AdminApiError> {
        self.list_recent_products(limit).await
    }

    async fn set_product_status(
        &self,
        product_id: &ProductId,
        status: ProductStatus,
    ) -> Result<GraphqlResponse<ProductUpdateData>, AdminApiError> {
        self.update_product_status(product_id, status).await
    }
}

#[derive(Clone)]
pub struct ApiContext {
    pub catalog: Arc<dyn ProductCatalog>,
}

pub fn clamp_limit(limit: Option<u32>) -> u32 {
    limit
        .unwrap_or(DEFAULT_PRODUCT_LIMIT)
        .clamp(1, MAX_PRODUCT_LIMIT)
}

pub async fn list_products(
    ctx: &ApiContext,
    limit: Option<u32>,
) -> Result<ProductListResponse, ApiError> {
    let limit = clamp_limit(limit);
    let products = ctx
        .catalog
        .recent_products(limit)
        .await
        .map_err(upstream)?;
    Ok(ProductListResponse { products })
}

/// Forwards a status change. The mutation envelope is returned verbatim so
/// user errors reach the caller as data.
pub async fn update_product_status(
    ctx: &ApiContext,
    req: UpdateStatusRequest,
) -> Result<GraphqlResponse<ProductUpdateData>, ApiError> {
    let response = ctx
        .catalog
        .set_product_status(&req.product_id, req.status)
        .await
        .map_err(upstream)?;
    info!(product_id = %req.product_id, status = req.status.as_graphql(), "forwarded product status update");
    Ok(response)
}

fn upstream(err: AdminApiError) -> ApiError {
    warn!(error = %err, "admin api call failed");
    let code = if err.is_unauthorized() {
        ErrorCode::Unauthorized
    } else {
        ErrorCode::Upstream
    };
    ApiError::new(code, err.to_string())
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
pub(crate) mod tests;
