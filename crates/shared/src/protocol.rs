use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ProductId, ProductStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub status: ProductStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListProductsQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub product_id: ProductId,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest<'a, V> {
    pub query: &'a str,
    pub variables: V,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphqlError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdateData {
    #[serde(default)]
    pub product_update: Option<ProductUpdatePayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdatePayload {
    #[serde(default)]
    pub product: Option<UpdatedProduct>,
    #[serde(default)]
    pub user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatedProduct {
    pub id: ProductId,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Vec<String>>,
    pub message: String,
}

/// Result of one remote status change, as seen by the sync core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdateOutcome {
    Ok { confirmed_status: ProductStatus },
    ValidationFailed { messages: Vec<String> },
    TransportFailed { reason: String },
}

/// Interprets a completed `productUpdate` response.
///
/// User errors win over top-level GraphQL errors; both keep their order. A
/// response without errors is a success even when the product node is
/// missing, in which case the requested status is taken as confirmed.
pub fn classify_product_update(
    requested: ProductStatus,
    response: GraphqlResponse<ProductUpdateData>,
) -> StatusUpdateOutcome {
    let payload = response.data.and_then(|data| data.product_update);

    if let Some(payload) = &payload {
        if !payload.user_errors.is_empty() {
            return StatusUpdateOutcome::ValidationFailed {
                messages: payload
                    .user_errors
                    .iter()
                    .map(|e| e.message.clone())
                    .collect(),
            };
        }
    }

    if !response.errors.is_empty() {
        return StatusUpdateOutcome::ValidationFailed {
            messages: response.errors.into_iter().map(|e| e.message).collect(),
        };
    }

    let confirmed_status = payload
        .and_then(|p| p.product)
        .map(|product| ProductStatus::from_remote(&product.status))
        .unwrap_or(requested);
    StatusUpdateOutcome::Ok { confirmed_status }
}
