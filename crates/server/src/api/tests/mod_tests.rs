use super::*;
use chrono::{TimeZone, Utc};
use shared::protocol::{ProductUpdatePayload, UpdatedProduct, UserError};
use std::sync::Mutex;

pub(crate) struct FakeCatalog {
    pub(crate) products: Vec<ProductSummary>,
    pub(crate) user_errors: Vec<String>,
    pub(crate) fail_with: Option<String>,
    pub(crate) seen_limits: Mutex<Vec<u32>>,
}

impl FakeCatalog {
    pub(crate) fn with_products(products: Vec<ProductSummary>) -> Self {
        Self {
            products,
            user_errors: Vec::new(),
            fail_with: None,
            seen_limits: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn rejecting(message: impl Into<String>) -> Self {
        let mut catalog = Self::with_products(Vec::new());
        catalog.user_errors = vec![message.into()];
        catalog
    }

    pub(crate) fn failing(err: impl Into<String>) -> Self {
        let mut catalog = Self::with_products(Vec::new());
        catalog.fail_with = Some(err.into());
        catalog
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn recent_products(&self, limit: u32) -> Result<Vec<ProductSummary>, AdminApiError> {
        if let Some(err) = &self.fail_with {
            return Err(AdminApiError::Graphql(vec![err.clone()]));
        }
        self.seen_limits.lock().expect("limits").push(limit);
        Ok(self
            .products
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn set_product_status(
        &self,
        product_id: &ProductId,
        status: ProductStatus,
    ) -> Result<GraphqlResponse<ProductUpdateData>, AdminApiError> {
        if let Some(err) = &self.fail_with {
            return Err(AdminApiError::Graphql(vec![err.clone()]));
        }
        let payload = if self.user_errors.is_empty() {
            ProductUpdatePayload {
                product: Some(UpdatedProduct {
                    id: product_id.clone(),
                    status: status.as_graphql().to_string(),
                }),
                user_errors: Vec::new(),
            }
        } else {
            ProductUpdatePayload {
                product: None,
                user_errors: self
                    .user_errors
                    .iter()
                    .map(|message| UserError {
                        field: Some(vec!["status".to_string()]),
                        message: message.clone(),
                    })
                    .collect(),
            }
        };
        Ok(GraphqlResponse {
            data: Some(ProductUpdateData {
                product_update: Some(payload),
            }),
            errors: Vec::new(),
        })
    }
}

pub(crate) fn sample_product(n: u32) -> ProductSummary {
    ProductSummary {
        id: ProductId::new(format!("gid://shopify/Product/{n}")),
        title: format!("Product {n}"),
        created_at: Utc
            .with_ymd_and_hms(2024, 5, n.min(28), 9, 0, 0)
            .single()
            .expect("timestamp"),
        status: ProductStatus::Draft,
        price: Some(format!("{n}.00")),
    }
}

fn context(catalog: FakeCatalog) -> ApiContext {
    ApiContext {
        catalog: Arc::new(catalog),
    }
}

#[test]
fn limit_defaults_and_clamps() {
    assert_eq!(clamp_limit(None), DEFAULT_PRODUCT_LIMIT);
    assert_eq!(clamp_limit(Some(0)), 1);
    assert_eq!(clamp_limit(Some(25)), 25);
    assert_eq!(clamp_limit(Some(10_000)), MAX_PRODUCT_LIMIT);
}

#[tokio::test]
async fn list_products_uses_default_limit() {
    let catalog = Arc::new(FakeCatalog::with_products((1..=12).map(sample_product).collect()));
    let ctx = ApiContext {
        catalog: catalog.clone(),
    };

    let listed = list_products(&ctx, None).await.expect("products");
    assert_eq!(listed.products.len(), 10);
    assert_eq!(*catalog.seen_limits.lock().expect("limits"), vec![10]);
}

#[tokio::test]
async fn upstream_failure_maps_to_upstream_error() {
    let ctx = context(FakeCatalog::failing("Throttled"));
    let err = list_products(&ctx, Some(5)).await.expect_err("should fail");
    assert!(matches!(err.code, ErrorCode::Upstream));
    assert!(err.message.contains("Throttled"));
}

#[tokio::test]
async fn user_errors_are_passed_through_as_data() {
    let ctx = context(FakeCatalog::rejecting("Status cannot be changed"));
    let response = update_product_status(
        &ctx,
        UpdateStatusRequest {
            product_id: ProductId::new("gid://shopify/Product/1"),
            status: ProductStatus::Active,
        },
    )
    .await
    .expect("completed");

    let payload = response
        .data
        .and_then(|d| d.product_update)
        .expect("payload");
    assert_eq!(payload.user_errors.len(), 1);
    assert_eq!(payload.user_errors[0].message, "Status cannot be changed");
}
