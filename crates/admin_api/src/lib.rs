//! Typed client for the commerce Admin GraphQL endpoint.

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use shared::{
    domain::{ProductId, ProductStatus},
    protocol::{GraphqlRequest, GraphqlResponse, ProductSummary, ProductUpdateData},
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";
pub const DEFAULT_API_VERSION: &str = "2024-10";

const RECENT_PRODUCTS_QUERY: &str = r#"
query GetProducts($first: Int!) {
  products(first: $first, sortKey: CREATED_AT, reverse: true) {
    nodes {
      id
      title
      createdAt
      status
      variants(first: 1) {
        nodes {
          price
        }
      }
    }
  }
}
"#;

const PRODUCT_UPDATE_MUTATION: &str = r#"
mutation productUpdate($input: ProductInput!) {
  productUpdate(input: $input) {
    product {
      id
      status
    }
    userErrors {
      field
      message
    }
  }
}
"#;

#[derive(Debug, Error)]
pub enum AdminApiError {
    #[error("invalid admin endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error("admin api request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("admin api responded with {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("admin api query failed: {}", .0.join(", "))]
    Graphql(Vec<String>),
    #[error("admin api response carried no data")]
    MissingData,
}

impl AdminApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AdminApiError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN
        )
    }
}

#[derive(Debug, Clone)]
pub struct AdminApiConfig {
    pub shop_url: String,
    pub api_version: String,
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: ProductConnection,
}

#[derive(Debug, Deserialize)]
struct ProductConnection {
    nodes: Vec<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    id: ProductId,
    title: String,
    created_at: DateTime<Utc>,
    status: String,
    #[serde(default)]
    variants: Option<VariantConnection>,
}

#[derive(Debug, Deserialize)]
struct VariantConnection {
    nodes: Vec<VariantNode>,
}

#[derive(Debug, Deserialize)]
struct VariantNode {
    price: Option<String>,
}

impl From<ProductNode> for ProductSummary {
    fn from(node: ProductNode) -> Self {
        let price = node
            .variants
            .and_then(|variants| variants.nodes.into_iter().next())
            .and_then(|variant| variant.price);
        ProductSummary {
            id: node.id,
            title: node.title,
            created_at: node.created_at,
            status: ProductStatus::from_remote(&node.status),
            price,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProductInput<'a> {
    id: &'a ProductId,
    status: ProductStatus,
}

#[derive(Clone)]
pub struct AdminApiClient {
    http: Client,
    endpoint: Url,
    access_token: String,
}

impl AdminApiClient {
    pub fn new(config: &AdminApiConfig) -> Result<Self, AdminApiError> {
        Ok(Self {
            http: Client::new(),
            endpoint: graphql_endpoint(&config.shop_url, &config.api_version)?,
            access_token: config.access_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Newest products first, at most `limit` of them.
    pub async fn list_recent_products(
        &self,
        limit: u32,
    ) -> Result<Vec<ProductSummary>, AdminApiError> {
        let response: GraphqlResponse<ProductsData> = self
            .execute(RECENT_PRODUCTS_QUERY, json!({ "first": limit }))
            .await?;
        if !response.errors.is_empty() {
            return Err(AdminApiError::Graphql(
                response.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        let data = response.data.ok_or(AdminApiError::MissingData)?;
        Ok(data
            .products
            .nodes
            .into_iter()
            .map(ProductSummary::from)
            .collect())
    }

    /// Runs the `productUpdate` mutation and hands back the envelope as-is;
    /// user errors are data here, not failures.
    pub async fn update_product_status(
        &self,
        product_id: &ProductId,
        status: ProductStatus,
    ) -> Result<GraphqlResponse<ProductUpdateData>, AdminApiError> {
        let input = ProductInput {
            id: product_id,
            status,
        };
        let response: GraphqlResponse<ProductUpdateData> = self
            .execute(PRODUCT_UPDATE_MUTATION, json!({ "input": input }))
            .await?;

        let user_errors = response
            .data
            .as_ref()
            .and_then(|data| data.product_update.as_ref())
            .map(|payload| payload.user_errors.len())
            .unwrap_or_default();
        if user_errors > 0 {
            warn!(%product_id, user_errors, "productUpdate returned user errors");
        }
        Ok(response)
    }

    async fn execute<V, T>(
        &self,
        query: &str,
        variables: V,
    ) -> Result<GraphqlResponse<T>, AdminApiError>
    where
        V: Serialize,
        T: DeserializeOwned,
    {
        debug!(endpoint = %self.endpoint, "sending admin graphql request");
        let res = self
            .http
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AdminApiError::Status { status, body });
        }
        Ok(res.json().await?)
    }
}

pub fn graphql_endpoint(shop_url: &str, api_version: &str) -> Result<Url, AdminApiError> {
    let shop_url = shop_url.trim();
    let base = if shop_url.contains("://") {
        Url::parse(shop_url)?
    } else {
        Url::parse(&format!("https://{shop_url}"))?
    };
    Ok(base.join(&format!("/admin/api/{api_version}/graphql.json"))?)
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
