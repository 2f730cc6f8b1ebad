use std::{net::SocketAddr, sync::Arc};

use admin_api::AdminApiClient;
use anyhow::Context;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::ApiError,
    protocol::{
        GraphqlResponse, ListProductsQuery, ProductListResponse, ProductUpdateData,
        UpdateStatusRequest,
    },
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::ApiContext;
use app_state::AppState;
use config::load_settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings()?;
    if settings.shop_access_token.is_empty() {
        warn!("no admin access token configured; upstream calls will be rejected");
    }
    let admin = AdminApiClient::new(&settings.admin_config())
        .context("failed to build admin api client")?;
    info!(endpoint = %admin.endpoint(), "using admin graphql endpoint");

    let state = AppState {
        api: ApiContext {
            catalog: Arc::new(admin),
        },
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address '{}'", settings.server_bind))?;
    info!(%addr, "catalog gateway listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/products", get(http_list_products))
        .route("/update-product-status", post(http_update_product_status))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<ProductListResponse>, (StatusCode, Json<ApiError>)> {
    api::list_products(&state.api, query.limit)
        .await
        .map(Json)
        .map_err(bad_gateway)
}

async fn http_update_product_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<GraphqlResponse<ProductUpdateData>>, (StatusCode, Json<ApiError>)> {
    api::update_product_status(&state.api, req)
        .await
        .map(Json)
        .map_err(bad_gateway)
}

fn bad_gateway(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_GATEWAY, Json(err))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
