use super::*;
use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use shared::protocol::{classify_product_update, StatusUpdateOutcome};
use std::sync::Arc;
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

#[derive(Clone)]
struct UpstreamState {
    reply: serde_json::Value,
    status: axum::http::StatusCode,
    seen: Arc<Mutex<Option<oneshot::Sender<(HeaderMap, serde_json::Value)>>>>,
}

async fn handle_graphql(
    State(state): State<UpstreamState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> (axum::http::StatusCode, Json<serde_json::Value>) {
    if let Some(tx) = state.seen.lock().await.take() {
        let _ = tx.send((headers, body));
    }
    (state.status, Json(state.reply))
}

async fn spawn_upstream(
    status: axum::http::StatusCode,
    reply: serde_json::Value,
) -> (AdminApiClient, oneshot::Receiver<(HeaderMap, serde_json::Value)>) {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = oneshot::channel();
    let state = UpstreamState {
        reply,
        status,
        seen: Arc::new(Mutex::new(Some(tx))),
    };
    let app = Router::new()
        .route("/admin/api/2024-10/graphql.json", post(handle_graphql))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let client = AdminApiClient::new(&AdminApiConfig {
        shop_url: format!("http://{addr}"),
        api_version: DEFAULT_API_VERSION.to_string(),
        access_token: "shpat_test".to_string(),
    })
    .expect("client");
    (client, rx)
}

#[test]
fn endpoint_defaults_to_https_for_bare_shop_domain() {
    let url = graphql_endpoint("demo.myshopify.com", "2024-10").expect("url");
    assert_eq!(
        url.as_str(),
        "https://demo.myshopify.com/admin/api/2024-10/graphql.json"
    );
}

#[test]
fn endpoint_keeps_explicit_scheme() {
    let url = graphql_endpoint("http://127.0.0.1:9000/", "2024-07").expect("url");
    assert_eq!(
        url.as_str(),
        "http://127.0.0.1:9000/admin/api/2024-07/graphql.json"
    );
}

#[tokio::test]
async fn list_recent_products_flattens_first_variant_price() {
    let (client, seen) = spawn_upstream(
        axum::http::StatusCode::OK,
        serde_json::json!({
            "data": {
                "products": {
                    "nodes": [
                        {
                            "id": "gid://shopify/Product/2",
                            "title": "Snowboard",
                            "createdAt": "2024-05-02T10:00:00Z",
                            "status": "ACTIVE",
                            "variants": { "nodes": [{ "price": "699.95" }] }
                        },
                        {
                            "id": "gid://shopify/Product/1",
                            "title": "Gift card",
                            "createdAt": "2024-05-01T10:00:00Z",
                            "status": "ARCHIVED",
                            "variants": { "nodes": [] }
                        }
                    ]
                }
            }
        }),
    )
    .await;

    let products = client.list_recent_products(10).await.expect("products");
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].title, "Snowboard");
    assert_eq!(products[0].price.as_deref(), Some("699.95"));
    assert_eq!(products[0].status, ProductStatus::Active);
    assert_eq!(products[1].price, None);
    assert_eq!(products[1].status, ProductStatus::Draft);

    let (headers, body) = seen.await.expect("request seen");
    assert_eq!(
        headers
            .get(ACCESS_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok()),
        Some("shpat_test")
    );
    assert_eq!(body["variables"]["first"], 10);
    assert!(body["query"]
        .as_str()
        .expect("query")
        .contains("sortKey: CREATED_AT, reverse: true"));
}

#[tokio::test]
async fn list_recent_products_surfaces_top_level_errors() {
    let (client, _seen) = spawn_upstream(
        axum::http::StatusCode::OK,
        serde_json::json!({ "errors": [{ "message": "Throttled" }] }),
    )
    .await;

    let err = client.list_recent_products(10).await.expect_err("must fail");
    assert!(matches!(err, AdminApiError::Graphql(ref m) if m == &["Throttled".to_string()]));
}

#[tokio::test]
async fn update_product_status_sends_graphql_enum_and_returns_user_errors() {
    let (client, seen) = spawn_upstream(
        axum::http::StatusCode::OK,
        serde_json::json!({
            "data": {
                "productUpdate": {
                    "product": null,
                    "userErrors": [{ "field": ["status"], "message": "Status cannot be changed" }]
                }
            }
        }),
    )
    .await;

    let response = client
        .update_product_status(&ProductId::new("gid://shopify/Product/1"), ProductStatus::Active)
        .await
        .expect("completed response");
    assert_eq!(
        classify_product_update(ProductStatus::Active, response),
        StatusUpdateOutcome::ValidationFailed {
            messages: vec!["Status cannot be changed".to_string()]
        }
    );

    let (_headers, body) = seen.await.expect("request seen");
    assert_eq!(
        body["variables"]["input"],
        serde_json::json!({ "id": "gid://shopify/Product/1", "status": "ACTIVE" })
    );
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let (client, _seen) = spawn_upstream(
        axum::http::StatusCode::UNAUTHORIZED,
        serde_json::json!({ "errors": "Invalid API key or access token" }),
    )
    .await;

    let err = client
        .update_product_status(&ProductId::new("gid://shopify/Product/1"), ProductStatus::Draft)
        .await
        .expect_err("must fail");
    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Invalid API key"));
}
