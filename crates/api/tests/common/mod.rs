#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pageseo_core::collection::Collection;
use pageseo_core::definition::{GlobalVariables, SeoDefinition};
use pageseo_core::record::SeoSetting;
use pageseo_core::store::{MemoryStore, SettingStore};
use tower::ServiceExt;

use pageseo_api::config::{SeoConfig, ServerConfig};
use pageseo_api::router::build_app_router;
use pageseo_api::state::AppState;

pub const COLLECTION: &str = "QorSeoGlobalSettings";
pub const INDEX: &str = "/admin/qor-seo-global-settings";
pub const SETTING: &str = "/admin/qor-seo-global-settings/!seo_setting";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        seo: SeoConfig::default(),
    }
}

/// The collection used across API tests: two globals and two pages.
pub fn test_collection() -> Collection {
    let mut collection = Collection::new(COLLECTION);
    collection.register_global_variables(
        GlobalVariables::new()
            .with("SiteName", "Qor SEO")
            .with("BrandName", "Qor"),
    );
    collection
        .register_seo(SeoDefinition::new("CategoryPage").with_variables(["Name", "URLTitle"]))
        .unwrap();
    collection
        .register_seo(SeoDefinition::new("ProductPage").with_variables(["Name", "Code"]))
        .unwrap();
    collection
}

/// Build the full application router over an in-memory store.
///
/// Uses the same `build_app_router` as `main.rs`, so tests exercise the
/// production middleware stack.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    build_test_app_with(store)
}

/// Like [`build_test_app`] but over any store.
pub fn build_test_app_with(store: Arc<dyn SettingStore<Record = SeoSetting>>) -> Router {
    let config = test_config();
    let state = AppState {
        store,
        pool: None,
        collection: Arc::new(test_collection()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn get_html(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::ACCEPT, "text/html,application/xhtml+xml")
        .header(header::HOST, "shop.test")
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a url-encoded form. `accept` selects the response flavour.
pub async fn send_form(
    app: Router,
    method: Method,
    uri: &str,
    fields: &[(&str, &str)],
    accept: &str,
) -> Response<Body> {
    let body = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish();
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::ACCEPT, accept)
        .body(Body::from(body))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_form(app: Router, fields: &[(&str, &str)]) -> Response<Body> {
    send_form(app, Method::PUT, SETTING, fields, "application/json").await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
