use std::sync::Arc;

use pageseo_core::collection::Collection;
use pageseo_core::record::SeoSetting;
use pageseo_core::store::SettingStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Where shared setting records live.
    pub store: Arc<dyn SettingStore<Record = SeoSetting>>,
    /// Database pool when `store` is PostgreSQL-backed; used by the health check.
    pub pool: Option<pageseo_db::DbPool>,
    /// Registered SEO definitions and global variables.
    pub collection: Arc<Collection>,
}
