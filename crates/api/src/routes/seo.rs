//! Route definitions for the SEO settings admin resource.

use axum::routing::get;
use axum::Router;
use pageseo_core::collection::Collection;

use crate::handlers::seo;
use crate::state::AppState;

/// SEO setting routes, mounted at the collection's index URL.
///
/// ```text
/// GET   /                  -> index
/// GET   /!seo_setting      -> get_setting
/// PUT   /!seo_setting      -> update_setting
/// POST  /!seo_setting      -> update_setting (form with _method=PUT)
/// ```
pub fn router(collection: &Collection) -> Router<AppState> {
    let index = collection.index_url();
    Router::new().route(&index, get(seo::index)).route(
        &format!("{index}/!seo_setting"),
        get(seo::get_setting)
            .put(seo::update_setting)
            .post(seo::update_setting),
    )
}
