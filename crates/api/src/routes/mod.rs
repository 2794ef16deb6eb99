pub mod health;
pub mod seo;

use axum::Router;
use pageseo_core::collection::Collection;

use crate::state::AppState;

/// Build the admin route tree for `collection`.
///
/// Route hierarchy (`{prefix}` is the configured admin prefix, `{resource}`
/// the collection's URL parameter):
///
/// ```text
/// {prefix}/{resource}                  index of global + page settings
/// {prefix}/{resource}/!seo_setting     get (?name=), update (PUT, POST + _method)
/// ```
pub fn admin_routes(collection: &Collection) -> Router<AppState> {
    seo::router(collection)
}
