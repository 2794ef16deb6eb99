//! Handlers for the SEO settings admin resource.
//!
//! Serves the index of the global record plus one section per registered
//! page, a single record (JSON or an HTML meta tag preview) and the form
//! submission that updates a record.

use axum::extract::{Form, Query, State};
use axum::http::header::{ACCEPT, HOST};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use pageseo_core::error::CoreError;
use pageseo_core::open_graph::{MetaTags, RequestOrigin};
use pageseo_core::record::{SeoSetting, SettingRecord};
use pageseo_core::store::SettingStore;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::forms::SettingForm;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query string of the single-record endpoints.
#[derive(Debug, Deserialize)]
pub struct SettingQuery {
    pub name: String,
}

/// Index payload.
#[derive(Debug, Serialize)]
pub struct SeoIndex {
    pub name: String,
    pub global: GlobalSection,
    pub sections: Vec<SeoSection>,
}

/// The global record with its effective variable values.
#[derive(Debug, Serialize)]
pub struct GlobalSection {
    pub setting: SeoSetting,
    pub values: Vec<GlobalValue>,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct GlobalValue {
    pub name: String,
    pub value: String,
}

/// One registered page and its shared record.
#[derive(Debug, Serialize)]
pub struct SeoSection {
    pub name: String,
    pub setting: SeoSetting,
    pub tags: Vec<String>,
    pub url: String,
}

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// GET {prefix}/{resource}
///
/// List the global record and every page section, creating missing records.
pub async fn index(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let store = state.store.as_ref();
    let collection = &state.collection;

    let global = collection.global_setting(store).await?;
    let values = collection
        .global_setting_value(global.global_setting())
        .into_iter()
        .map(|(name, value)| GlobalValue { name, value })
        .collect();
    let global_url = collection.setting_url(global.name());

    let sections = collection
        .seo_sections(store)
        .await?
        .into_iter()
        .map(|(definition, setting)| SeoSection {
            name: definition.name.clone(),
            tags: collection.tags_by_type(&definition.name),
            url: collection.setting_url(&definition.name),
            setting,
        })
        .collect();

    Ok(Json(DataResponse {
        data: SeoIndex {
            name: collection.name().to_string(),
            global: GlobalSection {
                setting: global,
                values,
                url: global_url,
            },
            sections,
        },
    }))
}

/// GET {prefix}/{resource}/!seo_setting?name=X
///
/// Return one record. Clients accepting `text/html` get the rendered meta
/// tags instead of JSON.
pub async fn get_setting(
    State(state): State<AppState>,
    Query(query): Query<SettingQuery>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let record = load_record(&state, &query.name).await?;

    if !wants_html(&headers) {
        return Ok(Json(DataResponse { data: record }).into_response());
    }

    let origin = request_origin(&headers);
    let html = if state.collection.get_seo(&record.name).is_some() {
        state
            .collection
            .render(state.store.as_ref(), &record.name, &[], origin.as_ref())
            .await?
    } else {
        MetaTags::from_setting(&record.setting, origin.as_ref()).to_html()
    };
    Ok(Html(html).into_response())
}

/// PUT {prefix}/{resource}/!seo_setting
///
/// Apply a submitted setting form. Also accepts `POST` with `_method=PUT`.
/// HTML clients are redirected to the index; JSON clients get the record.
pub async fn update_setting(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(pairs): Form<Vec<(String, String)>>,
) -> AppResult<Response> {
    if let Some((_, method)) = pairs.iter().find(|(key, _)| key == "_method") {
        if !method.eq_ignore_ascii_case("PUT") {
            return Err(AppError::BadRequest(format!(
                "Unsupported method override '{method}'"
            )));
        }
    }

    let form = SettingForm::parse(&pairs).map_err(AppError::Unprocessable)?;

    let mut record = load_record(&state, &form.name)
        .await
        .map_err(|e| submission_error(&form.name, e))?;
    let is_global = record.is_global_seo;
    form.apply(&mut record.setting, is_global);

    let saved = state
        .store
        .update(&record)
        .await
        .map_err(|e| submission_error(&form.name, e.into()))?
        .ok_or_else(|| CoreError::NotFound {
            entity: "SeoSetting",
            key: form.name.clone(),
        })?;

    tracing::info!(
        name = %saved.name,
        is_global,
        fields = form.text_fields.len(),
        "SEO setting updated",
    );

    if wants_html(&headers) {
        return Ok(Redirect::to(&state.collection.index_url()).into_response());
    }
    Ok(Json(DataResponse { data: saved }).into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a record by name, creating it when it belongs to a registered page
/// or is the collection's global record.
async fn load_record(state: &AppState, name: &str) -> AppResult<SeoSetting> {
    let store = state.store.as_ref();
    let collection = &state.collection;

    if let Some(record) = store.find_by_name(name).await? {
        return Ok(record);
    }
    if name == collection.name() {
        return Ok(collection.global_setting(store).await?);
    }
    if collection.get_seo(name).is_some() {
        return Ok(collection.setting(store, name).await?);
    }
    Err(CoreError::NotFound {
        entity: "SeoSetting",
        key: name.to_string(),
    }
    .into())
}

/// Storage failures while handling a form surface as form errors.
fn submission_error(name: &str, err: AppError) -> AppError {
    match err {
        AppError::Core(CoreError::Storage(msg)) => {
            tracing::error!(name, error = %msg, "Failed to save SEO setting");
            AppError::Unprocessable(vec![format!("Failed to save setting '{name}'")])
        }
        other => other,
    }
}

fn wants_html(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|accept| accept.contains("text/html"))
}

/// Origin of the request, honouring `X-Forwarded-Proto` from a proxy.
fn request_origin(headers: &HeaderMap) -> Option<RequestOrigin> {
    let host = headers.get(HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok());
    Some(RequestOrigin::new(scheme, host))
}
