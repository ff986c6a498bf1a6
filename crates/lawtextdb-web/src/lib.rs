//! HTTP surface of lawtextdb.
//!
//! Every route answers 200 for domain failures: handlers return empty
//! placeholders or message strings, never error statuses.

pub mod handlers;
pub mod models;
pub mod settings;
pub mod state;
pub mod upload;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::{index, law_texts, users};
pub use settings::Settings;
pub use state::AppState;

/// Build the full router with CORS, request tracing, and the upload limit.
pub fn app(state: AppState, settings: &Settings) -> Router {
    let api = Router::new()
        .route("/", get(index::index))
        .route("/users", post(users::create_user))
        .route("/login", post(users::login))
        .route("/logout", post(users::logout))
        .route("/lawTexts", get(law_texts::list))
        .route("/lawTexts/accepted", get(law_texts::list_accepted))
        .route("/lawTexts/notAccepted", get(law_texts::list_not_accepted))
        .route("/lawTexts/add", post(law_texts::add))
        .route("/lawTexts/upload", post(law_texts::upload))
        .route("/lawTexts/deleteAll", delete(law_texts::delete_all))
        .route("/lawTexts/display/{id}", get(law_texts::display))
        .route("/lawTexts/name/{name}", get(law_texts::search_by_name))
        .route("/lawTexts/rawText/{text}", get(law_texts::search_by_raw_text))
        .route("/lawTexts/accept/{id}", post(law_texts::accept))
        .route("/lawTexts/delete/{id}", post(law_texts::delete))
        .route("/lawTexts/{id}", get(law_texts::get))
        .with_state(Arc::new(state));

    api.layer(DefaultBodyLimit::max(settings.max_upload_bytes()))
        .layer(cors_layer(&settings.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
