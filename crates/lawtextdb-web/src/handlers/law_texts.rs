use std::sync::Arc;

use axum::Json;
use axum::extract::{Multipart, Path, State};
use lawtextdb_core::LawText;

use super::run_blocking;
use crate::models::TokenRequest;
use crate::state::AppState;
use crate::upload::parse_multipart;

pub const DELETED_ALL_MESSAGE: &str = "Deleted all files.";
pub const DELETE_ALL_FAILED_MESSAGE: &str = "Could not delete all files.";

pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<LawText>> {
    Json(run_blocking(move || state.law_texts.get_all()).await)
}

pub async fn list_accepted(State(state): State<Arc<AppState>>) -> Json<Vec<LawText>> {
    Json(run_blocking(move || state.law_texts.get_accepted()).await)
}

pub async fn list_not_accepted(State(state): State<Arc<AppState>>) -> Json<Vec<LawText>> {
    Json(run_blocking(move || state.law_texts.get_not_accepted()).await)
}

/// `null` when no law text has this id.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Json<Option<LawText>> {
    Json(run_blocking(move || state.law_texts.get_by_id(id)).await)
}

/// Base64 of the stored PDF, empty when there is none.
pub async fn display(State(state): State<Arc<AppState>>, Path(id): Path<i64>) -> String {
    run_blocking(move || state.law_texts.get_for_display(id)).await
}

pub async fn search_by_name(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Json<Vec<Option<LawText>>> {
    Json(run_blocking(move || state.law_texts.get_law_text_by_name(&name)).await)
}

pub async fn search_by_raw_text(
    State(state): State<Arc<AppState>>,
    Path(text): Path<String>,
) -> Json<Vec<Option<LawText>>> {
    Json(run_blocking(move || state.law_texts.get_law_text_by_raw_text(&text)).await)
}

pub async fn add(
    State(state): State<Arc<AppState>>,
    Json(law_text): Json<LawText>,
) -> Json<LawText> {
    Json(run_blocking(move || state.law_texts.add_law_text(law_text)).await)
}

/// Ingest a multipart PDF. Anything short of a stored law text answers with
/// the empty placeholder.
pub async fn upload(State(state): State<Arc<AppState>>, multipart: Multipart) -> Json<LawText> {
    let file = match parse_multipart(multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            tracing::warn!("upload without a file field");
            return Json(LawText::default());
        }
        Err(e) => {
            tracing::warn!(error = %e, "unreadable upload");
            return Json(LawText::default());
        }
    };
    tracing::info!(filename = %file.filename, bytes = file.data.len(), "received upload");

    Json(run_blocking(move || state.law_texts.add_law_text_file(&file)).await)
}

pub async fn accept(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<TokenRequest>,
) -> String {
    run_blocking(move || {
        state
            .law_texts
            .accept_law_text(id, &body.username, &body.token)
    })
    .await
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<TokenRequest>,
) -> String {
    run_blocking(move || {
        state
            .law_texts
            .delete_law_text(id, &body.username, &body.token)
    })
    .await
}

/// Purge everything. Not gated by a token.
pub async fn delete_all(State(state): State<Arc<AppState>>) -> String {
    let purged = run_blocking(move || match state.law_texts.delete_all_law_texts() {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "purging law texts failed");
            false
        }
    })
    .await;

    if purged {
        DELETED_ALL_MESSAGE.to_string()
    } else {
        DELETE_ALL_FAILED_MESSAGE.to_string()
    }
}
