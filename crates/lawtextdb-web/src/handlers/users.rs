//! User registration and token login/logout.
//!
//! Failures are reported as the error's message in a 200 response.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use super::run_blocking;
use crate::models::{Credentials, TokenRequest};
use crate::state::AppState;

/// `POST /users`: the new username, or why it could not be created.
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Credentials>,
) -> String {
    run_blocking(move || {
        state
            .auth
            .create_user(&body.username, &body.password)
            .unwrap_or_else(|e| e.to_string())
    })
    .await
}

/// `POST /login`: a fresh token, or why login failed.
pub async fn login(State(state): State<Arc<AppState>>, Json(body): Json<Credentials>) -> String {
    run_blocking(move || {
        state
            .auth
            .issue_token(&body.username, &body.password)
            .unwrap_or_else(|e| e.to_string())
    })
    .await
}

/// `POST /logout`
pub async fn logout(State(state): State<Arc<AppState>>, Json(body): Json<TokenRequest>) {
    run_blocking(move || state.auth.delete_token(&body.username, &body.token)).await
}
