use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::auth::AuthAccount;
use crate::error::Result;
use crate::state::AppState;

pub async fn stats(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>> {
    let stats = state.dashboard.stats(account.id).await?;
    Ok(Json(json!({ "success": true, "stats": stats })))
}

pub async fn recent_doctors(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>> {
    let doctors = state.dashboard.recent_doctors(account.id).await?;
    Ok(Json(json!({ "success": true, "doctors": doctors })))
}

pub async fn recent_consultants(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>> {
    let consultants = state.dashboard.recent_consultants(account.id).await?;
    Ok(Json(json!({ "success": true, "consultants": consultants })))
}

/// The feed never errors: a failed read renders as an empty list.
pub async fn activity_feed(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Json<Value> {
    let activities = state.dashboard.activity_feed(account.id).await;
    Json(json!({ "success": true, "activities": activities }))
}
