use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthAccount;
use crate::error::{ApiError, Result};
use crate::query::{self, DoctorActivityQuery, PageParams, SortOrder};
use crate::service::activities::DoctorActivityPayload;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActivityListParams {
    doctor_name: Option<String>,
    location: Option<String>,
    date_from: Option<String>,
    date_to: Option<String>,
    day_of_week: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

impl ActivityListParams {
    fn into_query(self) -> DoctorActivityQuery {
        let defaults = PageParams::default();
        DoctorActivityQuery {
            doctor_name: self.doctor_name,
            location: self.location,
            date_from: self.date_from.as_deref().and_then(query::parse_date),
            date_to: self.date_to.as_deref().and_then(query::parse_date),
            // Unparseable or out-of-range values are ignored, not rejected.
            day_of_week: self
                .day_of_week
                .as_deref()
                .and_then(|raw| raw.parse().ok())
                .filter(|day| *day <= 6),
            sort_by: self.sort_by,
            order: self.sort_order.as_deref().map(SortOrder::parse),
            page: PageParams {
                page: self.page.unwrap_or(defaults.page),
                limit: self.limit.unwrap_or(defaults.limit),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkIds {
    activity_ids: Option<Vec<Uuid>>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Query(params): Query<ActivityListParams>,
) -> Result<Json<Value>> {
    let query = params.into_query();
    let page = query.page;
    let result = state.activities.list(account.id, &query).await?;
    Ok(Json(json!({
        "success": true,
        "activities": result.items,
        "total": result.total,
        "page": page.page,
        "limit": page.limit,
    })))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>> {
    let stats = state.activities.stats(account.id).await?;
    let mut body = serde_json::to_value(stats).map_err(anyhow::Error::new)?;
    body["success"] = json!(true);
    Ok(Json(body))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let activity = state.activities.get(account.id, id).await?;
    Ok(Json(json!({ "success": true, "activity": activity })))
}

pub async fn create(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(payload): Json<DoctorActivityPayload>,
) -> Result<(StatusCode, Json<Value>)> {
    let activity = state.activities.create(account.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "activity": activity })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
    Json(payload): Json<DoctorActivityPayload>,
) -> Result<Json<Value>> {
    let activity = state.activities.update(account.id, id, payload).await?;
    Ok(Json(json!({ "success": true, "activity": activity })))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.activities.delete(account.id, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Activity deleted successfully",
    })))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(body): Json<BulkIds>,
) -> Result<Json<Value>> {
    let ids = body
        .activity_ids
        .ok_or_else(|| ApiError::bad_request("Activity IDs array is required"))?;
    let deleted = state.activities.bulk_delete(account.id, &ids).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{deleted} activities deleted successfully"),
    })))
}
