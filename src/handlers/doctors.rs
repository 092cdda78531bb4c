use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthAccount;
use crate::error::{ApiError, Result};
use crate::query::{self, DoctorQuery, PageParams, SortOrder};
use crate::service::doctors::DoctorPayload;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorListParams {
    location: Option<String>,
    locations: Option<String>,
    specialization: Option<String>,
    specializations: Option<String>,
    specialization_type: Option<String>,
    specialization_types: Option<String>,
    sub_location: Option<String>,
    phone_number: Option<String>,
    hospitals: Option<String>,
    search: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

impl DoctorListParams {
    fn into_query(self) -> DoctorQuery {
        let defaults = PageParams::default();
        DoctorQuery {
            location: self.location,
            locations: query::parse_list(self.locations.as_deref()),
            specialization: self.specialization,
            specializations: query::parse_list(self.specializations.as_deref()),
            specialization_type: self.specialization_type,
            specialization_types: query::parse_list(self.specialization_types.as_deref()),
            sub_location: self.sub_location,
            phone_number: self.phone_number,
            hospitals: query::parse_list(self.hospitals.as_deref()),
            search: self.search,
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
    doctor_ids: Option<Vec<Uuid>>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Query(params): Query<DoctorListParams>,
) -> Result<Json<Value>> {
    let query = params.into_query();
    let page = query.page;
    let result = state.doctors.list(account.id, &query).await?;
    Ok(Json(json!({
        "success": true,
        "doctors": result.items,
        "total": result.total,
        "page": page.page,
        "limit": page.limit,
    })))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>> {
    let stats = state.doctors.stats(account.id).await?;
    let mut body = serde_json::to_value(stats).map_err(anyhow::Error::new)?;
    body["success"] = json!(true);
    Ok(Json(body))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let doctor = state.doctors.get(account.id, id).await?;
    Ok(Json(json!({ "success": true, "doctor": doctor })))
}

pub async fn create(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(payload): Json<DoctorPayload>,
) -> Result<(StatusCode, Json<Value>)> {
    let doctor = state.doctors.create(account.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "doctor": doctor })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
    Json(payload): Json<DoctorPayload>,
) -> Result<Json<Value>> {
    let doctor = state.doctors.update(account.id, id, payload).await?;
    Ok(Json(json!({ "success": true, "doctor": doctor })))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.doctors.delete(account.id, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Doctor deleted successfully",
    })))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(body): Json<BulkIds>,
) -> Result<Json<Value>> {
    let ids = body
        .doctor_ids
        .ok_or_else(|| ApiError::bad_request("Doctor IDs array is required"))?;
    let deleted = state.doctors.bulk_delete(account.id, &ids).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{deleted} doctors deleted successfully"),
    })))
}

pub async fn bulk_export(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(body): Json<BulkIds>,
) -> Result<Json<Value>> {
    let doctors = state
        .doctors
        .bulk_export(account.id, body.doctor_ids)
        .await?;
    Ok(Json(json!({ "success": true, "doctors": doctors })))
}
