use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::AuthAccount;
use crate::error::{ApiError, Result};
use crate::query::{self, ConsultantQuery, PageParams, SortOrder};
use crate::service::consultants::ConsultantPayload;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultantListParams {
    location: Option<String>,
    specialization: Option<String>,
    specializations: Option<String>,
    sub_location: Option<String>,
    phone_number: Option<String>,
    search: Option<String>,
    page: Option<u64>,
    limit: Option<u64>,
    sort_by: Option<String>,
    sort_order: Option<String>,
}

impl ConsultantListParams {
    fn into_query(self) -> ConsultantQuery {
        let defaults = PageParams::default();
        ConsultantQuery {
            location: self.location,
            specialization: self.specialization,
            specializations: query::parse_list(self.specializations.as_deref()),
            sub_location: self.sub_location,
            phone_number: self.phone_number,
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
    consultant_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDoctorBody {
    doctor_id: Option<Uuid>,
    referrals: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateMappingBody {
    referrals: Option<u32>,
}

pub async fn list(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Query(params): Query<ConsultantListParams>,
) -> Result<Json<Value>> {
    let query = params.into_query();
    let page = query.page;
    let result = state.consultants.list(account.id, &query).await?;
    let consultants = state.consultants.view_all(result.items).await?;
    Ok(Json(json!({
        "success": true,
        "consultants": consultants,
        "total": result.total,
        "page": page.page,
        "limit": page.limit,
    })))
}

pub async fn stats(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
) -> Result<Json<Value>> {
    let stats = state.consultants.stats(account.id).await?;
    let mut body = serde_json::to_value(stats).map_err(anyhow::Error::new)?;
    body["success"] = json!(true);
    Ok(Json(body))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    let consultant = state.consultants.get(account.id, id).await?;
    let consultant = state.consultants.view(consultant).await?;
    Ok(Json(json!({ "success": true, "consultant": consultant })))
}

pub async fn create(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(payload): Json<ConsultantPayload>,
) -> Result<(StatusCode, Json<Value>)> {
    let consultant = state.consultants.create(account.id, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "consultant": consultant })),
    ))
}

pub async fn update(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
    Json(payload): Json<ConsultantPayload>,
) -> Result<Json<Value>> {
    let consultant = state.consultants.update(account.id, id, payload).await?;
    Ok(Json(json!({ "success": true, "consultant": consultant })))
}

pub async fn remove(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>> {
    state.consultants.delete(account.id, id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Consultant deleted successfully",
    })))
}

pub async fn bulk_delete(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(body): Json<BulkIds>,
) -> Result<Json<Value>> {
    let ids = body
        .consultant_ids
        .ok_or_else(|| ApiError::bad_request("Consultant IDs array is required"))?;
    let deleted = state.consultants.bulk_delete(account.id, &ids).await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("{deleted} consultants deleted successfully"),
    })))
}

pub async fn bulk_export(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Json(body): Json<BulkIds>,
) -> Result<Json<Value>> {
    let consultants = state
        .consultants
        .bulk_export(account.id, body.consultant_ids)
        .await?;
    let consultants = state.consultants.view_all(consultants).await?;
    Ok(Json(json!({ "success": true, "consultants": consultants })))
}

pub async fn map_doctor(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path(id): Path<Uuid>,
    Json(body): Json<MapDoctorBody>,
) -> Result<Json<Value>> {
    let doctor_id = body
        .doctor_id
        .ok_or_else(|| ApiError::bad_request("Doctor ID is required"))?;
    let consultant = state
        .consultants
        .add_mapping(account.id, id, doctor_id, body.referrals)
        .await?;
    let consultant = state.consultants.view(consultant).await?;
    Ok(Json(json!({ "success": true, "consultant": consultant })))
}

pub async fn update_mapping(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path((id, doctor_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdateMappingBody>,
) -> Result<Json<Value>> {
    let consultant = state
        .consultants
        .update_mapping(account.id, id, doctor_id, body.referrals)
        .await?;
    let consultant = state.consultants.view(consultant).await?;
    Ok(Json(json!({ "success": true, "consultant": consultant })))
}

pub async fn unmap_doctor(
    State(state): State<AppState>,
    AuthAccount(account): AuthAccount,
    Path((id, doctor_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>> {
    let consultant = state
        .consultants
        .remove_mapping(account.id, id, doctor_id)
        .await?;
    let consultant = state.consultants.view(consultant).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Mapping removed successfully",
        "consultant": consultant,
    })))
}
