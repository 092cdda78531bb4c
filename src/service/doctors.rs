use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::audit::Recorder;
use super::{group_counts, GroupCount};
use crate::domain::{add_dr_prefix, ActivityKind, Doctor, SpecializationType, TargetType};
use crate::error::{ApiError, Result};
use crate::query::{DoctorQuery, Page};
use crate::storage::Storage;
use crate::validate;

const NOT_FOUND: &str = "Doctor not found or access denied";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorPayload {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub specialization_type: Option<String>,
    pub location: Option<String>,
    pub sub_location: Option<String>,
    pub preferred_hospitals: Option<Vec<String>>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorStats {
    pub total_doctors: u64,
    pub specializations: Vec<GroupCount>,
    pub specialization_types: Vec<GroupCount>,
    pub locations: Vec<GroupCount>,
}

#[derive(Clone)]
pub struct DoctorService {
    storage: Arc<dyn Storage>,
    audit: Recorder,
}

impl DoctorService {
    pub fn new(storage: Arc<dyn Storage>, audit: Recorder) -> Self {
        Self { storage, audit }
    }

    pub async fn list(&self, account: Uuid, query: &DoctorQuery) -> Result<Page<Doctor>> {
        self.storage.list_doctors(account, query).await
    }

    pub async fn get(&self, account: Uuid, id: Uuid) -> Result<Doctor> {
        self.storage
            .get_doctor(account, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn create(&self, account: Uuid, payload: DoctorPayload) -> Result<Doctor> {
        let errors = validate_payload(&payload, false);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let email = payload.email.as_deref().map(normalize_email);
        if let Some(email) = &email {
            self.check_email_free(email, None).await?;
        }
        if let Some(phone) = &payload.phone_number {
            self.check_phone_free(phone, None).await?;
        }

        let now = Utc::now();
        let mut doctor = Doctor {
            id: None,
            account,
            name: add_dr_prefix(payload.name.as_deref().unwrap_or_default()),
            specialization: payload.specialization.unwrap_or_default(),
            specialization_type: payload
                .specialization_type
                .as_deref()
                .and_then(SpecializationType::parse)
                .unwrap_or(SpecializationType::GeneralPractitioner),
            location: payload.location.unwrap_or_default(),
            sub_location: payload.sub_location,
            preferred_hospitals: payload.preferred_hospitals.unwrap_or_default(),
            phone_number: payload.phone_number,
            email,
            avatar: payload.avatar,
            created_at: now,
            updated_at: now,
        };
        self.storage.create_doctor(&mut doctor).await?;

        self.audit
            .record(
                account,
                ActivityKind::DoctorAdded,
                format!(
                    "New doctor {} added to {}",
                    doctor.name, doctor.specialization
                ),
                doctor.id.map(|id| (id, TargetType::Doctor)),
                None,
            )
            .await;

        Ok(doctor)
    }

    pub async fn update(&self, account: Uuid, id: Uuid, payload: DoctorPayload) -> Result<Doctor> {
        let errors = validate_payload(&payload, true);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let mut doctor = self.get(account, id).await?;

        if let Some(email) = payload.email.as_deref().map(normalize_email) {
            self.check_email_free(&email, doctor.id).await?;
            doctor.email = Some(email);
        }
        if let Some(phone) = payload.phone_number {
            self.check_phone_free(&phone, doctor.id).await?;
            doctor.phone_number = Some(phone);
        }
        if let Some(name) = payload.name {
            doctor.name = add_dr_prefix(&name);
        }
        if let Some(specialization) = payload.specialization {
            doctor.specialization = specialization;
        }
        if let Some(kind) = payload
            .specialization_type
            .as_deref()
            .and_then(SpecializationType::parse)
        {
            doctor.specialization_type = kind;
        }
        if let Some(location) = payload.location {
            doctor.location = location;
        }
        if let Some(sub_location) = payload.sub_location {
            doctor.sub_location = Some(sub_location);
        }
        if let Some(hospitals) = payload.preferred_hospitals {
            doctor.preferred_hospitals = hospitals;
        }
        if let Some(avatar) = payload.avatar {
            doctor.avatar = Some(avatar);
        }
        doctor.updated_at = Utc::now();

        self.storage.update_doctor(&doctor).await?;

        self.audit
            .record(
                account,
                ActivityKind::DoctorUpdated,
                format!("Doctor {} profile updated", doctor.name),
                doctor.id.map(|id| (id, TargetType::Doctor)),
                None,
            )
            .await;

        Ok(doctor)
    }

    pub async fn delete(&self, account: Uuid, id: Uuid) -> Result<()> {
        let doctor = self.get(account, id).await?;
        self.storage.delete_doctor(id).await?;

        self.audit
            .record(
                account,
                ActivityKind::DoctorDeleted,
                format!("Doctor {} deleted", doctor.name),
                Some((id, TargetType::Doctor)),
                None,
            )
            .await;

        Ok(())
    }

    /// Deletes the caller-owned subset of `ids`; NotFound when nothing in the
    /// list belongs to the caller.
    pub async fn bulk_delete(&self, account: Uuid, ids: &[Uuid]) -> Result<usize> {
        let doomed = self.storage.doctors_by_ids(account, ids).await?;
        if doomed.is_empty() {
            return Err(ApiError::NotFound(
                "No doctors found or access denied".to_string(),
            ));
        }
        for doctor in &doomed {
            if let Some(id) = doctor.id {
                self.storage.delete_doctor(id).await?;
            }
        }

        let names: Vec<&str> = doomed.iter().map(|d| d.name.as_str()).collect();
        self.audit
            .record(
                account,
                ActivityKind::BulkOperation,
                format!("Bulk deleted {} doctors", doomed.len()),
                None,
                Some(json!({ "deletedCount": doomed.len(), "doctorNames": names })),
            )
            .await;

        Ok(doomed.len())
    }

    pub async fn bulk_export(&self, account: Uuid, ids: Option<Vec<Uuid>>) -> Result<Vec<Doctor>> {
        match ids {
            Some(ids) if !ids.is_empty() => self.storage.doctors_by_ids(account, &ids).await,
            _ => self.storage.all_doctors(account).await,
        }
    }

    pub async fn stats(&self, account: Uuid) -> Result<DoctorStats> {
        let doctors = self.storage.all_doctors(account).await?;
        Ok(DoctorStats {
            total_doctors: doctors.len() as u64,
            specializations: group_counts(doctors.iter().map(|d| d.specialization.clone())),
            specialization_types: group_counts(
                doctors
                    .iter()
                    .map(|d| d.specialization_type.as_str().to_string()),
            ),
            locations: group_counts(doctors.iter().map(|d| d.location.clone())),
        })
    }

    async fn check_email_free(&self, email: &str, exclude: Option<Uuid>) -> Result<()> {
        if self
            .storage
            .find_consultant_by_email(email)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(
                "Email already exists in consultants".to_string(),
            ));
        }
        if let Some(existing) = self.storage.find_doctor_by_email(email).await? {
            if existing.id != exclude {
                return Err(ApiError::Conflict("Email already exists".to_string()));
            }
        }
        Ok(())
    }

    async fn check_phone_free(&self, phone: &str, exclude: Option<Uuid>) -> Result<()> {
        if self
            .storage
            .find_consultant_by_phone(phone)
            .await?
            .is_some()
        {
            return Err(ApiError::Conflict(
                "Phone number already exists in consultants".to_string(),
            ));
        }
        if let Some(existing) = self.storage.find_doctor_by_phone(phone).await? {
            if existing.id != exclude {
                return Err(ApiError::Conflict(
                    "Phone number already exists".to_string(),
                ));
            }
        }
        Ok(())
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_payload(payload: &DoctorPayload, partial: bool) -> Vec<String> {
    let mut errors = Vec::new();
    if !partial || payload.name.is_some() {
        validate::require(payload.name.as_deref(), "Name is required", &mut errors);
    }
    if !partial || payload.specialization.is_some() {
        validate::require(
            payload.specialization.as_deref(),
            "Specialization is required",
            &mut errors,
        );
    }
    if !partial || payload.specialization_type.is_some() {
        let valid = payload
            .specialization_type
            .as_deref()
            .and_then(SpecializationType::parse)
            .is_some();
        if !valid {
            errors.push(
                "Specialization type must be either Consultant or General Practitioner"
                    .to_string(),
            );
        }
    }
    if !partial || payload.location.is_some() {
        validate::require(
            payload.location.as_deref(),
            "Location is required",
            &mut errors,
        );
    }
    if let Some(email) = payload.email.as_deref() {
        if !validate::is_valid_email(email.trim()) {
            errors.push("Valid email is required".to_string());
        }
    }
    if let Some(phone) = payload.phone_number.as_deref() {
        if !validate::is_valid_phone(phone) {
            errors.push("Phone number must be exactly 10 digits".to_string());
        }
    }
    if let Some(avatar) = payload.avatar.as_deref() {
        if !validate::is_valid_avatar(avatar) {
            errors.push("Avatar must be a valid URL or SVG data URI".to_string());
        }
    }
    errors
}
