use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::audit::Recorder;
use super::doctors::normalize_email;
use super::{group_counts, GroupCount};
use crate::domain::{add_dr_prefix, ActivityKind, Consultant, DoctorMapping, TargetType};
use crate::error::{ApiError, Result};
use crate::query::{ConsultantQuery, Page};
use crate::storage::Storage;
use crate::validate;

const NOT_FOUND: &str = "Consultant not found or access denied";
const DOCTOR_NOT_FOUND: &str = "Doctor not found or access denied";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsultantPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub location: Option<String>,
    pub sub_location: Option<String>,
    pub preferred_hospitals: Option<Vec<String>>,
    pub experience: Option<String>,
    pub avatar: Option<String>,
}

/// A consultant as returned by the read endpoints: mappings carry the
/// referenced doctor's name and specialization when the doctor still exists.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantView {
    pub id: Option<Uuid>,
    pub account: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub location: String,
    pub sub_location: String,
    pub preferred_hospitals: Vec<String>,
    pub experience: String,
    pub avatar: Option<String>,
    pub mapped_doctors: Vec<MappedDoctorView>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedDoctorView {
    pub doctor: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    pub referrals: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingStats {
    pub total_mappings: u64,
    pub avg_mappings: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantStats {
    pub total_consultants: u64,
    pub specializations: Vec<GroupCount>,
    pub locations: Vec<GroupCount>,
    pub mapping_stats: MappingStats,
}

#[derive(Clone)]
pub struct ConsultantService {
    storage: Arc<dyn Storage>,
    audit: Recorder,
}

impl ConsultantService {
    pub fn new(storage: Arc<dyn Storage>, audit: Recorder) -> Self {
        Self { storage, audit }
    }

    pub async fn list(&self, account: Uuid, query: &ConsultantQuery) -> Result<Page<Consultant>> {
        self.storage.list_consultants(account, query).await
    }

    pub async fn get(&self, account: Uuid, id: Uuid) -> Result<Consultant> {
        self.storage
            .get_consultant(account, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn create(&self, account: Uuid, payload: ConsultantPayload) -> Result<Consultant> {
        let errors = validate_payload(&payload, false);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let email = normalize_email(payload.email.as_deref().unwrap_or_default());
        let phone = payload.phone.clone().unwrap_or_default();
        self.check_email_free(&email, None).await?;
        self.check_phone_free(&phone, None).await?;

        let now = Utc::now();
        let mut consultant = Consultant {
            id: None,
            account,
            name: add_dr_prefix(payload.name.as_deref().unwrap_or_default()),
            email,
            phone,
            specialization: payload.specialization.unwrap_or_default(),
            location: payload.location.unwrap_or_default(),
            sub_location: payload.sub_location.unwrap_or_default(),
            preferred_hospitals: payload.preferred_hospitals.unwrap_or_default(),
            experience: payload.experience.unwrap_or_default(),
            avatar: payload.avatar,
            mapped_doctors: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.storage.create_consultant(&mut consultant).await?;

        self.audit
            .record(
                account,
                ActivityKind::ConsultantAdded,
                format!(
                    "New consultant {} added to {}",
                    consultant.name, consultant.specialization
                ),
                consultant.id.map(|id| (id, TargetType::Consultant)),
                None,
            )
            .await;

        Ok(consultant)
    }

    pub async fn update(
        &self,
        account: Uuid,
        id: Uuid,
        payload: ConsultantPayload,
    ) -> Result<Consultant> {
        let errors = validate_payload(&payload, true);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        let mut consultant = self.get(account, id).await?;

        if let Some(email) = payload.email.as_deref().map(normalize_email) {
            self.check_email_free(&email, consultant.id).await?;
            consultant.email = email;
        }
        if let Some(phone) = payload.phone {
            self.check_phone_free(&phone, consultant.id).await?;
            consultant.phone = phone;
        }
        if let Some(name) = payload.name {
            consultant.name = add_dr_prefix(&name);
        }
        if let Some(specialization) = payload.specialization {
            consultant.specialization = specialization;
        }
        if let Some(location) = payload.location {
            consultant.location = location;
        }
        if let Some(sub_location) = payload.sub_location {
            consultant.sub_location = sub_location;
        }
        if let Some(hospitals) = payload.preferred_hospitals {
            consultant.preferred_hospitals = hospitals;
        }
        if let Some(experience) = payload.experience {
            consultant.experience = experience;
        }
        if let Some(avatar) = payload.avatar {
            consultant.avatar = Some(avatar);
        }
        consultant.updated_at = Utc::now();

        self.storage.update_consultant(&consultant).await?;

        self.audit
            .record(
                account,
                ActivityKind::ConsultantUpdated,
                format!("Consultant {} profile updated", consultant.name),
                consultant.id.map(|id| (id, TargetType::Consultant)),
                None,
            )
            .await;

        Ok(consultant)
    }

    pub async fn delete(&self, account: Uuid, id: Uuid) -> Result<()> {
        let consultant = self.get(account, id).await?;
        self.storage.delete_consultant(id).await?;

        self.audit
            .record(
                account,
                ActivityKind::ConsultantDeleted,
                format!("Consultant {} deleted", consultant.name),
                Some((id, TargetType::Consultant)),
                None,
            )
            .await;

        Ok(())
    }

    pub async fn bulk_delete(&self, account: Uuid, ids: &[Uuid]) -> Result<usize> {
        let doomed = self.storage.consultants_by_ids(account, ids).await?;
        if doomed.is_empty() {
            return Err(ApiError::NotFound(
                "No consultants found or access denied".to_string(),
            ));
        }
        for consultant in &doomed {
            if let Some(id) = consultant.id {
                self.storage.delete_consultant(id).await?;
            }
        }

        let names: Vec<&str> = doomed.iter().map(|c| c.name.as_str()).collect();
        self.audit
            .record(
                account,
                ActivityKind::BulkOperation,
                format!("Bulk deleted {} consultants", doomed.len()),
                None,
                Some(json!({ "deletedCount": doomed.len(), "consultantNames": names })),
            )
            .await;

        Ok(doomed.len())
    }

    pub async fn bulk_export(
        &self,
        account: Uuid,
        ids: Option<Vec<Uuid>>,
    ) -> Result<Vec<Consultant>> {
        match ids {
            Some(ids) if !ids.is_empty() => self.storage.consultants_by_ids(account, &ids).await,
            _ => self.storage.all_consultants(account).await,
        }
    }

    pub async fn stats(&self, account: Uuid) -> Result<ConsultantStats> {
        let consultants = self.storage.all_consultants(account).await?;
        let total_mappings: u64 = consultants
            .iter()
            .map(|c| c.mapped_doctors.len() as u64)
            .sum();
        let avg_mappings = if consultants.is_empty() {
            0.0
        } else {
            total_mappings as f64 / consultants.len() as f64
        };
        Ok(ConsultantStats {
            total_consultants: consultants.len() as u64,
            specializations: group_counts(consultants.iter().map(|c| c.specialization.clone())),
            locations: group_counts(consultants.iter().map(|c| c.location.clone())),
            mapping_stats: MappingStats {
                total_mappings,
                avg_mappings,
            },
        })
    }

    /// Appends a referral mapping. Conflict when the doctor is already
    /// mapped; both records must belong to the caller.
    pub async fn add_mapping(
        &self,
        account: Uuid,
        consultant_id: Uuid,
        doctor_id: Uuid,
        referrals: Option<u32>,
    ) -> Result<Consultant> {
        let mut consultant = self.get(account, consultant_id).await?;
        let doctor = self
            .storage
            .get_doctor(account, doctor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(DOCTOR_NOT_FOUND.to_string()))?;

        if consultant.mapping_for(doctor_id).is_some() {
            return Err(ApiError::Conflict("Doctor already mapped".to_string()));
        }

        let referrals = referrals.unwrap_or(0);
        consultant.mapped_doctors.push(DoctorMapping {
            doctor: doctor_id,
            referrals,
        });
        consultant.updated_at = Utc::now();
        self.storage.update_consultant(&consultant).await?;

        self.audit
            .record(
                account,
                ActivityKind::MappingCreated,
                format!("New doctor-consultant mapping created for {}", doctor.name),
                Some((consultant_id, TargetType::Mapping)),
                Some(json!({ "doctorName": doctor.name, "referrals": referrals })),
            )
            .await;

        Ok(consultant)
    }

    pub async fn update_mapping(
        &self,
        account: Uuid,
        consultant_id: Uuid,
        doctor_id: Uuid,
        referrals: Option<u32>,
    ) -> Result<Consultant> {
        let mut consultant = self.get(account, consultant_id).await?;
        let doctor = self
            .storage
            .get_doctor(account, doctor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(DOCTOR_NOT_FOUND.to_string()))?;

        let referrals = referrals.unwrap_or(0);
        match consultant
            .mapped_doctors
            .iter_mut()
            .find(|m| m.doctor == doctor_id)
        {
            Some(mapping) => mapping.referrals = referrals,
            None => return Err(ApiError::NotFound("Mapping not found".to_string())),
        }
        consultant.updated_at = Utc::now();
        self.storage.update_consultant(&consultant).await?;

        self.audit
            .record(
                account,
                ActivityKind::MappingUpdated,
                format!("Doctor-consultant mapping updated for {}", doctor.name),
                Some((consultant_id, TargetType::Mapping)),
                Some(json!({ "doctorName": doctor.name, "referrals": referrals })),
            )
            .await;

        Ok(consultant)
    }

    /// Removing a mapping that does not exist silently succeeds.
    pub async fn remove_mapping(
        &self,
        account: Uuid,
        consultant_id: Uuid,
        doctor_id: Uuid,
    ) -> Result<Consultant> {
        let mut consultant = self.get(account, consultant_id).await?;
        let doctor = self
            .storage
            .get_doctor(account, doctor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(DOCTOR_NOT_FOUND.to_string()))?;

        consultant.mapped_doctors.retain(|m| m.doctor != doctor_id);
        consultant.updated_at = Utc::now();
        self.storage.update_consultant(&consultant).await?;

        self.audit
            .record(
                account,
                ActivityKind::MappingRemoved,
                format!("Doctor-consultant mapping removed for {}", doctor.name),
                Some((consultant_id, TargetType::Mapping)),
                Some(json!({ "doctorName": doctor.name })),
            )
            .await;

        Ok(consultant)
    }

    /// Resolves mapping entries against the doctor collection for read
    /// responses. Dangling references keep their id with no name.
    pub async fn view(&self, consultant: Consultant) -> Result<ConsultantView> {
        let ids: Vec<Uuid> = consultant.mapped_doctors.iter().map(|m| m.doctor).collect();
        let doctors = self.storage.doctors_by_ids(consultant.account, &ids).await?;
        let by_id: HashMap<Uuid, (String, String)> = doctors
            .into_iter()
            .filter_map(|d| d.id.map(|id| (id, (d.name, d.specialization))))
            .collect();

        let mapped_doctors = consultant
            .mapped_doctors
            .iter()
            .map(|m| {
                let details = by_id.get(&m.doctor);
                MappedDoctorView {
                    doctor: m.doctor,
                    doctor_name: details.map(|(name, _)| name.clone()),
                    specialization: details.map(|(_, spec)| spec.clone()),
                    referrals: m.referrals,
                }
            })
            .collect();

        Ok(ConsultantView {
            id: consultant.id,
            account: consultant.account,
            name: consultant.name,
            email: consultant.email,
            phone: consultant.phone,
            specialization: consultant.specialization,
            location: consultant.location,
            sub_location: consultant.sub_location,
            preferred_hospitals: consultant.preferred_hospitals,
            experience: consultant.experience,
            avatar: consultant.avatar,
            mapped_doctors,
            created_at: consultant.created_at,
            updated_at: consultant.updated_at,
        })
    }

    pub async fn view_all(&self, consultants: Vec<Consultant>) -> Result<Vec<ConsultantView>> {
        let mut views = Vec::with_capacity(consultants.len());
        for consultant in consultants {
            views.push(self.view(consultant).await?);
        }
        Ok(views)
    }

    async fn check_email_free(&self, email: &str, exclude: Option<Uuid>) -> Result<()> {
        if self.storage.find_doctor_by_email(email).await?.is_some() {
            return Err(ApiError::Conflict(
                "Email already exists in doctors".to_string(),
            ));
        }
        if let Some(existing) = self.storage.find_consultant_by_email(email).await? {
            if existing.id != exclude {
                return Err(ApiError::Conflict("Email already exists".to_string()));
            }
        }
        Ok(())
    }

    async fn check_phone_free(&self, phone: &str, exclude: Option<Uuid>) -> Result<()> {
        if self.storage.find_doctor_by_phone(phone).await?.is_some() {
            return Err(ApiError::Conflict(
                "Phone number already exists in doctors".to_string(),
            ));
        }
        if let Some(existing) = self.storage.find_consultant_by_phone(phone).await? {
            if existing.id != exclude {
                return Err(ApiError::Conflict(
                    "Phone number already exists".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn validate_payload(payload: &ConsultantPayload, partial: bool) -> Vec<String> {
    let mut errors = Vec::new();
    if !partial || payload.name.is_some() {
        validate::require(payload.name.as_deref(), "Name is required", &mut errors);
    }
    if !partial || payload.email.is_some() {
        let valid = payload
            .email
            .as_deref()
            .map(|email| validate::is_valid_email(email.trim()))
            .unwrap_or(false);
        if !valid {
            errors.push("Valid email is required".to_string());
        }
    }
    if !partial || payload.phone.is_some() {
        let valid = payload
            .phone
            .as_deref()
            .map(validate::is_valid_phone)
            .unwrap_or(false);
        if !valid {
            errors.push("Phone number must be exactly 10 digits".to_string());
        }
    }
    if !partial || payload.specialization.is_some() {
        validate::require(
            payload.specialization.as_deref(),
            "Specialization is required",
            &mut errors,
        );
    }
    if !partial || payload.location.is_some() {
        validate::require(
            payload.location.as_deref(),
            "Location is required",
            &mut errors,
        );
    }
    if !partial || payload.sub_location.is_some() {
        validate::require(
            payload.sub_location.as_deref(),
            "Sub-location is required",
            &mut errors,
        );
    }
    if !partial || payload.experience.is_some() {
        validate::require(
            payload.experience.as_deref(),
            "Experience is required",
            &mut errors,
        );
    }
    if let Some(avatar) = payload.avatar.as_deref() {
        if !validate::is_valid_avatar(avatar) {
            errors.push("Avatar must be a valid URL or SVG data URI".to_string());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_the_full_field_set() {
        let errors = validate_payload(&ConsultantPayload::default(), false);
        assert_eq!(errors.len(), 7);
        assert!(errors.contains(&"Valid email is required".to_string()));
        assert!(errors.contains(&"Sub-location is required".to_string()));
        assert!(errors.contains(&"Experience is required".to_string()));
    }

    #[test]
    fn partial_update_checks_only_supplied_fields() {
        let payload = ConsultantPayload {
            email: Some("broken".to_string()),
            ..Default::default()
        };
        let errors = validate_payload(&payload, true);
        assert_eq!(errors, vec!["Valid email is required".to_string()]);
    }
}
