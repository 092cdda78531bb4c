use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{group_counts, GroupCount};
use crate::domain::DoctorActivity;
use crate::error::{ApiError, Result};
use crate::query::{self, DoctorActivityQuery, Page};
use crate::storage::Storage;
use crate::validate;

const NOT_FOUND: &str = "Activity not found or access denied";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DoctorActivityPayload {
    pub doctor_name: Option<String>,
    pub activity_date: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub doctor_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCount {
    pub day: u32,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorActivityStats {
    pub total_activities: u64,
    pub activities_by_day: Vec<DayCount>,
    pub activities_by_location: Vec<GroupCount>,
    pub activities_by_doctor: Vec<GroupCount>,
    pub recent_activities: u64,
}

#[derive(Clone)]
pub struct DoctorActivityService {
    storage: Arc<dyn Storage>,
}

impl DoctorActivityService {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    pub async fn list(
        &self,
        account: Uuid,
        query: &DoctorActivityQuery,
    ) -> Result<Page<DoctorActivity>> {
        self.storage.list_doctor_activities(account, query).await
    }

    pub async fn get(&self, account: Uuid, id: Uuid) -> Result<DoctorActivity> {
        self.storage
            .get_doctor_activity(account, id)
            .await?
            .ok_or_else(|| ApiError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn create(
        &self,
        account: Uuid,
        payload: DoctorActivityPayload,
    ) -> Result<DoctorActivity> {
        let errors = validate_payload(&payload, false);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }
        self.check_doctor_reference(account, payload.doctor_id)
            .await?;

        let activity_date = payload
            .activity_date
            .as_deref()
            .and_then(query::parse_date)
            .unwrap_or_else(Utc::now);

        let now = Utc::now();
        let mut activity = DoctorActivity {
            id: None,
            account,
            doctor_name: payload.doctor_name.unwrap_or_default(),
            activity_date,
            location: payload.location.unwrap_or_default(),
            notes: payload.notes.unwrap_or_default(),
            doctor_id: payload.doctor_id,
            created_at: now,
            updated_at: now,
        };
        self.storage.create_doctor_activity(&mut activity).await?;
        Ok(activity)
    }

    pub async fn update(
        &self,
        account: Uuid,
        id: Uuid,
        payload: DoctorActivityPayload,
    ) -> Result<DoctorActivity> {
        let errors = validate_payload(&payload, true);
        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }
        self.check_doctor_reference(account, payload.doctor_id)
            .await?;

        let mut activity = self.get(account, id).await?;

        if let Some(doctor_name) = payload.doctor_name {
            activity.doctor_name = doctor_name;
        }
        if let Some(raw) = payload.activity_date.as_deref() {
            if let Some(activity_date) = query::parse_date(raw) {
                activity.activity_date = activity_date;
            }
        }
        if let Some(location) = payload.location {
            activity.location = location;
        }
        if let Some(notes) = payload.notes {
            activity.notes = notes;
        }
        if payload.doctor_id.is_some() {
            activity.doctor_id = payload.doctor_id;
        }
        activity.updated_at = Utc::now();

        self.storage.update_doctor_activity(&activity).await?;
        Ok(activity)
    }

    pub async fn delete(&self, account: Uuid, id: Uuid) -> Result<()> {
        self.get(account, id).await?;
        self.storage.delete_doctor_activity(id).await
    }

    pub async fn bulk_delete(&self, account: Uuid, ids: &[Uuid]) -> Result<usize> {
        let doomed = self.storage.doctor_activities_by_ids(account, ids).await?;
        if doomed.is_empty() {
            return Err(ApiError::NotFound(
                "No activities found or access denied".to_string(),
            ));
        }
        for activity in &doomed {
            if let Some(id) = activity.id {
                self.storage.delete_doctor_activity(id).await?;
            }
        }
        Ok(doomed.len())
    }

    pub async fn stats(&self, account: Uuid) -> Result<DoctorActivityStats> {
        let activities = self.storage.all_doctor_activities(account).await?;

        let mut by_day = [0u64; 7];
        for activity in &activities {
            by_day[query::day_of_week(&activity.activity_date) as usize] += 1;
        }
        let activities_by_day = by_day
            .iter()
            .enumerate()
            .filter(|(_, count)| **count > 0)
            .map(|(day, count)| DayCount {
                day: day as u32,
                count: *count,
            })
            .collect();

        let mut activities_by_doctor =
            group_counts(activities.iter().map(|a| a.doctor_name.clone()));
        activities_by_doctor.truncate(10);

        let seven_days_ago = Utc::now() - Duration::days(7);
        let recent_activities = activities
            .iter()
            .filter(|a| a.activity_date >= seven_days_ago)
            .count() as u64;

        Ok(DoctorActivityStats {
            total_activities: activities.len() as u64,
            activities_by_day,
            activities_by_location: group_counts(activities.iter().map(|a| a.location.clone())),
            activities_by_doctor,
            recent_activities,
        })
    }

    /// A referenced doctor must exist under the caller's account. The
    /// original reports this as a plain 400, not a field error.
    async fn check_doctor_reference(&self, account: Uuid, doctor_id: Option<Uuid>) -> Result<()> {
        if let Some(doctor_id) = doctor_id {
            if self.storage.get_doctor(account, doctor_id).await?.is_none() {
                return Err(ApiError::bad_request("Doctor not found or access denied"));
            }
        }
        Ok(())
    }
}

fn validate_payload(payload: &DoctorActivityPayload, partial: bool) -> Vec<String> {
    let mut errors = Vec::new();
    if !partial || payload.doctor_name.is_some() {
        validate::require(
            payload.doctor_name.as_deref(),
            "Doctor name is required",
            &mut errors,
        );
    }
    if !partial || payload.activity_date.is_some() {
        let valid = payload
            .activity_date
            .as_deref()
            .and_then(query::parse_date)
            .is_some();
        if !valid {
            errors.push("Valid activity date is required".to_string());
        }
    }
    if !partial || payload.location.is_some() {
        validate::require(
            payload.location.as_deref(),
            "Location is required",
            &mut errors,
        );
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_name_date_location() {
        let errors = validate_payload(&DoctorActivityPayload::default(), false);
        assert_eq!(
            errors,
            vec![
                "Doctor name is required".to_string(),
                "Valid activity date is required".to_string(),
                "Location is required".to_string(),
            ]
        );
    }

    #[test]
    fn malformed_date_is_rejected() {
        let payload = DoctorActivityPayload {
            activity_date: Some("yesterday".to_string()),
            ..Default::default()
        };
        let errors = validate_payload(&payload, true);
        assert_eq!(errors, vec!["Valid activity date is required".to_string()]);
    }
}
