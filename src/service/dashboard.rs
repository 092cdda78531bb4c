use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use super::audit::Recorder;
use crate::domain::{ActivityKind, Consultant, Doctor, TargetType};
use crate::error::Result;
use crate::storage::Storage;

const RECENT_LIMIT: usize = 5;
const FEED_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_doctors: u64,
    pub total_consultants: u64,
    /// Consultants with at least one mapped doctor.
    pub active_mappings: u64,
    pub total_referrals: u64,
    pub recent_doctors: u64,
    pub recent_consultants: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub target_id: Option<Uuid>,
    pub target_type: Option<TargetType>,
    pub metadata: Option<Value>,
}

#[derive(Clone)]
pub struct DashboardService {
    storage: Arc<dyn Storage>,
    audit: Recorder,
}

impl DashboardService {
    pub fn new(storage: Arc<dyn Storage>, audit: Recorder) -> Self {
        Self { storage, audit }
    }

    pub async fn stats(&self, account: Uuid) -> Result<DashboardStats> {
        let doctors = self.storage.all_doctors(account).await?;
        let consultants = self.storage.all_consultants(account).await?;

        let active_mappings = consultants
            .iter()
            .filter(|c| !c.mapped_doctors.is_empty())
            .count() as u64;
        let total_referrals: u64 = consultants
            .iter()
            .flat_map(|c| c.mapped_doctors.iter())
            .map(|m| m.referrals as u64)
            .sum();

        let thirty_days_ago = Utc::now() - Duration::days(30);
        let recent_doctors = doctors
            .iter()
            .filter(|d| d.created_at >= thirty_days_ago)
            .count() as u64;
        let recent_consultants = consultants
            .iter()
            .filter(|c| c.created_at >= thirty_days_ago)
            .count() as u64;

        Ok(DashboardStats {
            total_doctors: doctors.len() as u64,
            total_consultants: consultants.len() as u64,
            active_mappings,
            total_referrals,
            recent_doctors,
            recent_consultants,
        })
    }

    pub async fn recent_doctors(&self, account: Uuid) -> Result<Vec<Doctor>> {
        let mut doctors = self.storage.all_doctors(account).await?;
        doctors.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        doctors.truncate(RECENT_LIMIT);
        Ok(doctors)
    }

    pub async fn recent_consultants(&self, account: Uuid) -> Result<Vec<Consultant>> {
        let mut consultants = self.storage.all_consultants(account).await?;
        consultants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        consultants.truncate(RECENT_LIMIT);
        Ok(consultants)
    }

    /// Never fails: a broken trail yields an empty feed, not an error.
    pub async fn activity_feed(&self, account: Uuid) -> Vec<FeedEntry> {
        let user = match self.storage.get_account(account).await {
            Ok(Some(found)) => found.name,
            Ok(None) => "System".to_string(),
            Err(err) => {
                warn!("account lookup failed for feed: {err}");
                "System".to_string()
            }
        };

        self.audit
            .feed(account, FEED_LIMIT)
            .await
            .into_iter()
            .map(|entry| FeedEntry {
                id: entry.id,
                kind: entry.kind,
                description: entry.description,
                user: user.clone(),
                timestamp: entry.created_at,
                target_id: entry.target_id,
                target_type: entry.target_type,
                metadata: entry.metadata,
            })
            .collect()
    }
}
