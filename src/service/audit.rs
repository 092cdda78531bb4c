use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{Activity, ActivityKind, TargetType};
use crate::storage::Storage;

/// Append-only audit writer. Invoked synchronously after each primary
/// mutation commits.
#[derive(Clone)]
pub struct Recorder {
    storage: Arc<dyn Storage>,
}

impl Recorder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Best-effort: a failed audit write is logged and swallowed so it can
    /// never fail the mutation it documents.
    pub async fn record(
        &self,
        account: Uuid,
        kind: ActivityKind,
        description: impl Into<String>,
        target: Option<(Uuid, TargetType)>,
        metadata: Option<Value>,
    ) {
        let mut activity = Activity {
            id: None,
            account,
            kind,
            description: description.into(),
            target_id: target.map(|(id, _)| id),
            target_type: target.map(|(_, kind)| kind),
            metadata,
            created_at: Utc::now(),
        };
        if let Err(err) = self.storage.create_activity(&mut activity).await {
            warn!("audit write failed: {err}");
        }
    }

    /// Read side of the trail. Degrades to an empty list on storage failure
    /// so dependent views keep rendering.
    pub async fn feed(&self, account: Uuid, limit: usize) -> Vec<Activity> {
        match self.storage.recent_activities(account, limit).await {
            Ok(entries) => entries,
            Err(err) => {
                warn!("activity feed read failed: {err}");
                Vec::new()
            }
        }
    }
}
