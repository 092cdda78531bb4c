mod common;

use std::sync::Arc;

use async_trait::async_trait;
use common::{activity_payload, consultant_payload, doctor_payload, test_app};
use uuid::Uuid;

use refnet::domain::*;
use refnet::error::{ApiError, Result};
use refnet::query::{ConsultantQuery, DoctorActivityQuery, DoctorQuery, Page};
use refnet::service::activities::DoctorActivityPayload;
use refnet::service::{DashboardService, Recorder};
use refnet::storage::Storage;

#[tokio::test]
async fn mutations_append_audit_entries() {
    let app = test_app();
    let doctor = app
        .doctors
        .create(app.account, doctor_payload("Mehta"))
        .await
        .unwrap();
    let consultant = app
        .consultants
        .create(
            app.account,
            consultant_payload("Shah", "shah@clinic.com", "9000000021"),
        )
        .await
        .unwrap();
    app.consultants
        .add_mapping(
            app.account,
            consultant.id.unwrap(),
            doctor.id.unwrap(),
            Some(2),
        )
        .await
        .unwrap();
    app.consultants
        .remove_mapping(app.account, consultant.id.unwrap(), doctor.id.unwrap())
        .await
        .unwrap();

    let entries = app.audit.feed(app.account, 10).await;
    let kinds: Vec<ActivityKind> = entries.iter().map(|e| e.kind).collect();
    assert!(kinds.contains(&ActivityKind::DoctorAdded));
    assert!(kinds.contains(&ActivityKind::ConsultantAdded));
    assert!(kinds.contains(&ActivityKind::MappingCreated));
    assert!(kinds.contains(&ActivityKind::MappingRemoved));

    let created = entries
        .iter()
        .find(|e| e.kind == ActivityKind::MappingCreated)
        .unwrap();
    assert_eq!(
        created.description,
        "New doctor-consultant mapping created for Dr. Mehta"
    );
    assert_eq!(created.target_type, Some(TargetType::Mapping));
    assert_eq!(
        created.metadata.as_ref().unwrap()["doctorName"],
        "Dr. Mehta"
    );
}

#[tokio::test]
async fn feed_is_limited_and_newest_first() {
    let app = test_app();
    for i in 0..12 {
        app.doctors
            .create(app.account, doctor_payload(&format!("D{i:02}")))
            .await
            .unwrap();
    }

    let entries = app.audit.feed(app.account, 10).await;
    assert_eq!(entries.len(), 10);
    for pair in entries.windows(2) {
        assert!(pair[0].created_at >= pair[1].created_at);
    }
}

#[tokio::test]
async fn field_activity_rejects_a_foreign_doctor_reference() {
    let app = test_app();
    let foreign_doctor = app
        .doctors
        .create(Uuid::new_v4(), doctor_payload("Foreign"))
        .await
        .unwrap();

    let payload = DoctorActivityPayload {
        doctor_id: foreign_doctor.id,
        ..activity_payload("Dr. Foreign", "2025-04-01", "andheri")
    };
    let err = app
        .activities
        .create(app.account, payload)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Doctor not found or access denied");
}

#[tokio::test]
async fn field_activity_crud_roundtrip() {
    let app = test_app();
    let created = app
        .activities
        .create(
            app.account,
            activity_payload("Dr. Mehta", "2025-04-02", "andheri"),
        )
        .await
        .unwrap();
    let id = created.id.unwrap();

    let payload = DoctorActivityPayload {
        notes: Some("left samples".to_string()),
        ..Default::default()
    };
    let updated = app.activities.update(app.account, id, payload).await.unwrap();
    assert_eq!(updated.notes, "left samples");
    assert_eq!(updated.doctor_name, "Dr. Mehta");

    app.activities.delete(app.account, id).await.unwrap();
    let err = app.activities.get(app.account, id).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn dashboard_stats_aggregate_mappings_and_referrals() {
    let app = test_app();
    let d1 = app
        .doctors
        .create(app.account, doctor_payload("One"))
        .await
        .unwrap();
    let d2 = app
        .doctors
        .create(app.account, doctor_payload("Two"))
        .await
        .unwrap();
    let c1 = app
        .consultants
        .create(
            app.account,
            consultant_payload("Alpha", "alpha@clinic.com", "9000000031"),
        )
        .await
        .unwrap();
    app.consultants
        .create(
            app.account,
            consultant_payload("Beta", "beta@clinic.com", "9000000032"),
        )
        .await
        .unwrap();

    app.consultants
        .add_mapping(app.account, c1.id.unwrap(), d1.id.unwrap(), Some(3))
        .await
        .unwrap();
    app.consultants
        .add_mapping(app.account, c1.id.unwrap(), d2.id.unwrap(), Some(4))
        .await
        .unwrap();

    let stats = app.dashboard.stats(app.account).await.unwrap();
    assert_eq!(stats.total_doctors, 2);
    assert_eq!(stats.total_consultants, 2);
    assert_eq!(stats.active_mappings, 1);
    assert_eq!(stats.total_referrals, 7);
    assert_eq!(stats.recent_doctors, 2);
}

/// Storage that fails every call, for exercising degradation paths.
struct BrokenStore;

fn offline<T>() -> Result<T> {
    Err(ApiError::Internal(anyhow::anyhow!("storage offline")))
}

#[async_trait]
impl Storage for BrokenStore {
    async fn upsert_account(&self, _: &Account) -> Result<()> {
        offline()
    }
    async fn get_account(&self, _: Uuid) -> Result<Option<Account>> {
        offline()
    }
    async fn create_doctor(&self, _: &mut Doctor) -> Result<()> {
        offline()
    }
    async fn get_doctor(&self, _: Uuid, _: Uuid) -> Result<Option<Doctor>> {
        offline()
    }
    async fn update_doctor(&self, _: &Doctor) -> Result<()> {
        offline()
    }
    async fn delete_doctor(&self, _: Uuid) -> Result<()> {
        offline()
    }
    async fn list_doctors(&self, _: Uuid, _: &DoctorQuery) -> Result<Page<Doctor>> {
        offline()
    }
    async fn all_doctors(&self, _: Uuid) -> Result<Vec<Doctor>> {
        offline()
    }
    async fn doctors_by_ids(&self, _: Uuid, _: &[Uuid]) -> Result<Vec<Doctor>> {
        offline()
    }
    async fn find_doctor_by_email(&self, _: &str) -> Result<Option<Doctor>> {
        offline()
    }
    async fn find_doctor_by_phone(&self, _: &str) -> Result<Option<Doctor>> {
        offline()
    }
    async fn create_consultant(&self, _: &mut Consultant) -> Result<()> {
        offline()
    }
    async fn get_consultant(&self, _: Uuid, _: Uuid) -> Result<Option<Consultant>> {
        offline()
    }
    async fn update_consultant(&self, _: &Consultant) -> Result<()> {
        offline()
    }
    async fn delete_consultant(&self, _: Uuid) -> Result<()> {
        offline()
    }
    async fn list_consultants(&self, _: Uuid, _: &ConsultantQuery) -> Result<Page<Consultant>> {
        offline()
    }
    async fn all_consultants(&self, _: Uuid) -> Result<Vec<Consultant>> {
        offline()
    }
    async fn consultants_by_ids(&self, _: Uuid, _: &[Uuid]) -> Result<Vec<Consultant>> {
        offline()
    }
    async fn find_consultant_by_email(&self, _: &str) -> Result<Option<Consultant>> {
        offline()
    }
    async fn find_consultant_by_phone(&self, _: &str) -> Result<Option<Consultant>> {
        offline()
    }
    async fn create_activity(&self, _: &mut Activity) -> Result<()> {
        offline()
    }
    async fn recent_activities(&self, _: Uuid, _: usize) -> Result<Vec<Activity>> {
        offline()
    }
    async fn create_doctor_activity(&self, _: &mut DoctorActivity) -> Result<()> {
        offline()
    }
    async fn get_doctor_activity(&self, _: Uuid, _: Uuid) -> Result<Option<DoctorActivity>> {
        offline()
    }
    async fn update_doctor_activity(&self, _: &DoctorActivity) -> Result<()> {
        offline()
    }
    async fn delete_doctor_activity(&self, _: Uuid) -> Result<()> {
        offline()
    }
    async fn list_doctor_activities(
        &self,
        _: Uuid,
        _: &DoctorActivityQuery,
    ) -> Result<Page<DoctorActivity>> {
        offline()
    }
    async fn all_doctor_activities(&self, _: Uuid) -> Result<Vec<DoctorActivity>> {
        offline()
    }
    async fn doctor_activities_by_ids(&self, _: Uuid, _: &[Uuid]) -> Result<Vec<DoctorActivity>> {
        offline()
    }
}

#[tokio::test]
async fn audit_writes_are_swallowed_when_storage_fails() {
    let storage: Arc<dyn Storage> = Arc::new(BrokenStore);
    let recorder = Recorder::new(storage);
    // Returns () even though every write errors underneath.
    recorder
        .record(
            Uuid::new_v4(),
            ActivityKind::DoctorAdded,
            "New doctor Dr. Ghost added to Cardiology",
            None,
            None,
        )
        .await;
}

#[tokio::test]
async fn activity_feed_degrades_to_empty_on_read_failure() {
    let storage: Arc<dyn Storage> = Arc::new(BrokenStore);
    let recorder = Recorder::new(storage.clone());
    assert!(recorder.feed(Uuid::new_v4(), 10).await.is_empty());

    let dashboard = DashboardService::new(storage, recorder);
    let feed = dashboard.activity_feed(Uuid::new_v4()).await;
    assert!(feed.is_empty());
}
