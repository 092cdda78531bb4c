use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;
use crate::query::{ConsultantQuery, DoctorActivityQuery, DoctorQuery, Page};

/// Persistence boundary for all collections. `create_*` assigns the id on the
/// passed record. Reads that take an `account` only see records owned by it.
#[async_trait]
pub trait Storage: Send + Sync {
    // Account operations
    async fn upsert_account(&self, account: &Account) -> Result<()>;
    async fn get_account(&self, id: Uuid) -> Result<Option<Account>>;

    // Doctor operations
    async fn create_doctor(&self, doctor: &mut Doctor) -> Result<()>;
    async fn get_doctor(&self, account: Uuid, id: Uuid) -> Result<Option<Doctor>>;
    async fn update_doctor(&self, doctor: &Doctor) -> Result<()>;
    async fn delete_doctor(&self, id: Uuid) -> Result<()>;
    async fn list_doctors(&self, account: Uuid, query: &DoctorQuery) -> Result<Page<Doctor>>;
    async fn all_doctors(&self, account: Uuid) -> Result<Vec<Doctor>>;
    async fn doctors_by_ids(&self, account: Uuid, ids: &[Uuid]) -> Result<Vec<Doctor>>;
    /// Uniqueness lookups are global: the invariant spans accounts.
    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>>;
    async fn find_doctor_by_phone(&self, phone: &str) -> Result<Option<Doctor>>;

    // Consultant operations
    async fn create_consultant(&self, consultant: &mut Consultant) -> Result<()>;
    async fn get_consultant(&self, account: Uuid, id: Uuid) -> Result<Option<Consultant>>;
    async fn update_consultant(&self, consultant: &Consultant) -> Result<()>;
    async fn delete_consultant(&self, id: Uuid) -> Result<()>;
    async fn list_consultants(
        &self,
        account: Uuid,
        query: &ConsultantQuery,
    ) -> Result<Page<Consultant>>;
    async fn all_consultants(&self, account: Uuid) -> Result<Vec<Consultant>>;
    async fn consultants_by_ids(&self, account: Uuid, ids: &[Uuid]) -> Result<Vec<Consultant>>;
    async fn find_consultant_by_email(&self, email: &str) -> Result<Option<Consultant>>;
    async fn find_consultant_by_phone(&self, phone: &str) -> Result<Option<Consultant>>;

    // Audit trail
    async fn create_activity(&self, activity: &mut Activity) -> Result<()>;
    async fn recent_activities(&self, account: Uuid, limit: usize) -> Result<Vec<Activity>>;

    // Field-activity operations
    async fn create_doctor_activity(&self, activity: &mut DoctorActivity) -> Result<()>;
    async fn get_doctor_activity(&self, account: Uuid, id: Uuid)
        -> Result<Option<DoctorActivity>>;
    async fn update_doctor_activity(&self, activity: &DoctorActivity) -> Result<()>;
    async fn delete_doctor_activity(&self, id: Uuid) -> Result<()>;
    async fn list_doctor_activities(
        &self,
        account: Uuid,
        query: &DoctorActivityQuery,
    ) -> Result<Page<DoctorActivity>>;
    async fn all_doctor_activities(&self, account: Uuid) -> Result<Vec<DoctorActivity>>;
    async fn doctor_activities_by_ids(
        &self,
        account: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<DoctorActivity>>;
}
