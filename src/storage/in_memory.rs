use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::traits::Storage;
use crate::domain::*;
use crate::error::Result;
use crate::query::{ConsultantQuery, DoctorActivityQuery, DoctorQuery, Page};

/// In-memory storage backing the server and the test suite. Each collection
/// is its own map so independent reads do not contend.
pub struct InMemoryStorage {
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
    doctors: Arc<Mutex<HashMap<Uuid, Doctor>>>,
    consultants: Arc<Mutex<HashMap<Uuid, Consultant>>>,
    activities: Arc<Mutex<HashMap<Uuid, Activity>>>,
    doctor_activities: Arc<Mutex<HashMap<Uuid, DoctorActivity>>>,
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(Mutex::new(HashMap::new())),
            doctors: Arc::new(Mutex::new(HashMap::new())),
            consultants: Arc::new(Mutex::new(HashMap::new())),
            activities: Arc::new(Mutex::new(HashMap::new())),
            doctor_activities: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn upsert_account(&self, account: &Account) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        accounts.insert(account.id, account.clone());
        debug!("Registered account {} ({})", account.name, account.id);
        Ok(())
    }

    async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.get(&id).cloned())
    }

    async fn create_doctor(&self, doctor: &mut Doctor) -> Result<()> {
        let id = Uuid::new_v4();
        doctor.id = Some(id);

        let mut doctors = self.doctors.lock().unwrap();
        doctors.insert(id, doctor.clone());

        debug!("Created doctor: {} with id {}", doctor.name, id);
        Ok(())
    }

    async fn get_doctor(&self, account: Uuid, id: Uuid) -> Result<Option<Doctor>> {
        let doctors = self.doctors.lock().unwrap();
        Ok(doctors
            .get(&id)
            .filter(|doctor| doctor.account == account)
            .cloned())
    }

    async fn update_doctor(&self, doctor: &Doctor) -> Result<()> {
        let id = doctor
            .id
            .ok_or_else(|| anyhow::anyhow!("cannot update doctor without id"))?;
        let mut doctors = self.doctors.lock().unwrap();
        doctors.insert(id, doctor.clone());

        debug!("Updated doctor: {} with id {}", doctor.name, id);
        Ok(())
    }

    async fn delete_doctor(&self, id: Uuid) -> Result<()> {
        let mut doctors = self.doctors.lock().unwrap();
        doctors.remove(&id);
        debug!("Deleted doctor {id}");
        Ok(())
    }

    async fn list_doctors(&self, account: Uuid, query: &DoctorQuery) -> Result<Page<Doctor>> {
        let doctors = self.doctors.lock().unwrap();
        let owned = doctors
            .values()
            .filter(|doctor| doctor.account == account)
            .cloned()
            .collect();
        Ok(query.apply(owned))
    }

    async fn all_doctors(&self, account: Uuid) -> Result<Vec<Doctor>> {
        let doctors = self.doctors.lock().unwrap();
        Ok(doctors
            .values()
            .filter(|doctor| doctor.account == account)
            .cloned()
            .collect())
    }

    async fn doctors_by_ids(&self, account: Uuid, ids: &[Uuid]) -> Result<Vec<Doctor>> {
        let doctors = self.doctors.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| doctors.get(id))
            .filter(|doctor| doctor.account == account)
            .cloned()
            .collect())
    }

    async fn find_doctor_by_email(&self, email: &str) -> Result<Option<Doctor>> {
        let doctors = self.doctors.lock().unwrap();
        Ok(doctors
            .values()
            .find(|doctor| doctor.email.as_deref() == Some(email))
            .cloned())
    }

    async fn find_doctor_by_phone(&self, phone: &str) -> Result<Option<Doctor>> {
        let doctors = self.doctors.lock().unwrap();
        Ok(doctors
            .values()
            .find(|doctor| doctor.phone_number.as_deref() == Some(phone))
            .cloned())
    }

    async fn create_consultant(&self, consultant: &mut Consultant) -> Result<()> {
        let id = Uuid::new_v4();
        consultant.id = Some(id);

        let mut consultants = self.consultants.lock().unwrap();
        consultants.insert(id, consultant.clone());

        debug!("Created consultant: {} with id {}", consultant.name, id);
        Ok(())
    }

    async fn get_consultant(&self, account: Uuid, id: Uuid) -> Result<Option<Consultant>> {
        let consultants = self.consultants.lock().unwrap();
        Ok(consultants
            .get(&id)
            .filter(|consultant| consultant.account == account)
            .cloned())
    }

    async fn update_consultant(&self, consultant: &Consultant) -> Result<()> {
        let id = consultant
            .id
            .ok_or_else(|| anyhow::anyhow!("cannot update consultant without id"))?;
        let mut consultants = self.consultants.lock().unwrap();
        consultants.insert(id, consultant.clone());

        debug!("Updated consultant: {} with id {}", consultant.name, id);
        Ok(())
    }

    async fn delete_consultant(&self, id: Uuid) -> Result<()> {
        let mut consultants = self.consultants.lock().unwrap();
        consultants.remove(&id);
        debug!("Deleted consultant {id}");
        Ok(())
    }

    async fn list_consultants(
        &self,
        account: Uuid,
        query: &ConsultantQuery,
    ) -> Result<Page<Consultant>> {
        let consultants = self.consultants.lock().unwrap();
        let owned = consultants
            .values()
            .filter(|consultant| consultant.account == account)
            .cloned()
            .collect();
        Ok(query.apply(owned))
    }

    async fn all_consultants(&self, account: Uuid) -> Result<Vec<Consultant>> {
        let consultants = self.consultants.lock().unwrap();
        Ok(consultants
            .values()
            .filter(|consultant| consultant.account == account)
            .cloned()
            .collect())
    }

    async fn consultants_by_ids(&self, account: Uuid, ids: &[Uuid]) -> Result<Vec<Consultant>> {
        let consultants = self.consultants.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| consultants.get(id))
            .filter(|consultant| consultant.account == account)
            .cloned()
            .collect())
    }

    async fn find_consultant_by_email(&self, email: &str) -> Result<Option<Consultant>> {
        let consultants = self.consultants.lock().unwrap();
        Ok(consultants
            .values()
            .find(|consultant| consultant.email == email)
            .cloned())
    }

    async fn find_consultant_by_phone(&self, phone: &str) -> Result<Option<Consultant>> {
        let consultants = self.consultants.lock().unwrap();
        Ok(consultants
            .values()
            .find(|consultant| consultant.phone == phone)
            .cloned())
    }

    async fn create_activity(&self, activity: &mut Activity) -> Result<()> {
        let id = Uuid::new_v4();
        activity.id = Some(id);

        let mut activities = self.activities.lock().unwrap();
        activities.insert(id, activity.clone());
        Ok(())
    }

    async fn recent_activities(&self, account: Uuid, limit: usize) -> Result<Vec<Activity>> {
        let activities = self.activities.lock().unwrap();
        let mut owned: Vec<Activity> = activities
            .values()
            .filter(|activity| activity.account == account)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        owned.truncate(limit);
        Ok(owned)
    }

    async fn create_doctor_activity(&self, activity: &mut DoctorActivity) -> Result<()> {
        let id = Uuid::new_v4();
        activity.id = Some(id);

        let mut activities = self.doctor_activities.lock().unwrap();
        activities.insert(id, activity.clone());

        debug!(
            "Created activity for {} on {}",
            activity.doctor_name, activity.activity_date
        );
        Ok(())
    }

    async fn get_doctor_activity(
        &self,
        account: Uuid,
        id: Uuid,
    ) -> Result<Option<DoctorActivity>> {
        let activities = self.doctor_activities.lock().unwrap();
        Ok(activities
            .get(&id)
            .filter(|activity| activity.account == account)
            .cloned())
    }

    async fn update_doctor_activity(&self, activity: &DoctorActivity) -> Result<()> {
        let id = activity
            .id
            .ok_or_else(|| anyhow::anyhow!("cannot update activity without id"))?;
        let mut activities = self.doctor_activities.lock().unwrap();
        activities.insert(id, activity.clone());
        Ok(())
    }

    async fn delete_doctor_activity(&self, id: Uuid) -> Result<()> {
        let mut activities = self.doctor_activities.lock().unwrap();
        activities.remove(&id);
        Ok(())
    }

    async fn list_doctor_activities(
        &self,
        account: Uuid,
        query: &DoctorActivityQuery,
    ) -> Result<Page<DoctorActivity>> {
        let activities = self.doctor_activities.lock().unwrap();
        let owned = activities
            .values()
            .filter(|activity| activity.account == account)
            .cloned()
            .collect();
        Ok(query.apply(owned))
    }

    async fn all_doctor_activities(&self, account: Uuid) -> Result<Vec<DoctorActivity>> {
        let activities = self.doctor_activities.lock().unwrap();
        Ok(activities
            .values()
            .filter(|activity| activity.account == account)
            .cloned()
            .collect())
    }

    async fn doctor_activities_by_ids(
        &self,
        account: Uuid,
        ids: &[Uuid],
    ) -> Result<Vec<DoctorActivity>> {
        let activities = self.doctor_activities.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| activities.get(id))
            .filter(|activity| activity.account == account)
            .cloned()
            .collect())
    }
}
