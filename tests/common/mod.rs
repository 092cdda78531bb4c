#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use refnet::service::activities::DoctorActivityPayload;
use refnet::service::consultants::ConsultantPayload;
use refnet::service::doctors::DoctorPayload;
use refnet::service::{
    ConsultantService, DashboardService, DoctorActivityService, DoctorService, Recorder,
};
use refnet::storage::{InMemoryStorage, Storage};

pub struct TestApp {
    pub storage: Arc<dyn Storage>,
    pub doctors: DoctorService,
    pub consultants: ConsultantService,
    pub activities: DoctorActivityService,
    pub dashboard: DashboardService,
    pub audit: Recorder,
    pub account: Uuid,
}

pub fn test_app() -> TestApp {
    let storage: Arc<dyn Storage> = Arc::new(InMemoryStorage::new());
    let audit = Recorder::new(storage.clone());
    TestApp {
        doctors: DoctorService::new(storage.clone(), audit.clone()),
        consultants: ConsultantService::new(storage.clone(), audit.clone()),
        activities: DoctorActivityService::new(storage.clone()),
        dashboard: DashboardService::new(storage.clone(), audit.clone()),
        audit,
        account: Uuid::new_v4(),
        storage,
    }
}

pub fn doctor_payload(name: &str) -> DoctorPayload {
    DoctorPayload {
        name: Some(name.to_string()),
        specialization: Some("Cardiologist".to_string()),
        specialization_type: Some("Consultant".to_string()),
        location: Some("andheri".to_string()),
        ..Default::default()
    }
}

pub fn consultant_payload(name: &str, email: &str, phone: &str) -> ConsultantPayload {
    ConsultantPayload {
        name: Some(name.to_string()),
        email: Some(email.to_string()),
        phone: Some(phone.to_string()),
        specialization: Some("Dermatologist".to_string()),
        location: Some("bandra".to_string()),
        sub_location: Some("linking road".to_string()),
        experience: Some("8 years".to_string()),
        ..Default::default()
    }
}

pub fn activity_payload(doctor_name: &str, date: &str, location: &str) -> DoctorActivityPayload {
    DoctorActivityPayload {
        doctor_name: Some(doctor_name.to_string()),
        activity_date: Some(date.to_string()),
        location: Some(location.to_string()),
        ..Default::default()
    }
}
