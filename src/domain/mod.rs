use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod name;

pub use name::add_dr_prefix;

/// An authenticated owning account. Every stored record is scoped to one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecializationType {
    Consultant,
    #[serde(rename = "General Practitioner")]
    GeneralPractitioner,
}

impl SpecializationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Consultant" => Some(SpecializationType::Consultant),
            "General Practitioner" => Some(SpecializationType::GeneralPractitioner),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecializationType::Consultant => "Consultant",
            SpecializationType::GeneralPractitioner => "General Practitioner",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: Option<Uuid>,
    pub account: Uuid,
    pub name: String,
    pub specialization: String,
    pub specialization_type: SpecializationType,
    pub location: String,
    pub sub_location: Option<String>,
    #[serde(default)]
    pub preferred_hospitals: Vec<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A referral relationship embedded in its parent consultant. At most one
/// entry per (consultant, doctor) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorMapping {
    pub doctor: Uuid,
    pub referrals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultant {
    pub id: Option<Uuid>,
    pub account: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub specialization: String,
    pub location: String,
    pub sub_location: String,
    #[serde(default)]
    pub preferred_hospitals: Vec<String>,
    pub experience: String,
    pub avatar: Option<String>,
    #[serde(default)]
    pub mapped_doctors: Vec<DoctorMapping>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Consultant {
    pub fn mapping_for(&self, doctor_id: Uuid) -> Option<&DoctorMapping> {
        self.mapped_doctors.iter().find(|m| m.doctor == doctor_id)
    }
}

/// A user-entered record of a field visit to a doctor. Distinct from the
/// audit trail: these are data the user manages, not a side effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorActivity {
    pub id: Option<Uuid>,
    pub account: Uuid,
    pub doctor_name: String,
    pub activity_date: DateTime<Utc>,
    pub location: String,
    #[serde(default)]
    pub notes: String,
    pub doctor_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    DoctorAdded,
    DoctorUpdated,
    DoctorDeleted,
    ConsultantAdded,
    ConsultantUpdated,
    ConsultantDeleted,
    MappingCreated,
    MappingUpdated,
    MappingRemoved,
    BulkOperation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetType {
    Doctor,
    Consultant,
    Mapping,
}

/// An append-only audit entry describing a single mutation. Never updated or
/// deleted by normal flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: Option<Uuid>,
    pub account: Uuid,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub description: String,
    pub target_id: Option<Uuid>,
    pub target_type: Option<TargetType>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}
