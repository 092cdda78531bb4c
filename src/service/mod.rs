use std::collections::HashMap;

use serde::Serialize;

pub mod activities;
pub mod audit;
pub mod consultants;
pub mod dashboard;
pub mod doctors;

pub use activities::DoctorActivityService;
pub use audit::Recorder;
pub use consultants::ConsultantService;
pub use dashboard::DashboardService;
pub use doctors::DoctorService;

/// One bucket of a grouped count, e.g. doctors per specialization.
#[derive(Debug, Clone, Serialize)]
pub struct GroupCount {
    pub value: String,
    pub count: u64,
}

/// Counts occurrences and returns buckets ordered by count descending, value
/// ascending for ties so the order is stable.
pub(crate) fn group_counts(values: impl IntoIterator<Item = String>) -> Vec<GroupCount> {
    let mut counts: HashMap<String, u64> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    let mut buckets: Vec<GroupCount> = counts
        .into_iter()
        .map(|(value, count)| GroupCount { value, count })
        .collect();
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    buckets
}
