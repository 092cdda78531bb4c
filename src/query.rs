use std::cmp::Ordering;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{Consultant, Doctor, DoctorActivity};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Anything other than the literal "desc" sorts ascending.
    pub fn parse(value: &str) -> Self {
        if value == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    }
}

/// 1-indexed page selection.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// One page of results plus the total count over the same filters.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

pub fn paginate<T>(mut items: Vec<T>, params: &PageParams) -> Page<T> {
    let total = items.len() as u64;
    let start = (params.page.max(1) - 1).saturating_mul(params.limit) as usize;
    let items = if start >= items.len() {
        Vec::new()
    } else {
        let end = items.len().min(start.saturating_add(params.limit as usize));
        items.drain(start..end).collect()
    };
    Page { items, total }
}

/// Splits a comma-separated query parameter into trimmed, non-empty values.
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// 0 = Sunday .. 6 = Saturday, derived from the stored timestamp.
pub fn day_of_week(ts: &DateTime<Utc>) -> u32 {
    ts.weekday().num_days_from_sunday()
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[derive(Debug, Default, Clone)]
pub struct DoctorQuery {
    pub location: Option<String>,
    pub locations: Vec<String>,
    pub specialization: Option<String>,
    pub specializations: Vec<String>,
    pub specialization_type: Option<String>,
    pub specialization_types: Vec<String>,
    pub sub_location: Option<String>,
    pub phone_number: Option<String>,
    pub hospitals: Vec<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub page: PageParams,
}

impl DoctorQuery {
    pub fn matches(&self, doctor: &Doctor) -> bool {
        if !self.locations.is_empty() {
            if !self.locations.contains(&doctor.location) {
                return false;
            }
        } else if let Some(location) = &self.location {
            if &doctor.location != location {
                return false;
            }
        }

        // Multi-valued filters take precedence over their single-valued form.
        if !self.specializations.is_empty() {
            if !self.specializations.contains(&doctor.specialization) {
                return false;
            }
        } else if let Some(specialization) = &self.specialization {
            if &doctor.specialization != specialization {
                return false;
            }
        }

        let type_str = doctor.specialization_type.as_str();
        if !self.specialization_types.is_empty() {
            if !self.specialization_types.iter().any(|t| t == type_str) {
                return false;
            }
        } else if let Some(specialization_type) = &self.specialization_type {
            if specialization_type != type_str {
                return false;
            }
        }

        if let Some(needle) = &self.sub_location {
            let hit = doctor
                .sub_location
                .as_deref()
                .map_or(false, |value| contains_ci(value, needle));
            if !hit {
                return false;
            }
        }

        if let Some(needle) = &self.phone_number {
            let hit = doctor
                .phone_number
                .as_deref()
                .map_or(false, |value| contains_ci(value, needle));
            if !hit {
                return false;
            }
        }

        // ANY-match: one shared hospital is enough.
        if !self.hospitals.is_empty()
            && !self
                .hospitals
                .iter()
                .any(|h| doctor.preferred_hospitals.iter().any(|p| p == h))
        {
            return false;
        }

        if let Some(search) = &self.search {
            let hit = contains_ci(&doctor.name, search)
                || contains_ci(&doctor.specialization, search)
                || contains_ci(&doctor.location, search)
                || doctor
                    .sub_location
                    .as_deref()
                    .map_or(false, |value| contains_ci(value, search));
            if !hit {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, mut items: Vec<Doctor>) -> Page<Doctor> {
        items.retain(|doctor| self.matches(doctor));
        let order = self.order.unwrap_or(SortOrder::Asc);
        let key = self.sort_by.as_deref().unwrap_or("name");
        items.sort_by(|a, b| {
            let ord = match key {
                "specialization" => a.specialization.cmp(&b.specialization),
                "specializationType" => a
                    .specialization_type
                    .as_str()
                    .cmp(b.specialization_type.as_str()),
                "location" => a.location.cmp(&b.location),
                "subLocation" => a.sub_location.cmp(&b.sub_location),
                "phoneNumber" => a.phone_number.cmp(&b.phone_number),
                "email" => a.email.cmp(&b.email),
                "createdAt" => a.created_at.cmp(&b.created_at),
                "updatedAt" => a.updated_at.cmp(&b.updated_at),
                _ => a.name.cmp(&b.name),
            };
            order.apply(ord)
        });
        paginate(items, &self.page)
    }
}

#[derive(Debug, Default, Clone)]
pub struct ConsultantQuery {
    pub location: Option<String>,
    pub specialization: Option<String>,
    pub specializations: Vec<String>,
    pub sub_location: Option<String>,
    pub phone_number: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub page: PageParams,
}

impl ConsultantQuery {
    pub fn matches(&self, consultant: &Consultant) -> bool {
        if let Some(location) = &self.location {
            if &consultant.location != location {
                return false;
            }
        }

        if !self.specializations.is_empty() {
            if !self.specializations.contains(&consultant.specialization) {
                return false;
            }
        } else if let Some(specialization) = &self.specialization {
            if &consultant.specialization != specialization {
                return false;
            }
        }

        if let Some(needle) = &self.sub_location {
            if !contains_ci(&consultant.sub_location, needle) {
                return false;
            }
        }

        if let Some(needle) = &self.phone_number {
            if !contains_ci(&consultant.phone, needle) {
                return false;
            }
        }

        if let Some(search) = &self.search {
            let hit = contains_ci(&consultant.name, search)
                || contains_ci(&consultant.email, search)
                || contains_ci(&consultant.phone, search)
                || contains_ci(&consultant.specialization, search)
                || contains_ci(&consultant.location, search)
                || contains_ci(&consultant.sub_location, search);
            if !hit {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, mut items: Vec<Consultant>) -> Page<Consultant> {
        items.retain(|consultant| self.matches(consultant));
        let order = self.order.unwrap_or(SortOrder::Asc);
        let key = self.sort_by.as_deref().unwrap_or("name");
        items.sort_by(|a, b| {
            let ord = match key {
                "email" => a.email.cmp(&b.email),
                "phone" => a.phone.cmp(&b.phone),
                "specialization" => a.specialization.cmp(&b.specialization),
                "location" => a.location.cmp(&b.location),
                "subLocation" => a.sub_location.cmp(&b.sub_location),
                "experience" => a.experience.cmp(&b.experience),
                "createdAt" => a.created_at.cmp(&b.created_at),
                "updatedAt" => a.updated_at.cmp(&b.updated_at),
                _ => a.name.cmp(&b.name),
            };
            order.apply(ord)
        });
        paginate(items, &self.page)
    }
}

#[derive(Debug, Default, Clone)]
pub struct DoctorActivityQuery {
    pub doctor_name: Option<String>,
    pub location: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    pub day_of_week: Option<u32>,
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub page: PageParams,
}

impl DoctorActivityQuery {
    pub fn matches(&self, activity: &DoctorActivity) -> bool {
        if let Some(needle) = &self.doctor_name {
            if !contains_ci(&activity.doctor_name, needle) {
                return false;
            }
        }

        if let Some(needle) = &self.location {
            if !contains_ci(&activity.location, needle) {
                return false;
            }
        }

        if let Some(from) = &self.date_from {
            if activity.activity_date < *from {
                return false;
            }
        }

        if let Some(to) = &self.date_to {
            if activity.activity_date > *to {
                return false;
            }
        }

        // Derived per record; the same predicate feeds page and total so the
        // two stay consistent.
        if let Some(day) = self.day_of_week {
            if day_of_week(&activity.activity_date) != day {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, mut items: Vec<DoctorActivity>) -> Page<DoctorActivity> {
        items.retain(|activity| self.matches(activity));
        let order = self.order.unwrap_or(SortOrder::Desc);
        let key = self.sort_by.as_deref().unwrap_or("activityDate");
        items.sort_by(|a, b| {
            let ord = match key {
                "doctorName" => a.doctor_name.cmp(&b.doctor_name),
                "location" => a.location.cmp(&b.location),
                "createdAt" => a.created_at.cmp(&b.created_at),
                "updatedAt" => a.updated_at.cmp(&b.updated_at),
                _ => a.activity_date.cmp(&b.activity_date),
            };
            order.apply(ord)
        });
        paginate(items, &self.page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paginate_slices_and_counts() {
        let items: Vec<u32> = (0..25).collect();
        let first = paginate(items.clone(), &PageParams { page: 1, limit: 10 });
        let second = paginate(items.clone(), &PageParams { page: 2, limit: 10 });
        let third = paginate(items.clone(), &PageParams { page: 3, limit: 10 });
        assert_eq!(first.total, 25);
        assert_eq!(first.items, (0..10).collect::<Vec<_>>());
        assert_eq!(second.items, (10..20).collect::<Vec<_>>());
        assert_eq!(third.items, (20..25).collect::<Vec<_>>());
    }

    #[test]
    fn paginate_past_the_end_is_empty() {
        let page = paginate(vec![1, 2, 3], &PageParams { page: 4, limit: 10 });
        assert!(page.items.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn page_zero_reads_as_page_one() {
        let page = paginate(vec![1, 2, 3], &PageParams { page: 0, limit: 2 });
        assert_eq!(page.items, vec![1, 2]);
    }

    #[test]
    fn parse_list_splits_and_trims() {
        assert_eq!(
            parse_list(Some("a, b ,,c")),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(parse_list(None).is_empty());
        assert!(parse_list(Some("")).is_empty());
    }

    #[test]
    fn parse_date_accepts_both_forms() {
        let plain = parse_date("2025-01-01").unwrap();
        assert_eq!(plain.to_rfc3339(), "2025-01-01T00:00:00+00:00");
        let full = parse_date("2025-01-01T12:30:00Z").unwrap();
        assert_eq!(full.to_rfc3339(), "2025-01-01T12:30:00+00:00");
        assert!(parse_date("january").is_none());
    }

    #[test]
    fn day_of_week_is_sunday_zero() {
        // 2025-01-01 was a Wednesday.
        let wednesday = parse_date("2025-01-01").unwrap();
        assert_eq!(day_of_week(&wednesday), 3);
        let sunday = parse_date("2025-01-05").unwrap();
        assert_eq!(day_of_week(&sunday), 0);
    }

    #[test]
    fn sort_order_parse_defaults_to_asc() {
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("DESC"), SortOrder::Asc);
    }
}
