mod common;

use std::collections::HashSet;

use common::{activity_payload, consultant_payload, doctor_payload, test_app};
use refnet::query::{DoctorActivityQuery, DoctorQuery, PageParams, SortOrder};
use refnet::service::doctors::DoctorPayload;
use uuid::Uuid;

#[tokio::test]
async fn pagination_covers_every_record_without_overlap() {
    let app = test_app();
    for i in 1..=25 {
        app.doctors
            .create(app.account, doctor_payload(&format!("Doc{i:02}")))
            .await
            .unwrap();
    }

    let mut seen = HashSet::new();
    let mut sizes = Vec::new();
    for page in 1..=3 {
        let result = app
            .doctors
            .list(
                app.account,
                &DoctorQuery {
                    page: PageParams { page, limit: 10 },
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.total, 25);
        sizes.push(result.items.len());
        for doctor in result.items {
            assert!(seen.insert(doctor.id.unwrap()), "page overlap");
        }
    }
    assert_eq!(sizes, vec![10, 10, 5]);
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn total_count_reflects_the_same_filters_as_the_page() {
    let app = test_app();
    for i in 0..3 {
        let payload = DoctorPayload {
            location: Some("andheri".to_string()),
            ..doctor_payload(&format!("A{i}"))
        };
        app.doctors.create(app.account, payload).await.unwrap();
    }
    for i in 0..2 {
        let payload = DoctorPayload {
            location: Some("bandra".to_string()),
            ..doctor_payload(&format!("B{i}"))
        };
        app.doctors.create(app.account, payload).await.unwrap();
    }

    let query = DoctorQuery {
        location: Some("andheri".to_string()),
        page: PageParams { page: 1, limit: 2 },
        ..Default::default()
    };
    let result = app.doctors.list(app.account, &query).await.unwrap();
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.total, 3);

    // An effectively unbounded page returns exactly `total` records.
    let unbounded = DoctorQuery {
        location: Some("andheri".to_string()),
        page: PageParams {
            page: 1,
            limit: u64::MAX,
        },
        ..Default::default()
    };
    let everything = app.doctors.list(app.account, &unbounded).await.unwrap();
    assert_eq!(everything.items.len() as u64, everything.total);
}

#[tokio::test]
async fn queries_are_scoped_to_the_owning_account() {
    let app = test_app();
    let other = Uuid::new_v4();
    app.doctors
        .create(app.account, doctor_payload("Mine"))
        .await
        .unwrap();
    app.doctors
        .create(other, doctor_payload("Theirs"))
        .await
        .unwrap();

    let result = app
        .doctors
        .list(app.account, &DoctorQuery::default())
        .await
        .unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].name, "Dr. Mine");
}

#[tokio::test]
async fn search_matches_across_fields_case_insensitively() {
    let app = test_app();
    let payload = DoctorPayload {
        sub_location: Some("Lokhandwala".to_string()),
        ..doctor_payload("Mehta")
    };
    app.doctors.create(app.account, payload).await.unwrap();
    app.doctors
        .create(app.account, doctor_payload("Shah"))
        .await
        .unwrap();

    let query = DoctorQuery {
        search: Some("lokhand".to_string()),
        ..Default::default()
    };
    let result = app.doctors.list(app.account, &query).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].name, "Dr. Mehta");

    // Name hits count too.
    let query = DoctorQuery {
        search: Some("SHAH".to_string()),
        ..Default::default()
    };
    assert_eq!(app.doctors.list(app.account, &query).await.unwrap().total, 1);
}

#[tokio::test]
async fn hospital_filter_matches_on_any_shared_hospital() {
    let app = test_app();
    let payload = DoctorPayload {
        preferred_hospitals: Some(vec!["Lilavati".to_string(), "Hinduja".to_string()]),
        ..doctor_payload("Nair")
    };
    app.doctors.create(app.account, payload).await.unwrap();
    let payload = DoctorPayload {
        preferred_hospitals: Some(vec!["Fortis".to_string()]),
        ..doctor_payload("Puri")
    };
    app.doctors.create(app.account, payload).await.unwrap();

    let query = DoctorQuery {
        hospitals: vec!["Hinduja".to_string(), "Breach Candy".to_string()],
        ..Default::default()
    };
    let result = app.doctors.list(app.account, &query).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].name, "Dr. Nair");
}

#[tokio::test]
async fn multi_valued_specialization_filter_is_set_membership() {
    let app = test_app();
    for (name, spec) in [
        ("A", "Cardiologist"),
        ("B", "Dermatologist"),
        ("C", "Orthopedist"),
    ] {
        let payload = DoctorPayload {
            specialization: Some(spec.to_string()),
            ..doctor_payload(name)
        };
        app.doctors.create(app.account, payload).await.unwrap();
    }

    let query = DoctorQuery {
        specializations: vec!["Cardiologist".to_string(), "Orthopedist".to_string()],
        ..Default::default()
    };
    assert_eq!(app.doctors.list(app.account, &query).await.unwrap().total, 2);
}

#[tokio::test]
async fn sorting_defaults_to_name_ascending_and_honors_desc() {
    let app = test_app();
    for name in ["Charlie", "Alpha", "Bravo"] {
        app.doctors
            .create(app.account, doctor_payload(name))
            .await
            .unwrap();
    }

    let result = app
        .doctors
        .list(app.account, &DoctorQuery::default())
        .await
        .unwrap();
    let names: Vec<&str> = result.items.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. Alpha", "Dr. Bravo", "Dr. Charlie"]);

    let query = DoctorQuery {
        order: Some(SortOrder::Desc),
        ..Default::default()
    };
    let result = app.doctors.list(app.account, &query).await.unwrap();
    let names: Vec<&str> = result.items.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Dr. Charlie", "Dr. Bravo", "Dr. Alpha"]);
}

#[tokio::test]
async fn consultant_search_includes_email_and_phone() {
    let app = test_app();
    app.consultants
        .create(
            app.account,
            consultant_payload("Sen", "sen@clinic.com", "9111111111"),
        )
        .await
        .unwrap();
    app.consultants
        .create(
            app.account,
            consultant_payload("Roy", "roy@clinic.com", "9222222222"),
        )
        .await
        .unwrap();

    let query = refnet::query::ConsultantQuery {
        search: Some("9222".to_string()),
        ..Default::default()
    };
    let result = app.consultants.list(app.account, &query).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].name, "Dr. Roy");
}

#[tokio::test]
async fn day_of_week_filter_selects_only_that_weekday() {
    let app = test_app();
    // 2025-01-01 was a Wednesday, 2025-01-05 a Sunday.
    app.activities
        .create(
            app.account,
            activity_payload("Dr. Mehta", "2025-01-01", "andheri"),
        )
        .await
        .unwrap();
    app.activities
        .create(
            app.account,
            activity_payload("Dr. Shah", "2025-01-05", "bandra"),
        )
        .await
        .unwrap();

    let query = DoctorActivityQuery {
        day_of_week: Some(3),
        ..Default::default()
    };
    let result = app.activities.list(app.account, &query).await.unwrap();
    assert_eq!(result.total, 1);
    assert_eq!(result.items[0].doctor_name, "Dr. Mehta");

    for wrong_day in [0, 1, 2, 4, 5, 6] {
        let query = DoctorActivityQuery {
            day_of_week: Some(wrong_day),
            ..Default::default()
        };
        let result = app.activities.list(app.account, &query).await.unwrap();
        assert!(
            !result.items.iter().any(|a| a.doctor_name == "Dr. Mehta"),
            "wednesday activity leaked into day {wrong_day}"
        );
    }
}

#[tokio::test]
async fn date_range_bounds_are_inclusive() {
    let app = test_app();
    for date in ["2025-03-01", "2025-03-05", "2025-03-10"] {
        app.activities
            .create(app.account, activity_payload("Dr. Rao", date, "andheri"))
            .await
            .unwrap();
    }

    let query = DoctorActivityQuery {
        date_from: refnet::query::parse_date("2025-03-01"),
        date_to: refnet::query::parse_date("2025-03-05"),
        ..Default::default()
    };
    let result = app.activities.list(app.account, &query).await.unwrap();
    assert_eq!(result.total, 2);
}

#[tokio::test]
async fn activities_default_to_newest_first() {
    let app = test_app();
    for date in ["2025-03-01", "2025-03-10", "2025-03-05"] {
        app.activities
            .create(app.account, activity_payload("Dr. Das", date, "andheri"))
            .await
            .unwrap();
    }

    let result = app
        .activities
        .list(app.account, &DoctorActivityQuery::default())
        .await
        .unwrap();
    let dates: Vec<String> = result
        .items
        .iter()
        .map(|a| a.activity_date.format("%Y-%m-%d").to_string())
        .collect();
    assert_eq!(dates, vec!["2025-03-10", "2025-03-05", "2025-03-01"]);
}
