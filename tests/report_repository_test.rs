//! Integration tests for creating, reading and updating reports

mod common;

use casefile::orm::{cases, reports};
use casefile::sanitize::Sanitizer;
use casefile::{FieldProblem, RecordError, Repository};
use common::{database::*, fixtures::*};
use serde_json::json;

#[actix_rt::test]
async fn test_create_report_applies_defaults() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let case = create_test_case(&db, "C-001", "Whispering Hall")
        .await
        .expect("Failed to create case");

    let report_id = repository::<reports::Entity>(&db)
        .create(
            &input(json!({
                "case_id": case.case_id,
                "report_title": "Night 1",
                "report_content": "<p>Footsteps</p>",
            })),
            INVESTIGATOR,
        )
        .await
        .expect("Failed to create report");
    let report = fetch::<reports::Entity>(&db, report_id).await;

    assert_eq!(report.case_id, case.case_id);
    assert_eq!(report.report_title, "Night 1");
    assert_eq!(report.report_type, "investigation");
    assert_eq!(report.report_content, "<p>Footsteps</p>");
    assert_eq!(report.duration_minutes, 0);
    assert_eq!(report.investigator_id, INVESTIGATOR);
    assert_eq!(report.report_summary, None);
    assert_eq!(report.date_created, report.date_modified);

    let age = chrono::Utc::now().naive_utc() - report.report_date;
    assert!(age.num_seconds() < 60, "report_date should default to now");
}

#[actix_rt::test]
async fn test_create_then_get_round_trip() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let case = create_test_case(&db, "C-002", "Lighthouse")
        .await
        .expect("Failed to create case");
    let repository = repository::<reports::Entity>(&db);

    let report_id = repository
        .create(
            &input(json!({
                "case_id": case.case_id.to_string(),
                "report_title": "  Lamp <i>room</i>\n visit ",
                "report_type": "follow_up",
                "report_date": "2024-10-31T23:15:00",
                "report_content": "<p onclick=\"x()\">EVP at <strong>3am</strong></p><script>alert(1)</script>",
                "moon_phase": "Full",
                "duration_minutes": "45 minutes",
                "participants": "Ana\r\nBo  ",
            })),
            INVESTIGATOR,
        )
        .await
        .expect("Failed to create report");

    let fetched = repository
        .get(report_id)
        .await
        .expect("Failed to fetch report")
        .expect("Created report should exist");

    assert_eq!(fetched.report_id, report_id);
    assert_eq!(fetched.case_id, case.case_id);
    assert_eq!(fetched.report_title, "Lamp room visit");
    assert_eq!(fetched.report_type, "follow_up");
    assert_eq!(
        fetched.report_date.format("%Y-%m-%d %H:%M:%S").to_string(),
        "2024-10-31 23:15:00"
    );
    assert_eq!(
        fetched.report_content,
        "<p>EVP at <strong>3am</strong></p>"
    );
    assert_eq!(fetched.moon_phase.as_deref(), Some("Full"));
    assert_eq!(fetched.duration_minutes, 45);
    assert_eq!(fetched.participants.as_deref(), Some("Ana\nBo"));
}

#[actix_rt::test]
async fn test_create_lists_every_missing_field() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let err = repository::<reports::Entity>(&db)
        .create(&input(json!({ "report_title": "  <b></b> " })), INVESTIGATOR)
        .await
        .expect_err("Report without case or content must be rejected");

    match err {
        RecordError::Validation(e) => {
            let missing: Vec<&str> = e.missing_fields().collect();
            assert_eq!(missing, vec!["case_id", "report_title", "report_content"]);
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[actix_rt::test]
async fn test_create_with_unknown_case_is_persistence_error() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let err = create_test_report(&db, 999, "Orphan")
        .await
        .expect_err("Report pointing at a missing case must be rejected by the store");

    assert!(
        matches!(err, RecordError::Persistence(_)),
        "Expected persistence error, got {:?}",
        err
    );
}

#[actix_rt::test]
async fn test_partial_update_keeps_other_fields() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let case = create_test_case(&db, "C-003", "Mill")
        .await
        .expect("Failed to create case");
    let original = create_test_report(&db, case.case_id, "Night 1")
        .await
        .expect("Failed to create report");

    repository::<reports::Entity>(&db)
        .update(
            original.report_id,
            &input(json!({ "report_title": "Night 1 (revised)", "not_a_column": "x" })),
        )
        .await
        .expect("Failed to update report");
    let updated = fetch::<reports::Entity>(&db, original.report_id).await;

    assert_eq!(updated.report_title, "Night 1 (revised)");
    assert_eq!(updated.report_content, original.report_content);
    assert_eq!(updated.report_type, original.report_type);
    assert_eq!(updated.report_date, original.report_date);
    assert_eq!(updated.duration_minutes, original.duration_minutes);
    assert_eq!(updated.investigator_id, original.investigator_id);
    assert_eq!(updated.date_created, original.date_created);
    assert!(updated.date_modified >= original.date_modified);
}

#[actix_rt::test]
async fn test_negative_duration_is_stored_as_zero() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let case = create_test_case(&db, "C-004", "Barn")
        .await
        .expect("Failed to create case");
    let original = create_test_report(&db, case.case_id, "Night 1")
        .await
        .expect("Failed to create report");

    repository::<reports::Entity>(&db)
        .update(original.report_id, &input(json!({ "duration_minutes": -30 })))
        .await
        .expect("Permissive update should succeed");
    let updated = fetch::<reports::Entity>(&db, original.report_id).await;

    assert_eq!(updated.duration_minutes, 0);
    assert_eq!(updated.report_title, original.report_title);
}

#[actix_rt::test]
async fn test_case_reference_is_frozen() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let first = create_test_case(&db, "C-005", "Chapel")
        .await
        .expect("Failed to create case");
    let second = create_test_case(&db, "C-006", "Crypt")
        .await
        .expect("Failed to create case");
    let report = create_test_report(&db, first.case_id, "Night 1")
        .await
        .expect("Failed to create report");

    repository::<reports::Entity>(&db)
        .update(report.report_id, &input(json!({ "case_id": second.case_id })))
        .await
        .expect("Update naming a frozen field should succeed");
    let updated = fetch::<reports::Entity>(&db, report.report_id).await;

    assert_eq!(updated.case_id, first.case_id);
}

#[actix_rt::test]
async fn test_update_cannot_clear_required_field() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let case = create_test_case(&db, "C-007", "Attic")
        .await
        .expect("Failed to create case");
    let report = create_test_report(&db, case.case_id, "Night 1")
        .await
        .expect("Failed to create report");
    let repository = repository::<reports::Entity>(&db);

    let err = repository
        .update(report.report_id, &input(json!({ "report_title": "   " })))
        .await
        .expect_err("Blanking a required field must be rejected");
    assert!(matches!(err, RecordError::Validation(_)));

    let unchanged = fetch::<reports::Entity>(&db, report.report_id).await;
    assert_eq!(unchanged.report_title, "Night 1");
}

#[actix_rt::test]
async fn test_missing_records_are_not_found() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let repository = repository::<reports::Entity>(&db);

    let missing = repository.get(404).await.expect("Lookup should not fail");
    assert!(missing.is_none());

    let err = repository
        .update(404, &input(json!({ "report_title": "Ghost" })))
        .await
        .expect_err("No report 404");
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "report 404 not found");

    let err = repository.delete(404).await.expect_err("No report 404");
    assert!(err.is_not_found());
}

#[actix_rt::test]
async fn test_strict_mode_rejects_malformed_optional_input() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");
    let case = create_test_case(&db, "C-008", "Cellar")
        .await
        .expect("Failed to create case");
    let strict =
        Repository::<reports::Entity>::new(db.clone()).with_sanitizer(Sanitizer::strict());

    let err = strict
        .create(
            &input(json!({
                "case_id": case.case_id,
                "report_title": "Night 1",
                "report_content": "Knocking",
                "report_type": "seance",
                "duration_minutes": -5,
            })),
            INVESTIGATOR,
        )
        .await
        .expect_err("Strict mode must reject malformed input");

    match err {
        RecordError::Validation(e) => {
            assert!(e.missing_fields().next().is_none());
            let invalid: Vec<&str> = e
                .problems
                .iter()
                .filter_map(|p| match p {
                    FieldProblem::Invalid { field, .. } => Some(field.as_str()),
                    FieldProblem::Missing(_) => None,
                })
                .collect();
            assert_eq!(invalid, vec!["report_type", "duration_minutes"]);
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[actix_rt::test]
async fn test_case_enums_fall_back_to_defaults() {
    let db = setup_test_database()
        .await
        .expect("Failed to set up test database");

    let case = create_record::<cases::Entity>(
        &db,
        &input(json!({
            "case_number": "C-009",
            "case_title": "Orchard",
            "case_status": "haunted",
            "case_priority": "urgent",
            "client_id": 0,
        })),
    )
    .await
    .expect("Failed to create case");

    assert_eq!(case.case_status, "open");
    assert_eq!(case.case_priority, "urgent");
    assert_eq!(case.client_id, None);
    assert_eq!(case.created_by, INVESTIGATOR);
}
