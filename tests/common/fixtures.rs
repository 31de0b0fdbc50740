//! Test fixtures for creating test data
#![allow(dead_code)]

use casefile::orm::{cases, clients, evidence, locations, reports};
use casefile::schema::ManagedEntity;
use casefile::{RawInput, RecordError};
use sea_orm::{DatabaseConnection, PrimaryKeyTrait};
use serde_json::json;

pub const INVESTIGATOR: i32 = 5;

/// Build raw input from a JSON object literal.
pub fn input(value: serde_json::Value) -> RawInput {
    value
        .as_object()
        .cloned()
        .expect("fixture input must be a JSON object")
}

/// Create a record as `INVESTIGATOR` and read it back.
pub async fn create_record<E>(
    db: &DatabaseConnection,
    input: &RawInput,
) -> Result<E::Model, RecordError>
where
    E: ManagedEntity,
    E::Model: Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    let repository = super::database::repository::<E>(db);
    let id = repository.create(input, INVESTIGATOR).await?;
    repository.get(id).await?.ok_or(RecordError::NotFound {
        entity: E::schema().kind,
        id,
    })
}

/// Read back a record that must exist.
pub async fn fetch<E>(db: &DatabaseConnection, id: i32) -> E::Model
where
    E: ManagedEntity,
    E::Model: Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    super::database::repository::<E>(db)
        .get(id)
        .await
        .expect("Failed to fetch record")
        .expect("Record should exist")
}

pub async fn create_test_client(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<clients::Model, RecordError> {
    let fields = input(json!({ "first_name": first_name, "last_name": last_name }));
    create_record::<clients::Entity>(db, &fields).await
}

pub async fn create_test_location(
    db: &DatabaseConnection,
    name: &str,
) -> Result<locations::Model, RecordError> {
    create_record::<locations::Entity>(db, &input(json!({ "location_name": name }))).await
}

pub async fn create_test_case(
    db: &DatabaseConnection,
    number: &str,
    title: &str,
) -> Result<cases::Model, RecordError> {
    let fields = input(json!({ "case_number": number, "case_title": title }));
    create_record::<cases::Entity>(db, &fields).await
}

pub async fn create_test_report(
    db: &DatabaseConnection,
    case_id: i32,
    title: &str,
) -> Result<reports::Model, RecordError> {
    let fields = input(json!({
        "case_id": case_id,
        "report_title": title,
        "report_content": "<p>Cold spot in the hallway</p>",
    }));
    create_record::<reports::Entity>(db, &fields).await
}

pub async fn create_test_evidence(
    db: &DatabaseConnection,
    case_id: Option<i32>,
    report_id: Option<i32>,
    title: &str,
) -> Result<evidence::Model, RecordError> {
    let fields = input(json!({
        "case_id": case_id,
        "report_id": report_id,
        "evidence_title": title,
    }));
    create_record::<evidence::Entity>(db, &fields).await
}
