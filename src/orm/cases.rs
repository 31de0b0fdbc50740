//! Investigation cases

use crate::schema::{
    Dependent, EntityKind, EntitySchema, FieldKind, FieldSpec, ManagedEntity, OnParentDelete,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cases")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub case_id: i32,
    pub case_number: String,
    pub case_title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub case_description: Option<String>,
    pub case_status: String,
    pub case_priority: String,
    pub client_id: Option<i32>,
    pub location_id: Option<i32>,
    pub investigation_date: DateTime,
    pub created_by: i32,
    pub date_created: DateTime,
    pub date_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::clients::Entity",
        from = "Column::ClientId",
        to = "super::clients::Column::ClientId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::locations::Entity",
        from = "Column::LocationId",
        to = "super::locations::Column::LocationId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Location,
    #[sea_orm(has_many = "super::reports::Entity")]
    Reports,
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

impl Related<super::locations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reports.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const CASE_STATUSES: &[&str] = &["open", "in_progress", "closed", "archived"];
pub const CASE_PRIORITIES: &[&str] = &["low", "medium", "high", "urgent"];

/// Rows pointing at a case. Reports cannot exist without their case, so a
/// case with reports is not deleted; evidence is kept and detached.
pub const DEPENDENTS: &[Dependent] = &[
    Dependent {
        entity: EntityKind::Evidence,
        table: "evidence",
        key: "evidence_id",
        column: "case_id",
        policy: OnParentDelete::Detach,
    },
    Dependent {
        entity: EntityKind::Report,
        table: "reports",
        key: "report_id",
        column: "case_id",
        policy: OnParentDelete::Restrict,
    },
];

pub static SCHEMA: EntitySchema<Column> = EntitySchema {
    kind: EntityKind::Case,
    table: "cases",
    id: Column::CaseId,
    fields: &[
        FieldSpec::required(Column::CaseNumber, FieldKind::PlainText),
        FieldSpec::required(Column::CaseTitle, FieldKind::PlainText),
        FieldSpec::optional(Column::CaseDescription, FieldKind::RichTextHtml),
        FieldSpec::optional(
            Column::CaseStatus,
            FieldKind::Enum {
                allowed: CASE_STATUSES,
                default: "open",
            },
        ),
        FieldSpec::optional(
            Column::CasePriority,
            FieldKind::Enum {
                allowed: CASE_PRIORITIES,
                default: "medium",
            },
        ),
        FieldSpec::optional(Column::ClientId, FieldKind::Reference),
        FieldSpec::optional(Column::LocationId, FieldKind::Reference),
        FieldSpec::optional(Column::InvestigationDate, FieldKind::Timestamp),
    ],
    actor: Some(Column::CreatedBy),
    created: Some(Column::DateCreated),
    modified: Some(Column::DateModified),
    sortable: &[
        Column::CaseId,
        Column::CaseNumber,
        Column::CaseTitle,
        Column::CaseStatus,
        Column::CasePriority,
        Column::InvestigationDate,
        Column::DateCreated,
        Column::DateModified,
    ],
    default_sort: Column::DateCreated,
    filterable: &[
        Column::CaseStatus,
        Column::CasePriority,
        Column::ClientId,
        Column::LocationId,
        Column::CreatedBy,
    ],
    searchable: &[
        Column::CaseNumber,
        Column::CaseTitle,
        Column::CaseDescription,
    ],
    dependents: DEPENDENTS,
};

impl ManagedEntity for Entity {
    type ActiveModel = ActiveModel;

    fn schema() -> &'static EntitySchema<Column> {
        &SCHEMA
    }
}
