//! Evidence items
//!
//! Both back-references are nullable: evidence outlives the case or report it
//! was logged under.

use crate::schema::{EntityKind, EntitySchema, FieldKind, FieldSpec, ManagedEntity};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evidence")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub evidence_id: i32,
    pub case_id: Option<i32>,
    pub report_id: Option<i32>,
    pub evidence_title: String,
    pub evidence_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub evidence_description: Option<String>,
    pub file_reference: Option<String>,
    pub collection_date: DateTime,
    pub collected_by: i32,
    pub date_created: DateTime,
    pub date_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cases::Entity",
        from = "Column::CaseId",
        to = "super::cases::Column::CaseId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Case,
    #[sea_orm(
        belongs_to = "super::reports::Entity",
        from = "Column::ReportId",
        to = "super::reports::Column::ReportId",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Report,
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl Related<super::reports::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Report.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const EVIDENCE_TYPES: &[&str] = &["photo", "video", "audio", "document", "physical", "other"];

pub static SCHEMA: EntitySchema<Column> = EntitySchema {
    kind: EntityKind::Evidence,
    table: "evidence",
    id: Column::EvidenceId,
    fields: &[
        FieldSpec::optional(Column::CaseId, FieldKind::Reference),
        FieldSpec::optional(Column::ReportId, FieldKind::Reference),
        FieldSpec::required(Column::EvidenceTitle, FieldKind::PlainText),
        FieldSpec::optional(
            Column::EvidenceType,
            FieldKind::Enum {
                allowed: EVIDENCE_TYPES,
                default: "other",
            },
        ),
        FieldSpec::optional(Column::EvidenceDescription, FieldKind::RichTextHtml),
        FieldSpec::optional(Column::FileReference, FieldKind::PlainText),
        FieldSpec::optional(Column::CollectionDate, FieldKind::Timestamp),
    ],
    actor: Some(Column::CollectedBy),
    created: Some(Column::DateCreated),
    modified: Some(Column::DateModified),
    sortable: &[
        Column::EvidenceId,
        Column::EvidenceTitle,
        Column::EvidenceType,
        Column::CollectionDate,
        Column::DateCreated,
        Column::DateModified,
    ],
    default_sort: Column::DateCreated,
    filterable: &[
        Column::CaseId,
        Column::ReportId,
        Column::EvidenceType,
        Column::CollectedBy,
    ],
    searchable: &[
        Column::EvidenceTitle,
        Column::EvidenceDescription,
        Column::FileReference,
    ],
    dependents: &[],
};

impl ManagedEntity for Entity {
    type ActiveModel = ActiveModel;

    fn schema() -> &'static EntitySchema<Column> {
        &SCHEMA
    }
}
