//! Investigation reports
//!
//! A report belongs to exactly one case for its whole life. Evidence may point
//! back at the report it was logged under; deleting the report detaches it.

use crate::schema::{
    Dependent, EntityKind, EntitySchema, FieldKind, FieldSpec, ManagedEntity, OnParentDelete,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub report_id: i32,
    pub case_id: i32,
    pub report_title: String,
    pub report_type: String,
    pub report_date: DateTime,
    #[sea_orm(column_type = "Text")]
    pub report_content: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub report_summary: Option<String>,
    pub weather_conditions: Option<String>,
    pub moon_phase: Option<String>,
    pub temperature: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub equipment_used: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub evidence_collected: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub phenomena_observed: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub participants: Option<String>,
    pub duration_minutes: i32,
    pub investigator_id: i32,
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
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Case.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const REPORT_TYPES: &[&str] = &["investigation", "follow_up", "summary", "other"];

/// Rows pointing at a report.
pub const DEPENDENTS: &[Dependent] = &[Dependent {
    entity: EntityKind::Evidence,
    table: "evidence",
    key: "evidence_id",
    column: "report_id",
    policy: OnParentDelete::Detach,
}];

pub static SCHEMA: EntitySchema<Column> = EntitySchema {
    kind: EntityKind::Report,
    table: "reports",
    id: Column::ReportId,
    fields: &[
        FieldSpec::required(Column::CaseId, FieldKind::Reference).frozen(),
        FieldSpec::required(Column::ReportTitle, FieldKind::PlainText),
        FieldSpec::optional(
            Column::ReportType,
            FieldKind::Enum {
                allowed: REPORT_TYPES,
                default: "investigation",
            },
        ),
        FieldSpec::optional(Column::ReportDate, FieldKind::Timestamp),
        FieldSpec::required(Column::ReportContent, FieldKind::RichTextHtml),
        FieldSpec::optional(Column::ReportSummary, FieldKind::LongText),
        FieldSpec::optional(Column::WeatherConditions, FieldKind::PlainText),
        FieldSpec::optional(Column::MoonPhase, FieldKind::PlainText),
        FieldSpec::optional(Column::Temperature, FieldKind::PlainText),
        FieldSpec::optional(Column::EquipmentUsed, FieldKind::LongText),
        FieldSpec::optional(Column::EvidenceCollected, FieldKind::LongText),
        FieldSpec::optional(Column::PhenomenaObserved, FieldKind::LongText),
        FieldSpec::optional(Column::Participants, FieldKind::LongText),
        FieldSpec::optional(Column::DurationMinutes, FieldKind::NonNegativeInteger),
    ],
    actor: Some(Column::InvestigatorId),
    created: Some(Column::DateCreated),
    modified: Some(Column::DateModified),
    sortable: &[
        Column::ReportId,
        Column::ReportTitle,
        Column::ReportType,
        Column::ReportDate,
        Column::DurationMinutes,
        Column::DateCreated,
        Column::DateModified,
    ],
    default_sort: Column::ReportDate,
    filterable: &[Column::CaseId, Column::ReportType, Column::InvestigatorId],
    searchable: &[
        Column::ReportTitle,
        Column::ReportContent,
        Column::ReportSummary,
        Column::PhenomenaObserved,
    ],
    dependents: DEPENDENTS,
};

impl ManagedEntity for Entity {
    type ActiveModel = ActiveModel;

    fn schema() -> &'static EntitySchema<Column> {
        &SCHEMA
    }
}
