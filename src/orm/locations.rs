//! Investigation sites

use crate::schema::{
    Dependent, EntityKind, EntitySchema, FieldKind, FieldSpec, ManagedEntity, OnParentDelete,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "locations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub location_id: i32,
    pub location_name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub location_notes: Option<String>,
    pub created_by: i32,
    pub date_created: DateTime,
    pub date_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cases::Entity")]
    Cases,
}

impl Related<super::cases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub const LOCATION_TYPES: &[&str] = &["residence", "commercial", "outdoor", "historic", "other"];

pub const DEPENDENTS: &[Dependent] = &[Dependent {
    entity: EntityKind::Case,
    table: "cases",
    key: "case_id",
    column: "location_id",
    policy: OnParentDelete::Detach,
}];

pub static SCHEMA: EntitySchema<Column> = EntitySchema {
    kind: EntityKind::Location,
    table: "locations",
    id: Column::LocationId,
    fields: &[
        FieldSpec::required(Column::LocationName, FieldKind::PlainText),
        FieldSpec::optional(Column::Address, FieldKind::LongText),
        FieldSpec::optional(Column::City, FieldKind::PlainText),
        FieldSpec::optional(Column::State, FieldKind::PlainText),
        FieldSpec::optional(Column::PostalCode, FieldKind::PlainText),
        FieldSpec::optional(Column::Country, FieldKind::PlainText),
        FieldSpec::optional(Column::Latitude, FieldKind::Decimal),
        FieldSpec::optional(Column::Longitude, FieldKind::Decimal),
        FieldSpec::optional(
            Column::LocationType,
            FieldKind::Enum {
                allowed: LOCATION_TYPES,
                default: "other",
            },
        ),
        FieldSpec::optional(Column::LocationNotes, FieldKind::LongText),
    ],
    actor: Some(Column::CreatedBy),
    created: Some(Column::DateCreated),
    modified: Some(Column::DateModified),
    sortable: &[
        Column::LocationId,
        Column::LocationName,
        Column::City,
        Column::State,
        Column::Country,
        Column::LocationType,
        Column::DateCreated,
        Column::DateModified,
    ],
    default_sort: Column::DateCreated,
    filterable: &[
        Column::LocationType,
        Column::City,
        Column::State,
        Column::Country,
        Column::CreatedBy,
    ],
    searchable: &[
        Column::LocationName,
        Column::Address,
        Column::City,
        Column::State,
        Column::PostalCode,
        Column::LocationNotes,
    ],
    dependents: DEPENDENTS,
};

impl ManagedEntity for Entity {
    type ActiveModel = ActiveModel;

    fn schema() -> &'static EntitySchema<Column> {
        &SCHEMA
    }
}
