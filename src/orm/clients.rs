//! Clients who requested an investigation

use crate::schema::{
    Dependent, EntityKind, EntitySchema, FieldKind, FieldSpec, ManagedEntity, OnParentDelete,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub client_id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub address: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
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

pub const DEPENDENTS: &[Dependent] = &[Dependent {
    entity: EntityKind::Case,
    table: "cases",
    key: "case_id",
    column: "client_id",
    policy: OnParentDelete::Detach,
}];

pub static SCHEMA: EntitySchema<Column> = EntitySchema {
    kind: EntityKind::Client,
    table: "clients",
    id: Column::ClientId,
    fields: &[
        FieldSpec::required(Column::FirstName, FieldKind::PlainText),
        FieldSpec::required(Column::LastName, FieldKind::PlainText),
        FieldSpec::optional(Column::Email, FieldKind::Email),
        FieldSpec::optional(Column::Phone, FieldKind::PlainText),
        FieldSpec::optional(Column::Address, FieldKind::LongText),
        FieldSpec::optional(Column::Notes, FieldKind::LongText),
    ],
    actor: Some(Column::CreatedBy),
    created: Some(Column::DateCreated),
    modified: Some(Column::DateModified),
    sortable: &[
        Column::ClientId,
        Column::FirstName,
        Column::LastName,
        Column::Email,
        Column::DateCreated,
        Column::DateModified,
    ],
    default_sort: Column::DateCreated,
    filterable: &[Column::Email, Column::CreatedBy],
    searchable: &[
        Column::FirstName,
        Column::LastName,
        Column::Email,
        Column::Phone,
        Column::Notes,
    ],
    dependents: DEPENDENTS,
};

impl ManagedEntity for Entity {
    type ActiveModel = ActiveModel;

    fn schema() -> &'static EntitySchema<Column> {
        &SCHEMA
    }
}
