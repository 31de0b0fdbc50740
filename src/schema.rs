//! Declarative per-entity schema tables
//!
//! Every managed entity describes its fields once, as data: which column holds
//! which kind of value, which fields are required or frozen after creation,
//! which columns callers may sort, filter and search on, and which other
//! tables point at it. The sanitizer, query builder, repository and integrity
//! resolver all interpret these tables; none of them branch on field names.

use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, IdenStatic};
use serde::Serialize;
use std::fmt;

/// The domain record types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Case,
    Report,
    Client,
    Evidence,
    Location,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Case => "case",
            Self::Report => "report",
            Self::Client => "client",
            Self::Evidence => "evidence",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw input value is coerced before it may reach storage.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Single line, tags stripped, whitespace collapsed
    PlainText,
    /// Multi-line, tags stripped
    LongText,
    /// HTML restricted to the rich text allow-list
    RichTextHtml,
    /// Negative or non-numeric input becomes 0
    NonNegativeInteger,
    /// Unknown values fall back to `default`
    Enum {
        allowed: &'static [&'static str],
        default: &'static str,
    },
    /// Defaults to the current server time
    Timestamp,
    Email,
    Decimal,
    /// Identity of another record; non-positive input becomes null
    Reference,
}

/// One recognized input field.
#[derive(Copy, Clone, Debug)]
pub struct FieldSpec<C: 'static> {
    pub column: C,
    pub kind: FieldKind,
    /// Creation fails when this field is missing or sanitizes to nothing
    pub required: bool,
    /// Frozen after creation: ignored by updates
    pub immutable: bool,
}

impl<C> FieldSpec<C> {
    pub const fn optional(column: C, kind: FieldKind) -> Self {
        Self {
            column,
            kind,
            required: false,
            immutable: false,
        }
    }

    pub const fn required(column: C, kind: FieldKind) -> Self {
        Self {
            column,
            kind,
            required: true,
            immutable: false,
        }
    }

    pub const fn frozen(mut self) -> Self {
        self.immutable = true;
        self
    }
}

/// What happens to a dependent row when the record it points at is deleted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OnParentDelete {
    /// Null the reference; the dependent survives as an orphan
    Detach,
    /// Refuse the delete while any dependent exists. Used where the
    /// reference column cannot hold null.
    Restrict,
}

/// A table holding a reference to the entity that owns this entry.
#[derive(Copy, Clone, Debug)]
pub struct Dependent {
    pub entity: EntityKind,
    pub table: &'static str,
    /// Identity column of the dependent table
    pub key: &'static str,
    /// Column referencing the parent
    pub column: &'static str,
    pub policy: OnParentDelete,
}

/// The complete schema table of one entity type.
#[derive(Debug)]
pub struct EntitySchema<C: 'static> {
    pub kind: EntityKind,
    pub table: &'static str,
    pub id: C,
    pub fields: &'static [FieldSpec<C>],
    /// Set once at creation from the acting user
    pub actor: Option<C>,
    pub created: Option<C>,
    pub modified: Option<C>,
    pub sortable: &'static [C],
    pub default_sort: C,
    pub filterable: &'static [C],
    pub searchable: &'static [C],
    pub dependents: &'static [Dependent],
}

impl<C> EntitySchema<C>
where
    C: IdenStatic,
{
    pub fn field(&self, name: &str) -> Option<&FieldSpec<C>> {
        self.fields.iter().find(|f| f.column.as_str() == name)
    }

    /// Kind used to coerce a value compared against `column`, including the
    /// server-managed columns that never appear as input fields.
    pub fn kind_of(&self, column: C) -> Option<FieldKind> {
        let name = column.as_str();
        let is = |c: &Option<C>| c.as_ref().map(|c| c.as_str()) == Some(name);
        if let Some(spec) = self.field(name) {
            return Some(spec.kind);
        }
        if self.id.as_str() == name || is(&self.actor) {
            return Some(FieldKind::Reference);
        }
        if is(&self.created) || is(&self.modified) {
            return Some(FieldKind::Timestamp);
        }
        None
    }

    pub fn sortable_column(&self, name: &str) -> Option<C> {
        self.sortable.iter().copied().find(|c| c.as_str() == name)
    }

    pub fn filterable_column(&self, name: &str) -> Option<C> {
        self.filterable.iter().copied().find(|c| c.as_str() == name)
    }
}

/// An entity managed through the generic repository.
pub trait ManagedEntity: EntityTrait {
    type ActiveModel: ActiveModelTrait<Entity = Self> + ActiveModelBehavior + Send;

    fn schema() -> &'static EntitySchema<Self::Column>;
}
