//! Filter/sort/paginate query plans
//!
//! Caller-supplied options are turned into a [`QueryPlan`] whose predicates
//! hold their values separately from the column they compare against. Columns
//! always come from the entity's schema table; nothing the caller sends is
//! ever spliced into the statement text. The plan is rendered through
//! `sea_query`, which binds every value as a parameter.

use crate::sanitize::{FieldValue, RawInput, Sanitizer};
use crate::schema::{EntitySchema, FieldKind};
use sea_orm::sea_query::{Expr, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, IdenStatic, Order, QueryFilter, QueryOrder, QuerySelect,
    Select,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Escape character for LIKE patterns; needs no quoting on any backend.
pub const LIKE_ESCAPE: char = '!';

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    /// Anything other than a case-insensitive "asc" or "desc" sorts descending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if s.eq_ignore_ascii_case("asc") => Self::Asc,
            _ => Self::Desc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl From<SortDirection> for Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

/// Listing options as accepted from any caller.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Column name to value. Unknown columns are ignored.
    pub filters: RawInput,
    pub search: Option<String>,
    pub order_by: Option<String>,
    pub order_direction: Option<String>,
    /// 0 means no limit
    pub limit: i64,
    pub offset: i64,
}

impl QueryOptions {
    /// Split a flat request mapping into listing controls and entity filters,
    /// e.g. `{"case_id": 7, "order_by": "report_date", "order": "asc"}`.
    pub fn from_raw(raw: &RawInput) -> Self {
        let mut options = Self::default();
        for (key, value) in raw {
            match key.as_str() {
                "order_by" | "orderby" => options.order_by = text(value),
                "order_direction" | "order" => options.order_direction = text(value),
                "search" | "s" => options.search = text(value),
                "limit" | "per_page" => options.limit = integer(value),
                "offset" => options.offset = integer(value),
                _ => {
                    options.filters.insert(key.clone(), value.clone());
                }
            }
        }
        options
    }

    pub fn filter(mut self, column: &str, value: impl Into<serde_json::Value>) -> Self {
        self.filters.insert(column.to_string(), value.into());
        self
    }

    pub fn search(mut self, term: &str) -> Self {
        self.search = Some(term.to_string());
        self
    }

    pub fn order_by(mut self, column: &str, direction: &str) -> Self {
        self.order_by = Some(column.to_string());
        self.order_direction = Some(direction.to_string());
        self
    }

    pub fn paginate(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

fn text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn integer(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n.as_i64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// One WHERE predicate and the value(s) it binds.
#[derive(Clone, Debug)]
pub enum Predicate<C> {
    Equals { column: C, value: FieldValue },
    IsNull { column: C },
    /// OR-group of LIKE comparisons; `pattern` is already escaped
    Search { columns: Vec<C>, pattern: String },
}

impl<C: ColumnTrait> Predicate<C> {
    fn to_expr<E: EntityTrait<Column = C>>(&self) -> Condition {
        match self {
            Predicate::Equals { column, value } => {
                Condition::all().add(column.eq(sea_orm::Value::from(value.clone())))
            }
            Predicate::IsNull { column } => Condition::all().add(column.is_null()),
            Predicate::Search { columns, pattern } => {
                columns.iter().fold(Condition::any(), |any, column| {
                    any.add(like(E::default(), *column, pattern))
                })
            }
        }
    }
}

fn like<E: EntityTrait>(entity: E, column: E::Column, pattern: &str) -> SimpleExpr {
    Expr::col((entity, column)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

/// Escape LIKE wildcards so user text only ever matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if c == LIKE_ESCAPE || c == '%' || c == '_' {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// A safe, fully resolved listing query.
#[derive(Clone, Debug)]
pub struct QueryPlan<C> {
    pub predicates: Vec<Predicate<C>>,
    pub order_by: C,
    pub direction: SortDirection,
    /// Identity column, ascending, after `order_by`
    pub tiebreak: C,
    pub limit: Option<u64>,
    pub offset: u64,
}

impl<C> QueryPlan<C>
where
    C: ColumnTrait,
{
    pub fn build(schema: &EntitySchema<C>, options: &QueryOptions, sanitizer: &Sanitizer) -> Self {
        let mut predicates = Vec::new();

        for (name, raw) in &options.filters {
            let Some(column) = schema.filterable_column(name) else {
                log::debug!("Ignoring filter on non-filterable column {}.{}", schema.kind, name);
                continue;
            };
            if raw.is_null() {
                predicates.push(Predicate::IsNull { column });
                continue;
            }
            let kind = schema.kind_of(column).unwrap_or(FieldKind::PlainText);
            let value = match (kind, raw) {
                // Filtering on an unknown value should match nothing, not the default
                (FieldKind::Enum { .. }, serde_json::Value::String(s)) => {
                    FieldValue::Text(Some(s.trim().to_string()))
                }
                (FieldKind::Reference, _) => sanitizer
                    .coerce_value(FieldKind::NonNegativeInteger, raw),
                _ => sanitizer.coerce_value(kind, raw),
            };
            predicates.push(Predicate::Equals { column, value });
        }

        if let Some(term) = options.search.as_deref().map(str::trim) {
            if !term.is_empty() && !schema.searchable.is_empty() {
                predicates.push(Predicate::Search {
                    columns: schema.searchable.to_vec(),
                    pattern: format!("%{}%", escape_like(term)),
                });
            }
        }

        let order_by = match options.order_by.as_deref() {
            Some(name) => schema.sortable_column(name.trim()).unwrap_or_else(|| {
                log::debug!("Unsortable column {:?} for {}, using default", name, schema.kind);
                schema.default_sort
            }),
            None => schema.default_sort,
        };
        let direction = SortDirection::parse(options.order_direction.as_deref());

        Self {
            predicates,
            order_by,
            direction,
            tiebreak: schema.id,
            limit: match options.limit.max(0) {
                0 => None,
                n => Some(n as u64),
            },
            offset: options.offset.max(0) as u64,
        }
    }

    /// All predicates ANDed; an empty plan matches every row.
    pub fn condition<E: EntityTrait<Column = C>>(&self) -> Condition {
        self.predicates
            .iter()
            .fold(Condition::all(), |all, p| all.add(p.to_expr::<E>()))
    }

    /// The filtered query without ordering or pagination, for counting.
    pub fn filtered<E: EntityTrait<Column = C>>(&self) -> Select<E> {
        E::find().filter(self.condition::<E>())
    }

    /// The full listing query.
    pub fn select<E: EntityTrait<Column = C>>(&self) -> Select<E> {
        let mut select = self
            .filtered::<E>()
            .order_by(self.order_by, self.direction.into());
        if self.order_by.as_str() != self.tiebreak.as_str() {
            select = select.order_by(self.tiebreak, Order::Asc);
        }
        if let Some(limit) = self.limit {
            select = select.limit(limit);
        }
        if self.offset > 0 {
            select = select.offset(self.offset);
        }
        select
    }
}

impl<C: IdenStatic> fmt::Display for QueryPlan<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} predicate(s) ORDER BY {} {}",
            self.predicates.len(),
            self.order_by.as_str(),
            self.direction.as_str()
        )?;
        if let Some(limit) = self.limit {
            write!(f, " LIMIT {}", limit)?;
        }
        if self.offset > 0 {
            write!(f, " OFFSET {}", self.offset)?;
        }
        Ok(())
    }
}
