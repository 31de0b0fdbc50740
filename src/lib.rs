//! Record management for paranormal investigation case files
//!
//! Cases, reports, clients, evidence and locations are stored through one
//! generic [`repository::Repository`]. Every entity is described by a schema
//! table in [`orm`]; the sanitizer, query builder and integrity resolver are
//! driven by those tables.

pub mod app_config;
pub mod db;
pub mod error;
pub mod events;
pub mod integrity;
pub mod orm;
pub mod query;
pub mod repository;
pub mod sanitize;
pub mod schema;

pub use error::{FieldProblem, RecordError, ValidationError};
pub use query::QueryOptions;
pub use repository::{Page, Repository};
pub use sanitize::RawInput;
