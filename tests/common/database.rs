//! Test database setup
#![allow(dead_code)]

use casefile::repository::Repository;
use casefile::schema::ManagedEntity;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, PrimaryKeyTrait};

/// Fresh in-memory SQLite store with every table created.
///
/// The pool is pinned to one connection: each in-memory connection is its
/// own database.
pub async fn setup_test_database() -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(options).await?;
    casefile::db::create_schema(&db).await?;
    Ok(db)
}

pub fn repository<E>(db: &DatabaseConnection) -> Repository<E>
where
    E: ManagedEntity,
    E::Model: Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    Repository::new(db.clone())
}
