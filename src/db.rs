//! Store connection and table bootstrap

use crate::app_config::DatabaseConfig;
use crate::orm::{cases, clients, evidence, locations, reports};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, EntityTrait, Schema,
};

pub async fn connect(config: &DatabaseConfig) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(config.max_connections)
        .sqlx_logging(config.sqlx_logging);

    let db = Database::connect(options).await?;
    log::info!("Connected to {:?} store", db.get_database_backend());
    Ok(db)
}

/// Create any missing tables. Referenced tables come first so foreign keys
/// resolve.
pub async fn create_schema<C>(db: &C) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    create_table(db, clients::Entity).await?;
    create_table(db, locations::Entity).await?;
    create_table(db, cases::Entity).await?;
    create_table(db, reports::Entity).await?;
    create_table(db, evidence::Entity).await?;
    Ok(())
}

async fn create_table<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let stmt = Schema::new(backend)
        .create_table_from_entity(entity)
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&stmt)).await?;
    log::debug!("Ensured table {}", entity.table_name());
    Ok(())
}
