//! Generic record repository
//!
//! One `Repository<E>` serves every managed entity: input is sanitized
//! against the entity's schema table, listings run through a [`QueryPlan`],
//! and deletes resolve dependents inside the same transaction as the delete.
//! Change events are published only after the change is committed.

use crate::error::RecordError;
use crate::events::{self, EventBus, EventKind, RecordEvent};
use crate::integrity::{self, IntegritySummary};
use crate::query::{QueryOptions, QueryPlan};
use crate::sanitize::{self, RawInput, Sanitizer};
use crate::schema::{EntitySchema, ManagedEntity};
use actix::Addr;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, PaginatorTrait, PrimaryKeyTrait,
    QueryFilter, TransactionTrait, Value,
};
use serde::Serialize;
use std::marker::PhantomData;

/// One page of a listing.
#[derive(Clone, Debug, Serialize)]
pub struct Page<M> {
    pub records: Vec<M>,
    /// Matching rows ignoring limit and offset
    pub total: u64,
}

pub struct Repository<E> {
    db: DatabaseConnection,
    sanitizer: Sanitizer,
    events: Option<Addr<EventBus>>,
    entity: PhantomData<E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            sanitizer: self.sanitizer.clone(),
            events: self.events.clone(),
            entity: PhantomData,
        }
    }
}

impl<E> Repository<E>
where
    E: ManagedEntity,
    E::Model: Sync,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
{
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            sanitizer: Sanitizer::new(),
            events: None,
            entity: PhantomData,
        }
    }

    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = sanitizer;
        self
    }

    pub fn with_events(mut self, bus: Addr<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn schema(&self) -> &'static EntitySchema<E::Column> {
        E::schema()
    }

    /// Insert a new record and return its id. `actor_id` is recorded as the
    /// creating user where the entity tracks one.
    pub async fn create(&self, input: &RawInput, actor_id: i32) -> Result<i32, RecordError> {
        let schema = E::schema();
        let fields = self.sanitizer.for_create(schema, input)?;
        let now = sanitize::now();

        let mut record = <E::ActiveModel as ActiveModelTrait>::default();
        for (column, value) in fields {
            record.set(column, value.into());
        }
        if let Some(actor) = schema.actor {
            record.set(actor, Value::Int(Some(actor_id)));
        }
        for column in [schema.created, schema.modified].into_iter().flatten() {
            record.set(column, Value::from(now));
        }

        let id = E::insert(record).exec(&self.db).await?.last_insert_id;
        log::debug!("Created {} {}", schema.kind, id);

        let mut event = RecordEvent::new(EventKind::Created, schema.kind, id);
        event.actor = Some(actor_id);
        self.publish_event(event);
        Ok(id)
    }

    /// Apply a partial update. Fields absent from `input` keep their stored
    /// value; frozen fields are ignored.
    pub async fn update(&self, id: i32, input: &RawInput) -> Result<(), RecordError> {
        let schema = E::schema();
        let fields = self.sanitizer.for_update(schema, input)?;

        // Existence first: an unchanged row may report zero affected rows
        if self.get(id).await?.is_none() {
            return Err(RecordError::NotFound {
                entity: schema.kind,
                id,
            });
        }

        let mut update = E::update_many();
        for (column, value) in fields {
            update = update.col_expr(column, Expr::value(Value::from(value)));
        }
        if let Some(modified) = schema.modified {
            update = update.col_expr(modified, Expr::value(sanitize::now()));
        }
        update
            .filter(schema.id.eq(id))
            .exec(&self.db)
            .await?;
        log::debug!("Updated {} {}", schema.kind, id);

        self.publish(EventKind::Updated, id);
        Ok(())
    }

    /// The record with this id, or `None` when there is none.
    pub async fn get(&self, id: i32) -> Result<Option<E::Model>, RecordError> {
        Ok(E::find_by_id(id).one(&self.db).await?)
    }

    /// Filtered, sorted page of records. Options that name unknown columns
    /// are ignored rather than rejected.
    pub async fn list(&self, options: &QueryOptions) -> Result<Page<E::Model>, RecordError> {
        let schema = E::schema();
        let plan = QueryPlan::build(schema, options, &self.sanitizer);
        log::debug!("Listing {}: {}", schema.kind, plan);

        let total = plan.filtered::<E>().count(&self.db).await?;
        let records = plan.select::<E>().all(&self.db).await?;
        Ok(Page { records, total })
    }

    /// Delete a record after detaching everything that points at it. Rows
    /// holding a mandatory reference block the delete instead. Nothing
    /// changes unless the whole delete commits.
    pub async fn delete(&self, id: i32) -> Result<IntegritySummary, RecordError> {
        let schema = E::schema();
        let txn = self.db.begin().await?;

        if E::find_by_id(id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Err(RecordError::NotFound {
                entity: schema.kind,
                id,
            });
        }

        let summary = integrity::resolve(&txn, schema.dependents, id).await?;
        E::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Deleted {} {} ({} detached)",
            schema.kind,
            id,
            summary.detached.len()
        );

        self.publish(EventKind::Deleted, id);
        Ok(summary)
    }

    fn publish(&self, kind: EventKind, id: i32) {
        self.publish_event(RecordEvent::new(kind, E::schema().kind, id));
    }

    fn publish_event(&self, event: RecordEvent) {
        if let Some(bus) = &self.events {
            events::publish(bus, event);
        }
    }
}
