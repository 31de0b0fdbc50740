//! Referential integrity on delete
//!
//! Before a record is removed, every row pointing at it is resolved according
//! to its [`OnParentDelete`] policy: nullable references are set to null and
//! the row survives, while a non-nullable reference blocks the delete until
//! its rows are gone. Runs on the delete's transaction so a failure anywhere
//! leaves every row untouched.

use crate::schema::{Dependent, EntityKind, OnParentDelete};
use sea_orm::sea_query::{Alias, Expr, Order, Query};
use sea_orm::{ConnectionTrait, DbErr};

/// Rows whose reference was nulled while resolving one delete.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntegritySummary {
    pub detached: Vec<(EntityKind, i32)>,
}

impl IntegritySummary {
    pub fn detached_count(&self, entity: EntityKind) -> usize {
        self.detached.iter().filter(|(e, _)| *e == entity).count()
    }
}

/// Resolve every dependent of the row `parent_id`. Does not remove the
/// parent row itself.
///
/// Restricting dependents are checked before anything is detached.
pub async fn resolve<C>(
    conn: &C,
    dependents: &'static [Dependent],
    parent_id: i32,
) -> Result<IntegritySummary, DbErr>
where
    C: ConnectionTrait,
{
    for dependent in dependents {
        if dependent.policy != OnParentDelete::Restrict {
            continue;
        }
        let ids = referencing_ids(conn, dependent, parent_id).await?;
        if !ids.is_empty() {
            return Err(DbErr::Custom(format!(
                "{} {} row(s) still reference {} = {}",
                ids.len(),
                dependent.table,
                dependent.column,
                parent_id
            )));
        }
    }

    let mut summary = IntegritySummary::default();
    for dependent in dependents {
        if dependent.policy != OnParentDelete::Detach {
            continue;
        }
        let ids = referencing_ids(conn, dependent, parent_id).await?;
        if ids.is_empty() {
            continue;
        }

        let stmt = Query::update()
            .table(Alias::new(dependent.table))
            .value(Alias::new(dependent.column), Option::<i32>::None)
            .and_where(Expr::col(Alias::new(dependent.column)).eq(parent_id))
            .to_owned();
        conn.execute(conn.get_database_backend().build(&stmt)).await?;
        log::debug!(
            "Detached {} {} row(s) from {} = {}",
            ids.len(),
            dependent.table,
            dependent.column,
            parent_id
        );
        summary
            .detached
            .extend(ids.into_iter().map(|id| (dependent.entity, id)));
    }
    Ok(summary)
}

async fn referencing_ids<C>(conn: &C, dependent: &Dependent, parent_id: i32) -> Result<Vec<i32>, DbErr>
where
    C: ConnectionTrait,
{
    let stmt = Query::select()
        .column(Alias::new(dependent.key))
        .from(Alias::new(dependent.table))
        .and_where(Expr::col(Alias::new(dependent.column)).eq(parent_id))
        .order_by(Alias::new(dependent.key), Order::Asc)
        .to_owned();

    conn.query_all(conn.get_database_backend().build(&stmt))
        .await?
        .iter()
        .map(|row| row.try_get::<i32>("", dependent.key))
        .collect()
}
