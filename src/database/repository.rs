use async_trait::async_trait;
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow};

use crate::database::manager::DatabaseError;
use crate::filter::{Filter, Page, Predicate, Record, SqlValue};

/// A persisted row with a store-assigned `i64` id.
///
/// `COLUMNS` lists every persisted column except `id`, in the same order as
/// [`Entity::values`].
pub trait Entity:
    Clone + Serialize + Send + Sync + Unpin + for<'r> FromRow<'r, PgRow> + 'static
{
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];
    /// Columns accepted in `sort` query parameters.
    const SORTABLE: &'static [&'static str];

    fn id(&self) -> i64;
    fn set_id(&mut self, id: i64);
    fn values(&self) -> Vec<SqlValue>;

    fn is_new(&self) -> bool {
        self.id() == 0
    }
}

impl<T: Entity> Record for T {
    fn field(&self, column: &str) -> Option<SqlValue> {
        if column == "id" {
            return Some(self.id().into());
        }
        let index = T::COLUMNS.iter().position(|c| *c == column)?;
        let mut values = self.values();
        if index < values.len() {
            Some(values.swap_remove(index))
        } else {
            None
        }
    }
}

/// Storage interface consumed by the services.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError>;

    async fn find_where(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError>;

    async fn count(&self, predicate: &Predicate) -> Result<i64, DatabaseError>;

    /// Inserts when the entity has no id yet, updates otherwise.
    async fn save(&self, entity: T) -> Result<T, DatabaseError>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;

    /// Every row in one read.
    async fn find_all(&self) -> Result<Vec<T>, DatabaseError> {
        self.find_where(&Filter::new(Predicate::True)).await
    }

    async fn find_page(&self, filter: &Filter) -> Result<Page<T>, DatabaseError> {
        let content = self.find_where(filter).await?;
        let total = self.count(&filter.predicate).await?;
        Ok(Page::new(content, &filter.page, total))
    }

    async fn select_404(&self, id: i64) -> Result<T, DatabaseError> {
        self.find_by_id(id).await?.ok_or_else(|| {
            DatabaseError::NotFound(format!("{} {} not found", T::TABLE, id))
        })
    }

    async fn exists_where(&self, predicate: &Predicate) -> Result<bool, DatabaseError> {
        Ok(self.count(predicate).await? > 0)
    }
}
