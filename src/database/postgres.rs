use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryBuilder;
use crate::database::repository::{Entity, Repository};
use crate::filter::{Filter, Predicate};

/// Postgres-backed repository for one entity table.
pub struct PgRepository<T> {
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T: Entity> PgRepository<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for PgRepository<T> {
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        QueryBuilder::<T>::select_optional(id, &self.pool).await
    }

    async fn find_where(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        QueryBuilder::<T>::select_all(filter, &self.pool).await
    }

    async fn count(&self, predicate: &Predicate) -> Result<i64, DatabaseError> {
        QueryBuilder::<T>::count(predicate, &self.pool).await
    }

    async fn save(&self, entity: T) -> Result<T, DatabaseError> {
        let result = if entity.is_new() {
            QueryBuilder::<T>::insert(&entity, &self.pool).await
        } else {
            QueryBuilder::<T>::update(&entity, &self.pool)
                .await?
                .ok_or_else(|| DatabaseError::NotFound(format!("{} {} not found", T::TABLE, entity.id())))
        };
        result.map_err(map_constraint_violation)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        QueryBuilder::<T>::delete(id, &self.pool)
            .await
            .map_err(map_constraint_violation)
    }
}

/// Unique and foreign-key violations surface as conflicts rather than 500s.
fn map_constraint_violation(err: DatabaseError) -> DatabaseError {
    if let DatabaseError::Sqlx(sqlx::Error::Database(db_err)) = &err {
        match db_err.code().as_deref() {
            Some("23505") => {
                return DatabaseError::Conflict(format!("duplicate value: {}", db_err.message()))
            }
            Some("23503") => {
                return DatabaseError::Conflict(format!("still referenced: {}", db_err.message()))
            }
            _ => {}
        }
    }
    err
}
