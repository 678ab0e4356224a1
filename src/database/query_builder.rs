use sqlx::{self, postgres::PgArguments, FromRow, PgPool, Row};

use crate::database::manager::DatabaseError;
use crate::database::repository::Entity;
use crate::filter::filter::count_sql;
use crate::filter::{Filter, Predicate, SqlResult, SqlValue};

/// Generates and runs the SQL for one entity table.
pub struct QueryBuilder<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> QueryBuilder<T>
where
    T: Entity,
{
    pub fn select_by_id_sql() -> String {
        format!(
            "SELECT {} FROM \"{}\" WHERE \"id\" = $1",
            Self::returning_columns(),
            T::TABLE
        )
    }

    pub fn insert_sql() -> String {
        let columns = T::COLUMNS.iter().map(|c| format!("\"{}\"", c)).collect::<Vec<_>>();
        let placeholders = (1..=T::COLUMNS.len()).map(|i| format!("${}", i)).collect::<Vec<_>>();
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
            T::TABLE,
            columns.join(", "),
            placeholders.join(", "),
            Self::returning_columns()
        )
    }

    pub fn update_sql() -> String {
        let assignments = T::COLUMNS
            .iter()
            .enumerate()
            .map(|(i, c)| format!("\"{}\" = ${}", c, i + 1))
            .collect::<Vec<_>>();
        format!(
            "UPDATE \"{}\" SET {} WHERE \"id\" = ${} RETURNING {}",
            T::TABLE,
            assignments.join(", "),
            T::COLUMNS.len() + 1,
            Self::returning_columns()
        )
    }

    pub fn delete_sql() -> String {
        format!("DELETE FROM \"{}\" WHERE \"id\" = $1", T::TABLE)
    }

    fn returning_columns() -> String {
        std::iter::once("id")
            .chain(T::COLUMNS.iter().copied())
            .map(|c| format!("\"{}\"", c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub async fn select_all(filter: &Filter, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let sql_result = filter.to_sql(T::TABLE, T::COLUMNS);
        Self::fetch_all(&sql_result, pool).await
    }

    pub async fn select_optional(id: i64, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql = Self::select_by_id_sql();
        let row = sqlx::query_as::<_, T>(&sql).bind(id).fetch_optional(pool).await?;
        Ok(row)
    }

    pub async fn count(predicate: &Predicate, pool: &PgPool) -> Result<i64, DatabaseError> {
        let sql_result = count_sql(T::TABLE, predicate);
        let mut q = sqlx::query(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query(q, p);
        }
        let row = q.fetch_one(pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    pub async fn insert(entity: &T, pool: &PgPool) -> Result<T, DatabaseError> {
        let sql = Self::insert_sql();
        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in entity.values().iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_one(pool).await?)
    }

    pub async fn update(entity: &T, pool: &PgPool) -> Result<Option<T>, DatabaseError> {
        let sql = Self::update_sql();
        let mut q = sqlx::query_as::<_, T>(&sql);
        for p in entity.values().iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.bind(entity.id()).fetch_optional(pool).await?)
    }

    pub async fn delete(id: i64, pool: &PgPool) -> Result<bool, DatabaseError> {
        let sql = Self::delete_sql();
        let result = sqlx::query(&sql).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_all(sql_result: &SqlResult, pool: &PgPool) -> Result<Vec<T>, DatabaseError> {
        let mut q = sqlx::query_as::<_, T>(&sql_result.query);
        for p in sql_result.params.iter() {
            q = bind_param_query_as(q, p);
        }
        Ok(q.fetch_all(pool).await?)
    }
}

fn bind_param_query<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Timestamp(t) => q.bind(*t),
    }
}

fn bind_param_query_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &SqlValue,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, sqlx::postgres::PgRow>,
{
    match v {
        SqlValue::Bool(b) => q.bind(*b),
        SqlValue::Int(i) => q.bind(*i),
        SqlValue::Decimal(d) => q.bind(*d),
        SqlValue::Text(s) => q.bind(s.clone()),
        SqlValue::Timestamp(t) => q.bind(*t),
    }
}
