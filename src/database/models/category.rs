use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::Entity;
use crate::filter::SqlValue;

/// Catalog category. The parent pointer is the only stored link; children are
/// found by reverse lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

impl Entity for Category {
    const TABLE: &'static str = "categories";
    const COLUMNS: &'static [&'static str] = &["name", "parent_id"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "parent_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.name.clone().into(), self.parent_id.into()]
    }
}
