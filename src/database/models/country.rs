use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::Entity;
use crate::filter::SqlValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    /// ISO 3166-1 alpha-2, upper case
    pub code: String,
}

impl Entity for Country {
    const TABLE: &'static str = "countries";
    const COLUMNS: &'static [&'static str] = &["name", "code"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "code"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.name.clone().into(), self.code.clone().into()]
    }
}
