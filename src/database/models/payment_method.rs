use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::Entity;
use crate::filter::SqlValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PaymentMethod {
    pub id: i64,
    pub name: String,
    /// Inactive methods stay readable but cannot be used for new orders
    pub active: bool,
}

impl Entity for PaymentMethod {
    const TABLE: &'static str = "payment_methods";
    const COLUMNS: &'static [&'static str] = &["name", "active"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "active"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![self.name.clone().into(), self.active.into()]
    }
}
