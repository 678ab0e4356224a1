use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::Entity;
use crate::filter::SqlValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub category_id: Option<i64>,
    /// Country of origin
    pub country_id: Option<i64>,
}

impl Entity for Product {
    const TABLE: &'static str = "products";
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "price", "category_id", "country_id"];
    const SORTABLE: &'static [&'static str] = &["id", "name", "price", "category_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.name.clone().into(),
            self.description.clone().into(),
            self.price.into(),
            self.category_id.into(),
            self.country_id.into(),
        ]
    }
}
