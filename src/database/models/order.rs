use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::repository::Entity;
use crate::filter::SqlValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: i64,
    /// Subject of the identity that placed the order
    pub username: String,
    pub payment_method_id: i64,
    /// Shipping destination
    pub country_id: i64,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

impl Entity for Order {
    const TABLE: &'static str = "orders";
    const COLUMNS: &'static [&'static str] = &[
        "username",
        "payment_method_id",
        "country_id",
        "total",
        "created_at",
        "completed_at",
    ];
    const SORTABLE: &'static [&'static str] =
        &["id", "username", "total", "created_at", "completed_at"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.username.clone().into(),
            self.payment_method_id.into(),
            self.country_id.into(),
            self.total.into(),
            self.created_at.into(),
            self.completed_at.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    /// Product price at the time the order was placed
    pub unit_price: Decimal,
}

impl OrderItem {
    /// `None` when the product does not fit in a `Decimal`.
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

impl Entity for OrderItem {
    const TABLE: &'static str = "order_items";
    const COLUMNS: &'static [&'static str] = &["order_id", "product_id", "quantity", "unit_price"];
    const SORTABLE: &'static [&'static str] = &["id", "product_id"];

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<SqlValue> {
        vec![
            self.order_id.into(),
            self.product_id.into(),
            self.quantity.into(),
            self.unit_price.into(),
        ]
    }
}
