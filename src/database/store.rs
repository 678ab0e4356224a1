use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryRepository;
use crate::database::models::{Category, Country, Order, OrderItem, PaymentMethod, Product};
use crate::database::postgres::PgRepository;
use crate::database::repository::Repository;

/// One repository per entity, shared by every request.
#[derive(Clone)]
pub struct Store {
    pub categories: Arc<dyn Repository<Category>>,
    pub products: Arc<dyn Repository<Product>>,
    pub countries: Arc<dyn Repository<Country>>,
    pub payment_methods: Arc<dyn Repository<PaymentMethod>>,
    pub orders: Arc<dyn Repository<Order>>,
    pub order_items: Arc<dyn Repository<OrderItem>>,
}

impl Store {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            categories: Arc::new(PgRepository::new(pool.clone())),
            products: Arc::new(PgRepository::new(pool.clone())),
            countries: Arc::new(PgRepository::new(pool.clone())),
            payment_methods: Arc::new(PgRepository::new(pool.clone())),
            orders: Arc::new(PgRepository::new(pool.clone())),
            order_items: Arc::new(PgRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            categories: Arc::new(MemoryRepository::new()),
            products: Arc::new(MemoryRepository::new()),
            countries: Arc::new(MemoryRepository::new()),
            payment_methods: Arc::new(MemoryRepository::new()),
            orders: Arc::new(MemoryRepository::new()),
            order_items: Arc::new(MemoryRepository::new()),
        }
    }
}
