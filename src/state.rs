use std::sync::Arc;

use crate::auth::TokenAuthenticator;
use crate::database::{DatabaseManager, Store};
use crate::services::{
    CategoryService, CountryService, OrderService, PaymentMethodService, ProductService,
};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<TokenAuthenticator>,
    /// Present only when running against PostgreSQL
    pub database: Option<DatabaseManager>,
    pub products: ProductService,
    pub categories: CategoryService,
    pub countries: CountryService,
    pub payment_methods: PaymentMethodService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(
        store: Store,
        authenticator: TokenAuthenticator,
        database: Option<DatabaseManager>,
    ) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
            database,
            products: ProductService::new(
                store.products.clone(),
                store.categories.clone(),
                store.countries.clone(),
            ),
            categories: CategoryService::new(store.categories.clone(), store.products.clone()),
            countries: CountryService::new(
                store.countries.clone(),
                store.products.clone(),
                store.orders.clone(),
            ),
            payment_methods: PaymentMethodService::new(
                store.payment_methods.clone(),
                store.orders.clone(),
            ),
            orders: OrderService::new(
                store.orders,
                store.order_items,
                store.products,
                store.payment_methods,
                store.countries,
            ),
        }
    }
}
