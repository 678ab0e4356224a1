//! Order placement and lifecycle.
//!
//! The order row and its items are written with separate repository calls.
//! If an item write fails, the items already stored and the order row are
//! deleted again.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PageParams, ServiceError, ServiceResult};
use crate::auth::{Identity, ROLE_ADMIN};
use crate::database::models::{Country, Order, OrderItem, PaymentMethod, Product};
use crate::database::Repository;
use crate::filter::{Filter, OrderCriteria, Page, Predicate};

/// Largest quantity accepted on a single order line.
pub const MAX_QUANTITY: i64 = 1_000_000;

/// Largest total the `orders.total` column (`NUMERIC(14, 2)`) can hold.
fn max_total() -> Decimal {
    Decimal::new(99_999_999_999_999, 2)
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineInput {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceOrderInput {
    pub payment_method_id: i64,
    pub country_id: i64,
    pub items: Vec<OrderLineInput>,
}

/// An order together with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetails {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn Repository<Order>>,
    order_items: Arc<dyn Repository<OrderItem>>,
    products: Arc<dyn Repository<Product>>,
    payment_methods: Arc<dyn Repository<PaymentMethod>>,
    countries: Arc<dyn Repository<Country>>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn Repository<Order>>,
        order_items: Arc<dyn Repository<OrderItem>>,
        products: Arc<dyn Repository<Product>>,
        payment_methods: Arc<dyn Repository<PaymentMethod>>,
        countries: Arc<dyn Repository<Country>>,
    ) -> Self {
        Self { orders, order_items, products, payment_methods, countries }
    }

    pub async fn place(&self, owner: &Identity, input: PlaceOrderInput) -> ServiceResult<OrderDetails> {
        if input.items.is_empty() {
            return Err(ServiceError::invalid("items", "an order needs at least one item"));
        }

        let method = self.payment_methods.find_by_id(input.payment_method_id).await?.ok_or_else(|| {
            ServiceError::invalid(
                "payment_method_id",
                format!("payment method {} does not exist", input.payment_method_id),
            )
        })?;
        if !method.active {
            return Err(ServiceError::invalid(
                "payment_method_id",
                format!("payment method '{}' is not active", method.name),
            ));
        }
        if self.countries.find_by_id(input.country_id).await?.is_none() {
            return Err(ServiceError::invalid(
                "country_id",
                format!("country {} does not exist", input.country_id),
            ));
        }

        let mut prices: HashMap<i64, Decimal> = HashMap::new();
        let mut lines = Vec::with_capacity(input.items.len());
        for line in &input.items {
            if line.quantity < 1 {
                return Err(ServiceError::invalid("quantity", "must be at least 1"));
            }
            if line.quantity > MAX_QUANTITY {
                return Err(ServiceError::invalid(
                    "quantity",
                    format!("must be at most {}", MAX_QUANTITY),
                ));
            }
            let unit_price = match prices.get(&line.product_id) {
                Some(price) => *price,
                None => {
                    let product = self.products.find_by_id(line.product_id).await?.ok_or_else(|| {
                        ServiceError::invalid(
                            "product_id",
                            format!("product {} does not exist", line.product_id),
                        )
                    })?;
                    prices.insert(product.id, product.price);
                    product.price
                }
            };
            lines.push(OrderItem {
                id: 0,
                order_id: 0,
                product_id: line.product_id,
                quantity: line.quantity,
                unit_price,
            });
        }

        let total = order_total(&lines)?;
        let order = self
            .orders
            .save(Order {
                id: 0,
                username: owner.subject().to_string(),
                payment_method_id: method.id,
                country_id: input.country_id,
                total,
                created_at: Utc::now(),
                completed_at: None,
            })
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for mut line in lines {
            line.order_id = order.id;
            match self.order_items.save(line).await {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::error!("Failed to store items of order {}: {}", order.id, e);
                    self.discard(order.id, &items).await;
                    return Err(e.into());
                }
            }
        }

        tracing::info!(
            "Order {} placed by '{}' with {} items, total {}",
            order.id,
            order.username,
            items.len(),
            order.total
        );
        Ok(OrderDetails { order, items })
    }

    async fn discard(&self, order_id: i64, items: &[OrderItem]) {
        for item in items {
            if let Err(e) = self.order_items.delete(item.id).await {
                tracing::error!("Failed to remove item {} of order {}: {}", item.id, order_id, e);
            }
        }
        if let Err(e) = self.orders.delete(order_id).await {
            tracing::error!("Failed to remove incomplete order {}: {}", order_id, e);
        }
    }

    pub async fn list_own(&self, owner: &Identity, params: &PageParams) -> ServiceResult<Page<Order>> {
        let mine = Predicate::Eq("username", owner.subject().into());
        let filter = params.filter::<Order>(mine)?;
        Ok(self.orders.find_page(&filter).await?)
    }

    pub async fn search(&self, criteria: &OrderCriteria, params: &PageParams) -> ServiceResult<Page<Order>> {
        let filter = params.filter::<Order>(criteria.to_predicate())?;
        Ok(self.orders.find_page(&filter).await?)
    }

    /// Visible to the owner and to administrators.
    pub async fn get(&self, caller: &Identity, id: i64) -> ServiceResult<OrderDetails> {
        let order = self.orders.select_404(id).await?;
        if order.username != caller.subject() && !caller.has_role(ROLE_ADMIN) {
            return Err(ServiceError::Forbidden(format!(
                "Order {} belongs to another user",
                id
            )));
        }
        let items = self.items_of(id).await?;
        Ok(OrderDetails { order, items })
    }

    pub async fn complete(&self, id: i64) -> ServiceResult<OrderDetails> {
        let mut order = self.orders.select_404(id).await?;
        if order.is_completed() {
            return Err(ServiceError::Conflict(format!("Order {} is already completed", id)));
        }
        order.completed_at = Some(Utc::now());
        let order = self.orders.save(order).await?;
        tracing::info!("Order {} completed", id);

        let items = self.items_of(id).await?;
        Ok(OrderDetails { order, items })
    }

    async fn items_of(&self, order_id: i64) -> ServiceResult<Vec<OrderItem>> {
        let filter = Filter::new(Predicate::Eq("order_id", order_id.into()));
        Ok(self.order_items.find_where(&filter).await?)
    }
}

fn order_total(lines: &[OrderItem]) -> ServiceResult<Decimal> {
    let total = lines.iter().try_fold(Decimal::ZERO, |total, line| {
        line.line_total().and_then(|amount| total.checked_add(amount))
    });
    match total {
        Some(total) if total <= max_total() => Ok(total),
        _ => Err(ServiceError::invalid("quantity", "order total is too large")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    struct Fixture {
        service: OrderService,
        card: i64,
        cash: i64,
        country: i64,
        pen: i64,
        lamp: i64,
    }

    async fn fixture() -> Fixture {
        let store = Store::in_memory();
        let card = store
            .payment_methods
            .save(PaymentMethod { id: 0, name: "Card".into(), active: true })
            .await
            .unwrap();
        let cash = store
            .payment_methods
            .save(PaymentMethod { id: 0, name: "Cash".into(), active: false })
            .await
            .unwrap();
        let country = store
            .countries
            .save(Country { id: 0, name: "France".into(), code: "FR".into() })
            .await
            .unwrap();
        let product = |name: &str, price: Decimal| Product {
            id: 0,
            name: name.to_string(),
            description: None,
            price,
            category_id: None,
            country_id: None,
        };
        let pen = store.products.save(product("Pen", Decimal::new(250, 2))).await.unwrap();
        let lamp = store.products.save(product("Lamp", Decimal::new(1999, 2))).await.unwrap();

        let service = OrderService::new(
            store.orders.clone(),
            store.order_items.clone(),
            store.products.clone(),
            store.payment_methods.clone(),
            store.countries.clone(),
        );
        Fixture { service, card: card.id, cash: cash.id, country: country.id, pen: pen.id, lamp: lamp.id }
    }

    fn user(name: &str) -> Identity {
        Identity::new(name, ["user".to_string()])
    }

    fn admin() -> Identity {
        Identity::new("root", ["admin".to_string()])
    }

    fn order(f: &Fixture, lines: &[(i64, i64)]) -> PlaceOrderInput {
        PlaceOrderInput {
            payment_method_id: f.card,
            country_id: f.country,
            items: lines
                .iter()
                .map(|(product_id, quantity)| OrderLineInput { product_id: *product_id, quantity: *quantity })
                .collect(),
        }
    }

    #[tokio::test]
    async fn placing_copies_prices_and_sums_total() {
        let f = fixture().await;
        let placed = f.service.place(&user("ann"), order(&f, &[(f.pen, 4), (f.lamp, 1)])).await.unwrap();

        assert_eq!(placed.order.username, "ann");
        assert_eq!(placed.order.total, Decimal::new(2999, 2));
        assert_eq!(placed.items.len(), 2);
        assert!(placed.items.iter().all(|i| i.order_id == placed.order.id));
        assert_eq!(placed.items[0].unit_price, Decimal::new(250, 2));
        assert!(!placed.order.is_completed());
    }

    #[tokio::test]
    async fn invalid_orders_are_rejected() {
        let f = fixture().await;
        let ann = user("ann");

        let empty = f.service.place(&ann, order(&f, &[])).await.unwrap_err();
        assert!(matches!(empty, ServiceError::Invalid { field: "items", .. }));

        let zero = f.service.place(&ann, order(&f, &[(f.pen, 0)])).await.unwrap_err();
        assert!(matches!(zero, ServiceError::Invalid { field: "quantity", .. }));

        let unknown = f.service.place(&ann, order(&f, &[(404, 1)])).await.unwrap_err();
        assert!(matches!(unknown, ServiceError::Invalid { field: "product_id", .. }));

        let mut inactive = order(&f, &[(f.pen, 1)]);
        inactive.payment_method_id = f.cash;
        let err = f.service.place(&ann, inactive).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "payment_method_id", .. }));

        let mut nowhere = order(&f, &[(f.pen, 1)]);
        nowhere.country_id = 404;
        let err = f.service.place(&ann, nowhere).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "country_id", .. }));
    }

    #[tokio::test]
    async fn oversized_quantities_are_rejected_without_storing() {
        let f = fixture().await;
        let ann = user("ann");

        let err = f.service.place(&ann, order(&f, &[(f.pen, i64::MAX)])).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "quantity", .. }));

        let err = f
            .service
            .place(&ann, order(&f, &[(f.pen, MAX_QUANTITY + 1)]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "quantity", .. }));

        let mine = f.service.list_own(&ann, &PageParams::default()).await.unwrap();
        assert_eq!(mine.total_elements, 0);
    }

    #[test]
    fn totals_beyond_the_column_range_are_rejected() {
        let line = |quantity: i64, unit_price: Decimal| OrderItem {
            id: 0,
            order_id: 0,
            product_id: 1,
            quantity,
            unit_price,
        };
        let expensive = Decimal::new(999_999_999_999, 2);

        let fits = order_total(&[line(2, Decimal::new(250, 2)), line(1, Decimal::new(1999, 2))]);
        assert_eq!(fits.unwrap(), Decimal::new(2499, 2));

        let err = order_total(&[line(MAX_QUANTITY, expensive)]).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "quantity", .. }));

        let err = order_total(&[line(i64::MAX, Decimal::MAX)]).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "quantity", .. }));
    }

    #[tokio::test]
    async fn orders_are_visible_to_owner_and_admin_only() {
        let f = fixture().await;
        let placed = f.service.place(&user("ann"), order(&f, &[(f.pen, 1)])).await.unwrap();
        let id = placed.order.id;

        assert_eq!(f.service.get(&user("ann"), id).await.unwrap().items.len(), 1);
        assert!(f.service.get(&admin(), id).await.is_ok());
        assert!(matches!(f.service.get(&user("bob"), id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(f.service.get(&admin(), 999).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn own_listing_and_admin_search() {
        let f = fixture().await;
        f.service.place(&user("ann"), order(&f, &[(f.pen, 1)])).await.unwrap();
        let second = f.service.place(&user("ann"), order(&f, &[(f.lamp, 2)])).await.unwrap();
        f.service.place(&user("bob"), order(&f, &[(f.lamp, 1)])).await.unwrap();
        f.service.complete(second.order.id).await.unwrap();

        let mine = f.service.list_own(&user("ann"), &PageParams::default()).await.unwrap();
        assert_eq!(mine.total_elements, 2);
        assert!(mine.content.iter().all(|o| o.username == "ann"));

        let done = OrderCriteria { completed: Some(true), username: None };
        let page = f.service.search(&done, &PageParams::default()).await.unwrap();
        assert_eq!(page.content.iter().map(|o| o.id).collect::<Vec<_>>(), vec![second.order.id]);

        let open_for_bob = OrderCriteria { completed: Some(false), username: Some("bob".into()) };
        let page = f.service.search(&open_for_bob, &PageParams::default()).await.unwrap();
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn completing_twice_conflicts() {
        let f = fixture().await;
        let placed = f.service.place(&user("ann"), order(&f, &[(f.pen, 1)])).await.unwrap();
        let completed = f.service.complete(placed.order.id).await.unwrap();
        assert!(completed.order.is_completed());
        assert!(matches!(
            f.service.complete(placed.order.id).await,
            Err(ServiceError::Conflict(_))
        ));
    }
}
