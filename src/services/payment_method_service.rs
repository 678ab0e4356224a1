use std::sync::Arc;

use serde::Deserialize;

use super::{validate_name, PageParams, ServiceError, ServiceResult};
use crate::database::models::{Order, PaymentMethod};
use crate::database::Repository;
use crate::filter::{Filter, Page, Predicate};

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethodInput {
    pub name: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

#[derive(Clone)]
pub struct PaymentMethodService {
    payment_methods: Arc<dyn Repository<PaymentMethod>>,
    orders: Arc<dyn Repository<Order>>,
}

impl PaymentMethodService {
    pub fn new(
        payment_methods: Arc<dyn Repository<PaymentMethod>>,
        orders: Arc<dyn Repository<Order>>,
    ) -> Self {
        Self { payment_methods, orders }
    }

    pub async fn list(&self, params: &PageParams) -> ServiceResult<Page<PaymentMethod>> {
        let filter = params.filter::<PaymentMethod>(Predicate::True)?;
        Ok(self.payment_methods.find_page(&filter).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<PaymentMethod> {
        Ok(self.payment_methods.select_404(id).await?)
    }

    pub async fn create(&self, input: PaymentMethodInput) -> ServiceResult<PaymentMethod> {
        let method = self.validated(0, input).await?;
        let saved = self.payment_methods.save(method).await?;
        tracing::info!("Created payment method {} '{}'", saved.id, saved.name);
        Ok(saved)
    }

    pub async fn update(&self, id: i64, input: PaymentMethodInput) -> ServiceResult<PaymentMethod> {
        self.payment_methods.select_404(id).await?;
        let method = self.validated(id, input).await?;
        Ok(self.payment_methods.save(method).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.payment_methods.select_404(id).await?;

        let referenced = Predicate::Eq("payment_method_id", id.into());
        if self.orders.exists_where(&referenced).await? {
            return Err(ServiceError::Conflict(format!(
                "Payment method {} is used by existing orders",
                id
            )));
        }

        self.payment_methods.delete(id).await?;
        tracing::info!("Deleted payment method {}", id);
        Ok(())
    }

    async fn validated(&self, id: i64, input: PaymentMethodInput) -> ServiceResult<PaymentMethod> {
        let name = validate_name("name", &input.name)?;
        let same_name = Filter::new(Predicate::Eq("name", name.as_str().into()));
        if self
            .payment_methods
            .find_where(&same_name)
            .await?
            .iter()
            .any(|m| m.id != id)
        {
            return Err(ServiceError::Conflict(format!(
                "Payment method '{}' already exists",
                name
            )));
        }
        Ok(PaymentMethod { id, name, active: input.active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    fn service(store: &Store) -> PaymentMethodService {
        PaymentMethodService::new(store.payment_methods.clone(), store.orders.clone())
    }

    #[tokio::test]
    async fn create_defaults_to_active_and_rejects_duplicates() {
        let store = Store::in_memory();
        let methods = service(&store);
        let input: PaymentMethodInput = serde_json::from_str(r#"{"name": "Card"}"#).unwrap();
        let card = methods.create(input.clone()).await.unwrap();
        assert!(card.active);
        assert!(matches!(methods.create(input).await, Err(ServiceError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_can_deactivate() {
        let store = Store::in_memory();
        let methods = service(&store);
        let card = methods
            .create(PaymentMethodInput { name: "Card".into(), active: true })
            .await
            .unwrap();
        let updated = methods
            .update(card.id, PaymentMethodInput { name: "Card".into(), active: false })
            .await
            .unwrap();
        assert!(!updated.active);
        assert!(!methods.get(card.id).await.unwrap().active);
    }

    #[tokio::test]
    async fn blank_name_is_invalid() {
        let store = Store::in_memory();
        let err = service(&store)
            .create(PaymentMethodInput { name: "   ".into(), active: true })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "name", .. }));
    }
}
