//! Search criteria for products and orders, and the predicates they build.
//!
//! Each present criterion contributes one conjunct; with nothing present the
//! result is [`Predicate::True`].

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::Deserialize;

use super::error::FilterError;
use super::predicate::Predicate;
use super::types::SqlValue;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductCriteria {
    pub name: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Root category; products in any descendant category match too.
    pub category: Option<i64>,
}

impl ProductCriteria {
    pub fn validate(&self) -> Result<(), FilterError> {
        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(FilterError::InvalidRange(format!(
                    "min_price {} is greater than max_price {}",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Builds the product predicate. `category_ids` is the expansion of
    /// `self.category` and is ignored when no category was requested.
    ///
    /// An empty expansion drops the category condition unless
    /// `empty_category_matches_nothing` is set.
    pub fn to_predicate(
        &self,
        category_ids: &BTreeSet<i64>,
        empty_category_matches_nothing: bool,
    ) -> Predicate {
        let mut parts = Vec::new();

        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            parts.push(Predicate::ContainsIgnoreCase("name", name.to_string()));
        }
        if let Some(min) = self.min_price {
            parts.push(Predicate::Gte("price", min.into()));
        }
        if let Some(max) = self.max_price {
            parts.push(Predicate::Lte("price", max.into()));
        }
        if let Some(root) = self.category {
            if !category_ids.is_empty() {
                let ids: Vec<SqlValue> = category_ids.iter().map(|id| (*id).into()).collect();
                parts.push(Predicate::In("category_id", ids));
            } else if empty_category_matches_nothing {
                parts.push(Predicate::In("category_id", vec![]));
            } else {
                tracing::warn!(
                    "Category filter {} expanded to no categories; ignoring category condition",
                    root
                );
            }
        }

        Predicate::and(parts)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderCriteria {
    pub completed: Option<bool>,
    pub username: Option<String>,
}

impl OrderCriteria {
    pub fn to_predicate(&self) -> Predicate {
        let mut parts = Vec::new();

        match self.completed {
            Some(true) => parts.push(Predicate::IsNotNull("completed_at")),
            Some(false) => parts.push(Predicate::IsNull("completed_at")),
            None => {}
        }
        if let Some(username) = &self.username {
            parts.push(Predicate::Eq("username", username.clone().into()));
        }

        Predicate::and(parts)
    }
}
