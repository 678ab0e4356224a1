use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::database::manager::DatabaseError;
use crate::database::repository::{Entity, Repository};
use crate::filter::filter_order::FilterOrder;
use crate::filter::{Filter, Predicate};

/// In-process repository evaluating predicates directly against rows.
pub struct MemoryRepository<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl<T: Entity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn find_by_id(&self, id: i64) -> Result<Option<T>, DatabaseError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_where(&self, filter: &Filter) -> Result<Vec<T>, DatabaseError> {
        let rows = self.rows.read().await;
        let mut matched: Vec<T> = rows
            .values()
            .filter(|row| filter.predicate.matches(*row))
            .cloned()
            .collect();
        drop(rows);

        matched.sort_by(|a, b| FilterOrder::compare(&filter.order, a, b));

        let offset = usize::try_from(filter.page.offset()).unwrap_or(usize::MAX);
        let size = usize::try_from(filter.page.size).unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(offset).take(size).collect())
    }

    async fn count(&self, predicate: &Predicate) -> Result<i64, DatabaseError> {
        let rows = self.rows.read().await;
        Ok(rows.values().filter(|row| predicate.matches(*row)).count() as i64)
    }

    async fn save(&self, mut entity: T) -> Result<T, DatabaseError> {
        let mut rows = self.rows.write().await;
        if entity.is_new() {
            entity.set_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        } else if !rows.contains_key(&entity.id()) {
            return Err(DatabaseError::NotFound(format!("{} {} not found", T::TABLE, entity.id())));
        }
        rows.insert(entity.id(), entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.rows.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Category;
    use crate::filter::{FilterOrderInfo, PageRequest, SortDirection};

    fn category(name: &str, parent_id: Option<i64>) -> Category {
        Category { id: 0, name: name.to_string(), parent_id }
    }

    #[tokio::test]
    async fn save_assigns_ids_and_updates_in_place() {
        let repo = MemoryRepository::<Category>::new();
        let root = repo.save(category("Root", None)).await.unwrap();
        let child = repo.save(category("Child", Some(root.id))).await.unwrap();
        assert_eq!((root.id, child.id), (1, 2));

        let renamed = repo.save(Category { name: "Renamed".into(), ..child }).await.unwrap();
        assert_eq!(repo.find_by_id(2).await.unwrap().unwrap().name, renamed.name);
        assert_eq!(repo.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let repo = MemoryRepository::<Category>::new();
        let ghost = Category { id: 42, name: "Ghost".into(), parent_id: None };
        assert!(matches!(repo.save(ghost).await, Err(DatabaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn pages_sorted_results() {
        let repo = MemoryRepository::<Category>::new();
        for name in ["b", "d", "a", "c"] {
            repo.save(category(name, None)).await.unwrap();
        }
        let filter = Filter::new(Predicate::True)
            .order(vec![FilterOrderInfo { column: "name", sort: SortDirection::Desc }])
            .page(PageRequest { page: 1, size: 3 });
        let page = repo.find_page(&filter).await.unwrap();
        let names: Vec<_> = page.content.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
        assert_eq!(page.total_elements, 4);
        assert_eq!(page.total_pages, 2);
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let repo = MemoryRepository::<Category>::new();
        let saved = repo.save(category("x", None)).await.unwrap();
        assert!(repo.delete(saved.id).await.unwrap());
        assert!(!repo.delete(saved.id).await.unwrap());
        assert!(repo.select_404(saved.id).await.is_err());
    }
}
