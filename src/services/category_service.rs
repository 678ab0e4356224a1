use std::sync::Arc;

use serde::Deserialize;

use super::category_tree::{CategoryExpansion, CategoryNode, CategoryTree};
use super::{validate_name, PageParams, ServiceError, ServiceResult};
use crate::database::models::{Category, Product};
use crate::database::Repository;
use crate::filter::{Filter, Page, Predicate};

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn Repository<Category>>,
    products: Arc<dyn Repository<Product>>,
}

impl CategoryService {
    pub fn new(
        categories: Arc<dyn Repository<Category>>,
        products: Arc<dyn Repository<Product>>,
    ) -> Self {
        Self { categories, products }
    }

    pub async fn list(&self, params: &PageParams) -> ServiceResult<Page<Category>> {
        let filter = params.filter::<Category>(Predicate::True)?;
        Ok(self.categories.find_page(&filter).await?)
    }

    pub async fn get(&self, id: i64) -> ServiceResult<Category> {
        Ok(self.categories.select_404(id).await?)
    }

    /// One snapshot of the whole category table.
    pub async fn tree(&self) -> ServiceResult<CategoryTree> {
        Ok(CategoryTree::from_snapshot(self.categories.find_all().await?))
    }

    /// Ids of `root` and all of its descendants.
    pub async fn expand(&self, root: i64) -> ServiceResult<CategoryExpansion> {
        let expansion = self.tree().await?.expand(root);
        tracing::debug!(
            "Category {} expanded to {} categories ({} cycles)",
            root,
            expansion.ids.len(),
            expansion.cycles.len()
        );
        Ok(expansion)
    }

    pub async fn subtree(&self, root: i64) -> ServiceResult<CategoryNode> {
        self.tree()
            .await?
            .subtree(root)
            .ok_or_else(|| ServiceError::NotFound(format!("Category {} not found", root)))
    }

    pub async fn create(&self, input: CategoryInput) -> ServiceResult<Category> {
        let name = validate_name("name", &input.name)?;
        self.ensure_name_free(&name, None).await?;
        if let Some(parent_id) = input.parent_id {
            self.ensure_parent_exists(parent_id).await?;
        }

        let category = Category { id: 0, name, parent_id: input.parent_id };
        let saved = self.categories.save(category).await?;
        tracing::info!("Created category {} '{}'", saved.id, saved.name);
        Ok(saved)
    }

    pub async fn update(&self, id: i64, input: CategoryInput) -> ServiceResult<Category> {
        let mut category = self.categories.select_404(id).await?;
        let name = validate_name("name", &input.name)?;
        self.ensure_name_free(&name, Some(id)).await?;

        if let Some(parent_id) = input.parent_id {
            if category.parent_id != Some(parent_id) {
                self.ensure_parent_exists(parent_id).await?;
                // The new parent must not sit inside this category's subtree
                if self.tree().await?.is_ancestor_or_self(id, parent_id) {
                    return Err(ServiceError::invalid(
                        "parent_id",
                        format!("category {} cannot be moved under its own subtree", id),
                    ));
                }
            }
        }

        category.name = name;
        category.parent_id = input.parent_id;
        Ok(self.categories.save(category).await?)
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        self.categories.select_404(id).await?;

        let children = Predicate::Eq("parent_id", id.into());
        if self.categories.exists_where(&children).await? {
            return Err(ServiceError::Conflict(format!(
                "Category {} still has child categories",
                id
            )));
        }
        let products = Predicate::Eq("category_id", id.into());
        if self.products.exists_where(&products).await? {
            return Err(ServiceError::Conflict(format!(
                "Category {} still has products",
                id
            )));
        }

        self.categories.delete(id).await?;
        tracing::info!("Deleted category {}", id);
        Ok(())
    }

    async fn ensure_parent_exists(&self, parent_id: i64) -> ServiceResult<()> {
        if self.categories.find_by_id(parent_id).await?.is_none() {
            return Err(ServiceError::invalid(
                "parent_id",
                format!("category {} does not exist", parent_id),
            ));
        }
        Ok(())
    }

    async fn ensure_name_free(&self, name: &str, except: Option<i64>) -> ServiceResult<()> {
        let same_name = Predicate::Eq("name", name.into());
        let taken = self
            .categories
            .find_where(&Filter::new(same_name))
            .await?
            .into_iter()
            .any(|c| Some(c.id) != except);
        if taken {
            return Err(ServiceError::Conflict(format!("Category '{}' already exists", name)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Store;

    fn service(store: &Store) -> CategoryService {
        CategoryService::new(store.categories.clone(), store.products.clone())
    }

    fn input(name: &str, parent_id: Option<i64>) -> CategoryInput {
        CategoryInput { name: name.to_string(), parent_id }
    }

    #[tokio::test]
    async fn expand_walks_stored_hierarchy() {
        let store = Store::in_memory();
        let categories = service(&store);
        let root = categories.create(input("Office", None)).await.unwrap();
        let paper = categories.create(input("Paper", Some(root.id))).await.unwrap();
        let notebooks = categories.create(input("Notebooks", Some(paper.id))).await.unwrap();
        categories.create(input("Garden", None)).await.unwrap();

        let expansion = categories.expand(root.id).await.unwrap();
        let expected: Vec<i64> = vec![root.id, paper.id, notebooks.id];
        assert_eq!(expansion.ids.into_iter().collect::<Vec<_>>(), expected);
    }

    #[tokio::test]
    async fn moving_under_own_descendant_is_rejected() {
        let store = Store::in_memory();
        let categories = service(&store);
        let root = categories.create(input("Office", None)).await.unwrap();
        let child = categories.create(input("Paper", Some(root.id))).await.unwrap();

        let err = categories
            .update(root.id, input("Office", Some(child.id)))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "parent_id", .. }));

        let err = categories.update(root.id, input("Office", Some(root.id))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { .. }));
    }

    #[tokio::test]
    async fn duplicate_names_conflict() {
        let store = Store::in_memory();
        let categories = service(&store);
        let office = categories.create(input("Office", None)).await.unwrap();
        assert!(matches!(
            categories.create(input(" Office ", None)).await,
            Err(ServiceError::Conflict(_))
        ));
        // Renaming to its own name is fine
        assert!(categories.update(office.id, input("Office", None)).await.is_ok());
    }

    #[tokio::test]
    async fn delete_refuses_categories_in_use() {
        let store = Store::in_memory();
        let categories = service(&store);
        let root = categories.create(input("Office", None)).await.unwrap();
        let child = categories.create(input("Paper", Some(root.id))).await.unwrap();

        assert!(matches!(categories.delete(root.id).await, Err(ServiceError::Conflict(_))));
        categories.delete(child.id).await.unwrap();
        categories.delete(root.id).await.unwrap();
        assert!(matches!(categories.get(root.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn unknown_parent_is_invalid() {
        let store = Store::in_memory();
        let err = service(&store).create(input("Orphan", Some(77))).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { field: "parent_id", .. }));
    }
}
