//! Read-only view of the category graph built from one snapshot of the
//! category table.
//!
//! Only parent pointers are stored; the children index is derived here. The
//! data is expected to be a forest, but externally edited rows can form
//! cycles, so every walk keeps a visited set keyed by id and stops at the
//! first repeat.

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::database::models::Category;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryExpansion {
    /// The root and every descendant reached
    pub ids: BTreeSet<i64>,
    /// Ids reached a second time, each one a cycle in the data
    pub cycles: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub children: Vec<CategoryNode>,
}

pub struct CategoryTree {
    nodes: HashMap<i64, Category>,
    children: HashMap<i64, Vec<i64>>,
}

impl CategoryTree {
    pub fn from_snapshot(categories: Vec<Category>) -> Self {
        let mut children: HashMap<i64, Vec<i64>> = HashMap::new();
        for category in &categories {
            if let Some(parent_id) = category.parent_id {
                children.entry(parent_id).or_default().push(category.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }

        let nodes = categories.into_iter().map(|c| (c.id, c)).collect();
        Self { nodes, children }
    }

    pub fn get(&self, id: i64) -> Option<&Category> {
        self.nodes.get(&id)
    }

    pub fn children_of(&self, id: i64) -> &[i64] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Depth-first collection of `root` and its descendants. An unknown root
    /// yields an empty expansion.
    pub fn expand(&self, root: i64) -> CategoryExpansion {
        let mut expansion = CategoryExpansion::default();
        if !self.nodes.contains_key(&root) {
            return expansion;
        }

        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !expansion.ids.insert(id) {
                tracing::error!(
                    "Category cycle detected: category {} reached again while expanding {}",
                    id,
                    root
                );
                expansion.cycles.push(id);
                continue;
            }
            stack.extend(self.children_of(id).iter().rev());
        }

        expansion
    }

    /// Whether `ancestor` is `id` itself or appears on its parent chain.
    pub fn is_ancestor_or_self(&self, ancestor: i64, id: i64) -> bool {
        let mut seen = HashSet::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            if cur == ancestor {
                return true;
            }
            if !seen.insert(cur) {
                return false;
            }
            current = self.nodes.get(&cur).and_then(|c| c.parent_id);
        }
        false
    }

    /// Nested view of the subtree under `root`, truncated at cycles.
    pub fn subtree(&self, root: i64) -> Option<CategoryNode> {
        let mut visited = HashSet::new();
        self.build_node(root, &mut visited)
    }

    fn build_node(&self, id: i64, visited: &mut HashSet<i64>) -> Option<CategoryNode> {
        let category = self.nodes.get(&id)?;
        if !visited.insert(id) {
            tracing::error!("Category cycle detected: category {} already in subtree", id);
            return None;
        }
        let children = self
            .children_of(id)
            .iter()
            .filter_map(|child| self.build_node(*child, visited))
            .collect();
        Some(CategoryNode {
            id,
            name: category.name.clone(),
            parent_id: category.parent_id,
            children,
        })
    }
}
