// Copyright 2025 Cowboy AI, LLC.

//! Category store abstraction and in-memory implementation
//!
//! The checker never reads the taxonomy directly. It asks a [`CategoryStore`]
//! for categories matching a [`CategoryQuery`], which supports exact matches
//! on kind and constraint flags and the `child_of` ancestor filter.

use crate::category::{Category, CategoryKind};
use crate::entity::CategoryId;
use crate::errors::{CategoryError, CategoryResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Filter over categories
///
/// All set conditions must hold for a category to match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryQuery {
    /// Exact match on the required flag
    pub required: Option<bool>,
    /// Exact match on the unique flag
    pub unique: Option<bool>,
    /// Exact match on the kind
    pub kind: Option<CategoryKind>,
    /// Keep only these roots and their descendants
    pub child_of: Option<BTreeSet<CategoryId>>,
    /// Drop these categories from the result
    #[serde(default)]
    pub excluding: BTreeSet<CategoryId>,
}

impl CategoryQuery {
    /// Create a query matching every category
    pub fn new() -> Self {
        Self::default()
    }

    /// Match on the required flag
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Match on the unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = Some(unique);
        self
    }

    /// Match on the kind
    pub fn kind(mut self, kind: CategoryKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Keep the given roots and everything below them
    ///
    /// Repeated calls widen the set of roots.
    pub fn child_of(mut self, roots: impl IntoIterator<Item = CategoryId>) -> Self {
        self.child_of.get_or_insert_with(BTreeSet::new).extend(roots);
        self
    }

    /// Drop the given categories from the result
    pub fn excluding(mut self, ids: impl IntoIterator<Item = CategoryId>) -> Self {
        self.excluding.extend(ids);
        self
    }

    /// Check the non-hierarchical conditions
    pub fn matches_fields(&self, category: &Category) -> bool {
        self.required
            .map_or(true, |required| category.constraints.required == required)
            && self
                .unique
                .map_or(true, |unique| category.constraints.unique == unique)
            && self.kind.map_or(true, |kind| category.kind == kind)
            && !self.excluding.contains(&category.id)
    }
}

/// Read access to the category taxonomy
#[cfg_attr(test, mockall::automock)]
pub trait CategoryStore {
    /// Find all categories matching the query, in store order
    fn find(&self, query: &CategoryQuery) -> CategoryResult<Vec<Category>>;

    /// Load a single category
    fn get(&self, id: CategoryId) -> CategoryResult<Category>;
}

impl<S: CategoryStore + ?Sized> CategoryStore for Arc<S> {
    fn find(&self, query: &CategoryQuery) -> CategoryResult<Vec<Category>> {
        (**self).find(query)
    }

    fn get(&self, id: CategoryId) -> CategoryResult<Category> {
        (**self).get(id)
    }
}

/// In-memory category store preserving insertion order
///
/// Clones share the same underlying storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCategoryStore {
    categories: Arc<RwLock<IndexMap<CategoryId, Category>>>,
}

impl InMemoryCategoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace a category
    ///
    /// The parent must exist and the write must not close a cycle.
    pub fn save(&self, category: Category) -> CategoryResult<Category> {
        let mut categories = self.write()?;

        if let Some(parent) = category.parent {
            check_hierarchy(&categories, &category, parent)?;
        }

        debug!(
            category_id = %category.id,
            name = %category.name,
            kind = %category.kind,
            "Saving category"
        );
        categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Alias of [`save`](Self::save) for fresh categories
    pub fn insert(&self, category: Category) -> CategoryResult<Category> {
        self.save(category)
    }

    /// Remove a leaf category
    pub fn remove(&self, id: CategoryId) -> CategoryResult<Category> {
        let mut categories = self.write()?;

        let category = categories
            .get(&id)
            .ok_or(CategoryError::CategoryNotFound(id))?;
        if categories.values().any(|c| c.parent == Some(id)) {
            return Err(CategoryError::InvalidHierarchy {
                category: category.name.clone(),
                reason: "category still has children".to_string(),
            });
        }

        debug!(category_id = %id, "Removing category");
        categories
            .shift_remove(&id)
            .ok_or(CategoryError::CategoryNotFound(id))
    }

    /// Number of stored categories
    pub fn len(&self) -> CategoryResult<usize> {
        Ok(self.read()?.len())
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> CategoryResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> CategoryResult<RwLockReadGuard<'_, IndexMap<CategoryId, Category>>> {
        self.categories
            .read()
            .map_err(|e| CategoryError::StoreUnavailable(e.to_string()))
    }

    fn write(&self) -> CategoryResult<RwLockWriteGuard<'_, IndexMap<CategoryId, Category>>> {
        self.categories
            .write()
            .map_err(|e| CategoryError::StoreUnavailable(e.to_string()))
    }
}

impl CategoryStore for InMemoryCategoryStore {
    fn find(&self, query: &CategoryQuery) -> CategoryResult<Vec<Category>> {
        let categories = self.read()?;

        Ok(categories
            .values()
            .filter(|category| query.matches_fields(category))
            .filter(|category| match &query.child_of {
                Some(roots) => descends_from(&categories, category.id, roots),
                None => true,
            })
            .cloned()
            .collect())
    }

    fn get(&self, id: CategoryId) -> CategoryResult<Category> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(CategoryError::CategoryNotFound(id))
    }
}

/// Whether `id` is one of `roots` or lies below one of them
fn descends_from(
    categories: &IndexMap<CategoryId, Category>,
    id: CategoryId,
    roots: &BTreeSet<CategoryId>,
) -> bool {
    let mut current = Some(id);
    // Saved hierarchies are acyclic; the bound only stops a corrupted chain.
    for _ in 0..=categories.len() {
        match current {
            Some(node) if roots.contains(&node) => return true,
            Some(node) => current = categories.get(&node).and_then(|c| c.parent),
            None => return false,
        }
    }
    false
}

fn check_hierarchy(
    categories: &IndexMap<CategoryId, Category>,
    category: &Category,
    parent: CategoryId,
) -> CategoryResult<()> {
    if !categories.contains_key(&parent) {
        return Err(CategoryError::CategoryNotFound(parent));
    }
    if descends_from(categories, parent, &BTreeSet::from([category.id])) {
        return Err(CategoryError::InvalidHierarchy {
            category: category.name.clone(),
            reason: "parent chain would contain a cycle".to_string(),
        });
    }
    Ok(())
}
