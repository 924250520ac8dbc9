// Copyright 2025 Cowboy AI, LLC.

//! Party records and the category domain restricting what they may select

use crate::category::{Category, CategoryKind};
use crate::entity::{CategoryId, PartyId};
use crate::errors::{CategoryError, CategoryResult};
use crate::store::{CategoryQuery, CategoryStore};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A business entity or contact carrying category assignments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Party {
    /// Party identity
    pub id: PartyId,
    /// Display name
    pub name: String,
    /// Assigned categories; membership only
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
}

impl Party {
    /// Create a party without categories
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PartyId::new(),
            name: name.into(),
            categories: BTreeSet::new(),
        }
    }

    /// Replace the assigned categories, bypassing the category domain
    pub fn with_categories(mut self, categories: impl IntoIterator<Item = CategoryId>) -> Self {
        self.set_categories(categories);
        self
    }

    /// Replace the assigned categories, bypassing the category domain
    pub fn set_categories(&mut self, categories: impl IntoIterator<Item = CategoryId>) {
        self.categories = categories.into_iter().collect();
    }

    /// Assign a category through the party category domain
    ///
    /// Returns `false` if the category was already assigned.
    pub fn add_category(&mut self, category: &Category) -> CategoryResult<bool> {
        if !PartyCategoryDomain::admits(category) {
            return Err(CategoryError::NotSelectable {
                category: category.name.clone(),
            });
        }
        Ok(self.categories.insert(category.id))
    }

    /// Unassign a category
    pub fn remove_category(&mut self, id: CategoryId) -> bool {
        self.categories.remove(&id)
    }

    /// Whether the category is assigned
    pub fn has_category(&self, id: CategoryId) -> bool {
        self.categories.contains(&id)
    }

    /// Name used in user-facing messages
    pub fn rec_name(&self) -> &str {
        &self.name
    }
}

/// Domain restriction on the party's generic category selection
///
/// View categories are managed through their constraints and never offered
/// in the generic multi-select.
pub struct PartyCategoryDomain;

impl PartyCategoryDomain {
    /// Whether a category may be selected on a party
    pub fn admits(category: &Category) -> bool {
        category.kind != CategoryKind::View
    }

    /// Query matching the admissible categories
    pub fn query() -> CategoryQuery {
        CategoryQuery::new().kind(CategoryKind::Other)
    }

    /// All categories a party may select
    pub fn selectable<S: CategoryStore + ?Sized>(store: &S) -> CategoryResult<Vec<Category>> {
        store.find(&Self::query())
    }
}
