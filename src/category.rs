// Copyright 2025 Cowboy AI, LLC.

//! Category taxonomy nodes
//!
//! Categories form a forest. Nodes of kind [`CategoryKind::View`] are the
//! constrainable taxonomy: their `required` and `unique` flags apply to the
//! categories below them. Nodes of kind [`CategoryKind::Other`] are free
//! labels and the only ones a party may select directly.

use crate::entity::CategoryId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of category kinds
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Free label, selectable on a party
    #[default]
    Other,
    /// Taxonomy branch carrying constraints
    View,
}

impl CategoryKind {
    /// Wire name of this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Other => "other",
            CategoryKind::View => "view",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "other" => Ok(CategoryKind::Other),
            "view" => Ok(CategoryKind::View),
            unknown => Err(format!("unknown category kind: {unknown}")),
        }
    }
}

/// Constraint flags of a category
///
/// Flags are stored regardless of kind but only take effect on view
/// categories.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct CategoryConstraints {
    /// At most one descendant may be assigned to a party
    #[serde(default)]
    pub unique: bool,
    /// At least one descendant must be assigned to every party
    #[serde(default)]
    pub required: bool,
}

/// A node of the category taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Category {
    /// Category identity
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Parent node; `None` for roots
    pub parent: Option<CategoryId>,
    /// Kind tag
    #[serde(default)]
    pub kind: CategoryKind,
    /// Constraint flags
    #[serde(flatten)]
    pub constraints: CategoryConstraints,
}

impl Category {
    /// Create an unconstrained root category of kind other
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into(),
            parent: None,
            kind: CategoryKind::default(),
            constraints: CategoryConstraints::default(),
        }
    }

    /// Create a root category of kind view
    pub fn view(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(CategoryKind::View)
    }

    /// Set the parent node
    pub fn with_parent(mut self, parent: CategoryId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set the kind
    pub fn with_kind(mut self, kind: CategoryKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the required flag
    pub fn required(mut self, required: bool) -> Self {
        self.constraints.required = required;
        self
    }

    /// Set the unique flag
    pub fn unique(mut self, unique: bool) -> Self {
        self.constraints.unique = unique;
        self
    }

    /// Whether this is a root node
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Whether this is a view category
    pub fn is_view(&self) -> bool {
        self.kind == CategoryKind::View
    }

    /// Whether the required constraint is in effect
    pub fn enforces_required(&self) -> bool {
        self.is_view() && self.constraints.required
    }

    /// Whether the unique constraint is in effect
    pub fn enforces_unique(&self) -> bool {
        self.is_view() && self.constraints.unique
    }
}
