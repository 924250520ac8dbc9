// Copyright 2025 Cowboy AI, LLC.

//! # Party Categories
//!
//! Required and unique category constraints for party records.
//!
//! Categories form a forest. A category of kind **view** may be flagged:
//! - **required**: every party must carry at least one category below it
//! - **unique**: no party may carry more than one category below it
//!
//! Categories of kind **other** are free labels and the only ones a party can
//! select through the [`PartyCategoryDomain`].
//!
//! The [`CategoryConstraintChecker`] reads the taxonomy through an injected
//! [`CategoryStore`] and rejects parties with a [`ConstraintViolation`]. It is
//! registered as a [`PartyValidationHook`] so that every create or update
//! batch is validated before it is committed. Setting
//! [`ValidationContext::check_categories`] to `false` skips the checks, e.g.
//! for bulk imports.
//!
//! ```rust
//! use party_categories::{
//!     Category, CategoryConstraintChecker, InMemoryCategoryStore, Party, PartyRegistry,
//!     ValidationContext,
//! };
//!
//! let store = InMemoryCategoryStore::new();
//! let sector = store.insert(Category::view("Sector").required(true)).unwrap();
//! let retail = store.insert(Category::new("Retail").with_parent(sector.id)).unwrap();
//!
//! let mut registry = PartyRegistry::new();
//! registry.register(Box::new(CategoryConstraintChecker::new(store)));
//!
//! let ctx = ValidationContext::default();
//! assert!(registry.create(vec![Party::new("Nobody")], &ctx).is_err());
//! assert!(registry
//!     .create(vec![Party::new("Acme").with_categories([retail.id])], &ctx)
//!     .is_ok());
//! ```

#![warn(missing_docs)]

mod category;
mod checker;
mod context;
mod entity;
mod errors;
mod party;
mod registry;
mod store;

pub use category::{Category, CategoryConstraints, CategoryKind};
pub use checker::{
    CategoryConstraintChecker, CheckReport, ConstraintSet, ScopedConstraint, MAX_REPORTED_MISSING,
};
pub use context::{ValidationContext, CHECK_CATEGORIES_KEY};
pub use entity::{CategoryId, CategoryMarker, EntityId, PartyId, PartyMarker};
pub use errors::{CategoryError, CategoryResult, ConstraintViolation};
pub use party::{Party, PartyCategoryDomain};
pub use registry::{PartyRegistry, PartyValidationHook};
pub use store::{CategoryQuery, CategoryStore, InMemoryCategoryStore};
