// Copyright 2025 Cowboy AI, LLC.

//! Category constraint checking
//!
//! A [`ConstraintSet`] is a snapshot of the constrained taxonomy: every
//! required and every unique view category together with the categories
//! below it. It is loaded from the store once per validation batch and then
//! checked against each party without further queries.
//!
//! Required coverage: each required category must have at least one
//! descendant among the party's categories. Unique exclusivity: no unique
//! category may have more than one descendant among them. Each unique
//! category is checked on its own, so nested unique branches each apply.

use crate::category::{Category, CategoryKind};
use crate::context::ValidationContext;
use crate::entity::{CategoryId, PartyId};
use crate::errors::{CategoryResult, ConstraintViolation};
use crate::party::Party;
use crate::registry::PartyValidationHook;
use crate::store::{CategoryQuery, CategoryStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Most unmet required categories named in a single violation
pub const MAX_REPORTED_MISSING: usize = 3;

/// A constrained category and the categories strictly below it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedConstraint {
    /// The view category carrying the flag
    pub category: Category,
    /// Every category below it, excluding itself
    pub descendants: BTreeSet<CategoryId>,
}

impl ScopedConstraint {
    fn load<S: CategoryStore + ?Sized>(store: &S, category: Category) -> CategoryResult<Self> {
        let query = CategoryQuery::new()
            .child_of([category.id])
            .excluding([category.id]);
        let descendants = store.find(&query)?.into_iter().map(|c| c.id).collect();
        Ok(Self {
            category,
            descendants,
        })
    }

    /// How many of the given categories fall under this constraint
    pub fn coverage(&self, categories: &BTreeSet<CategoryId>) -> usize {
        categories.intersection(&self.descendants).count()
    }
}

/// Snapshot of the required and unique taxonomy for one validation batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstraintSet {
    required: Vec<ScopedConstraint>,
    unique: Vec<ScopedConstraint>,
}

impl ConstraintSet {
    /// Query the store for all constrained categories and their descendants
    pub fn load<S: CategoryStore + ?Sized>(store: &S) -> CategoryResult<Self> {
        let required = store
            .find(&CategoryQuery::new().required(true).kind(CategoryKind::View))?
            .into_iter()
            .map(|category| ScopedConstraint::load(store, category))
            .collect::<CategoryResult<Vec<_>>>()?;

        let unique = store
            .find(&CategoryQuery::new().unique(true).kind(CategoryKind::View))?
            .into_iter()
            .map(|category| ScopedConstraint::load(store, category))
            .collect::<CategoryResult<Vec<_>>>()?;

        debug!(
            required = required.len(),
            unique = unique.len(),
            "Loaded category constraints"
        );
        Ok(Self { required, unique })
    }

    /// Required categories in store order
    pub fn required(&self) -> &[ScopedConstraint] {
        &self.required
    }

    /// Unique categories in store order
    pub fn unique(&self) -> &[ScopedConstraint] {
        &self.unique
    }

    /// Whether there is nothing to enforce
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.unique.is_empty()
    }

    /// Required categories the assignment does not cover
    pub fn missing_required<'a>(
        &'a self,
        categories: &'a BTreeSet<CategoryId>,
    ) -> impl Iterator<Item = &'a Category> + 'a {
        self.required
            .iter()
            .filter(move |constraint| constraint.coverage(categories) == 0)
            .map(|constraint| &constraint.category)
    }

    /// Unique categories the assignment covers more than once
    pub fn repeated_unique<'a>(
        &'a self,
        categories: &'a BTreeSet<CategoryId>,
    ) -> impl Iterator<Item = &'a Category> + 'a {
        self.unique
            .iter()
            .filter(move |constraint| constraint.coverage(categories) > 1)
            .map(|constraint| &constraint.category)
    }

    /// Check one party, stopping at the first violation
    ///
    /// Required coverage is checked before unique exclusivity.
    pub fn check(&self, party: &Party) -> Result<(), ConstraintViolation> {
        if let Some(violation) = self.missing_violation(party) {
            return Err(violation);
        }
        if let Some(violation) = self.repeated_violation(party) {
            return Err(violation);
        }
        Ok(())
    }

    /// Every violation of one party
    pub fn audit(&self, party: &Party) -> Vec<ConstraintViolation> {
        self.missing_violation(party)
            .into_iter()
            .chain(self.repeated_violation(party))
            .collect()
    }

    fn missing_violation(&self, party: &Party) -> Option<ConstraintViolation> {
        let missing: Vec<String> = self
            .missing_required(&party.categories)
            .take(MAX_REPORTED_MISSING)
            .map(|category| category.name.clone())
            .collect();
        if missing.is_empty() {
            return None;
        }
        Some(ConstraintViolation::MissingRequiredCategory {
            party_id: party.id,
            party: party.rec_name().to_string(),
            missing,
        })
    }

    fn repeated_violation(&self, party: &Party) -> Option<ConstraintViolation> {
        let repeated = self.repeated_unique(&party.categories).next()?;
        debug!(
            party_id = %party.id,
            unique_category = %repeated.name,
            "Party repeats a unique category"
        );
        Some(ConstraintViolation::RepeatedUniqueCategory {
            party_id: party.id,
            party: party.rec_name().to_string(),
        })
    }
}

/// Outcome of auditing one party
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Audited party
    pub party_id: PartyId,
    /// Violations found, empty if the party is valid
    pub violations: Vec<ConstraintViolation>,
    /// When the audit ran
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    /// Whether the party satisfied every constraint
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Validates parties against the category constraints of a store
///
/// The taxonomy is re-queried for every batch; nothing is cached between
/// calls.
///
/// # Examples
///
/// ```rust
/// use party_categories::{
///     Category, CategoryConstraintChecker, InMemoryCategoryStore, Party, ValidationContext,
/// };
///
/// let store = InMemoryCategoryStore::new();
/// let size = store.insert(Category::view("Size").unique(true)).unwrap();
/// let small = store.insert(Category::new("Small").with_parent(size.id)).unwrap();
/// let large = store.insert(Category::new("Large").with_parent(size.id)).unwrap();
///
/// let checker = CategoryConstraintChecker::new(store);
/// let party = Party::new("Acme").with_categories([small.id, large.id]);
///
/// let err = checker.validate(&[party], &ValidationContext::default()).unwrap_err();
/// assert_eq!(
///     err.to_string(),
///     "The party \"Acme\" has repeated categories marked as unique"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct CategoryConstraintChecker<S> {
    store: S,
}

impl<S: CategoryStore> CategoryConstraintChecker<S> {
    /// Create a checker reading from the given store
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the current constraint snapshot
    pub fn constraints(&self) -> CategoryResult<ConstraintSet> {
        ConstraintSet::load(&self.store)
    }

    /// Check a single party
    pub fn check(&self, party: &Party) -> CategoryResult<()> {
        self.validate(std::slice::from_ref(party), &ValidationContext::default())
    }

    /// Validate a batch of parties, aborting at the first violation
    pub fn validate(&self, parties: &[Party], ctx: &ValidationContext) -> CategoryResult<()> {
        if !ctx.check_categories {
            debug!(parties = parties.len(), "Category checks disabled by context");
            return Ok(());
        }
        if parties.is_empty() {
            return Ok(());
        }

        let constraints = self.constraints()?;
        if constraints.is_empty() {
            return Ok(());
        }

        for party in parties {
            if let Err(violation) = constraints.check(party) {
                warn!(party_id = %party.id, %violation, "Party rejected by category constraints");
                return Err(violation.into());
            }
        }

        debug!(parties = parties.len(), "Parties passed category constraints");
        Ok(())
    }

    /// Report every violation of every party without failing
    ///
    /// Runs regardless of the bypass flag, so it can review parties that
    /// were written with checks disabled.
    pub fn audit(&self, parties: &[Party]) -> CategoryResult<Vec<CheckReport>> {
        let constraints = self.constraints()?;
        let checked_at = Utc::now();

        let reports: Vec<CheckReport> = parties
            .iter()
            .map(|party| CheckReport {
                party_id: party.id,
                violations: constraints.audit(party),
                checked_at,
            })
            .collect();

        let invalid = reports.iter().filter(|r| !r.is_valid()).count();
        info!(parties = parties.len(), invalid, "Audited party categories");
        Ok(reports)
    }
}

impl<S: CategoryStore + Send + Sync> PartyValidationHook for CategoryConstraintChecker<S> {
    fn name(&self) -> &str {
        "party_categories"
    }

    fn validate(&self, parties: &[Party], ctx: &ValidationContext) -> CategoryResult<()> {
        CategoryConstraintChecker::validate(self, parties, ctx)
    }
}
