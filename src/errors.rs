// Copyright 2025 Cowboy AI, LLC.

//! Error types for category validation

use crate::entity::{CategoryId, PartyId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user-facing rejection of a party's category assignment
///
/// Violations abort the save of the whole batch they were raised for. They
/// are never retried; the caller fixes the assignment and resubmits.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ConstraintViolation {
    /// A required category has no descendant among the party's categories
    #[error("The party \"{party}\" is missing some required categories: {}", .missing.join(", "))]
    MissingRequiredCategory {
        /// Party that failed validation
        party_id: PartyId,
        /// Display name of the party
        party: String,
        /// Names of unmet required categories, capped for readability
        missing: Vec<String>,
    },

    /// Two or more categories descend from the same unique category
    #[error("The party \"{party}\" has repeated categories marked as unique")]
    RepeatedUniqueCategory {
        /// Party that failed validation
        party_id: PartyId,
        /// Display name of the party
        party: String,
    },
}

impl ConstraintViolation {
    /// The party this violation was raised for
    pub fn party_id(&self) -> PartyId {
        match self {
            ConstraintViolation::MissingRequiredCategory { party_id, .. }
            | ConstraintViolation::RepeatedUniqueCategory { party_id, .. } => *party_id,
        }
    }
}

/// Errors that can occur while validating or storing categories and parties
#[derive(Debug, Clone, Error)]
pub enum CategoryError {
    /// A party broke a category constraint
    #[error(transparent)]
    Violation(#[from] ConstraintViolation),

    /// Category not found
    #[error("Category not found: {0}")]
    CategoryNotFound(CategoryId),

    /// Party not found
    #[error("Party not found: {0}")]
    PartyNotFound(PartyId),

    /// A party with this identity is already stored
    #[error("Party already exists: {0}")]
    PartyExists(PartyId),

    /// The parent chain would be broken or cyclic
    #[error("Invalid category hierarchy for {category}: {reason}")]
    InvalidHierarchy {
        /// Category being written
        category: String,
        /// What is wrong with it
        reason: String,
    },

    /// A view category was assigned through the party category domain
    #[error("Category \"{category}\" cannot be selected on a party")]
    NotSelectable {
        /// Name of the rejected category
        category: String,
    },

    /// The execution context could not be read
    #[error("Invalid validation context: {0}")]
    InvalidContext(String),

    /// The backing store could not be accessed
    #[error("Category store unavailable: {0}")]
    StoreUnavailable(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// Result type for category operations
pub type CategoryResult<T> = Result<T, CategoryError>;

impl From<serde_json::Error> for CategoryError {
    fn from(err: serde_json::Error) -> Self {
        CategoryError::SerializationError(err.to_string())
    }
}

impl CategoryError {
    /// Check if this is a user-facing constraint violation
    pub fn is_violation(&self) -> bool {
        matches!(self, CategoryError::Violation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CategoryError::CategoryNotFound(_) | CategoryError::PartyNotFound(_)
        )
    }

    /// The wrapped violation, if any
    pub fn violation(&self) -> Option<&ConstraintViolation> {
        match self {
            CategoryError::Violation(violation) => Some(violation),
            _ => None,
        }
    }
}
