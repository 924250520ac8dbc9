// Copyright 2025 Cowboy AI, LLC.

//! Execution context for party validation

use crate::errors::{CategoryError, CategoryResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the bypass flag in a host context map
pub const CHECK_CATEGORIES_KEY: &str = "check_categories";

fn default_check_categories() -> bool {
    true
}

/// Flags controlling a single validation call
///
/// # Examples
///
/// ```rust
/// use party_categories::ValidationContext;
///
/// let ctx: ValidationContext = serde_json::from_str("{}").unwrap();
/// assert!(ctx.check_categories);
///
/// let bulk = ValidationContext::skip_categories();
/// assert!(!bulk.check_categories);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationContext {
    /// Run the category constraint checks; disable for bulk imports
    #[serde(default = "default_check_categories")]
    pub check_categories: bool,
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self {
            check_categories: default_check_categories(),
        }
    }
}

impl ValidationContext {
    /// Context that skips the category checks
    pub fn skip_categories() -> Self {
        Self {
            check_categories: false,
        }
    }

    /// Read the flags from a host context map
    ///
    /// Unrelated keys are ignored. A missing flag keeps its default.
    pub fn from_context_map(context: &Map<String, Value>) -> CategoryResult<Self> {
        match context.get(CHECK_CATEGORIES_KEY) {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(Value::Bool(check_categories)) => Ok(Self {
                check_categories: *check_categories,
            }),
            Some(other) => Err(CategoryError::InvalidContext(format!(
                "{CHECK_CATEGORIES_KEY} must be a boolean, got {other}"
            ))),
        }
    }
}
