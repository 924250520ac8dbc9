// Copyright 2025 Cowboy AI, LLC.

//! Typed identifiers for categories and parties

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// A typed entity ID using phantom types for type safety
///
/// The phantom type parameter keeps a category ID from being passed where a
/// party ID is expected.
///
/// # Examples
///
/// ```rust
/// use party_categories::{CategoryId, EntityId, PartyId};
///
/// let category_id = CategoryId::new();
/// let party_id = PartyId::new();
///
/// // These are different types - won't compile if mixed up:
/// // let _: CategoryId = party_id; // ERROR!
/// assert_ne!(category_id.as_uuid(), party_id.as_uuid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId<T> {
    id: Uuid,
    #[serde(skip)]
    _phantom: PhantomData<T>,
}

impl<T> EntityId<T> {
    /// Create a new random entity ID
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Create an entity ID from a UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.id
    }
}

impl<T> fmt::Display for EntityId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> Default for EntityId<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<EntityId<T>> for Uuid {
    fn from(id: EntityId<T>) -> Self {
        id.id
    }
}

impl<T> JsonSchema for EntityId<T> {
    fn schema_name() -> String {
        "EntityId".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        let mut schema = String::json_schema(gen).into_object();
        schema.format = Some("uuid".to_string());
        schema.into()
    }
}

/// Marker type for Category IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CategoryMarker;

/// Marker type for Party IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PartyMarker;

/// Identifier of a category node
pub type CategoryId = EntityId<CategoryMarker>;

/// Identifier of a party
pub type PartyId = EntityId<PartyMarker>;
