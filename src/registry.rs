// Copyright 2025 Cowboy AI, LLC.

//! Party registry running validation hooks before each write
//!
//! Every create or update batch is passed in full to each registered hook.
//! The batch is committed only if all hooks accept it, so a rejected batch
//! leaves the registry untouched.

use crate::context::ValidationContext;
use crate::entity::PartyId;
use crate::errors::{CategoryError, CategoryResult};
use crate::party::Party;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{RwLock, RwLockReadGuard};
use tracing::{debug, info};

/// Validation run on every batch of parties being written
pub trait PartyValidationHook: Send + Sync {
    /// Name of the hook, used in logs
    fn name(&self) -> &str;

    /// Accept or reject the batch
    fn validate(&self, parties: &[Party], ctx: &ValidationContext) -> CategoryResult<()>;
}

/// In-memory party storage with validation hooks
#[derive(Default)]
pub struct PartyRegistry {
    parties: RwLock<IndexMap<PartyId, Party>>,
    hooks: Vec<Box<dyn PartyValidationHook>>,
}

impl PartyRegistry {
    /// Create an empty registry without hooks
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook; hooks run in registration order
    pub fn register(&mut self, hook: Box<dyn PartyValidationHook>) {
        debug!(hook = hook.name(), "Registered party validation hook");
        self.hooks.push(hook);
    }

    /// Names of the registered hooks
    pub fn hooks(&self) -> Vec<&str> {
        self.hooks.iter().map(|hook| hook.name()).collect()
    }

    /// Validate and store new parties
    ///
    /// Fails with [`CategoryError::PartyExists`] when an id is already stored
    /// or appears twice in the batch.
    pub fn create(
        &self,
        parties: Vec<Party>,
        ctx: &ValidationContext,
    ) -> CategoryResult<Vec<PartyId>> {
        check_ids(&*self.read()?, &parties, Batch::Create)?;
        self.run_hooks(&parties, ctx)?;
        let ids = self.commit(parties, Batch::Create)?;
        info!(count = ids.len(), "Created parties");
        Ok(ids)
    }

    /// Validate and store updated parties
    ///
    /// Fails with [`CategoryError::PartyNotFound`] for unknown ids and with
    /// [`CategoryError::PartyExists`] when an id appears twice in the batch.
    pub fn write(&self, parties: Vec<Party>, ctx: &ValidationContext) -> CategoryResult<()> {
        check_ids(&*self.read()?, &parties, Batch::Update)?;
        self.run_hooks(&parties, ctx)?;
        let ids = self.commit(parties, Batch::Update)?;
        info!(count = ids.len(), "Updated parties");
        Ok(())
    }

    /// Load a stored party
    pub fn get(&self, id: PartyId) -> CategoryResult<Party> {
        self.read()?
            .get(&id)
            .cloned()
            .ok_or(CategoryError::PartyNotFound(id))
    }

    /// All stored parties in creation order
    pub fn all(&self) -> CategoryResult<Vec<Party>> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Number of stored parties
    pub fn len(&self) -> CategoryResult<usize> {
        Ok(self.read()?.len())
    }

    /// Whether no party is stored
    pub fn is_empty(&self) -> CategoryResult<bool> {
        Ok(self.read()?.is_empty())
    }

    fn run_hooks(&self, parties: &[Party], ctx: &ValidationContext) -> CategoryResult<()> {
        for hook in &self.hooks {
            hook.validate(parties, ctx).inspect_err(|e| {
                info!(hook = hook.name(), error = %e, "Party batch rejected");
            })?;
        }
        Ok(())
    }

    fn commit(&self, parties: Vec<Party>, batch: Batch) -> CategoryResult<Vec<PartyId>> {
        let mut stored = self
            .parties
            .write()
            .map_err(|e| CategoryError::StoreUnavailable(e.to_string()))?;
        // Re-checked under the write lock; another batch may have committed
        // since the hooks ran.
        check_ids(&stored, &parties, batch)?;
        Ok(parties
            .into_iter()
            .map(|party| {
                let id = party.id;
                stored.insert(id, party);
                id
            })
            .collect())
    }

    fn read(&self) -> CategoryResult<RwLockReadGuard<'_, IndexMap<PartyId, Party>>> {
        self.parties
            .read()
            .map_err(|e| CategoryError::StoreUnavailable(e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Batch {
    Create,
    Update,
}

/// Batch ids must be distinct, new for a create and stored for an update
fn check_ids(
    stored: &IndexMap<PartyId, Party>,
    parties: &[Party],
    batch: Batch,
) -> CategoryResult<()> {
    let mut seen = HashSet::with_capacity(parties.len());
    for party in parties {
        if !seen.insert(party.id) {
            return Err(CategoryError::PartyExists(party.id));
        }
        match (batch, stored.contains_key(&party.id)) {
            (Batch::Create, true) => return Err(CategoryError::PartyExists(party.id)),
            (Batch::Update, false) => return Err(CategoryError::PartyNotFound(party.id)),
            _ => {}
        }
    }
    Ok(())
}
