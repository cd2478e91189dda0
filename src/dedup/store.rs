//! Transactional Store Contracts
//!
//! The registry's view of its collaborators: repository name resolution
//! and transaction execution, both supplied by the surrounding catalog
//! service. `MemStore` is the in-process implementation used for tests
//! and embedded deployments.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::Mutex;

use crate::error::Result;
use crate::StrataError;

use super::{DedupEntry, DedupId, RepositoryId};

// =============================================================================
// Contracts
// =============================================================================

/// Per-transaction options
#[derive(Debug, Clone, Copy, Default)]
pub struct TxOptions {
    /// Hint that the transaction performs no writes
    pub read_only: bool,
    /// Abort with a timeout error once this deadline passes
    pub deadline: Option<Instant>,
}

impl TxOptions {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            deadline: None,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            read_only: false,
            deadline: Some(deadline),
        }
    }
}

/// Maps a repository name to its internal id
pub trait RepositoryResolver {
    /// Returns `NotFound` if no repository has this name
    fn resolve(&self, name: &str) -> Result<RepositoryId>;
}

/// Handle to one active transaction
///
/// Resolution runs against the same transaction as the dedup reads and
/// writes, so a get-or-create observes one consistent snapshot.
pub trait Transaction: RepositoryResolver {
    /// Read the row registered for a fingerprint.
    /// A miss is `Ok(None)` — expected, never an error.
    fn get_dedup(
        &self,
        repository_id: RepositoryId,
        dedup_id: &DedupId,
    ) -> Result<Option<DedupEntry>>;

    /// Register a physical address for a fingerprint.
    /// Returns `Conflict` if a row for `(repository_id, dedup_id)` already
    /// exists — the unique-key race a caller must retry by re-reading.
    fn insert_dedup(
        &mut self,
        repository_id: RepositoryId,
        dedup_id: &DedupId,
        physical_address: &str,
    ) -> Result<()>;
}

/// Executes closures transactionally
///
/// Writes performed through the transaction handle become visible only if
/// the closure returns `Ok`; any error aborts with nothing applied.
pub trait TransactionalStore {
    fn transact<T, F>(&self, opts: &TxOptions, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>;
}

// A shared store handle is itself a store; lets one MemStore back several
// registries (or threads) at once.
impl<S: TransactionalStore> TransactionalStore for std::sync::Arc<S> {
    fn transact<T, F>(&self, opts: &TxOptions, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>,
    {
        (**self).transact(opts, f)
    }
}

// =============================================================================
// In-memory Implementation
// =============================================================================

struct MemState {
    repositories: HashMap<String, RepositoryId>,
    next_repository_id: RepositoryId,
    dedup: HashMap<(RepositoryId, DedupId), String>,
}

/// In-memory transactional store
///
/// ## Concurrency:
/// - One mutex guards all state and is held for a whole transaction, so
///   transactions are serializable by construction
/// - Writes are staged in the transaction handle and applied only when the
///   closure succeeds
pub struct MemStore {
    state: Mutex<MemState>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemState {
                repositories: HashMap::new(),
                next_repository_id: 1,
                dedup: HashMap::new(),
            }),
        }
    }

    /// Register a repository, returning its internal id
    ///
    /// Idempotent on the name: registering an existing name returns the
    /// id it already has.
    pub fn create_repository(&self, name: &str) -> RepositoryId {
        let mut state = self.state.lock();
        if let Some(&id) = state.repositories.get(name) {
            return id;
        }
        let id = state.next_repository_id;
        state.next_repository_id += 1;
        state.repositories.insert(name.to_string(), id);
        tracing::debug!("Created repository '{}' with id {}", name, id);
        id
    }

    /// Number of dedup rows currently stored (all repositories)
    pub fn dedup_entry_count(&self) -> usize {
        self.state.lock().dedup.len()
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionalStore for MemStore {
    fn transact<T, F>(&self, opts: &TxOptions, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Transaction) -> Result<T>,
    {
        let expired = |deadline: Option<Instant>| {
            deadline.is_some_and(|d| Instant::now() >= d)
        };

        if expired(opts.deadline) {
            return Err(StrataError::Timeout(
                "Transaction deadline passed before start".to_string(),
            ));
        }

        let mut state = self.state.lock();
        let mut tx = MemTransaction {
            state: &mut *state,
            staged: Vec::new(),
            read_only: opts.read_only,
        };

        let out = f(&mut tx)?;
        let staged = tx.staged;

        // Abort rather than commit a transaction that ran past its deadline
        if expired(opts.deadline) {
            return Err(StrataError::Timeout(
                "Transaction deadline passed before commit".to_string(),
            ));
        }

        for ((repository_id, dedup_id), physical_address) in staged {
            state.dedup.insert((repository_id, dedup_id), physical_address);
        }
        Ok(out)
    }
}

struct MemTransaction<'a> {
    state: &'a mut MemState,
    /// Writes pending commit
    staged: Vec<((RepositoryId, DedupId), String)>,
    read_only: bool,
}

impl RepositoryResolver for MemTransaction<'_> {
    fn resolve(&self, name: &str) -> Result<RepositoryId> {
        self.state
            .repositories
            .get(name)
            .copied()
            .ok_or_else(|| StrataError::NotFound(format!("Repository '{}'", name)))
    }
}

impl Transaction for MemTransaction<'_> {
    fn get_dedup(
        &self,
        repository_id: RepositoryId,
        dedup_id: &DedupId,
    ) -> Result<Option<DedupEntry>> {
        let key = (repository_id, *dedup_id);
        let addr = self
            .staged
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, addr)| addr.clone())
            .or_else(|| self.state.dedup.get(&key).cloned());
        Ok(addr.map(|physical_address| DedupEntry {
            repository_id,
            dedup_id: *dedup_id,
            physical_address,
        }))
    }

    fn insert_dedup(
        &mut self,
        repository_id: RepositoryId,
        dedup_id: &DedupId,
        physical_address: &str,
    ) -> Result<()> {
        if self.read_only {
            return Err(StrataError::Storage(
                "Insert attempted in a read-only transaction".to_string(),
            ));
        }
        let key = (repository_id, *dedup_id);
        if self.state.dedup.contains_key(&key) || self.staged.iter().any(|(k, _)| *k == key) {
            return Err(StrataError::Conflict(format!(
                "Dedup entry already exists for repository {} id {}",
                repository_id, dedup_id
            )));
        }
        self.staged.push((key, physical_address.to_string()));
        Ok(())
    }
}
