//! Dedup Registry
//!
//! Transactional get-or-create: the first successful ingestion of a
//! fingerprint registers its physical address; every later ingestion of
//! the same content gets that address back and skips its own upload.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::Result;
use crate::StrataError;

use super::store::{TransactionalStore, TxOptions};
use super::DedupId;

/// Content-address registry over a transactional store
pub struct DedupRegistry<S: TransactionalStore> {
    store: S,
    /// Deadline applied to each transaction attempt
    transaction_timeout: Duration,
    /// Attempt budget when an insert loses the unique-key race
    retry_limit: usize,
}

impl<S: TransactionalStore> DedupRegistry<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            transaction_timeout: Duration::from_millis(config.transaction_timeout_ms),
            retry_limit: config.dedup_retry_limit.max(1),
        }
    }

    /// The canonical physical address for `dedup_id` in `repository`
    ///
    /// Returns the stored address if the fingerprint is already
    /// registered — the caller must then reuse the existing object
    /// instead of uploading. Otherwise registers and returns
    /// `physical_address`. Runs as one transaction per attempt; losing
    /// the insert race retries the read path, so concurrent writers of
    /// identical content converge on a single address.
    pub fn get_or_create(
        &self,
        repository: &str,
        dedup_id: &str,
        physical_address: &str,
    ) -> Result<String> {
        // Reject malformed input before any transaction starts
        validate_repository_name(repository)?;
        validate_physical_address(physical_address)?;
        let dedup_id = DedupId::from_hex(dedup_id)?;

        let opts = TxOptions::with_deadline(Instant::now() + self.transaction_timeout);

        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.store.transact(&opts, |tx| {
                let repository_id = tx.resolve(repository)?;

                if let Some(entry) = tx.get_dedup(repository_id, &dedup_id)? {
                    tracing::trace!(
                        "Dedup hit for {} in repository {}: reusing {}",
                        dedup_id,
                        repository,
                        entry.physical_address
                    );
                    return Ok(entry.physical_address);
                }

                tx.insert_dedup(repository_id, &dedup_id, physical_address)?;
                Ok(physical_address.to_string())
            });

            match result {
                Err(e) if e.is_conflict() && attempt < self.retry_limit => {
                    // Another writer registered this fingerprint first;
                    // re-read to return the winner's address
                    tracing::debug!(
                        "Dedup insert race for {} in repository {} (attempt {}), retrying",
                        dedup_id,
                        repository,
                        attempt
                    );
                }
                other => return other,
            }
        }
    }
}

// =============================================================================
// Input Validation
// =============================================================================

/// Max repository name length
const MAX_REPOSITORY_NAME_LEN: usize = 63;

fn validate_repository_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_REPOSITORY_NAME_LEN
        && name.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StrataError::Validation(format!(
            "Invalid repository name: '{}'",
            name
        )))
    }
}

fn validate_physical_address(address: &str) -> Result<()> {
    if address.is_empty() {
        return Err(StrataError::Validation(
            "Physical address must not be empty".to_string(),
        ));
    }
    Ok(())
}
