//! Live policy store.
//!
//! ## Publication Model
//!
//! ```text
//! reload(raw) ── reload_lock ──▶ PolicySnapshot::from_raw ──▶ write(current) = Arc::new(next)
//!                                         │ Err
//!                                         ▼
//!                                 current untouched
//! ```
//!
//! Readers clone the `Arc` under a momentary read lock. The snapshot is built
//! before the write lock is taken, so readers never wait on validation and
//! never observe a half-built policy.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{ConfigError, RawConfig};
use crate::metrics::record_reload;
use crate::policy::PolicySnapshot;
use crate::types::{CapabilitySet, Decision, ProtocolVersion};

/// Holds the currently published policy snapshot.
#[derive(Debug)]
pub struct PolicyStore {
    current: RwLock<Arc<PolicySnapshot>>,
    reload_lock: Mutex<()>,
    generation: AtomicU64,
}

impl PolicyStore {
    /// Create a store publishing an already validated snapshot.
    pub fn new(snapshot: PolicySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: Mutex::new(()),
            generation: AtomicU64::new(1),
        }
    }

    /// Validate raw config and create a store from it.
    pub fn load(raw: &RawConfig) -> Result<Self, ConfigError> {
        let snapshot = PolicySnapshot::from_raw(raw)?;
        info!(
            fingerprint = %snapshot.fingerprint(),
            whitelisted = snapshot.whitelist().len(),
            blacklisted = snapshot.blacklist().len(),
            reminder_interval_seconds = snapshot.reminder_interval_seconds(),
            "Policy loaded"
        );
        Ok(Self::new(snapshot))
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.current.read().clone()
    }

    /// Number of snapshots published so far, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Validate `raw` and publish it atomically.
    ///
    /// On error the previous snapshot stays published, unchanged.
    pub fn reload(&self, raw: &RawConfig) -> Result<Arc<PolicySnapshot>, ConfigError> {
        let _serialized = self.reload_lock.lock();

        let next = match PolicySnapshot::from_raw(raw) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(error = %e, key = ?e.key(), "Reload rejected, keeping previous policy");
                record_reload(false, self.generation());
                return Err(e);
            }
        };

        let previous = std::mem::replace(&mut *self.current.write(), Arc::clone(&next));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;

        info!(
            generation = generation,
            fingerprint = %next.fingerprint(),
            previous_fingerprint = %previous.fingerprint(),
            whitelisted = next.whitelist().len(),
            blacklisted = next.blacklist().len(),
            reminder_interval_seconds = next.reminder_interval_seconds(),
            "Policy reloaded"
        );
        record_reload(true, generation);

        Ok(next)
    }

    /// Whether the version is blacklisted in the current snapshot.
    pub fn is_blacklisted(&self, version: ProtocolVersion) -> bool {
        self.snapshot().is_blacklisted(version)
    }

    /// Whether the version is whitelisted in the current snapshot.
    pub fn is_whitelisted(&self, version: ProtocolVersion) -> bool {
        self.snapshot().is_whitelisted(version)
    }

    /// Evaluate against exactly one snapshot.
    pub fn decide(&self, version: ProtocolVersion, caps: CapabilitySet) -> Decision {
        self.snapshot().decide(version, caps)
    }

    /// Current whitelist kick message.
    pub fn whitelist_message(&self) -> String {
        self.snapshot().whitelist_message().to_string()
    }

    /// Current blacklist kick message.
    pub fn blacklist_message(&self) -> String {
        self.snapshot().blacklist_message().to_string()
    }

    /// Current bypass reminder message.
    pub fn bypass_message(&self) -> String {
        self.snapshot().bypass_message().to_string()
    }

    /// Current raw reminder interval.
    pub fn reminder_interval_seconds(&self) -> i64 {
        self.snapshot().reminder_interval_seconds()
    }
}
