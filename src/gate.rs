//! Connection gate: the host-facing entry points.
//!
//! ## Lifecycle
//!
//! ```text
//! login start ──check_login──▶ Deferred | Allow | Deny
//!      │
//!    join ──────check_join───▶ Kick | Admit { delayed messages }
//!
//! tick from TaskQueue ──reminders──▶ [(connection, message)]
//! ```
//!
//! Both checks run the same decision engine. The login check is best-effort:
//! it defers when the host cannot resolve permissions yet. The join check is
//! authoritative.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::debug;

use crate::config::{ConfigError, RawConfig};
use crate::metrics::{record_decision, CheckStage};
use crate::policy::PolicySnapshot;
use crate::reminder::{collect_reminders, Reminder, ReminderScheduler, ReminderTick, TaskQueue};
use crate::store::PolicyStore;
use crate::types::{CapabilitySet, Connection, Decision, ProtocolVersion, Subject};

/// Delay before post-join messages, so they are not buried under other join output.
pub const JOIN_MESSAGE_DELAY: Duration = Duration::from_secs(1);

/// Result of the pre-admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginVerdict {
    /// Permissions unavailable; leave it to the join check.
    Deferred,
    /// Let the login continue.
    Allow(Decision),
    /// Refuse the login with this message.
    Deny {
        /// Why.
        decision: Decision,
        /// Kick text.
        message: String,
    },
}

/// A message to send once `delay` has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayedMessage {
    /// Delay after join.
    pub delay: Duration,
    /// Formatted text.
    pub message: String,
}

/// Result of the authoritative join check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Kick the player and suppress the join broadcast.
    Kick {
        /// Why.
        decision: Decision,
        /// Kick text.
        message: String,
    },
    /// Let the player in and schedule these messages.
    Admit {
        /// Why.
        decision: Decision,
        /// Messages to deliver after join.
        messages: Vec<DelayedMessage>,
    },
}

/// Version gate wired to a host task queue and runtime.
pub struct VersionGate<Q: TaskQueue + Clone> {
    store: PolicyStore,
    queue: Q,
    runtime: Handle,
    scheduler: Mutex<ReminderScheduler>,
    active_generation: AtomicU64,
}

impl<Q: TaskQueue + Clone> VersionGate<Q> {
    /// Validate the initial config and start reminders.
    pub fn new(raw: &RawConfig, queue: Q, runtime: Handle) -> Result<Self, ConfigError> {
        let store = PolicyStore::load(raw)?;
        let generation = 1;
        let scheduler = ReminderScheduler::start(
            generation,
            store.snapshot().reminder(),
            queue.clone(),
            &runtime,
        );

        Ok(Self {
            store,
            queue,
            runtime,
            scheduler: Mutex::new(scheduler),
            active_generation: AtomicU64::new(generation),
        })
    }

    /// The currently published snapshot.
    pub fn snapshot(&self) -> Arc<PolicySnapshot> {
        self.store.snapshot()
    }

    /// Generation of the live reminder scheduler.
    pub fn reminder_generation(&self) -> u64 {
        self.active_generation.load(Ordering::Acquire)
    }

    /// Pre-admission check at login start.
    ///
    /// Pass `None` when the host cannot look up permissions for the
    /// connecting profile yet.
    pub fn check_login(&self, version: ProtocolVersion, caps: Option<CapabilitySet>) -> LoginVerdict {
        let Some(caps) = caps else {
            return LoginVerdict::Deferred;
        };

        let snapshot = self.store.snapshot();
        let decision = snapshot.decide(version, caps);
        record_decision(CheckStage::Login, version, decision);

        match snapshot.deny_message(decision) {
            Some(message) => LoginVerdict::Deny {
                decision,
                message: message.to_string(),
            },
            None => LoginVerdict::Allow(decision),
        }
    }

    /// Authoritative check when the player joins.
    pub fn check_join<S: Subject + ?Sized>(&self, version: ProtocolVersion, player: &S) -> JoinOutcome {
        let caps = CapabilitySet::query(player);
        let snapshot = self.store.snapshot();
        let decision = snapshot.decide(version, caps);
        record_decision(CheckStage::Join, version, decision);

        if let Some(message) = snapshot.deny_message(decision) {
            return JoinOutcome::Kick {
                decision,
                message: message.to_string(),
            };
        }

        let mut messages = Vec::new();

        if decision.is_bypassed() && snapshot.reminder().is_enabled() && !caps.disable_notify {
            messages.push(DelayedMessage {
                delay: JOIN_MESSAGE_DELAY,
                message: snapshot.bypass_message().to_string(),
            });
        }

        if let Some(recommended) = snapshot.recommended() {
            if recommended.version != version {
                messages.push(DelayedMessage {
                    delay: JOIN_MESSAGE_DELAY,
                    message: recommended.message.clone(),
                });
            }
        }

        JoinOutcome::Admit { decision, messages }
    }

    /// Reload the policy. Restarts reminders when the new interval differs
    /// from the one the live scheduler runs.
    ///
    /// On error nothing changes: the old snapshot and scheduler stay live.
    pub fn reload(&self, raw: &RawConfig) -> Result<Arc<PolicySnapshot>, ConfigError> {
        let mut scheduler = self.scheduler.lock();

        let next = self.store.reload(raw)?;

        if next.reminder() != scheduler.interval() {
            scheduler.shutdown();
            let generation = scheduler.generation() + 1;
            *scheduler = ReminderScheduler::start(
                generation,
                next.reminder(),
                self.queue.clone(),
                &self.runtime,
            );
            self.active_generation.store(generation, Ordering::Release);
        }

        Ok(next)
    }

    /// Run the reminder scan for a drained tick.
    ///
    /// Ticks from a replaced scheduler are ignored.
    pub fn reminders<'a, C, I>(&self, tick: ReminderTick, connections: I) -> Vec<Reminder<'a, C>>
    where
        C: Connection + 'a,
        I: IntoIterator<Item = &'a C>,
    {
        if tick.generation != self.reminder_generation() {
            debug!(
                tick_generation = tick.generation,
                active_generation = self.reminder_generation(),
                "Ignoring stale reminder tick"
            );
            return Vec::new();
        }

        collect_reminders(&self.store.snapshot(), connections)
    }

    /// Stop reminders. The gate keeps answering checks.
    pub fn shutdown(&self) {
        self.scheduler.lock().shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reminder::ReminderInterval;
    use crate::types::{BypassKind, Capability};
    use tokio::sync::mpsc;

    fn raw() -> RawConfig {
        let mut raw = RawConfig {
            whitelist_message: Some("&cnot whitelisted".to_string()),
            blacklist_message: Some("&cblacklisted".to_string()),
            bypass_message: Some("&eplease update".to_string()),
            repeat_bypass_message: -1,
            ..RawConfig::default()
        };
        raw.whitelist.allow_versions = vec!["1.12.2".to_string()];
        raw.blacklist = vec!["1.7.5".to_string()];
        raw
    }

    fn gate(raw: &RawConfig) -> VersionGate<mpsc::UnboundedSender<ReminderTick>> {
        let (tx, _rx) = mpsc::unbounded_channel::<ReminderTick>();
        VersionGate::new(raw, tx, Handle::current()).unwrap()
    }

    #[tokio::test]
    async fn test_login_defers_without_caps() {
        let gate = gate(&raw());
        assert_eq!(gate.check_login(ProtocolVersion::V1_7_5, None), LoginVerdict::Deferred);
    }

    #[tokio::test]
    async fn test_login_denies_with_message() {
        let gate = gate(&raw());
        let verdict = gate.check_login(ProtocolVersion::V1_7_5, Some(CapabilitySet::none()));

        assert_eq!(
            verdict,
            LoginVerdict::Deny {
                decision: Decision::DenyBlacklisted,
                message: "§cblacklisted".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_join_kicks_not_whitelisted() {
        let gate = gate(&raw());
        let outcome = gate.check_join(ProtocolVersion::V1_8, &CapabilitySet::none());

        assert!(matches!(
            outcome,
            JoinOutcome::Kick { decision: Decision::DenyNotWhitelisted, .. }
        ));
    }

    #[tokio::test]
    async fn test_join_reminder_respects_interval_and_notify() {
        let mut raw = raw();
        raw.repeat_bypass_message = 0;
        let gate = gate(&raw);
        let bypass = CapabilitySet::none().with(Capability::BypassAll);

        match gate.check_join(ProtocolVersion::V1_8, &bypass) {
            JoinOutcome::Admit { decision, messages } => {
                assert_eq!(decision, Decision::AllowBypassed(BypassKind::Whitelist));
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].delay, JOIN_MESSAGE_DELAY);
                assert_eq!(messages[0].message, "§eplease update");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let quiet = bypass.with(Capability::DisableNotify);
        match gate.check_join(ProtocolVersion::V1_8, &quiet) {
            JoinOutcome::Admit { messages, .. } => assert!(messages.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_without_reminders_when_disabled() {
        let gate = gate(&raw());
        let bypass = CapabilitySet::none().with(Capability::BypassAll);

        match gate.check_join(ProtocolVersion::V1_8, &bypass) {
            JoinOutcome::Admit { messages, .. } => assert!(messages.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_recommendation() {
        let mut raw = raw();
        raw.whitelist.allow_versions.push("1.8".to_string());
        raw.recommended_version = Some("1.12.2".to_string());
        raw.recommend_message = Some("&aTry 1.12.2".to_string());
        let gate = gate(&raw);

        match gate.check_join(ProtocolVersion::V1_8, &CapabilitySet::none()) {
            JoinOutcome::Admit { decision, messages } => {
                assert_eq!(decision, Decision::Allow);
                assert_eq!(messages.len(), 1);
                assert_eq!(messages[0].message, "§aTry 1.12.2");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        match gate.check_join(ProtocolVersion::V1_12_2, &CapabilitySet::none()) {
            JoinOutcome::Admit { messages, .. } => assert!(messages.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_and_join_agree() {
        let gate = gate(&raw());
        let caps_options = [
            CapabilitySet::none(),
            CapabilitySet::none().with(Capability::BypassAll),
            CapabilitySet::none().with(Capability::BypassBlacklist),
        ];

        for version in ProtocolVersion::ALL.iter().copied() {
            for caps in caps_options {
                let login = match gate.check_login(version, Some(caps)) {
                    LoginVerdict::Allow(d) | LoginVerdict::Deny { decision: d, .. } => d,
                    LoginVerdict::Deferred => unreachable!(),
                };
                let join = match gate.check_join(version, &caps) {
                    JoinOutcome::Kick { decision, .. } | JoinOutcome::Admit { decision, .. } => decision,
                };
                assert_eq!(login, join, "version {version} caps {caps:?}");
            }
        }
    }

    #[tokio::test]
    async fn test_reload_restarts_scheduler_only_on_interval_change() {
        let gate = gate(&raw());
        assert_eq!(gate.reminder_generation(), 1);

        let mut same_interval = raw();
        same_interval.blacklist.clear();
        gate.reload(&same_interval).unwrap();
        assert_eq!(gate.reminder_generation(), 1);

        let mut new_interval = raw();
        new_interval.repeat_bypass_message = 30;
        gate.reload(&new_interval).unwrap();
        assert_eq!(gate.reminder_generation(), 2);

        gate.shutdown();
    }

    #[tokio::test]
    async fn test_reload_compares_against_running_scheduler() {
        let mut initial = raw();
        initial.repeat_bypass_message = 600;
        let gate = gate(&initial);

        let mut faster = raw();
        faster.repeat_bypass_message = 30;

        // Snapshot moves to 30s behind the scheduler's back.
        gate.store.reload(&faster).unwrap();
        assert_eq!(gate.snapshot().reminder(), ReminderInterval::from_seconds(30));
        assert_eq!(gate.reminder_generation(), 1);

        gate.reload(&faster).unwrap();
        assert_eq!(gate.reminder_generation(), 2);
        assert_eq!(gate.scheduler.lock().interval(), ReminderInterval::from_seconds(30));

        gate.shutdown();
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_scheduler() {
        let gate = gate(&raw());
        let mut broken = raw();
        broken.repeat_bypass_message = 30;
        broken.whitelist_message = None;

        assert!(gate.reload(&broken).is_err());
        assert_eq!(gate.reminder_generation(), 1);
        assert_eq!(gate.snapshot().reminder_interval_seconds(), -1);
    }
}
