//! Reminder timing against a paused tokio clock.
//!
//! The host side is simulated by draining the tick channel and running the
//! gate's reminder scan over a fixed connection list.

use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::time::Instant;

use version_gate::reminder::INITIAL_DELAY;
use version_gate::{
    Capability, CapabilitySet, Connection, ProtocolVersion, RawConfig, ReminderTick, VersionGate,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
struct FakeConnection {
    name: &'static str,
    version: ProtocolVersion,
    player: Option<CapabilitySet>,
}

impl Connection for FakeConnection {
    type Player = CapabilitySet;

    fn protocol_version(&self) -> ProtocolVersion {
        self.version
    }

    fn player(&self) -> Option<&CapabilitySet> {
        self.player.as_ref()
    }
}

fn config(interval: i64) -> RawConfig {
    let mut raw = RawConfig {
        whitelist_message: Some("&cUnsupported".to_string()),
        blacklist_message: Some("&cBlocked".to_string()),
        bypass_message: Some("&ePlease update".to_string()),
        repeat_bypass_message: interval,
        ..RawConfig::default()
    };
    raw.whitelist.allow_versions = vec!["1.12.2".to_string()];
    raw.blacklist = vec!["1.7.5".to_string()];
    raw
}

fn connections() -> Vec<FakeConnection> {
    let staff = CapabilitySet::none().with(Capability::BypassAll);
    let quiet_staff = staff.with(Capability::DisableNotify);

    vec![
        FakeConnection { name: "supported", version: ProtocolVersion::V1_12_2, player: Some(staff) },
        FakeConnection { name: "old", version: ProtocolVersion::V1_8, player: Some(staff) },
        FakeConnection { name: "blocked", version: ProtocolVersion::V1_7_5, player: Some(staff) },
        FakeConnection { name: "quiet", version: ProtocolVersion::V1_8, player: Some(quiet_staff) },
        FakeConnection { name: "logging_in", version: ProtocolVersion::V1_8, player: None },
    ]
}

/// Paused-clock timers fire on millisecond ticks.
fn assert_elapsed(start: Instant, expected: Duration) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= expected && elapsed < expected + Duration::from_millis(2),
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

fn notified(
    gate: &VersionGate<mpsc::UnboundedSender<ReminderTick>>,
    tick: ReminderTick,
    connections: &[FakeConnection],
) -> Vec<&'static str> {
    gate.reminders(tick, connections)
        .into_iter()
        .map(|reminder| reminder.connection.name)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// TIMING TESTS
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_negative_interval_never_fires() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReminderTick>();
    let gate = VersionGate::new(&config(-1), tx, Handle::current()).unwrap();
    assert_eq!(gate.reminder_generation(), 1);

    tokio::time::sleep(Duration::from_secs(24 * 3600)).await;

    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_interval_fires_after_initial_delay_then_every_period() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReminderTick>();
    let start = Instant::now();
    let gate = VersionGate::new(&config(600), tx, Handle::current()).unwrap();
    let connections = connections();

    let first = rx.recv().await.unwrap();
    assert_elapsed(start, INITIAL_DELAY);
    assert_eq!(first.sequence, 0);
    assert_eq!(notified(&gate, first, &connections), vec!["old", "blocked"]);

    for n in 1..=3u32 {
        let tick = rx.recv().await.unwrap();
        assert_elapsed(start, INITIAL_DELAY + Duration::from_secs(600) * n);
        assert_eq!(tick.sequence, u64::from(n));
        assert_eq!(notified(&gate, tick, &connections), vec!["old", "blocked"]);
    }

    gate.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_zero_interval_fires_once() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReminderTick>();
    let gate = VersionGate::new(&config(0), tx, Handle::current()).unwrap();

    let tick = rx.recv().await.unwrap();
    assert_eq!(notified(&gate, tick, &connections()), vec!["old", "blocked"]);

    tokio::time::sleep(Duration::from_secs(3600)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_reload_retires_old_ticks() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReminderTick>();
    let gate = VersionGate::new(&config(600), tx, Handle::current()).unwrap();
    let connections = connections();

    let old_tick = rx.recv().await.unwrap();
    assert_eq!(old_tick.generation, 1);

    gate.reload(&config(30)).unwrap();

    // A tick drained after the reload belongs to a retired scheduler.
    assert!(notified(&gate, old_tick, &connections).is_empty());

    let start = Instant::now();
    let fresh = rx.recv().await.unwrap();
    assert_eq!(fresh.generation, 2);
    assert_elapsed(start, INITIAL_DELAY);
    assert_eq!(notified(&gate, fresh, &connections), vec!["old", "blocked"]);

    let next = rx.recv().await.unwrap();
    assert_eq!(next.generation, 2);
    assert_elapsed(start, INITIAL_DELAY + Duration::from_secs(30));

    gate.shutdown();
}

#[tokio::test(start_paused = true)]
async fn test_no_ticks_after_shutdown() {
    let (tx, mut rx) = mpsc::unbounded_channel::<ReminderTick>();
    let gate = VersionGate::new(&config(5), tx, Handle::current()).unwrap();

    rx.recv().await.unwrap();
    gate.shutdown();

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert!(rx.try_recv().is_err());
}
