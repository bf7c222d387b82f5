//! Reminder scan, run on the host's main loop after a tick is drained.

use crate::metrics::record_reminder_scan;
use crate::policy::PolicySnapshot;
use crate::types::{Connection, Subject, DISABLE_NOTIFY};

/// A message the host should deliver to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder<'a, C> {
    /// Target connection.
    pub connection: &'a C,
    /// Formatted message text.
    pub message: String,
}

/// Select bypassing connections that should be reminded.
///
/// A connection qualifies when its version is not whitelisted or is
/// blacklisted, it has a logged-in player, and that player lacks
/// disable-notify. Returns nothing when reminders are disabled.
pub fn collect_reminders<'a, C, I>(snapshot: &PolicySnapshot, connections: I) -> Vec<Reminder<'a, C>>
where
    C: Connection + 'a,
    I: IntoIterator<Item = &'a C>,
{
    if !snapshot.reminder().is_enabled() {
        return Vec::new();
    }

    let mut scanned = 0;
    let reminders: Vec<_> = connections
        .into_iter()
        .inspect(|_| scanned += 1)
        .filter(|connection| snapshot.needs_bypass(connection.protocol_version()))
        .filter(|connection| {
            connection
                .player()
                .map(|player| !player.has_permission(DISABLE_NOTIFY))
                .unwrap_or(false)
        })
        .map(|connection| Reminder {
            connection,
            message: snapshot.bypass_message().to_string(),
        })
        .collect();

    record_reminder_scan(scanned, reminders.len());
    reminders
}
