//! Host connection seam.

use super::capability::Subject;
use super::version::ProtocolVersion;

/// A live connection as seen by the host server.
///
/// The gate never owns connections; it only reads them during a reminder scan.
pub trait Connection {
    /// The host's logged-in player type.
    type Player: Subject;

    /// Observed protocol version. Use [`ProtocolVersion::Unknown`] when the
    /// host could not identify it.
    fn protocol_version(&self) -> ProtocolVersion;

    /// The player behind this connection, once login has completed.
    fn player(&self) -> Option<&Self::Player>;
}
