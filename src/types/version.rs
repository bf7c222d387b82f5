//! Protocol version identifiers.
//!
//! ## Accepted Spellings
//!
//! | Input | Example | Handling |
//! |-------|---------|----------|
//! | Canonical token | `MINECRAFT_1_12_2` | exact lookup |
//! | Dotted release | `1.12.2` | `MINECRAFT_` + (`.` → `_`), then lookup |
//!
//! Anything else is unresolvable. Callers observing a live connection map that
//! to [`ProtocolVersion::Unknown`], which never appears in [`ProtocolVersion::ALL`]
//! and therefore can never be whitelisted or blacklisted.
//!
//! ## Ordering
//!
//! Variants are declared oldest first. The derived `Ord` follows the release
//! sequence, not string order (`1.10` sorts after `1.9.4`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every canonical token.
pub const TOKEN_PREFIX: &str = "MINECRAFT_";

/// Error returned by [`ProtocolVersion::from_str`] for unknown spellings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown protocol version: '{0}'")]
pub struct UnresolvableVersion(pub String);

macro_rules! protocol_versions {
    ($($variant:ident => ($token:literal, $release:literal, $protocol:literal)),+ $(,)?) => {
        /// A supported client protocol release.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum ProtocolVersion {
            /// Sentinel for a connection whose version could not be resolved.
            #[serde(rename = "UNKNOWN")]
            Unknown,
            $(
                #[doc = concat!("Release ", $release, " (protocol ", stringify!($protocol), ").")]
                #[serde(rename = $token)]
                $variant,
            )+
        }

        impl ProtocolVersion {
            /// Every supported release, oldest first.
            pub const ALL: &'static [ProtocolVersion] = &[$(ProtocolVersion::$variant),+];

            /// Canonical token, e.g. `MINECRAFT_1_12_2`.
            pub fn token(self) -> &'static str {
                match self {
                    Self::Unknown => "UNKNOWN",
                    $(Self::$variant => $token,)+
                }
            }

            /// Human-readable release string, e.g. `1.12.2`.
            pub fn release(self) -> &'static str {
                match self {
                    Self::Unknown => "unknown",
                    $(Self::$variant => $release,)+
                }
            }

            /// Wire protocol number the client sends in its handshake.
            pub fn protocol_id(self) -> Option<u32> {
                match self {
                    Self::Unknown => None,
                    $(Self::$variant => Some($protocol),)+
                }
            }
        }
    };
}

protocol_versions! {
    V1_4_7 => ("MINECRAFT_1_4_7", "1.4.7", 51),
    V1_5_1 => ("MINECRAFT_1_5_1", "1.5.1", 60),
    V1_5_2 => ("MINECRAFT_1_5_2", "1.5.2", 61),
    V1_6_1 => ("MINECRAFT_1_6_1", "1.6.1", 73),
    V1_6_2 => ("MINECRAFT_1_6_2", "1.6.2", 74),
    V1_6_4 => ("MINECRAFT_1_6_4", "1.6.4", 78),
    V1_7_5 => ("MINECRAFT_1_7_5", "1.7.5", 4),
    V1_7_10 => ("MINECRAFT_1_7_10", "1.7.10", 5),
    V1_8 => ("MINECRAFT_1_8", "1.8", 47),
    V1_9 => ("MINECRAFT_1_9", "1.9", 107),
    V1_9_1 => ("MINECRAFT_1_9_1", "1.9.1", 108),
    V1_9_2 => ("MINECRAFT_1_9_2", "1.9.2", 109),
    V1_9_4 => ("MINECRAFT_1_9_4", "1.9.4", 110),
    V1_10 => ("MINECRAFT_1_10", "1.10", 210),
    V1_11 => ("MINECRAFT_1_11", "1.11", 315),
    V1_11_1 => ("MINECRAFT_1_11_1", "1.11.1", 316),
    V1_12 => ("MINECRAFT_1_12", "1.12", 335),
    V1_12_1 => ("MINECRAFT_1_12_1", "1.12.1", 338),
    V1_12_2 => ("MINECRAFT_1_12_2", "1.12.2", 340),
    V1_13 => ("MINECRAFT_1_13", "1.13", 393),
    V1_13_1 => ("MINECRAFT_1_13_1", "1.13.1", 401),
    V1_13_2 => ("MINECRAFT_1_13_2", "1.13.2", 404),
    V1_14 => ("MINECRAFT_1_14", "1.14", 477),
    V1_14_1 => ("MINECRAFT_1_14_1", "1.14.1", 480),
    V1_14_2 => ("MINECRAFT_1_14_2", "1.14.2", 485),
    V1_14_3 => ("MINECRAFT_1_14_3", "1.14.3", 490),
    V1_14_4 => ("MINECRAFT_1_14_4", "1.14.4", 498),
}

impl ProtocolVersion {
    /// Resolve a canonical token or dotted release string.
    ///
    /// Returns `None` for empty or unknown input. Never returns
    /// [`ProtocolVersion::Unknown`].
    pub fn resolve(input: &str) -> Option<Self> {
        if input.is_empty() {
            return None;
        }

        Self::from_token(input).or_else(|| {
            let constructed = format!("{}{}", TOKEN_PREFIX, input.replace('.', "_"));
            Self::from_token(&constructed)
        })
    }

    /// Resolve, falling back to the [`ProtocolVersion::Unknown`] sentinel.
    pub fn resolve_or_unknown(input: &str) -> Self {
        Self::resolve(input).unwrap_or(Self::Unknown)
    }

    /// Look up a release by the protocol number sent on the wire.
    pub fn from_protocol_id(protocol_id: u32) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.protocol_id() == Some(protocol_id))
    }

    /// Position in the release sequence (0 = oldest). `None` for the sentinel.
    pub fn ordinal(self) -> Option<usize> {
        match self {
            Self::Unknown => None,
            // Unknown is discriminant 0; releases follow contiguously.
            known => Some(known as usize - 1),
        }
    }

    /// Whether this is a real release rather than the sentinel.
    pub fn is_known(self) -> bool {
        self != Self::Unknown
    }

    /// All releases between two bounds, inclusive, oldest first.
    ///
    /// Bound order does not matter. Empty only when a bound is the sentinel.
    pub fn between(a: Self, b: Self) -> Vec<Self> {
        match (a.ordinal(), b.ordinal()) {
            (Some(x), Some(y)) => {
                let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
                Self::ALL[lo..=hi].to_vec()
            }
            _ => Vec::new(),
        }
    }

    /// Newest supported release.
    pub fn latest() -> Self {
        Self::V1_14_4
    }

    fn from_token(token: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.token() == token)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.release())
    }
}

impl FromStr for ProtocolVersion {
    type Err = UnresolvableVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| UnresolvableVersion(s.to_string()))
    }
}
