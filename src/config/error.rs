//! Configuration errors.

use std::path::PathBuf;

/// Config key of the whitelist range start.
pub const KEY_WHITELIST_START: &str = "whitelist.start";
/// Config key of the whitelist range end.
pub const KEY_WHITELIST_END: &str = "whitelist.end";
/// Config key of the whitelist deny message.
pub const KEY_WHITELIST_MESSAGE: &str = "whitelistMessage";
/// Config key of the blacklist deny message.
pub const KEY_BLACKLIST_MESSAGE: &str = "blacklistMessage";
/// Config key of the bypass reminder message.
pub const KEY_BYPASS_MESSAGE: &str = "bypassMessage";
/// Config key of the recommendation message.
pub const KEY_RECOMMEND_MESSAGE: &str = "recommendMessage";

/// Error raised while building a policy snapshot.
///
/// Every variant aborts the reload; the previously published snapshot stays live.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A range bound did not resolve to a known version.
    #[error("is the {field} version valid? '{value}' is given")]
    InvalidRangeBound {
        /// `whitelist.start` or `whitelist.end`.
        field: &'static str,
        /// The raw value, or `null` when absent.
        value: String,
    },

    /// The range between two bounds enumerated no versions.
    #[error("could not load whitelisted versions between {start} and {end}")]
    EmptyRange {
        /// Resolved start bound.
        start: String,
        /// Resolved end bound.
        end: String,
    },

    /// An explicit whitelist entry did not resolve.
    #[error("is whitelist.allowVersions valid? could not understand '{entry}'")]
    InvalidWhitelistEntry {
        /// The offending entry.
        entry: String,
    },

    /// A blacklist entry did not resolve.
    #[error("is blacklist valid? could not understand '{entry}'")]
    InvalidBlacklistEntry {
        /// The offending entry.
        entry: String,
    },

    /// A required message template is absent.
    #[error("{key} must not be null")]
    MissingMessage {
        /// The missing key.
        key: &'static str,
    },

    /// The recommended version did not resolve.
    #[error("is recommendedVersion valid? could not understand '{value}'")]
    InvalidRecommendedVersion {
        /// The offending value.
        value: String,
    },

    /// The config document is not valid JSON for `RawConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// The config key this error is about, when it names one.
    pub fn key(&self) -> Option<&'static str> {
        match self {
            ConfigError::InvalidRangeBound { field, .. } => Some(*field),
            ConfigError::EmptyRange { .. } => Some("whitelist.enableStartEnd"),
            ConfigError::InvalidWhitelistEntry { .. } => Some("whitelist.allowVersions"),
            ConfigError::InvalidBlacklistEntry { .. } => Some("blacklist"),
            ConfigError::MissingMessage { key } => Some(*key),
            ConfigError::InvalidRecommendedVersion { .. } => Some("recommendedVersion"),
            ConfigError::Parse(_) | ConfigError::Io { .. } => None,
        }
    }
}
