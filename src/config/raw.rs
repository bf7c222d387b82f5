//! Raw configuration values as handed over by the host.
//!
//! Keys mirror the plugin config file:
//!
//! ```json
//! {
//!   "whitelist": {
//!     "enableStartEnd": true,
//!     "start": "1.8",
//!     "end": "1.14.4",
//!     "allowVersions": []
//!   },
//!   "blacklist": ["1.7.5"],
//!   "whitelistMessage": "&cUnsupported version",
//!   "blacklistMessage": "&cBlocked version",
//!   "bypassMessage": "&ePlease update",
//!   "repeatBypassMessage": 600
//! }
//! ```
//!
//! Missing booleans read as `false`, missing lists as empty, missing strings
//! as `None`. Validation happens in the reload pipeline, not here.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ConfigError;

/// Interval used when `repeatBypassMessage` is absent.
pub const DEFAULT_REPEAT_BYPASS_MESSAGE: i64 = 600;

fn default_repeat_bypass_message() -> i64 {
    DEFAULT_REPEAT_BYPASS_MESSAGE
}

/// The `whitelist` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawWhitelist {
    /// Enable the start/end range selector.
    pub enable_start_end: bool,
    /// Range start (any spelling).
    pub start: Option<String>,
    /// Range end (any spelling).
    pub end: Option<String>,
    /// Individually allowed versions.
    pub allow_versions: Vec<String>,
}

/// Unvalidated configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConfig {
    /// Whitelist section.
    #[serde(default)]
    pub whitelist: RawWhitelist,
    /// Denied versions. Overrides the whitelist.
    #[serde(default)]
    pub blacklist: Vec<String>,
    /// Kick message for non-whitelisted versions.
    #[serde(default)]
    pub whitelist_message: Option<String>,
    /// Kick message for blacklisted versions.
    #[serde(default)]
    pub blacklist_message: Option<String>,
    /// Reminder sent to bypassing players.
    #[serde(default)]
    pub bypass_message: Option<String>,
    /// Reminder period in seconds. `0` sends once, negative disables.
    #[serde(default = "default_repeat_bypass_message")]
    pub repeat_bypass_message: i64,
    /// Version players are nudged towards after joining.
    #[serde(default)]
    pub recommended_version: Option<String>,
    /// Message sent to players not on the recommended version.
    #[serde(default)]
    pub recommend_message: Option<String>,
}

impl Default for RawConfig {
    fn default() -> Self {
        Self {
            whitelist: RawWhitelist::default(),
            blacklist: Vec::new(),
            whitelist_message: None,
            blacklist_message: None,
            bypass_message: None,
            repeat_bypass_message: DEFAULT_REPEAT_BYPASS_MESSAGE,
            recommended_version: None,
            recommend_message: None,
        }
    }
}

impl RawConfig {
    /// The configuration shipped with a fresh install.
    pub fn stock() -> Self {
        Self {
            whitelist: RawWhitelist {
                enable_start_end: true,
                start: Some("1.8".to_string()),
                end: Some("1.14.4".to_string()),
                allow_versions: Vec::new(),
            },
            blacklist: Vec::new(),
            whitelist_message: Some(
                "&cYour Minecraft version is not supported.\n&7Please use 1.8 - 1.14.4".to_string(),
            ),
            blacklist_message: Some(
                "&cYour Minecraft version is blocked on this server.".to_string(),
            ),
            bypass_message: Some(
                "&eYou are using an unsupported version. &7Please switch to a supported one.".to_string(),
            ),
            repeat_bypass_message: DEFAULT_REPEAT_BYPASS_MESSAGE,
            recommended_version: None,
            recommend_message: None,
        }
    }

    /// Parse from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "whitelist": {
                "enableStartEnd": true,
                "start": "1.8",
                "end": "1.12.2",
                "allowVersions": ["1.14.4"]
            },
            "blacklist": ["1.7.5"],
            "whitelistMessage": "w",
            "blacklistMessage": "b",
            "bypassMessage": "p",
            "repeatBypassMessage": -1
        }"#;

        let raw = RawConfig::from_json_str(json).unwrap();
        assert!(raw.whitelist.enable_start_end);
        assert_eq!(raw.whitelist.start.as_deref(), Some("1.8"));
        assert_eq!(raw.whitelist.allow_versions, vec!["1.14.4"]);
        assert_eq!(raw.blacklist, vec!["1.7.5"]);
        assert_eq!(raw.repeat_bypass_message, -1);
        assert_eq!(raw.recommended_version, None);
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let raw = RawConfig::from_json_str("{}").unwrap();
        assert_eq!(raw, RawConfig::default());
        assert_eq!(raw.repeat_bypass_message, 600);
        assert!(!raw.whitelist.enable_start_end);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = RawConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = RawConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
