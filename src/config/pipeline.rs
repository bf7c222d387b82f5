//! Reload pipeline: raw values → validated snapshot parts.
//!
//! Every step accumulates into locals. The first failure returns early, so
//! no partial result ever reaches the store.

use crate::policy::snapshot::{Recommendation, SnapshotParts, VersionRange};
use crate::types::{ProtocolVersion, VersionSet};

use super::color::translate_color_codes;
use super::error::{
    ConfigError, KEY_BLACKLIST_MESSAGE, KEY_BYPASS_MESSAGE, KEY_RECOMMEND_MESSAGE,
    KEY_WHITELIST_END, KEY_WHITELIST_MESSAGE, KEY_WHITELIST_START,
};
use super::raw::RawConfig;

fn resolve_bound(field: &'static str, value: Option<&str>) -> Result<ProtocolVersion, ConfigError> {
    value
        .and_then(ProtocolVersion::resolve)
        .ok_or_else(|| ConfigError::InvalidRangeBound {
            field,
            value: value.unwrap_or("null").to_string(),
        })
}

fn require_message(key: &'static str, value: Option<&str>) -> Result<String, ConfigError> {
    value
        .map(translate_color_codes)
        .ok_or(ConfigError::MissingMessage { key })
}

/// Validate a raw config.
pub(crate) fn build_parts(raw: &RawConfig) -> Result<SnapshotParts, ConfigError> {
    let mut whitelist = VersionSet::new();
    let mut blacklist = VersionSet::new();

    // Range selector
    let whitelist_range = if raw.whitelist.enable_start_end {
        let start = resolve_bound(KEY_WHITELIST_START, raw.whitelist.start.as_deref())?;
        let end = resolve_bound(KEY_WHITELIST_END, raw.whitelist.end.as_deref())?;
        let range = VersionRange { start, end };

        let between = range.versions();
        if between.is_empty() {
            return Err(ConfigError::EmptyRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        whitelist.extend(between);

        Some(range)
    } else {
        None
    };

    for entry in &raw.whitelist.allow_versions {
        let version = ProtocolVersion::resolve(entry)
            .ok_or_else(|| ConfigError::InvalidWhitelistEntry { entry: entry.clone() })?;
        whitelist.insert(version);
    }

    for entry in &raw.blacklist {
        let version = ProtocolVersion::resolve(entry)
            .ok_or_else(|| ConfigError::InvalidBlacklistEntry { entry: entry.clone() })?;
        blacklist.insert(version);
    }

    let whitelist_message = require_message(KEY_WHITELIST_MESSAGE, raw.whitelist_message.as_deref())?;
    let blacklist_message = require_message(KEY_BLACKLIST_MESSAGE, raw.blacklist_message.as_deref())?;
    let bypass_message = require_message(KEY_BYPASS_MESSAGE, raw.bypass_message.as_deref())?;

    let recommended = match raw.recommended_version.as_deref() {
        Some(value) => {
            let version = ProtocolVersion::resolve(value).ok_or_else(|| {
                ConfigError::InvalidRecommendedVersion { value: value.to_string() }
            })?;
            let message = require_message(KEY_RECOMMEND_MESSAGE, raw.recommend_message.as_deref())?;
            Some(Recommendation { version, message })
        }
        None => None,
    };

    Ok(SnapshotParts {
        whitelist_range,
        whitelist,
        blacklist,
        whitelist_message,
        blacklist_message,
        bypass_message,
        recommended,
        reminder_interval_seconds: raw.repeat_bypass_message,
    })
}
