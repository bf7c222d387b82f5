//! Configuration: raw values, validation, and message formatting.

pub mod color;
pub mod error;
pub mod raw;
mod pipeline;

pub use color::{strip_color_codes, translate_color_codes, ALT_COLOR_MARKER, COLOR_CHAR};
pub use error::ConfigError;
pub use raw::{RawConfig, RawWhitelist, DEFAULT_REPEAT_BYPASS_MESSAGE};

pub(crate) use pipeline::build_parts;
