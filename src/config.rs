//! Process-wide configuration.
//!
//! Read once from the environment and cached for the life of the process.

use crate::DType;
use std::sync::OnceLock;

/// Environment variable consulted for [`Config::enable_x64`].
pub const ENABLE_X64_ENV: &str = "MINIJAX_ENABLE_X64";

/// Global configuration values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// When set, Rust floats and integers convert to 64-bit dtypes;
    /// otherwise to their 32-bit counterparts.
    pub enable_x64: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self { enable_x64: true }
    }
}

impl Config {
    /// Build a configuration from the process environment.
    ///
    /// `MINIJAX_ENABLE_X64=0` (or `false`, `off`, `no`) disables x64; any
    /// other value, or none, leaves the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(value) = std::env::var(ENABLE_X64_ENV) {
            config.enable_x64 = parse_flag(&value).unwrap_or(config.enable_x64);
        }
        config
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

/// The active configuration, initialised from the environment on first use.
pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config = Config::from_env();
        log::debug!("minijax config: {:?}", config);
        config
    })
}

/// Install a configuration before anything has read it.
///
/// Returns the rejected configuration if one was already in effect.
pub fn init(config: Config) -> Result<(), Config> {
    CONFIG.set(config)
}

/// Dtype that Rust floats convert to.
pub fn float_dtype() -> DType {
    if config().enable_x64 {
        DType::Float64
    } else {
        DType::Float32
    }
}

/// Dtype that Rust integers convert to.
pub fn int_dtype() -> DType {
    if config().enable_x64 {
        DType::Int64
    } else {
        DType::Int32
    }
}
