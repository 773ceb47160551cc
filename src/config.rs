//! Injector configuration.
//!
//! Configuration is fixed when the root injector is created and shared by
//! every child scope below it. Values come from code, from the environment
//! (`InjectorConfig::from_env`), or, with the `serde` feature, from any serde
//! source.

use std::env;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// Environment variable overriding [`InjectorConfig::max_depth`].
pub const ENV_MAX_DEPTH: &str = "SCOPED_DI_MAX_DEPTH";
/// Environment variable overriding [`InjectorConfig::reject_late_registration`].
pub const ENV_REJECT_LATE_REGISTRATION: &str = "SCOPED_DI_REJECT_LATE_REGISTRATION";
/// Environment variable overriding [`InjectorConfig::warn_on_undisposed_drop`].
pub const ENV_WARN_UNDISPOSED: &str = "SCOPED_DI_WARN_UNDISPOSED";

const DEFAULT_MAX_DEPTH: usize = 1024;

/// Settings shared by an injector hierarchy.
///
/// # Examples
///
/// ```
/// use scoped_di::{InjectorConfig, Injector, Providers};
///
/// let config = InjectorConfig {
///     max_depth: 64,
///     ..InjectorConfig::default()
/// };
///
/// let root = Injector::root_with_config(Providers::new(), config);
/// let child = root.create_child(Providers::new()).unwrap();
/// assert_eq!(child.config().max_depth, 64);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InjectorConfig {
    /// Deepest dependency chain a single resolution may follow
    pub max_depth: usize,
    /// Refuse to register a token whose instance the scope already cached
    pub reject_late_registration: bool,
    /// Log a warning when a scope holding teardown hooks is dropped without `destroy`
    pub warn_on_undisposed_drop: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            reject_late_registration: true,
            warn_on_undisposed_drop: true,
        }
    }
}

impl InjectorConfig {
    /// Defaults overridden by the `SCOPED_DI_*` environment variables.
    ///
    /// Unset variables keep their defaults; a set but unparsable value is an
    /// error rather than silently ignored.
    pub fn from_env() -> DiResult<Self> {
        let mut config = Self::default();
        if let Some(depth) = read_env::<usize>(ENV_MAX_DEPTH)? {
            config.max_depth = depth;
        }
        if let Some(reject) = read_env_flag(ENV_REJECT_LATE_REGISTRATION)? {
            config.reject_late_registration = reject;
        }
        if let Some(warn) = read_env_flag(ENV_WARN_UNDISPOSED)? {
            config.warn_on_undisposed_drop = warn;
        }
        Ok(config)
    }
}

fn read_env<T: FromStr>(key: &str) -> DiResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().map(Some).map_err(|_| DiError::Config {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(None),
    }
}

fn read_env_flag(key: &str) -> DiResult<Option<bool>> {
    let Ok(raw) = env::var(key) else {
        return Ok(None);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(Some(true)),
        "0" | "false" | "no" | "off" => Ok(Some(false)),
        _ => Err(DiError::Config {
            key: key.to_string(),
            value: raw,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [ENV_MAX_DEPTH, ENV_REJECT_LATE_REGISTRATION, ENV_WARN_UNDISPOSED] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn from_env_without_overrides_is_default() {
        clear_env();
        assert_eq!(InjectorConfig::from_env().unwrap(), InjectorConfig::default());
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        clear_env();
        env::set_var(ENV_MAX_DEPTH, "32");
        env::set_var(ENV_REJECT_LATE_REGISTRATION, "off");
        env::set_var(ENV_WARN_UNDISPOSED, "No");

        let config = InjectorConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.max_depth, 32);
        assert!(!config.reject_late_registration);
        assert!(!config.warn_on_undisposed_drop);
    }

    #[test]
    #[serial]
    fn from_env_rejects_garbage() {
        clear_env();
        env::set_var(ENV_MAX_DEPTH, "deep");

        let err = InjectorConfig::from_env().unwrap_err();
        clear_env();

        assert_eq!(
            err,
            DiError::Config {
                key: ENV_MAX_DEPTH.to_string(),
                value: "deep".to_string()
            }
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn missing_fields_take_defaults() {
        let config: InjectorConfig = serde_json::from_str(r#"{ "max_depth": 8 }"#).unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.reject_late_registration);
    }
}
