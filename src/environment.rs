//! Environment staging of connection keys.
//!
//! Tools built around Corporate Memory read their connection settings from
//! environment variables. Staging writes the allow-listed keys of a
//! [`CmemConfig`] into an [`Environment`], clearing every allow-listed key the
//! config does not set and leaving all other variables alone.

use std::collections::HashMap;
use std::sync::OnceLock;

use tokio::sync::Mutex;
use tracing::info;

use crate::config::{CmemConfig, ConfigKey};

/// A mutable set of environment variables.
pub trait Environment {
    /// Returns the value of a variable.
    fn get(&self, key: &str) -> Option<String>;

    /// Sets a variable, overwriting any prior value.
    fn set(&mut self, key: &str, value: &str);

    /// Removes a variable.
    fn remove(&mut self, key: &str);
}

/// The environment of the current process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        std::env::set_var(key, value);
    }

    fn remove(&mut self, key: &str) {
        std::env::remove_var(key);
    }
}

/// An in-memory environment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryEnvironment {
    vars: HashMap<String, String>,
}

impl MemoryEnvironment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the variable is set.
    pub fn contains(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    /// Iterates over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for MemoryEnvironment
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Environment for MemoryEnvironment {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

/// Stages the allow-listed keys of `config` into `env`.
///
/// Keys without a value, or with an empty one, are removed. Returns the keys
/// that were set.
pub fn stage(config: &CmemConfig, env: &mut dyn Environment) -> Vec<ConfigKey> {
    let mut staged = Vec::new();
    for key in ConfigKey::ALL {
        env.remove(key.as_str());
        let Some(value) = config.get(key).filter(|value| !value.is_empty()) else {
            continue;
        };
        env.set(key.as_str(), value);
        if key.is_secret() {
            info!("{} set by config", key);
        } else {
            info!("{} set by config to {}", key, value);
        }
        staged.push(key);
    }
    staged
}

/// Lock serializing process environment staging with the client call that
/// depends on it.
pub fn staging_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

/// Renders the allow-listed keys of `config` as POSIX shell `export` lines.
///
/// Secret values are included only if `include_secrets` is set.
pub fn export_lines(config: &CmemConfig, include_secrets: bool) -> Vec<String> {
    config
        .iter()
        .filter(|(key, _)| include_secrets || !key.is_secret())
        .map(|(key, value)| format!("export {}='{}'", key, value.replace('\'', r"'\''")))
        .collect()
}
