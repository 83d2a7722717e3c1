//! Runtime configuration flags.
//!
//! Flags are named strings read at call time. The service never caches a flag
//! value, so changing a flag takes effect on the next request.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::constants::DEFAULT_FLAG_ENV_PREFIX;

/// Source of named string flags.
pub trait FlagProvider: Send + Sync {
    /// Returns the flag's value, or `default` if the flag is not set.
    fn get_flag(&self, name: &str, default: &str) -> String;
}

/// Flags held in memory, optionally layered over a fallback provider.
///
/// Values set here win; names not set here are looked up in the fallback.
#[derive(Clone, Default)]
pub struct StaticFlags {
    values: Arc<RwLock<HashMap<String, String>>>,
    fallback: Option<Arc<dyn FlagProvider>>,
}

impl StaticFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consult `fallback` for names this provider does not hold.
    pub fn with_fallback(mut self, fallback: Arc<dyn FlagProvider>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Sets a flag, replacing any previous value.
    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(name.into(), value.into());
    }

    /// Removes a flag, so lookups fall through to the fallback or default.
    pub fn unset(&self, name: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.remove(name);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for StaticFlags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let flags = StaticFlags::new();
        for (name, value) in iter {
            flags.set(name, value);
        }
        flags
    }
}

impl FlagProvider for StaticFlags {
    fn get_flag(&self, name: &str, default: &str) -> String {
        let value = {
            let values = self.values.read().unwrap_or_else(|e| e.into_inner());
            values.get(name).cloned()
        };
        match (value, &self.fallback) {
            (Some(value), _) => value,
            (None, Some(fallback)) => fallback.get_flag(name, default),
            (None, None) => default.to_string(),
        }
    }
}

/// Flags read from environment variables at call time.
///
/// A flag named `use.rendezvousserver` with prefix `USERINFO` is read from
/// `USERINFO_USE_RENDEZVOUSSERVER`.
#[derive(Debug, Clone)]
pub struct EnvFlags {
    prefix: String,
}

impl EnvFlags {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The environment variable a flag is read from.
    pub fn var_name(&self, name: &str) -> String {
        let suffix: String = name
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();
        format!("{}_{}", self.prefix, suffix)
    }
}

impl Default for EnvFlags {
    fn default() -> Self {
        Self::new(DEFAULT_FLAG_ENV_PREFIX)
    }
}

impl FlagProvider for EnvFlags {
    fn get_flag(&self, name: &str, default: &str) -> String {
        std::env::var(self.var_name(name)).unwrap_or_else(|_| default.to_string())
    }
}
