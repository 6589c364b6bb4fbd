use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use keel_core::KeelError;

/// Set to any value to skip `.env` loading entirely.
pub const DOTENV_DISABLED_VAR: &str = "KEEL_DOTENV_DISABLED";

/// Read-only key/value lookup the resolver pulls secrets from.
pub trait EnvProvider: Send + Sync {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment. Non-UTF-8 values count as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// An in-memory environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    /// Read a `.env` file into a map without touching the process environment.
    pub fn from_dotenv(path: &Path) -> keel_core::Result<Self> {
        let iter = dotenvy::from_path_iter(path)
            .map_err(|e| KeelError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let mut env = Self::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                KeelError::Config(format!("failed to parse {}: {}", path.display(), e))
            })?;
            env.insert(key, value);
        }
        Ok(env)
    }
}

impl EnvProvider for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut env = Self::new();
        for (k, v) in iter {
            env.insert(k, v);
        }
        env
    }
}

/// Populate the process environment from a `.env` file.
///
/// Variables that are already set win over the file. An explicit `path` is
/// always loaded and must exist. Without one, only `.env` in the current
/// directory is considered (parent directories are not searched), a missing
/// file is fine, and [`DOTENV_DISABLED_VAR`] turns the lookup off. Returns
/// the file that was loaded, if any.
pub fn load_dotenv(path: Option<&Path>) -> keel_core::Result<Option<PathBuf>> {
    match path {
        Some(p) => {
            dotenvy::from_path(p).map_err(|e| {
                KeelError::Config(format!("failed to load {}: {}", p.display(), e))
            })?;
            info!(path = %p.display(), "loaded environment file");
            Ok(Some(p.to_path_buf()))
        }
        None => {
            if std::env::var_os(DOTENV_DISABLED_VAR).is_some() {
                debug!("{DOTENV_DISABLED_VAR} set, skipping .env");
                return Ok(None);
            }
            load_dotenv_from_dir(&std::env::current_dir()?)
        }
    }
}

/// Load `<dir>/.env` if it exists.
pub fn load_dotenv_from_dir(dir: &Path) -> keel_core::Result<Option<PathBuf>> {
    let candidate = dir.join(".env");
    match dotenvy::from_path(&candidate) {
        Ok(()) => {
            info!(path = %candidate.display(), "loaded environment file");
            Ok(Some(candidate))
        }
        Err(e) if e.not_found() => {
            debug!(dir = %dir.display(), "no .env file found");
            Ok(None)
        }
        Err(e) => Err(KeelError::Config(format!(
            "failed to load {}: {}",
            candidate.display(),
            e
        ))),
    }
}
