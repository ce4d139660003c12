// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::config::consts::*;
use crate::config::{validate_flow, NodeConfig};
use crate::errors::{ConfigError, ValidationError};

/// Process-level settings for running flows.
///
/// Every section is optional; missing values fall back to the defaults in
/// [`crate::config::consts`].
///
/// # Example
/// ```yaml
/// strategy: concurrent
/// executor_options:
///   pool_size: 25
///   tick_interval_ms: 100
/// background_tasks:
///   max_workers: 50
///   default_timeout_seconds: 120
///   initial_backoff_ms: 100
///   max_backoff_ms: 5000
///   backoff_multiplier: 1.5
/// storage:
///   local_dir: local_storage
///   base_url: http://localhost:5000/files
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LauncherSettings {
    pub strategy: Strategy,
    pub executor_options: ExecutorOptions,
    pub background_tasks: BackgroundTaskSettings,
    pub storage: StorageSettings,
}

/// How a launcher walks the graph.
///
/// # Variants
/// * `Concurrent` - independent branches run in parallel on a bounded worker pool
/// * `Sequential` - one node at a time in topological order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Concurrent,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    pub pool_size: usize,
    pub tick_interval_ms: u64,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl ExecutorOptions {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BackgroundTaskSettings {
    pub max_workers: usize,
    pub default_timeout_seconds: u64,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for BackgroundTaskSettings {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_BACKGROUND_MAX_WORKERS,
            default_timeout_seconds: DEFAULT_TASK_TIMEOUT_SECONDS,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
            max_backoff_ms: DEFAULT_MAX_BACKOFF_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub local_dir: PathBuf,
    pub base_url: Option<String>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            local_dir: PathBuf::from(DEFAULT_LOCAL_STORAGE_DIR),
            base_url: None,
        }
    }
}

impl LauncherSettings {
    /// Applies `FLOWGRAPH_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_POOL_SIZE) {
            self.executor_options.pool_size = parse_env(ENV_POOL_SIZE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TICK_INTERVAL_MS) {
            self.executor_options.tick_interval_ms = parse_env(ENV_TICK_INTERVAL_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BACKGROUND_MAX_WORKERS) {
            self.background_tasks.max_workers = parse_env(ENV_BACKGROUND_MAX_WORKERS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_LOCAL_STORAGE_DIR) {
            self.storage.local_dir = PathBuf::from(raw);
        }
        Ok(())
    }

    /// Checks value ranges, reporting every problem found.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.executor_options.pool_size == 0 {
            errors.push(invalid("executor_options.pool_size must be at least 1"));
        }
        if self.executor_options.tick_interval_ms == 0 {
            errors.push(invalid("executor_options.tick_interval_ms must be at least 1"));
        }
        if self.background_tasks.max_workers == 0 {
            errors.push(invalid("background_tasks.max_workers must be at least 1"));
        }
        let multiplier = self.background_tasks.backoff_multiplier;
        if multiplier.is_nan() || multiplier < 1.0 {
            errors.push(invalid("background_tasks.backoff_multiplier must be >= 1.0"));
        }
        if self.background_tasks.initial_backoff_ms == 0 {
            errors.push(invalid("background_tasks.initial_backoff_ms must be at least 1"));
        }
        if self.background_tasks.initial_backoff_ms > self.background_tasks.max_backoff_ms {
            errors.push(invalid(
                "background_tasks.initial_backoff_ms must not exceed max_backoff_ms",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn invalid(message: &str) -> ValidationError {
    ValidationError::InvalidSettings(message.to_string())
}

fn parse_env<T: FromStr>(name: &str, raw: &str) -> Result<T, ValidationError> {
    raw.trim().parse().map_err(|_| {
        ValidationError::InvalidSettings(format!("{} has an invalid value '{}'", name, raw))
    })
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Parses settings YAML, applies overrides from `lookup` and validates the result.
pub fn parse_settings<F>(yaml: &str, lookup: F) -> Result<LauncherSettings, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings: LauncherSettings = if yaml.trim().is_empty() {
        LauncherSettings::default()
    } else {
        serde_yaml::from_str(yaml)?
    };
    settings
        .apply_env_overrides(lookup)
        .map_err(|e| ConfigError::Invalid(vec![e]))?;
    settings.validate()?;
    Ok(settings)
}

/// Load launcher settings from a YAML file, with environment overrides applied.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<LauncherSettings, ConfigError> {
    let content = read(path.as_ref())?;
    parse_settings(&content, |name| std::env::var(name).ok())
}

/// Parse a flow description (JSON array of nodes).
pub fn parse_flow(json: &str) -> Result<Vec<NodeConfig>, ConfigError> {
    Ok(serde_json::from_str(json)?)
}

/// Load a flow description from a JSON file.
pub fn load_flow<P: AsRef<Path>>(path: P) -> Result<Vec<NodeConfig>, ConfigError> {
    parse_flow(&read(path.as_ref())?)
}

/// Load a flow description and validate its structure.
///
/// Duplicate names, dangling inputs and cycles are all reported before any
/// processor is constructed.
pub fn load_and_validate_flow<P: AsRef<Path>>(path: P) -> Result<Vec<NodeConfig>, ConfigError> {
    let flow = load_flow(path)?;
    validate_flow(&flow)?;
    Ok(flow)
}
