// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backends::local;
use crate::config::{BackgroundTaskSettings, NodeConfig};
use crate::errors::ValidationError;
use crate::tasks::{BackgroundTaskManager, WaitOptions};
use crate::traits::{Processor, Storage};

/// Shared collaborators handed to every processor constructor.
#[derive(Clone)]
pub struct BuildContext {
    pub tasks: Arc<BackgroundTaskManager>,
    pub storage: Option<Arc<dyn Storage>>,
    /// How processors wait on background results unless their kind overrides the timeout
    pub wait: WaitOptions,
}

impl BuildContext {
    pub fn new(tasks: Arc<BackgroundTaskManager>) -> Self {
        Self {
            tasks,
            storage: None,
            wait: WaitOptions::default(),
        }
    }

    /// A task manager and wait policy both sized by `settings`.
    pub fn from_settings(settings: &BackgroundTaskSettings) -> Self {
        Self::new(Arc::new(BackgroundTaskManager::from_settings(settings)))
            .with_wait(WaitOptions::from(settings))
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::new(Arc::new(BackgroundTaskManager::default()))
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("tasks", &self.tasks)
            .field("has_storage", &self.storage.is_some())
            .field("wait", &self.wait)
            .finish()
    }
}

/// Builds one processor from its node configuration. An `Err` carries the reason the
/// parameters were rejected.
pub type ProcessorConstructor =
    Arc<dyn Fn(&NodeConfig, &BuildContext) -> Result<Box<dyn Processor>, String> + Send + Sync>;

/// Maps `processorType` tags to constructors.
///
/// Populated once at startup; adding a node type never touches the launchers.
#[derive(Clone, Default)]
pub struct ProcessorRegistry {
    constructors: BTreeMap<String, ProcessorConstructor>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in processor type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        local::register_builtins(&mut registry);
        registry
    }

    /// Binds `tag` to `constructor`, replacing an earlier binding.
    pub fn register<F>(&mut self, tag: &str, constructor: F) -> &mut Self
    where
        F: Fn(&NodeConfig, &BuildContext) -> Result<Box<dyn Processor>, String>
            + Send
            + Sync
            + 'static,
    {
        self.constructors
            .insert(tag.to_string(), Arc::new(constructor));
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Instantiates the processor for `config`.
    pub fn create(
        &self,
        config: &NodeConfig,
        ctx: &BuildContext,
    ) -> Result<Box<dyn Processor>, ValidationError> {
        let constructor = self
            .constructors
            .get(&config.processor_type)
            .ok_or_else(|| ValidationError::UnknownProcessorType {
                node: config.name.clone(),
                processor_type: config.processor_type.clone(),
            })?;

        constructor(config, ctx).map_err(|reason| ValidationError::ProcessorCreationFailed {
            node: config.name.clone(),
            reason,
        })
    }
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}
