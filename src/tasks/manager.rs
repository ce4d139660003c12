// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::{oneshot, Semaphore};
use tracing::Instrument;

use crate::config::BackgroundTaskSettings;
use crate::errors::TaskError;
use crate::observability::messages::tasks::{
    TaskFailed, TaskKindRegistered, TaskRegistrationRepeated, TaskSubmitted,
};
use crate::observability::messages::StructuredLog;
use crate::tasks::{await_result, TaskHandler, TaskResult, WaitOptions};

struct RegisteredKind {
    handler: Arc<dyn TaskHandler>,
    handler_type: TypeId,
    slots: Arc<Semaphore>,
    max_concurrent: usize,
}

/// Bounded worker pools keyed by task kind.
///
/// Every kind has its own semaphore sized by its `max_concurrent`, so a slow kind cannot
/// starve another. A global semaphore caps the total number of running handlers.
pub struct BackgroundTaskManager {
    kinds: RwLock<HashMap<String, RegisteredKind>>,
    workers: Arc<Semaphore>,
    max_workers: usize,
    closed: AtomicBool,
}

impl BackgroundTaskManager {
    pub const DEFAULT_MAX_WORKERS: usize = 50;

    pub fn new(max_workers: usize) -> Self {
        let max_workers = max_workers.max(1);
        Self {
            kinds: RwLock::new(HashMap::new()),
            workers: Arc::new(Semaphore::new(max_workers)),
            max_workers,
            closed: AtomicBool::new(false),
        }
    }

    pub fn from_settings(settings: &BackgroundTaskSettings) -> Self {
        Self::new(settings.max_workers)
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Binds `kind` to `handler`.
    ///
    /// Registering the same handler type again is a no-op, so every node of one processor
    /// type can register on construction. A different handler type is rejected.
    pub fn register<H: TaskHandler>(
        &self,
        kind: &str,
        handler: H,
        max_concurrent: usize,
    ) -> Result<(), TaskError> {
        let handler_type = TypeId::of::<H>();
        let mut kinds = self.kinds.write().map_err(|_| TaskError::ManagerClosed)?;

        if let Some(existing) = kinds.get(kind) {
            if existing.handler_type == handler_type {
                TaskRegistrationRepeated { kind }.log();
                return Ok(());
            }
            return Err(TaskError::AlreadyRegistered {
                kind: kind.to_string(),
            });
        }

        let max_concurrent = max_concurrent.max(1);
        kinds.insert(
            kind.to_string(),
            RegisteredKind {
                handler: Arc::new(handler),
                handler_type,
                slots: Arc::new(Semaphore::new(max_concurrent)),
                max_concurrent,
            },
        );
        TaskKindRegistered {
            kind,
            max_concurrent,
        }
        .log();
        Ok(())
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.kinds
            .read()
            .map(|k| k.contains_key(kind))
            .unwrap_or(false)
    }

    /// Configured concurrency of `kind`.
    pub fn max_concurrent(&self, kind: &str) -> Option<usize> {
        self.kinds
            .read()
            .ok()
            .and_then(|k| k.get(kind).map(|r| r.max_concurrent))
    }

    /// Free worker slots of `kind`.
    pub fn available_slots(&self, kind: &str) -> Option<usize> {
        self.kinds
            .read()
            .ok()
            .and_then(|k| k.get(kind).map(|r| r.slots.available_permits()))
    }

    /// Hands `payload` to a worker of `kind` and returns the single-use result channel.
    ///
    /// Waits (asynchronously, only this caller) until the kind has a free slot. The slot is
    /// held until the handler returns or panics.
    pub async fn submit(
        &self,
        kind: &str,
        payload: Value,
    ) -> Result<oneshot::Receiver<TaskResult>, TaskError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TaskError::ManagerClosed);
        }

        let (handler, slots) = {
            let kinds = self.kinds.read().map_err(|_| TaskError::ManagerClosed)?;
            let registered = kinds.get(kind).ok_or_else(|| TaskError::UnknownKind {
                kind: kind.to_string(),
            })?;
            (Arc::clone(&registered.handler), Arc::clone(&registered.slots))
        };

        let slot = Arc::clone(&slots)
            .acquire_owned()
            .await
            .map_err(|_| TaskError::ManagerClosed)?;

        let submitted = TaskSubmitted {
            kind,
            available_slots: slots.available_permits(),
        };
        submitted.log();
        let span = submitted.span("background_task");

        let (sender, receiver) = oneshot::channel();
        let workers = Arc::clone(&self.workers);
        let kind = kind.to_string();

        tokio::spawn(async move {
            let _slot = slot;
            let _worker = match workers.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    let _ = sender.send(Err(TaskError::ManagerClosed));
                    return;
                }
            };

            let result = handler.handle(payload).instrument(span).await;
            if let Err(e) = &result {
                TaskFailed { kind: &kind, error: e }.log();
            }
            // The caller may have stopped waiting.
            let _ = sender.send(result);
        });

        Ok(receiver)
    }

    /// `submit` followed by [`await_result`].
    pub async fn run(&self, kind: &str, payload: Value, options: WaitOptions) -> TaskResult {
        let receiver = self.submit(kind, payload).await?;
        await_result(receiver, options).await
    }

    /// Rejects further submissions; running handlers finish.
    pub fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        if let Ok(kinds) = self.kinds.read() {
            for registered in kinds.values() {
                registered.slots.close();
            }
        }
    }
}

impl Default for BackgroundTaskManager {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_WORKERS)
    }
}

impl std::fmt::Debug for BackgroundTaskManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kinds: Vec<String> = self
            .kinds
            .read()
            .map(|k| k.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("BackgroundTaskManager")
            .field("kinds", &kinds)
            .field("max_workers", &self.max_workers)
            .finish()
    }
}
