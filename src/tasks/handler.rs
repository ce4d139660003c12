// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::errors::TaskError;

/// The work behind a background task kind.
#[async_trait]
pub trait TaskHandler: Send + Sync + 'static {
    async fn handle(&self, payload: Value) -> Result<Value, TaskError>;
}

/// Handler backed by an async closure.
pub struct FnTask<F> {
    f: F,
}

/// Wraps an async function as a [`TaskHandler`].
pub fn task_fn<F, Fut>(f: F) -> FnTask<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TaskError>> + Send + 'static,
{
    FnTask { f }
}

#[async_trait]
impl<F, Fut> TaskHandler for FnTask<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TaskError>> + Send + 'static,
{
    async fn handle(&self, payload: Value) -> Result<Value, TaskError> {
        (self.f)(payload).await
    }
}

/// Handler backed by a blocking function, run on the blocking thread pool.
pub struct BlockingTask<F> {
    f: Arc<F>,
}

/// Wraps a blocking function (file parsing, a headless browser call) as a [`TaskHandler`].
pub fn blocking_task_fn<F>(f: F) -> BlockingTask<F>
where
    F: Fn(Value) -> Result<Value, TaskError> + Send + Sync + 'static,
{
    BlockingTask { f: Arc::new(f) }
}

#[async_trait]
impl<F> TaskHandler for BlockingTask<F>
where
    F: Fn(Value) -> Result<Value, TaskError> + Send + Sync + 'static,
{
    async fn handle(&self, payload: Value) -> Result<Value, TaskError> {
        let f = Arc::clone(&self.f);
        tokio::task::spawn_blocking(move || f(payload))
            .await
            .map_err(|e| TaskError::HandlerFailed(format!("blocking worker failed: {}", e)))?
    }
}
