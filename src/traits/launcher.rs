// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::ExecutionError;
use crate::graph::ProcessorGraph;

/// What a finished run looked like.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LaunchSummary {
    /// Nodes executed by this run, in completion order
    pub completed: Vec<String>,
    /// Nodes that already carried an output and were not executed
    pub skipped_cached: Vec<String>,
    pub duration: Duration,
}

#[async_trait]
pub trait Launcher: Send + Sync {
    /// Run every node of a linked graph to completion or first failure.
    ///
    /// - `graph`: nodes wired by the linker
    /// - `cancel`: cancelling stops dispatch and calls `Processor::cancel` on running nodes
    ///
    /// Returns:
    /// - Ok(LaunchSummary): every node completed
    /// - Err(ExecutionError): the first node failure, or cancellation
    async fn launch(
        &self,
        graph: &ProcessorGraph,
        cancel: CancellationToken,
    ) -> Result<LaunchSummary, ExecutionError>;

    /// Run the unfinished ancestors of `target` plus `target` itself.
    ///
    /// Returns as soon as `target` completes, even if sibling branches are still unfinished.
    async fn launch_single(
        &self,
        graph: &ProcessorGraph,
        target: &str,
        cancel: CancellationToken,
    ) -> Result<LaunchSummary, ExecutionError>;

    fn strategy(&self) -> &'static str;
}
