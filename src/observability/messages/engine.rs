// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for launcher lifecycle and execution events.
//!
//! This module contains message types for logging events related to:
//! * Launch start, completion and failure
//! * Cancellation of a running graph
//! * Node dispatch and cached-node reuse

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Launch started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_flowgraph::observability::messages::engine::LaunchStarted;
///
/// let msg = LaunchStarted {
///     strategy: "concurrent",
///     node_count: 5,
///     pool_size: 25,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct LaunchStarted<'a> {
    pub strategy: &'a str,
    pub node_count: usize,
    pub pool_size: usize,
}

impl Display for LaunchStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting graph launch with {} strategy: {} nodes, pool_size={}",
            self.strategy, self.node_count, self.pool_size
        )
    }
}

impl StructuredLog for LaunchStarted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            node_count = self.node_count,
            pool_size = self.pool_size,
            "{}", self
        );
    }
}

/// Launch completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct LaunchCompleted<'a> {
    pub strategy: &'a str,
    pub completed: usize,
    pub skipped_cached: usize,
    pub duration: Duration,
}

impl Display for LaunchCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph launch completed with {} strategy: {} nodes executed, {} reused from cache in {:?}",
            self.strategy, self.completed, self.skipped_cached, self.duration
        )
    }
}

impl StructuredLog for LaunchCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            strategy = self.strategy,
            completed = self.completed,
            skipped_cached = self.skipped_cached,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Launch failed with error.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_flowgraph::observability::messages::engine::LaunchFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = LaunchFailed {
///     strategy: "concurrent",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct LaunchFailed<'a> {
    pub strategy: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for LaunchFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph launch failed with {} strategy: {}",
            self.strategy, self.error
        )
    }
}

impl StructuredLog for LaunchFailed<'_> {
    fn log(&self) {
        tracing::error!(
            strategy = self.strategy,
            error = %self.error,
            "{}", self
        );
    }
}

/// Launch stopped through its cancellation token.
///
/// # Log Level
/// `warn!` - Run ended early on request
pub struct LaunchCancelled<'a> {
    pub strategy: &'a str,
    pub completed: usize,
    pub running: usize,
    pub duration: Duration,
}

impl Display for LaunchCancelled<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph launch cancelled ({} strategy) after {:?}: {} nodes completed, {} running nodes asked to cancel",
            self.strategy, self.duration, self.completed, self.running
        )
    }
}

impl StructuredLog for LaunchCancelled<'_> {
    fn log(&self) {
        tracing::warn!(
            strategy = self.strategy,
            completed = self.completed,
            running = self.running,
            duration = ?self.duration,
            "{}", self
        );
    }
}

/// A runnable node was handed to the worker pool.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct NodeDispatched<'a> {
    pub node: &'a str,
    pub processor_type: &'a str,
    pub pending: usize,
}

impl Display for NodeDispatched<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatching node '{}' ({}), {} nodes not yet completed",
            self.node, self.processor_type, self.pending
        )
    }
}

impl StructuredLog for NodeDispatched<'_> {
    fn log(&self) {
        tracing::debug!(
            node = self.node,
            processor_type = self.processor_type,
            pending = self.pending,
            "{}", self
        );
    }
}

/// A node already carried an output and was not executed.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct CachedNodeReused<'a> {
    pub node: &'a str,
}

impl Display for CachedNodeReused<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Reusing cached output of node '{}'", self.node)
    }
}

impl StructuredLog for CachedNodeReused<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, "{}", self);
    }
}
