// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the background task subsystem.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// A task kind was bound to a handler.
///
/// # Log Level
/// `info!` - Important operational event
pub struct TaskKindRegistered<'a> {
    pub kind: &'a str,
    pub max_concurrent: usize,
}

impl Display for TaskKindRegistered<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Registered background task '{}' with max_concurrent={}",
            self.kind, self.max_concurrent
        )
    }
}

impl StructuredLog for TaskKindRegistered<'_> {
    fn log(&self) {
        tracing::info!(kind = self.kind, max_concurrent = self.max_concurrent, "{}", self);
    }
}

/// The same handler registered its kind again.
///
/// # Log Level
/// `debug!` - Expected when several nodes share a processor type
pub struct TaskRegistrationRepeated<'a> {
    pub kind: &'a str,
}

impl Display for TaskRegistrationRepeated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Background task '{}' already registered, keeping it", self.kind)
    }
}

impl StructuredLog for TaskRegistrationRepeated<'_> {
    fn log(&self) {
        tracing::debug!(kind = self.kind, "{}", self);
    }
}

/// A task instance was handed to a worker.
///
/// # Log Level
/// `debug!` - Scheduling detail
pub struct TaskSubmitted<'a> {
    pub kind: &'a str,
    pub available_slots: usize,
}

impl Display for TaskSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Submitted background task '{}' ({} slots left)",
            self.kind, self.available_slots
        )
    }
}

impl StructuredLog for TaskSubmitted<'_> {
    fn log(&self) {
        tracing::debug!(kind = self.kind, available_slots = self.available_slots, "{}", self);
    }
}

impl TaskSubmitted<'_> {
    /// Open a span carrying the same fields.
    pub fn span(&self, name: &str) -> Span {
        tracing::debug_span!("task_submitted", span_name = name, kind = self.kind)
    }
}

/// The handler of a task instance returned an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TaskFailed<'a> {
    pub kind: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for TaskFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Background task '{}' failed: {}", self.kind, self.error)
    }
}

impl StructuredLog for TaskFailed<'_> {
    fn log(&self) {
        tracing::error!(kind = self.kind, error = %self.error, "{}", self);
    }
}

/// A caller stopped waiting for a task result.
///
/// # Log Level
/// `warn!` - The task may still be running on its worker
pub struct TaskWaitTimedOut {
    pub timeout: Duration,
}

impl Display for TaskWaitTimedOut {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Gave up waiting for a background task after {:?}", self.timeout)
    }
}

impl StructuredLog for TaskWaitTimedOut {
    fn log(&self) {
        tracing::warn!(timeout_ms = self.timeout.as_millis() as u64, "{}", self);
    }
}
