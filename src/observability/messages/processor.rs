// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for node execution and event delivery.
//!
//! This module contains message types for logging events related to:
//! * Node execution lifecycle (start, completion, failure, cancel request)
//! * Processor instantiation
//! * Lifecycle events reaching observers

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::Span;

/// Node execution started.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_flowgraph::observability::messages::processor::ProcessorExecutionStarted;
///
/// let msg = ProcessorExecutionStarted {
///     node: "summarize",
///     processor_type: "merger-prompt",
///     input_count: 2,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct ProcessorExecutionStarted<'a> {
    pub node: &'a str,
    pub processor_type: &'a str,
    pub input_count: usize,
}

impl Display for ProcessorExecutionStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' ({}) execution started: {} inputs",
            self.node, self.processor_type, self.input_count
        )
    }
}

impl StructuredLog for ProcessorExecutionStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            processor_type = self.processor_type,
            input_count = self.input_count,
            "{}", self
        );
    }
}

impl ProcessorExecutionStarted<'_> {
    /// Open a span carrying the same fields.
    pub fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "processor_execution",
            span_name = name,
            node = self.node,
            processor_type = self.processor_type,
        )
    }
}

/// Node execution completed successfully.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ProcessorExecutionCompleted<'a> {
    pub node: &'a str,
    pub output_slots: usize,
    pub duration: Duration,
}

impl Display for ProcessorExecutionCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' completed: output_slots={}, duration={:?}",
            self.node, self.output_slots, self.duration
        )
    }
}

impl StructuredLog for ProcessorExecutionCompleted<'_> {
    fn log(&self) {
        tracing::info!(
            node = self.node,
            output_slots = self.output_slots,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// Node execution failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_flowgraph::observability::messages::processor::ProcessorExecutionFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
/// let msg = ProcessorExecutionFailed {
///     node: "summarize",
///     error: &error,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct ProcessorExecutionFailed<'a> {
    pub node: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ProcessorExecutionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' execution failed: {}", self.node, self.error)
    }
}

impl StructuredLog for ProcessorExecutionFailed<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, error = %self.error, "{}", self);
    }
}

/// The launcher asked a running node to abort.
///
/// # Log Level
/// `warn!` - Run ended early on request
pub struct ProcessorCancelRequested<'a> {
    pub node: &'a str,
}

impl Display for ProcessorCancelRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Requesting cancellation of running node '{}'", self.node)
    }
}

impl StructuredLog for ProcessorCancelRequested<'_> {
    fn log(&self) {
        tracing::warn!(node = self.node, "{}", self);
    }
}

/// A processor panicked; the node is marked failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProcessorPanicked<'a> {
    pub node: &'a str,
    pub reason: &'a str,
}

impl Display for ProcessorPanicked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' panicked: {}", self.node, self.reason)
    }
}

impl StructuredLog for ProcessorPanicked<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, reason = self.reason, "{}", self);
    }
}

/// A constructor rejected a node's configuration.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ProcessorInstantiationFailed<'a> {
    pub node: &'a str,
    pub processor_type: &'a str,
    pub reason: &'a str,
}

impl Display for ProcessorInstantiationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to instantiate node '{}' of type '{}': {}",
            self.node, self.processor_type, self.reason
        )
    }
}

impl StructuredLog for ProcessorInstantiationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            processor_type = self.processor_type,
            reason = self.reason,
            "{}", self
        );
    }
}

/// A lifecycle event mirrored to the log.
///
/// # Log Level
/// `debug!` for progress and streaming, `info!` for node start, `warn!` for errors
pub struct LifecycleEventObserved<'a> {
    pub kind: &'a str,
    pub node: &'a str,
    pub processor_type: &'a str,
    pub detail: Option<&'a str>,
}

impl Display for LifecycleEventObserved<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self.detail {
            Some(detail) => write!(f, "[{}] node '{}': {}", self.kind, self.node, detail),
            None => write!(f, "[{}] node '{}'", self.kind, self.node),
        }
    }
}

impl StructuredLog for LifecycleEventObserved<'_> {
    fn log(&self) {
        match self.kind {
            "error" => tracing::warn!(
                kind = self.kind,
                node = self.node,
                processor_type = self.processor_type,
                "{}", self
            ),
            "current_node_running" => tracing::info!(
                kind = self.kind,
                node = self.node,
                processor_type = self.processor_type,
                "{}", self
            ),
            _ => tracing::debug!(
                kind = self.kind,
                node = self.node,
                processor_type = self.processor_type,
                "{}", self
            ),
        }
    }
}

/// Periodic event statistics.
///
/// # Log Level
/// `info!` - Important operational event
pub struct EventStatistics<'a> {
    pub total: usize,
    pub by_kind: &'a str,
    pub by_processor_type: &'a str,
}

impl Display for EventStatistics<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Event statistics after {} events: kinds [{}], node runs [{}]",
            self.total, self.by_kind, self.by_processor_type
        )
    }
}

impl StructuredLog for EventStatistics<'_> {
    fn log(&self) {
        tracing::info!(
            total = self.total,
            by_kind = self.by_kind,
            by_processor_type = self.by_processor_type,
            "{}", self
        );
    }
}

/// An observer could not deliver an event to its sink.
///
/// # Log Level
/// `warn!` - Degraded reporting
pub struct EventDeliveryFailed<'a> {
    pub observer: &'a str,
    pub node: &'a str,
    pub reason: &'a str,
}

impl Display for EventDeliveryFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Observer '{}' dropped an event of node '{}': {}",
            self.observer, self.node, self.reason
        )
    }
}

impl StructuredLog for EventDeliveryFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            observer = self.observer,
            node = self.node,
            reason = self.reason,
            "{}", self
        );
    }
}

/// A text replacement was asked to use an invalid regular expression; the input passes
/// through unchanged.
///
/// # Log Level
/// `warn!` - Degraded result
pub struct InvalidSearchPattern<'a> {
    pub node: &'a str,
    pub pattern: &'a str,
    pub reason: &'a str,
}

impl Display for InvalidSearchPattern<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' received invalid search pattern '{}': {}",
            self.node, self.pattern, self.reason
        )
    }
}

impl StructuredLog for InvalidSearchPattern<'_> {
    fn log(&self) {
        tracing::warn!(
            node = self.node,
            pattern = self.pattern,
            reason = self.reason,
            "{}", self
        );
    }
}

/// A document was handed to the loader pool.
///
/// # Log Level
/// `debug!` - Processing detail
pub struct DocumentLoadRequested<'a> {
    pub node: &'a str,
    pub document_url: &'a str,
}

impl Display for DocumentLoadRequested<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' loading document '{}'",
            self.node, self.document_url
        )
    }
}

impl StructuredLog for DocumentLoadRequested<'_> {
    fn log(&self) {
        tracing::debug!(node = self.node, document_url = self.document_url, "{}", self);
    }
}
