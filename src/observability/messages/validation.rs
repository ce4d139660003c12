// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for flow validation warnings and errors.
//!
//! This module contains message types for logging events related to:
//! * Flow structure validation
//! * Cyclic dependency detection
//! * Unresolved input detection
//! * Duplicate node name detection

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Cyclic dependency detected in a flow.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_flowgraph::observability::messages::validation::CyclicDependencyDetected;
///
/// let cycle = vec!["a".to_string(), "b".to_string(), "a".to_string()];
/// let msg = CyclicDependencyDetected {
///     cycle: &cycle,
/// };
///
/// tracing::error!("{}", msg);
/// ```
pub struct CyclicDependencyDetected<'a> {
    pub cycle: &'a [String],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Cyclic dependency detected: {}", self.cycle.join(" -> "))
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(
            cycle = self.cycle.join(" -> "),
            cycle_length = self.cycle.len(),
            "{}", self
        );
    }
}

/// A node takes input from a node that is not in the flow.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct UnresolvedInput<'a> {
    pub node: &'a str,
    pub missing_input: &'a str,
}

impl Display for UnresolvedInput<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' takes input from missing node '{}'",
            self.node, self.missing_input
        )
    }
}

impl StructuredLog for UnresolvedInput<'_> {
    fn log(&self) {
        tracing::error!(
            node = self.node,
            missing_input = self.missing_input,
            "{}", self
        );
    }
}

/// Two nodes share a name.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct DuplicateNodeName<'a> {
    pub node: &'a str,
}

impl Display for DuplicateNodeName<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Duplicate node name: '{}'", self.node)
    }
}

impl StructuredLog for DuplicateNodeName<'_> {
    fn log(&self) {
        tracing::error!(node = self.node, "{}", self);
    }
}

/// Flow validation started.
///
/// # Log Level
/// `debug!` - Runs on every request
pub struct ValidationStarted {
    pub node_count: usize,
}

impl Display for ValidationStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Starting flow validation for {} nodes", self.node_count)
    }
}

impl StructuredLog for ValidationStarted {
    fn log(&self) {
        tracing::debug!(node_count = self.node_count, "{}", self);
    }
}

/// Flow validation passed.
///
/// # Log Level
/// `debug!` - Runs on every request
pub struct ValidationCompleted {
    pub node_count: usize,
    pub root_count: usize,
}

impl Display for ValidationCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Flow validation completed for {} nodes ({} without inputs)",
            self.node_count, self.root_count
        )
    }
}

impl StructuredLog for ValidationCompleted {
    fn log(&self) {
        tracing::debug!(
            node_count = self.node_count,
            root_count = self.root_count,
            "{}", self
        );
    }
}

/// Flow validation failed.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValidationFailed {
    pub error_count: usize,
}

impl Display for ValidationFailed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Flow validation failed with {} errors", self.error_count)
    }
}

impl StructuredLog for ValidationFailed {
    fn log(&self) {
        tracing::error!(error_count = self.error_count, "{}", self);
    }
}
