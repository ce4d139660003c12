// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while a flow is running.
//!
//! Three layers, narrowest first:
//! * [`OutputError`] - addressing a node's output slots
//! * [`ProcessorError`] - raised by a single `Processor::process` call
//! * [`ExecutionError`] - what a launcher reports for the whole run

use thiserror::Error;

use crate::errors::TaskError;

/// Slot addressing failures. Never coerced into an empty value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OutputError {
    #[error("Index {index} out of bounds for output of size {len} on node '{node}'")]
    IndexOutOfBounds { node: String, index: i64, len: usize },

    #[error("Node '{node}' has not produced an output yet")]
    NotProduced { node: String },
}

/// Failure of a single processor invocation.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// Generic business failure
    #[error("{message}")]
    Failed {
        message: String,
        /// Partial failure that needs no compensating rollback upstream
        no_rollback: bool,
    },

    /// A message meant to be shown as-is to whoever triggered the run
    #[error("{message}")]
    UserFacing { message: String },

    #[error(transparent)]
    Output(#[from] OutputError),

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("Processor was cancelled")]
    Cancelled,
}

impl ProcessorError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            no_rollback: false,
        }
    }

    /// A failure flagged as not requiring any compensating rollback.
    pub fn partial(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            no_rollback: true,
        }
    }

    pub fn user_facing(message: impl Into<String>) -> Self {
        Self::UserFacing {
            message: message.into(),
        }
    }

    pub fn no_rollback(&self) -> bool {
        matches!(self, Self::Failed { no_rollback: true, .. })
    }
}

/// Errors reported by a launcher for a whole run.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A node raised during `process()`; scheduling of new nodes stopped
    #[error("Processor '{processor_id}' failed: {message}")]
    ProcessorFailed {
        processor_id: String,
        message: String,
        no_rollback: bool,
    },

    /// The run was cancelled through its cancellation token
    #[error("Execution cancelled after {completed} completed node(s)")]
    Cancelled { completed: usize },

    #[error("Target node '{0}' is not part of the graph")]
    UnknownTarget(String),

    #[error("Worker for node '{node}' panicked: {reason}")]
    WorkerPanicked { node: String, reason: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl ExecutionError {
    pub fn from_processor(processor_id: &str, error: &ProcessorError) -> Self {
        Self::ProcessorFailed {
            processor_id: processor_id.to_string(),
            message: error.to_string(),
            no_rollback: error.no_rollback(),
        }
    }

    /// Whether the failure is flagged as not needing a compensating rollback.
    pub fn no_rollback(&self) -> bool {
        matches!(self, Self::ProcessorFailed { no_rollback: true, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_rollback_flag_survives_conversion() {
        let partial = ProcessorError::partial("quota exceeded");
        let err = ExecutionError::from_processor("llm", &partial);

        assert!(err.no_rollback());
        assert_eq!(err.to_string(), "Processor 'llm' failed: quota exceeded");

        let plain = ExecutionError::from_processor("llm", &ProcessorError::failed("boom"));
        assert!(!plain.no_rollback());
    }

    #[test]
    fn test_output_error_is_transparent() {
        let err: ProcessorError = OutputError::IndexOutOfBounds {
            node: "split".into(),
            index: 3,
            len: 2,
        }
        .into();

        assert_eq!(
            err.to_string(),
            "Index 3 out of bounds for output of size 2 on node 'split'"
        );
        assert!(!err.no_rollback());
    }
}
