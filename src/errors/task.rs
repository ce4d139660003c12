// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;
use thiserror::Error;

/// Errors raised by the background task subsystem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    /// The kind is already bound to a different handler
    #[error("Task '{kind}' is already registered with a different handler")]
    AlreadyRegistered { kind: String },

    #[error("No task processor registered for '{kind}'")]
    UnknownKind { kind: String },

    /// The caller's wait gave up; the task itself may still be running
    #[error("Operation timed out after {timeout:?}")]
    TimedOut { timeout: Duration },

    /// The worker dropped the result channel without sending (panic or abort)
    #[error("Task result channel closed before a result was sent")]
    ChannelClosed,

    #[error("Task handler failed: {0}")]
    HandlerFailed(String),

    #[error("Background task manager is shut down")]
    ManagerClosed,
}

impl TaskError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}
