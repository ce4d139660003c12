// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Each message type implements `Display` for the human-readable line and
//! [`StructuredLog`] to emit it with structured fields at its own level.
//!
//! # Organization
//!
//! * `engine` - launcher lifecycle (start, completion, failure, cancellation)
//! * `processor` - node execution and event delivery
//! * `tasks` - background task registration, submission and waits
//! * `validation` - flow validation warnings and errors
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_flowgraph::observability::messages::engine::LaunchStarted;
//! use the_flowgraph::observability::messages::StructuredLog;
//!
//! let msg = LaunchStarted {
//!     strategy: "concurrent",
//!     node_count: 5,
//!     pool_size: 25,
//! };
//!
//! msg.log();
//! ```

use std::fmt::Display;

pub mod engine;
pub mod processor;
pub mod tasks;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the message as a tracing event.
    fn log(&self);
}
