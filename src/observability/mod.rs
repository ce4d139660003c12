// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! All diagnostic and operational logging in the crate goes through the message
//! types in [`messages`]. Each type implements `Display` plus [`messages::StructuredLog`],
//! so call sites never assemble log strings themselves.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - launcher lifecycle and scheduling events
//! * `messages::processor` - node execution and event delivery
//! * `messages::tasks` - background task subsystem
//! * `messages::validation` - flow validation warnings and errors
//!
//! # Usage
//!
//! ```rust
//! use the_flowgraph::observability::messages::processor::ProcessorExecutionFailed;
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "test error");
//! let msg = ProcessorExecutionFailed {
//!     node: "my_node",
//!     error: &error,
//! };
//!
//! tracing::error!("{}", msg);
//! ```
//!
//! Installing a subscriber is left to the binary; see [`init_tracing`].

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
pub const LOG_ENV_VAR: &str = "FLOWGRAPH_LOG";

/// Installs a fmt subscriber writing to stderr, filtered by `FLOWGRAPH_LOG` (default `info`).
///
/// Does nothing when a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
