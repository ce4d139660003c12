// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Background task subsystem.
//!
//! Processors that must wait on slow external work (a render job, a document load) submit
//! it here instead of blocking a launcher worker:
//!
//! ```text
//! register(kind, handler, max_concurrent)   once per kind
//! submit(kind, payload) -> receiver          waits for a free slot of that kind
//! await_result(receiver, options)            polls with exponential backoff until timeout
//! ```

mod handler;
mod manager;
mod wait;

pub use handler::{blocking_task_fn, task_fn, BlockingTask, FnTask, TaskHandler};
pub use manager::BackgroundTaskManager;
pub use wait::{await_result, TaskResult, WaitOptions};
