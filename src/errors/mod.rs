// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod execution;
mod task;

pub use config::{ConfigError, ValidationError};
pub use execution::{ExecutionError, OutputError, ProcessorError};
pub use task::TaskError;
