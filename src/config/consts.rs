// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Default number of nodes executing at once
pub const DEFAULT_POOL_SIZE: usize = 25;
/// Default pause between two scheduling passes
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;

/// Default cap on background task handlers running at once, all kinds together
pub const DEFAULT_BACKGROUND_MAX_WORKERS: usize = 50;
/// Default time a caller waits for a background task result
pub const DEFAULT_TASK_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 100;
pub const DEFAULT_MAX_BACKOFF_MS: u64 = 5_000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;

pub const DEFAULT_LOCAL_STORAGE_DIR: &str = "local_storage";

/// Environment overrides
pub const ENV_POOL_SIZE: &str = "FLOWGRAPH_POOL_SIZE";
pub const ENV_TICK_INTERVAL_MS: &str = "FLOWGRAPH_TICK_INTERVAL_MS";
pub const ENV_BACKGROUND_MAX_WORKERS: &str = "FLOWGRAPH_BACKGROUND_TASK_MAX_WORKERS";
pub const ENV_LOCAL_STORAGE_DIR: &str = "FLOWGRAPH_LOCAL_STORAGE_DIR";
