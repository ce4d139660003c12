// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use std::time::Duration;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::time::Instant;

use crate::config::BackgroundTaskSettings;
use crate::errors::TaskError;
use crate::observability::messages::tasks::TaskWaitTimedOut;
use crate::observability::messages::StructuredLog;

pub type TaskResult = Result<Value, TaskError>;

const MIN_BACKOFF: Duration = Duration::from_millis(1);

/// How long and how eagerly a caller polls for a task result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitOptions {
    pub timeout: Duration,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    /// Growth factor applied to the sleep after every empty poll
    pub multiplier: f64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self::from(&BackgroundTaskSettings::default())
    }
}

impl WaitOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl From<&BackgroundTaskSettings> for WaitOptions {
    fn from(settings: &BackgroundTaskSettings) -> Self {
        Self {
            timeout: Duration::from_secs(settings.default_timeout_seconds),
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            multiplier: settings.backoff_multiplier,
        }
    }
}

/// Polls `receiver` with exponential backoff until a result arrives or `options.timeout`
/// elapses.
///
/// On timeout only the wait gives up; the task keeps running on its worker.
pub async fn await_result(
    mut receiver: oneshot::Receiver<TaskResult>,
    options: WaitOptions,
) -> TaskResult {
    let deadline = Instant::now() + options.timeout;
    // A zero delay would spin on try_recv until the deadline.
    let mut delay = options.initial_backoff.max(MIN_BACKOFF);
    let multiplier = if options.multiplier.is_finite() && options.multiplier >= 1.0 {
        options.multiplier
    } else {
        1.0
    };

    loop {
        match receiver.try_recv() {
            Ok(result) => return result,
            Err(TryRecvError::Closed) => return Err(TaskError::ChannelClosed),
            Err(TryRecvError::Empty) => {}
        }

        let now = Instant::now();
        if now >= deadline {
            TaskWaitTimedOut {
                timeout: options.timeout,
            }
            .log();
            return Err(TaskError::TimedOut {
                timeout: options.timeout,
            });
        }

        tokio::time::sleep(delay.min(deadline - now)).await;
        delay = delay
            .mul_f64(multiplier)
            .min(options.max_backoff)
            .max(MIN_BACKOFF);
    }
}
