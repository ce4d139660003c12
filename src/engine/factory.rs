// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::{LauncherSettings, Strategy};
use crate::engine::{ConcurrentLauncher, SequentialLauncher};
use crate::traits::Launcher;

/// Factory for creating launchers from settings
pub struct LauncherFactory;

impl LauncherFactory {
    /// Create a launcher for the configured strategy
    pub fn from_settings(settings: &LauncherSettings) -> Box<dyn Launcher> {
        match settings.strategy {
            Strategy::Concurrent => Box::new(ConcurrentLauncher::from_options(
                &settings.executor_options,
            )),
            Strategy::Sequential => Box::new(SequentialLauncher::new()),
        }
    }
}
