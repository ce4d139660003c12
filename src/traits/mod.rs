// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod context;
pub mod launcher;
pub mod observer;
pub mod processor;
pub mod storage;

pub use context::ProcessorContext;
pub use launcher::{LaunchSummary, Launcher};
pub use observer::Observer;
pub use processor::Processor;
pub use storage::Storage;
