// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Node lifecycle events and their fan-out to observers.

mod bus;
mod event;
pub mod observers;

pub use bus::EventBus;
pub use event::{EventKind, ProcessorEvent};
pub use observers::{ChannelObserver, EventStats, StatsObserver, TracingObserver};
