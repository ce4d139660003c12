// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::events::ProcessorEvent;

/// A sink for node lifecycle events.
///
/// Called synchronously from the emitting node's task. A slow observer delays that
/// node's own reporting but no other node.
pub trait Observer: Send + Sync {
    fn notify(&self, event: &ProcessorEvent);
}
