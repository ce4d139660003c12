// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Built-in observers.
//!
//! * [`ChannelObserver`] - forwards serialized events to a channel; the transport seam
//! * [`TracingObserver`] - mirrors events to the log
//! * [`StatsObserver`] - counts events and periodically logs a summary

use std::collections::BTreeMap;
use std::sync::Mutex;
use tokio::sync::mpsc;

use crate::events::{EventKind, ProcessorEvent};
use crate::observability::messages::processor::{
    EventDeliveryFailed, EventStatistics, LifecycleEventObserved,
};
use crate::observability::messages::StructuredLog;
use crate::traits::Observer;

/// Forwards every event as a JSON value to an unbounded channel.
///
/// The receiving half belongs to whatever pushes events to clients.
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<serde_json::Value>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<serde_json::Value>) -> Self {
        Self { sender }
    }

    /// Creates the observer together with the receiving end.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<serde_json::Value>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }
}

impl Observer for ChannelObserver {
    fn notify(&self, event: &ProcessorEvent) {
        let payload = match serde_json::to_value(event) {
            Ok(payload) => payload,
            Err(e) => {
                EventDeliveryFailed {
                    observer: "channel",
                    node: &event.instance_name,
                    reason: &e.to_string(),
                }
                .log();
                return;
            }
        };

        if self.sender.send(payload).is_err() {
            EventDeliveryFailed {
                observer: "channel",
                node: &event.instance_name,
                reason: "receiver dropped",
            }
            .log();
        }
    }
}

/// Mirrors lifecycle events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn notify(&self, event: &ProcessorEvent) {
        LifecycleEventObserved {
            kind: event.kind.as_str(),
            node: &event.instance_name,
            processor_type: &event.processor_type,
            detail: event.error.as_deref(),
        }
        .log();
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventStats {
    pub total: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
    /// Node runs per processor type, counted on `current_node_running`
    pub runs_by_processor_type: BTreeMap<String, usize>,
}

impl EventStats {
    fn render(map: impl Iterator<Item = (String, usize)>) -> String {
        map.map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Counts events and logs a summary every `log_every` notifications.
pub struct StatsObserver {
    log_every: usize,
    stats: Mutex<EventStats>,
}

impl StatsObserver {
    pub const DEFAULT_LOG_EVERY: usize = 10;

    pub fn new(log_every: usize) -> Self {
        Self {
            log_every: log_every.max(1),
            stats: Mutex::new(EventStats::default()),
        }
    }

    pub fn snapshot(&self) -> EventStats {
        self.stats.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Default for StatsObserver {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LOG_EVERY)
    }
}

impl Observer for StatsObserver {
    fn notify(&self, event: &ProcessorEvent) {
        let Ok(mut stats) = self.stats.lock() else {
            return;
        };

        stats.total += 1;
        *stats.by_kind.entry(event.kind.as_str()).or_insert(0) += 1;
        if event.kind == EventKind::CurrentNodeRunning {
            *stats
                .runs_by_processor_type
                .entry(event.processor_type.clone())
                .or_insert(0) += 1;
        }

        if stats.total % self.log_every == 0 {
            let by_kind =
                EventStats::render(stats.by_kind.iter().map(|(k, v)| (k.to_string(), *v)));
            let by_type = EventStats::render(
                stats.runs_by_processor_type.iter().map(|(k, v)| (k.clone(), *v)),
            );
            EventStatistics {
                total: stats.total,
                by_kind: &by_kind,
                by_processor_type: &by_type,
            }
            .log();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_observer_forwards_json() {
        let (observer, mut receiver) = ChannelObserver::channel();

        observer.notify(&ProcessorEvent::new(EventKind::CurrentNodeRunning, "a", "input-text"));

        let payload = receiver.recv().await.unwrap();
        assert_eq!(payload["kind"], "current_node_running");
        assert_eq!(payload["instanceName"], "a");
    }

    #[test]
    fn test_channel_observer_survives_dropped_receiver() {
        let (observer, receiver) = ChannelObserver::channel();
        drop(receiver);

        observer.notify(&ProcessorEvent::new(EventKind::Progress, "a", "input-text"));
    }

    #[test]
    fn test_stats_observer_counts() {
        let observer = StatsObserver::new(2);
        let events = vec![
            ProcessorEvent::new(EventKind::CurrentNodeRunning, "a", "input-text"),
            ProcessorEvent::new(EventKind::Progress, "a", "input-text"),
            ProcessorEvent::new(EventKind::CurrentNodeRunning, "b", "display"),
            ProcessorEvent::new(EventKind::Error, "b", "display"),
            ProcessorEvent::new(EventKind::CurrentNodeRunning, "c", "display"),
        ];

        for event in &events {
            observer.notify(event);
        }

        let stats = observer.snapshot();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.by_kind.get("current_node_running"), Some(&3));
        assert_eq!(stats.by_kind.get("error"), Some(&1));
        assert_eq!(stats.runs_by_processor_type.get("display"), Some(&2));
        assert_eq!(stats.runs_by_processor_type.get("input-text"), Some(&1));
    }
}
