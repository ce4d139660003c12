// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::engine::node_state::{LaunchPlan, NodeState};
use crate::errors::ExecutionError;
use crate::graph::ProcessorGraph;
use crate::observability::messages::engine::{
    LaunchCancelled, LaunchCompleted, LaunchFailed, LaunchStarted,
};
use crate::observability::messages::processor::ProcessorCancelRequested;
use crate::observability::messages::StructuredLog;
use crate::traits::{LaunchSummary, Launcher};

/// Runs one node at a time in topological order.
///
/// Same event contract and partial-run semantics as the concurrent launcher; useful for
/// debugging and for flows whose processors must not overlap.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialLauncher;

impl SequentialLauncher {
    pub fn new() -> Self {
        Self
    }

    async fn run(
        &self,
        graph: &ProcessorGraph,
        target: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<LaunchSummary, ExecutionError> {
        let started = Instant::now();
        let plan = LaunchPlan::new(graph, target)?;
        let mut summary = LaunchSummary {
            skipped_cached: plan.skipped_cached.clone(),
            ..LaunchSummary::default()
        };

        LaunchStarted {
            strategy: self.strategy(),
            node_count: plan.pending().len(),
            pool_size: 1,
        }
        .log();

        let events = graph.events();
        let context = graph.context().cloned();

        for node in plan.nodes.iter().filter(|n| n.state() == NodeState::Pending) {
            if cancel.is_cancelled() {
                return Err(self.cancelled(&mut summary, started, 0));
            }

            // Isolated so a panicking processor fails its node instead of the launch.
            let run = node.run_isolated(Arc::clone(events), context.clone(), cancel.clone());
            tokio::pin!(run);

            let result = tokio::select! {
                result = &mut run => result,
                _ = cancel.cancelled() => {
                    // The start guard refuses once cancelled, so a node not yet running never will.
                    let running = node.state() == NodeState::Running;
                    if running {
                        ProcessorCancelRequested { node: node.name() }.log();
                        node.node().processor().cancel().await;
                    }
                    if let Some(Ok(())) = run.await {
                        summary.completed.push(node.name().to_string());
                    }
                    return Err(self.cancelled(&mut summary, started, usize::from(running)));
                }
            };

            match result {
                Some(Ok(())) => summary.completed.push(node.name().to_string()),
                Some(Err(_)) if cancel.is_cancelled() => {
                    return Err(self.cancelled(&mut summary, started, 0));
                }
                Some(Err(error)) => {
                    LaunchFailed {
                        strategy: self.strategy(),
                        error: &error,
                    }
                    .log();
                    return Err(error);
                }
                None if cancel.is_cancelled() => {
                    return Err(self.cancelled(&mut summary, started, 0));
                }
                None => {}
            }

            if target == Some(node.name()) {
                break;
            }
        }

        summary.duration = started.elapsed();
        LaunchCompleted {
            strategy: self.strategy(),
            completed: summary.completed.len(),
            skipped_cached: summary.skipped_cached.len(),
            duration: summary.duration,
        }
        .log();
        Ok(summary)
    }

    fn cancelled(
        &self,
        summary: &mut LaunchSummary,
        started: Instant,
        running: usize,
    ) -> ExecutionError {
        summary.duration = started.elapsed();
        LaunchCancelled {
            strategy: self.strategy(),
            completed: summary.completed.len(),
            running,
            duration: summary.duration,
        }
        .log();
        ExecutionError::Cancelled {
            completed: summary.completed.len(),
        }
    }
}

#[async_trait]
impl Launcher for SequentialLauncher {
    async fn launch(
        &self,
        graph: &ProcessorGraph,
        cancel: CancellationToken,
    ) -> Result<LaunchSummary, ExecutionError> {
        self.run(graph, None, cancel).await
    }

    async fn launch_single(
        &self,
        graph: &ProcessorGraph,
        target: &str,
        cancel: CancellationToken,
    ) -> Result<LaunchSummary, ExecutionError> {
        self.run(graph, Some(target), cancel).await
    }

    fn strategy(&self) -> &'static str {
        "sequential"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{
        graph_of, CancellableProcessor, EchoProcessor, FailingProcessor, PanickingProcessor,
        RecordingObserver, StubNode,
    };
    use crate::errors::ProcessorError;
    use crate::events::EventKind;
    use crate::graph::{Invocation, Output};
    use crate::traits::Processor;
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Finishes successfully once asked to cancel.
    struct WindDownProcessor {
        released: Notify,
    }

    #[async_trait]
    impl Processor for WindDownProcessor {
        async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
            self.released.notified().await;
            Ok(Output::from("partial"))
        }

        async fn cancel(&self) {
            self.released.notify_one();
        }

        fn name(&self) -> &'static str {
            "wind_down"
        }
    }

    #[tokio::test]
    async fn test_runs_in_topological_order_without_overlap() {
        let (graph, timings) = StubNode::timed_graph(vec![
            ("a", vec![], 5),
            ("b", vec!["a"], 5),
            ("d", vec!["a"], 5),
            ("c", vec!["b"], 5),
        ]);

        let summary = SequentialLauncher
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.completed, vec!["a", "b", "d", "c"]);
        assert_eq!(timings.peak_concurrency(), 1);
    }

    #[tokio::test]
    async fn test_first_failure_stops_the_run() {
        let graph = graph_of(vec![
            StubNode::new("a", Box::new(FailingProcessor::new("nope")), &[]),
            StubNode::new("b", Box::new(EchoProcessor::new("b")), &[]),
        ]);

        let err = SequentialLauncher
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::ProcessorFailed { ref processor_id, .. } if processor_id == "a"));
        assert!(!graph.get("b").unwrap().is_finished());
    }

    #[tokio::test]
    async fn test_launch_single_stops_at_target_and_reuses_cache() {
        let (graph, timings) = StubNode::timed_graph(vec![
            ("a", vec![], 1),
            ("b", vec!["a"], 1),
            ("c", vec!["b"], 1),
            ("other", vec![], 1),
        ]);
        graph.get("a").unwrap().set_output("cached");

        let summary = SequentialLauncher
            .launch_single(&graph, "b", CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.completed, vec!["b"]);
        assert_eq!(summary.skipped_cached, vec!["a"]);
        assert_eq!(timings.calls("a"), 0);
        assert_eq!(timings.calls("c"), 0);
        assert_eq!(timings.calls("other"), 0);
    }

    #[tokio::test]
    async fn test_cancel_reaches_running_node() {
        let blocker = CancellableProcessor::new();
        let cancel_calls = blocker.cancel_calls();
        let graph = graph_of(vec![StubNode::new("long", Box::new(blocker), &[])]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = SequentialLauncher.launch(&graph, cancel).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Cancelled { completed: 0 }));
        assert_eq!(cancel_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_node_finishing_during_cancellation_counts_as_completed() {
        let graph = graph_of(vec![
            StubNode::new(
                "long",
                Box::new(WindDownProcessor {
                    released: Notify::new(),
                }),
                &[],
            ),
            StubNode::new("next", Box::new(EchoProcessor::new("next")), &["long"]),
        ]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = SequentialLauncher.launch(&graph, cancel).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Cancelled { completed: 1 }));
        assert_eq!(graph.get("long").unwrap().get_output(0), Ok(serde_json::json!("partial")));
        assert!(!graph.get("next").unwrap().is_finished());
    }

    #[tokio::test]
    async fn test_panicking_processor_fails_its_node() {
        let graph = graph_of(vec![
            StubNode::new("p", Box::new(PanickingProcessor::new("processor bug")), &[]),
            StubNode::new("after", Box::new(EchoProcessor::new("after")), &["p"]),
        ]);
        let observer = Arc::new(RecordingObserver::new());
        graph.add_observer(observer.clone());

        let err = SequentialLauncher
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ExecutionError::WorkerPanicked { node, reason } => {
                assert_eq!(node, "p");
                assert!(reason.contains("processor bug"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(observer.kinds_for("p"), vec![EventKind::CurrentNodeRunning, EventKind::Error]);
        assert!(observer.events_for("after").is_empty());
    }
}
