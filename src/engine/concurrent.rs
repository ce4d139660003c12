// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Tick-driven concurrent launcher.
//!
//! The scheduler owns all bookkeeping (the not-yet-completed set and the dispatched set);
//! workers only flip their own [`NodeState`] under the node's guard.
//!
//! ```text
//! loop:
//!     collect finished workers           -> shrink `remaining`, remember the first error
//!     stop when the target (or every node) completed, an error occurred, or cancelled
//!     dispatch nodes whose direct ancestors are all out of `remaining`
//!     sleep one tick (woken early by cancellation)
//! ```
//!
//! A node failure stops dispatching; nodes already running drain naturally and the first
//! error is returned.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::config::{consts, ExecutorOptions};
use crate::engine::node_state::{LaunchPlan, NodeState, ScheduledNode};
use crate::errors::ExecutionError;
use crate::events::EventBus;
use crate::graph::ProcessorGraph;
use crate::observability::messages::engine::{
    LaunchCancelled, LaunchCompleted, LaunchFailed, LaunchStarted, NodeDispatched,
};
use crate::observability::messages::processor::ProcessorCancelRequested;
use crate::observability::messages::StructuredLog;
use crate::traits::{LaunchSummary, Launcher, ProcessorContext};

/// What a worker reports back to the scheduler.
enum WorkerOutcome {
    Completed,
    Failed(ExecutionError),
    /// The run stopped before the node got a worker slot
    NotStarted,
}

type WorkerResult = (String, WorkerOutcome);

/// Runs independent branches in parallel on a bounded pool of workers.
#[derive(Debug, Clone)]
pub struct ConcurrentLauncher {
    pool_size: usize,
    tick_interval: Duration,
}

impl ConcurrentLauncher {
    /// `pool_size` is clamped to at least 1.
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool_size: pool_size.max(1),
            tick_interval: Duration::from_millis(consts::DEFAULT_TICK_INTERVAL_MS),
        }
    }

    pub fn from_options(options: &ExecutorOptions) -> Self {
        Self::new(options.pool_size).with_tick_interval(options.tick_interval())
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval.max(Duration::from_millis(1));
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    async fn run(
        &self,
        graph: &ProcessorGraph,
        target: Option<&str>,
        cancel: CancellationToken,
    ) -> Result<LaunchSummary, ExecutionError> {
        let started = Instant::now();

        // === PHASE 1: SCOPE AND INITIAL STATE ===

        let plan = LaunchPlan::new(graph, target)?;
        let mut remaining = plan.pending();
        let mut dispatched: HashSet<String> = HashSet::new();
        let mut summary = LaunchSummary {
            skipped_cached: plan.skipped_cached.clone(),
            ..LaunchSummary::default()
        };
        let scheduled = plan.nodes;

        LaunchStarted {
            strategy: self.strategy(),
            node_count: remaining.len(),
            pool_size: self.pool_size,
        }
        .log();

        let slots = Arc::new(Semaphore::new(self.pool_size));
        // Stops workers still waiting for a slot, without cancelling running processors.
        let stop = cancel.child_token();
        let mut workers: JoinSet<WorkerResult> = JoinSet::new();
        let mut failure: Option<ExecutionError> = None;

        // === PHASE 2: SCHEDULING LOOP ===

        loop {
            while let Some(joined) = workers.try_join_next() {
                collect(joined, &mut remaining, &mut summary, &mut failure);
            }

            let target_done = target.is_some_and(|t| !remaining.contains(t));
            if target_done || remaining.is_empty() || failure.is_some() || cancel.is_cancelled()
            {
                break;
            }

            for node in &scheduled {
                let name = node.name();
                if !remaining.contains(name) || dispatched.contains(name) {
                    continue;
                }
                if node.node().ancestor_names().any(|a| remaining.contains(a)) {
                    continue;
                }

                dispatched.insert(name.to_string());
                NodeDispatched {
                    node: name,
                    processor_type: node.node().processor_type(),
                    pending: remaining.iter().filter(|n| !dispatched.contains(*n)).count(),
                }
                .log();
                spawn_worker(
                    &mut workers,
                    node.clone(),
                    Arc::clone(graph.events()),
                    graph.context().cloned(),
                    Arc::clone(&slots),
                    cancel.clone(),
                    stop.clone(),
                );
            }

            if workers.is_empty() && !remaining.is_empty() {
                // Nothing running and nothing runnable: the graph cannot make progress.
                return Err(ExecutionError::InternalError {
                    message: format!(
                        "No runnable node among {} remaining; the graph is not acyclic",
                        remaining.len()
                    ),
                });
            }

            tokio::select! {
                _ = tokio::time::sleep(self.tick_interval) => {}
                _ = cancel.cancelled() => {}
            }
        }

        // === PHASE 3: CANCELLATION ===

        if cancel.is_cancelled() {
            let running: Vec<&ScheduledNode> = scheduled
                .iter()
                .filter(|n| n.state() == NodeState::Running)
                .collect();
            let running_count = running.len();
            for node in running {
                ProcessorCancelRequested { node: node.name() }.log();
                node.node().processor().cancel().await;
            }
            drain(&mut workers, &mut remaining, &mut summary, &mut failure).await;
            summary.duration = started.elapsed();
            LaunchCancelled {
                strategy: self.strategy(),
                completed: summary.completed.len(),
                running: running_count,
                duration: summary.duration,
            }
            .log();
            return Err(ExecutionError::Cancelled {
                completed: summary.completed.len(),
            });
        }

        // === PHASE 4: DRAIN AND REPORT ===

        stop.cancel();
        drain(&mut workers, &mut remaining, &mut summary, &mut failure).await;
        summary.duration = started.elapsed();

        match failure {
            Some(error) => {
                LaunchFailed {
                    strategy: self.strategy(),
                    error: &error,
                }
                .log();
                Err(error)
            }
            None => {
                LaunchCompleted {
                    strategy: self.strategy(),
                    completed: summary.completed.len(),
                    skipped_cached: summary.skipped_cached.len(),
                    duration: summary.duration,
                }
                .log();
                Ok(summary)
            }
        }
    }
}

impl Default for ConcurrentLauncher {
    fn default() -> Self {
        Self::new(consts::DEFAULT_POOL_SIZE)
    }
}

fn spawn_worker(
    workers: &mut JoinSet<WorkerResult>,
    node: ScheduledNode,
    events: Arc<EventBus>,
    context: Option<Arc<dyn ProcessorContext>>,
    slots: Arc<Semaphore>,
    cancel: CancellationToken,
    stop: CancellationToken,
) {
    workers.spawn(async move {
        let name = node.name().to_string();

        let _slot = tokio::select! {
            permit = slots.acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return (name, WorkerOutcome::NotStarted),
            },
            _ = stop.cancelled() => return (name, WorkerOutcome::NotStarted),
        };
        if stop.is_cancelled() {
            return (name, WorkerOutcome::NotStarted);
        }

        let outcome = match node.run_isolated(events, context, cancel).await {
            Some(Ok(())) => WorkerOutcome::Completed,
            Some(Err(error)) => WorkerOutcome::Failed(error),
            None => WorkerOutcome::NotStarted,
        };
        (name, outcome)
    });
}

fn collect(
    joined: Result<WorkerResult, JoinError>,
    remaining: &mut HashSet<String>,
    summary: &mut LaunchSummary,
    failure: &mut Option<ExecutionError>,
) {
    match joined {
        Ok((name, WorkerOutcome::Completed)) => {
            remaining.remove(&name);
            summary.completed.push(name);
        }
        Ok((_, WorkerOutcome::Failed(error))) => {
            failure.get_or_insert(error);
        }
        Ok((_, WorkerOutcome::NotStarted)) => {}
        Err(join_error) => {
            failure.get_or_insert(ExecutionError::InternalError {
                message: join_error.to_string(),
            });
        }
    }
}

async fn drain(
    workers: &mut JoinSet<WorkerResult>,
    remaining: &mut HashSet<String>,
    summary: &mut LaunchSummary,
    failure: &mut Option<ExecutionError>,
) {
    while let Some(joined) = workers.join_next().await {
        collect(joined, remaining, summary, failure);
    }
}

#[async_trait]
impl Launcher for ConcurrentLauncher {
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
        "concurrent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{
        graph_of, CancellableProcessor, EchoProcessor, FailingProcessor, PanickingProcessor,
        RecordingObserver, SleepingProcessor, StubNode,
    };
    use crate::events::EventKind;
    use std::sync::atomic::Ordering;

    fn launcher() -> ConcurrentLauncher {
        ConcurrentLauncher::new(4).with_tick_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_empty_graph() {
        let graph = graph_of(vec![]);

        let summary = launcher()
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap();

        assert!(summary.completed.is_empty());
    }

    #[tokio::test]
    async fn test_dependency_order_with_interleaving_branches() {
        // a -> b -> c, a -> d
        let (graph, timings) = StubNode::timed_graph(vec![
            ("a", vec![], 20),
            ("b", vec!["a"], 20),
            ("c", vec!["b"], 10),
            ("d", vec!["a"], 10),
        ]);

        let summary = launcher()
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.completed.len(), 4);
        assert_eq!(summary.completed[0], "a");
        for (node, ancestor) in [("b", "a"), ("c", "b"), ("d", "a")] {
            assert!(
                timings.started(node) >= timings.finished(ancestor),
                "{} started before {} finished",
                node,
                ancestor
            );
        }
        for name in ["a", "b", "c", "d"] {
            assert!(graph.get(name).unwrap().is_finished());
        }
    }

    #[tokio::test]
    async fn test_independent_nodes_run_in_parallel() {
        let (graph, timings) = StubNode::timed_graph(vec![
            ("x", vec![], 80),
            ("y", vec![], 80),
            ("z", vec![], 80),
        ]);

        let started = Instant::now();
        launcher()
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap();

        assert!(started.elapsed() < Duration::from_millis(200));
        assert_eq!(timings.peak_concurrency(), 3);
    }

    #[tokio::test]
    async fn test_pool_size_bounds_concurrency() {
        let names: Vec<String> = (0..6).map(|i| format!("n{}", i)).collect();
        let (graph, timings) =
            StubNode::timed_graph(names.iter().map(|n| (n.as_str(), vec![], 30)).collect());

        ConcurrentLauncher::new(2)
            .with_tick_interval(Duration::from_millis(2))
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(timings.peak_concurrency(), 2);
    }

    #[tokio::test]
    async fn test_failure_stops_dispatch_but_drains_siblings() {
        // a -> b(fails) -> c ; a -> slow
        let graph = graph_of(vec![
            StubNode::new("a", Box::new(EchoProcessor::new("a")), &[]),
            StubNode::new("b", Box::new(FailingProcessor::new("bad input")), &["a"]),
            StubNode::new("c", Box::new(EchoProcessor::new("c")), &["b"]),
            StubNode::new(
                "slow",
                Box::new(SleepingProcessor::new("slow", Duration::from_millis(60))),
                &["a"],
            ),
        ]);
        let observer = Arc::new(RecordingObserver::new());
        graph.add_observer(observer.clone());

        let err = launcher()
            .launch(&graph, CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ExecutionError::ProcessorFailed {
                processor_id,
                message,
                ..
            } => {
                assert_eq!(processor_id, "b");
                assert!(message.contains("bad input"));
            }
            other => panic!("unexpected {:?}", other),
        }

        assert!(graph.get("a").unwrap().is_finished());
        assert!(graph.get("slow").unwrap().is_finished());
        assert!(!graph.get("b").unwrap().is_finished());
        assert!(!graph.get("c").unwrap().is_finished());
        assert!(observer.events_for("c").is_empty());
        assert_eq!(observer.kinds_for("b"), vec![EventKind::CurrentNodeRunning, EventKind::Error]);
    }

    #[tokio::test]
    async fn test_panicking_processor_fails_its_node() {
        let graph = graph_of(vec![
            StubNode::new("p", Box::new(PanickingProcessor::new("processor bug")), &[]),
            StubNode::new("after", Box::new(EchoProcessor::new("after")), &["p"]),
        ]);
        let observer = Arc::new(RecordingObserver::new());
        graph.add_observer(observer.clone());

        let err = launcher()
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

    #[tokio::test]
    async fn test_launch_single_runs_only_the_ancestor_closure() {
        // a -> b -> c, a -> d
        let (graph, timings) = StubNode::timed_graph(vec![
            ("a", vec![], 5),
            ("b", vec!["a"], 5),
            ("c", vec!["b"], 5),
            ("d", vec!["a"], 5),
        ]);

        let summary = launcher()
            .launch_single(&graph, "b", CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(summary.completed, vec!["a", "b"]);
        assert_eq!(timings.calls("c"), 0);
        assert_eq!(timings.calls("d"), 0);
    }

    #[tokio::test]
    async fn test_launch_single_reuses_seeded_output() {
        let (graph, timings) = StubNode::timed_graph(vec![
            ("a", vec![], 5),
            ("b", vec!["a"], 5),
            ("c", vec!["b"], 5),
        ]);
        graph.get("a").unwrap().set_output("cached");

        let summary = launcher()
            .launch_single(&graph, "c", CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(timings.calls("a"), 0);
        assert_eq!(summary.skipped_cached, vec!["a"]);
        assert_eq!(summary.completed, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_launch_single_unknown_target() {
        let graph = graph_of(vec![StubNode::new("a", Box::new(EchoProcessor::new("a")), &[])]);

        let err = launcher()
            .launch_single(&graph, "ghost", CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutionError::UnknownTarget(t) if t == "ghost"));
    }

    #[tokio::test]
    async fn test_cancellation_calls_cancel_on_running_nodes() {
        let blocker = CancellableProcessor::new();
        let cancel_calls = blocker.cancel_calls();
        let graph = graph_of(vec![
            StubNode::new("long", Box::new(blocker), &[]),
            StubNode::new("after", Box::new(EchoProcessor::new("after")), &["long"]),
        ]);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(40)).await;
            trigger.cancel();
        });

        let err = launcher().launch(&graph, cancel).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Cancelled { completed: 0 }));
        assert_eq!(cancel_calls.load(Ordering::SeqCst), 1);
        assert!(!graph.get("after").unwrap().is_finished());
    }

    #[tokio::test]
    async fn test_already_cancelled_dispatches_nothing() {
        let (graph, timings) = StubNode::timed_graph(vec![("a", vec![], 5)]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = launcher().launch(&graph, cancel).await.unwrap_err();

        assert!(matches!(err, ExecutionError::Cancelled { completed: 0 }));
        assert_eq!(timings.calls("a"), 0);
    }
}
