// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::errors::ExecutionError;
use crate::events::{EventBus, EventKind};
use crate::graph::{node_event, Invocation, ProcessorGraph, ProcessorNode};
use crate::observability::messages::engine::CachedNodeReused;
use crate::observability::messages::processor::{
    ProcessorExecutionCompleted, ProcessorExecutionFailed, ProcessorExecutionStarted,
    ProcessorPanicked,
};
use crate::observability::messages::StructuredLog;
use crate::traits::ProcessorContext;

/// Lifecycle of one node during one run.
///
/// `Pending -> Running -> Completed` or `Pending -> Running -> Error`; terminal states
/// never change again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Pending,
    Running,
    Completed,
    Error,
}

impl NodeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, NodeState::Completed | NodeState::Error)
    }
}

/// A graph node plus its scheduler state, shared between the scheduler and one worker.
#[derive(Debug, Clone)]
pub struct ScheduledNode {
    node: Arc<ProcessorNode>,
    state: Arc<Mutex<NodeState>>,
}

impl ScheduledNode {
    pub fn new(node: Arc<ProcessorNode>) -> Self {
        Self::with_state(node, NodeState::Pending)
    }

    /// A node whose output was seeded ahead of the run.
    pub fn cached(node: Arc<ProcessorNode>) -> Self {
        Self::with_state(node, NodeState::Completed)
    }

    fn with_state(node: Arc<ProcessorNode>, state: NodeState) -> Self {
        Self {
            node,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn node(&self) -> &Arc<ProcessorNode> {
        &self.node
    }

    pub fn name(&self) -> &str {
        self.node.name()
    }

    pub fn state(&self) -> NodeState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or(NodeState::Error)
    }

    /// Moves `Pending` to `Running`. Only the first caller wins, and nothing starts once
    /// `cancel` fired.
    ///
    /// The token is checked under the state guard, so a launcher that observes the
    /// cancellation and then scans for `Running` nodes sees every node that will ever start.
    pub fn try_start(&self, cancel: &CancellationToken) -> bool {
        match self.state.lock() {
            Ok(mut state) if *state == NodeState::Pending && !cancel.is_cancelled() => {
                *state = NodeState::Running;
                true
            }
            _ => false,
        }
    }

    /// Records the outcome of a started node.
    pub fn finish(&self, succeeded: bool) {
        if let Ok(mut state) = self.state.lock() {
            if *state == NodeState::Running {
                *state = if succeeded {
                    NodeState::Completed
                } else {
                    NodeState::Error
                };
            }
        }
    }

    /// Runs the node and records its outcome. `None` when it was already started or the
    /// run was cancelled first.
    pub async fn run(
        &self,
        events: &EventBus,
        context: Option<&dyn ProcessorContext>,
        cancel: &CancellationToken,
    ) -> Option<Result<(), ExecutionError>> {
        if !self.try_start(cancel) {
            return None;
        }
        let result = run_node(&self.node, events, context, cancel).await;
        self.finish(result.is_ok());
        Some(result)
    }

    /// [`run`](Self::run) on its own task, so a panicking processor is reported against
    /// its node as an error event and [`ExecutionError::WorkerPanicked`].
    pub async fn run_isolated(
        &self,
        events: Arc<EventBus>,
        context: Option<Arc<dyn ProcessorContext>>,
        cancel: CancellationToken,
    ) -> Option<Result<(), ExecutionError>> {
        let runner = self.clone();
        let runner_events = Arc::clone(&events);
        let runner_context = context.clone();
        let handle = tokio::spawn(async move {
            runner
                .run(&runner_events, runner_context.as_deref(), &cancel)
                .await
        });

        match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                self.finish(false);
                let reason = join_error.to_string();
                ProcessorPanicked {
                    node: self.name(),
                    reason: &reason,
                }
                .log();
                events.notify(
                    &node_event(EventKind::Error, &self.node, context.as_deref())
                        .with_error(reason.clone()),
                );
                Some(Err(ExecutionError::WorkerPanicked {
                    node: self.name().to_string(),
                    reason,
                }))
            }
        }
    }
}

/// The nodes one launch covers, upstream first.
#[derive(Debug)]
pub struct LaunchPlan {
    pub nodes: Vec<ScheduledNode>,
    /// Nodes whose seeded output is reused instead of executed
    pub skipped_cached: Vec<String>,
}

impl LaunchPlan {
    /// Every node for a full run, or `target` plus its ancestors for a partial one.
    ///
    /// Only a partial run reuses outputs seeded ahead of time, and never for `target`
    /// itself.
    pub fn new(graph: &ProcessorGraph, target: Option<&str>) -> Result<Self, ExecutionError> {
        let scope: HashSet<String> = match target {
            Some(target) => {
                if !graph.contains(target) {
                    return Err(ExecutionError::UnknownTarget(target.to_string()));
                }
                let mut scope = graph.ancestors(target);
                scope.insert(target.to_string());
                scope
            }
            None => graph.order().iter().cloned().collect(),
        };

        let mut plan = Self {
            nodes: Vec::with_capacity(scope.len()),
            skipped_cached: Vec::new(),
        };
        for node in graph.nodes().filter(|n| scope.contains(n.name())) {
            let reuse = target.is_some_and(|t| t != node.name()) && node.is_finished();
            if reuse {
                CachedNodeReused { node: node.name() }.log();
                plan.skipped_cached.push(node.name().to_string());
                plan.nodes.push(ScheduledNode::cached(Arc::clone(node)));
            } else {
                plan.nodes.push(ScheduledNode::new(Arc::clone(node)));
            }
        }
        Ok(plan)
    }

    /// Names still to execute.
    pub fn pending(&self) -> HashSet<String> {
        self.nodes
            .iter()
            .filter(|n| n.state() != NodeState::Completed)
            .map(|n| n.name().to_string())
            .collect()
    }
}

/// Executes one node: announces it, calls `process`, stores the output and reports the
/// outcome. Shared by every launcher.
pub async fn run_node(
    node: &ProcessorNode,
    events: &EventBus,
    context: Option<&dyn ProcessorContext>,
    cancel: &CancellationToken,
) -> Result<(), ExecutionError> {
    let start_msg = ProcessorExecutionStarted {
        node: node.name(),
        processor_type: node.processor_type(),
        input_count: node.inputs().len(),
    };
    start_msg.log();
    let span = start_msg.span("processor_execution");
    events.notify(&node_event(EventKind::CurrentNodeRunning, node, context));

    let started = Instant::now();
    let invocation = Invocation::new(node, events, context, cancel);
    let result = node
        .processor()
        .process(&invocation)
        .instrument(span)
        .await;
    let duration = started.elapsed();

    match result {
        Ok(output) => {
            let reported = output.to_value();
            let output_slots = output.len();
            node.set_output(output);

            ProcessorExecutionCompleted {
                node: node.name(),
                output_slots,
                duration,
            }
            .log();
            events.notify(
                &node_event(EventKind::Progress, node, context)
                    .with_output(reported, true)
                    .with_duration(duration),
            );
            Ok(())
        }
        Err(error) => {
            ProcessorExecutionFailed {
                node: node.name(),
                error: &error,
            }
            .log();
            events.notify(
                &node_event(EventKind::Error, node, context)
                    .with_error(error.to_string())
                    .with_duration(duration),
            );
            Err(ExecutionError::from_processor(node.name(), &error))
        }
    }
}
