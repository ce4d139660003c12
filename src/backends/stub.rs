// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test doubles for processors, observers and hand-built graphs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

use crate::config::{InputItem, NodeConfig};
use crate::errors::ProcessorError;
use crate::events::{EventKind, ProcessorEvent};
use crate::graph::{Invocation, Output, ProcessorGraph, ProcessorNode};
use crate::traits::{Observer, Processor};

/// Outputs its label.
pub struct EchoProcessor {
    label: String,
}

impl EchoProcessor {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

#[async_trait]
impl Processor for EchoProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        Ok(Output::from(self.label.as_str()))
    }

    fn name(&self) -> &'static str {
        "echo"
    }
}

/// Always fails with the given message.
pub struct FailingProcessor {
    message: String,
}

impl FailingProcessor {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Processor for FailingProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        Err(ProcessorError::failed(self.message.clone()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

/// Panics with the given message.
pub struct PanickingProcessor {
    message: String,
}

impl PanickingProcessor {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

#[async_trait]
impl Processor for PanickingProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        panic!("{}", self.message);
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Sleeps, then outputs its label.
pub struct SleepingProcessor {
    label: String,
    delay: Duration,
}

impl SleepingProcessor {
    pub fn new(label: &str, delay: Duration) -> Self {
        Self {
            label: label.to_string(),
            delay,
        }
    }
}

#[async_trait]
impl Processor for SleepingProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        tokio::time::sleep(self.delay).await;
        Ok(Output::from(self.label.as_str()))
    }

    fn name(&self) -> &'static str {
        "sleeping"
    }
}

/// Blocks until `cancel` is called, ignoring the cancellation token.
///
/// Proves that a launcher reaches the processor itself rather than relying on the token.
pub struct CancellableProcessor {
    released: Notify,
    cancel_calls: Arc<AtomicUsize>,
}

impl CancellableProcessor {
    pub fn new() -> Self {
        Self {
            released: Notify::new(),
            cancel_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn cancel_calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.cancel_calls)
    }
}

impl Default for CancellableProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for CancellableProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        self.released.notified().await;
        Err(ProcessorError::Cancelled)
    }

    async fn cancel(&self) {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        // notify_one stores a permit when process has not started waiting yet.
        self.released.notify_one();
    }

    fn name(&self) -> &'static str {
        "cancellable"
    }

    fn has_dynamic_behavior(&self) -> bool {
        true
    }
}

/// Emits each chunk as a streaming event, then outputs them concatenated.
pub struct StreamingProcessor {
    chunks: Vec<String>,
}

impl StreamingProcessor {
    pub fn new(chunks: &[&str]) -> Self {
        Self {
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
        }
    }
}

#[async_trait]
impl Processor for StreamingProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        for chunk in &self.chunks {
            invocation.emit_streaming(chunk.as_str());
            tokio::task::yield_now().await;
        }
        Ok(Output::from(self.chunks.concat()))
    }

    fn name(&self) -> &'static str {
        "streaming"
    }
}

/// Keeps every event it is notified of.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ProcessorEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProcessorEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn events_for(&self, node: &str) -> Vec<ProcessorEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.instance_name == node)
            .collect()
    }

    pub fn kinds_for(&self, node: &str) -> Vec<EventKind> {
        self.events_for(node).iter().map(|e| e.kind).collect()
    }
}

impl Observer for RecordingObserver {
    fn notify(&self, event: &ProcessorEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct Span {
    started: Option<Instant>,
    finished: Option<Instant>,
    calls: usize,
}

/// Start/finish instants and call counts of the processors built by
/// [`StubNode::timed_graph`].
#[derive(Clone, Default)]
pub struct Timings {
    spans: Arc<Mutex<HashMap<String, Span>>>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl Timings {
    fn span(&self, name: &str) -> Span {
        self.spans
            .lock()
            .ok()
            .and_then(|s| s.get(name).copied())
            .unwrap_or_default()
    }

    pub fn started(&self, name: &str) -> Instant {
        self.span(name)
            .started
            .unwrap_or_else(|| panic!("{} never started", name))
    }

    pub fn finished(&self, name: &str) -> Instant {
        self.span(name)
            .finished
            .unwrap_or_else(|| panic!("{} never finished", name))
    }

    pub fn calls(&self, name: &str) -> usize {
        self.span(name).calls
    }

    /// Highest number of timed processors seen running at once.
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self, name: &str) {
        if let Ok(mut spans) = self.spans.lock() {
            let span = spans.entry(name.to_string()).or_default();
            span.calls += 1;
            span.started = Some(Instant::now());
        }
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self, name: &str) {
        self.running.fetch_sub(1, Ordering::SeqCst);
        if let Ok(mut spans) = self.spans.lock() {
            spans.entry(name.to_string()).or_default().finished = Some(Instant::now());
        }
    }
}

struct TimedProcessor {
    label: String,
    delay: Duration,
    timings: Timings,
}

#[async_trait]
impl Processor for TimedProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        self.timings.enter(&self.label);
        tokio::time::sleep(self.delay).await;
        self.timings.leave(&self.label);
        Ok(Output::from(self.label.as_str()))
    }

    fn name(&self) -> &'static str {
        "timed"
    }
}

/// A node description for [`graph_of`].
pub struct StubNode {
    config: NodeConfig,
    processor: Box<dyn Processor>,
}

impl StubNode {
    pub fn new(name: &str, processor: Box<dyn Processor>, inputs: &[&str]) -> Self {
        let config = inputs
            .iter()
            .fold(NodeConfig::new(name, "stub"), |config, input| {
                config.with_input(InputItem::new(*input))
            });
        Self { config, processor }
    }

    /// Nodes that sleep for the given milliseconds and record when they ran.
    pub fn timed_graph(specs: Vec<(&str, Vec<&str>, u64)>) -> (ProcessorGraph, Timings) {
        let timings = Timings::default();
        let nodes = specs
            .into_iter()
            .map(|(name, inputs, millis)| {
                let processor = TimedProcessor {
                    label: name.to_string(),
                    delay: Duration::from_millis(millis),
                    timings: timings.clone(),
                };
                StubNode::new(name, Box::new(processor), &inputs)
            })
            .collect();
        (graph_of(nodes), timings)
    }
}

/// Wires `nodes`, which must be listed upstream first.
pub fn graph_of(nodes: Vec<StubNode>) -> ProcessorGraph {
    let mut built: HashMap<String, Arc<ProcessorNode>> = HashMap::new();
    let mut ordered = Vec::with_capacity(nodes.len());

    for StubNode { config, processor } in nodes {
        let upstream = config
            .input_nodes()
            .map(|name| {
                built
                    .get(name)
                    .cloned()
                    .unwrap_or_else(|| panic!("'{}' must be listed before its consumers", name))
            })
            .collect();
        let node = Arc::new(ProcessorNode::new(&config, processor, upstream));
        built.insert(config.name.clone(), Arc::clone(&node));
        ordered.push(node);
    }

    ProcessorGraph::new(ordered)
}

/// A finished upstream node holding `output`.
pub fn finished_node(name: &str, output: impl Into<Output>) -> Arc<ProcessorNode> {
    let node = Arc::new(ProcessorNode::new(
        &NodeConfig::new(name, "stub"),
        Box::new(EchoProcessor::new(name)),
        vec![],
    ));
    node.set_output(output);
    node
}

/// Calls the node's processor once, outside any launcher.
pub async fn invoke(node: &ProcessorNode) -> Result<Output, ProcessorError> {
    let events = crate::events::EventBus::new();
    let cancel = tokio_util::sync::CancellationToken::new();
    let invocation = Invocation::new(node, &events, None, &cancel);
    node.processor().process(&invocation).await
}
