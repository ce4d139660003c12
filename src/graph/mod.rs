// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The wired runtime graph.
//!
//! A [`ProcessorGraph`] is produced by the linker (`config::link`, `config::link_for_node`)
//! and consumed by a launcher. Edges are implied by each node's `input_processors`.

mod invocation;
mod node;
pub mod output;

pub use invocation::Invocation;
pub(crate) use invocation::node_event;
pub use node::ProcessorNode;
pub use output::Output;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::events::EventBus;
use crate::traits::{Observer, ProcessorContext};

/// Nodes by name plus a topological order over them.
pub struct ProcessorGraph {
    nodes: HashMap<String, Arc<ProcessorNode>>,
    order: Vec<String>,
    events: Arc<EventBus>,
    context: Option<Arc<dyn ProcessorContext>>,
}

impl ProcessorGraph {
    /// `nodes` must be in topological order (upstream first).
    pub fn new(nodes: Vec<Arc<ProcessorNode>>) -> Self {
        let order = nodes.iter().map(|n| n.name().to_string()).collect();
        let nodes = nodes
            .into_iter()
            .map(|n| (n.name().to_string(), n))
            .collect();
        Self {
            nodes,
            order,
            events: Arc::new(EventBus::new()),
            context: None,
        }
    }

    pub fn with_context(mut self, context: Arc<dyn ProcessorContext>) -> Self {
        self.context = Some(context);
        self
    }

    pub fn add_observer(&self, observer: Arc<dyn Observer>) {
        self.events.add_observer(observer);
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    pub fn context(&self) -> Option<&Arc<dyn ProcessorContext>> {
        self.context.as_ref()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ProcessorNode>> {
        self.nodes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node names, upstream first.
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Nodes, upstream first.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<ProcessorNode>> {
        self.order.iter().filter_map(|name| self.nodes.get(name))
    }

    /// Transitive ancestors of `target`, excluding `target`. Cycle-safe.
    pub fn ancestors(&self, target: &str) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut stack: Vec<&Arc<ProcessorNode>> = self.nodes.get(target).into_iter().collect();

        while let Some(node) = stack.pop() {
            for upstream in node.input_processors() {
                if visited.insert(upstream.name().to_string()) {
                    stack.push(upstream);
                }
            }
        }
        visited.remove(target);
        visited
    }
}

impl std::fmt::Debug for ProcessorGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorGraph")
            .field("order", &self.order)
            .field("observers", &self.events.observer_count())
            .field("has_context", &self.context.is_some())
            .finish()
    }
}
