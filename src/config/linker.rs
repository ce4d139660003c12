// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Turns a flat flow description into a wired [`ProcessorGraph`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::config::validation::topological_order;
use crate::config::{validate_flow, BuildContext, NodeConfig, ProcessorRegistry};
use crate::errors::ValidationError;
use crate::graph::{ProcessorGraph, ProcessorNode};
use crate::observability::messages::processor::ProcessorInstantiationFailed;
use crate::observability::messages::StructuredLog;

/// Links every node of `flow`.
///
/// The flow is validated first; then one processor per node is built through `registry`
/// (upstream first) and wired to its inputs. Cached `outputData` is ignored: a full run
/// recomputes everything.
pub fn link(
    flow: &[NodeConfig],
    registry: &ProcessorRegistry,
    ctx: &BuildContext,
) -> Result<ProcessorGraph, Vec<ValidationError>> {
    validate_flow(flow)?;
    let selected: Vec<&NodeConfig> = flow.iter().collect();
    build(&selected, registry, ctx, |_| false)
}

/// Links `target` and its transitive ancestors only.
///
/// Every linked node other than `target` that carries `outputData` starts out finished
/// with that output, so a launcher never runs it again.
pub fn link_for_node(
    flow: &[NodeConfig],
    target: &str,
    registry: &ProcessorRegistry,
    ctx: &BuildContext,
) -> Result<ProcessorGraph, Vec<ValidationError>> {
    if !flow.iter().any(|n| n.name == target) {
        return Err(vec![ValidationError::UnknownTarget {
            target: target.to_string(),
        }]);
    }

    let closure = ancestor_closure(flow, target);
    let selected: Vec<&NodeConfig> = flow
        .iter()
        .filter(|n| closure.contains(n.name.as_str()))
        .collect();

    let owned: Vec<NodeConfig> = selected.iter().map(|n| (*n).clone()).collect();
    validate_flow(&owned)?;

    build(&selected, registry, ctx, |config| config.name != target)
}

/// Names reachable from `target` by walking `inputs` backwards, `target` included.
/// Unknown names are kept so validation can report them.
fn ancestor_closure<'a>(flow: &'a [NodeConfig], target: &'a str) -> HashSet<&'a str> {
    let by_name: HashMap<&str, &NodeConfig> =
        flow.iter().map(|n| (n.name.as_str(), n)).collect();

    let mut visited = HashSet::from([target]);
    let mut stack = vec![target];

    while let Some(name) = stack.pop() {
        let Some(config) = by_name.get(name) else {
            continue;
        };
        for upstream in config.input_nodes() {
            if visited.insert(upstream) {
                stack.push(upstream);
            }
        }
    }
    visited
}

fn build<F>(
    selected: &[&NodeConfig],
    registry: &ProcessorRegistry,
    ctx: &BuildContext,
    seed_cached: F,
) -> Result<ProcessorGraph, Vec<ValidationError>>
where
    F: Fn(&NodeConfig) -> bool,
{
    let owned: Vec<NodeConfig> = selected.iter().map(|n| (*n).clone()).collect();
    let order = topological_order(&owned).ok_or_else(|| {
        vec![ValidationError::CyclicDependency {
            cycle: owned.iter().map(|n| n.name.clone()).collect(),
        }]
    })?;

    let mut errors = Vec::new();
    let mut built: HashMap<&str, Arc<ProcessorNode>> = HashMap::new();
    let mut nodes = Vec::with_capacity(order.len());

    for index in order {
        let config = &owned[index];

        let processor = match registry.create(config, ctx) {
            Ok(processor) => processor,
            Err(e) => {
                ProcessorInstantiationFailed {
                    node: &config.name,
                    processor_type: &config.processor_type,
                    reason: &e.to_string(),
                }
                .log();
                errors.push(e);
                continue;
            }
        };

        // An upstream missing here failed to instantiate and is already reported.
        let upstream: Option<Vec<Arc<ProcessorNode>>> = config
            .input_nodes()
            .map(|name| built.get(name).cloned())
            .collect();
        let Some(upstream) = upstream else {
            continue;
        };

        let node = Arc::new(ProcessorNode::new(config, processor, upstream));
        if seed_cached(config) {
            if let Some(cached) = &config.output_data {
                node.set_output(cached.clone());
            }
        }

        built.insert(config.name.as_str(), Arc::clone(&node));
        nodes.push(node);
    }

    if errors.is_empty() {
        Ok(ProcessorGraph::new(nodes))
    } else {
        Err(errors)
    }
}
