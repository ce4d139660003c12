// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of a flow description.
//!
//! Runs before any processor is constructed, in three stages:
//!
//! 1. **Uniqueness**: every node name appears once
//! 2. **References**: every `inputNode` names a node of the flow
//! 3. **Cycle detection**: DFS with a recursion stack, reporting the cycle path
//!
//! Cycle detection needs a well-formed graph, so it only runs when the first two
//! stages found nothing. Every error the stages find is returned together.
//!
//! # Example
//! ```json
//! [
//!   {"name": "a", "processorType": "input-text", "inputText": "hi"},
//!   {"name": "b", "processorType": "display", "inputs": [{"inputNode": "a"}]}
//! ]
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use crate::config::NodeConfig;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    CyclicDependencyDetected, DuplicateNodeName, UnresolvedInput, ValidationCompleted,
    ValidationFailed, ValidationStarted,
};
use crate::observability::messages::StructuredLog;

/// Validates names, input references and acyclicity of `flow`.
///
/// # Returns
///
/// * `Ok(())` - the flow can be linked
/// * `Err(Vec<ValidationError>)` - every problem found
pub fn validate_flow(flow: &[NodeConfig]) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        node_count: flow.len(),
    }
    .log();

    let mut errors = Vec::new();

    if let Err(mut e) = validate_unique_names(flow) {
        errors.append(&mut e);
    }
    if let Err(mut e) = validate_input_references(flow) {
        errors.append(&mut e);
    }

    if errors.is_empty() {
        if let Err(mut e) = validate_acyclic(flow) {
            errors.append(&mut e);
        }
    }

    if errors.is_empty() {
        ValidationCompleted {
            node_count: flow.len(),
            root_count: flow.iter().filter(|n| n.inputs.is_empty()).count(),
        }
        .log();
        Ok(())
    } else {
        ValidationFailed {
            error_count: errors.len(),
        }
        .log();
        Err(errors)
    }
}

fn validate_unique_names(flow: &[NodeConfig]) -> Result<(), Vec<ValidationError>> {
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for node in flow {
        if !seen.insert(node.name.as_str()) {
            DuplicateNodeName { node: &node.name }.log();
            errors.push(ValidationError::DuplicateNodeName {
                node: node.name.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_input_references(flow: &[NodeConfig]) -> Result<(), Vec<ValidationError>> {
    let names: HashSet<&str> = flow.iter().map(|n| n.name.as_str()).collect();
    let mut errors = Vec::new();

    for node in flow {
        for input in &node.inputs {
            if !names.contains(input.input_node.as_str()) {
                UnresolvedInput {
                    node: &node.name,
                    missing_input: &input.input_node,
                }
                .log();
                errors.push(ValidationError::UnresolvedInput {
                    node: node.name.clone(),
                    missing_input: input.input_node.clone(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Forward adjacency (upstream -> downstream), keyed and ordered by flow position.
fn downstream_edges(flow: &[NodeConfig]) -> Vec<Vec<usize>> {
    let position: HashMap<&str, usize> = flow
        .iter()
        .enumerate()
        .map(|(i, n)| (n.name.as_str(), i))
        .collect();

    let mut edges = vec![Vec::new(); flow.len()];
    for (i, node) in flow.iter().enumerate() {
        for input in &node.inputs {
            if let Some(&upstream) = position.get(input.input_node.as_str()) {
                edges[upstream].push(i);
            }
        }
    }
    edges
}

/// Three-colour DFS. A node met again while still on the recursion stack closes a cycle;
/// the reported path starts at that node and repeats it at the end.
fn validate_acyclic(flow: &[NodeConfig]) -> Result<(), Vec<ValidationError>> {
    let edges = downstream_edges(flow);
    let mut visited = vec![false; flow.len()];
    let mut on_stack = vec![false; flow.len()];
    let mut path = Vec::new();

    for start in 0..flow.len() {
        if visited[start] {
            continue;
        }
        if let Some(cycle) = find_cycle(start, &edges, &mut visited, &mut on_stack, &mut path) {
            let cycle: Vec<String> = cycle.into_iter().map(|i| flow[i].name.clone()).collect();
            CyclicDependencyDetected { cycle: &cycle }.log();
            return Err(vec![ValidationError::CyclicDependency { cycle }]);
        }
    }

    Ok(())
}

fn find_cycle(
    node: usize,
    edges: &[Vec<usize>],
    visited: &mut [bool],
    on_stack: &mut [bool],
    path: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    visited[node] = true;
    on_stack[node] = true;
    path.push(node);

    for &next in &edges[node] {
        if !visited[next] {
            if let Some(cycle) = find_cycle(next, edges, visited, on_stack, path) {
                return Some(cycle);
            }
        } else if on_stack[next] {
            let start = path.iter().position(|&p| p == next).unwrap_or(0);
            let mut cycle = path[start..].to_vec();
            cycle.push(next);
            return Some(cycle);
        }
    }

    on_stack[node] = false;
    path.pop();
    None
}

/// Kahn's algorithm over `flow`, upstream first.
///
/// Among nodes that become ready together, flow order is kept, so a flow that is already
/// topologically sorted comes back unchanged. Returns `None` when the flow has a cycle.
/// References to unknown nodes are ignored; run [`validate_flow`] first.
pub fn topological_order(flow: &[NodeConfig]) -> Option<Vec<usize>> {
    let edges = downstream_edges(flow);
    let mut in_degree = vec![0usize; flow.len()];
    for targets in &edges {
        for &t in targets {
            in_degree[t] += 1;
        }
    }

    let mut ready: VecDeque<usize> = (0..flow.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(flow.len());

    while let Some(node) = ready.pop_front() {
        order.push(node);
        let mut released: Vec<usize> = Vec::new();
        for &next in &edges[node] {
            in_degree[next] -= 1;
            if in_degree[next] == 0 {
                released.push(next);
            }
        }
        released.sort_unstable();
        released.dedup();
        ready.extend(released);
    }

    (order.len() == flow.len()).then_some(order)
}
