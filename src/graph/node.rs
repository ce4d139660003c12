// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::{Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use crate::config::{InputItem, NodeConfig};
use crate::errors::OutputError;
use crate::graph::Output;
use crate::traits::Processor;

/// A runtime node: identity, wiring, the processor and the output it produced.
///
/// Upstream nodes are held by `Arc` and positionally aligned with `inputs`. Nodes are
/// built upstream-first so the wiring is fixed at construction.
pub struct ProcessorNode {
    name: String,
    processor_type: String,
    inputs: Vec<InputItem>,
    params: Map<String, Value>,
    input_processors: Vec<Arc<ProcessorNode>>,
    processor: Box<dyn Processor>,
    output: RwLock<Option<Output>>,
    finished: AtomicBool,
}

impl ProcessorNode {
    /// Wires a node. `input_processors` must line up with `config.inputs`.
    pub fn new(
        config: &NodeConfig,
        processor: Box<dyn Processor>,
        input_processors: Vec<Arc<ProcessorNode>>,
    ) -> Self {
        debug_assert_eq!(config.inputs.len(), input_processors.len());
        Self {
            name: config.name.clone(),
            processor_type: config.processor_type.clone(),
            inputs: config.inputs.clone(),
            params: config.params.clone(),
            input_processors,
            processor,
            output: RwLock::new(None),
            finished: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn processor_type(&self) -> &str {
        &self.processor_type
    }

    pub fn inputs(&self) -> &[InputItem] {
        &self.inputs
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn processor(&self) -> &dyn Processor {
        self.processor.as_ref()
    }

    pub fn input_processors(&self) -> &[Arc<ProcessorNode>] {
        &self.input_processors
    }

    /// Names of the direct ancestors.
    pub fn ancestor_names(&self) -> impl Iterator<Item = &str> {
        self.input_processors.iter().map(|p| p.name())
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    pub fn has_dynamic_behavior(&self) -> bool {
        self.processor.has_dynamic_behavior()
    }

    /// The full output, unchanged.
    pub fn output(&self) -> Result<Output, OutputError> {
        self.output
            .read()
            .ok()
            .and_then(|o| o.clone())
            .ok_or_else(|| OutputError::NotProduced {
                node: self.name.clone(),
            })
    }

    /// A single slot of the output.
    pub fn get_output(&self, index: i64) -> Result<Value, OutputError> {
        let output = self.output()?;
        output
            .slot(index)
            .cloned()
            .ok_or_else(|| OutputError::IndexOutOfBounds {
                node: self.name.clone(),
                index,
                len: output.len(),
            })
    }

    /// Slot `key` when given, otherwise the whole output as one value.
    pub fn get_output_at(&self, key: Option<i64>) -> Result<Value, OutputError> {
        match key {
            Some(index) => self.get_output(index),
            None => self.output().map(|o| o.to_value()),
        }
    }

    /// Stores the output and marks the node finished.
    pub fn set_output(&self, output: impl Into<Output>) {
        if let Ok(mut slot) = self.output.write() {
            *slot = Some(output.into());
        }
        self.finished.store(true, Ordering::Release);
    }

    /// Resolves a named input.
    ///
    /// When an upstream node is wired under `name`, its live output (at the edge's key)
    /// wins; otherwise the node's own static parameter, then `default`.
    pub fn get_input_by_name(
        &self,
        name: &str,
        default: Option<Value>,
    ) -> Result<Option<Value>, OutputError> {
        for (input, upstream) in self.inputs.iter().zip(&self.input_processors) {
            if input.input_name.as_deref() == Some(name) {
                return upstream.get_output_at(input.input_node_output_key).map(Some);
            }
        }
        Ok(self.params.get(name).cloned().or(default))
    }

    /// Value of the `position`-th input edge, reading slot 0 when the edge has no key.
    pub fn input_value(&self, position: usize) -> Option<Result<Value, OutputError>> {
        let input = self.inputs.get(position)?;
        let upstream = self.input_processors.get(position)?;
        Some(upstream.get_output(input.input_node_output_key.unwrap_or(0)))
    }
}

impl std::fmt::Debug for ProcessorNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessorNode")
            .field("name", &self.name)
            .field("processor_type", &self.processor_type)
            .field("inputs", &self.ancestor_names().collect::<Vec<_>>())
            .field("finished", &self.is_finished())
            .finish()
    }
}
