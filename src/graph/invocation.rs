// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::errors::ProcessorError;
use crate::events::{EventBus, EventKind, ProcessorEvent};
use crate::graph::output::value_to_text;
use crate::graph::ProcessorNode;
use crate::traits::ProcessorContext;

/// What a processor sees during one `process` call.
pub struct Invocation<'a> {
    node: &'a ProcessorNode,
    events: &'a EventBus,
    context: Option<&'a dyn ProcessorContext>,
    cancel: &'a CancellationToken,
}

impl<'a> Invocation<'a> {
    pub fn new(
        node: &'a ProcessorNode,
        events: &'a EventBus,
        context: Option<&'a dyn ProcessorContext>,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            node,
            events,
            context,
            cancel,
        }
    }

    pub fn node(&self) -> &ProcessorNode {
        self.node
    }

    pub fn context(&self) -> Option<&dyn ProcessorContext> {
        self.context
    }

    /// Cancelled when the whole run is being cancelled.
    pub fn cancellation(&self) -> &CancellationToken {
        self.cancel
    }

    /// See [`ProcessorNode::get_input_by_name`].
    pub fn input(&self, name: &str) -> Result<Option<Value>, ProcessorError> {
        Ok(self.node.get_input_by_name(name, None)?)
    }

    pub fn input_or(&self, name: &str, default: Value) -> Result<Value, ProcessorError> {
        Ok(self
            .node
            .get_input_by_name(name, Some(default))?
            .unwrap_or(Value::Null))
    }

    /// A named input rendered as text, failing when it is absent.
    pub fn required_text(&self, name: &str) -> Result<String, ProcessorError> {
        match self.input(name)? {
            Some(value) if !value.is_null() => Ok(value_to_text(&value)),
            _ => Err(ProcessorError::failed(format!(
                "Missing required input '{}'",
                name
            ))),
        }
    }

    /// A named boolean input; accepts JSON booleans and "true"/"false" strings.
    pub fn flag(&self, name: &str, default: bool) -> Result<bool, ProcessorError> {
        Ok(match self.input(name)? {
            Some(Value::Bool(b)) => b,
            Some(Value::String(s)) => match s.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => default,
            },
            _ => default,
        })
    }

    /// Value of the first input edge, if the node has one.
    pub fn first_input(&self) -> Result<Option<Value>, ProcessorError> {
        match self.node.input_value(0) {
            Some(result) => Ok(Some(result?)),
            None => Ok(None),
        }
    }

    /// Values of every input edge, in `inputs` order.
    pub fn all_inputs(&self) -> Result<Vec<Value>, ProcessorError> {
        (0..self.node.inputs().len())
            .filter_map(|i| self.node.input_value(i))
            .map(|r| r.map_err(ProcessorError::from))
            .collect()
    }

    /// Reports an incremental output chunk. Chunks of one node arrive in emission order.
    pub fn emit_streaming(&self, chunk: impl Into<Value>) {
        let event = node_event(EventKind::Streaming, self.node, self.context)
            .with_output(chunk.into(), false);
        self.events.notify(&event);
    }
}

/// An event about `node`, carrying the caller identifiers when a context is bound.
pub(crate) fn node_event(
    kind: EventKind,
    node: &ProcessorNode,
    context: Option<&dyn ProcessorContext>,
) -> ProcessorEvent {
    let event = ProcessorEvent::new(kind, node.name(), node.processor_type());
    match context {
        Some(ctx) => event.with_caller(ctx.get_current_user_id(), ctx.get_session_id()),
        None => event,
    }
}
