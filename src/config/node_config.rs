// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Flow description data model.
//!
//! A flow is an ordered JSON array of node objects:
//!
//! ```json
//! [
//!   { "name": "a", "processorType": "input-text", "inputText": "hello" },
//!   { "name": "b", "processorType": "display",
//!     "inputs": [{ "inputNode": "a", "inputNodeOutputKey": 0 }] }
//! ]
//! ```
//!
//! Any key that is not part of the common node shape lands in [`NodeConfig::params`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::Output;

/// One edge into a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputItem {
    /// Parameter name this edge feeds, if the edge is named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_name: Option<String>,
    pub input_node: String,
    /// Slot of the upstream output to read; the whole output when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_node_output_key: Option<i64>,
}

impl InputItem {
    pub fn new(input_node: impl Into<String>) -> Self {
        Self {
            input_name: None,
            input_node: input_node.into(),
            input_node_output_key: None,
        }
    }

    pub fn named(mut self, input_name: impl Into<String>) -> Self {
        self.input_name = Some(input_name.into());
        self
    }

    pub fn key(mut self, key: i64) -> Self {
        self.input_node_output_key = Some(key);
        self
    }
}

/// Configuration of a single node as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub name: String,
    pub processor_type: String,
    #[serde(default)]
    pub inputs: Vec<InputItem>,
    /// Previously computed result; seeds the node on partial re-runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Output>,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl NodeConfig {
    pub fn new(name: impl Into<String>, processor_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            processor_type: processor_type.into(),
            inputs: Vec::new(),
            output_data: None,
            params: Map::new(),
        }
    }

    pub fn with_input(mut self, input: InputItem) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn with_output_data(mut self, output: impl Into<Output>) -> Self {
        self.output_data = Some(output.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Names of the upstream nodes, in `inputs` order (duplicates kept).
    pub fn input_nodes(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.input_node.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_camel_case_and_params() {
        let raw = json!({
            "name": "merge",
            "processorType": "merger-prompt",
            "inputs": [
                { "inputNode": "a" },
                { "inputName": "prompt", "inputNode": "b", "inputNodeOutputKey": 1 }
            ],
            "prompt": "${input-1} and ${input-2}",
            "x": 10
        });

        let config: NodeConfig = serde_json::from_value(raw).unwrap();

        assert_eq!(config.processor_type, "merger-prompt");
        assert_eq!(config.inputs.len(), 2);
        assert_eq!(config.inputs[1].input_name.as_deref(), Some("prompt"));
        assert_eq!(config.inputs[1].input_node_output_key, Some(1));
        assert_eq!(config.param("x"), Some(&json!(10)));
        assert!(config.param("name").is_none());
        assert!(config.output_data.is_none());
    }

    #[test]
    fn test_output_data_null_and_list() {
        let config: NodeConfig = serde_json::from_value(json!({
            "name": "a", "processorType": "input-text", "outputData": null
        }))
        .unwrap();
        assert!(config.output_data.is_none());

        let config: NodeConfig = serde_json::from_value(json!({
            "name": "a", "processorType": "input-text", "outputData": ["x", "y"]
        }))
        .unwrap();
        assert_eq!(config.output_data.map(|o| o.len()), Some(2));
    }
}
