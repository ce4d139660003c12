// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::config::NodeConfig;
use crate::errors::ProcessorError;
use crate::graph::output::value_to_text;
use crate::graph::{Invocation, Output};
use crate::traits::Processor;

/// Outputs the text typed into the node.
#[derive(Debug, Clone)]
pub struct InputTextProcessor {
    text: String,
}

impl InputTextProcessor {
    pub const TYPE: &'static str = "input-text";

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Requires an `inputText` parameter; an empty string is fine.
    pub fn from_config(config: &NodeConfig) -> Result<Self, String> {
        config
            .param("inputText")
            .map(|value| Self::new(value_to_text(value)))
            .ok_or_else(|| "missing required parameter 'inputText'".to_string())
    }
}

#[async_trait]
impl Processor for InputTextProcessor {
    async fn process(&self, _invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        Ok(Output::from(self.text.as_str()))
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::invoke;
    use crate::graph::ProcessorNode;
    use serde_json::json;

    #[tokio::test]
    async fn test_outputs_configured_text() {
        let config = NodeConfig::new("a", "input-text").with_param("inputText", "hello");
        let processor = InputTextProcessor::from_config(&config).unwrap();
        let node = ProcessorNode::new(&config, Box::new(processor), vec![]);

        assert_eq!(invoke(&node).await.unwrap(), Output::from("hello"));
    }

    #[test]
    fn test_from_config() {
        let cases = vec![(json!("text"), "text"), (json!(""), ""), (json!(12), "12")];
        for (value, expected) in cases {
            let config = NodeConfig::new("a", "input-text").with_param("inputText", value);
            let processor = InputTextProcessor::from_config(&config).unwrap();
            assert_eq!(processor.text, expected);
        }

        let err = InputTextProcessor::from_config(&NodeConfig::new("a", "input-text")).unwrap_err();
        assert!(err.contains("inputText"));
    }
}
