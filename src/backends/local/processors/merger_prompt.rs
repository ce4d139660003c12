// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProcessorError;
use crate::graph::output::value_to_text;
use crate::graph::{Invocation, Output};
use crate::traits::Processor;

/// Fills a prompt template with upstream values.
///
/// `prompt` is resolved like any named input (a wired edge wins over the static
/// parameter). Every other edge, in `inputs` order, is numbered from 1 and replaces the
/// `${input-N}` placeholders. Placeholders without a matching edge stay as they are.
#[derive(Debug, Clone, Copy, Default)]
pub struct MergerPromptProcessor;

impl MergerPromptProcessor {
    pub const TYPE: &'static str = "merger-prompt";
    const PROMPT: &'static str = "prompt";
}

#[async_trait]
impl Processor for MergerPromptProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        let mut prompt =
            value_to_text(&invocation.input_or(Self::PROMPT, Value::String(String::new()))?);

        let node = invocation.node();
        let values = node
            .inputs()
            .iter()
            .zip(node.input_processors())
            .filter(|(input, _)| input.input_name.as_deref() != Some(Self::PROMPT));

        for (idx, (input, upstream)) in values.enumerate() {
            let value = upstream.get_output_at(input.input_node_output_key)?;
            let placeholder = format!("${{input-{}}}", idx + 1);
            prompt = prompt.replace(&placeholder, &value_to_text(&value));
        }

        Ok(Output::from(prompt))
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }
}
