// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::config::NodeConfig;
use crate::errors::ProcessorError;
use crate::graph::output::value_to_text;
use crate::graph::{Invocation, Output};
use crate::traits::Processor;

/// Splits the first upstream value into one output slot per part.
#[derive(Debug, Clone)]
pub struct DataSplitterProcessor {
    separator: String,
}

impl DataSplitterProcessor {
    pub const TYPE: &'static str = "data-splitter";
    pub const DEFAULT_SEPARATOR: &'static str = ",";

    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }

    /// Reads `splitChar`; the literal sequences `\n`, `\t` and `\r` stand for the control
    /// characters.
    pub fn from_config(config: &NodeConfig) -> Result<Self, String> {
        let raw = match config.param("splitChar") {
            None => Self::DEFAULT_SEPARATOR.to_string(),
            Some(value) => value_to_text(value),
        };
        let separator = interpret_escape(&raw);
        if separator.is_empty() {
            return Err("'splitChar' must not be empty".to_string());
        }
        Ok(Self::new(separator))
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

fn interpret_escape(separator: &str) -> String {
    match separator {
        "\\n" => "\n".to_string(),
        "\\t" => "\t".to_string(),
        "\\r" => "\r".to_string(),
        other => other.to_string(),
    }
}

#[async_trait]
impl Processor for DataSplitterProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        let data = invocation
            .first_input()?
            .ok_or_else(|| ProcessorError::failed("Nothing to split: no input is connected"))?;

        let parts: Vec<String> = value_to_text(&data)
            .split(self.separator.as_str())
            .map(str::to_string)
            .collect();
        Ok(Output::from(parts))
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }
}
