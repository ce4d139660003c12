// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pass-through nodes: both forward the first upstream output at its
//! `inputNodeOutputKey` (slot 0 when the edge has no key).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProcessorError;
use crate::graph::{Invocation, Output};
use crate::traits::Processor;

/// Shows an upstream value to the user. Outputs `null` when nothing is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayProcessor;

impl DisplayProcessor {
    pub const TYPE: &'static str = "display";
}

#[async_trait]
impl Processor for DisplayProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        Ok(Output::Single(invocation.first_input()?.unwrap_or(Value::Null)))
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }
}

/// Joins two parts of a flow. Outputs `""` when nothing is wired in.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransitionProcessor;

impl TransitionProcessor {
    pub const TYPE: &'static str = "transition";
}

#[async_trait]
impl Processor for TransitionProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        Ok(match invocation.first_input()? {
            Some(value) => Output::Single(value),
            None => Output::from(""),
        })
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }
}
