// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ProcessorError;
use crate::graph::{Invocation, Output};

/// The business logic of one node.
///
/// `process` reads its inputs through the [`Invocation`] and returns what the node produced;
/// the launcher stores it on the node and reports it. It may emit streaming
/// chunks along the way but never talks to a transport itself.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError>;

    /// Best-effort abort of in-flight external work.
    ///
    /// Must be safe to call before `process` starts and after it finished.
    async fn cancel(&self) {}

    fn name(&self) -> &'static str;

    /// Whether cost and duration are unpredictable (third-party calls).
    fn has_dynamic_behavior(&self) -> bool {
        false
    }
}
