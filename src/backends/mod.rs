// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Processor implementations for the flowgraph engine.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process processors registered under their wire tags:
//! - **Inputs**: `input-text`, `document-to-text-processor`
//! - **Text**: `merger-prompt`, `replace-text-processor`, `data-splitter`
//! - **Pass-through**: `display`, `transition`
//!
//! ## Stub Backend (Test-Only)
//! Test doubles for launcher and linker development (only available in test builds):
//! - **EchoProcessor / FailingProcessor / PanickingProcessor / SleepingProcessor**: fixed outcomes
//! - **CancellableProcessor**: blocks until asked to cancel
//! - **RecordingObserver**, **StubNode**, **Timings**: graph construction and assertions
//!
//! # Architecture
//!
//! ```text
//! NodeConfig -> ProcessorRegistry -> Box<dyn Processor> -> ProcessorNode -> Launcher
//! ```
//!
//! Adding a node type means registering one more constructor:
//!
//! ```rust
//! use the_flowgraph::config::{BuildContext, NodeConfig, ProcessorRegistry};
//! use the_flowgraph::backends::local::DisplayProcessor;
//! use the_flowgraph::traits::Processor;
//!
//! let mut registry = ProcessorRegistry::with_builtins();
//! registry.register("preview", |_config, _ctx| {
//!     Ok(Box::new(DisplayProcessor) as Box<dyn Processor>)
//! });
//!
//! let processor = registry.create(&NodeConfig::new("p", "preview"), &BuildContext::default());
//! assert!(processor.is_ok());
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
