// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process processors and their registration under wire tags.

pub mod processors;

pub use processors::*;

use crate::config::ProcessorRegistry;
use crate::traits::Processor;

/// Registers every built-in processor type.
pub fn register_builtins(registry: &mut ProcessorRegistry) {
    registry
        .register(InputTextProcessor::TYPE, |config, _ctx| {
            Ok(Box::new(InputTextProcessor::from_config(config)?) as Box<dyn Processor>)
        })
        .register(MergerPromptProcessor::TYPE, |_config, _ctx| {
            Ok(Box::new(MergerPromptProcessor) as Box<dyn Processor>)
        })
        .register(DisplayProcessor::TYPE, |_config, _ctx| {
            Ok(Box::new(DisplayProcessor) as Box<dyn Processor>)
        })
        .register(TransitionProcessor::TYPE, |_config, _ctx| {
            Ok(Box::new(TransitionProcessor) as Box<dyn Processor>)
        })
        .register(DataSplitterProcessor::TYPE, |config, _ctx| {
            Ok(Box::new(DataSplitterProcessor::from_config(config)?) as Box<dyn Processor>)
        })
        .register(ReplaceTextProcessor::TYPE, |_config, _ctx| {
            Ok(Box::new(ReplaceTextProcessor) as Box<dyn Processor>)
        })
        .register(DocumentToTextProcessor::TYPE, |_config, ctx| {
            let processor =
                DocumentToTextProcessor::from_context(ctx).map_err(|e| e.to_string())?;
            Ok(Box::new(processor) as Box<dyn Processor>)
        });
}
