// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod data_splitter;
pub mod display;
pub mod document_to_text;
pub mod input_text;
pub mod merger_prompt;
pub mod replace_text;

pub use data_splitter::DataSplitterProcessor;
pub use display::{DisplayProcessor, TransitionProcessor};
pub use document_to_text::{DocumentLoader, DocumentToTextProcessor};
pub use input_text::InputTextProcessor;
pub use merger_prompt::MergerPromptProcessor;
pub use replace_text::ReplaceTextProcessor;
