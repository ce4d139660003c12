// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use regex::{NoExpand, Regex, RegexBuilder};

use crate::errors::ProcessorError;
use crate::graph::output::value_to_text;
use crate::graph::{Invocation, Output};
use crate::observability::messages::processor::InvalidSearchPattern;
use crate::observability::messages::StructuredLog;
use crate::traits::Processor;

/// How one replacement is carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplaceOptions {
    pub replace_all: bool,
    pub use_regex: bool,
    pub case_sensitive: bool,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            replace_all: true,
            use_regex: false,
            case_sensitive: true,
        }
    }
}

/// Search and replace over a text.
///
/// Every parameter is a named input, so each can be typed into the node or wired from
/// upstream. In regex mode the replacement may reference groups as `$1` or `${name}`;
/// otherwise it is inserted literally. An invalid pattern leaves the text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceTextProcessor;

impl ReplaceTextProcessor {
    pub const TYPE: &'static str = "replace-text-processor";
}

/// Applies one replacement. `Err` carries the regex compile error.
pub fn replace_text(
    input: &str,
    search: &str,
    replacement: &str,
    options: &ReplaceOptions,
) -> Result<String, regex::Error> {
    if !options.use_regex && options.case_sensitive {
        return Ok(if options.replace_all {
            input.replace(search, replacement)
        } else {
            input.replacen(search, replacement, 1)
        });
    }

    let pattern = if options.use_regex {
        search.to_string()
    } else {
        regex::escape(search)
    };
    let regex: Regex = RegexBuilder::new(&pattern)
        .case_insensitive(!options.case_sensitive)
        .build()?;
    let limit = if options.replace_all { 0 } else { 1 };

    Ok(if options.use_regex {
        regex.replacen(input, limit, replacement).into_owned()
    } else {
        regex.replacen(input, limit, NoExpand(replacement)).into_owned()
    })
}

#[async_trait]
impl Processor for ReplaceTextProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        let input = invocation.required_text("input_text")?;
        let search = invocation.required_text("search_text")?;
        let replacement = invocation
            .input("replacement_text")?
            .map(|v| value_to_text(&v))
            .unwrap_or_default();
        let options = ReplaceOptions {
            replace_all: invocation.flag("replace_all", true)?,
            use_regex: invocation.flag("use_regex", false)?,
            case_sensitive: invocation.flag("case_sensitivity", true)?,
        };

        let result = match replace_text(&input, &search, &replacement, &options) {
            Ok(result) => result,
            Err(e) => {
                InvalidSearchPattern {
                    node: invocation.node().name(),
                    pattern: &search,
                    reason: &e.to_string(),
                }
                .log();
                input
            }
        };

        Ok(Output::from(vec![result]))
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }
}
