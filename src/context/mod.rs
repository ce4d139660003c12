// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! [`ProcessorContext`] implementations.
//!
//! How values get populated (request headers, a signed session, the environment) is up to
//! whoever builds the context; processors only read it.

use std::collections::BTreeMap;

use crate::traits::ProcessorContext;

/// A fixed set of parameters plus optional caller identifiers.
#[derive(Debug, Clone, Default)]
pub struct StaticContext {
    values: BTreeMap<String, String>,
    user_id: Option<String>,
    session_id: Option<String>,
}

impl StaticContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }
}

impl ProcessorContext for StaticContext {
    fn get_value(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned()
    }

    fn get_current_user_id(&self) -> Option<String> {
        self.user_id.clone()
    }

    fn get_session_id(&self) -> Option<String> {
        self.session_id.clone()
    }

    fn get_parameter_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

/// Snapshot of environment variables starting with a prefix.
///
/// `FLOWGRAPH_OPENAI_API_KEY` with prefix `FLOWGRAPH_` is exposed as `openai_api_key`.
#[derive(Debug, Clone)]
pub struct EnvContext {
    values: BTreeMap<String, String>,
}

impl EnvContext {
    pub const DEFAULT_PREFIX: &'static str = "FLOWGRAPH_";

    pub fn from_env(prefix: &str) -> Self {
        Self::from_vars(prefix, std::env::vars())
    }

    /// Builds from an explicit variable list.
    pub fn from_vars(prefix: &str, vars: impl IntoIterator<Item = (String, String)>) -> Self {
        let values = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_lowercase(), value))
            })
            .collect();
        Self { values }
    }
}

impl ProcessorContext for EnvContext {
    fn get_value(&self, name: &str) -> Option<String> {
        self.values.get(&name.to_lowercase()).cloned()
    }

    fn get_current_user_id(&self) -> Option<String> {
        None
    }

    fn get_session_id(&self) -> Option<String> {
        None
    }

    fn get_parameter_names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_context() {
        let ctx = StaticContext::new()
            .with_value("openai_api_key", "sk-1")
            .with_value("region", "eu")
            .with_user_id("u-42")
            .with_session_id("s-1");

        assert_eq!(ctx.get_value("region").as_deref(), Some("eu"));
        assert_eq!(ctx.get_api_key_for_provider("OpenAI").as_deref(), Some("sk-1"));
        assert_eq!(ctx.get_current_user_id().as_deref(), Some("u-42"));
        assert_eq!(ctx.get_session_id().as_deref(), Some("s-1"));
        assert_eq!(ctx.get_parameter_names(), vec!["openai_api_key", "region"]);
        assert!(ctx.get_api_key_for_provider("anthropic").is_none());
    }

    #[test]
    fn test_env_context_filters_by_prefix() {
        let vars = vec![
            ("FLOWGRAPH_OPENAI_API_KEY".to_string(), "sk-env".to_string()),
            ("FLOWGRAPH_".to_string(), "ignored".to_string()),
            ("PATH".to_string(), "/usr/bin".to_string()),
        ];

        let ctx = EnvContext::from_vars(EnvContext::DEFAULT_PREFIX, vars);

        assert_eq!(ctx.get_api_key_for_provider("openai").as_deref(), Some("sk-env"));
        assert_eq!(ctx.get_parameter_names(), vec!["openai_api_key"]);
        assert!(ctx.get_value("path").is_none());
        assert!(ctx.get_current_user_id().is_none());
    }
}
