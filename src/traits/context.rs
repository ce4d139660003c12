// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Read-only, caller-scoped parameters handed to processors (credentials, identifiers).
pub trait ProcessorContext: Send + Sync {
    fn get_value(&self, name: &str) -> Option<String>;

    fn get_current_user_id(&self) -> Option<String>;

    fn get_session_id(&self) -> Option<String>;

    fn get_parameter_names(&self) -> Vec<String>;

    /// Looks up `<provider>_api_key`, lower-cased.
    fn get_api_key_for_provider(&self, provider: &str) -> Option<String> {
        self.get_value(&format!("{}_api_key", provider.to_lowercase()))
    }
}
