// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::Serialize;
use serde_json::Value;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// The occasions a node reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A node began executing
    CurrentNodeRunning,
    /// A node produced its final output
    Progress,
    /// A node produced an incremental chunk
    Streaming,
    /// A node failed
    Error,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::CurrentNodeRunning => "current_node_running",
            EventKind::Progress => "progress",
            EventKind::Streaming => "streaming",
            EventKind::Error => "error",
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lifecycle record, created per emission and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorEvent {
    pub kind: EventKind,
    pub instance_name: String,
    pub processor_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_done: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<f64>,
}

impl ProcessorEvent {
    pub fn new(kind: EventKind, instance_name: &str, processor_type: &str) -> Self {
        Self {
            kind,
            instance_name: instance_name.to_string(),
            processor_type: processor_type.to_string(),
            user_id: None,
            session_id: None,
            output: None,
            error: None,
            is_done: None,
            duration_seconds: None,
        }
    }

    pub fn with_caller(mut self, user_id: Option<String>, session_id: Option<String>) -> Self {
        self.user_id = user_id;
        self.session_id = session_id;
        self
    }

    pub fn with_output(mut self, output: Value, is_done: bool) -> Self {
        self.output = Some(output);
        self.is_done = Some(is_done);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_seconds = Some(duration.as_secs_f64());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialized_shape() {
        let event = ProcessorEvent::new(EventKind::Progress, "b", "display")
            .with_caller(Some("u1".into()), None)
            .with_output(json!(["x"]), true)
            .with_duration(Duration::from_millis(1500));

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({
                "kind": "progress",
                "instanceName": "b",
                "processorType": "display",
                "userId": "u1",
                "output": ["x"],
                "isDone": true,
                "durationSeconds": 1.5
            })
        );
    }

    #[test]
    fn test_error_event_omits_output() {
        let event = ProcessorEvent::new(EventKind::Error, "b", "display").with_error("boom");
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["kind"], json!("error"));
        assert_eq!(value["error"], json!("boom"));
        assert!(value.get("output").is_none());
        assert!(value.get("isDone").is_none());
    }
}
