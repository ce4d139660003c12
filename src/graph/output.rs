// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The value a node produced.
///
/// A node either produces a single value or an ordered list of values
/// (e.g. a splitter). Slot addressing treats `Single(v)` as a one-element list.
///
/// Deserializes untagged: a JSON array becomes `Many`, anything else `Single`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Output {
    Many(Vec<Value>),
    Single(Value),
}

impl Output {
    /// Number of addressable slots.
    pub fn len(&self) -> usize {
        match self {
            Output::Single(_) => 1,
            Output::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slot at `index`, `None` when outside `[0, len)`.
    pub fn slot(&self, index: i64) -> Option<&Value> {
        let index = usize::try_from(index).ok()?;
        match self {
            Output::Single(value) if index == 0 => Some(value),
            Output::Single(_) => None,
            Output::Many(values) => values.get(index),
        }
    }

    /// The whole output as one JSON value.
    pub fn to_value(&self) -> Value {
        match self {
            Output::Single(value) => value.clone(),
            Output::Many(values) => Value::Array(values.clone()),
        }
    }

    /// The first slot rendered as text; strings are returned without quotes.
    pub fn first_text(&self) -> Option<String> {
        self.slot(0).map(value_to_text)
    }
}

/// Renders a JSON value the way it should appear inside text.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(values) => Output::Many(values),
            other => Output::Single(other),
        }
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Output::Single(Value::String(value))
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Output::Single(Value::String(value.to_string()))
    }
}

impl From<Vec<Value>> for Output {
    fn from(values: Vec<Value>) -> Self {
        Output::Many(values)
    }
}

impl From<Vec<String>> for Output {
    fn from(values: Vec<String>) -> Self {
        Output::Many(values.into_iter().map(Value::String).collect())
    }
}
