// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Configuration errors. All of these are raised before any node executes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A circular dependency was detected in the flow
    #[error("Cyclic dependency detected: {}", .cycle.join(" -> "))]
    CyclicDependency {
        /// The cycle path, first node repeated at the end
        cycle: Vec<String>,
    },

    /// A node references an input node that doesn't exist
    #[error("Node '{node}' takes input from '{missing_input}' which does not exist")]
    UnresolvedInput { node: String, missing_input: String },

    /// Two nodes share the same name
    #[error("Duplicate node name: '{node}'")]
    DuplicateNodeName { node: String },

    /// No constructor is registered for the node's processor type
    #[error("Processor type '{processor_type}' of node '{node}' is not supported")]
    UnknownProcessorType { node: String, processor_type: String },

    /// A partial run names a node that isn't part of the flow
    #[error("Target node '{target}' is not part of the flow")]
    UnknownTarget { target: String },

    /// The constructor for a node rejected its parameters
    #[error("Failed to create processor for node '{node}': {reason}")]
    ProcessorCreationFailed { node: String, reason: String },

    /// Launcher settings could not be read or parsed
    #[error("Invalid launcher settings: {0}")]
    InvalidSettings(String),
}

/// Failures while reading a flow description or launcher settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed launcher settings: {0}")]
    Settings(#[from] serde_yaml::Error),

    #[error("Malformed flow description: {0}")]
    Flow(#[from] serde_json::Error),

    #[error("Configuration validation failed:\n{}", join_lines(.0))]
    Invalid(Vec<ValidationError>),
}

impl From<Vec<ValidationError>> for ConfigError {
    fn from(errors: Vec<ValidationError>) -> Self {
        ConfigError::Invalid(errors)
    }
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let cases = vec![
            (
                ValidationError::CyclicDependency {
                    cycle: vec!["a".into(), "b".into(), "a".into()],
                },
                "Cyclic dependency detected: a -> b -> a",
            ),
            (
                ValidationError::UnresolvedInput {
                    node: "merge".into(),
                    missing_input: "ghost".into(),
                },
                "Node 'merge' takes input from 'ghost' which does not exist",
            ),
            (
                ValidationError::UnknownProcessorType {
                    node: "n1".into(),
                    processor_type: "teleport".into(),
                },
                "Processor type 'teleport' of node 'n1' is not supported",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_config_error_lists_every_validation_error() {
        let err = ConfigError::from(vec![
            ValidationError::DuplicateNodeName { node: "a".into() },
            ValidationError::UnknownTarget { target: "z".into() },
        ]);

        assert_eq!(
            err.to_string(),
            "Configuration validation failed:\nDuplicate node name: 'a'\nTarget node 'z' is not part of the flow"
        );
    }
}
