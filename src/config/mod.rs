// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
mod linker;
mod loader;
mod node_config;
mod registry;
mod validation;

pub use linker::{link, link_for_node};
pub use loader::{
    load_and_validate_flow, load_flow, load_settings, parse_flow, parse_settings,
    BackgroundTaskSettings, ExecutorOptions, LauncherSettings, StorageSettings, Strategy,
};
pub use node_config::{InputItem, NodeConfig};
pub use registry::{BuildContext, ProcessorConstructor, ProcessorRegistry};
pub use validation::{topological_order, validate_flow};
