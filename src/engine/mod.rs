// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod concurrent;
pub mod factory;
pub mod node_state;
pub mod sequential;

pub use concurrent::ConcurrentLauncher;
pub use factory::LauncherFactory;
pub use node_state::{run_node, LaunchPlan, NodeState, ScheduledNode};
pub use sequential::SequentialLauncher;
