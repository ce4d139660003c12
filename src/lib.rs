// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // built-in processors
pub mod config;     // flow model, validation, registry, linker
pub mod context;    // caller-scoped parameters
pub mod engine;     // launchers
pub mod errors;     // error handling
pub mod events;     // lifecycle events and observers
pub mod graph;      // the wired runtime graph
pub mod observability;
pub mod storage;
pub mod tasks;      // background task pools
pub mod traits;     // unified abstractions
