// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use std::io;

/// Where processors put and fetch files. The launcher never touches it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stores `bytes` under `filename` and returns a URL it can be fetched from.
    async fn save(&self, filename: &str, bytes: &[u8]) -> io::Result<String>;

    async fn get_file(&self, uri: &str) -> io::Result<Vec<u8>>;
}
