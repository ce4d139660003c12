// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use crate::config::BuildContext;
use crate::errors::{ProcessorError, TaskError};
use crate::graph::{Invocation, Output};
use crate::observability::messages::processor::DocumentLoadRequested;
use crate::observability::messages::StructuredLog;
use crate::tasks::{BackgroundTaskManager, TaskHandler, WaitOptions};
use crate::traits::{Processor, Storage};

/// Background task kind shared by every document node.
pub const DOCUMENT_LOADER_KIND: &str = "document_loader";
/// Documents loading at once, all nodes together
pub const DOCUMENT_LOADER_MAX_CONCURRENT: usize = 2;
/// Overrides the configured default timeout for this kind
pub const DOCUMENT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DOCUMENT_TIMEOUT_MESSAGE: &str =
    "Timeout - The document has taken too long to be loaded";

/// Reads a document and returns its text.
///
/// Payload: `{"document_url": "..."}`. Goes through `storage` when one is bound; otherwise
/// the URL is a local path or `file://` URI read on the blocking pool.
pub struct DocumentLoader {
    storage: Option<Arc<dyn Storage>>,
}

impl DocumentLoader {
    pub fn new(storage: Option<Arc<dyn Storage>>) -> Self {
        Self { storage }
    }

    async fn read(&self, url: &str) -> std::io::Result<Vec<u8>> {
        if let Some(storage) = &self.storage {
            return storage.get_file(url).await;
        }
        let path = url.strip_prefix("file://").unwrap_or(url).to_string();
        tokio::task::spawn_blocking(move || std::fs::read(path))
            .await
            .map_err(std::io::Error::other)?
    }
}

#[async_trait]
impl TaskHandler for DocumentLoader {
    async fn handle(&self, payload: Value) -> Result<Value, TaskError> {
        let url = payload
            .get("document_url")
            .and_then(Value::as_str)
            .ok_or_else(|| TaskError::HandlerFailed("payload has no 'document_url'".into()))?;

        let bytes = self
            .read(url)
            .await
            .map_err(|e| TaskError::HandlerFailed(format!("Failed to load '{}': {}", url, e)))?;

        Ok(Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

/// Turns the document at `document_url` into text.
///
/// Loading runs on the `document_loader` background pool so a slow file never ties up a
/// launcher worker beyond the wait itself.
pub struct DocumentToTextProcessor {
    tasks: Arc<BackgroundTaskManager>,
    wait: WaitOptions,
}

impl DocumentToTextProcessor {
    pub const TYPE: &'static str = "document-to-text-processor";

    /// Registers the loader kind on first use; later nodes reuse it.
    ///
    /// Polls with the backoff of `wait` but always waits [`DOCUMENT_WAIT_TIMEOUT`].
    pub fn new(
        tasks: Arc<BackgroundTaskManager>,
        storage: Option<Arc<dyn Storage>>,
        wait: WaitOptions,
    ) -> Result<Self, TaskError> {
        tasks.register(
            DOCUMENT_LOADER_KIND,
            DocumentLoader::new(storage),
            DOCUMENT_LOADER_MAX_CONCURRENT,
        )?;
        Ok(Self {
            tasks,
            wait: wait.with_timeout(DOCUMENT_WAIT_TIMEOUT),
        })
    }

    pub fn from_context(ctx: &BuildContext) -> Result<Self, TaskError> {
        Self::new(Arc::clone(&ctx.tasks), ctx.storage.clone(), ctx.wait)
    }

    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    pub fn wait_options(&self) -> WaitOptions {
        self.wait
    }
}

#[async_trait]
impl Processor for DocumentToTextProcessor {
    async fn process(&self, invocation: &Invocation<'_>) -> Result<Output, ProcessorError> {
        let url = invocation.required_text("document_url")?;
        DocumentLoadRequested {
            node: invocation.node().name(),
            document_url: &url,
        }
        .log();

        let text = self
            .tasks
            .run(DOCUMENT_LOADER_KIND, json!({ "document_url": url }), self.wait)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProcessorError::user_facing(DOCUMENT_TIMEOUT_MESSAGE)
                } else {
                    ProcessorError::from(e)
                }
            })?;

        Ok(Output::Single(text))
    }

    fn name(&self) -> &'static str {
        Self::TYPE
    }

    fn has_dynamic_behavior(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{finished_node, invoke};
    use crate::config::{InputItem, NodeConfig};
    use crate::graph::ProcessorNode;
    use crate::storage::LocalStorage;
    use std::io;

    struct SlowStorage;

    #[async_trait]
    impl Storage for SlowStorage {
        async fn save(&self, _filename: &str, _bytes: &[u8]) -> io::Result<String> {
            Ok(String::new())
        }

        async fn get_file(&self, _uri: &str) -> io::Result<Vec<u8>> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(b"late".to_vec())
        }
    }

    fn node(processor: DocumentToTextProcessor, config: NodeConfig) -> ProcessorNode {
        ProcessorNode::new(&config, Box::new(processor), vec![])
    }

    fn quick() -> WaitOptions {
        WaitOptions {
            timeout: Duration::from_secs(2),
            initial_backoff: Duration::from_millis(2),
            max_backoff: Duration::from_millis(10),
            multiplier: 1.5,
        }
    }

    #[tokio::test]
    async fn test_reads_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "line one\nline two").unwrap();

        let tasks = Arc::new(BackgroundTaskManager::default());
        let processor = DocumentToTextProcessor::new(tasks.clone(), None, quick()).unwrap();
        let config = NodeConfig::new("doc", "document-to-text-processor")
            .with_param("document_url", format!("file://{}", path.display()));

        let output = invoke(&node(processor, config)).await.unwrap();

        assert_eq!(output, Output::from("line one\nline two"));
        assert_eq!(tasks.max_concurrent(DOCUMENT_LOADER_KIND), Some(2));
    }

    #[tokio::test]
    async fn test_reads_through_storage_with_wired_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(dir.path()));
        let url = storage.save("report.csv", b"a,b\n1,2").await.unwrap();

        let tasks = Arc::new(BackgroundTaskManager::default());
        let processor = DocumentToTextProcessor::new(tasks, Some(storage), quick()).unwrap();
        let config = NodeConfig::new("doc", "document-to-text-processor")
            .with_input(InputItem::new("url").named("document_url"));
        let node = ProcessorNode::new(
            &config,
            Box::new(processor),
            vec![finished_node("url", url.as_str())],
        );

        assert_eq!(invoke(&node).await.unwrap(), Output::from("a,b\n1,2"));
    }

    #[tokio::test]
    async fn test_every_node_shares_one_registration() {
        let tasks = Arc::new(BackgroundTaskManager::default());

        assert!(DocumentToTextProcessor::new(tasks.clone(), None, quick()).is_ok());
        assert!(DocumentToTextProcessor::new(tasks.clone(), None, quick()).is_ok());
        assert_eq!(tasks.max_concurrent(DOCUMENT_LOADER_KIND), Some(2));
    }

    #[tokio::test]
    async fn test_timeout_becomes_user_facing_message() {
        let processor = DocumentToTextProcessor::new(
            Arc::new(BackgroundTaskManager::default()),
            Some(Arc::new(SlowStorage) as Arc<dyn Storage>),
            quick(),
        )
        .unwrap()
        .with_wait(quick().with_timeout(Duration::from_millis(30)));
        let config = NodeConfig::new("doc", "document-to-text-processor")
            .with_param("document_url", "anything");

        let err = invoke(&node(processor, config)).await.unwrap_err();

        assert!(matches!(err, ProcessorError::UserFacing { .. }));
        assert_eq!(err.to_string(), DOCUMENT_TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_missing_file_fails_the_node() {
        let tasks = Arc::new(BackgroundTaskManager::default());
        let processor = DocumentToTextProcessor::new(tasks, None, quick()).unwrap();
        let config = NodeConfig::new("doc", "document-to-text-processor")
            .with_param("document_url", "/definitely/not/here.txt");

        let err = invoke(&node(processor, config)).await.unwrap_err();

        assert!(matches!(err, ProcessorError::Task(TaskError::HandlerFailed(_))));
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn test_settings_backoff_reaches_the_processor() {
        let yaml = r#"
background_tasks:
  default_timeout_seconds: 900
  initial_backoff_ms: 7
  max_backoff_ms: 70
  backoff_multiplier: 3.0
"#;
        let settings = crate::config::parse_settings(yaml, |_| None).unwrap();
        let ctx = BuildContext::from_settings(&settings.background_tasks);

        let wait = DocumentToTextProcessor::from_context(&ctx)
            .unwrap()
            .wait_options();

        assert_eq!(wait.initial_backoff, Duration::from_millis(7));
        assert_eq!(wait.max_backoff, Duration::from_millis(70));
        assert_eq!(wait.multiplier, 3.0);
        assert_eq!(wait.timeout, DOCUMENT_WAIT_TIMEOUT);
        assert_eq!(ctx.wait.timeout, Duration::from_secs(900));
    }
}
