//! One-shot initial card download
//!
//! Runs only while the store is empty. The fetch happens outside the engine
//! lock; the result re-enters through the same `Mutex` every other mutation
//! uses, and a store that got populated in the meantime wins over the
//! fetched batch.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::flashcards::BootstrapEntry;
use crate::session::{SeedOutcome, SharedEngine};

/// Default time allowed for the whole fetch
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed card list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("engine lock poisoned")]
    Poisoned,
}

/// Where the initial card list comes from
#[async_trait]
pub trait BootstrapSource: Send + Sync {
    /// Fetch and decode the whole batch. Any decode failure rejects the
    /// entire batch.
    async fn fetch(&self) -> std::result::Result<Vec<BootstrapEntry>, BootstrapError>;

    fn describe(&self) -> String;
}

/// `GET` a JSON array of `{word, ipa, definition, example}`
pub struct HttpBootstrap {
    client: reqwest::Client,
    url: String,
}

impl HttpBootstrap {
    pub fn new(url: String, timeout: Duration) -> std::result::Result<Self, BootstrapError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .user_agent("spaced/0.1")
            .build()?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: String, client: reqwest::Client) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl BootstrapSource for HttpBootstrap {
    async fn fetch(&self) -> std::result::Result<Vec<BootstrapEntry>, BootstrapError> {
        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(BootstrapError::Status(response.status()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Card list stored as a JSON file on disk
pub struct FileBootstrap {
    path: PathBuf,
}

impl FileBootstrap {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl BootstrapSource for FileBootstrap {
    async fn fetch(&self) -> std::result::Result<Vec<BootstrapEntry>, BootstrapError> {
        let content = tokio::fs::read(&self.path).await?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Fetch from `source` within `timeout` and seed the engine.
///
/// On timeout or fetch failure the engine is left untouched and the error
/// is returned.
pub async fn run(
    engine: &SharedEngine,
    source: &dyn BootstrapSource,
    timeout: Duration,
) -> Result<SeedOutcome> {
    log::info!("Fetching initial cards from {}", source.describe());

    let entries = match tokio::time::timeout(timeout, source.fetch()).await {
        Ok(Ok(entries)) => entries,
        Ok(Err(e)) => {
            log::warn!("Bootstrap from {} failed: {}", source.describe(), e);
            return Err(e.into());
        }
        Err(_) => {
            log::warn!("Bootstrap from {} timed out", source.describe());
            return Err(BootstrapError::Timeout(timeout).into());
        }
    };

    let mut engine = engine.lock().map_err(|_| BootstrapError::Poisoned)?;
    let outcome = engine.seed(entries)?;
    Ok(outcome)
}

/// Run [`run`] in the background on the current tokio runtime
pub fn spawn(
    engine: SharedEngine,
    source: Arc<dyn BootstrapSource>,
    timeout: Duration,
) -> JoinHandle<Result<SeedOutcome>> {
    tokio::spawn(async move { run(&engine, source.as_ref(), timeout).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    use crate::error::EngineError;
    use crate::flashcards::{CardStore, Sm2Scheduler};
    use crate::session::{RecordKeeper, SessionEngine};
    use crate::storage::MemoryGateway;

    struct StaticSource(Vec<BootstrapEntry>);

    #[async_trait]
    impl BootstrapSource for StaticSource {
        async fn fetch(&self) -> std::result::Result<Vec<BootstrapEntry>, BootstrapError> {
            Ok(self.0.clone())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct SlowSource;

    #[async_trait]
    impl BootstrapSource for SlowSource {
        async fn fetch(&self) -> std::result::Result<Vec<BootstrapEntry>, BootstrapError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Vec::new())
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    fn entry(word: &str) -> BootstrapEntry {
        BootstrapEntry {
            word: word.to_string(),
            ipa: String::new(),
            definition: String::new(),
            example: String::new(),
        }
    }

    fn shared(store: CardStore) -> SharedEngine {
        SessionEngine::new(
            store,
            RecordKeeper::new(),
            Box::new(Sm2Scheduler::default()),
            Arc::new(MemoryGateway::new()),
        )
        .into_shared()
    }

    #[tokio::test]
    async fn test_seeds_empty_engine() {
        let engine = shared(CardStore::new());
        let source = StaticSource(vec![entry("agree"), entry("apple")]);

        let outcome = run(&engine, &source, DEFAULT_TIMEOUT).await.unwrap();
        assert_eq!(outcome, SeedOutcome::Seeded(2));
        assert_eq!(engine.lock().unwrap().store().len(), 2);
    }

    #[tokio::test]
    async fn test_discards_when_store_populated_first() {
        let engine = shared(CardStore::from_entries(vec![entry("tomato")]));
        let source: Arc<dyn BootstrapSource> = Arc::new(StaticSource(vec![entry("agree")]));

        let outcome = spawn(engine.clone(), source, DEFAULT_TIMEOUT)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, SeedOutcome::Discarded);
        let engine = engine.lock().unwrap();
        assert_eq!(engine.store().len(), 1);
        assert_eq!(engine.store().get(0).unwrap().word, "tomato");
    }

    #[tokio::test]
    async fn test_timeout_leaves_engine_empty() {
        let engine = shared(CardStore::new());

        let err = run(&engine, &SlowSource, Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Bootstrap(BootstrapError::Timeout(_))
        ));
        assert!(engine.lock().unwrap().store().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_file_discards_whole_batch() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cards.json");
        std::fs::write(&path, r#"[{"word": "agree"}, {"ipa": 3}]"#).unwrap();
        let engine = shared(CardStore::new());

        let err = run(&engine, &FileBootstrap::new(path), DEFAULT_TIMEOUT)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Bootstrap(BootstrapError::Decode(_))));
        assert!(engine.lock().unwrap().store().is_empty());
    }

    #[tokio::test]
    async fn test_http_source() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            let body = r#"[{"word":"agree","ipa":"əˈɡri","definition":"to concur","example":"We agree."}]"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        let source = HttpBootstrap::with_client(format!("http://{}/assets/cards.json", addr), client);
        let entries = source.fetch().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ipa, "əˈɡri");
        assert_eq!(entries[0].example, "We agree.");
    }
}
