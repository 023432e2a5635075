use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::error::{ModelError, StoreError};
use crate::llm::LanguageModel;
use crate::models::{AnalysisRecord, Transcript};
use crate::store::{RecordIter, RecordStore};

#[derive(Debug, Clone)]
enum Reply {
    Fixed(String),
    /// Summary built from the transcript itself
    Echo,
    AlwaysFail,
    /// Fail this many times, then answer
    FailFirst(usize, String),
}

/// Call-counting language model
pub struct StubModel {
    summary: Reply,
    sentiment: Reply,
    summarize_calls: AtomicUsize,
    sentiment_calls: AtomicUsize,
}

impl StubModel {
    pub fn new(summary: &str, sentiment: &str) -> Self {
        Self {
            summary: Reply::Fixed(summary.to_string()),
            sentiment: Reply::Fixed(sentiment.to_string()),
            summarize_calls: AtomicUsize::new(0),
            sentiment_calls: AtomicUsize::new(0),
        }
    }

    pub fn echo() -> Self {
        Self {
            summary: Reply::Echo,
            ..Self::new("", "neutral")
        }
    }

    pub fn fail_summarize(mut self) -> Self {
        self.summary = Reply::AlwaysFail;
        self
    }

    pub fn fail_sentiment(mut self) -> Self {
        self.sentiment = Reply::AlwaysFail;
        self
    }

    pub fn flaky_summarize(mut self, failures: usize) -> Self {
        self.summary = Self::flaky(self.summary, failures);
        self
    }

    pub fn flaky_sentiment(mut self, failures: usize) -> Self {
        self.sentiment = Self::flaky(self.sentiment, failures);
        self
    }

    fn flaky(reply: Reply, failures: usize) -> Reply {
        match reply {
            Reply::Fixed(text) => Reply::FailFirst(failures, text),
            other => other,
        }
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    pub fn sentiment_calls(&self) -> usize {
        self.sentiment_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.summarize_calls() + self.sentiment_calls()
    }

    fn answer(reply: &Reply, call_index: usize, transcript: &Transcript) -> Result<String, ModelError> {
        match reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Echo => Ok(format!("Summary of: {}", transcript)),
            Reply::AlwaysFail => Err(ModelError::Status {
                status: 503,
                body: "service unavailable".to_string(),
            }),
            Reply::FailFirst(failures, text) => {
                if call_index < *failures {
                    Err(ModelError::Malformed("truncated body".to_string()))
                } else {
                    Ok(text.clone())
                }
            }
        }
    }
}

#[async_trait]
impl LanguageModel for StubModel {
    async fn summarize(&self, transcript: &Transcript) -> Result<String, ModelError> {
        let n = self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        Self::answer(&self.summary, n, transcript)
    }

    async fn classify_sentiment(&self, transcript: &Transcript) -> Result<String, ModelError> {
        let n = self.sentiment_calls.fetch_add(1, Ordering::SeqCst);
        Self::answer(&self.sentiment, n, transcript)
    }
}

/// Vec-backed record store
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<AnalysisRecord>>,
}

impl MemoryStore {
    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn read_all(&self) -> Result<RecordIter, StoreError> {
        Ok(Box::new(self.records().into_iter().map(Ok)))
    }
}

/// Store whose appends always fail, as on a full disk
pub struct FailingStore;

impl RecordStore for FailingStore {
    fn append(&self, _record: &AnalysisRecord) -> Result<(), StoreError> {
        Err(StoreError::Io {
            path: "call_analysis.csv".to_string(),
            source: std::io::Error::other("No space left on device"),
        })
    }

    fn read_all(&self) -> Result<RecordIter, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

/// Memory store whose append reports that it started, then waits to be released
pub struct GatedStore {
    inner: MemoryStore,
    entered: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<mpsc::Receiver<()>>,
}

impl GatedStore {
    pub fn new(entered: oneshot::Sender<()>, release: mpsc::Receiver<()>) -> Self {
        Self {
            inner: MemoryStore::default(),
            entered: Mutex::new(Some(entered)),
            release: Mutex::new(release),
        }
    }

    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.inner.records()
    }
}

impl RecordStore for GatedStore {
    fn append(&self, record: &AnalysisRecord) -> Result<(), StoreError> {
        if let Some(entered) = self.entered.lock().unwrap().take() {
            let _ = entered.send(());
        }
        self.release
            .lock()
            .unwrap()
            .recv()
            .map_err(|_| StoreError::Unavailable("append never released".to_string()))?;
        self.inner.append(record)
    }

    fn read_all(&self) -> Result<RecordIter, StoreError> {
        self.inner.read_all()
    }
}
