//! Helpers shared by unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::{RagError, Result};
use crate::models::{EmbeddingProvider, LanguageModelProvider};
use crate::storage::{RetrievedDocument, VectorStoreClient};

/// Serves `router` on an ephemeral local port and returns its base URL.
pub(crate) async fn spawn_stub(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Request bodies seen by a stub endpoint.
pub(crate) type Captured = Arc<Mutex<Vec<serde_json::Value>>>;

pub(crate) fn captured() -> Captured {
    Arc::new(Mutex::new(Vec::new()))
}

pub(crate) fn document(id: &str, text: &str) -> RetrievedDocument {
    RetrievedDocument {
        id: id.to_string(),
        text: text.to_string(),
        score: 0.9,
        metadata: serde_json::Map::new(),
    }
}

/// Embedding model returning a constant vector, or failing on demand.
pub(crate) struct FakeEmbedding {
    pub dimension: usize,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeEmbedding {
    pub fn new(dimension: usize) -> Self {
        Self { dimension, fail: false, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { dimension: 4, fail: true, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for FakeEmbedding {
    fn name(&self) -> &str {
        "fake-embedding"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::EmbeddingError("model offline".to_string()));
        }
        Ok(vec![0.5; self.dimension])
    }
}

/// Vector store returning a fixed document list.
pub(crate) struct FakeVectorStore {
    pub documents: Vec<RetrievedDocument>,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeVectorStore {
    pub fn with(documents: Vec<RetrievedDocument>) -> Self {
        Self { documents, fail: false, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { documents: Vec::new(), fail: true, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VectorStoreClient for FakeVectorStore {
    async fn retrieve(&self, _query_vector: &[f32], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::RetrievalError("index unreachable".to_string()));
        }
        Ok(self.documents.iter().take(top_k).cloned().collect())
    }
}

/// Language model that records prompts and answers with a fixed reply.
pub(crate) struct FakeLlm {
    pub reply: String,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeLlm {
    pub fn replying(reply: &str) -> Self {
        Self { reply: reply.to_string(), fail: false, prompts: Mutex::new(Vec::new()) }
    }

    pub fn failing() -> Self {
        Self { reply: String::new(), fail: true, prompts: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModelProvider for FakeLlm {
    fn name(&self) -> &str {
        "fake-llm"
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(RagError::GenerationError("out of memory".to_string()));
        }
        Ok(self.reply.clone())
    }
}
