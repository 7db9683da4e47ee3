//! Shared mocks for unit tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::config::Settings;
use crate::database::{ScoredRecord, VectorRecord, VectorStore};
use crate::providers::ModelProvider;

pub fn settings_for(data_dir: &Path) -> Settings {
    Settings {
        google_api_key: "test-google-key".to_string(),
        pinecone_api_key: "test-pinecone-key".to_string(),
        gemini_model: "gemini-pro".to_string(),
        index_name: "knowledgeagent".to_string(),
        data_dir: data_dir.display().to_string(),
        chunk_size: 1024,
    }
}

#[derive(Default)]
pub struct MockProvider {
    pub completions: Mutex<VecDeque<String>>,
    pub complete_calls: AtomicUsize,
    fail_completions: AtomicBool,
    fail_embeddings: AtomicBool,
}

impl MockProvider {
    pub fn with_answers(answers: &[&str]) -> Self {
        let provider = Self::default();
        provider
            .completions
            .lock()
            .unwrap()
            .extend(answers.iter().map(|s| s.to_string()));
        provider
    }

    pub fn fail_completions(&self) {
        self.fail_completions.store(true, Ordering::SeqCst);
    }

    pub fn fail_embeddings(&self) {
        self.fail_embeddings.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    async fn complete(&self, _prompt: &str) -> Result<String> {
        self.complete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_completions.load(Ordering::SeqCst) {
            return Err(anyhow!("model unavailable"));
        }
        Ok(self
            .completions
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "mock answer".to_string()))
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.fail_embeddings.load(Ordering::SeqCst) {
            return Err(anyhow!("embedding service unavailable"));
        }
        Ok(vec![text.chars().count() as f32, 1.0, 2.0])
    }

    fn model_info(&self) -> &str {
        "mock-model"
    }
}

#[derive(Default)]
pub struct MockStore {
    pub upserted: Mutex<Vec<VectorRecord>>,
    pub upsert_calls: AtomicUsize,
    hits: Mutex<Vec<ScoredRecord>>,
}

impl MockStore {
    pub fn push_hit(&self, id: &str, score: f32, text: &str, source: &str) {
        self.hits.lock().unwrap().push(ScoredRecord {
            id: id.to_string(),
            score,
            text: text.to_string(),
            source: source.to_string(),
        });
    }
}

#[async_trait]
impl VectorStore for MockStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);
        self.upserted.lock().unwrap().extend_from_slice(records);
        Ok(())
    }

    async fn query(&self, _vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        let mut hits = self.hits.lock().unwrap().clone();
        hits.truncate(top_k);
        Ok(hits)
    }
}
