use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

pub mod pinecone;

pub use pinecone::{PineconeStore, VectorStoreError};

/// One persisted (chunk text, embedding, metadata) triple. Created during
/// ingestion and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: HashMap<String, serde_json::Value>,
}

/// A similarity-search hit, flattened to the fields the chat engine needs.
#[derive(Debug, Clone)]
pub struct ScoredRecord {
    pub id: String,
    pub score: f32,
    pub text: String,
    pub source: String,
}

/// Remote vector collection supporting writes (ingestion) and reads
/// (query-time similarity search). No pooling or retry; transport failures
/// propagate to the caller.
#[async_trait]
pub trait VectorStore: Send + Sync {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()>;

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>>;
}
