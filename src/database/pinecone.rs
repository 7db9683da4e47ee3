use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use thiserror::Error;

use crate::database::{ScoredRecord, VectorRecord, VectorStore};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

// Pinecone caps upsert batches; stay well under the request-size limit.
const UPSERT_BATCH_SIZE: usize = 100;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("index {0} not found")]
    IndexNotFound(String),
    #[error("operation failed: {0}")]
    Operation(String),
}

/// Gateway to one named Pinecone index, speaking the HTTP data plane
/// directly. `connect` resolves the index host once; every later call goes
/// straight to that host.
#[derive(Clone, Debug)]
pub struct PineconeStore {
    api_key: String,
    host: String,
    client: Client,
}

impl PineconeStore {
    pub async fn connect(api_key: &str, index_name: &str) -> Result<Self, VectorStoreError> {
        Self::connect_to(CONTROL_PLANE_URL, api_key, index_name).await
    }

    /// Same as `connect` but against an explicit control-plane URL. Used by
    /// tests.
    pub async fn connect_to(
        control_plane: &str,
        api_key: &str,
        index_name: &str,
    ) -> Result<Self, VectorStoreError> {
        let client = Client::new();
        let url = format!("{}/indexes/{}", control_plane, index_name);

        let response = client
            .get(&url)
            .header("Api-Key", api_key)
            .send()
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(VectorStoreError::IndexNotFound(index_name.to_string()));
        }
        if !response.status().is_success() {
            return Err(VectorStoreError::Connection(format!(
                "describe index returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| VectorStoreError::Connection(e.to_string()))?;

        let host = body["host"]
            .as_str()
            .ok_or_else(|| VectorStoreError::Connection("index host missing".to_string()))?;

        let host = if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        log::info!("connected to Pinecone index {} at {}", index_name, host);

        Ok(Self {
            api_key: api_key.to_string(),
            host,
            client,
        })
    }

    /// Build a store bound directly to a data-plane host, skipping the
    /// control-plane lookup. Used by tests.
    pub fn with_host(api_key: &str, host: impl Into<String>) -> Self {
        Self {
            api_key: api_key.to_string(),
            host: host.into(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn upsert(&self, records: &[VectorRecord]) -> Result<()> {
        for batch in records.chunks(UPSERT_BATCH_SIZE) {
            let vectors: Vec<Value> = batch
                .iter()
                .map(|record| {
                    json!({
                        "id": record.id,
                        "values": record.values,
                        "metadata": record.metadata,
                    })
                })
                .collect();

            let response = self
                .client
                .post(format!("{}/vectors/upsert", self.host))
                .header("Api-Key", &self.api_key)
                .json(&json!({ "vectors": vectors }))
                .send()
                .await
                .map_err(|e| VectorStoreError::Operation(e.to_string()))?;

            if !response.status().is_success() {
                return Err(VectorStoreError::Operation(format!(
                    "upsert returned {}",
                    response.status()
                ))
                .into());
            }
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<ScoredRecord>> {
        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&json!({
                "vector": vector,
                "topK": top_k,
                "includeMetadata": true,
            }))
            .send()
            .await
            .map_err(|e| VectorStoreError::Operation(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VectorStoreError::Operation(format!(
                "query returned {}",
                response.status()
            ))
            .into());
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| VectorStoreError::Operation(e.to_string()))?;

        let matches = body["matches"].as_array().cloned().unwrap_or_default();

        let records = matches
            .into_iter()
            .filter_map(|hit| {
                let id = hit["id"].as_str()?.to_string();
                let score = hit["score"].as_f64().unwrap_or(0.0) as f32;
                let text = hit["metadata"]["text"].as_str()?.to_string();
                let source = hit["metadata"]["source"]
                    .as_str()
                    .unwrap_or("unknown")
                    .to_string();
                Some(ScoredRecord {
                    id,
                    score,
                    text,
                    source,
                })
            })
            .collect();

        Ok(records)
    }
}
