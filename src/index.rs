use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::config::Settings;
use crate::database::{ScoredRecord, VectorRecord, VectorStore};
use crate::document::{chunk_text, load_documents};
use crate::providers::ModelProvider;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct IngestSummary {
    pub documents: usize,
    pub chunks: usize,
}

/// Handle binding the embedding client to the vector store. Not persisted;
/// rebuilt (or lazily created) once per session.
#[derive(Clone)]
pub struct Index {
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
}

impl std::fmt::Debug for Index {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Index").finish_non_exhaustive()
    }
}

impl Index {
    pub fn new(provider: Arc<dyn ModelProvider>, store: Arc<dyn VectorStore>) -> Self {
        Self { provider, store }
    }

    /// Embed the query and similarity-search the store.
    pub async fn retrieve(&self, query: &str, top_k: usize) -> Result<Vec<ScoredRecord>> {
        let embedding = self.provider.embed(query).await?;
        self.store.query(&embedding, top_k).await
    }

    pub fn provider(&self) -> &Arc<dyn ModelProvider> {
        &self.provider
    }
}

/// Deterministic record id: the same source, position and content always
/// map to the same id, so re-ingesting unchanged documents overwrites
/// records instead of duplicating them.
pub fn record_id(source: &str, ordinal: usize, text: &str) -> String {
    let name = format!("{}#{}\n{}", source, ordinal, text);
    Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()).to_string()
}

/// Run the full ingestion pipeline: load documents, chunk, embed, upsert.
/// One vector record per chunk. Any failing step propagates; there is no
/// partial-failure recovery or rollback.
pub async fn ingest(
    settings: &Settings,
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
) -> Result<(Index, IngestSummary)> {
    let documents = load_documents(Path::new(&settings.data_dir)).await?;
    if documents.is_empty() {
        return Err(anyhow!(
            "no readable documents found in {}",
            settings.data_dir
        ));
    }

    let ingested_at = chrono::Utc::now().to_rfc3339();
    let mut records = Vec::new();

    for document in &documents {
        let source = document.source.display().to_string();
        for (ordinal, chunk) in chunk_text(&document.text, settings.chunk_size)
            .into_iter()
            .enumerate()
        {
            let values = provider.embed(&chunk).await?;

            let mut metadata = HashMap::new();
            metadata.insert("text".to_string(), json!(chunk));
            metadata.insert("source".to_string(), json!(source));
            metadata.insert("ordinal".to_string(), json!(ordinal));
            metadata.insert("ingested_at".to_string(), json!(ingested_at));

            records.push(VectorRecord {
                id: record_id(&source, ordinal, &chunk),
                values,
                metadata,
            });
        }
    }

    store.upsert(&records).await?;

    let summary = IngestSummary {
        documents: documents.len(),
        chunks: records.len(),
    };
    log::info!(
        "ingested {} documents as {} chunks",
        summary.documents,
        summary.chunks
    );

    Ok((Index::new(provider, store), summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{settings_for, MockProvider, MockStore};

    #[tokio::test]
    async fn ingest_writes_one_record_per_chunk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "a short note").unwrap();
        std::fs::write(dir.path().join("long.txt"), "word ".repeat(600)).unwrap();

        let provider = Arc::new(MockProvider::default());
        let store = Arc::new(MockStore::default());
        let settings = settings_for(dir.path());

        let (_, summary) = ingest(&settings, provider, store.clone()).await.unwrap();

        assert_eq!(summary.documents, 2);
        // 3000 chars of "word " chunk to three pieces at 1024, plus the note.
        assert_eq!(summary.chunks, 4);
        assert_eq!(store.upserted.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn record_metadata_carries_text_and_source() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "a short note").unwrap();

        let provider = Arc::new(MockProvider::default());
        let store = Arc::new(MockStore::default());
        let settings = settings_for(dir.path());

        ingest(&settings, provider, store.clone()).await.unwrap();

        let records = store.upserted.lock().unwrap();
        let record = &records[0];
        assert_eq!(record.metadata["text"], "a short note");
        assert!(record.metadata["source"]
            .as_str()
            .unwrap()
            .ends_with("notes.txt"));
        assert_eq!(record.metadata["ordinal"], 0);
        assert!(record.metadata.contains_key("ingested_at"));
    }

    #[tokio::test]
    async fn reingestion_reuses_record_ids() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "stable content").unwrap();

        let settings = settings_for(dir.path());
        let store = Arc::new(MockStore::default());

        ingest(&settings, Arc::new(MockProvider::default()), store.clone())
            .await
            .unwrap();
        ingest(&settings, Arc::new(MockProvider::default()), store.clone())
            .await
            .unwrap();

        let records = store.upserted.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, records[1].id);
    }

    #[tokio::test]
    async fn empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings_for(dir.path());

        let err = ingest(
            &settings,
            Arc::new(MockProvider::default()),
            Arc::new(MockStore::default()),
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("no readable documents"));
    }

    #[tokio::test]
    async fn embedding_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), "content").unwrap();

        let provider = MockProvider::default();
        provider.fail_embeddings();
        let settings = settings_for(dir.path());
        let store = Arc::new(MockStore::default());

        let err = ingest(&settings, Arc::new(provider), store.clone())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("embedding"));
        // Nothing was written.
        assert!(store.upserted.lock().unwrap().is_empty());
    }

    #[test]
    fn record_id_is_content_addressed() {
        let a = record_id("data/notes.txt", 0, "hello");
        let b = record_id("data/notes.txt", 0, "hello");
        let c = record_id("data/notes.txt", 1, "hello");
        let d = record_id("data/notes.txt", 0, "changed");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
    }

    #[tokio::test]
    async fn retrieve_embeds_query_and_searches() {
        let provider = Arc::new(MockProvider::default());
        let store = Arc::new(MockStore::default());
        store.push_hit("rec-1", 0.9, "relevant chunk", "data/notes.txt");

        let index = Index::new(provider, store);
        let hits = index.retrieve("question", 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].text, "relevant chunk");
    }
}
