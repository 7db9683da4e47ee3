use std::sync::Arc;

use anyhow::Result;

use crate::config::Settings;
use crate::database::VectorStore;
use crate::index::{self, Index, IngestSummary};
use crate::llm::{ChatEngine, ChatTurn};
use crate::providers::ModelProvider;

/// The sentinel left over from the original command-line loop: it renders a
/// farewell but does not end the session.
const EXIT_SENTINEL: &str = "exit";

/// Outcome of one text submission, matched on by the presentation surface
/// instead of catching exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionReply {
    /// Blank input; nothing happened.
    Empty,
    /// The "exit" sentinel; history untouched, engine never invoked.
    Farewell,
    Answer(String),
    /// User-facing failure message, always prefixed with "Error: ".
    Failure(String),
}

/// One user's conversation state: the lazily built index and chat engine
/// plus the append-only visible history. Single-user; not safe for
/// concurrent mutation.
pub struct Session {
    settings: Settings,
    provider: Arc<dyn ModelProvider>,
    store: Arc<dyn VectorStore>,
    index: Option<Index>,
    engine: Option<ChatEngine>,
    history: Vec<ChatTurn>,
}

impl Session {
    pub fn new(
        settings: Settings,
        provider: Arc<dyn ModelProvider>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            settings,
            provider,
            store,
            index: None,
            engine: None,
            history: Vec::new(),
        }
    }

    /// Re-run the ingestion pipeline and replace both the index and the
    /// chat engine, even when both already exist.
    pub async fn ingest(&mut self) -> Result<IngestSummary> {
        let (index, summary) =
            index::ingest(&self.settings, self.provider.clone(), self.store.clone()).await?;
        self.engine = Some(ChatEngine::new(index.clone()));
        self.index = Some(index);
        Ok(summary)
    }

    pub async fn submit(&mut self, text: &str) -> SessionReply {
        let text = text.trim();
        if text.is_empty() {
            return SessionReply::Empty;
        }
        if text.eq_ignore_ascii_case(EXIT_SENTINEL) {
            return SessionReply::Farewell;
        }

        // First question with no index yet: ingest once, lazily.
        if self.engine.is_none() {
            if let Err(e) = self.ingest().await {
                return SessionReply::Failure(format!("Error: {}", e));
            }
        }

        let engine = match self.engine.as_mut() {
            Some(engine) => engine,
            None => return SessionReply::Failure("Error: chat engine not initialized".to_string()),
        };

        match engine.chat(text).await {
            Ok(answer) => {
                self.history.push(ChatTurn::user(text));
                self.history.push(ChatTurn::assistant(answer.clone()));
                SessionReply::Answer(answer)
            }
            Err(e) => SessionReply::Failure(format!("Error: {}", e)),
        }
    }

    /// Empty the visible history. The engine and its internal transcript
    /// are left alone, matching the original application.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn history(&self) -> &[ChatTurn] {
        &self.history
    }

    pub fn is_ready(&self) -> bool {
        self.engine.is_some()
    }

    pub fn engine(&self) -> Option<&ChatEngine> {
        self.engine.as_ref()
    }
}
