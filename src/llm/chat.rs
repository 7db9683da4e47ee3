use std::fmt;

use anyhow::Result;
use serde::Serialize;

use crate::database::ScoredRecord;
use crate::index::Index;

const RETRIEVE_TOP_K: usize = 5;
const CONTEXT_TURNS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "User"),
            Role::Assistant => write!(f, "Assistant"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Stateful chat wrapper around an index: each turn retrieves relevant
/// chunks, folds in recent conversation, and asks the generation model for
/// a grounded answer.
pub struct ChatEngine {
    index: Index,
    turns: Vec<ChatTurn>,
}

impl ChatEngine {
    pub fn new(index: Index) -> Self {
        Self {
            index,
            turns: Vec::new(),
        }
    }

    /// Transcript of successful turns, oldest first.
    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub async fn chat(&mut self, user_message: &str) -> Result<String> {
        let hits = self.index.retrieve(user_message, RETRIEVE_TOP_K).await?;
        let prompt = self.build_prompt(user_message, &hits);

        let answer = self.index.provider().complete(&prompt).await?;

        // Failed turns never reach the transcript.
        self.turns.push(ChatTurn::user(user_message));
        self.turns.push(ChatTurn::assistant(answer.clone()));

        Ok(answer)
    }

    fn build_prompt(&self, user_message: &str, hits: &[ScoredRecord]) -> String {
        let mut context = String::new();
        for (i, hit) in hits.iter().enumerate() {
            context.push_str(&format!(
                "{}. [Score: {:.2}] {} (Source: {})\n",
                i + 1,
                hit.score,
                hit.text,
                hit.source
            ));
        }
        if context.is_empty() {
            context.push_str("(no relevant documents found)\n");
        }

        let mut recent = String::new();
        let skip = self.turns.len().saturating_sub(CONTEXT_TURNS);
        for turn in &self.turns[skip..] {
            recent.push_str(&format!("{}: {}\n", turn.role, turn.content));
        }

        format!(
            "You are a knowledge agent. Answer the user's question using the \
             retrieved document context below. If the context does not cover \
             the question, say so.\n\n\
             Retrieved context:\n{}\n\
             Recent conversation:\n{}\n\
             User: {}\nAssistant:",
            context, recent, user_message
        )
    }
}
