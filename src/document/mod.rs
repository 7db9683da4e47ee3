use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use tokio::fs;

/// Raw text loaded verbatim from one file, immutable once read.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: PathBuf,
    pub text: String,
}

/// Load every readable UTF-8 file under `dir`, walking nested directories.
/// Files the reader cannot decode are skipped with a warning rather than
/// failing the whole batch.
pub async fn load_documents(dir: &Path) -> Result<Vec<Document>> {
    if !dir.is_dir() {
        return Err(anyhow!("document directory {} does not exist", dir.display()));
    }

    let mut documents = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let mut entries = fs::read_dir(&current)
            .await
            .with_context(|| format!("failed to read directory {}", current.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if path.is_file() {
                match fs::read_to_string(&path).await {
                    Ok(text) => documents.push(Document { source: path, text }),
                    Err(e) => {
                        log::warn!("skipping {}: {}", path.display(), e);
                    }
                }
            }
        }
    }

    // Deterministic ingestion order regardless of directory walk order.
    documents.sort_by(|a, b| a.source.cmp(&b.source));

    Ok(documents)
}

/// Greedy fixed-size chunking: each chunk holds at most `chunk_size`
/// characters, cutting at a whitespace boundary when one exists in the
/// second half of the window. Surrounding whitespace is trimmed and empty
/// chunks are dropped.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        if chars.len() - start <= chunk_size {
            push_chunk(&mut chunks, &chars[start..]);
            break;
        }

        let hard_end = start + chunk_size;
        let floor = start + chunk_size / 2;

        let mut cut = hard_end;
        while cut > floor && !chars[cut - 1].is_whitespace() {
            cut -= 1;
        }
        if cut <= floor {
            cut = hard_end;
        }

        push_chunk(&mut chunks, &chars[start..cut]);
        start = cut;
    }

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, chars: &[char]) {
    let chunk: String = chars.iter().collect();
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
