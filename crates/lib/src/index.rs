//! # Passage Index
//!
//! Offline construction and read-only querying of the persisted vector
//! indexes. Each named index is a single database file holding passage
//! text, JSON metadata, and one raw `f32` embedding per row; nearest
//! neighbors are computed in SQL with `vector_distance_cos`.
//!
//! Indexes are built in a batch outside the live request path and replaced
//! wholesale on rebuild; the live service only ever reads them.

use crate::providers::ai::Embedder;
use crate::types::{KnowledgePassage, ScoredPassage};
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use turso::{params, Database, Value as TursoValue};

/// Errors raised while building or querying a passage index.
#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Storage error: {0}")]
    Storage(#[from] turso::Error),
    #[error("Embedding generation failed: {0}")]
    Embedding(#[from] crate::errors::ProviderError),
    #[error("Index not found at '{0}'")]
    NotFound(String),
    #[error("Knowledge base read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed knowledge base line {line}: {message}")]
    MalformedLine { line: usize, message: String },
    #[error("Embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("Metadata serialization failed: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// One line of a newline-delimited JSON knowledge-base file. `content` is
/// optional here so that lines without it are skipped rather than rejected.
#[derive(Deserialize)]
struct RawPassage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, serde_json::Value>,
}

/// Reads passages from a newline-delimited JSON file. Blank lines and lines
/// without a non-empty `content` field are skipped; a line that is not a
/// JSON object is an error.
pub fn load_passages_from_jsonl(path: impl AsRef<Path>) -> Result<Vec<KnowledgePassage>, IndexError> {
    let raw = std::fs::read_to_string(path)?;
    let mut passages = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let parsed: RawPassage =
            serde_json::from_str(line).map_err(|e| IndexError::MalformedLine {
                line: number + 1,
                message: e.to_string(),
            })?;
        match parsed.content {
            Some(content) if !content.is_empty() => passages.push(KnowledgePassage {
                content,
                metadata: parsed.metadata,
            }),
            _ => {}
        }
    }
    Ok(passages)
}

/// A named, persisted collection of passage embeddings supporting
/// nearest-neighbor similarity search. The identifier is the database file
/// path; identifiers are unique per domain.
pub struct PassageIndex {
    db: Database,
    identifier: String,
}

impl PassageIndex {
    /// Creates or wholesale-replaces the index at `identifier` from a batch
    /// of passages, embedding each one through `embedder`. The embedding
    /// dimension of the first passage becomes the index's dimension; a
    /// mismatching vector later in the batch is an error.
    pub async fn build(
        identifier: &str,
        passages: &[KnowledgePassage],
        embedder: &dyn Embedder,
        model_name: &str,
    ) -> Result<Self, IndexError> {
        let db = turso::Builder::new_local(identifier).build().await?;
        let conn = db.connect()?;

        conn.execute("DROP TABLE IF EXISTS passages", ()).await?;
        conn.execute("DROP TABLE IF EXISTS index_meta", ()).await?;
        conn.execute(
            "CREATE TABLE passages (
                id INTEGER PRIMARY KEY,
                content TEXT NOT NULL,
                metadata TEXT NOT NULL,
                embedding BLOB
            )",
            (),
        )
        .await?;
        conn.execute(
            "CREATE TABLE index_meta (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
            (),
        )
        .await?;

        let mut dimension = 0usize;
        for passage in passages {
            let vector = embedder.embed(&passage.content).await?;
            if dimension == 0 {
                dimension = vector.len();
            } else if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    got: vector.len(),
                });
            }
            // Zero-copy f32 -> bytes view for BLOB storage; f32 is 4 bytes.
            let vector_bytes: &[u8] = unsafe {
                std::slice::from_raw_parts(vector.as_ptr() as *const u8, vector.len() * 4)
            };
            let metadata = serde_json::to_string(&passage.metadata)?;
            conn.execute(
                "INSERT INTO passages (content, metadata, embedding) VALUES (?, ?, ?)",
                params![passage.content.as_str(), metadata, vector_bytes],
            )
            .await?;
        }

        let meta = [
            ("embedding_dimension", dimension.to_string()),
            ("model_name", model_name.to_string()),
            ("built_at", Utc::now().to_rfc3339()),
        ];
        for (key, value) in meta {
            conn.execute(
                "INSERT INTO index_meta (key, value) VALUES (?, ?)",
                params![key, value],
            )
            .await?;
        }

        info!(
            identifier,
            passages = passages.len(),
            dimension,
            "Built passage index"
        );
        Ok(Self {
            db,
            identifier: identifier.to_string(),
        })
    }

    /// Opens an existing index for read-only querying. A missing file is
    /// [`IndexError::NotFound`]; `:memory:` identifiers are accepted so
    /// tests can work against throwaway indexes.
    pub async fn open(identifier: &str) -> Result<Self, IndexError> {
        if identifier != ":memory:" && !Path::new(identifier).exists() {
            return Err(IndexError::NotFound(identifier.to_string()));
        }
        let db = turso::Builder::new_local(identifier).build().await?;
        Ok(Self {
            db,
            identifier: identifier.to_string(),
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Number of indexed passages.
    pub async fn passage_count(&self) -> Result<usize, IndexError> {
        let conn = self.db.connect()?;
        let mut rows = conn.query("SELECT COUNT(*) FROM passages", ()).await?;
        let count = match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(n) => n as usize,
                _ => 0,
            },
            None => 0,
        };
        Ok(count)
    }

    /// Returns the `k` nearest passages to `query_vector` ordered by
    /// descending cosine similarity, mapped into `[0, 1]`. Ties are broken
    /// by insertion id so repeated searches of an unchanged index return
    /// identical orderings.
    pub async fn search(
        &self,
        query_vector: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredPassage>, IndexError> {
        if k == 0 {
            return Ok(Vec::new());
        }
        let conn = self.db.connect()?;

        // Turso's vector functions expect the vector as a literal in the query.
        let vector_str = format!(
            "vector32('[{}]')",
            query_vector
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let sql = format!(
            "SELECT content, (1.0 - (vector_distance_cos(embedding, {vector_str}) / 2.0)) AS similarity
             FROM passages
             WHERE embedding IS NOT NULL
             ORDER BY similarity DESC, id ASC
             LIMIT {k};"
        );

        let mut rows = conn.query(&sql, ()).await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let content = match row.get_value(0)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let score = match row.get_value(1)? {
                TursoValue::Real(f) => f,
                _ => 0.0,
            };
            results.push(ScoredPassage { content, score });
        }
        Ok(results)
    }
}
