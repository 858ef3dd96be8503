//! In-memory vector index.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::RwLock;

/// In-memory vector index backing a single RAG pipeline.
pub struct MemoryIndex {
    documents: RwLock<Vec<Document>>,
}

impl MemoryIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryIndex {
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut store = self.documents.write().unwrap();
        store.extend(docs.iter().cloned());
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        let docs = self.documents.read().unwrap();

        let mut results: Vec<SearchResult> = docs
            .iter()
            .map(|doc| SearchResult {
                score: cosine_similarity(query_embedding, &doc.embedding),
                document: doc.clone(),
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn document_count(&self) -> Result<usize> {
        let docs = self.documents.read().unwrap();
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_index_search_ranks_by_similarity() {
        let index = MemoryIndex::new();

        let docs = vec![
            Document::new("Hello world".to_string(), vec![1.0, 0.0, 0.0], 0),
            Document::new("Goodbye world".to_string(), vec![0.0, 1.0, 0.0], 1),
        ];
        index.upsert_batch(&docs).await.unwrap();

        assert_eq!(index.document_count().await.unwrap(), 2);

        let results = index.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "Hello world");
        assert!(results[0].score > results[1].score);

        let limited = index.search(&[1.0, 0.0, 0.0], 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_index_returns_nothing() {
        let index = MemoryIndex::new();
        let results = index.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(results.is_empty());
    }
}
