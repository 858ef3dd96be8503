//! RAG pipeline: chunk, embed, index, and answer questions over one text blob.
//!
//! A pipeline is immutable once built. When the backing corpus changes, the
//! session coordinator builds a fresh pipeline and drops this one; there is no
//! incremental index update.

use crate::chunking::TextSplitter;
use crate::config::render;
use crate::embedding::Embedder;
use crate::error::{Result, TubechatError};
use crate::llm::{ChatMessage, ChatModel};
use crate::vector_store::{Document, MemoryIndex, SearchResult, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// A question-answering pipeline bound to an in-memory vector index.
pub struct RagPipeline {
    index: MemoryIndex,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    system_prompt: String,
    user_template: String,
    top_k: usize,
}

impl RagPipeline {
    /// Build a pipeline over the given text: split, embed, and index every chunk.
    #[instrument(skip_all, fields(text_len = text.len()))]
    pub async fn build(
        text: &str,
        splitter: &TextSplitter,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
        system_prompt: &str,
        user_template: &str,
        top_k: usize,
    ) -> Result<Self> {
        let chunks = splitter.split(text);
        if chunks.is_empty() {
            return Err(TubechatError::PipelineBuild(
                "no indexable text after chunking".to_string(),
            ));
        }

        debug!("Embedding {} chunks", chunks.len());
        let embeddings = embedder
            .embed_batch(&chunks)
            .await
            .map_err(|e| TubechatError::PipelineBuild(e.to_string()))?;

        if embeddings.len() != chunks.len() {
            return Err(TubechatError::PipelineBuild(format!(
                "embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(order, (content, embedding))| Document::new(content, embedding, order as i32))
            .collect();

        let index = MemoryIndex::new();
        index
            .upsert_batch(&documents)
            .await
            .map_err(|e| TubechatError::PipelineBuild(e.to_string()))?;

        info!("Built pipeline over {} chunks", documents.len());

        Ok(Self {
            index,
            embedder,
            model,
            system_prompt: system_prompt.to_string(),
            user_template: user_template.to_string(),
            top_k,
        })
    }

    /// Retrieve the top-k chunks most similar to the question.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed(question).await?;
        self.index.search(&query_embedding, self.top_k).await
    }

    /// Answer a question using retrieved context. Returns the model output verbatim.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn query(&self, question: &str) -> Result<String> {
        let results = self.retrieve(question).await?;
        let context = format_context(&results);

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), context);

        let messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(render(&self.user_template, &vars)),
        ];

        match self.model.complete(&messages).await {
            Ok(answer) => Ok(answer),
            Err(TubechatError::Query(msg)) => Err(TubechatError::Query(msg)),
            Err(e) => Err(TubechatError::Query(e.to_string())),
        }
    }

    /// Number of indexed chunks.
    pub async fn chunk_count(&self) -> Result<usize> {
        self.index.document_count().await
    }
}

/// Join retrieved chunk contents for prompt substitution.
fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.document.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
