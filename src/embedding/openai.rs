//! Embeddings over the OpenAI API.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{Result, TubechatError};
use crate::openai::build_client;
use async_openai::config::OpenAIConfig;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// The embeddings endpoint caps how many inputs one request may carry.
const MAX_INPUTS_PER_REQUEST: usize = 100;

/// Embedder backed by the OpenAI embeddings endpoint.
///
/// A transcript corpus chunks into hundreds of pieces, so batches are split
/// to stay under the endpoint's input cap, and results are re-ordered by
/// index before returning.
pub struct OpenAIEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
    dimensions: usize,
}

impl OpenAIEmbedder {
    /// Wire an embedder from the embedding settings section.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        Ok(Self {
            client: build_client(Duration::from_secs(settings.request_timeout_seconds))?,
            model: settings.model.clone(),
            dimensions: settings.dimensions as usize,
        })
    }

    async fn request(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::StringArray(inputs.to_vec()))
            .dimensions(self.dimensions as u32)
            .build()
            .map_err(|e| TubechatError::Embedding(e.to_string()))?;

        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| TubechatError::OpenAI(format!("Embedding API error: {}", e)))?;

        // The API may return entries out of order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        self.request(&input)
            .await?
            .pop()
            .ok_or_else(|| TubechatError::Embedding("no embedding returned".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut all = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_INPUTS_PER_REQUEST) {
            all.extend(self.request(batch).await?);
        }

        debug!("Embedded {} texts with {}", all.len(), self.model);
        Ok(all)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_uses_configured_dimensions() {
        let settings = EmbeddingSettings {
            model: "text-embedding-3-large".to_string(),
            dimensions: 3072,
            ..EmbeddingSettings::default()
        };

        let embedder = OpenAIEmbedder::from_settings(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 3072);
    }
}
