//! Session and corpus coordination.
//!
//! Owns the mapping from video IDs to transcripts for the active session and
//! the pipeline built over their concatenation. Every membership change
//! rebuilds the pipeline from the full corpus; the swap happens only after the
//! rebuild succeeds, so a failed add or remove leaves the prior session intact.

use crate::chunking::TextSplitter;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, TubechatError};
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::pipeline::RagPipeline;
use crate::transcript::{TranscriptFetcher, YoutubeTranscriptFetcher};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Marker inserted between transcripts when building the combined corpus text.
const VIDEO_SEPARATOR: &str = "\n\n--- NEW VIDEO ---\n\n";

/// A video that could not be processed, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct FailedVideo {
    pub video_id: String,
    pub error: String,
}

/// Result of initializing a session from a batch of video IDs.
#[derive(Debug, Clone)]
pub struct InitOutcome {
    /// IDs whose transcripts were fetched, in fetch order.
    pub video_ids: Vec<String>,
    /// Per-video failures; the batch still succeeds if any ID succeeded.
    pub failed: Vec<FailedVideo>,
    /// The new corpus mapping, keyed by video ID.
    pub transcripts: HashMap<String, String>,
}

/// The active corpus, membership list, and bound pipeline.
struct VideoSession {
    transcripts: HashMap<String, String>,
    video_ids: Vec<String>,
    pipeline: RagPipeline,
}

/// Coordinates transcript fetching, corpus membership, and pipeline rebuilds.
pub struct SessionCoordinator {
    fetcher: Arc<dyn TranscriptFetcher>,
    embedder: Arc<dyn Embedder>,
    model: Arc<dyn ChatModel>,
    splitter: TextSplitter,
    system_prompt: String,
    user_template: String,
    top_k: usize,
    session: Option<VideoSession>,
}

impl SessionCoordinator {
    /// Create a coordinator wired to YouTube and OpenAI from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let fetcher = Arc::new(YoutubeTranscriptFetcher::new(
            &settings.transcript.language,
            Duration::from_secs(settings.transcript.timeout_seconds),
        )?);
        let embedder = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
        let model = Arc::new(OpenAIChatModel::new(&settings.rag.model)?);

        Ok(Self::with_components(settings, fetcher, embedder, model))
    }

    /// Create a coordinator with custom collaborators.
    pub fn with_components(
        settings: &Settings,
        fetcher: Arc<dyn TranscriptFetcher>,
        embedder: Arc<dyn Embedder>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        let prompts = crate::config::RagPrompts::default();

        Self {
            fetcher,
            embedder,
            model,
            splitter: TextSplitter::new(
                settings.chunking.chunk_size,
                settings.chunking.chunk_overlap,
            ),
            system_prompt: prompts.system,
            user_template: prompts.user,
            top_k: settings.rag.top_k,
            session: None,
        }
    }

    /// Whether a session is active.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Current membership list, in insertion order.
    pub fn video_ids(&self) -> Vec<String> {
        self.session
            .as_ref()
            .map(|s| s.video_ids.clone())
            .unwrap_or_default()
    }

    /// Fetch transcripts for a batch of IDs and build a fresh session.
    ///
    /// Per-ID failures are collected rather than aborting the batch. If no
    /// transcript succeeds, the existing session (if any) is left untouched
    /// and an aggregate error is returned.
    #[instrument(skip(self), fields(count = video_ids.len()))]
    pub async fn initialize(&mut self, video_ids: &[String]) -> Result<InitOutcome> {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        let mut transcripts = HashMap::new();

        for video_id in video_ids {
            if transcripts.contains_key(video_id) {
                continue;
            }
            match self.fetcher.fetch_transcript(video_id).await {
                Ok(text) => {
                    transcripts.insert(video_id.clone(), text);
                    succeeded.push(video_id.clone());
                }
                Err(e) => {
                    warn!("Failed to fetch transcript for {}: {}", video_id, e);
                    failed.push(FailedVideo {
                        video_id: video_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if succeeded.is_empty() {
            let details = failed
                .iter()
                .map(|f| format!("{}: {}", f.video_id, f.error))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(TubechatError::Transcript(format!(
                "Failed to process videos. Errors: {}",
                details
            )));
        }

        let combined = combine_transcripts(&succeeded, &transcripts);
        let pipeline = self.build_pipeline(&combined).await?;

        info!("Session initialized with {} video(s)", succeeded.len());
        self.session = Some(VideoSession {
            transcripts: transcripts.clone(),
            video_ids: succeeded.clone(),
            pipeline,
        });

        Ok(InitOutcome {
            video_ids: succeeded,
            failed,
            transcripts,
        })
    }

    /// Add one video to the active session, rebuilding the pipeline over the
    /// full corpus. All-or-nothing: any failure leaves the session unchanged.
    #[instrument(skip(self))]
    pub async fn add_video(&mut self, video_id: &str) -> Result<Vec<String>> {
        let session = self.session.as_ref().ok_or(TubechatError::NoSession)?;
        if session.transcripts.contains_key(video_id) {
            return Err(TubechatError::DuplicateVideo(video_id.to_string()));
        }

        let mut transcripts = session.transcripts.clone();
        let mut video_ids = session.video_ids.clone();

        let text = self.fetcher.fetch_transcript(video_id).await?;
        transcripts.insert(video_id.to_string(), text);
        video_ids.push(video_id.to_string());

        let combined = combine_transcripts(&video_ids, &transcripts);
        let pipeline = self.build_pipeline(&combined).await?;

        info!("Added video {}, corpus now {} video(s)", video_id, video_ids.len());
        self.session = Some(VideoSession {
            transcripts,
            video_ids: video_ids.clone(),
            pipeline,
        });

        Ok(video_ids)
    }

    /// Remove one video from the active session and rebuild over the rest.
    /// Removing the sole remaining video is rejected.
    #[instrument(skip(self))]
    pub async fn remove_video(&mut self, video_id: &str) -> Result<Vec<String>> {
        let session = self.session.as_ref().ok_or(TubechatError::NoSession)?;
        if !session.transcripts.contains_key(video_id) {
            return Err(TubechatError::UnknownVideo(video_id.to_string()));
        }
        if session.video_ids.len() == 1 {
            return Err(TubechatError::LastVideo);
        }

        let mut transcripts = session.transcripts.clone();
        let mut video_ids = session.video_ids.clone();
        transcripts.remove(video_id);
        video_ids.retain(|id| id != video_id);

        let combined = combine_transcripts(&video_ids, &transcripts);
        let pipeline = self.build_pipeline(&combined).await?;

        info!("Removed video {}, corpus now {} video(s)", video_id, video_ids.len());
        self.session = Some(VideoSession {
            transcripts,
            video_ids: video_ids.clone(),
            pipeline,
        });

        Ok(video_ids)
    }

    /// Answer a question against the active pipeline.
    pub async fn query(&self, question: &str) -> Result<String> {
        if question.trim().is_empty() {
            return Err(TubechatError::InvalidInput(
                "Question cannot be empty".to_string(),
            ));
        }

        let session = self.session.as_ref().ok_or(TubechatError::NoSession)?;
        session.pipeline.query(question).await
    }

    async fn build_pipeline(&self, combined: &str) -> Result<RagPipeline> {
        RagPipeline::build(
            combined,
            &self.splitter,
            self.embedder.clone(),
            self.model.clone(),
            &self.system_prompt,
            &self.user_template,
            self.top_k,
        )
        .await
    }
}

/// Concatenate transcripts in membership order with an explicit marker.
fn combine_transcripts(video_ids: &[String], transcripts: &HashMap<String, String>) -> String {
    video_ids
        .iter()
        .filter_map(|id| transcripts.get(id).map(|t| t.as_str()))
        .collect::<Vec<_>>()
        .join(VIDEO_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FakeFetcher {
        transcripts: HashMap<String, String>,
    }

    impl FakeFetcher {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self {
                transcripts: entries
                    .iter()
                    .map(|(id, text)| (id.to_string(), text.to_string()))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl TranscriptFetcher for FakeFetcher {
        async fn fetch_transcript(&self, video_id: &str) -> Result<String> {
            self.transcripts
                .get(video_id)
                .cloned()
                .ok_or_else(|| TubechatError::Transcript(format!("no captions for {}", video_id)))
        }
    }

    struct FakeEmbedder;

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.0f32; 32];
            for word in text.to_lowercase().split_whitespace() {
                let mut h = 7usize;
                for b in word.bytes() {
                    h = h.wrapping_mul(31).wrapping_add(b as usize);
                }
                v[h % 32] += 1.0;
            }
            Ok(v)
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            32
        }
    }

    /// Echoes the rendered user prompt so tests can inspect retrieved context.
    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn complete(&self, messages: &[crate::llm::ChatMessage]) -> Result<String> {
            Ok(messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default())
        }
    }

    fn coordinator(entries: &[(&str, &str)]) -> SessionCoordinator {
        let mut settings = Settings::default();
        settings.chunking.chunk_size = 200;
        settings.chunking.chunk_overlap = 20;
        settings.rag.top_k = 8;

        SessionCoordinator::with_components(
            &settings,
            Arc::new(FakeFetcher::new(entries)),
            Arc::new(FakeEmbedder),
            Arc::new(EchoModel),
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_initialize_mixed_batch() {
        let mut coord = coordinator(&[("AAAAAAAAAAA", "rust ownership rules explained")]);

        let outcome = coord
            .initialize(&ids(&["AAAAAAAAAAA", "BBBBBBBBBBB"]))
            .await
            .unwrap();

        assert_eq!(outcome.video_ids, ids(&["AAAAAAAAAAA"]));
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].video_id, "BBBBBBBBBBB");
        assert_eq!(
            outcome.transcripts.get("AAAAAAAAAAA").map(|s| s.as_str()),
            Some("rust ownership rules explained")
        );
        assert!(!outcome.transcripts.contains_key("BBBBBBBBBBB"));
        assert!(coord.has_session());
    }

    #[tokio::test]
    async fn test_initialize_all_failures_creates_no_session() {
        let mut coord = coordinator(&[]);

        let result = coord.initialize(&ids(&["AAAAAAAAAAA", "BBBBBBBBBBB"])).await;

        assert!(matches!(result, Err(TubechatError::Transcript(_))));
        assert!(!coord.has_session());
    }

    #[tokio::test]
    async fn test_add_video_requires_session() {
        let mut coord = coordinator(&[("AAAAAAAAAAA", "text")]);
        let result = coord.add_video("AAAAAAAAAAA").await;
        assert!(matches!(result, Err(TubechatError::NoSession)));
    }

    #[tokio::test]
    async fn test_add_duplicate_is_rejected_without_mutation() {
        let mut coord = coordinator(&[("AAAAAAAAAAA", "some transcript text")]);
        coord.initialize(&ids(&["AAAAAAAAAAA"])).await.unwrap();

        let result = coord.add_video("AAAAAAAAAAA").await;

        assert!(matches!(result, Err(TubechatError::DuplicateVideo(_))));
        assert_eq!(coord.video_ids(), ids(&["AAAAAAAAAAA"]));
    }

    #[tokio::test]
    async fn test_add_fetch_failure_leaves_session_untouched() {
        let mut coord = coordinator(&[("AAAAAAAAAAA", "some transcript text")]);
        coord.initialize(&ids(&["AAAAAAAAAAA"])).await.unwrap();

        let result = coord.add_video("CCCCCCCCCCC").await;

        assert!(matches!(result, Err(TubechatError::Transcript(_))));
        assert_eq!(coord.video_ids(), ids(&["AAAAAAAAAAA"]));
    }

    #[tokio::test]
    async fn test_add_extends_corpus_and_answers_from_both() {
        let mut coord = coordinator(&[
            ("AAAAAAAAAAA", "rust ownership borrowing lifetimes"),
            ("BBBBBBBBBBB", "pelican migration patterns in spring"),
        ]);
        coord.initialize(&ids(&["AAAAAAAAAAA"])).await.unwrap();

        let members = coord.add_video("BBBBBBBBBBB").await.unwrap();
        assert_eq!(members, ids(&["AAAAAAAAAAA", "BBBBBBBBBBB"]));

        // With top_k covering the whole corpus, the rendered prompt includes
        // content from both transcripts.
        let answer = coord.query("ownership and migration").await.unwrap();
        assert!(answer.contains("lifetimes"));
        assert!(answer.contains("pelican"));
    }

    #[tokio::test]
    async fn test_remove_unknown_video() {
        let mut coord = coordinator(&[("AAAAAAAAAAA", "text here")]);
        coord.initialize(&ids(&["AAAAAAAAAAA"])).await.unwrap();

        let result = coord.remove_video("ZZZZZZZZZZZ").await;
        assert!(matches!(result, Err(TubechatError::UnknownVideo(_))));
    }

    #[tokio::test]
    async fn test_remove_last_video_is_rejected() {
        let mut coord = coordinator(&[("AAAAAAAAAAA", "text here")]);
        coord.initialize(&ids(&["AAAAAAAAAAA"])).await.unwrap();

        let result = coord.remove_video("AAAAAAAAAAA").await;

        assert!(matches!(result, Err(TubechatError::LastVideo)));
        assert_eq!(coord.video_ids(), ids(&["AAAAAAAAAAA"]));
    }

    #[tokio::test]
    async fn test_remove_rebuilds_without_removed_content() {
        let mut coord = coordinator(&[
            ("AAAAAAAAAAA", "rust ownership borrowing lifetimes"),
            ("BBBBBBBBBBB", "pelican migration patterns in spring"),
        ]);
        coord
            .initialize(&ids(&["AAAAAAAAAAA", "BBBBBBBBBBB"]))
            .await
            .unwrap();

        let members = coord.remove_video("BBBBBBBBBBB").await.unwrap();
        assert_eq!(members, ids(&["AAAAAAAAAAA"]));

        let answer = coord.query("migration patterns in spring").await.unwrap();
        assert!(!answer.contains("pelican"));
    }

    #[tokio::test]
    async fn test_query_preconditions() {
        let coord = coordinator(&[]);
        assert!(matches!(
            coord.query("anything").await,
            Err(TubechatError::NoSession)
        ));

        let mut coord = coordinator(&[("AAAAAAAAAAA", "text here")]);
        coord.initialize(&ids(&["AAAAAAAAAAA"])).await.unwrap();
        assert!(matches!(
            coord.query("   ").await,
            Err(TubechatError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_combine_transcripts_order_and_separator() {
        let mut transcripts = HashMap::new();
        transcripts.insert("a".to_string(), "first".to_string());
        transcripts.insert("b".to_string(), "second".to_string());

        let combined = combine_transcripts(&ids(&["a", "b"]), &transcripts);
        assert_eq!(combined, "first\n\n--- NEW VIDEO ---\n\nsecond");

        let reversed = combine_transcripts(&ids(&["b", "a"]), &transcripts);
        assert_eq!(reversed, "second\n\n--- NEW VIDEO ---\n\nfirst");
    }
}
