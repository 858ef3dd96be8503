//! YouTube caption fetching.
//!
//! Scrapes the caption track list from the watch page and downloads the
//! timedtext stream directly, without an API key.

use super::{flatten_snippets, TranscriptFetcher, TranscriptSnippet};
use crate::error::{Result, TubechatError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument};

/// A caption track entry from the watch page player response.
#[derive(Debug, Clone, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
}

/// Transcript fetcher backed by YouTube's timedtext endpoint.
pub struct YoutubeTranscriptFetcher {
    client: reqwest::Client,
    language: String,
}

impl YoutubeTranscriptFetcher {
    /// Create a fetcher preferring captions in the given language code.
    pub fn new(language: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            language: language.to_string(),
        })
    }

    async fn fetch_snippets(&self, video_id: &str) -> Result<Vec<TranscriptSnippet>> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);

        let page = self
            .client
            .get(&watch_url)
            .header("Accept-Language", "en-US,en")
            .send()
            .await?
            .error_for_status()
            .map_err(|e| TubechatError::Transcript(format!("watch page request failed: {}", e)))?
            .text()
            .await?;

        let tracks = parse_caption_tracks(&page).ok_or_else(|| {
            TubechatError::Transcript(format!(
                "no captions available for video {}",
                video_id
            ))
        })?;

        let track = choose_track(&tracks, &self.language).ok_or_else(|| {
            TubechatError::Transcript(format!(
                "no caption tracks listed for video {}",
                video_id
            ))
        })?;

        debug!(
            "Fetching timedtext for {} (language {})",
            video_id, track.language_code
        );

        let xml = self
            .client
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| TubechatError::Transcript(format!("timedtext request failed: {}", e)))?
            .text()
            .await?;

        Ok(parse_caption_xml(&xml))
    }
}

#[async_trait]
impl TranscriptFetcher for YoutubeTranscriptFetcher {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<String> {
        let snippets = self.fetch_snippets(video_id).await?;
        let text = flatten_snippets(&snippets);

        if text.trim().is_empty() {
            return Err(TubechatError::EmptyTranscript(video_id.to_string()));
        }

        debug!("Fetched {} caption lines for {}", snippets.len(), video_id);
        Ok(text)
    }
}

/// Pull the `captionTracks` JSON array out of the watch page HTML.
fn parse_caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| Regex::new(r#""captionTracks":(\[.*?\])"#).unwrap());

    let caps = pattern.captures(page)?;
    serde_json::from_str::<Vec<CaptionTrack>>(&caps[1]).ok()
}

/// Pick the track matching the preferred language, falling back to the first.
fn choose_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    tracks
        .iter()
        .find(|t| t.language_code.starts_with(language))
        .or_else(|| tracks.first())
}

/// Parse a timedtext XML document into timed snippets.
fn parse_caption_xml(xml: &str) -> Vec<TranscriptSnippet> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r#"(?s)<text start="([0-9.]+)"(?: dur="([0-9.]+)")?[^>]*>(.*?)</text>"#)
            .unwrap()
    });

    pattern
        .captures_iter(xml)
        .map(|caps| {
            let start = caps[1].parse().unwrap_or(0.0);
            let duration = caps
                .get(2)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(0.0);
            TranscriptSnippet {
                text: unescape(&caps[3]),
                start,
                duration,
            }
        })
        .collect()
}

/// Decode XML entities. The timedtext feed escapes twice, so two passes.
fn unescape(text: &str) -> String {
    fn pass(s: &str) -> String {
        s.replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&apos;", "'")
            .replace("&amp;", "&")
    }
    pass(&pass(text))
}
