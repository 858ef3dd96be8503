//! Transcript fetching and video ID extraction.

mod youtube;

pub use youtube::YoutubeTranscriptFetcher;

use crate::error::Result;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

/// A single timed caption line.
#[derive(Debug, Clone)]
pub struct TranscriptSnippet {
    /// Caption text.
    pub text: String,
    /// Start time in seconds.
    pub start: f64,
    /// Duration in seconds.
    pub duration: f64,
}

/// Flatten timed snippets into plain text, one line per snippet.
///
/// Blank snippets are dropped.
pub fn flatten_snippets(snippets: &[TranscriptSnippet]) -> String {
    snippets
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Trait for transcript fetching implementations.
#[async_trait]
pub trait TranscriptFetcher: Send + Sync {
    /// Fetch the caption stream for a video and return it flattened to plain text.
    async fn fetch_transcript(&self, video_id: &str) -> Result<String>;
}

fn url_patterns() -> &'static [Regex; 4] {
    static PATTERNS: OnceLock<[Regex; 4]> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            Regex::new(r"youtube\.com/watch\?v=([a-zA-Z0-9_-]{11})").unwrap(),
            Regex::new(r"youtu\.be/([a-zA-Z0-9_-]{11})").unwrap(),
            Regex::new(r"youtube\.com/embed/([a-zA-Z0-9_-]{11})").unwrap(),
            // Catch-all for watch URLs where v= is not the first query parameter.
            Regex::new(r"youtube\.com/.*[?&]v=([a-zA-Z0-9_-]{11})").unwrap(),
        ]
    })
}

fn bare_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").unwrap())
}

/// Extract a YouTube video ID from a URL or bare ID.
///
/// Recognized shapes, checked in order: full watch URL, shortened youtu.be URL,
/// embed URL, watch URL with v= elsewhere in the query string, and a bare
/// 11-character ID. Purely syntactic; an 11-character string that is not a real
/// video ID is still accepted and fails later at fetch time.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    for pattern in url_patterns() {
        if let Some(caps) = pattern.captures(input) {
            return Some(caps[1].to_string());
        }
    }

    if bare_id_pattern().is_match(input) {
        return Some(input.to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_short_url() {
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_embed_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_v_param_anywhere() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=PLx&v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_bare_id() {
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("  dQw4w9WgXcQ  "),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn test_extract_rejects_other_strings() {
        assert_eq!(extract_video_id("not-a-url"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        // Too short / too long bare tokens
        assert_eq!(extract_video_id("abc123"), None);
        assert_eq!(extract_video_id("abcdefghijkl"), None);
    }

    #[test]
    fn test_flatten_snippets() {
        let snippets = vec![
            TranscriptSnippet {
                text: "hello".to_string(),
                start: 0.0,
                duration: 1.5,
            },
            TranscriptSnippet {
                text: "   ".to_string(),
                start: 1.5,
                duration: 0.5,
            },
            TranscriptSnippet {
                text: "world".to_string(),
                start: 2.0,
                duration: 1.0,
            },
        ];
        assert_eq!(flatten_snippets(&snippets), "hello\nworld");
    }
}
