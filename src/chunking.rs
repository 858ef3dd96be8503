//! Recursive character text splitting.
//!
//! Splits transcript text into overlapping windows for embedding and retrieval.
//! Paragraph and line boundaries are preferred; a chunk only falls back to raw
//! character windows when no finer separator exists.

/// Separators tried in order. The empty string means fixed-size character windows.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

/// Recursive character text splitter with overlap.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. Sizes are measured in characters; the overlap is
    /// clamped below the chunk size.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    /// Split text into chunks of at most `chunk_size` characters.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, &SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let (idx, sep) = separators
            .iter()
            .enumerate()
            .find(|(_, s)| s.is_empty() || text.contains(**s))
            .map(|(i, s)| (i, *s))
            .unwrap_or((separators.len().saturating_sub(1), ""));

        if sep.is_empty() {
            return self.char_windows(text);
        }

        let rest = &separators[idx + 1..];
        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for part in text.split(sep) {
            if char_len(part) <= self.chunk_size {
                pending.push(part);
            } else {
                // Flush merged small parts first to keep output in document order
                chunks.extend(self.merge(&pending, sep));
                pending.clear();
                chunks.extend(self.split_with(part, rest));
            }
        }
        chunks.extend(self.merge(&pending, sep));

        chunks.retain(|c| !c.trim().is_empty());
        chunks
    }

    /// Pack adjacent splits into chunks up to `chunk_size`, carrying roughly
    /// `chunk_overlap` characters from the tail of each chunk into the next.
    fn merge(&self, splits: &[&str], sep: &str) -> Vec<String> {
        let sep_len = char_len(sep);
        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut total = 0usize;

        for split in splits {
            let len = char_len(split);
            let joined_len = total + len + if current.is_empty() { 0 } else { sep_len };

            if joined_len > self.chunk_size && !current.is_empty() {
                chunks.push(current.join(sep));

                // Drop from the front until within the overlap budget and the
                // incoming split fits.
                while total > self.chunk_overlap
                    || (total + len + sep_len > self.chunk_size && total > 0)
                {
                    let removed = current.remove(0);
                    total -= char_len(removed);
                    if !current.is_empty() {
                        total -= sep_len;
                    }
                }
            }

            if !current.is_empty() {
                total += sep_len;
            }
            current.push(split);
            total += len;
        }

        if !current.is_empty() {
            chunks.push(current.join(sep));
        }
        chunks
    }

    /// Fixed-size character windows for text with no usable separators.
    fn char_windows(&self, text: &str) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }

        let step = (self.chunk_size - self.chunk_overlap).max(1);
        let mut chunks = Vec::new();
        let mut start = 0;

        loop {
            let end = (start + self.chunk_size).min(chars.len());
            chunks.push(chars[start..end].iter().collect());
            if end == chars.len() {
                break;
            }
            start += step;
        }
        chunks
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = TextSplitter::new(800, 100);
        let chunks = splitter.split("a short transcript line");
        assert_eq!(chunks, vec!["a short transcript line"]);
    }

    #[test]
    fn test_empty_text_yields_nothing() {
        let splitter = TextSplitter::new(800, 100);
        assert!(splitter.split("").is_empty());
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let splitter = TextSplitter::new(50, 10);
        let text = (0..40)
            .map(|i| format!("line number {} of the transcript", i))
            .collect::<Vec<_>>()
            .join("\n");

        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50, "oversized chunk: {:?}", chunk);
        }
    }

    #[test]
    fn test_adjacent_chunks_overlap() {
        let splitter = TextSplitter::new(30, 12);
        let words: Vec<String> = (0..30).map(|i| format!("word{:02}", i)).collect();
        let text = words.join(" ");

        let chunks = splitter.split(&text);
        assert!(chunks.len() > 2);

        // The tail of each chunk reappears at the head of the next one
        for pair in chunks.windows(2) {
            let last_word = pair[0].split(' ').next_back().unwrap();
            assert!(
                pair[1].contains(last_word),
                "no overlap between {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_unbroken_text_falls_back_to_windows() {
        let splitter = TextSplitter::new(10, 2);
        let text = "x".repeat(25);

        let chunks = splitter.split(&text);
        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 10);
        }
        // Full coverage: total unique progress is at least the input length
        let step = 8; // chunk_size - overlap
        assert!(chunks.len() * step + 2 >= 25);
    }

    #[test]
    fn test_paragraphs_kept_together_when_small() {
        let splitter = TextSplitter::new(100, 0);
        let chunks = splitter.split("first paragraph\n\nsecond paragraph");
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].contains("first paragraph"));
        assert!(chunks[0].contains("second paragraph"));
    }
}
