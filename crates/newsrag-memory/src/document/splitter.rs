use serde::{Deserialize, Serialize};

use super::types::{SourceDocument, TextChunk};

fn default_chunk_size() -> usize {
    1000
}

fn default_separators() -> Vec<String> {
    vec!["\n\n".into(), "\n".into(), ".".into(), ",".into()]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SplitterConfig {
    /// Maximum chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Separators ordered from coarsest to finest.
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            separators: default_separators(),
        }
    }
}

/// Recursive separator splitter with no overlap between chunks.
///
/// The coarsest separator present in the text is tried first; pieces that
/// still exceed `chunk_size` are split with the next finer separator, and
/// finally at character boundaries. Adjacent small pieces are merged back
/// together while they fit.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    config: SplitterConfig,
}

impl TextSplitter {
    #[must_use]
    pub fn new(config: SplitterConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn split(&self, document: &SourceDocument) -> Vec<TextChunk> {
        if !document.is_fetched() || document.raw_text.is_empty() {
            return Vec::new();
        }

        let max = self.config.chunk_size.max(1);
        split_recursive(&document.raw_text, &self.config.separators, max)
            .into_iter()
            .map(str::trim)
            .filter(|piece| !piece.is_empty())
            .enumerate()
            .map(|(i, piece)| TextChunk {
                text: piece.to_owned(),
                source_url: document.url.clone(),
                sequence_index: i,
            })
            .collect()
    }

    #[must_use]
    pub fn split_documents(&self, documents: &[SourceDocument]) -> Vec<TextChunk> {
        documents.iter().flat_map(|doc| self.split(doc)).collect()
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Split `text` into contiguous slices of at most `max` characters.
///
/// Separators stay attached to the end of the piece they terminate, so the
/// slices concatenate back to `text` exactly.
fn split_recursive<'a>(text: &'a str, separators: &[String], max: usize) -> Vec<&'a str> {
    if char_len(text) <= max {
        return vec![text];
    }

    let Some((pos, sep)) = separators
        .iter()
        .enumerate()
        .find(|(_, s)| !s.is_empty() && text.contains(s.as_str()))
    else {
        return split_chars(text, max);
    };
    let finer = &separators[pos + 1..];

    let mut out = Vec::new();
    let mut run_start = 0;
    let mut run_len = 0;
    let mut cursor = 0;

    for piece in text.split_inclusive(sep.as_str()) {
        let piece_start = cursor;
        cursor += piece.len();
        let piece_len = char_len(piece);

        if piece_len > max {
            if run_len > 0 {
                out.push(&text[run_start..piece_start]);
            }
            out.extend(split_recursive(piece, finer, max));
            run_start = cursor;
            run_len = 0;
        } else if run_len + piece_len > max {
            out.push(&text[run_start..piece_start]);
            run_start = piece_start;
            run_len = piece_len;
        } else {
            run_len += piece_len;
        }
    }

    if run_len > 0 {
        out.push(&text[run_start..cursor]);
    }
    out
}

fn split_chars(text: &str, max: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in text.char_indices() {
        if count == max {
            out.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        out.push(&text[start..]);
    }
    out
}
