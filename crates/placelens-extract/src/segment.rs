//! Transcript normalization and phrase segmentation

use placelens_core::Phrase;

/// Structural delimiters: line breaks, pipes, bullets and stars, brackets
const DELIMITERS: &[char] = &[
    '\n', '\r', '|', '•', '·', '●', '▪', '◦', '*', '★', '☆', '(', ')', '[', ']', '{',
    '}',
    '【', '】', '「', '」', '（', '）',
];

/// Normalize a raw transcript: unify line endings, collapse horizontal
/// whitespace on each line, drop blank lines, trim.
pub fn normalize_transcript(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Splits cleaned text into ordered candidate phrases
#[derive(Debug, Clone)]
pub struct PhraseSegmenter {
    min_chars: usize,
    max_chars: usize,
}

impl PhraseSegmenter {
    pub fn new(min_chars: usize, max_chars: usize) -> Self {
        Self {
            min_chars,
            max_chars,
        }
    }

    /// Split on structural delimiters, keeping phrases within the length
    /// window. `Phrase::index` is the segment's position before filtering.
    pub fn segment(&self, text: &str) -> Vec<Phrase> {
        text.split(DELIMITERS)
            .enumerate()
            .filter_map(|(index, raw)| {
                let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                let len = collapsed.chars().count();
                (len >= self.min_chars && len <= self.max_chars)
                    .then(|| Phrase::new(collapsed, index))
            })
            .collect()
    }
}

impl Default for PhraseSegmenter {
    fn default() -> Self {
        Self::new(3, 80)
    }
}
