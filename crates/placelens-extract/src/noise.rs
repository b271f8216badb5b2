//! OCR noise and UI-chrome filtering
//!
//! Decides whether a span of OCR text is screen furniture or recognition
//! garbage, strips UI fragments out of spans worth keeping, and repairs
//! digit/letter look-alike confusions.

use crate::config::NoiseConfig;
use aho_corasick::{AhoCorasick, MatchKind};
use placelens_core::{Error, Result};
use regex::Regex;
use std::collections::HashSet;

const MIN_CHARS: usize = 3;
const MAX_CHARS: usize = 80;

/// Share of garbage tokens above which a span is noise
const GARBAGE_TOKEN_RATIO: f32 = 0.6;

/// Share of tokens of length <= 3 above which a span is noise
const SHORT_TOKEN_RATIO: f32 = 0.7;
const SHORT_TOKEN_LEN: usize = 3;

/// Whole-span UI chrome: status words, buttons, tab labels
const UI_TERMS: &[&str] = &[
    "overview", "menu", "hours", "open", "opens", "closed", "closes", "open now",
    "closed now", "reviews", "review", "photos", "directions", "call", "website",
    "share", "save", "saved", "start", "about", "nearby", "updates", "more",
    "see more", "order online", "today", "tomorrow", "yesterday", "am", "pm",
    "mon", "tue", "wed", "thu", "fri", "sat", "sun", "like", "comment", "follow",
];

/// Fragments that mark a span as UI chrome wherever they occur
const UI_FRAGMENTS: &[&str] = &[
    "★", "☆", "⭐", "$$", "saved in", "send to phone", "write a review",
    "see photos", "sponsored", "open in maps", "add a photo", "suggest an edit",
];

/// Tokens OCR produces from map tiles, icons, and image texture
const GARBAGE_TOKENS: &[&str] = &[
    "es", "ee", "eee", "ae", "oe", "ea", "sie", "oy", "og", "ws", "ke", "al", "ye",
    "at", "be", "se", "et", "ed", "sa", "fe", "wf", "xy", "kx", "ix", "rs", "pe",
    "na", "nae", "ole", "als", "mre", "wi", "dat", "nic", "tint", "au", "hf", "vb",
    "ek", "ses", "aw", "fes", "aye", "ney", "vs", "gv", "ard", "sar", "ess", "hare",
    "ghee", "bens", "oras", "sant", "le", "ne", "ie", "ii", "iii", "lil", "zz",
];

/// Shapes that are never a place name
const NOISE_SHAPES: &[&str] = &[
    // bare short digit runs
    r"^\d{1,4}$",
    // single capital letters, optionally with trailing punctuation
    r"^[A-Z][\W_]*$",
    // punctuation only
    r"^[\W_]+$",
    // numbers and separators only
    r"^[\d\s.,:;%()/+\-]+$",
    // clock times
    r"^\d{1,2}:\d{2}\s*(?:[AaPp][Mm])?$",
    // short garbage runs
    r"(?i)^(?:e{2,}|sie|ses|nae|oy|og|ae|oe)$",
];

/// Replacement rules applied in order by [`NoiseFilter::strip_ui_noise`]
const UI_STRIP_RULES: &[&str] = &[
    // ratings: "4.3 (223)", "47 (101)", "4,5 (1.2k)"
    r"\b\d{1,2}(?:[.,]\d)?\s*\(\s*\d[\d,.\s]*[kK]?\s*\)",
    // rating glyphs
    r"[★☆⭐✩✪]+",
    // price ranges: "$10–20", "$$$"
    r"\$\d+(?:\s*[-–]\s*\$?\d+)?\+?",
    r"\${1,4}",
    // multi-word status, optionally timed
    r"(?i)\b(?:open 24 hours|open now|closing soon|closed now)\b(?:\s+\d{1,2}(?::\d{2})?\s*(?:[ap]\.?m\.?)?)?",
    // single-word status followed by a time
    r"(?i)\b(?:opens?|closes?|closed)\s+\d{1,2}(?::\d{2})?\s*(?:[ap]\.?m\.?)?",
    // clock times
    r"\b\d{1,2}:\d{2}(?:\s*[AaPp][Mm])?\b",
    // durations and distances
    r"(?i)\b\d+(?:\.\d+)?\s*(?:min|mins|minutes|hr|hrs|hours?|km|mi|miles)\b",
    // list membership
    r"(?i)\bsaved in\s+\S+",
];

/// Button labels and bare status words. These double as ordinary words
/// ("Open Kitchen", "Share Tea"), so they are only stripped in runs of two
/// or more, at the end of a span, or between separators.
const BUTTON_LABELS: &str = r"send to phone|order online|reserve a table|directions|start|saved?|share|call|website|overview|menu|reviews|photos|nearby|updates|open|opens|closed|closes";

/// Separators that delimit UI fields on one line
const FIELD_SEPARATORS: &str = r"[-–·|•]";

/// Look-alike repairs, applied in order: (digit, uppercase, lowercase, trigger)
const ARTIFACT_RULES: &[ArtifactRule] = &[
    ArtifactRule { digit: '0', upper: 'O', lower: 'o', trigger: Trigger::AnyLetter },
    ArtifactRule { digit: '1', upper: 'I', lower: 'i', trigger: Trigger::Before(&['l', 'I']) },
    ArtifactRule { digit: '5', upper: 'S', lower: 's', trigger: Trigger::Before(&['S', 's']) },
    ArtifactRule { digit: '8', upper: 'B', lower: 'b', trigger: Trigger::Before(&['B', 'b']) },
];

#[derive(Debug, Clone, Copy)]
enum Trigger {
    /// A letter on either side
    AnyLetter,
    /// One of these letters follows, or letters on both sides
    Before(&'static [char]),
}

#[derive(Debug, Clone, Copy)]
struct ArtifactRule {
    digit: char,
    upper: char,
    lower: char,
    trigger: Trigger,
}

impl ArtifactRule {
    fn apply(&self, text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::with_capacity(text.len());

        for (i, &c) in chars.iter().enumerate() {
            if c != self.digit {
                out.push(c);
                continue;
            }

            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();

            // Genuine numerals keep their digits.
            if prev.is_some_and(|p| p.is_ascii_digit())
                || next.is_some_and(|n| n.is_ascii_digit())
            {
                out.push(c);
                continue;
            }

            let prev_letter = prev.filter(|p| p.is_ascii_alphabetic());
            let next_letter = next.filter(|n| n.is_ascii_alphabetic());

            let fires = match self.trigger {
                Trigger::AnyLetter => prev_letter.is_some() || next_letter.is_some(),
                Trigger::Before(letters) => {
                    next_letter.is_some_and(|n| letters.contains(&n))
                        || (prev_letter.is_some() && next_letter.is_some())
                }
            };

            if !fires {
                out.push(c);
                continue;
            }

            let lowercase = match (prev_letter, next_letter) {
                (Some(_), Some(n)) => n.is_ascii_lowercase(),
                (Some(p), None) => p.is_ascii_lowercase(),
                _ => false,
            };
            out.push(if lowercase { self.lower } else { self.upper });
        }

        out
    }
}

/// Classifies and cleans individual text spans
pub struct NoiseFilter {
    ui_terms: HashSet<String>,
    ui_fragments: AhoCorasick,
    garbage_tokens: HashSet<String>,
    noise_shapes: Vec<Regex>,
    strip_rules: Vec<Regex>,
    label_runs: Regex,
    delimited_label: Regex,
    trailing_label: Regex,
    separator_runs: Regex,
}

impl NoiseFilter {
    /// Create a filter with the built-in vocabularies
    pub fn new() -> Result<Self> {
        Self::with_config(&NoiseConfig::default())
    }

    /// Create a filter with the built-in vocabularies extended by `config`
    pub fn with_config(config: &NoiseConfig) -> Result<Self> {
        let ui_terms = UI_TERMS
            .iter()
            .map(|t| t.to_string())
            .chain(config.ui_terms.iter().map(|t| t.trim().to_lowercase()))
            .collect();

        let fragments: Vec<String> = UI_FRAGMENTS
            .iter()
            .map(|t| t.to_string())
            .chain(config.ui_fragments.iter().cloned())
            .filter(|f| !f.is_empty())
            .collect();

        let ui_fragments = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .match_kind(MatchKind::LeftmostFirst)
            .build(&fragments)
            .map_err(|e| Error::config(format!("Failed to build UI fragment matcher: {}", e)))?;

        let garbage_tokens = GARBAGE_TOKENS
            .iter()
            .map(|t| t.to_string())
            .chain(config.garbage_tokens.iter().map(|t| t.trim().to_lowercase()))
            .collect();

        Ok(Self {
            ui_terms,
            ui_fragments,
            garbage_tokens,
            noise_shapes: compile_all(NOISE_SHAPES)?,
            strip_rules: compile_all(UI_STRIP_RULES)?,
            label_runs: compile(&format!(
                r"(?i)\b(?:{l})\b(?:\s+\b(?:{l})\b)+",
                l = BUTTON_LABELS
            ))?,
            delimited_label: compile(&format!(
                r"(?i)(^|{s})\s*\b(?:{l})\b\s*({s}|$)",
                l = BUTTON_LABELS,
                s = FIELD_SEPARATORS
            ))?,
            trailing_label: compile(&format!(r"(?i)\s\b(?:{})\b\s*$", BUTTON_LABELS))?,
            separator_runs: compile(r"(?:\s*[-–—]\s*){2,}")?,
        })
    }

    /// Whether a span is OCR noise or UI chrome
    pub fn is_noise(&self, text: &str) -> bool {
        let trimmed = text.trim();
        let char_count = trimmed.chars().count();
        if !(MIN_CHARS..=MAX_CHARS).contains(&char_count) {
            return true;
        }

        if self.is_ui_chrome(trimmed) {
            return true;
        }

        if self.noise_shapes.iter().any(|re| re.is_match(trimmed)) {
            return true;
        }

        self.is_token_garbage(trimmed)
    }

    /// Whether a span is (or contains) UI vocabulary
    pub fn is_ui_chrome(&self, text: &str) -> bool {
        let bare = text
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_lowercase();
        self.ui_terms.contains(&bare) || self.ui_fragments.is_match(text)
    }

    /// Token-ratio test: mostly garbage vocabulary, or mostly tiny tokens
    fn is_token_garbage(&self, text: &str) -> bool {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        if tokens.is_empty() {
            return false;
        }

        let total = tokens.len() as f32;
        let mut garbage = 0usize;
        let mut short = 0usize;

        for token in &tokens {
            let bare = token.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
            if self.garbage_tokens.contains(&bare) {
                garbage += 1;
            }
            if bare.chars().count() <= SHORT_TOKEN_LEN {
                short += 1;
            }
        }

        garbage as f32 / total > GARBAGE_TOKEN_RATIO || short as f32 / total > SHORT_TOKEN_RATIO
    }

    /// Repair digit/letter look-alikes that sit against letters
    pub fn clean_artifacts(&self, text: &str) -> String {
        clean_artifacts(text)
    }

    /// Remove ratings, prices, durations, status and button words
    pub fn strip_ui_noise(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for rule in &self.strip_rules {
            cleaned = rule.replace_all(&cleaned, " ").into_owned();
        }
        cleaned = self.label_runs.replace_all(&cleaned, " ").into_owned();
        cleaned = self
            .delimited_label
            .replace_all(&cleaned, "${1} ${2}")
            .into_owned();
        cleaned = self.trailing_label.replace_all(&cleaned, " ").into_owned();
        cleaned = self.separator_runs.replace_all(&cleaned, " - ").into_owned();

        let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed
            .trim_matches(|c: char| c.is_whitespace() || "-–—·:;,|".contains(c))
            .to_string()
    }
}

/// Apply the ordered look-alike repairs
pub fn clean_artifacts(text: &str) -> String {
    ARTIFACT_RULES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::config(format!("Failed to compile noise pattern '{}': {}", pattern, e)))
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> NoiseFilter {
        NoiseFilter::new().unwrap()
    }

    #[test]
    fn test_length_bounds() {
        let f = filter();
        assert!(f.is_noise(""));
        assert!(f.is_noise("   "));
        assert!(f.is_noise("ab"));
        assert!(f.is_noise(&"Long Name ".repeat(9)));
        assert!(!f.is_noise("Acme Bread"));
    }

    #[test]
    fn test_ui_chrome() {
        let f = filter();
        assert!(f.is_noise("Overview"));
        assert!(f.is_noise("  Menu "));
        assert!(f.is_noise("Closed"));
        assert!(f.is_noise("Saved in Want to go"));
        assert!(f.is_noise("4.5 ★★★★"));
        assert!(!f.is_noise("Open Kitchen Cafe"));
    }

    #[test]
    fn test_noise_shapes() {
        let f = filter();
        assert!(f.is_noise("123"));
        assert!(f.is_noise("A ."));
        assert!(f.is_noise("-- // --"));
        assert!(f.is_noise("(1, 278)"));
        assert!(f.is_noise("08:00"));
        assert!(f.is_noise("eeee"));
    }

    #[test]
    fn test_token_ratios() {
        let f = filter();
        // every token three letters or fewer
        assert!(f.is_noise("xyz qq aa bb"));
        // garbage vocabulary majority
        assert!(f.is_noise("ee ghee bens oras Kyoto"));
        // real names survive
        assert!(!f.is_noise("Be Veo Suse Nery og"));
        assert!(!f.is_noise("123 Main Street"));
        assert!(!f.is_noise("Starbucks"));
    }

    #[test]
    fn test_single_short_token() {
        let f = filter();
        assert!(f.is_noise("Zoo"));
        assert!(f.is_noise("KFC"));
        assert!(f.is_noise("ghee"));
        assert!(!f.is_noise("Pier"));
        assert!(!f.is_noise("颐和园公园"));
    }

    #[test]
    fn test_configured_vocabulary() {
        let config = NoiseConfig {
            ui_terms: vec!["Book now".to_string()],
            ui_fragments: vec!["promoted".to_string()],
            garbage_tokens: vec![],
        };
        let f = NoiseFilter::with_config(&config).unwrap();
        assert!(f.is_noise("book now"));
        assert!(f.is_noise("Promoted listing here"));
    }

    #[test]
    fn test_clean_artifacts() {
        assert_eq!(clean_artifacts("0ak Street"), "Oak Street");
        assert_eq!(clean_artifacts("B0ston Market"), "Boston Market");
        assert_eq!(clean_artifacts("Ch1lli House"), "Chilli House");
        assert_eq!(clean_artifacts("5Sisters Cafe"), "SSisters Cafe");
        assert_eq!(clean_artifacts("Ca8bage Patch"), "Cabbage Patch");
        assert_eq!(clean_artifacts("Route 101, 5500 Broadway"), "Route 101, 5500 Broadway");
        assert_eq!(clean_artifacts("Pier 39"), "Pier 39");
    }

    #[test]
    fn test_strip_ui_noise() {
        let f = filter();
        assert_eq!(f.strip_ui_noise("Acme Bread 4.8 (1, 278) $$"), "Acme Bread");
        assert_eq!(
            f.strip_ui_noise("x - Chicken restaurant - - Open - Closes 00:00"),
            "x - Chicken restaurant"
        );
        assert_eq!(f.strip_ui_noise("Tilden Park 12 min Directions"), "Tilden Park");
        assert_eq!(f.strip_ui_noise("Cafe - Opens 08:00 Thu Saved in 1%"), "Cafe - Thu");
        assert_eq!(f.strip_ui_noise("  Solano Avenue  "), "Solano Avenue");
        assert_eq!(f.strip_ui_noise("Directions Overview es ee"), "es ee");
        assert_eq!(f.strip_ui_noise("Acme Bread Overview Menu"), "Acme Bread");
        assert_eq!(f.strip_ui_noise("Bakery - Closed - Ope"), "Bakery - Ope");
    }

    #[test]
    fn test_strip_keeps_name_words() {
        let f = filter();
        assert_eq!(f.strip_ui_noise("Open Kitchen Cafe"), "Open Kitchen Cafe");
        assert_eq!(f.strip_ui_noise("Share Tea House"), "Share Tea House");
        assert_eq!(f.strip_ui_noise("Share Tea House 4.6 (88)"), "Share Tea House");
    }
}
