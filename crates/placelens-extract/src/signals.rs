//! Transcript-level signals: contact details, ratings, content type, script
//!
//! These never affect extraction. They describe the screenshot as a whole and
//! travel alongside the [`ExtractionResult`](placelens_core::ExtractionResult)
//! for the enrichment layer.

use placelens_core::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters of context kept on each side of a rating
const RATING_CONTEXT_CHARS: usize = 20;

/// Primary script share below which a transcript is mixed
const MIXED_LANGUAGE_RATIO: f32 = 0.7;

const PHONE_PATTERNS: &[&str] = &[
    r"\(?\b\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
    r"\+\d{1,3}[-.\s]?\d{3,4}[-.\s]?\d{3,4}[-.\s]?\d{3,4}\b",
];

const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b";

const WEBSITE_PATTERN: &str = r"https?://[^\s]+|www\.[^\s]+";

const HOURS_PATTERNS: &[&str] = &[
    r"(?i)\b(?:open|hours?):?\s*\d{1,2}(?::\d{2})?\s*(?:am|pm)?\s*[-–]\s*\d{1,2}(?::\d{2})?\s*(?:am|pm)?",
    r"(?i)\b\d{1,2}(?::\d{2})?\s*(?:am|pm)\s*[-–]\s*\d{1,2}(?::\d{2})?\s*(?:am|pm)",
    r"(?i)\b(?:opens|closes)\s+\d{1,2}:\d{2}(?:\s*(?:am|pm))?",
];

const RATING_PATTERNS: &[&str] = &[
    r"(?i)(\d+(?:\.\d+)?)\s*(?:stars?\b|★|☆)",
    r"(\d+(?:\.\d+)?)\s*/\s*5\b",
    r"(\d+(?:\.\d+)?)\s*/\s*10\b",
    r"(?i)rating:\s*(\d+(?:\.\d+)?)",
];

/// What kind of screenshot a transcript most likely came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    SocialMedia,
    TravelItinerary,
    MapScreenshot,
    RestaurantReview,
    BusinessListing,
    MixedContent,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::SocialMedia => "social_media",
            ContentType::TravelItinerary => "travel_itinerary",
            ContentType::MapScreenshot => "map_screenshot",
            ContentType::RestaurantReview => "restaurant_review",
            ContentType::BusinessListing => "business_listing",
            ContentType::MixedContent => "mixed_content",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            ContentType::SocialMedia => &[
                "like", "comment", "share", "follow", "post", "@", "#", "ago", "minutes",
                "hours", "days", "story", "feed", "timeline", "retweet", "favorite",
                "instagram", "facebook",
            ],
            ContentType::TravelItinerary => &[
                "day 1", "day 2", "day 3", "itinerary", "trip", "hotel", "lodge", "trail",
                "park", "visitor center", "national park", "推荐", "住", "第一天", "第二天",
                "accommodation", "check-in",
            ],
            ContentType::MapScreenshot => &[
                "directions", "route", "km", "miles", "min drive", "traffic",
                "fastest route", "avoid tolls", "satellite", "terrain", "transit", "walking",
            ],
            ContentType::RestaurantReview => &[
                "rating", "stars", "review", "menu", "price", "service", "food",
                "atmosphere", "recommend", "delicious", "tasty", "reservation", "hours",
                "open", "closed",
            ],
            ContentType::BusinessListing => &[
                "phone", "website", "hours", "address", "reviews", "rating", "photos",
                "menu", "call", "directions", "overview", "about", "contact",
            ],
            ContentType::MixedContent => &[],
        }
    }

    const DETECTABLE: [ContentType; 5] = [
        ContentType::SocialMedia,
        ContentType::TravelItinerary,
        ContentType::MapScreenshot,
        ContentType::RestaurantReview,
        ContentType::BusinessListing,
    ];
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dominant script of a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    English,
    Chinese,
    Japanese,
    Korean,
    Mixed,
    Unknown,
}

/// Phones, emails, websites and opening hours, in order of appearance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub phones: Vec<String>,
    pub emails: Vec<String>,
    pub websites: Vec<String>,
    pub hours: Vec<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
            && self.emails.is_empty()
            && self.websites.is_empty()
            && self.hours.is_empty()
    }
}

/// A rating value with the text around it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub value: f32,
    pub context: String,
    /// Byte span of the match
    pub span: (usize, usize),
}

/// Everything [`SignalExtractor`] learns about one transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSignals {
    pub content_type: ContentType,
    pub content_confidence: f32,
    pub language: Language,
    pub contact: ContactInfo,
    pub ratings: Vec<Rating>,
}

/// Compiled matchers for transcript signals
pub struct SignalExtractor {
    phones: Vec<Regex>,
    email: Regex,
    website: Regex,
    hours: Vec<Regex>,
    ratings: Vec<Regex>,
}

impl SignalExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            phones: compile_all(PHONE_PATTERNS)?,
            email: compile(EMAIL_PATTERN)?,
            website: compile(WEBSITE_PATTERN)?,
            hours: compile_all(HOURS_PATTERNS)?,
            ratings: compile_all(RATING_PATTERNS)?,
        })
    }

    /// Collect all signals for `text`
    pub fn extract(&self, text: &str) -> TranscriptSignals {
        let (content_type, content_confidence) = detect_content_type(text);
        TranscriptSignals {
            content_type,
            content_confidence,
            language: detect_language(text),
            contact: self.contact_info(text),
            ratings: self.ratings(text),
        }
    }

    pub fn contact_info(&self, text: &str) -> ContactInfo {
        ContactInfo {
            phones: find_all(&self.phones, text),
            emails: find_all(std::slice::from_ref(&self.email), text),
            websites: find_all(std::slice::from_ref(&self.website), text),
            hours: find_all(&self.hours, text),
        }
    }

    /// Ratings within [0, 10], ordered by position
    pub fn ratings(&self, text: &str) -> Vec<Rating> {
        let mut ratings: Vec<Rating> = Vec::new();
        for re in &self.ratings {
            for caps in re.captures_iter(text) {
                let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                let Ok(parsed) = value.as_str().parse::<f32>() else {
                    continue;
                };
                if !(0.0..=10.0).contains(&parsed) {
                    continue;
                }
                if ratings.iter().any(|r| r.span.0 == whole.start()) {
                    continue;
                }
                ratings.push(Rating {
                    value: parsed,
                    context: context_window(text, whole.start(), whole.end()),
                    span: (whole.start(), whole.end()),
                });
            }
        }
        ratings.sort_by_key(|r| r.span.0);
        ratings
    }
}

/// Keyword-share content type; `mixed_content` at 0.5 when nothing matches
pub fn detect_content_type(text: &str) -> (ContentType, f32) {
    let lower = text.to_lowercase();
    let mut best: Option<(ContentType, f32)> = None;

    for content_type in ContentType::DETECTABLE {
        let keywords = content_type.keywords();
        let matches = keywords.iter().filter(|k| lower.contains(*k)).count();
        if matches == 0 {
            continue;
        }
        let score = (matches as f32 / keywords.len() as f32).min(1.0);
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((content_type, score));
        }
    }

    best.unwrap_or((ContentType::MixedContent, 0.5))
}

/// Script-share language detection
pub fn detect_language(text: &str) -> Language {
    let mut counts = [
        (Language::English, 0usize),
        (Language::Chinese, 0),
        (Language::Japanese, 0),
        (Language::Korean, 0),
    ];

    for c in text.chars() {
        let slot = match c {
            'A'..='Z' | 'a'..='z' => 0,
            '\u{4e00}'..='\u{9fff}' => 1,
            '\u{3040}'..='\u{30ff}' => 2,
            '\u{ac00}'..='\u{d7af}' => 3,
            _ => continue,
        };
        counts[slot].1 += 1;
    }

    let total: usize = counts.iter().map(|(_, n)| n).sum();
    if total == 0 {
        return Language::Unknown;
    }

    let (primary, primary_count) = counts
        .iter()
        .copied()
        .fold((Language::Unknown, 0), |best, (lang, n)| if n > best.1 { (lang, n) } else { best });

    if (primary_count as f32 / total as f32) < MIXED_LANGUAGE_RATIO {
        Language::Mixed
    } else {
        primary
    }
}

/// Distinct matches across `patterns`; a match overlapping an earlier one is
/// skipped
fn find_all(patterns: &[Regex], text: &str) -> Vec<String> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut found: Vec<String> = Vec::new();
    for re in patterns {
        for m in re.find_iter(text) {
            if spans.iter().any(|&(s, e)| m.start() < e && s < m.end()) {
                continue;
            }
            spans.push((m.start(), m.end()));
            let value = m.as_str().trim().to_string();
            if !found.contains(&value) {
                found.push(value);
            }
        }
    }
    found
}

fn context_window(text: &str, start: usize, end: usize) -> String {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(RATING_CONTEXT_CHARS - 1)
        .map_or(0, |(i, _)| i);
    let to = text[end..]
        .char_indices()
        .nth(RATING_CONTEXT_CHARS)
        .map_or(text.len(), |(i, _)| end + i);
    text[from..to].trim().to_string()
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        Error::config(format!("Failed to compile signal pattern '{}': {}", pattern, e))
    })
}

fn compile_all(patterns: &[&str]) -> Result<Vec<Regex>> {
    patterns.iter().map(|p| compile(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_info() {
        let extractor = SignalExtractor::new().unwrap();
        let text = "Acme Bread\n(510) 524-1327\nwww.acmebread.com\nhello@acmebread.com\nOpen 8:00 am - 3:00 pm\nCloses 15:00";
        let contact = extractor.contact_info(text);

        assert_eq!(contact.phones, vec!["(510) 524-1327"]);
        assert_eq!(contact.emails, vec!["hello@acmebread.com"]);
        assert_eq!(contact.websites, vec!["www.acmebread.com"]);
        assert_eq!(contact.hours.len(), 2);
        assert!(contact.hours[0].starts_with("Open 8:00 am"));
        assert_eq!(contact.hours[1], "Closes 15:00");
    }

    #[test]
    fn test_contact_dedup() {
        let extractor = SignalExtractor::new().unwrap();
        let contact = extractor.contact_info("call 510-524-1327 or 510-524-1327");
        assert_eq!(contact.phones.len(), 1);
        assert!(extractor.contact_info("Tilden Park").is_empty());
    }

    #[test]
    fn test_ratings() {
        let extractor = SignalExtractor::new().unwrap();
        let ratings =
            extractor.ratings("Funky Elephant 4.5 stars, food 8/10. Rating: 4.2 and 42 stars");

        let values: Vec<f32> = ratings.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![4.5, 8.0, 4.2]);
        assert!(ratings[0].context.contains("Funky Elephant"));
    }

    #[test]
    fn test_rating_context_is_char_safe() {
        let extractor = SignalExtractor::new().unwrap();
        let text = "京都の抹茶カフェがとても美味しかったです評価 4.8★ 次も行きたい";
        let ratings = extractor.ratings(text);
        assert_eq!(ratings.len(), 1);
        assert_eq!(ratings[0].value, 4.8);
    }

    #[test]
    fn test_content_type() {
        let (kind, confidence) =
            detect_content_type("Day 1: check-in at the lodge, hike the trail");
        assert_eq!(kind, ContentType::TravelItinerary);
        assert!(confidence > 0.0 && confidence <= 1.0);

        assert_eq!(
            detect_content_type("Xyzzy"),
            (ContentType::MixedContent, 0.5)
        );
    }

    #[test]
    fn test_language() {
        assert_eq!(detect_language("Tilden Regional Park"), Language::English);
        assert_eq!(detect_language("北京市朝阳区"), Language::Chinese);
        assert_eq!(detect_language("きょうと"), Language::Japanese);
        assert_eq!(detect_language("서울"), Language::Korean);
        assert_eq!(detect_language("Kyoto 京都駅前の商店街"), Language::Mixed);
        assert_eq!(detect_language("1234 !!"), Language::Unknown);
    }
}
