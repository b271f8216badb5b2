//! Transcript input loading
//!
//! - `-` or no input: stdin, read as one plain-text transcript
//! - `*.jsonl`: one `{"text": .., "ocr_confidence": ..}` object per line
//! - `*.json`: one such object or an array of them
//! - anything else: the whole file is one plain-text transcript

use anyhow::Context;
use placelens_core::Transcript;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// A transcript with the place it was read from
#[derive(Debug, Clone)]
pub struct LabeledTranscript {
    pub source: String,
    pub transcript: Transcript,
}

#[derive(Debug, Deserialize)]
struct TranscriptRecord {
    text: String,
    #[serde(default)]
    ocr_confidence: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonInput {
    Many(Vec<TranscriptRecord>),
    One(TranscriptRecord),
}

/// Load every transcript named by `inputs`
pub fn load_inputs(
    inputs: &[String],
    default_confidence: f32,
) -> anyhow::Result<Vec<LabeledTranscript>> {
    if inputs.is_empty() {
        return load_stdin(default_confidence);
    }

    let mut transcripts = Vec::new();
    for input in inputs {
        if input == "-" {
            transcripts.extend(load_stdin(default_confidence)?);
        } else {
            transcripts.extend(load_file(Path::new(input), default_confidence)?);
        }
    }
    Ok(transcripts)
}

fn load_stdin(default_confidence: f32) -> anyhow::Result<Vec<LabeledTranscript>> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(vec![LabeledTranscript {
        source: "<stdin>".to_string(),
        transcript: Transcript::new(text, default_confidence),
    }])
}

fn load_file(path: &Path, default_confidence: f32) -> anyhow::Result<Vec<LabeledTranscript>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let label = path.display().to_string();

    let labeled = |source: String, record: TranscriptRecord| LabeledTranscript {
        source,
        transcript: Transcript::new(
            record.text,
            record.ocr_confidence.unwrap_or(default_confidence),
        ),
    };

    match path.extension().and_then(|e| e.to_str()) {
        Some("jsonl") => content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| -> anyhow::Result<LabeledTranscript> {
                let record: TranscriptRecord = serde_json::from_str(line)
                    .with_context(|| format!("{}:{}: invalid transcript record", label, n + 1))?;
                Ok(labeled(format!("{}:{}", label, n + 1), record))
            })
            .collect(),
        Some("json") => {
            let input: JsonInput = serde_json::from_str(&content)
                .with_context(|| format!("{}: invalid transcript JSON", label))?;
            Ok(match input {
                JsonInput::One(record) => vec![labeled(label, record)],
                JsonInput::Many(records) => records
                    .into_iter()
                    .enumerate()
                    .map(|(i, record)| labeled(format!("{}[{}]", label, i), record))
                    .collect(),
            })
        }
        _ => Ok(vec![LabeledTranscript {
            source: label,
            transcript: Transcript::new(content, default_confidence),
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.txt");
        std::fs::write(&path, "Acme Bread\nBerkeley").unwrap();

        let loaded = load_file(&path, 0.8).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].transcript.text(), "Acme Bread\nBerkeley");
        assert_eq!(loaded[0].transcript.ocr_confidence(), 0.8);
    }

    #[test]
    fn test_jsonl_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots.jsonl");
        std::fs::write(
            &path,
            "{\"text\": \"Acme Bread\", \"ocr_confidence\": 0.6}\n\n{\"text\": \"123 Main Street\"}\n",
        )
        .unwrap();

        let loaded = load_file(&path, 0.8).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].transcript.ocr_confidence(), 0.6);
        assert_eq!(loaded[1].transcript.ocr_confidence(), 0.8);
        assert!(loaded[1].source.ends_with(":3"));
    }

    #[test]
    fn test_json_array_and_object() {
        let dir = tempfile::tempdir().unwrap();
        let many = dir.path().join("many.json");
        std::fs::write(&many, r#"[{"text": "a"}, {"text": "b", "ocr_confidence": 0.5}]"#).unwrap();
        let one = dir.path().join("one.json");
        std::fs::write(&one, r#"{"text": "Tilden Park"}"#).unwrap();

        assert_eq!(load_file(&many, 0.8).unwrap().len(), 2);
        let loaded = load_file(&one, 0.8).unwrap();
        assert_eq!(loaded[0].transcript.text(), "Tilden Park");
    }

    #[test]
    fn test_invalid_jsonl_reports_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "{\"text\": \"ok\"}\nnot json\n").unwrap();

        let err = load_file(&path, 0.8).unwrap_err();
        assert!(format!("{:#}", err).contains(":2"));
    }
}
