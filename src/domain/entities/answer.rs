use serde::{Deserialize, Serialize};

use super::ScoredPoint;

/// A chunk that was placed in the prompt, for attribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub text: String,
    pub id: String,
}

impl Source {
    pub fn from_point(point: &ScoredPoint, max_chars: usize) -> Self {
        Self {
            text: truncate_chars(point.content(), max_chars),
            id: point.id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 10), "");
    }

    #[test]
    fn test_source_truncates_content() {
        let mut payload = serde_json::Map::new();
        payload.insert("content".into(), "x".repeat(500).into());
        let point = ScoredPoint {
            id: "abc".into(),
            payload,
            score: 0.9,
        };

        let source = Source::from_point(&point, 200);
        assert_eq!(source.id, "abc");
        assert_eq!(source.text.chars().count(), 200);
    }
}
