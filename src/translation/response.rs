//! Schema for the machine-translation endpoint's response.
//!
//! The endpoint answers with nested arrays:
//!
//! ```text
//! [[["Hola ", "Hello ", null, null, 10], ["mundo", "world", null, null, 10]], null, "en", ...]
//! ```
//!
//! The first element is the segment list; each segment is a tuple whose first
//! item is the translated chunk and whose second item is the source chunk.
//! Anything that does not fit this shape is rejected.

use super::TranslateError;
use serde_json::Value;

/// One translated chunk of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub translated: String,
    pub original: Option<String>,
}

/// A validated response: a non-empty, ordered list of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationResponse {
    segments: Vec<Segment>,
}

impl TranslationResponse {
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Full translation: every segment's translated chunk, in order.
    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|segment| segment.translated.as_str())
            .collect()
    }

    fn from_value(value: &Value) -> Result<Self, TranslateError> {
        let root = value
            .as_array()
            .ok_or(TranslateError::Malformed("response is not an array"))?;

        let tuples = root
            .first()
            .and_then(Value::as_array)
            .ok_or(TranslateError::Malformed("missing segment list"))?;

        if tuples.is_empty() {
            return Err(TranslateError::Malformed("segment list is empty"));
        }

        let segments = tuples
            .iter()
            .map(parse_segment)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { segments })
    }
}

fn parse_segment(tuple: &Value) -> Result<Segment, TranslateError> {
    let items = tuple
        .as_array()
        .ok_or(TranslateError::Malformed("segment is not an array"))?;

    let translated = items
        .first()
        .and_then(Value::as_str)
        .ok_or(TranslateError::Malformed("segment has no translated text"))?;

    let original = items.get(1).and_then(Value::as_str).map(str::to_string);

    Ok(Segment {
        translated: translated.to_string(),
        original,
    })
}

/// Parse and validate a raw response body.
pub fn parse_translation_response(body: &str) -> Result<TranslationResponse, TranslateError> {
    let value: Value = serde_json::from_str(body)?;
    TranslationResponse::from_value(&value)
}
