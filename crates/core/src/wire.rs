//! JSON shapes exchanged with the generation service.
//!
//! `POST /api/generate` answers with
//! `{"success": bool, "thumbnails": [...], "error": "...", "message": "...", "request_id": "..."}`.
//! Thumbnail records are kept as raw [`serde_json::Value`]s so that one
//! malformed record cannot fail the whole body; [`RawThumbnail`] reads
//! each field leniently.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Multipart field carrying the video bytes.
pub const FIELD_VIDEO: &str = "video";
/// Multipart field carrying the title.
pub const FIELD_TITLE: &str = "title";
/// Multipart field carrying the genre wire value.
pub const FIELD_GENRE: &str = "genre";
/// Multipart field carrying the model wire value.
pub const FIELD_MODEL: &str = "model";
/// Multipart field carrying the variant count as a decimal string.
pub const FIELD_VARIANTS: &str = "variants";

/// Path of the generation endpoint relative to the service base URL.
pub const GENERATE_PATH: &str = "/api/generate";

/// Error text used when the service reports failure without a reason.
pub const DEFAULT_FAILURE_MESSAGE: &str = "Generation failed";

/// Top-level body of a generation response.
///
/// Every field is optional and read leniently: a missing or non-boolean
/// `success` reads as `false`, and a value of the wrong JSON type reads as
/// absent instead of failing the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub success: bool,
    #[serde(default, deserialize_with = "lenient_list")]
    pub thumbnails: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub error: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub request_id: Option<String>,
}

/// Parse a generation response body.
///
/// Fails only when the body is not a JSON object.
pub fn parse_generate_response(body: &[u8]) -> Result<GenerateResponse, serde_json::Error> {
    serde_json::from_slice(body)
}

fn lenient_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

fn lenient_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<Value>>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(Some(items)),
        _ => Ok(None),
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// One thumbnail record with every field read leniently.
///
/// Fields of the wrong JSON type read as absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawThumbnail {
    pub id: Option<String>,
    pub url: Option<String>,
    pub download_url: Option<String>,
    pub scene_type: Option<String>,
    pub score: Option<f64>,
    pub filename: Option<String>,
}

impl RawThumbnail {
    /// Read a record from arbitrary JSON; non-objects yield an empty record.
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name);
        let text = |name: &str| field(name).and_then(Value::as_str).map(str::to_string);

        Self {
            id: field("id").and_then(id_text),
            url: text("url"),
            download_url: text("download_url"),
            scene_type: text("scene_type"),
            score: field("score").and_then(Value::as_f64),
            filename: text("filename"),
        }
    }
}

/// Ids arrive as integers from the service but strings are accepted too.
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
