//! Conversion of raw thumbnail records into [`ThumbnailAsset`]s.
//!
//! Pure, order-preserving and total. Rules per record:
//!
//! - `url`: kept as-is when it is an absolute `http`/`https` URL; otherwise
//!   treated as a path and rooted with a leading `/`. Missing -> `/`.
//! - `download_url`: kept when it is an absolute `http`/`https` URL;
//!   otherwise the normalised `url`.
//! - `id`, `scene_type`, `score`, `filename` pass through.

use serde_json::Value;
use url::Url;

use crate::types::ThumbnailAsset;
use crate::wire::RawThumbnail;

/// Normalise every record of a response, preserving order.
pub fn normalize(raw_thumbnails: &[Value]) -> Vec<ThumbnailAsset> {
    raw_thumbnails
        .iter()
        .map(|value| normalize_record(RawThumbnail::from_value(value)))
        .collect()
}

/// Normalise a single record.
pub fn normalize_record(raw: RawThumbnail) -> ThumbnailAsset {
    let url = match raw.url {
        Some(url) if is_absolute_http(&url) => url,
        Some(path) => root_path(&path),
        None => "/".to_string(),
    };

    let download_url = raw
        .download_url
        .filter(|u| is_absolute_http(u))
        .unwrap_or_else(|| url.clone());

    ThumbnailAsset {
        id: raw.id,
        url,
        download_url,
        scene_type: raw.scene_type,
        score: raw.score,
        filename: raw.filename,
    }
}

/// True when `candidate` parses as an absolute URL with an HTTP(S) scheme.
pub fn is_absolute_http(candidate: &str) -> bool {
    Url::parse(candidate.trim())
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

fn root_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
