//! Pre-flight check of a picked file.
//!
//! Runs before any network activity and has no side effects.

use crate::error::ValidationError;
use crate::types::{PickedFile, VideoSelection};

/// MIME prefix every accepted selection must carry.
pub const VIDEO_MIME_PREFIX: &str = "video/";

/// Accept a picked file as a [`VideoSelection`] if it is a video.
///
/// Rejects a missing file, a missing MIME type, and any MIME type that
/// does not start with `video/` followed by a non-empty subtype.
pub fn validate(file: Option<PickedFile>) -> Result<VideoSelection, ValidationError> {
    let Some(file) = file else {
        return Err(ValidationError::InvalidFileKind { found: None });
    };

    let is_video = file
        .mime_type
        .as_deref()
        .and_then(|mime| mime.strip_prefix(VIDEO_MIME_PREFIX))
        .is_some_and(is_valid_subtype);

    match (is_video, file.mime_type) {
        (true, Some(mime)) => Ok(VideoSelection::new(
            file.name,
            file.size_bytes,
            mime,
            file.source,
        )),
        (_, found) => Err(ValidationError::InvalidFileKind { found }),
    }
}

/// A MIME subtype is a non-empty run of token characters, optionally
/// followed by `;` parameters.
fn is_valid_subtype(rest: &str) -> bool {
    let subtype = rest.split(';').next().unwrap_or("").trim_end();
    !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
}
