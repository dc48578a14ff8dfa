//! Data model for a generation request and its results.
//!
//! [`VideoSelection`] and [`GenerationParams`] are immutable once built;
//! a new pick or a new form submission replaces them wholesale.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

// ---------------------------------------------------------------------------
// Parameter defaults
// ---------------------------------------------------------------------------

/// Title submitted when the user leaves the field blank.
pub const DEFAULT_TITLE: &str = "Video Title";
/// Fewest thumbnail variants the service will produce.
pub const MIN_VARIANTS: u32 = 5;
/// Most thumbnail variants the service will produce.
pub const MAX_VARIANTS: u32 = 30;
/// Variant count preselected in the form.
pub const DEFAULT_VARIANTS: u32 = 20;

// ---------------------------------------------------------------------------
// Video selection
// ---------------------------------------------------------------------------

/// Where the bytes of a picked file live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// A file on local disk, read when the request is built.
    Path(PathBuf),
    /// Bytes already held in memory.
    Memory(Arc<[u8]>),
}

/// A file handle as handed over by the platform's file picker, before
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    /// File name as shown to the user; sent as the multipart file name.
    pub name: String,
    /// Size reported by the picker.
    pub size_bytes: u64,
    /// MIME type reported by the picker, if any.
    pub mime_type: Option<String>,
    /// Where the bytes are read from when the request is built.
    pub source: VideoSource,
}

impl PickedFile {
    /// Describe a file on disk. The name is the final path component and the
    /// MIME type is derived from the extension.
    pub fn for_path(path: impl Into<PathBuf>, size_bytes: u64) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_for_path(&path).map(str::to_string);
        Self {
            name,
            size_bytes,
            mime_type,
            source: VideoSource::Path(path),
        }
    }

    /// Describe an in-memory file with an explicit MIME type.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: bytes.len() as u64,
            mime_type: Some(mime_type.into()),
            source: VideoSource::Memory(bytes.into()),
        }
    }
}

/// A picked file that passed validation.
///
/// Only [`crate::validation::validate`] constructs this, so `mime_type`
/// always starts with `video/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSelection {
    name: String,
    size_bytes: u64,
    mime_type: String,
    source: VideoSource,
}

impl VideoSelection {
    pub(crate) fn new(name: String, size_bytes: u64, mime_type: String, source: VideoSource) -> Self {
        Self {
            name,
            size_bytes,
            mime_type,
            source,
        }
    }

    /// File name sent with the `video` part.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes as reported at pick time.
    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// MIME type, always starting with `video/`.
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Location of the video bytes.
    pub fn source(&self) -> &VideoSource {
        &self.source
    }
}

/// Video extensions accepted by the generation service and their MIME types.
pub const VIDEO_EXTENSIONS: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("avi", "video/x-msvideo"),
    ("mov", "video/quicktime"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
];

/// Look up the MIME type for a path by its (case-insensitive) extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

// ---------------------------------------------------------------------------
// Generation parameters
// ---------------------------------------------------------------------------

/// Genre hint passed to the thumbnail models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    #[default]
    Drama,
    Family,
    Action,
    Romance,
    Thriller,
    Adventure,
}

impl Genre {
    pub const ALL: [Genre; 6] = [
        Genre::Drama,
        Genre::Family,
        Genre::Action,
        Genre::Romance,
        Genre::Thriller,
        Genre::Adventure,
    ];

    /// Wire value of this genre.
    pub fn as_str(self) -> &'static str {
        match self {
            Genre::Drama => "drama",
            Genre::Family => "family",
            Genre::Action => "action",
            Genre::Romance => "romance",
            Genre::Thriller => "thriller",
            Genre::Adventure => "adventure",
        }
    }
}

/// Which model family generates the thumbnails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    #[default]
    Hybrid,
    Netflix,
    Disney,
}

impl ModelKind {
    pub const ALL: [ModelKind; 3] = [ModelKind::Hybrid, ModelKind::Netflix, ModelKind::Disney];

    /// Wire value of this model.
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::Hybrid => "hybrid",
            ModelKind::Netflix => "netflix",
            ModelKind::Disney => "disney",
        }
    }
}

macro_rules! str_enum_impls {
    ($ty:ty, $field:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase();
                <$ty>::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| ValidationError::UnknownValue {
                        field: $field,
                        value: s.to_string(),
                        valid: <$ty>::ALL.map(|v| v.as_str()).join(", "),
                    })
            }
        }
    };
}

str_enum_impls!(Genre, "genre");
str_enum_impls!(ModelKind, "model");

/// Form values for one generation request.
///
/// `variant_count` is clamped into `[MIN_VARIANTS, MAX_VARIANTS]` on
/// construction, so out-of-range input never reaches the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationParams {
    title: String,
    genre: Genre,
    model: ModelKind,
    variant_count: u32,
}

impl GenerationParams {
    /// Build the form values. `title` is kept as typed (see
    /// [`effective_title`](Self::effective_title)) and `variant_count` is
    /// clamped into `[MIN_VARIANTS, MAX_VARIANTS]`.
    pub fn new(title: impl Into<String>, genre: Genre, model: ModelKind, variant_count: u32) -> Self {
        Self {
            title: title.into(),
            genre,
            model,
            variant_count: clamp_variants(variant_count),
        }
    }

    /// Title as typed, possibly blank.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title sent to the service: [`DEFAULT_TITLE`] when blank.
    pub fn effective_title(&self) -> &str {
        if self.title.trim().is_empty() {
            DEFAULT_TITLE
        } else {
            &self.title
        }
    }

    /// Genre hint sent as `genre`.
    pub fn genre(&self) -> Genre {
        self.genre
    }

    pub fn model(&self) -> ModelKind {
        self.model
    }

    pub fn variant_count(&self) -> u32 {
        self.variant_count
    }
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self::new("", Genre::default(), ModelKind::default(), DEFAULT_VARIANTS)
    }
}

/// Clamp a requested variant count into the supported range.
pub fn clamp_variants(requested: u32) -> u32 {
    requested.clamp(MIN_VARIANTS, MAX_VARIANTS)
}

// ---------------------------------------------------------------------------
// Thumbnail assets
// ---------------------------------------------------------------------------

/// One generated thumbnail candidate, self-contained after normalisation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailAsset {
    /// Server-assigned identifier, as text.
    ///
    /// Numeric ids are rendered in decimal; the original JSON type is not
    /// kept.
    pub id: Option<String>,
    /// Absolute URL or root-relative path of the preview image.
    pub url: String,
    /// Absolute URL for the full download, or `url` when none was supplied.
    pub download_url: String,
    /// Scene classification reported by the model, e.g. `close_up`.
    pub scene_type: Option<String>,
    /// Model confidence for this candidate.
    pub score: Option<f64>,
    /// Server-side file name, usable as a save name.
    pub filename: Option<String>,
}

impl ThumbnailAsset {
    /// Deterministic save name used when the caller suggests none.
    pub fn fallback_filename(&self) -> String {
        match &self.id {
            Some(id) => format!("thumbnail_{id}.jpg"),
            None => "thumbnail.jpg".to_string(),
        }
    }
}
