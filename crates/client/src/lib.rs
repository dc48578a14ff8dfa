//! Async client for the thumbnail generation service.
//!
//! Submits a video plus generation parameters, tracks the request
//! lifecycle in a single observable state, and downloads individual
//! thumbnails through an injected save capability.

pub mod api;
pub mod config;
pub mod download;
pub mod forge;
pub mod selection;
pub mod telemetry;

pub use config::ForgeConfig;
pub use download::{AssetDownloader, DirectorySaveTarget, SaveTarget};
pub use forge::{ForgeError, ThumbnailForge};
