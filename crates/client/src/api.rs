//! HTTP client for the thumbnail generation endpoint.
//!
//! Builds the multipart request, performs the single `POST /api/generate`
//! and maps every transport or server outcome onto [`SubmitError`].

use reqwest::multipart::{Form, Part};
use thumbforge_core::error::SubmitError;
use thumbforge_core::normalize::normalize;
use thumbforge_core::state::GenerationResult;
use thumbforge_core::types::{GenerationParams, VideoSelection, VideoSource};
use thumbforge_core::wire::{
    parse_generate_response, GenerateResponse, DEFAULT_FAILURE_MESSAGE, FIELD_GENRE, FIELD_MODEL,
    FIELD_TITLE, FIELD_VARIANTS, FIELD_VIDEO,
};

use crate::config::ForgeConfig;

/// Longest slice of an error body copied into logs.
const LOG_BODY_LIMIT: usize = 512;

/// HTTP client for one generation service.
#[derive(Debug, Clone)]
pub struct ForgeApi {
    client: reqwest::Client,
    generate_url: String,
}

impl ForgeApi {
    /// Create a new API client for the configured service.
    pub fn new(config: &ForgeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Create an API client reusing an existing [`reqwest::Client`]
    /// (shared with the asset downloader for connection pooling).
    pub fn with_client(client: reqwest::Client, config: &ForgeConfig) -> Self {
        Self {
            client,
            generate_url: config.generate_url(),
        }
    }

    /// Submit a generation request and return the raw, validated response.
    ///
    /// On `Ok`, `success` is true and `thumbnails` holds at least one record.
    pub async fn submit(
        &self,
        selection: &VideoSelection,
        params: &GenerationParams,
    ) -> Result<GenerateResponse, SubmitError> {
        let form = build_form(selection, params).await?;

        let response = self
            .client
            .post(&self.generate_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| SubmitError::Network(e.to_string()))?;

        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| status.as_str().to_string());
            tracing::warn!(
                status = status.as_u16(),
                body = %body_excerpt(&body),
                "Generation service returned an error status",
            );
            return Err(SubmitError::Server(status_text));
        }

        let parsed = parse_generate_response(&body)
            .map_err(|e| SubmitError::MalformedResponse(e.to_string()))?;
        check_response(parsed)
    }

    /// Submit and normalise in one step.
    pub async fn generate(
        &self,
        selection: &VideoSelection,
        params: &GenerationParams,
    ) -> Result<GenerationResult, SubmitError> {
        let response = self.submit(selection, params).await?;
        let raw = response.thumbnails.unwrap_or_default();
        let assets = normalize(&raw);

        tracing::info!(
            request_id = response.request_id.as_deref().unwrap_or("-"),
            count = assets.len(),
            "Thumbnails received",
        );

        Ok(GenerationResult {
            assets,
            message: response.message,
            request_id: response.request_id,
        })
    }
}

/// Apply the body-level success rules to a parsed response.
pub fn check_response(response: GenerateResponse) -> Result<GenerateResponse, SubmitError> {
    if !response.success {
        let reason = response
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
        tracing::warn!(error = %reason, "Generation service reported failure");
        return Err(SubmitError::Server(reason));
    }

    let has_thumbnails = response
        .thumbnails
        .as_ref()
        .is_some_and(|list| !list.is_empty());
    if has_thumbnails {
        Ok(response)
    } else {
        Err(SubmitError::EmptyResult)
    }
}

/// Build the multipart body: `video`, `title`, `genre`, `model`, `variants`.
async fn build_form(
    selection: &VideoSelection,
    params: &GenerationParams,
) -> Result<Form, SubmitError> {
    let bytes = match selection.source() {
        VideoSource::Path(path) => tokio::fs::read(path).await.map_err(|e| {
            SubmitError::Payload(format!("failed to read {}: {e}", path.display()))
        })?,
        VideoSource::Memory(bytes) => bytes.to_vec(),
    };

    let video = Part::bytes(bytes)
        .file_name(selection.name().to_string())
        .mime_str(selection.mime_type())
        .map_err(|e| SubmitError::Payload(e.to_string()))?;

    Ok(Form::new()
        .part(FIELD_VIDEO, video)
        .text(FIELD_TITLE, params.effective_title().to_string())
        .text(FIELD_GENRE, params.genre().as_str())
        .text(FIELD_MODEL, params.model().as_str())
        .text(FIELD_VARIANTS, params.variant_count().to_string()))
}

fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    text.chars().take(LOG_BODY_LIMIT).collect()
}
