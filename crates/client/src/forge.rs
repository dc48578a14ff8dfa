//! Request-lifecycle orchestrator.
//!
//! [`ThumbnailForge`] owns the single [`GenerationStateMachine`] and is the
//! only writer to it. The presentation layer renders from
//! [`ThumbnailForge::subscribe`] / [`ThumbnailForge::snapshot`] and calls
//! the command methods.
//!
//! At most one generation request is in flight: a second
//! [`submit_generation`](ThumbnailForge::submit_generation) while
//! `Submitting` is rejected before any network activity. Downloads are not
//! guarded and may overlap with each other and with a generation.

use thumbforge_core::error::{StateError, SubmitError, ValidationError};
use thumbforge_core::state::{
    GenerationResult, GenerationState, GenerationStateMachine, Notice, Resolution,
    SubmissionTicket,
};
use thumbforge_core::types::{GenerationParams, PickedFile, ThumbnailAsset};
use thumbforge_core::validation;
use tokio::sync::watch;

use crate::api::ForgeApi;
use crate::config::ForgeConfig;
use crate::download::{AssetDownloader, DownloadError, DownloadReceipt, SaveTarget};

/// Errors returned by [`ThumbnailForge::submit_generation`].
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    #[error(transparent)]
    InvalidFile(#[from] ValidationError),

    #[error(transparent)]
    AlreadyInFlight(#[from] StateError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    /// The response arrived after a reset or a newer submission; it was
    /// discarded.
    #[error("Response discarded: superseded by a newer request")]
    Superseded,
}

/// Client-side orchestrator for thumbnail generation.
pub struct ThumbnailForge {
    api: ForgeApi,
    downloader: AssetDownloader,
    state: watch::Sender<GenerationStateMachine>,
}

impl ThumbnailForge {
    /// Build an orchestrator; the submitter and downloader share one
    /// connection pool.
    pub fn new(config: ForgeConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Build an orchestrator on a preconfigured [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: ForgeConfig) -> Self {
        let api = ForgeApi::with_client(client.clone(), &config);
        let downloader = AssetDownloader::with_client(client, config);
        Self::from_parts(api, downloader)
    }

    pub fn from_parts(api: ForgeApi, downloader: AssetDownloader) -> Self {
        let (state, _) = watch::channel(GenerationStateMachine::new());
        Self {
            api,
            downloader,
            state,
        }
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<GenerationStateMachine> {
        self.state.subscribe()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> GenerationState {
        self.state.borrow().state().clone()
    }

    /// Validate `file`, submit it with `params` and record the outcome.
    ///
    /// Returns the normalised assets on success. Dropping the returned
    /// future before it completes puts the state back to `Idle`.
    pub async fn submit_generation(
        &self,
        file: Option<PickedFile>,
        params: &GenerationParams,
    ) -> Result<Vec<ThumbnailAsset>, ForgeError> {
        let selection = match validation::validate(file) {
            Ok(selection) => selection,
            Err(err) => {
                tracing::warn!(error = %err, "Rejected file selection");
                self.state.send_modify(|m| m.reject_selection(&err));
                return Err(err.into());
            }
        };

        let mut admitted = Err(StateError::AlreadyInFlight);
        self.state.send_if_modified(|m| {
            admitted = m.begin_submission();
            admitted.is_ok()
        });
        let ticket = match admitted {
            Ok(ticket) => ticket,
            Err(err) => {
                tracing::warn!("Generation already in progress, submission ignored");
                return Err(err.into());
            }
        };

        tracing::info!(
            sequence = ticket.sequence(),
            file = selection.name(),
            size_bytes = selection.size_bytes(),
            genre = %params.genre(),
            model = %params.model(),
            variants = params.variant_count(),
            "Submitting generation request",
        );

        let pending = PendingSubmission::new(&self.state, ticket);
        let outcome = self.api.generate(&selection, params).await;
        pending.resolve(outcome)
    }

    /// Download one asset and report the outcome in the notice slot.
    ///
    /// Never changes the generation status.
    pub async fn download_asset(
        &self,
        asset: &ThumbnailAsset,
        suggested_filename: Option<&str>,
        target: &dyn SaveTarget,
    ) -> Result<DownloadReceipt, DownloadError> {
        let result = self.downloader.download(asset, suggested_filename, target).await;

        let notice = match &result {
            Ok(receipt) => Notice::info(format!("Downloaded: {}", receipt.filename)),
            Err(err) => {
                tracing::warn!(
                    asset_id = asset.id.as_deref().unwrap_or("-"),
                    error = %err,
                    "Thumbnail download failed",
                );
                Notice::error(format!("Download failed: {err}"))
            }
        };
        self.state.send_modify(|m| m.post_notice(notice));

        result
    }

    /// Return to `Idle`, discarding results and any in-flight response.
    pub fn reset(&self) {
        self.state.send_modify(GenerationStateMachine::reset);
    }

    pub fn clear_notice(&self) {
        self.state.send_modify(GenerationStateMachine::clear_notice);
    }
}

/// An admitted submission that has not resolved yet.
///
/// Dropped unresolved (the caller abandoned the future), it returns the
/// state to `Idle` so the in-flight guard is released.
struct PendingSubmission<'a> {
    state: &'a watch::Sender<GenerationStateMachine>,
    ticket: SubmissionTicket,
    armed: bool,
}

impl<'a> PendingSubmission<'a> {
    fn new(state: &'a watch::Sender<GenerationStateMachine>, ticket: SubmissionTicket) -> Self {
        Self {
            state,
            ticket,
            armed: true,
        }
    }

    fn resolve(
        mut self,
        outcome: Result<GenerationResult, SubmitError>,
    ) -> Result<Vec<ThumbnailAsset>, ForgeError> {
        self.armed = false;
        let ticket = self.ticket;
        let reply = outcome.clone().map(|result| result.assets);

        let mut resolution = Resolution::Stale;
        self.state.send_if_modified(|m| {
            resolution = m.resolve(ticket, outcome);
            resolution == Resolution::Applied
        });

        if resolution == Resolution::Stale {
            tracing::warn!(
                sequence = ticket.sequence(),
                "Discarding response for superseded submission",
            );
            return Err(ForgeError::Superseded);
        }

        match reply {
            Ok(assets) if assets.is_empty() => Err(SubmitError::EmptyResult.into()),
            Ok(assets) => Ok(assets),
            Err(err) => {
                tracing::warn!(sequence = ticket.sequence(), error = %err, "Generation failed");
                Err(err.into())
            }
        }
    }
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let ticket = self.ticket;
        let abandoned = self
            .state
            .send_if_modified(|m| m.abandon(ticket) == Resolution::Applied);
        if abandoned {
            tracing::info!(sequence = ticket.sequence(), "Generation request abandoned");
        }
    }
}
