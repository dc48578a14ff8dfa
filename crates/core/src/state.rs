//! Generation lifecycle state and the commands that mutate it.
//!
//! ```text
//! Idle | Success | Error --begin_submission--> Submitting
//! Submitting --resolve(Ok)--> Success
//! Submitting --resolve(Err)--> Error
//! any --reset--> Idle
//! ```
//!
//! [`GenerationState`] is read-only outside this module; every change goes
//! through a [`GenerationStateMachine`] command. Each submission is tagged
//! with a monotonically increasing sequence number carried in its
//! [`SubmissionTicket`], and a resolution is only applied while its ticket
//! is still the current one.

use serde::Serialize;

use crate::error::{StateError, SubmitError, ValidationError};
use crate::types::ThumbnailAsset;

/// Lifecycle status of the current generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::Idle => "idle",
            GenerationStatus::Submitting => "submitting",
            GenerationStatus::Success => "success",
            GenerationStatus::Error => "error",
        }
    }
}

/// Severity of a transient notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message outside the generation lifecycle (file rejection, download
/// outcome). Never affects `status` or `assets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Snapshot of everything the presentation layer renders.
///
/// `assets` is non-empty only when `status` is [`GenerationStatus::Success`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenerationState {
    status: GenerationStatus,
    assets: Vec<ThumbnailAsset>,
    message: Option<String>,
    request_id: Option<String>,
    notice: Option<Notice>,
}

impl GenerationState {
    pub fn status(&self) -> GenerationStatus {
        self.status
    }

    pub fn assets(&self) -> &[ThumbnailAsset] {
        &self.assets
    }

    /// Success summary or error text of the last resolved attempt.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Server-side id of the last successful request, if reported.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.status == GenerationStatus::Submitting
    }
}

/// Normalised outcome of a successful generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub assets: Vec<ThumbnailAsset>,
    /// Informational message supplied by the service.
    pub message: Option<String>,
    pub request_id: Option<String>,
}

/// Proof that a submission was admitted, used to resolve it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionTicket {
    sequence: u64,
}

impl SubmissionTicket {
    pub fn sequence(self) -> u64 {
        self.sequence
    }
}

/// Whether a resolution changed the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    /// The ticket was superseded by a newer submission or a reset.
    Stale,
}

/// Owner of the single [`GenerationState`].
#[derive(Debug, Clone, Default)]
pub struct GenerationStateMachine {
    state: GenerationState,
    sequence: u64,
}

impl GenerationStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Sequence number of the most recent submission (0 before the first).
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Admit a new submission.
    ///
    /// Rejected without any state change while another submission is in
    /// flight. Otherwise clears previous assets, message and notice.
    pub fn begin_submission(&mut self) -> Result<SubmissionTicket, StateError> {
        if self.state.is_submitting() {
            return Err(StateError::AlreadyInFlight);
        }

        self.sequence += 1;
        self.state = GenerationState {
            status: GenerationStatus::Submitting,
            ..GenerationState::default()
        };
        Ok(SubmissionTicket {
            sequence: self.sequence,
        })
    }

    /// True while `ticket` belongs to the in-flight submission.
    pub fn is_current(&self, ticket: SubmissionTicket) -> bool {
        ticket.sequence == self.sequence && self.state.is_submitting()
    }

    /// Apply the outcome of the submission identified by `ticket`.
    ///
    /// An `Ok` result with no assets is recorded as
    /// [`SubmitError::EmptyResult`].
    pub fn resolve(
        &mut self,
        ticket: SubmissionTicket,
        outcome: Result<GenerationResult, SubmitError>,
    ) -> Resolution {
        if !self.is_current(ticket) {
            return Resolution::Stale;
        }

        match outcome {
            Ok(result) if result.assets.is_empty() => self.fail(&SubmitError::EmptyResult),
            Ok(result) => {
                let message = result
                    .message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| success_message(result.assets.len()));
                self.state.status = GenerationStatus::Success;
                self.state.assets = result.assets;
                self.state.message = Some(message);
                self.state.request_id = result.request_id;
            }
            Err(err) => self.fail(&err),
        }
        Resolution::Applied
    }

    /// Return to `Idle` when the submission for `ticket` is dropped before
    /// it resolves.
    pub fn abandon(&mut self, ticket: SubmissionTicket) -> Resolution {
        if !self.is_current(ticket) {
            return Resolution::Stale;
        }
        self.state.status = GenerationStatus::Idle;
        Resolution::Applied
    }

    /// Record a rejected file pick. Status is left untouched.
    pub fn reject_selection(&mut self, err: &ValidationError) {
        self.state.notice = Some(Notice::error(err.to_string()));
    }

    /// Replace the transient notice. Status and assets are left untouched.
    pub fn post_notice(&mut self, notice: Notice) {
        self.state.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.state.notice = None;
    }

    /// Back to a pristine `Idle`; any in-flight submission becomes stale.
    pub fn reset(&mut self) {
        self.sequence += 1;
        self.state = GenerationState::default();
    }

    fn fail(&mut self, err: &SubmitError) {
        self.state.status = GenerationStatus::Error;
        self.state.assets.clear();
        self.state.message = Some(err.to_string());
        self.state.request_id = None;
    }
}

/// Summary shown after a successful generation.
pub fn success_message(count: usize) -> String {
    format!("Successfully generated {count} thumbnails!")
}
