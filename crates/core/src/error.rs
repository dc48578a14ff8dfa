//! Error taxonomy shared by the validator, the submitter and the state
//! machine.
//!
//! The `Display` text of every variant is the message shown to the user,
//! so each submission-phase kind renders with a distinct prefix.

/// A selected file was rejected before any network activity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Nothing was selected, or the selection is not a video.
    #[error("Please upload a valid video file.")]
    InvalidFileKind {
        /// MIME type of the rejected file, `None` when absent or no file.
        found: Option<String>,
    },

    /// A genre or model string is not one of the known values.
    #[error("Unknown {field}: '{value}'. Valid values: {valid}")]
    UnknownValue {
        field: &'static str,
        value: String,
        valid: String,
    },
}

/// Failure of a generation request between request construction and
/// receipt of a usable result set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx status (carries the status text) or `success: false`
    /// (carries the server's error string).
    #[error("Server error: {0}")]
    Server(String),

    /// The response body could not be parsed as the expected JSON shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// `success: true` with a missing or empty thumbnail list.
    #[error("No thumbnails returned from server")]
    EmptyResult,

    /// The upload could not be prepared (unreadable video, bad part).
    #[error("Could not prepare upload: {0}")]
    Payload(String),
}

/// Guard rejections raised by the generation state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// A submission is already in flight.
    #[error("A generation request is already in progress")]
    AlreadyInFlight,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_errors_have_distinct_messages() {
        let messages = [
            ValidationError::InvalidFileKind { found: None }.to_string(),
            SubmitError::Network("connection refused".into()).to_string(),
            SubmitError::Server("Bad Gateway".into()).to_string(),
            SubmitError::MalformedResponse("expected value".into()).to_string(),
            SubmitError::EmptyResult.to_string(),
        ];

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn server_error_carries_reason() {
        let err = SubmitError::Server("quota exceeded".into());
        assert_eq!(err.to_string(), "Server error: quota exceeded");
    }
}
