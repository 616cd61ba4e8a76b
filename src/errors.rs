/*!
 * Error types for the storyreel application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

use crate::app_controller::Stage;

/// Errors that can occur when calling an external collaborator
/// (script generator, speech synthesizer, transcriber)
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// Credentials required by the service are not configured
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The collaborator was called with unusable input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A local tool (e.g. whisper_timestamped) failed to run or exited with an error
    #[error("Tool failed: {0}")]
    ToolFailed(String),
}

impl ProviderError {
    /// Map an HTTP status and body to the matching provider error
    pub fn from_status(status_code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status_code {
            401 | 403 => Self::AuthenticationError(message),
            429 => Self::RateLimitExceeded(message),
            _ => Self::ApiError { status_code, message },
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            Self::ConnectionError(error.to_string())
        } else if error.is_decode() {
            Self::ParseError(error.to_string())
        } else {
            Self::RequestFailed(error.to_string())
        }
    }
}

/// Errors raised by a media backend while probing, rendering or encoding
#[derive(Error, Debug)]
pub enum MediaError {
    /// The media file could not be opened or its duration read
    #[error("Failed to probe media {path}: {reason}")]
    Probe {
        /// Path of the media file
        path: String,
        /// What went wrong
        reason: String,
    },

    /// A caption overlay could not be rendered
    #[error("Failed to render caption overlay: {0}")]
    Render(String),

    /// The final encode failed
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// Filesystem failure while handling media resources
    #[error("Media I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pipeline-level error taxonomy
#[derive(Error, Debug)]
pub enum PipelineError {
    /// An external collaborator failed (connectivity, auth, rate limit, missing model)
    #[error("{stage} stage failed: {source}")]
    UpstreamService {
        /// Stage whose collaborator failed
        stage: Stage,
        /// Underlying provider error
        #[source]
        source: ProviderError,
    },

    /// A required input file or prior-stage output is missing
    #[error("Required data is missing: {0}")]
    DataAbsent(String),

    /// A single caption unit could not be rendered
    #[error("Caption '{text}' could not be rendered: {reason}")]
    MalformedUnit {
        /// Caption text
        text: String,
        /// Renderer message
        reason: String,
    },

    /// Writing the final video failed
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

impl From<MediaError> for PipelineError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::Probe { path, reason } => {
                Self::DataAbsent(format!("could not load media {}: {}", path, reason))
            }
            MediaError::Render(reason) => Self::MalformedUnit {
                text: String::new(),
                reason,
            },
            MediaError::Encode(reason) => Self::Encoding(reason),
            MediaError::Io(e) => Self::Encoding(e.to_string()),
        }
    }
}
