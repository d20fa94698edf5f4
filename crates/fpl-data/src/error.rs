//! Error taxonomy shared by the transport, retry, cache and reader layers.
//!
//! Every failure the crate produces is an [`FplError`]. Callers usually only
//! need [`FplError::kind`] to decide how to present the failure, and
//! [`FplError::is_transient`] is the single classification function the retry
//! loop consults.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// A player that matched a name query, returned with ambiguous matches so the
/// caller can disambiguate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerCandidate {
    pub id: u32,
    pub name: String,
}

impl Display for PlayerCandidate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (id {})", self.name, self.id)
    }
}

/// Coarse failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    AmbiguousMatch,
    Network,
    HttpStatus,
    Decode,
    RetryExhausted,
    Internal,
}

/// Failure produced by any data-access operation.
///
/// The type is `Clone` because a single upstream fetch may be awaited by
/// several callers, each of which receives the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FplError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("'{query}' matches {} players: {}", .candidates.len(), format_candidates(.candidates))]
    AmbiguousMatch {
        query: String,
        candidates: Vec<PlayerCandidate>,
    },

    #[error("network error: {0}")]
    Network(String),

    #[error("upstream returned status {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("failed to decode upstream payload: {0}")]
    Decode(String),

    #[error("gave up after {attempts} attempts: {source}")]
    RetryExhausted {
        attempts: u32,
        #[source]
        source: Box<FplError>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

fn format_candidates(candidates: &[PlayerCandidate]) -> String {
    candidates
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl FplError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AmbiguousMatch { .. } => ErrorKind::AmbiguousMatch,
            Self::Network(_) => ErrorKind::Network,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Decode(_) => ErrorKind::Decode,
            Self::RetryExhausted { .. } => ErrorKind::RetryExhausted,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidInput => "fpl.invalid_input",
            ErrorKind::NotFound => "fpl.not_found",
            ErrorKind::AmbiguousMatch => "fpl.ambiguous_match",
            ErrorKind::Network => "fpl.network",
            ErrorKind::HttpStatus => "fpl.http_status",
            ErrorKind::Decode => "fpl.decode",
            ErrorKind::RetryExhausted => "fpl.retry_exhausted",
            ErrorKind::Internal => "fpl.internal",
        }
    }

    /// Whether the retry loop may attempt the operation again.
    ///
    /// Network failures, 5xx and 429 are transient. Every other failure,
    /// including an already exhausted retry, is permanent.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Upstream HTTP status, looking through a retry wrapper.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::RetryExhausted { source, .. } => source.status(),
            _ => None,
        }
    }

    /// The failure observed on the final attempt when retries ran out.
    pub fn last_failure(&self) -> Option<&FplError> {
        match self {
            Self::RetryExhausted { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[PlayerCandidate] {
        match self {
            Self::AmbiguousMatch { candidates, .. } => candidates,
            _ => &[],
        }
    }
}
