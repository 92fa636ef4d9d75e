// src/error.rs
//! Publish error types with structured error handling.
//!
//! Error types form the vocabulary for failure modes of a publish call.
//! Each variant says what went wrong and which caller-facing severity it
//! carries, so a surrounding HTTP layer or CLI can map it without string
//! matching.

use crate::constants::REMOTE_ERROR_MARKER;
use crate::types::{ContainerId, ValidationError};
use std::fmt;
use thiserror::Error;

/// Caller-facing classification of a failed publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// The caller is not allowed to publish.
    Permission,
    /// The rating (or another target) does not exist.
    NotFound,
    /// The request or the stored configuration is unusable as given.
    BadRequest,
    /// The platform or a backing collaborator failed.
    UpstreamFailure,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permission => write!(f, "permission"),
            Self::NotFound => write!(f, "not-found"),
            Self::BadRequest => write!(f, "bad-request"),
            Self::UpstreamFailure => write!(f, "upstream-failure"),
        }
    }
}

/// Where a remote failure came from.
///
/// Network failures, API rejections and processing failures share one
/// operational path (no retries outside readiness polling) but stay
/// distinguishable in logs and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteFailureOrigin {
    /// The platform answered with a non-success status or an unusable body.
    Api,
    /// The request never produced a response (DNS, TLS, connect, timeout).
    Transport,
    /// A container reported `ERROR`/`FAILED` while processing.
    Processing,
}

/// A classified failure reported by (or while talking to) the platform.
///
/// Built only by [`crate::api::parser`]; every diagnostic field the
/// platform returned is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteApiError {
    pub origin: RemoteFailureOrigin,
    pub status: Option<u16>,
    pub message: String,
    pub error_type: Option<String>,
    pub code: Option<String>,
    pub subcode: Option<String>,
    pub trace_id: Option<String>,
    pub container_id: Option<ContainerId>,
}

impl RemoteApiError {
    /// The single human-readable line for logs and UI.
    ///
    /// Joins whichever fields are present with `" | "` behind the remote
    /// marker.
    pub fn summary(&self) -> String {
        let mut parts = vec![self.message.clone()];
        if let Some(error_type) = &self.error_type {
            parts.push(format!("type: {}", error_type));
        }
        if let Some(code) = &self.code {
            parts.push(format!("code: {}", code));
        }
        if let Some(subcode) = &self.subcode {
            parts.push(format!("subcode: {}", subcode));
        }
        if let Some(trace_id) = &self.trace_id {
            parts.push(format!("fbtrace_id: {}", trace_id));
        }
        format!("{} {}", REMOTE_ERROR_MARKER, parts.join(" | "))
    }

    /// Attach the container this failure concerns.
    pub fn for_container(mut self, container_id: &ContainerId) -> Self {
        self.container_id = Some(container_id.clone());
        self
    }
}

impl fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}

impl std::error::Error for RemoteApiError {}

/// Main publish error type.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        principal: Option<String>,
        reason: String,
    },

    #[error("Instagram configuration incomplete: missing {}", missing.join(", "))]
    ConfigurationIncomplete { missing: Vec<String> },

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("No image available to publish for rating '{rating_id}'")]
    NoImageAvailable { rating_id: String },

    #[error("Too many images for one carousel: {count} (maximum {max})")]
    TooManyImages { count: usize, max: usize },

    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    #[error("Timed out waiting for media container {container_id} after {attempts} status checks")]
    Timeout {
        container_id: ContainerId,
        attempts: u32,
    },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage failure: {message}")]
    Storage { message: String },
}

impl PublishError {
    pub fn severity(&self) -> Severity {
        match self {
            Self::PermissionDenied { .. } => Severity::Permission,
            Self::NotFound { .. } => Severity::NotFound,
            Self::ConfigurationIncomplete { .. }
            | Self::NoImageAvailable { .. }
            | Self::TooManyImages { .. }
            | Self::Validation(_) => Severity::BadRequest,
            Self::RemoteApi(_) | Self::Timeout { .. } | Self::Storage { .. } => {
                Severity::UpstreamFailure
            }
        }
    }

    /// Whether the failure originated on the remote platform.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteApi(_) | Self::Timeout { .. })
    }

    /// The container the failure concerns, when there is one.
    pub fn container_id(&self) -> Option<&ContainerId> {
        match self {
            Self::RemoteApi(err) => err.container_id.as_ref(),
            Self::Timeout { container_id, .. } => Some(container_id),
            _ => None,
        }
    }

    pub(crate) fn storage(context: &str, err: impl fmt::Display) -> Self {
        Self::Storage {
            message: format!("{}: {}", context, err),
        }
    }
}
