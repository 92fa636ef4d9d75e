// src/polling.rs
//! Readiness polling for media containers.
//!
//! Creating a container only starts processing on the platform. The
//! poller reads the container's status until it is ready, reports an
//! error, or the [`RetryPolicy`] runs out of attempts.

use crate::api::{parser, MediaPlatform};
use crate::constants::{DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY, MAX_BACKOFF_DELAY};
use crate::error::{PublishError, RemoteApiError};
use crate::model::{ContainerStatus, MediaContainer};
use crate::types::{AccessToken, ContainerId};
use rand::Rng;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// How many status reads to make and how long to pause between them.
pub trait RetryPolicy: Send + Sync + fmt::Debug {
    /// Total status reads allowed for one container.
    fn max_attempts(&self) -> u32;

    /// Pause after the given (1-based) attempt, before the next one.
    fn delay_after(&self, attempt: u32) -> Duration;
}

/// Same pause after every attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl FixedDelay {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// No pause at all; for tests and dry runs.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_ATTEMPTS, DEFAULT_POLL_DELAY)
    }
}

impl RetryPolicy for FixedDelay {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_after(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

/// Doubling pause with a cap, optionally jittered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Randomize each pause within `[delay / 2, delay]`.
    pub jitter: bool,
}

impl ExponentialBackoff {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: MAX_BACKOFF_DELAY,
            jitter: true,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn capped_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_delay
            .checked_mul(1u32 << exponent)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    fn delay_after(&self, attempt: u32) -> Duration {
        let delay = self.capped_delay(attempt);
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let millis = delay.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(millis / 2..=millis))
    }
}

/// Result of a single status read.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Ready,
    /// Still processing (or no status reported yet).
    StillPending { status_code: Option<String> },
    Failed(PollFailure),
}

impl PollOutcome {
    /// Interpret a raw `status_code`.
    ///
    /// `FINISHED`/`READY` are ready, `ERROR`/`FAILED` are failures; any
    /// other value (`IN_PROGRESS`, `PUBLISHED`, nothing) keeps polling.
    pub fn from_status_code(container_id: &ContainerId, status_code: Option<String>) -> Self {
        let normalized = status_code.as_deref().map(str::to_ascii_uppercase);
        match normalized.as_deref() {
            Some("FINISHED") | Some("READY") => Self::Ready,
            Some(code @ ("ERROR" | "FAILED")) => Self::Failed(PollFailure::ProcessingFailed(
                parser::classify_processing_failure(container_id, code),
            )),
            _ => Self::StillPending { status_code },
        }
    }
}

/// Why a status read ended polling.
///
/// Both variants abort immediately; they stay separate so logs and tests
/// can tell a rejected upload from an unreachable platform.
#[derive(Debug, Clone, PartialEq)]
pub enum PollFailure {
    /// The platform reported the container as failed.
    ProcessingFailed(RemoteApiError),
    /// The status itself could not be read (network or API error).
    StatusUnavailable(RemoteApiError),
}

impl PollFailure {
    pub fn into_remote_error(self) -> RemoteApiError {
        match self {
            Self::ProcessingFailed(err) | Self::StatusUnavailable(err) => err,
        }
    }
}

/// Polls containers into a terminal state.
#[derive(Clone)]
pub struct ReadinessPoller {
    platform: Arc<dyn MediaPlatform>,
    policy: Arc<dyn RetryPolicy>,
}

impl ReadinessPoller {
    pub fn new(platform: Arc<dyn MediaPlatform>, policy: Arc<dyn RetryPolicy>) -> Self {
        Self { platform, policy }
    }

    /// One status read, classified.
    pub async fn poll_once(
        &self,
        container_id: &ContainerId,
        access_token: &AccessToken,
    ) -> PollOutcome {
        match self.platform.fetch_status(container_id, access_token).await {
            Ok(status_code) => PollOutcome::from_status_code(container_id, status_code),
            Err(err) => {
                PollOutcome::Failed(PollFailure::StatusUnavailable(err.for_container(container_id)))
            }
        }
    }

    /// Block until `container` is ready, settling its status either way.
    ///
    /// Makes at most `max_attempts` status reads (at least one), pausing
    /// per the policy between reads. An error status or a failed read
    /// aborts at once; running out of attempts is a [`PublishError::Timeout`].
    pub async fn wait_until_ready(
        &self,
        container: &mut MediaContainer,
        access_token: &AccessToken,
    ) -> Result<(), PublishError> {
        if container.status().is_terminal() {
            return match container.status() {
                ContainerStatus::Ready => Ok(()),
                other => Err(PublishError::RemoteApi(parser::classify_processing_failure(
                    &container.id,
                    &format!("{:?}", other).to_ascii_uppercase(),
                ))),
            };
        }

        let max_attempts = self.policy.max_attempts().max(1);

        for attempt in 1..=max_attempts {
            match self.poll_once(&container.id, access_token).await {
                PollOutcome::Ready => {
                    log::info!(
                        "{} container {} ready after {} status check(s)",
                        container.role,
                        container.id,
                        attempt
                    );
                    container.settle(ContainerStatus::Ready);
                    return Ok(());
                }
                PollOutcome::Failed(failure) => {
                    if let PollFailure::StatusUnavailable(err) = &failure {
                        log::warn!("Status read for {} failed: {}", container.id, err);
                    }
                    container.settle(ContainerStatus::Error);
                    return Err(PublishError::RemoteApi(failure.into_remote_error()));
                }
                PollOutcome::StillPending { status_code } => {
                    log::debug!(
                        "Container {} pending ({}) on check {}/{}",
                        container.id,
                        status_code.as_deref().unwrap_or("no status"),
                        attempt,
                        max_attempts
                    );
                    if attempt < max_attempts {
                        let delay = self.policy.delay_after(attempt);
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                    }
                }
            }
        }

        container.settle(ContainerStatus::TimedOut);
        Err(PublishError::Timeout {
            container_id: container.id.clone(),
            attempts: max_attempts,
        })
    }
}
