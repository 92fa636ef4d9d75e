// src/pipeline.rs
//! Collaborator capability traits consumed by the publish orchestrator.
//!
//! Each trait describes one thing the surrounding application provides,
//! so the orchestrator can be driven by files, a database, or test doubles.

use crate::error::PublishError;
use crate::model::{PublishRequest, RatingSnapshot};
use crate::types::{ImageKey, RatingId, ValidatedUrl};
use std::collections::HashMap;

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    pub allowed: bool,
    pub principal: Option<String>,
}

/// Decides whether the caller may publish.
#[async_trait::async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(&self, request: &PublishRequest) -> Result<Authorization, PublishError>;
}

/// Shared key-value configuration.
///
/// Read fresh on every publish; values may change between calls.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    /// Values for whichever of `keys` are set.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, String>, PublishError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), PublishError>;
}

/// Read-only access to saved ratings.
#[async_trait::async_trait]
pub trait RatingSource: Send + Sync {
    /// `Ok(None)` when the rating does not exist.
    async fn get(&self, rating_id: &RatingId) -> Result<Option<RatingSnapshot>, PublishError>;
}

/// Maps stored image references to publicly fetchable URLs.
///
/// Deterministic and offline: no network call is made.
pub trait ImageHost: Send + Sync {
    fn public_url(&self, key: &ImageKey) -> Result<ValidatedUrl, PublishError>;
}
