//! Domain model for a publish call.
//!
//! Everything here lives for the duration of one publish: snapshots are
//! borrowed from collaborators, containers exist only until the post is
//! published or the call fails.

use crate::types::{
    AccessToken, BusinessAccountId, CaptionTemplate, ContainerId, ImageKey, PublishId, RatingId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An inbound request to publish one rating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub rating_id: RatingId,
    /// When non-empty, replaces the rating's own images (order kept).
    pub override_image_keys: Vec<ImageKey>,
}

impl PublishRequest {
    pub fn new(rating_id: RatingId) -> Self {
        Self {
            rating_id,
            override_image_keys: Vec::new(),
        }
    }

    pub fn with_images(mut self, keys: impl IntoIterator<Item = ImageKey>) -> Self {
        self.override_image_keys = keys.into_iter().collect();
        self
    }
}

/// The cigar a rating is about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CigarInfo {
    pub name: String,
    pub size: String,
    pub origin: String,
}

/// Letter grade derived from the score (`A+`, "Outstanding").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Grade {
    pub code: String,
    pub label: String,
}

/// Read-only view of a saved rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSnapshot {
    pub id: RatingId,
    #[serde(default)]
    pub title: String,
    /// Absent or non-finite scores render as an empty caption field.
    #[serde(default, alias = "score")]
    pub normalized_score: Option<f64>,
    #[serde(default, alias = "review")]
    pub review_text: String,
    #[serde(default, alias = "reviewer")]
    pub reviewer_name: String,
    #[serde(default, alias = "cigar")]
    pub cigar_info: CigarInfo,
    #[serde(default)]
    pub grade: Grade,
    #[serde(default, alias = "images")]
    pub image_refs: Vec<ImageKey>,
}

/// Publishing configuration, read fresh from the store on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformCredentials {
    pub access_token: AccessToken,
    pub business_account_id: BusinessAccountId,
    pub caption_template: CaptionTemplate,
}

/// What a container stands for in the post being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRole {
    Single,
    CarouselItem,
    Carousel,
}

impl fmt::Display for ContainerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::CarouselItem => write!(f, "carousel-item"),
            Self::Carousel => write!(f, "carousel"),
        }
    }
}

/// Processing state of a container on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerStatus {
    Pending,
    Ready,
    Error,
    TimedOut,
}

impl ContainerStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A server-side media handle mid-processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContainer {
    pub id: ContainerId,
    pub role: ContainerRole,
    status: ContainerStatus,
}

impl MediaContainer {
    /// A freshly created container; always starts `Pending`.
    pub fn pending(id: ContainerId, role: ContainerRole) -> Self {
        Self {
            id,
            role,
            status: ContainerStatus::Pending,
        }
    }

    pub fn status(&self) -> ContainerStatus {
        self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == ContainerStatus::Ready
    }

    /// Move a pending container into `status`.
    ///
    /// Terminal states are final: returns `false` and leaves the container
    /// untouched when it already left `Pending`.
    pub fn settle(&mut self, status: ContainerStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = status;
        true
    }
}

/// Shape of the published post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Carousel,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Carousel => write!(f, "carousel"),
        }
    }
}

/// Terminal artifact of a successful publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishResult {
    pub publish_id: PublishId,
    /// The container that was published.
    pub creation_id: ContainerId,
    pub media_kind: MediaKind,
    pub image_count: usize,
    pub published_at: DateTime<Utc>,
}
