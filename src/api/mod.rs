//! Instagram Graph API interaction: creating, inspecting and publishing
//! media containers.
//!
//! Orchestration code depends on the [`MediaPlatform`] trait, never on
//! HTTP details, so tests can substitute a scripted platform.

pub mod client;
pub mod parser;
pub mod requests;

use crate::error::RemoteApiError;
use crate::types::{AccessToken, BusinessAccountId, ContainerId, PublishId, ValidatedUrl};

/// The remote content API as the publisher sees it.
///
/// Every failure is already classified (see [`parser`]).
#[async_trait::async_trait]
pub trait MediaPlatform: Send + Sync {
    /// Create a container for one image.
    ///
    /// Carousel items carry no caption; a single-image container carries
    /// `caption` (empty when `None`).
    async fn create_item_container(
        &self,
        image_url: &ValidatedUrl,
        access_token: &AccessToken,
        account: &BusinessAccountId,
        is_carousel_item: bool,
        caption: Option<&str>,
    ) -> Result<ContainerId, RemoteApiError>;

    /// Group ready item containers into a carousel, in the given order.
    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        caption: &str,
        access_token: &AccessToken,
        account: &BusinessAccountId,
    ) -> Result<ContainerId, RemoteApiError>;

    /// Read the container's raw `status_code`. `None` when the platform
    /// did not report one.
    async fn fetch_status(
        &self,
        container_id: &ContainerId,
        access_token: &AccessToken,
    ) -> Result<Option<String>, RemoteApiError>;

    /// Publish a ready container.
    async fn publish_container(
        &self,
        container_id: &ContainerId,
        access_token: &AccessToken,
        account: &BusinessAccountId,
    ) -> Result<PublishId, RemoteApiError>;
}

pub use client::GraphHttpClient;
