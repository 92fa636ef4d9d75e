// src/carousel.rs
//! Multi-image carousel assembly.

use crate::api::MediaPlatform;
use crate::error::PublishError;
use crate::model::{ContainerRole, MediaContainer};
use crate::polling::ReadinessPoller;
use crate::types::{AccessToken, BusinessAccountId, ContainerId, ValidatedUrl};
use std::sync::Arc;

/// Turns ordered image URLs into one ready carousel container.
///
/// Items are created and polled strictly one after another, so the
/// carousel's child list always matches the input order. The first item
/// that errors or times out aborts the assembly; no carousel is created
/// from a partial set.
pub struct CarouselAssembler {
    platform: Arc<dyn MediaPlatform>,
    poller: ReadinessPoller,
}

impl CarouselAssembler {
    pub fn new(platform: Arc<dyn MediaPlatform>, poller: ReadinessPoller) -> Self {
        Self { platform, poller }
    }

    /// Returns the id of a carousel container that has reached Ready.
    pub async fn assemble(
        &self,
        image_urls: &[ValidatedUrl],
        caption: &str,
        access_token: &AccessToken,
        account: &BusinessAccountId,
    ) -> Result<ContainerId, PublishError> {
        let mut children = Vec::with_capacity(image_urls.len());

        for (index, image_url) in image_urls.iter().enumerate() {
            let id = self
                .platform
                .create_item_container(image_url, access_token, account, true, None)
                .await?;
            log::debug!(
                "Carousel item {}/{} -> container {}",
                index + 1,
                image_urls.len(),
                id
            );

            let mut item = MediaContainer::pending(id, ContainerRole::CarouselItem);
            self.poller.wait_until_ready(&mut item, access_token).await?;
            children.push(item);
        }

        let child_ids: Vec<ContainerId> = children.into_iter().map(|item| item.id).collect();

        let carousel_id = self
            .platform
            .create_carousel_container(&child_ids, caption, access_token, account)
            .await?;

        let mut carousel = MediaContainer::pending(carousel_id, ContainerRole::Carousel);
        self.poller
            .wait_until_ready(&mut carousel, access_token)
            .await?;

        Ok(carousel.id)
    }
}
