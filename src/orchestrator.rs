// src/orchestrator.rs
//! The publish state machine.
//!
//! `Validating → Configuring → SingleImage | MultiImage → Publishing → Done`,
//! with `Failed` reachable from every stage. One call runs the whole flow,
//! polling waits included; nothing is queued or persisted between calls.

use crate::api::MediaPlatform;
use crate::caption::{compose, CaptionFields};
use crate::carousel::CarouselAssembler;
use crate::constants::{
    CONFIG_KEY_ACCESS_TOKEN, CONFIG_KEY_BUSINESS_ACCOUNT_ID, CONFIG_KEY_CAPTION_TEMPLATE,
    DEFAULT_CAPTION_TEMPLATE, MAX_CAROUSEL_ITEMS, PUBLISHER_CONFIG_KEYS,
};
use crate::error::PublishError;
use crate::model::{
    ContainerRole, MediaContainer, MediaKind, PlatformCredentials, PublishRequest, PublishResult,
    RatingSnapshot,
};
use crate::pipeline::{Authorizer, ConfigStore, ImageHost, RatingSource};
use crate::polling::{FixedDelay, ReadinessPoller, RetryPolicy};
use crate::types::{
    AccessToken, BusinessAccountId, CaptionTemplate, ContainerId, ImageKey, ValidatedUrl,
};
use chrono::Utc;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Where a publish call currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Validating,
    Configuring,
    SingleImage,
    MultiImage,
    Publishing,
    Done,
}

impl fmt::Display for PublishStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validating => write!(f, "validating"),
            Self::Configuring => write!(f, "configuring"),
            Self::SingleImage => write!(f, "single-image"),
            Self::MultiImage => write!(f, "multi-image"),
            Self::Publishing => write!(f, "publishing"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// Log context for one publish call.
///
/// The run id only correlates log lines; it is not sent to the platform.
struct PublishRun {
    id: String,
    stage: PublishStage,
}

impl PublishRun {
    fn start(request: &PublishRequest) -> Self {
        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        log::info!("[{}] Publishing rating {}", id, request.rating_id);
        Self {
            id,
            stage: PublishStage::Validating,
        }
    }

    fn enter(&mut self, stage: PublishStage) {
        log::info!("[{}] {} -> {}", self.id, self.stage, stage);
        self.stage = stage;
    }
}

/// Turns a saved rating into a published post.
pub struct PublishOrchestrator {
    platform: Arc<dyn MediaPlatform>,
    authorizer: Arc<dyn Authorizer>,
    config_store: Arc<dyn ConfigStore>,
    ratings: Arc<dyn RatingSource>,
    images: Arc<dyn ImageHost>,
    policy: Arc<dyn RetryPolicy>,
}

impl PublishOrchestrator {
    /// Uses the reference polling behaviour (10 reads, 1s apart) until
    /// [`with_retry_policy`](Self::with_retry_policy) says otherwise.
    pub fn new(
        platform: Arc<dyn MediaPlatform>,
        authorizer: Arc<dyn Authorizer>,
        config_store: Arc<dyn ConfigStore>,
        ratings: Arc<dyn RatingSource>,
        images: Arc<dyn ImageHost>,
    ) -> Self {
        Self {
            platform,
            authorizer,
            config_store,
            ratings,
            images,
            policy: Arc::new(FixedDelay::default()),
        }
    }

    pub fn with_retry_policy(mut self, policy: Arc<dyn RetryPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Publish one rating and return the platform's publish id.
    ///
    /// No step is retried beyond readiness polling, and containers created
    /// before a later failure are left on the platform.
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishResult, PublishError> {
        let mut run = PublishRun::start(&request);

        match self.execute(&request, &mut run).await {
            Ok(result) => {
                run.enter(PublishStage::Done);
                log::info!(
                    "[{}] Published rating {} as {} ({} image(s))",
                    run.id,
                    request.rating_id,
                    result.publish_id,
                    result.image_count
                );
                Ok(result)
            }
            Err(err) => {
                log::warn!(
                    "[{}] Failed during {} ({}): {}",
                    run.id,
                    run.stage,
                    err.severity(),
                    err
                );
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        request: &PublishRequest,
        run: &mut PublishRun,
    ) -> Result<PublishResult, PublishError> {
        self.authorize(request).await?;

        run.enter(PublishStage::Configuring);
        let credentials = self.load_credentials().await?;
        let rating = self.load_rating(request).await?;
        let image_keys = resolve_image_keys(request, &rating)?;
        let image_urls = image_keys
            .iter()
            .map(|key| self.images.public_url(key))
            .collect::<Result<Vec<_>, _>>()?;

        let caption = compose(
            &credentials.caption_template,
            &CaptionFields::from_rating(&rating),
        );
        log::debug!("[{}] Caption is {} characters", run.id, caption.chars().count());

        let poller = ReadinessPoller::new(self.platform.clone(), self.policy.clone());

        let (creation_id, media_kind) = match image_urls.as_slice() {
            [single] => {
                run.enter(PublishStage::SingleImage);
                let id = self
                    .prepare_single(&poller, single, &caption, &credentials)
                    .await?;
                (id, MediaKind::Image)
            }
            many => {
                run.enter(PublishStage::MultiImage);
                let assembler = CarouselAssembler::new(self.platform.clone(), poller);
                let id = assembler
                    .assemble(
                        many,
                        &caption,
                        &credentials.access_token,
                        &credentials.business_account_id,
                    )
                    .await?;
                (id, MediaKind::Carousel)
            }
        };

        run.enter(PublishStage::Publishing);
        let publish_id = self
            .platform
            .publish_container(
                &creation_id,
                &credentials.access_token,
                &credentials.business_account_id,
            )
            .await?;

        Ok(PublishResult {
            publish_id,
            creation_id,
            media_kind,
            image_count: image_urls.len(),
            published_at: Utc::now(),
        })
    }

    async fn authorize(&self, request: &PublishRequest) -> Result<(), PublishError> {
        let decision = self.authorizer.authorize(request).await?;
        if decision.allowed {
            return Ok(());
        }

        Err(PublishError::PermissionDenied {
            reason: match &decision.principal {
                Some(principal) => format!("'{}' may not publish to Instagram", principal),
                None => "an authenticated publisher is required".to_string(),
            },
            principal: decision.principal,
        })
    }

    async fn load_credentials(&self) -> Result<PlatformCredentials, PublishError> {
        let values = self.config_store.get(&PUBLISHER_CONFIG_KEYS).await?;
        credentials_from_values(&values)
    }

    async fn load_rating(&self, request: &PublishRequest) -> Result<RatingSnapshot, PublishError> {
        self.ratings
            .get(&request.rating_id)
            .await?
            .ok_or_else(|| PublishError::NotFound {
                kind: "rating",
                id: request.rating_id.to_string(),
            })
    }

    async fn prepare_single(
        &self,
        poller: &ReadinessPoller,
        image_url: &ValidatedUrl,
        caption: &str,
        credentials: &PlatformCredentials,
    ) -> Result<ContainerId, PublishError> {
        let id = self
            .platform
            .create_item_container(
                image_url,
                &credentials.access_token,
                &credentials.business_account_id,
                false,
                Some(caption),
            )
            .await?;

        let mut container = MediaContainer::pending(id, ContainerRole::Single);
        poller
            .wait_until_ready(&mut container, &credentials.access_token)
            .await?;
        Ok(container.id)
    }
}

/// Build credentials from raw store values.
///
/// Blank values count as missing. A missing token or account id is
/// fatal; a missing template falls back to the built-in caption.
pub fn credentials_from_values(
    values: &HashMap<String, String>,
) -> Result<PlatformCredentials, PublishError> {
    let present = |key: &str| {
        values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    };

    let token = present(CONFIG_KEY_ACCESS_TOKEN);
    let account = present(CONFIG_KEY_BUSINESS_ACCOUNT_ID);

    let (Some(token), Some(account)) = (token, account) else {
        let missing = [
            (CONFIG_KEY_ACCESS_TOKEN, token),
            (CONFIG_KEY_BUSINESS_ACCOUNT_ID, account),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(key, _)| key.to_string())
        .collect();
        return Err(PublishError::ConfigurationIncomplete { missing });
    };

    let caption_template = values
        .get(CONFIG_KEY_CAPTION_TEMPLATE)
        .filter(|template| !template.trim().is_empty())
        .map(|template| CaptionTemplate::new(template.as_str()))
        .unwrap_or_else(|| CaptionTemplate::new(DEFAULT_CAPTION_TEMPLATE));

    Ok(PlatformCredentials {
        access_token: AccessToken::new(token)?,
        business_account_id: BusinessAccountId::new(account)?,
        caption_template,
    })
}

/// Override keys win when given; otherwise the rating's own images.
fn resolve_image_keys(
    request: &PublishRequest,
    rating: &RatingSnapshot,
) -> Result<Vec<ImageKey>, PublishError> {
    let keys = if request.override_image_keys.is_empty() {
        rating.image_refs.clone()
    } else {
        request.override_image_keys.clone()
    };

    if keys.is_empty() {
        return Err(PublishError::NoImageAvailable {
            rating_id: request.rating_id.to_string(),
        });
    }

    if keys.len() > MAX_CAROUSEL_ITEMS {
        return Err(PublishError::TooManyImages {
            count: keys.len(),
            max: MAX_CAROUSEL_ITEMS,
        });
    }

    Ok(keys)
}
