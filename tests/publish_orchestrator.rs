// tests/publish_orchestrator.rs
//! End-to-end publish flows with in-memory collaborators.

mod common;

use common::{rating, rating_id, Call, ScriptedPlatform};
use pretty_assertions::assert_eq;
use rating2post::{
    FixedDelay, ImageKey, InMemoryRatingStore, MediaKind, MemoryConfigStore, PublishError,
    PublishOrchestrator, PublishRequest, RoleAuthorizer, Severity, UrlPrefixImageHost,
    ValidatedUrl, CONFIG_KEY_ACCESS_TOKEN, CONFIG_KEY_BUSINESS_ACCOUNT_ID,
    CONFIG_KEY_CAPTION_TEMPLATE,
};
use std::sync::Arc;

const TEMPLATE: &str = "{{title}}: {{cigar_name}} scored {{score}}/100 ({{grade_label}})";

struct Harness {
    platform: Arc<ScriptedPlatform>,
    ratings: Arc<InMemoryRatingStore>,
    config: Arc<MemoryConfigStore>,
    role: &'static str,
}

impl Harness {
    fn new(platform: ScriptedPlatform) -> Self {
        let config = MemoryConfigStore::with_entries([
            (CONFIG_KEY_ACCESS_TOKEN, "EAAtest-token-0123456789"),
            (CONFIG_KEY_BUSINESS_ACCOUNT_ID, "17841400000000000"),
            (CONFIG_KEY_CAPTION_TEMPLATE, TEMPLATE),
        ]);
        Self {
            platform: Arc::new(platform),
            ratings: Arc::new(InMemoryRatingStore::new()),
            config: Arc::new(config),
            role: "admin",
        }
    }

    fn with_rating(self, id: &str, images: &[&str]) -> Self {
        self.ratings.insert(rating(id, images));
        self
    }

    fn with_role(mut self, role: &'static str) -> Self {
        self.role = role;
        self
    }

    fn orchestrator(&self) -> PublishOrchestrator {
        let base = ValidatedUrl::parse("https://cdn.example.com/img").unwrap();
        PublishOrchestrator::new(
            self.platform.clone(),
            Arc::new(RoleAuthorizer::new(Some("sam".to_string()), self.role)),
            self.config.clone(),
            self.ratings.clone(),
            Arc::new(UrlPrefixImageHost::new(base)),
        )
        .with_retry_policy(Arc::new(FixedDelay::immediate(10)))
    }

    async fn publish(&self, request: PublishRequest) -> Result<rating2post::PublishResult, PublishError> {
        self.orchestrator().publish(request).await
    }
}

fn request(id: &str) -> PublishRequest {
    PublishRequest::new(rating_id(id))
}

#[tokio::test]
async fn test_single_image_publish_end_to_end() {
    let harness = Harness::new(
        ScriptedPlatform::new().with_status("ctr-front", &["IN_PROGRESS", "FINISHED"]),
    )
    .with_rating("42", &["front.jpg"]);

    let result = harness.publish(request("42")).await.unwrap();

    assert_eq!(result.publish_id.as_str(), "post-1");
    assert_eq!(result.creation_id.as_str(), "ctr-front");
    assert_eq!(result.media_kind, MediaKind::Image);
    assert_eq!(result.image_count, 1);
    assert_eq!(
        harness.platform.calls(),
        vec![
            Call::CreateItem {
                image_url: "https://cdn.example.com/img/front.jpg".to_string(),
                carousel_item: false,
                caption: Some("Sunday Maduro: Padron 1964 scored 92.3/100 (Excellent)".to_string()),
            },
            Call::Status {
                container_id: "ctr-front".to_string()
            },
            Call::Status {
                container_id: "ctr-front".to_string()
            },
            Call::Publish {
                container_id: "ctr-front".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_missing_publish_id_falls_back_to_creation_id() {
    let harness = Harness::new(ScriptedPlatform::new().without_publish_id())
        .with_rating("42", &["front.jpg"]);

    let result = harness.publish(request("42")).await.unwrap();

    assert_eq!(result.publish_id.as_str(), "ctr-front");
}

#[tokio::test]
async fn test_three_images_publish_as_carousel() {
    let harness =
        Harness::new(ScriptedPlatform::new()).with_rating("7", &["a.jpg", "b.jpg", "c.jpg"]);

    let result = harness.publish(request("7")).await.unwrap();

    assert_eq!(result.media_kind, MediaKind::Carousel);
    assert_eq!(result.image_count, 3);
    assert_eq!(result.creation_id.as_str(), "carousel-1");
    assert_eq!(
        harness.platform.carousels(),
        vec![vec![
            "ctr-a".to_string(),
            "ctr-b".to_string(),
            "ctr-c".to_string()
        ]]
    );
    assert_eq!(harness.platform.published(), vec!["carousel-1".to_string()]);
}

#[tokio::test]
async fn test_failed_carousel_item_never_publishes() {
    let harness = Harness::new(
        ScriptedPlatform::new().with_status("ctr-b", &["IN_PROGRESS", "IN_PROGRESS", "FAILED"]),
    )
    .with_rating("7", &["a.jpg", "b.jpg", "c.jpg"]);

    let err = harness.publish(request("7")).await.unwrap_err();

    assert_eq!(err.severity(), Severity::UpstreamFailure);
    assert_eq!(err.container_id().map(|c| c.as_str()), Some("ctr-b"));
    assert_eq!(harness.platform.status_calls("ctr-b"), 3);
    assert_eq!(harness.platform.created_items().len(), 2);
    assert!(harness.platform.carousels().is_empty());
    assert!(harness.platform.published().is_empty());
}

#[tokio::test]
async fn test_missing_token_fails_before_any_remote_call() {
    let harness = Harness::new(ScriptedPlatform::new()).with_rating("42", &["front.jpg"]);
    harness.config.remove(CONFIG_KEY_ACCESS_TOKEN);

    let err = harness.publish(request("42")).await.unwrap_err();

    match &err {
        PublishError::ConfigurationIncomplete { missing } => {
            assert_eq!(missing, &vec![CONFIG_KEY_ACCESS_TOKEN.to_string()]);
        }
        other => panic!("expected configuration error, got {:?}", other),
    }
    assert_eq!(err.severity(), Severity::BadRequest);
    assert!(harness.platform.calls().is_empty());
}

#[tokio::test]
async fn test_missing_template_uses_default_caption() {
    let harness = Harness::new(ScriptedPlatform::new()).with_rating("42", &["front.jpg"]);
    harness.config.remove(CONFIG_KEY_CAPTION_TEMPLATE);

    harness.publish(request("42")).await.unwrap();

    match &harness.platform.calls()[0] {
        Call::CreateItem {
            caption: Some(caption),
            ..
        } => {
            assert!(caption.contains("Padron 1964"));
            assert!(caption.contains("92.3"));
            assert!(!caption.contains("{{"));
        }
        other => panic!("expected item creation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_viewer_is_denied_without_remote_calls() {
    let harness = Harness::new(ScriptedPlatform::new())
        .with_rating("42", &["front.jpg"])
        .with_role("viewer");

    let err = harness.publish(request("42")).await.unwrap_err();

    assert!(matches!(err, PublishError::PermissionDenied { .. }));
    assert_eq!(err.severity(), Severity::Permission);
    assert!(harness.platform.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_rating_is_not_found() {
    let harness = Harness::new(ScriptedPlatform::new());

    let err = harness.publish(request("404")).await.unwrap_err();

    assert_eq!(err.severity(), Severity::NotFound);
    assert_eq!(err.to_string(), "rating '404' not found");
    assert!(harness.platform.calls().is_empty());
}

#[tokio::test]
async fn test_rating_without_images_is_rejected() {
    let harness = Harness::new(ScriptedPlatform::new()).with_rating("42", &[]);

    let err = harness.publish(request("42")).await.unwrap_err();

    assert!(matches!(err, PublishError::NoImageAvailable { .. }));
    assert_eq!(err.severity(), Severity::BadRequest);
    assert!(harness.platform.calls().is_empty());
}

#[tokio::test]
async fn test_override_images_replace_rating_images_in_given_order() {
    let harness = Harness::new(ScriptedPlatform::new()).with_rating("42", &["front.jpg"]);
    let overrides = ["band.jpg", "foot.jpg"]
        .iter()
        .map(|key| ImageKey::new(*key).unwrap());

    let result = harness
        .publish(request("42").with_images(overrides))
        .await
        .unwrap();

    assert_eq!(result.media_kind, MediaKind::Carousel);
    assert_eq!(
        harness.platform.created_items(),
        vec![
            "https://cdn.example.com/img/band.jpg".to_string(),
            "https://cdn.example.com/img/foot.jpg".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_more_than_ten_images_is_rejected() {
    let images: Vec<String> = (0..11).map(|i| format!("img{}.jpg", i)).collect();
    let refs: Vec<&str> = images.iter().map(String::as_str).collect();
    let harness = Harness::new(ScriptedPlatform::new()).with_rating("42", &refs);

    let err = harness.publish(request("42")).await.unwrap_err();

    assert!(matches!(
        err,
        PublishError::TooManyImages { count: 11, max: 10 }
    ));
    assert!(harness.platform.calls().is_empty());
}
