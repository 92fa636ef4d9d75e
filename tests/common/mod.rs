// tests/common/mod.rs
//! Shared test doubles.
//!
//! `ScriptedPlatform` stands in for the Graph API: it names item
//! containers after their image (`.../front.jpg` -> `ctr-front`), replays
//! per-container status scripts and records every call in order.

#![allow(dead_code)]

use parking_lot::Mutex;
use rating2post::{
    classify_transport_failure, AccessToken, BusinessAccountId, ContainerId, MediaPlatform,
    PublishId, RatingId, RatingSnapshot, RemoteApiError, RemoteFailureOrigin, ValidatedUrl,
};
use std::collections::{HashMap, VecDeque};

/// Script entry that simulates a failed status read.
pub const NETWORK_DOWN: &str = "!network";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateItem {
        image_url: String,
        carousel_item: bool,
        caption: Option<String>,
    },
    CreateCarousel {
        children: Vec<String>,
        caption: String,
    },
    Status {
        container_id: String,
    },
    Publish {
        container_id: String,
    },
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    scripts: HashMap<String, VecDeque<String>>,
    failing_creates: HashMap<String, RemoteApiError>,
    carousel_count: usize,
}

pub struct ScriptedPlatform {
    state: Mutex<State>,
    publish_id: Option<String>,
}

impl ScriptedPlatform {
    /// Every container becomes ready on its first status read.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            publish_id: Some("post-1".to_string()),
        }
    }

    /// Status codes returned for `container_id`, in order; the last one repeats.
    pub fn with_status(self, container_id: &str, script: &[&str]) -> Self {
        self.state.lock().scripts.insert(
            container_id.to_string(),
            script.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Reject container creation for the image whose container would be `container_id`.
    pub fn failing_create(self, container_id: &str, message: &str) -> Self {
        let error = RemoteApiError {
            origin: RemoteFailureOrigin::Api,
            status: Some(400),
            message: message.to_string(),
            error_type: Some("OAuthException".to_string()),
            code: Some("100".to_string()),
            subcode: None,
            trace_id: Some("trace-1".to_string()),
            container_id: None,
        };
        self.state
            .lock()
            .failing_creates
            .insert(container_id.to_string(), error);
        self
    }

    /// Publish responses omit the id.
    pub fn without_publish_id(mut self) -> Self {
        self.publish_id = None;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn status_calls(&self, container_id: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Status { container_id: id } if id == container_id))
            .count()
    }

    pub fn created_items(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateItem { image_url, .. } => Some(image_url),
                _ => None,
            })
            .collect()
    }

    pub fn carousels(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateCarousel { children, .. } => Some(children),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Publish { container_id } => Some(container_id),
                _ => None,
            })
            .collect()
    }
}

/// `https://cdn/x/front.jpg` -> `ctr-front`
pub fn container_name_for(image_url: &str) -> String {
    let file = image_url.rsplit('/').next().unwrap_or(image_url);
    let stem = file.split('.').next().unwrap_or(file);
    format!("ctr-{}", stem)
}

#[async_trait::async_trait]
impl MediaPlatform for ScriptedPlatform {
    async fn create_item_container(
        &self,
        image_url: &ValidatedUrl,
        _access_token: &AccessToken,
        _account: &BusinessAccountId,
        is_carousel_item: bool,
        caption: Option<&str>,
    ) -> Result<ContainerId, RemoteApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateItem {
            image_url: image_url.to_string(),
            carousel_item: is_carousel_item,
            caption: caption.map(str::to_string),
        });

        let name = container_name_for(image_url.as_str());
        if let Some(error) = state.failing_creates.get(&name) {
            return Err(error.clone());
        }
        Ok(ContainerId::parse(&name).unwrap())
    }

    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        caption: &str,
        _access_token: &AccessToken,
        _account: &BusinessAccountId,
    ) -> Result<ContainerId, RemoteApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::CreateCarousel {
            children: children.iter().map(|c| c.to_string()).collect(),
            caption: caption.to_string(),
        });
        state.carousel_count += 1;
        Ok(ContainerId::parse(&format!("carousel-{}", state.carousel_count)).unwrap())
    }

    async fn fetch_status(
        &self,
        container_id: &ContainerId,
        _access_token: &AccessToken,
    ) -> Result<Option<String>, RemoteApiError> {
        let mut state = self.state.lock();
        state.calls.push(Call::Status {
            container_id: container_id.to_string(),
        });

        let next = match state.scripts.get_mut(container_id.as_str()) {
            Some(script) if script.len() > 1 => script.pop_front(),
            Some(script) => script.front().cloned(),
            None => Some("FINISHED".to_string()),
        };

        match next.as_deref() {
            Some(NETWORK_DOWN) => Err(classify_transport_failure(
                "failed to fetch media status",
                "connection reset by peer",
            )),
            Some("") | None => Ok(None),
            Some(code) => Ok(Some(code.to_string())),
        }
    }

    async fn publish_container(
        &self,
        container_id: &ContainerId,
        _access_token: &AccessToken,
        _account: &BusinessAccountId,
    ) -> Result<PublishId, RemoteApiError> {
        self.state.lock().calls.push(Call::Publish {
            container_id: container_id.to_string(),
        });
        Ok(match &self.publish_id {
            Some(id) => PublishId::parse(id).unwrap(),
            None => container_id.cast(),
        })
    }
}

pub fn token() -> AccessToken {
    AccessToken::new("EAAtest-token-0123456789").unwrap()
}

pub fn account() -> BusinessAccountId {
    BusinessAccountId::new("17841400000000000").unwrap()
}

pub fn url(name: &str) -> ValidatedUrl {
    ValidatedUrl::parse(&format!("https://cdn.example.com/img/{}", name)).unwrap()
}

pub fn rating(id: &str, images: &[&str]) -> RatingSnapshot {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": "Sunday Maduro",
        "score": 92.30,
        "review": "Dark chocolate and cedar.",
        "reviewer": "Sam",
        "cigar": { "name": "Padron 1964", "size": "Torpedo", "origin": "Nicaragua" },
        "grade": { "code": "A", "label": "Excellent" },
        "images": images,
    }))
    .unwrap()
}

pub fn rating_id(id: &str) -> RatingId {
    RatingId::parse(id).unwrap()
}
