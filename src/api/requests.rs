// src/api/requests.rs
//! Wire shapes for the three Graph API endpoints the publisher uses.
//!
//! Request bodies borrow from the caller; response bodies are parsed
//! leniently because the platform under-reports fields on some paths.

use crate::types::ContainerId;
use serde::{Deserialize, Serialize};

/// Body of `POST /{business_account_id}/media`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateMediaBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<&'a str>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_carousel_item: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<&'static str>,
    /// Comma-joined child container ids, in submission order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<&'a str>,
    pub access_token: &'a str,
}

impl<'a> CreateMediaBody<'a> {
    pub fn single(image_url: &'a str, caption: &'a str, access_token: &'a str) -> Self {
        Self {
            image_url: Some(image_url),
            is_carousel_item: false,
            media_type: None,
            children: None,
            caption: Some(caption),
            access_token,
        }
    }

    pub fn carousel_item(image_url: &'a str, access_token: &'a str) -> Self {
        Self {
            image_url: Some(image_url),
            is_carousel_item: true,
            media_type: None,
            children: None,
            caption: None,
            access_token,
        }
    }

    pub fn carousel(children: &[ContainerId], caption: &'a str, access_token: &'a str) -> Self {
        let children = children
            .iter()
            .map(ContainerId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            image_url: None,
            is_carousel_item: false,
            media_type: Some("CAROUSEL"),
            children: Some(children),
            caption: Some(caption),
            access_token,
        }
    }
}

/// Body of `POST /{business_account_id}/media_publish`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishBody<'a> {
    pub creation_id: &'a str,
    pub access_token: &'a str,
}

/// `{ "id": ... }` returned by create and publish calls.
///
/// The id arrives as a string but is accepted as a number too.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreatedObject {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

impl CreatedObject {
    pub fn id_string(&self) -> Option<String> {
        match self.id.as_ref()? {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// `GET /{container_id}?fields=status_code` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerStatusBody {
    #[serde(default)]
    pub status_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_single_body_shape() {
        let body = CreateMediaBody::single("https://cdn/a.jpg", "Hello", "tok");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "image_url": "https://cdn/a.jpg", "caption": "Hello", "access_token": "tok" })
        );
    }

    #[test]
    fn test_carousel_item_body_shape() {
        let body = CreateMediaBody::carousel_item("https://cdn/a.jpg", "tok");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "image_url": "https://cdn/a.jpg", "is_carousel_item": true, "access_token": "tok" })
        );
    }

    #[test]
    fn test_carousel_body_keeps_child_order() {
        let children: Vec<ContainerId> = ["30", "10", "20"]
            .iter()
            .map(|id| ContainerId::parse(id).unwrap())
            .collect();
        let body = CreateMediaBody::carousel(&children, "Caption", "tok");
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "media_type": "CAROUSEL",
                "children": "30,10,20",
                "caption": "Caption",
                "access_token": "tok"
            })
        );
    }

    #[test]
    fn test_created_object_accepts_numeric_ids() {
        let created: CreatedObject = serde_json::from_str(r#"{ "id": 17895 }"#).unwrap();
        assert_eq!(created.id_string().as_deref(), Some("17895"));

        let empty: CreatedObject = serde_json::from_str(r#"{ "id": "  " }"#).unwrap();
        assert_eq!(empty.id_string(), None);

        let missing: CreatedObject = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.id_string(), None);
    }
}
