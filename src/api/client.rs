// src/api/client.rs
//! HTTP client wrapper for the Instagram Graph API.
//!
//! A thin layer over reqwest that knows the base URL and how to send a
//! request. The access token travels in the request body or query, so
//! only endpoint paths are ever logged.

use super::parser;
use super::requests::{CreateMediaBody, PublishBody};
use super::MediaPlatform;
use crate::error::{PublishError, RemoteApiError};
use crate::types::{AccessToken, BusinessAccountId, ContainerId, PublishId, ValidatedUrl};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;

const CREATE_CONTAINER_FAILED: &str = "failed to create media container";
const CREATE_CAROUSEL_FAILED: &str = "failed to create carousel container";
const FETCH_STATUS_FAILED: &str = "failed to fetch media status";
const PUBLISH_FAILED: &str = "failed to publish media";

/// A reqwest client bound to one Graph API root.
#[derive(Clone)]
pub struct GraphHttpClient {
    client: Client,
    base_url: String,
}

impl GraphHttpClient {
    /// Creates a client for `base_url` (e.g. `https://graph.facebook.com/v19.0`).
    pub fn new(base_url: &ValidatedUrl, timeout: Duration) -> Result<Self, PublishError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| parser::classify_transport_failure("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Makes a GET request with query parameters.
    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, &str)],
        context: &str,
    ) -> Result<ApiResponse<String>, RemoteApiError> {
        log::debug!("GET {}", path);

        let response = self
            .client
            .get(self.endpoint(path))
            .query(query)
            .send()
            .await
            .map_err(|e| parser::classify_transport_failure(context, e.without_url()))?;

        extract_response_text(response, path, context).await
    }

    /// Makes a POST request with a JSON body.
    pub async fn post<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        context: &str,
    ) -> Result<ApiResponse<String>, RemoteApiError> {
        log::debug!("POST {}", path);

        let response = self
            .client
            .post(self.endpoint(path))
            .json(body)
            .send()
            .await
            .map_err(|e| parser::classify_transport_failure(context, e.without_url()))?;

        extract_response_text(response, path, context).await
    }
}

#[async_trait::async_trait]
impl MediaPlatform for GraphHttpClient {
    async fn create_item_container(
        &self,
        image_url: &ValidatedUrl,
        access_token: &AccessToken,
        account: &BusinessAccountId,
        is_carousel_item: bool,
        caption: Option<&str>,
    ) -> Result<ContainerId, RemoteApiError> {
        let body = if is_carousel_item {
            CreateMediaBody::carousel_item(image_url.as_str(), access_token.expose())
        } else {
            CreateMediaBody::single(
                image_url.as_str(),
                caption.unwrap_or_default(),
                access_token.expose(),
            )
        };

        let path = format!("{}/media", account);
        let response = self.post(&path, &body, CREATE_CONTAINER_FAILED).await?;
        let container_id = parser::parse_created_container(&response, CREATE_CONTAINER_FAILED)?;

        log::info!(
            "Created {} container {}",
            if is_carousel_item { "carousel-item" } else { "single" },
            container_id
        );
        Ok(container_id)
    }

    async fn create_carousel_container(
        &self,
        children: &[ContainerId],
        caption: &str,
        access_token: &AccessToken,
        account: &BusinessAccountId,
    ) -> Result<ContainerId, RemoteApiError> {
        let body = CreateMediaBody::carousel(children, caption, access_token.expose());

        let path = format!("{}/media", account);
        let response = self.post(&path, &body, CREATE_CAROUSEL_FAILED).await?;
        let container_id = parser::parse_created_container(&response, CREATE_CAROUSEL_FAILED)?;

        log::info!(
            "Created carousel container {} with {} children",
            container_id,
            children.len()
        );
        Ok(container_id)
    }

    async fn fetch_status(
        &self,
        container_id: &ContainerId,
        access_token: &AccessToken,
    ) -> Result<Option<String>, RemoteApiError> {
        let query = [
            ("fields", "status_code"),
            ("access_token", access_token.expose()),
        ];
        let response = self
            .get(container_id.as_str(), &query, FETCH_STATUS_FAILED)
            .await
            .map_err(|e| e.for_container(container_id))?;

        parser::parse_container_status(&response, FETCH_STATUS_FAILED)
            .map_err(|e| e.for_container(container_id))
    }

    async fn publish_container(
        &self,
        container_id: &ContainerId,
        access_token: &AccessToken,
        account: &BusinessAccountId,
    ) -> Result<PublishId, RemoteApiError> {
        let body = PublishBody {
            creation_id: container_id.as_str(),
            access_token: access_token.expose(),
        };

        let path = format!("{}/media_publish", account);
        let response = self
            .post(&path, &body, PUBLISH_FAILED)
            .await
            .map_err(|e| e.for_container(container_id))?;

        parser::parse_published(&response, container_id, PUBLISH_FAILED)
            .map_err(|e| e.for_container(container_id))
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    /// Endpoint path without base URL or query (safe to log).
    pub endpoint: String,
}

/// Reads the response body as text along with its status.
pub async fn extract_response_text(
    response: Response,
    endpoint: &str,
    context: &str,
) -> Result<ApiResponse<String>, RemoteApiError> {
    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| parser::classify_transport_failure(context, e.without_url()))?;

    log::debug!("{} responded {}", endpoint, status);

    Ok(ApiResponse {
        data: text,
        status,
        endpoint: endpoint.to_string(),
    })
}
