// src/api/parser.rs
//! Response parsing and remote error classification.
//!
//! This is the only place that interprets the platform's error shape.
//! Every remote-facing call site routes its failures through one of the
//! `classify_*` functions so the resulting [`RemoteApiError`] always
//! carries the same fields and summary format.

use super::client::ApiResponse;
use super::requests::{ContainerStatusBody, CreatedObject};
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{RemoteApiError, RemoteFailureOrigin};
use crate::types::{ContainerId, PublishId};
use serde_json::Value;
use std::fmt;

/// Normalize a remote error payload into a structured error.
///
/// Reads `message`, `type`, `code`, `error_subcode` and `fbtrace_id` from
/// a nested `error` object. Falls back to `default_message` when the body
/// carries no structured error or the error has no message.
pub fn classify_remote_error(
    status: Option<u16>,
    body: &Value,
    default_message: &str,
) -> RemoteApiError {
    let mut classified = RemoteApiError {
        origin: RemoteFailureOrigin::Api,
        status,
        message: default_message.to_string(),
        error_type: None,
        code: None,
        subcode: None,
        trace_id: None,
        container_id: None,
    };

    match body.get("error") {
        Some(Value::Object(error)) => {
            if let Some(message) = error.get("message").and_then(text_field) {
                classified.message = message;
            }
            classified.error_type = error.get("type").and_then(text_field);
            classified.code = error.get("code").and_then(text_field);
            classified.subcode = error.get("error_subcode").and_then(text_field);
            classified.trace_id = error.get("fbtrace_id").and_then(text_field);
        }
        Some(Value::String(message)) if !message.trim().is_empty() => {
            classified.message = message.trim().to_string();
        }
        _ => {}
    }

    classified
}

/// A request that never produced a response.
pub fn classify_transport_failure(default_message: &str, err: impl fmt::Display) -> RemoteApiError {
    RemoteApiError {
        origin: RemoteFailureOrigin::Transport,
        status: None,
        message: format!("{}: {}", default_message, err),
        error_type: None,
        code: None,
        subcode: None,
        trace_id: None,
        container_id: None,
    }
}

/// A container the platform reported as failed while processing.
pub fn classify_processing_failure(container_id: &ContainerId, status_code: &str) -> RemoteApiError {
    RemoteApiError {
        origin: RemoteFailureOrigin::Processing,
        status: None,
        message: format!(
            "media container {} failed processing (status: {})",
            container_id, status_code
        ),
        error_type: None,
        code: None,
        subcode: None,
        trace_id: None,
        container_id: Some(container_id.clone()),
    }
}

/// Parse a create-container response into the new container id.
///
/// A success response without an id is treated as a failure.
pub fn parse_created_container(
    response: &ApiResponse<String>,
    default_message: &str,
) -> Result<ContainerId, RemoteApiError> {
    let body = successful_body(response, default_message)?;
    let created: CreatedObject = serde_json::from_value(body.clone()).unwrap_or_default();

    created
        .id_string()
        .and_then(|id| ContainerId::parse(&id).ok())
        .ok_or_else(|| {
            log::error!(
                "{} returned {} without an id: {}",
                response.endpoint,
                response.status,
                preview(&response.data)
            );
            classify_remote_error(
                Some(response.status.as_u16()),
                &body,
                &format!("{} (response did not include an id)", default_message),
            )
        })
}

/// Parse a status read into the raw `status_code`, if the platform sent one.
pub fn parse_container_status(
    response: &ApiResponse<String>,
    default_message: &str,
) -> Result<Option<String>, RemoteApiError> {
    let body = successful_body(response, default_message)?;
    let status: ContainerStatusBody = serde_json::from_value(body).unwrap_or_default();
    Ok(status
        .status_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty()))
}

/// Parse a publish response, falling back to the submitted container id
/// when the platform omits one.
pub fn parse_published(
    response: &ApiResponse<String>,
    submitted: &ContainerId,
    default_message: &str,
) -> Result<PublishId, RemoteApiError> {
    let body = successful_body(response, default_message)?;
    let created: CreatedObject = serde_json::from_value(body).unwrap_or_default();

    match created.id_string().and_then(|id| PublishId::parse(&id).ok()) {
        Some(id) => Ok(id),
        None => {
            log::warn!(
                "Publish response for container {} carried no id; using the container id",
                submitted
            );
            Ok(submitted.cast())
        }
    }
}

/// Returns the JSON body of a successful response, or the classified error.
///
/// A 2xx response that still carries an `error` object is a failure.
fn successful_body(
    response: &ApiResponse<String>,
    default_message: &str,
) -> Result<Value, RemoteApiError> {
    let body = parse_body(&response.data);

    if !response.status.is_success() || body.get("error").is_some() {
        log::debug!(
            "{} failed with {}: {}",
            response.endpoint,
            response.status,
            preview(&response.data)
        );
        return Err(classify_remote_error(
            Some(response.status.as_u16()),
            &body,
            default_message,
        ));
    }

    Ok(body)
}

/// Lenient JSON parse; anything unparseable becomes `Null`.
pub fn parse_body(text: &str) -> Value {
    serde_json::from_str(text).unwrap_or(Value::Null)
}

fn text_field(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::StatusCode;
    use serde_json::json;

    fn response(status: StatusCode, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status,
            endpoint: "1784/media".to_string(),
        }
    }

    #[test]
    fn test_classifies_nested_graph_error() {
        let body = json!({
            "error": {
                "message": "Invalid OAuth access token.",
                "type": "OAuthException",
                "code": 190,
                "error_subcode": 463,
                "fbtrace_id": "A1b2C3"
            }
        });

        let err = classify_remote_error(Some(400), &body, "failed to create media container");
        assert_eq!(err.origin, RemoteFailureOrigin::Api);
        assert_eq!(err.status, Some(400));
        assert_eq!(err.code.as_deref(), Some("190"));
        assert_eq!(err.subcode.as_deref(), Some("463"));
        insta::assert_snapshot!(
            err.summary(),
            @"[instagram] Invalid OAuth access token. | type: OAuthException | code: 190 | subcode: 463 | fbtrace_id: A1b2C3"
        );
    }

    #[test]
    fn test_falls_back_to_default_message() {
        let err = classify_remote_error(Some(502), &Value::Null, "failed to publish media");
        insta::assert_snapshot!(err.summary(), @"[instagram] failed to publish media");

        let partial = json!({ "error": { "code": "4" } });
        let err = classify_remote_error(Some(400), &partial, "failed to publish media");
        assert_eq!(err.summary(), "[instagram] failed to publish media | code: 4");

        let flat = json!({ "error": "rate limited" });
        let err = classify_remote_error(Some(429), &flat, "failed to publish media");
        assert_eq!(err.message, "rate limited");
    }

    #[test]
    fn test_transport_failure_is_tagged() {
        let err = classify_transport_failure("failed to fetch media status", "connection reset");
        assert_eq!(err.origin, RemoteFailureOrigin::Transport);
        assert_eq!(err.status, None);
        assert_eq!(
            err.summary(),
            "[instagram] failed to fetch media status: connection reset"
        );
    }

    #[test]
    fn test_created_container_requires_id() {
        let ok = response(StatusCode::OK, r#"{ "id": "17890" }"#);
        assert_eq!(
            parse_created_container(&ok, "failed").unwrap().as_str(),
            "17890"
        );

        let missing = response(StatusCode::OK, "{}");
        let err = parse_created_container(&missing, "failed to create media container").unwrap_err();
        assert_eq!(err.status, Some(200));
        assert!(err.message.contains("did not include an id"));

        let rejected = response(
            StatusCode::BAD_REQUEST,
            r#"{ "error": { "message": "Only photo or video can be accepted as media type.", "code": 9004 } }"#,
        );
        let err = parse_created_container(&rejected, "failed").unwrap_err();
        assert_eq!(err.code.as_deref(), Some("9004"));
    }

    #[test]
    fn test_error_object_in_success_response_is_failure() {
        let sneaky = response(StatusCode::OK, r#"{ "error": { "message": "nope" } }"#);
        let err = parse_container_status(&sneaky, "failed to fetch media status").unwrap_err();
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn test_container_status_parsing() {
        let finished = response(StatusCode::OK, r#"{ "status_code": "FINISHED", "id": "1" }"#);
        assert_eq!(
            parse_container_status(&finished, "failed").unwrap().as_deref(),
            Some("FINISHED")
        );

        let silent = response(StatusCode::OK, r#"{ "id": "1" }"#);
        assert_eq!(parse_container_status(&silent, "failed").unwrap(), None);

        let html = response(StatusCode::SERVICE_UNAVAILABLE, "<html>down</html>");
        let err = parse_container_status(&html, "failed to fetch media status").unwrap_err();
        assert_eq!(err.message, "failed to fetch media status");
        assert_eq!(err.status, Some(503));
    }

    #[test]
    fn test_publish_falls_back_to_container_id() {
        let submitted = ContainerId::parse("c-77").unwrap();

        let explicit = response(StatusCode::OK, r#"{ "id": "p-1" }"#);
        assert_eq!(
            parse_published(&explicit, &submitted, "failed").unwrap().as_str(),
            "p-1"
        );

        let omitted = response(StatusCode::OK, "{}");
        assert_eq!(
            parse_published(&omitted, &submitted, "failed").unwrap().as_str(),
            "c-77"
        );
    }

    #[test]
    fn test_processing_failure_names_container() {
        let id = ContainerId::parse("c-9").unwrap();
        let err = classify_processing_failure(&id, "ERROR");
        assert_eq!(err.container_id, Some(id));
        assert_eq!(
            err.summary(),
            "[instagram] media container c-9 failed processing (status: ERROR)"
        );
    }
}
