//! # Transport Contract
//!
//! The assembler only produces JSON maps. This module decides how a transport
//! layer should send them:
//!
//! | Payload shape                                      | Content type                   |
//! |----------------------------------------------------|--------------------------------|
//! | `{describedBy, title, httpStatus, detail, ...}`    | `application/api-problem+json` |
//! | contains `_links`                                  | `application/hal+json`         |
//! | anything else                                      | `application/json`             |
//!
//! Problem payloads also set the response status from `httpStatus`, normalized to
//! 500 when it falls outside `100..=599`.

use crate::assembler::Rendered;
use crate::error::HalError;
use crate::problem::{ApiProblem, RESERVED_KEYS};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ContentType {
    #[serde(rename = "application/api-problem+json")]
    ProblemJson,
    #[serde(rename = "application/hal+json")]
    HalJson,
    #[serde(rename = "application/json")]
    Json,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProblemJson => "application/api-problem+json",
            Self::HalJson => "application/hal+json",
            Self::Json => "application/json",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Picks the content type for a rendered payload.
pub fn content_type_for(payload: &Map<String, Value>) -> ContentType {
    if RESERVED_KEYS.iter().all(|key| payload.contains_key(*key)) {
        ContentType::ProblemJson
    } else if payload.contains_key("_links") {
        ContentType::HalJson
    } else {
        ContentType::Json
    }
}

/// Clamps a status code to the HTTP range, 500 otherwise.
pub fn normalize_status(status: u16) -> u16 {
    if (100..=599).contains(&status) {
        status
    } else {
        500
    }
}

/// A payload ready to be written by a transport layer.
#[derive(Debug, Clone, PartialEq)]
pub struct HalResponse {
    pub status: u16,
    pub content_type: ContentType,
    pub body: Map<String, Value>,
}

impl HalResponse {
    /// Wraps a successful payload. Problem-shaped payloads take their status from `httpStatus`.
    pub fn from_payload(body: Map<String, Value>) -> Self {
        let content_type = content_type_for(&body);
        let status = match content_type {
            ContentType::ProblemJson => body
                .get("httpStatus")
                .and_then(Value::as_u64)
                .map_or(500, |status| normalize_status(u16::try_from(status).unwrap_or(0))),
            _ => 200,
        };
        Self {
            status,
            content_type,
            body,
        }
    }

    pub fn from_problem(problem: &ApiProblem) -> Self {
        Self {
            status: normalize_status(problem.status()),
            content_type: ContentType::ProblemJson,
            body: problem.to_payload(),
        }
    }

    pub fn from_rendered(rendered: Rendered) -> Self {
        match rendered {
            Rendered::Payload(payload) => Self::from_payload(payload),
            Rendered::Problem(problem) => Self::from_problem(&problem),
        }
    }

    pub fn to_json_string(&self) -> Result<String, HalError> {
        Ok(serde_json::to_string(&self.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn problem_shape_wins() {
        let payload = map(json!({
            "describedBy": "x", "title": "t", "httpStatus": 409, "detail": "d", "_links": {}
        }));
        assert_eq!(content_type_for(&payload), ContentType::ProblemJson);
    }

    #[test]
    fn links_mean_hal() {
        assert_eq!(content_type_for(&map(json!({ "_links": {} }))), ContentType::HalJson);
        assert_eq!(content_type_for(&map(json!({ "id": 1 }))), ContentType::Json);
    }

    #[test]
    fn status_is_normalized() {
        assert_eq!(normalize_status(404), 404);
        assert_eq!(normalize_status(99), 500);
        assert_eq!(normalize_status(600), 500);
    }

    #[test]
    fn problem_payload_sets_status() {
        let response = HalResponse::from_problem(&ApiProblem::new(409, "Invalid page provided"));
        assert_eq!(response.status, 409);
        assert_eq!(response.content_type.as_str(), "application/api-problem+json");
        assert_eq!(response.body["detail"], json!("Invalid page provided"));
    }

    #[test]
    fn out_of_range_problem_status_becomes_500() {
        let response = HalResponse::from_problem(&ApiProblem::new(42, "odd"));
        assert_eq!(response.status, 500);
        assert_eq!(response.body["httpStatus"], json!(42));

        let raw = HalResponse::from_payload(map(json!({
            "describedBy": "x", "title": "t", "httpStatus": 70000, "detail": "d"
        })));
        assert_eq!(raw.status, 500);
    }

    #[test]
    fn hal_payload_is_200() {
        let response = HalResponse::from_rendered(Rendered::Payload(map(json!({ "_links": {} }))));
        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, ContentType::HalJson);
        assert_eq!(response.to_json_string().unwrap(), r#"{"_links":{}}"#);
    }
}
