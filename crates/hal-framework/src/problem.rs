//! # Problem API Payloads
//!
//! [`ApiProblem`] is the error descriptor rendered as `application/api-problem+json`.
//! It is immutable once built: every `with_*` method consumes and returns the problem.
//!
//! The serialized shape is always:
//!
//! ```text
//! { "describedBy": ..., "title": ..., "httpStatus": ..., "detail": ..., <extras> }
//! ```
//!
//! Extras are merged in, but they can never shadow the four reserved keys.
//!
//! ## From errors
//!
//! Any error implementing [`ProblemError`] can become a problem. The status code
//! comes from [`ProblemError::status_code`] when it is a valid HTTP status, otherwise 500.
//!
//! ```rust
//! use hal_framework::{ApiProblem, HalError};
//!
//! let err = HalError::UnknownRoute("users".into());
//! let problem = ApiProblem::from_error(&err);
//! assert_eq!(problem.status(), 500);
//! assert_eq!(problem.title(), "Internal Server Error");
//! ```

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;

/// Reference URI used when the caller does not describe the problem type.
pub const DEFAULT_DESCRIBED_BY: &str = "http://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html";

/// Keys owned by the problem itself.
pub const RESERVED_KEYS: [&str; 4] = ["describedBy", "title", "httpStatus", "detail"];

/// Errors that know which HTTP status they map to.
pub trait ProblemError: Error + 'static {
    /// The HTTP status for this error, if it has one.
    fn status_code(&self) -> Option<u16> {
        None
    }
}

/// Title for the status codes the problem knows about.
pub fn status_title(status: u16) -> Option<&'static str> {
    match status {
        404 => Some("Not Found"),
        409 => Some("Conflict"),
        422 => Some("Unprocessable Entity"),
        500 => Some("Internal Server Error"),
        _ => None,
    }
}

fn is_http_status(status: u16) -> bool {
    (100..=599).contains(&status)
}

#[derive(Debug, Clone, PartialEq)]
enum Detail {
    Message(String),
    Error {
        // newest first: the error itself, then its sources
        chain: Vec<String>,
        backtrace: Option<String>,
    },
}

/// An error descriptor for the Problem API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiProblem {
    status: u16,
    detail: Detail,
    described_by: String,
    title: Option<String>,
    include_trace: bool,
    extras: Map<String, Value>,
}

impl ApiProblem {
    /// Creates a problem from a status code and a detail message.
    pub fn new(status: u16, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: Detail::Message(detail.into()),
            described_by: DEFAULT_DESCRIBED_BY.to_string(),
            title: None,
            include_trace: false,
            extras: Map::new(),
        }
    }

    /// Creates a problem from a caught error.
    ///
    /// The whole source chain is recorded so that [`ApiProblem::with_detail_trace`]
    /// can include it later. A backtrace is captured when `RUST_BACKTRACE` enables it.
    pub fn from_error<E: ProblemError>(err: &E) -> Self {
        let status = err
            .status_code()
            .filter(|code| is_http_status(*code))
            .unwrap_or(500);

        let mut chain = vec![err.to_string()];
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }

        let backtrace = Backtrace::capture();
        let backtrace = match backtrace.status() {
            BacktraceStatus::Captured => Some(backtrace.to_string()),
            _ => None,
        };

        Self {
            detail: Detail::Error { chain, backtrace },
            ..Self::new(status, String::new())
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_described_by(mut self, uri: impl Into<String>) -> Self {
        self.described_by = uri.into();
        self
    }

    /// Includes the error chain (and backtrace, if captured) in `detail`.
    pub fn with_detail_trace(mut self, include: bool) -> Self {
        self.include_trace = include;
        self
    }

    /// Adds an extra key to the payload. Reserved keys are ignored at render time.
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    /// The raw status code. It is *not* clamped here; see
    /// [`normalize_status`](crate::response::normalize_status).
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn described_by(&self) -> &str {
        &self.described_by
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }

    pub fn title(&self) -> String {
        if let Some(title) = &self.title {
            return title.clone();
        }
        if self.described_by == DEFAULT_DESCRIBED_BY {
            if let Some(title) = status_title(self.status) {
                return title.to_string();
            }
        }
        "Unknown".to_string()
    }

    pub fn detail(&self) -> String {
        match &self.detail {
            Detail::Message(message) => message.clone(),
            Detail::Error { chain, .. } if !self.include_trace => {
                chain.first().cloned().unwrap_or_default()
            }
            Detail::Error { chain, backtrace } => {
                let mut lines = Vec::with_capacity(chain.len() + 1);
                for (i, message) in chain.iter().enumerate() {
                    lines.push(message.clone());
                    if i == 0 {
                        if let Some(trace) = backtrace {
                            lines.push(trace.clone());
                        }
                    }
                }
                lines.join("\n").trim().to_string()
            }
        }
    }

    /// Builds the ordered payload map.
    pub fn to_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        payload.insert("describedBy".into(), Value::String(self.described_by.clone()));
        payload.insert("title".into(), Value::String(self.title()));
        payload.insert("httpStatus".into(), Value::from(self.status));
        payload.insert("detail".into(), Value::String(self.detail()));
        for (key, value) in &self.extras {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            payload.insert(key.clone(), value.clone());
        }
        payload
    }
}

impl Serialize for ApiProblem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, thiserror::Error)]
    #[error("row locked")]
    struct LockError;

    #[derive(Debug, thiserror::Error)]
    #[error("save failed")]
    struct SaveError {
        #[source]
        source: LockError,
    }

    impl ProblemError for SaveError {
        fn status_code(&self) -> Option<u16> {
            Some(409)
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("teapot")]
    struct BogusStatus;

    impl ProblemError for BogusStatus {
        fn status_code(&self) -> Option<u16> {
            Some(999)
        }
    }

    #[test]
    fn known_status_gets_title_from_table() {
        let problem = ApiProblem::new(404, "no such user");
        assert_eq!(problem.title(), "Not Found");
        assert_eq!(problem.detail(), "no such user");
    }

    #[test]
    fn unknown_status_is_titled_unknown() {
        let problem = ApiProblem::new(416, "range");
        assert_eq!(problem.title(), "Unknown");
    }

    #[test]
    fn custom_described_by_disables_title_lookup() {
        let problem = ApiProblem::new(404, "gone").with_described_by("http://example.com/problems/gone");
        assert_eq!(problem.title(), "Unknown");
    }

    #[test]
    fn explicit_title_wins() {
        let problem = ApiProblem::new(404, "gone").with_title("Vanished");
        assert_eq!(problem.title(), "Vanished");
    }

    #[test]
    fn extras_cannot_shadow_reserved_keys() {
        let problem = ApiProblem::new(422, "bad input")
            .with_extra("title", "hijacked")
            .with_extra("httpStatus", 200)
            .with_extra("field", "email");

        let payload = serde_json::to_value(&problem).unwrap();
        assert_eq!(
            payload,
            json!({
                "describedBy": DEFAULT_DESCRIBED_BY,
                "title": "Unprocessable Entity",
                "httpStatus": 422,
                "detail": "bad input",
                "field": "email",
            })
        );
    }

    #[test]
    fn from_error_uses_error_status() {
        let err = SaveError { source: LockError };
        let problem = ApiProblem::from_error(&err);
        assert_eq!(problem.status(), 409);
        assert_eq!(problem.detail(), "save failed");
    }

    #[test]
    fn from_error_with_invalid_status_falls_back_to_500() {
        let problem = ApiProblem::from_error(&BogusStatus);
        assert_eq!(problem.status(), 500);
    }

    #[test]
    fn detail_trace_lists_the_source_chain() {
        let err = SaveError { source: LockError };
        let problem = ApiProblem::from_error(&err).with_detail_trace(true);
        let detail = problem.detail();
        assert!(detail.starts_with("save failed"));
        assert!(detail.trim_end().ends_with("row locked"));
    }

    #[test]
    fn explicit_status_overrides_error_status() {
        let err = SaveError { source: LockError };
        let problem = ApiProblem::from_error(&err).with_status(422);
        assert_eq!(problem.status(), 422);
    }
}
