//! # Framework Errors
//!
//! This module defines the error type shared by every part of the HAL framework.
//! Configuration mistakes (bad metadata, conflicting links, unknown routes or
//! hydrators) surface here and are never silently degraded.
//!
//! Invalid pagination requests are *not* errors: they are returned as an
//! [`ApiProblem`](crate::problem::ApiProblem) from the render path.

use crate::problem::{ApiProblem, ProblemError};

/// Errors that can occur while building or rendering HAL payloads.
#[derive(Debug, thiserror::Error)]
pub enum HalError {
    #[error("Link conflict on `{rel}`: a {existing} is already set")]
    LinkConflict { rel: String, existing: &'static str },

    #[error("Link `{0}` has neither a url nor a route")]
    IncompleteLink(String),

    #[error("Invalid url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unknown route: {0}")]
    UnknownRoute(String),

    #[error("Route `{route}` is missing required parameter `{param}`")]
    MissingRouteParam { route: String, param: String },

    #[error("Invalid route template `{template}`: {reason}")]
    InvalidRouteTemplate { template: String, reason: String },

    #[error("Invalid metadata for `{type_name}`: {reason}")]
    InvalidMetadata { type_name: String, reason: String },

    #[error("No metadata registered for `{0}`")]
    UnknownType(String),

    #[error("Hydrator not registered: {0}")]
    UnknownHydrator(String),

    #[error("Field extraction failed for `{type_name}`: {reason}")]
    Extraction { type_name: String, reason: String },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Collection `{0}` has no route to build pagination links from")]
    MissingCollectionRoute(String),

    #[error("Embedded collection `{field}` could not be rendered: {}", .problem.detail())]
    EmbeddedProblem {
        field: String,
        problem: Box<ApiProblem>,
    },

    #[error("Render listener failed: {0}")]
    Listener(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ProblemError for HalError {
    fn status_code(&self) -> Option<u16> {
        match self {
            HalError::EmbeddedProblem { problem, .. } => Some(problem.status()),
            _ => None,
        }
    }
}
