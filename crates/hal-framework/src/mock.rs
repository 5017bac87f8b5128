//! # Mock Router & Testing Guide
//!
//! [`MockRouteResolver`] implements [`RouteResolver`] entirely from queued
//! expectations. It lets you test rendering logic without declaring route
//! templates, and assert exactly which routes were resolved, in which order, with
//! which parameters.
//!
//! ## When to use the Mock vs a RouteTable
//!
//! | Feature | MockRouteResolver | RouteTable |
//! |---------|-------------------|------------|
//! | **Setup** | One expectation per resolved link | Route templates |
//! | **Order** | Asserted (FIFO queue) | Not tracked |
//! | **Error Injection** | Easy (`return_err`) | Requires a broken template or missing param |
//! | **Use Case** | Unit testing what the assembler asks for | Testing real URLs end to end |
//!
//! ## Example
//!
//! ```rust
//! use hal_framework::mock::MockRouteResolver;
//! use hal_framework::{HalAssembler, Resource, Route};
//! use serde_json::json;
//!
//! let mock = MockRouteResolver::new("http://api.test");
//! mock.expect_resolve("users").with_param("id", "7").return_ok("/users/7");
//!
//! let assembler = HalAssembler::builder(mock.clone()).build();
//! let entity = json!({ "id": 7 }).as_object().cloned().unwrap();
//! let resource = Resource::new(entity, 7).with_route(Route::new("users"));
//! let payload = assembler.render_resource(&resource).unwrap();
//!
//! assert_eq!(payload["_links"]["self"]["href"], json!("http://api.test/users/7"));
//! mock.verify();
//! ```
//!
//! ## Testing Failure Scenarios
//!
//! ```rust
//! use hal_framework::mock::MockRouteResolver;
//! use hal_framework::{HalAssembler, HalError, Resource, Route};
//! use serde_json::json;
//!
//! let mock = MockRouteResolver::new("http://api.test");
//! mock.expect_resolve("users").return_err(HalError::UnknownRoute("users".into()));
//!
//! let assembler = HalAssembler::builder(mock.clone()).build();
//! let entity = json!({ "id": 7 }).as_object().cloned().unwrap();
//! let resource = Resource::new(entity, 7).with_route(Route::new("users"));
//!
//! assert!(matches!(assembler.render_resource(&resource), Err(HalError::UnknownRoute(_))));
//! ```

use crate::error::HalError;
use crate::link::{RouteOptions, RouteParams};
use crate::route::RouteResolver;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// An expected `resolve` call and its canned response.
struct Expectation {
    route: String,
    params: RouteParams,
    response: Result<String, HalError>,
}

/// A recorded `resolve` call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolveCall {
    pub route: String,
    pub params: RouteParams,
    pub options: RouteOptions,
}

#[derive(Default)]
struct State {
    expectations: VecDeque<Expectation>,
    calls: Vec<ResolveCall>,
}

/// A route resolver driven by expectations.
///
/// Clones share the same expectation queue, so keep one clone for setup and
/// verification and hand the other to the assembler.
#[derive(Clone)]
pub struct MockRouteResolver {
    base_url: String,
    matched: RouteParams,
    state: Arc<Mutex<State>>,
}

impl MockRouteResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            matched: RouteParams::new(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn with_matched_params(mut self, params: RouteParams) -> Self {
        self.matched = params;
        self
    }

    /// Expects a `resolve` call for `route`.
    pub fn expect_resolve(&self, route: impl Into<String>) -> ResolveExpectationBuilder {
        ResolveExpectationBuilder {
            route: route.into(),
            params: RouteParams::new(),
            state: self.state.clone(),
        }
    }

    /// Every `resolve` call received so far.
    pub fn calls(&self) -> Vec<ResolveCall> {
        self.lock().calls.clone()
    }

    /// Panics unless every expectation was consumed.
    pub fn verify(&self) {
        let remaining = self.lock().expectations.len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteResolver for MockRouteResolver {
    fn resolve(
        &self,
        route: &str,
        params: &RouteParams,
        options: &RouteOptions,
    ) -> Result<String, HalError> {
        let mut state = self.lock();
        state.calls.push(ResolveCall {
            route: route.to_string(),
            params: params.clone(),
            options: options.clone(),
        });
        let Some(expectation) = state.expectations.pop_front() else {
            drop(state);
            panic!("Unexpected resolve(`{route}`): no expectations left");
        };
        drop(state);

        if expectation.route != route {
            panic!("Expected resolve(`{}`), got resolve(`{route}`)", expectation.route);
        }
        for (key, value) in &expectation.params {
            if params.get(key) != Some(value) {
                panic!("resolve(`{route}`): expected param {key}={value}, got {params:?}");
            }
        }
        expectation.response
    }

    fn to_absolute(&self, path: &str) -> Result<String, HalError> {
        Ok(format!("{}{}", self.base_url, path))
    }

    fn matched_params(&self) -> RouteParams {
        self.matched.clone()
    }
}

/// Builder for `resolve` expectations.
pub struct ResolveExpectationBuilder {
    route: String,
    params: RouteParams,
    state: Arc<Mutex<State>>,
}

impl ResolveExpectationBuilder {
    /// Requires a parameter to be present with this value.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    /// Sets the expectation to return a path.
    pub fn return_ok(self, path: impl Into<String>) {
        self.push(Ok(path.into()));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: HalError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<String, HalError>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.expectations.push_back(Expectation {
            route: self.route,
            params: self.params,
            response,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectations_are_consumed_in_order() {
        let mock = MockRouteResolver::new("http://api.test/");
        mock.expect_resolve("users").return_ok("/users");
        mock.expect_resolve("orders").with_param("id", 3).return_ok("/orders/3");

        let mut params = RouteParams::new();
        assert_eq!(mock.resolve("users", &params, &RouteOptions::default()).unwrap(), "/users");
        params.insert("id".into(), "3".into());
        assert_eq!(mock.resolve("orders", &params, &RouteOptions::default()).unwrap(), "/orders/3");
        assert_eq!(mock.to_absolute("/orders/3").unwrap(), "http://api.test/orders/3");

        let routes: Vec<String> = mock.calls().into_iter().map(|call| call.route).collect();
        assert_eq!(routes, vec!["users", "orders"]);
        mock.verify();
    }

    #[test]
    fn test_error_injection() {
        let mock = MockRouteResolver::new("http://api.test");
        mock.expect_resolve("users").return_err(HalError::UnknownRoute("users".into()));
        let result = mock.resolve("users", &RouteParams::new(), &RouteOptions::default());
        assert!(matches!(result, Err(HalError::UnknownRoute(_))));
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_verify_panics_on_leftovers() {
        let mock = MockRouteResolver::new("http://api.test");
        mock.expect_resolve("users").return_ok("/users");
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "Expected resolve(`users`)")]
    fn test_wrong_route_panics() {
        let mock = MockRouteResolver::new("http://api.test");
        mock.expect_resolve("users").return_ok("/users");
        let _ = mock.resolve("orders", &RouteParams::new(), &RouteOptions::default());
    }
}
