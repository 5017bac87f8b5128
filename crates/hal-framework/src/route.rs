//! # Route Resolution
//!
//! The assembler never builds URLs itself. It asks a [`RouteResolver`] to turn a
//! route name plus parameters into a path, and then into an absolute URL.
//!
//! [`RouteTable`] is a small in-memory resolver with segment templates:
//!
//! | Template            | Params        | Path         |
//! |---------------------|---------------|--------------|
//! | `/users[/:id]`      | *(none)*      | `/users`     |
//! | `/users[/:id]`      | `id = 7`      | `/users/7`   |
//! | `/users/:id/orders` | *(none)*      | error        |
//!
//! Placeholders inside `[...]` are optional: the whole group is dropped unless
//! every placeholder in it has a value.

use crate::error::HalError;
use crate::link::{RouteOptions, RouteParams};
use std::collections::HashMap;
use tracing::trace;
use url::{form_urlencoded, Url};

/// Turns named routes into URLs.
pub trait RouteResolver: Send + Sync {
    /// Assembles the path (and query string) for a route.
    fn resolve(
        &self,
        route: &str,
        params: &RouteParams,
        options: &RouteOptions,
    ) -> Result<String, HalError>;

    /// Makes a path absolute.
    fn to_absolute(&self, path: &str) -> Result<String, HalError>;

    /// Parameters of the route matched for the current request.
    fn matched_params(&self) -> RouteParams {
        RouteParams::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Literal(String),
    Param(String),
    Optional(Vec<Part>),
}

/// A parsed route template.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTemplate {
    parts: Vec<Part>,
}

impl RouteTemplate {
    pub fn parse(template: &str) -> Result<Self, HalError> {
        let mut chars = template.chars().peekable();
        let parts = parse_parts(template, &mut chars, 0)?;
        Ok(Self { parts })
    }

    fn assemble(&self, route: &str, params: &RouteParams) -> Result<String, HalError> {
        let mut path = String::new();
        for part in &self.parts {
            match assemble_part(part, params) {
                Some(text) => path.push_str(&text),
                None => {
                    let param = first_missing(part, params).unwrap_or_default();
                    return Err(HalError::MissingRouteParam {
                        route: route.to_string(),
                        param,
                    });
                }
            }
        }
        Ok(path)
    }
}

fn parse_parts(
    template: &str,
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    depth: usize,
) -> Result<Vec<Part>, HalError> {
    let invalid = |reason: &str| HalError::InvalidRouteTemplate {
        template: template.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = Vec::new();
    let mut literal = String::new();
    while let Some(c) = chars.next() {
        match c {
            '[' => {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Optional(parse_parts(template, chars, depth + 1)?));
            }
            ']' if depth == 0 => return Err(invalid("unbalanced `]`")),
            ']' => {
                if !literal.is_empty() {
                    parts.push(Part::Literal(literal));
                }
                return Ok(parts);
            }
            ':' => {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if name.is_empty() {
                    return Err(invalid("empty parameter name"));
                }
                parts.push(Part::Param(name));
            }
            other => literal.push(other),
        }
    }

    if depth > 0 {
        return Err(invalid("unclosed `[`"));
    }
    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
    Ok(parts)
}

fn assemble_part(part: &Part, params: &RouteParams) -> Option<String> {
    match part {
        Part::Literal(text) => Some(text.clone()),
        Part::Param(name) => params.get(name).map(|value| encode_segment(value)),
        Part::Optional(parts) => {
            let group: Option<String> = parts
                .iter()
                .map(|part| assemble_part(part, params))
                .collect();
            Some(group.unwrap_or_default())
        }
    }
}

fn first_missing(part: &Part, params: &RouteParams) -> Option<String> {
    match part {
        Part::Param(name) if !params.contains_key(name) => Some(name.clone()),
        _ => None,
    }
}

fn encode_segment(value: &str) -> String {
    // byte_serialize only emits `+` for spaces, literal pluses become %2B
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// In-memory [`RouteResolver`] backed by a table of named templates.
#[derive(Debug, Clone)]
pub struct RouteTable {
    base: Url,
    routes: HashMap<String, RouteTemplate>,
    matched: RouteParams,
}

impl RouteTable {
    /// Creates an empty table resolving against `base_url` (e.g. `http://localhost/api`).
    ///
    /// Paths are always resolved below the base path.
    pub fn new(base_url: &str) -> Result<Self, HalError> {
        let mut base = Url::parse(base_url).map_err(|source| HalError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            base,
            routes: HashMap::new(),
            matched: RouteParams::new(),
        })
    }

    pub fn with_route(mut self, name: impl Into<String>, template: &str) -> Result<Self, HalError> {
        self.add_route(name, template)?;
        Ok(self)
    }

    pub fn add_route(&mut self, name: impl Into<String>, template: &str) -> Result<(), HalError> {
        self.routes.insert(name.into(), RouteTemplate::parse(template)?);
        Ok(())
    }

    /// Sets the parameters of the route matched for the current request.
    pub fn with_matched_params(mut self, params: RouteParams) -> Self {
        self.matched = params;
        self
    }

}

impl RouteResolver for RouteTable {
    fn resolve(
        &self,
        route: &str,
        params: &RouteParams,
        options: &RouteOptions,
    ) -> Result<String, HalError> {
        let template = self
            .routes
            .get(route)
            .ok_or_else(|| HalError::UnknownRoute(route.to_string()))?;

        let mut path = template.assemble(route, params)?;
        if !options.query.is_empty() {
            let query = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(options.query.iter())
                .finish();
            path.push('?');
            path.push_str(&query);
        }
        trace!(route, %path, "Resolved route");
        Ok(path)
    }

    fn to_absolute(&self, path: &str) -> Result<String, HalError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map(String::from)
            .map_err(|source| HalError::InvalidUrl {
                url: path.to_string(),
                source,
            })
    }

    fn matched_params(&self) -> RouteParams {
        self.matched.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new("http://localhost")
            .unwrap()
            .with_route("users", "/users[/:id]")
            .unwrap()
            .with_route("user.orders", "/users/:user_id/orders[/:id]")
            .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> RouteParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn optional_segment_is_dropped_without_param() {
        let path = table()
            .resolve("users", &RouteParams::new(), &RouteOptions::default())
            .unwrap();
        assert_eq!(path, "/users");
    }

    #[test]
    fn optional_segment_is_filled() {
        let path = table()
            .resolve("users", &params(&[("id", "7")]), &RouteOptions::default())
            .unwrap();
        assert_eq!(path, "/users/7");
    }

    #[test]
    fn missing_required_param_fails() {
        let err = table()
            .resolve("user.orders", &RouteParams::new(), &RouteOptions::default())
            .unwrap_err();
        assert!(matches!(err, HalError::MissingRouteParam { param, .. } if param == "user_id"));
    }

    #[test]
    fn unknown_route_fails() {
        let err = table()
            .resolve("nope", &RouteParams::new(), &RouteOptions::default())
            .unwrap_err();
        assert!(matches!(err, HalError::UnknownRoute(name) if name == "nope"));
    }

    #[test]
    fn query_is_appended() {
        let options = RouteOptions::default().with_query("page", 3);
        let path = table()
            .resolve("users", &RouteParams::new(), &options)
            .unwrap();
        assert_eq!(path, "/users?page=3");
    }

    #[test]
    fn params_are_percent_encoded() {
        let path = table()
            .resolve("users", &params(&[("id", "a b/c+d")]), &RouteOptions::default())
            .unwrap();
        assert_eq!(path, "/users/a%20b%2Fc%2Bd");
    }

    #[test]
    fn to_absolute_joins_base() {
        assert_eq!(
            table().to_absolute("/users/7?page=2").unwrap(),
            "http://localhost/users/7?page=2"
        );
    }

    #[test]
    fn to_absolute_keeps_base_path() {
        let table = RouteTable::new("http://localhost/api")
            .unwrap()
            .with_route("users", "/users[/:id]")
            .unwrap();
        let path = table
            .resolve("users", &params(&[("id", "7")]), &RouteOptions::default())
            .unwrap();
        assert_eq!(table.to_absolute(&path).unwrap(), "http://localhost/api/users/7");

        let slashed = RouteTable::new("http://localhost/api/").unwrap();
        assert_eq!(
            slashed.to_absolute("/users?page=2").unwrap(),
            "http://localhost/api/users?page=2"
        );
    }

    #[test]
    fn unbalanced_templates_are_rejected() {
        assert!(RouteTemplate::parse("/users[/:id").is_err());
        assert!(RouteTemplate::parse("/users]").is_err());
        assert!(RouteTemplate::parse("/users/:").is_err());
    }
}
