//! # Links
//!
//! A [`Link`] is a relation name plus *either* an absolute URL *or* a route
//! that the [`RouteResolver`](crate::route::RouteResolver) turns into a URL.
//! Setting one when the other is present is a [`HalError::LinkConflict`].
//!
//! [`LinkCollection`] keeps links by relation, in insertion order. Adding a second
//! link under an existing relation turns it into a multi-valued relation, which
//! renders as an array (`"item": [{...}, {...}]`).

use crate::error::HalError;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Parameters substituted into a route template.
pub type RouteParams = BTreeMap<String, String>;

/// Options applied when assembling a route.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Query string parameters appended to the assembled path.
    pub query: BTreeMap<String, String>,
    /// Merge the currently matched route parameters under the explicit ones.
    pub reuse_matched_params: bool,
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            query: BTreeMap::new(),
            reuse_matched_params: true,
        }
    }
}

impl RouteOptions {
    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.insert(key.into(), value.to_string());
        self
    }
}

/// A named route with its parameters and options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Route {
    pub name: String,
    #[serde(default)]
    pub params: RouteParams,
    #[serde(default)]
    pub options: RouteOptions,
}

impl Route {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: RouteParams::new(),
            options: RouteOptions::default(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.insert(key.into(), value.to_string());
        self
    }

    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params.extend(params);
        self
    }

    pub fn with_options(mut self, options: RouteOptions) -> Self {
        self.options = options;
        self
    }
}

/// Where a link points to.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    Url(String),
    Route(Route),
}

/// A hypermedia link.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    rel: String,
    target: Option<LinkTarget>,
    props: Map<String, Value>,
}

impl Link {
    /// Creates an incomplete link; give it a url or a route before rendering.
    pub fn new(rel: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            target: None,
            props: Map::new(),
        }
    }

    /// Shorthand for a link with an absolute URL.
    pub fn url(rel: impl Into<String>, url: &str) -> Result<Self, HalError> {
        let mut link = Self::new(rel);
        link.set_url(url)?;
        Ok(link)
    }

    /// Shorthand for a link resolved through a route.
    pub fn route(rel: impl Into<String>, route: Route) -> Self {
        Self {
            target: Some(LinkTarget::Route(route)),
            ..Self::new(rel)
        }
    }

    pub fn rel(&self) -> &str {
        &self.rel
    }

    pub fn target(&self) -> Option<&LinkTarget> {
        self.target.as_ref()
    }

    pub fn props(&self) -> &Map<String, Value> {
        &self.props
    }

    pub fn is_complete(&self) -> bool {
        self.target.is_some()
    }

    pub fn set_url(&mut self, url: &str) -> Result<(), HalError> {
        if let Some(LinkTarget::Route(_)) = self.target {
            return Err(self.conflict("route"));
        }
        url::Url::parse(url).map_err(|source| HalError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        self.target = Some(LinkTarget::Url(url.to_string()));
        Ok(())
    }

    pub fn set_route(&mut self, route: Route) -> Result<(), HalError> {
        if let Some(LinkTarget::Url(_)) = self.target {
            return Err(self.conflict("url"));
        }
        self.target = Some(LinkTarget::Route(route));
        Ok(())
    }

    /// Adds parameters to the link's route.
    pub fn with_route_params(mut self, params: RouteParams) -> Result<Self, HalError> {
        match &mut self.target {
            Some(LinkTarget::Route(route)) => route.params.extend(params),
            Some(LinkTarget::Url(_)) => return Err(self.conflict("url")),
            None => return Err(HalError::IncompleteLink(self.rel)),
        }
        Ok(self)
    }

    /// Replaces the options of the link's route.
    pub fn with_route_options(mut self, options: RouteOptions) -> Result<Self, HalError> {
        match &mut self.target {
            Some(LinkTarget::Route(route)) => route.options = options,
            Some(LinkTarget::Url(_)) => return Err(self.conflict("url")),
            None => return Err(HalError::IncompleteLink(self.rel)),
        }
        Ok(self)
    }

    /// Adds a HAL link attribute such as `title` or `templated`.
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    fn conflict(&self, existing: &'static str) -> HalError {
        HalError::LinkConflict {
            rel: self.rel.clone(),
            existing,
        }
    }
}

/// Declarative link, as found in configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkSpec {
    pub rel: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub route: Option<Route>,
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl TryFrom<LinkSpec> for Link {
    type Error = HalError;

    fn try_from(spec: LinkSpec) -> Result<Self, Self::Error> {
        let mut link = Link::new(spec.rel);
        match (spec.url, spec.route) {
            (Some(url), Some(route)) => {
                link.set_route(route)?;
                link.set_url(&url)?;
            }
            (Some(url), None) => link.set_url(&url)?,
            (None, Some(route)) => link.set_route(route)?,
            (None, None) => return Err(HalError::IncompleteLink(link.rel)),
        }
        link.props = spec.props;
        Ok(link)
    }
}

/// One or more links sharing a relation.
#[derive(Debug, Clone, PartialEq)]
pub enum Relation {
    Single(Link),
    Many(Vec<Link>),
}

impl Relation {
    pub fn links(&self) -> &[Link] {
        match self {
            Relation::Single(link) => std::slice::from_ref(link),
            Relation::Many(links) => links,
        }
    }
}

/// Links of a resource or collection, grouped by relation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkCollection {
    relations: Vec<(String, Relation)>,
}

impl LinkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a link. With `overwrite`, any existing links for the relation are replaced.
    pub fn add(&mut self, link: Link, overwrite: bool) {
        let rel = link.rel().to_string();
        let Some(index) = self.position(&rel) else {
            self.relations.push((rel, Relation::Single(link)));
            return;
        };

        let slot = &mut self.relations[index].1;
        if overwrite {
            *slot = Relation::Single(link);
            return;
        }
        match slot {
            Relation::Many(links) => links.push(link),
            Relation::Single(existing) => {
                let existing = existing.clone();
                *slot = Relation::Many(vec![existing, link]);
            }
        }
    }

    pub fn get(&self, rel: &str) -> Option<&Relation> {
        self.position(rel).map(|index| &self.relations[index].1)
    }

    pub fn has(&self, rel: &str) -> bool {
        self.position(rel).is_some()
    }

    /// Whether this exact link is already present.
    pub fn contains(&self, link: &Link) -> bool {
        self.get(link.rel())
            .is_some_and(|relation| relation.links().contains(link))
    }

    pub fn remove(&mut self, rel: &str) -> Option<Relation> {
        self.position(rel)
            .map(|index| self.relations.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Relation)> {
        self.relations
            .iter()
            .map(|(rel, relation)| (rel.as_str(), relation))
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    fn position(&self, rel: &str) -> Option<usize> {
        self.relations.iter().position(|(name, _)| name == rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_then_route_conflicts() {
        let mut link = Link::url("self", "http://example.com/users/1").unwrap();
        let err = link.set_route(Route::new("users")).unwrap_err();
        assert!(matches!(err, HalError::LinkConflict { existing: "url", .. }));
    }

    #[test]
    fn route_then_url_conflicts() {
        let mut link = Link::route("self", Route::new("users"));
        let err = link.set_url("http://example.com").unwrap_err();
        assert!(matches!(err, HalError::LinkConflict { existing: "route", .. }));
    }

    #[test]
    fn relative_url_is_rejected() {
        let err = Link::url("self", "/users/1").unwrap_err();
        assert!(matches!(err, HalError::InvalidUrl { .. }));
    }

    #[test]
    fn new_link_is_incomplete() {
        assert!(!Link::new("self").is_complete());
        assert!(Link::route("self", Route::new("users")).is_complete());
    }

    #[test]
    fn route_params_on_url_link_conflict() {
        let link = Link::url("describedby", "http://example.com/doc").unwrap();
        assert!(link.with_route_params(RouteParams::new()).is_err());
    }

    #[test]
    fn link_spec_with_both_url_and_route_is_rejected() {
        let spec: LinkSpec = serde_json::from_value(serde_json::json!({
            "rel": "describedby",
            "url": "http://example.com/doc",
            "route": { "name": "docs" }
        }))
        .unwrap();
        assert!(matches!(Link::try_from(spec), Err(HalError::LinkConflict { .. })));
    }

    #[test]
    fn link_spec_with_neither_is_incomplete() {
        let spec: LinkSpec = serde_json::from_value(serde_json::json!({ "rel": "up" })).unwrap();
        assert!(matches!(Link::try_from(spec), Err(HalError::IncompleteLink(rel)) if rel == "up"));
    }

    #[test]
    fn same_relation_becomes_many() {
        let mut links = LinkCollection::new();
        links.add(Link::route("item", Route::new("users").with_param("id", 1)), false);
        links.add(Link::route("item", Route::new("users").with_param("id", 2)), false);
        links.add(Link::route("self", Route::new("users")), false);

        assert_eq!(links.len(), 2);
        assert_eq!(links.get("item").unwrap().links().len(), 2);
        let order: Vec<&str> = links.iter().map(|(rel, _)| rel).collect();
        assert_eq!(order, vec!["item", "self"]);
    }

    #[test]
    fn overwrite_replaces_relation() {
        let mut links = LinkCollection::new();
        links.add(Link::route("self", Route::new("a")), false);
        links.add(Link::route("self", Route::new("b")), true);
        assert_eq!(
            links.get("self"),
            Some(&Relation::Single(Link::route("self", Route::new("b"))))
        );
    }

    #[test]
    fn remove_drops_relation() {
        let mut links = LinkCollection::new();
        links.add(Link::route("self", Route::new("a")), false);
        assert!(links.remove("self").is_some());
        assert!(links.is_empty());
    }
}
