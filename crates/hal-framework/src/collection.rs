//! # Collections
//!
//! A [`Collection`] wraps an ordered list of items, or a [`Paginator`] that serves
//! one page at a time. Paginated collections get `self`/`first`/`last`/`prev`/`next`
//! links when rendered; plain lists only get `self`.
//!
//! ## The Paginator contract
//!
//! The assembler only ever calls four things on a paginator:
//! [`set_page_size`](Paginator::set_page_size), [`set_current_page`](Paginator::set_current_page),
//! [`count`](Paginator::count) (number of *pages*) and
//! [`current_items`](Paginator::current_items). Rendering works on a clone, so the
//! paginator held by the collection is never mutated.

use crate::entity::Entity;
use crate::error::HalError;
use crate::link::{Link, LinkCollection, Route};
use crate::resource::Resource;
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::sync::Arc;

pub const DEFAULT_COLLECTION_NAME: &str = "items";
pub const DEFAULT_PAGE_SIZE: usize = 30;
pub const DEFAULT_IDENTIFIER: &str = "id";

/// An element of a collection.
#[derive(Debug, Clone)]
pub enum Item {
    Resource(Resource),
    Entity(Arc<dyn Entity>),
}

impl Item {
    pub fn entity(entity: impl Entity + 'static) -> Self {
        Item::Entity(Arc::new(entity))
    }
}

impl From<Resource> for Item {
    fn from(resource: Resource) -> Self {
        Item::Resource(resource)
    }
}

impl From<Arc<dyn Entity>> for Item {
    fn from(entity: Arc<dyn Entity>) -> Self {
        Item::Entity(entity)
    }
}

impl From<Map<String, Value>> for Item {
    fn from(map: Map<String, Value>) -> Self {
        Item::Entity(Arc::new(map))
    }
}

/// A data source that serves one page of items at a time.
pub trait Paginator: Debug + Send + Sync {
    fn set_page_size(&mut self, size: usize);

    fn set_current_page(&mut self, page: usize);

    /// Total number of pages.
    fn count(&self) -> usize;

    /// Items of the current page only.
    fn current_items(&self) -> Vec<Item>;

    fn clone_box(&self) -> Box<dyn Paginator>;
}

impl Clone for Box<dyn Paginator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// In-memory [`Paginator`] over a vector.
#[derive(Debug, Clone)]
pub struct VecPaginator {
    items: Vec<Item>,
    page_size: usize,
    page: usize,
}

impl VecPaginator {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            page_size: DEFAULT_PAGE_SIZE,
            page: 1,
        }
    }

    pub fn total_items(&self) -> usize {
        self.items.len()
    }
}

impl Paginator for VecPaginator {
    fn set_page_size(&mut self, size: usize) {
        self.page_size = size.max(1);
    }

    fn set_current_page(&mut self, page: usize) {
        self.page = page.max(1);
    }

    fn count(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    fn current_items(&self) -> Vec<Item> {
        self.items
            .iter()
            .skip((self.page - 1) * self.page_size)
            .take(self.page_size)
            .cloned()
            .collect()
    }

    fn clone_box(&self) -> Box<dyn Paginator> {
        Box::new(self.clone())
    }
}

/// What a collection iterates over.
#[derive(Debug, Clone)]
pub enum CollectionSource {
    Items(Vec<Item>),
    Paginated(Box<dyn Paginator>),
}

/// A list of items rendered under `_embedded[name]`.
#[derive(Debug, Clone)]
pub struct Collection {
    source: CollectionSource,
    name: String,
    page: i64,
    page_size: usize,
    route: Option<Route>,
    resource_route: Option<Route>,
    identifier_name: String,
    route_identifier_name: String,
    attributes: Map<String, Value>,
    links: LinkCollection,
}

impl Collection {
    pub fn new(items: Vec<Item>) -> Self {
        Self::from_source(CollectionSource::Items(items))
    }

    pub fn paginated(paginator: impl Paginator + 'static) -> Self {
        Self::from_source(CollectionSource::Paginated(Box::new(paginator)))
    }

    pub fn from_source(source: CollectionSource) -> Self {
        Self {
            source,
            name: DEFAULT_COLLECTION_NAME.to_string(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            route: None,
            resource_route: None,
            identifier_name: DEFAULT_IDENTIFIER.to_string(),
            route_identifier_name: DEFAULT_IDENTIFIER.to_string(),
            attributes: Map::new(),
            links: LinkCollection::new(),
        }
    }

    /// Key used under `_embedded`.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Requested page. Out-of-range values are reported at render time.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    pub fn with_page_size(mut self, size: usize) -> Result<Self, HalError> {
        self.set_page_size(size)?;
        Ok(self)
    }

    pub fn set_page_size(&mut self, size: usize) -> Result<(), HalError> {
        if size == 0 {
            return Err(HalError::InvalidPageSize);
        }
        self.page_size = size;
        Ok(())
    }

    /// Route of the collection itself; pagination links are built from it.
    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    /// Route used for the `self` link of items that do not declare their own.
    pub fn with_resource_route(mut self, route: Route) -> Self {
        self.resource_route = Some(route);
        self
    }

    /// Field holding each item's identifier.
    pub fn with_identifier_name(mut self, name: impl Into<String>) -> Self {
        self.identifier_name = name.into();
        self
    }

    /// Route parameter receiving each item's identifier.
    pub fn with_route_identifier_name(mut self, name: impl Into<String>) -> Self {
        self.route_identifier_name = name.into();
        self
    }

    /// Top-level attribute merged into the rendered payload.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.add(link, false);
        self
    }

    pub fn source(&self) -> &CollectionSource {
        &self.source
    }

    pub fn is_paginated(&self) -> bool {
        matches!(self.source, CollectionSource::Paginated(_))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn resource_route(&self) -> Option<&Route> {
        self.resource_route.as_ref()
    }

    pub fn identifier_name(&self) -> &str {
        &self.identifier_name
    }

    pub fn route_identifier_name(&self) -> &str {
        &self.route_identifier_name
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn links(&self) -> &LinkCollection {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkCollection {
        &mut self.links
    }
}
