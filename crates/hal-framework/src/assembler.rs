//! # HAL Assembler
//!
//! [`HalAssembler`] turns [`Resource`]s and [`Collection`]s into HAL payloads:
//!
//! ```json
//! { "id": 1, "name": "Alice", "_links": { "self": { "href": "http://localhost/users/1" } } }
//! ```
//!
//! **Resources** get their fields from the hydrator chain (see [`crate::hydrator`]).
//! Fields holding a nested resource, collection or metadata-backed entity move
//! under `_embedded`. A `self` link is synthesized from the resource's route or
//! its metadata, unless one is already attached.
//!
//! **Collections** embed their items under `_embedded[name]`. Paginated ones also
//! get `first`/`last`/`prev`/`next` links; asking for a page outside `1..=count`
//! yields [`Rendered::Problem`] with status 409 instead of a payload.
//!
//! The assembler is immutable once built and can be shared between threads.
//! Rendering never mutates its inputs, so rendering the same resource twice gives
//! the same output.

use crate::collection::{Collection, CollectionSource, Item, DEFAULT_IDENTIFIER};
use crate::config::HalConfig;
use crate::entity::{Entity, FieldValue, Fields};
use crate::error::HalError;
use crate::hydrator::HydratorManager;
use crate::link::{Link, LinkCollection, LinkTarget, Relation, Route, RouteParams};
use crate::listener::{CollectionEvent, RenderListener, ResourceEvent};
use crate::metadata::{Metadata, MetadataMap};
use crate::problem::ApiProblem;
use crate::resource::Resource;
use crate::route::RouteResolver;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, trace, warn};

/// Detail of the problem returned for an out-of-range page.
pub const INVALID_PAGE_DETAIL: &str = "Invalid page provided";

/// Outcome of rendering a collection.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Payload(Map<String, Value>),
    Problem(ApiProblem),
}

impl Rendered {
    pub fn is_problem(&self) -> bool {
        matches!(self, Rendered::Problem(_))
    }

    pub fn into_payload(self) -> Option<Map<String, Value>> {
        match self {
            Rendered::Payload(payload) => Some(payload),
            Rendered::Problem(_) => None,
        }
    }

    pub fn problem(&self) -> Option<&ApiProblem> {
        match self {
            Rendered::Problem(problem) => Some(problem),
            Rendered::Payload(_) => None,
        }
    }
}

/// Builds [`HalAssembler`]s.
pub struct HalAssemblerBuilder {
    router: Arc<dyn RouteResolver>,
    metadata: MetadataMap,
    hydrators: HydratorManager,
    listeners: Vec<Arc<dyn RenderListener>>,
    max_depth: Option<usize>,
}

impl HalAssemblerBuilder {
    pub fn with_metadata(mut self, metadata: MetadataMap) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_hydrators(mut self, hydrators: HydratorManager) -> Self {
        self.hydrators = hydrators;
        self
    }

    /// Appends a listener. Listeners run in the order they were added.
    pub fn with_listener(mut self, listener: impl RenderListener + 'static) -> Self {
        self.listeners.push(Arc::new(listener));
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Applies `renderer`, `match_ancestors` and `metadata_map` from a configuration.
    ///
    /// Named hydrators referenced by the configuration must already be registered,
    /// so call [`with_hydrators`](Self::with_hydrators) first.
    pub fn configure(mut self, config: &HalConfig) -> Result<Self, HalError> {
        self.hydrators.configure(&config.renderer)?;
        self.metadata = MetadataMap::from_config(config, &self.hydrators)?;
        if let Some(depth) = config.renderer.max_depth {
            self.max_depth = Some(depth);
        }
        Ok(self)
    }

    pub fn build(self) -> HalAssembler {
        HalAssembler {
            router: self.router,
            metadata: self.metadata,
            hydrators: self.hydrators,
            listeners: self.listeners,
            max_depth: self.max_depth,
        }
    }
}

/// Renders resources and collections as HAL.
#[derive(Clone)]
pub struct HalAssembler {
    router: Arc<dyn RouteResolver>,
    metadata: MetadataMap,
    hydrators: HydratorManager,
    listeners: Vec<Arc<dyn RenderListener>>,
    max_depth: Option<usize>,
}

impl fmt::Debug for HalAssembler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalAssembler")
            .field("metadata", &self.metadata)
            .field("hydrators", &self.hydrators)
            .field("listeners", &self.listeners.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl HalAssembler {
    pub fn builder(router: impl RouteResolver + 'static) -> HalAssemblerBuilder {
        HalAssemblerBuilder {
            router: Arc::new(router),
            metadata: MetadataMap::new(),
            hydrators: HydratorManager::new(),
            listeners: Vec::new(),
            max_depth: None,
        }
    }

    /// Builds an assembler entirely from configuration. The `router` section is required.
    pub fn from_config(config: &HalConfig, hydrators: HydratorManager) -> Result<Self, HalError> {
        let router = config
            .router
            .as_ref()
            .ok_or_else(|| HalError::Config("missing `router` section".into()))?
            .build()?;
        Ok(Self::builder(router)
            .with_hydrators(hydrators)
            .configure(config)?
            .build())
    }

    pub fn metadata(&self) -> &MetadataMap {
        &self.metadata
    }

    pub fn hydrators(&self) -> &HydratorManager {
        &self.hydrators
    }

    // --- Links ---

    /// Resolves a link target to an absolute URL.
    ///
    /// Route parameters are merged as: matched request parameters (when the route
    /// allows reusing them), then the route's own parameters, then `id` under
    /// `route_identifier_name`.
    pub fn create_link(
        &self,
        target: &LinkTarget,
        id: Option<&Value>,
        route_identifier_name: &str,
    ) -> Result<String, HalError> {
        let route = match target {
            LinkTarget::Url(url) => return Ok(url.clone()),
            LinkTarget::Route(route) => route,
        };

        let mut params = if route.options.reuse_matched_params {
            self.router.matched_params()
        } else {
            RouteParams::new()
        };
        params.extend(route.params.clone());
        if let Some(id) = id {
            params.insert(route_identifier_name.to_string(), param_value(id));
        }

        let path = self.router.resolve(&route.name, &params, &route.options)?;
        self.router.to_absolute(&path)
    }

    pub fn resolve_link(&self, link: &Link) -> Result<String, HalError> {
        let target = link
            .target()
            .ok_or_else(|| HalError::IncompleteLink(link.rel().to_string()))?;
        self.create_link(target, None, DEFAULT_IDENTIFIER)
    }

    /// Renders a link collection as the value of `_links`.
    pub fn render_links(&self, links: &LinkCollection) -> Result<Map<String, Value>, HalError> {
        let mut rendered = Map::new();
        for (rel, relation) in links.iter() {
            let value = match relation {
                Relation::Single(link) => Value::Object(self.render_link(link)?),
                Relation::Many(links) => Value::Array(
                    links
                        .iter()
                        .map(|link| self.render_link(link).map(Value::Object))
                        .collect::<Result<_, _>>()?,
                ),
            };
            rendered.insert(rel.to_string(), value);
        }
        Ok(rendered)
    }

    fn render_link(&self, link: &Link) -> Result<Map<String, Value>, HalError> {
        let href = self.resolve_link(link)?;
        trace!(rel = link.rel(), %href, "Resolved link");
        let mut object = Map::new();
        object.insert("href".into(), Value::String(href));
        for (key, value) in link.props() {
            if key != "href" {
                object.insert(key.clone(), value.clone());
            }
        }
        Ok(object)
    }

    // --- Resources ---

    #[instrument(level = "debug", skip_all, fields(entity_type = resource.entity().entity_type()))]
    pub fn render_resource(&self, resource: &Resource) -> Result<Map<String, Value>, HalError> {
        self.render_resource_at(resource, 0)
    }

    fn render_resource_at(&self, resource: &Resource, depth: usize) -> Result<Map<String, Value>, HalError> {
        let entity = resource.entity().as_ref();
        let metadata = self.metadata.get(entity);

        let (mut fields, embedded) = if self.links_only(depth) {
            debug!(entity_type = entity.entity_type(), depth, "Depth limit reached, rendering links only");
            (Map::new(), Map::new())
        } else {
            let extracted = self.hydrators.extract(entity, metadata)?;
            self.split_fields(extracted, depth)?
        };

        let mut links = resource.links().clone();
        if !links.has("self") {
            if let Some(link) = self.synthesize_self_link(resource, metadata)? {
                links.add(link, false);
            }
        }
        if let Some(metadata) = metadata {
            merge_static_links(&mut links, metadata.links());
        }

        let mut event = ResourceEvent {
            resource,
            metadata,
            fields: &mut fields,
            links: &mut links,
        };
        for listener in &self.listeners {
            listener.on_resource(&mut event)?;
        }

        let mut payload = fields;
        payload.insert("_links".into(), Value::Object(self.render_links(&links)?));
        if !embedded.is_empty() {
            payload.insert("_embedded".into(), Value::Object(embedded));
        }
        Ok(payload)
    }

    fn synthesize_self_link(
        &self,
        resource: &Resource,
        metadata: Option<&Metadata>,
    ) -> Result<Option<Link>, HalError> {
        let id_param = metadata.map_or(DEFAULT_IDENTIFIER, Metadata::route_identifier_name);
        if let Some(route) = resource.route() {
            return Ok(Some(self_route_link(route, resource.id(), id_param)));
        }
        match metadata.and_then(Metadata::self_target) {
            Some(LinkTarget::Route(route)) => Ok(Some(self_route_link(&route, resource.id(), id_param))),
            Some(LinkTarget::Url(url)) => Link::url("self", &url).map(Some),
            None => Ok(None),
        }
    }

    /// Separates plain fields from values that belong under `_embedded`.
    fn split_fields(
        &self,
        fields: Fields,
        depth: usize,
    ) -> Result<(Map<String, Value>, Map<String, Value>), HalError> {
        let mut flat = Map::new();
        let mut embedded = Map::new();
        for (name, value) in fields {
            match value {
                FieldValue::Json(value) => {
                    flat.insert(name, value);
                }
                FieldValue::Resource(resource) => {
                    let rendered = self.render_resource_at(&resource, depth + 1)?;
                    embedded.insert(name, Value::Object(rendered));
                }
                FieldValue::Collection(collection) => {
                    let rendered = self.render_embedded_collection(&name, &collection, depth + 1)?;
                    embedded.insert(name, rendered);
                }
                FieldValue::Entity(entity) => match self.metadata.get(entity.as_ref()) {
                    Some(metadata) => {
                        let rendered = self.embed_entity(&name, entity.clone(), metadata, depth + 1)?;
                        embedded.insert(name, rendered);
                    }
                    None => {
                        flat.insert(name, self.inline_entity(entity.as_ref(), depth)?);
                    }
                },
            }
        }
        Ok((flat, embedded))
    }

    fn embed_entity(
        &self,
        field: &str,
        entity: Arc<dyn Entity>,
        metadata: &Metadata,
        depth: usize,
    ) -> Result<Value, HalError> {
        if metadata.is_collection() {
            let collection = self.collection_from_metadata(entity, metadata)?;
            return self.render_embedded_collection(field, &collection, depth);
        }
        let resource = self.resource_from_metadata(entity, metadata)?;
        Ok(Value::Object(self.render_resource_at(&resource, depth)?))
    }

    /// Renders an entity without metadata as a plain object.
    fn inline_entity(&self, entity: &dyn Entity, depth: usize) -> Result<Value, HalError> {
        let fields = self.hydrators.extract(entity, None)?;
        let (mut flat, embedded) = self.split_fields(fields, depth)?;
        if !embedded.is_empty() {
            flat.insert("_embedded".into(), Value::Object(embedded));
        }
        Ok(Value::Object(flat))
    }

    fn render_embedded_collection(
        &self,
        field: &str,
        collection: &Collection,
        depth: usize,
    ) -> Result<Value, HalError> {
        match self.render_collection_at(collection, depth)? {
            Rendered::Payload(payload) => Ok(Value::Object(payload)),
            Rendered::Problem(problem) => {
                warn!(field, status = problem.status(), "Embedded collection produced a problem");
                Err(HalError::EmbeddedProblem {
                    field: field.to_string(),
                    problem: Box::new(problem),
                })
            }
        }
    }

    // --- Collections ---

    #[instrument(level = "debug", skip_all, fields(collection = collection.name(), page = collection.page()))]
    pub fn render_collection(&self, collection: &Collection) -> Result<Rendered, HalError> {
        self.render_collection_at(collection, 0)
    }

    fn render_collection_at(&self, collection: &Collection, depth: usize) -> Result<Rendered, HalError> {
        let mut links = collection.links().clone();
        let mut attributes = collection.attributes().clone();

        let items = match collection.source() {
            CollectionSource::Items(items) => {
                if !links.has("self") {
                    if let Some(route) = collection.route() {
                        links.add(Link::route("self", route.clone()), false);
                    }
                }
                Some(items.clone())
            }
            CollectionSource::Paginated(paginator) => {
                let route = collection
                    .route()
                    .ok_or_else(|| HalError::MissingCollectionRoute(collection.name().to_string()))?;
                let mut paginator = paginator.clone_box();
                paginator.set_page_size(collection.page_size());
                let count = paginator.count();
                let page = collection.page();

                if count == 0 {
                    debug!(collection = collection.name(), "Empty paginated collection");
                    links.add(page_link("self", route, 1), true);
                    None
                } else if page < 1 || page as u64 > count as u64 {
                    debug!(collection = collection.name(), page, count, "Page out of range");
                    return Ok(Rendered::Problem(ApiProblem::new(409, INVALID_PAGE_DETAIL)));
                } else {
                    let page = page as usize;
                    paginator.set_current_page(page);
                    add_pagination_links(&mut links, route, page, count);
                    Some(paginator.current_items())
                }
            }
        };

        let embedded = match items {
            Some(items) => {
                let rendered = items
                    .iter()
                    .map(|item| self.render_item(item, collection, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                let mut embedded = Map::new();
                embedded.insert(collection.name().to_string(), Value::Array(rendered));
                Some(embedded)
            }
            None => None,
        };

        let mut event = CollectionEvent {
            collection,
            attributes: &mut attributes,
            links: &mut links,
        };
        for listener in &self.listeners {
            listener.on_collection(&mut event)?;
        }

        let mut payload = attributes;
        payload.insert("_links".into(), Value::Object(self.render_links(&links)?));
        if let Some(embedded) = embedded {
            payload.insert("_embedded".into(), Value::Object(embedded));
        }
        Ok(Rendered::Payload(payload))
    }

    fn render_item(&self, item: &Item, collection: &Collection, depth: usize) -> Result<Value, HalError> {
        match item {
            Item::Resource(resource) => {
                let has_own_link = resource.links().has("self") || resource.route().is_some();
                match collection.resource_route() {
                    Some(route) if !has_own_link => {
                        let mut resource = resource.clone();
                        let link = self_route_link(route, resource.id(), collection.route_identifier_name());
                        resource.links_mut().add(link, false);
                        Ok(Value::Object(self.render_resource_at(&resource, depth)?))
                    }
                    _ => Ok(Value::Object(self.render_resource_at(resource, depth)?)),
                }
            }
            Item::Entity(entity) => {
                let metadata = self.metadata.get(entity.as_ref());
                if let Some(route) = collection.resource_route() {
                    let id = self.identifier_of(entity.as_ref(), metadata, collection.identifier_name())?;
                    if let Some(id) = id {
                        let link = self_route_link(route, Some(&id), collection.route_identifier_name());
                        let resource = Resource::from_arc(entity.clone(), Some(id)).with_link(link);
                        return Ok(Value::Object(self.render_resource_at(&resource, depth)?));
                    }
                } else if let Some(metadata) = metadata {
                    if metadata.is_collection() {
                        return self.embed_entity(collection.name(), entity.clone(), metadata, depth);
                    }
                    let id = self.identifier_of(entity.as_ref(), Some(metadata), metadata.identifier_name())?;
                    if id.is_some() {
                        return self.embed_entity(collection.name(), entity.clone(), metadata, depth);
                    }
                }
                trace!(entity_type = entity.entity_type(), "Item has no identifier, rendering bare fields");
                self.inline_entity(entity.as_ref(), depth)
            }
        }
    }

    // --- Metadata-driven synthesis ---

    /// Wraps a raw entity in a resource described by its metadata.
    pub fn resource_from_metadata(
        &self,
        entity: Arc<dyn Entity>,
        metadata: &Metadata,
    ) -> Result<Resource, HalError> {
        let id = self.identifier_of(entity.as_ref(), Some(metadata), metadata.identifier_name())?;
        let self_link = match metadata.self_target() {
            Some(LinkTarget::Route(route)) => Some(self_route_link(&route, id.as_ref(), metadata.route_identifier_name())),
            Some(LinkTarget::Url(url)) => Some(Link::url("self", &url)?),
            None => None,
        };

        let mut resource = Resource::from_arc(entity, id);
        if let Some(link) = self_link {
            resource.links_mut().add(link, false);
        }
        merge_static_links(resource.links_mut(), metadata.links());
        Ok(resource)
    }

    /// Wraps a raw entity flagged `is_collection` in a collection described by its metadata.
    pub fn collection_from_metadata(
        &self,
        entity: Arc<dyn Entity>,
        metadata: &Metadata,
    ) -> Result<Collection, HalError> {
        let source = entity.as_collection().ok_or_else(|| HalError::Extraction {
            type_name: entity.entity_type().to_string(),
            reason: "metadata marks it as a collection but it has no items".into(),
        })?;

        let mut collection = Collection::from_source(source)
            .with_name(metadata.collection_name())
            .with_identifier_name(metadata.identifier_name())
            .with_route_identifier_name(metadata.route_identifier_name());
        match metadata.self_target() {
            Some(LinkTarget::Route(route)) => collection = collection.with_route(route),
            Some(LinkTarget::Url(url)) => collection = collection.with_link(Link::url("self", &url)?),
            None => {}
        }
        if let Some(route) = metadata.resource_route() {
            collection = collection.with_resource_route(route.clone());
        }
        merge_static_links(collection.links_mut(), metadata.links());
        Ok(collection)
    }

    /// Wraps an entity in a resource whose `self` link uses `route`, with the
    /// identifier read from the `identifier_name` field.
    pub fn create_resource(
        &self,
        entity: Arc<dyn Entity>,
        route: Route,
        identifier_name: &str,
    ) -> Result<Resource, HalError> {
        let metadata = self.metadata.get(entity.as_ref());
        let id = self.identifier_of(entity.as_ref(), metadata, identifier_name)?;
        let link = self_route_link(&route, id.as_ref(), identifier_name);
        Ok(Resource::from_arc(entity, id).with_route(route).with_link(link))
    }

    /// Wraps a collection-like entity. Metadata flagged `is_collection` is honored;
    /// otherwise the entity's own items are used with `route` as the collection route.
    pub fn create_collection(
        &self,
        entity: Arc<dyn Entity>,
        route: Option<Route>,
    ) -> Result<Collection, HalError> {
        let mut collection = match self.metadata.get(entity.as_ref()) {
            Some(metadata) if metadata.is_collection() => self.collection_from_metadata(entity, metadata)?,
            _ => {
                let source = entity.as_collection().ok_or_else(|| HalError::Extraction {
                    type_name: entity.entity_type().to_string(),
                    reason: "not a collection".into(),
                })?;
                Collection::from_source(source)
            }
        };
        if let Some(route) = route {
            collection = collection.with_route(route);
        }
        Ok(collection)
    }

    fn identifier_of(
        &self,
        entity: &dyn Entity,
        metadata: Option<&Metadata>,
        identifier_name: &str,
    ) -> Result<Option<Value>, HalError> {
        let fields = self.hydrators.extract(entity, metadata)?;
        Ok(fields
            .get(identifier_name)
            .and_then(FieldValue::as_json)
            .filter(|id| !id.is_null())
            .cloned())
    }

    fn links_only(&self, depth: usize) -> bool {
        self.max_depth.is_some_and(|max| depth > max)
    }
}

fn self_route_link(route: &Route, id: Option<&Value>, id_param: &str) -> Link {
    let mut route = route.clone();
    if let Some(id) = id {
        route.params.insert(id_param.to_string(), param_value(id));
    }
    Link::route("self", route)
}

fn page_link(rel: &str, route: &Route, page: usize) -> Link {
    let mut route = route.clone();
    if page == 1 {
        route.options.query.remove("page");
    } else {
        route.options.query.insert("page".into(), page.to_string());
    }
    Link::route(rel, route)
}

fn add_pagination_links(links: &mut LinkCollection, route: &Route, page: usize, count: usize) {
    links.add(page_link("self", route, page), true);
    if page != 1 {
        links.add(page_link("first", route, 1), true);
    }
    if count != 1 {
        links.add(page_link("last", route, count), true);
    }
    if page > 1 {
        links.add(page_link("prev", route, page - 1), true);
    }
    if page < count {
        links.add(page_link("next", route, page + 1), true);
    }
}

fn merge_static_links(links: &mut LinkCollection, statics: &[Link]) {
    for link in statics {
        if links.contains(link) || (link.rel() == "self" && links.has("self")) {
            continue;
        }
        links.add(link.clone(), false);
    }
}

fn param_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
