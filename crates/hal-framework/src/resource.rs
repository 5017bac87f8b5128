//! Single-entity HAL resources.

use crate::entity::Entity;
use crate::link::{Link, LinkCollection, Route};
use serde_json::Value;
use std::sync::Arc;

/// Wraps one entity together with its identifier and links.
///
/// A resource lives for one request: it is built by whatever fetched or changed the
/// entity, rendered once, and dropped.
#[derive(Debug, Clone)]
pub struct Resource {
    entity: Arc<dyn Entity>,
    id: Option<Value>,
    route: Option<Route>,
    links: LinkCollection,
}

impl Resource {
    pub fn new(entity: impl Entity + 'static, id: impl Into<Value>) -> Self {
        Self::from_arc(Arc::new(entity), Some(id.into()))
    }

    /// A resource whose entity has no identifier (e.g. a singleton).
    pub fn without_id(entity: impl Entity + 'static) -> Self {
        Self::from_arc(Arc::new(entity), None)
    }

    pub fn from_arc(entity: Arc<dyn Entity>, id: Option<Value>) -> Self {
        Self {
            entity,
            id: id.filter(|id| !id.is_null()),
            route: None,
            links: LinkCollection::new(),
        }
    }

    /// Route used to synthesize the `self` link when none is attached.
    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.links.add(link, false);
        self
    }

    pub fn entity(&self) -> &Arc<dyn Entity> {
        &self.entity
    }

    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn links(&self) -> &LinkCollection {
        &self.links
    }

    pub fn links_mut(&mut self) -> &mut LinkCollection {
        &mut self.links
    }
}
