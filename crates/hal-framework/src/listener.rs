//! # Render Listeners
//!
//! The one extension point of the assembler. A [`RenderListener`] is called right
//! before a resource or collection payload is finalized, with mutable access to
//! the fields and links collected so far. Links added here are resolved like any
//! other link.
//!
//! # Provided Methods (Hooks)
//! Both hooks default to doing nothing (`Ok(())`), so a listener only implements
//! the ones it cares about. Listeners run in registration order; the first error
//! aborts the render.
//!
//! ```rust
//! use hal_framework::{HalError, Link, ResourceEvent, RenderListener};
//!
//! struct Docs;
//!
//! impl RenderListener for Docs {
//!     fn on_resource(&self, event: &mut ResourceEvent<'_>) -> Result<(), HalError> {
//!         event.links.add(Link::url("help", "http://example.com/help")?, false);
//!         Ok(())
//!     }
//! }
//! ```

use crate::collection::Collection;
use crate::error::HalError;
use crate::link::LinkCollection;
use crate::metadata::Metadata;
use crate::resource::Resource;
use serde_json::{Map, Value};

/// In-progress rendering of a resource.
pub struct ResourceEvent<'a> {
    pub resource: &'a Resource,
    pub metadata: Option<&'a Metadata>,
    /// Flat fields, nested resources already moved out.
    pub fields: &'a mut Map<String, Value>,
    pub links: &'a mut LinkCollection,
}

/// In-progress rendering of a collection.
pub struct CollectionEvent<'a> {
    pub collection: &'a Collection,
    /// Top-level attributes merged beside `_links` and `_embedded`.
    pub attributes: &'a mut Map<String, Value>,
    pub links: &'a mut LinkCollection,
}

pub trait RenderListener: Send + Sync {
    fn on_resource(&self, _event: &mut ResourceEvent<'_>) -> Result<(), HalError> {
        Ok(())
    }

    fn on_collection(&self, _event: &mut CollectionEvent<'_>) -> Result<(), HalError> {
        Ok(())
    }
}

/// Adapts a closure into a resource-only listener.
pub struct OnResource<F>(F);

pub fn on_resource<F>(hook: F) -> OnResource<F>
where
    F: Fn(&mut ResourceEvent<'_>) -> Result<(), HalError> + Send + Sync,
{
    OnResource(hook)
}

impl<F> RenderListener for OnResource<F>
where
    F: Fn(&mut ResourceEvent<'_>) -> Result<(), HalError> + Send + Sync,
{
    fn on_resource(&self, event: &mut ResourceEvent<'_>) -> Result<(), HalError> {
        (self.0)(event)
    }
}

/// Adapts a closure into a collection-only listener.
pub struct OnCollection<F>(F);

pub fn on_collection<F>(hook: F) -> OnCollection<F>
where
    F: Fn(&mut CollectionEvent<'_>) -> Result<(), HalError> + Send + Sync,
{
    OnCollection(hook)
}

impl<F> RenderListener for OnCollection<F>
where
    F: Fn(&mut CollectionEvent<'_>) -> Result<(), HalError> + Send + Sync,
{
    fn on_collection(&self, event: &mut CollectionEvent<'_>) -> Result<(), HalError> {
        (self.0)(event)
    }
}
