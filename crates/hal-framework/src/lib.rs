//! # HAL Framework
//!
//! This crate renders domain records as **HAL** (Hypertext Application Language)
//! payloads and reports failures as **Problem API** payloads. It sits behind any
//! HTTP layer: it never touches requests or responses, it only shapes JSON.
//!
//! ## Why HAL?
//!
//! A HAL payload carries its own navigation. Clients follow `_links` instead of
//! building URLs, and related resources travel inline under `_embedded`:
//!
//! ```json
//! {
//!   "id": 1,
//!   "total": 42,
//!   "_links": { "self": { "href": "http://localhost/orders/1" } },
//!   "_embedded": {
//!     "customer": { "id": 7, "_links": { "self": { "href": "http://localhost/users/7" } } }
//!   }
//! }
//! ```
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Model Layer** ([`Entity`], [`Resource`], [`Collection`], [`Link`]) - What gets rendered
//! 2. **Description Layer** ([`Metadata`], [`HydratorManager`], [`RouteResolver`]) - How types map to fields and URLs
//! 3. **Rendering Layer** ([`HalAssembler`], [`ApiProblem`], [`HalResponse`]) - Payloads and their transport contract
//!
//! Collaborators are injected once at construction. The assembler is then
//! immutable: every render is a pure function of its input.
//!
//! ## Core Abstractions
//!
//! ### [`Entity`] - The Domain Record
//!
//! ```rust
//! use hal_framework::{Entity, Fields, HalAssembler, HalError, Resource, Route, RouteTable};
//! use serde::Serialize;
//!
//! #[derive(Debug, Serialize)]
//! struct User {
//!     id: u32,
//!     name: String,
//! }
//!
//! impl Entity for User {
//!     fn entity_type(&self) -> &str {
//!         "User"
//!     }
//!
//!     fn public_fields(&self) -> Result<Fields, HalError> {
//!         Fields::from_serialize(self)
//!     }
//! }
//!
//! let router = RouteTable::new("http://localhost")?.with_route("users", "/users[/:id]")?;
//! let assembler = HalAssembler::builder(router).build();
//!
//! let resource = Resource::new(User { id: 1, name: "Alice".into() }, 1).with_route(Route::new("users"));
//! let payload = assembler.render_resource(&resource)?;
//!
//! assert_eq!(payload["name"], "Alice");
//! assert_eq!(payload["_links"]["self"]["href"], "http://localhost/users/1");
//! # Ok::<(), HalError>(())
//! ```
//!
//! ### [`Metadata`] - Wrapping Without Wrappers
//!
//! Entities nested in other entities are promoted to embedded resources when their
//! type has metadata, so callers rarely build [`Resource`]s by hand. See
//! [`metadata`] for ancestor matching and [`config`] for the JSON form.
//!
//! ### [`Collection`] - Lists and Pages
//!
//! A collection over a [`Paginator`] renders one page plus `first`/`last`/`prev`/`next`
//! links. A page outside the available range is not an error: the render returns
//! [`Rendered::Problem`] (409, `"Invalid page provided"`).
//!
//! ## Errors
//!
//! Configuration mistakes (unknown routes or hydrators, links with both a url and a
//! route, incomplete links) are [`HalError`]s and are never silently degraded.
//! Any [`ProblemError`] converts into an [`ApiProblem`] with
//! [`ApiProblem::from_error`].
//!
//! ## Testing
//!
//! The [`mock`] module provides [`MockRouteResolver`](mock::MockRouteResolver), a
//! [`RouteResolver`] driven by queued expectations, for testing what the assembler
//! asks the router for without declaring route templates.

pub mod assembler;
pub mod collection;
pub mod config;
pub mod entity;
pub mod error;
pub mod hydrator;
pub mod link;
pub mod listener;
pub mod metadata;
pub mod mock;
pub mod problem;
pub mod resource;
pub mod response;
pub mod route;
pub mod tracing;

// Re-export core types for convenience
pub use assembler::{HalAssembler, HalAssemblerBuilder, Rendered};
pub use collection::{Collection, CollectionSource, Item, Paginator, VecPaginator};
pub use config::{HalConfig, MetadataConfig, RendererConfig, RouterConfig};
pub use entity::{Entity, FieldValue, Fields};
pub use error::HalError;
pub use hydrator::{Hydrator, HydratorManager, PublicFieldsHydrator};
pub use link::{Link, LinkCollection, LinkSpec, LinkTarget, Relation, Route, RouteOptions, RouteParams};
pub use listener::{on_collection, on_resource, CollectionEvent, RenderListener, ResourceEvent};
pub use metadata::{Metadata, MetadataMap};
pub use problem::{ApiProblem, ProblemError};
pub use resource::Resource;
pub use response::{content_type_for, normalize_status, ContentType, HalResponse};
pub use route::{RouteResolver, RouteTable};
