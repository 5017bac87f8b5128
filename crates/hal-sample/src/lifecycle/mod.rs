//! # System Lifecycle & Orchestration
//!
//! [`StoreSystem`] wires the store to the HAL layer and exposes request-shaped
//! operations that answer with a [`HalResponse`]. It is the piece a web server
//! would call from its handlers.
//!
//! ## Startup
//!
//! 1. **Configuration** - `config/hal.json` is embedded at compile time and parsed into a [`HalConfig`]
//! 2. **Hydrators** - the named hydrators of [`crate::hydrators`] are registered before the configuration refers to them
//! 3. **Assembler** - built from the configuration, with [`StoreLinks`] as render listener
//!
//! ## Responses
//!
//! | Outcome | Status | Content type |
//! |---------|--------|--------------|
//! | Record or page rendered | 200 (201 on create) | `application/hal+json` |
//! | Missing record | 404 | `application/api-problem+json` |
//! | Rejected order | 422 | `application/api-problem+json` |
//! | Page out of range | 409 | `application/api-problem+json` |
//!
//! Errors never escape the request-shaped operations: they are turned into
//! Problem payloads through [`ApiProblem::from_error`].

use crate::error::StoreError;
use crate::hydrators;
use crate::links::StoreLinks;
use crate::model::{OrderCreate, OrderId, ProductCreate, ProductId, UserCreate, UserId};
use crate::store::Store;
use hal_framework::{ApiProblem, Entity, HalAssembler, HalConfig, HalError, HalResponse, Rendered};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// The store's HAL configuration.
pub const CONFIG: &str = include_str!("../../config/hal.json");

/// Store plus the assembler that renders it.
#[derive(Debug)]
pub struct StoreSystem {
    pub store: Store,
    assembler: HalAssembler,
}

impl StoreSystem {
    /// Builds the system from the embedded configuration.
    pub fn new() -> Result<Self, StoreError> {
        Self::from_config_str(CONFIG)
    }

    pub fn from_config_str(config: &str) -> Result<Self, StoreError> {
        let config = HalConfig::from_json_str(config)?;
        let router = config
            .router
            .as_ref()
            .ok_or_else(|| HalError::Config("missing `router` section".into()))?
            .build()?;
        let assembler = HalAssembler::builder(router)
            .with_hydrators(hydrators::registry())
            .with_listener(StoreLinks)
            .configure(&config)?
            .build();
        info!(types = assembler.metadata().len(), "Store system ready");
        Ok(Self {
            store: Store::new(),
            assembler,
        })
    }

    pub fn assembler(&self) -> &HalAssembler {
        &self.assembler
    }

    #[instrument(skip(self))]
    pub fn get_user(&self, id: UserId) -> HalResponse {
        respond(self.store.user(id).and_then(|user| self.render(user)))
    }

    #[instrument(skip(self))]
    pub fn get_product(&self, id: ProductId) -> HalResponse {
        respond(self.store.product(id).and_then(|product| self.render(Arc::new(product))))
    }

    #[instrument(skip(self))]
    pub fn get_order(&self, id: OrderId) -> HalResponse {
        respond(self.store.order(id).and_then(|order| self.render(order)))
    }

    /// One page of the catalog. Pages start at 1.
    #[instrument(skip(self))]
    pub fn list_products(&self, page: i64, page_size: usize) -> HalResponse {
        match self.catalog_page(page, page_size) {
            Ok(rendered) => {
                if let Some(problem) = rendered.problem() {
                    warn!(status = problem.status(), "Catalog page rejected");
                }
                HalResponse::from_rendered(rendered)
            }
            Err(err) => problem_response(&err),
        }
    }

    #[instrument(skip(self, params), fields(name = %params.name))]
    pub fn create_user(&mut self, params: UserCreate) -> HalResponse {
        let created = self.store.create_user(params);
        created_response(created.and_then(|id| self.store.user(id)).and_then(|user| self.render(user)))
    }

    #[instrument(skip(self, params), fields(name = %params.name))]
    pub fn create_product(&mut self, params: ProductCreate) -> HalResponse {
        let created = self.store.create_product(params);
        created_response(
            created
                .and_then(|id| self.store.product(id))
                .and_then(|product| self.render(Arc::new(product))),
        )
    }

    #[instrument(skip(self))]
    pub fn create_order(&mut self, params: OrderCreate) -> HalResponse {
        let placed = self.store.place_order(params);
        created_response(placed.and_then(|id| self.store.order(id)).and_then(|order| self.render(order)))
    }

    fn catalog_page(&self, page: i64, page_size: usize) -> Result<Rendered, StoreError> {
        let catalog: Arc<dyn Entity> = Arc::new(self.store.catalog());
        let collection = self
            .assembler
            .create_collection(catalog, None)?
            .with_page(page)
            .with_page_size(page_size)
            .map_err(|_| StoreError::Validation(format!("invalid page size: {page_size}")))?;
        Ok(self.assembler.render_collection(&collection)?)
    }

    /// Renders a record through the metadata registered for its type.
    fn render<E: Entity + 'static>(&self, entity: Arc<E>) -> Result<Map<String, Value>, StoreError> {
        let entity: Arc<dyn Entity> = entity;
        let metadata = self.assembler.metadata().require(entity.entity_type())?;
        let resource = self.assembler.resource_from_metadata(entity, metadata)?;
        Ok(self.assembler.render_resource(&resource)?)
    }
}

fn respond(result: Result<Map<String, Value>, StoreError>) -> HalResponse {
    match result {
        Ok(payload) => HalResponse::from_payload(payload),
        Err(err) => problem_response(&err),
    }
}

fn created_response(result: Result<Map<String, Value>, StoreError>) -> HalResponse {
    let mut response = respond(result);
    if response.status == 200 {
        response.status = 201;
    }
    response
}

fn problem_response(err: &StoreError) -> HalResponse {
    warn!(error = %err, "Request failed");
    HalResponse::from_problem(&ApiProblem::from_error(err))
}
