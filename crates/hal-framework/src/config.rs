//! Configuration for the HAL assembler.
//!
//! Everything here is plain data deserialized with `serde`. Nothing is read from
//! the environment; the caller loads a document (usually JSON) and hands it to
//! [`HalAssembler::from_config`](crate::assembler::HalAssembler::from_config).
//!
//! ```json
//! {
//!   "renderer": { "default_hydrator": "public_fields", "max_depth": 4 },
//!   "match_ancestors": true,
//!   "router": {
//!     "base_url": "http://localhost",
//!     "routes": { "users": "/users[/:id]" }
//!   },
//!   "metadata_map": {
//!     "User": { "route_name": "users" }
//!   }
//! }
//! ```

use crate::error::HalError;
use crate::link::{LinkSpec, RouteOptions, RouteParams};
use crate::route::RouteTable;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;

/// Root configuration document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HalConfig {
    pub renderer: RendererConfig,
    /// Let metadata declared for an ancestor type apply to its descendants.
    pub match_ancestors: bool,
    pub metadata_map: BTreeMap<String, MetadataConfig>,
    pub router: Option<RouterConfig>,
}

impl HalConfig {
    pub fn from_json_str(json: &str) -> Result<Self, HalError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, HalError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Hydrator selection and rendering limits.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Name of the hydrator used when neither metadata nor a type mapping applies.
    pub default_hydrator: Option<String>,
    /// Entity type to hydrator name.
    pub hydrators: BTreeMap<String, String>,
    /// Embedding depth beyond which resources are rendered with links only.
    pub max_depth: Option<usize>,
}

/// Settings for the built-in [`RouteTable`].
#[derive(Debug, Clone, Deserialize)]
pub struct RouterConfig {
    pub base_url: String,
    #[serde(default)]
    pub routes: BTreeMap<String, String>,
}

impl RouterConfig {
    pub fn build(&self) -> Result<RouteTable, HalError> {
        let mut table = RouteTable::new(&self.base_url)?;
        for (name, template) in &self.routes {
            table.add_route(name.as_str(), template)?;
        }
        Ok(table)
    }
}

/// One `metadata_map` entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    pub hydrator: Option<String>,
    pub identifier_name: Option<String>,
    pub route_identifier_name: Option<String>,
    pub is_collection: bool,
    pub collection_name: Option<String>,
    pub route_name: Option<String>,
    pub route_params: RouteParams,
    pub route_options: Option<RouteOptions>,
    pub url: Option<String>,
    pub resource_route_name: Option<String>,
    pub links: Vec<LinkSpec>,
}
