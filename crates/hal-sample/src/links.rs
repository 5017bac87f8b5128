//! Links that depend on the rendered record rather than on its type.

use crate::model::Order;
use hal_framework::{CollectionEvent, HalError, Link, RenderListener, ResourceEvent, Route};
use tracing::trace;

/// Adds navigation the static metadata cannot express:
/// - orders link to their customer and product
/// - every collection links to its documentation page
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreLinks;

impl RenderListener for StoreLinks {
    fn on_resource(&self, event: &mut ResourceEvent<'_>) -> Result<(), HalError> {
        let Some(order) = event.resource.entity().as_ref().as_any().downcast_ref::<Order>() else {
            return Ok(());
        };
        trace!(order = %order.id, "Adding order relations");
        event
            .links
            .add(Link::route("customer", Route::new("users").with_param("id", order.customer.id.0)), false);
        event
            .links
            .add(Link::route("product", Route::new("products").with_param("id", order.product.id.0)), false);
        Ok(())
    }

    fn on_collection(&self, event: &mut CollectionEvent<'_>) -> Result<(), HalError> {
        let topic = event.collection.name().to_string();
        event
            .links
            .add(Link::route("help", Route::new("docs").with_param("topic", topic)), false);
        Ok(())
    }
}
