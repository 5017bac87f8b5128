use crate::model::Product;
use hal_framework::{CollectionSource, Entity, Fields, HalError, Item, VecPaginator};
use std::sync::Arc;

/// A snapshot of the product listing.
///
/// Its metadata marks it as a collection, so the assembler renders it as a
/// paginated list of products rather than as a record.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub products: Vec<Arc<Product>>,
}

impl Catalog {
    pub fn new(products: Vec<Arc<Product>>) -> Self {
        Self { products }
    }
}

impl Entity for Catalog {
    fn entity_type(&self) -> &str {
        "Catalog"
    }

    fn public_fields(&self) -> Result<Fields, HalError> {
        Ok(Fields::new())
    }

    fn as_collection(&self) -> Option<CollectionSource> {
        let items = self
            .products
            .iter()
            .map(|product| {
                let product: Arc<dyn Entity> = product.clone();
                Item::from(product)
            })
            .collect();
        Some(CollectionSource::Paginated(Box::new(VecPaginator::new(items))))
    }
}
