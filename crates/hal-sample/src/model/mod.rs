//! Pure data structures implementing the [`Entity`](hal_framework::Entity) trait.

pub mod catalog;
pub mod order;
pub mod product;
pub mod user;

pub use catalog::*;
pub use order::*;
pub use product::*;
pub use user::*;
