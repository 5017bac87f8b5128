//! # HAL Store Sample Library
//!
//! A small store (users, products, orders) served as HAL through `hal_framework`.
//! The modules are public for integration testing.

pub mod error;
pub mod hydrators;
pub mod lifecycle;
pub mod links;
pub mod model;
pub mod store;
