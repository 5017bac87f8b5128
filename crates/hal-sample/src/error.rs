//! Error types for the store.

use crate::model::{OrderId, ProductId, UserId};
use hal_framework::{HalError, ProblemError};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested user was not found.
    #[error("User not found: {0}")]
    UserNotFound(UserId),

    /// The requested product was not found.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// The requested order was not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// There is insufficient stock to fulfill the order.
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    InsufficientStock {
        product: ProductId,
        requested: u32,
        available: u32,
    },

    /// The data provided is invalid.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Rendering or configuring the HAL layer failed.
    #[error(transparent)]
    Hal(#[from] HalError),
}

impl ProblemError for StoreError {
    fn status_code(&self) -> Option<u16> {
        match self {
            StoreError::UserNotFound(_) | StoreError::ProductNotFound(_) | StoreError::OrderNotFound(_) => {
                Some(404)
            }
            StoreError::InsufficientStock { .. } | StoreError::Validation(_) => Some(422),
            StoreError::Hal(err) => err.status_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal_framework::ApiProblem;

    #[test]
    fn missing_records_are_404() {
        let problem = ApiProblem::from_error(&StoreError::UserNotFound(UserId(9)));
        assert_eq!(problem.status(), 404);
        assert_eq!(problem.title(), "Not Found");
        assert_eq!(problem.detail(), "User not found: user_9");
    }

    #[test]
    fn rejected_orders_are_422() {
        let err = StoreError::InsufficientStock {
            product: ProductId(1),
            requested: 5,
            available: 2,
        };
        assert_eq!(err.status_code(), Some(422));
        assert_eq!(ApiProblem::from_error(&err).title(), "Unprocessable Entity");
    }

    #[test]
    fn framework_errors_default_to_500() {
        let err = StoreError::from(HalError::UnknownRoute("users".into()));
        assert_eq!(err.status_code(), None);
        assert_eq!(ApiProblem::from_error(&err).status(), 500);
    }
}
