use thiserror::Error;
use uuid::Uuid;

use super::checkout::StockFailure;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Product {0} not found")]
    ProductNotFound(Uuid),
    #[error("Invalid quantity {0}: quantity must be at least 1")]
    InvalidQuantity(i32),
    #[error("Only {available} of product {product_id} in stock, {requested} requested")]
    InsufficientStock {
        product_id: Uuid,
        requested: i32,
        available: i32,
    },
    #[error("Product {0} is not in the cart")]
    LineItemNotFound(Uuid),
    #[error("Validation Error: Cart is empty. Add some products and try again.")]
    EmptyCart,
    #[error(
        "Validation Error: Product(s) unavailable in requested quantities. \
         Please review your cart and try to checkout again."
    )]
    StockUnavailable(Vec<StockFailure>),
    #[error("Cart has already been checked out")]
    AlreadyCheckedOut,
    #[error("Internal error: {0}")]
    Internal(String),
}
