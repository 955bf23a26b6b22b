use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::catalog::Product;
use super::errors::DomainError;
use super::ports::StoreTransaction;

/// Number of find-then-insert rounds before giving up on resolving a cart.
const CART_RESOLVE_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: Uuid,
    /// `None` for guest orders.
    pub user_id: Option<Uuid>,
    pub purchase_date: Option<DateTime<Utc>>,
    pub is_bought: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Unset until checkout.
    pub historical_price: Option<BigDecimal>,
}

/// A cart line with its product attached, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub item: LineItem,
    pub product: Product,
}

pub fn validate_quantity(quantity: i32) -> Result<i32, DomainError> {
    if quantity < 1 {
        return Err(DomainError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

/// Return the user's open order, creating it if there is none.
///
/// A concurrent request may create the cart between our read and our insert;
/// the insert then reports a conflict and the next read picks up the winner.
pub fn find_or_create_cart(
    tx: &mut dyn StoreTransaction,
    user_id: Uuid,
) -> Result<Order, DomainError> {
    for _ in 0..CART_RESOLVE_ATTEMPTS {
        if let Some(order) = tx.find_open_order(user_id)? {
            return Ok(order);
        }
        if !tx.insert_open_order(user_id)? {
            log::debug!("open cart for user {} created concurrently", user_id);
        }
    }
    tx.find_open_order(user_id)?.ok_or_else(|| {
        DomainError::Internal(format!("could not resolve an open cart for user {}", user_id))
    })
}

pub fn find_and_format_cart_products(
    tx: &mut dyn StoreTransaction,
    order: &Order,
) -> Result<Vec<CartLine>, DomainError> {
    tx.cart_lines(order.id)
}
