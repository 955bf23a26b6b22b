//! Checkout: reconciling requested quantities against live stock.
//!
//! Every decrement is attempted before any failure is acted upon, so the
//! caller learns about all unavailable items at once. Undoing the decrements
//! that did apply is left to the enclosing store transaction: a checkout that
//! returns `Err` is rolled back as a whole.
//!
//! Decrements lock product rows until commit, so both checkout paths issue
//! them in ascending product id order.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::cart::{find_and_format_cart_products, find_or_create_cart, LineItem};
use super::errors::DomainError;
use super::ports::{StockLedger, StoreTransaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockRequest {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// A decrement that went through, with the product state it observed.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedDecrement {
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub previous_stock: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StockFailureKind {
    InsufficientStock,
    UnknownProduct,
    InvalidQuantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockFailure {
    pub error_name: StockFailureKind,
    pub stock_product_id: Uuid,
    pub requested_quantity: i32,
    /// Stock at the time of the attempt; `None` for unknown products.
    pub stock_quantity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StockAttempt {
    Applied(AppliedDecrement),
    Rejected(StockFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    pub order_id: Uuid,
    pub purchase_date: DateTime<Utc>,
    pub lines: Vec<LineItem>,
}

/// Attempt every request against `ledger`.
///
/// Returns the applied decrements in request order, or
/// [`DomainError::StockUnavailable`] listing each request that could not be
/// satisfied. On error, some decrements may already have been applied to the
/// ledger; the caller must discard them.
pub fn reconcile_stock<L>(
    ledger: &mut L,
    requests: &[StockRequest],
) -> Result<Vec<AppliedDecrement>, DomainError>
where
    L: StockLedger + ?Sized,
{
    let mut applied = Vec::with_capacity(requests.len());
    let mut failures = Vec::new();

    for request in requests {
        if request.quantity < 1 {
            failures.push(invalid_quantity(request));
            continue;
        }
        match ledger.decrement_stock(request.product_id, request.quantity)? {
            StockAttempt::Applied(decrement) => {
                log::debug!(
                    "product {} stock {} -> {}",
                    decrement.product_id,
                    decrement.previous_stock,
                    decrement.previous_stock - decrement.quantity
                );
                applied.push(decrement);
            }
            StockAttempt::Rejected(failure) => {
                log::warn!(
                    "stock check failed for product {}: {:?}, requested {}, in stock {:?}",
                    failure.stock_product_id,
                    failure.error_name,
                    failure.requested_quantity,
                    failure.stock_quantity
                );
                failures.push(failure);
            }
        }
    }

    if failures.is_empty() {
        Ok(applied)
    } else {
        Err(DomainError::StockUnavailable(failures))
    }
}

/// Check out the user's open cart.
pub fn checkout_cart(
    tx: &mut dyn StoreTransaction,
    user_id: Uuid,
    purchased_at: DateTime<Utc>,
) -> Result<CheckoutReceipt, DomainError> {
    let order = find_or_create_cart(tx, user_id)?;
    let lines = find_and_format_cart_products(tx, &order)?;
    if lines.is_empty() {
        return Err(DomainError::EmptyCart);
    }

    let requests = in_lock_order(
        lines
            .iter()
            .map(|line| StockRequest {
                product_id: line.item.product_id,
                quantity: line.item.quantity,
            })
            .collect(),
    );
    let applied = reconcile_stock(tx, &requests)?;

    for decrement in &applied {
        tx.freeze_price(order.id, decrement.product_id, &decrement.unit_price)?;
    }
    if !tx.mark_bought(order.id, purchased_at)? {
        return Err(DomainError::AlreadyCheckedOut);
    }

    Ok(CheckoutReceipt {
        order_id: order.id,
        purchase_date: purchased_at,
        lines: priced_lines(order.id, &applied),
    })
}

/// Check out a cart submitted by a caller without an account.
///
/// The order is created already bought. If any item cannot be supplied, or
/// any submitted line has a quantity below one, the whole cart is rejected.
pub fn checkout_guest(
    tx: &mut dyn StoreTransaction,
    items: &[StockRequest],
    purchased_at: DateTime<Utc>,
) -> Result<CheckoutReceipt, DomainError> {
    if items.is_empty() {
        return Err(DomainError::EmptyCart);
    }

    let invalid: Vec<StockFailure> = items
        .iter()
        .filter(|item| item.quantity < 1)
        .map(invalid_quantity)
        .collect();
    if !invalid.is_empty() {
        return Err(DomainError::StockUnavailable(invalid));
    }

    let requests = in_lock_order(merge_duplicates(items));
    let applied = reconcile_stock(tx, &requests)?;

    let order = tx.create_bought_order(None, purchased_at)?;
    let lines = priced_lines(order.id, &applied);
    tx.insert_lines(&lines)?;

    Ok(CheckoutReceipt {
        order_id: order.id,
        purchase_date: purchased_at,
        lines,
    })
}

fn priced_lines(order_id: Uuid, applied: &[AppliedDecrement]) -> Vec<LineItem> {
    applied
        .iter()
        .map(|decrement| LineItem {
            order_id,
            product_id: decrement.product_id,
            quantity: decrement.quantity,
            historical_price: Some(decrement.unit_price.clone()),
        })
        .collect()
}

fn invalid_quantity(request: &StockRequest) -> StockFailure {
    StockFailure {
        error_name: StockFailureKind::InvalidQuantity,
        stock_product_id: request.product_id,
        requested_quantity: request.quantity,
        stock_quantity: None,
    }
}

fn in_lock_order(mut requests: Vec<StockRequest>) -> Vec<StockRequest> {
    requests.sort_by_key(|request| request.product_id);
    requests
}

/// Sum quantities of repeated products, keeping first-seen order.
fn merge_duplicates(items: &[StockRequest]) -> Vec<StockRequest> {
    let mut merged: Vec<StockRequest> = Vec::with_capacity(items.len());
    for item in items {
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity)
            }
            None => merged.push(*item),
        }
    }
    merged
}
