use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cart::{CartLine, LineItem, Order};
use super::catalog::Product;
use super::checkout::StockAttempt;
use super::errors::DomainError;

/// Conditional stock decrements, applied inside the caller's unit of work.
pub trait StockLedger {
    /// Take `quantity` units of `product_id` if at least that many are in stock.
    ///
    /// An insufficient or unknown product is reported as
    /// [`StockAttempt::Rejected`], never as an error; errors are reserved for
    /// the store itself failing.
    fn decrement_stock(&mut self, product_id: Uuid, quantity: i32)
        -> Result<StockAttempt, DomainError>;
}

/// Store operations available inside one transaction.
///
/// Everything done through a `StoreTransaction` is committed together when
/// the closure passed to [`StoreRepository::transaction`] returns `Ok`, and
/// discarded when it returns `Err`.
pub trait StoreTransaction: StockLedger {
    fn find_product(&mut self, product_id: Uuid) -> Result<Option<Product>, DomainError>;

    fn find_open_order(&mut self, user_id: Uuid) -> Result<Option<Order>, DomainError>;

    /// Insert a new open order for `user_id`. Returns `false` when another
    /// open order for the user already exists.
    fn insert_open_order(&mut self, user_id: Uuid) -> Result<bool, DomainError>;

    fn create_bought_order(
        &mut self,
        user_id: Option<Uuid>,
        purchased_at: DateTime<Utc>,
    ) -> Result<Order, DomainError>;

    fn cart_lines(&mut self, order_id: Uuid) -> Result<Vec<CartLine>, DomainError>;

    fn find_line(&mut self, order_id: Uuid, product_id: Uuid)
        -> Result<Option<LineItem>, DomainError>;

    /// Insert the line or overwrite its quantity.
    fn save_line(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItem, DomainError>;

    fn delete_line(&mut self, order_id: Uuid, product_id: Uuid) -> Result<bool, DomainError>;

    fn insert_lines(&mut self, lines: &[LineItem]) -> Result<(), DomainError>;

    /// Set the line's historical price if it is still unset.
    fn freeze_price(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        price: &BigDecimal,
    ) -> Result<(), DomainError>;

    /// Flip an open order to bought. Returns `false` if it was not open.
    fn mark_bought(&mut self, order_id: Uuid, purchased_at: DateTime<Utc>)
        -> Result<bool, DomainError>;
}

pub trait StoreRepository: Send + Sync + 'static {
    fn list_products(&self) -> Result<Vec<Product>, DomainError>;

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;

    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, DomainError>;
}
