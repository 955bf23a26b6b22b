use chrono::Utc;
use uuid::Uuid;

use crate::domain::cart::{
    find_and_format_cart_products, find_or_create_cart, validate_quantity, CartLine, LineItem,
};
use crate::domain::catalog::Product;
use crate::domain::checkout::{self, CheckoutReceipt, StockRequest};
use crate::domain::errors::DomainError;
use crate::domain::ports::StoreRepository;

pub struct CartService<R> {
    repo: R,
}

impl<R: StoreRepository> CartService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list_products()
    }

    pub fn get_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.repo.find_product(id)
    }

    pub fn get_cart(&self, user_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        self.repo.transaction(|tx| {
            let order = find_or_create_cart(tx, user_id)?;
            find_and_format_cart_products(tx, &order)
        })
    }

    /// Add `quantity` units of a product to the user's cart, on top of any
    /// units already there.
    pub fn add_to_cart(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItem, DomainError> {
        let quantity = validate_quantity(quantity)?;
        self.repo.transaction(|tx| {
            let product = tx
                .find_product(product_id)?
                .ok_or(DomainError::ProductNotFound(product_id))?;
            let order = find_or_create_cart(tx, user_id)?;
            let in_cart = tx
                .find_line(order.id, product_id)?
                .map_or(0, |line| line.quantity);
            let total = in_cart
                .checked_add(quantity)
                .ok_or(DomainError::InvalidQuantity(quantity))?;
            ensure_in_stock(&product, total)?;
            tx.save_line(order.id, product_id, total)
        })
    }

    pub fn update_cart_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItem, DomainError> {
        let quantity = validate_quantity(quantity)?;
        self.repo.transaction(|tx| {
            let order = find_or_create_cart(tx, user_id)?;
            if tx.find_line(order.id, product_id)?.is_none() {
                return Err(DomainError::LineItemNotFound(product_id));
            }
            let product = tx
                .find_product(product_id)?
                .ok_or(DomainError::ProductNotFound(product_id))?;
            ensure_in_stock(&product, quantity)?;
            tx.save_line(order.id, product_id, quantity)
        })
    }

    pub fn remove_from_cart(&self, user_id: Uuid, product_id: Uuid) -> Result<(), DomainError> {
        self.repo.transaction(|tx| {
            let order = find_or_create_cart(tx, user_id)?;
            if tx.delete_line(order.id, product_id)? {
                Ok(())
            } else {
                Err(DomainError::LineItemNotFound(product_id))
            }
        })
    }

    pub fn checkout_user(&self, user_id: Uuid) -> Result<CheckoutReceipt, DomainError> {
        let result = self
            .repo
            .transaction(|tx| checkout::checkout_cart(tx, user_id, Utc::now()));
        log_checkout(&format!("user {}", user_id), &result);
        result
    }

    pub fn checkout_guest(&self, items: Vec<StockRequest>) -> Result<CheckoutReceipt, DomainError> {
        let result = self
            .repo
            .transaction(|tx| checkout::checkout_guest(tx, &items, Utc::now()));
        log_checkout("guest", &result);
        result
    }
}

fn ensure_in_stock(product: &Product, quantity: i32) -> Result<(), DomainError> {
    if product.can_supply(quantity) {
        Ok(())
    } else {
        Err(DomainError::InsufficientStock {
            product_id: product.id,
            requested: quantity,
            available: product.stock_quantity,
        })
    }
}

fn log_checkout(who: &str, result: &Result<CheckoutReceipt, DomainError>) {
    match result {
        Ok(receipt) => log::info!(
            "{} checked out order {} with {} line(s)",
            who,
            receipt.order_id,
            receipt.lines.len()
        ),
        Err(DomainError::StockUnavailable(failures)) => log::warn!(
            "checkout for {} rejected: {} item(s) unavailable, stock left unchanged",
            who,
            failures.len()
        ),
        Err(DomainError::Internal(msg)) => log::error!("checkout for {} failed: {}", who, msg),
        Err(e) => log::info!("checkout for {} rejected: {}", who, e),
    }
}
