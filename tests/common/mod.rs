//! In-memory `StoreRepository` for tests that do not need PostgreSQL.
//!
//! A transaction works on a copy of the state and only replaces the committed
//! state when the closure returns `Ok`, mirroring database rollback.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use storefront::domain::cart::{CartLine, LineItem, Order};
use storefront::domain::catalog::Product;
use storefront::domain::checkout::{
    AppliedDecrement, StockAttempt, StockFailure, StockFailureKind,
};
use storefront::domain::errors::DomainError;
use storefront::domain::ports::{StockLedger, StoreRepository, StoreTransaction};

#[derive(Debug, Clone, Default)]
struct State {
    products: BTreeMap<Uuid, Product>,
    orders: Vec<Order>,
    lines: Vec<LineItem>,
    decrements: Vec<Uuid>,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    pub fn add_product(&self, name: &str, price: &str, stock_quantity: i32) -> Uuid {
        let id = Uuid::new_v4();
        self.state.lock().unwrap().products.insert(
            id,
            Product {
                id,
                name: name.to_string(),
                description: format!("{} description", name),
                price: BigDecimal::from_str(price).expect("valid decimal"),
                stock_quantity,
            },
        );
        id
    }

    pub fn set_stock(&self, id: Uuid, stock_quantity: i32) {
        self.state
            .lock()
            .unwrap()
            .products
            .get_mut(&id)
            .expect("unknown product")
            .stock_quantity = stock_quantity;
    }

    pub fn set_price(&self, id: Uuid, price: &str) {
        self.state
            .lock()
            .unwrap()
            .products
            .get_mut(&id)
            .expect("unknown product")
            .price = BigDecimal::from_str(price).expect("valid decimal");
    }

    pub fn stock_of(&self, id: Uuid) -> i32 {
        self.state.lock().unwrap().products[&id].stock_quantity
    }

    pub fn orders(&self) -> Vec<Order> {
        self.state.lock().unwrap().orders.clone()
    }

    pub fn orders_of(&self, user_id: Uuid) -> Vec<Order> {
        self.orders()
            .into_iter()
            .filter(|o| o.user_id == Some(user_id))
            .collect()
    }

    /// Products decremented by committed transactions, in issue order.
    pub fn decrement_log(&self) -> Vec<Uuid> {
        self.state.lock().unwrap().decrements.clone()
    }

    pub fn lines_of(&self, order_id: Uuid) -> Vec<LineItem> {
        self.state
            .lock()
            .unwrap()
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .cloned()
            .collect()
    }
}

impl StoreRepository for InMemoryStore {
    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut products: Vec<Product> =
            self.state.lock().unwrap().products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.state.lock().unwrap().products.get(&id).cloned())
    }

    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, DomainError>,
    {
        let mut committed = self.state.lock().unwrap();
        let mut working = committed.clone();
        let result = f(&mut MemoryTx {
            state: &mut working,
        });
        if result.is_ok() {
            *committed = working;
        }
        result
    }
}

struct MemoryTx<'a> {
    state: &'a mut State,
}

impl StockLedger for MemoryTx<'_> {
    fn decrement_stock(
        &mut self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<StockAttempt, DomainError> {
        let Some(product) = self.state.products.get_mut(&product_id) else {
            return Ok(StockAttempt::Rejected(StockFailure {
                error_name: StockFailureKind::UnknownProduct,
                stock_product_id: product_id,
                requested_quantity: quantity,
                stock_quantity: None,
            }));
        };
        if product.stock_quantity < quantity {
            return Ok(StockAttempt::Rejected(StockFailure {
                error_name: StockFailureKind::InsufficientStock,
                stock_product_id: product_id,
                requested_quantity: quantity,
                stock_quantity: Some(product.stock_quantity),
            }));
        }
        let previous_stock = product.stock_quantity;
        product.stock_quantity -= quantity;
        self.state.decrements.push(product_id);
        Ok(StockAttempt::Applied(AppliedDecrement {
            product_id,
            quantity,
            unit_price: product.price.clone(),
            previous_stock,
        }))
    }
}

impl StoreTransaction for MemoryTx<'_> {
    fn find_product(&mut self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.state.products.get(&product_id).cloned())
    }

    fn find_open_order(&mut self, user_id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self
            .state
            .orders
            .iter()
            .find(|o| o.user_id == Some(user_id) && !o.is_bought)
            .cloned())
    }

    fn insert_open_order(&mut self, user_id: Uuid) -> Result<bool, DomainError> {
        if self.find_open_order(user_id)?.is_some() {
            return Ok(false);
        }
        self.state.orders.push(Order {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            purchase_date: None,
            is_bought: false,
        });
        Ok(true)
    }

    fn create_bought_order(
        &mut self,
        user_id: Option<Uuid>,
        purchased_at: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let order = Order {
            id: Uuid::new_v4(),
            user_id,
            purchase_date: Some(purchased_at),
            is_bought: true,
        };
        self.state.orders.push(order.clone());
        Ok(order)
    }

    fn cart_lines(&mut self, order_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let mut lines: Vec<CartLine> = self
            .state
            .lines
            .iter()
            .filter(|l| l.order_id == order_id)
            .map(|l| CartLine {
                item: l.clone(),
                product: self.state.products[&l.product_id].clone(),
            })
            .collect();
        lines.sort_by(|a, b| a.product.name.cmp(&b.product.name));
        Ok(lines)
    }

    fn find_line(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<LineItem>, DomainError> {
        Ok(self
            .state
            .lines
            .iter()
            .find(|l| l.order_id == order_id && l.product_id == product_id)
            .cloned())
    }

    fn save_line(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItem, DomainError> {
        if let Some(line) = self
            .state
            .lines
            .iter_mut()
            .find(|l| l.order_id == order_id && l.product_id == product_id)
        {
            line.quantity = quantity;
            return Ok(line.clone());
        }
        let line = LineItem {
            order_id,
            product_id,
            quantity,
            historical_price: None,
        };
        self.state.lines.push(line.clone());
        Ok(line)
    }

    fn delete_line(&mut self, order_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let before = self.state.lines.len();
        self.state
            .lines
            .retain(|l| !(l.order_id == order_id && l.product_id == product_id));
        Ok(self.state.lines.len() < before)
    }

    fn insert_lines(&mut self, lines: &[LineItem]) -> Result<(), DomainError> {
        self.state.lines.extend_from_slice(lines);
        Ok(())
    }

    fn freeze_price(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        price: &BigDecimal,
    ) -> Result<(), DomainError> {
        for line in self.state.lines.iter_mut() {
            if line.order_id == order_id
                && line.product_id == product_id
                && line.historical_price.is_none()
            {
                line.historical_price = Some(price.clone());
            }
        }
        Ok(())
    }

    fn mark_bought(
        &mut self,
        order_id: Uuid,
        purchased_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        match self
            .state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id && !o.is_bought)
        {
            Some(order) => {
                order.is_bought = true;
                order.purchase_date = Some(purchased_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
