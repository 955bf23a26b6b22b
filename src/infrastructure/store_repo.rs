use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::{CartLine, LineItem, Order};
use crate::domain::catalog::Product;
use crate::domain::checkout::{AppliedDecrement, StockAttempt, StockFailure, StockFailureKind};
use crate::domain::errors::DomainError;
use crate::domain::ports::{StockLedger, StoreRepository, StoreTransaction};
use crate::schema::{order_products, orders, products};

use super::models::{NewOrderProductRow, NewOrderRow, OrderProductRow, OrderRow, ProductRow};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselStoreRepository {
    pool: DbPool,
}

impl DieselStoreRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl StoreRepository for DieselStoreRepository {
    fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let rows = products::table
            .select(ProductRow::as_select())
            .order((products::name.asc(), products::id.asc()))
            .load(&mut conn)?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn transaction<T, F>(&self, f: F) -> Result<T, DomainError>
    where
        F: FnOnce(&mut dyn StoreTransaction) -> Result<T, DomainError>,
    {
        let mut pooled = self.pool.get()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<_, DomainError, _>(|conn| f(&mut PgStoreTransaction { conn }))
    }
}

// ── Transaction-scoped operations ─────────────────────────────────────────────

struct PgStoreTransaction<'a> {
    conn: &'a mut PgConnection,
}

impl StockLedger for PgStoreTransaction<'_> {
    fn decrement_stock(
        &mut self,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<StockAttempt, DomainError> {
        // The row lock taken here holds until commit, so competing checkouts
        // of the same product re-check the stock after we finish.
        let updated = diesel::update(
            products::table
                .find(product_id)
                .filter(products::stock_quantity.ge(quantity)),
        )
        .set((
            products::stock_quantity.eq(products::stock_quantity - quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .returning((products::price, products::stock_quantity))
        .get_result::<(BigDecimal, i32)>(self.conn)
        .optional()?;

        if let Some((unit_price, remaining)) = updated {
            return Ok(StockAttempt::Applied(AppliedDecrement {
                product_id,
                quantity,
                unit_price,
                previous_stock: remaining + quantity,
            }));
        }

        let current = products::table
            .find(product_id)
            .select(products::stock_quantity)
            .first::<i32>(self.conn)
            .optional()?;

        Ok(StockAttempt::Rejected(StockFailure {
            error_name: match current {
                Some(_) => StockFailureKind::InsufficientStock,
                None => StockFailureKind::UnknownProduct,
            },
            stock_product_id: product_id,
            requested_quantity: quantity,
            stock_quantity: current,
        }))
    }
}

impl StoreTransaction for PgStoreTransaction<'_> {
    fn find_product(&mut self, product_id: Uuid) -> Result<Option<Product>, DomainError> {
        let row = products::table
            .find(product_id)
            .select(ProductRow::as_select())
            .first(self.conn)
            .optional()?;

        Ok(row.map(Product::from))
    }

    fn find_open_order(&mut self, user_id: Uuid) -> Result<Option<Order>, DomainError> {
        let row = orders::table
            .filter(orders::user_id.eq(user_id))
            .filter(orders::is_bought.eq(false))
            .select(OrderRow::as_select())
            .first(self.conn)
            .optional()?;

        Ok(row.map(Order::from))
    }

    fn insert_open_order(&mut self, user_id: Uuid) -> Result<bool, DomainError> {
        // Conflicts with `orders_one_open_cart_per_user` are not errors: the
        // caller re-reads and adopts the existing cart.
        let inserted = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                user_id: Some(user_id),
                purchase_date: None,
                is_bought: false,
            })
            .on_conflict_do_nothing()
            .execute(self.conn)?;

        Ok(inserted == 1)
    }

    fn create_bought_order(
        &mut self,
        user_id: Option<Uuid>,
        purchased_at: DateTime<Utc>,
    ) -> Result<Order, DomainError> {
        let row = diesel::insert_into(orders::table)
            .values(&NewOrderRow {
                id: Uuid::new_v4(),
                user_id,
                purchase_date: Some(purchased_at),
                is_bought: true,
            })
            .returning(OrderRow::as_returning())
            .get_result(self.conn)?;

        Ok(row.into())
    }

    fn cart_lines(&mut self, order_id: Uuid) -> Result<Vec<CartLine>, DomainError> {
        let rows = order_products::table
            .inner_join(products::table)
            .filter(order_products::order_id.eq(order_id))
            .order((products::name.asc(), products::id.asc()))
            .select((OrderProductRow::as_select(), ProductRow::as_select()))
            .load::<(OrderProductRow, ProductRow)>(self.conn)?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| CartLine {
                item: item.into(),
                product: product.into(),
            })
            .collect())
    }

    fn find_line(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<LineItem>, DomainError> {
        let row = order_products::table
            .find((order_id, product_id))
            .select(OrderProductRow::as_select())
            .first(self.conn)
            .optional()?;

        Ok(row.map(LineItem::from))
    }

    fn save_line(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<LineItem, DomainError> {
        let row = diesel::insert_into(order_products::table)
            .values(&NewOrderProductRow {
                order_id,
                product_id,
                quantity,
                historical_price: None,
            })
            .on_conflict((order_products::order_id, order_products::product_id))
            .do_update()
            .set((
                order_products::quantity.eq(quantity),
                order_products::updated_at.eq(Utc::now()),
            ))
            .returning(OrderProductRow::as_returning())
            .get_result(self.conn)?;

        Ok(row.into())
    }

    fn delete_line(&mut self, order_id: Uuid, product_id: Uuid) -> Result<bool, DomainError> {
        let deleted =
            diesel::delete(order_products::table.find((order_id, product_id))).execute(self.conn)?;

        Ok(deleted > 0)
    }

    fn insert_lines(&mut self, lines: &[LineItem]) -> Result<(), DomainError> {
        if lines.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewOrderProductRow> = lines.iter().map(NewOrderProductRow::from).collect();
        diesel::insert_into(order_products::table)
            .values(&rows)
            .execute(self.conn)?;

        Ok(())
    }

    fn freeze_price(
        &mut self,
        order_id: Uuid,
        product_id: Uuid,
        price: &BigDecimal,
    ) -> Result<(), DomainError> {
        diesel::update(
            order_products::table
                .find((order_id, product_id))
                .filter(order_products::historical_price.is_null()),
        )
        .set((
            order_products::historical_price.eq(Some(price.clone())),
            order_products::updated_at.eq(Utc::now()),
        ))
        .execute(self.conn)?;

        Ok(())
    }

    fn mark_bought(
        &mut self,
        order_id: Uuid,
        purchased_at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let updated = diesel::update(
            orders::table
                .find(order_id)
                .filter(orders::is_bought.eq(false)),
        )
        .set((
            orders::is_bought.eq(true),
            orders::purchase_date.eq(Some(purchased_at)),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(self.conn)?;

        Ok(updated == 1)
    }
}
