use bigdecimal::BigDecimal;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    pub stock_quantity: i32,
}

impl Product {
    /// Whether `quantity` units could be taken from current stock.
    pub fn can_supply(&self, quantity: i32) -> bool {
        quantity <= self.stock_quantity
    }
}
