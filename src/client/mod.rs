//! Client-side catalog state.
//!
//! [`state`] holds the product snapshot behind a single reducing function;
//! [`api`] fetches the catalog from the storefront and dispatches it.

pub mod api;
pub mod state;

pub use api::{load_products, spawn_load_products, ClientError, ProductsClient};
pub use state::{reduce, CatalogAction, CatalogState, CatalogStore};
