pub mod models;
pub mod store_repo;
