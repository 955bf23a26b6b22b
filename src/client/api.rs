use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use super::state::{CatalogAction, CatalogStore};
use crate::handlers::products::ProductResponse;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request to storefront failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// HTTP access to the storefront's public catalog.
#[derive(Debug, Clone)]
pub struct ProductsClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProductsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// GET /api/products
    pub async fn fetch_products(&self) -> Result<Vec<ProductResponse>, ClientError> {
        let products = self
            .http
            .get(format!("{}/api/products", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(products)
    }
}

/// Fetch the catalog and dispatch it into `store`.
///
/// On failure the store keeps its previous state.
pub async fn load_products(
    client: &ProductsClient,
    store: &CatalogStore,
) -> Result<(), ClientError> {
    let products = client.fetch_products().await?;
    store.dispatch(CatalogAction::ProductsReceived(products));
    Ok(())
}

/// Run [`load_products`] in the background. Errors are logged, not retried.
pub fn spawn_load_products(client: ProductsClient, store: Arc<CatalogStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = load_products(&client, &store).await {
            log::warn!("could not load product catalog: {}", e);
        }
    })
}
