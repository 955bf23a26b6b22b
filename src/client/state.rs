use std::sync::{PoisonError, RwLock};

use crate::handlers::products::ProductResponse;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum CatalogState {
    /// No catalog has been received yet.
    #[default]
    Unloaded,
    Loaded(Vec<ProductResponse>),
}

impl CatalogState {
    pub fn products(&self) -> Option<&[ProductResponse]> {
        match self {
            CatalogState::Unloaded => None,
            CatalogState::Loaded(products) => Some(products),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogAction {
    ProductsReceived(Vec<ProductResponse>),
}

/// A fresh catalog always replaces the previous snapshot wholesale.
pub fn reduce(_state: CatalogState, action: CatalogAction) -> CatalogState {
    match action {
        CatalogAction::ProductsReceived(products) => CatalogState::Loaded(products),
    }
}

/// Shared container for the catalog snapshot.
#[derive(Debug, Default)]
pub struct CatalogStore {
    state: RwLock<CatalogState>,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: CatalogAction) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let current = std::mem::take(&mut *state);
        *state = reduce(current, action);
    }

    pub fn snapshot(&self) -> CatalogState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
