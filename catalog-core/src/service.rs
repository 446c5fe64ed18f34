//! Collaborators the screens talk to: record services and navigation.

use std::future::Future;
use std::sync::mpsc;

use crate::error::ApiError;
use crate::model::{Category, Product, ProductDraft, ProductId, Store};

/// CRUD calls for products.
pub trait ProductService {
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, ApiError>> + Send;

    fn fetch_product(&self, id: ProductId) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn create_product(&self, draft: &ProductDraft) -> impl Future<Output = Result<Product, ApiError>> + Send;

    fn update_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> impl Future<Output = Result<Product, ApiError>> + Send;
}

/// Read-only lookup lists that feed the selectors.
pub trait ReferenceService {
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;

    fn list_stores(&self) -> impl Future<Output = Result<Vec<Store>, ApiError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Products,
    Categories,
    Stores,
}

/// Navigation target plus an optional message for the destination to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub screen: Screen,
    pub flash_error: Option<String>,
}

impl Route {
    pub fn to(screen: Screen) -> Self {
        Self {
            screen,
            flash_error: None,
        }
    }

    pub fn with_error(screen: Screen, message: impl Into<String>) -> Self {
        Self {
            screen,
            flash_error: Some(message.into()),
        }
    }
}

/// Moves the host to another screen. Called from timer tasks, so it must be
/// shareable across threads.
pub trait Navigator: Send + Sync + 'static {
    fn go_to(&self, route: Route);
}

impl Navigator for mpsc::Sender<Route> {
    fn go_to(&self, route: Route) {
        // receiver gone means the host already shut down
        let _ = self.send(route);
    }
}
