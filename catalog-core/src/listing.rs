//! List screens: one fetch, one message on failure.

use std::future::Future;

use tracing::warn;

use crate::error::ApiError;
use crate::service::{Route, Screen};

#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub screen: Screen,
    pub items: Vec<T>,
    /// Load failure for this screen.
    pub error: Option<String>,
    /// Message carried in by the route that opened this screen.
    pub flash: Option<String>,
}

fn load_fallback(screen: Screen) -> &'static str {
    match screen {
        Screen::Products => "Failed to load products",
        Screen::Categories => "Failed to load categories",
        Screen::Stores => "Failed to load stores",
    }
}

/// Awaits `fetch` and turns a failure into the screen's error message.
pub async fn load_listing<T, F>(route: Route, fetch: F) -> Listing<T>
where
    F: Future<Output = Result<Vec<T>, ApiError>>,
{
    let (items, error) = match fetch.await {
        Ok(items) => (items, None),
        Err(e) => {
            warn!(screen = ?route.screen, error = %e, "listing load failed");
            let message = e.load_message().unwrap_or(load_fallback(route.screen)).to_string();
            (Vec::new(), Some(message))
        }
    };

    Listing {
        screen: route.screen,
        items,
        error,
        flash: route.flash_error,
    }
}
