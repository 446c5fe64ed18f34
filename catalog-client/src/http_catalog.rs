use std::time::Duration;

use catalog_core::{
    ApiError, Category, Product, ProductDraft, ProductId, ProductService, ReferenceService, Store,
};
use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::error_body::decode_error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("base url must start with http:// or https:// (got {0:?})")]
    InvalidBaseUrl(String),
    #[error("build http client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Catalog backend over HTTP/JSON.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    /// Uses a preconfigured client (proxies, TLS roots, default headers).
    pub fn with_client(base_url: &str, client: reqwest::Client) -> Result<Self, ClientError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidBaseUrl(base_url));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let resp = self.client.get(&url).send().await.map_err(transport)?;
        read_json(resp).await
    }

    async fn send_json<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let url = self.url(path);
        debug!(url = %url, method = %method.as_str(), "send");
        let resp = self
            .client
            .request(method, &url)
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        read_json(resp).await
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    ApiError::Transport(e.to_string())
}

async fn read_json<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        debug!(%status, body_len = body.len(), "error response");
        return Err(decode_error(status.as_u16(), &body));
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Transport(format!("decode response: {e}")))
}

impl ProductService for HttpCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get_json("produtos").await
    }

    async fn fetch_product(&self, id: ProductId) -> Result<Product, ApiError> {
        self.get_json(&format!("produtos/{id}")).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product, ApiError> {
        self.send_json(Method::POST, "produtos", draft).await
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<Product, ApiError> {
        self.send_json(Method::PUT, &format!("produtos/{id}"), draft).await
    }
}

impl ReferenceService for HttpCatalog {
    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("categorias").await
    }

    async fn list_stores(&self) -> Result<Vec<Store>, ApiError> {
        self.get_json("lojas").await
    }
}
