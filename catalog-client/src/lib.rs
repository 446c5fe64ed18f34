//! catalog-client: HTTP implementation of the catalog services.

pub mod error_body;
pub mod http_catalog;

pub use error_body::decode_error;
pub use http_catalog::{ClientError, HttpCatalog, DEFAULT_TIMEOUT};
