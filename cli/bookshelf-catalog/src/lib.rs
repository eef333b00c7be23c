//! Shared HTTP client infrastructure for the Open Library catalog API.
//!
//! This crate provides:
//! - HTTP client construction with a configurable base URL and headers
//! - Normalization of raw catalog documents into simplified records
//! - Common error handling for catalog operations
//! - A mock client for driving consumers in tests
//!
//! ## Usage
//!
//! ```ignore
//! use bookshelf_catalog::{CatalogClient, CatalogClientConfig, ClientTrait, DEFAULT_PAGE_SIZE};
//!
//! let config = CatalogClientConfig {
//!     base_url: "https://openlibrary.org".to_string(),
//!     extra_headers: BTreeMap::new(),
//!     user_agent: None,
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let page = client.search("dune", 1, DEFAULT_PAGE_SIZE).await?;
//! ```

mod client;
mod config;
mod error;
mod types;

pub use client::{CatalogClient, Client, ClientTrait, DEFAULT_PAGE_SIZE, MockClient, Response};
pub use config::CatalogClientConfig;
pub use error::{CatalogError, NetworkError, ValidationError};
pub use types::{CoverSize, Link, SearchPage, SearchResult, WorkDetails, cover_image_url};
