//! Configuration types for catalog client construction.

use std::collections::BTreeMap;

/// Configuration for catalog client construction.
///
/// The base URL is injected here rather than read from a global so that tests
/// and alternate deployments can point the client anywhere.
#[derive(Debug, Clone, Default)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API.
    pub base_url: String,
    /// Additional headers to include in every request.
    pub extra_headers: BTreeMap<String, String>,
    /// Overrides the default user agent when set.
    pub user_agent: Option<String>,
}
