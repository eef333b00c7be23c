use anyhow::Result;
use bookshelf_catalog::{CatalogClient, CatalogClientConfig, Client};
use tracing::debug;

use crate::config::Config;

pub const DEFAULT_CATALOG_URL: &str = "https://openlibrary.org";

/// Initialize the catalog API client from the resolved configuration.
pub(crate) fn init_catalog_client(config: &Config) -> Result<Client> {
    // If not configured, use the default URL
    let catalog_url = config
        .bookshelf
        .catalog_url
        .clone()
        .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());

    debug!("using catalog client with url: {catalog_url}");
    let client_config = CatalogClientConfig {
        base_url: catalog_url,
        extra_headers: config.bookshelf.extra_headers.clone(),
        user_agent: Some(format!("bookshelf-cli/{}", env!("CARGO_PKG_VERSION"))),
    };
    Ok(CatalogClient::new(client_config)?.into())
}
