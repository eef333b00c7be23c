use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xdg::BaseDirectories;

/// Name of bookshelf managed directories (config, cache)
const BOOKSHELF_DIR_NAME: &str = "bookshelf";
pub const BOOKSHELF_CONFIG_FILE: &str = "bookshelf.toml";

#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct Config {
    /// bookshelf configuration options
    #[serde(default, flatten)]
    pub bookshelf: BookshelfConfig,
}

/// Describes the configuration for the bookshelf CLI
#[derive(Clone, Debug, Deserialize, Serialize, Default)]
pub struct BookshelfConfig {
    /// The URL of the catalog instance to use
    // Using a Url here adds an extra trailing slash,
    // so just use a String.
    pub catalog_url: Option<String>,

    /// Extra headers to send with every catalog request
    #[serde(default)]
    pub extra_headers: BTreeMap<String, String>,
}

impl Config {
    /// Resolve the configuration from files and environment variables.
    ///
    /// Sources, later ones winning: `/etc/bookshelf.toml`, any
    /// `bookshelf.toml` in the XDG config search path, and `BOOKSHELF_*`
    /// environment variables.
    pub fn parse() -> Result<Config> {
        let dirs = BaseDirectories::with_prefix(BOOKSHELF_DIR_NAME);

        let mut builder = HierarchicalConfig::builder();

        // read from /etc
        builder = builder.add_source(
            config::File::from(PathBuf::from("/etc").join(BOOKSHELF_CONFIG_FILE))
                .format(config::FileFormat::Toml)
                .required(false),
        );

        // look for files in XDG_CONFIG_DIRS locations
        for file in dirs.find_config_files(BOOKSHELF_CONFIG_FILE) {
            debug!("reading config file: {}", file.display());
            builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
        }

        // override via env variables
        let builder = builder.add_source(Environment::with_prefix("BOOKSHELF").try_parsing(true));

        let config = builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("failed to parse bookshelf configuration")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn defaults_to_no_catalog_url() {
        let config = Config::default();
        assert_eq!(config.bookshelf.catalog_url, None);
        assert!(config.bookshelf.extra_headers.is_empty());
    }

    #[test]
    fn environment_variables_override_files() {
        temp_env::with_var(
            "BOOKSHELF_CATALOG_URL",
            Some("http://localhost:9999"),
            || {
                let config = Config::parse().unwrap();
                assert_eq!(
                    config.bookshelf.catalog_url.as_deref(),
                    Some("http://localhost:9999")
                );
            },
        );
    }
}
