use once_cell::sync::OnceCell;
use tracing::error;
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

static LOGGER_HANDLE: OnceCell<Handle<EnvFilter, Registry>> = OnceCell::new();

pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let verbosity = verbosity.unwrap_or_default();

    let log_filter = match verbosity {
        // Show only errors
        Verbosity::Quiet => "off,bookshelf=error",
        // Only show warnings
        Verbosity::Verbose(0) => "off,bookshelf=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,bookshelf=info",
        // Also show debug from our libraries
        Verbosity::Verbose(2) => "off,bookshelf=debug,bookshelf_catalog=debug",
        // Also show trace from our libraries
        Verbosity::Verbose(3) => "off,bookshelf=trace,bookshelf_catalog=trace",
        Verbosity::Verbose(_) => "trace",
    };

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        // The filter starts wide open and is narrowed right below; this keeps
        // the `log` bridge from locking in a low verbosity ceiling on the
        // first initialization.
        let filter = EnvFilter::try_new("trace").unwrap();
        let (filter, reload_handle) = tracing_subscriber::reload::Layer::new(filter);
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter);
        tracing_subscriber::registry().with(fmt_layer).init();
        reload_handle
    });

    update_filters(filter_handle, log_filter);
}

fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}
