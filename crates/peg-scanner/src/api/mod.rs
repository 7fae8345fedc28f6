//! Backend transports.
//!
//! Each backend revision speaks a different protocol; [`Backend`] hides that
//! and always hands back projected [`view`](crate::view) records.

pub mod graphql;
pub mod rest;

pub use graphql::GraphqlBackend;
pub use rest::RestBackend;

use crate::config::{ClientConfig, Transport};
use crate::error::{Error, Result};
use crate::view::{PegStock, PingStatus, SingleStockPage};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Backend liveness heartbeat.
    async fn ping(&self) -> Result<PingStatus>;

    /// The PEG watchlist.
    async fn peg_stocks(&self) -> Result<Vec<PegStock>>;

    /// The detail page of a single stock; an unknown symbol is
    /// [`Error::NotFound`].
    async fn single_stock(&self, symbol: &str) -> Result<SingleStockPage>;
}

/// Build the backend selected by `config`.
pub fn connect(config: &ClientConfig) -> Result<Arc<dyn Backend>> {
    let client = peg_util::build_client(&config.user_agent, config.timeout)
        .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

    let backend: Arc<dyn Backend> = match config.transport {
        Transport::Rest => {
            debug!("using REST backend at {}", config.api_base);
            Arc::new(RestBackend::new(client, &config.api_base)?)
        }
        Transport::Graphql => {
            debug!("using GraphQL backend at {}", config.graphql_url);
            Arc::new(GraphqlBackend::new(client, &config.graphql_url)?)
        }
    };
    Ok(backend)
}

/// Trim and uppercase a user-supplied ticker; `None` if nothing is left.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol)
    }
}

fn parse_url(raw: &str) -> Result<url::Url> {
    url::Url::parse(raw).map_err(|e| Error::Config(format!("invalid URL {raw:?}: {e}")))
}
