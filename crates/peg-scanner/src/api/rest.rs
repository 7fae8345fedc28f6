use super::{normalize_symbol, parse_url, Backend};
use crate::error::{Error, Result};
use crate::view::{PegStock, PingStatus, SingleStockPage};
use crate::wire::{self, Message, PegStockRecord};
use async_trait::async_trait;
use peg_util::{Payload, Util};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, trace};
use url::Url;

/// The REST revision of the backend:
///
/// - `GET {api}/ping/` -> binary `PingResponse`
/// - `GET {api}/peg-stocks/` -> JSON array
/// - `GET {api}/single-stock-page/?symbol=SYM` -> binary `SingleStockPageResponse`
///
/// Older deployments answer ping and single stock page with JSON instead; the
/// body is decoded according to its `Content-Type`.
#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    api_base: Url,
}

impl RestBackend {
    pub fn new(client: Client, api_base: &str) -> Result<Self> {
        // without the trailing slash, Url::join would replace the last segment
        let mut base = api_base.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            client,
            api_base: parse_url(&base)?,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.api_base
            .join(path)
            .map_err(|e| Error::Config(format!("invalid endpoint {path:?}: {e}")))
    }

    async fn get(&self, url: &Url) -> Result<Payload> {
        self.client
            .fetch_payload(url.as_str())
            .await
            .map_err(|e| {
                error!("GET {url} failed: {e}");
                Error::network(url.as_str(), e)
            })
    }
}

#[async_trait]
impl Backend for RestBackend {
    async fn ping(&self) -> Result<PingStatus> {
        let url = self.endpoint("ping/")?;
        let payload = self.get(&url).await?;
        ensure_success(&url, &payload)?;

        let ping: wire::PingResponse = decode_either(&url, &payload)?;
        trace!("ping from {}: {ping:?}", ping.agent);
        Ok(PingStatus::from(&ping))
    }

    async fn peg_stocks(&self) -> Result<Vec<PegStock>> {
        let url = self.endpoint("peg-stocks/")?;
        let payload = self.get(&url).await?;
        ensure_success(&url, &payload)?;

        let rows: Vec<PegStockRecord> =
            serde_json::from_slice(&payload.body).map_err(|e| Error::json(url.as_str(), e))?;
        debug!("{} watchlist rows", rows.len());
        Ok(PegStock::project_all(&rows))
    }

    async fn single_stock(&self, symbol: &str) -> Result<SingleStockPage> {
        let symbol = normalize_symbol(symbol).ok_or(Error::InvalidSymbol)?;
        let mut url = self.endpoint("single-stock-page/")?;
        url.query_pairs_mut().append_pair("symbol", &symbol);

        let payload = self.get(&url).await?;
        if payload.status == StatusCode::NOT_FOUND {
            debug!("{symbol} not found: {:?}", payload.detail());
            return Err(Error::NotFound(symbol));
        }
        ensure_success(&url, &payload)?;

        let page: wire::SingleStockPageResponse = decode_either(&url, &payload)?;
        debug!(
            "[{symbol}] {} klines, {} news items",
            page.daily_kline.len(),
            page.news.len()
        );
        Ok(SingleStockPage::from(&page))
    }
}

fn ensure_success(url: &Url, payload: &Payload) -> Result<()> {
    if payload.is_success() {
        return Ok(());
    }
    let err = Error::HttpStatus {
        endpoint: url.to_string(),
        status: payload.status,
        detail: payload.detail(),
    };
    error!("{err}");
    Err(err)
}

/// JSON if the server says so, protobuf otherwise.
fn decode_either<M>(url: &Url, payload: &Payload) -> Result<M>
where
    M: Message + DeserializeOwned,
{
    if payload.is_json() {
        serde_json::from_slice(&payload.body).map_err(|e| Error::json(url.as_str(), e))
    } else {
        wire::decode(&payload.body)
    }
}
