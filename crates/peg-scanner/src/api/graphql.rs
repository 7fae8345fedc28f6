use super::{normalize_symbol, parse_url, Backend};
use crate::error::{Error, Result};
use crate::view::{PegStock, PingStatus, SingleStockPage};
use crate::wire::common_de::de_null_default;
use crate::wire::{PegStockRecord, PingResponse, SingleStockPageResponse};
use async_trait::async_trait;
use peg_util::Util;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use url::Url;

pub const PING_QUERY: &str = "query Ping { ping { message agent timestampMs } }";

pub const PEG_STOCKS_QUERY: &str =
    "query PegStocks { pegStocks { symbol name peRatio earningsGrowth pegRatio } }";

pub const SINGLE_STOCK_QUERY: &str = r#"query SingleStock($symbol: String!) {
  singleStock(symbol: $symbol) {
    stock {
      symbol
      name
      exchange
      currency
      companyInfo {
        symbol
        description
        sector
        industry
        valuation { psRatio peRatio pbRatio }
        indicators { eps fcf currentRatio roe }
      }
    }
    dailyKline { timestamp open high low close volume }
    news { title url source publishedAt }
  }
}"#;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'static str,
    operation_name: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<Variables<'a>>,
}

#[derive(Serialize, Debug)]
struct Variables<'a> {
    symbol: &'a str,
}

#[derive(Deserialize, Debug)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default, deserialize_with = "de_null_default")]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize, Debug)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize, Debug)]
struct PingData {
    ping: PingResponse,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PegStocksData {
    #[serde(default, deserialize_with = "de_null_default")]
    peg_stocks: Vec<PegStockRecord>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SingleStockData {
    single_stock: Option<SingleStockPageResponse>,
}

/// The GraphQL revision of the backend; every query is a `POST` of
/// `{query, operationName, variables}` to a single endpoint.
#[derive(Debug, Clone)]
pub struct GraphqlBackend {
    client: Client,
    endpoint: Url,
}

impl GraphqlBackend {
    pub fn new(client: Client, endpoint: &str) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: parse_url(endpoint.trim())?,
        })
    }

    async fn execute<T: DeserializeOwned>(&self, request: GraphQlRequest<'_>) -> Result<T> {
        let endpoint = self.endpoint.as_str();
        let operation = request.operation_name;

        let payload = self
            .client
            .post_json_payload(endpoint, &request)
            .await
            .map_err(|e| {
                error!("{operation}: POST {endpoint} failed: {e}");
                Error::network(endpoint, e)
            })?;

        // GraphQL servers may report errors with a non-2xx status; prefer the
        // `errors` array when the body has one.
        let status_error = || {
            let err = Error::HttpStatus {
                endpoint: endpoint.to_string(),
                status: payload.status,
                detail: payload.detail(),
            };
            error!("{operation}: {err}");
            err
        };
        let response: GraphQlResponse<T> = match serde_json::from_slice(&payload.body) {
            Ok(response) => response,
            Err(e) if payload.is_success() => return Err(Error::json(endpoint, e)),
            Err(_) => return Err(status_error()),
        };

        if response.errors.is_empty() && !payload.is_success() {
            return Err(status_error());
        }

        if !response.errors.is_empty() {
            let messages = response
                .errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            error!("{operation}: {messages}");
            return Err(Error::GraphQl(messages));
        }

        response
            .data
            .ok_or_else(|| Error::GraphQl(format!("{operation} returned no data")))
    }
}

#[async_trait]
impl Backend for GraphqlBackend {
    async fn ping(&self) -> Result<PingStatus> {
        let data: PingData = self
            .execute(GraphQlRequest {
                query: PING_QUERY,
                operation_name: "Ping",
                variables: None,
            })
            .await?;
        Ok(PingStatus::from(&data.ping))
    }

    async fn peg_stocks(&self) -> Result<Vec<PegStock>> {
        let data: PegStocksData = self
            .execute(GraphQlRequest {
                query: PEG_STOCKS_QUERY,
                operation_name: "PegStocks",
                variables: None,
            })
            .await?;
        debug!("{} watchlist rows", data.peg_stocks.len());
        Ok(PegStock::project_all(&data.peg_stocks))
    }

    async fn single_stock(&self, symbol: &str) -> Result<SingleStockPage> {
        let symbol = normalize_symbol(symbol).ok_or(Error::InvalidSymbol)?;
        let data: SingleStockData = self
            .execute(GraphQlRequest {
                query: SINGLE_STOCK_QUERY,
                operation_name: "SingleStock",
                variables: Some(Variables { symbol: &symbol }),
            })
            .await?;

        match data.single_stock {
            Some(page) => Ok(SingleStockPage::from(&page)),
            None => {
                debug!("{symbol} not found");
                Err(Error::NotFound(symbol))
            }
        }
    }
}
