//! Display records, projected from the [`wire`](crate::wire) records.
//!
//! Every field is mapped explicitly. Anything the backend left out stays `None`;
//! the projector never turns an unknown value into zero.

use crate::format;
use crate::wire;
use serde::Serialize;
use tracing::warn;

/// Backend liveness heartbeat.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PingStatus {
    pub message: String,
    pub agent: String,
    pub timestamp_ms: i64,
}

/// A watchlist row.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PegStock {
    pub symbol: String,
    pub name: String,
    pub pe_ratio: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub peg_ratio: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SingleStockPage {
    pub stock: StockSummary,
    pub daily_kline: Vec<KLinePoint>,
    pub news: Vec<NewsItem>,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
    pub currency: String,
    pub company_info: Option<CompanyInfo>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub symbol: String,
    pub description: String,
    pub sector: String,
    pub industry: String,
    pub valuation: Option<Valuation>,
    pub indicators: Option<Indicators>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Valuation {
    pub ps_ratio: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub pb_ratio: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Indicators {
    pub eps: Option<f64>,
    pub fcf: Option<f64>,
    pub current_ratio: Option<f64>,
    pub roe: Option<f64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KLinePoint {
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: String,
    pub url: String,
    pub source: String,
    pub published_at: Option<i64>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Projection
//
////////////////////////////////////////////////////////////////////////////////////////////////////

impl From<&wire::PingResponse> for PingStatus {
    fn from(w: &wire::PingResponse) -> Self {
        Self {
            message: w.message.clone(),
            agent: w.agent.clone(),
            timestamp_ms: w.timestamp_ms,
        }
    }
}

impl PegStock {
    /// Project a watchlist row; rows without a usable symbol are dropped.
    ///
    /// The symbol is trimmed and uppercased; a missing or blank name falls back
    /// to the symbol.
    pub fn project(w: &wire::PegStockRecord) -> Option<Self> {
        let symbol = w.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            warn!("dropping watchlist row without a symbol: {w:?}");
            return None;
        }
        let name = w
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| symbol.clone());
        Some(Self {
            symbol,
            name,
            pe_ratio: w.pe_ratio,
            earnings_growth: w.earnings_growth,
            peg_ratio: w.peg_ratio,
        })
    }

    pub fn project_all(rows: &[wire::PegStockRecord]) -> Vec<Self> {
        rows.iter().filter_map(Self::project).collect()
    }
}

impl From<&wire::SingleStockPageResponse> for SingleStockPage {
    fn from(w: &wire::SingleStockPageResponse) -> Self {
        Self {
            stock: w.stock.as_ref().map(StockSummary::from).unwrap_or_default(),
            daily_kline: w.daily_kline.iter().map(KLinePoint::from).collect(),
            news: w.news.iter().map(NewsItem::from).collect(),
        }
    }
}

impl From<&wire::Stock> for StockSummary {
    fn from(w: &wire::Stock) -> Self {
        Self {
            symbol: w.symbol.clone(),
            name: w.name.clone(),
            exchange: w.exchange.clone(),
            currency: w.currency.clone(),
            company_info: w.company_info.as_ref().map(CompanyInfo::from),
        }
    }
}

impl From<&wire::CompanyInfo> for CompanyInfo {
    fn from(w: &wire::CompanyInfo) -> Self {
        Self {
            symbol: w.symbol.clone(),
            description: w.description.clone(),
            sector: w.sector.clone(),
            industry: w.industry.clone(),
            valuation: w.valuation.as_ref().map(Valuation::from),
            indicators: w.indicators.as_ref().map(Indicators::from),
        }
    }
}

impl From<&wire::CompanyValuation> for Valuation {
    fn from(w: &wire::CompanyValuation) -> Self {
        Self {
            ps_ratio: w.ps_ratio,
            pe_ratio: w.pe_ratio,
            pb_ratio: w.pb_ratio,
        }
    }
}

impl From<&wire::FinancialIndicators> for Indicators {
    fn from(w: &wire::FinancialIndicators) -> Self {
        Self {
            eps: w.eps,
            fcf: w.fcf,
            current_ratio: w.current_ratio,
            roe: w.roe,
        }
    }
}

impl From<&wire::KLinePoint> for KLinePoint {
    fn from(w: &wire::KLinePoint) -> Self {
        Self {
            timestamp: w.timestamp,
            open: w.open,
            high: w.high,
            low: w.low,
            close: w.close,
            volume: w.volume,
        }
    }
}

impl From<&wire::NewsItem> for NewsItem {
    fn from(w: &wire::NewsItem) -> Self {
        Self {
            title: w.title.clone(),
            url: w.url.clone(),
            source: w.source.clone(),
            // 0 is the proto3 default, i.e. "never set"
            published_at: Some(w.published_at).filter(|ts| *ts != 0),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Ping indicator
//
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PingState {
    Checking,
    Ok,
    Error,
}

/// The small status light in the corner of the app, with its accessible label.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PingIndicator {
    pub status: PingState,
    pub label: String,
}

impl PingIndicator {
    /// An error wins over a stale heartbeat; no data at all means "checking".
    pub fn from_slots(ping: Option<&PingStatus>, error: Option<&str>) -> Self {
        match (error, ping) {
            (Some(error), _) => Self {
                status: PingState::Error,
                label: format!("Backend status error: {error}"),
            },
            (None, Some(ping)) => Self {
                status: PingState::Ok,
                label: format!(
                    "Backend status ok at {}",
                    format::format_iso_millis(Some(ping.timestamp_ms))
                ),
            },
            (None, None) => Self {
                status: PingState::Checking,
                label: "Backend status: checking".to_string(),
            },
        }
    }
}
