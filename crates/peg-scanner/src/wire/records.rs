//! Typed wire records, as the backend sends them.
//!
//! The same records are filled by the protobuf decoder ([`Message`]) and by
//! serde (REST JSON in snake_case, GraphQL in camelCase), so the view projector
//! has a single input shape regardless of transport.
//!
//! Decoding defaults follow proto3: missing strings and integers are `""`/`0`,
//! missing embedded messages are `None`. Measurement fields (ratios, prices,
//! volumes) keep presence as `Option`, since encoders drop zero values and the
//! view must not show an unknown ratio as `0.00`.

use super::common_de::{de_i64, de_null_default, de_opt_f64, de_opt_i64};
use super::{Message, Reader, WireType};
use crate::error::DecodeError;
use serde::Deserialize;

type Result<T> = std::result::Result<T, DecodeError>;

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Ping
//
////////////////////////////////////////////////////////////////////////////////////////////////////

/// `pegscanner.ping.PingResponse`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PingResponse {
    #[serde(deserialize_with = "de_null_default")]
    pub message: String,
    #[serde(deserialize_with = "de_null_default")]
    pub agent: String,
    #[serde(alias = "timestampMs", deserialize_with = "de_i64")]
    pub timestamp_ms: i64,
}

impl Message for PingResponse {
    const NAME: &'static str = "pegscanner.ping.PingResponse";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.message = r.string(Self::NAME, field, wire_type)?,
            2 => self.agent = r.string(Self::NAME, field, wire_type)?,
            3 => self.timestamp_ms = r.int64(Self::NAME, field, wire_type)?,
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Watchlist (JSON only)
//
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A row of `/api/peg-stocks/` or of the GraphQL `pegStocks` query.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PegStockRecord {
    #[serde(deserialize_with = "de_null_default")]
    pub symbol: String,
    pub name: Option<String>,
    #[serde(alias = "peRatio", deserialize_with = "de_opt_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(alias = "earningsGrowth", deserialize_with = "de_opt_f64")]
    pub earnings_growth: Option<f64>,
    #[serde(alias = "pegRatio", deserialize_with = "de_opt_f64")]
    pub peg_ratio: Option<f64>,
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Single stock page
//
////////////////////////////////////////////////////////////////////////////////////////////////////

/// `pegscanner.single_stock_page.SingleStockPageResponse`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SingleStockPageResponse {
    pub stock: Option<Stock>,
    #[serde(alias = "dailyKline", deserialize_with = "de_null_default")]
    pub daily_kline: Vec<KLinePoint>,
    #[serde(deserialize_with = "de_null_default")]
    pub news: Vec<NewsItem>,
}

impl Message for SingleStockPageResponse {
    const NAME: &'static str = "pegscanner.single_stock_page.SingleStockPageResponse";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => r.message(
                Self::NAME,
                field,
                wire_type,
                self.stock.get_or_insert_with(Stock::default),
            )?,
            2 => {
                let mut point = KLinePoint::default();
                r.message(Self::NAME, field, wire_type, &mut point)?;
                self.daily_kline.push(point);
            }
            3 => {
                let mut item = NewsItem::default();
                r.message(Self::NAME, field, wire_type, &mut item)?;
                self.news.push(item);
            }
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

/// `pegscanner.stock.Stock`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Stock {
    #[serde(deserialize_with = "de_null_default")]
    pub symbol: String,
    #[serde(deserialize_with = "de_null_default")]
    pub name: String,
    #[serde(deserialize_with = "de_null_default")]
    pub exchange: String,
    #[serde(deserialize_with = "de_null_default")]
    pub currency: String,
    #[serde(alias = "companyInfo")]
    pub company_info: Option<CompanyInfo>,
}

impl Message for Stock {
    const NAME: &'static str = "pegscanner.stock.Stock";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.symbol = r.string(Self::NAME, field, wire_type)?,
            2 => self.name = r.string(Self::NAME, field, wire_type)?,
            3 => self.exchange = r.string(Self::NAME, field, wire_type)?,
            4 => self.currency = r.string(Self::NAME, field, wire_type)?,
            5 => r.message(
                Self::NAME,
                field,
                wire_type,
                self.company_info.get_or_insert_with(CompanyInfo::default),
            )?,
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

/// `pegscanner.stock.CompanyInfo`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CompanyInfo {
    #[serde(deserialize_with = "de_null_default")]
    pub symbol: String,
    #[serde(deserialize_with = "de_null_default")]
    pub description: String,
    #[serde(deserialize_with = "de_null_default")]
    pub sector: String,
    #[serde(deserialize_with = "de_null_default")]
    pub industry: String,
    pub valuation: Option<CompanyValuation>,
    pub indicators: Option<FinancialIndicators>,
}

impl Message for CompanyInfo {
    const NAME: &'static str = "pegscanner.stock.CompanyInfo";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.symbol = r.string(Self::NAME, field, wire_type)?,
            2 => self.description = r.string(Self::NAME, field, wire_type)?,
            3 => self.sector = r.string(Self::NAME, field, wire_type)?,
            4 => self.industry = r.string(Self::NAME, field, wire_type)?,
            5 => r.message(
                Self::NAME,
                field,
                wire_type,
                self.valuation.get_or_insert_with(CompanyValuation::default),
            )?,
            6 => r.message(
                Self::NAME,
                field,
                wire_type,
                self.indicators.get_or_insert_with(FinancialIndicators::default),
            )?,
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

/// `pegscanner.stock.CompanyValuation`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CompanyValuation {
    #[serde(alias = "psRatio", deserialize_with = "de_opt_f64")]
    pub ps_ratio: Option<f64>,
    #[serde(alias = "peRatio", deserialize_with = "de_opt_f64")]
    pub pe_ratio: Option<f64>,
    #[serde(alias = "pbRatio", deserialize_with = "de_opt_f64")]
    pub pb_ratio: Option<f64>,
}

impl Message for CompanyValuation {
    const NAME: &'static str = "pegscanner.stock.CompanyValuation";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.ps_ratio = Some(r.double(Self::NAME, field, wire_type)?),
            2 => self.pe_ratio = Some(r.double(Self::NAME, field, wire_type)?),
            3 => self.pb_ratio = Some(r.double(Self::NAME, field, wire_type)?),
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

/// `pegscanner.stock.FinancialIndicators`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct FinancialIndicators {
    #[serde(deserialize_with = "de_opt_f64")]
    pub eps: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub fcf: Option<f64>,
    #[serde(alias = "currentRatio", deserialize_with = "de_opt_f64")]
    pub current_ratio: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub roe: Option<f64>,
}

impl Message for FinancialIndicators {
    const NAME: &'static str = "pegscanner.stock.FinancialIndicators";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.eps = Some(r.double(Self::NAME, field, wire_type)?),
            2 => self.fcf = Some(r.double(Self::NAME, field, wire_type)?),
            3 => self.current_ratio = Some(r.double(Self::NAME, field, wire_type)?),
            4 => self.roe = Some(r.double(Self::NAME, field, wire_type)?),
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

/// `pegscanner.stock.KLinePoint`; one daily candle. `timestamp` is unix seconds.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct KLinePoint {
    #[serde(deserialize_with = "de_i64")]
    pub timestamp: i64,
    #[serde(deserialize_with = "de_opt_f64")]
    pub open: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub high: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub low: Option<f64>,
    #[serde(deserialize_with = "de_opt_f64")]
    pub close: Option<f64>,
    #[serde(deserialize_with = "de_opt_i64")]
    pub volume: Option<i64>,
}

impl Message for KLinePoint {
    const NAME: &'static str = "pegscanner.stock.KLinePoint";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.timestamp = r.int64(Self::NAME, field, wire_type)?,
            2 => self.open = Some(r.double(Self::NAME, field, wire_type)?),
            3 => self.high = Some(r.double(Self::NAME, field, wire_type)?),
            4 => self.low = Some(r.double(Self::NAME, field, wire_type)?),
            5 => self.close = Some(r.double(Self::NAME, field, wire_type)?),
            6 => self.volume = Some(r.int64(Self::NAME, field, wire_type)?),
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}

/// `pegscanner.stock.NewsItem`; `published_at` is unix seconds, `0` when unknown.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct NewsItem {
    #[serde(deserialize_with = "de_null_default")]
    pub title: String,
    #[serde(deserialize_with = "de_null_default")]
    pub url: String,
    #[serde(deserialize_with = "de_null_default")]
    pub source: String,
    #[serde(alias = "publishedAt", deserialize_with = "de_i64")]
    pub published_at: i64,
}

impl Message for NewsItem {
    const NAME: &'static str = "pegscanner.stock.NewsItem";

    fn merge_field(&mut self, field: u32, wire_type: WireType, r: &mut Reader<'_>) -> Result<()> {
        match field {
            1 => self.title = r.string(Self::NAME, field, wire_type)?,
            2 => self.url = r.string(Self::NAME, field, wire_type)?,
            3 => self.source = r.string(Self::NAME, field, wire_type)?,
            4 => self.published_at = r.int64(Self::NAME, field, wire_type)?,
            _ => r.skip(wire_type)?,
        }
        Ok(())
    }
}
