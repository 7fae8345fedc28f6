//! Plain-text rendering of the scanner state.

use colored::Colorize;
use peg_scanner::format::{
    format_number, format_percent, format_timestamp, format_volume, or_placeholder,
};
use peg_scanner::view::{PingIndicator, PingState, SingleStockPage};
use peg_scanner::ScannerSnapshot;
use std::fmt::Write;

const KLINE_ROWS: usize = 5;
const NEWS_ROWS: usize = 3;

pub fn ping(indicator: &PingIndicator) -> String {
    let dot = match indicator.status {
        PingState::Checking => "●".yellow(),
        PingState::Ok => "●".green(),
        PingState::Error => "●".red(),
    };
    format!("{dot} {}", indicator.label)
}

pub fn watchlist(snapshot: &ScannerSnapshot) -> String {
    let mut out = String::new();
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "{}", format!("Error: {error}").red());
        let _ = writeln!(out, "{}", "Please make sure the backend server is running.".red());
        return out;
    }
    if snapshot.stocks.is_empty() {
        let _ = writeln!(out, "{}", "No PEG watchlist data available yet.".dimmed());
        return out;
    }

    let _ = writeln!(
        out,
        "{}",
        format!("  {:<8} {:<32} {:>8} {:>8} {:>10}", "SYMBOL", "NAME", "PEG", "P/E", "GROWTH").bold()
    );
    for stock in &snapshot.stocks {
        let selected = snapshot.selected_symbol.as_deref() == Some(stock.symbol.as_str());
        let marker = if selected { ">" } else { " " };
        let line = format!(
            "{marker} {:<8} {:<32} {:>8} {:>8} {:>10}",
            stock.symbol,
            truncate(&stock.name, 32),
            format_number(stock.peg_ratio, 2),
            format_number(stock.pe_ratio, 2),
            format_percent(stock.earnings_growth),
        );
        let _ = writeln!(out, "{}", if selected { line.cyan() } else { line.normal() });
    }
    out
}

/// The single stock section: symbol, loading/error status and the page itself.
pub fn single_stock(snapshot: &ScannerSnapshot) -> String {
    let mut out = String::new();
    if let Some(symbol) = &snapshot.selected_symbol {
        let _ = writeln!(out, "Symbol: {symbol}");
    }
    if snapshot.is_loading {
        let _ = writeln!(out, "{}", "Loading data…".dimmed());
    }
    if let Some(error) = &snapshot.single_stock_error {
        let _ = writeln!(out, "{}", format!("Single stock error: {error}").red());
    }
    match &snapshot.single_stock {
        Some(page) if !snapshot.is_loading => out.push_str(&stock_page(page)),
        _ => {}
    }
    out
}

pub fn stock_page(page: &SingleStockPage) -> String {
    let mut out = String::new();
    let stock = &page.stock;
    let _ = writeln!(out, "{}  {}", stock.symbol.bold(), stock.name);
    let _ = writeln!(out, "{} · {}", stock.exchange, stock.currency);

    let info = stock.company_info.as_ref();
    if let Some(info) = info {
        let _ = writeln!(out, "Sector: {}", or_placeholder(&info.sector));
        let _ = writeln!(out, "Industry: {}", or_placeholder(&info.industry));
        let description = if info.description.trim().is_empty() {
            "No description yet."
        } else {
            info.description.as_str()
        };
        let _ = writeln!(out, "{}", description.dimmed());
    }

    let valuation = info.and_then(|i| i.valuation.as_ref());
    let indicators = info.and_then(|i| i.indicators.as_ref());
    let _ = writeln!(
        out,
        "P/S {}  P/E {}  P/B {}",
        format_number(valuation.and_then(|v| v.ps_ratio), 2),
        format_number(valuation.and_then(|v| v.pe_ratio), 2),
        format_number(valuation.and_then(|v| v.pb_ratio), 2),
    );
    let _ = writeln!(
        out,
        "EPS {}  FCF {}  ROE {}",
        format_number(indicators.and_then(|i| i.eps), 2),
        format_number(indicators.and_then(|i| i.fcf), 2),
        format_percent(indicators.and_then(|i| i.roe)),
    );

    let _ = writeln!(out, "\n{}", "Recent Daily K-Line".bold());
    if page.daily_kline.is_empty() {
        let _ = writeln!(out, "{}", "No K-line data available yet.".dimmed());
    }
    for row in page.daily_kline.iter().take(KLINE_ROWS) {
        let _ = writeln!(
            out,
            "{}  O {} · C {} · V {}",
            format_timestamp(Some(row.timestamp)),
            format_number(row.open, 2),
            format_number(row.close, 2),
            format_volume(row.volume.map(|v| v as f64)),
        );
    }

    let _ = writeln!(out, "\n{}", "News".bold());
    if page.news.is_empty() {
        let _ = writeln!(
            out,
            "{}",
            "News feed not ingested yet. This is a placeholder.".dimmed()
        );
    }
    for item in page.news.iter().take(NEWS_ROWS) {
        let _ = writeln!(out, "{}", item.title);
        let _ = writeln!(
            out,
            "  {} · {}",
            or_placeholder(&item.source),
            format_timestamp(item.published_at)
        );
    }
    out
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width - 1).collect();
        cut.push('…');
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use peg_scanner::view::{CompanyInfo, KLinePoint, NewsItem, PegStock, StockSummary, Valuation};

    fn plain() {
        colored::control::set_override(false);
    }

    fn stock(symbol: &str, peg: Option<f64>) -> PegStock {
        PegStock {
            symbol: symbol.to_string(),
            name: format!("{symbol} Inc."),
            pe_ratio: Some(28.456),
            earnings_growth: Some(0.1234),
            peg_ratio: peg,
        }
    }

    #[test]
    fn watchlist_marks_the_selection() {
        plain();
        let snapshot = ScannerSnapshot {
            stocks: vec![stock("AAPL", Some(2.3)), stock("MSFT", None)],
            selected_symbol: Some("MSFT".to_string()),
            ..ScannerSnapshot::default()
        };
        let out = watchlist(&snapshot);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("  AAPL"));
        assert!(lines[1].contains("2.30"));
        assert!(lines[1].contains("28.46"));
        assert!(lines[1].contains("12.34%"));
        assert!(lines[2].starts_with("> MSFT"));
        assert!(lines[2].contains("—"));
    }

    #[test]
    fn watchlist_error_and_empty() {
        plain();
        let snapshot = ScannerSnapshot {
            error: Some("request failed".to_string()),
            ..ScannerSnapshot::default()
        };
        assert!(watchlist(&snapshot).starts_with("Error: request failed"));
        assert_eq!(
            watchlist(&ScannerSnapshot::default()).trim(),
            "No PEG watchlist data available yet."
        );
    }

    #[test]
    fn stock_page_with_missing_values() {
        plain();
        let page = SingleStockPage {
            stock: StockSummary {
                symbol: "AAPL".to_string(),
                name: "Apple Inc.".to_string(),
                exchange: "NASDAQ".to_string(),
                currency: "USD".to_string(),
                company_info: Some(CompanyInfo {
                    symbol: "AAPL".to_string(),
                    description: String::new(),
                    sector: "Technology".to_string(),
                    industry: String::new(),
                    valuation: Some(Valuation {
                        ps_ratio: None,
                        pe_ratio: Some(28.5),
                        pb_ratio: None,
                    }),
                    indicators: None,
                }),
            },
            daily_kline: vec![KLinePoint {
                timestamp: 1_700_000_000,
                open: Some(189.0),
                high: None,
                low: None,
                close: Some(190.5),
                volume: Some(1_500_000),
            }],
            news: vec![NewsItem {
                title: "Apple ships".to_string(),
                url: String::new(),
                source: "Reuters".to_string(),
                published_at: None,
            }],
        };
        let out = stock_page(&page);
        assert!(out.contains("Sector: Technology"));
        assert!(out.contains("Industry: —"));
        assert!(out.contains("No description yet."));
        assert!(out.contains("P/S —  P/E 28.50  P/B —"));
        assert!(out.contains("EPS —  FCF —  ROE —"));
        assert!(out.contains("2023-11-14  O 189.00 · C 190.50 · V 1.5M"));
        assert!(out.contains("  Reuters · —"));
    }

    #[test]
    fn loading_hides_the_page() {
        plain();
        let snapshot = ScannerSnapshot {
            selected_symbol: Some("AAPL".to_string()),
            is_loading: true,
            ..ScannerSnapshot::default()
        };
        let out = single_stock(&snapshot);
        assert!(out.contains("Symbol: AAPL"));
        assert!(out.contains("Loading data…"));
    }

    #[test]
    fn ping_line() {
        plain();
        let indicator = PingIndicator::from_slots(None, Some("connection refused"));
        assert_eq!(
            ping(&indicator),
            "● Backend status error: connection refused"
        );
    }

    #[test]
    fn long_names_are_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 5), "abcd…");
    }
}
