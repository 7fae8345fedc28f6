mod support;

use peg_scanner::api::{Backend, RestBackend};
use peg_scanner::{Error, Scanner};
use std::sync::Arc;
use peg_scanner::wire::testing::Writer;
use support::{closed_port, serve, Request, Response};

fn backend(base: &str) -> RestBackend {
    RestBackend::new(reqwest::Client::new(), &format!("{base}/api")).unwrap()
}

fn ping_body() -> Vec<u8> {
    let mut w = Writer::new();
    w.string(1, "pong")
        .string(2, "pegscanner-backend")
        .int64(3, 1_700_000_000_000);
    w.finish()
}

fn aapl_page() -> Vec<u8> {
    let mut valuation = Writer::new();
    valuation.double(2, 28.5);
    let mut info = Writer::new();
    info.string(1, "AAPL")
        .string(3, "Technology")
        .message(5, valuation);
    let mut stock = Writer::new();
    stock
        .string(1, "AAPL")
        .string(2, "Apple Inc.")
        .string(3, "NASDAQ")
        .string(4, "USD")
        .message(5, info);
    let mut kline = Writer::new();
    kline
        .int64(1, 1_700_000_000)
        .double(2, 189.0)
        .double(5, 190.5)
        .int64(6, 1_500_000);
    let mut news = Writer::new();
    news.string(1, "Apple ships")
        .string(2, "https://example.com/a")
        .string(3, "Reuters")
        .int64(4, 1_700_000_000);
    let mut w = Writer::new();
    w.message(1, stock).message(2, kline).message(3, news);
    w.finish()
}

fn router(req: &Request) -> Response {
    match (req.method.as_str(), req.path()) {
        ("GET", "/api/ping/") => Response::protobuf(ping_body()),
        ("GET", "/api/peg-stocks/") => Response::json(
            200,
            r#"[
                {"symbol": "aapl", "name": "Apple Inc.", "pe_ratio": 28.5, "earnings_growth": 0.12, "peg_ratio": 2.37},
                {"symbol": "MSFT", "pe_ratio": "31.0", "earnings_growth": null, "peg_ratio": null}
            ]"#,
        ),
        ("GET", "/api/single-stock-page/") if req.target.ends_with("symbol=AAPL") => {
            Response::protobuf(aapl_page())
        }
        ("GET", "/api/single-stock-page/") => Response::not_found(),
        _ => Response::json(500, r#"{"detail":"unexpected route"}"#),
    }
}

#[tokio::test]
async fn binary_ping_is_decoded() {
    let base = serve(router).await;
    let ping = backend(&base).ping().await.unwrap();
    assert_eq!(ping.message, "pong");
    assert_eq!(ping.agent, "pegscanner-backend");
    assert_eq!(ping.timestamp_ms, 1_700_000_000_000);
}

#[tokio::test]
async fn json_ping_is_accepted_too() {
    let base = serve(|_: &Request| {
        Response::json(200, r#"{"message":"pong","agent":"svc","timestamp_ms":42}"#)
    })
    .await;
    let ping = backend(&base).ping().await.unwrap();
    assert_eq!(ping.agent, "svc");
    assert_eq!(ping.timestamp_ms, 42);
}

#[tokio::test]
async fn watchlist_is_projected() {
    let base = serve(router).await;
    let stocks = backend(&base).peg_stocks().await.unwrap();
    assert_eq!(stocks.len(), 2);
    assert_eq!(stocks[0].symbol, "AAPL");
    assert_eq!(stocks[0].peg_ratio, Some(2.37));
    assert_eq!(stocks[1].name, "MSFT");
    assert_eq!(stocks[1].pe_ratio, Some(31.0));
    assert_eq!(stocks[1].earnings_growth, None);
}

#[tokio::test]
async fn single_stock_page_is_decoded() {
    let base = serve(router).await;
    let page = backend(&base).single_stock(" aapl ").await.unwrap();

    assert_eq!(page.stock.symbol, "AAPL");
    assert_eq!(page.stock.exchange, "NASDAQ");
    let info = page.stock.company_info.as_ref().unwrap();
    assert_eq!(info.sector, "Technology");
    assert_eq!(info.industry, "");
    let valuation = info.valuation.as_ref().unwrap();
    assert_eq!(valuation.pe_ratio, Some(28.5));
    assert_eq!(valuation.ps_ratio, None);
    assert_eq!(info.indicators, None);

    assert_eq!(page.daily_kline.len(), 1);
    assert_eq!(page.daily_kline[0].open, Some(189.0));
    assert_eq!(page.daily_kline[0].high, None);
    assert_eq!(page.daily_kline[0].volume, Some(1_500_000));
    assert_eq!(page.news[0].source, "Reuters");
    assert_eq!(page.news[0].published_at, Some(1_700_000_000));
}

#[tokio::test]
async fn unknown_symbol_is_not_found() {
    let base = serve(router).await;
    let err = backend(&base).single_stock("ZZZZ").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "Stock ZZZZ not found");
}

#[tokio::test]
async fn blank_symbol_never_reaches_the_server() {
    let base = serve(|_: &Request| -> Response { panic!("no request expected") }).await;
    let err = backend(&base).single_stock("  ").await.unwrap_err();
    assert!(matches!(err, Error::InvalidSymbol));
}

#[tokio::test]
async fn truncated_binary_payload_is_a_decode_error() {
    let base = serve(|_: &Request| {
        let mut body = ping_body();
        body.truncate(5);
        Response::protobuf(body)
    })
    .await;
    let err = backend(&base).ping().await.unwrap_err();
    assert!(matches!(err, Error::Decode { .. }), "{err:?}");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let base = closed_port().await;
    let err = backend(&base).ping().await.unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "{err:?}");
}

#[tokio::test]
async fn scanner_over_rest() {
    let base = serve(router).await;
    let mut scanner = Scanner::new(Arc::new(backend(&base)));

    scanner.refresh().await;
    assert!(scanner.snapshot().ping.is_some());
    assert_eq!(scanner.snapshot().selected_symbol.as_deref(), Some("AAPL"));

    scanner.load_single_stock().await;
    let snap = scanner.snapshot();
    assert_eq!(snap.single_stock.as_ref().unwrap().stock.name, "Apple Inc.");
    assert_eq!(snap.single_stock_error, None);
    assert!(!snap.is_loading);

    scanner.select_symbol("ZZZZ");
    scanner.load_single_stock().await;
    let snap = scanner.snapshot();
    assert_eq!(snap.single_stock, None);
    assert_eq!(snap.single_stock_error.as_deref(), Some("Stock ZZZZ not found"));
}

#[tokio::test]
async fn watchlist_server_error_leaves_stocks_empty() {
    let base = serve(|req: &Request| match req.path() {
        "/api/ping/" => Response::protobuf(ping_body()),
        _ => Response::json(500, r#"{"detail":"database unavailable"}"#),
    })
    .await;
    let mut scanner = Scanner::new(Arc::new(backend(&base)));
    scanner.refresh().await;

    let snap = scanner.snapshot();
    assert!(snap.stocks.is_empty());
    let error = snap.error.as_deref().unwrap();
    assert!(error.contains("500"), "{error}");
    assert!(error.ends_with(": database unavailable"), "{error}");
    assert!(snap.ping.is_some());
    assert_eq!(snap.selected_symbol, None);
}
