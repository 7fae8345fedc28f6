//! The scanner's client-side state and the controller that drives it.
//!
//! [`Scanner`] owns a [`ScannerSnapshot`] and is the only thing that mutates
//! it. Every fetch writes its own slots; a failing heartbeat never touches the
//! watchlist and vice versa.

use crate::api::{normalize_symbol, Backend};
use crate::error::Result;
use crate::view::{PegStock, PingIndicator, PingStatus, SingleStockPage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-only view of everything the UI shows.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScannerSnapshot {
    pub stocks: Vec<PegStock>,
    pub error: Option<String>,
    pub ping: Option<PingStatus>,
    pub ping_error: Option<String>,
    pub selected_symbol: Option<String>,
    pub single_stock: Option<SingleStockPage>,
    pub single_stock_error: Option<String>,
    pub is_loading: bool,
}

/// Tag handed out by [`Scanner::begin_single_stock()`]; the completion is only
/// applied while it still matches the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockRequest {
    pub symbol: String,
    pub generation: u64,
}

pub struct Scanner {
    backend: Arc<dyn Backend>,
    state: ScannerSnapshot,
    generation: u64,
}

impl Scanner {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: ScannerSnapshot::default(),
            generation: 0,
        }
    }

    pub fn snapshot(&self) -> &ScannerSnapshot {
        &self.state
    }

    pub fn ping_indicator(&self) -> PingIndicator {
        PingIndicator::from_slots(self.state.ping.as_ref(), self.state.ping_error.as_deref())
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////
    // heartbeat & watchlist

    pub fn apply_ping(&mut self, result: Result<PingStatus>) {
        match result {
            Ok(ping) => {
                debug!("backend alive: {} ({})", ping.message, ping.agent);
                self.state.ping = Some(ping);
                self.state.ping_error = None;
            }
            Err(e) => {
                warn!("ping failed: {e}");
                self.state.ping = None;
                self.state.ping_error = Some(e.to_string());
            }
        }
    }

    /// Store the watchlist; on success, select its first symbol if nothing is
    /// selected yet.
    pub fn apply_watchlist(&mut self, result: Result<Vec<PegStock>>) {
        match result {
            Ok(stocks) => {
                debug!("watchlist: {} stocks", stocks.len());
                self.state.stocks = stocks;
                self.state.error = None;
                self.ensure_selection();
            }
            Err(e) => {
                warn!("watchlist failed: {e}");
                self.state.stocks.clear();
                self.state.error = Some(e.to_string());
            }
        }
    }

    pub async fn refresh_ping(&mut self) {
        let result = self.backend.ping().await;
        self.apply_ping(result);
    }

    pub async fn refresh_watchlist(&mut self) {
        let result = self.backend.peg_stocks().await;
        self.apply_watchlist(result);
    }

    /// Heartbeat and watchlist, fetched concurrently.
    pub async fn refresh(&mut self) {
        let backend = Arc::clone(&self.backend);
        let (ping, stocks) = futures::join!(backend.ping(), backend.peg_stocks());
        self.apply_ping(ping);
        self.apply_watchlist(stocks);
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////
    // selection & detail page

    /// Select a symbol typed by the user. Blank input is ignored and returns
    /// `false`.
    pub fn select_symbol(&mut self, raw: &str) -> bool {
        match normalize_symbol(raw) {
            Some(symbol) => {
                debug!("selected {symbol}");
                self.state.selected_symbol = Some(symbol);
                true
            }
            None => false,
        }
    }

    /// Select the first watchlist entry when nothing is selected yet.
    pub fn ensure_selection(&mut self) {
        if self.state.selected_symbol.is_some() {
            return;
        }
        if let Some(first) = self.state.stocks.first() {
            debug!("auto-selected {}", first.symbol);
            self.state.selected_symbol = Some(first.symbol.clone());
        }
    }

    /// Start loading the selected symbol's page; `None` if nothing is selected.
    ///
    /// Any request begun earlier becomes stale.
    pub fn begin_single_stock(&mut self) -> Option<StockRequest> {
        let symbol = self.state.selected_symbol.clone()?;
        self.generation += 1;
        self.state.is_loading = true;
        self.state.single_stock_error = None;
        Some(StockRequest {
            symbol,
            generation: self.generation,
        })
    }

    /// Apply the outcome of `request`. Returns `false` (and changes nothing) if
    /// the request went stale in the meantime.
    pub fn complete_single_stock(
        &mut self,
        request: &StockRequest,
        result: Result<SingleStockPage>,
    ) -> bool {
        let current = request.generation == self.generation
            && self.state.selected_symbol.as_deref() == Some(request.symbol.as_str());
        if !current {
            debug!(
                "dropping stale {} response (generation {} != {})",
                request.symbol, request.generation, self.generation
            );
            return false;
        }

        self.state.is_loading = false;
        match result {
            Ok(page) => {
                self.state.single_stock = Some(page);
                self.state.single_stock_error = None;
            }
            Err(e) => {
                warn!("[{}] single stock page failed: {e}", request.symbol);
                self.state.single_stock = None;
                self.state.single_stock_error = Some(e.to_string());
            }
        }
        true
    }

    /// Fetch the page of the selected symbol, if any.
    pub async fn load_single_stock(&mut self) -> bool {
        let Some(request) = self.begin_single_stock() else {
            return false;
        };
        let result = self.backend.single_stock(&request.symbol).await;
        self.complete_single_stock(&request, result)
    }
}
