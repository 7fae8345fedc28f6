use crate::error::{HarnessError, Result};
use crate::ui::wait_spinner;
use peg_util::Util;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, trace};

/// What counts as "up" for a polled URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Any 2xx.
    Success,
    /// Anything short of a 5xx; Neo4j answers its HTTP root with redirects
    /// and 401s long before it's usable for anything else.
    BelowServerError,
}

impl Readiness {
    pub fn accepts(self, status: StatusCode) -> bool {
        match self {
            Self::Success => status.is_success(),
            Self::BelowServerError => status.as_u16() < 500,
        }
    }
}

/// Poll cadence and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Poll {
    pub interval: Duration,
    pub timeout: Duration,
}

/// One probe of `url`; connection failures count as "not ready".
pub async fn is_ready(client: &Client, url: &str, readiness: Readiness) -> bool {
    match client.probe(url).await {
        Some(status) => {
            trace!("{url} -> {status}");
            readiness.accepts(status)
        }
        None => false,
    }
}

/// Poll `url` until it's ready, or fail with [`HarnessError::Timeout`].
pub async fn wait_for_url(client: &Client, url: &str, readiness: Readiness, poll: Poll) -> Result<()> {
    wait_until(client, url, readiness, poll, || Ok(())).await
}

/// As [`wait_for_url()`], checking `alive` before every probe so a crashed
/// process fails the wait right away instead of at the deadline.
pub(crate) async fn wait_until<F>(
    client: &Client,
    url: &str,
    readiness: Readiness,
    poll: Poll,
    mut alive: F,
) -> Result<()>
where
    F: FnMut() -> Result<()>,
{
    let pb = wait_spinner(format!("waiting for {url}"));
    let start = Instant::now();

    let outcome = loop {
        if let Err(e) = alive() {
            break Err(e);
        }
        if is_ready(client, url, readiness).await {
            debug!("{url} ready after {:?}", start.elapsed());
            break Ok(());
        }
        if start.elapsed() >= poll.timeout {
            break Err(HarnessError::Timeout {
                url: url.to_string(),
                waited: poll.timeout,
            });
        }
        sleep(poll.interval).await;
    };

    pb.finish_and_clear();
    outcome
}
