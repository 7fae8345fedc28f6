use crate::error::{Error, Result};
use dotenv::var;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_GRAPHQL_URL: &str = "http://127.0.0.1:8000/graphql";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which backend revision to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transport {
    /// REST JSON for the watchlist, binary (or JSON) for ping & single stock page.
    #[default]
    Rest,
    Graphql,
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "graphql" => Ok(Self::Graphql),
            other => Err(Error::Config(format!(
                "unknown transport {other:?}; expected \"rest\" or \"graphql\""
            ))),
        }
    }
}

/// Everything needed to reach a backend; built once at startup and handed to
/// [`crate::api::connect()`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base: String,
    pub graphql_url: String,
    pub transport: Transport,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            transport: Transport::default(),
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Read the configuration from the environment (and `.env`, if loaded).
    ///
    /// | variable                  | default                         |
    /// |---------------------------|---------------------------------|
    /// | `PEGSCANNER_API_BASE`     | `http://127.0.0.1:8000/api`     |
    /// | `PEGSCANNER_GRAPHQL_URL`  | `http://127.0.0.1:8000/graphql` |
    /// | `PEGSCANNER_TRANSPORT`    | `rest`                          |
    /// | `USER_AGENT`              | `pegscanner-client/<version>`   |
    /// | `PEGSCANNER_TIMEOUT_SECS` | `10`                            |
    pub fn from_env() -> Result<Self> {
        let transport = match env_str("PEGSCANNER_TRANSPORT") {
            Some(t) => t.parse()?,
            None => Transport::default(),
        };
        let timeout = match env_str("PEGSCANNER_TIMEOUT_SECS") {
            Some(secs) => secs.parse::<u64>().map_err(|e| {
                Error::Config(format!("PEGSCANNER_TIMEOUT_SECS={secs:?}: {e}"))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_base: env_str("PEGSCANNER_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            graphql_url: env_str("PEGSCANNER_GRAPHQL_URL")
                .unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string()),
            transport,
            user_agent: env_str("USER_AGENT").unwrap_or_else(default_user_agent),
            timeout: Duration::from_secs(timeout),
        })
    }
}

fn default_user_agent() -> String {
    format!("pegscanner-client/{}", env!("CARGO_PKG_VERSION"))
}

fn env_str(name: &str) -> Option<String> {
    var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
