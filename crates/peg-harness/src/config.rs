use dotenv::var;
use std::path::PathBuf;
use std::time::Duration;

/// Regression harness configuration, read from the environment.
///
/// Variable names match the ones the regression scripts have always used, so
/// an existing `.env` keeps working.
#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Workspace root of the application under test (`PEGSCANNER_ROOT`).
    pub root: PathBuf,

    // Neo4j container
    pub docker_bin: String,
    pub neo4j_container: String,
    pub neo4j_http_port: u16,
    pub neo4j_bolt_port: u16,
    pub neo4j_auth: String,
    pub neo4j_image: String,
    pub neo4j_data_dir: PathBuf,
    /// `SKIP_NEO4J_CONTAINER=1`: assume an external Neo4j is already running.
    pub skip_neo4j: bool,

    // dev servers
    /// Launcher for the JS tooling (`NPX_BIN`).
    pub npx_bin: String,
    pub web_host: String,
    pub web_port: u16,
    pub graphql_url: String,
    pub api_base: String,

    // timing
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub neo4j_timeout: Duration,
    pub grace: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl HarnessConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| {
            lookup(name)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let str_or = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());
        let port_or = |name: &str, default: u16| {
            get(name).and_then(|s| s.parse().ok()).unwrap_or(default)
        };

        let root = PathBuf::from(str_or("PEGSCANNER_ROOT", "."));
        let neo4j_data_dir = get("NEO4J_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| root.join("x-data").join("neo4j"));

        Self {
            docker_bin: str_or("DOCKER_BIN", "docker"),
            neo4j_container: str_or("NEO4J_CONTAINER", "pegscanner_regression_neo4j"),
            neo4j_http_port: port_or("NEO4J_HTTP_PORT", 7474),
            neo4j_bolt_port: port_or("NEO4J_BOLT_PORT", 7687),
            neo4j_auth: str_or("NEO4J_AUTH", "neo4j/pegscanner"),
            neo4j_image: str_or("NEO4J_DOCKER_IMAGE", "neo4j:5"),
            neo4j_data_dir,
            skip_neo4j: get("SKIP_NEO4J_CONTAINER").as_deref() == Some("1"),
            npx_bin: str_or("NPX_BIN", "npx"),
            web_host: str_or("MOBILE_WEB_HOST", "127.0.0.1"),
            web_port: port_or("MOBILE_WEB_PORT", 5173),
            graphql_url: str_or("PEGSCANNER_GRAPHQL_URL", "http://127.0.0.1:8000/graphql"),
            api_base: str_or("PEGSCANNER_API_BASE", "http://127.0.0.1:8000/api"),
            root,
            poll_interval: Duration::from_secs(1),
            http_timeout: Duration::from_secs(45),
            neo4j_timeout: Duration::from_secs(60),
            grace: Duration::from_secs(1),
        }
    }

    pub fn web_url(&self) -> String {
        format!("http://{}:{}/", self.web_host, self.web_port)
    }

    pub fn neo4j_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.neo4j_http_port)
    }

    pub fn ping_url(&self) -> String {
        format!("{}/ping/", self.api_base.trim_end_matches('/'))
    }

    pub fn mobile_dir(&self) -> PathBuf {
        self.root.join("apps").join("mobile")
    }

    pub fn vite_cache_dir(&self) -> PathBuf {
        self.mobile_dir().join("node_modules").join(".vite")
    }
}
