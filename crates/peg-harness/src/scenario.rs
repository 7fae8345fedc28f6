//! The two regression scenarios.
//!
//! Both follow the same shape: start what's needed, wait for it, run the
//! checks, and always tear everything down again, whatever happened.

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::neo4j::Neo4jContainer;
use crate::readiness::{Poll, Readiness};
use crate::supervisor::{run_step, SupervisedProcess};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Neo4j + backend + web dev server all come up and stay up.
    Infra,
    /// Production web build served by `vite preview`, checked with Playwright.
    WebE2e,
}

impl Scenario {
    pub fn name(self) -> &'static str {
        match self {
            Self::Infra => "infra",
            Self::WebE2e => "web-e2e",
        }
    }

    pub async fn run(self, config: &HarnessConfig) -> Result<()> {
        let mut run = Run::new(config)?;
        let outcome = match self {
            Self::Infra => run.check_infra().await,
            Self::WebE2e => run.web_e2e().await,
        };
        run.shutdown().await;

        match &outcome {
            Ok(()) => info!("[{}] regression case passed", self.name()),
            Err(e) => error!("[{}] regression failed: {e}", self.name()),
        }
        outcome
    }
}

/// Everything started during one scenario, so it can be torn down in one go.
struct Run<'a> {
    config: &'a HarnessConfig,
    client: Client,
    processes: Vec<SupervisedProcess>,
    neo4j: Option<Neo4jContainer>,
}

impl<'a> Run<'a> {
    fn new(config: &'a HarnessConfig) -> Result<Self> {
        let client = peg_util::build_client("pegscanner-regression", Duration::from_secs(5))?;
        Ok(Self {
            config,
            client,
            processes: Vec::new(),
            neo4j: None,
        })
    }

    fn http_poll(&self) -> Poll {
        Poll {
            interval: self.config.poll_interval,
            timeout: self.config.http_timeout,
        }
    }

    fn npx(&self, dir: &Path, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.config.npx_bin);
        cmd.args(args).current_dir(dir);
        cmd
    }

    /// Spawn a long-running process and return its index in `processes`.
    fn supervise(&mut self, name: &str, cmd: Command) -> Result<usize> {
        let process = SupervisedProcess::spawn(name, cmd)?;
        self.processes.push(process);
        Ok(self.processes.len() - 1)
    }

    async fn wait_ready(&mut self, index: usize, url: &str) -> Result<()> {
        let poll = self.http_poll();
        self.processes[index]
            .wait_ready(&self.client, url, Readiness::Success, poll)
            .await
    }

    fn check_all_alive(&mut self) -> Result<()> {
        self.processes
            .iter_mut()
            .try_for_each(SupervisedProcess::check_alive)
    }

    ////////////////////////////////////////////////////////////////////////////////////////////////
    // scenarios

    async fn check_infra(&mut self) -> Result<()> {
        let config = self.config;

        info!("[infra] starting Neo4j container");
        let neo4j = Neo4jContainer::start(config).await?;
        // registered before waiting, so a timeout still removes the container
        let neo4j = self.neo4j.insert(neo4j);
        neo4j.wait_ready(&self.client).await?;

        info!("[infra] starting backend server");
        let backend = self.supervise("backend", self.npx(&config.root, &["nx", "run", "backend:start"]))?;
        self.wait_ready(backend, &config.graphql_url).await?;
        info!("[infra] backend reachable");

        info!("[infra] starting web (Vite) server");
        let web = self.supervise("web", self.npx(&config.root, &["nx", "run", "mobile:serve"]))?;
        let web_url = config.web_url();
        self.wait_ready(web, &web_url).await?;
        info!("[infra] web bundle reachable at {web_url}");

        info!("[infra] verifying backend again");
        self.wait_ready(backend, &config.graphql_url).await?;
        self.check_all_alive()
    }

    async fn web_e2e(&mut self) -> Result<()> {
        let config = self.config;
        let mobile = config.mobile_dir();

        if let Some(cache) = config.vite_cache_dir().to_str() {
            peg_util::remove_dir_quiet(cache).await;
        }

        let backend = self.supervise("backend", self.npx(&config.root, &["nx", "run", "backend:start"]))?;
        run_step("vite build", self.npx(&mobile, &["vite", "build"])).await?;
        self.wait_ready(backend, &config.ping_url()).await?;

        let port = config.web_port.to_string();
        let preview = self.supervise(
            "preview",
            self.npx(
                &mobile,
                &["vite", "preview", "--host", config.web_host.as_str(), "--port", port.as_str()],
            ),
        )?;
        self.wait_ready(preview, &config.web_url()).await?;

        run_step(
            "playwright install",
            self.npx(&mobile, &["playwright", "install", "chromium"]),
        )
        .await?;

        let mut tests = self.npx(&mobile, &["playwright", "test"]);
        tests.env("MOBILE_WEB_PORT", &port);
        run_step("playwright test", tests).await?;
        self.check_all_alive()
    }

    /// Stop every process (newest first) and remove the container.
    async fn shutdown(&mut self) {
        let grace = self.config.grace;
        while let Some(mut process) = self.processes.pop() {
            process.stop(grace).await;
        }
        if let Some(mut neo4j) = self.neo4j.take() {
            neo4j.stop().await;
        }
    }
}
