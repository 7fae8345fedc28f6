use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::readiness::{wait_for_url, Poll, Readiness};
use reqwest::Client;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// The throwaway Neo4j container the backend talks to during a regression run.
#[derive(Debug)]
pub struct Neo4jContainer {
    config: HarnessConfig,
    started: bool,
}

impl Neo4jContainer {
    /// Replace any leftover container of the same name and start a fresh one.
    /// With `SKIP_NEO4J_CONTAINER=1` nothing is started.
    pub async fn start(config: &HarnessConfig) -> Result<Self> {
        let mut container = Self {
            config: config.clone(),
            started: false,
        };
        if config.skip_neo4j {
            info!("[neo4j] SKIP_NEO4J_CONTAINER=1, assuming an external Neo4j");
            return Ok(container);
        }

        info!("[neo4j] ensuring container {} is running", config.neo4j_container);
        tokio::fs::create_dir_all(&config.neo4j_data_dir).await?;
        container.remove().await;
        docker(config, &run_args(config), Stdio::null()).await?;
        container.started = true;
        Ok(container)
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Neo4j's HTTP root answers with a redirect or a 401 once the server is up.
    pub async fn wait_ready(&self, client: &Client) -> Result<()> {
        if self.config.skip_neo4j {
            return Ok(());
        }
        let poll = Poll {
            interval: self.config.poll_interval,
            timeout: self.config.neo4j_timeout,
        };
        wait_for_url(client, &self.config.neo4j_url(), Readiness::BelowServerError, poll).await
    }

    pub async fn stop(&mut self) {
        if !self.started {
            return;
        }
        info!("[neo4j] stopping container {}", self.config.neo4j_container);
        self.remove().await;
        self.started = false;
    }

    async fn remove(&self) {
        let args = ["rm", "-f", self.config.neo4j_container.as_str()].map(String::from);
        if let Err(e) = docker(&self.config, &args, Stdio::null()).await {
            // nothing to remove is the common case
            debug!("[neo4j] {e}");
        }
    }
}

/// `docker run` arguments for the regression container.
pub fn run_args(config: &HarnessConfig) -> Vec<String> {
    vec![
        "run".to_string(),
        "-d".to_string(),
        "--name".to_string(),
        config.neo4j_container.clone(),
        "-p".to_string(),
        format!("{}:7474", config.neo4j_http_port),
        "-p".to_string(),
        format!("{}:7687", config.neo4j_bolt_port),
        "-v".to_string(),
        format!("{}:/data", absolute(&config.neo4j_data_dir)),
        "-e".to_string(),
        format!("NEO4J_AUTH={}", config.neo4j_auth),
        "-e".to_string(),
        "NEO4J_PLUGINS=[]".to_string(),
        config.neo4j_image.clone(),
    ]
}

// docker wants an absolute host path for bind mounts
fn absolute(path: &Path) -> String {
    if path.is_absolute() {
        return path.display().to_string();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}

async fn docker(config: &HarnessConfig, args: &[String], stdout: Stdio) -> Result<()> {
    let command = format!("{} {}", config.docker_bin, args.join(" "));
    debug!("{command}");
    let output = Command::new(&config.docker_bin)
        .args(args)
        .stdin(Stdio::null())
        .stdout(stdout)
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| HarnessError::Spawn {
            name: config.docker_bin.clone(),
            source,
        })?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{command} failed: {stderr}");
        Err(HarnessError::Docker { command, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn config(docker_bin: &str) -> HarnessConfig {
        HarnessConfig {
            docker_bin: docker_bin.to_string(),
            neo4j_data_dir: std::env::temp_dir()
                .join(format!("peg-harness-neo4j-{}", std::process::id())),
            ..HarnessConfig::default()
        }
    }

    #[test]
    fn run_arguments() {
        let config = HarnessConfig {
            neo4j_data_dir: PathBuf::from("/var/lib/neo4j"),
            neo4j_http_port: 17474,
            ..HarnessConfig::default()
        };
        assert_eq!(
            run_args(&config),
            [
                "run",
                "-d",
                "--name",
                "pegscanner_regression_neo4j",
                "-p",
                "17474:7474",
                "-p",
                "7687:7687",
                "-v",
                "/var/lib/neo4j:/data",
                "-e",
                "NEO4J_AUTH=neo4j/pegscanner",
                "-e",
                "NEO4J_PLUGINS=[]",
                "neo4j:5",
            ]
        );
    }

    #[tokio::test]
    async fn start_and_stop_with_a_docker_that_always_succeeds() {
        let config = config("true");
        let mut container = Neo4jContainer::start(&config).await.unwrap();
        assert!(container.started());
        assert!(config.neo4j_data_dir.is_dir());

        container.stop().await;
        assert!(!container.started());
        std::fs::remove_dir_all(&config.neo4j_data_dir).ok();
    }

    #[tokio::test]
    async fn docker_run_failure_is_reported() {
        let config = config("false");
        let err = Neo4jContainer::start(&config).await.unwrap_err();
        assert!(matches!(err, HarnessError::Docker { .. }), "{err:?}");
        std::fs::remove_dir_all(&config.neo4j_data_dir).ok();
    }

    #[tokio::test]
    async fn skip_starts_nothing() {
        let config = HarnessConfig {
            docker_bin: "false".to_string(),
            skip_neo4j: true,
            ..HarnessConfig::default()
        };
        let container = Neo4jContainer::start(&config).await.unwrap();
        assert!(!container.started());
        container.wait_ready(&Client::new()).await.unwrap();
    }
}
