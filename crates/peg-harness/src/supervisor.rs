//! Long-running child processes (dev servers) with an explicit lifecycle:
//!
//! ```text
//! Starting ──ready──> Ready ──stop──> Stopped
//!    │                  │
//!    └──exit/timeout──> Failed
//! ```

use crate::error::{HarnessError, Result};
use crate::readiness::{wait_until, Poll, Readiness};
use reqwest::Client;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessState {
    Starting,
    Ready,
    Failed(String),
    Stopped,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Starting => write!(f, "starting"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

pub struct SupervisedProcess {
    name: String,
    child: Child,
    state: ProcessState,
}

impl SupervisedProcess {
    /// Spawn `cmd` in its own process group (on Unix), so that stopping it
    /// also stops whatever it forks (`npx` -> `nx` -> `uvicorn`, ...).
    pub fn spawn(name: &str, mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::null()).kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let child = cmd.spawn().map_err(|source| HarnessError::Spawn {
            name: name.to_string(),
            source,
        })?;
        info!("[{name}] started (pid {:?})", child.id());

        Ok(Self {
            name: name.to_string(),
            child,
            state: ProcessState::Starting,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// Fail if the process has exited on its own.
    pub fn check_alive(&mut self) -> Result<()> {
        if self.state == ProcessState::Stopped {
            return Ok(());
        }
        match self.child.try_wait()? {
            None => Ok(()),
            Some(status) => {
                let status = status.to_string();
                error!("[{}] exited prematurely ({status})", self.name);
                self.state = ProcessState::Failed(format!("exited prematurely ({status})"));
                Err(HarnessError::Exited {
                    name: self.name.clone(),
                    status,
                })
            }
        }
    }

    /// Poll `url` until it answers, moving to `Ready`; a timeout or an early
    /// exit moves to `Failed`.
    ///
    /// Can be called again on a `Ready` process to re-verify it.
    pub async fn wait_ready(
        &mut self,
        client: &Client,
        url: &str,
        readiness: Readiness,
        poll: Poll,
    ) -> Result<()> {
        let outcome = wait_until(client, url, readiness, poll, || self.check_alive()).await;
        match &outcome {
            Ok(()) => {
                info!("[{}] reachable at {url}", self.name);
                self.state = ProcessState::Ready;
            }
            Err(HarnessError::Exited { .. }) => {}
            Err(e) => {
                error!("[{}] {e}", self.name);
                self.state = ProcessState::Failed(e.to_string());
            }
        }
        outcome
    }

    /// SIGTERM the process group, give it `grace` to exit, then kill.
    pub async fn stop(&mut self, grace: Duration) {
        if self.state == ProcessState::Stopped {
            return;
        }
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!("[{}] already exited ({status})", self.name);
            self.state = ProcessState::Stopped;
            return;
        }

        self.terminate().await;
        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => debug!("[{}] exited ({status})", self.name),
            Ok(Err(e)) => warn!("[{}] failed to reap: {e}", self.name),
            Err(_) => {
                warn!("[{}] still running after {grace:?}, killing", self.name);
                if let Err(e) = self.child.kill().await {
                    warn!("[{}] kill failed: {e}", self.name);
                }
            }
        }
        info!("[{}] stopped", self.name);
        self.state = ProcessState::Stopped;
    }

    #[cfg(unix)]
    async fn terminate(&mut self) {
        let Some(pid) = self.child.id() else {
            return;
        };
        // negative pid: the whole group
        let result = Command::new("kill")
            .arg("-TERM")
            .arg("--")
            .arg(format!("-{pid}"))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match result {
            Ok(status) if status.success() => debug!("[{}] sent SIGTERM to group {pid}", self.name),
            Ok(status) => debug!("[{}] kill -TERM -{pid}: {status}", self.name),
            Err(e) => warn!("[{}] failed to run kill: {e}", self.name),
        }
    }

    #[cfg(not(unix))]
    async fn terminate(&mut self) {
        if let Err(e) = self.child.start_kill() {
            warn!("[{}] failed to kill: {e}", self.name);
        }
    }
}

/// Run `cmd` to completion; a non-zero exit is a [`HarnessError::StepFailed`].
pub async fn run_step(step: &str, mut cmd: Command) -> Result<()> {
    info!("[step] {step}");
    let status = cmd
        .stdin(Stdio::null())
        .status()
        .await
        .map_err(|source| HarnessError::Spawn {
            name: step.to_string(),
            source,
        })?;
    if status.success() {
        Ok(())
    } else {
        error!("[step] {step} failed ({status})");
        Err(HarnessError::StepFailed {
            step: step.to_string(),
            status: status.to_string(),
        })
    }
}
