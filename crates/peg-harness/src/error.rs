use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to spawn {name}: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {}s waiting for {url}", .waited.as_secs())]
    Timeout { url: String, waited: Duration },

    #[error("{name} exited prematurely ({status})")]
    Exited { name: String, status: String },

    #[error("{step} failed ({status})")]
    StepFailed { step: String, status: String },

    #[error("{command} failed{}", suffix(.stderr))]
    Docker { command: String, stderr: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarnessError>;

fn suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}
