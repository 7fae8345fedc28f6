//! Regression harness: boots the Neo4j container and the dev servers as
//! supervised processes, waits for them, runs the checks and tears it all down.

pub mod config;
pub mod error;
pub mod neo4j;
pub mod readiness;
pub mod scenario;
pub mod supervisor;
pub mod ui;

pub use config::HarnessConfig;
pub use error::{HarnessError, Result};
pub use scenario::Scenario;
pub use supervisor::{ProcessState, SupervisedProcess};
