pub mod client_ext;
pub mod fs;

pub use crate::client_ext::util::{ClientUtilExt as Util, Payload};
pub use crate::fs::{read_bytes, remove_dir_quiet};

/// Build the shared [`reqwest::Client`] used by every crate in the workspace.
pub fn build_client(user_agent: &str, timeout: std::time::Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::ClientBuilder::new()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}
