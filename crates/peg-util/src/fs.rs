use anyhow::Result;
use tracing::{debug, warn};

/// Reads a whole file from `path` into memory.
///
/// ```rust,no_run
/// # async fn example() -> anyhow::Result<()> {
/// let bytes = peg_util::read_bytes("./buffer/ping.bin").await?;
/// # Ok(())
/// # }
/// ```
pub async fn read_bytes(path: &str) -> Result<Vec<u8>> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        anyhow::anyhow!("failed to read {path}: {e}")
    })?;
    debug!("read {} bytes from {path}", bytes.len());
    Ok(bytes)
}

/// Removes the directory at `path`, if it exists; failures are logged and
/// otherwise ignored.
pub async fn remove_dir_quiet(path: &str) {
    match tokio::fs::remove_dir_all(path).await {
        Ok(_) => debug!("removed {path}"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("failed to remove {path}: {e}"),
    }
}
