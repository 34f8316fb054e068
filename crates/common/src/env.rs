//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected paths exist at startup.

/// Ensure the parent directory of the session file exists.
pub async fn ensure_env(session_path: &str) -> anyhow::Result<()> {
    if let Some(parent) = std::path::Path::new(session_path).parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
