use crate::error::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tracing::{debug, trace};

/// Write `data` as pretty JSON to `path`, creating parent directories as
/// necessary.
pub async fn write_json<T: Serialize>(path: impl AsRef<Path>, data: &T) -> Result<()> {
    let path = path.as_ref();

    // ensure the directory exists
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        trace!("checking directory path: {dir:?}");
        tokio::fs::create_dir_all(dir).await?;
    }

    let bytes = serde_json::to_vec_pretty(data)?;
    tokio::fs::write(path, &bytes).await?;
    debug!("{} bytes written to {}", bytes.len(), path.display());

    Ok(())
}

/// Reads a `.json` file from `path`.
pub async fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    trace!("reading file path: {}", path.display());
    let file = tokio::fs::read(path).await?;
    trace!("file read; deserializing bytes ...");
    let data: T = serde_json::from_slice(&file)?;
    Ok(data)
}
