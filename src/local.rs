use camino::Utf8Path;
use serde::Serialize;

use crate::checksum::ContentHasher;
use crate::error::SyncError;

#[derive(Debug, Clone, Serialize)]
pub struct LocalFileStatus {
    pub filename: String,
    pub exists: bool,
    pub digest: Option<String>,
}

/// Report the on-disk state of one expected file. Pure read: existence
/// plus a digest when the file is present.
pub fn inspect(
    dir: &Utf8Path,
    filename: &str,
    hasher: &impl ContentHasher,
) -> Result<LocalFileStatus, SyncError> {
    let path = dir.join(filename);
    if !path.as_std_path().is_file() {
        return Ok(LocalFileStatus {
            filename: filename.to_string(),
            exists: false,
            digest: None,
        });
    }
    let digest = hasher.digest_file(path.as_std_path())?;
    Ok(LocalFileStatus {
        filename: filename.to_string(),
        exists: true,
        digest: Some(digest),
    })
}
