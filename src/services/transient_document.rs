use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::{fs::OpenOptions, io::AsyncWriteExt};
use url::Url;
use uuid::Uuid;

use crate::domain::HtmlFragment;

/// A fragment written out as a standalone HTML file for the duration of one
/// extraction. The file is removed by `discard` and again on drop.
pub struct TransientDocument {
    path: PathBuf,
}

impl TransientDocument {
    pub async fn create_in(dir: &Path, fragment: &HtmlFragment) -> io::Result<Self> {
        let path = dir.join(format!("feedreap-{}.html", Uuid::new_v4()));
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        // From here on the file exists, so drop must be able to clean it up.
        let document = TransientDocument { path };

        file.write_all(fragment.to_document().as_bytes()).await?;
        file.flush().await?;

        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> io::Result<Url> {
        let absolute = std::path::absolute(&self.path)?;
        Url::from_file_path(&absolute).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} cannot be expressed as a file URL", absolute.display()),
            )
        })
    }

    /// Removes the file. Missing files and removal errors are not reported
    /// to the caller.
    pub async fn discard(&self) {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => log::warn!(
                "Failed to remove transient document {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}

impl Drop for TransientDocument {
    fn drop(&mut self) {
        _ = std::fs::remove_file(&self.path);
    }
}
