use std::path::{Path, PathBuf};

use tokio::fs;

use crate::error::{Error, Result};

pub const UPLOADS_ROUTE: &str = "/uploads";

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Local image storage backing `/uploads`.
#[derive(Clone)]
pub struct MediaService {
    root: PathBuf,
}

impl MediaService {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the bytes under a fresh name and returns the public path.
    pub async fn save_image(&self, data: &[u8], extension: &str) -> Result<String> {
        let ext = extension.trim_start_matches('.').to_lowercase();
        if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
            return Err(Error::BadRequest(format!(
                "File type .{} is not allowed",
                ext
            )));
        }
        if data.is_empty() {
            return Err(Error::BadRequest("Empty image".into()));
        }

        fs::create_dir_all(&self.root).await?;
        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        fs::write(self.root.join(&file_name), data).await.map_err(|e| {
            tracing::error!(error = %e, "failed to write image file");
            Error::Io(e)
        })?;

        Ok(format!("{}/{}", UPLOADS_ROUTE, file_name))
    }

    /// Deletes a file previously returned by `save_image`. Only the final
    /// path component is honoured, so nothing outside the root is touched.
    pub async fn remove(&self, public_url: &str) -> Result<()> {
        let Some(file_name) = Path::new(public_url).file_name() else {
            return Err(Error::BadRequest(format!("Not a stored file: {}", public_url)));
        };
        fs::remove_file(self.root.join(file_name)).await?;
        Ok(())
    }

    /// Saves an upload whose extension is taken from the client file name.
    pub async fn save_upload(&self, file_name: &str, data: &[u8]) -> Result<String> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        self.save_image(data, ext).await
    }
}

/// Guesses an extension from magic bytes; LINE content responses carry no
/// file name.
pub fn sniff_image_extension(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "png"
    } else if data.starts_with(b"GIF8") {
        "gif"
    } else {
        "jpg"
    }
}
