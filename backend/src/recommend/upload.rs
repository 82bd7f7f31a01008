use actix_multipart::{Multipart, MultipartError};
use futures::{StreamExt, TryStreamExt};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Multipart field the storefront uploads the query image under.
pub const IMAGE_FIELD: &str = "image";

/// Where uploads are spooled and how large they may get.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,
    #[error("File too large")]
    TooLarge,
    #[error("Malformed upload: {0}")]
    Multipart(String),
    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MultipartError> for UploadError {
    fn from(err: MultipartError) -> Self {
        match err {
            // A request that isn't multipart at all carries no file.
            MultipartError::ContentTypeMissing
            | MultipartError::ContentTypeParse
            | MultipartError::ContentTypeIncompatible => UploadError::MissingFile,
            other => UploadError::Multipart(other.to_string()),
        }
    }
}

/// Uploaded file spooled to disk. The file is removed by `cleanup`, or on drop
/// if `cleanup` never ran.
#[derive(Debug)]
pub struct TempUpload {
    path: PathBuf,
    file_name: String,
    content_type: Option<String>,
    removed: bool,
}

impl TempUpload {
    pub(crate) fn new(path: PathBuf, file_name: String, content_type: Option<String>) -> Self {
        Self {
            path,
            file_name,
            content_type,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Deletes the file. Safe to call more than once; failures are only logged.
    pub async fn cleanup(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => log::info!("Deleted temporary file: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::error!("Error deleting temporary file {}: {}", self.path.display(), e),
        }
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::info!("Deleted temporary file on drop: {}", self.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::error!("Error deleting temporary file {}: {}", self.path.display(), e),
        }
    }
}

/// Spools the first file sent under `image` into `upload_dir`. Other fields are skipped.
pub async fn receive_image(
    payload: &mut Multipart,
    upload_dir: &Path,
    max_bytes: usize,
) -> Result<TempUpload, UploadError> {
    while let Some(mut field) = payload.try_next().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let Some(original_name) = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(str::to_string)
        else {
            continue;
        };

        let extension = Path::new(&original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext))
            .unwrap_or_default();
        let path = upload_dir.join(format!("{}{}", Uuid::new_v4(), extension));
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut upload = TempUpload::new(path, original_name, content_type);
        if let Err(e) = spool(&mut field, upload.path(), max_bytes).await {
            upload.cleanup().await;
            return Err(e);
        }

        log::info!(
            "Stored upload {} at {}",
            upload.file_name(),
            upload.path().display()
        );
        return Ok(upload);
    }

    Err(UploadError::MissingFile)
}

async fn spool(
    field: &mut actix_multipart::Field,
    path: &Path,
    max_bytes: usize,
) -> Result<(), UploadError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0usize;

    while let Some(chunk) = field.next().await {
        let data = chunk?;
        written += data.len();
        if written > max_bytes {
            log::warn!("Upload exceeded {} bytes, rejecting", max_bytes);
            return Err(UploadError::TooLarge);
        }
        file.write_all(&data).await?;
    }

    file.flush().await?;
    Ok(())
}
