use crate::error::AppError;
use crate::models::tryon_types::SharePayload;
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;

/// Host capabilities used by the result actions.
pub trait Platform {
    /// Writes `bytes` under `file_name` in the host's download location.
    fn save_file(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = Result<PathBuf, AppError>> + Send;

    fn supports_native_share(&self) -> bool;

    fn share_native(
        &self,
        payload: &SharePayload,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn copy_to_clipboard(&self, text: &str) -> Result<(), AppError>;
}

/// Desktop host: files go to a directory, sharing falls back to the
/// system clipboard.
#[derive(Debug, Clone)]
pub struct DesktopPlatform {
    download_dir: PathBuf,
}

impl DesktopPlatform {
    pub fn new(download_dir: PathBuf) -> Self {
        Self { download_dir }
    }
}

impl Platform for DesktopPlatform {
    async fn save_file(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.download_dir)
            .await
            .map_err(|e| {
                AppError::platform(format!(
                    "Failed to create directory {}: {}",
                    self.download_dir.display(),
                    e
                ))
            })?;

        let dest = self.download_dir.join(file_name);
        tokio::fs::write(&dest, bytes).await.map_err(|e| {
            AppError::platform(format!("Failed to write {}: {}", dest.display(), e))
        })?;
        debug!(path = %dest.display(), "saved file");
        Ok(dest)
    }

    fn supports_native_share(&self) -> bool {
        false
    }

    async fn share_native(&self, _payload: &SharePayload) -> Result<(), AppError> {
        Err(AppError::platform("Native sharing is not available"))
    }

    fn copy_to_clipboard(&self, text: &str) -> Result<(), AppError> {
        let mut clipboard = arboard::Clipboard::new()?;
        clipboard.set_text(text.to_string())?;
        Ok(())
    }
}
