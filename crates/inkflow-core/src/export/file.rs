//! File-based export sink for native platforms.

use super::{BoxFuture, EncodedImage, ExportError, ExportResult, ExportSink};
use std::fs;
use std::path::PathBuf;

/// Writes exported images into a directory.
///
/// The destination is used as the file stem; the extension comes from the
/// image format.
pub struct FileSink {
    /// Base directory for exported images.
    base_path: PathBuf,
}

impl FileSink {
    /// Create a new file sink with the given base directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: PathBuf) -> ExportResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(|e| {
                ExportError::Io(format!("Failed to create export directory: {}", e))
            })?;
        }
        Ok(Self { base_path })
    }

    /// Create a file sink in the default location.
    ///
    /// On Unix: `~/.local/share/inkflow/exports/`
    /// On Windows: `%LOCALAPPDATA%\inkflow\exports\`
    pub fn default_location() -> ExportResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| ExportError::Io("Could not determine home directory".to_string()))?;

        Self::new(base.join("inkflow").join("exports"))
    }

    /// Get the file path for a destination name.
    pub fn image_path(&self, destination: &str, image: &EncodedImage) -> PathBuf {
        // Sanitize the name to be safe for filenames
        let safe_name: String = destination
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_path
            .join(format!("{}.{}", safe_name, image.format.extension()))
    }

    /// Get the base path.
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl ExportSink for FileSink {
    fn write(&self, destination: &str, image: &EncodedImage) -> BoxFuture<'_, ExportResult<()>> {
        let path = self.image_path(destination, image);
        let bytes = image.bytes.clone();

        Box::pin(async move {
            fs::write(&path, bytes).map_err(|e| {
                ExportError::Io(format!("Failed to write {}: {}", path.display(), e))
            })?;
            log::debug!("Wrote export to {}", path.display());
            Ok(())
        })
    }
}
