//! In-memory export sink.

use super::{BoxFuture, EncodedImage, ExportError, ExportResult, ExportSink};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory sink for testing and ephemeral use.
#[derive(Default)]
pub struct MemorySink {
    images: RwLock<HashMap<String, EncodedImage>>,
}

impl MemorySink {
    /// Create a new empty memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the image written under `destination`.
    pub fn get(&self, destination: &str) -> Option<EncodedImage> {
        self.images.read().ok()?.get(destination).cloned()
    }

    /// Destinations written so far.
    pub fn destinations(&self) -> Vec<String> {
        self.images
            .read()
            .map(|images| images.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.images.read().map(|images| images.is_empty()).unwrap_or(true)
    }
}

impl ExportSink for MemorySink {
    fn write(&self, destination: &str, image: &EncodedImage) -> BoxFuture<'_, ExportResult<()>> {
        let destination = destination.to_string();
        let image = image.clone();
        Box::pin(async move {
            let mut images = self
                .images
                .write()
                .map_err(|e| ExportError::Sink(format!("Lock error: {}", e)))?;
            images.insert(destination, image);
            Ok(())
        })
    }
}
