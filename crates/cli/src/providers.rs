//! Headless device-capability providers
//!
//! The CLI has no camera or GPS; coordinates come from flags and the
//! photo from a file on disk.

use async_trait::async_trait;
use habitleague_core::{Coordinate, Error, Result};
use habitleague_engine::{CapturedImage, LocationProvider, MediaProvider};
use std::path::PathBuf;

/// Location provider returning a coordinate given on the command line
pub struct FixedLocationProvider(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_location(&self) -> Result<Coordinate> {
        Ok(self.0)
    }
}

/// Media provider reading the evidence photo from a file
pub struct FileMediaProvider {
    path: PathBuf,
}

impl FileMediaProvider {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl MediaProvider for FileMediaProvider {
    async fn acquire_image(&self) -> Result<Option<CapturedImage>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::InvalidData(format!("Cannot read image {}: {}", self.path.display(), e))
        })?;

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "evidence.jpg".to_string());

        Ok(Some(CapturedImage {
            local_uri: format!("file://{}", self.path.display()),
            file_name,
            bytes,
        }))
    }
}
