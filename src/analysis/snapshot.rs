//! Converts an uploaded image into a self-contained payload the results view
//! can render without touching the original file.

use std::io::Cursor;

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use thiserror::Error;

/// Longest edge of the stored preview, in pixels.
pub const SNAPSHOT_MAX_EDGE: u32 = 512;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to decode uploaded image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image snapshot: {0}")]
    Encode(#[source] image::ImageError),
}

/// Decodes `bytes`, downsizes the image if needed and returns a PNG data URL.
pub fn encode_snapshot(bytes: &[u8]) -> Result<String, SnapshotError> {
    let image = image::load_from_memory(bytes).map_err(SnapshotError::Decode)?;

    let image = if image.width() > SNAPSHOT_MAX_EDGE || image.height() > SNAPSHOT_MAX_EDGE {
        image.thumbnail(SNAPSHOT_MAX_EDGE, SNAPSHOT_MAX_EDGE)
    } else {
        image
    };

    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(SnapshotError::Encode)?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(png)))
}

/// [`encode_snapshot`] on Tokio's blocking pool, so decoding a large photo
/// does not stall the executor.
pub async fn build_snapshot(bytes: Vec<u8>) -> anyhow::Result<String> {
    let snapshot = tokio::task::spawn_blocking(move || encode_snapshot(&bytes))
        .await
        .context("snapshot worker join failed")??;
    Ok(snapshot)
}
