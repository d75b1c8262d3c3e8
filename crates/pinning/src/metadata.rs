// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::{PinningError, PinningService};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// ERC-721 metadata attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraitAttribute {
    pub trait_type: String,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(u64),
    Text(String),
}

impl TraitAttribute {
    pub fn number(trait_type: &str, value: u64) -> Self {
        Self {
            trait_type: trait_type.to_string(),
            value: AttributeValue::Number(value),
        }
    }
}

/// Token metadata as stored behind `tokenURI`. Missing fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub attributes: Vec<TraitAttribute>,
}

/// An image ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: &str, mime: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime: mime.to_string(),
            bytes,
        }
    }

    /// Read an image, guessing its mime type from the extension
    pub fn from_path(path: &Path) -> Result<Self, PinningError> {
        let bytes = std::fs::read(path).map_err(|source| PinningError::Image {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let mime = mime_for(path).to_string();
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

/// Content ids and public url of an uploaded token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedMetadata {
    pub image_hash: String,
    pub metadata_hash: String,
    pub metadata_url: String,
}

/// Pin the image, then pin metadata pointing at it
pub async fn upload_nft_metadata(
    service: &dyn PinningService,
    name: &str,
    description: &str,
    image: ImageFile,
    attributes: Vec<TraitAttribute>,
) -> Result<UploadedMetadata, PinningError> {
    info!("Uploading image to Pinata...");
    let image_pin = service
        .pin_file(&image.file_name, &image.mime, image.bytes)
        .await?;

    let metadata = TokenMetadata {
        name: name.to_string(),
        description: description.to_string(),
        image: service.gateway().url_for(&image_pin.cid),
        attributes,
    };

    info!("Uploading metadata to Pinata...");
    let content = serde_json::to_value(&metadata)?;
    let metadata_pin = service.pin_json("metadata.json", &content).await?;

    Ok(UploadedMetadata {
        metadata_url: service.gateway().url_for(&metadata_pin.cid),
        image_hash: image_pin.cid,
        metadata_hash: metadata_pin.cid,
    })
}
