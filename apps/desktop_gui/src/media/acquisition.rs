//! Turns a file-picker selection into an upload payload plus a local preview.
//!
//! Nothing here touches the network. The [`LocalImageHandle`] for the current
//! selection is owned by [`ImageAcquisition`] and dropped as soon as a newer
//! selection replaces it or the acquisition itself goes away.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use client_core::ImagePayload;
use shared::domain::PreviewId;
use tracing::debug;

use super::{decode_preview_image, is_previewable_image, PreviewImage};

const PREVIEW_MAX_DIMENSION: u32 = 512;

/// What the workflow state remembers about the image on screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRef {
    pub id: PreviewId,
    pub file_name: String,
}

pub struct LocalImageHandle {
    preview_id: PreviewId,
    path: PathBuf,
    file_name: String,
    size_bytes: u64,
    thumbnail: Option<PreviewImage>,
    texture: Option<egui::TextureHandle>,
}

impl LocalImageHandle {
    pub fn preview_ref(&self) -> PreviewRef {
        PreviewRef {
            id: self.preview_id,
            file_name: self.file_name.clone(),
        }
    }

    pub fn preview_id(&self) -> PreviewId {
        self.preview_id
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    /// Uploads the thumbnail on first use. `None` when the file could not be decoded.
    pub fn texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        if self.texture.is_none() {
            let thumbnail = self.thumbnail.as_ref()?;
            self.texture = Some(ctx.load_texture(
                format!("local_preview_{}", self.preview_id),
                thumbnail.to_color_image(),
                egui::TextureOptions::LINEAR,
            ));
        }
        self.texture.as_ref()
    }
}

impl Drop for LocalImageHandle {
    fn drop(&mut self) {
        debug!(preview_id = %self.preview_id, path = %self.path.display(), "released local preview");
    }
}

pub struct ImageAcquisition {
    next_preview: PreviewId,
    current: Option<LocalImageHandle>,
}

impl Default for ImageAcquisition {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageAcquisition {
    pub fn new() -> Self {
        Self {
            next_preview: PreviewId(1),
            current: None,
        }
    }

    /// Handles one file-selection event.
    ///
    /// `None` (picker cancelled) is a no-op and returns `Ok(None)`. A selected
    /// file is read in full, becomes the current preview and is returned as an
    /// upload payload together with its [`PreviewRef`]. Read failures leave the
    /// current preview untouched.
    pub fn select(&mut self, selection: Option<PathBuf>) -> Result<Option<(ImagePayload, PreviewRef)>> {
        let Some(path) = selection else {
            return Ok(None);
        };

        let bytes = fs::read(&path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime_type = mime_guess::from_path(&path).first_raw().map(str::to_string);

        let thumbnail = if is_previewable_image(&path) {
            match decode_preview_image(&bytes, PREVIEW_MAX_DIMENSION) {
                Ok(thumbnail) => Some(thumbnail),
                Err(err) => {
                    debug!(path = %path.display(), %err, "preview decode failed; uploading anyway");
                    None
                }
            }
        } else {
            None
        };

        let preview_id = self.next_preview;
        self.next_preview = preview_id.next();

        let handle = LocalImageHandle {
            preview_id,
            path,
            file_name: file_name.clone(),
            size_bytes: bytes.len() as u64,
            thumbnail,
            texture: None,
        };
        let preview = handle.preview_ref();
        self.current = Some(handle);

        Ok(Some((
            ImagePayload {
                file_name,
                mime_type,
                bytes,
            },
            preview,
        )))
    }

    pub fn current_mut(&mut self) -> Option<&mut LocalImageHandle> {
        self.current.as_mut()
    }
}
