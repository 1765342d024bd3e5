//! Photo loading and embedding
//!
//! A chosen photo is decoded, downscaled and re-encoded as a self-contained
//! `data:image/png;base64,...` URL so the card never refers back to the file.

use std::io::Cursor;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, GenericImageView, ImageFormat};
use serde::{Deserialize, Deserializer, Serialize};

use crate::color_space::Rgb;
use crate::error::{CardError, Result};

/// Longest edge of an embedded photo, in pixels
pub const MAX_PHOTO_DIMENSION: u32 = 512;

const PNG_PREFIX: &str = "data:image/png;base64,";

/// Embeddable photo as a data URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmbeddedPhoto(String);

/// Cards read from disk carry their photo inline; one that does not decode
/// is rejected with the card.
impl<'de> Deserialize<'de> for EmbeddedPhoto {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let url = String::deserialize(deserializer)?;
        Self::from_data_url(url).map_err(serde::de::Error::custom)
    }
}

impl EmbeddedPhoto {
    /// Downscale and encode an already decoded image.
    pub fn from_image(image: &DynamicImage) -> Result<Self> {
        let scaled = if image.width() > MAX_PHOTO_DIMENSION || image.height() > MAX_PHOTO_DIMENSION
        {
            image.thumbnail(MAX_PHOTO_DIMENSION, MAX_PHOTO_DIMENSION)
        } else {
            image.clone()
        };

        let mut bytes = Vec::new();
        scaled.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

        Ok(Self(format!("{}{}", PNG_PREFIX, STANDARD.encode(&bytes))))
    }

    /// Read a photo from disk and embed it.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !is_supported_format(path) {
            return Err(CardError::InvalidPhoto(format!(
                "unsupported file type: {}",
                path.display()
            )));
        }
        let img = load_image(path)?;
        Self::from_image(&img)
    }

    /// Wrap an existing data URL after checking that it decodes.
    pub fn from_data_url(url: impl Into<String>) -> Result<Self> {
        let photo = Self(url.into());
        photo.decode()?;
        Ok(photo)
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }

    /// Decode back into pixels for display or export.
    pub fn decode(&self) -> Result<DynamicImage> {
        let (header, payload) = self
            .0
            .split_once(',')
            .ok_or_else(|| CardError::InvalidPhoto("missing data URL header".to_string()))?;

        if !header.starts_with("data:image/") || !header.ends_with(";base64") {
            return Err(CardError::InvalidPhoto(format!(
                "unexpected header: {}",
                header
            )));
        }

        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| CardError::InvalidPhoto(e.to_string()))?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// Load an image from a file path
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    Ok(image::open(path)?)
}

/// Get supported image format extensions
pub fn supported_extensions() -> &'static [&'static str] {
    &["png", "jpg", "jpeg", "gif", "webp"]
}

/// Check if a file extension is a supported image format
pub fn is_supported_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            supported_extensions().iter().any(|&e| e == ext_lower)
        })
        .unwrap_or(false)
}

/// Sample an image into half-block cells: each cell carries the colour of
/// its upper and lower pixel, so one terminal row shows two image rows.
pub fn half_block_cells(image: &DynamicImage, columns: usize, rows: usize) -> Vec<Vec<(Rgb, Rgb)>> {
    let (columns, rows) = fit_cells(image, columns.max(1), rows.max(1));
    let pixel_rows = rows * 2;

    let resized = image.resize_exact(
        columns as u32,
        pixel_rows as u32,
        image::imageops::FilterType::Triangle,
    );

    (0..pixel_rows)
        .step_by(2)
        .map(|y| {
            (0..columns)
                .map(|x| {
                    let top = resized.get_pixel(x as u32, y as u32);
                    let bottom = if y + 1 < pixel_rows {
                        resized.get_pixel(x as u32, (y + 1) as u32)
                    } else {
                        top
                    };
                    (
                        Rgb::new(top[0], top[1], top[2]),
                        Rgb::new(bottom[0], bottom[1], bottom[2]),
                    )
                })
                .collect()
        })
        .collect()
}

/// Largest cell grid inside `columns` x `rows` keeping the aspect ratio.
/// Terminal cells are about twice as tall as wide; half-blocks cancel that.
fn fit_cells(image: &DynamicImage, columns: usize, rows: usize) -> (usize, usize) {
    let (w, h) = image.dimensions();
    let aspect = w.max(1) as f32 / h.max(1) as f32;

    let height_for_width = ((columns as f32 / aspect) / 2.0).round() as usize;
    if height_for_width <= rows {
        (columns, height_for_width.max(1))
    } else {
        let width_for_height = (rows as f32 * 2.0 * aspect).round() as usize;
        (width_for_height.clamp(1, columns), rows)
    }
}
