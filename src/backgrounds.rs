use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::types::SwipeGesture;

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Debug, Error)]
pub enum BackgroundError {
    #[error("no background images available")]
    Empty,
    #[error("background index {index} out of range (have {count})")]
    OutOfRange { index: usize, count: usize },
    #[error("button label {0:?} is not a background number")]
    InvalidLabel(String),
    #[error("failed to read background directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to load background image {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// A numbered on-screen button selecting one background.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackgroundButton {
    pub name: String,
    pub label: String,
}

pub struct BackgroundCarousel {
    images: Vec<RgbaImage>,
    position: usize,
}

impl BackgroundCarousel {
    pub fn new(images: Vec<RgbaImage>) -> Result<Self, BackgroundError> {
        if images.is_empty() {
            return Err(BackgroundError::Empty);
        }
        Ok(Self {
            images,
            position: 0,
        })
    }

    /// Loads every supported image in `dir`, ordered by file name.
    pub fn load_dir(dir: &Path) -> Result<Self, BackgroundError> {
        let read_dir_err = |source| BackgroundError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir_err)? {
            let path = entry.map_err(read_dir_err)?.path();
            if is_supported_image(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut images = Vec::with_capacity(paths.len());
        for path in paths {
            let image = image::open(&path)
                .map_err(|source| BackgroundError::Decode {
                    path: path.clone(),
                    source,
                })?
                .to_rgba8();
            log::info!(
                "loaded background {} ({}x{})",
                path.display(),
                image.width(),
                image.height()
            );
            images.push(image);
        }

        Self::new(images)
    }

    /// Built-in gradient backdrops for running without image files.
    pub fn placeholders(count: usize, width: u32, height: u32) -> Result<Self, BackgroundError> {
        let images = (0..count)
            .map(|i| {
                let hue = (i * 255 / count.max(1)) as u8;
                RgbaImage::from_fn(width, height, |_, y| {
                    let shade = (y * 255 / height.max(1)) as u8;
                    Rgba([hue, 255 - hue, shade, 255])
                })
            })
            .collect();
        Self::new(images)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current(&self) -> &RgbaImage {
        &self.images[self.position]
    }

    pub fn next(&mut self) -> usize {
        self.position = (self.position + 1) % self.images.len();
        self.position
    }

    pub fn prev(&mut self) -> usize {
        self.position = self
            .position
            .checked_sub(1)
            .unwrap_or(self.images.len() - 1);
        self.position
    }

    pub fn select(&mut self, index: usize) -> Result<usize, BackgroundError> {
        if index >= self.images.len() {
            return Err(BackgroundError::OutOfRange {
                index,
                count: self.images.len(),
            });
        }
        self.position = index;
        Ok(index)
    }

    pub fn buttons(&self) -> Vec<BackgroundButton> {
        (1..=self.images.len())
            .map(|number| BackgroundButton {
                name: format!("button_{number}"),
                label: number.to_string(),
            })
            .collect()
    }

    /// Selects the background shown on the button with `label` (1-based).
    pub fn press(&mut self, label: &str) -> Result<usize, BackgroundError> {
        let number: usize = label
            .trim()
            .parse()
            .map_err(|_| BackgroundError::InvalidLabel(label.to_string()))?;
        let index = number
            .checked_sub(1)
            .ok_or_else(|| BackgroundError::InvalidLabel(label.to_string()))?;
        self.select(index)
    }

    pub fn apply(&mut self, gesture: SwipeGesture) -> usize {
        match gesture {
            SwipeGesture::SwipeToLeft => self.prev(),
            SwipeGesture::SwipeToRight => self.next(),
        }
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
        .unwrap_or(false)
}
