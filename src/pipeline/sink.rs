use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use image::{ExtendedColorType, ImageFormat};

use crate::types::Frame;

/// Receives composited frames for display.
pub trait FrameSink {
    fn present(&mut self, frame: &Frame) -> Result<()>;
}

/// Writes every presented frame as a numbered PNG.
pub struct PngSink {
    dir: PathBuf,
    written: usize,
}

impl PngSink {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        Ok(Self {
            dir: dir.to_path_buf(),
            written: 0,
        })
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameSink for PngSink {
    fn present(&mut self, frame: &Frame) -> Result<()> {
        let path = self.dir.join(format!("frame_{:03}.png", self.written));
        image::save_buffer_with_format(
            &path,
            &frame.rgba,
            frame.width,
            frame.height,
            ExtendedColorType::Rgba8,
            ImageFormat::Png,
        )
        .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
        self.written += 1;
        Ok(())
    }
}
