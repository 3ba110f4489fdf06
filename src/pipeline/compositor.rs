use fast_image_resize as fir;
use image::RgbaImage;
use rayon::prelude::*;
use thiserror::Error;

use crate::types::{ForegroundFrame, Frame};

#[derive(Debug, Error)]
pub enum CompositeError {
    #[error("foreground frame has no pixels ({width}x{height})")]
    EmptyFrame { width: u32, height: u32 },
    #[error("foreground buffer size mismatch: got {got}, expected {expected}")]
    SizeMismatch { got: usize, expected: usize },
    #[error("invalid image buffer: {0}")]
    Buffer(#[from] fir::ImageBufferError),
    #[error("background resize failed: {0}")]
    Resize(#[from] fir::ResizeError),
}

/// Latest person cutout, kept at the size of the frames the sensor delivers.
#[derive(Debug, Default)]
pub struct ForegroundBuffer {
    bgra: Vec<u8>,
    width: u32,
    height: u32,
}

impl ForegroundBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        if self.bgra.is_empty() {
            None
        } else {
            Some((self.width, self.height))
        }
    }

    /// Copies `frame` into the buffer, reallocating when its size changed.
    ///
    /// Returns `true` when the buffer was reallocated.
    pub fn write(&mut self, frame: &ForegroundFrame) -> Result<bool, CompositeError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(CompositeError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }
        let expected = (frame.width as usize)
            .saturating_mul(frame.height as usize)
            .saturating_mul(4);
        if frame.bgra.len() != expected {
            return Err(CompositeError::SizeMismatch {
                got: frame.bgra.len(),
                expected,
            });
        }

        let reallocated = self.dimensions() != Some((frame.width, frame.height));
        if reallocated {
            log::debug!(
                "allocating foreground buffer {}x{}",
                frame.width,
                frame.height
            );
            self.bgra = vec![0u8; expected];
            self.width = frame.width;
            self.height = frame.height;
        }
        self.bgra.copy_from_slice(&frame.bgra);

        Ok(reallocated)
    }
}

/// Blends the foreground cutout over `background`.
///
/// The background is stretched to the cutout size. Without a cutout the
/// background is returned unchanged.
pub fn composite(
    background: &RgbaImage,
    foreground: &ForegroundBuffer,
) -> Result<Frame, CompositeError> {
    let Some((width, height)) = foreground.dimensions() else {
        return Ok(Frame {
            rgba: background.as_raw().clone(),
            width: background.width(),
            height: background.height(),
        });
    };

    let mut rgba = resize_rgba(background, width, height)?;

    rgba.par_chunks_mut(4)
        .zip(foreground.bgra.par_chunks_exact(4))
        .for_each(|(dst, src)| {
            let alpha = src[3] as u32;
            let inv = 255 - alpha;
            // BGRA source onto RGBA destination
            dst[0] = blend(src[2], dst[0], alpha, inv);
            dst[1] = blend(src[1], dst[1], alpha, inv);
            dst[2] = blend(src[0], dst[2], alpha, inv);
            dst[3] = 255;
        });

    Ok(Frame {
        rgba,
        width,
        height,
    })
}

fn blend(src: u8, dst: u8, alpha: u32, inv: u32) -> u8 {
    ((src as u32 * alpha + dst as u32 * inv + 127) / 255) as u8
}

fn resize_rgba(image: &RgbaImage, width: u32, height: u32) -> Result<Vec<u8>, CompositeError> {
    if image.width() == width && image.height() == height {
        return Ok(image.as_raw().clone());
    }

    let src_image = fir::images::Image::from_vec_u8(
        image.width(),
        image.height(),
        image.as_raw().clone(),
        fir::PixelType::U8x4,
    )?;
    let mut dst_image = fir::images::Image::new(width, height, fir::PixelType::U8x4);
    let mut resizer = fir::Resizer::new();
    let resize_options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Interpolation(fir::FilterType::Bilinear));
    resizer.resize(&src_image, &mut dst_image, Some(&resize_options))?;

    Ok(dst_image.into_vec())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use image::Rgba;

    fn cutout(width: u32, height: u32, bgra: [u8; 4]) -> ForegroundFrame {
        ForegroundFrame {
            bgra: bgra.repeat((width * height) as usize),
            width,
            height,
            timestamp: Duration::ZERO,
        }
    }

    #[test]
    fn buffer_reallocates_only_on_size_change() {
        let mut buffer = ForegroundBuffer::new();
        assert_eq!(buffer.dimensions(), None);

        assert!(buffer.write(&cutout(4, 2, [0, 0, 0, 0])).unwrap());
        assert!(!buffer.write(&cutout(4, 2, [1, 2, 3, 4])).unwrap());
        assert!(buffer.write(&cutout(2, 2, [1, 2, 3, 4])).unwrap());
        assert_eq!(buffer.dimensions(), Some((2, 2)));
    }

    #[test]
    fn buffer_rejects_truncated_frames() {
        let mut buffer = ForegroundBuffer::new();
        let mut frame = cutout(4, 4, [0, 0, 0, 255]);
        frame.bgra.truncate(10);

        assert!(matches!(
            buffer.write(&frame),
            Err(CompositeError::SizeMismatch {
                got: 10,
                expected: 64
            })
        ));
        assert!(matches!(
            buffer.write(&cutout(0, 3, [0, 0, 0, 0])),
            Err(CompositeError::EmptyFrame { .. })
        ));
        assert_eq!(buffer.dimensions(), None);
    }

    #[test]
    fn background_passes_through_without_cutout() {
        let background = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));

        let frame = composite(&background, &ForegroundBuffer::new()).unwrap();

        assert_eq!((frame.width, frame.height), (3, 2));
        assert_eq!(&frame.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn opaque_pixels_replace_and_transparent_pixels_keep_background() {
        let background = RgbaImage::from_pixel(2, 1, Rgba([10, 20, 30, 255]));
        let mut buffer = ForegroundBuffer::new();
        let frame = ForegroundFrame {
            // BGRA: opaque red, then fully transparent
            bgra: vec![0, 0, 200, 255, 99, 99, 99, 0],
            width: 2,
            height: 1,
            timestamp: Duration::ZERO,
        };
        buffer.write(&frame).unwrap();

        let out = composite(&background, &buffer).unwrap();

        assert_eq!(out.rgba, vec![200, 0, 0, 255, 10, 20, 30, 255]);
    }

    #[test]
    fn half_alpha_mixes_evenly() {
        assert_eq!(blend(255, 0, 128, 127), 128);
        assert_eq!(blend(0, 200, 0, 255), 200);
    }

    #[test]
    fn background_is_stretched_to_cutout_size() {
        let background = RgbaImage::from_pixel(2, 2, Rgba([40, 80, 120, 255]));
        let mut buffer = ForegroundBuffer::new();
        buffer.write(&cutout(6, 4, [0, 0, 0, 0])).unwrap();

        let out = composite(&background, &buffer).unwrap();

        assert_eq!((out.width, out.height), (6, 4));
        assert_eq!(out.rgba.len(), 6 * 4 * 4);
        let expected = [40u8, 80, 120, 255];
        for px in out.rgba.chunks_exact(4) {
            for (got, want) in px.iter().zip(expected) {
                assert!(got.abs_diff(want) <= 1, "pixel {px:?} drifted from {expected:?}");
            }
        }
    }
}
