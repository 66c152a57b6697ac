//! In-memory image representation with explicit color metadata.
//!
//! A [`ColorImage`] is a row-major pixel grid backed by an
//! `ndarray::Array3<f32>` with axes `[height, width, channels]`. The color
//! space, channel order, and bit depth are tracked alongside the buffer so
//! that every conversion in the pipeline is explicit. The buffer is never
//! mutated after construction: transforms consume an image by value and
//! return a new one, which keeps concurrent enhancement of different images
//! free of locking.

use std::io;
use std::path::Path;

use ndarray::{Array3, Axis};
use plotters::prelude::*;
use rayon::prelude::*;

use super::color;

/// Color space of the pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// Gamma-encoded sRGB family data.
    Rgb,
    /// CIELAB: lightness in channel 0, chroma in channels 1 and 2.
    Lab,
}

/// Channel order of RGB-family data. Lab images always use the canonical
/// L, a, b order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Representable range of the pixel values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    /// 8-bit levels stored as floats in [0, 255].
    Eight,
    /// Normalized floats in [0, 1].
    Unit,
}

impl BitDepth {
    /// Maximum representable channel value for this depth.
    pub fn max_value(&self) -> f32 {
        match self {
            BitDepth::Eight => 255.0,
            BitDepth::Unit => 1.0,
        }
    }
}

/// A color image with explicitly tracked metadata.
///
/// # Examples
///
/// ```
/// use lowlight_enhance_core::ColorImage;
///
/// let bytes = vec![0u8; 4 * 4 * 3];
/// let image = ColorImage::from_rgb8(&bytes, 4, 4);
/// assert_eq!((image.height(), image.width(), image.channels()), (4, 4, 3));
/// ```
#[derive(Debug, Clone)]
pub struct ColorImage {
    data: Array3<f32>,
    color_space: ColorSpace,
    channel_order: ChannelOrder,
    bit_depth: BitDepth,
}

impl ColorImage {
    /// Creates an image from a pixel array and its declared metadata.
    pub fn from_array(
        data: Array3<f32>,
        color_space: ColorSpace,
        channel_order: ChannelOrder,
        bit_depth: BitDepth,
    ) -> Self {
        Self {
            data,
            color_space,
            channel_order,
            bit_depth,
        }
    }

    /// Creates an 8-bit RGB image from interleaved bytes in row-major order.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != height * width * 3`.
    pub fn from_rgb8(bytes: &[u8], height: usize, width: usize) -> Self {
        assert_eq!(bytes.len(), height * width * 3, "pixel buffer size mismatch");
        let data = Array3::from_shape_vec(
            (height, width, 3),
            bytes.iter().map(|&b| b as f32).collect(),
        )
        .expect("buffer matches dimensions");
        Self {
            data,
            color_space: ColorSpace::Rgb,
            channel_order: ChannelOrder::Rgb,
            bit_depth: BitDepth::Eight,
        }
    }

    /// Creates a single-channel 8-bit image from grayscale bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != height * width`.
    pub fn from_luma8(bytes: &[u8], height: usize, width: usize) -> Self {
        assert_eq!(bytes.len(), height * width, "pixel buffer size mismatch");
        let data = Array3::from_shape_vec(
            (height, width, 1),
            bytes.iter().map(|&b| b as f32).collect(),
        )
        .expect("buffer matches dimensions");
        Self {
            data,
            color_space: ColorSpace::Rgb,
            channel_order: ChannelOrder::Rgb,
            bit_depth: BitDepth::Eight,
        }
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.channel_order
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Read-only view of the pixel buffer.
    pub fn data(&self) -> &Array3<f32> {
        &self.data
    }

    /// Consumes the image and returns the pixel buffer.
    pub fn into_data(self) -> Array3<f32> {
        self.data
    }

    /// Normalized RGB triple at (row, col) in canonical R, G, B order.
    /// Only meaningful for RGB-family images.
    pub(crate) fn rgb_unit_at(&self, row: usize, col: usize) -> [f32; 3] {
        let max_value = self.bit_depth.max_value();
        let (r, g, b) = match self.channel_order {
            ChannelOrder::Rgb => (0, 1, 2),
            ChannelOrder::Bgr => (2, 1, 0),
        };
        [
            self.data[[row, col, r]] / max_value,
            self.data[[row, col, g]] / max_value,
            self.data[[row, col, b]] / max_value,
        ]
    }

    /// Lab triple at (row, col). Only meaningful for Lab images.
    pub(crate) fn lab_at(&self, row: usize, col: usize) -> [f32; 3] {
        [
            self.data[[row, col, 0]],
            self.data[[row, col, 1]],
            self.data[[row, col, 2]],
        ]
    }

    /// Reorders a 3-channel RGB-family image into the requested channel
    /// order. Non-RGB images and images already in the requested order pass
    /// through unchanged.
    pub fn into_channel_order(self, order: ChannelOrder) -> Self {
        if self.color_space != ColorSpace::Rgb
            || self.channels() != 3
            || self.channel_order == order
        {
            return self;
        }
        let mut data = self.data;
        if let Some(slice) = data.as_slice_mut() {
            slice.par_chunks_mut(3).for_each(|pixel| pixel.swap(0, 2));
        } else {
            for mut row in data.outer_iter_mut() {
                for mut pixel in row.outer_iter_mut() {
                    pixel.swap(0, 2);
                }
            }
        }
        Self {
            data,
            color_space: self.color_space,
            channel_order: order,
            bit_depth: self.bit_depth,
        }
    }

    /// Resamples the image to `height` × `width` with pixel-center bilinear
    /// interpolation. Metadata is preserved; sampled values are convex
    /// combinations of the source, so the value range is preserved too.
    pub fn resize_bilinear(&self, height: usize, width: usize) -> Self {
        let (src_h, src_w, channels) = self.data.dim();
        let mut out = Array3::zeros((height, width, channels));

        if height > 0 && width > 0 && src_h > 0 && src_w > 0 {
            let scale_y = src_h as f32 / height as f32;
            let scale_x = src_w as f32 / width as f32;
            let src = &self.data;

            out.indexed_iter_mut()
                .par_bridge()
                .for_each(|((y, x, c), value)| {
                    let sy = ((y as f32 + 0.5) * scale_y - 0.5).clamp(0.0, (src_h - 1) as f32);
                    let sx = ((x as f32 + 0.5) * scale_x - 0.5).clamp(0.0, (src_w - 1) as f32);

                    let y0 = sy.floor() as usize;
                    let x0 = sx.floor() as usize;
                    let y1 = (y0 + 1).min(src_h - 1);
                    let x1 = (x0 + 1).min(src_w - 1);
                    let wy = sy - y0 as f32;
                    let wx = sx - x0 as f32;

                    let top = src[[y0, x0, c]] * (1.0 - wx) + src[[y0, x1, c]] * wx;
                    let bottom = src[[y1, x0, c]] * (1.0 - wx) + src[[y1, x1, c]] * wx;
                    *value = top * (1.0 - wy) + bottom * wy;
                });
        }

        Self {
            data: out,
            color_space: self.color_space,
            channel_order: self.channel_order,
            bit_depth: self.bit_depth,
        }
    }

    /// Per-channel summary statistics, used for run logging.
    pub fn statistics(&self) -> ImageStatistics {
        let (height, width, channels) = self.data.dim();
        let cells = (height * width) as f32;
        let used_channels = channels.min(3);

        if cells == 0.0 || used_channels == 0 {
            return ImageStatistics {
                mean_channels: [0.0; 3],
                variance: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }

        let mut mean_channels = [0.0f32; 3];
        for channel in 0..used_channels {
            let channel_view = self.data.index_axis(Axis(2), channel);
            let sum = if let Some(slice) = channel_view.as_slice() {
                slice.par_iter().cloned().sum::<f32>()
            } else {
                channel_view.iter().cloned().sum::<f32>()
            };
            mean_channels[channel] = sum / cells;
        }

        let mut variance_sum = 0.0f32;
        for channel in 0..used_channels {
            let mean = mean_channels[channel];
            let channel_view = self.data.index_axis(Axis(2), channel);
            let variance = if let Some(slice) = channel_view.as_slice() {
                slice
                    .par_iter()
                    .map(|value| {
                        let diff = *value - mean;
                        diff * diff
                    })
                    .sum::<f32>()
            } else {
                channel_view
                    .iter()
                    .map(|value| {
                        let diff = *value - mean;
                        diff * diff
                    })
                    .sum::<f32>()
            };
            variance_sum += variance;
        }
        let variance = variance_sum / (cells * used_channels as f32);

        let (min, max) = if let Some(slice) = self.data.as_slice() {
            (
                slice.par_iter().cloned().reduce(|| f32::INFINITY, f32::min),
                slice
                    .par_iter()
                    .cloned()
                    .reduce(|| f32::NEG_INFINITY, f32::max),
            )
        } else {
            self.data
                .iter()
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                    (lo.min(v), hi.max(v))
                })
        };

        ImageStatistics {
            mean_channels,
            variance,
            min,
            max,
        }
    }

    /// Writes a PNG preview of a 3-channel image. Lab images are converted
    /// to sRGB for display.
    pub fn to_png<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let (height, width, channels) = self.data.dim();
        if channels != 3 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("PNG preview requires 3 channels, image has {channels}"),
            ));
        }
        if height == 0 || width == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "PNG preview requires a non-empty image",
            ));
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let backend = BitMapBackend::new(path, (width as u32, height as u32));
        let drawing_area = backend.into_drawing_area();
        drawing_area
            .fill(&RGBColor(0, 0, 0))
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

        for row in 0..height {
            for col in 0..width {
                let rgb = match self.color_space {
                    ColorSpace::Rgb => self.rgb_unit_at(row, col),
                    ColorSpace::Lab => color::lab_to_srgb(self.lab_at(row, col)),
                };
                let color = RGBColor(
                    float_to_byte(rgb[0]),
                    float_to_byte(rgb[1]),
                    float_to_byte(rgb[2]),
                );
                drawing_area
                    .draw_pixel((col as i32, row as i32), &color)
                    .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
            }
        }

        drawing_area
            .present()
            .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
    }
}

/// Summary statistics of a pixel buffer.
#[derive(Debug, Clone)]
pub struct ImageStatistics {
    /// Per-channel means (first three channels).
    pub mean_channels: [f32; 3],
    /// Pooled per-channel variance.
    pub variance: f32,
    /// Smallest channel value in the buffer.
    pub min: f32,
    /// Largest channel value in the buffer.
    pub max: f32,
}

fn float_to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
