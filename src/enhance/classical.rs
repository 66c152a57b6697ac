//! Contrast-limited adaptive histogram equalization on the lightness channel.
//!
//! The image is decomposed into CIELAB, the lightness plane is equalized
//! tile-by-tile with a clip limit (Zuiderveld's CLAHE, Graphics Gems IV),
//! and the untouched chroma planes are recombined before converting back to
//! the source color space. Acting on lightness alone raises local contrast
//! without shifting hue or saturation.
//!
//! The transform is deterministic: no randomness, no state between calls,
//! and bit-identical output for identical inputs and parameters.

use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

use crate::error::{EnhanceError, EnhanceResult};
use crate::image::color::{lab_to_srgb, srgb_to_lab};
use crate::image::{BitDepth, ChannelOrder, ColorImage, ColorSpace};

const HIST_BINS: usize = 256;
// Lightness is quantized from [0, 100] onto the 256 histogram bins.
const L_SCALE: f32 = 255.0 / 100.0;

/// Applies CLAHE to the lightness channel of a 3-channel image.
///
/// `clip_limit` is a multiplier on the uniform bin count of each tile
/// histogram (2.0–4.0 is typical); `tile_grid` is the number of contextual
/// regions along (rows, columns). Chrominance passes through untouched, and
/// the output keeps the input's dimensions, color space, channel order, and
/// bit depth.
pub fn enhance_classical(
    image: ColorImage,
    clip_limit: f32,
    tile_grid: (usize, usize),
) -> EnhanceResult<ColorImage> {
    if !clip_limit.is_finite() || clip_limit <= 0.0 {
        return Err(EnhanceError::invalid_parameter(
            "clip_limit",
            format!("{clip_limit}"),
            "a finite value > 0",
        ));
    }
    if tile_grid.0 < 1 || tile_grid.1 < 1 {
        return Err(EnhanceError::invalid_parameter(
            "tile_grid",
            format!("{}x{}", tile_grid.0, tile_grid.1),
            "both grid dimensions >= 1",
        ));
    }
    if image.channels() != 3 {
        return Err(EnhanceError::unsupported_format(
            "3 channels",
            format!("{} channel(s)", image.channels()),
            "classical enhancement",
        ));
    }
    if image.height() == 0 || image.width() == 0 {
        return Ok(image);
    }

    let lab = lab_planes(&image);
    let equalized = equalize_lightness(&lab, clip_limit, tile_grid);
    Ok(merge_output(&image, &lab, &equalized))
}

/// Decomposes the image into a CIELAB plane stack `[height, width, 3]`.
fn lab_planes(image: &ColorImage) -> Array3<f32> {
    let height = image.height();
    let width = image.width();

    let mut buf = vec![0.0f32; height * width * 3];
    buf.par_chunks_mut(3).enumerate().for_each(|(idx, pixel)| {
        let y = idx / width;
        let x = idx % width;
        let lab = match image.color_space() {
            ColorSpace::Lab => image.lab_at(y, x),
            ColorSpace::Rgb => srgb_to_lab(image.rgb_unit_at(y, x)),
        };
        pixel.copy_from_slice(&lab);
    });

    Array3::from_shape_vec((height, width, 3), buf).expect("buffer matches dimensions")
}

/// Equalizes the lightness plane over a `tile_grid` of contextual regions.
///
/// Tiles are sized by ceiling division; border tiles read replicated edge
/// pixels so every tile histogram covers the same pixel count. Each pixel's
/// remapped value is the bilinear interpolation of the four surrounding
/// tiles' lookup tables, which removes blocking artifacts at tile seams.
fn equalize_lightness(
    lab: &Array3<f32>,
    clip_limit: f32,
    (grid_rows, grid_cols): (usize, usize),
) -> Array2<f32> {
    let (height, width, _) = lab.dim();
    let tile_h = (height + grid_rows - 1) / grid_rows;
    let tile_w = (width + grid_cols - 1) / grid_cols;
    let tile_pixels = tile_h * tile_w;

    let luts: Vec<[f32; HIST_BINS]> = (0..grid_rows * grid_cols)
        .into_par_iter()
        .map(|tile| {
            let tile_row = tile / grid_cols;
            let tile_col = tile % grid_cols;
            let y0 = tile_row * tile_h;
            let x0 = tile_col * tile_w;

            let mut hist = [0u32; HIST_BINS];
            for yy in y0..y0 + tile_h {
                let y = yy.min(height - 1);
                for xx in x0..x0 + tile_w {
                    let x = xx.min(width - 1);
                    hist[lightness_bin(lab[[y, x, 0]])] += 1;
                }
            }

            tile_lut(&mut hist, tile_pixels, clip_limit)
        })
        .collect();

    let mut equalized = Array2::zeros((height, width));
    equalized
        .indexed_iter_mut()
        .par_bridge()
        .for_each(|((y, x), out)| {
            let bin = lightness_bin(lab[[y, x, 0]]);
            let py = y as f32;
            let px = x as f32;

            // Nearest tile centers in each dimension.
            let fy = py / tile_h as f32 - 0.5;
            let fx = px / tile_w as f32 - 0.5;
            let ty0 = ((fy.floor() as isize).max(0) as usize).min(grid_rows - 1);
            let tx0 = ((fx.floor() as isize).max(0) as usize).min(grid_cols - 1);
            let ty1 = (ty0 + 1).min(grid_rows - 1);
            let tx1 = (tx0 + 1).min(grid_cols - 1);

            let ay = if ty0 == ty1 {
                0.0
            } else {
                ((py - tile_center(ty0, tile_h)) / tile_h as f32).clamp(0.0, 1.0)
            };
            let ax = if tx0 == tx1 {
                0.0
            } else {
                ((px - tile_center(tx0, tile_w)) / tile_w as f32).clamp(0.0, 1.0)
            };

            let v00 = luts[ty0 * grid_cols + tx0][bin];
            let v10 = luts[ty0 * grid_cols + tx1][bin];
            let v01 = luts[ty1 * grid_cols + tx0][bin];
            let v11 = luts[ty1 * grid_cols + tx1][bin];

            let value = v00 * (1.0 - ax) * (1.0 - ay)
                + v10 * ax * (1.0 - ay)
                + v01 * (1.0 - ax) * ay
                + v11 * ax * ay;

            *out = value / L_SCALE;
        });

    equalized
}

fn tile_center(index: usize, tile_size: usize) -> f32 {
    (index as f32 + 0.5) * tile_size as f32
}

fn lightness_bin(lightness: f32) -> usize {
    (lightness * L_SCALE).round().clamp(0.0, 255.0) as usize
}

/// Builds a tile's remap LUT from its histogram.
///
/// A tile whose pixels all fall in a single bin keeps the identity mapping:
/// a constant region has no distribution to reshape, so equalization leaves
/// it alone. Otherwise the histogram is clipped, the clipped mass is
/// redistributed, and the CDF is normalized into a bin-to-bin remap.
fn tile_lut(hist: &mut [u32; HIST_BINS], tile_pixels: usize, clip_limit: f32) -> [f32; HIST_BINS] {
    let mut lut = [0.0f32; HIST_BINS];
    let occupied = hist.iter().filter(|&&count| count > 0).count();
    if tile_pixels == 0 || occupied <= 1 {
        for (bin, value) in lut.iter_mut().enumerate() {
            *value = bin as f32;
        }
        return lut;
    }

    clip_histogram(hist, tile_pixels, clip_limit);

    let mut cdf = [0u32; HIST_BINS];
    cdf[0] = hist[0];
    for bin in 1..HIST_BINS {
        cdf[bin] = cdf[bin - 1] + hist[bin];
    }

    let cdf_min = cdf.iter().copied().find(|&count| count > 0).unwrap_or(0);
    let denom = tile_pixels as f32 - cdf_min as f32;
    if denom <= 0.0 {
        for (bin, value) in lut.iter_mut().enumerate() {
            *value = bin as f32;
        }
        return lut;
    }

    for bin in 0..HIST_BINS {
        lut[bin] = ((cdf[bin] as f32 - cdf_min as f32) / denom * 255.0)
            .round()
            .clamp(0.0, 255.0);
    }
    lut
}

/// Clips histogram bins at `clip_limit` times the uniform bin count and
/// redistributes the clipped mass evenly, remainder to the leading bins.
/// The total count is conserved.
fn clip_histogram(hist: &mut [u32; HIST_BINS], tile_pixels: usize, clip_limit: f32) {
    let clip_at = ((tile_pixels as f32 / HIST_BINS as f32) * clip_limit).ceil() as u32;

    let mut excess = 0u32;
    for bin in hist.iter_mut() {
        if *bin > clip_at {
            excess += *bin - clip_at;
            *bin = clip_at;
        }
    }

    let per_bin = excess / HIST_BINS as u32;
    let remainder = (excess % HIST_BINS as u32) as usize;
    for (index, bin) in hist.iter_mut().enumerate() {
        *bin += per_bin;
        if index < remainder {
            *bin += 1;
        }
    }
}

/// Recombines the equalized lightness with the untouched chroma planes and
/// converts back to the source image's color space, order, and depth.
fn merge_output(source: &ColorImage, lab: &Array3<f32>, equalized: &Array2<f32>) -> ColorImage {
    let (height, width, _) = lab.dim();

    match source.color_space() {
        ColorSpace::Lab => {
            let mut out = lab.clone();
            out.index_axis_mut(Axis(2), 0).assign(equalized);
            ColorImage::from_array(
                out,
                ColorSpace::Lab,
                source.channel_order(),
                source.bit_depth(),
            )
        }
        ColorSpace::Rgb => {
            let max_value = source.bit_depth().max_value();
            let quantize = source.bit_depth() == BitDepth::Eight;
            let (r, g, b) = match source.channel_order() {
                ChannelOrder::Rgb => (0usize, 1usize, 2usize),
                ChannelOrder::Bgr => (2, 1, 0),
            };

            let mut buf = vec![0.0f32; height * width * 3];
            buf.par_chunks_mut(3).enumerate().for_each(|(idx, pixel)| {
                let y = idx / width;
                let x = idx % width;
                let rgb = lab_to_srgb([equalized[[y, x]], lab[[y, x, 1]], lab[[y, x, 2]]]);

                let mut store = |channel: usize, value: f32| {
                    let mut value = value * max_value;
                    if quantize {
                        value = value.round();
                    }
                    pixel[channel] = value;
                };
                store(r, rgb[0]);
                store(g, rgb[1]);
                store(b, rgb[2]);
            });

            let data =
                Array3::from_shape_vec((height, width, 3), buf).expect("buffer matches dimensions");
            ColorImage::from_array(
                data,
                ColorSpace::Rgb,
                source.channel_order(),
                source.bit_depth(),
            )
        }
    }
}
