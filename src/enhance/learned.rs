//! Learned enhancement behind an opaque tensor-function handle.
//!
//! The pretrained network is represented by the [`EnhancementModel`] trait:
//! a pure function from a `(1, height, width, 3)` activation to a tensor of
//! the same shape. The transform neither inspects nor modifies the model —
//! loading, caching, and device placement are the caller's concern. A failed
//! invocation is surfaced as-is and never retried here: inference has no
//! well-defined partial-failure semantics at this layer.

use anyhow::Result;
use ndarray::{Array4, Axis};

use crate::error::{EnhanceError, EnhanceResult};
use crate::image::{BitDepth, ChannelOrder, ColorImage, ColorSpace};

/// Trait for pretrained enhancement networks.
///
/// Implementations wrap whatever runtime actually executes the weights; the
/// transform only relies on the fixed tensor-in/tensor-out signature.
/// Sharing one handle across threads is safe only if the underlying runtime
/// is reentrant — callers wanting parallel inference should provision one
/// handle per worker.
pub trait EnhancementModel {
    /// Run the network on a `(batch, height, width, channels)` activation
    /// with values in [0, 1] and return a tensor of identical shape.
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>>;

    /// Get model name for logging/debugging
    fn name(&self) -> &str {
        "UnknownModel"
    }
}

/// Enhances an image through a pretrained network at a fixed input
/// resolution.
///
/// The image is resized to `input_resolution` (rows, columns), normalized to
/// [0, 1], and batched; the model output is clipped back to [0, 1] against
/// overshoot, rescaled to the source bit depth, and resized to the source
/// dimensions. Channel order is restored, so a BGR input yields a BGR
/// output.
pub fn enhance_learned(
    image: ColorImage,
    model: &dyn EnhancementModel,
    input_resolution: (usize, usize),
) -> EnhanceResult<ColorImage> {
    if image.channels() != 3 {
        return Err(EnhanceError::unsupported_format(
            "3 channels",
            format!("{} channel(s)", image.channels()),
            "learned enhancement",
        ));
    }
    if image.color_space() != ColorSpace::Rgb {
        return Err(EnhanceError::unsupported_format(
            "an RGB-family image",
            "Lab",
            "learned enhancement",
        ));
    }
    if input_resolution.0 < 1 || input_resolution.1 < 1 {
        return Err(EnhanceError::invalid_parameter(
            "input_resolution",
            format!("{}x{}", input_resolution.0, input_resolution.1),
            "both dimensions >= 1",
        ));
    }

    let src_h = image.height();
    let src_w = image.width();
    if src_h == 0 || src_w == 0 {
        return Ok(image);
    }

    let source_order = image.channel_order();
    let bit_depth = image.bit_depth();
    let max_value = bit_depth.max_value();

    // Preprocess: canonical RGB order, fixed resolution, [0, 1], batch axis.
    let canonical = image.into_channel_order(ChannelOrder::Rgb);
    let resized = if (src_h, src_w) != input_resolution {
        canonical.resize_bilinear(input_resolution.0, input_resolution.1)
    } else {
        canonical
    };
    let mut tensor = resized.into_data();
    tensor.mapv_inplace(|value| value / max_value);
    let batched = tensor.insert_axis(Axis(0));

    let output = model
        .infer(&batched)
        .map_err(|err| EnhanceError::model_invocation(model.name(), err.to_string()))?;
    if output.dim() != batched.dim() {
        return Err(EnhanceError::model_invocation(
            model.name(),
            format!(
                "output shape {:?} does not match input shape {:?}",
                output.dim(),
                batched.dim()
            ),
        ));
    }

    // Postprocess: unbatch, clip overshoot, rescale, restore geometry.
    let mut plane = output.index_axis_move(Axis(0), 0);
    plane.mapv_inplace(|value| value.clamp(0.0, 1.0) * max_value);

    let restored = ColorImage::from_array(plane, ColorSpace::Rgb, ChannelOrder::Rgb, bit_depth);
    let restored = if (src_h, src_w) != input_resolution {
        restored.resize_bilinear(src_h, src_w)
    } else {
        restored
    };
    let restored = restored.into_channel_order(source_order);

    let mut data = restored.into_data();
    if bit_depth == BitDepth::Eight {
        data.mapv_inplace(f32::round);
    }
    Ok(ColorImage::from_array(
        data,
        ColorSpace::Rgb,
        source_order,
        bit_depth,
    ))
}
