use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::Result;
use ndarray::{Array3, Array4};

use lowlight_enhance_core::{
    enhance, enhance_classical, enhance_learned, BitDepth, ChannelOrder, ClassicalConfig,
    ColorImage, ColorSpace, EnhanceError, EnhancementConfig, EnhancementModel, LearnedConfig,
    Strategy,
};

fn gradient_image(height: usize, width: usize) -> ColorImage {
    let bytes: Vec<u8> = (0..height * width * 3)
        .map(|i| ((i * 7) % 229) as u8)
        .collect();
    ColorImage::from_rgb8(&bytes, height, width)
}

fn lab_image(height: usize, width: usize) -> ColorImage {
    let mut data = Array3::zeros((height, width, 3));
    for y in 0..height {
        for x in 0..width {
            data[[y, x, 0]] = ((x * 13 + y * 7) % 101) as f32;
            data[[y, x, 1]] = ((x * 5 + y) % 41) as f32 - 20.0;
            data[[y, x, 2]] = ((x + y * 3) % 37) as f32 - 18.0;
        }
    }
    ColorImage::from_array(data, ColorSpace::Lab, ChannelOrder::Rgb, BitDepth::Unit)
}

struct Identity;

impl EnhancementModel for Identity {
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        Ok(input.clone())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

struct Counting {
    calls: AtomicUsize,
}

impl Counting {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl EnhancementModel for Counting {
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input.clone())
    }
}

struct Failing;

impl EnhancementModel for Failing {
    fn infer(&self, _input: &Array4<f32>) -> Result<Array4<f32>> {
        Err(anyhow::anyhow!("tensor arena exhausted"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct WrongShape;

impl EnhancementModel for WrongShape {
    fn infer(&self, _input: &Array4<f32>) -> Result<Array4<f32>> {
        Ok(Array4::zeros((1, 8, 8, 3)))
    }
}

#[test]
fn classical_preserves_shape() {
    let image = gradient_image(50, 70);
    let out = enhance_classical(image, 3.0, (8, 8)).unwrap();
    assert_eq!((out.height(), out.width(), out.channels()), (50, 70, 3));
    assert_eq!(out.color_space(), ColorSpace::Rgb);
    assert_eq!(out.bit_depth(), BitDepth::Eight);
}

#[test]
fn classical_is_deterministic() {
    let image = gradient_image(40, 40);
    let first = enhance_classical(image.clone(), 2.0, (8, 8)).unwrap();
    let second = enhance_classical(image, 2.0, (8, 8)).unwrap();
    assert_eq!(first.data(), second.data());
}

#[test]
fn classical_leaves_chrominance_untouched() {
    let image = lab_image(33, 47);
    let expected = image.clone();
    let out = enhance_classical(image, 3.0, (8, 8)).unwrap();

    assert_eq!(out.color_space(), ColorSpace::Lab);
    for y in 0..33 {
        for x in 0..47 {
            assert_eq!(out.data()[[y, x, 1]], expected.data()[[y, x, 1]]);
            assert_eq!(out.data()[[y, x, 2]], expected.data()[[y, x, 2]]);
        }
    }
}

#[test]
fn classical_stays_in_range_for_extreme_clip_limit() {
    let image = gradient_image(32, 32);
    let out = enhance_classical(image, 1000.0, (8, 8)).unwrap();
    for value in out.data().iter() {
        assert!((0.0..=255.0).contains(value), "value {value} out of range");
    }
}

#[test]
fn classical_rejects_zero_clip_limit() {
    let err = enhance_classical(gradient_image(16, 16), 0.0, (8, 8)).unwrap_err();
    assert!(matches!(err, EnhanceError::InvalidParameter { .. }));
}

#[test]
fn classical_rejects_zero_grid_dimension() {
    let err = enhance_classical(gradient_image(16, 16), 3.0, (0, 8)).unwrap_err();
    assert!(matches!(err, EnhanceError::InvalidParameter { .. }));
}

#[test]
fn classical_rejects_grayscale_input() {
    let image = ColorImage::from_luma8(&vec![128u8; 16 * 16], 16, 16);
    let err = enhance_classical(image, 3.0, (8, 8)).unwrap_err();
    assert!(matches!(err, EnhanceError::UnsupportedFormat { .. }));
}

#[test]
fn classical_is_noop_on_flat_image() {
    let image = ColorImage::from_rgb8(&vec![128u8; 64 * 64 * 3], 64, 64);
    let out = enhance_classical(image, 3.0, (8, 8)).unwrap();
    for value in out.data().iter() {
        assert_eq!(*value, 128.0);
    }
}

#[test]
fn classical_handles_bgr_order_symmetrically() {
    let rgb = gradient_image(24, 36);
    let bgr = rgb.clone().into_channel_order(ChannelOrder::Bgr);

    let out_rgb = enhance_classical(rgb, 3.0, (4, 4)).unwrap();
    let out_bgr = enhance_classical(bgr, 3.0, (4, 4)).unwrap();

    assert_eq!(out_bgr.channel_order(), ChannelOrder::Bgr);
    let swapped = out_bgr.into_channel_order(ChannelOrder::Rgb);
    assert_eq!(swapped.data(), out_rgb.data());
}

#[test]
fn learned_rejects_grayscale_before_invoking_model() {
    let image = ColorImage::from_luma8(&vec![40u8; 12 * 12], 12, 12);
    let model = Counting::new();
    let err = enhance_learned(image, &model, (12, 12)).unwrap_err();
    assert!(matches!(err, EnhanceError::UnsupportedFormat { .. }));
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn learned_rejects_zero_resolution() {
    let err = enhance_learned(gradient_image(12, 12), &Identity, (0, 256)).unwrap_err();
    assert!(matches!(err, EnhanceError::InvalidParameter { .. }));
}

#[test]
fn learned_restores_source_dimensions() {
    let image = gradient_image(40, 60);
    let out = enhance_learned(image, &Identity, (16, 16)).unwrap();
    assert_eq!((out.height(), out.width(), out.channels()), (40, 60, 3));
}

#[test]
fn learned_identity_round_trips_exactly() {
    let image = gradient_image(32, 32);
    let expected = image.clone();
    let out = enhance_learned(image, &Identity, (32, 32)).unwrap();
    assert_eq!(out.data(), expected.data());
}

#[test]
fn learned_surfaces_runtime_failure() {
    let err = enhance_learned(gradient_image(16, 16), &Failing, (16, 16)).unwrap_err();
    match err {
        EnhanceError::ModelInvocation { model, details } => {
            assert_eq!(model, "failing");
            assert!(details.contains("tensor arena exhausted"));
        }
        other => panic!("expected ModelInvocation, got {other:?}"),
    }
}

#[test]
fn learned_rejects_mismatched_output_shape() {
    let err = enhance_learned(gradient_image(32, 32), &WrongShape, (32, 32)).unwrap_err();
    assert!(matches!(err, EnhanceError::ModelInvocation { .. }));
}

#[test]
fn dispatch_matches_direct_classical_call() {
    let config = EnhancementConfig {
        strategy: Strategy::Classical,
        classical: ClassicalConfig {
            clip_limit: 2.0,
            tile_grid: (4, 4),
        },
        learned: LearnedConfig::default(),
    };
    let image = gradient_image(48, 48);

    let via_dispatch = enhance(image.clone(), &config, None).unwrap();
    let direct = enhance_classical(image, 2.0, (4, 4)).unwrap();

    assert_eq!(via_dispatch.strategy, Strategy::Classical);
    assert_eq!(via_dispatch.image.data(), direct.data());
}

#[test]
fn dispatch_routes_to_learned_strategy() {
    let config = EnhancementConfig {
        strategy: Strategy::Learned,
        classical: ClassicalConfig::default(),
        learned: LearnedConfig {
            input_resolution: (16, 16),
            ..LearnedConfig::default()
        },
    };
    let image = gradient_image(16, 16);
    let expected = image.clone();

    let result = enhance(image, &config, Some(&Identity)).unwrap();
    assert_eq!(result.strategy, Strategy::Learned);
    assert_eq!(result.image.data(), expected.data());
}

#[test]
fn dispatch_requires_model_for_learned_strategy() {
    let config = EnhancementConfig {
        strategy: Strategy::Learned,
        classical: ClassicalConfig::default(),
        learned: LearnedConfig::default(),
    };
    let err = enhance(gradient_image(16, 16), &config, None).unwrap_err();
    assert!(matches!(err, EnhanceError::InvalidParameter { .. }));
}
