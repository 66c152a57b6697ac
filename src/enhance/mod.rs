//! Enhancement strategies and the single dispatch entry point.
//!
//! Two interchangeable strategies implement the same image-in/image-out
//! contract: [`classical`] (CLAHE on the CIELAB lightness channel) and
//! [`learned`] (a pretrained network behind an opaque tensor handle).
//! [`enhance`] selects between them from an [`EnhancementConfig`] so callers
//! can swap strategies without depending on either implementation. Completed
//! runs are logged as JSON lines; logging failures never fail the transform.

pub mod classical;
pub mod learned;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EnhancementConfig;
use crate::error::{EnhanceError, EnhanceResult};
use crate::image::{ColorImage, ImageStatistics};
use crate::logging;

pub use classical::enhance_classical;
pub use learned::{enhance_learned, EnhancementModel};

/// Which enhancement strategy produced (or should produce) a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Classical,
    Learned,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Classical => write!(f, "classical"),
            Strategy::Learned => write!(f, "learned"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classical" => Ok(Strategy::Classical),
            "learned" => Ok(Strategy::Learned),
            _ => Err(format!(
                "unsupported strategy '{}', expected 'classical' or 'learned'",
                s
            )),
        }
    }
}

/// An enhanced image together with the strategy that produced it.
#[derive(Debug, Clone)]
pub struct EnhancedResult {
    pub image: ColorImage,
    pub strategy: Strategy,
}

/// Enhances an image with the strategy selected by `config`.
///
/// The learned strategy needs a caller-managed model handle; passing `None`
/// with `Strategy::Learned` is an [`EnhanceError::InvalidParameter`] rather
/// than a silent fallback. Dispatch adds no behavior of its own: a classical
/// config produces output bit-identical to calling [`enhance_classical`]
/// directly with the same parameters.
///
/// # Examples
///
/// ```
/// use lowlight_enhance_core::{enhance, ColorImage, EnhancementConfig};
///
/// let bytes: Vec<u8> = (0..32 * 32 * 3).map(|i| (i % 90) as u8 + 40).collect();
/// let image = ColorImage::from_rgb8(&bytes, 32, 32);
/// let result = enhance(image, &EnhancementConfig::default(), None).unwrap();
/// assert_eq!(result.image.height(), 32);
/// ```
pub fn enhance(
    image: ColorImage,
    config: &EnhancementConfig,
    model: Option<&dyn EnhancementModel>,
) -> EnhanceResult<EnhancedResult> {
    let height = image.height();
    let width = image.width();
    let input_stats = image.statistics();

    let (enhanced, strategy) = match config.strategy {
        Strategy::Classical => (
            enhance_classical(
                image,
                config.classical.clip_limit,
                config.classical.tile_grid,
            )?,
            Strategy::Classical,
        ),
        Strategy::Learned => {
            let model = model.ok_or_else(|| {
                EnhanceError::invalid_parameter(
                    "model",
                    "none",
                    "a model handle when the learned strategy is selected",
                )
            })?;
            (
                enhance_learned(image, model, config.learned.input_resolution)?,
                Strategy::Learned,
            )
        }
    };

    log_run(strategy, height, width, &input_stats, &enhanced.statistics());

    Ok(EnhancedResult {
        image: enhanced,
        strategy,
    })
}

fn log_run(
    strategy: Strategy,
    height: usize,
    width: usize,
    input: &ImageStatistics,
    output: &ImageStatistics,
) {
    if let Err(err) = logging::log_enhancement(strategy, height, width, input, output) {
        eprintln!("failed to log {strategy} enhancement run: {err}");
    }
}
