//! # Low-Light Enhancement Core
//!
//! A deterministic image contrast/low-light enhancement transform with two
//! interchangeable strategies: classical CLAHE on the CIELAB lightness
//! channel, and a pretrained enhancement network invoked through an opaque
//! tensor-function handle. Both strategies are pure image-in/image-out
//! functions selected by configuration; callers keep ownership of decoding,
//! encoding, and delivery.
//!
//! ## Quick Start
//!
//! ```rust
//! use lowlight_enhance_core::{enhance, ColorImage, EnhancementConfig};
//!
//! // A dim, low-contrast frame.
//! let bytes: Vec<u8> = (0..64 * 64 * 3).map(|i| 40 + (i % 50) as u8).collect();
//! let image = ColorImage::from_rgb8(&bytes, 64, 64);
//!
//! // Enhance with the configured strategy (classical CLAHE by default).
//! let result = enhance(image, &EnhancementConfig::default(), None).unwrap();
//!
//! let stats = result.image.statistics();
//! println!("strategy={} mean={:?}", result.strategy, stats.mean_channels);
//! ```
//!
//! ## Core Modules
//!
//! - [`config`] - Strategy selection and parameters via TOML
//! - [`image`] - Pixel buffers with explicit color metadata
//! - [`enhance`] - The two strategies and the dispatch entry point
//! - [`logging`] - JSON line-delimited run logging

pub mod config;
pub mod enhance;
pub mod error;
pub mod image;
pub mod logging;

pub use config::{ClassicalConfig, ConfigError, EnhancementConfig, LearnedConfig};
pub use enhance::{
    enhance, enhance_classical, enhance_learned, EnhancedResult, EnhancementModel, Strategy,
};
pub use error::{EnhanceError, EnhanceResult};
pub use image::{BitDepth, ChannelOrder, ColorImage, ColorSpace, ImageStatistics};
