use std::path::PathBuf;

use anyhow::Result;
use ndarray::Array4;

use lowlight_enhance_core::config::ConfigError;
use lowlight_enhance_core::{enhance, ColorImage, EnhancementConfig, EnhancementModel, Strategy};

/// Stand-in for a real pretrained network: lifts shadows with a gamma curve.
/// Loading an actual model artifact is the embedding application's job; the
/// demo only needs something that honors the tensor contract.
struct GammaLift {
    gamma: f32,
}

impl EnhancementModel for GammaLift {
    fn infer(&self, input: &Array4<f32>) -> Result<Array4<f32>> {
        Ok(input.mapv(|value| value.clamp(0.0, 1.0).powf(self.gamma)))
    }

    fn name(&self) -> &str {
        "gamma-lift"
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    println!(
        "Loaded config: strategy={} clip_limit={} tile_grid={}x{} input_resolution={}x{}",
        config.strategy,
        config.classical.clip_limit,
        config.classical.tile_grid.0,
        config.classical.tile_grid.1,
        config.learned.input_resolution.0,
        config.learned.input_resolution.1,
    );

    let frame = night_frame(480, 640);
    let before = frame.statistics();
    println!(
        "input:  mean={:?} range=[{:.1}, {:.1}]",
        before.mean_channels, before.min, before.max
    );

    let stand_in = GammaLift { gamma: 0.6 };
    let model = match config.strategy {
        Strategy::Classical => None,
        Strategy::Learned => Some(&stand_in as &dyn EnhancementModel),
    };
    let result = enhance(frame, &config, model)?;

    let after = result.image.statistics();
    println!(
        "output: mean={:?} range=[{:.1}, {:.1}]",
        after.mean_channels, after.min, after.max
    );

    result.image.to_png(PathBuf::from("out/enhanced.png"))?;
    println!("Demo complete. Preview written to out/enhanced.png");
    Ok(())
}

/// Deterministic synthetic night shot: a dim gradient with a few brighter
/// patches, enough structure for the equalizer to work on.
fn night_frame(height: usize, width: usize) -> ColorImage {
    let mut bytes = Vec::with_capacity(height * width * 3);
    for y in 0..height {
        for x in 0..width {
            let base = 15 + ((x * 3 + y * 2) % 45) as u8;
            let glow = if (x / 80 + y / 60) % 4 == 0 { 25 } else { 0 };
            bytes.push(base + glow);
            bytes.push(base + glow / 2);
            bytes.push(base);
        }
    }
    ColorImage::from_rgb8(&bytes, height, width)
}

fn load_config() -> Result<EnhancementConfig, ConfigError> {
    EnhancementConfig::load_from_file("config/enhance.toml").or_else(|err| {
        eprintln!("Falling back to default config: {err}");
        Ok(EnhancementConfig::default())
    })
}
