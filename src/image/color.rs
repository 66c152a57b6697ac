//! Deterministic color space utilities for lightness isolation.
//!
//! Provides fixed-parameter conversions between sRGB and CIELAB using the
//! CIE 1931 2° standard observer and D65 illuminant. The functions in this
//! module avoid platform color management differences by relying solely on
//! analytic transforms, so the enhancement pipeline stays bit-reproducible.
//! The ΔE94 color difference metric is included to verify that lightness
//! remapping leaves chroma perceptually untouched.

const D65_WHITE_POINT: [f32; 3] = [0.95047, 1.0, 1.08883];
const EPSILON: f32 = 0.008856_452; // 216/24389
const KAPPA: f32 = 903.296_3; // 24389/27
const K1: f32 = 0.045; // Graphic arts weighting for ΔE94
const K2: f32 = 0.015;

/// Convert an sRGB triplet in [0, 1] to linear-light RGB.
fn srgb_to_linear(channel: f32) -> f32 {
    if channel <= 0.04045 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert a linear-light channel back to gamma-encoded sRGB in [0, 1].
fn linear_to_srgb(channel: f32) -> f32 {
    let channel = channel.max(0.0);
    let encoded = if channel <= 0.003_130_8 {
        channel * 12.92
    } else {
        1.055 * channel.powf(1.0 / 2.4) - 0.055
    };
    encoded.clamp(0.0, 1.0)
}

/// Convert an sRGB color to XYZ using the D65 illuminant and CIE 1931 2° observer.
fn srgb_to_xyz(rgb: [f32; 3]) -> [f32; 3] {
    let r = srgb_to_linear(rgb[0]);
    let g = srgb_to_linear(rgb[1]);
    let b = srgb_to_linear(rgb[2]);

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    [x, y, z]
}

/// Convert an XYZ color back to sRGB, clamping into the displayable gamut.
fn xyz_to_srgb(xyz: [f32; 3]) -> [f32; 3] {
    let [x, y, z] = xyz;

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    [linear_to_srgb(r), linear_to_srgb(g), linear_to_srgb(b)]
}

fn lab_f(t: f32) -> f32 {
    if t > EPSILON {
        t.powf(1.0 / 3.0)
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn lab_f_inv(t: f32) -> f32 {
    let t3 = t * t * t;
    if t3 > EPSILON {
        t3
    } else {
        (116.0 * t - 16.0) / KAPPA
    }
}

/// Convert an sRGB color in [0, 1] to CIELAB coordinates (L*, a*, b*).
pub fn srgb_to_lab(rgb: [f32; 3]) -> [f32; 3] {
    let xyz = srgb_to_xyz(rgb);
    let xr = xyz[0] / D65_WHITE_POINT[0];
    let yr = xyz[1] / D65_WHITE_POINT[1];
    let zr = xyz[2] / D65_WHITE_POINT[2];

    let fx = lab_f(xr);
    let fy = lab_f(yr);
    let fz = lab_f(zr);

    let l = 116.0 * fy - 16.0;
    let a = 500.0 * (fx - fy);
    let b = 200.0 * (fy - fz);

    [l, a, b]
}

/// Convert CIELAB coordinates (L*, a*, b*) back to sRGB in [0, 1].
///
/// Out-of-gamut results are clamped per channel, so the output is always a
/// displayable color.
pub fn lab_to_srgb(lab: [f32; 3]) -> [f32; 3] {
    let fy = (lab[0] + 16.0) / 116.0;
    let fx = fy + lab[1] / 500.0;
    let fz = fy - lab[2] / 200.0;

    let xr = lab_f_inv(fx);
    let yr = if lab[0] > KAPPA * EPSILON {
        fy * fy * fy
    } else {
        lab[0] / KAPPA
    };
    let zr = lab_f_inv(fz);

    xyz_to_srgb([
        xr * D65_WHITE_POINT[0],
        yr * D65_WHITE_POINT[1],
        zr * D65_WHITE_POINT[2],
    ])
}

/// Compute the CIE ΔE94 color difference between two sRGB colors in [0, 1].
///
/// Weighting factors kL, kC, and kH are fixed to 1.0. Application-specific
/// modifiers K1 and K2 follow the graphic arts standard (0.045, 0.015).
pub fn delta_e94(rgb_a: [f32; 3], rgb_b: [f32; 3]) -> f32 {
    let lab_a = srgb_to_lab(rgb_a);
    let lab_b = srgb_to_lab(rgb_b);

    let delta_l = lab_a[0] - lab_b[0];
    let c1 = (lab_a[1].powi(2) + lab_a[2].powi(2)).sqrt();
    let c2 = (lab_b[1].powi(2) + lab_b[2].powi(2)).sqrt();
    let delta_c = c1 - c2;

    let delta_a = lab_a[1] - lab_b[1];
    let delta_b = lab_a[2] - lab_b[2];
    let delta_h_sq = (delta_a * delta_a) + (delta_b * delta_b) - (delta_c * delta_c);
    let delta_h = delta_h_sq.max(0.0).sqrt();

    let s_l = 1.0;
    let s_c = 1.0 + K1 * c1;
    let s_h = 1.0 + K2 * c1;

    let term_l = delta_l / s_l;
    let term_c = delta_c / s_c;
    let term_h = delta_h / s_h;

    (term_l * term_l + term_c * term_c + term_h * term_h).sqrt()
}
