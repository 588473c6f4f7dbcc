//! Domain coloring: the mapping from sphere values to colors.
//!
//! The hue is the argument of the value, the lightness a compression of its log-modulus, so that
//! zeros render black, poles render white, and each level of the phase is a distinct hue.

use std::f64::consts::PI;

use crate::sphere::ExtendedComplex;

/// A color in hue (degrees), saturation and lightness.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hsl {
    pub hue: i64,
    pub saturation: f64,
    pub lightness: f64,
}

/// Rounds to the nearest integer; exact halves round down (2.5 -> 2, -2.5 -> -3).
pub fn round_half_down(f: f64) -> i64 {
    (f - 0.5).ceil() as i64
}

/// The HSL color of a value.
pub fn hsl(value: &ExtendedComplex) -> Hsl {
    if value.is_infinite() {
        return Hsl {
            hue: 0,
            saturation: 1.0,
            lightness: 1.0,
        };
    }
    let argument = match value.argument() {
        Ok(a) => a,
        // Only zero is finite and has no argument.
        Err(_) => {
            return Hsl {
                hue: 0,
                saturation: 1.0,
                lightness: 0.0,
            }
        }
    };

    let mut hue = argument * 180.0 / PI;
    if hue < 0.0 {
        hue += 360.0;
    }
    let modulus = value.modulus();
    let lightness = if modulus == 0.0 {
        0.0
    } else {
        let logarithm = modulus.ln();
        (logarithm / (1.0 + logarithm.abs()) + 1.0) / 2.0
    };
    Hsl {
        // Hue in [0, 360).
        hue: round_half_down(hue) % 360,
        saturation: 1.0,
        lightness,
    }
}

/// Convert an HSL color to 8-bit RGB channels.
pub fn hsl_to_rgb(color: Hsl) -> [u8; 3] {
    let Hsl {
        hue,
        saturation,
        lightness,
    } = color;
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let hue_prime = hue as f64 / 60.0;
    let x = chroma * (1.0 - (hue_prime % 2.0 - 1.0).abs());
    let m = lightness - chroma / 2.0;

    let (r, g, b) = match hue_prime.ceil() as i64 {
        i64::MIN..=1 => (chroma, x, 0.0),
        2 => (x, chroma, 0.0),
        3 => (0.0, chroma, x),
        4 => (0.0, x, chroma),
        5 => (x, 0.0, chroma),
        6 => (chroma, 0.0, x),
        sextant => {
            tracing::error!(hue, sextant, "hue outside of [0, 360]; using black");
            return [0, 0, 0];
        }
    };
    let channel = |v: f64| round_half_down((v + m) * 255.0).clamp(0, 255) as u8;
    [channel(r), channel(g), channel(b)]
}

/// The RGB color of a value.
pub fn rgb(value: &ExtendedComplex) -> image::Rgb<u8> {
    image::Rgb(hsl_to_rgb(hsl(value)))
}
