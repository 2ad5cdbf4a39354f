//! Hex color parsing, RGB/HSL conversion and shade ramps.
//!
//! Conversions use the usual chroma/hue-sector formulation. Hue sectors are
//! half-open (`[0, 60)`, `[60, 120)`, ...), so hues of exactly 0, 120 and 240
//! land in the sector that starts there.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::float_cmp)]
#![allow(clippy::many_single_char_names)]

use crate::error::ColorError;
use crate::random::RandomSource;
use std::fmt;
use std::str::FromStr;

/// Number of colors in a shade ramp.
pub const RAMP_LEN: usize = 5;

/// Lightness step between neighbouring entries of a shade ramp, in percent.
pub const RAMP_STEP: f64 = 10.0;

/// An opaque 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rgb {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// A color in HSL space.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsl {
    /// Hue in degrees, `[0, 360)`.
    pub h: f64,
    /// Saturation in percent, `[0, 100]`.
    pub s: f64,
    /// Lightness in percent, `[0, 100]`.
    pub l: f64,
}

impl Rgb {
    /// Pure white.
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    /// Create a color from its channels.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rrggbb` string, rejecting the 3-digit shorthand.
    ///
    /// This is the form accepted for base colors.
    ///
    /// # Errors
    /// Returns [`ColorError::InvalidColorFormat`] for anything but `#` followed
    /// by exactly six hex digits.
    pub fn parse_strict(s: &str) -> Result<Self, ColorError> {
        match s.strip_prefix('#') {
            Some(digits) if digits.len() == 6 => parse_digits(digits)
                .ok_or_else(|| ColorError::InvalidColorFormat(s.to_string())),
            _ => Err(ColorError::InvalidColorFormat(s.to_string())),
        }
    }

    /// Render as lowercase `#rrggbb`.
    #[must_use]
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Draw a uniformly random 24-bit color.
    pub fn random<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        let packed = (rng.next_unit() * f64::from(0x00FF_FFFF_u32)).floor() as u32;
        Self::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    /// Convert to HSL.
    #[must_use]
    pub fn to_hsl(self) -> Hsl {
        let r = f64::from(self.r) / 255.0;
        let g = f64::from(self.g) / 255.0;
        let b = f64::from(self.b) / 255.0;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl { h: 0.0, s: 0.0, l: l * 100.0 };
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        Hsl {
            h: h * 60.0,
            s: s * 100.0,
            l: l * 100.0,
        }
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    /// Parse `#rgb` or `#rrggbb`, case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('#')
            .and_then(parse_digits)
            .ok_or_else(|| ColorError::InvalidColorFormat(s.to_string()))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn parse_digits(digits: &str) -> Option<Rgb> {
    if !digits.bytes().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&digits[i..=i], 16).ok();
    let byte = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
    match digits.len() {
        3 => Some(Rgb::new(nibble(0)? * 17, nibble(1)? * 17, nibble(2)? * 17)),
        6 => Some(Rgb::new(byte(0)?, byte(2)?, byte(4)?)),
        _ => None,
    }
}

impl Hsl {
    /// Copy with a different lightness, clamped to `[0, 100]`.
    #[must_use]
    pub fn with_lightness(self, l: f64) -> Self {
        Self {
            l: l.clamp(0.0, 100.0),
            ..self
        }
    }

    /// Convert back to 8-bit RGB, rounding each channel to nearest.
    #[must_use]
    pub fn to_rgb(self) -> Rgb {
        let s = self.s / 100.0;
        let l = self.l / 100.0;
        let h = self.h;

        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = if (0.0..60.0).contains(&h) {
            (c, x, 0.0)
        } else if (60.0..120.0).contains(&h) {
            (x, c, 0.0)
        } else if (120.0..180.0).contains(&h) {
            (0.0, c, x)
        } else if (180.0..240.0).contains(&h) {
            (0.0, x, c)
        } else if (240.0..300.0).contains(&h) {
            (x, 0.0, c)
        } else if (300.0..360.0).contains(&h) {
            (c, 0.0, x)
        } else {
            (0.0, 0.0, 0.0)
        };

        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Rgb::new(channel(r), channel(g), channel(b))
    }
}

/// Expand a base color into its shade ramp, darkest first.
///
/// The ramp is `[-20, -10, base, +10, +20]` in HSL lightness, clamped to
/// `[0, 100]`; hue and saturation are kept. The middle entry is `base` itself.
#[must_use]
pub fn shade_ramp(base: Rgb) -> [Rgb; RAMP_LEN] {
    let hsl = base.to_hsl();
    let shade = |steps: f64| hsl.with_lightness(hsl.l + steps * RAMP_STEP).to_rgb();
    [shade(-2.0), shade(-1.0), base, shade(1.0), shade(2.0)]
}

/// Parse a hex color (`#rgb` or `#rrggbb`) and expand it into its shade ramp.
///
/// Shades come darkest first, ordered by lightness: `[-20, -10, base, +10, +20]`.
/// The `-20` step precedes `-10`, unlike the web form, which listed `-10` first.
///
/// # Errors
/// Returns [`ColorError::InvalidColorFormat`] if `hex` is malformed.
pub fn derive_shades(hex: &str) -> Result<[Rgb; RAMP_LEN], ColorError> {
    Ok(shade_ramp(hex.parse()?))
}
