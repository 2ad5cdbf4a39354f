//! Marker palettes built from base-color shade ramps.

use crate::color::{shade_ramp, Rgb, RAMP_LEN};
use crate::random::RandomSource;

/// An immutable, ordered set of fill colors.
///
/// Built by concatenating the shade ramp of each base color, so three base
/// colors give a 15-entry palette.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb>,
}

impl Palette {
    /// Build the palette for the given base colors.
    #[must_use]
    pub fn from_bases(bases: &[Rgb]) -> Self {
        let mut colors = Vec::with_capacity(bases.len() * RAMP_LEN);
        for &base in bases {
            colors.extend_from_slice(&shade_ramp(base));
        }
        Self { colors }
    }

    /// Wrap an explicit color list.
    #[must_use]
    pub fn from_colors(colors: Vec<Rgb>) -> Self {
        Self { colors }
    }

    /// The palette entries in order.
    #[must_use]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Whether `color` is one of the entries.
    #[must_use]
    pub fn contains(&self, color: Rgb) -> bool {
        self.colors.contains(&color)
    }

    /// Draw a uniformly random entry, or `None` for an empty palette.
    pub fn pick<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Option<Rgb> {
        if self.colors.is_empty() {
            return None;
        }
        Some(self.colors[rng.below(self.colors.len())])
    }
}
