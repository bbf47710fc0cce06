//! Color map: a lookup table from a table index to an RGB color.
//!
//! The table is either the default hue ramp built by [`ColorMap::create`] or is
//! rebuilt from user control points. Control points are placed over the value
//! range set with [`ColorMap::set_range`], or over the index space
//! `[0, resolution - 1]` when no range is set.

use std::ops::Index;

use crate::color::RgbColor;
use crate::error::{KvsError, Result};

/// Table size used by `Default`.
pub const DEFAULT_RESOLUTION: usize = 256;

/// A piecewise-linear table of colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    range: Option<(f32, f32)>,
    points: Vec<(f32, RgbColor)>,
    table: Vec<RgbColor>,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl ColorMap {
    /// Creates the default blue-to-red ramp with `resolution` entries.
    ///
    /// # Panics
    /// Panics if `resolution` is zero.
    #[must_use]
    pub fn new(resolution: usize) -> Self {
        let mut map = Self {
            range: None,
            points: Vec::new(),
            table: Vec::new(),
        };
        map.create(resolution);
        map
    }

    /// Wraps an existing table.
    pub fn from_table(table: Vec<RgbColor>) -> Result<Self> {
        if table.is_empty() {
            return Err(KvsError::InvalidResolution("color table is empty".into()));
        }
        Ok(Self {
            range: None,
            points: Vec::new(),
            table,
        })
    }

    /// Rebuilds the table with `resolution` entries.
    ///
    /// Without control points the table sweeps the hue from 240° (blue) down
    /// to 0° (red) at full saturation and value. With control points the
    /// table interpolates between them.
    ///
    /// # Panics
    /// Panics if `resolution` is zero.
    pub fn create(&mut self, resolution: usize) {
        assert!(resolution > 0, "color map resolution must be positive");
        self.table = if self.points.is_empty() {
            hue_ramp(resolution)
        } else {
            self.table_from_points(resolution)
        };
    }

    /// Adds a control point; takes effect on the next [`create`](Self::create).
    pub fn add_point(&mut self, value: f32, color: RgbColor) {
        self.points.push((value, color));
        self.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    /// Removes every control point.
    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    /// Sets the value range the control points refer to.
    pub fn set_range(&mut self, min_value: f32, max_value: f32) {
        self.range = Some((min_value, max_value));
    }

    /// Returns true if a non-degenerate value range is set.
    #[must_use]
    pub fn has_range(&self) -> bool {
        self.range.is_some_and(|(lo, hi)| lo < hi)
    }

    #[must_use]
    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    #[must_use]
    pub fn points(&self) -> &[(f32, RgbColor)] {
        &self.points
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn table(&self) -> &[RgbColor] {
        &self.table
    }

    /// Exact table lookup.
    ///
    /// # Panics
    /// Panics if `index >= resolution()`.
    #[must_use]
    pub fn get(&self, index: usize) -> RgbColor {
        assert!(
            index < self.resolution(),
            "color map index {index} out of range ({})",
            self.resolution()
        );
        self.table[index]
    }

    /// Interpolated lookup at a fractional table index.
    ///
    /// The caller clamps `index` to `[0, resolution - 1]`; this is checked in
    /// debug builds only.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn at(&self, index: f32) -> RgbColor {
        debug_assert!(
            (0.0..=(self.resolution() - 1) as f32).contains(&index),
            "color map index {index} out of range"
        );
        let last = self.resolution() - 1;
        let s0 = (index.max(0.0) as usize).min(last);
        if s0 == last {
            return self.table[last];
        }
        self.table[s0].lerp(self.table[s0 + 1], index - s0 as f32)
    }

    #[allow(clippy::cast_precision_loss)]
    fn table_from_points(&self, resolution: usize) -> Vec<RgbColor> {
        let (lo, hi) = match self.range {
            Some((lo, hi)) if lo < hi => (lo, hi),
            _ => (0.0, (resolution - 1) as f32),
        };
        let step = if resolution > 1 {
            (hi - lo) / (resolution - 1) as f32
        } else {
            0.0
        };
        (0..resolution)
            .map(|i| sample_points(&self.points, lo + step * i as f32, RgbColor::lerp))
            .collect()
    }
}

impl Index<usize> for ColorMap {
    type Output = RgbColor;

    fn index(&self, index: usize) -> &RgbColor {
        assert!(
            index < self.resolution(),
            "color map index {index} out of range ({})",
            self.resolution()
        );
        &self.table[index]
    }
}

#[allow(clippy::cast_precision_loss)]
fn hue_ramp(resolution: usize) -> Vec<RgbColor> {
    const MAX_HUE: f32 = 240.0;
    let increment = if resolution > 1 {
        MAX_HUE / (resolution - 1) as f32
    } else {
        0.0
    };
    (0..resolution)
        .map(|i| RgbColor::from_hsv((MAX_HUE - increment * i as f32) / 360.0, 1.0, 1.0))
        .collect()
}

/// Evaluates sorted control points at `value`, holding the end values outside them.
pub(crate) fn sample_points<T: Copy>(points: &[(f32, T)], value: f32, lerp: impl Fn(T, T, f32) -> T) -> T {
    let first = points[0];
    if value <= first.0 {
        return first.1;
    }
    for pair in points.windows(2) {
        let (v0, c0) = pair[0];
        let (v1, c1) = pair[1];
        if value <= v1 {
            let t = if v1 > v0 { (value - v0) / (v1 - v0) } else { 1.0 };
            return lerp(c0, c1, t);
        }
    }
    points[points.len() - 1].1
}
