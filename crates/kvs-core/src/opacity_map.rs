//! Opacity map: a lookup table from a table index to an opacity in `[0, 1]`.

use std::ops::Index;

use crate::color_map::{sample_points, DEFAULT_RESOLUTION};
use crate::error::{KvsError, Result};

/// A piecewise-linear table of opacities.
#[derive(Debug, Clone, PartialEq)]
pub struct OpacityMap {
    range: Option<(f32, f32)>,
    points: Vec<(f32, f32)>,
    table: Vec<f32>,
}

impl Default for OpacityMap {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl OpacityMap {
    /// Creates a linear 0 → 1 ramp with `resolution` entries.
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

    /// Wraps an existing table. Entries are clamped to `[0, 1]`.
    pub fn from_table(table: Vec<f32>) -> Result<Self> {
        if table.is_empty() {
            return Err(KvsError::InvalidResolution("opacity table is empty".into()));
        }
        Ok(Self {
            range: None,
            points: Vec::new(),
            table: table.into_iter().map(|a| a.clamp(0.0, 1.0)).collect(),
        })
    }

    /// Rebuilds the table with `resolution` entries from the control points,
    /// or as a linear ramp when there are none.
    ///
    /// # Panics
    /// Panics if `resolution` is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn create(&mut self, resolution: usize) {
        assert!(resolution > 0, "opacity map resolution must be positive");
        let denom = (resolution.max(2) - 1) as f32;
        if self.points.is_empty() {
            self.table = (0..resolution).map(|i| i as f32 / denom).collect();
            return;
        }
        let (lo, hi) = match self.range {
            Some((lo, hi)) if lo < hi => (lo, hi),
            _ => (0.0, (resolution - 1) as f32),
        };
        let step = (hi - lo) / denom;
        self.table = (0..resolution)
            .map(|i| sample_points(&self.points, lo + step * i as f32, |a, b, t| a + (b - a) * t))
            .collect();
    }

    /// Adds a control point; takes effect on the next [`create`](Self::create).
    pub fn add_point(&mut self, value: f32, opacity: f32) {
        self.points.push((value, opacity.clamp(0.0, 1.0)));
        self.points.sort_by(|a, b| a.0.total_cmp(&b.0));
    }

    pub fn clear_points(&mut self) {
        self.points.clear();
    }

    pub fn set_range(&mut self, min_value: f32, max_value: f32) {
        self.range = Some((min_value, max_value));
    }

    #[must_use]
    pub fn has_range(&self) -> bool {
        self.range.is_some_and(|(lo, hi)| lo < hi)
    }

    #[must_use]
    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    #[must_use]
    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    #[must_use]
    pub fn resolution(&self) -> usize {
        self.table.len()
    }

    #[must_use]
    pub fn table(&self) -> &[f32] {
        &self.table
    }

    /// Exact table lookup.
    ///
    /// # Panics
    /// Panics if `index >= resolution()`.
    #[must_use]
    pub fn get(&self, index: usize) -> f32 {
        self[index]
    }

    /// Interpolated lookup at a fractional table index in `[0, resolution - 1]`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn at(&self, index: f32) -> f32 {
        debug_assert!(
            (0.0..=(self.resolution() - 1) as f32).contains(&index),
            "opacity map index {index} out of range"
        );
        let last = self.resolution() - 1;
        let s0 = (index.max(0.0) as usize).min(last);
        if s0 == last {
            return self.table[last];
        }
        let t = index - s0 as f32;
        self.table[s0] + (self.table[s0 + 1] - self.table[s0]) * t
    }
}

impl Index<usize> for OpacityMap {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        assert!(
            index < self.resolution(),
            "opacity map index {index} out of range ({})",
            self.resolution()
        );
        &self.table[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_ramp() {
        let map = OpacityMap::new(5);
        assert_eq!(map.table(), &[0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!((map.at(1.5) - 0.375).abs() < 1e-6);
    }

    #[test]
    fn test_from_table_clamps_and_clear_points() {
        let map = OpacityMap::from_table(vec![-1.0, 0.5, 2.0]).unwrap();
        assert_eq!(map.table(), &[0.0, 0.5, 1.0]);
        assert!(OpacityMap::from_table(Vec::new()).is_err());

        let mut map = OpacityMap::new(3);
        map.add_point(0.0, 1.0);
        map.add_point(2.0, 1.0);
        map.create(3);
        assert_eq!(map.table(), &[1.0, 1.0, 1.0]);
        map.clear_points();
        map.create(3);
        assert_eq!(map.table(), &[0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_points() {
        let mut map = OpacityMap::new(3);
        map.set_range(0.0, 10.0);
        map.add_point(0.0, 1.0);
        map.add_point(10.0, 0.0);
        map.create(3);
        assert_eq!(map.table(), &[1.0, 0.5, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_at_is_exact_on_integers_and_bounded_between(resolution in 2_usize..1024, pick in 0.0_f64..1.0) {
            let map = OpacityMap::new(resolution);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
            let i = ((resolution - 2) as f64 * pick) as usize;
            #[allow(clippy::cast_precision_loss)]
            let (exact, mid) = (map.at(i as f32), map.at(i as f32 + 0.5));
            prop_assert_eq!(exact, map[i]);
            prop_assert!(mid >= map[i] && mid <= map[i + 1]);
        }
    }
}
