//! Transfer function: a color map and an opacity map of one resolution.

use crate::color::RgbColor;
use crate::color_map::{ColorMap, DEFAULT_RESOLUTION};
use crate::error::{KvsError, Result};
use crate::opacity_map::OpacityMap;
use crate::volume::Volume;

/// Maps a table index to a color and an opacity.
///
/// Both maps always have the same resolution. The optional value range tells
/// mappers which scalar maps to index 0 and which to the last index; without
/// it they use the volume's min/max values.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    color_map: ColorMap,
    opacity_map: OpacityMap,
    range: Option<(f32, f32)>,
}

impl Default for TransferFunction {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

impl TransferFunction {
    /// Default color and opacity ramps with `resolution` entries.
    #[must_use]
    pub fn new(resolution: usize) -> Self {
        Self {
            color_map: ColorMap::new(resolution),
            opacity_map: OpacityMap::new(resolution),
            range: None,
        }
    }

    /// Uses `color_map` and a default opacity ramp of the same resolution.
    #[must_use]
    pub fn from_color_map(color_map: ColorMap) -> Self {
        let opacity_map = OpacityMap::new(color_map.resolution());
        Self {
            color_map,
            opacity_map,
            range: None,
        }
    }

    /// Uses `opacity_map` and a default color ramp of the same resolution.
    #[must_use]
    pub fn from_opacity_map(opacity_map: OpacityMap) -> Self {
        let color_map = ColorMap::new(opacity_map.resolution());
        Self {
            color_map,
            opacity_map,
            range: None,
        }
    }

    /// Combines two maps, which must have the same resolution.
    pub fn from_maps(color_map: ColorMap, opacity_map: OpacityMap) -> Result<Self> {
        check_resolution(color_map.resolution(), opacity_map.resolution())?;
        Ok(Self {
            color_map,
            opacity_map,
            range: None,
        })
    }

    /// Rebuilds both maps with `resolution` entries.
    pub fn create(&mut self, resolution: usize) {
        self.color_map.create(resolution);
        self.opacity_map.create(resolution);
    }

    /// Replaces the color map; its resolution must match the opacity map.
    pub fn set_color_map(&mut self, color_map: ColorMap) -> Result<()> {
        check_resolution(color_map.resolution(), self.opacity_map.resolution())?;
        self.color_map = color_map;
        Ok(())
    }

    /// Replaces the opacity map; its resolution must match the color map.
    pub fn set_opacity_map(&mut self, opacity_map: OpacityMap) -> Result<()> {
        check_resolution(self.color_map.resolution(), opacity_map.resolution())?;
        self.opacity_map = opacity_map;
        Ok(())
    }

    /// Sets the scalar range mapped onto the table, on both maps as well.
    pub fn set_range(&mut self, min_value: f32, max_value: f32) {
        self.range = Some((min_value, max_value));
        self.color_map.set_range(min_value, max_value);
        self.opacity_map.set_range(min_value, max_value);
    }

    /// Sets the range to the min/max values of `volume`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn adjust_range(&mut self, volume: &Volume) {
        let (lo, hi) = volume.field().min_max_values();
        self.set_range(lo as f32, hi as f32);
    }

    #[must_use]
    pub fn has_range(&self) -> bool {
        self.range.is_some()
    }

    #[must_use]
    pub fn range(&self) -> Option<(f32, f32)> {
        self.range
    }

    #[must_use]
    pub fn color_map(&self) -> &ColorMap {
        &self.color_map
    }

    #[must_use]
    pub fn opacity_map(&self) -> &OpacityMap {
        &self.opacity_map
    }

    /// Table resolution shared by both maps.
    ///
    /// # Panics
    /// Panics if the maps disagree, which no mutator allows.
    #[must_use]
    pub fn resolution(&self) -> usize {
        assert_eq!(
            self.color_map.resolution(),
            self.opacity_map.resolution(),
            "color and opacity map resolutions differ"
        );
        self.color_map.resolution()
    }

    /// Color and opacity at a fractional table index.
    #[must_use]
    pub fn at(&self, index: f32) -> (RgbColor, f32) {
        (self.color_map.at(index), self.opacity_map.at(index))
    }
}

fn check_resolution(color: usize, opacity: usize) -> Result<()> {
    if color == opacity {
        Ok(())
    } else {
        Err(KvsError::SizeMismatch {
            expected: color,
            actual: opacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::StructuredVolume;
    use glam::UVec3;

    #[test]
    fn test_auto_sized_companion_map() {
        let tfunc = TransferFunction::from_color_map(ColorMap::new(64));
        assert_eq!(tfunc.resolution(), 64);
        let tfunc = TransferFunction::from_opacity_map(OpacityMap::new(16));
        assert_eq!(tfunc.color_map().resolution(), 16);
    }

    #[test]
    fn test_mismatched_maps_are_rejected() {
        assert!(TransferFunction::from_maps(ColorMap::new(8), OpacityMap::new(16)).is_err());
        let mut tfunc = TransferFunction::new(8);
        assert!(tfunc.set_opacity_map(OpacityMap::new(9)).is_err());
        assert_eq!(tfunc.resolution(), 8);
        tfunc.create(32);
        assert_eq!(tfunc.resolution(), 32);
    }

    #[test]
    fn test_adjust_range_from_volume() {
        let values: Vec<i16> = vec![-4, 0, 2, 8, 1, 1, 1, 1];
        let volume: Volume = StructuredVolume::uniform_in_index_space(UVec3::splat(2), 1, values)
            .unwrap()
            .into();
        let mut tfunc = TransferFunction::default();
        assert!(!tfunc.has_range());
        tfunc.adjust_range(&volume);
        assert_eq!(tfunc.range(), Some((-4.0, 8.0)));
        assert_eq!(tfunc.color_map().range(), Some((-4.0, 8.0)));
    }
}
