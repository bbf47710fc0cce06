//! 8-bit RGB color.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// An RGB color with one byte per channel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Converts an HSV triple (all components in `[0, 1]`) to RGB.
    #[must_use]
    #[allow(clippy::many_single_char_names)]
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h = h.clamp(0.0, 1.0) * 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (r, g, b) = match sector as u32 % 6 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::from_vec3(Vec3::new(r, g, b))
    }

    /// Converts a color with components in `[0, 1]`, rounding to the nearest byte.
    #[must_use]
    pub fn from_vec3(c: Vec3) -> Self {
        let c = (c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let [r, g, b] = [c.x as u8, c.y as u8, c.z as u8];
        Self::new(r, g, b)
    }

    /// Returns the color as floats in `[0, 1]`.
    #[must_use]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(f32::from(self.r), f32::from(self.g), f32::from(self.b)) / 255.0
    }

    /// Linear blend between `self` (t = 0) and `other` (t = 1), rounded per channel.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let blend = |a: u8, b: u8| {
            let a = f32::from(a);
            let b = f32::from(b);
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let c = (a + (b - a) * t).round().clamp(0.0, 255.0) as u8;
            c
        };
        Self::new(
            blend(self.r, other.r),
            blend(self.g, other.g),
            blend(self.b, other.b),
        )
    }
}

impl From<[u8; 3]> for RgbColor {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self::new(r, g, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsv_primaries() {
        assert_eq!(RgbColor::from_hsv(0.0, 1.0, 1.0), RgbColor::new(255, 0, 0));
        assert_eq!(RgbColor::from_hsv(240.0 / 360.0, 1.0, 1.0), RgbColor::new(0, 0, 255));
        assert_eq!(RgbColor::from_hsv(120.0 / 360.0, 1.0, 1.0), RgbColor::new(0, 255, 0));
        assert_eq!(RgbColor::from_hsv(0.3, 0.0, 1.0), RgbColor::WHITE);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = RgbColor::new(10, 20, 30);
        let b = RgbColor::new(110, 0, 30);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), RgbColor::new(60, 10, 30));
    }
}
