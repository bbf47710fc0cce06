//! Scalar value to transfer-function table index.

use kvs_core::{Field, TransferFunction};

/// Maps field values onto `[0, resolution - 1]`.
///
/// The range comes from the transfer function when it has one, otherwise
/// from the field's min/max values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Normalizer {
    min: f64,
    max: f64,
    last: f64,
}

impl Normalizer {
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn new(tfunc: &TransferFunction, field: &Field) -> Self {
        let (min, max) = match tfunc.range() {
            Some((lo, hi)) => (f64::from(lo), f64::from(hi)),
            None => field.min_max_values(),
        };
        if max <= min {
            log::warn!("degenerate value range [{min}, {max}]; every value maps to index 0");
        }
        Self {
            min,
            max,
            last: (tfunc.resolution().max(1) - 1) as f64,
        }
    }

    /// Fractional table index of `value`, clamped to the table.
    ///
    /// A zero-width range and non-finite values map to 0.
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) fn index(&self, value: f64) -> f32 {
        if self.max <= self.min || !value.is_finite() {
            return 0.0;
        }
        let t = (value - self.min) / (self.max - self.min);
        (t * self.last).clamp(0.0, self.last) as f32
    }

    /// Integer table index of `value` (truncated).
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn level(&self, value: f64) -> usize {
        self.index(value) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvs_core::Values;

    fn field(values: Vec<f32>) -> Field {
        Field::new(values.len(), 1, Values::from(values)).unwrap()
    }

    #[test]
    fn test_uses_field_range_without_tfunc_range() {
        let tf = TransferFunction::new(256);
        let n = Normalizer::new(&tf, &field(vec![0.0, 10.0, 5.0]));
        assert_eq!(n.level(5.0), 127);
        assert!((n.index(10.0) - 255.0).abs() < 1e-4);
    }

    #[test]
    fn test_tfunc_range_wins_and_clamps() {
        let mut tf = TransferFunction::new(11);
        tf.set_range(0.0, 1.0);
        let n = Normalizer::new(&tf, &field(vec![-5.0, 5.0]));
        assert!((n.index(0.5) - 5.0).abs() < 1e-5);
        assert!(n.index(3.0) <= 10.0);
        assert!(n.index(-3.0) >= 0.0);
    }

    #[test]
    fn test_constant_field_maps_to_zero() {
        let tf = TransferFunction::new(256);
        let n = Normalizer::new(&tf, &field(vec![2.0, 2.0]));
        assert_eq!(n.level(2.0), 0);
    }

    #[test]
    fn test_non_finite_values_map_to_zero() {
        let tf = TransferFunction::new(256);
        let n = Normalizer::new(&tf, &field(vec![0.0, f32::NAN, 10.0, f32::INFINITY, f32::NEG_INFINITY]));
        assert_eq!(n.index(f64::NAN), 0.0);
        assert_eq!(n.index(f64::INFINITY), 0.0);
        assert_eq!(n.index(f64::NEG_INFINITY), 0.0);
        assert_eq!(n.level(5.0), 127);
    }
}
