//! Value histograms of volumes and images.
//!
//! 8- and 16-bit integer data is binned over its native range with one bin
//! per representable value. Wider integers and floating-point data are
//! binned over the observed min/max: floats always get 100 bins, wide
//! integers one bin per value up to [`MAX_INTEGER_BINS`].

use std::ops::Index;

use kvs_core::{with_values, ImageObject, KvsError, PixelType, Result, Scalar, ScalarKind, Volume};

/// Bin count used for floating-point data.
pub const FLOAT_BINS: usize = 100;

/// Upper bound on the bin count of 32/64-bit integer data.
pub const MAX_INTEGER_BINS: usize = 1 << 16;

/// Samples closer than this to an ignore value are skipped.
const IGNORE_EPSILON: f64 = 1.0e-6;

/// A histogram with per-bin counts.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    min_range: f64,
    max_range: f64,
    max_count: usize,
    per_value: bool,
    bins: Vec<usize>,
    ignore_values: Vec<f64>,
}

impl FrequencyTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Excludes samples equal to `value` from the counts.
    pub fn set_ignore_value(&mut self, value: f64) {
        self.ignore_values.push(value);
    }

    /// Counts the samples of a scalar volume.
    ///
    /// Returns [`KvsError::NotScalarField`] for vector fields and
    /// [`KvsError::EmptyVolume`] when there is nothing to count.
    pub fn create(&mut self, volume: &Volume) -> Result<()> {
        let field = volume.field();
        if field.veclen() != 1 {
            log::error!("frequency table needs a scalar field, got veclen {}", field.veclen());
            return Err(KvsError::NotScalarField(field.veclen()));
        }
        let values = field.values();
        if values.is_empty() {
            return Err(KvsError::EmptyVolume);
        }

        let kind = values.kind();
        let (min, max) = match kind.native_range() {
            Some(range) => range,
            None => field.min_max_values(),
        };
        let nbins = bin_count(kind, min, max);
        #[allow(clippy::cast_precision_loss)]
        let per_value = kind.is_integer() && max - min < MAX_INTEGER_BINS as f64;
        self.reset(min, max, nbins, per_value);
        with_values!(values, v => self.count(v.iter().map(|x| x.to_f64())));

        log::debug!(
            "frequency table of {} {:?} samples: {} bins over [{}, {}]",
            values.len(),
            kind,
            nbins,
            min,
            max
        );
        Ok(())
    }

    /// Counts the samples of one image channel.
    pub fn create_from_image(&mut self, image: &ImageObject, channel: usize) -> Result<()> {
        let kind = match image.pixel_type() {
            PixelType::Gray16 => ScalarKind::U16,
            PixelType::Gray8 | PixelType::Color24 | PixelType::Color32 => ScalarKind::U8,
        };
        let samples = image.channel(channel)?;
        let (min, max) = kind.native_range().unwrap_or((0.0, 0.0));
        self.reset(min, max, bin_count(kind, min, max), true);
        self.count(samples.map(f64::from));
        Ok(())
    }

    #[must_use]
    pub fn min_range(&self) -> f64 {
        self.min_range
    }

    #[must_use]
    pub fn max_range(&self) -> f64 {
        self.max_range
    }

    /// Largest count over all bins.
    #[must_use]
    pub fn max_count(&self) -> usize {
        self.max_count
    }

    #[must_use]
    pub fn nbins(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Count of bin `index`, or `None` past the last bin.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.bins.get(index).copied()
    }

    fn reset(&mut self, min: f64, max: f64, nbins: usize, per_value: bool) {
        self.min_range = min;
        self.per_value = per_value;
        self.max_range = max;
        self.max_count = 0;
        self.bins.clear();
        self.bins.resize(nbins, 0);
    }

    fn count(&mut self, samples: impl Iterator<Item = f64>) {
        for value in samples {
            if self.is_ignored(value) {
                continue;
            }
            let bin = self.bin_index(value);
            self.bins[bin] += 1;
        }
        self.max_count = self.bins.iter().copied().max().unwrap_or(0);
    }

    fn is_ignored(&self, value: f64) -> bool {
        self.ignore_values
            .iter()
            .any(|&ignore| (value - ignore).abs() <= IGNORE_EPSILON * ignore.abs().max(1.0))
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn bin_index(&self, value: f64) -> usize {
        let last = self.bins.len() - 1;
        let width = self.max_range - self.min_range;
        if width <= 0.0 || last == 0 {
            return 0;
        }
        let offset = value - self.min_range;
        let bin = if self.per_value {
            offset.round()
        } else {
            offset / width * last as f64
        };
        (bin.max(0.0) as usize).min(last)
    }
}

impl Index<usize> for FrequencyTable {
    type Output = usize;

    fn index(&self, index: usize) -> &usize {
        &self.bins[index]
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn bin_count(kind: ScalarKind, min: f64, max: f64) -> usize {
    if !kind.is_integer() {
        return FLOAT_BINS;
    }
    let span = (max - min).max(0.0);
    if span >= MAX_INTEGER_BINS as f64 {
        MAX_INTEGER_BINS
    } else {
        span as usize + 1
    }
}
