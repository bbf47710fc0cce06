//! Typed value buffers for volume fields.
//!
//! A field is stored once in its native element type and read through a
//! single dispatch point ([`with_values!`]) instead of being converted up
//! front. Every algorithm that needs the raw type (histograms, for instance)
//! is written as a generic function over [`Scalar`] and instantiated by the
//! macro.

use serde::{Deserialize, Serialize};

/// The element kinds a field buffer may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
}

impl ScalarKind {
    /// Returns true for the integral kinds.
    #[must_use]
    pub fn is_integer(self) -> bool {
        !matches!(self, Self::F32 | Self::F64)
    }

    /// Full native value range of the 8- and 16-bit integral kinds.
    ///
    /// Wider kinds return `None`: a histogram over their whole domain would
    /// not fit in memory.
    #[must_use]
    pub fn native_range(self) -> Option<(f64, f64)> {
        match self {
            Self::I8 => Some((f64::from(i8::MIN), f64::from(i8::MAX))),
            Self::U8 => Some((0.0, f64::from(u8::MAX))),
            Self::I16 => Some((f64::from(i16::MIN), f64::from(i16::MAX))),
            Self::U16 => Some((0.0, f64::from(u16::MAX))),
            _ => None,
        }
    }
}

/// A numeric element type that can back a [`Values`] buffer.
pub trait Scalar: Copy + PartialOrd + Send + Sync + bytemuck::Pod + 'static {
    /// The runtime tag of this type.
    const KIND: ScalarKind;

    /// Widens the value to `f64`.
    fn to_f64(self) -> f64;
}

macro_rules! impl_scalar {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Scalar for $ty {
                const KIND: ScalarKind = ScalarKind::$kind;

                #[inline]
                #[allow(clippy::cast_precision_loss, clippy::cast_lossless, clippy::unnecessary_cast)]
                fn to_f64(self) -> f64 {
                    self as f64
                }
            }

            impl From<Vec<$ty>> for Values {
                fn from(values: Vec<$ty>) -> Self {
                    Values::$kind(values)
                }
            }
        )*
    };
}

/// A field buffer in one of the supported element kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Values {
    I8(Vec<i8>),
    U8(Vec<u8>),
    I16(Vec<i16>),
    U16(Vec<u16>),
    I32(Vec<i32>),
    U32(Vec<u32>),
    I64(Vec<i64>),
    U64(Vec<u64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl_scalar! {
    i8 => I8,
    u8 => U8,
    i16 => I16,
    u16 => U16,
    i32 => I32,
    u32 => U32,
    i64 => I64,
    u64 => U64,
    f32 => F32,
    f64 => F64,
}

/// Runs `$body` with `$v` bound to the typed slice inside a [`Values`].
///
/// ```
/// use kvs_core::{with_values, Scalar, Values};
///
/// let values = Values::from(vec![1_u8, 2, 3]);
/// let sum: f64 = with_values!(&values, v => v.iter().map(|x| x.to_f64()).sum());
/// assert_eq!(sum, 6.0);
/// ```
#[macro_export]
macro_rules! with_values {
    ($values:expr, $v:ident => $body:expr) => {
        match $values {
            $crate::value::Values::I8($v) => $body,
            $crate::value::Values::U8($v) => $body,
            $crate::value::Values::I16($v) => $body,
            $crate::value::Values::U16($v) => $body,
            $crate::value::Values::I32($v) => $body,
            $crate::value::Values::U32($v) => $body,
            $crate::value::Values::I64($v) => $body,
            $crate::value::Values::U64($v) => $body,
            $crate::value::Values::F32($v) => $body,
            $crate::value::Values::F64($v) => $body,
        }
    };
}

impl Values {
    /// Returns the element kind.
    #[must_use]
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::I8(_) => ScalarKind::I8,
            Self::U8(_) => ScalarKind::U8,
            Self::I16(_) => ScalarKind::I16,
            Self::U16(_) => ScalarKind::U16,
            Self::I32(_) => ScalarKind::I32,
            Self::U32(_) => ScalarKind::U32,
            Self::I64(_) => ScalarKind::I64,
            Self::U64(_) => ScalarKind::U64,
            Self::F32(_) => ScalarKind::F32,
            Self::F64(_) => ScalarKind::F64,
        }
    }

    /// Number of elements (not samples: a vector field has `veclen` elements per node).
    #[must_use]
    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads element `index` widened to `f64`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    #[inline]
    pub fn get_f64(&self, index: usize) -> f64 {
        with_values!(self, v => v[index].to_f64())
    }

    /// Euclidean norm of the `veclen` components starting at `node * veclen`.
    #[must_use]
    pub fn magnitude(&self, node: usize, veclen: usize) -> f64 {
        let base = node * veclen;
        (0..veclen)
            .map(|c| {
                let x = self.get_f64(base + c);
                x * x
            })
            .sum::<f64>()
            .sqrt()
    }

    /// The raw bytes of the buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        with_values!(self, v => bytemuck::cast_slice(v.as_slice()))
    }
}
