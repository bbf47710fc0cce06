//! Error types for kvs-rs.

use thiserror::Error;

use crate::volume::GridType;

/// The main error type for kvs-rs mapping operations.
#[derive(Error, Debug)]
pub enum KvsError {
    /// The mapper requires a scalar field but the volume has several components.
    #[error("input volume is not a scalar field (veclen = {0})")]
    NotScalarField(usize),

    /// The mapper requires a 3-component vector field.
    #[error("input volume is not a 3-component vector field (veclen = {0})")]
    NotVectorField(usize),

    /// The grid type is not handled by this mapper.
    #[error("grid type {0:?} is not supported here")]
    UnsupportedGridType(GridType),

    /// Data size mismatch.
    #[error("data size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A resolution or bin count that cannot describe a grid or table.
    #[error("invalid resolution: {0}")]
    InvalidResolution(String),

    /// An image channel outside of the image's channel count.
    #[error("channel {channel} out of range for an image with {nchannels} channels")]
    InvalidChannel { channel: usize, nchannels: usize },

    /// The volume has no value samples.
    #[error("volume has no values")]
    EmptyVolume,

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for kvs-rs operations.
pub type Result<T> = std::result::Result<T, KvsError>;
