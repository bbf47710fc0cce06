//! 2D images used as histogram sources.

use serde::{Deserialize, Serialize};

use crate::error::{KvsError, Result};

/// Pixel layout of an [`ImageObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelType {
    Gray8,
    Gray16,
    Color24,
    Color32,
}

impl PixelType {
    /// Channels per pixel.
    #[must_use]
    pub fn nchannels(self) -> usize {
        match self {
            Self::Gray8 | Self::Gray16 => 1,
            Self::Color24 => 3,
            Self::Color32 => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
}

/// A width × height image with interleaved channels.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageObject {
    width: usize,
    height: usize,
    pixel_type: PixelType,
    data: PixelData,
}

impl ImageObject {
    /// 8-bit gray image.
    pub fn gray8(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelType::Gray8, PixelData::U8(data))
    }

    /// 16-bit gray image.
    pub fn gray16(width: usize, height: usize, data: Vec<u16>) -> Result<Self> {
        Self::new(width, height, PixelType::Gray16, PixelData::U16(data))
    }

    /// RGB image, one byte per channel.
    pub fn color24(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelType::Color24, PixelData::U8(data))
    }

    /// RGBA image, one byte per channel.
    pub fn color32(width: usize, height: usize, data: Vec<u8>) -> Result<Self> {
        Self::new(width, height, PixelType::Color32, PixelData::U8(data))
    }

    fn new(width: usize, height: usize, pixel_type: PixelType, data: PixelData) -> Result<Self> {
        let expected = width * height * pixel_type.nchannels();
        let actual = match &data {
            PixelData::U8(d) => d.len(),
            PixelData::U16(d) => d.len(),
        };
        if expected != actual {
            return Err(KvsError::SizeMismatch { expected, actual });
        }
        Ok(Self {
            width,
            height,
            pixel_type,
            data,
        })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    #[must_use]
    pub fn npixels(&self) -> usize {
        self.width * self.height
    }

    /// Iterates over the samples of one channel.
    pub fn channel(&self, channel: usize) -> Result<impl Iterator<Item = u16> + '_> {
        let stride = self.pixel_type.nchannels();
        if channel >= stride {
            return Err(KvsError::InvalidChannel {
                channel,
                nchannels: stride,
            });
        }
        let samples: Box<dyn Iterator<Item = u16> + '_> = match &self.data {
            PixelData::U8(d) => Box::new(d.iter().skip(channel).step_by(stride).map(|&v| u16::from(v))),
            PixelData::U16(d) => Box::new(d.iter().skip(channel).step_by(stride).copied()),
        };
        Ok(samples)
    }
}
