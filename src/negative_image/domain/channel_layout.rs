use image::ColorType;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Gray,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn from_channel_count(channels: u8) -> Result<Self, DomainError> {
        match channels {
            1 => Ok(ChannelLayout::Gray),
            3 => Ok(ChannelLayout::Rgb),
            4 => Ok(ChannelLayout::Rgba),
            n => Err(DomainError::UnsupportedFormat {
                channels: n,
                detail: format!("expected 1, 3 or 4 channels, got {}", n),
            }),
        }
    }

    pub fn of(color: ColorType) -> Result<Self, DomainError> {
        Self::from_channel_count(color.channel_count()).map_err(|_| DomainError::UnsupportedFormat {
            channels: color.channel_count(),
            detail: format!("{:?}", color),
        })
    }

    pub fn channel_count(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    // アルファはこの後ろ
    pub fn color_channels(self) -> usize {
        match self {
            ChannelLayout::Gray => 1,
            ChannelLayout::Rgb | ChannelLayout::Rgba => 3,
        }
    }
}
