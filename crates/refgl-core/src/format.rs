//! # Pixel Formats
//!
//! Generic texel format description and the mapping seam between GL
//! format enums and that description.
//!
//! A [`TextureFormat`] is what storage is allocated in. GL talks about
//! formats two ways: a sized internal format (`GL_RGBA8`) and a transfer
//! pair (`GL_RGBA` + `GL_UNSIGNED_BYTE`). A [`FormatMapper`] converts in
//! both directions. [`StandardFormats`] covers the formats the reference
//! context allocates itself; a conformance harness can supply a fuller
//! table.

use crate::enums::*;
use crate::error::{FormatError, Result};
use crate::types::GLenum;

// =============================================================================
// GENERIC FORMAT
// =============================================================================

/// Channel layout of a texel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelOrder {
    /// Red
    R,
    /// Red, green
    RG,
    /// Red, green, blue
    RGB,
    /// Red, green, blue, alpha
    RGBA,
    /// Alpha only
    A,
    /// Luminance
    L,
    /// Luminance, alpha
    LA,
    /// Depth
    D,
    /// Stencil
    S,
    /// Depth and stencil
    DS,
}

impl ChannelOrder {
    /// Number of logical channels
    pub const fn channel_count(self) -> usize {
        match self {
            Self::R | Self::A | Self::L | Self::D | Self::S => 1,
            Self::RG | Self::LA | Self::DS => 2,
            Self::RGB => 3,
            Self::RGBA => 4,
        }
    }
}

/// Storage type of a texel's channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelType {
    /// 8-bit unsigned normalized per channel
    UnormInt8,
    /// 16-bit unsigned normalized per channel
    UnormInt16,
    /// 32-bit unsigned normalized per channel
    UnormInt32,
    /// Packed 4:4:4:4 in 16 bits
    UnormShort4444,
    /// Packed 5:5:5:1 in 16 bits
    UnormShort5551,
    /// Packed 5:6:5 in 16 bits
    UnormShort565,
    /// 8-bit unsigned integer per channel
    UnsignedInt8,
    /// 24-bit depth in the high bits, 8-bit stencil in the low bits
    UnsignedInt24_8,
    /// 32-bit float per channel
    Float,
    /// 32-bit float depth followed by a 32-bit word with stencil in the low byte
    FloatUnsignedInt24_8Rev,
}

/// Generic texel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureFormat {
    /// Channel layout
    pub order: ChannelOrder,
    /// Channel storage
    pub channel_type: ChannelType,
}

impl TextureFormat {
    /// Create format
    pub const fn new(order: ChannelOrder, channel_type: ChannelType) -> Self {
        Self { order, channel_type }
    }

    /// Size of one texel in bytes
    pub const fn pixel_size(&self) -> usize {
        let channels = self.order.channel_count();
        match self.channel_type {
            ChannelType::UnormInt8 | ChannelType::UnsignedInt8 => channels,
            ChannelType::UnormInt16 => channels * 2,
            ChannelType::UnormInt32 | ChannelType::Float => channels * 4,
            ChannelType::UnormShort4444
            | ChannelType::UnormShort5551
            | ChannelType::UnormShort565 => 2,
            ChannelType::UnsignedInt24_8 => 4,
            ChannelType::FloatUnsignedInt24_8Rev => 8,
        }
    }

    /// Has a depth channel
    pub const fn has_depth(&self) -> bool {
        matches!(self.order, ChannelOrder::D | ChannelOrder::DS)
    }

    /// Has a stencil channel
    pub const fn has_stencil(&self) -> bool {
        matches!(self.order, ChannelOrder::S | ChannelOrder::DS)
    }

    /// Color format (neither depth nor stencil)
    pub const fn is_color(&self) -> bool {
        !self.has_depth() && !self.has_stencil()
    }

    /// Unnormalized integer color format
    pub const fn is_integer(&self) -> bool {
        self.is_color() && matches!(self.channel_type, ChannelType::UnsignedInt8)
    }
}

/// GL transfer format pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferFormat {
    /// Pixel format (`GL_RGBA`, `GL_DEPTH_COMPONENT`, ...)
    pub format: GLenum,
    /// Data type (`GL_UNSIGNED_BYTE`, `GL_FLOAT`, ...)
    pub data_type: GLenum,
}

impl TransferFormat {
    /// Create transfer format
    pub const fn new(format: GLenum, data_type: GLenum) -> Self {
        Self { format, data_type }
    }
}

// =============================================================================
// FORMAT MAPPER
// =============================================================================

/// Converts between GL format enums and generic formats.
pub trait FormatMapper {
    /// Generic format to transfer pair
    fn to_transfer_format(&self, format: TextureFormat) -> Result<TransferFormat>;

    /// Generic format to sized internal format
    fn to_internal_format(&self, format: TextureFormat) -> Result<GLenum>;

    /// Transfer pair to generic format
    fn from_transfer_format(&self, format: GLenum, data_type: GLenum) -> Result<TextureFormat>;

    /// Sized internal format to generic format
    fn from_internal_format(&self, internal_format: GLenum) -> Result<TextureFormat>;
}

use ChannelOrder as O;
use ChannelType as T;

const TRANSFER_TABLE: &[(GLenum, GLenum, TextureFormat)] = &[
    (GL_RGBA, GL_UNSIGNED_BYTE, TextureFormat::new(O::RGBA, T::UnormInt8)),
    (GL_RGB, GL_UNSIGNED_BYTE, TextureFormat::new(O::RGB, T::UnormInt8)),
    (GL_RG, GL_UNSIGNED_BYTE, TextureFormat::new(O::RG, T::UnormInt8)),
    (GL_RED, GL_UNSIGNED_BYTE, TextureFormat::new(O::R, T::UnormInt8)),
    (GL_ALPHA, GL_UNSIGNED_BYTE, TextureFormat::new(O::A, T::UnormInt8)),
    (GL_LUMINANCE, GL_UNSIGNED_BYTE, TextureFormat::new(O::L, T::UnormInt8)),
    (GL_LUMINANCE_ALPHA, GL_UNSIGNED_BYTE, TextureFormat::new(O::LA, T::UnormInt8)),
    (GL_RGBA, GL_UNSIGNED_SHORT_4_4_4_4, TextureFormat::new(O::RGBA, T::UnormShort4444)),
    (GL_RGBA, GL_UNSIGNED_SHORT_5_5_5_1, TextureFormat::new(O::RGBA, T::UnormShort5551)),
    (GL_RGB, GL_UNSIGNED_SHORT_5_6_5, TextureFormat::new(O::RGB, T::UnormShort565)),
    (GL_RGBA, GL_FLOAT, TextureFormat::new(O::RGBA, T::Float)),
    (GL_RGB, GL_FLOAT, TextureFormat::new(O::RGB, T::Float)),
    (GL_RG, GL_FLOAT, TextureFormat::new(O::RG, T::Float)),
    (GL_RED, GL_FLOAT, TextureFormat::new(O::R, T::Float)),
    (GL_DEPTH_COMPONENT, GL_UNSIGNED_SHORT, TextureFormat::new(O::D, T::UnormInt16)),
    (GL_DEPTH_COMPONENT, GL_UNSIGNED_INT, TextureFormat::new(O::D, T::UnormInt32)),
    (GL_DEPTH_COMPONENT, GL_FLOAT, TextureFormat::new(O::D, T::Float)),
    (GL_DEPTH_STENCIL, GL_UNSIGNED_INT_24_8, TextureFormat::new(O::DS, T::UnsignedInt24_8)),
    (
        GL_DEPTH_STENCIL,
        GL_FLOAT_32_UNSIGNED_INT_24_8_REV,
        TextureFormat::new(O::DS, T::FloatUnsignedInt24_8Rev),
    ),
    (GL_STENCIL_INDEX, GL_UNSIGNED_BYTE, TextureFormat::new(O::S, T::UnsignedInt8)),
];

const INTERNAL_TABLE: &[(GLenum, TextureFormat)] = &[
    (GL_RGBA8, TextureFormat::new(O::RGBA, T::UnormInt8)),
    (GL_RGB8, TextureFormat::new(O::RGB, T::UnormInt8)),
    (GL_RG8, TextureFormat::new(O::RG, T::UnormInt8)),
    (GL_R8, TextureFormat::new(O::R, T::UnormInt8)),
    (GL_RGBA4, TextureFormat::new(O::RGBA, T::UnormShort4444)),
    (GL_RGB5_A1, TextureFormat::new(O::RGBA, T::UnormShort5551)),
    (GL_RGB565, TextureFormat::new(O::RGB, T::UnormShort565)),
    (GL_RGBA32F, TextureFormat::new(O::RGBA, T::Float)),
    (GL_RG32F, TextureFormat::new(O::RG, T::Float)),
    (GL_R32F, TextureFormat::new(O::R, T::Float)),
    (GL_DEPTH_COMPONENT16, TextureFormat::new(O::D, T::UnormInt16)),
    (GL_DEPTH_COMPONENT24, TextureFormat::new(O::D, T::UnsignedInt24_8)),
    (GL_DEPTH_COMPONENT32F, TextureFormat::new(O::D, T::Float)),
    (GL_DEPTH24_STENCIL8, TextureFormat::new(O::DS, T::UnsignedInt24_8)),
    (GL_DEPTH32F_STENCIL8, TextureFormat::new(O::DS, T::FloatUnsignedInt24_8Rev)),
    (GL_STENCIL_INDEX8, TextureFormat::new(O::S, T::UnsignedInt8)),
];

/// Format table covering the formats the reference context allocates.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFormats;

impl FormatMapper for StandardFormats {
    fn to_transfer_format(&self, format: TextureFormat) -> Result<TransferFormat> {
        TRANSFER_TABLE
            .iter()
            .find(|(_, _, f)| *f == format)
            .map(|&(format, data_type, _)| TransferFormat::new(format, data_type))
            .ok_or(FormatError::NoTransferFormat)
    }

    fn to_internal_format(&self, format: TextureFormat) -> Result<GLenum> {
        INTERNAL_TABLE
            .iter()
            .find(|(_, f)| *f == format)
            .map(|&(internal, _)| internal)
            .ok_or(FormatError::NoInternalFormat)
    }

    fn from_transfer_format(&self, format: GLenum, data_type: GLenum) -> Result<TextureFormat> {
        TRANSFER_TABLE
            .iter()
            .find(|(f, t, _)| *f == format && *t == data_type)
            .map(|&(_, _, generic)| generic)
            .ok_or(FormatError::UnknownTransferFormat { format, data_type })
    }

    fn from_internal_format(&self, internal_format: GLenum) -> Result<TextureFormat> {
        INTERNAL_TABLE
            .iter()
            .find(|(f, _)| *f == internal_format)
            .map(|&(_, generic)| generic)
            .ok_or(FormatError::UnknownInternalFormat(internal_format))
    }
}

// =============================================================================
// ENUM CLASSIFICATION
// =============================================================================

/// Whether `format` is a GL pixel (transfer) format enum
pub fn is_pixel_format_enum(format: GLenum) -> bool {
    matches!(
        format,
        GL_RED
            | GL_RG
            | GL_RGB
            | GL_RGBA
            | GL_ALPHA
            | GL_LUMINANCE
            | GL_LUMINANCE_ALPHA
            | GL_RED_INTEGER
            | GL_RGBA_INTEGER
            | GL_DEPTH_COMPONENT
            | GL_DEPTH_STENCIL
            | GL_STENCIL_INDEX
    )
}

/// Whether `data_type` is a GL pixel data type enum
pub fn is_pixel_type_enum(data_type: GLenum) -> bool {
    matches!(
        data_type,
        GL_BYTE
            | GL_UNSIGNED_BYTE
            | GL_SHORT
            | GL_UNSIGNED_SHORT
            | GL_INT
            | GL_UNSIGNED_INT
            | GL_FLOAT
            | GL_HALF_FLOAT
            | GL_UNSIGNED_SHORT_4_4_4_4
            | GL_UNSIGNED_SHORT_5_5_5_1
            | GL_UNSIGNED_SHORT_5_6_5
            | GL_UNSIGNED_INT_2_10_10_10_REV
            | GL_UNSIGNED_INT_24_8
            | GL_FLOAT_32_UNSIGNED_INT_24_8_REV
    )
}

/// Storage format of an unsized base internal format (`GL_RGBA`, `GL_RGB`,
/// `GL_ALPHA`, `GL_LUMINANCE`, `GL_LUMINANCE_ALPHA`). Unsized formats always
/// store 8-bit normalized channels.
pub fn unsized_texture_format(internal_format: GLenum) -> Option<TextureFormat> {
    let order = match internal_format {
        GL_RGBA => O::RGBA,
        GL_RGB => O::RGB,
        GL_ALPHA => O::A,
        GL_LUMINANCE => O::L,
        GL_LUMINANCE_ALPHA => O::LA,
        _ => return None,
    };
    Some(TextureFormat::new(order, T::UnormInt8))
}
