//! # Context Configuration
//!
//! Describes the default framebuffer a context renders to when no
//! framebuffer object is bound, and the limits it reports.

use refgl_core::{ChannelOrder, ChannelType, ContextLimits, TextureFormat};

use crate::pixel::PixelBuffer;

// =============================================================================
// CONTEXT CONFIGURATION
// =============================================================================

/// Color buffer format of the default framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorBufferFormat {
    /// 8-bit RGBA
    #[default]
    Rgba8,
    /// 8-bit RGB
    Rgb8,
    /// 4-bit RGBA
    Rgba4,
    /// 5-5-5-1 RGBA
    Rgb5A1,
    /// 5-6-5 RGB
    Rgb565,
    /// 32-bit float RGBA
    Rgba32F,
}

impl ColorBufferFormat {
    /// Storage format
    pub const fn texture_format(self) -> TextureFormat {
        use ChannelOrder as O;
        use ChannelType as T;
        match self {
            Self::Rgba8 => TextureFormat::new(O::RGBA, T::UnormInt8),
            Self::Rgb8 => TextureFormat::new(O::RGB, T::UnormInt8),
            Self::Rgba4 => TextureFormat::new(O::RGBA, T::UnormShort4444),
            Self::Rgb5A1 => TextureFormat::new(O::RGBA, T::UnormShort5551),
            Self::Rgb565 => TextureFormat::new(O::RGB, T::UnormShort565),
            Self::Rgba32F => TextureFormat::new(O::RGBA, T::Float),
        }
    }
}

/// Reference context configuration
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Default framebuffer width
    pub width: u32,
    /// Default framebuffer height
    pub height: u32,
    /// Samples per pixel, 1 = single-sampled
    pub samples: u32,
    /// Default color buffer format
    pub color: ColorBufferFormat,
    /// Depth bits, 0 = no depth buffer
    pub depth_bits: u32,
    /// Stencil bits, 0 = no stencil buffer
    pub stencil_bits: u32,
    /// Implementation limits
    pub limits: ContextLimits,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            samples: 1,
            color: ColorBufferFormat::Rgba8,
            depth_bits: 24,
            stencil_bits: 8,
            limits: ContextLimits::default(),
        }
    }
}

impl ContextConfig {
    /// Configuration with a `width`×`height` default framebuffer
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Set sample count
    pub fn with_samples(mut self, samples: u32) -> Self {
        self.samples = samples;
        self
    }

    /// Set color buffer format
    pub fn with_color(mut self, color: ColorBufferFormat) -> Self {
        self.color = color;
        self
    }

    /// Set depth and stencil bits
    pub fn with_depth_stencil(mut self, depth_bits: u32, stencil_bits: u32) -> Self {
        self.depth_bits = depth_bits;
        self.stencil_bits = stencil_bits;
        self
    }

    /// Set limits
    pub fn with_limits(mut self, limits: ContextLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Depth buffer format, if any
    pub fn depth_format(&self) -> Option<TextureFormat> {
        let channel_type = match self.depth_bits {
            0 => return None,
            1..=16 => ChannelType::UnormInt16,
            17..=24 => ChannelType::UnsignedInt24_8,
            _ => ChannelType::Float,
        };
        Some(TextureFormat::new(ChannelOrder::D, channel_type))
    }

    /// Stencil buffer format, if any
    pub fn stencil_format(&self) -> Option<TextureFormat> {
        (self.stencil_bits > 0).then(|| TextureFormat::new(ChannelOrder::S, ChannelType::UnsignedInt8))
    }
}

// =============================================================================
// DEFAULT FRAMEBUFFER
// =============================================================================

/// Buffers of the default framebuffer, zero-filled at creation
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultFramebuffer {
    /// Color buffer, possibly multisampled
    pub color: PixelBuffer,
    /// Depth buffer
    pub depth: Option<PixelBuffer>,
    /// Stencil buffer
    pub stencil: Option<PixelBuffer>,
}

impl DefaultFramebuffer {
    /// Allocate the buffers described by `config`
    pub fn new(config: &ContextConfig) -> Self {
        let samples = config.samples.max(1);
        let alloc = |format| PixelBuffer::with_samples(format, samples, config.width, config.height, 1);
        log::debug!(
            "Default framebuffer {}x{} ({} samples, {:?}, depth {}, stencil {})",
            config.width,
            config.height,
            samples,
            config.color,
            config.depth_bits,
            config.stencil_bits
        );
        Self {
            color: alloc(config.color.texture_format()),
            depth: config.depth_format().map(alloc),
            stencil: config.stencil_format().map(alloc),
        }
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.color.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.color.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_buffers() {
        let fb = DefaultFramebuffer::new(&ContextConfig::new(8, 4));
        assert_eq!((fb.width(), fb.height()), (8, 4));
        assert_eq!(fb.color.samples(), 1);
        assert!(fb.depth.as_ref().is_some_and(|d| d.format().has_depth()));
        assert!(fb.stencil.as_ref().is_some_and(|s| s.format().has_stencil()));
        assert!(fb.color.data().iter().all(|b| *b == 0));
    }

    #[test]
    fn test_no_depth_stencil() {
        let config = ContextConfig::new(2, 2).with_depth_stencil(0, 0).with_samples(4);
        let fb = DefaultFramebuffer::new(&config);
        assert!(fb.depth.is_none());
        assert!(fb.stencil.is_none());
        assert_eq!(fb.color.samples(), 4);
    }

    #[test]
    fn test_depth_bits_select_format() {
        let config = ContextConfig::default().with_depth_stencil(16, 0);
        assert_eq!(
            config.depth_format(),
            Some(TextureFormat::new(ChannelOrder::D, ChannelType::UnormInt16))
        );
        let config = config.with_depth_stencil(32, 0);
        assert_eq!(
            config.depth_format(),
            Some(TextureFormat::new(ChannelOrder::D, ChannelType::Float))
        );
    }
}
