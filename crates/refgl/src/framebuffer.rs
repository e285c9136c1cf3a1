//! # Framebuffer Management
//!
//! Framebuffer and renderbuffer objects. A framebuffer is a fixed table of
//! attachment points; each point names a texture image, a renderbuffer, or
//! nothing. Also the masks, filters and rectangles of clears and blits.

use bitflags::bitflags;
use refgl_core::enums::*;
use refgl_core::{ChannelOrder, ChannelType, GLenum, Handle, TextureFormat};

use crate::pixel::PixelBuffer;
use crate::texture::{CubeFace, TextureHandle};

/// Handle to a [`Framebuffer`]
pub type FramebufferHandle = Handle<Framebuffer>;

/// Handle to a [`Renderbuffer`]
pub type RenderbufferHandle = Handle<Renderbuffer>;

// =============================================================================
// TARGETS
// =============================================================================

/// Framebuffer bind target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferTarget {
    /// `GL_FRAMEBUFFER`: read and draw
    Both,
    /// `GL_DRAW_FRAMEBUFFER`
    Draw,
    /// `GL_READ_FRAMEBUFFER`
    Read,
}

impl FramebufferTarget {
    /// Parse a GL target
    pub fn from_gl(target: GLenum) -> Option<Self> {
        Some(match target {
            GL_FRAMEBUFFER => Self::Both,
            GL_DRAW_FRAMEBUFFER => Self::Draw,
            GL_READ_FRAMEBUFFER => Self::Read,
            _ => return None,
        })
    }
}

/// Attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentPoint {
    /// `GL_COLOR_ATTACHMENT0`
    Color0,
    /// `GL_DEPTH_ATTACHMENT`
    Depth,
    /// `GL_STENCIL_ATTACHMENT`
    Stencil,
}

impl AttachmentPoint {
    /// All points, in table order
    pub const ALL: [Self; 3] = [Self::Color0, Self::Depth, Self::Stencil];

    /// Table index
    pub const fn index(self) -> usize {
        match self {
            Self::Color0 => 0,
            Self::Depth => 1,
            Self::Stencil => 2,
        }
    }

    /// Points named by an attachment enum. `GL_DEPTH_STENCIL_ATTACHMENT`
    /// names both depth and stencil.
    pub fn from_gl(attachment: GLenum) -> Option<&'static [Self]> {
        Some(match attachment {
            GL_COLOR_ATTACHMENT0 => &[Self::Color0],
            GL_DEPTH_ATTACHMENT => &[Self::Depth],
            GL_STENCIL_ATTACHMENT => &[Self::Stencil],
            GL_DEPTH_STENCIL_ATTACHMENT => &[Self::Depth, Self::Stencil],
            _ => return None,
        })
    }

    /// Whether `format` may be attached here
    pub fn accepts(self, format: TextureFormat) -> bool {
        match self {
            Self::Color0 => format.is_color(),
            Self::Depth => format.has_depth(),
            Self::Stencil => format.has_stencil(),
        }
    }
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// Object behind an attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachmentObject {
    /// Nothing attached
    #[default]
    None,
    /// Texture image
    Texture(TextureHandle),
    /// Renderbuffer
    Renderbuffer(RenderbufferHandle),
}

/// One attachment point's state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attachment {
    /// Attached object
    pub object: AttachmentObject,
    /// Mip level (textures)
    pub level: u32,
    /// Cube face (cube textures)
    pub face: Option<CubeFace>,
    /// Layer (array and 3D textures)
    pub layer: u32,
}

impl Attachment {
    /// Nothing attached
    pub const NONE: Self = Self {
        object: AttachmentObject::None,
        level: 0,
        face: None,
        layer: 0,
    };

    /// Whole-image texture attachment
    pub const fn texture(texture: TextureHandle, level: u32, face: Option<CubeFace>) -> Self {
        Self {
            object: AttachmentObject::Texture(texture),
            level,
            face,
            layer: 0,
        }
    }

    /// Single-layer texture attachment
    pub const fn texture_layer(texture: TextureHandle, level: u32, layer: u32) -> Self {
        Self {
            object: AttachmentObject::Texture(texture),
            level,
            face: None,
            layer,
        }
    }

    /// Renderbuffer attachment
    pub const fn renderbuffer(renderbuffer: RenderbufferHandle) -> Self {
        Self {
            object: AttachmentObject::Renderbuffer(renderbuffer),
            level: 0,
            face: None,
            layer: 0,
        }
    }

    /// Nothing attached
    pub const fn is_none(&self) -> bool {
        matches!(self.object, AttachmentObject::None)
    }
}

/// Framebuffer object
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Framebuffer {
    attachments: [Attachment; 3],
}

impl Framebuffer {
    /// Framebuffer with nothing attached
    pub fn new() -> Self {
        Self::default()
    }

    /// Attachment at `point`
    pub fn attachment(&self, point: AttachmentPoint) -> &Attachment {
        &self.attachments[point.index()]
    }

    /// Replace the attachment at `point`
    pub fn set_attachment(&mut self, point: AttachmentPoint, attachment: Attachment) {
        self.attachments[point.index()] = attachment;
    }

    /// Detach `texture` from every point
    pub fn detach_texture(&mut self, texture: TextureHandle) {
        for attachment in &mut self.attachments {
            if attachment.object == AttachmentObject::Texture(texture) {
                *attachment = Attachment::NONE;
            }
        }
    }

    /// Detach `renderbuffer` from every point
    pub fn detach_renderbuffer(&mut self, renderbuffer: RenderbufferHandle) {
        for attachment in &mut self.attachments {
            if attachment.object == AttachmentObject::Renderbuffer(renderbuffer) {
                *attachment = Attachment::NONE;
            }
        }
    }
}

// =============================================================================
// RENDERBUFFER
// =============================================================================

/// Renderbuffer object
#[derive(Debug, Clone, PartialEq)]
pub struct Renderbuffer {
    internal_format: GLenum,
    storage: PixelBuffer,
}

impl Default for Renderbuffer {
    fn default() -> Self {
        Self {
            internal_format: GL_RGBA4,
            storage: PixelBuffer::new(
                TextureFormat::new(ChannelOrder::RGBA, ChannelType::UnormShort4444),
                0,
                0,
                1,
            ),
        }
    }
}

impl Renderbuffer {
    /// Renderbuffer with no storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace storage
    pub fn set_storage(&mut self, internal_format: GLenum, format: TextureFormat, width: u32, height: u32) {
        log::debug!(
            "Renderbuffer storage 0x{:04x} {}x{}",
            internal_format,
            width,
            height
        );
        self.internal_format = internal_format;
        self.storage = PixelBuffer::new(format, width, height, 1);
    }

    /// Internal format enum
    pub fn internal_format(&self) -> GLenum {
        self.internal_format
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.storage.width()
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.storage.height()
    }

    /// Pixel storage
    pub fn storage(&self) -> &PixelBuffer {
        &self.storage
    }

    /// Mutable pixel storage
    pub fn storage_mut(&mut self) -> &mut PixelBuffer {
        &mut self.storage
    }
}

// =============================================================================
// FRAMEBUFFER COMPLETENESS
// =============================================================================

/// Format and size of a resolved attachment image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentImage {
    /// Texel format
    pub format: TextureFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Check framebuffer completeness status.
///
/// `describe` returns the image behind an attachment, or `None` when the
/// attached object or level does not exist.
pub fn check_framebuffer_status<F>(framebuffer: &Framebuffer, describe: F) -> GLenum
where
    F: Fn(&Attachment) -> Option<AttachmentImage>,
{
    let mut has_attachment = false;
    let mut incomplete_attachment = false;
    let mut mismatched_dimensions = false;
    let mut size: Option<(u32, u32)> = None;

    for point in AttachmentPoint::ALL {
        let attachment = framebuffer.attachment(point);
        if attachment.is_none() {
            continue;
        }
        has_attachment = true;

        let Some(image) = describe(attachment) else {
            incomplete_attachment = true;
            continue;
        };

        if image.width == 0 || image.height == 0 || !point.accepts(image.format) {
            incomplete_attachment = true;
        }

        match size {
            None => size = Some((image.width, image.height)),
            Some(expected) if expected != (image.width, image.height) => {
                mismatched_dimensions = true;
            }
            Some(_) => {}
        }
    }

    if incomplete_attachment {
        GL_FRAMEBUFFER_INCOMPLETE_ATTACHMENT
    } else if !has_attachment {
        GL_FRAMEBUFFER_INCOMPLETE_MISSING_ATTACHMENT
    } else if mismatched_dimensions {
        GL_FRAMEBUFFER_INCOMPLETE_DIMENSIONS
    } else {
        GL_FRAMEBUFFER_COMPLETE
    }
}

// =============================================================================
// CLEAR & BLIT
// =============================================================================

bitflags! {
    /// Buffers selected by a `clear` or `blitFramebuffer` mask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferMask: u32 {
        /// `GL_COLOR_BUFFER_BIT`
        const COLOR = GL_COLOR_BUFFER_BIT;
        /// `GL_DEPTH_BUFFER_BIT`
        const DEPTH = GL_DEPTH_BUFFER_BIT;
        /// `GL_STENCIL_BUFFER_BIT`
        const STENCIL = GL_STENCIL_BUFFER_BIT;
    }
}

/// Blit filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlitFilter {
    /// Nearest neighbor
    Nearest,
    /// Linear interpolation
    Linear,
}

impl BlitFilter {
    /// Parse a GL filter
    pub fn from_gl(filter: GLenum) -> Option<Self> {
        match filter {
            GL_NEAREST => Some(Self::Nearest),
            GL_LINEAR => Some(Self::Linear),
            _ => None,
        }
    }
}

/// Half-open pixel rectangle. Corners are `i64` so that `x + width` never
/// overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    /// Left edge, inclusive
    pub x0: i64,
    /// Bottom edge, inclusive
    pub y0: i64,
    /// Right edge, exclusive
    pub x1: i64,
    /// Top edge, exclusive
    pub y1: i64,
}

impl PixelRect {
    /// Rectangle that contains every pixel
    pub const UNBOUNDED: Self = Self {
        x0: i64::MIN,
        y0: i64::MIN,
        x1: i64::MAX,
        y1: i64::MAX,
    };

    /// Rectangle from origin and size
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x0: i64::from(x),
            y0: i64::from(y),
            x1: i64::from(x) + i64::from(width),
            y1: i64::from(y) + i64::from(height),
        }
    }

    /// Rectangle covering a `width`×`height` image
    pub fn of_size(width: u32, height: u32) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: i64::from(width),
            y1: i64::from(height),
        }
    }

    /// Overlap of two rectangles
    pub fn intersect(self, other: Self) -> Self {
        Self {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    /// Covers no pixel
    pub fn is_empty(&self) -> bool {
        self.x1 <= self.x0 || self.y1 <= self.y0
    }

    /// Width in pixels, 0 when empty
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0).clamp(0, i64::from(u32::MAX)) as u32
    }

    /// Height in pixels, 0 when empty
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0).clamp(0, i64::from(u32::MAX)) as u32
    }
}

/// Blit region. Each side's first corner is inclusive and the second
/// exclusive; a second corner below or left of the first mirrors the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlitRegion {
    /// Source X0
    pub src_x0: i32,
    /// Source Y0
    pub src_y0: i32,
    /// Source X1
    pub src_x1: i32,
    /// Source Y1
    pub src_y1: i32,
    /// Destination X0
    pub dst_x0: i32,
    /// Destination Y0
    pub dst_y0: i32,
    /// Destination X1
    pub dst_x1: i32,
    /// Destination Y1
    pub dst_y1: i32,
}

impl BlitRegion {
    fn span(a: i32, b: i32) -> (i64, i64) {
        let (a, b) = (i64::from(a), i64::from(b));
        (a.min(b), a.max(b))
    }

    /// Source pixels, corners sorted
    pub fn src_rect(&self) -> PixelRect {
        let (x0, x1) = Self::span(self.src_x0, self.src_x1);
        let (y0, y1) = Self::span(self.src_y0, self.src_y1);
        PixelRect { x0, y0, x1, y1 }
    }

    /// Destination pixels, corners sorted
    pub fn dst_rect(&self) -> PixelRect {
        let (x0, x1) = Self::span(self.dst_x0, self.dst_x1);
        let (y0, y1) = Self::span(self.dst_y0, self.dst_y1);
        PixelRect { x0, y0, x1, y1 }
    }

    /// Source and destination differ in size
    pub fn is_scaled(&self) -> bool {
        let (src, dst) = (self.src_rect(), self.dst_rect());
        src.width() != dst.width() || src.height() != dst.height()
    }

    /// Source coordinate that the center of destination pixel `(x, y)`
    /// maps to. Only meaningful for a non-empty destination.
    pub fn source_coord(&self, x: i64, y: i64) -> (f64, f64) {
        let map = |d: i64, d0: i32, d1: i32, s0: i32, s1: i32| {
            let scale = (f64::from(s1) - f64::from(s0)) / (f64::from(d1) - f64::from(d0));
            f64::from(s0) + (d as f64 + 0.5 - f64::from(d0)) * scale
        };
        (
            map(x, self.dst_x0, self.dst_x1, self.src_x0, self.src_x1),
            map(y, self.dst_y0, self.dst_y1, self.src_y0, self.src_y1),
        )
    }
}
