//! # Buffer Objects
//!
//! Byte storage behind buffer handles, and the binding targets a buffer
//! can be attached to.

use alloc::collections::TryReserveError;
use alloc::vec::Vec;

use refgl_core::enums::*;
use refgl_core::{GLenum, Handle};

/// Handle to a [`DataBuffer`]
pub type BufferHandle = Handle<DataBuffer>;

// =============================================================================
// TARGETS & USAGE
// =============================================================================

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// `GL_ARRAY_BUFFER`
    Array,
    /// `GL_ELEMENT_ARRAY_BUFFER`, stored in the bound vertex array
    ElementArray,
    /// `GL_COPY_READ_BUFFER`
    CopyRead,
    /// `GL_COPY_WRITE_BUFFER`
    CopyWrite,
    /// `GL_PIXEL_PACK_BUFFER`
    PixelPack,
    /// `GL_PIXEL_UNPACK_BUFFER`
    PixelUnpack,
    /// `GL_TRANSFORM_FEEDBACK_BUFFER`
    TransformFeedback,
    /// `GL_UNIFORM_BUFFER`
    Uniform,
}

impl BufferTarget {
    /// Every target that lives in context state (element array excluded)
    pub const CONTEXT_TARGETS: [Self; 7] = [
        Self::Array,
        Self::CopyRead,
        Self::CopyWrite,
        Self::PixelPack,
        Self::PixelUnpack,
        Self::TransformFeedback,
        Self::Uniform,
    ];

    /// Parse a GL target
    pub fn from_gl(target: GLenum) -> Option<Self> {
        Some(match target {
            GL_ARRAY_BUFFER => Self::Array,
            GL_ELEMENT_ARRAY_BUFFER => Self::ElementArray,
            GL_COPY_READ_BUFFER => Self::CopyRead,
            GL_COPY_WRITE_BUFFER => Self::CopyWrite,
            GL_PIXEL_PACK_BUFFER => Self::PixelPack,
            GL_PIXEL_UNPACK_BUFFER => Self::PixelUnpack,
            GL_TRANSFORM_FEEDBACK_BUFFER => Self::TransformFeedback,
            GL_UNIFORM_BUFFER => Self::Uniform,
            _ => return None,
        })
    }

    /// GL enum
    pub const fn to_gl(self) -> GLenum {
        match self {
            Self::Array => GL_ARRAY_BUFFER,
            Self::ElementArray => GL_ELEMENT_ARRAY_BUFFER,
            Self::CopyRead => GL_COPY_READ_BUFFER,
            Self::CopyWrite => GL_COPY_WRITE_BUFFER,
            Self::PixelPack => GL_PIXEL_PACK_BUFFER,
            Self::PixelUnpack => GL_PIXEL_UNPACK_BUFFER,
            Self::TransformFeedback => GL_TRANSFORM_FEEDBACK_BUFFER,
            Self::Uniform => GL_UNIFORM_BUFFER,
        }
    }

    /// Target matching a `*_BUFFER_BINDING` query
    pub fn from_binding_query(pname: GLenum) -> Option<Self> {
        Some(match pname {
            GL_ARRAY_BUFFER_BINDING => Self::Array,
            GL_ELEMENT_ARRAY_BUFFER_BINDING => Self::ElementArray,
            GL_COPY_READ_BUFFER_BINDING => Self::CopyRead,
            GL_COPY_WRITE_BUFFER_BINDING => Self::CopyWrite,
            GL_PIXEL_PACK_BUFFER_BINDING => Self::PixelPack,
            GL_PIXEL_UNPACK_BUFFER_BINDING => Self::PixelUnpack,
            GL_TRANSFORM_FEEDBACK_BUFFER_BINDING => Self::TransformFeedback,
            GL_UNIFORM_BUFFER_BINDING => Self::Uniform,
            _ => return None,
        })
    }
}

/// Buffer usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Written once by the application, drawn a few times
    StreamDraw,
    /// Written once by GL, read a few times
    StreamRead,
    /// Written once by GL, drawn a few times
    StreamCopy,
    /// Written once by the application, drawn many times
    #[default]
    StaticDraw,
    /// Written once by GL, read many times
    StaticRead,
    /// Written once by GL, drawn many times
    StaticCopy,
    /// Rewritten by the application, drawn many times
    DynamicDraw,
    /// Rewritten by GL, read many times
    DynamicRead,
    /// Rewritten by GL, drawn many times
    DynamicCopy,
}

impl BufferUsage {
    /// Parse a GL usage enum
    pub fn from_gl(usage: GLenum) -> Option<Self> {
        Some(match usage {
            GL_STREAM_DRAW => Self::StreamDraw,
            GL_STREAM_READ => Self::StreamRead,
            GL_STREAM_COPY => Self::StreamCopy,
            GL_STATIC_DRAW => Self::StaticDraw,
            GL_STATIC_READ => Self::StaticRead,
            GL_STATIC_COPY => Self::StaticCopy,
            GL_DYNAMIC_DRAW => Self::DynamicDraw,
            GL_DYNAMIC_READ => Self::DynamicRead,
            GL_DYNAMIC_COPY => Self::DynamicCopy,
            _ => return None,
        })
    }

    /// GL enum
    pub const fn to_gl(self) -> GLenum {
        match self {
            Self::StreamDraw => GL_STREAM_DRAW,
            Self::StreamRead => GL_STREAM_READ,
            Self::StreamCopy => GL_STREAM_COPY,
            Self::StaticDraw => GL_STATIC_DRAW,
            Self::StaticRead => GL_STATIC_READ,
            Self::StaticCopy => GL_STATIC_COPY,
            Self::DynamicDraw => GL_DYNAMIC_DRAW,
            Self::DynamicRead => GL_DYNAMIC_READ,
            Self::DynamicCopy => GL_DYNAMIC_COPY,
        }
    }
}

// =============================================================================
// DATA BUFFER
// =============================================================================

/// Source of a whole-buffer upload
#[derive(Debug, Clone, Copy)]
pub enum BufferData<'a> {
    /// Allocate `size` zeroed bytes
    Size(isize),
    /// Copy these bytes
    Bytes(&'a [u8]),
}

/// Buffer object storage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataBuffer {
    data: Vec<u8>,
    usage: BufferUsage,
}

impl DataBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Reallocate as `size` zeroed bytes. The old contents survive a failed
    /// allocation.
    pub fn set_storage(&mut self, size: usize) -> Result<(), TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(size)?;
        data.resize(size, 0);
        self.data = data;
        Ok(())
    }

    /// Replace contents. The old contents survive a failed allocation.
    pub fn set_data(&mut self, bytes: &[u8]) -> Result<(), TryReserveError> {
        let mut data = Vec::new();
        data.try_reserve_exact(bytes.len())?;
        data.extend_from_slice(bytes);
        self.data = data;
        Ok(())
    }

    /// Overwrite a range in place. The range must lie inside the buffer.
    pub fn set_sub_data(&mut self, offset: usize, bytes: &[u8]) {
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Usage hint from the last upload
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub(crate) fn set_usage(&mut self, usage: BufferUsage) {
        self.usage = usage;
    }

    /// Contents
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable contents
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_and_sub_data() {
        let mut buffer = DataBuffer::new();
        assert_eq!(buffer.size(), 0);

        assert!(buffer.set_storage(8).is_ok());
        assert_eq!(buffer.data(), &[0; 8]);

        buffer.set_sub_data(2, &[1, 2, 3]);
        assert_eq!(buffer.data(), &[0, 0, 1, 2, 3, 0, 0, 0]);

        assert!(buffer.set_data(&[9, 9]).is_ok());
        assert_eq!(buffer.size(), 2);
    }

    #[test]
    fn test_failed_storage_keeps_contents() {
        let mut buffer = DataBuffer::new();
        assert!(buffer.set_data(&[1, 2, 3]).is_ok());
        assert!(buffer.set_storage(isize::MAX as usize).is_err());
        assert_eq!(buffer.data(), &[1, 2, 3]);
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!(BufferTarget::from_gl(GL_ARRAY_BUFFER), Some(BufferTarget::Array));
        assert_eq!(BufferTarget::from_gl(GL_TEXTURE_2D), None);
        for target in BufferTarget::CONTEXT_TARGETS {
            assert_eq!(BufferTarget::from_gl(target.to_gl()), Some(target));
        }
        assert_eq!(BufferUsage::from_gl(GL_DYNAMIC_COPY), Some(BufferUsage::DynamicCopy));
        assert_eq!(BufferUsage::from_gl(GL_FLOAT), None);
    }
}
