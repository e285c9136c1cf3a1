//! # Vertex Arrays
//!
//! Vertex array objects: per-attribute array descriptors plus the element
//! array binding. Generic (current) attribute values are context state and
//! live in [`GenericAttrib`].

use alloc::vec::Vec;

use refgl_core::enums::*;
use refgl_core::{GLenum, Handle};

use crate::buffer::BufferHandle;

/// Handle to a [`VertexArray`]
pub type VertexArrayHandle = Handle<VertexArray>;

// =============================================================================
// COMPONENT TYPES
// =============================================================================

/// Whether `ty` is accepted by `vertexAttribPointer`
pub fn is_float_attrib_type(ty: GLenum) -> bool {
    matches!(
        ty,
        GL_BYTE
            | GL_UNSIGNED_BYTE
            | GL_SHORT
            | GL_UNSIGNED_SHORT
            | GL_INT
            | GL_UNSIGNED_INT
            | GL_FLOAT
            | GL_HALF_FLOAT
            | GL_INT_2_10_10_10_REV
            | GL_UNSIGNED_INT_2_10_10_10_REV
    )
}

/// Whether `ty` is accepted by `vertexAttribIPointer`
pub fn is_integer_attrib_type(ty: GLenum) -> bool {
    matches!(
        ty,
        GL_BYTE | GL_UNSIGNED_BYTE | GL_SHORT | GL_UNSIGNED_SHORT | GL_INT | GL_UNSIGNED_INT
    )
}

/// Packed types that require a component count of 4
pub fn is_packed_attrib_type(ty: GLenum) -> bool {
    matches!(ty, GL_INT_2_10_10_10_REV | GL_UNSIGNED_INT_2_10_10_10_REV)
}

// =============================================================================
// ATTRIBUTE ARRAYS
// =============================================================================

/// One vertex attribute array descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribArray {
    /// Array enabled
    pub enabled: bool,
    /// Component count (1-4)
    pub size: i32,
    /// Byte stride, 0 = tightly packed
    pub stride: i32,
    /// Component type
    pub type_: GLenum,
    /// Normalize fixed-point values
    pub normalized: bool,
    /// Integer attribute (`vertexAttribIPointer`)
    pub integer: bool,
    /// Instance divisor
    pub divisor: u32,
    /// Byte offset into `buffer`
    pub offset: usize,
    /// Array buffer bound when the pointer was set
    pub buffer: Option<BufferHandle>,
}

impl Default for VertexAttribArray {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 4,
            stride: 0,
            type_: GL_FLOAT,
            normalized: false,
            integer: false,
            divisor: 0,
            offset: 0,
            buffer: None,
        }
    }
}

/// Vertex array object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexArray {
    /// Attribute descriptors, one per attribute slot
    pub attribs: Vec<VertexAttribArray>,
    /// `GL_ELEMENT_ARRAY_BUFFER` binding
    pub element_array_buffer: Option<BufferHandle>,
}

impl VertexArray {
    /// Vertex array with `attrib_count` default descriptors
    pub fn new(attrib_count: u32) -> Self {
        Self {
            attribs: alloc::vec![VertexAttribArray::default(); attrib_count as usize],
            element_array_buffer: None,
        }
    }

    /// Drop every reference to `buffer`
    pub fn unbind_buffer(&mut self, buffer: BufferHandle) {
        if self.element_array_buffer == Some(buffer) {
            self.element_array_buffer = None;
        }
        for attrib in &mut self.attribs {
            if attrib.buffer == Some(buffer) {
                attrib.buffer = None;
            }
        }
    }
}

// =============================================================================
// GENERIC ATTRIBUTE VALUES
// =============================================================================

/// Current value of a generic vertex attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GenericAttrib {
    /// Set through `vertexAttrib*f`
    Float([f32; 4]),
    /// Set through `vertexAttribI4i`
    Int([i32; 4]),
    /// Set through `vertexAttribI4ui`
    Uint([u32; 4]),
}

impl Default for GenericAttrib {
    fn default() -> Self {
        Self::Float([0.0; 4])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let vao = VertexArray::new(16);
        assert_eq!(vao.attribs.len(), 16);
        let attrib = vao.attribs[0];
        assert!(!attrib.enabled);
        assert_eq!(attrib.size, 4);
        assert_eq!(attrib.type_, GL_FLOAT);
        assert!(attrib.buffer.is_none());
        assert!(vao.element_array_buffer.is_none());
    }

    #[test]
    fn test_unbind_buffer() {
        let buffer: BufferHandle = Handle::new(0, 1);
        let mut vao = VertexArray::new(2);
        vao.element_array_buffer = Some(buffer);
        vao.attribs[1].buffer = Some(buffer);
        vao.unbind_buffer(buffer);
        assert!(vao.element_array_buffer.is_none());
        assert!(vao.attribs[1].buffer.is_none());
    }

    #[test]
    fn test_type_sets() {
        assert!(is_float_attrib_type(GL_HALF_FLOAT));
        assert!(!is_integer_attrib_type(GL_HALF_FLOAT));
        assert!(!is_integer_attrib_type(GL_FLOAT));
        assert!(is_packed_attrib_type(GL_INT_2_10_10_10_REV));
        assert!(!is_float_attrib_type(GL_UNSIGNED_SHORT_5_6_5));
    }
}
