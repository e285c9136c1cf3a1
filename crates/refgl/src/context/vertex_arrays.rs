//! Vertex attribute arrays and generic attribute values.

use refgl_core::enums::*;
use refgl_core::{FormatMapper, GLenum, GlError};

use super::{GlResult, Parameter, ReferenceContext};
use crate::buffer::BufferTarget;
use crate::vertex_array::{
    is_float_attrib_type, is_integer_attrib_type, is_packed_attrib_type, GenericAttrib,
    VertexAttribArray,
};

/// Arguments shared by `vertexAttribPointer` and `vertexAttribIPointer`
#[derive(Debug, Clone, Copy)]
struct AttribPointer {
    index: u32,
    size: i32,
    type_: GLenum,
    normalized: bool,
    integer: bool,
    stride: i32,
    offset: isize,
}

impl<M: FormatMapper> ReferenceContext<M> {
    fn check_attrib_index(&self, index: u32) -> GlResult<usize> {
        if index < self.limits.max_vertex_attribs {
            Ok(index as usize)
        } else {
            Err(GlError::InvalidValue)
        }
    }

    /// Describe a float attribute array sourced from the bound array buffer
    pub fn vertex_attrib_pointer(
        &mut self,
        index: u32,
        size: i32,
        type_: GLenum,
        normalized: bool,
        stride: i32,
        offset: isize,
    ) {
        let result = self.vertex_attrib_pointer_checked(AttribPointer {
            index,
            size,
            type_,
            normalized,
            integer: false,
            stride,
            offset,
        });
        self.record("vertexAttribPointer", result);
    }

    /// Describe an integer attribute array sourced from the bound array buffer
    pub fn vertex_attrib_i_pointer(&mut self, index: u32, size: i32, type_: GLenum, stride: i32, offset: isize) {
        let result = self.vertex_attrib_pointer_checked(AttribPointer {
            index,
            size,
            type_,
            normalized: false,
            integer: true,
            stride,
            offset,
        });
        self.record("vertexAttribIPointer", result);
    }

    fn vertex_attrib_pointer_checked(&mut self, pointer: AttribPointer) -> GlResult {
        let index = self.check_attrib_index(pointer.index)?;
        if !(1..=4).contains(&pointer.size) {
            return Err(GlError::InvalidValue);
        }

        let type_ok = if pointer.integer {
            is_integer_attrib_type(pointer.type_)
        } else {
            is_float_attrib_type(pointer.type_)
        };
        if !type_ok {
            return Err(GlError::InvalidEnum);
        }

        if pointer.stride < 0 {
            return Err(GlError::InvalidValue);
        }
        let offset = usize::try_from(pointer.offset).map_err(|_| GlError::InvalidValue)?;

        if is_packed_attrib_type(pointer.type_) && pointer.size != 4 {
            return Err(GlError::InvalidOperation);
        }
        let buffer = self.state.buffers.get(BufferTarget::Array);
        if buffer.is_none() && offset != 0 {
            return Err(GlError::InvalidOperation);
        }

        let attrib = &mut self.current_vertex_array_mut().attribs[index];
        *attrib = VertexAttribArray {
            size: pointer.size,
            stride: pointer.stride,
            type_: pointer.type_,
            normalized: pointer.normalized,
            integer: pointer.integer,
            offset,
            buffer,
            ..*attrib
        };
        Ok(())
    }

    /// Enable an attribute array in the bound vertex array
    pub fn enable_vertex_attrib_array(&mut self, index: u32) {
        let result = self.set_attrib_enabled(index, true);
        self.record("enableVertexAttribArray", result);
    }

    /// Disable an attribute array in the bound vertex array
    pub fn disable_vertex_attrib_array(&mut self, index: u32) {
        let result = self.set_attrib_enabled(index, false);
        self.record("disableVertexAttribArray", result);
    }

    fn set_attrib_enabled(&mut self, index: u32, enabled: bool) -> GlResult {
        let index = self.check_attrib_index(index)?;
        self.current_vertex_array_mut().attribs[index].enabled = enabled;
        Ok(())
    }

    /// Set the instance divisor of an attribute array
    pub fn vertex_attrib_divisor(&mut self, index: u32, divisor: u32) {
        let result = self.check_attrib_index(index).map(|index| {
            self.current_vertex_array_mut().attribs[index].divisor = divisor;
        });
        self.record("vertexAttribDivisor", result);
    }

    // =========================================================================
    // GENERIC VALUES
    // =========================================================================

    fn set_generic_attrib(&mut self, entry: &'static str, index: u32, value: GenericAttrib) {
        let result = self.check_attrib_index(index).map(|index| {
            self.state.generic_attribs[index] = value;
        });
        self.record(entry, result);
    }

    /// Set a generic attribute to `(x, 0, 0, 1)`
    pub fn vertex_attrib_1f(&mut self, index: u32, x: f32) {
        self.set_generic_attrib("vertexAttrib1f", index, GenericAttrib::Float([x, 0.0, 0.0, 1.0]));
    }

    /// Set a generic attribute to `(x, y, 0, 1)`
    pub fn vertex_attrib_2f(&mut self, index: u32, x: f32, y: f32) {
        self.set_generic_attrib("vertexAttrib2f", index, GenericAttrib::Float([x, y, 0.0, 1.0]));
    }

    /// Set a generic attribute to `(x, y, z, 1)`
    pub fn vertex_attrib_3f(&mut self, index: u32, x: f32, y: f32, z: f32) {
        self.set_generic_attrib("vertexAttrib3f", index, GenericAttrib::Float([x, y, z, 1.0]));
    }

    /// Set a generic attribute to `(x, y, z, w)`
    pub fn vertex_attrib_4f(&mut self, index: u32, x: f32, y: f32, z: f32, w: f32) {
        self.set_generic_attrib("vertexAttrib4f", index, GenericAttrib::Float([x, y, z, w]));
    }

    /// Set a generic attribute to signed integers
    pub fn vertex_attrib_i4i(&mut self, index: u32, x: i32, y: i32, z: i32, w: i32) {
        self.set_generic_attrib("vertexAttribI4i", index, GenericAttrib::Int([x, y, z, w]));
    }

    /// Set a generic attribute to unsigned integers
    pub fn vertex_attrib_i4ui(&mut self, index: u32, x: u32, y: u32, z: u32, w: u32) {
        self.set_generic_attrib("vertexAttribI4ui", index, GenericAttrib::Uint([x, y, z, w]));
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Query an attribute array of the bound vertex array, or the generic
    /// value with `GL_CURRENT_VERTEX_ATTRIB`
    pub fn get_vertex_attrib(&mut self, index: u32, pname: GLenum) -> Parameter {
        let result = self.get_vertex_attrib_checked(index, pname);
        self.record_or_default("getVertexAttrib", result)
    }

    fn get_vertex_attrib_checked(&self, index: u32, pname: GLenum) -> GlResult<Parameter> {
        if !matches!(
            pname,
            GL_VERTEX_ATTRIB_ARRAY_ENABLED
                | GL_VERTEX_ATTRIB_ARRAY_SIZE
                | GL_VERTEX_ATTRIB_ARRAY_STRIDE
                | GL_VERTEX_ATTRIB_ARRAY_TYPE
                | GL_VERTEX_ATTRIB_ARRAY_NORMALIZED
                | GL_VERTEX_ATTRIB_ARRAY_INTEGER
                | GL_VERTEX_ATTRIB_ARRAY_DIVISOR
                | GL_VERTEX_ATTRIB_ARRAY_BUFFER_BINDING
                | GL_CURRENT_VERTEX_ATTRIB
        ) {
            return Err(GlError::InvalidEnum);
        }
        let index = self.check_attrib_index(index)?;
        if pname == GL_CURRENT_VERTEX_ATTRIB {
            return Ok(Parameter::Attrib(self.state.generic_attribs[index]));
        }

        let attrib = &self.current_vertex_array().attribs[index];
        Ok(match pname {
            GL_VERTEX_ATTRIB_ARRAY_ENABLED => Parameter::Bool(attrib.enabled),
            GL_VERTEX_ATTRIB_ARRAY_SIZE => Parameter::Int(attrib.size),
            GL_VERTEX_ATTRIB_ARRAY_STRIDE => Parameter::Int(attrib.stride),
            GL_VERTEX_ATTRIB_ARRAY_TYPE => Parameter::Enum(attrib.type_),
            GL_VERTEX_ATTRIB_ARRAY_NORMALIZED => Parameter::Bool(attrib.normalized),
            GL_VERTEX_ATTRIB_ARRAY_INTEGER => Parameter::Bool(attrib.integer),
            GL_VERTEX_ATTRIB_ARRAY_DIVISOR => Parameter::UInt(attrib.divisor),
            GL_VERTEX_ATTRIB_ARRAY_BUFFER_BINDING => Parameter::Buffer(attrib.buffer),
            _ => unreachable!("vertex attrib pname 0x{:04x} already validated", pname),
        })
    }

    /// Byte offset of an attribute array (`GL_VERTEX_ATTRIB_ARRAY_POINTER`)
    pub fn get_vertex_attrib_offset(&mut self, index: u32, pname: GLenum) -> usize {
        let result = if pname == GL_VERTEX_ATTRIB_ARRAY_POINTER {
            self.check_attrib_index(index)
                .map(|index| self.current_vertex_array().attribs[index].offset)
        } else {
            Err(GlError::InvalidEnum)
        };
        self.record_or_default("getVertexAttribOffset", result)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::context;
    use super::*;
    use crate::buffer::BufferData;

    #[test]
    fn test_pointer_index_out_of_range() {
        let mut ctx = context();
        let max = ctx.limits().max_vertex_attribs;
        let before = ctx.vertex_array(None).cloned();
        ctx.vertex_attrib_pointer(max, 4, GL_FLOAT, false, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        assert_eq!(ctx.vertex_array(None).cloned(), before);
    }

    #[test]
    fn test_pointer_validation_order() {
        let mut ctx = context();
        ctx.vertex_attrib_pointer(10_000, 4, GL_RGBA, false, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(99, 7, GL_RGBA, false, -1, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(0, 0, GL_RGBA, false, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(0, 4, GL_RGBA, false, -1, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.vertex_attrib_i_pointer(0, 9, GL_FLOAT, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(0, 0, GL_FLOAT, false, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(0, 4, GL_FLOAT, false, -4, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(0, 4, GL_FLOAT, false, 0, -8);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.vertex_attrib_pointer(0, 3, GL_INT_2_10_10_10_REV, true, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);
        ctx.vertex_attrib_pointer(0, 4, GL_FLOAT, false, 0, 16);
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);
        ctx.vertex_attrib_i_pointer(0, 4, GL_FLOAT, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);

        ctx.vertex_attrib_pointer(0, 4, GL_INT_2_10_10_10_REV, true, 0, 0);
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_pointer_captures_array_buffer() {
        let mut ctx = context();
        let buffer = ctx.create_buffer();
        ctx.bind_buffer(GL_ARRAY_BUFFER, Some(buffer));
        ctx.buffer_data(GL_ARRAY_BUFFER, BufferData::Size(64), GL_STATIC_DRAW);
        ctx.enable_vertex_attrib_array(2);
        ctx.vertex_attrib_divisor(2, 3);
        ctx.vertex_attrib_i_pointer(2, 2, GL_UNSIGNED_SHORT, 8, 4);
        ctx.bind_buffer(GL_ARRAY_BUFFER, None);
        assert_eq!(ctx.get_error(), GlError::NoError);

        let attrib = ctx.vertex_array(None).map(|v| v.attribs[2]).unwrap_or_default();
        assert_eq!(
            attrib,
            VertexAttribArray {
                enabled: true,
                size: 2,
                stride: 8,
                type_: GL_UNSIGNED_SHORT,
                normalized: false,
                integer: true,
                divisor: 3,
                offset: 4,
                buffer: Some(buffer),
            }
        );
        assert_eq!(ctx.get_vertex_attrib(2, GL_VERTEX_ATTRIB_ARRAY_BUFFER_BINDING), Parameter::Buffer(Some(buffer)));
        assert_eq!(ctx.get_vertex_attrib(2, GL_VERTEX_ATTRIB_ARRAY_INTEGER), Parameter::Bool(true));
        assert_eq!(ctx.get_vertex_attrib(2, GL_VERTEX_ATTRIB_ARRAY_DIVISOR), Parameter::UInt(3));
        assert_eq!(ctx.get_vertex_attrib_offset(2, GL_VERTEX_ATTRIB_ARRAY_POINTER), 4);
    }

    #[test]
    fn test_attribs_are_per_vertex_array() {
        let mut ctx = context();
        let vao = ctx.create_vertex_array();
        ctx.bind_vertex_array(Some(vao));
        ctx.enable_vertex_attrib_array(0);
        ctx.vertex_attrib_pointer(0, 2, GL_BYTE, true, 2, 0);
        assert_eq!(ctx.get_vertex_attrib(0, GL_VERTEX_ATTRIB_ARRAY_SIZE), Parameter::Int(2));

        ctx.bind_vertex_array(None);
        assert_eq!(ctx.get_vertex_attrib(0, GL_VERTEX_ATTRIB_ARRAY_ENABLED), Parameter::Bool(false));
        assert_eq!(ctx.get_vertex_attrib(0, GL_VERTEX_ATTRIB_ARRAY_SIZE), Parameter::Int(4));
        assert_eq!(ctx.get_vertex_attrib(0, GL_VERTEX_ATTRIB_ARRAY_TYPE), Parameter::Enum(GL_FLOAT));
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_generic_values() {
        let mut ctx = context();
        assert_eq!(
            ctx.get_vertex_attrib(1, GL_CURRENT_VERTEX_ATTRIB),
            Parameter::Attrib(GenericAttrib::Float([0.0; 4]))
        );
        ctx.vertex_attrib_2f(1, 0.5, 2.0);
        assert_eq!(
            ctx.get_vertex_attrib(1, GL_CURRENT_VERTEX_ATTRIB),
            Parameter::Attrib(GenericAttrib::Float([0.5, 2.0, 0.0, 1.0]))
        );
        ctx.vertex_attrib_i4ui(1, 1, 2, 3, 4);
        assert_eq!(
            ctx.get_vertex_attrib(1, GL_CURRENT_VERTEX_ATTRIB),
            Parameter::Attrib(GenericAttrib::Uint([1, 2, 3, 4]))
        );

        let max = ctx.limits().max_vertex_attribs;
        ctx.vertex_attrib_4f(max, 1.0, 1.0, 1.0, 1.0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.get_vertex_attrib(0, GL_VERTEX_ATTRIB_ARRAY_POINTER);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.enable_vertex_attrib_array(max);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
    }
}
