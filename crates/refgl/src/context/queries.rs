//! `getParameter` and its typed result.

use refgl_core::enums::*;
use refgl_core::{FormatMapper, GLenum, GlError};

use super::{GlResult, ReferenceContext};
use crate::buffer::{BufferHandle, BufferTarget};
use crate::framebuffer::{FramebufferHandle, RenderbufferHandle};
use crate::program::ProgramHandle;
use crate::state::{Capabilities, StencilFaceState};
use crate::texture::{TextureHandle, TextureType};
use crate::vertex_array::{GenericAttrib, VertexArrayHandle};

/// Typed result of a state query
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Parameter {
    /// Returned alongside an error
    #[default]
    None,
    /// Boolean
    Bool(bool),
    /// Four booleans (`GL_COLOR_WRITEMASK`)
    BoolArray4([bool; 4]),
    /// Signed integer
    Int(i32),
    /// Unsigned integer (masks, divisors)
    UInt(u32),
    /// Four integers (`GL_VIEWPORT`, `GL_SCISSOR_BOX`)
    IntArray4([i32; 4]),
    /// Float
    Float(f32),
    /// Two floats (`GL_DEPTH_RANGE`)
    FloatArray2([f32; 2]),
    /// Four floats (colors)
    FloatArray4([f32; 4]),
    /// GL enum value
    Enum(GLenum),
    /// Buffer binding
    Buffer(Option<BufferHandle>),
    /// Texture binding
    Texture(Option<TextureHandle>),
    /// Framebuffer binding
    Framebuffer(Option<FramebufferHandle>),
    /// Renderbuffer binding
    Renderbuffer(Option<RenderbufferHandle>),
    /// Vertex array binding, `None` = default vertex array
    VertexArray(Option<VertexArrayHandle>),
    /// Current program
    Program(Option<ProgramHandle>),
    /// Generic vertex attribute value
    Attrib(GenericAttrib),
}

impl<M: FormatMapper> ReferenceContext<M> {
    /// Query a context state value or limit
    pub fn get_parameter(&mut self, pname: GLenum) -> Parameter {
        let result = self.get_parameter_checked(pname);
        self.record_or_default("getParameter", result)
    }

    fn get_parameter_checked(&self, pname: GLenum) -> GlResult<Parameter> {
        if let Some(caps) = Capabilities::from_gl(pname) {
            return Ok(Parameter::Bool(self.state.is_enabled(caps)));
        }
        if let Some(limit) = self.limits.query(pname) {
            return Ok(Parameter::Int(limit as i32));
        }
        if let Some(value) = self.state.pixel_store.get(pname) {
            return Ok(Parameter::Int(value as i32));
        }
        if let Some(target) = BufferTarget::from_binding_query(pname) {
            return Ok(Parameter::Buffer(self.bound_buffer(target)));
        }
        if let Some(ty) = TextureType::from_binding_query(pname) {
            return Ok(Parameter::Texture(self.state.textures.active(ty)));
        }

        let state = &self.state;
        let stencil_face = |face: &StencilFaceState| match pname {
            GL_STENCIL_FUNC | GL_STENCIL_BACK_FUNC => Parameter::Enum(face.func.func),
            GL_STENCIL_REF | GL_STENCIL_BACK_REF => Parameter::Int(face.func.ref_value),
            GL_STENCIL_VALUE_MASK | GL_STENCIL_BACK_VALUE_MASK => Parameter::UInt(face.func.mask),
            GL_STENCIL_FAIL | GL_STENCIL_BACK_FAIL => Parameter::Enum(face.op.sfail),
            GL_STENCIL_PASS_DEPTH_FAIL | GL_STENCIL_BACK_PASS_DEPTH_FAIL => Parameter::Enum(face.op.dpfail),
            GL_STENCIL_PASS_DEPTH_PASS | GL_STENCIL_BACK_PASS_DEPTH_PASS => Parameter::Enum(face.op.dppass),
            _ => Parameter::UInt(face.write_mask),
        };

        Ok(match pname {
            GL_ACTIVE_TEXTURE => Parameter::Enum(GL_TEXTURE0 + state.textures.active_unit),
            GL_DRAW_FRAMEBUFFER_BINDING => Parameter::Framebuffer(state.framebuffers.draw),
            GL_READ_FRAMEBUFFER_BINDING => Parameter::Framebuffer(state.framebuffers.read),
            GL_RENDERBUFFER_BINDING => Parameter::Renderbuffer(state.renderbuffer),
            GL_VERTEX_ARRAY_BINDING => Parameter::VertexArray(state.vertex_array),
            GL_CURRENT_PROGRAM => Parameter::Program(state.program),

            GL_VIEWPORT => {
                let v = state.viewport;
                Parameter::IntArray4([v.x, v.y, v.width, v.height])
            }
            GL_SCISSOR_BOX => {
                let s = state.scissor;
                Parameter::IntArray4([s.x, s.y, s.width, s.height])
            }

            GL_COLOR_CLEAR_VALUE => Parameter::FloatArray4(state.clear.color),
            GL_DEPTH_CLEAR_VALUE => Parameter::Float(state.clear.depth),
            GL_STENCIL_CLEAR_VALUE => Parameter::Int(state.clear.stencil),

            GL_DEPTH_FUNC => Parameter::Enum(state.depth.func),
            GL_DEPTH_RANGE => Parameter::FloatArray2([state.depth.range_near, state.depth.range_far]),
            GL_DEPTH_WRITEMASK => Parameter::Bool(state.depth.write_enabled),

            GL_BLEND_COLOR => Parameter::FloatArray4(state.blend.color),
            GL_BLEND_SRC_RGB => Parameter::Enum(state.blend.factor.src_rgb),
            GL_BLEND_DST_RGB => Parameter::Enum(state.blend.factor.dst_rgb),
            GL_BLEND_SRC_ALPHA => Parameter::Enum(state.blend.factor.src_alpha),
            GL_BLEND_DST_ALPHA => Parameter::Enum(state.blend.factor.dst_alpha),
            GL_BLEND_EQUATION_RGB => Parameter::Enum(state.blend.equation.rgb),
            GL_BLEND_EQUATION_ALPHA => Parameter::Enum(state.blend.equation.alpha),

            GL_STENCIL_FUNC
            | GL_STENCIL_REF
            | GL_STENCIL_VALUE_MASK
            | GL_STENCIL_FAIL
            | GL_STENCIL_PASS_DEPTH_FAIL
            | GL_STENCIL_PASS_DEPTH_PASS
            | GL_STENCIL_WRITEMASK => stencil_face(&state.stencil.front),
            GL_STENCIL_BACK_FUNC
            | GL_STENCIL_BACK_REF
            | GL_STENCIL_BACK_VALUE_MASK
            | GL_STENCIL_BACK_FAIL
            | GL_STENCIL_BACK_PASS_DEPTH_FAIL
            | GL_STENCIL_BACK_PASS_DEPTH_PASS
            | GL_STENCIL_BACK_WRITEMASK => stencil_face(&state.stencil.back),

            GL_LINE_WIDTH => Parameter::Float(state.raster.line_width),
            GL_POLYGON_OFFSET_FACTOR => Parameter::Float(state.raster.polygon_offset_factor),
            GL_POLYGON_OFFSET_UNITS => Parameter::Float(state.raster.polygon_offset_units),
            GL_COLOR_WRITEMASK => Parameter::BoolArray4(state.raster.color_mask),

            _ => return Err(GlError::InvalidEnum),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::context;
    use super::*;

    #[test]
    fn test_unknown_pname() {
        let mut ctx = context();
        assert_eq!(ctx.get_parameter(GL_TEXTURE_2D), Parameter::None);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
    }

    #[test]
    fn test_initial_values() {
        let mut ctx = context();
        assert_eq!(ctx.get_parameter(GL_VIEWPORT), Parameter::IntArray4([0, 0, 16, 16]));
        assert_eq!(ctx.get_parameter(GL_SCISSOR_BOX), Parameter::IntArray4([0, 0, 16, 16]));
        assert_eq!(ctx.get_parameter(GL_DEPTH_FUNC), Parameter::Enum(GL_LESS));
        assert_eq!(ctx.get_parameter(GL_DEPTH_RANGE), Parameter::FloatArray2([0.0, 1.0]));
        assert_eq!(ctx.get_parameter(GL_BLEND_SRC_RGB), Parameter::Enum(GL_ONE));
        assert_eq!(ctx.get_parameter(GL_BLEND_DST_ALPHA), Parameter::Enum(GL_ZERO));
        assert_eq!(ctx.get_parameter(GL_STENCIL_BACK_WRITEMASK), Parameter::UInt(u32::MAX));
        assert_eq!(ctx.get_parameter(GL_UNPACK_ALIGNMENT), Parameter::Int(4));
        assert_eq!(ctx.get_parameter(GL_COLOR_WRITEMASK), Parameter::BoolArray4([true; 4]));
        assert_eq!(ctx.get_parameter(GL_ACTIVE_TEXTURE), Parameter::Enum(GL_TEXTURE0));
        assert_eq!(ctx.get_parameter(GL_BLEND), Parameter::Bool(false));
        assert_eq!(ctx.get_parameter(GL_DITHER), Parameter::Bool(true));
        assert_eq!(ctx.get_parameter(GL_MAX_VERTEX_ATTRIBS), Parameter::Int(16));
        assert_eq!(ctx.get_parameter(GL_VERTEX_ARRAY_BINDING), Parameter::VertexArray(None));
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_fixed_function_round_trip() {
        let mut ctx = context();
        ctx.viewport(1, 2, 3, 4);
        ctx.scissor(5, 6, 7, 8);
        ctx.clear_color(0.25, 0.5, 0.75, 2.0);
        ctx.clear_depthf(0.5);
        ctx.clear_stencil(3);
        ctx.depth_func(GL_GEQUAL);
        ctx.depth_rangef(0.25, 0.75);
        ctx.depth_mask(false);
        ctx.blend_color(0.5, 0.5, 0.5, -1.0);
        ctx.blend_func_separate(GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA, GL_ONE, GL_ZERO);
        ctx.blend_equation_separate(GL_FUNC_SUBTRACT, GL_MAX);
        ctx.line_width(2.0);
        ctx.polygon_offset(1.5, -2.0);
        ctx.color_mask(true, false, true, false);
        ctx.enable(GL_SCISSOR_TEST);
        assert_eq!(ctx.get_error(), GlError::NoError);

        assert_eq!(ctx.get_parameter(GL_VIEWPORT), Parameter::IntArray4([1, 2, 3, 4]));
        assert_eq!(ctx.get_parameter(GL_SCISSOR_BOX), Parameter::IntArray4([5, 6, 7, 8]));
        assert_eq!(ctx.get_parameter(GL_COLOR_CLEAR_VALUE), Parameter::FloatArray4([0.25, 0.5, 0.75, 1.0]));
        assert_eq!(ctx.get_parameter(GL_DEPTH_CLEAR_VALUE), Parameter::Float(0.5));
        assert_eq!(ctx.get_parameter(GL_STENCIL_CLEAR_VALUE), Parameter::Int(3));
        assert_eq!(ctx.get_parameter(GL_DEPTH_FUNC), Parameter::Enum(GL_GEQUAL));
        assert_eq!(ctx.get_parameter(GL_DEPTH_RANGE), Parameter::FloatArray2([0.25, 0.75]));
        assert_eq!(ctx.get_parameter(GL_DEPTH_WRITEMASK), Parameter::Bool(false));
        assert_eq!(ctx.get_parameter(GL_BLEND_COLOR), Parameter::FloatArray4([0.5, 0.5, 0.5, 0.0]));
        assert_eq!(ctx.get_parameter(GL_BLEND_SRC_RGB), Parameter::Enum(GL_SRC_ALPHA));
        assert_eq!(ctx.get_parameter(GL_BLEND_DST_RGB), Parameter::Enum(GL_ONE_MINUS_SRC_ALPHA));
        assert_eq!(ctx.get_parameter(GL_BLEND_SRC_ALPHA), Parameter::Enum(GL_ONE));
        assert_eq!(ctx.get_parameter(GL_BLEND_EQUATION_RGB), Parameter::Enum(GL_FUNC_SUBTRACT));
        assert_eq!(ctx.get_parameter(GL_BLEND_EQUATION_ALPHA), Parameter::Enum(GL_MAX));
        assert_eq!(ctx.get_parameter(GL_LINE_WIDTH), Parameter::Float(2.0));
        assert_eq!(ctx.get_parameter(GL_POLYGON_OFFSET_FACTOR), Parameter::Float(1.5));
        assert_eq!(ctx.get_parameter(GL_POLYGON_OFFSET_UNITS), Parameter::Float(-2.0));
        assert_eq!(ctx.get_parameter(GL_COLOR_WRITEMASK), Parameter::BoolArray4([true, false, true, false]));
        assert_eq!(ctx.get_parameter(GL_SCISSOR_TEST), Parameter::Bool(true));
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_stencil_round_trip() {
        let mut ctx = context();
        ctx.stencil_func_separate(GL_FRONT, GL_EQUAL, 7, 0x0F);
        ctx.stencil_op_separate(GL_BACK, GL_REPLACE, GL_INCR_WRAP, GL_INVERT);
        ctx.stencil_mask_separate(GL_BACK, 0x3C);
        assert_eq!(ctx.get_error(), GlError::NoError);

        assert_eq!(ctx.get_parameter(GL_STENCIL_FUNC), Parameter::Enum(GL_EQUAL));
        assert_eq!(ctx.get_parameter(GL_STENCIL_REF), Parameter::Int(7));
        assert_eq!(ctx.get_parameter(GL_STENCIL_VALUE_MASK), Parameter::UInt(0x0F));
        assert_eq!(ctx.get_parameter(GL_STENCIL_BACK_FUNC), Parameter::Enum(GL_ALWAYS));
        assert_eq!(ctx.get_parameter(GL_STENCIL_FAIL), Parameter::Enum(GL_KEEP));
        assert_eq!(ctx.get_parameter(GL_STENCIL_BACK_FAIL), Parameter::Enum(GL_REPLACE));
        assert_eq!(ctx.get_parameter(GL_STENCIL_BACK_PASS_DEPTH_FAIL), Parameter::Enum(GL_INCR_WRAP));
        assert_eq!(ctx.get_parameter(GL_STENCIL_BACK_PASS_DEPTH_PASS), Parameter::Enum(GL_INVERT));
        assert_eq!(ctx.get_parameter(GL_STENCIL_BACK_WRITEMASK), Parameter::UInt(0x3C));
        assert_eq!(ctx.get_parameter(GL_STENCIL_WRITEMASK), Parameter::UInt(u32::MAX));
    }

    #[test]
    fn test_binding_round_trip() {
        let mut ctx = context();
        let buffer = ctx.create_buffer();
        let texture = ctx.create_texture();
        let fbo = ctx.create_framebuffer();
        let rbo = ctx.create_renderbuffer();
        let vao = ctx.create_vertex_array();
        let program = ctx.create_program();

        ctx.bind_vertex_array(Some(vao));
        ctx.bind_buffer(GL_ELEMENT_ARRAY_BUFFER, Some(buffer));
        ctx.bind_buffer(GL_PIXEL_UNPACK_BUFFER, Some(buffer));
        ctx.active_texture(GL_TEXTURE0 + 3);
        ctx.bind_texture(GL_TEXTURE_3D, Some(texture));
        ctx.bind_framebuffer(GL_READ_FRAMEBUFFER, Some(fbo));
        ctx.bind_renderbuffer(GL_RENDERBUFFER, Some(rbo));
        ctx.use_program(Some(program));
        ctx.pixel_storei(GL_PACK_ROW_LENGTH, 9);
        assert_eq!(ctx.get_error(), GlError::NoError);

        assert_eq!(ctx.get_parameter(GL_ELEMENT_ARRAY_BUFFER_BINDING), Parameter::Buffer(Some(buffer)));
        assert_eq!(ctx.get_parameter(GL_PIXEL_UNPACK_BUFFER_BINDING), Parameter::Buffer(Some(buffer)));
        assert_eq!(ctx.get_parameter(GL_ARRAY_BUFFER_BINDING), Parameter::Buffer(None));
        assert_eq!(ctx.get_parameter(GL_ACTIVE_TEXTURE), Parameter::Enum(GL_TEXTURE0 + 3));
        assert_eq!(ctx.get_parameter(GL_TEXTURE_BINDING_3D), Parameter::Texture(Some(texture)));
        assert_eq!(ctx.get_parameter(GL_TEXTURE_BINDING_2D), Parameter::Texture(None));
        assert_eq!(ctx.get_parameter(GL_READ_FRAMEBUFFER_BINDING), Parameter::Framebuffer(Some(fbo)));
        assert_eq!(ctx.get_parameter(GL_FRAMEBUFFER_BINDING), Parameter::Framebuffer(None));
        assert_eq!(ctx.get_parameter(GL_RENDERBUFFER_BINDING), Parameter::Renderbuffer(Some(rbo)));
        assert_eq!(ctx.get_parameter(GL_VERTEX_ARRAY_BINDING), Parameter::VertexArray(Some(vao)));
        assert_eq!(ctx.get_parameter(GL_CURRENT_PROGRAM), Parameter::Program(Some(program)));
        assert_eq!(ctx.get_parameter(GL_PACK_ROW_LENGTH), Parameter::Int(9));

        ctx.bind_vertex_array(None);
        assert_eq!(ctx.get_parameter(GL_ELEMENT_ARRAY_BUFFER_BINDING), Parameter::Buffer(None));
        assert_eq!(ctx.get_error(), GlError::NoError);
    }
}
