//! # Reference Context
//!
//! [`ReferenceContext`] owns every object arena, the scalar state and the
//! sticky error slot, and exposes the GL entry points.
//!
//! Each entry point is split in two: a `*_checked` body that validates in
//! the order enum, object liveness, object type, numeric range,
//! cross-parameter consistency and only then mutates, and a thin public
//! wrapper that records the first failure in the error slot. A rejected
//! call therefore never changes state.
//!
//! Entry points are grouped by concern:
//! - `objects`: creation, deletion and binding
//! - `fixed_function`: viewport, capabilities, blend, depth, stencil,
//!   pixel store
//! - `buffers`: buffer uploads and readback
//! - `textures`: image upload, immutable storage, parameters
//! - `framebuffers`: attachments, completeness, renderbuffers,
//!   `readPixels`
//! - `clear`: `clear`, `clearBuffer*` and `blitFramebuffer`
//! - `vertex_arrays`: attribute arrays and generic attribute values
//! - `queries`: `getParameter`

mod buffers;
mod clear;
mod fixed_function;
mod framebuffers;
mod objects;
mod queries;
mod textures;
mod vertex_arrays;

use alloc::vec::Vec;
use core::fmt;

use refgl_core::{ContextLimits, FormatMapper, GlError, StandardFormats};

use crate::buffer::{BufferHandle, BufferTarget, DataBuffer};
use crate::config::{ContextConfig, DefaultFramebuffer};
use crate::framebuffer::{Framebuffer, FramebufferHandle, Renderbuffer, RenderbufferHandle};
use crate::object::ObjectTable;
use crate::program::{Program, ProgramHandle};
use crate::state::{GlState, ScissorRect, TextureBindings, Viewport};
use crate::texture::{Texture, TextureHandle, TextureType};
use crate::vertex_array::{VertexArray, VertexArrayHandle};

pub use framebuffers::PackDestination;
pub use queries::Parameter;
pub use textures::PixelSource;

/// Outcome of an entry point's validation
pub(crate) type GlResult<T = ()> = core::result::Result<T, GlError>;

/// Default textures of one texture unit, indexed by [`TextureType::index`]
type DefaultTextures = [Texture; TextureType::ALL.len()];

// =============================================================================
// CONTEXT
// =============================================================================

/// Software reference GL context.
///
/// `M` converts GL format enums to storage formats; [`StandardFormats`]
/// covers every format the context allocates itself.
pub struct ReferenceContext<M: FormatMapper = StandardFormats> {
    limits: ContextLimits,
    mapper: M,
    state: GlState,
    error: GlError,

    buffers: ObjectTable<DataBuffer>,
    textures: ObjectTable<Texture>,
    framebuffers: ObjectTable<Framebuffer>,
    renderbuffers: ObjectTable<Renderbuffer>,
    vertex_arrays: ObjectTable<VertexArray>,
    programs: ObjectTable<Program>,

    default_vertex_array: VertexArray,
    default_textures: Vec<DefaultTextures>,
    default_framebuffer: DefaultFramebuffer,
}

static_assertions::assert_impl_all!(ReferenceContext: Send);

impl ReferenceContext<StandardFormats> {
    /// Create a context with the built-in format table
    pub fn new(config: ContextConfig) -> Self {
        Self::with_mapper(config, StandardFormats)
    }
}

impl<M: FormatMapper> ReferenceContext<M> {
    /// Create a context with a custom format mapper
    pub fn with_mapper(config: ContextConfig, mapper: M) -> Self {
        let limits = config.limits;
        let mut state = GlState::new(&limits);
        let (width, height) = (config.width as i32, config.height as i32);
        state.viewport = Viewport {
            x: 0,
            y: 0,
            width,
            height,
        };
        state.scissor = ScissorRect {
            x: 0,
            y: 0,
            width,
            height,
        };

        log::debug!(
            "Reference context: {} texture units, {} vertex attribs",
            limits.max_texture_image_units,
            limits.max_vertex_attribs
        );

        Self {
            limits,
            mapper,
            state,
            error: GlError::NoError,
            buffers: ObjectTable::new(),
            textures: ObjectTable::new(),
            framebuffers: ObjectTable::new(),
            renderbuffers: ObjectTable::new(),
            vertex_arrays: ObjectTable::new(),
            programs: ObjectTable::new(),
            default_vertex_array: VertexArray::new(limits.max_vertex_attribs),
            default_textures: (0..limits.max_texture_image_units)
                .map(|_| TextureType::ALL.map(Texture::with_type))
                .collect(),
            default_framebuffer: DefaultFramebuffer::new(&config),
        }
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    /// Return the recorded error and reset the slot
    pub fn get_error(&mut self) -> GlError {
        core::mem::take(&mut self.error)
    }

    /// Record `error` unless an earlier one is still pending
    fn set_error(&mut self, error: GlError) {
        if self.error.is_error() {
            log::trace!("{} discarded, {} pending", error, self.error);
        } else {
            self.error = error;
        }
    }

    /// Record the failure of `entry`, if any
    fn record(&mut self, entry: &'static str, result: GlResult) {
        if let Err(error) = result {
            log::trace!("{}: {}", entry, error);
            self.set_error(error);
        }
    }

    /// Record the failure of a getter and fall back to the type's default
    fn record_or_default<T: Default>(&mut self, entry: &'static str, result: GlResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => {
                self.record(entry, Err(error));
                T::default()
            }
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    /// Scalar state and binding tables
    pub fn state(&self) -> &GlState {
        &self.state
    }

    /// Implementation limits
    pub fn limits(&self) -> &ContextLimits {
        &self.limits
    }

    /// Format mapper
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    /// Live buffer object
    pub fn buffer(&self, handle: BufferHandle) -> Option<&DataBuffer> {
        self.buffers.get(handle)
    }

    /// Live texture object
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle)
    }

    /// Default texture of `unit` for `ty`
    pub fn default_texture(&self, unit: u32, ty: TextureType) -> Option<&Texture> {
        self.default_textures.get(unit as usize).map(|unit| &unit[ty.index()])
    }

    /// Live framebuffer object
    pub fn framebuffer(&self, handle: FramebufferHandle) -> Option<&Framebuffer> {
        self.framebuffers.get(handle)
    }

    /// Live renderbuffer object
    pub fn renderbuffer(&self, handle: RenderbufferHandle) -> Option<&Renderbuffer> {
        self.renderbuffers.get(handle)
    }

    /// Vertex array object; `None` is the default vertex array
    pub fn vertex_array(&self, handle: Option<VertexArrayHandle>) -> Option<&VertexArray> {
        match handle {
            Some(handle) => self.vertex_arrays.get(handle),
            None => Some(&self.default_vertex_array),
        }
    }

    /// Live program object
    pub fn program(&self, handle: ProgramHandle) -> Option<&Program> {
        self.programs.get(handle)
    }

    /// Buffers of the default framebuffer
    pub fn default_framebuffer(&self) -> &DefaultFramebuffer {
        &self.default_framebuffer
    }

    // =========================================================================
    // BOUND OBJECTS
    // =========================================================================

    fn current_vertex_array(&self) -> &VertexArray {
        match self.state.vertex_array {
            Some(handle) => match self.vertex_arrays.get(handle) {
                Some(vao) => vao,
                None => unreachable!("bound vertex array {:?} is not live", handle),
            },
            None => &self.default_vertex_array,
        }
    }

    fn current_vertex_array_mut(&mut self) -> &mut VertexArray {
        match self.state.vertex_array {
            Some(handle) => match self.vertex_arrays.get_mut(handle) {
                Some(vao) => vao,
                None => unreachable!("bound vertex array {:?} is not live", handle),
            },
            None => &mut self.default_vertex_array,
        }
    }

    /// Buffer bound to `target`; the element array binding belongs to the
    /// current vertex array
    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferHandle> {
        match target {
            BufferTarget::ElementArray => self.current_vertex_array().element_array_buffer,
            _ => self.state.buffers.get(target),
        }
    }

    /// Texture that texture calls on `ty` act on: the active unit's binding,
    /// or that unit's default texture
    fn active_texture_object(&self, ty: TextureType) -> &Texture {
        match self.state.textures.active(ty) {
            Some(handle) => match self.textures.get(handle) {
                Some(texture) => texture,
                None => unreachable!("bound texture {:?} is not live", handle),
            },
            None => &self.default_textures[self.state.textures.active_unit as usize][ty.index()],
        }
    }

    fn active_texture_object_mut(&mut self, ty: TextureType) -> &mut Texture {
        texture_slot(
            &mut self.textures,
            &mut self.default_textures,
            &self.state.textures,
            ty,
        )
    }
}

/// [`ReferenceContext::active_texture_object_mut`] over split borrows, for
/// callers that read another arena at the same time
fn texture_slot<'a>(
    textures: &'a mut ObjectTable<Texture>,
    defaults: &'a mut [DefaultTextures],
    bindings: &TextureBindings,
    ty: TextureType,
) -> &'a mut Texture {
    match bindings.active(ty) {
        Some(handle) => match textures.get_mut(handle) {
            Some(texture) => texture,
            None => unreachable!("bound texture {:?} is not live", handle),
        },
        None => &mut defaults[bindings.active_unit as usize][ty.index()],
    }
}

impl<M: FormatMapper> fmt::Debug for ReferenceContext<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReferenceContext")
            .field("limits", &self.limits)
            .field("error", &self.error)
            .field("buffers", &self.buffers.len())
            .field("textures", &self.textures.len())
            .field("framebuffers", &self.framebuffers.len())
            .field("renderbuffers", &self.renderbuffers.len())
            .field("vertex_arrays", &self.vertex_arrays.len())
            .field("programs", &self.programs.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use alloc::vec;
    use refgl_core::enums::*;
    use refgl_core::GLenum;

    pub(super) fn context() -> ReferenceContext {
        ReferenceContext::new(ContextConfig::new(16, 16))
    }

    #[test]
    fn test_initial_state() {
        let mut ctx = context();
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(ctx.state().viewport.width, 16);
        assert_eq!(ctx.state().scissor.height, 16);
        assert!(ctx.vertex_array(None).is_some());
        let texture = ctx.default_texture(3, TextureType::CubeMap);
        assert_eq!(texture.and_then(Texture::texture_type), Some(TextureType::CubeMap));
        assert!(ctx.default_texture(16, TextureType::Texture2D).is_none());
    }

    #[test]
    fn test_sticky_first_error() {
        let mut ctx = context();
        ctx.enable(GL_TEXTURE_2D);
        ctx.scissor(0, 0, -1, 10);
        ctx.bind_texture(GL_TEXTURE_2D, None);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_get_error_clears() {
        let mut ctx = context();
        ctx.pixel_storei(GL_UNPACK_ALIGNMENT, 3);
        assert_eq!(ctx.get_error().code(), GL_INVALID_VALUE);
        ctx.pixel_storei(GL_UNPACK_ALIGNMENT, 8);
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_debug_is_summary() {
        let mut ctx = context();
        ctx.create_buffer();
        let text = alloc::format!("{:?}", ctx);
        assert!(text.contains("buffers: 1"));
    }

    /// One scalar-state call with arbitrary arguments
    #[derive(Debug, Clone)]
    enum Call {
        PixelStore(GLenum, i32),
        Scissor(i32, i32, i32, i32),
        Viewport(i32, i32, i32, i32),
        Enable(GLenum),
        DepthFunc(GLenum),
        StencilOpSeparate(GLenum, GLenum, GLenum, GLenum),
        BlendFuncSeparate(GLenum, GLenum, GLenum, GLenum),
        LineWidth(f32),
        ActiveTexture(GLenum),
        AttribPointer(u32, i32, GLenum, i32, isize),
    }

    fn enum_value() -> impl Strategy<Value = GLenum> {
        prop_oneof![
            Just(GL_ZERO),
            Just(GL_ONE),
            Just(GL_KEEP),
            Just(GL_INCR),
            Just(GL_FRONT),
            Just(GL_FRONT_AND_BACK),
            Just(GL_LESS),
            Just(GL_FLOAT),
            Just(GL_INT_2_10_10_10_REV),
            Just(GL_BLEND),
            Just(GL_DITHER),
            Just(GL_SRC_ALPHA),
            Just(GL_UNPACK_ALIGNMENT),
            Just(GL_PACK_ROW_LENGTH),
            Just(GL_TEXTURE0 + 3),
            Just(GL_TEXTURE0 + 40),
            0u32..0x9000,
        ]
    }

    fn call() -> impl Strategy<Value = Call> {
        let small = -4i32..12;
        prop_oneof![
            (enum_value(), small.clone()).prop_map(|(p, v)| Call::PixelStore(p, v)),
            (small.clone(), small.clone(), small.clone(), small.clone())
                .prop_map(|(x, y, w, h)| Call::Scissor(x, y, w, h)),
            (small.clone(), small.clone(), small.clone(), small.clone())
                .prop_map(|(x, y, w, h)| Call::Viewport(x, y, w, h)),
            enum_value().prop_map(Call::Enable),
            enum_value().prop_map(Call::DepthFunc),
            (enum_value(), enum_value(), enum_value(), enum_value())
                .prop_map(|(f, a, b, c)| Call::StencilOpSeparate(f, a, b, c)),
            (enum_value(), enum_value(), enum_value(), enum_value())
                .prop_map(|(a, b, c, d)| Call::BlendFuncSeparate(a, b, c, d)),
            (-2.0f32..4.0).prop_map(Call::LineWidth),
            enum_value().prop_map(Call::ActiveTexture),
            (0u32..20, small.clone(), enum_value(), small.clone(), -2isize..8)
                .prop_map(|(i, s, t, st, o)| Call::AttribPointer(i, s, t, st, o)),
        ]
    }

    fn apply(ctx: &mut ReferenceContext, call: &Call) {
        match *call {
            Call::PixelStore(pname, value) => ctx.pixel_storei(pname, value),
            Call::Scissor(x, y, w, h) => ctx.scissor(x, y, w, h),
            Call::Viewport(x, y, w, h) => ctx.viewport(x, y, w, h),
            Call::Enable(cap) => ctx.enable(cap),
            Call::DepthFunc(func) => ctx.depth_func(func),
            Call::StencilOpSeparate(face, a, b, c) => ctx.stencil_op_separate(face, a, b, c),
            Call::BlendFuncSeparate(a, b, c, d) => ctx.blend_func_separate(a, b, c, d),
            Call::LineWidth(width) => ctx.line_width(width),
            Call::ActiveTexture(unit) => ctx.active_texture(unit),
            Call::AttribPointer(index, size, ty, stride, offset) => {
                ctx.vertex_attrib_pointer(index, size, ty, false, stride, offset)
            }
        }
    }

    proptest! {
        #[test]
        fn test_failed_calls_do_not_mutate(calls in proptest::collection::vec(call(), 1..24)) {
            let mut ctx = context();
            for call in &calls {
                let state = ctx.state().clone();
                let vao = ctx.vertex_array(None).cloned();
                apply(&mut ctx, call);
                if ctx.get_error().is_error() {
                    prop_assert_eq!(ctx.state(), &state);
                    prop_assert_eq!(ctx.vertex_array(None).cloned(), vao);
                }
            }
        }

        #[test]
        fn test_error_slot_keeps_first(calls in proptest::collection::vec(call(), 1..24)) {
            // `witness` drains after every call to see each call's own error
            let mut witness = context();
            let mut ctx = context();
            let mut first = GlError::NoError;
            for call in &calls {
                apply(&mut witness, call);
                apply(&mut ctx, call);
                let own = witness.get_error();
                if !first.is_error() {
                    first = own;
                }
            }
            prop_assert_eq!(ctx.get_error(), first);
            prop_assert_eq!(ctx.get_error(), GlError::NoError);
        }
    }
}
