//! # Context State
//!
//! Every scalar piece of context state plus the binding tables. `GlState`
//! is plain data: the context validates arguments and then writes through
//! the setters here, so a snapshot taken before a rejected call compares
//! equal to one taken after it.

use alloc::vec;
use alloc::vec::Vec;

use bitflags::bitflags;
use refgl_core::enums::*;
use refgl_core::{ContextLimits, GLenum};

use crate::buffer::{BufferHandle, BufferTarget};
use crate::framebuffer::{FramebufferHandle, RenderbufferHandle};
use crate::pixel::TransferParams;
use crate::program::ProgramHandle;
use crate::texture::{TextureHandle, TextureType};
use crate::vertex_array::{GenericAttrib, VertexArrayHandle};

// =============================================================================
// CAPABILITIES
// =============================================================================

bitflags! {
    /// Capabilities toggled with `enable`/`disable`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// `GL_BLEND`
        const BLEND = 1 << 0;
        /// `GL_SCISSOR_TEST`
        const SCISSOR_TEST = 1 << 1;
        /// `GL_DEPTH_TEST`
        const DEPTH_TEST = 1 << 2;
        /// `GL_STENCIL_TEST`
        const STENCIL_TEST = 1 << 3;
        /// `GL_POLYGON_OFFSET_FILL`
        const POLYGON_OFFSET_FILL = 1 << 4;
        /// `GL_CULL_FACE`
        const CULL_FACE = 1 << 5;
        /// `GL_RASTERIZER_DISCARD`
        const RASTERIZER_DISCARD = 1 << 6;
        /// `GL_DITHER`
        const DITHER = 1 << 7;
    }
}

impl Default for Capabilities {
    /// Dithering starts enabled, everything else disabled
    fn default() -> Self {
        Capabilities::DITHER
    }
}

impl Capabilities {
    /// Flag for a capability enum
    pub fn from_gl(cap: GLenum) -> Option<Self> {
        Some(match cap {
            GL_BLEND => Self::BLEND,
            GL_SCISSOR_TEST => Self::SCISSOR_TEST,
            GL_DEPTH_TEST => Self::DEPTH_TEST,
            GL_STENCIL_TEST => Self::STENCIL_TEST,
            GL_POLYGON_OFFSET_FILL => Self::POLYGON_OFFSET_FILL,
            GL_CULL_FACE => Self::CULL_FACE,
            GL_RASTERIZER_DISCARD => Self::RASTERIZER_DISCARD,
            GL_DITHER => Self::DITHER,
            _ => return None,
        })
    }
}

// =============================================================================
// ENUM VALIDATION
// =============================================================================

/// Depth/stencil comparison function
pub fn is_compare_func(func: GLenum) -> bool {
    matches!(
        func,
        GL_NEVER | GL_LESS | GL_EQUAL | GL_LEQUAL | GL_GREATER | GL_NOTEQUAL | GL_GEQUAL | GL_ALWAYS
    )
}

/// Stencil operation
pub fn is_stencil_op(op: GLenum) -> bool {
    matches!(
        op,
        GL_KEEP | GL_ZERO | GL_REPLACE | GL_INCR | GL_DECR | GL_INVERT | GL_INCR_WRAP | GL_DECR_WRAP
    )
}

/// Blend factor
pub fn is_blend_factor(factor: GLenum) -> bool {
    matches!(
        factor,
        GL_ZERO
            | GL_ONE
            | GL_SRC_COLOR
            | GL_ONE_MINUS_SRC_COLOR
            | GL_DST_COLOR
            | GL_ONE_MINUS_DST_COLOR
            | GL_SRC_ALPHA
            | GL_ONE_MINUS_SRC_ALPHA
            | GL_DST_ALPHA
            | GL_ONE_MINUS_DST_ALPHA
            | GL_CONSTANT_COLOR
            | GL_ONE_MINUS_CONSTANT_COLOR
            | GL_CONSTANT_ALPHA
            | GL_ONE_MINUS_CONSTANT_ALPHA
            | GL_SRC_ALPHA_SATURATE
    )
}

/// Blend equation
pub fn is_blend_equation(mode: GLenum) -> bool {
    matches!(
        mode,
        GL_FUNC_ADD | GL_FUNC_SUBTRACT | GL_FUNC_REVERSE_SUBTRACT | GL_MIN | GL_MAX
    )
}

/// Face selector for separate stencil state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilFace {
    /// `GL_FRONT`
    Front,
    /// `GL_BACK`
    Back,
    /// `GL_FRONT_AND_BACK`
    FrontAndBack,
}

impl StencilFace {
    /// Parse a face enum
    pub fn from_gl(face: GLenum) -> Option<Self> {
        Some(match face {
            GL_FRONT => Self::Front,
            GL_BACK => Self::Back,
            GL_FRONT_AND_BACK => Self::FrontAndBack,
            _ => return None,
        })
    }

    const fn front(self) -> bool {
        matches!(self, Self::Front | Self::FrontAndBack)
    }

    const fn back(self) -> bool {
        matches!(self, Self::Back | Self::FrontAndBack)
    }
}

// =============================================================================
// VIEWPORT STATE
// =============================================================================

/// Viewport rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

/// Scissor box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScissorRect {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
    /// Width
    pub width: i32,
    /// Height
    pub height: i32,
}

// =============================================================================
// BLEND STATE
// =============================================================================

/// Blend function factors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendFactor {
    /// Source RGB factor
    pub src_rgb: GLenum,
    /// Destination RGB factor
    pub dst_rgb: GLenum,
    /// Source alpha factor
    pub src_alpha: GLenum,
    /// Destination alpha factor
    pub dst_alpha: GLenum,
}

impl Default for BlendFactor {
    fn default() -> Self {
        Self {
            src_rgb: GL_ONE,
            dst_rgb: GL_ZERO,
            src_alpha: GL_ONE,
            dst_alpha: GL_ZERO,
        }
    }
}

/// Blend equations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendEquation {
    /// RGB equation
    pub rgb: GLenum,
    /// Alpha equation
    pub alpha: GLenum,
}

impl Default for BlendEquation {
    fn default() -> Self {
        Self {
            rgb: GL_FUNC_ADD,
            alpha: GL_FUNC_ADD,
        }
    }
}

/// Blend state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlendState {
    /// Blend factors
    pub factor: BlendFactor,
    /// Blend equations
    pub equation: BlendEquation,
    /// Constant blend color, clamped to [0, 1]
    pub color: [f32; 4],
}

// =============================================================================
// DEPTH STATE
// =============================================================================

/// Depth test state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthState {
    /// Comparison function
    pub func: GLenum,
    /// Depth range near, clamped to [0, 1]
    pub range_near: f32,
    /// Depth range far, clamped to [0, 1]
    pub range_far: f32,
    /// Depth writes enabled
    pub write_enabled: bool,
}

impl Default for DepthState {
    fn default() -> Self {
        Self {
            func: GL_LESS,
            range_near: 0.0,
            range_far: 1.0,
            write_enabled: true,
        }
    }
}

// =============================================================================
// STENCIL STATE
// =============================================================================

/// Stencil operation set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilOp {
    /// Stencil fail operation
    pub sfail: GLenum,
    /// Depth fail operation
    pub dpfail: GLenum,
    /// Depth pass operation
    pub dppass: GLenum,
}

impl Default for StencilOp {
    fn default() -> Self {
        Self {
            sfail: GL_KEEP,
            dpfail: GL_KEEP,
            dppass: GL_KEEP,
        }
    }
}

/// Stencil function parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFunc {
    /// Comparison function
    pub func: GLenum,
    /// Reference value
    pub ref_value: i32,
    /// Comparison mask
    pub mask: u32,
}

impl Default for StencilFunc {
    fn default() -> Self {
        Self {
            func: GL_ALWAYS,
            ref_value: 0,
            mask: u32::MAX,
        }
    }
}

/// Stencil state of one face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StencilFaceState {
    /// Stencil operations
    pub op: StencilOp,
    /// Stencil function
    pub func: StencilFunc,
    /// Write mask
    pub write_mask: u32,
}

impl Default for StencilFaceState {
    fn default() -> Self {
        Self {
            op: StencilOp::default(),
            func: StencilFunc::default(),
            write_mask: u32::MAX,
        }
    }
}

/// Stencil state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StencilState {
    /// Front face state
    pub front: StencilFaceState,
    /// Back face state
    pub back: StencilFaceState,
}

impl StencilState {
    fn for_each_face(&mut self, face: StencilFace, mut f: impl FnMut(&mut StencilFaceState)) {
        if face.front() {
            f(&mut self.front);
        }
        if face.back() {
            f(&mut self.back);
        }
    }
}

// =============================================================================
// RASTERIZATION & CLEAR STATE
// =============================================================================

/// Rasterization state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterState {
    /// Polygon offset factor
    pub polygon_offset_factor: f32,
    /// Polygon offset units
    pub polygon_offset_units: f32,
    /// Line width
    pub line_width: f32,
    /// Color write mask (RGBA)
    pub color_mask: [bool; 4],
}

impl Default for RasterState {
    fn default() -> Self {
        Self {
            polygon_offset_factor: 0.0,
            polygon_offset_units: 0.0,
            line_width: 1.0,
            color_mask: [true; 4],
        }
    }
}

/// Clear values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClearState {
    /// Clear color, clamped to [0, 1]
    pub color: [f32; 4],
    /// Clear depth, clamped to [0, 1]
    pub depth: f32,
    /// Clear stencil
    pub stencil: i32,
}

impl Default for ClearState {
    fn default() -> Self {
        Self {
            color: [0.0; 4],
            depth: 1.0,
            stencil: 0,
        }
    }
}

// =============================================================================
// PIXEL STORE
// =============================================================================

/// Pixel-store parameters for both transfer directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelStoreState {
    /// `GL_UNPACK_*`
    pub unpack: TransferParams,
    /// `GL_PACK_*` (image height and skip images stay 0)
    pub pack: TransferParams,
}

impl Default for PixelStoreState {
    fn default() -> Self {
        let params = TransferParams {
            alignment: 4,
            row_length: 0,
            image_height: 0,
            skip_pixels: 0,
            skip_rows: 0,
            skip_images: 0,
        };
        Self {
            unpack: params,
            pack: params,
        }
    }
}

impl PixelStoreState {
    /// Current value of a pixel-store parameter, `None` for other enums
    pub fn get(&self, pname: GLenum) -> Option<u32> {
        Some(match pname {
            GL_UNPACK_ALIGNMENT => self.unpack.alignment,
            GL_UNPACK_ROW_LENGTH => self.unpack.row_length,
            GL_UNPACK_IMAGE_HEIGHT => self.unpack.image_height,
            GL_UNPACK_SKIP_PIXELS => self.unpack.skip_pixels,
            GL_UNPACK_SKIP_ROWS => self.unpack.skip_rows,
            GL_UNPACK_SKIP_IMAGES => self.unpack.skip_images,
            GL_PACK_ALIGNMENT => self.pack.alignment,
            GL_PACK_ROW_LENGTH => self.pack.row_length,
            GL_PACK_SKIP_PIXELS => self.pack.skip_pixels,
            GL_PACK_SKIP_ROWS => self.pack.skip_rows,
            _ => return None,
        })
    }

    /// Slot written by `pixelStorei(pname)`, `None` for other enums
    pub fn slot_mut(&mut self, pname: GLenum) -> Option<&mut u32> {
        Some(match pname {
            GL_UNPACK_ALIGNMENT => &mut self.unpack.alignment,
            GL_UNPACK_ROW_LENGTH => &mut self.unpack.row_length,
            GL_UNPACK_IMAGE_HEIGHT => &mut self.unpack.image_height,
            GL_UNPACK_SKIP_PIXELS => &mut self.unpack.skip_pixels,
            GL_UNPACK_SKIP_ROWS => &mut self.unpack.skip_rows,
            GL_UNPACK_SKIP_IMAGES => &mut self.unpack.skip_images,
            GL_PACK_ALIGNMENT => &mut self.pack.alignment,
            GL_PACK_ROW_LENGTH => &mut self.pack.row_length,
            GL_PACK_SKIP_PIXELS => &mut self.pack.skip_pixels,
            GL_PACK_SKIP_ROWS => &mut self.pack.skip_rows,
            _ => return None,
        })
    }
}

/// Whether `pname` is an alignment parameter
pub fn is_alignment_param(pname: GLenum) -> bool {
    matches!(pname, GL_UNPACK_ALIGNMENT | GL_PACK_ALIGNMENT)
}

// =============================================================================
// BINDING TABLES
// =============================================================================

/// Context-level buffer target bindings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BufferBindings {
    slots: [Option<BufferHandle>; BufferTarget::CONTEXT_TARGETS.len()],
}

impl BufferBindings {
    fn slot(target: BufferTarget) -> usize {
        match BufferTarget::CONTEXT_TARGETS.iter().position(|t| *t == target) {
            Some(index) => index,
            None => unreachable!("{:?} is bound through the vertex array", target),
        }
    }

    /// Buffer bound to `target`
    pub fn get(&self, target: BufferTarget) -> Option<BufferHandle> {
        self.slots[Self::slot(target)]
    }

    /// Bind `buffer` to `target`
    pub fn set(&mut self, target: BufferTarget, buffer: Option<BufferHandle>) {
        self.slots[Self::slot(target)] = buffer;
    }

    /// Clear every slot holding `buffer`
    pub fn unbind(&mut self, buffer: BufferHandle) {
        for slot in &mut self.slots {
            if *slot == Some(buffer) {
                *slot = None;
            }
        }
    }
}

/// Texture bindings of one unit, indexed by [`TextureType::index`]
pub type TextureUnitBindings = [Option<TextureHandle>; TextureType::ALL.len()];

/// Active unit and per-unit texture bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureBindings {
    /// Active unit index (`GL_ACTIVE_TEXTURE - GL_TEXTURE0`)
    pub active_unit: u32,
    units: Vec<TextureUnitBindings>,
}

impl TextureBindings {
    /// Empty bindings for `unit_count` units
    pub fn new(unit_count: u32) -> Self {
        Self {
            active_unit: 0,
            units: vec![[None; TextureType::ALL.len()]; unit_count as usize],
        }
    }

    /// Number of units
    pub fn unit_count(&self) -> u32 {
        self.units.len() as u32
    }

    /// Texture bound to `ty` on `unit`
    pub fn get(&self, unit: u32, ty: TextureType) -> Option<TextureHandle> {
        self.units[unit as usize][ty.index()]
    }

    /// Texture bound to `ty` on the active unit
    pub fn active(&self, ty: TextureType) -> Option<TextureHandle> {
        self.get(self.active_unit, ty)
    }

    /// Bind on the active unit
    pub fn set_active(&mut self, ty: TextureType, texture: Option<TextureHandle>) {
        self.units[self.active_unit as usize][ty.index()] = texture;
    }

    /// Clear every slot on every unit holding `texture`
    pub fn unbind(&mut self, texture: TextureHandle) {
        for slot in self.units.iter_mut().flatten() {
            if *slot == Some(texture) {
                *slot = None;
            }
        }
    }
}

/// Read and draw framebuffer bindings (`None` = default framebuffer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FramebufferBindings {
    /// `GL_READ_FRAMEBUFFER`
    pub read: Option<FramebufferHandle>,
    /// `GL_DRAW_FRAMEBUFFER`
    pub draw: Option<FramebufferHandle>,
}

// =============================================================================
// COMPLETE GL STATE
// =============================================================================

/// Complete context state, excluding object contents and the error slot
#[derive(Debug, Clone, PartialEq)]
pub struct GlState {
    /// Enabled capabilities
    pub capabilities: Capabilities,
    /// Current viewport
    pub viewport: Viewport,
    /// Current scissor box
    pub scissor: ScissorRect,
    /// Blend state
    pub blend: BlendState,
    /// Depth state
    pub depth: DepthState,
    /// Stencil state
    pub stencil: StencilState,
    /// Rasterization state
    pub raster: RasterState,
    /// Clear values
    pub clear: ClearState,
    /// Pixel-store parameters
    pub pixel_store: PixelStoreState,
    /// Buffer bindings
    pub buffers: BufferBindings,
    /// Texture bindings
    pub textures: TextureBindings,
    /// Framebuffer bindings
    pub framebuffers: FramebufferBindings,
    /// `GL_RENDERBUFFER` binding
    pub renderbuffer: Option<RenderbufferHandle>,
    /// Bound vertex array, `None` = default vertex array
    pub vertex_array: Option<VertexArrayHandle>,
    /// Current program
    pub program: Option<ProgramHandle>,
    /// Generic vertex attribute values
    pub generic_attribs: Vec<GenericAttrib>,
}

impl GlState {
    /// Initial state for a context with `limits`
    pub fn new(limits: &ContextLimits) -> Self {
        Self {
            capabilities: Capabilities::default(),
            viewport: Viewport::default(),
            scissor: ScissorRect::default(),
            blend: BlendState::default(),
            depth: DepthState::default(),
            stencil: StencilState::default(),
            raster: RasterState::default(),
            clear: ClearState::default(),
            pixel_store: PixelStoreState::default(),
            buffers: BufferBindings::default(),
            textures: TextureBindings::new(limits.max_texture_image_units),
            framebuffers: FramebufferBindings::default(),
            renderbuffer: None,
            vertex_array: None,
            program: None,
            generic_attribs: vec![GenericAttrib::default(); limits.max_vertex_attribs as usize],
        }
    }

    /// Whether every flag in `caps` is enabled
    #[inline]
    pub fn is_enabled(&self, caps: Capabilities) -> bool {
        self.capabilities.contains(caps)
    }

    /// Enable or disable `caps`
    #[inline]
    pub fn set_enabled(&mut self, caps: Capabilities, enabled: bool) {
        self.capabilities.set(caps, enabled);
    }

    // =========================================================================
    // STENCIL OPERATIONS
    // =========================================================================

    /// Set the stencil function of `face`
    pub fn set_stencil_func_separate(&mut self, face: StencilFace, func: StencilFunc) {
        self.stencil.for_each_face(face, |state| state.func = func);
    }

    /// Set the stencil operations of `face`
    pub fn set_stencil_op_separate(&mut self, face: StencilFace, op: StencilOp) {
        self.stencil.for_each_face(face, |state| state.op = op);
    }

    /// Set the stencil write mask of `face`
    pub fn set_stencil_mask_separate(&mut self, face: StencilFace, mask: u32) {
        self.stencil.for_each_face(face, |state| state.write_mask = mask);
    }
}
