//! Texture image upload, immutable storage and parameters.
//!
//! Every call acts on the texture bound to the active unit for the call's
//! target, or on that unit's default texture when nothing is bound.

use refgl_core::enums::*;
use refgl_core::format::{is_pixel_format_enum, is_pixel_type_enum, unsized_texture_format};
use refgl_core::limits::max_level_for_size;
use refgl_core::{FormatMapper, GLenum, GlError, TextureFormat};

use super::{texture_slot, GlResult, Parameter, ReferenceContext};
use crate::buffer::BufferTarget;
use crate::pixel::{PixelBuffer, PixelView, TransferLayout};
use crate::state::is_compare_func;
use crate::texture::{filter_uses_mipmaps, mip_dimensions, CubeFace, ImageTarget2D, TextureType};

/// Source of texel data for `texImage*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelSource<'a> {
    /// No data: color levels start as (0, 0, 0, 1), depth and stencil as 0
    None,
    /// Client memory, addressed by the unpack pixel-store parameters
    Client(&'a [u8]),
    /// Byte offset into the bound `GL_PIXEL_UNPACK_BUFFER`
    UnpackOffset(usize),
}

/// Validated arguments of a `texImage*` call
#[derive(Debug, Clone, Copy)]
struct ImageArgs {
    ty: TextureType,
    face: Option<CubeFace>,
    level: u32,
    storage: TextureFormat,
    transfer: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
}

// =============================================================================
// PARAMETERS
// =============================================================================

/// Scalar argument of `texParameter*`
#[derive(Debug, Clone, Copy)]
enum ParamValue {
    Int(i32),
    Float(f32),
}

impl ParamValue {
    fn as_int(self) -> i32 {
        match self {
            Self::Int(value) => value,
            // round half away from zero
            Self::Float(value) if value >= 0.0 => (value + 0.5) as i32,
            Self::Float(value) => (value - 0.5) as i32,
        }
    }

    fn as_enum(self) -> GLenum {
        self.as_int() as GLenum
    }

    fn as_float(self) -> f32 {
        match self {
            Self::Int(value) => value as f32,
            Self::Float(value) => value,
        }
    }
}

/// One validated texture parameter update
#[derive(Debug, Clone, Copy)]
enum TexParameter {
    WrapS(GLenum),
    WrapT(GLenum),
    WrapR(GLenum),
    MinFilter(GLenum),
    MagFilter(GLenum),
    MinLod(f32),
    MaxLod(f32),
    BaseLevel(u32),
    MaxLevel(u32),
    CompareMode(GLenum),
    CompareFunc(GLenum),
    BorderColor([f32; 4]),
}

/// Parameters accepted by `texParameter*`
fn is_settable_tex_parameter(pname: GLenum) -> bool {
    matches!(
        pname,
        GL_TEXTURE_WRAP_S
            | GL_TEXTURE_WRAP_T
            | GL_TEXTURE_WRAP_R
            | GL_TEXTURE_MIN_FILTER
            | GL_TEXTURE_MAG_FILTER
            | GL_TEXTURE_MIN_LOD
            | GL_TEXTURE_MAX_LOD
            | GL_TEXTURE_BASE_LEVEL
            | GL_TEXTURE_MAX_LEVEL
            | GL_TEXTURE_COMPARE_MODE
            | GL_TEXTURE_COMPARE_FUNC
            | GL_TEXTURE_BORDER_COLOR
    )
}

fn is_wrap_mode(mode: GLenum) -> bool {
    matches!(mode, GL_REPEAT | GL_CLAMP_TO_EDGE | GL_MIRRORED_REPEAT | GL_CLAMP_TO_BORDER)
}

impl TexParameter {
    fn parse(pname: GLenum, value: ParamValue) -> GlResult<Self> {
        let checked_enum = |valid: fn(GLenum) -> bool| {
            let mode = value.as_enum();
            if valid(mode) {
                Ok(mode)
            } else {
                Err(GlError::InvalidEnum)
            }
        };
        let level = || u32::try_from(value.as_int()).map_err(|_| GlError::InvalidValue);

        Ok(match pname {
            GL_TEXTURE_WRAP_S => Self::WrapS(checked_enum(is_wrap_mode)?),
            GL_TEXTURE_WRAP_T => Self::WrapT(checked_enum(is_wrap_mode)?),
            GL_TEXTURE_WRAP_R => Self::WrapR(checked_enum(is_wrap_mode)?),
            GL_TEXTURE_MIN_FILTER => Self::MinFilter(checked_enum(|f| {
                matches!(f, GL_NEAREST | GL_LINEAR) || filter_uses_mipmaps(f)
            })?),
            GL_TEXTURE_MAG_FILTER => {
                Self::MagFilter(checked_enum(|f| matches!(f, GL_NEAREST | GL_LINEAR))?)
            }
            GL_TEXTURE_MIN_LOD => Self::MinLod(value.as_float()),
            GL_TEXTURE_MAX_LOD => Self::MaxLod(value.as_float()),
            GL_TEXTURE_BASE_LEVEL => Self::BaseLevel(level()?),
            GL_TEXTURE_MAX_LEVEL => Self::MaxLevel(level()?),
            GL_TEXTURE_COMPARE_MODE => Self::CompareMode(checked_enum(|m| {
                matches!(m, GL_NONE | GL_COMPARE_REF_TO_TEXTURE)
            })?),
            GL_TEXTURE_COMPARE_FUNC => Self::CompareFunc(checked_enum(is_compare_func)?),
            _ => return Err(GlError::InvalidEnum),
        })
    }
}

// =============================================================================
// ENTRY POINTS
// =============================================================================

impl<M: FormatMapper> ReferenceContext<M> {
    /// Largest width/height and depth/layer count accepted for `ty`
    pub(super) fn texture_size_limits(&self, ty: TextureType) -> (u32, u32) {
        let limits = &self.limits;
        match ty {
            TextureType::Texture2D => (limits.max_texture_2d_size, 1),
            TextureType::CubeMap => (limits.max_texture_cube_size, 1),
            TextureType::Texture2DArray => {
                (limits.max_texture_2d_size, limits.max_texture_2d_array_layers)
            }
            TextureType::Texture3D => (limits.max_texture_3d_size, limits.max_texture_3d_size),
            TextureType::CubeMapArray => {
                (limits.max_texture_cube_size, limits.max_texture_2d_array_layers)
            }
        }
    }

    /// Highest mip level addressable for `ty`
    pub(super) fn max_texture_level(&self, ty: TextureType) -> u32 {
        max_level_for_size(self.texture_size_limits(ty).0)
    }

    fn check_image_size(&self, ty: TextureType, level: u32, width: u32, height: u32, depth: u32) -> GlResult {
        if level > self.max_texture_level(ty) {
            return Err(GlError::InvalidValue);
        }
        let (max_size, max_depth) = self.texture_size_limits(ty);
        let max_size = (max_size >> level).max(1);
        let max_depth = match ty {
            TextureType::Texture3D => (max_depth >> level).max(1),
            _ => max_depth,
        };
        if width > max_size || height > max_size || depth > max_depth {
            return Err(GlError::InvalidValue);
        }
        match ty {
            TextureType::CubeMap if width != height => Err(GlError::InvalidValue),
            TextureType::CubeMapArray if width != height || depth % 6 != 0 => Err(GlError::InvalidValue),
            _ => Ok(()),
        }
    }

    // =========================================================================
    // IMAGE SPECIFICATION
    // =========================================================================

    /// Specify one level of a 2D texture or one cube map face
    pub fn tex_image_2d(
        &mut self,
        target: GLenum,
        level: i32,
        internal_format: GLenum,
        width: i32,
        height: i32,
        border: i32,
        format: GLenum,
        type_: GLenum,
        source: PixelSource<'_>,
    ) {
        let result = ImageTarget2D::from_gl(target)
            .ok_or(GlError::InvalidEnum)
            .and_then(|target| {
                self.tex_image_checked(
                    target.texture_type(),
                    target.face(),
                    level,
                    internal_format,
                    [width, height, 1],
                    border,
                    format,
                    type_,
                    source,
                )
            });
        self.record("texImage2D", result);
    }

    /// Specify one level of a 2D array, 3D or cube map array texture
    pub fn tex_image_3d(
        &mut self,
        target: GLenum,
        level: i32,
        internal_format: GLenum,
        width: i32,
        height: i32,
        depth: i32,
        border: i32,
        format: GLenum,
        type_: GLenum,
        source: PixelSource<'_>,
    ) {
        let result = match TextureType::from_gl(target) {
            Some(ty) if ty.is_layered() => self.tex_image_checked(
                ty,
                None,
                level,
                internal_format,
                [width, height, depth],
                border,
                format,
                type_,
                source,
            ),
            _ => Err(GlError::InvalidEnum),
        };
        self.record("texImage3D", result);
    }

    fn image_storage_format(&self, internal_format: GLenum) -> GlResult<TextureFormat> {
        if let Some(format) = unsized_texture_format(internal_format) {
            return Ok(format);
        }
        self.mapper
            .from_internal_format(internal_format)
            .map_err(|_| GlError::InvalidEnum)
    }

    fn tex_image_checked(
        &mut self,
        ty: TextureType,
        face: Option<CubeFace>,
        level: i32,
        internal_format: GLenum,
        size: [i32; 3],
        border: i32,
        format: GLenum,
        type_: GLenum,
        source: PixelSource<'_>,
    ) -> GlResult {
        let storage = self.image_storage_format(internal_format)?;
        if !is_pixel_format_enum(format) || !is_pixel_type_enum(type_) {
            return Err(GlError::InvalidEnum);
        }
        let transfer = self
            .mapper
            .from_transfer_format(format, type_)
            .map_err(|_| GlError::InvalidOperation)?;

        let level = u32::try_from(level).map_err(|_| GlError::InvalidValue)?;
        let [width, height, depth] = size.map(u32::try_from);
        let (Ok(width), Ok(height), Ok(depth)) = (width, height, depth) else {
            return Err(GlError::InvalidValue);
        };
        if border != 0 {
            return Err(GlError::InvalidValue);
        }
        self.check_image_size(ty, level, width, height, depth)?;

        let same_class = storage.has_depth() == transfer.has_depth()
            && storage.has_stencil() == transfer.has_stencil();
        let unsized_mismatch = unsized_texture_format(internal_format).is_some() && format != internal_format;
        if !same_class || unsized_mismatch {
            return Err(GlError::InvalidOperation);
        }

        let layout = TransferLayout::new(
            transfer.pixel_size(),
            width,
            height,
            depth,
            &self.state.pixel_store.unpack,
        );
        let layout = self.check_unpack_source(source, layout)?;

        let texture = self.active_texture_object(ty);
        if texture.immutable {
            let matches = texture.level(face, level).is_some_and(|buffer| {
                buffer.format() == storage
                    && (buffer.width(), buffer.height(), buffer.depth()) == (width, height, depth)
            });
            if !matches {
                return Err(GlError::InvalidOperation);
            }
        }

        self.write_image(
            ImageArgs {
                ty,
                face,
                level,
                storage,
                transfer,
                width,
                height,
                depth,
            },
            layout,
            source,
        );
        Ok(())
    }

    /// Check that `source` can supply the bytes addressed by `layout`.
    /// Yields the layout to read with, or `None` when there is no data.
    fn check_unpack_source(
        &self,
        source: PixelSource<'_>,
        layout: Option<TransferLayout>,
    ) -> GlResult<Option<TransferLayout>> {
        let unpack_buffer = self.state.buffers.get(BufferTarget::PixelUnpack);
        let available = match (source, unpack_buffer) {
            (PixelSource::None | PixelSource::Client(_), Some(_)) => return Err(GlError::InvalidValue),
            (PixelSource::UnpackOffset(_), None) => return Err(GlError::InvalidOperation),
            (PixelSource::None, None) => return Ok(None),
            (PixelSource::Client(bytes), None) => bytes.len(),
            (PixelSource::UnpackOffset(offset), Some(handle)) => {
                let size = self.buffers.get(handle).map_or(0, |b| b.size());
                size.checked_sub(offset).ok_or(GlError::InvalidOperation)?
            }
        };
        layout
            .filter(|layout| layout.required_len <= available)
            .map(Some)
            .ok_or(GlError::InvalidOperation)
    }

    fn write_image(&mut self, image: ImageArgs, layout: Option<TransferLayout>, source: PixelSource<'_>) {
        log::debug!(
            "Texture image {:?} {:?} level {}: {}x{}x{} {:?}",
            image.ty,
            image.face,
            image.level,
            image.width,
            image.height,
            image.depth,
            image.storage
        );

        let Self {
            buffers,
            textures,
            default_textures,
            state,
            ..
        } = self;

        let bytes: Option<&[u8]> = match source {
            PixelSource::None => None,
            PixelSource::Client(bytes) => Some(bytes),
            PixelSource::UnpackOffset(offset) => {
                let handle = state.buffers.get(BufferTarget::PixelUnpack);
                let data = handle.and_then(|h| buffers.get(h)).map(|b| b.data());
                Some(data.and_then(|d| d.get(offset..)).unwrap_or_default())
            }
        };
        let src = bytes.zip(layout).map(|(bytes, layout)| {
            PixelView::new(
                image.transfer,
                image.width,
                image.height,
                image.depth,
                layout.row_pitch,
                layout.slice_pitch,
                bytes.get(layout.offset..).unwrap_or_default(),
            )
        });

        let fill = |buffer: &mut PixelBuffer| {
            let mut view = buffer.view_mut();
            match &src {
                Some(src) => {
                    view.copy_from(src, 0, 0, 0);
                    view.clamp_depth();
                }
                None if image.storage.is_color() => view.fill([0.0, 0.0, 0.0, 1.0]),
                None => view.fill([0.0; 4]),
            }
        };

        let texture = texture_slot(textures, default_textures, &state.textures, image.ty);
        if texture.immutable {
            match texture.level_mut(image.face, image.level) {
                Some(buffer) => fill(buffer),
                None => unreachable!("immutable level {} checked before write", image.level),
            }
        } else {
            texture.alloc_level_with(
                image.face,
                image.level,
                image.storage,
                image.width,
                image.height,
                image.depth,
                fill,
            );
        }
    }

    // =========================================================================
    // IMMUTABLE STORAGE
    // =========================================================================

    /// Allocate immutable storage for a 2D or cube map texture
    pub fn tex_storage_2d(&mut self, target: GLenum, levels: i32, internal_format: GLenum, width: i32, height: i32) {
        let result = match TextureType::from_gl(target) {
            Some(ty @ (TextureType::Texture2D | TextureType::CubeMap)) => {
                self.tex_storage_checked(ty, levels, internal_format, [width, height, 1])
            }
            _ => Err(GlError::InvalidEnum),
        };
        self.record("texStorage2D", result);
    }

    /// Allocate immutable storage for a 2D array, 3D or cube map array
    /// texture
    pub fn tex_storage_3d(
        &mut self,
        target: GLenum,
        levels: i32,
        internal_format: GLenum,
        width: i32,
        height: i32,
        depth: i32,
    ) {
        let result = match TextureType::from_gl(target) {
            Some(ty) if ty.is_layered() => {
                self.tex_storage_checked(ty, levels, internal_format, [width, height, depth])
            }
            _ => Err(GlError::InvalidEnum),
        };
        self.record("texStorage3D", result);
    }

    fn tex_storage_checked(&mut self, ty: TextureType, levels: i32, internal_format: GLenum, size: [i32; 3]) -> GlResult {
        let format = self
            .mapper
            .from_internal_format(internal_format)
            .map_err(|_| GlError::InvalidEnum)?;
        let handle = self.state.textures.active(ty).ok_or(GlError::InvalidOperation)?;

        if levels < 1 || size.iter().any(|dim| *dim < 1) {
            return Err(GlError::InvalidValue);
        }
        let levels = levels as u32;
        let [width, height, depth] = size.map(|dim| dim as u32);
        self.check_image_size(ty, 0, width, height, depth)?;

        let max_dim = match ty {
            TextureType::Texture3D => width.max(height).max(depth),
            _ => width.max(height),
        };
        if levels > max_level_for_size(max_dim) + 1 {
            return Err(GlError::InvalidOperation);
        }
        let Some(texture) = self.textures.get_mut(handle) else {
            unreachable!("bound texture {:?} is not live", handle);
        };
        if texture.immutable {
            return Err(GlError::InvalidOperation);
        }

        log::debug!(
            "Texture storage {:?} {:?}: {} levels, {}x{}x{} {:?}",
            handle,
            ty,
            levels,
            width,
            height,
            depth,
            format
        );
        let cube_faces = CubeFace::ALL.map(Some);
        let faces: &[Option<CubeFace>] = match ty {
            TextureType::CubeMap => &cube_faces,
            _ => &[None],
        };
        texture.clear_levels();
        for level in 0..levels {
            let (w, h, d) = mip_dimensions(width, height, depth, level);
            let d = match ty {
                TextureType::Texture3D => d,
                _ => depth,
            };
            for face in faces {
                texture.alloc_level(*face, level, format, w, h, d);
            }
        }
        texture.immutable = true;
        texture.immutable_levels = levels;
        Ok(())
    }

    // =========================================================================
    // PARAMETERS
    // =========================================================================

    /// Set an integer texture parameter
    pub fn tex_parameteri(&mut self, target: GLenum, pname: GLenum, param: i32) {
        let result = self.tex_parameter_checked(target, pname, ParamValue::Int(param));
        self.record("texParameteri", result);
    }

    /// Set a float texture parameter
    pub fn tex_parameterf(&mut self, target: GLenum, pname: GLenum, param: f32) {
        let result = self.tex_parameter_checked(target, pname, ParamValue::Float(param));
        self.record("texParameterf", result);
    }

    /// Set a texture parameter from a vector; `GL_TEXTURE_BORDER_COLOR`
    /// takes four values, every other parameter the first one
    pub fn tex_parameterfv(&mut self, target: GLenum, pname: GLenum, params: &[f32]) {
        let result = self.tex_parameterfv_checked(target, pname, params);
        self.record("texParameterfv", result);
    }

    fn tex_parameterfv_checked(&mut self, target: GLenum, pname: GLenum, params: &[f32]) -> GlResult {
        let ty = TextureType::from_gl(target).ok_or(GlError::InvalidEnum)?;
        if !is_settable_tex_parameter(pname) {
            return Err(GlError::InvalidEnum);
        }
        let param = match (pname, params) {
            (GL_TEXTURE_BORDER_COLOR, &[r, g, b, a, ..]) => TexParameter::BorderColor([r, g, b, a]),
            (GL_TEXTURE_BORDER_COLOR, _) | (_, []) => return Err(GlError::InvalidValue),
            (_, &[value, ..]) => TexParameter::parse(pname, ParamValue::Float(value))?,
        };
        self.apply_tex_parameter(ty, param);
        Ok(())
    }

    fn tex_parameter_checked(&mut self, target: GLenum, pname: GLenum, value: ParamValue) -> GlResult {
        let ty = TextureType::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let param = TexParameter::parse(pname, value)?;
        self.apply_tex_parameter(ty, param);
        Ok(())
    }

    fn apply_tex_parameter(&mut self, ty: TextureType, param: TexParameter) {
        let texture = self.active_texture_object_mut(ty);
        let sampler = &mut texture.sampler;
        match param {
            TexParameter::WrapS(mode) => sampler.wrap_s = mode,
            TexParameter::WrapT(mode) => sampler.wrap_t = mode,
            TexParameter::WrapR(mode) => sampler.wrap_r = mode,
            TexParameter::MinFilter(filter) => sampler.min_filter = filter,
            TexParameter::MagFilter(filter) => sampler.mag_filter = filter,
            TexParameter::MinLod(lod) => sampler.min_lod = lod,
            TexParameter::MaxLod(lod) => sampler.max_lod = lod,
            TexParameter::CompareMode(mode) => sampler.compare_mode = mode,
            TexParameter::CompareFunc(func) => sampler.compare_func = func,
            TexParameter::BorderColor(color) => sampler.border_color = color,
            TexParameter::BaseLevel(level) => texture.base_level = level,
            TexParameter::MaxLevel(level) => texture.max_level = level,
        }
        texture.update_view();
    }

    /// Query a texture parameter of the texture bound to `target`
    pub fn get_tex_parameter(&mut self, target: GLenum, pname: GLenum) -> Parameter {
        let result = self.get_tex_parameter_checked(target, pname);
        self.record_or_default("getTexParameter", result)
    }

    fn get_tex_parameter_checked(&self, target: GLenum, pname: GLenum) -> GlResult<Parameter> {
        let ty = TextureType::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let texture = self.active_texture_object(ty);
        let sampler = &texture.sampler;
        Ok(match pname {
            GL_TEXTURE_WRAP_S => Parameter::Enum(sampler.wrap_s),
            GL_TEXTURE_WRAP_T => Parameter::Enum(sampler.wrap_t),
            GL_TEXTURE_WRAP_R => Parameter::Enum(sampler.wrap_r),
            GL_TEXTURE_MIN_FILTER => Parameter::Enum(sampler.min_filter),
            GL_TEXTURE_MAG_FILTER => Parameter::Enum(sampler.mag_filter),
            GL_TEXTURE_MIN_LOD => Parameter::Float(sampler.min_lod),
            GL_TEXTURE_MAX_LOD => Parameter::Float(sampler.max_lod),
            GL_TEXTURE_COMPARE_MODE => Parameter::Enum(sampler.compare_mode),
            GL_TEXTURE_COMPARE_FUNC => Parameter::Enum(sampler.compare_func),
            GL_TEXTURE_BORDER_COLOR => Parameter::FloatArray4(sampler.border_color),
            GL_TEXTURE_BASE_LEVEL => Parameter::Int(texture.base_level as i32),
            GL_TEXTURE_MAX_LEVEL => Parameter::Int(texture.max_level as i32),
            GL_TEXTURE_IMMUTABLE_FORMAT => Parameter::Bool(texture.immutable),
            GL_TEXTURE_IMMUTABLE_LEVELS => Parameter::Int(texture.immutable_levels as i32),
            _ => return Err(GlError::InvalidEnum),
        })
    }
}
