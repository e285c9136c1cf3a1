//! Framebuffer attachments, renderbuffer storage and pixel readback.

use refgl_core::enums::*;
use refgl_core::format::{is_pixel_format_enum, is_pixel_type_enum};
use refgl_core::{FormatMapper, GLenum, GLint, GlError};

use super::{GlResult, Parameter, ReferenceContext};
use crate::buffer::BufferTarget;
use crate::config::DefaultFramebuffer;
use crate::framebuffer::{
    self, Attachment, AttachmentObject, AttachmentPoint, Framebuffer, FramebufferHandle,
    FramebufferTarget, RenderbufferHandle,
};
use crate::object::ObjectTable;
use crate::pixel::{PixelView, PixelViewMut};
use crate::readback::{pack_layout, pack_pixels, ReadRect};
use crate::resolve::{resolve_attachment, resolve_default, resolve_default_mut, AttachmentSources, AttachmentTargets};
use crate::texture::{ImageTarget2D, TextureHandle, TextureType};

/// Destination of `readPixels`
#[derive(Debug)]
pub enum PackDestination<'a> {
    /// Client memory, addressed by the pack pixel-store parameters
    Client(&'a mut [u8]),
    /// Byte offset into the bound `GL_PIXEL_PACK_BUFFER`
    PackOffset(usize),
}

impl<M: FormatMapper> ReferenceContext<M> {
    fn framebuffer_binding(&self, target: FramebufferTarget) -> Option<FramebufferHandle> {
        match target {
            FramebufferTarget::Both | FramebufferTarget::Draw => self.state.framebuffers.draw,
            FramebufferTarget::Read => self.state.framebuffers.read,
        }
    }

    fn framebuffer_mut(&mut self, handle: FramebufferHandle) -> &mut Framebuffer {
        match self.framebuffers.get_mut(handle) {
            Some(framebuffer) => framebuffer,
            None => unreachable!("bound framebuffer {:?} is not live", handle),
        }
    }

    /// Parse target and attachment, then require a bound framebuffer
    fn attachment_target(&self, target: GLenum, attachment: GLenum) -> GlResult<(FramebufferHandle, &'static [AttachmentPoint])> {
        let target = FramebufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let points = AttachmentPoint::from_gl(attachment).ok_or(GlError::InvalidEnum)?;
        let handle = self.framebuffer_binding(target).ok_or(GlError::InvalidOperation)?;
        Ok((handle, points))
    }

    /// Attached texture's type, checking liveness
    fn attached_texture_type(&self, texture: TextureHandle) -> GlResult<TextureType> {
        self.textures
            .get(texture)
            .and_then(|t| t.texture_type())
            .ok_or(GlError::InvalidOperation)
    }

    fn attach(&mut self, handle: FramebufferHandle, points: &[AttachmentPoint], attachment: Attachment) {
        log::debug!("Framebuffer {:?} {:?} <- {:?}", handle, points, attachment.object);
        let framebuffer = self.framebuffer_mut(handle);
        for point in points {
            framebuffer.set_attachment(*point, attachment);
        }
    }

    // =========================================================================
    // ATTACHMENTS
    // =========================================================================

    /// Attach a 2D texture level or cube face to the bound framebuffer
    pub fn framebuffer_texture_2d(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: Option<TextureHandle>,
        level: i32,
    ) {
        let result = self.framebuffer_texture_2d_checked(target, attachment, textarget, texture, level);
        self.record("framebufferTexture2D", result);
    }

    fn framebuffer_texture_2d_checked(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        textarget: GLenum,
        texture: Option<TextureHandle>,
        level: i32,
    ) -> GlResult {
        let (handle, points) = self.attachment_target(target, attachment)?;
        let image_target = ImageTarget2D::from_gl(textarget).ok_or(GlError::InvalidEnum)?;

        let attachment = match texture {
            None => Attachment::NONE,
            Some(texture) => {
                let ty = self.attached_texture_type(texture)?;
                if ty != image_target.texture_type() {
                    return Err(GlError::InvalidOperation);
                }
                let level = u32::try_from(level).map_err(|_| GlError::InvalidValue)?;
                if level > self.max_texture_level(ty) {
                    return Err(GlError::InvalidValue);
                }
                Attachment::texture(texture, level, image_target.face())
            }
        };
        self.attach(handle, points, attachment);
        Ok(())
    }

    /// Attach one layer of an array or 3D texture to the bound framebuffer
    pub fn framebuffer_texture_layer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: Option<TextureHandle>,
        level: i32,
        layer: i32,
    ) {
        let result = self.framebuffer_texture_layer_checked(target, attachment, texture, level, layer);
        self.record("framebufferTextureLayer", result);
    }

    fn framebuffer_texture_layer_checked(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        texture: Option<TextureHandle>,
        level: i32,
        layer: i32,
    ) -> GlResult {
        let (handle, points) = self.attachment_target(target, attachment)?;

        let attachment = match texture {
            None => Attachment::NONE,
            Some(texture) => {
                let ty = self.attached_texture_type(texture)?;
                if !ty.is_layered() {
                    return Err(GlError::InvalidOperation);
                }
                let level = u32::try_from(level).map_err(|_| GlError::InvalidValue)?;
                let layer = u32::try_from(layer).map_err(|_| GlError::InvalidValue)?;
                let (_, max_layers) = self.texture_size_limits(ty);
                if level > self.max_texture_level(ty) || layer >= max_layers {
                    return Err(GlError::InvalidValue);
                }
                Attachment::texture_layer(texture, level, layer)
            }
        };
        self.attach(handle, points, attachment);
        Ok(())
    }

    /// Attach a renderbuffer to the bound framebuffer
    pub fn framebuffer_renderbuffer(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: Option<RenderbufferHandle>,
    ) {
        let result = self.framebuffer_renderbuffer_checked(target, attachment, renderbuffer_target, renderbuffer);
        self.record("framebufferRenderbuffer", result);
    }

    fn framebuffer_renderbuffer_checked(
        &mut self,
        target: GLenum,
        attachment: GLenum,
        renderbuffer_target: GLenum,
        renderbuffer: Option<RenderbufferHandle>,
    ) -> GlResult {
        if renderbuffer_target != GL_RENDERBUFFER {
            return Err(GlError::InvalidEnum);
        }
        let (handle, points) = self.attachment_target(target, attachment)?;
        let attachment = match renderbuffer {
            None => Attachment::NONE,
            Some(rb) if self.renderbuffers.contains(rb) => Attachment::renderbuffer(rb),
            Some(_) => return Err(GlError::InvalidOperation),
        };
        self.attach(handle, points, attachment);
        Ok(())
    }

    /// Completeness status of the framebuffer bound to `target`
    pub fn check_framebuffer_status(&mut self, target: GLenum) -> GLenum {
        let result = self.check_framebuffer_status_checked(target);
        self.record_or_default("checkFramebufferStatus", result)
    }

    pub(super) fn check_framebuffer_status_checked(&self, target: GLenum) -> GlResult<GLenum> {
        let target = FramebufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let Some(handle) = self.framebuffer_binding(target) else {
            return Ok(GL_FRAMEBUFFER_COMPLETE);
        };
        let Some(fb) = self.framebuffers.get(handle) else {
            unreachable!("bound framebuffer {:?} is not live", handle);
        };
        let sources = self.attachment_sources();
        Ok(framebuffer::check_framebuffer_status(fb, |a| sources.describe(a)))
    }

    fn attachment_sources(&self) -> AttachmentSources<'_> {
        AttachmentSources {
            textures: &self.textures,
            renderbuffers: &self.renderbuffers,
        }
    }

    // =========================================================================
    // BOUND BUFFERS
    // =========================================================================

    /// Buffer at `point` of the read framebuffer, empty when nothing
    /// resolves
    pub(super) fn read_buffer(&self, point: AttachmentPoint) -> PixelView<'_> {
        let binding = self.state.framebuffers.read;
        bound_view(self.attachment_sources(), &self.framebuffers, &self.default_framebuffer, binding, point)
    }

    /// Buffer at `point` of the draw framebuffer, empty when nothing
    /// resolves
    pub(super) fn draw_buffer(&self, point: AttachmentPoint) -> PixelView<'_> {
        let binding = self.state.framebuffers.draw;
        bound_view(self.attachment_sources(), &self.framebuffers, &self.default_framebuffer, binding, point)
    }

    /// Writable buffer at `point` of the draw framebuffer
    pub(super) fn draw_buffer_mut(&mut self, point: AttachmentPoint) -> Option<PixelViewMut<'_>> {
        let attachment = match self.state.framebuffers.draw {
            Some(handle) => match self.framebuffers.get(handle) {
                Some(fb) => Some(*fb.attachment(point)),
                None => unreachable!("bound framebuffer {:?} is not live", handle),
            },
            None => None,
        };
        match attachment {
            Some(attachment) => {
                let targets = AttachmentTargets {
                    textures: &mut self.textures,
                    renderbuffers: &mut self.renderbuffers,
                };
                targets.into_view(&attachment)
            }
            None => resolve_default_mut(&mut self.default_framebuffer, point),
        }
    }

    /// Color buffer that `readPixels` and blits read from
    pub fn read_colorbuffer(&self) -> PixelView<'_> {
        self.read_buffer(AttachmentPoint::Color0)
    }

    /// Color buffer that clears and blits write to
    pub fn draw_colorbuffer(&self) -> PixelView<'_> {
        self.draw_buffer(AttachmentPoint::Color0)
    }

    /// Query an attachment of the framebuffer bound to `target`
    pub fn get_framebuffer_attachment_parameter(&mut self, target: GLenum, attachment: GLenum, pname: GLenum) -> Parameter {
        let result = self.get_framebuffer_attachment_parameter_checked(target, attachment, pname);
        self.record_or_default("getFramebufferAttachmentParameter", result)
    }

    fn get_framebuffer_attachment_parameter_checked(
        &self,
        target: GLenum,
        attachment: GLenum,
        pname: GLenum,
    ) -> GlResult<Parameter> {
        let target = FramebufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let points = AttachmentPoint::from_gl(attachment).ok_or(GlError::InvalidEnum)?;
        if !matches!(
            pname,
            GL_FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE
                | GL_FRAMEBUFFER_ATTACHMENT_OBJECT_NAME
                | GL_FRAMEBUFFER_ATTACHMENT_TEXTURE_LEVEL
                | GL_FRAMEBUFFER_ATTACHMENT_TEXTURE_CUBE_MAP_FACE
                | GL_FRAMEBUFFER_ATTACHMENT_TEXTURE_LAYER
        ) {
            return Err(GlError::InvalidEnum);
        }
        let handle = self.framebuffer_binding(target).ok_or(GlError::InvalidOperation)?;
        let Some(fb) = self.framebuffers.get(handle) else {
            unreachable!("bound framebuffer {:?} is not live", handle);
        };

        let attached = *fb.attachment(points[0]);
        if points.iter().any(|point| *fb.attachment(*point) != attached) {
            return Err(GlError::InvalidOperation);
        }

        Ok(match (attached.object, pname) {
            (AttachmentObject::None, GL_FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE) => Parameter::Enum(GL_NONE),
            (AttachmentObject::None, GL_FRAMEBUFFER_ATTACHMENT_OBJECT_NAME) => Parameter::Int(0),
            (AttachmentObject::None, _) => return Err(GlError::InvalidOperation),
            (AttachmentObject::Renderbuffer(_), GL_FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE) => {
                Parameter::Enum(GL_RENDERBUFFER)
            }
            (AttachmentObject::Renderbuffer(rb), GL_FRAMEBUFFER_ATTACHMENT_OBJECT_NAME) => {
                Parameter::Renderbuffer(Some(rb))
            }
            (AttachmentObject::Renderbuffer(_), _) => return Err(GlError::InvalidEnum),
            (AttachmentObject::Texture(_), GL_FRAMEBUFFER_ATTACHMENT_OBJECT_TYPE) => Parameter::Enum(GL_TEXTURE),
            (AttachmentObject::Texture(texture), GL_FRAMEBUFFER_ATTACHMENT_OBJECT_NAME) => {
                Parameter::Texture(Some(texture))
            }
            (AttachmentObject::Texture(_), GL_FRAMEBUFFER_ATTACHMENT_TEXTURE_LEVEL) => {
                Parameter::Int(attached.level as GLint)
            }
            (AttachmentObject::Texture(_), GL_FRAMEBUFFER_ATTACHMENT_TEXTURE_CUBE_MAP_FACE) => {
                Parameter::Enum(attached.face.map_or(GL_NONE, |face| face.to_gl()))
            }
            (AttachmentObject::Texture(_), _) => Parameter::Int(attached.layer as GLint),
        })
    }

    // =========================================================================
    // RENDERBUFFERS
    // =========================================================================

    /// Allocate storage for the bound renderbuffer
    pub fn renderbuffer_storage(&mut self, target: GLenum, internal_format: GLenum, width: i32, height: i32) {
        let result = self.renderbuffer_storage_checked(target, internal_format, width, height);
        self.record("renderbufferStorage", result);
    }

    fn renderbuffer_storage_checked(&mut self, target: GLenum, internal_format: GLenum, width: i32, height: i32) -> GlResult {
        if target != GL_RENDERBUFFER {
            return Err(GlError::InvalidEnum);
        }
        let format = self
            .mapper
            .from_internal_format(internal_format)
            .map_err(|_| GlError::InvalidEnum)?;
        let handle = self.state.renderbuffer.ok_or(GlError::InvalidOperation)?;

        let max_size = self.limits.max_renderbuffer_size;
        let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
            return Err(GlError::InvalidValue);
        };
        if width > max_size || height > max_size {
            return Err(GlError::InvalidValue);
        }

        match self.renderbuffers.get_mut(handle) {
            Some(renderbuffer) => renderbuffer.set_storage(internal_format, format, width, height),
            None => unreachable!("bound renderbuffer {:?} is not live", handle),
        }
        Ok(())
    }

    /// Query the bound renderbuffer
    pub fn get_renderbuffer_parameter(&mut self, target: GLenum, pname: GLenum) -> GLint {
        let result = self.get_renderbuffer_parameter_checked(target, pname);
        self.record_or_default("getRenderbufferParameter", result)
    }

    fn get_renderbuffer_parameter_checked(&self, target: GLenum, pname: GLenum) -> GlResult<GLint> {
        if target != GL_RENDERBUFFER
            || !matches!(
                pname,
                GL_RENDERBUFFER_WIDTH | GL_RENDERBUFFER_HEIGHT | GL_RENDERBUFFER_INTERNAL_FORMAT
            )
        {
            return Err(GlError::InvalidEnum);
        }
        let handle = self.state.renderbuffer.ok_or(GlError::InvalidOperation)?;
        let Some(renderbuffer) = self.renderbuffers.get(handle) else {
            unreachable!("bound renderbuffer {:?} is not live", handle);
        };
        Ok(match pname {
            GL_RENDERBUFFER_WIDTH => renderbuffer.width() as GLint,
            GL_RENDERBUFFER_HEIGHT => renderbuffer.height() as GLint,
            _ => renderbuffer.internal_format() as GLint,
        })
    }

    // =========================================================================
    // READBACK
    // =========================================================================

    /// Read a rectangle of the read framebuffer's color buffer. Pixels
    /// outside the source leave their destination bytes untouched.
    pub fn read_pixels(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: GLenum,
        type_: GLenum,
        dst: PackDestination<'_>,
    ) {
        let result = self.read_pixels_checked(ReadRect { x, y, width, height }, format, type_, dst);
        self.record("readPixels", result);
    }

    fn read_pixels_checked(&mut self, rect: ReadRect, format: GLenum, type_: GLenum, dst: PackDestination<'_>) -> GlResult {
        if !is_pixel_format_enum(format) || !is_pixel_type_enum(type_) {
            return Err(GlError::InvalidEnum);
        }
        let transfer = self
            .mapper
            .from_transfer_format(format, type_)
            .map_err(|_| GlError::InvalidOperation)?;
        if !transfer.is_color() {
            return Err(GlError::InvalidOperation);
        }
        if rect.width < 0 || rect.height < 0 {
            return Err(GlError::InvalidValue);
        }

        let pack_buffer = self.state.buffers.get(BufferTarget::PixelPack);
        let available = match (&dst, pack_buffer) {
            (PackDestination::Client(_), Some(_)) => return Err(GlError::InvalidValue),
            (PackDestination::PackOffset(_), None) => return Err(GlError::InvalidOperation),
            (PackDestination::Client(bytes), None) => bytes.len(),
            (PackDestination::PackOffset(offset), Some(handle)) => {
                let size = self.buffers.get(handle).map_or(0, |b| b.size());
                size.checked_sub(*offset).ok_or(GlError::InvalidOperation)?
            }
        };
        let params = self.state.pixel_store.pack;
        let layout = pack_layout(transfer, rect.width as u32, rect.height as u32, &params)
            .filter(|layout| layout.required_len <= available)
            .ok_or(GlError::InvalidOperation)?;

        let Self {
            buffers,
            textures,
            renderbuffers,
            framebuffers,
            default_framebuffer,
            state,
            ..
        } = self;

        let sources = AttachmentSources {
            textures,
            renderbuffers,
        };
        let src = bound_view(
            sources,
            framebuffers,
            default_framebuffer,
            state.framebuffers.read,
            AttachmentPoint::Color0,
        );

        let dst: &mut [u8] = match dst {
            PackDestination::Client(bytes) => bytes,
            PackDestination::PackOffset(offset) => {
                let handle = pack_buffer.and_then(|h| buffers.get_mut(h));
                match handle {
                    Some(buffer) => &mut buffer.data_mut()[offset..],
                    None => unreachable!("pack buffer checked before readback"),
                }
            }
        };
        pack_pixels(&src, rect, transfer, &layout, dst);
        Ok(())
    }
}

/// `point` of the framebuffer bound as `binding`, or of the default
/// framebuffer when nothing is bound
fn bound_view<'a>(
    sources: AttachmentSources<'a>,
    framebuffers: &ObjectTable<Framebuffer>,
    default: &'a DefaultFramebuffer,
    binding: Option<FramebufferHandle>,
    point: AttachmentPoint,
) -> PixelView<'a> {
    match binding {
        Some(handle) => match framebuffers.get(handle) {
            Some(fb) => resolve_attachment(sources, fb, point),
            None => unreachable!("bound framebuffer {:?} is not live", handle),
        },
        None => resolve_default(default, point),
    }
}
