//! Object lifetime and binding entry points.

use refgl_core::enums::*;
use refgl_core::{FormatMapper, GLenum, GlError};

use super::{GlResult, ReferenceContext};
use crate::buffer::{BufferHandle, BufferTarget, DataBuffer};
use crate::framebuffer::{
    Framebuffer, FramebufferHandle, FramebufferTarget, Renderbuffer, RenderbufferHandle,
};
use crate::program::{Program, ProgramHandle};
use crate::texture::{BindCheck, Texture, TextureHandle, TextureType};
use crate::vertex_array::{VertexArray, VertexArrayHandle};

impl<M: FormatMapper> ReferenceContext<M> {
    // =========================================================================
    // BUFFERS
    // =========================================================================

    /// Create a buffer object
    pub fn create_buffer(&mut self) -> BufferHandle {
        let handle = self.buffers.insert(DataBuffer::new());
        log::debug!("Created buffer {:?}", handle);
        handle
    }

    /// Delete a buffer, unbinding it from every context target and from the
    /// current vertex array
    pub fn delete_buffer(&mut self, buffer: BufferHandle) {
        if self.buffers.remove(buffer).is_none() {
            return;
        }
        self.state.buffers.unbind(buffer);
        self.current_vertex_array_mut().unbind_buffer(buffer);
        log::debug!("Deleted buffer {:?}", buffer);
    }

    /// Whether `buffer` names a live buffer
    pub fn is_buffer(&self, buffer: BufferHandle) -> bool {
        self.buffers.contains(buffer)
    }

    /// Bind `buffer` to `target`
    pub fn bind_buffer(&mut self, target: GLenum, buffer: Option<BufferHandle>) {
        let result = self.bind_buffer_checked(target, buffer);
        self.record("bindBuffer", result);
    }

    fn bind_buffer_checked(&mut self, target: GLenum, buffer: Option<BufferHandle>) -> GlResult {
        let target = BufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        if buffer.is_some_and(|b| !self.buffers.contains(b)) {
            return Err(GlError::InvalidOperation);
        }
        match target {
            BufferTarget::ElementArray => self.current_vertex_array_mut().element_array_buffer = buffer,
            _ => self.state.buffers.set(target, buffer),
        }
        Ok(())
    }

    // =========================================================================
    // TEXTURES
    // =========================================================================

    /// Create an untyped texture object
    pub fn create_texture(&mut self) -> TextureHandle {
        let handle = self.textures.insert(Texture::new());
        log::debug!("Created texture {:?}", handle);
        handle
    }

    /// Delete a texture, unbinding it from every unit and detaching it from
    /// the bound framebuffers
    pub fn delete_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(texture).is_none() {
            return;
        }
        self.state.textures.unbind(texture);
        for framebuffer in self.bound_framebuffers() {
            if let Some(fbo) = self.framebuffers.get_mut(framebuffer) {
                fbo.detach_texture(texture);
            }
        }
        log::debug!("Deleted texture {:?}", texture);
    }

    /// Whether `texture` names a live texture
    pub fn is_texture(&self, texture: TextureHandle) -> bool {
        self.textures.contains(texture)
    }

    /// Select the active texture unit
    pub fn active_texture(&mut self, unit: GLenum) {
        let result = self.active_texture_checked(unit);
        self.record("activeTexture", result);
    }

    fn active_texture_checked(&mut self, unit: GLenum) -> GlResult {
        let index = unit
            .checked_sub(GL_TEXTURE0)
            .filter(|index| *index < self.state.textures.unit_count())
            .ok_or(GlError::InvalidEnum)?;
        self.state.textures.active_unit = index;
        Ok(())
    }

    /// Bind `texture` to `target` on the active unit.
    ///
    /// The first bind of an untyped texture fixes its type; binding it to a
    /// different target afterwards fails.
    pub fn bind_texture(&mut self, target: GLenum, texture: Option<TextureHandle>) {
        let result = self.bind_texture_checked(target, texture);
        self.record("bindTexture", result);
    }

    fn bind_texture_checked(&mut self, target: GLenum, texture: Option<TextureHandle>) -> GlResult {
        let ty = TextureType::from_gl(target).ok_or(GlError::InvalidEnum)?;
        if let Some(handle) = texture {
            let object = self.textures.get_mut(handle).ok_or(GlError::InvalidOperation)?;
            match object.check_bind(ty) {
                BindCheck::Matches => {}
                BindCheck::Untyped => {
                    log::debug!("Texture {:?} typed as {:?}", handle, ty);
                    object.init_type(ty);
                }
                BindCheck::Mismatch => return Err(GlError::InvalidOperation),
            }
        }
        self.state.textures.set_active(ty, texture);
        Ok(())
    }

    // =========================================================================
    // FRAMEBUFFERS & RENDERBUFFERS
    // =========================================================================

    /// Create a framebuffer object with no attachments
    pub fn create_framebuffer(&mut self) -> FramebufferHandle {
        let handle = self.framebuffers.insert(Framebuffer::new());
        log::debug!("Created framebuffer {:?}", handle);
        handle
    }

    /// Delete a framebuffer; bindings to it fall back to the default
    /// framebuffer
    pub fn delete_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if self.framebuffers.remove(framebuffer).is_none() {
            return;
        }
        let bindings = &mut self.state.framebuffers;
        if bindings.read == Some(framebuffer) {
            bindings.read = None;
        }
        if bindings.draw == Some(framebuffer) {
            bindings.draw = None;
        }
        log::debug!("Deleted framebuffer {:?}", framebuffer);
    }

    /// Whether `framebuffer` names a live framebuffer
    pub fn is_framebuffer(&self, framebuffer: FramebufferHandle) -> bool {
        self.framebuffers.contains(framebuffer)
    }

    /// Bind `framebuffer` to the read, draw or both targets
    pub fn bind_framebuffer(&mut self, target: GLenum, framebuffer: Option<FramebufferHandle>) {
        let result = self.bind_framebuffer_checked(target, framebuffer);
        self.record("bindFramebuffer", result);
    }

    fn bind_framebuffer_checked(
        &mut self,
        target: GLenum,
        framebuffer: Option<FramebufferHandle>,
    ) -> GlResult {
        let target = FramebufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        if framebuffer.is_some_and(|f| !self.framebuffers.contains(f)) {
            return Err(GlError::InvalidOperation);
        }
        let bindings = &mut self.state.framebuffers;
        match target {
            FramebufferTarget::Both => {
                bindings.read = framebuffer;
                bindings.draw = framebuffer;
            }
            FramebufferTarget::Draw => bindings.draw = framebuffer,
            FramebufferTarget::Read => bindings.read = framebuffer,
        }
        Ok(())
    }

    /// Create a renderbuffer with empty storage
    pub fn create_renderbuffer(&mut self) -> RenderbufferHandle {
        let handle = self.renderbuffers.insert(Renderbuffer::new());
        log::debug!("Created renderbuffer {:?}", handle);
        handle
    }

    /// Delete a renderbuffer, unbinding it and detaching it from the bound
    /// framebuffers
    pub fn delete_renderbuffer(&mut self, renderbuffer: RenderbufferHandle) {
        if self.renderbuffers.remove(renderbuffer).is_none() {
            return;
        }
        if self.state.renderbuffer == Some(renderbuffer) {
            self.state.renderbuffer = None;
        }
        for framebuffer in self.bound_framebuffers() {
            if let Some(fbo) = self.framebuffers.get_mut(framebuffer) {
                fbo.detach_renderbuffer(renderbuffer);
            }
        }
        log::debug!("Deleted renderbuffer {:?}", renderbuffer);
    }

    /// Whether `renderbuffer` names a live renderbuffer
    pub fn is_renderbuffer(&self, renderbuffer: RenderbufferHandle) -> bool {
        self.renderbuffers.contains(renderbuffer)
    }

    /// Bind `renderbuffer`; `target` must be `GL_RENDERBUFFER`
    pub fn bind_renderbuffer(&mut self, target: GLenum, renderbuffer: Option<RenderbufferHandle>) {
        let result = self.bind_renderbuffer_checked(target, renderbuffer);
        self.record("bindRenderbuffer", result);
    }

    fn bind_renderbuffer_checked(
        &mut self,
        target: GLenum,
        renderbuffer: Option<RenderbufferHandle>,
    ) -> GlResult {
        if target != GL_RENDERBUFFER {
            return Err(GlError::InvalidEnum);
        }
        if renderbuffer.is_some_and(|r| !self.renderbuffers.contains(r)) {
            return Err(GlError::InvalidOperation);
        }
        self.state.renderbuffer = renderbuffer;
        Ok(())
    }

    /// Read and draw framebuffer handles, deduplicated
    fn bound_framebuffers(&self) -> impl Iterator<Item = FramebufferHandle> {
        let bindings = self.state.framebuffers;
        let draw = bindings.draw.filter(|draw| Some(*draw) != bindings.read);
        bindings.read.into_iter().chain(draw)
    }

    // =========================================================================
    // VERTEX ARRAYS
    // =========================================================================

    /// Create a vertex array object
    pub fn create_vertex_array(&mut self) -> VertexArrayHandle {
        let handle = self
            .vertex_arrays
            .insert(VertexArray::new(self.limits.max_vertex_attribs));
        log::debug!("Created vertex array {:?}", handle);
        handle
    }

    /// Delete a vertex array; if bound, the default vertex array becomes
    /// current
    pub fn delete_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(vertex_array).is_none() {
            return;
        }
        if self.state.vertex_array == Some(vertex_array) {
            self.state.vertex_array = None;
        }
        log::debug!("Deleted vertex array {:?}", vertex_array);
    }

    /// Whether `vertex_array` names a live vertex array
    pub fn is_vertex_array(&self, vertex_array: VertexArrayHandle) -> bool {
        self.vertex_arrays.contains(vertex_array)
    }

    /// Bind `vertex_array`; `None` selects the default vertex array
    pub fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayHandle>) {
        let result = self.bind_vertex_array_checked(vertex_array);
        self.record("bindVertexArray", result);
    }

    fn bind_vertex_array_checked(&mut self, vertex_array: Option<VertexArrayHandle>) -> GlResult {
        if vertex_array.is_some_and(|v| !self.vertex_arrays.contains(v)) {
            return Err(GlError::InvalidOperation);
        }
        self.state.vertex_array = vertex_array;
        Ok(())
    }

    // =========================================================================
    // PROGRAMS
    // =========================================================================

    /// Create a program object
    pub fn create_program(&mut self) -> ProgramHandle {
        let handle = self.programs.insert(Program::new());
        log::debug!("Created program {:?}", handle);
        handle
    }

    /// Delete a program. The current program is only flagged and goes away
    /// once another program is made current.
    pub fn delete_program(&mut self, program: ProgramHandle) {
        if self.state.program == Some(program) {
            if let Some(object) = self.programs.get_mut(program) {
                object.delete_flag = true;
                log::debug!("Program {:?} flagged for deletion", program);
            }
        } else if self.programs.remove(program).is_some() {
            log::debug!("Deleted program {:?}", program);
        }
    }

    /// Whether `program` names a live program, including one flagged for
    /// deletion
    pub fn is_program(&self, program: ProgramHandle) -> bool {
        self.programs.contains(program)
    }

    /// Make `program` current
    pub fn use_program(&mut self, program: Option<ProgramHandle>) {
        let result = self.use_program_checked(program);
        self.record("useProgram", result);
    }

    fn use_program_checked(&mut self, program: Option<ProgramHandle>) -> GlResult {
        if let Some(handle) = program {
            match self.programs.get(handle) {
                Some(object) if !object.delete_flag => {}
                _ => return Err(GlError::InvalidOperation),
            }
        }
        if let Some(previous) = self.state.program.filter(|p| Some(*p) != program) {
            if self.programs.get(previous).is_some_and(|p| p.delete_flag) {
                self.programs.remove(previous);
                log::debug!("Deleted program {:?}", previous);
            }
        }
        self.state.program = program;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::context;
    use super::*;
    use crate::framebuffer::{Attachment, AttachmentPoint};

    #[test]
    fn test_first_bind_fixes_type() {
        let mut ctx = context();
        let texture = ctx.create_texture();
        assert_eq!(ctx.texture(texture).and_then(Texture::texture_type), None);

        ctx.bind_texture(GL_TEXTURE_3D, Some(texture));
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(
            ctx.texture(texture).and_then(Texture::texture_type),
            Some(TextureType::Texture3D)
        );

        ctx.bind_texture(GL_TEXTURE_2D, Some(texture));
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);
        assert_eq!(ctx.state().textures.active(TextureType::Texture2D), None);
        assert_eq!(ctx.state().textures.active(TextureType::Texture3D), Some(texture));
    }

    #[test]
    fn test_bind_texture_bad_target() {
        let mut ctx = context();
        let texture = ctx.create_texture();
        ctx.bind_texture(GL_TEXTURE_CUBE_MAP_POSITIVE_X, Some(texture));
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.texture(texture).and_then(Texture::texture_type), None);
    }

    #[test]
    fn test_active_texture_range() {
        let mut ctx = context();
        ctx.active_texture(GL_TEXTURE0 + 15);
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(ctx.state().textures.active_unit, 15);
        ctx.active_texture(GL_TEXTURE0 + 16);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.active_texture(GL_TEXTURE_2D);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.state().textures.active_unit, 15);
    }

    #[test]
    fn test_stale_handles_rejected() {
        let mut ctx = context();
        let buffer = ctx.create_buffer();
        ctx.delete_buffer(buffer);
        let reused = ctx.create_buffer();
        assert_ne!(buffer, reused);
        assert!(!ctx.is_buffer(buffer));

        ctx.bind_buffer(GL_ARRAY_BUFFER, Some(buffer));
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);
        assert_eq!(ctx.state().buffers.get(BufferTarget::Array), None);

        let vao = ctx.create_vertex_array();
        ctx.delete_vertex_array(vao);
        ctx.bind_vertex_array(Some(vao));
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);

        // deleting again is silent
        ctx.delete_vertex_array(vao);
        ctx.delete_buffer(buffer);
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_delete_buffer_unbinds() {
        let mut ctx = context();
        let buffer = ctx.create_buffer();
        ctx.bind_buffer(GL_ARRAY_BUFFER, Some(buffer));
        ctx.bind_buffer(GL_PIXEL_PACK_BUFFER, Some(buffer));
        ctx.bind_buffer(GL_ELEMENT_ARRAY_BUFFER, Some(buffer));
        assert_eq!(ctx.vertex_array(None).and_then(|v| v.element_array_buffer), Some(buffer));

        ctx.delete_buffer(buffer);
        assert_eq!(ctx.state().buffers.get(BufferTarget::Array), None);
        assert_eq!(ctx.state().buffers.get(BufferTarget::PixelPack), None);
        assert_eq!(ctx.vertex_array(None).and_then(|v| v.element_array_buffer), None);
    }

    #[test]
    fn test_element_binding_follows_vertex_array() {
        let mut ctx = context();
        let buffer = ctx.create_buffer();
        let vao = ctx.create_vertex_array();
        ctx.bind_vertex_array(Some(vao));
        ctx.bind_buffer(GL_ELEMENT_ARRAY_BUFFER, Some(buffer));
        ctx.bind_vertex_array(None);
        assert_eq!(ctx.vertex_array(None).and_then(|v| v.element_array_buffer), None);
        assert_eq!(ctx.vertex_array(Some(vao)).and_then(|v| v.element_array_buffer), Some(buffer));

        ctx.bind_vertex_array(Some(vao));
        ctx.delete_vertex_array(vao);
        assert_eq!(ctx.state().vertex_array, None);
    }

    #[test]
    fn test_delete_texture_unbinds_and_detaches() {
        let mut ctx = context();
        let texture = ctx.create_texture();
        ctx.active_texture(GL_TEXTURE0 + 2);
        ctx.bind_texture(GL_TEXTURE_2D, Some(texture));
        let fbo = ctx.create_framebuffer();
        ctx.bind_framebuffer(GL_FRAMEBUFFER, Some(fbo));
        ctx.framebuffer_texture_2d(GL_FRAMEBUFFER, GL_COLOR_ATTACHMENT0, GL_TEXTURE_2D, Some(texture), 0);
        assert_eq!(ctx.get_error(), GlError::NoError);

        ctx.delete_texture(texture);
        assert_eq!(ctx.state().textures.get(2, TextureType::Texture2D), None);
        let attachment = ctx.framebuffer(fbo).map(|f| *f.attachment(AttachmentPoint::Color0));
        assert_eq!(attachment, Some(Attachment::NONE));
    }

    #[test]
    fn test_delete_framebuffer_and_renderbuffer() {
        let mut ctx = context();
        let fbo = ctx.create_framebuffer();
        let rbo = ctx.create_renderbuffer();
        ctx.bind_framebuffer(GL_READ_FRAMEBUFFER, Some(fbo));
        ctx.bind_renderbuffer(GL_RENDERBUFFER, Some(rbo));
        ctx.framebuffer_renderbuffer(GL_READ_FRAMEBUFFER, GL_DEPTH_STENCIL_ATTACHMENT, GL_RENDERBUFFER, Some(rbo));
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(ctx.state().framebuffers.draw, None);

        ctx.delete_renderbuffer(rbo);
        assert_eq!(ctx.state().renderbuffer, None);
        let fb = ctx.framebuffer(fbo).cloned().unwrap_or_default();
        assert!(fb.attachment(AttachmentPoint::Depth).is_none());
        assert!(fb.attachment(AttachmentPoint::Stencil).is_none());

        ctx.delete_framebuffer(fbo);
        assert_eq!(ctx.state().framebuffers.read, None);
        assert!(!ctx.is_framebuffer(fbo));
    }

    #[test]
    fn test_bind_renderbuffer_target() {
        let mut ctx = context();
        let rbo = ctx.create_renderbuffer();
        ctx.bind_renderbuffer(GL_FRAMEBUFFER, Some(rbo));
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.state().renderbuffer, None);
    }

    #[test]
    fn test_program_deletion_is_deferred() {
        let mut ctx = context();
        let first = ctx.create_program();
        let second = ctx.create_program();
        ctx.use_program(Some(first));
        ctx.delete_program(first);
        assert!(ctx.is_program(first));
        assert_eq!(ctx.state().program, Some(first));

        ctx.use_program(Some(first));
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);

        ctx.use_program(Some(second));
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert!(!ctx.is_program(first));

        ctx.delete_program(second);
        ctx.use_program(None);
        assert!(!ctx.is_program(second));
        assert_eq!(ctx.state().program, None);
    }
}
