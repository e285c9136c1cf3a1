//! Clears, `clearBuffer*` and framebuffer blits.
//!
//! All writes go to the draw framebuffer and are limited to the scissor box
//! while the scissor test is enabled. Color writes honor the color mask,
//! depth writes the depth mask and stencil writes the front stencil write
//! mask. A blit snapshots its source first, so reading and drawing the
//! same image is well defined.

use refgl_core::enums::*;
use refgl_core::{FormatMapper, GLbitfield, GLenum, GlError};

use super::{GlResult, ReferenceContext};
use crate::blit;
use crate::framebuffer::{AttachmentPoint, BlitFilter, BlitRegion, BufferMask, PixelRect};
use crate::pixel::PixelBuffer;
use crate::state::Capabilities;

/// Buffers a blit mask can select, with the attachment each reads and writes
const BLIT_BUFFERS: [(BufferMask, AttachmentPoint); 3] = [
    (BufferMask::COLOR, AttachmentPoint::Color0),
    (BufferMask::DEPTH, AttachmentPoint::Depth),
    (BufferMask::STENCIL, AttachmentPoint::Stencil),
];

fn check_draw_buffer(drawbuffer: i32) -> GlResult {
    if drawbuffer != 0 {
        return Err(GlError::InvalidValue);
    }
    Ok(())
}

fn four<T: Copy>(value: &[T]) -> GlResult<[T; 4]> {
    match value {
        [r, g, b, a, ..] => Ok([*r, *g, *b, *a]),
        _ => Err(GlError::InvalidValue),
    }
}

fn first<T: Copy>(value: &[T]) -> GlResult<T> {
    value.first().copied().ok_or(GlError::InvalidValue)
}

impl<M: FormatMapper> ReferenceContext<M> {
    /// Pixels that clears and blits may write
    fn write_area(&self) -> PixelRect {
        if self.state.is_enabled(Capabilities::SCISSOR_TEST) {
            let scissor = self.state.scissor;
            PixelRect::new(scissor.x, scissor.y, scissor.width, scissor.height)
        } else {
            PixelRect::UNBOUNDED
        }
    }

    fn clear_draw_color(&mut self, color: [f32; 4]) {
        let area = self.write_area();
        let mask = self.state.raster.color_mask;
        if let Some(mut dst) = self.draw_buffer_mut(AttachmentPoint::Color0) {
            blit::clear_color(&mut dst, area, color, mask);
        }
    }

    fn clear_draw_depth(&mut self, depth: f32) {
        if !self.state.depth.write_enabled {
            return;
        }
        let area = self.write_area();
        if let Some(mut dst) = self.draw_buffer_mut(AttachmentPoint::Depth) {
            blit::clear_depth(&mut dst, area, depth);
        }
    }

    fn clear_draw_stencil(&mut self, stencil: i32) {
        let area = self.write_area();
        let write_mask = self.state.stencil.front.write_mask;
        if let Some(mut dst) = self.draw_buffer_mut(AttachmentPoint::Stencil) {
            blit::clear_stencil(&mut dst, area, stencil as u32, write_mask);
        }
    }

    // =========================================================================
    // CLEAR
    // =========================================================================

    /// Clear the buffers selected by `mask` to the current clear values
    pub fn clear(&mut self, mask: GLbitfield) {
        let result = self.clear_checked(mask);
        self.record("clear", result);
    }

    fn clear_checked(&mut self, mask: GLbitfield) -> GlResult {
        let mask = BufferMask::from_bits(mask).ok_or(GlError::InvalidValue)?;
        let values = self.state.clear;
        if mask.contains(BufferMask::COLOR) {
            self.clear_draw_color(values.color);
        }
        if mask.contains(BufferMask::DEPTH) {
            self.clear_draw_depth(values.depth);
        }
        if mask.contains(BufferMask::STENCIL) {
            self.clear_draw_stencil(values.stencil);
        }
        Ok(())
    }

    /// Clear the color buffer or the depth buffer to float values
    pub fn clear_bufferfv(&mut self, buffer: GLenum, drawbuffer: i32, value: &[f32]) {
        let result = self.clear_bufferfv_checked(buffer, drawbuffer, value);
        self.record("clearBufferfv", result);
    }

    fn clear_bufferfv_checked(&mut self, buffer: GLenum, drawbuffer: i32, value: &[f32]) -> GlResult {
        match buffer {
            GL_COLOR => {
                check_draw_buffer(drawbuffer)?;
                let color = four(value)?;
                self.clear_draw_color(color);
            }
            GL_DEPTH => {
                check_draw_buffer(drawbuffer)?;
                let depth = first(value)?;
                self.clear_draw_depth(depth);
            }
            _ => return Err(GlError::InvalidEnum),
        }
        Ok(())
    }

    /// Clear the color buffer or the stencil buffer to signed integer values
    pub fn clear_bufferiv(&mut self, buffer: GLenum, drawbuffer: i32, value: &[i32]) {
        let result = self.clear_bufferiv_checked(buffer, drawbuffer, value);
        self.record("clearBufferiv", result);
    }

    fn clear_bufferiv_checked(&mut self, buffer: GLenum, drawbuffer: i32, value: &[i32]) -> GlResult {
        match buffer {
            GL_COLOR => {
                check_draw_buffer(drawbuffer)?;
                let color = four(value)?;
                self.clear_draw_color(color.map(|c| c as f32));
            }
            GL_STENCIL => {
                check_draw_buffer(drawbuffer)?;
                let stencil = first(value)?;
                self.clear_draw_stencil(stencil);
            }
            _ => return Err(GlError::InvalidEnum),
        }
        Ok(())
    }

    /// Clear the color buffer to unsigned integer values
    pub fn clear_bufferuiv(&mut self, buffer: GLenum, drawbuffer: i32, value: &[u32]) {
        let result = self.clear_bufferuiv_checked(buffer, drawbuffer, value);
        self.record("clearBufferuiv", result);
    }

    fn clear_bufferuiv_checked(&mut self, buffer: GLenum, drawbuffer: i32, value: &[u32]) -> GlResult {
        if buffer != GL_COLOR {
            return Err(GlError::InvalidEnum);
        }
        check_draw_buffer(drawbuffer)?;
        let color = four(value)?;
        self.clear_draw_color(color.map(|c| c as f32));
        Ok(())
    }

    /// Clear the depth and stencil buffers together
    pub fn clear_bufferfi(&mut self, buffer: GLenum, drawbuffer: i32, depth: f32, stencil: i32) {
        let result = self.clear_bufferfi_checked(buffer, drawbuffer, depth, stencil);
        self.record("clearBufferfi", result);
    }

    fn clear_bufferfi_checked(&mut self, buffer: GLenum, drawbuffer: i32, depth: f32, stencil: i32) -> GlResult {
        if buffer != GL_DEPTH_STENCIL {
            return Err(GlError::InvalidEnum);
        }
        check_draw_buffer(drawbuffer)?;
        self.clear_draw_depth(depth);
        self.clear_draw_stencil(stencil);
        Ok(())
    }

    // =========================================================================
    // BLIT
    // =========================================================================

    /// Copy a rectangle of the read framebuffer into a rectangle of the draw
    /// framebuffer, scaling and mirroring as the corners require
    pub fn blit_framebuffer(
        &mut self,
        src_x0: i32,
        src_y0: i32,
        src_x1: i32,
        src_y1: i32,
        dst_x0: i32,
        dst_y0: i32,
        dst_x1: i32,
        dst_y1: i32,
        mask: GLbitfield,
        filter: GLenum,
    ) {
        let region = BlitRegion {
            src_x0,
            src_y0,
            src_x1,
            src_y1,
            dst_x0,
            dst_y0,
            dst_x1,
            dst_y1,
        };
        let result = self.blit_framebuffer_checked(region, mask, filter);
        self.record("blitFramebuffer", result);
    }

    fn blit_framebuffer_checked(&mut self, region: BlitRegion, mask: GLbitfield, filter: GLenum) -> GlResult {
        let filter = BlitFilter::from_gl(filter).ok_or(GlError::InvalidEnum)?;
        let mask = BufferMask::from_bits(mask).ok_or(GlError::InvalidValue)?;
        if mask.intersects(BufferMask::DEPTH | BufferMask::STENCIL) && filter != BlitFilter::Nearest {
            return Err(GlError::InvalidOperation);
        }
        let complete = Ok(GL_FRAMEBUFFER_COMPLETE);
        if self.check_framebuffer_status_checked(GL_DRAW_FRAMEBUFFER) != complete
            || self.check_framebuffer_status_checked(GL_READ_FRAMEBUFFER) != complete
        {
            return Err(GlError::InvalidOperation);
        }
        self.check_blit_formats(&region, mask, filter)?;

        let mut src_rect = region.src_rect();
        let mut dst_rect = region.dst_rect().intersect(self.write_area());
        for (bit, point) in BLIT_BUFFERS {
            let (src, dst) = (self.read_buffer(point), self.draw_buffer(point));
            if !mask.contains(bit) || src.is_empty() || dst.is_empty() {
                continue;
            }
            src_rect = src_rect.intersect(PixelRect::of_size(src.width(), src.height()));
            dst_rect = dst_rect.intersect(PixelRect::of_size(dst.width(), dst.height()));
        }
        if src_rect.is_empty() || dst_rect.is_empty() {
            return Ok(());
        }

        log::debug!("Blit {:?} -> {:?} ({:?}, {:?})", src_rect, dst_rect, mask, filter);
        for (bit, point) in BLIT_BUFFERS {
            if !mask.contains(bit) || (bit == BufferMask::DEPTH && !self.state.depth.write_enabled) {
                continue;
            }
            if self.draw_buffer(point).is_empty() {
                continue;
            }
            let Some(snapshot) = self.snapshot_read_buffer(point, src_rect) else {
                continue;
            };
            let write_mask = self.state.stencil.front.write_mask;
            let Some(mut dst) = self.draw_buffer_mut(point) else {
                continue;
            };
            let src = snapshot.view();
            match point {
                AttachmentPoint::Color0 => blit::blit_color(&src, src_rect, &mut dst, dst_rect, &region, filter),
                AttachmentPoint::Depth => blit::blit_depth(&src, src_rect, &mut dst, dst_rect, &region),
                AttachmentPoint::Stencil => {
                    blit::blit_stencil(&src, src_rect, &mut dst, dst_rect, &region, write_mask)
                }
            }
        }
        Ok(())
    }

    /// Format rules between the read and draw buffers a blit touches. A
    /// buffer missing on either side is skipped, not an error.
    fn check_blit_formats(&self, region: &BlitRegion, mask: BufferMask, filter: BlitFilter) -> GlResult {
        let read_color = self.read_buffer(AttachmentPoint::Color0);
        let draw_color = self.draw_buffer(AttachmentPoint::Color0);
        if draw_color.samples() != 1 {
            return Err(GlError::InvalidOperation);
        }

        for (bit, point) in BLIT_BUFFERS {
            let (src, dst) = (self.read_buffer(point), self.draw_buffer(point));
            if !mask.contains(bit) || src.is_empty() || dst.is_empty() {
                continue;
            }
            let (src, dst) = (src.format(), dst.format());
            let compatible = match point {
                AttachmentPoint::Color0 => {
                    src.is_integer() == dst.is_integer() && !(src.is_integer() && filter == BlitFilter::Linear)
                }
                AttachmentPoint::Depth | AttachmentPoint::Stencil => src == dst,
            };
            if !compatible {
                return Err(GlError::InvalidOperation);
            }
        }

        if read_color.samples() != 1 {
            let same_format = read_color.format() == draw_color.format();
            if region.is_scaled() || (mask.contains(BufferMask::COLOR) && !same_format) {
                return Err(GlError::InvalidOperation);
            }
        }
        Ok(())
    }

    /// Copy of `rect` of the read framebuffer's `point` buffer, resolving
    /// samples
    fn snapshot_read_buffer(&self, point: AttachmentPoint, rect: PixelRect) -> Option<PixelBuffer> {
        let src = self.read_buffer(point);
        if src.is_empty() {
            return None;
        }
        let (width, height) = (rect.width(), rect.height());
        let mut copy = PixelBuffer::new(src.format(), width, height, 1);
        let region = src.subregion(rect.x0 as u32, rect.y0 as u32, width, height);
        copy.view_mut().copy_from(&region, 0, 0, 0);
        Some(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::context;
    use super::*;
    use crate::config::ContextConfig;
    use crate::context::PixelSource;
    use crate::framebuffer::FramebufferHandle;
    use alloc::vec::Vec;

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

    fn depth_stencil_context() -> ReferenceContext {
        ReferenceContext::new(ContextConfig::new(4, 4).with_depth_stencil(24, 8))
    }

    fn default_color(ctx: &ReferenceContext, x: u32, y: u32) -> [f32; 4] {
        ctx.default_framebuffer().color.view().get_pixel(x, y, 0)
    }

    fn default_depth(ctx: &ReferenceContext, x: u32, y: u32) -> f32 {
        ctx.default_framebuffer().depth.as_ref().map_or(-1.0, |d| d.view().get_depth(x, y, 0))
    }

    fn default_stencil(ctx: &ReferenceContext, x: u32, y: u32) -> u32 {
        ctx.default_framebuffer().stencil.as_ref().map_or(u32::MAX, |s| s.view().get_stencil(x, y, 0))
    }

    /// Framebuffer with a `size`×`size` RGBA8 texture holding bytes 1, 2, 3...
    fn gradient_target(ctx: &mut ReferenceContext, size: i32) -> FramebufferHandle {
        let pixels: Vec<u8> = (1..=(size * size * 4) as u8).collect();
        let texture = ctx.create_texture();
        ctx.bind_texture(GL_TEXTURE_2D, Some(texture));
        ctx.tex_image_2d(
            GL_TEXTURE_2D,
            0,
            GL_RGBA8,
            size,
            size,
            0,
            GL_RGBA,
            GL_UNSIGNED_BYTE,
            PixelSource::Client(&pixels),
        );
        let fbo = ctx.create_framebuffer();
        ctx.bind_framebuffer(GL_FRAMEBUFFER, Some(fbo));
        ctx.framebuffer_texture_2d(GL_FRAMEBUFFER, GL_COLOR_ATTACHMENT0, GL_TEXTURE_2D, Some(texture), 0);
        assert_eq!(ctx.get_error(), GlError::NoError);
        fbo
    }

    #[test]
    fn test_clear_mask_scissor_and_color_mask() {
        let mut ctx = context();
        ctx.clear(GL_COLOR_BUFFER_BIT | 0x1);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);

        ctx.clear_color(1.0, 0.0, 0.0, 1.0);
        ctx.enable(GL_SCISSOR_TEST);
        ctx.scissor(2, 2, 4, 4);
        ctx.clear(GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT | GL_STENCIL_BUFFER_BIT);
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(default_color(&ctx, 2, 2), RED);
        assert_eq!(default_color(&ctx, 5, 5), RED);
        assert_eq!(default_color(&ctx, 6, 6), [0.0; 4]);
        assert_eq!(default_color(&ctx, 1, 3), [0.0; 4]);

        ctx.color_mask(false, true, true, true);
        ctx.clear_color(0.0, 1.0, 0.0, 1.0);
        ctx.disable(GL_SCISSOR_TEST);
        ctx.clear(GL_COLOR_BUFFER_BIT);
        assert_eq!(default_color(&ctx, 3, 3), [1.0, 1.0, 0.0, 1.0]);
        assert_eq!(default_color(&ctx, 0, 0), [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_clear_depth_and_stencil_masks() {
        let mut ctx = depth_stencil_context();
        ctx.clear_depthf(0.5);
        ctx.depth_mask(false);
        ctx.clear(GL_DEPTH_BUFFER_BIT);
        assert_eq!(default_depth(&ctx, 1, 1), 0.0);

        ctx.depth_mask(true);
        ctx.clear(GL_DEPTH_BUFFER_BIT);
        assert!((default_depth(&ctx, 1, 1) - 0.5).abs() < 1e-6);

        ctx.clear_stencil(0xFF);
        ctx.stencil_mask(0x0F);
        ctx.clear(GL_STENCIL_BUFFER_BIT);
        assert_eq!(default_stencil(&ctx, 3, 0), 0x0F);
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_clear_buffer_validation() {
        let mut ctx = depth_stencil_context();
        ctx.clear_bufferfv(GL_STENCIL, 0, &[1.0]);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.clear_bufferfv(GL_COLOR, 1, &[0.0; 4]);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.clear_bufferfv(GL_COLOR, 0, &[1.0]);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.clear_bufferfv(GL_DEPTH, 0, &[]);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.clear_bufferiv(GL_DEPTH, 0, &[0]);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.clear_bufferuiv(GL_STENCIL, 0, &[0]);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.clear_bufferfi(GL_DEPTH, 0, 1.0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.clear_bufferfi(GL_DEPTH_STENCIL, 1, 1.0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        assert_eq!(default_color(&ctx, 0, 0), [0.0; 4]);
        assert_eq!(default_depth(&ctx, 0, 0), 0.0);
    }

    #[test]
    fn test_clear_buffer_values() {
        let mut ctx = depth_stencil_context();
        ctx.clear_bufferfv(GL_COLOR, 0, &[0.0, 0.0, 1.0, 1.0]);
        assert_eq!(default_color(&ctx, 2, 1), [0.0, 0.0, 1.0, 1.0]);
        ctx.clear_bufferiv(GL_COLOR, 0, &[1, 0, 0, 1]);
        assert_eq!(default_color(&ctx, 2, 1), RED);
        ctx.clear_bufferuiv(GL_COLOR, 0, &[0, 1, 0, 1]);
        assert_eq!(default_color(&ctx, 2, 1), [0.0, 1.0, 0.0, 1.0]);

        ctx.clear_bufferfi(GL_DEPTH_STENCIL, 0, 1.0, 3);
        assert_eq!(default_depth(&ctx, 0, 3), 1.0);
        assert_eq!(default_stencil(&ctx, 0, 3), 3);
        ctx.clear_bufferiv(GL_STENCIL, 0, &[0x105]);
        assert_eq!(default_stencil(&ctx, 0, 3), 5);
        assert_eq!(ctx.get_error(), GlError::NoError);
    }

    #[test]
    fn test_clear_writes_bound_framebuffer() {
        let mut ctx = context();
        gradient_target(&mut ctx, 2);
        ctx.clear_color(1.0, 0.0, 0.0, 1.0);
        ctx.clear(GL_COLOR_BUFFER_BIT);
        assert_eq!(ctx.draw_colorbuffer().get_pixel(1, 1, 0), RED);
        assert_eq!(default_color(&ctx, 1, 1), [0.0; 4]);
    }

    #[test]
    fn test_blit_validation() {
        let mut ctx = depth_stencil_context();
        ctx.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_COLOR_BUFFER_BIT, GL_LINEAR_MIPMAP_LINEAR);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_COLOR_BUFFER_BIT | 0x1, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_DEPTH_BUFFER_BIT, GL_LINEAR);
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);

        let fbo = ctx.create_framebuffer();
        ctx.bind_framebuffer(GL_READ_FRAMEBUFFER, Some(fbo));
        ctx.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);

        let depth = ctx.create_renderbuffer();
        ctx.bind_renderbuffer(GL_RENDERBUFFER, Some(depth));
        ctx.renderbuffer_storage(GL_RENDERBUFFER, GL_DEPTH_COMPONENT16, 4, 4);
        ctx.framebuffer_renderbuffer(GL_READ_FRAMEBUFFER, GL_DEPTH_ATTACHMENT, GL_RENDERBUFFER, Some(depth));
        ctx.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_DEPTH_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::InvalidOperation);
        ctx.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_STENCIL_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::NoError);

        let mut multisampled = ReferenceContext::new(ContextConfig::new(4, 4).with_samples(4));
        multisampled.blit_framebuffer(0, 0, 1, 1, 0, 0, 1, 1, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(multisampled.get_error(), GlError::InvalidOperation);
    }

    #[test]
    fn test_blit_scales_and_mirrors() {
        let mut ctx = context();
        let fbo = gradient_target(&mut ctx, 2);
        ctx.bind_framebuffer(GL_DRAW_FRAMEBUFFER, None);
        assert_eq!(ctx.state().framebuffers.read, Some(fbo));

        ctx.blit_framebuffer(0, 0, 2, 2, 0, 0, 4, 4, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::NoError);
        let texel = |ctx: &ReferenceContext, x, y| ctx.read_colorbuffer().get_pixel(x, y, 0);
        assert_eq!(default_color(&ctx, 3, 3), texel(&ctx, 1, 1));
        assert_eq!(default_color(&ctx, 2, 0), texel(&ctx, 1, 0));
        assert_eq!(default_color(&ctx, 1, 1), texel(&ctx, 0, 0));

        ctx.blit_framebuffer(0, 0, 2, 2, 6, 0, 4, 2, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(default_color(&ctx, 4, 0), texel(&ctx, 1, 0));
        assert_eq!(default_color(&ctx, 5, 1), texel(&ctx, 0, 1));

        ctx.enable(GL_SCISSOR_TEST);
        ctx.scissor(0, 0, 1, 1);
        ctx.blit_framebuffer(0, 0, 2, 2, 8, 8, 10, 10, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(default_color(&ctx, 8, 8), [0.0; 4]);
    }

    #[test]
    fn test_blit_skips_missing_buffers() {
        let mut ctx = ReferenceContext::new(ContextConfig::new(4, 4).with_depth_stencil(0, 0));
        gradient_target(&mut ctx, 2);
        let depth = ctx.create_renderbuffer();
        ctx.bind_renderbuffer(GL_RENDERBUFFER, Some(depth));
        ctx.renderbuffer_storage(GL_RENDERBUFFER, GL_DEPTH_COMPONENT16, 2, 2);
        ctx.framebuffer_renderbuffer(GL_READ_FRAMEBUFFER, GL_DEPTH_ATTACHMENT, GL_RENDERBUFFER, Some(depth));
        ctx.bind_framebuffer(GL_DRAW_FRAMEBUFFER, None);

        let mask = GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT;
        ctx.blit_framebuffer(-1, -1, 3, 3, -1, -1, 3, 3, mask, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(default_color(&ctx, 1, 1), ctx.read_colorbuffer().get_pixel(1, 1, 0));
        assert_eq!(default_color(&ctx, 2, 2), [0.0; 4]);
    }

    #[test]
    fn test_blit_within_one_image() {
        let mut ctx = context();
        gradient_target(&mut ctx, 2);
        let before = ctx.read_colorbuffer().get_pixel(0, 0, 0);
        ctx.blit_framebuffer(0, 0, 2, 1, 0, 1, 2, 2, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(ctx.draw_colorbuffer().get_pixel(0, 1, 0), before);

        // overlapping source and destination read the original pixels
        let row = [0, 1].map(|x| ctx.read_colorbuffer().get_pixel(x, 0, 0));
        ctx.blit_framebuffer(0, 0, 2, 1, 1, 0, 3, 1, GL_COLOR_BUFFER_BIT, GL_NEAREST);
        assert_eq!(ctx.draw_colorbuffer().get_pixel(1, 0, 0), row[0]);
        assert_eq!(ctx.read_colorbuffer().get_pixel(0, 0, 0), row[0]);
    }
}
