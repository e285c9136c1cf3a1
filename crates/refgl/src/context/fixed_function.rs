//! Fixed-function state entry points.

use refgl_core::enums::*;
use refgl_core::{FormatMapper, GLenum, GlError};

use super::{GlResult, ReferenceContext};
use crate::state::{
    is_alignment_param, is_blend_equation, is_blend_factor, is_compare_func, is_stencil_op,
    BlendEquation, BlendFactor, Capabilities, ScissorRect, StencilFace, StencilFunc, StencilOp,
    Viewport,
};

fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

impl<M: FormatMapper> ReferenceContext<M> {
    // =========================================================================
    // VIEWPORT & SCISSOR
    // =========================================================================

    /// Set the viewport rectangle
    pub fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let result = self.viewport_checked(x, y, width, height);
        self.record("viewport", result);
    }

    fn viewport_checked(&mut self, x: i32, y: i32, width: i32, height: i32) -> GlResult {
        if width < 0 || height < 0 {
            return Err(GlError::InvalidValue);
        }
        self.state.viewport = Viewport {
            x,
            y,
            width,
            height,
        };
        Ok(())
    }

    /// Set the scissor box
    pub fn scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let result = self.scissor_checked(x, y, width, height);
        self.record("scissor", result);
    }

    fn scissor_checked(&mut self, x: i32, y: i32, width: i32, height: i32) -> GlResult {
        if width < 0 || height < 0 {
            return Err(GlError::InvalidValue);
        }
        self.state.scissor = ScissorRect {
            x,
            y,
            width,
            height,
        };
        Ok(())
    }

    // =========================================================================
    // CAPABILITIES
    // =========================================================================

    /// Enable a capability
    pub fn enable(&mut self, cap: GLenum) {
        let result = self.set_capability(cap, true);
        self.record("enable", result);
    }

    /// Disable a capability
    pub fn disable(&mut self, cap: GLenum) {
        let result = self.set_capability(cap, false);
        self.record("disable", result);
    }

    fn set_capability(&mut self, cap: GLenum, enabled: bool) -> GlResult {
        let caps = Capabilities::from_gl(cap).ok_or(GlError::InvalidEnum)?;
        self.state.set_enabled(caps, enabled);
        Ok(())
    }

    /// Whether a capability is enabled
    pub fn is_enabled(&mut self, cap: GLenum) -> bool {
        let result = Capabilities::from_gl(cap)
            .map(|caps| self.state.is_enabled(caps))
            .ok_or(GlError::InvalidEnum);
        self.record_or_default("isEnabled", result)
    }

    // =========================================================================
    // CLEAR VALUES
    // =========================================================================

    /// Set the clear color, clamped to [0, 1]
    pub fn clear_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state.clear.color = [red, green, blue, alpha].map(clamp_unit);
    }

    /// Set the clear depth, clamped to [0, 1]
    pub fn clear_depthf(&mut self, depth: f32) {
        self.state.clear.depth = clamp_unit(depth);
    }

    /// Set the clear stencil value
    pub fn clear_stencil(&mut self, stencil: i32) {
        self.state.clear.stencil = stencil;
    }

    // =========================================================================
    // DEPTH
    // =========================================================================

    /// Set the depth comparison function
    pub fn depth_func(&mut self, func: GLenum) {
        let result = self.depth_func_checked(func);
        self.record("depthFunc", result);
    }

    fn depth_func_checked(&mut self, func: GLenum) -> GlResult {
        if !is_compare_func(func) {
            return Err(GlError::InvalidEnum);
        }
        self.state.depth.func = func;
        Ok(())
    }

    /// Set the depth range, each end clamped to [0, 1]
    pub fn depth_rangef(&mut self, near: f32, far: f32) {
        self.state.depth.range_near = clamp_unit(near);
        self.state.depth.range_far = clamp_unit(far);
    }

    /// Enable or disable depth writes
    pub fn depth_mask(&mut self, enabled: bool) {
        self.state.depth.write_enabled = enabled;
    }

    // =========================================================================
    // RASTERIZATION
    // =========================================================================

    /// Set the polygon offset
    pub fn polygon_offset(&mut self, factor: f32, units: f32) {
        self.state.raster.polygon_offset_factor = factor;
        self.state.raster.polygon_offset_units = units;
    }

    /// Set the per-channel color write mask
    pub fn color_mask(&mut self, red: bool, green: bool, blue: bool, alpha: bool) {
        self.state.raster.color_mask = [red, green, blue, alpha];
    }

    /// Set the line width
    pub fn line_width(&mut self, width: f32) {
        let result = self.line_width_checked(width);
        self.record("lineWidth", result);
    }

    fn line_width_checked(&mut self, width: f32) -> GlResult {
        if width < 0.0 {
            return Err(GlError::InvalidValue);
        }
        self.state.raster.line_width = width;
        Ok(())
    }

    // =========================================================================
    // BLENDING
    // =========================================================================

    /// Set the constant blend color, clamped to [0, 1]
    pub fn blend_color(&mut self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.state.blend.color = [red, green, blue, alpha].map(clamp_unit);
    }

    /// Set source and destination factors for color and alpha together
    pub fn blend_func(&mut self, src: GLenum, dst: GLenum) {
        let result = self.blend_func_checked(src, dst, src, dst);
        self.record("blendFunc", result);
    }

    /// Set color and alpha blend factors separately
    pub fn blend_func_separate(&mut self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) {
        let result = self.blend_func_checked(src_rgb, dst_rgb, src_alpha, dst_alpha);
        self.record("blendFuncSeparate", result);
    }

    fn blend_func_checked(&mut self, src_rgb: GLenum, dst_rgb: GLenum, src_alpha: GLenum, dst_alpha: GLenum) -> GlResult {
        if ![src_rgb, dst_rgb, src_alpha, dst_alpha].into_iter().all(is_blend_factor) {
            return Err(GlError::InvalidEnum);
        }
        self.state.blend.factor = BlendFactor {
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        };
        Ok(())
    }

    /// Set the blend equation for color and alpha together
    pub fn blend_equation(&mut self, mode: GLenum) {
        let result = self.blend_equation_checked(mode, mode);
        self.record("blendEquation", result);
    }

    /// Set color and alpha blend equations separately
    pub fn blend_equation_separate(&mut self, mode_rgb: GLenum, mode_alpha: GLenum) {
        let result = self.blend_equation_checked(mode_rgb, mode_alpha);
        self.record("blendEquationSeparate", result);
    }

    fn blend_equation_checked(&mut self, rgb: GLenum, alpha: GLenum) -> GlResult {
        if !is_blend_equation(rgb) || !is_blend_equation(alpha) {
            return Err(GlError::InvalidEnum);
        }
        self.state.blend.equation = BlendEquation { rgb, alpha };
        Ok(())
    }

    // =========================================================================
    // STENCIL
    // =========================================================================

    /// Set the stencil test for both faces
    pub fn stencil_func(&mut self, func: GLenum, ref_value: i32, mask: u32) {
        let result = self.stencil_func_checked(GL_FRONT_AND_BACK, func, ref_value, mask);
        self.record("stencilFunc", result);
    }

    /// Set the stencil test for `face`
    pub fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, ref_value: i32, mask: u32) {
        let result = self.stencil_func_checked(face, func, ref_value, mask);
        self.record("stencilFuncSeparate", result);
    }

    fn stencil_func_checked(&mut self, face: GLenum, func: GLenum, ref_value: i32, mask: u32) -> GlResult {
        let face = StencilFace::from_gl(face).ok_or(GlError::InvalidEnum)?;
        if !is_compare_func(func) {
            return Err(GlError::InvalidEnum);
        }
        self.state
            .set_stencil_func_separate(face, StencilFunc { func, ref_value, mask });
        Ok(())
    }

    /// Set the stencil operations for both faces
    pub fn stencil_op(&mut self, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        let result = self.stencil_op_checked(GL_FRONT_AND_BACK, sfail, dpfail, dppass);
        self.record("stencilOp", result);
    }

    /// Set the stencil operations for `face`
    pub fn stencil_op_separate(&mut self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum) {
        let result = self.stencil_op_checked(face, sfail, dpfail, dppass);
        self.record("stencilOpSeparate", result);
    }

    fn stencil_op_checked(&mut self, face: GLenum, sfail: GLenum, dpfail: GLenum, dppass: GLenum) -> GlResult {
        let face = StencilFace::from_gl(face).ok_or(GlError::InvalidEnum)?;
        if ![sfail, dpfail, dppass].into_iter().all(is_stencil_op) {
            return Err(GlError::InvalidEnum);
        }
        self.state
            .set_stencil_op_separate(face, StencilOp { sfail, dpfail, dppass });
        Ok(())
    }

    /// Set the stencil write mask for both faces
    pub fn stencil_mask(&mut self, mask: u32) {
        self.state.set_stencil_mask_separate(StencilFace::FrontAndBack, mask);
    }

    /// Set the stencil write mask for `face`
    pub fn stencil_mask_separate(&mut self, face: GLenum, mask: u32) {
        let result = StencilFace::from_gl(face)
            .map(|face| self.state.set_stencil_mask_separate(face, mask))
            .ok_or(GlError::InvalidEnum);
        self.record("stencilMaskSeparate", result);
    }

    // =========================================================================
    // PIXEL STORE
    // =========================================================================

    /// Set a pixel pack/unpack parameter
    pub fn pixel_storei(&mut self, pname: GLenum, value: i32) {
        let result = self.pixel_storei_checked(pname, value);
        self.record("pixelStorei", result);
    }

    fn pixel_storei_checked(&mut self, pname: GLenum, value: i32) -> GlResult {
        let slot = self
            .state
            .pixel_store
            .slot_mut(pname)
            .ok_or(GlError::InvalidEnum)?;
        let valid = if is_alignment_param(pname) {
            matches!(value, 1 | 2 | 4 | 8)
        } else {
            value >= 0
        };
        if !valid {
            return Err(GlError::InvalidValue);
        }
        *slot = value as u32;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::context;
    use super::*;
    use crate::context::Parameter;
    use crate::state::StencilFaceState;

    #[test]
    fn test_unpack_alignment_three_rejected() {
        let mut ctx = context();
        ctx.pixel_storei(GL_UNPACK_ALIGNMENT, 3);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        assert_eq!(ctx.state().pixel_store.unpack.alignment, 4);
    }

    #[test]
    fn test_pixel_store_values() {
        let mut ctx = context();
        ctx.pixel_storei(GL_PACK_ALIGNMENT, 1);
        ctx.pixel_storei(GL_UNPACK_ROW_LENGTH, 32);
        ctx.pixel_storei(GL_UNPACK_SKIP_IMAGES, 2);
        assert_eq!(ctx.get_error(), GlError::NoError);
        assert_eq!(ctx.state().pixel_store.pack.alignment, 1);
        assert_eq!(ctx.state().pixel_store.unpack.row_length, 32);
        assert_eq!(ctx.state().pixel_store.unpack.skip_images, 2);

        ctx.pixel_storei(GL_PACK_SKIP_ROWS, -1);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        ctx.pixel_storei(GL_BLEND, 1);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
    }

    #[test]
    fn test_negative_scissor_rejected() {
        let mut ctx = context();
        ctx.scissor(1, 2, 3, 4);
        ctx.scissor(0, 0, -1, 10);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        assert_eq!(
            ctx.state().scissor,
            ScissorRect {
                x: 1,
                y: 2,
                width: 3,
                height: 4
            }
        );
    }

    #[test]
    fn test_viewport() {
        let mut ctx = context();
        ctx.viewport(-5, 3, 100, 50);
        assert_eq!(ctx.state().viewport.x, -5);
        ctx.viewport(0, 0, 10, -1);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        assert_eq!(ctx.state().viewport.width, 100);
    }

    #[test]
    fn test_capabilities() {
        let mut ctx = context();
        assert!(ctx.is_enabled(GL_DITHER));
        ctx.enable(GL_STENCIL_TEST);
        assert!(ctx.is_enabled(GL_STENCIL_TEST));
        assert!(!ctx.is_enabled(GL_CULL_FACE));
        ctx.disable(GL_STENCIL_TEST);
        assert!(!ctx.is_enabled(GL_STENCIL_TEST));
        assert_eq!(ctx.get_error(), GlError::NoError);

        ctx.disable(GL_DITHER);
        assert!(!ctx.is_enabled(GL_DITHER));
        assert_eq!(ctx.get_parameter(GL_DITHER), Parameter::Bool(false));
        ctx.enable(GL_DITHER);
        assert!(ctx.is_enabled(GL_DITHER));
        assert_eq!(ctx.get_error(), GlError::NoError);

        assert!(!ctx.is_enabled(GL_TEXTURE_2D));
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
    }

    #[test]
    fn test_clamped_values() {
        let mut ctx = context();
        ctx.clear_color(-1.0, 0.5, 2.0, 1.0);
        ctx.clear_depthf(3.0);
        ctx.depth_rangef(-0.5, 0.25);
        ctx.blend_color(1.5, 0.0, 0.0, -2.0);
        assert_eq!(ctx.state().clear.color, [0.0, 0.5, 1.0, 1.0]);
        assert_eq!(ctx.state().clear.depth, 1.0);
        assert_eq!((ctx.state().depth.range_near, ctx.state().depth.range_far), (0.0, 0.25));
        assert_eq!(ctx.state().blend.color, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_blend_all_or_nothing() {
        let mut ctx = context();
        ctx.blend_func_separate(GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA, GL_ONE, GL_FUNC_ADD);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.state().blend.factor, BlendFactor::default());

        ctx.blend_func(GL_SRC_ALPHA, GL_ONE_MINUS_SRC_ALPHA);
        assert_eq!(ctx.state().blend.factor.dst_alpha, GL_ONE_MINUS_SRC_ALPHA);

        ctx.blend_equation_separate(GL_MIN, GL_ONE);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.state().blend.equation, BlendEquation::default());
        ctx.blend_equation(GL_FUNC_REVERSE_SUBTRACT);
        assert_eq!(ctx.state().blend.equation.alpha, GL_FUNC_REVERSE_SUBTRACT);
    }

    #[test]
    fn test_stencil_separate() {
        let mut ctx = context();
        ctx.stencil_func_separate(GL_BACK, GL_EQUAL, 3, 0xFF);
        ctx.stencil_op_separate(GL_FRONT, GL_REPLACE, GL_KEEP, GL_INVERT);
        ctx.stencil_mask_separate(GL_FRONT_AND_BACK, 0x7);
        assert_eq!(ctx.get_error(), GlError::NoError);

        let stencil = ctx.state().stencil;
        assert_eq!(stencil.back.func.func, GL_EQUAL);
        assert_eq!(stencil.front.func.func, GL_ALWAYS);
        assert_eq!(stencil.front.op.sfail, GL_REPLACE);
        assert_eq!(stencil.back.op, StencilOp::default());
        assert_eq!((stencil.front.write_mask, stencil.back.write_mask), (0x7, 0x7));

        ctx.stencil_op_separate(GL_BACK, GL_KEEP, GL_KEEP, GL_ONE);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.stencil_func_separate(GL_LESS, GL_EQUAL, 0, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        ctx.stencil_mask_separate(GL_ZERO, 0);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.state().stencil, stencil);

        ctx.stencil_func(GL_NEVER, 1, 2);
        let expected = StencilFunc {
            func: GL_NEVER,
            ref_value: 1,
            mask: 2,
        };
        assert_eq!(ctx.state().stencil.front.func, expected);
        assert_eq!(ctx.state().stencil.back.func, expected);
        assert_ne!(ctx.state().stencil.back, StencilFaceState::default());
    }

    #[test]
    fn test_depth_and_line_width() {
        let mut ctx = context();
        ctx.depth_func(GL_GEQUAL);
        ctx.depth_func(GL_KEEP);
        assert_eq!(ctx.get_error(), GlError::InvalidEnum);
        assert_eq!(ctx.state().depth.func, GL_GEQUAL);

        ctx.line_width(0.0);
        ctx.line_width(-1.0);
        assert_eq!(ctx.get_error(), GlError::InvalidValue);
        assert_eq!(ctx.state().raster.line_width, 0.0);

        ctx.depth_mask(false);
        ctx.color_mask(true, false, true, false);
        ctx.polygon_offset(1.0, 2.0);
        ctx.clear_stencil(9);
        assert!(!ctx.state().depth.write_enabled);
        assert_eq!(ctx.state().raster.color_mask, [true, false, true, false]);
        assert_eq!(ctx.state().raster.polygon_offset_units, 2.0);
        assert_eq!(ctx.state().clear.stencil, 9);
    }
}
