//! # Clears and Blits
//!
//! Pixel operations behind `clear`, `clearBuffer*` and `blitFramebuffer`,
//! applied to views resolved from framebuffer attachments. Each function
//! writes only inside the rectangle it is given, clipped to the view.

use crate::framebuffer::{BlitFilter, BlitRegion, PixelRect};
use crate::pixel::{PixelView, PixelViewMut};

/// `x.floor()` without `std`
fn floor(x: f64) -> i64 {
    let t = x as i64;
    if (t as f64) > x {
        t - 1
    } else {
        t
    }
}

/// `rect` clipped to a `width`×`height` view, as unsigned bounds
fn clip(rect: PixelRect, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
    let rect = rect.intersect(PixelRect::of_size(width, height));
    (!rect.is_empty()).then(|| (rect.x0 as u32, rect.y0 as u32, rect.x1 as u32, rect.y1 as u32))
}

fn select(new: [f32; 4], old: [f32; 4], mask: [bool; 4]) -> [f32; 4] {
    core::array::from_fn(|i| if mask[i] { new[i] } else { old[i] })
}

// =============================================================================
// CLEAR
// =============================================================================

/// Write `color` to the channels enabled in `mask`, over `rect`
pub fn clear_color(dst: &mut PixelViewMut<'_>, rect: PixelRect, color: [f32; 4], mask: [bool; 4]) {
    if mask == [false; 4] {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip(rect, dst.width(), dst.height()) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            if mask == [true; 4] {
                dst.set_pixel(color, x, y, 0);
                continue;
            }
            for s in 0..dst.samples() {
                let old = dst.as_view().get_sample(s, x, y, 0);
                dst.set_sample(select(color, old, mask), s, x, y, 0);
            }
        }
    }
}

/// Write `depth` over `rect`. A packed stencil channel is kept.
pub fn clear_depth(dst: &mut PixelViewMut<'_>, rect: PixelRect, depth: f32) {
    let Some((x0, y0, x1, y1)) = clip(rect, dst.width(), dst.height()) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            dst.set_depth(depth, x, y, 0);
        }
    }
}

/// Write the bits of `stencil` enabled in `write_mask` over `rect`. A
/// packed depth channel is kept.
pub fn clear_stencil(dst: &mut PixelViewMut<'_>, rect: PixelRect, stencil: u32, write_mask: u32) {
    if write_mask == 0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = clip(rect, dst.width(), dst.height()) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let old = dst.as_view().get_stencil(x, y, 0);
            dst.set_stencil((old & !write_mask) | (stencil & write_mask), x, y, 0);
        }
    }
}

// =============================================================================
// BLIT
// =============================================================================

/// Visit every pixel of `dst_rect` whose mapped source coordinate falls
/// inside `src_rect`. The visitor gets the destination pixel, the source
/// coordinate relative to `src_rect`, and the nearest source pixel.
fn for_each_mapped<F>(region: &BlitRegion, src_rect: PixelRect, dst_rect: PixelRect, dst: (u32, u32), mut visit: F)
where
    F: FnMut(u32, u32, (f64, f64), (u32, u32)),
{
    let Some((x0, y0, x1, y1)) = clip(dst_rect, dst.0, dst.1) else {
        return;
    };
    for y in y0..y1 {
        for x in x0..x1 {
            let (sx, sy) = region.source_coord(i64::from(x), i64::from(y));
            let (ix, iy) = (floor(sx), floor(sy));
            if ix < src_rect.x0 || ix >= src_rect.x1 || iy < src_rect.y0 || iy >= src_rect.y1 {
                continue;
            }
            let coord = (sx - src_rect.x0 as f64, sy - src_rect.y0 as f64);
            visit(x, y, coord, ((ix - src_rect.x0) as u32, (iy - src_rect.y0) as u32));
        }
    }
}

/// Bilinear sample at unnormalized coordinate `(u, v)`, clamped to the
/// edge of `src`
fn sample_linear(src: &PixelView<'_>, u: f64, v: f64) -> [f32; 4] {
    let (u, v) = (u - 0.5, v - 0.5);
    let (x0, y0) = (floor(u), floor(v));
    let (fx, fy) = ((u - x0 as f64) as f32, (v - y0 as f64) as f32);
    let (max_x, max_y) = (i64::from(src.width()) - 1, i64::from(src.height()) - 1);
    let texel = |x: i64, y: i64| src.get_pixel(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32, 0);

    let (a, b) = (texel(x0, y0), texel(x0 + 1, y0));
    let (c, d) = (texel(x0, y0 + 1), texel(x0 + 1, y0 + 1));
    core::array::from_fn(|i| {
        let bottom = a[i] + (b[i] - a[i]) * fx;
        let top = c[i] + (d[i] - c[i]) * fx;
        bottom + (top - bottom) * fy
    })
}

/// Copy color from `src`, which holds the pixels of `src_rect`, into
/// `dst_rect` of `dst`. A scaled blit with a linear filter interpolates,
/// except into integer formats.
pub fn blit_color(
    src: &PixelView<'_>,
    src_rect: PixelRect,
    dst: &mut PixelViewMut<'_>,
    dst_rect: PixelRect,
    region: &BlitRegion,
    filter: BlitFilter,
) {
    let linear = filter == BlitFilter::Linear && region.is_scaled() && !dst.format().is_integer();
    let size = (dst.width(), dst.height());
    for_each_mapped(region, src_rect, dst_rect, size, |x, y, (u, v), (sx, sy)| {
        let color = if linear {
            sample_linear(src, u, v)
        } else {
            src.get_pixel(sx, sy, 0)
        };
        dst.set_pixel(color, x, y, 0);
    });
}

/// Copy depth from `src`, which holds the pixels of `src_rect`, into
/// `dst_rect` of `dst`
pub fn blit_depth(
    src: &PixelView<'_>,
    src_rect: PixelRect,
    dst: &mut PixelViewMut<'_>,
    dst_rect: PixelRect,
    region: &BlitRegion,
) {
    let size = (dst.width(), dst.height());
    for_each_mapped(region, src_rect, dst_rect, size, |x, y, _, (sx, sy)| {
        dst.set_depth(src.get_depth(sx, sy, 0), x, y, 0);
    });
}

/// Copy the stencil bits enabled in `write_mask` from `src`, which holds
/// the pixels of `src_rect`, into `dst_rect` of `dst`
pub fn blit_stencil(
    src: &PixelView<'_>,
    src_rect: PixelRect,
    dst: &mut PixelViewMut<'_>,
    dst_rect: PixelRect,
    region: &BlitRegion,
    write_mask: u32,
) {
    let size = (dst.width(), dst.height());
    for_each_mapped(region, src_rect, dst_rect, size, |x, y, _, (sx, sy)| {
        let old = dst.as_view().get_stencil(x, y, 0);
        let value = src.get_stencil(sx, sy, 0);
        dst.set_stencil((old & !write_mask) | (value & write_mask), x, y, 0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use refgl_core::{ChannelOrder, ChannelType, TextureFormat};

    fn rgba8() -> TextureFormat {
        TextureFormat::new(ChannelOrder::RGBA, ChannelType::UnormInt8)
    }

    fn rgba32f() -> TextureFormat {
        TextureFormat::new(ChannelOrder::RGBA, ChannelType::Float)
    }

    fn region(src: [i32; 4], dst: [i32; 4]) -> BlitRegion {
        BlitRegion {
            src_x0: src[0],
            src_y0: src[1],
            src_x1: src[2],
            src_y1: src[3],
            dst_x0: dst[0],
            dst_y0: dst[1],
            dst_x1: dst[2],
            dst_y1: dst[3],
        }
    }

    #[test]
    fn test_floor() {
        assert_eq!(floor(1.5), 1);
        assert_eq!(floor(-0.25), -1);
        assert_eq!(floor(-2.0), -2);
        assert_eq!(floor(0.0), 0);
    }

    #[test]
    fn test_clear_color_masked_and_clipped() {
        let mut buffer = PixelBuffer::new(rgba8(), 4, 4, 1);
        buffer.view_mut().fill([0.0, 1.0, 0.0, 1.0]);

        let mut view = buffer.view_mut();
        clear_color(&mut view, PixelRect::new(2, 2, 10, 10), [1.0, 0.0, 1.0, 0.0], [true, false, true, false]);
        let view = buffer.view();
        assert_eq!(view.get_pixel(3, 3, 0), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(view.get_pixel(1, 3, 0), [0.0, 1.0, 0.0, 1.0]);

        let mut view = buffer.view_mut();
        clear_color(&mut view, PixelRect::UNBOUNDED, [0.0; 4], [false; 4]);
        assert_eq!(buffer.view().get_pixel(3, 3, 0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_clear_depth_stencil_channels() {
        let format = TextureFormat::new(ChannelOrder::DS, ChannelType::UnsignedInt24_8);
        let mut buffer = PixelBuffer::new(format, 2, 2, 1);
        let mut view = buffer.view_mut();
        clear_stencil(&mut view, PixelRect::UNBOUNDED, 0xFF, 0xFF);
        clear_depth(&mut view, PixelRect::new(0, 0, 1, 1), 1.0);
        clear_stencil(&mut view, PixelRect::UNBOUNDED, 0x00, 0x0F);

        let view = buffer.view();
        assert_eq!(view.get_depth(0, 0, 0), 1.0);
        assert_eq!(view.get_depth(1, 1, 0), 0.0);
        assert_eq!(view.get_stencil(0, 0, 0), 0xF0);
        assert_eq!(view.get_stencil(1, 1, 0), 0xF0);
    }

    #[test]
    fn test_blit_nearest_mirrored_upscale() {
        let mut src = PixelBuffer::new(rgba8(), 2, 1, 1);
        src.view_mut().set_pixel([1.0, 0.0, 0.0, 1.0], 0, 0, 0);
        src.view_mut().set_pixel([0.0, 0.0, 1.0, 1.0], 1, 0, 0);
        let mut dst = PixelBuffer::new(rgba8(), 4, 1, 1);

        let blit = region([2, 0, 0, 1], [0, 0, 4, 1]);
        let mut view = dst.view_mut();
        blit_color(&src.view(), blit.src_rect(), &mut view, blit.dst_rect(), &blit, BlitFilter::Nearest);

        let view = dst.view();
        assert_eq!(view.get_pixel(0, 0, 0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(view.get_pixel(1, 0, 0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(view.get_pixel(2, 0, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(view.get_pixel(3, 0, 0), [1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_blit_linear_interpolates_when_scaled() {
        let mut src = PixelBuffer::new(rgba32f(), 2, 1, 1);
        src.view_mut().set_pixel([1.0, 0.0, 0.0, 1.0], 1, 0, 0);
        let mut dst = PixelBuffer::new(rgba32f(), 4, 1, 1);

        let blit = region([0, 0, 2, 1], [0, 0, 4, 1]);
        let mut view = dst.view_mut();
        blit_color(&src.view(), blit.src_rect(), &mut view, blit.dst_rect(), &blit, BlitFilter::Linear);

        let reds: [f32; 4] = core::array::from_fn(|x| dst.view().get_pixel(x as u32, 0, 0)[0]);
        assert_eq!(reds, [0.0, 0.25, 0.75, 1.0]);
    }

    #[test]
    fn test_blit_skips_pixels_outside_source() {
        let mut src = PixelBuffer::new(rgba8(), 2, 1, 1);
        src.view_mut().fill([1.0; 4]);
        let mut dst = PixelBuffer::new(rgba8(), 4, 1, 1);

        // source spans [-2, 2) but only [0, 2) exists
        let blit = region([-2, 0, 2, 1], [0, 0, 4, 1]);
        let src_rect = blit.src_rect().intersect(PixelRect::of_size(2, 1));
        let mut view = dst.view_mut();
        blit_color(&src.view(), src_rect, &mut view, blit.dst_rect(), &blit, BlitFilter::Nearest);

        let view = dst.view();
        assert_eq!(view.get_pixel(1, 0, 0), [0.0; 4]);
        assert_eq!(view.get_pixel(2, 0, 0), [1.0; 4]);
    }

    #[test]
    fn test_blit_depth_and_masked_stencil() {
        let format = TextureFormat::new(ChannelOrder::DS, ChannelType::UnsignedInt24_8);
        let mut src = PixelBuffer::new(format, 1, 1, 1);
        src.view_mut().set_depth(1.0, 0, 0, 0);
        src.view_mut().set_stencil(0xAB, 0, 0, 0);
        let mut dst = PixelBuffer::new(format, 2, 2, 1);

        let blit = region([0, 0, 1, 1], [0, 0, 2, 2]);
        let mut view = dst.view_mut();
        blit_depth(&src.view(), blit.src_rect(), &mut view, blit.dst_rect(), &blit);
        blit_stencil(&src.view(), blit.src_rect(), &mut view, blit.dst_rect(), &blit, 0x0F);

        let view = dst.view();
        assert_eq!(view.get_depth(1, 1, 0), 1.0);
        assert_eq!(view.get_stencil(1, 1, 0), 0x0B);
    }
}
