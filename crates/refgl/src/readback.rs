//! # Readback
//!
//! Pixel pack path of `readPixels`: clamps the requested rectangle against
//! the source, then converts the overlapping pixels into the destination
//! layout described by the pack parameters. Destination bytes for pixels
//! outside the source are left as they were.

use refgl_core::TextureFormat;

use crate::pixel::{PixelView, PixelViewMut, TransferLayout, TransferParams};

/// Requested readback rectangle, in framebuffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRect {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width, non-negative
    pub width: i32,
    /// Height, non-negative
    pub height: i32,
}

/// Overlap of a [`ReadRect`] with the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClampedRect {
    /// First source column
    pub src_x: u32,
    /// First source row
    pub src_y: u32,
    /// Destination column of the first copied pixel
    pub dst_x: u32,
    /// Destination row of the first copied pixel
    pub dst_y: u32,
    /// Copied width
    pub width: u32,
    /// Copied height
    pub height: u32,
}

impl ReadRect {
    /// Intersect with a `src_width`×`src_height` source. `None` when the
    /// rectangles do not overlap.
    pub fn clamp(&self, src_width: u32, src_height: u32) -> Option<ClampedRect> {
        let (x, y) = (i64::from(self.x), i64::from(self.y));
        let x0 = x.clamp(0, i64::from(src_width));
        let y0 = y.clamp(0, i64::from(src_height));
        let x1 = (x + i64::from(self.width)).clamp(0, i64::from(src_width));
        let y1 = (y + i64::from(self.height)).clamp(0, i64::from(src_height));
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(ClampedRect {
            src_x: x0 as u32,
            src_y: y0 as u32,
            dst_x: (x0 - x) as u32,
            dst_y: (y0 - y) as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

/// Destination layout of a `width`×`height` pack, `None` when it cannot be
/// addressed
pub fn pack_layout(format: TextureFormat, width: u32, height: u32, params: &TransferParams) -> Option<TransferLayout> {
    TransferLayout::new(format.pixel_size(), width, height, 1, params)
}

/// Pack the part of `rect` that overlaps `src` into `dst`, addressed by
/// `layout` from [`pack_layout`].
///
/// `dst` must hold at least `layout.required_len` bytes.
/// Multisampled sources are resolved by averaging.
pub fn pack_pixels(
    src: &PixelView<'_>,
    rect: ReadRect,
    format: TextureFormat,
    layout: &TransferLayout,
    dst: &mut [u8],
) {
    let width = rect.width.max(0) as u32;
    let height = rect.height.max(0) as u32;
    debug_assert!(dst.len() >= layout.required_len);

    let Some(clamped) = rect.clamp(src.width(), src.height()) else {
        return;
    };
    log::trace!("readback {:?} -> {:?}", rect, clamped);

    let source = src.subregion(clamped.src_x, clamped.src_y, clamped.width, clamped.height);
    let mut target = PixelViewMut::new(
        format,
        width,
        height,
        1,
        layout.row_pitch,
        layout.slice_pitch,
        &mut dst[layout.offset..],
    );
    target.copy_from(&source, clamped.dst_x, clamped.dst_y, 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixel::PixelBuffer;
    use alloc::vec;
    use refgl_core::{ChannelOrder, ChannelType};

    fn rgba8() -> TextureFormat {
        TextureFormat::new(ChannelOrder::RGBA, ChannelType::UnormInt8)
    }

    fn params(alignment: u32) -> TransferParams {
        TransferParams {
            alignment,
            row_length: 0,
            image_height: 0,
            skip_pixels: 0,
            skip_rows: 0,
            skip_images: 0,
        }
    }

    fn filled(width: u32, height: u32) -> PixelBuffer {
        let mut buffer = PixelBuffer::new(rgba8(), width, height, 1);
        buffer.view_mut().fill([1.0, 1.0, 1.0, 1.0]);
        buffer
    }

    #[test]
    fn test_clamp_inside() {
        let rect = ReadRect { x: 1, y: 2, width: 3, height: 4 };
        let clamped = rect.clamp(10, 10).unwrap();
        assert_eq!((clamped.src_x, clamped.src_y), (1, 2));
        assert_eq!((clamped.dst_x, clamped.dst_y), (0, 0));
        assert_eq!((clamped.width, clamped.height), (3, 4));
    }

    #[test]
    fn test_clamp_negative_origin() {
        let rect = ReadRect { x: -2, y: -1, width: 4, height: 4 };
        let clamped = rect.clamp(3, 3).unwrap();
        assert_eq!((clamped.src_x, clamped.src_y), (0, 0));
        assert_eq!((clamped.dst_x, clamped.dst_y), (2, 1));
        assert_eq!((clamped.width, clamped.height), (2, 3));
    }

    #[test]
    fn test_clamp_disjoint() {
        let rect = ReadRect { x: 5, y: 0, width: 2, height: 2 };
        assert!(rect.clamp(5, 5).is_none());
        let rect = ReadRect { x: 0, y: 0, width: 0, height: 2 };
        assert!(rect.clamp(5, 5).is_none());
    }

    #[test]
    fn test_outside_bytes_untouched() {
        let src = filled(2, 2);
        let rect = ReadRect { x: -1, y: 0, width: 3, height: 3 };
        let layout = pack_layout(rgba8(), 3, 3, &params(4)).unwrap();
        let mut dst = vec![0xAAu8; layout.required_len];

        pack_pixels(&src.view(), rect, rgba8(), &layout, &mut dst);

        let pixel = |x: usize, y: usize| &dst[y * layout.row_pitch + x * 4..][..4];
        assert_eq!(pixel(0, 0), &[0xAA; 4]);
        assert_eq!(pixel(1, 0), &[0xFF; 4]);
        assert_eq!(pixel(2, 1), &[0xFF; 4]);
        assert_eq!(pixel(1, 2), &[0xAA; 4]);
    }

    #[test]
    fn test_multisample_resolve() {
        let mut src = PixelBuffer::with_samples(rgba8(), 2, 1, 1, 1);
        src.view_mut().fill([0.0, 0.0, 0.0, 1.0]);
        let mut dst = [0u8; 4];
        let layout = pack_layout(rgba8(), 1, 1, &params(1)).unwrap();
        pack_pixels(
            &src.view(),
            ReadRect { x: 0, y: 0, width: 1, height: 1 },
            rgba8(),
            &layout,
            &mut dst,
        );
        assert_eq!(dst, [0, 0, 0, 0xFF]);
    }
}
