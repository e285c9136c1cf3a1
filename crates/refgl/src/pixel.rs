//! # Pixel Buffer Access
//!
//! Owned pixel storage ([`PixelBuffer`]) and borrowed strided views over
//! it or over client memory ([`PixelView`], [`PixelViewMut`]). Views read
//! and write single texels as RGBA floats, depth or stencil, and copy
//! between formats.
//!
//! Texels are stored little-endian. A multisampled buffer keeps `samples`
//! consecutive texels for every pixel.

use alloc::vec;
use alloc::vec::Vec;

use refgl_core::{ChannelOrder, ChannelType, TextureFormat};

// =============================================================================
// LAYOUT
// =============================================================================

/// Round `value` up to a power-of-two `alignment`, `None` on overflow
pub const fn align_up(value: usize, alignment: usize) -> Option<usize> {
    match value.checked_add(alignment - 1) {
        Some(padded) => Some(padded & !(alignment - 1)),
        None => None,
    }
}

/// Addressing of an image inside a client or buffer-object byte range,
/// derived from pixel-store parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLayout {
    /// Bytes between row starts
    pub row_pitch: usize,
    /// Bytes between image starts
    pub slice_pitch: usize,
    /// Offset of the first addressed texel
    pub offset: usize,
    /// Bytes needed to hold the whole addressed image
    pub required_len: usize,
}

/// Pixel-store parameters relevant to one transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferParams {
    /// Row alignment (1, 2, 4 or 8)
    pub alignment: u32,
    /// Row length override, 0 = image width
    pub row_length: u32,
    /// Image height override, 0 = image height
    pub image_height: u32,
    /// Pixels skipped at the start of each row
    pub skip_pixels: u32,
    /// Rows skipped at the start of each image
    pub skip_rows: u32,
    /// Images skipped at the start
    pub skip_images: u32,
}

impl TransferLayout {
    /// Compute the layout of a `width`×`height`×`depth` image.
    ///
    /// Returns `None` when the addressed range does not fit in `usize`;
    /// no byte range can hold such an image.
    pub fn new(pixel_size: usize, width: u32, height: u32, depth: u32, params: &TransferParams) -> Option<Self> {
        let row_pixels = if params.row_length > 0 { params.row_length } else { width } as usize;
        let rows = if params.image_height > 0 { params.image_height } else { height } as usize;

        let row_pitch = align_up(row_pixels.checked_mul(pixel_size)?, params.alignment.max(1) as usize)?;
        let slice_pitch = rows.checked_mul(row_pitch)?;
        let offset = (params.skip_images as usize)
            .checked_mul(slice_pitch)?
            .checked_add((params.skip_rows as usize).checked_mul(row_pitch)?)?
            .checked_add((params.skip_pixels as usize).checked_mul(pixel_size)?)?;

        let required_len = if width == 0 || height == 0 || depth == 0 {
            0
        } else {
            offset
                .checked_add((depth as usize - 1).checked_mul(slice_pitch)?)?
                .checked_add((height as usize - 1).checked_mul(row_pitch)?)?
                .checked_add((width as usize).checked_mul(pixel_size)?)?
        };

        Some(Self {
            row_pitch,
            slice_pitch,
            offset,
            required_len,
        })
    }
}

// =============================================================================
// TEXEL CODEC
// =============================================================================

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_bits(read_u32(bytes))
}

fn write_u16(bytes: &mut [u8], value: u16) {
    bytes[..2].copy_from_slice(&value.to_le_bytes());
}

fn write_u32(bytes: &mut [u8], value: u32) {
    bytes[..4].copy_from_slice(&value.to_le_bytes());
}

fn unorm_to_float(value: u32, max: u32) -> f32 {
    (f64::from(value) / f64::from(max)) as f32
}

fn float_to_unorm(value: f32, max: u32) -> u32 {
    let clamped = f64::from(value.clamp(0.0, 1.0));
    (clamped * f64::from(max) + 0.5) as u32
}

/// Decode the stored channels of a color texel, in storage order.
fn decode_channels(format: TextureFormat, bytes: &[u8]) -> [f32; 4] {
    let count = format.order.channel_count();
    let mut out = [0.0; 4];
    match format.channel_type {
        ChannelType::UnormInt8 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = unorm_to_float(u32::from(bytes[i]), 0xFF);
            }
        }
        ChannelType::UnormInt16 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = unorm_to_float(u32::from(read_u16(&bytes[i * 2..])), 0xFFFF);
            }
        }
        ChannelType::UnormInt32 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = unorm_to_float(read_u32(&bytes[i * 4..]), u32::MAX);
            }
        }
        ChannelType::Float => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = read_f32(&bytes[i * 4..]);
            }
        }
        ChannelType::UnsignedInt8 => {
            for (i, value) in out.iter_mut().enumerate().take(count) {
                *value = f32::from(bytes[i]);
            }
        }
        ChannelType::UnormShort4444 => {
            let v = u32::from(read_u16(bytes));
            out = [
                unorm_to_float((v >> 12) & 0xF, 0xF),
                unorm_to_float((v >> 8) & 0xF, 0xF),
                unorm_to_float((v >> 4) & 0xF, 0xF),
                unorm_to_float(v & 0xF, 0xF),
            ];
        }
        ChannelType::UnormShort5551 => {
            let v = u32::from(read_u16(bytes));
            out = [
                unorm_to_float((v >> 11) & 0x1F, 0x1F),
                unorm_to_float((v >> 6) & 0x1F, 0x1F),
                unorm_to_float((v >> 1) & 0x1F, 0x1F),
                (v & 1) as f32,
            ];
        }
        ChannelType::UnormShort565 => {
            let v = u32::from(read_u16(bytes));
            out = [
                unorm_to_float((v >> 11) & 0x1F, 0x1F),
                unorm_to_float((v >> 5) & 0x3F, 0x3F),
                unorm_to_float(v & 0x1F, 0x1F),
                1.0,
            ];
        }
        ChannelType::UnsignedInt24_8 | ChannelType::FloatUnsignedInt24_8Rev => {
            unreachable!("color decode of packed depth-stencil format {:?}", format)
        }
    }
    out
}

/// Encode channels in storage order into a color texel.
fn encode_channels(format: TextureFormat, channels: [f32; 4], bytes: &mut [u8]) {
    let count = format.order.channel_count();
    match format.channel_type {
        ChannelType::UnormInt8 => {
            for i in 0..count {
                bytes[i] = float_to_unorm(channels[i], 0xFF) as u8;
            }
        }
        ChannelType::UnormInt16 => {
            for i in 0..count {
                write_u16(&mut bytes[i * 2..], float_to_unorm(channels[i], 0xFFFF) as u16);
            }
        }
        ChannelType::UnormInt32 => {
            for i in 0..count {
                write_u32(&mut bytes[i * 4..], float_to_unorm(channels[i], u32::MAX));
            }
        }
        ChannelType::Float => {
            for i in 0..count {
                write_u32(&mut bytes[i * 4..], channels[i].to_bits());
            }
        }
        ChannelType::UnsignedInt8 => {
            for i in 0..count {
                bytes[i] = channels[i].clamp(0.0, 255.0) as u8;
            }
        }
        ChannelType::UnormShort4444 => {
            let v = (float_to_unorm(channels[0], 0xF) << 12)
                | (float_to_unorm(channels[1], 0xF) << 8)
                | (float_to_unorm(channels[2], 0xF) << 4)
                | float_to_unorm(channels[3], 0xF);
            write_u16(bytes, v as u16);
        }
        ChannelType::UnormShort5551 => {
            let v = (float_to_unorm(channels[0], 0x1F) << 11)
                | (float_to_unorm(channels[1], 0x1F) << 6)
                | (float_to_unorm(channels[2], 0x1F) << 1)
                | float_to_unorm(channels[3], 1);
            write_u16(bytes, v as u16);
        }
        ChannelType::UnormShort565 => {
            let v = (float_to_unorm(channels[0], 0x1F) << 11)
                | (float_to_unorm(channels[1], 0x3F) << 5)
                | float_to_unorm(channels[2], 0x1F);
            write_u16(bytes, v as u16);
        }
        ChannelType::UnsignedInt24_8 | ChannelType::FloatUnsignedInt24_8Rev => {
            unreachable!("color encode of packed depth-stencil format {:?}", format)
        }
    }
}

fn read_color(format: TextureFormat, bytes: &[u8]) -> [f32; 4] {
    if format.has_depth() {
        return [read_depth(format, bytes), 0.0, 0.0, 1.0];
    }
    if format.has_stencil() {
        return [read_stencil(format, bytes) as f32, 0.0, 0.0, 1.0];
    }

    let c = decode_channels(format, bytes);
    match format.order {
        ChannelOrder::R => [c[0], 0.0, 0.0, 1.0],
        ChannelOrder::RG => [c[0], c[1], 0.0, 1.0],
        ChannelOrder::RGB => [c[0], c[1], c[2], 1.0],
        ChannelOrder::RGBA => c,
        ChannelOrder::A => [0.0, 0.0, 0.0, c[0]],
        ChannelOrder::L => [c[0], c[0], c[0], 1.0],
        ChannelOrder::LA => [c[0], c[0], c[0], c[1]],
        ChannelOrder::D | ChannelOrder::S | ChannelOrder::DS => unreachable!(),
    }
}

fn write_color(format: TextureFormat, color: [f32; 4], bytes: &mut [u8]) {
    if format.has_depth() || format.has_stencil() {
        if format.has_depth() {
            write_depth(format, color[0], bytes);
        }
        if format.has_stencil() {
            write_stencil(format, color[0] as u32, bytes);
        }
        return;
    }

    let channels = match format.order {
        ChannelOrder::A => [color[3], 0.0, 0.0, 0.0],
        ChannelOrder::LA => [color[0], color[3], 0.0, 0.0],
        _ => color,
    };
    encode_channels(format, channels, bytes);
}

fn read_depth(format: TextureFormat, bytes: &[u8]) -> f32 {
    match format.channel_type {
        ChannelType::UnormInt16 => unorm_to_float(u32::from(read_u16(bytes)), 0xFFFF),
        ChannelType::UnormInt32 => unorm_to_float(read_u32(bytes), u32::MAX),
        ChannelType::UnsignedInt24_8 => unorm_to_float(read_u32(bytes) >> 8, 0xFF_FFFF),
        ChannelType::Float | ChannelType::FloatUnsignedInt24_8Rev => read_f32(bytes),
        other => unreachable!("depth read from {:?}", other),
    }
}

fn write_depth(format: TextureFormat, depth: f32, bytes: &mut [u8]) {
    match format.channel_type {
        ChannelType::UnormInt16 => write_u16(bytes, float_to_unorm(depth, 0xFFFF) as u16),
        ChannelType::UnormInt32 => write_u32(bytes, float_to_unorm(depth, u32::MAX)),
        ChannelType::UnsignedInt24_8 => {
            let stencil = read_u32(bytes) & 0xFF;
            write_u32(bytes, (float_to_unorm(depth, 0xFF_FFFF) << 8) | stencil);
        }
        ChannelType::Float | ChannelType::FloatUnsignedInt24_8Rev => {
            write_u32(bytes, depth.to_bits());
        }
        other => unreachable!("depth write to {:?}", other),
    }
}

fn read_stencil(format: TextureFormat, bytes: &[u8]) -> u32 {
    match format.channel_type {
        ChannelType::UnsignedInt8 => u32::from(bytes[0]),
        ChannelType::UnsignedInt24_8 => read_u32(bytes) & 0xFF,
        ChannelType::FloatUnsignedInt24_8Rev => read_u32(&bytes[4..]) & 0xFF,
        other => unreachable!("stencil read from {:?}", other),
    }
}

fn write_stencil(format: TextureFormat, stencil: u32, bytes: &mut [u8]) {
    let stencil = stencil & 0xFF;
    match format.channel_type {
        ChannelType::UnsignedInt8 => bytes[0] = stencil as u8,
        ChannelType::UnsignedInt24_8 => {
            let depth = read_u32(bytes) & !0xFF;
            write_u32(bytes, depth | stencil);
        }
        ChannelType::FloatUnsignedInt24_8Rev => write_u32(&mut bytes[4..], stencil),
        other => unreachable!("stencil write to {:?}", other),
    }
}

// =============================================================================
// OWNED STORAGE
// =============================================================================

/// Owned, tightly packed pixel storage.
#[derive(Clone, PartialEq)]
pub struct PixelBuffer {
    format: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
    samples: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Zero-filled single-sample storage
    pub fn new(format: TextureFormat, width: u32, height: u32, depth: u32) -> Self {
        Self::with_samples(format, 1, width, height, depth)
    }

    /// Zero-filled storage with `samples` texels per pixel
    pub fn with_samples(format: TextureFormat, samples: u32, width: u32, height: u32, depth: u32) -> Self {
        let samples = samples.max(1);
        let len = format.pixel_size()
            * samples as usize
            * width as usize
            * height as usize
            * depth as usize;
        Self {
            format,
            width,
            height,
            depth,
            samples,
            data: vec![0; len],
        }
    }

    /// Texel format
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in slices
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Samples per pixel
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Raw bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes between row starts
    pub fn row_pitch(&self) -> usize {
        self.format.pixel_size() * self.samples as usize * self.width as usize
    }

    /// Bytes between slice starts
    pub fn slice_pitch(&self) -> usize {
        self.row_pitch() * self.height as usize
    }

    /// Borrow as a view
    pub fn view(&self) -> PixelView<'_> {
        PixelView {
            format: self.format,
            width: self.width,
            height: self.height,
            depth: self.depth,
            samples: self.samples,
            row_pitch: self.row_pitch(),
            slice_pitch: self.slice_pitch(),
            data: &self.data,
        }
    }

    /// Borrow as a mutable view
    pub fn view_mut(&mut self) -> PixelViewMut<'_> {
        let row_pitch = self.row_pitch();
        let slice_pitch = self.slice_pitch();
        PixelViewMut {
            format: self.format,
            width: self.width,
            height: self.height,
            depth: self.depth,
            samples: self.samples,
            row_pitch,
            slice_pitch,
            data: &mut self.data,
        }
    }
}

impl core::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("format", &self.format)
            .field("size", &(self.width, self.height, self.depth))
            .field("samples", &self.samples)
            .field("bytes", &self.data.len())
            .finish()
    }
}

// =============================================================================
// VIEWS
// =============================================================================

/// Borrowed read-only view of pixel data.
#[derive(Debug, Clone, Copy)]
pub struct PixelView<'a> {
    format: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
    samples: u32,
    row_pitch: usize,
    slice_pitch: usize,
    data: &'a [u8],
}

impl<'a> PixelView<'a> {
    /// View over `data` with explicit pitches
    pub fn new(
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
        row_pitch: usize,
        slice_pitch: usize,
        data: &'a [u8],
    ) -> Self {
        Self {
            format,
            width,
            height,
            depth,
            samples: 1,
            row_pitch,
            slice_pitch,
            data,
        }
    }

    /// Zero-sized view
    pub fn empty() -> Self {
        Self::new(
            TextureFormat::new(ChannelOrder::RGBA, ChannelType::UnormInt8),
            0,
            0,
            0,
            0,
            0,
            &[],
        )
    }

    /// Texel format
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in slices
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Samples per pixel
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Bytes between row starts
    pub fn row_pitch(&self) -> usize {
        self.row_pitch
    }

    /// Bytes between slice starts
    pub fn slice_pitch(&self) -> usize {
        self.slice_pitch
    }

    /// Has no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.depth == 0
    }

    /// Single slice `z` as a 2D view
    pub fn slice(&self, z: u32) -> PixelView<'a> {
        assert!(z < self.depth, "slice {} out of range (depth {})", z, self.depth);
        let data: &'a [u8] = self.data;
        PixelView {
            depth: 1,
            data: &data[z as usize * self.slice_pitch..],
            ..*self
        }
    }

    /// Rectangle starting at `(x, y)` of slice 0
    pub fn subregion(&self, x: u32, y: u32, width: u32, height: u32) -> PixelView<'a> {
        assert!(x + width <= self.width && y + height <= self.height);
        let offset = y as usize * self.row_pitch + x as usize * self.texel_stride();
        let data: &'a [u8] = self.data;
        PixelView {
            width,
            height,
            depth: 1,
            data: &data[offset.min(data.len())..],
            ..*self
        }
    }

    fn texel_stride(&self) -> usize {
        self.format.pixel_size() * self.samples as usize
    }

    fn texel(&self, sample: u32, x: u32, y: u32, z: u32) -> &'a [u8] {
        debug_assert!(sample < self.samples && x < self.width && y < self.height && z < self.depth);
        let offset = z as usize * self.slice_pitch
            + y as usize * self.row_pitch
            + x as usize * self.texel_stride()
            + sample as usize * self.format.pixel_size();
        let data: &'a [u8] = self.data;
        &data[offset..offset + self.format.pixel_size()]
    }

    /// Color of one sample
    pub fn get_sample(&self, sample: u32, x: u32, y: u32, z: u32) -> [f32; 4] {
        read_color(self.format, self.texel(sample, x, y, z))
    }

    /// Color of a pixel, averaging over samples
    pub fn get_pixel(&self, x: u32, y: u32, z: u32) -> [f32; 4] {
        if self.samples == 1 {
            return self.get_sample(0, x, y, z);
        }
        let mut sum = [0.0f32; 4];
        for s in 0..self.samples {
            let color = self.get_sample(s, x, y, z);
            for (acc, c) in sum.iter_mut().zip(color) {
                *acc += c;
            }
        }
        sum.map(|c| c / self.samples as f32)
    }

    /// Depth of a pixel (sample 0)
    pub fn get_depth(&self, x: u32, y: u32, z: u32) -> f32 {
        read_depth(self.format, self.texel(0, x, y, z))
    }

    /// Stencil of a pixel (sample 0)
    pub fn get_stencil(&self, x: u32, y: u32, z: u32) -> u32 {
        read_stencil(self.format, self.texel(0, x, y, z))
    }

    /// Bytes of one row of slice `z`
    fn row(&self, y: u32, z: u32) -> &'a [u8] {
        let start = z as usize * self.slice_pitch + y as usize * self.row_pitch;
        let data: &'a [u8] = self.data;
        &data[start..start + self.width as usize * self.texel_stride()]
    }
}

/// Borrowed writable view of pixel data.
#[derive(Debug)]
pub struct PixelViewMut<'a> {
    format: TextureFormat,
    width: u32,
    height: u32,
    depth: u32,
    samples: u32,
    row_pitch: usize,
    slice_pitch: usize,
    data: &'a mut [u8],
}

impl<'a> PixelViewMut<'a> {
    /// Writable view over `data` with explicit pitches
    pub fn new(
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
        row_pitch: usize,
        slice_pitch: usize,
        data: &'a mut [u8],
    ) -> Self {
        Self {
            format,
            width,
            height,
            depth,
            samples: 1,
            row_pitch,
            slice_pitch,
            data,
        }
    }

    /// Texel format
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Depth in slices
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Samples per pixel
    pub fn samples(&self) -> u32 {
        self.samples
    }

    /// Narrow to slice `z` as a 2D view
    pub fn into_slice(self, z: u32) -> PixelViewMut<'a> {
        assert!(z < self.depth, "slice {} out of range (depth {})", z, self.depth);
        let PixelViewMut {
            format,
            width,
            height,
            samples,
            row_pitch,
            slice_pitch,
            data,
            ..
        } = self;
        PixelViewMut {
            format,
            width,
            height,
            depth: 1,
            samples,
            row_pitch,
            slice_pitch,
            data: &mut data[z as usize * slice_pitch..],
        }
    }

    /// Reborrow as a read-only view
    pub fn as_view(&self) -> PixelView<'_> {
        PixelView {
            format: self.format,
            width: self.width,
            height: self.height,
            depth: self.depth,
            samples: self.samples,
            row_pitch: self.row_pitch,
            slice_pitch: self.slice_pitch,
            data: &*self.data,
        }
    }

    fn texel_stride(&self) -> usize {
        self.format.pixel_size() * self.samples as usize
    }

    fn texel_mut(&mut self, sample: u32, x: u32, y: u32, z: u32) -> &mut [u8] {
        debug_assert!(sample < self.samples && x < self.width && y < self.height && z < self.depth);
        let size = self.format.pixel_size();
        let offset = z as usize * self.slice_pitch
            + y as usize * self.row_pitch
            + x as usize * self.texel_stride()
            + sample as usize * size;
        &mut self.data[offset..offset + size]
    }

    /// Write a color to one sample
    pub fn set_sample(&mut self, color: [f32; 4], sample: u32, x: u32, y: u32, z: u32) {
        let format = self.format;
        write_color(format, color, self.texel_mut(sample, x, y, z));
    }

    /// Write a color to every sample of a pixel
    pub fn set_pixel(&mut self, color: [f32; 4], x: u32, y: u32, z: u32) {
        for s in 0..self.samples {
            self.set_sample(color, s, x, y, z);
        }
    }

    /// Write depth to every sample of a pixel
    pub fn set_depth(&mut self, depth: f32, x: u32, y: u32, z: u32) {
        let format = self.format;
        for s in 0..self.samples {
            write_depth(format, depth, self.texel_mut(s, x, y, z));
        }
    }

    /// Write stencil to every sample of a pixel
    pub fn set_stencil(&mut self, stencil: u32, x: u32, y: u32, z: u32) {
        let format = self.format;
        for s in 0..self.samples {
            write_stencil(format, stencil, self.texel_mut(s, x, y, z));
        }
    }

    /// Fill every pixel with `color` (depth/stencil take channel 0)
    pub fn fill(&mut self, color: [f32; 4]) {
        for z in 0..self.depth {
            for y in 0..self.height {
                for x in 0..self.width {
                    self.set_pixel(color, x, y, z);
                }
            }
        }
    }

    /// Clamp every stored depth value to [0, 1]. Only float depth formats
    /// can hold values outside that range.
    pub fn clamp_depth(&mut self) {
        if !self.format.has_depth() {
            return;
        }
        for z in 0..self.depth {
            for y in 0..self.height {
                for x in 0..self.width {
                    let depth = self.as_view().get_depth(x, y, z);
                    self.set_depth(depth.clamp(0.0, 1.0), x, y, z);
                }
            }
        }
    }

    /// Copy `src` into this view starting at `(x, y, z)`, converting format
    /// and resolving samples as needed.
    pub fn copy_from(&mut self, src: &PixelView<'_>, x: u32, y: u32, z: u32) {
        assert!(
            x + src.width <= self.width && y + src.height <= self.height && z + src.depth <= self.depth,
            "copy destination out of range"
        );

        if src.format == self.format && src.samples == 1 && self.samples == 1 {
            let row_bytes = src.width as usize * self.format.pixel_size();
            let x_offset = x as usize * self.format.pixel_size();
            for sz in 0..src.depth {
                for sy in 0..src.height {
                    let start = (z + sz) as usize * self.slice_pitch
                        + (y + sy) as usize * self.row_pitch
                        + x_offset;
                    self.data[start..start + row_bytes].copy_from_slice(src.row(sy, sz));
                }
            }
            return;
        }

        let depth = src.format.has_depth() && self.format.has_depth();
        let stencil = src.format.has_stencil() && self.format.has_stencil();
        for sz in 0..src.depth {
            for sy in 0..src.height {
                for sx in 0..src.width {
                    let (dx, dy, dz) = (x + sx, y + sy, z + sz);
                    if depth || stencil {
                        if depth {
                            self.set_depth(src.get_depth(sx, sy, sz), dx, dy, dz);
                        }
                        if stencil {
                            self.set_stencil(src.get_stencil(sx, sy, sz), dx, dy, dz);
                        }
                    } else {
                        self.set_pixel(src.get_pixel(sx, sy, sz), dx, dy, dz);
                    }
                }
            }
        }
    }
}
