//! Buffer data entry points.

use refgl_core::enums::*;
use refgl_core::{FormatMapper, GLenum, GLint, GlError};

use super::{GlResult, ReferenceContext};
use crate::buffer::{BufferData, BufferTarget, BufferUsage, DataBuffer};

impl<M: FormatMapper> ReferenceContext<M> {
    /// Buffer bound to `target`, parsed from its GL enum
    fn target_buffer(&self, target: GLenum) -> GlResult<&DataBuffer> {
        let target = BufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let handle = self.bound_buffer(target).ok_or(GlError::InvalidOperation)?;
        match self.buffers.get(handle) {
            Some(buffer) => Ok(buffer),
            None => unreachable!("bound buffer {:?} is not live", handle),
        }
    }

    fn target_buffer_mut(&mut self, target: BufferTarget) -> &mut DataBuffer {
        let Some(handle) = self.bound_buffer(target) else {
            unreachable!("{:?} has no buffer bound", target);
        };
        match self.buffers.get_mut(handle) {
            Some(buffer) => buffer,
            None => unreachable!("bound buffer {:?} is not live", handle),
        }
    }

    /// Replace the storage of the buffer bound to `target`
    pub fn buffer_data(&mut self, target: GLenum, data: BufferData<'_>, usage: GLenum) {
        let result = self.buffer_data_checked(target, data, usage);
        self.record("bufferData", result);
    }

    fn buffer_data_checked(&mut self, target: GLenum, data: BufferData<'_>, usage: GLenum) -> GlResult {
        let parsed_target = BufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        let usage = BufferUsage::from_gl(usage).ok_or(GlError::InvalidEnum)?;
        self.target_buffer(target)?;
        if let BufferData::Size(size) = data {
            if size < 0 {
                return Err(GlError::InvalidValue);
            }
        }

        let buffer = self.target_buffer_mut(parsed_target);
        let allocated = match data {
            BufferData::Size(size) => buffer.set_storage(size as usize),
            BufferData::Bytes(bytes) => buffer.set_data(bytes),
        };
        if let Err(err) = allocated {
            log::warn!("{:?} buffer storage allocation failed: {}", parsed_target, err);
            return Err(GlError::OutOfMemory);
        }
        buffer.set_usage(usage);
        log::debug!("{:?} buffer storage: {} bytes, {:?}", parsed_target, buffer.size(), usage);
        Ok(())
    }

    /// Overwrite part of the buffer bound to `target`
    pub fn buffer_sub_data(&mut self, target: GLenum, offset: isize, bytes: &[u8]) {
        let result = self.buffer_sub_data_checked(target, offset, bytes);
        self.record("bufferSubData", result);
    }

    fn buffer_sub_data_checked(&mut self, target: GLenum, offset: isize, bytes: &[u8]) -> GlResult {
        let buffer = self.target_buffer(target)?;
        let offset = checked_range(buffer, offset, bytes.len())?;
        let Some(target) = BufferTarget::from_gl(target) else {
            unreachable!("buffer target 0x{:04x} already validated", target);
        };
        self.target_buffer_mut(target).set_sub_data(offset, bytes);
        Ok(())
    }

    /// Copy part of the buffer bound to `target` into `dst`
    pub fn get_buffer_sub_data(&mut self, target: GLenum, offset: isize, dst: &mut [u8]) {
        let result = self.get_buffer_sub_data_checked(target, offset, dst);
        self.record("getBufferSubData", result);
    }

    fn get_buffer_sub_data_checked(&self, target: GLenum, offset: isize, dst: &mut [u8]) -> GlResult {
        let buffer = self.target_buffer(target)?;
        let offset = checked_range(buffer, offset, dst.len())?;
        dst.copy_from_slice(&buffer.data()[offset..offset + dst.len()]);
        Ok(())
    }

    /// `GL_BUFFER_SIZE` or `GL_BUFFER_USAGE` of the buffer bound to `target`
    pub fn get_buffer_parameter(&mut self, target: GLenum, pname: GLenum) -> GLint {
        let result = self.get_buffer_parameter_checked(target, pname);
        self.record_or_default("getBufferParameter", result)
    }

    fn get_buffer_parameter_checked(&self, target: GLenum, pname: GLenum) -> GlResult<GLint> {
        BufferTarget::from_gl(target).ok_or(GlError::InvalidEnum)?;
        if !matches!(pname, GL_BUFFER_SIZE | GL_BUFFER_USAGE) {
            return Err(GlError::InvalidEnum);
        }
        let buffer = self.target_buffer(target)?;
        Ok(match pname {
            GL_BUFFER_SIZE => buffer.size() as GLint,
            _ => buffer.usage().to_gl() as GLint,
        })
    }
}

/// Validate `[offset, offset + len)` against `buffer`
fn checked_range(buffer: &DataBuffer, offset: isize, len: usize) -> GlResult<usize> {
    let offset = usize::try_from(offset).map_err(|_| GlError::InvalidValue)?;
    match offset.checked_add(len) {
        Some(end) if end <= buffer.size() => Ok(offset),
        _ => Err(GlError::InvalidValue),
    }
}
