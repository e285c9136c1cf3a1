//! # Capability Limits
//!
//! Fixed per-context implementation limits. A context snapshots its limits
//! once at construction and never changes them afterwards.

use crate::enums::*;
use crate::types::{GLenum, GLint};

/// Upper bound applied to queried texture sizes.
pub const MAX_QUERIED_TEXTURE_SIZE: u32 = 4096;

/// Implementation limits of a reference context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextLimits {
    /// Number of texture image units
    pub max_texture_image_units: u32,
    /// Max width/height of a 2D texture
    pub max_texture_2d_size: u32,
    /// Max face size of a cube map
    pub max_texture_cube_size: u32,
    /// Max layer count of a 2D array texture
    pub max_texture_2d_array_layers: u32,
    /// Max width/height/depth of a 3D texture
    pub max_texture_3d_size: u32,
    /// Max renderbuffer width/height
    pub max_renderbuffer_size: u32,
    /// Number of vertex attribute slots
    pub max_vertex_attribs: u32,
}

impl Default for ContextLimits {
    fn default() -> Self {
        Self {
            max_texture_image_units: 16,
            max_texture_2d_size: 2048,
            max_texture_cube_size: 2048,
            max_texture_2d_array_layers: 256,
            max_texture_3d_size: 256,
            max_renderbuffer_size: 2048,
            max_vertex_attribs: 16,
        }
    }
}

impl ContextLimits {
    /// Build limits from values reported by another implementation.
    ///
    /// `query` is called with each `GL_MAX_*` enum. Missing or non-positive
    /// answers keep the default, texture sizes are capped at
    /// [`MAX_QUERIED_TEXTURE_SIZE`].
    pub fn from_queried<F>(mut query: F) -> Self
    where
        F: FnMut(GLenum) -> Option<GLint>,
    {
        let defaults = Self::default();
        let mut fetch = |pname: GLenum, fallback: u32, cap: Option<u32>| {
            let value = match query(pname) {
                Some(v) if v > 0 => v as u32,
                _ => fallback,
            };
            cap.map_or(value, |c| value.min(c))
        };

        let size_cap = Some(MAX_QUERIED_TEXTURE_SIZE);
        Self {
            max_texture_image_units: fetch(
                GL_MAX_TEXTURE_IMAGE_UNITS,
                defaults.max_texture_image_units,
                None,
            ),
            max_texture_2d_size: fetch(GL_MAX_TEXTURE_SIZE, defaults.max_texture_2d_size, size_cap),
            max_texture_cube_size: fetch(
                GL_MAX_CUBE_MAP_TEXTURE_SIZE,
                defaults.max_texture_cube_size,
                size_cap,
            ),
            max_texture_2d_array_layers: fetch(
                GL_MAX_ARRAY_TEXTURE_LAYERS,
                defaults.max_texture_2d_array_layers,
                None,
            ),
            max_texture_3d_size: fetch(GL_MAX_3D_TEXTURE_SIZE, defaults.max_texture_3d_size, size_cap),
            max_renderbuffer_size: fetch(
                GL_MAX_RENDERBUFFER_SIZE,
                defaults.max_renderbuffer_size,
                size_cap,
            ),
            max_vertex_attribs: fetch(GL_MAX_VERTEX_ATTRIBS, defaults.max_vertex_attribs, None),
        }
    }

    /// Set texture unit count
    pub const fn with_texture_units(mut self, units: u32) -> Self {
        self.max_texture_image_units = units;
        self
    }

    /// Set 2D texture size limit
    pub const fn with_texture_2d_size(mut self, size: u32) -> Self {
        self.max_texture_2d_size = size;
        self
    }

    /// Set renderbuffer size limit
    pub const fn with_renderbuffer_size(mut self, size: u32) -> Self {
        self.max_renderbuffer_size = size;
        self
    }

    /// Set vertex attribute count
    pub const fn with_vertex_attribs(mut self, count: u32) -> Self {
        self.max_vertex_attribs = count;
        self
    }

    /// Value of a `GL_MAX_*` limit query, `None` for other enums
    pub fn query(&self, pname: GLenum) -> Option<u32> {
        let value = match pname {
            GL_MAX_TEXTURE_IMAGE_UNITS => self.max_texture_image_units,
            GL_MAX_TEXTURE_SIZE => self.max_texture_2d_size,
            GL_MAX_CUBE_MAP_TEXTURE_SIZE => self.max_texture_cube_size,
            GL_MAX_ARRAY_TEXTURE_LAYERS => self.max_texture_2d_array_layers,
            GL_MAX_3D_TEXTURE_SIZE => self.max_texture_3d_size,
            GL_MAX_RENDERBUFFER_SIZE => self.max_renderbuffer_size,
            GL_MAX_VERTEX_ATTRIBS => self.max_vertex_attribs,
            _ => return None,
        };
        Some(value)
    }
}

/// `floor(log2(size))`, the highest valid mip level for `size`.
pub const fn max_level_for_size(size: u32) -> u32 {
    if size == 0 {
        0
    } else {
        31 - size.leading_zeros()
    }
}
