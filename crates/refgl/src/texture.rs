//! # Texture Objects
//!
//! Texture storage and sampler state. A texture object starts out untyped;
//! the first bind fixes it to one of the [`TextureType`] variants, after
//! which its level storage has that variant's shape.
//!
//! Every texture carries a derived [`TextureView`]: the run of mip levels a
//! sampler would see and whether that run is complete. The view is rebuilt
//! whenever level storage, the base/max level or the minification filter
//! changes.

use alloc::collections::btree_map::Entry;
use alloc::collections::BTreeMap;

use refgl_core::enums::*;
use refgl_core::limits::max_level_for_size;
use refgl_core::{GLenum, Handle, TextureFormat};

use crate::pixel::PixelBuffer;

/// Handle to a [`Texture`]
pub type TextureHandle = Handle<Texture>;

// =============================================================================
// TARGETS
// =============================================================================

/// Texture type, fixed at first bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    /// `GL_TEXTURE_2D`
    Texture2D,
    /// `GL_TEXTURE_CUBE_MAP`
    CubeMap,
    /// `GL_TEXTURE_2D_ARRAY`
    Texture2DArray,
    /// `GL_TEXTURE_3D`
    Texture3D,
    /// `GL_TEXTURE_CUBE_MAP_ARRAY`
    CubeMapArray,
}

impl TextureType {
    /// All types, in binding-table order
    pub const ALL: [Self; 5] = [
        Self::Texture2D,
        Self::CubeMap,
        Self::Texture2DArray,
        Self::Texture3D,
        Self::CubeMapArray,
    ];

    /// Parse a bind target
    pub fn from_gl(target: GLenum) -> Option<Self> {
        Some(match target {
            GL_TEXTURE_2D => Self::Texture2D,
            GL_TEXTURE_CUBE_MAP => Self::CubeMap,
            GL_TEXTURE_2D_ARRAY => Self::Texture2DArray,
            GL_TEXTURE_3D => Self::Texture3D,
            GL_TEXTURE_CUBE_MAP_ARRAY => Self::CubeMapArray,
            _ => return None,
        })
    }

    /// GL bind target
    pub const fn to_gl(self) -> GLenum {
        match self {
            Self::Texture2D => GL_TEXTURE_2D,
            Self::CubeMap => GL_TEXTURE_CUBE_MAP,
            Self::Texture2DArray => GL_TEXTURE_2D_ARRAY,
            Self::Texture3D => GL_TEXTURE_3D,
            Self::CubeMapArray => GL_TEXTURE_CUBE_MAP_ARRAY,
        }
    }

    /// Type matching a `GL_TEXTURE_BINDING_*` query
    pub fn from_binding_query(pname: GLenum) -> Option<Self> {
        Some(match pname {
            GL_TEXTURE_BINDING_2D => Self::Texture2D,
            GL_TEXTURE_BINDING_CUBE_MAP => Self::CubeMap,
            GL_TEXTURE_BINDING_2D_ARRAY => Self::Texture2DArray,
            GL_TEXTURE_BINDING_3D => Self::Texture3D,
            GL_TEXTURE_BINDING_CUBE_MAP_ARRAY => Self::CubeMapArray,
            _ => return None,
        })
    }

    /// Index into per-unit binding tables
    pub const fn index(self) -> usize {
        match self {
            Self::Texture2D => 0,
            Self::CubeMap => 1,
            Self::Texture2DArray => 2,
            Self::Texture3D => 3,
            Self::CubeMapArray => 4,
        }
    }

    /// Layered types, attachable with a layer index
    pub const fn is_layered(self) -> bool {
        matches!(self, Self::Texture2DArray | Self::Texture3D | Self::CubeMapArray)
    }
}

/// Cube map face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    /// +X face
    PositiveX,
    /// -X face
    NegativeX,
    /// +Y face
    PositiveY,
    /// -Y face
    NegativeY,
    /// +Z face
    PositiveZ,
    /// -Z face
    NegativeZ,
}

impl CubeFace {
    /// Faces in GL enum order
    pub const ALL: [Self; 6] = [
        Self::PositiveX,
        Self::NegativeX,
        Self::PositiveY,
        Self::NegativeY,
        Self::PositiveZ,
        Self::NegativeZ,
    ];

    /// Parse a face target
    pub fn from_gl(target: GLenum) -> Option<Self> {
        let index = target.checked_sub(GL_TEXTURE_CUBE_MAP_POSITIVE_X)?;
        Self::ALL.get(index as usize).copied()
    }

    /// GL face target
    pub const fn to_gl(self) -> GLenum {
        GL_TEXTURE_CUBE_MAP_POSITIVE_X + self.index() as GLenum
    }

    /// Face index, 0..6
    pub const fn index(self) -> usize {
        match self {
            Self::PositiveX => 0,
            Self::NegativeX => 1,
            Self::PositiveY => 2,
            Self::NegativeY => 3,
            Self::PositiveZ => 4,
            Self::NegativeZ => 5,
        }
    }
}

/// 2D image target (`texImage2D`, `framebufferTexture2D`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageTarget2D {
    /// `GL_TEXTURE_2D`
    Texture2D,
    /// One face of a cube map
    Face(CubeFace),
}

impl ImageTarget2D {
    /// Parse a 2D image target
    pub fn from_gl(target: GLenum) -> Option<Self> {
        if target == GL_TEXTURE_2D {
            return Some(Self::Texture2D);
        }
        CubeFace::from_gl(target).map(Self::Face)
    }

    /// Texture type the target addresses
    pub const fn texture_type(self) -> TextureType {
        match self {
            Self::Texture2D => TextureType::Texture2D,
            Self::Face(_) => TextureType::CubeMap,
        }
    }

    /// Face, if this is a cube face target
    pub const fn face(self) -> Option<CubeFace> {
        match self {
            Self::Texture2D => None,
            Self::Face(face) => Some(face),
        }
    }
}

// =============================================================================
// SAMPLER STATE
// =============================================================================

/// Check if filter uses mipmaps
pub fn filter_uses_mipmaps(filter: GLenum) -> bool {
    matches!(
        filter,
        GL_NEAREST_MIPMAP_NEAREST
            | GL_LINEAR_MIPMAP_NEAREST
            | GL_NEAREST_MIPMAP_LINEAR
            | GL_LINEAR_MIPMAP_LINEAR
    )
}

/// Calculate mip level dimensions
pub fn mip_dimensions(width: u32, height: u32, depth: u32, level: u32) -> (u32, u32, u32) {
    let shift = |size: u32| size.checked_shr(level).unwrap_or(0).max(1);
    (shift(width), shift(height), shift(depth))
}

/// Per-texture sampling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerState {
    /// S wrap mode
    pub wrap_s: GLenum,
    /// T wrap mode
    pub wrap_t: GLenum,
    /// R wrap mode
    pub wrap_r: GLenum,
    /// Minification filter
    pub min_filter: GLenum,
    /// Magnification filter
    pub mag_filter: GLenum,
    /// Minimum LOD
    pub min_lod: f32,
    /// Maximum LOD
    pub max_lod: f32,
    /// `GL_NONE` or `GL_COMPARE_REF_TO_TEXTURE`
    pub compare_mode: GLenum,
    /// Depth compare function
    pub compare_func: GLenum,
    /// Border color
    pub border_color: [f32; 4],
}

impl Default for SamplerState {
    fn default() -> Self {
        Self {
            wrap_s: GL_REPEAT,
            wrap_t: GL_REPEAT,
            wrap_r: GL_REPEAT,
            min_filter: GL_NEAREST_MIPMAP_LINEAR,
            mag_filter: GL_LINEAR,
            min_lod: -1000.0,
            max_lod: 1000.0,
            compare_mode: GL_NONE,
            compare_func: GL_LEQUAL,
            border_color: [0.0; 4],
        }
    }
}

// =============================================================================
// LEVEL STORAGE
// =============================================================================

/// Sparse mip level storage. A level exists with complete storage or not
/// at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureLevelArray {
    levels: BTreeMap<u32, PixelBuffer>,
}

impl TextureLevelArray {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Level exists
    pub fn has_level(&self, level: u32) -> bool {
        self.levels.contains_key(&level)
    }

    /// Level storage
    pub fn level(&self, level: u32) -> Option<&PixelBuffer> {
        self.levels.get(&level)
    }

    /// Mutable level storage
    pub fn level_mut(&mut self, level: u32) -> Option<&mut PixelBuffer> {
        self.levels.get_mut(&level)
    }

    /// (Re)allocate a level as zeroed storage
    pub fn alloc_level(
        &mut self,
        level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    ) -> &mut PixelBuffer {
        log::trace!(
            "Allocating texture level {} ({}x{}x{} {:?})",
            level,
            width,
            height,
            depth,
            format
        );
        let buffer = PixelBuffer::new(format, width, height, depth);
        match self.levels.entry(level) {
            Entry::Occupied(mut entry) => {
                entry.insert(buffer);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(buffer),
        }
    }

    /// Drop a level
    pub fn clear_level(&mut self, level: u32) {
        self.levels.remove(&level);
    }

    /// Drop every level
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Number of allocated levels
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// No levels allocated
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// =============================================================================
// TEXTURE
// =============================================================================

/// Variant-specific storage
#[derive(Debug, Clone, PartialEq)]
pub enum TextureKind {
    /// 2D texture, depth 1
    Texture2D(TextureLevelArray),
    /// Cube map, one level array per face
    CubeMap([TextureLevelArray; 6]),
    /// 2D array, depth = layers
    Texture2DArray(TextureLevelArray),
    /// 3D texture
    Texture3D(TextureLevelArray),
    /// Cube map array, depth = layer-faces (multiple of 6)
    CubeMapArray(TextureLevelArray),
}

impl TextureKind {
    /// Empty storage for `ty`
    pub fn new(ty: TextureType) -> Self {
        match ty {
            TextureType::Texture2D => Self::Texture2D(TextureLevelArray::new()),
            TextureType::CubeMap => Self::CubeMap(Default::default()),
            TextureType::Texture2DArray => Self::Texture2DArray(TextureLevelArray::new()),
            TextureType::Texture3D => Self::Texture3D(TextureLevelArray::new()),
            TextureType::CubeMapArray => Self::CubeMapArray(TextureLevelArray::new()),
        }
    }

    /// Type of this storage
    pub const fn texture_type(&self) -> TextureType {
        match self {
            Self::Texture2D(_) => TextureType::Texture2D,
            Self::CubeMap(_) => TextureType::CubeMap,
            Self::Texture2DArray(_) => TextureType::Texture2DArray,
            Self::Texture3D(_) => TextureType::Texture3D,
            Self::CubeMapArray(_) => TextureType::CubeMapArray,
        }
    }
}

/// Mip levels visible to sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextureView {
    /// First level
    pub base_level: u32,
    /// Consecutive consistent levels starting at `base_level`
    pub num_levels: u32,
    /// All levels required by the current filter are present
    pub complete: bool,
}

/// Outcome of checking a texture against a bind target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindCheck {
    /// Already of the requested type
    Matches,
    /// Untyped; binding fixes the type
    Untyped,
    /// Typed differently
    Mismatch,
}

/// Texture object
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    /// Storage was specified with `texStorage*`
    pub immutable: bool,
    /// Level count given to `texStorage*`
    pub immutable_levels: u32,
    /// `GL_TEXTURE_BASE_LEVEL`
    pub base_level: u32,
    /// `GL_TEXTURE_MAX_LEVEL`
    pub max_level: u32,
    /// Sampling parameters
    pub sampler: SamplerState,
    view: TextureView,
    kind: Option<TextureKind>,
}

impl Default for Texture {
    fn default() -> Self {
        Self {
            immutable: false,
            immutable_levels: 0,
            base_level: 0,
            max_level: 1000,
            sampler: SamplerState::default(),
            view: TextureView::default(),
            kind: None,
        }
    }
}

impl Texture {
    /// Untyped texture, as returned by object creation
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture already fixed to `ty`
    pub fn with_type(ty: TextureType) -> Self {
        Self {
            kind: Some(TextureKind::new(ty)),
            ..Self::default()
        }
    }

    /// Type, if fixed
    pub fn texture_type(&self) -> Option<TextureType> {
        self.kind.as_ref().map(TextureKind::texture_type)
    }

    /// Variant storage, if typed
    pub fn kind(&self) -> Option<&TextureKind> {
        self.kind.as_ref()
    }

    /// Compare against a bind target without changing anything
    pub fn check_bind(&self, ty: TextureType) -> BindCheck {
        match self.texture_type() {
            None => BindCheck::Untyped,
            Some(current) if current == ty => BindCheck::Matches,
            Some(_) => BindCheck::Mismatch,
        }
    }

    /// Fix the type of an untyped texture
    pub fn init_type(&mut self, ty: TextureType) {
        assert!(self.kind.is_none(), "texture type already fixed");
        self.kind = Some(TextureKind::new(ty));
        self.update_view();
    }

    /// Current sampling view
    pub fn view(&self) -> TextureView {
        self.view
    }

    /// Complete for the current filter and level range
    pub fn is_complete(&self) -> bool {
        self.view.complete
    }

    /// Level array for `face` (`None` for non-cube types)
    pub fn levels(&self, face: Option<CubeFace>) -> Option<&TextureLevelArray> {
        match (self.kind.as_ref()?, face) {
            (TextureKind::CubeMap(faces), Some(face)) => Some(&faces[face.index()]),
            (TextureKind::CubeMap(_), None) | (_, Some(_)) => None,
            (
                TextureKind::Texture2D(levels)
                | TextureKind::Texture2DArray(levels)
                | TextureKind::Texture3D(levels)
                | TextureKind::CubeMapArray(levels),
                None,
            ) => Some(levels),
        }
    }

    fn levels_mut(&mut self, face: Option<CubeFace>) -> &mut TextureLevelArray {
        match (self.kind.as_mut(), face) {
            (Some(TextureKind::CubeMap(faces)), Some(face)) => &mut faces[face.index()],
            (
                Some(
                    TextureKind::Texture2D(levels)
                    | TextureKind::Texture2DArray(levels)
                    | TextureKind::Texture3D(levels)
                    | TextureKind::CubeMapArray(levels),
                ),
                None,
            ) => levels,
            (kind, face) => unreachable!(
                "level access {:?} on {:?}",
                face,
                kind.map(|k| k.texture_type())
            ),
        }
    }

    /// Storage of one level
    pub fn level(&self, face: Option<CubeFace>, level: u32) -> Option<&PixelBuffer> {
        self.levels(face)?.level(level)
    }

    /// Mutable storage of one existing level. Overwriting texel contents
    /// leaves the view unchanged.
    pub fn level_mut(&mut self, face: Option<CubeFace>, level: u32) -> Option<&mut PixelBuffer> {
        self.kind.as_ref()?;
        self.levels_mut(face).level_mut(level)
    }

    /// (Re)allocate one zeroed level and rebuild the view
    pub fn alloc_level(
        &mut self,
        face: Option<CubeFace>,
        level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
    ) {
        self.alloc_level_with(face, level, format, width, height, depth, |_| {});
    }

    /// (Re)allocate one level, let `fill` initialize it, then rebuild the view
    pub fn alloc_level_with<F>(
        &mut self,
        face: Option<CubeFace>,
        level: u32,
        format: TextureFormat,
        width: u32,
        height: u32,
        depth: u32,
        fill: F,
    ) where
        F: FnOnce(&mut PixelBuffer),
    {
        let buffer = self
            .levels_mut(face)
            .alloc_level(level, format, width, height, depth);
        fill(buffer);
        self.update_view();
    }

    /// Drop every level of every face and rebuild the view
    pub fn clear_levels(&mut self) {
        match self.kind.as_mut() {
            Some(TextureKind::CubeMap(faces)) => faces.iter_mut().for_each(TextureLevelArray::clear),
            Some(
                TextureKind::Texture2D(levels)
                | TextureKind::Texture2DArray(levels)
                | TextureKind::Texture3D(levels)
                | TextureKind::CubeMapArray(levels),
            ) => levels.clear(),
            None => {}
        }
        self.update_view();
    }

    /// Rebuild the sampling view from current storage and parameters
    pub fn update_view(&mut self) {
        self.view = self.compute_view();
    }

    fn compute_view(&self) -> TextureView {
        let base_level = self.base_level;
        let incomplete = TextureView {
            base_level,
            num_levels: 0,
            complete: false,
        };

        let Some(kind) = self.kind.as_ref() else {
            return incomplete;
        };

        let (first, faces): (&TextureLevelArray, &[TextureLevelArray]) = match kind {
            TextureKind::CubeMap(faces) => (&faces[0], &faces[..]),
            TextureKind::Texture2D(levels)
            | TextureKind::Texture2DArray(levels)
            | TextureKind::Texture3D(levels)
            | TextureKind::CubeMapArray(levels) => (levels, core::slice::from_ref(levels)),
        };

        let Some(base) = first.level(base_level) else {
            return incomplete;
        };
        let (width, height, depth) = (base.width(), base.height(), base.depth());
        let format = base.format();

        let is_3d = matches!(kind, TextureKind::Texture3D(_));
        let max_dim = if is_3d {
            width.max(height).max(depth)
        } else {
            width.max(height)
        };

        let required = if filter_uses_mipmaps(self.sampler.min_filter) {
            if self.max_level < base_level {
                return incomplete;
            }
            (self.max_level - base_level + 1).min(max_level_for_size(max_dim) + 1)
        } else {
            1
        };

        let mut num_levels = 0;
        'levels: for i in 0..required {
            let (w, h, d) = mip_dimensions(width, height, depth, i);
            let expected_depth = if is_3d { d } else { depth };
            for levels in faces {
                let consistent = levels.level(base_level + i).is_some_and(|buffer| {
                    buffer.format() == format
                        && buffer.width() == w
                        && buffer.height() == h
                        && buffer.depth() == expected_depth
                });
                if !consistent {
                    break 'levels;
                }
            }
            num_levels += 1;
        }

        let mut complete = num_levels == required;
        if matches!(kind, TextureKind::CubeMap(_)) {
            complete &= width == height;
        }
        if matches!(kind, TextureKind::CubeMapArray(_)) {
            complete &= width == height && depth % 6 == 0;
        }

        TextureView {
            base_level,
            num_levels,
            complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refgl_core::{ChannelOrder, ChannelType};

    fn rgba8() -> TextureFormat {
        TextureFormat::new(ChannelOrder::RGBA, ChannelType::UnormInt8)
    }

    fn full_chain(texture: &mut Texture, face: Option<CubeFace>, size: u32) {
        let mut level = 0;
        loop {
            let (w, h, _) = mip_dimensions(size, size, 1, level);
            texture.alloc_level(face, level, rgba8(), w, h, 1);
            if w == 1 && h == 1 {
                break;
            }
            level += 1;
        }
    }

    #[test]
    fn test_sampler_defaults() {
        let sampler = SamplerState::default();
        assert_eq!(sampler.wrap_s, GL_REPEAT);
        assert_eq!(sampler.min_filter, GL_NEAREST_MIPMAP_LINEAR);
        assert_eq!(sampler.mag_filter, GL_LINEAR);
        assert_eq!(sampler.compare_mode, GL_NONE);
        assert_eq!(sampler.border_color, [0.0; 4]);
    }

    #[test]
    fn test_bind_check() {
        let mut texture = Texture::new();
        assert_eq!(texture.check_bind(TextureType::Texture3D), BindCheck::Untyped);
        texture.init_type(TextureType::Texture3D);
        assert_eq!(texture.check_bind(TextureType::Texture3D), BindCheck::Matches);
        assert_eq!(texture.check_bind(TextureType::Texture2D), BindCheck::Mismatch);
    }

    #[test]
    fn test_mipmapped_completeness() {
        let mut texture = Texture::with_type(TextureType::Texture2D);
        texture.alloc_level(None, 0, rgba8(), 4, 4, 1);
        assert!(!texture.is_complete());
        assert_eq!(texture.view().num_levels, 1);

        texture.alloc_level(None, 1, rgba8(), 2, 2, 1);
        texture.alloc_level(None, 2, rgba8(), 1, 1, 1);
        assert!(texture.is_complete());
        assert_eq!(texture.view().num_levels, 3);
    }

    #[test]
    fn test_wrong_level_size_is_incomplete() {
        let mut texture = Texture::with_type(TextureType::Texture2D);
        texture.alloc_level(None, 0, rgba8(), 4, 4, 1);
        texture.alloc_level(None, 1, rgba8(), 3, 2, 1);
        texture.alloc_level(None, 2, rgba8(), 1, 1, 1);
        assert!(!texture.is_complete());
        assert_eq!(texture.view().num_levels, 1);
    }

    #[test]
    fn test_view_follows_filter_and_level_range() {
        let mut texture = Texture::with_type(TextureType::Texture2D);
        texture.alloc_level(None, 0, rgba8(), 8, 8, 1);
        assert!(!texture.is_complete());

        texture.sampler.min_filter = GL_LINEAR;
        texture.update_view();
        assert!(texture.is_complete());
        assert_eq!(texture.view().num_levels, 1);

        texture.sampler.min_filter = GL_LINEAR_MIPMAP_LINEAR;
        texture.max_level = 0;
        texture.update_view();
        assert!(texture.is_complete());

        texture.base_level = 1;
        texture.max_level = 1000;
        texture.update_view();
        assert!(!texture.is_complete());
    }

    #[test]
    fn test_cube_needs_every_face() {
        let mut texture = Texture::with_type(TextureType::CubeMap);
        for face in &CubeFace::ALL[..5] {
            full_chain(&mut texture, Some(*face), 4);
        }
        assert!(!texture.is_complete());
        full_chain(&mut texture, Some(CubeFace::NegativeZ), 4);
        assert!(texture.is_complete());
    }

    #[test]
    fn test_3d_levels_halve_depth() {
        let mut texture = Texture::with_type(TextureType::Texture3D);
        texture.sampler.min_filter = GL_NEAREST_MIPMAP_NEAREST;
        texture.alloc_level(None, 0, rgba8(), 2, 2, 4);
        texture.alloc_level(None, 1, rgba8(), 1, 1, 2);
        assert!(!texture.is_complete());
        texture.alloc_level(None, 2, rgba8(), 1, 1, 1);
        assert!(texture.is_complete());
    }

    #[test]
    fn test_face_targets() {
        assert_eq!(
            CubeFace::from_gl(GL_TEXTURE_CUBE_MAP_NEGATIVE_Y),
            Some(CubeFace::NegativeY)
        );
        assert_eq!(CubeFace::from_gl(GL_TEXTURE_CUBE_MAP), None);
        assert_eq!(CubeFace::from_gl(GL_TEXTURE_CUBE_MAP_NEGATIVE_Z + 1), None);
        assert_eq!(
            ImageTarget2D::from_gl(GL_TEXTURE_CUBE_MAP_POSITIVE_Z),
            Some(ImageTarget2D::Face(CubeFace::PositiveZ))
        );
        assert_eq!(ImageTarget2D::from_gl(GL_TEXTURE_3D), None);
    }
}
