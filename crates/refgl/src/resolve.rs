//! # Attachment Resolver
//!
//! Maps a framebuffer attachment to the pixel storage behind it, for
//! reading ([`AttachmentSources`]) or writing ([`AttachmentTargets`]).
//! Resolution has no side effects; anything that cannot be resolved (no
//! attachment, a deleted object, a missing level or an out-of-range layer)
//! yields an empty view or `None`.

use crate::config::DefaultFramebuffer;
use crate::framebuffer::{
    Attachment, AttachmentImage, AttachmentObject, AttachmentPoint, Framebuffer, Renderbuffer,
};
use crate::object::ObjectTable;
use crate::pixel::{PixelView, PixelViewMut};
use crate::texture::{Texture, TextureKind};

/// Object tables an attachment can refer to
#[derive(Debug, Clone, Copy)]
pub struct AttachmentSources<'a> {
    /// Texture objects
    pub textures: &'a ObjectTable<Texture>,
    /// Renderbuffer objects
    pub renderbuffers: &'a ObjectTable<Renderbuffer>,
}

impl<'a> AttachmentSources<'a> {
    /// Storage behind `attachment`, or `None` when it does not resolve
    pub fn lookup(&self, attachment: &Attachment) -> Option<PixelView<'a>> {
        match attachment.object {
            AttachmentObject::None => None,
            AttachmentObject::Renderbuffer(handle) => {
                Some(self.renderbuffers.get(handle)?.storage().view())
            }
            AttachmentObject::Texture(handle) => {
                let texture = self.textures.get(handle)?;
                match texture.kind()? {
                    TextureKind::Texture2D(_) => Some(texture.level(None, attachment.level)?.view()),
                    TextureKind::CubeMap(_) => {
                        Some(texture.level(attachment.face, attachment.level)?.view())
                    }
                    TextureKind::Texture2DArray(_)
                    | TextureKind::Texture3D(_)
                    | TextureKind::CubeMapArray(_) => {
                        let view = texture.level(None, attachment.level)?.view();
                        (attachment.layer < view.depth()).then(|| view.slice(attachment.layer))
                    }
                }
            }
        }
    }

    /// Storage behind `attachment`, empty when it does not resolve
    pub fn resolve(&self, attachment: &Attachment) -> PixelView<'a> {
        self.lookup(attachment).unwrap_or_else(PixelView::empty)
    }

    /// Format and size behind `attachment`, for completeness checks
    pub fn describe(&self, attachment: &Attachment) -> Option<AttachmentImage> {
        self.lookup(attachment).map(|view| AttachmentImage {
            format: view.format(),
            width: view.width(),
            height: view.height(),
        })
    }
}

/// Mutable object tables an attachment can refer to
#[derive(Debug)]
pub struct AttachmentTargets<'a> {
    /// Texture objects
    pub textures: &'a mut ObjectTable<Texture>,
    /// Renderbuffer objects
    pub renderbuffers: &'a mut ObjectTable<Renderbuffer>,
}

impl<'a> AttachmentTargets<'a> {
    /// Writable storage behind `attachment`, or `None` when it does not
    /// resolve
    pub fn into_view(self, attachment: &Attachment) -> Option<PixelViewMut<'a>> {
        let Self {
            textures,
            renderbuffers,
        } = self;
        match attachment.object {
            AttachmentObject::None => None,
            AttachmentObject::Renderbuffer(handle) => {
                Some(renderbuffers.get_mut(handle)?.storage_mut().view_mut())
            }
            AttachmentObject::Texture(handle) => {
                let texture = textures.get_mut(handle)?;
                let (face, layered) = match texture.kind()? {
                    TextureKind::Texture2D(_) => (None, false),
                    TextureKind::CubeMap(_) => (attachment.face, false),
                    TextureKind::Texture2DArray(_)
                    | TextureKind::Texture3D(_)
                    | TextureKind::CubeMapArray(_) => (None, true),
                };
                let view = texture.level_mut(face, attachment.level)?.view_mut();
                if !layered {
                    return Some(view);
                }
                (attachment.layer < view.depth()).then(move || view.into_slice(attachment.layer))
            }
        }
    }
}

/// Resolve `point` of a framebuffer object
pub fn resolve_attachment<'a>(
    sources: AttachmentSources<'a>,
    framebuffer: &Framebuffer,
    point: AttachmentPoint,
) -> PixelView<'a> {
    sources.resolve(framebuffer.attachment(point))
}

/// Resolve `point` of the default framebuffer
pub fn resolve_default(default: &DefaultFramebuffer, point: AttachmentPoint) -> PixelView<'_> {
    let buffer = match point {
        AttachmentPoint::Color0 => Some(&default.color),
        AttachmentPoint::Depth => default.depth.as_ref(),
        AttachmentPoint::Stencil => default.stencil.as_ref(),
    };
    buffer.map_or_else(PixelView::empty, |buffer| buffer.view())
}

/// Writable `point` of the default framebuffer, `None` when it has no such
/// buffer
pub fn resolve_default_mut(default: &mut DefaultFramebuffer, point: AttachmentPoint) -> Option<PixelViewMut<'_>> {
    let buffer = match point {
        AttachmentPoint::Color0 => Some(&mut default.color),
        AttachmentPoint::Depth => default.depth.as_mut(),
        AttachmentPoint::Stencil => default.stencil.as_mut(),
    };
    buffer.map(|buffer| buffer.view_mut())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextConfig;
    use crate::texture::{CubeFace, TextureType};
    use refgl_core::enums::*;
    use refgl_core::{ChannelOrder, ChannelType, TextureFormat};

    fn rgba8() -> TextureFormat {
        TextureFormat::new(ChannelOrder::RGBA, ChannelType::UnormInt8)
    }

    #[test]
    fn test_none_and_stale_resolve_empty() {
        let mut textures = ObjectTable::new();
        let renderbuffers = ObjectTable::new();
        let handle = textures.insert(Texture::with_type(TextureType::Texture2D));
        textures.remove(handle);

        let sources = AttachmentSources {
            textures: &textures,
            renderbuffers: &renderbuffers,
        };
        assert!(sources.resolve(&Attachment::NONE).is_empty());
        assert!(sources.resolve(&Attachment::texture(handle, 0, None)).is_empty());
        assert!(sources.describe(&Attachment::texture(handle, 0, None)).is_none());
    }

    #[test]
    fn test_layer_of_array_level() {
        let mut texture = Texture::with_type(TextureType::Texture2DArray);
        texture.alloc_level_with(None, 0, rgba8(), 2, 2, 3, |buffer| {
            let mut view = buffer.view_mut();
            view.set_pixel([1.0, 0.0, 0.0, 1.0], 1, 1, 2);
        });
        let mut textures = ObjectTable::new();
        let renderbuffers = ObjectTable::new();
        let handle = textures.insert(texture);
        let sources = AttachmentSources {
            textures: &textures,
            renderbuffers: &renderbuffers,
        };

        let view = sources.resolve(&Attachment::texture_layer(handle, 0, 2));
        assert_eq!((view.width(), view.height(), view.depth()), (2, 2, 1));
        assert_eq!(view.get_pixel(1, 1, 0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(view.get_pixel(0, 0, 0), [0.0; 4]);

        assert!(sources.resolve(&Attachment::texture_layer(handle, 0, 3)).is_empty());
        assert!(sources.resolve(&Attachment::texture_layer(handle, 1, 0)).is_empty());
    }

    #[test]
    fn test_write_through_layer_attachment() {
        let mut texture = Texture::with_type(TextureType::Texture2DArray);
        texture.alloc_level(None, 0, rgba8(), 2, 2, 3);
        let mut textures = ObjectTable::new();
        let mut renderbuffers = ObjectTable::new();
        let handle = textures.insert(texture);

        let targets = AttachmentTargets {
            textures: &mut textures,
            renderbuffers: &mut renderbuffers,
        };
        match targets.into_view(&Attachment::texture_layer(handle, 0, 1)) {
            Some(mut view) => view.set_pixel([0.0, 0.0, 1.0, 1.0], 1, 0, 0),
            None => panic!("layer 1 should resolve"),
        }
        for attachment in [Attachment::texture_layer(handle, 0, 3), Attachment::NONE] {
            let targets = AttachmentTargets {
                textures: &mut textures,
                renderbuffers: &mut renderbuffers,
            };
            assert!(targets.into_view(&attachment).is_none());
        }

        let sources = AttachmentSources {
            textures: &textures,
            renderbuffers: &renderbuffers,
        };
        let layer = sources.resolve(&Attachment::texture_layer(handle, 0, 1));
        assert_eq!(layer.get_pixel(1, 0, 0), [0.0, 0.0, 1.0, 1.0]);
        let other = sources.resolve(&Attachment::texture_layer(handle, 0, 0));
        assert_eq!(other.get_pixel(1, 0, 0), [0.0; 4]);
    }

    #[test]
    fn test_cube_face() {
        let mut texture = Texture::with_type(TextureType::CubeMap);
        texture.alloc_level(Some(CubeFace::NegativeY), 0, rgba8(), 4, 4, 1);
        let mut textures = ObjectTable::new();
        let renderbuffers = ObjectTable::new();
        let handle = textures.insert(texture);
        let sources = AttachmentSources {
            textures: &textures,
            renderbuffers: &renderbuffers,
        };

        let image = sources.describe(&Attachment::texture(handle, 0, Some(CubeFace::NegativeY)));
        assert_eq!(image.map(|i| i.width), Some(4));
        assert!(sources
            .describe(&Attachment::texture(handle, 0, Some(CubeFace::PositiveX)))
            .is_none());
    }

    #[test]
    fn test_renderbuffer_and_default() {
        let mut renderbuffer = Renderbuffer::new();
        renderbuffer.set_storage(GL_RGBA8, rgba8(), 3, 5);
        let textures = ObjectTable::new();
        let mut renderbuffers = ObjectTable::new();
        let handle = renderbuffers.insert(renderbuffer);
        let sources = AttachmentSources {
            textures: &textures,
            renderbuffers: &renderbuffers,
        };
        let mut fbo = Framebuffer::new();
        fbo.set_attachment(AttachmentPoint::Color0, Attachment::renderbuffer(handle));
        let view = resolve_attachment(sources, &fbo, AttachmentPoint::Color0);
        assert_eq!((view.width(), view.height()), (3, 5));
        assert!(resolve_attachment(sources, &fbo, AttachmentPoint::Depth).is_empty());

        let default = DefaultFramebuffer::new(&ContextConfig::new(6, 7).with_depth_stencil(24, 0));
        assert_eq!(resolve_default(&default, AttachmentPoint::Color0).width(), 6);
        assert!(!resolve_default(&default, AttachmentPoint::Depth).is_empty());
        assert!(resolve_default(&default, AttachmentPoint::Stencil).is_empty());

        let mut default = default;
        assert!(resolve_default_mut(&mut default, AttachmentPoint::Stencil).is_none());
        if let Some(mut depth) = resolve_default_mut(&mut default, AttachmentPoint::Depth) {
            depth.set_depth(0.5, 2, 3, 0);
        }
        let depth = resolve_default(&default, AttachmentPoint::Depth);
        assert!((depth.get_depth(2, 3, 0) - 0.5).abs() < 1e-6);
    }
}
