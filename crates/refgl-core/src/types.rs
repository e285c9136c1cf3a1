//! # GL Types
//!
//! Scalar aliases matching the GL API and the generation-checked object
//! handle used for every resource owned by a context.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

// =============================================================================
// BASIC TYPES
// =============================================================================

/// GL boolean type
pub type GLboolean = bool;
/// GL int type
pub type GLint = i32;
/// GL unsigned int type
pub type GLuint = u32;
/// GL size type
pub type GLsizei = i32;
/// GL enum type
pub type GLenum = u32;
/// GL intptr type
pub type GLintptr = isize;
/// GL sizeiptr type
pub type GLsizeiptr = isize;
/// GL bitfield type
pub type GLbitfield = u32;
/// GL float type
pub type GLfloat = f32;

// =============================================================================
// OBJECT HANDLES
// =============================================================================

/// Handle to an object stored in a context arena.
///
/// A handle is an `(index, generation)` pair. When a slot is freed and later
/// reused its generation changes, so a handle kept across deletion never
/// resolves to the new occupant.
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

static_assertions::assert_eq_size!(Handle<()>, u64);

impl<T> Handle<T> {
    /// Create a handle from raw parts
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Slot generation at creation time
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Packed 64-bit representation, generation in the high half
    pub const fn to_bits(&self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_bits().hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = core::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "Handle<{}>({}v{})", short, self.index, self.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker;

    #[test]
    fn test_handle_equality_includes_generation() {
        let a: Handle<Marker> = Handle::new(3, 1);
        let b: Handle<Marker> = Handle::new(3, 2);
        assert_ne!(a, b);
        assert_eq!(a, Handle::new(3, 1));
    }

    #[test]
    fn test_handle_bits() {
        let h: Handle<Marker> = Handle::new(7, 2);
        assert_eq!(h.to_bits(), (2u64 << 32) | 7);
        assert_eq!(h.index(), 7);
        assert_eq!(h.generation(), 2);
    }
}
