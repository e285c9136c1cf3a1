//! # Program Objects
//!
//! Shader compilation is external to the reference context, so a program
//! object only tracks its lifetime: deleting the current program defers
//! destruction until it stops being current.

use refgl_core::Handle;

/// Handle to a [`Program`]
pub type ProgramHandle = Handle<Program>;

/// Program object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Program {
    /// `deleteProgram` was called while the program was current
    pub delete_flag: bool,
}

impl Program {
    /// Fresh program
    pub fn new() -> Self {
        Self::default()
    }
}
