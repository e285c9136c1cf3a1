//! # Error Handling
//!
//! Two error families live here:
//! - [`GlError`]: the GL error kinds a context latches in its sticky slot
//! - [`FormatError`]: failures at the format-mapping seam

use core::fmt;

use crate::enums::*;
use crate::types::GLenum;

// =============================================================================
// RESULT TYPE
// =============================================================================

/// Result type for format mapping
pub type Result<T> = core::result::Result<T, FormatError>;

// =============================================================================
// GL ERROR
// =============================================================================

/// GL error kind recorded by a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GlError {
    /// No error recorded
    #[default]
    NoError,
    /// An enum argument is outside its accepted set
    InvalidEnum,
    /// A numeric argument is out of range
    InvalidValue,
    /// The operation is not allowed in the current state
    InvalidOperation,
    /// Storage could not be allocated
    OutOfMemory,
}

impl GlError {
    /// GL error code
    pub const fn code(self) -> GLenum {
        match self {
            Self::NoError => GL_NO_ERROR,
            Self::InvalidEnum => GL_INVALID_ENUM,
            Self::InvalidValue => GL_INVALID_VALUE,
            Self::InvalidOperation => GL_INVALID_OPERATION,
            Self::OutOfMemory => GL_OUT_OF_MEMORY,
        }
    }

    /// Decode a GL error code
    pub const fn from_code(code: GLenum) -> Option<Self> {
        match code {
            GL_NO_ERROR => Some(Self::NoError),
            GL_INVALID_ENUM => Some(Self::InvalidEnum),
            GL_INVALID_VALUE => Some(Self::InvalidValue),
            GL_INVALID_OPERATION => Some(Self::InvalidOperation),
            GL_OUT_OF_MEMORY => Some(Self::OutOfMemory),
            _ => None,
        }
    }

    /// Whether this is an actual error
    pub const fn is_error(self) -> bool {
        !matches!(self, Self::NoError)
    }
}

impl fmt::Display for GlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoError => write!(f, "GL_NO_ERROR"),
            Self::InvalidEnum => write!(f, "GL_INVALID_ENUM"),
            Self::InvalidValue => write!(f, "GL_INVALID_VALUE"),
            Self::InvalidOperation => write!(f, "GL_INVALID_OPERATION"),
            Self::OutOfMemory => write!(f, "GL_OUT_OF_MEMORY"),
        }
    }
}

// =============================================================================
// FORMAT ERROR
// =============================================================================

/// Format mapping failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatError {
    /// Internal format enum has no generic equivalent
    UnknownInternalFormat(GLenum),
    /// Transfer format/type pair has no generic equivalent
    UnknownTransferFormat {
        /// Pixel format enum
        format: GLenum,
        /// Data type enum
        data_type: GLenum,
    },
    /// Generic format cannot be expressed as a transfer format
    NoTransferFormat,
    /// Generic format cannot be expressed as a sized internal format
    NoInternalFormat,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownInternalFormat(format) => {
                write!(f, "unknown internal format 0x{:04x}", format)
            }
            Self::UnknownTransferFormat { format, data_type } => write!(
                f,
                "unknown transfer format 0x{:04x} / type 0x{:04x}",
                format, data_type
            ),
            Self::NoTransferFormat => write!(f, "no matching transfer format"),
            Self::NoInternalFormat => write!(f, "no matching internal format"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for FormatError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(GlError::InvalidEnum.code(), 0x0500);
        assert_eq!(GlError::InvalidValue.code(), 0x0501);
        assert_eq!(GlError::InvalidOperation.code(), 0x0502);
        assert_eq!(GlError::from_code(0x0502), Some(GlError::InvalidOperation));
        assert_eq!(GlError::from_code(0x0505), Some(GlError::OutOfMemory));
        assert_eq!(GlError::from_code(0x0503), None);
        assert!(!GlError::NoError.is_error());
    }
}
