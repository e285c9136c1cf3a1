//! # refgl Core
//!
//! Shared vocabulary for the refgl reference context: GL scalar types,
//! enum constants, the sticky error kinds, capability limits and the
//! generic pixel-format mapping seam.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       refgl-core                            │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │   Types     │  │   Enums     │  │      Error          │  │
//! │  │ (GLenum,    │  │ (GL_* code  │  │   (GlError,         │  │
//! │  │  Handle<T>) │  │  points)    │  │    FormatError)     │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! │  ┌──────────────────────────┐  ┌─────────────────────────┐  │
//! │  │  Limits (ContextLimits)  │  │ Format (FormatMapper)   │  │
//! │  └──────────────────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]

#[cfg(feature = "std")]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod enums;
pub mod error;
pub mod format;
pub mod limits;
pub mod types;

// Re-exports for convenience
pub use error::{FormatError, GlError, Result};
pub use format::{ChannelOrder, ChannelType, FormatMapper, StandardFormats, TextureFormat, TransferFormat};
pub use limits::ContextLimits;
pub use types::*;
