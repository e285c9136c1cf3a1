//! # refgl: Software Reference Context
//!
//! GLES3/WebGL2-style context implemented entirely in software. It tracks
//! object bindings, validation and state exactly, and keeps every image in
//! CPU memory so a conformance harness can compare results against it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   ReferenceContext                          │
//! │                                                             │
//! │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────┐     │
//! │  │ Objects  │  │  State   │  │ Textures │  │  Error   │     │
//! │  │ (arenas) │  │ (GlState)│  │ (levels) │  │  (slot)  │     │
//! │  └──────────┘  └──────────┘  └──────────┘  └──────────┘     │
//! │        │              │             │                       │
//! │        ▼              ▼             ▼                       │
//! │  ┌──────────────────────────────────────────┐               │
//! │  │  Attachment Resolver  →  Readback, Blits │               │
//! │  └──────────────────────────────────────────┘               │
//! └────────────────────────────┼────────────────────────────────┘
//!                              ▼
//!                  Pixel Buffers (CPU memory)
//! ```
//!
//! Every entry point validates before it mutates. A failed call records a
//! [`GlError`] in the sticky error slot and leaves all state untouched.

#![no_std]
#![warn(missing_docs)]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

// =============================================================================
// MODULE EXPORTS
// =============================================================================

pub mod blit;
pub mod buffer;
pub mod config;
pub mod context;
pub mod framebuffer;
pub mod object;
pub mod pixel;
pub mod program;
pub mod readback;
pub mod resolve;
pub mod state;
pub mod texture;
pub mod vertex_array;

// Re-exports
pub use config::{ColorBufferFormat, ContextConfig};
pub use context::{PackDestination, Parameter, PixelSource, ReferenceContext};
pub use refgl_core::{enums, ContextLimits, FormatMapper, GlError, StandardFormats, TextureFormat};
pub use state::GlState;
