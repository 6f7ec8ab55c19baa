#![deny(clippy::all)]

//! Single-file video to H.265/HEVC MP4 conversion using FFmpeg.
//!
//! The crate wraps the FFmpeg C libraries in three layers: minimal
//! hand-written bindings ([`ffi`]), RAII resource wrappers ([`codec`]), and
//! the conversion pipeline itself ([`transcode`]), exposed through one
//! blocking entry point:
//!
//! ```ignore
//! hevconv::convert_to_h265("input.mkv", "output.mp4", 0)?;
//! ```

// FFmpeg C bindings (hand-written, no bindgen)
pub mod ffi;

// Safe codec wrappers (RAII)
pub mod codec;

// The conversion pipeline
pub mod transcode;

pub use transcode::{convert_to_h265, TranscodeError};
