//! Safe Rust wrappers for FFmpeg codec operations
//!
//! This module provides RAII wrappers around FFmpeg's C structures,
//! ensuring proper resource cleanup and memory safety. Each wrapper owns
//! exactly one native resource and releases it in Drop, so a pipeline that
//! fails partway through initialization tears down exactly what it built.

pub mod context;
pub mod demuxer;
pub mod frame;
pub mod muxer;
pub mod packet;
pub mod scaler;

pub use context::{CodecContext, CodecType};
pub use demuxer::{DemuxerContext, MediaType, StreamInfo};
pub use frame::Frame;
pub use muxer::MuxerContext;
pub use packet::Packet;
pub use scaler::{ScaleAlgorithm, Scaler};

use crate::ffi::{AVCodecID, AVPixelFormat, AVRational};

/// Encoder configuration
///
/// Field-for-field what the pipeline derives from the decoder, plus the
/// fixed output choices (pixel format, preset) and the caller's thread hint.
#[derive(Debug, Clone)]
pub struct EncoderSettings {
  /// Video width in pixels
  pub width: u32,
  /// Video height in pixels
  pub height: u32,
  /// Sample aspect ratio (copied from the source stream)
  pub sample_aspect_ratio: AVRational,
  /// Pixel format the encoder will be fed
  pub pixel_format: AVPixelFormat,
  /// Encoder time base (inverse of the source frame rate)
  pub time_base: AVRational,
  /// Speed/quality preset, applied best-effort via the codec's private
  /// options (None for encoders without one)
  pub preset: Option<&'static str>,
  /// Number of encoder threads (0 for auto)
  pub thread_count: u32,
  /// Put parameter sets into stream extradata (required by MP4)
  pub global_header: bool,
}

/// Codec error type
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
  #[error("FFmpeg error: {0}")]
  Ffmpeg(#[from] crate::ffi::FFmpegError),

  #[error("Encoder not found for codec: {0:?}")]
  EncoderNotFound(AVCodecID),

  #[error("Decoder not found for codec: {0:?}")]
  DecoderNotFound(AVCodecID),

  #[error("Failed to allocate {0}")]
  AllocationFailed(&'static str),

  #[error("Invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("Invalid state: {0}")]
  InvalidState(String),
}

pub type CodecResult<T> = Result<T, CodecError>;
