//! libavformat function declarations
//!
//! Provides muxing and demuxing functionality for container formats.

use super::types::*;
use std::os::raw::{c_char, c_int};

// ============================================================================
// Opaque Types (format-specific)
// ============================================================================

/// Opaque AVFormatContext structure (muxer/demuxer context)
#[repr(C)]
pub struct AVFormatContext {
  _opaque: [u8; 0],
  _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVOutputFormat structure (output format descriptor)
#[repr(C)]
pub struct AVOutputFormat {
  _opaque: [u8; 0],
  _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVInputFormat structure (input format descriptor)
#[repr(C)]
pub struct AVInputFormat {
  _opaque: [u8; 0],
  _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVIOContext structure (I/O abstraction)
#[repr(C)]
pub struct AVIOContext {
  _opaque: [u8; 0],
  _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVStream structure (stream within container)
#[repr(C)]
pub struct AVStream {
  _opaque: [u8; 0],
  _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVCodecParameters structure (stream codec parameters)
#[repr(C)]
pub struct AVCodecParameters {
  _opaque: [u8; 0],
  _marker: std::marker::PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

unsafe extern "C" {
  // ========================================================================
  // Input Context (Demuxing)
  // ========================================================================

  /// Open an input stream and read the header
  ///
  /// # Arguments
  /// * `ps` - Pointer to context (will be allocated if NULL)
  /// * `url` - URL/filename to open
  /// * `fmt` - Input format (NULL for auto-detect)
  /// * `options` - Demuxer options
  ///
  /// # Returns
  /// * 0 on success
  /// * Negative AVERROR on error
  pub fn avformat_open_input(
    ps: *mut *mut AVFormatContext,
    url: *const c_char,
    fmt: *const AVInputFormat,
    options: *mut *mut AVDictionary,
  ) -> c_int;

  /// Close an opened input AVFormatContext
  ///
  /// Frees the context and all its contents and sets *s to NULL.
  pub fn avformat_close_input(s: *mut *mut AVFormatContext);

  /// Read packets of a media file to get stream information
  ///
  /// # Returns
  /// * >= 0 on success
  /// * AVERROR_xxx on failure
  pub fn avformat_find_stream_info(
    ic: *mut AVFormatContext,
    options: *mut *mut AVDictionary,
  ) -> c_int;

  /// Find the "best" stream in the file
  ///
  /// # Arguments
  /// * `ic` - Format context
  /// * `type_` - Stream type (AVMEDIA_TYPE_VIDEO, AVMEDIA_TYPE_AUDIO, etc.)
  /// * `wanted_stream_nb` - Desired stream number, or -1 for automatic
  /// * `related_stream` - Related stream for disposition check
  /// * `decoder_ret` - Pointer to receive the decoder (can be NULL)
  /// * `flags` - Reserved (should be 0)
  ///
  /// # Returns
  /// * >= 0 on success (stream index)
  /// * AVERROR_STREAM_NOT_FOUND if not found
  pub fn av_find_best_stream(
    ic: *mut AVFormatContext,
    type_: c_int,
    wanted_stream_nb: c_int,
    related_stream: c_int,
    decoder_ret: *mut *const AVCodec,
    flags: c_int,
  ) -> c_int;

  /// Return the next frame of a stream
  ///
  /// # Returns
  /// * 0 on success
  /// * AVERROR_EOF at end of file
  /// * Negative AVERROR on error
  pub fn av_read_frame(s: *mut AVFormatContext, pkt: *mut AVPacket) -> c_int;

  // ========================================================================
  // Output Context (Muxing)
  // ========================================================================

  /// Allocate an AVFormatContext for output
  ///
  /// # Arguments
  /// * `ctx` - Pointer to receive the allocated context (set to NULL on failure)
  /// * `oformat` - Output format to use (can be NULL to auto-detect)
  /// * `format_name` - Short name of the format (e.g., "mp4")
  /// * `filename` - Filename for format detection (can be NULL)
  ///
  /// # Returns
  /// * >= 0 on success
  /// * AVERROR(ENOMEM) if allocation failed
  /// * AVERROR(EINVAL) if no format found
  pub fn avformat_alloc_output_context2(
    ctx: *mut *mut AVFormatContext,
    oformat: *const AVOutputFormat,
    format_name: *const c_char,
    filename: *const c_char,
  ) -> c_int;

  /// Free an AVFormatContext and all its streams
  ///
  /// # Safety
  /// The context pointer becomes invalid after this call
  pub fn avformat_free_context(ctx: *mut AVFormatContext);

  /// Add a new stream to the format context
  ///
  /// # Arguments
  /// * `ctx` - Format context
  /// * `codec` - Codec used by the stream (can be NULL)
  ///
  /// # Returns
  /// Pointer to newly created stream, or NULL on error
  pub fn avformat_new_stream(ctx: *mut AVFormatContext, codec: *const AVCodec) -> *mut AVStream;

  /// Write the stream header to the output file
  ///
  /// # Returns
  /// * >= 0 on success
  /// * Negative AVERROR on error
  pub fn avformat_write_header(ctx: *mut AVFormatContext, options: *mut *mut AVDictionary)
  -> c_int;

  /// Write a packet to the output file (interleaved)
  ///
  /// This function will buffer packets internally to ensure proper
  /// interleaving. Pass NULL to flush the interleaving queue.
  ///
  /// # Returns
  /// * 0 on success
  /// * Negative AVERROR on error
  pub fn av_interleaved_write_frame(ctx: *mut AVFormatContext, pkt: *mut AVPacket) -> c_int;

  /// Write the stream trailer to the output file
  ///
  /// Must be called after all packets have been written.
  ///
  /// # Returns
  /// * 0 on success
  /// * Negative AVERROR on error
  pub fn av_write_trailer(ctx: *mut AVFormatContext) -> c_int;

  // ========================================================================
  // File I/O
  // ========================================================================

  /// Open a file for I/O
  ///
  /// # Arguments
  /// * `s` - Pointer to receive the I/O context
  /// * `url` - URL/filename to open
  /// * `flags` - AVIO_FLAG_* flags
  ///
  /// # Returns
  /// * >= 0 on success
  /// * Negative AVERROR on error
  pub fn avio_open(s: *mut *mut AVIOContext, url: *const c_char, flags: c_int) -> c_int;

  /// Close an I/O context opened by avio_open
  ///
  /// # Returns
  /// * 0 on success
  /// * Negative AVERROR on error
  pub fn avio_close(s: *mut AVIOContext) -> c_int;

  // ========================================================================
  // Codec Parameters
  // ========================================================================

  /// Copy codec parameters from a codec context to AVCodecParameters
  pub fn avcodec_parameters_from_context(
    par: *mut AVCodecParameters,
    codec: *const AVCodecContext,
  ) -> c_int;

  /// Fill codec context with codec parameters
  pub fn avcodec_parameters_to_context(
    codec: *mut AVCodecContext,
    par: *const AVCodecParameters,
  ) -> c_int;
}

// ============================================================================
// Constants
// ============================================================================

/// AVIO flags
pub mod avio_flag {
  use std::os::raw::c_int;

  /// Read-only
  pub const READ: c_int = 1;
  /// Write-only
  pub const WRITE: c_int = 2;
}

/// Media types (for av_find_best_stream)
pub mod media_type {
  use std::os::raw::c_int;

  pub const UNKNOWN: c_int = -1;
  pub const VIDEO: c_int = 0;
  pub const AUDIO: c_int = 1;
  pub const DATA: c_int = 2;
  pub const SUBTITLE: c_int = 3;
  pub const ATTACHMENT: c_int = 4;
}

/// Output format flags
pub mod avfmt_flag {
  use std::os::raw::c_int;

  /// Format needs no file handle (and must not get one)
  pub const NOFILE: c_int = 0x0001;
  /// Format wants codec parameter sets in stream extradata
  pub const GLOBALHEADER: c_int = 0x0040;
}
