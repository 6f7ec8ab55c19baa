//! libavutil function declarations
//!
//! Provides utility functions for memory, frames, and general helpers.

use super::types::*;
use std::os::raw::{c_char, c_int, c_void};

unsafe extern "C" {
  // ========================================================================
  // Frame Management
  // ========================================================================

  /// Allocate an AVFrame and set its fields to default values
  pub fn av_frame_alloc() -> *mut AVFrame;

  /// Free the frame and any dynamically allocated objects in it
  pub fn av_frame_free(frame: *mut *mut AVFrame);

  /// Unreference all buffers referenced by frame and reset to defaults
  pub fn av_frame_unref(frame: *mut AVFrame);

  /// Allocate new buffers for video data based on frame format/dimensions
  ///
  /// # Arguments
  /// * `frame` - Frame with format, width, height set
  /// * `align` - Buffer size alignment (0 for default, 32 recommended for SIMD)
  pub fn av_frame_get_buffer(frame: *mut AVFrame, align: c_int) -> c_int;

  /// Ensure the frame is writable, copying data if needed
  pub fn av_frame_make_writable(frame: *mut AVFrame) -> c_int;

  // ========================================================================
  // Error Handling
  // ========================================================================

  /// Put a description of the AVERROR code errnum in errbuf
  ///
  /// # Returns
  /// 0 on success, negative if truncated
  pub fn av_strerror(errnum: c_int, errbuf: *mut c_char, errbuf_size: usize) -> c_int;

  // ========================================================================
  // Options
  // ========================================================================

  /// Set a named option on an object (e.g., a codec's private options)
  ///
  /// # Returns
  /// * 0 on success
  /// * AVERROR_OPTION_NOT_FOUND if the object has no such option
  pub fn av_opt_set(
    obj: *mut c_void,
    name: *const c_char,
    val: *const c_char,
    search_flags: c_int,
  ) -> c_int;

  // ========================================================================
  // Logging
  // ========================================================================

  /// Set the logging level
  pub fn av_log_set_level(level: c_int);
}

// ============================================================================
// Logging Levels
// ============================================================================

pub mod log_level {
  use std::os::raw::c_int;

  pub const QUIET: c_int = -8;
  pub const PANIC: c_int = 0;
  pub const FATAL: c_int = 8;
  pub const ERROR: c_int = 16;
  pub const WARNING: c_int = 24;
  pub const INFO: c_int = 32;
  pub const VERBOSE: c_int = 40;
  pub const DEBUG: c_int = 48;
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Set libav's own stderr log verbosity (safe wrapper)
pub fn set_native_log_level(level: c_int) {
  unsafe { av_log_set_level(level) }
}
