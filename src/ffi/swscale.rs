//! libswscale function declarations
//!
//! Provides pixel format conversion and image scaling functionality.

use super::types::*;
use std::os::raw::c_int;

unsafe extern "C" {
  // ========================================================================
  // Context Management
  // ========================================================================

  /// Allocate and return an SwsContext
  ///
  /// # Arguments
  /// * `srcW` - Source width
  /// * `srcH` - Source height
  /// * `srcFormat` - Source pixel format
  /// * `dstW` - Destination width
  /// * `dstH` - Destination height
  /// * `dstFormat` - Destination pixel format
  /// * `flags` - Scaling algorithm flags (SWS_*)
  /// * `srcFilter` - Source filter (NULL for none)
  /// * `dstFilter` - Destination filter (NULL for none)
  /// * `param` - Extra parameters for scaling algorithm (NULL for defaults)
  pub fn sws_getContext(
    srcW: c_int,
    srcH: c_int,
    srcFormat: c_int,
    dstW: c_int,
    dstH: c_int,
    dstFormat: c_int,
    flags: c_int,
    srcFilter: *mut SwsFilter,
    dstFilter: *mut SwsFilter,
    param: *const f64,
  ) -> *mut SwsContext;

  /// Free the swscaler context
  pub fn sws_freeContext(swsContext: *mut SwsContext);

  // ========================================================================
  // Scaling Operations
  // ========================================================================

  /// Scale the image slice in srcSlice and put the resulting scaled
  /// slice in the image in dst
  ///
  /// # Arguments
  /// * `c` - The scaling context previously created with sws_getContext
  /// * `srcSlice` - Array of pointers to source plane data
  /// * `srcStride` - Array of source plane strides
  /// * `srcSliceY` - Position in source image of the slice to process
  /// * `srcSliceH` - Height of the source slice
  /// * `dst` - Array of pointers to destination plane data
  /// * `dstStride` - Array of destination plane strides
  ///
  /// # Returns
  /// Height of the output slice
  pub fn sws_scale(
    c: *mut SwsContext,
    srcSlice: *const *const u8,
    srcStride: *const c_int,
    srcSliceY: c_int,
    srcSliceH: c_int,
    dst: *const *mut u8,
    dstStride: *const c_int,
  ) -> c_int;
}

// ============================================================================
// Opaque Filter Type
// ============================================================================

/// Opaque SwsFilter structure
#[repr(C)]
pub struct SwsFilter {
  _opaque: [u8; 0],
}

// ============================================================================
// Scaling Algorithm Flags
// ============================================================================

/// Fast bilinear scaling (low quality, fast)
pub const SWS_FAST_BILINEAR: c_int = 1;

/// Bilinear scaling
pub const SWS_BILINEAR: c_int = 2;

/// Bicubic scaling (good quality, slower)
pub const SWS_BICUBIC: c_int = 4;

/// Nearest neighbor (point) scaling (fastest, blocky)
pub const SWS_POINT: c_int = 0x10;

/// Lanczos scaling (high quality, slowest)
pub const SWS_LANCZOS: c_int = 0x200;
