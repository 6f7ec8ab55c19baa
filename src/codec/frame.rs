//! Safe wrapper around FFmpeg AVFrame
//!
//! Provides RAII-based memory management and safe access to frame data.

use crate::ffi::{
  self,
  accessors::{
    ffframe_data, ffframe_data_const, ffframe_get_format, ffframe_get_height, ffframe_get_pts,
    ffframe_get_width, ffframe_linesize, ffframe_set_format, ffframe_set_height, ffframe_set_pts,
    ffframe_set_width,
  },
  avutil::{av_frame_alloc, av_frame_free, av_frame_get_buffer, av_frame_make_writable},
  AVFrame, AVPixelFormat,
};
use std::ptr::NonNull;

use super::CodecError;

/// Buffer alignment for video frame storage, in bytes
pub const FRAME_BUFFER_ALIGNMENT: i32 = 32;

/// Safe wrapper around AVFrame with RAII cleanup
pub struct Frame {
  ptr: NonNull<AVFrame>,
}

impl Frame {
  /// Allocate a new empty frame (no pixel storage until the decoder fills it)
  pub fn new() -> Result<Self, CodecError> {
    let ptr = unsafe { av_frame_alloc() };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr })
      .ok_or(CodecError::AllocationFailed("AVFrame"))
  }

  /// Allocate a frame with pixel storage for the given format and dimensions
  pub fn new_video(width: u32, height: u32, format: AVPixelFormat) -> Result<Self, CodecError> {
    let mut frame = Self::new()?;

    unsafe {
      ffframe_set_width(frame.as_mut_ptr(), width as i32);
      ffframe_set_height(frame.as_mut_ptr(), height as i32);
      ffframe_set_format(frame.as_mut_ptr(), format.as_raw());
    }

    let ret = unsafe { av_frame_get_buffer(frame.as_mut_ptr(), FRAME_BUFFER_ALIGNMENT) };
    ffi::check_error(ret)?;

    Ok(frame)
  }

  /// Get the raw pointer (for FFmpeg API calls)
  #[inline]
  pub fn as_ptr(&self) -> *const AVFrame {
    self.ptr.as_ptr()
  }

  /// Get the mutable raw pointer (for FFmpeg API calls)
  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVFrame {
    self.ptr.as_ptr()
  }

  // ========================================================================
  // Dimensions and Format
  // ========================================================================

  /// Get frame width
  #[inline]
  pub fn width(&self) -> u32 {
    unsafe { ffframe_get_width(self.as_ptr()) as u32 }
  }

  /// Get frame height
  #[inline]
  pub fn height(&self) -> u32 {
    unsafe { ffframe_get_height(self.as_ptr()) as u32 }
  }

  /// Get pixel format
  pub fn format(&self) -> AVPixelFormat {
    AVPixelFormat::from_raw(unsafe { ffframe_get_format(self.as_ptr()) })
  }

  // ========================================================================
  // Timestamps
  // ========================================================================

  /// Get presentation timestamp (in time_base units)
  #[inline]
  pub fn pts(&self) -> i64 {
    unsafe { ffframe_get_pts(self.as_ptr()) }
  }

  /// Set presentation timestamp
  #[inline]
  pub fn set_pts(&mut self, pts: i64) {
    unsafe { ffframe_set_pts(self.as_mut_ptr(), pts) }
  }

  // ========================================================================
  // Data Access
  // ========================================================================

  /// Get pointer to plane data
  pub fn data(&self, plane: usize) -> *const u8 {
    unsafe { ffframe_data_const(self.as_ptr(), plane as i32) }
  }

  /// Get mutable pointer to plane data
  pub fn data_mut(&mut self, plane: usize) -> *mut u8 {
    unsafe { ffframe_data(self.as_mut_ptr(), plane as i32) }
  }

  /// Get line size (stride) for a plane
  #[inline]
  pub fn linesize(&self, plane: usize) -> i32 {
    unsafe { ffframe_linesize(self.as_ptr(), plane as i32) }
  }

  /// Get mutable plane data as a slice
  ///
  /// Returns None if the plane doesn't exist or has no data. For 4:2:0
  /// formats the chroma planes are half height.
  pub fn plane_data_mut(&mut self, plane: usize) -> Option<&mut [u8]> {
    let format = self.format();
    let height = self.height() as usize;
    let linesize = self.linesize(plane);

    let ptr = self.data_mut(plane);
    if ptr.is_null() || linesize <= 0 {
      return None;
    }

    let rows = match plane {
      0 => height,
      1 | 2 if format == AVPixelFormat::YUV420P => height.div_ceil(2),
      1 | 2 => height,
      _ => return None,
    };

    let size = linesize as usize * rows;
    Some(unsafe { std::slice::from_raw_parts_mut(ptr, size) })
  }

  // ========================================================================
  // Lifecycle
  // ========================================================================

  /// Ensure the frame's buffers are writable, copying them if a codec still
  /// holds a reference
  pub fn make_writable(&mut self) -> Result<(), CodecError> {
    let ret = unsafe { av_frame_make_writable(self.as_mut_ptr()) };
    ffi::check_error(ret)?;
    Ok(())
  }
}

impl Drop for Frame {
  fn drop(&mut self) {
    unsafe {
      let mut ptr = self.ptr.as_ptr();
      av_frame_free(&mut ptr);
    }
  }
}

// Frame data can be sent between threads
unsafe impl Send for Frame {}

impl std::fmt::Debug for Frame {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Frame")
      .field("width", &self.width())
      .field("height", &self.height())
      .field("format", &self.format())
      .field("pts", &self.pts())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_frame_allocation() {
    let frame = Frame::new().unwrap();
    assert_eq!(frame.width(), 0);
    assert_eq!(frame.height(), 0);
  }

  #[test]
  fn test_video_frame_allocation() {
    let frame = Frame::new_video(1280, 720, AVPixelFormat::YUV420P).unwrap();
    assert_eq!(frame.width(), 1280);
    assert_eq!(frame.height(), 720);
    assert_eq!(frame.format(), AVPixelFormat::YUV420P);

    // All three planes must be backed by storage
    assert!(!frame.data(0).is_null());
    assert!(!frame.data(1).is_null());
    assert!(!frame.data(2).is_null());
  }

  #[test]
  fn test_chroma_plane_is_half_height() {
    let mut frame = Frame::new_video(64, 64, AVPixelFormat::YUV420P).unwrap();
    let luma_len = frame.plane_data_mut(0).unwrap().len();
    let chroma_len = frame.plane_data_mut(1).unwrap().len();
    assert!(chroma_len < luma_len);
  }
}
