//! Safe wrapper around FFmpeg SwsContext
//!
//! Provides pixel format conversion and image scaling functionality.

use crate::ffi::{
  swscale::{sws_freeContext, sws_getContext, sws_scale, SWS_BICUBIC, SWS_BILINEAR,
    SWS_FAST_BILINEAR, SWS_LANCZOS, SWS_POINT},
  AVPixelFormat, SwsContext,
};
use std::ptr::NonNull;

use super::{CodecError, CodecResult, Frame};

/// Scaling algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleAlgorithm {
  /// Fast bilinear (fastest, lower quality)
  FastBilinear,
  /// Bilinear (good balance)
  #[default]
  Bilinear,
  /// Bicubic (higher quality, slower)
  Bicubic,
  /// Lanczos (highest quality, slowest)
  Lanczos,
  /// Point/nearest neighbor (fastest, blocky)
  Point,
}

impl ScaleAlgorithm {
  fn to_sws_flags(self) -> i32 {
    match self {
      ScaleAlgorithm::FastBilinear => SWS_FAST_BILINEAR,
      ScaleAlgorithm::Bilinear => SWS_BILINEAR,
      ScaleAlgorithm::Bicubic => SWS_BICUBIC,
      ScaleAlgorithm::Lanczos => SWS_LANCZOS,
      ScaleAlgorithm::Point => SWS_POINT,
    }
  }
}

/// Safe wrapper around SwsContext for pixel format conversion and scaling
///
/// The context itself is a stateless transform descriptor: each `scale` call
/// is independent of every other.
pub struct Scaler {
  ptr: NonNull<SwsContext>,
  src_width: u32,
  src_height: u32,
  src_format: AVPixelFormat,
  dst_width: u32,
  dst_height: u32,
  dst_format: AVPixelFormat,
}

impl Scaler {
  /// Create a new scaler for the given conversion
  pub fn new(
    src_width: u32,
    src_height: u32,
    src_format: AVPixelFormat,
    dst_width: u32,
    dst_height: u32,
    dst_format: AVPixelFormat,
    algorithm: ScaleAlgorithm,
  ) -> CodecResult<Self> {
    let ptr = unsafe {
      sws_getContext(
        src_width as i32,
        src_height as i32,
        src_format.as_raw(),
        dst_width as i32,
        dst_height as i32,
        dst_format.as_raw(),
        algorithm.to_sws_flags(),
        std::ptr::null_mut(),
        std::ptr::null_mut(),
        std::ptr::null(),
      )
    };

    NonNull::new(ptr)
      .map(|ptr| Self {
        ptr,
        src_width,
        src_height,
        src_format,
        dst_width,
        dst_height,
        dst_format,
      })
      .ok_or(CodecError::InvalidConfig(format!(
        "Cannot create scaler from {:?} {}x{} to {:?} {}x{}",
        src_format, src_width, src_height, dst_format, dst_width, dst_height
      )))
  }

  /// Scale/convert a frame
  ///
  /// The destination frame must already have buffers allocated with the
  /// scaler's destination format and dimensions. Timestamps are not copied;
  /// the caller decides what the converted frame's pts should be.
  pub fn scale(&self, src: &Frame, dst: &mut Frame) -> CodecResult<()> {
    if src.width() != self.src_width
      || src.height() != self.src_height
      || dst.width() != self.dst_width
      || dst.height() != self.dst_height
    {
      return Err(CodecError::InvalidConfig(
        "Frame dimensions don't match scaler configuration".into(),
      ));
    }

    let src_data: [*const u8; 4] = [src.data(0), src.data(1), src.data(2), src.data(3)];
    let src_linesize: [i32; 4] = [
      src.linesize(0),
      src.linesize(1),
      src.linesize(2),
      src.linesize(3),
    ];

    let dst_data: [*mut u8; 4] = [
      dst.data_mut(0),
      dst.data_mut(1),
      dst.data_mut(2),
      dst.data_mut(3),
    ];
    let dst_linesize: [i32; 4] = [
      dst.linesize(0),
      dst.linesize(1),
      dst.linesize(2),
      dst.linesize(3),
    ];

    let result = unsafe {
      sws_scale(
        self.ptr.as_ptr(),
        src_data.as_ptr(),
        src_linesize.as_ptr(),
        0,
        self.src_height as i32,
        dst_data.as_ptr(),
        dst_linesize.as_ptr(),
      )
    };

    if result != self.dst_height as i32 {
      return Err(CodecError::InvalidState(format!(
        "Scaling produced {} rows instead of {}",
        result, self.dst_height
      )));
    }

    Ok(())
  }

  // ========================================================================
  // Accessors
  // ========================================================================

  /// Get destination width
  pub fn dst_width(&self) -> u32 {
    self.dst_width
  }

  /// Get destination height
  pub fn dst_height(&self) -> u32 {
    self.dst_height
  }

  /// Get destination format
  pub fn dst_format(&self) -> AVPixelFormat {
    self.dst_format
  }
}

impl Drop for Scaler {
  fn drop(&mut self) {
    unsafe { sws_freeContext(self.ptr.as_ptr()) }
  }
}

// SwsContext is thread-safe for reading, but we don't share mutable access
unsafe impl Send for Scaler {}

impl std::fmt::Debug for Scaler {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Scaler")
      .field(
        "src",
        &format!(
          "{}x{} {:?}",
          self.src_width, self.src_height, self.src_format
        ),
      )
      .field(
        "dst",
        &format!(
          "{}x{} {:?}",
          self.dst_width, self.dst_height, self.dst_format
        ),
      )
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_scaler_creation() {
    let scaler = Scaler::new(
      1920,
      1080,
      AVPixelFormat::YUV420P,
      1280,
      720,
      AVPixelFormat::YUV420P,
      ScaleAlgorithm::Bicubic,
    );
    assert!(scaler.is_ok());
  }

  #[test]
  fn test_scale_rejects_mismatched_frames() {
    let scaler = Scaler::new(
      640,
      480,
      AVPixelFormat::YUV420P,
      640,
      480,
      AVPixelFormat::YUV420P,
      ScaleAlgorithm::Bicubic,
    )
    .unwrap();

    let src = Frame::new_video(320, 240, AVPixelFormat::YUV420P).unwrap();
    let mut dst = Frame::new_video(640, 480, AVPixelFormat::YUV420P).unwrap();
    assert!(matches!(
      scaler.scale(&src, &mut dst),
      Err(CodecError::InvalidConfig(_))
    ));
  }
}
