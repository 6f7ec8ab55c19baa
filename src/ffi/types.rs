//! Core FFmpeg type definitions
//!
//! All FFmpeg structs are opaque (zero-sized) to avoid version-specific layout
//! dependencies. Field access is done via the thin C accessor library in
//! accessors.c

use std::ffi::CStr;
use std::marker::PhantomData;
use std::os::raw::c_int;

// ============================================================================
// Rational Number
// ============================================================================

/// Rational number for time bases and frame rates
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AVRational {
  /// Numerator
  pub num: c_int,
  /// Denominator
  pub den: c_int,
}

impl AVRational {
  pub const fn new(num: c_int, den: c_int) -> Self {
    Self { num, den }
  }

  /// Invert the rational (counterpart of av_inv_q)
  pub const fn inverse(self) -> Self {
    Self {
      num: self.den,
      den: self.num,
    }
  }

  /// Whether the numerator is zero (an unset frame rate or time base)
  pub const fn is_zero(&self) -> bool {
    self.num == 0
  }

  pub fn as_f64(&self) -> f64 {
    if self.den == 0 {
      0.0
    } else {
      self.num as f64 / self.den as f64
    }
  }
}

// ============================================================================
// Codec IDs
// ============================================================================

/// FFmpeg codec identifier
///
/// Kept as a transparent wrapper over the raw value: the demuxer hands us
/// whatever codec the input happens to carry, and the id is passed straight
/// back into avcodec_find_decoder. Named constants exist only for the codecs
/// this crate mentions by name.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AVCodecID(pub(crate) c_int);

impl AVCodecID {
  pub const NONE: Self = Self(0);
  /// MPEG-4 part 2 (present in every FFmpeg build, used by the test suite)
  pub const MPEG4: Self = Self(12);
  /// H.264 / AVC
  pub const H264: Self = Self(27);
  /// H.265 / HEVC
  pub const HEVC: Self = Self(173);

  /// Get the raw FFmpeg codec ID value
  pub const fn as_raw(self) -> c_int {
    self.0
  }

  /// Wrap a raw FFmpeg codec ID value
  pub const fn from_raw(raw: c_int) -> Self {
    Self(raw)
  }

  /// Short codec name as reported by libavcodec ("hevc", "mpeg4", ...)
  pub fn name(self) -> &'static str {
    unsafe {
      let ptr = super::avcodec::avcodec_get_name(self.0);
      if ptr.is_null() {
        "unknown"
      } else {
        CStr::from_ptr(ptr).to_str().unwrap_or("unknown")
      }
    }
  }
}

impl std::fmt::Debug for AVCodecID {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "AVCodecID({})", self.0)
  }
}

// ============================================================================
// Pixel Formats
// ============================================================================

/// FFmpeg pixel format
///
/// Transparent wrapper for the same reason as AVCodecID: decoded frames may
/// arrive in any format, and the value only has to round-trip into the
/// scaler untouched.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AVPixelFormat(pub(crate) c_int);

impl AVPixelFormat {
  pub const NONE: Self = Self(-1);
  /// Planar YUV 4:2:0 (the fixed encoder input format)
  pub const YUV420P: Self = Self(0);

  /// Get the raw FFmpeg pixel format value
  pub const fn as_raw(self) -> c_int {
    self.0
  }

  /// Wrap a raw FFmpeg pixel format value
  pub const fn from_raw(raw: c_int) -> Self {
    Self(raw)
  }

  pub const fn is_none(self) -> bool {
    self.0 == -1
  }
}

// ============================================================================
// Opaque FFmpeg Types
// ============================================================================

/// Opaque AVCodec structure (codec implementation descriptor)
#[repr(C)]
pub struct AVCodec {
  _opaque: [u8; 0],
  _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVCodecContext structure (encoder/decoder instance)
#[repr(C)]
pub struct AVCodecContext {
  _opaque: [u8; 0],
  _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVFrame structure (uncompressed video data)
#[repr(C)]
pub struct AVFrame {
  _opaque: [u8; 0],
  _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVPacket structure (compressed data)
#[repr(C)]
pub struct AVPacket {
  _opaque: [u8; 0],
  _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque SwsContext structure (software scaler context)
#[repr(C)]
pub struct SwsContext {
  _opaque: [u8; 0],
  _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

/// Opaque AVDictionary structure (key-value options)
#[repr(C)]
pub struct AVDictionary {
  _opaque: [u8; 0],
  _marker: PhantomData<(*mut u8, std::marker::PhantomPinned)>,
}

// ============================================================================
// Constants
// ============================================================================

/// No timestamp value
pub const AV_NOPTS_VALUE: i64 = 0x8000000000000000u64 as i64;

/// Packet flags
pub mod pkt_flag {
  use std::os::raw::c_int;

  pub const KEY: c_int = 0x0001;
  pub const CORRUPT: c_int = 0x0002;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rational_inverse() {
    let fr = AVRational::new(30, 1);
    assert_eq!(fr.inverse(), AVRational::new(1, 30));
    assert!(!fr.is_zero());
    assert!(AVRational::new(0, 1).is_zero());
  }

  #[test]
  fn rational_as_f64() {
    assert_eq!(AVRational::new(1, 25).as_f64(), 0.04);
    assert_eq!(AVRational::new(1, 0).as_f64(), 0.0);
  }

  #[test]
  fn codec_id_round_trip() {
    assert_eq!(AVCodecID::from_raw(173), AVCodecID::HEVC);
    assert_eq!(AVCodecID::HEVC.as_raw(), 173);
  }

  #[test]
  fn pixel_format_round_trip() {
    assert_eq!(AVPixelFormat::from_raw(0), AVPixelFormat::YUV420P);
    assert!(AVPixelFormat::NONE.is_none());
    assert!(!AVPixelFormat::YUV420P.is_none());
  }
}
