//! Safe wrapper around FFmpeg AVPacket
//!
//! Provides RAII-based memory management for encoded video data.

use crate::ffi::{
  accessors::{ffpkt_dts, ffpkt_flags, ffpkt_pts, ffpkt_set_stream_index, ffpkt_size,
    ffpkt_stream_index},
  avcodec::{av_packet_alloc, av_packet_free, av_packet_rescale_ts},
  pkt_flag, AVPacket, AVRational,
};
use std::ptr::NonNull;

use super::CodecError;

/// Safe wrapper around AVPacket with RAII cleanup
pub struct Packet {
  ptr: NonNull<AVPacket>,
}

impl Packet {
  /// Allocate a new empty packet
  pub fn new() -> Result<Self, CodecError> {
    let ptr = unsafe { av_packet_alloc() };
    NonNull::new(ptr)
      .map(|ptr| Self { ptr })
      .ok_or(CodecError::AllocationFailed("AVPacket"))
  }

  /// Get the raw pointer (for FFmpeg API calls)
  #[inline]
  pub fn as_ptr(&self) -> *const AVPacket {
    self.ptr.as_ptr()
  }

  /// Get the mutable raw pointer (for FFmpeg API calls)
  #[inline]
  pub fn as_mut_ptr(&mut self) -> *mut AVPacket {
    self.ptr.as_ptr()
  }

  /// Get packet size in bytes
  #[inline]
  pub fn size(&self) -> i32 {
    unsafe { ffpkt_size(self.as_ptr()) }
  }

  /// Check if packet has data
  #[inline]
  pub fn is_empty(&self) -> bool {
    self.size() == 0
  }

  // ========================================================================
  // Timestamps
  // ========================================================================

  /// Get presentation timestamp
  #[inline]
  pub fn pts(&self) -> i64 {
    unsafe { ffpkt_pts(self.as_ptr()) }
  }

  /// Get decoding timestamp
  #[inline]
  pub fn dts(&self) -> i64 {
    unsafe { ffpkt_dts(self.as_ptr()) }
  }

  /// Rescale pts/dts/duration from one time base to another using exact
  /// rational arithmetic (no float round-trip)
  pub fn rescale_ts(&mut self, src: AVRational, dst: AVRational) {
    unsafe { av_packet_rescale_ts(self.as_mut_ptr(), src, dst) }
  }

  // ========================================================================
  // Stream Association
  // ========================================================================

  /// Get the index of the stream this packet belongs to
  #[inline]
  pub fn stream_index(&self) -> i32 {
    unsafe { ffpkt_stream_index(self.as_ptr()) }
  }

  /// Tag the packet with an output stream index
  #[inline]
  pub fn set_stream_index(&mut self, stream_index: i32) {
    unsafe { ffpkt_set_stream_index(self.as_mut_ptr(), stream_index) }
  }

  /// Check if this is a key frame packet
  #[inline]
  pub fn is_key(&self) -> bool {
    unsafe { ffpkt_flags(self.as_ptr()) & pkt_flag::KEY != 0 }
  }
}

impl Drop for Packet {
  fn drop(&mut self) {
    unsafe {
      let mut ptr = self.ptr.as_ptr();
      av_packet_free(&mut ptr);
    }
  }
}

// Packet data can be sent between threads
unsafe impl Send for Packet {}

impl std::fmt::Debug for Packet {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Packet")
      .field("size", &self.size())
      .field("pts", &self.pts())
      .field("dts", &self.dts())
      .field("stream_index", &self.stream_index())
      .field("is_key", &self.is_key())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_packet_allocation() {
    let pkt = Packet::new().unwrap();
    assert!(pkt.is_empty());
    assert_eq!(pkt.size(), 0);
  }
}
