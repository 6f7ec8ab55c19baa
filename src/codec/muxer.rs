//! Muxer context wrapper for FFmpeg libavformat
//!
//! Provides RAII wrapper around AVFormatContext for muxing into a file.
//! The wrapper tracks which stage of output setup has completed (I/O opened,
//! header written, trailer written) so that Drop releases exactly the
//! resources that were acquired, from any failure point.

use super::context::CodecContext;
use super::demuxer::path_to_cstring;
use super::{CodecError, CodecResult, Packet};
use crate::ffi::accessors::{
  fffmt_get_oformat_flags, fffmt_get_pb, fffmt_get_stream, fffmt_set_pb, ffstream_get_codecpar,
  ffstream_get_index, ffstream_get_time_base, ffstream_set_time_base,
};
use crate::ffi::avformat::{
  av_interleaved_write_frame, av_write_trailer, avcodec_parameters_from_context, avfmt_flag,
  avformat_alloc_output_context2, avformat_free_context, avformat_new_stream,
  avformat_write_header, avio_close, avio_flag, avio_open, AVFormatContext, AVIOContext,
};
use crate::ffi::{AVRational, FFmpegError};
use std::ffi::CString;
use std::path::Path;
use std::ptr::{self, NonNull};

/// Muxer context wrapper
pub struct MuxerContext {
  /// Pointer to AVFormatContext
  ptr: NonNull<AVFormatContext>,
  /// Output path, kept for the deferred avio_open
  path: CString,
  /// Whether the file I/O handle has been opened
  io_opened: bool,
  /// Whether the container header has been written
  header_written: bool,
  /// Whether the trailer has been written (finalized)
  finalized: bool,
}

impl MuxerContext {
  /// Allocate an output context for the given container format and path
  ///
  /// No file is created yet; `open_io` does that once the streams are
  /// configured.
  pub fn create(path: &Path, format_name: &str) -> CodecResult<Self> {
    let c_format = CString::new(format_name)
      .map_err(|_| CodecError::InvalidConfig("format name contains NUL byte".to_string()))?;
    let c_path = path_to_cstring(path)?;

    let mut ctx_ptr: *mut AVFormatContext = ptr::null_mut();
    let ret = unsafe {
      avformat_alloc_output_context2(
        &mut ctx_ptr,
        ptr::null(),
        c_format.as_ptr(),
        c_path.as_ptr(),
      )
    };

    if ret < 0 || ctx_ptr.is_null() {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    Ok(Self {
      ptr: unsafe { NonNull::new_unchecked(ctx_ptr) },
      path: c_path,
      io_opened: false,
      header_written: false,
      finalized: false,
    })
  }

  /// Create an empty output stream slot, returning its index
  ///
  /// Must be called before `write_header`. Parameters are filled in later
  /// by `configure_stream`, once the encoder has been opened.
  pub fn new_stream(&mut self) -> CodecResult<i32> {
    if self.header_written {
      return Err(CodecError::InvalidState(
        "Cannot add stream after header is written".to_string(),
      ));
    }

    let stream = unsafe { avformat_new_stream(self.ptr.as_ptr(), ptr::null()) };
    if stream.is_null() {
      return Err(CodecError::AllocationFailed("AVStream"));
    }

    Ok(unsafe { ffstream_get_index(stream) })
  }

  /// Copy an opened encoder's negotiated parameters into a stream slot and
  /// adopt the encoder's time base
  ///
  /// The encoder must be open: parameter sets (extradata) only exist after
  /// codec negotiation.
  pub fn configure_stream(&mut self, stream_index: i32, encoder: &CodecContext) -> CodecResult<()> {
    let stream = unsafe { fffmt_get_stream(self.ptr.as_ptr(), stream_index as u32) };
    if stream.is_null() {
      return Err(CodecError::InvalidState(format!(
        "No output stream at index {stream_index}"
      )));
    }

    let codecpar = unsafe { ffstream_get_codecpar(stream) };
    if codecpar.is_null() {
      return Err(CodecError::AllocationFailed("AVCodecParameters"));
    }

    let ret = unsafe { avcodec_parameters_from_context(codecpar, encoder.as_ptr()) };
    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    let tb = encoder.time_base();
    unsafe { ffstream_set_time_base(stream, tb.num, tb.den) };

    Ok(())
  }

  /// Time base of an output stream
  ///
  /// The muxer may adjust this when the header is written, so packet
  /// timestamps must be rescaled against the value read back here.
  pub fn stream_time_base(&self, stream_index: i32) -> AVRational {
    let stream = unsafe { fffmt_get_stream(self.ptr.as_ptr(), stream_index as u32) };
    let mut tb = AVRational::default();
    if !stream.is_null() {
      unsafe { ffstream_get_time_base(stream, &mut tb.num, &mut tb.den) };
    }
    tb
  }

  /// Whether the container format stores codec parameter sets in stream
  /// extradata (true for MP4)
  pub fn needs_global_header(&self) -> bool {
    let flags = unsafe { fffmt_get_oformat_flags(self.ptr.as_ptr()) };
    flags & avfmt_flag::GLOBALHEADER != 0
  }

  /// Whether the container format needs a file handle at all
  pub fn needs_file(&self) -> bool {
    let flags = unsafe { fffmt_get_oformat_flags(self.ptr.as_ptr()) };
    flags & avfmt_flag::NOFILE == 0
  }

  /// Open the output file handle, unless the format needs none
  pub fn open_io(&mut self) -> CodecResult<()> {
    if self.io_opened || !self.needs_file() {
      return Ok(());
    }

    let mut pb: *mut AVIOContext = ptr::null_mut();
    let ret = unsafe { avio_open(&mut pb, self.path.as_ptr(), avio_flag::WRITE) };
    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    unsafe { fffmt_set_pb(self.ptr.as_ptr(), pb) };
    self.io_opened = true;
    Ok(())
  }

  /// Write the container header
  ///
  /// Must be called after stream configuration and `open_io`. On failure the
  /// already-opened I/O handle stays tracked and is closed in Drop.
  pub fn write_header(&mut self) -> CodecResult<()> {
    if self.header_written {
      return Err(CodecError::InvalidState("Header already written".to_string()));
    }

    let ret = unsafe { avformat_write_header(self.ptr.as_ptr(), ptr::null_mut()) };
    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    self.header_written = true;
    Ok(())
  }

  /// Write a packet in interleaved (time-ordered, muxer-buffered) order
  ///
  /// The packet's stream_index must refer to a stream of this muxer.
  pub fn write_packet(&mut self, packet: &mut Packet) -> CodecResult<()> {
    if !self.header_written {
      return Err(CodecError::InvalidState("Header not written".to_string()));
    }

    if self.finalized {
      return Err(CodecError::InvalidState(
        "Muxer already finalized".to_string(),
      ));
    }

    let ret = unsafe { av_interleaved_write_frame(self.ptr.as_ptr(), packet.as_mut_ptr()) };
    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    Ok(())
  }

  /// Write the container trailer, finalizing duration and index metadata
  ///
  /// Deliberately NOT called from Drop: a conversion that failed mid-stream
  /// must not finalize a structurally incomplete file as if it were whole.
  pub fn write_trailer(&mut self) -> CodecResult<()> {
    if !self.header_written {
      return Err(CodecError::InvalidState("Header not written".to_string()));
    }

    if self.finalized {
      return Ok(());
    }

    let ret = unsafe { av_write_trailer(self.ptr.as_ptr()) };
    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    self.finalized = true;
    Ok(())
  }

  /// Check if header has been written
  pub fn is_header_written(&self) -> bool {
    self.header_written
  }

  /// Check if muxer is finalized
  pub fn is_finalized(&self) -> bool {
    self.finalized
  }
}

impl Drop for MuxerContext {
  fn drop(&mut self) {
    unsafe {
      // Close the file handle first; the format context does not own it
      if self.io_opened {
        let pb = fffmt_get_pb(self.ptr.as_ptr());
        if !pb.is_null() {
          avio_close(pb);
        }
        fffmt_set_pb(self.ptr.as_ptr(), ptr::null_mut());
      }

      avformat_free_context(self.ptr.as_ptr());
    }
  }
}

// SAFETY: MuxerContext owns all its resources and can be safely sent between threads
unsafe impl Send for MuxerContext {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_muxer_creation() {
    let path = std::env::temp_dir().join("hevconv-muxer-create.mp4");
    let muxer = MuxerContext::create(&path, "mp4").unwrap();
    assert!(!muxer.is_header_written());
    assert!(!muxer.is_finalized());
    // mp4 writes parameter sets into extradata and needs a real file
    assert!(muxer.needs_global_header());
    assert!(muxer.needs_file());
  }

  #[test]
  fn test_unknown_format_fails() {
    let path = std::env::temp_dir().join("hevconv-muxer-unknown.xyz");
    assert!(MuxerContext::create(&path, "no-such-format").is_err());
  }

  #[test]
  fn test_write_before_header_is_rejected() {
    let path = std::env::temp_dir().join("hevconv-muxer-order.mp4");
    let mut muxer = MuxerContext::create(&path, "mp4").unwrap();
    let mut pkt = Packet::new().unwrap();
    assert!(matches!(
      muxer.write_packet(&mut pkt),
      Err(CodecError::InvalidState(_))
    ));
  }

  #[test]
  fn test_drop_without_io_is_clean() {
    // Dropping a muxer that never opened its file handle must release only
    // the format context
    let path = std::env::temp_dir().join("hevconv-muxer-drop.mp4");
    let mut muxer = MuxerContext::create(&path, "mp4").unwrap();
    let _ = muxer.new_stream().unwrap();
    drop(muxer);
    assert!(!path.exists());
  }
}
