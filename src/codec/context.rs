//! Safe wrapper around FFmpeg AVCodecContext
//!
//! Provides encoding and decoding functionality with RAII cleanup.

use crate::ffi::{
  self,
  accessors::{
    codec_flag, ffctx_get_framerate, ffctx_get_height, ffctx_get_pix_fmt, ffctx_get_priv_data,
    ffctx_get_sample_aspect_ratio, ffctx_get_time_base, ffctx_get_width, ffctx_set_flags,
    ffctx_set_height, ffctx_set_pix_fmt, ffctx_set_sample_aspect_ratio, ffctx_set_thread_count,
    ffctx_set_time_base, ffctx_set_width,
  },
  avcodec::{
    avcodec_alloc_context3, avcodec_find_decoder, avcodec_find_encoder, avcodec_free_context,
    avcodec_open2, avcodec_receive_frame, avcodec_receive_packet, avcodec_send_frame,
    avcodec_send_packet,
  },
  avformat::avcodec_parameters_to_context,
  avutil::av_opt_set,
  AVCodec, AVCodecContext, AVCodecID, AVPixelFormat, AVRational,
};
use std::ffi::CString;
use std::ptr::NonNull;
use tracing::warn;

use super::demuxer::CodecParameters;
use super::{CodecError, CodecResult, EncoderSettings, Frame, Packet};

/// Type of codec (encoder or decoder)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecType {
  Encoder,
  Decoder,
}

/// Safe wrapper around AVCodecContext
pub struct CodecContext {
  ptr: NonNull<AVCodecContext>,
  codec: *const AVCodec,
  codec_type: CodecType,
}

impl CodecContext {
  /// Create a new decoder context for the given codec ID
  pub fn new_decoder(codec_id: AVCodecID) -> CodecResult<Self> {
    let codec = unsafe { avcodec_find_decoder(codec_id.as_raw()) };
    if codec.is_null() {
      return Err(CodecError::DecoderNotFound(codec_id));
    }
    Self::from_codec(codec, CodecType::Decoder)
  }

  /// Create a new encoder context for the given codec ID
  pub fn new_encoder(codec_id: AVCodecID) -> CodecResult<Self> {
    let codec = unsafe { avcodec_find_encoder(codec_id.as_raw()) };
    if codec.is_null() {
      return Err(CodecError::EncoderNotFound(codec_id));
    }
    Self::from_codec(codec, CodecType::Encoder)
  }

  fn from_codec(codec: *const AVCodec, codec_type: CodecType) -> CodecResult<Self> {
    let ptr = unsafe { avcodec_alloc_context3(codec) };
    NonNull::new(ptr)
      .map(|ptr| Self {
        ptr,
        codec,
        codec_type,
      })
      .ok_or(CodecError::AllocationFailed("AVCodecContext"))
  }

  // ========================================================================
  // Configuration
  // ========================================================================

  /// Copy a stream's codec parameters into this decoder context
  pub fn apply_parameters(&mut self, par: &CodecParameters<'_>) -> CodecResult<()> {
    if self.codec_type != CodecType::Decoder {
      return Err(CodecError::InvalidState("Not a decoder context".into()));
    }

    let ret = unsafe { avcodec_parameters_to_context(self.ptr.as_ptr(), par.as_ptr()) };
    ffi::check_error(ret)?;
    Ok(())
  }

  /// Configure the encoder with the given settings
  ///
  /// Must be called before `open`. The preset is applied through the codec's
  /// private options and skipped with a warning when the resolved encoder
  /// does not expose one.
  pub fn configure_encoder(&mut self, settings: &EncoderSettings) -> CodecResult<()> {
    if self.codec_type != CodecType::Encoder {
      return Err(CodecError::InvalidState("Not an encoder context".into()));
    }

    unsafe {
      let ctx = self.ptr.as_ptr();

      ffctx_set_width(ctx, settings.width as i32);
      ffctx_set_height(ctx, settings.height as i32);
      ffctx_set_pix_fmt(ctx, settings.pixel_format.as_raw());
      ffctx_set_sample_aspect_ratio(
        ctx,
        settings.sample_aspect_ratio.num,
        settings.sample_aspect_ratio.den,
      );
      ffctx_set_time_base(ctx, settings.time_base.num, settings.time_base.den);
      ffctx_set_thread_count(ctx, settings.thread_count as i32);

      if settings.global_header {
        ffctx_set_flags(ctx, codec_flag::GLOBAL_HEADER);
      }
    }

    if let Some(preset) = settings.preset {
      self.set_private_option("preset", preset);
    }

    Ok(())
  }

  /// Set a codec-private option, best-effort
  fn set_private_option(&mut self, name: &str, value: &str) {
    let c_name = CString::new(name).expect("option name contains NUL");
    let c_value = CString::new(value).expect("option value contains NUL");

    let priv_data = unsafe { ffctx_get_priv_data(self.ptr.as_ptr()) };
    if priv_data.is_null() {
      warn!(name, "codec has no private options, skipping");
      return;
    }

    let ret = unsafe { av_opt_set(priv_data, c_name.as_ptr(), c_value.as_ptr(), 0) };
    if ret < 0 {
      warn!(name, value, "codec does not support option, skipping");
    }
  }

  /// Open the codec (must be called after configuration)
  pub fn open(&mut self) -> CodecResult<()> {
    let ret = unsafe { avcodec_open2(self.ptr.as_ptr(), self.codec, std::ptr::null_mut()) };
    ffi::check_error(ret)?;
    Ok(())
  }

  // ========================================================================
  // Decoding
  // ========================================================================

  /// Send a packet to the decoder (None for end-of-stream flush)
  pub fn send_packet(&mut self, packet: Option<&Packet>) -> CodecResult<()> {
    let pkt_ptr = packet.map(|p| p.as_ptr()).unwrap_or(std::ptr::null());
    let ret = unsafe { avcodec_send_packet(self.ptr.as_ptr(), pkt_ptr) };
    ffi::check_error(ret)?;
    Ok(())
  }

  /// Receive a decoded frame from the decoder
  ///
  /// Three-valued outcome: `Ok(Some(frame))` when a frame is ready,
  /// `Ok(None)` when the decoder needs more input or is fully drained,
  /// `Err` on decode failure.
  pub fn receive_frame(&mut self) -> CodecResult<Option<Frame>> {
    let mut frame = Frame::new()?;
    let ret = unsafe { avcodec_receive_frame(self.ptr.as_ptr(), frame.as_mut_ptr()) };

    match ffi::check_error_except_eagain_eof(ret)? {
      Some(_) => Ok(Some(frame)),
      None => Ok(None),
    }
  }

  // ========================================================================
  // Encoding
  // ========================================================================

  /// Send a frame to the encoder (None for end-of-stream flush)
  pub fn send_frame(&mut self, frame: Option<&Frame>) -> CodecResult<()> {
    let frame_ptr = frame.map(|f| f.as_ptr()).unwrap_or(std::ptr::null());
    let ret = unsafe { avcodec_send_frame(self.ptr.as_ptr(), frame_ptr) };
    ffi::check_error(ret)?;
    Ok(())
  }

  /// Receive an encoded packet from the encoder
  ///
  /// Same three-valued outcome as `receive_frame`.
  pub fn receive_packet(&mut self) -> CodecResult<Option<Packet>> {
    let mut pkt = Packet::new()?;
    let ret = unsafe { avcodec_receive_packet(self.ptr.as_ptr(), pkt.as_mut_ptr()) };

    match ffi::check_error_except_eagain_eof(ret)? {
      Some(_) => Ok(Some(pkt)),
      None => Ok(None),
    }
  }

  // ========================================================================
  // Accessors
  // ========================================================================

  /// Get codec type
  #[inline]
  pub fn codec_type(&self) -> CodecType {
    self.codec_type
  }

  /// Get configured width
  pub fn width(&self) -> u32 {
    unsafe { ffctx_get_width(self.as_ptr()) as u32 }
  }

  /// Get configured height
  pub fn height(&self) -> u32 {
    unsafe { ffctx_get_height(self.as_ptr()) as u32 }
  }

  /// Get configured pixel format
  pub fn pixel_format(&self) -> AVPixelFormat {
    AVPixelFormat::from_raw(unsafe { ffctx_get_pix_fmt(self.as_ptr()) })
  }

  /// Get the codec time base
  pub fn time_base(&self) -> AVRational {
    let mut tb = AVRational::default();
    unsafe { ffctx_get_time_base(self.as_ptr(), &mut tb.num, &mut tb.den) };
    tb
  }

  /// Frame rate as detected by the decoder (zero when unknown)
  pub fn frame_rate(&self) -> AVRational {
    let mut fr = AVRational::default();
    unsafe { ffctx_get_framerate(self.as_ptr(), &mut fr.num, &mut fr.den) };
    fr
  }

  /// Sample aspect ratio of the coded frames
  pub fn sample_aspect_ratio(&self) -> AVRational {
    let mut sar = AVRational::default();
    unsafe { ffctx_get_sample_aspect_ratio(self.as_ptr(), &mut sar.num, &mut sar.den) };
    sar
  }

  /// Get raw pointer (for FFmpeg API calls)
  #[inline]
  pub fn as_ptr(&self) -> *const AVCodecContext {
    self.ptr.as_ptr()
  }
}

impl Drop for CodecContext {
  fn drop(&mut self) {
    unsafe {
      let mut ptr = self.ptr.as_ptr();
      avcodec_free_context(&mut ptr);
    }
  }
}

// CodecContext is NOT Sync - FFmpeg contexts are not thread-safe
unsafe impl Send for CodecContext {}

impl std::fmt::Debug for CodecContext {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("CodecContext")
      .field("type", &self.codec_type)
      .field("width", &self.width())
      .field("height", &self.height())
      .field("pixel_format", &self.pixel_format())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_decoder_creation() {
    // Every FFmpeg build carries the mpeg4 decoder
    let decoder = CodecContext::new_decoder(AVCodecID::MPEG4).unwrap();
    assert_eq!(decoder.codec_type(), CodecType::Decoder);
  }

  #[test]
  fn test_unknown_codec_is_not_found() {
    let result = CodecContext::new_decoder(AVCodecID::from_raw(0x7fff_0000));
    assert!(matches!(result, Err(CodecError::DecoderNotFound(_))));
  }

  #[test]
  fn test_encoder_configuration_round_trip() {
    let mut encoder = CodecContext::new_encoder(AVCodecID::MPEG4).unwrap();
    let settings = EncoderSettings {
      width: 320,
      height: 240,
      sample_aspect_ratio: AVRational::new(1, 1),
      pixel_format: AVPixelFormat::YUV420P,
      time_base: AVRational::new(1, 25),
      preset: None,
      thread_count: 1,
      global_header: false,
    };
    encoder.configure_encoder(&settings).unwrap();

    assert_eq!(encoder.width(), 320);
    assert_eq!(encoder.height(), 240);
    assert_eq!(encoder.pixel_format(), AVPixelFormat::YUV420P);
    assert_eq!(encoder.time_base(), AVRational::new(1, 25));
  }

  #[test]
  fn test_configure_rejects_decoder() {
    let mut decoder = CodecContext::new_decoder(AVCodecID::MPEG4).unwrap();
    let settings = EncoderSettings {
      width: 320,
      height: 240,
      sample_aspect_ratio: AVRational::new(1, 1),
      pixel_format: AVPixelFormat::YUV420P,
      time_base: AVRational::new(1, 25),
      preset: None,
      thread_count: 0,
      global_header: false,
    };
    assert!(matches!(
      decoder.configure_encoder(&settings),
      Err(CodecError::InvalidState(_))
    ));
  }
}
