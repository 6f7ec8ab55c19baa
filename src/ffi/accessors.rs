//! Rust declarations for C accessor functions
//!
//! These functions provide access to FFmpeg struct fields via the thin C
//! accessor library in accessors.c.

use super::avformat::{AVCodecParameters, AVFormatContext, AVIOContext, AVStream};
use super::types::*;
use std::os::raw::{c_int, c_uint, c_void};

unsafe extern "C" {
  // ========================================================================
  // AVCodecContext Setters
  // ========================================================================

  pub fn ffctx_set_width(ctx: *mut AVCodecContext, width: c_int);
  pub fn ffctx_set_height(ctx: *mut AVCodecContext, height: c_int);
  pub fn ffctx_set_pix_fmt(ctx: *mut AVCodecContext, pix_fmt: c_int);
  pub fn ffctx_set_time_base(ctx: *mut AVCodecContext, num: c_int, den: c_int);
  pub fn ffctx_set_sample_aspect_ratio(ctx: *mut AVCodecContext, num: c_int, den: c_int);
  pub fn ffctx_set_thread_count(ctx: *mut AVCodecContext, thread_count: c_int);
  pub fn ffctx_set_flags(ctx: *mut AVCodecContext, flags: c_int);

  // ========================================================================
  // AVCodecContext Getters
  // ========================================================================

  pub fn ffctx_get_width(ctx: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_height(ctx: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_pix_fmt(ctx: *const AVCodecContext) -> c_int;
  pub fn ffctx_get_time_base(ctx: *const AVCodecContext, num: *mut c_int, den: *mut c_int);
  pub fn ffctx_get_framerate(ctx: *const AVCodecContext, num: *mut c_int, den: *mut c_int);
  pub fn ffctx_get_sample_aspect_ratio(
    ctx: *const AVCodecContext,
    num: *mut c_int,
    den: *mut c_int,
  );

  /// Codec-private option object for av_opt_set (x265 "preset" etc.)
  pub fn ffctx_get_priv_data(ctx: *mut AVCodecContext) -> *mut c_void;

  // ========================================================================
  // AVStream Accessors
  // ========================================================================

  pub fn ffstream_get_index(stream: *const AVStream) -> c_int;
  pub fn ffstream_get_codecpar(stream: *mut AVStream) -> *mut AVCodecParameters;
  pub fn ffstream_get_codecpar_const(stream: *const AVStream) -> *const AVCodecParameters;
  pub fn ffstream_get_time_base(stream: *const AVStream, num: *mut c_int, den: *mut c_int);
  pub fn ffstream_set_time_base(stream: *mut AVStream, num: c_int, den: c_int);
  pub fn ffstream_get_r_frame_rate(stream: *const AVStream, num: *mut c_int, den: *mut c_int);

  // ========================================================================
  // AVFormatContext Accessors
  // ========================================================================

  pub fn fffmt_get_nb_streams(ctx: *const AVFormatContext) -> c_uint;
  pub fn fffmt_get_stream(ctx: *const AVFormatContext, index: c_uint) -> *mut AVStream;
  pub fn fffmt_get_oformat_flags(ctx: *const AVFormatContext) -> c_int;
  pub fn fffmt_get_pb(ctx: *const AVFormatContext) -> *mut AVIOContext;
  pub fn fffmt_set_pb(ctx: *mut AVFormatContext, pb: *mut AVIOContext);

  // ========================================================================
  // AVCodecParameters Getters
  // ========================================================================

  pub fn ffcodecpar_get_codec_type(par: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_codec_id(par: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_width(par: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_height(par: *const AVCodecParameters) -> c_int;
  pub fn ffcodecpar_get_format(par: *const AVCodecParameters) -> c_int;

  // ========================================================================
  // AVFrame Accessors
  // ========================================================================

  pub fn ffframe_set_width(frame: *mut AVFrame, width: c_int);
  pub fn ffframe_set_height(frame: *mut AVFrame, height: c_int);
  pub fn ffframe_set_format(frame: *mut AVFrame, format: c_int);
  pub fn ffframe_set_pts(frame: *mut AVFrame, pts: i64);

  pub fn ffframe_get_width(frame: *const AVFrame) -> c_int;
  pub fn ffframe_get_height(frame: *const AVFrame) -> c_int;
  pub fn ffframe_get_format(frame: *const AVFrame) -> c_int;
  pub fn ffframe_get_pts(frame: *const AVFrame) -> i64;

  pub fn ffframe_data(frame: *mut AVFrame, plane: c_int) -> *mut u8;
  pub fn ffframe_data_const(frame: *const AVFrame, plane: c_int) -> *const u8;
  pub fn ffframe_linesize(frame: *const AVFrame, plane: c_int) -> c_int;

  // ========================================================================
  // AVPacket Accessors
  // ========================================================================

  pub fn ffpkt_size(pkt: *const AVPacket) -> c_int;
  pub fn ffpkt_pts(pkt: *const AVPacket) -> i64;
  pub fn ffpkt_dts(pkt: *const AVPacket) -> i64;
  pub fn ffpkt_flags(pkt: *const AVPacket) -> c_int;
  pub fn ffpkt_stream_index(pkt: *const AVPacket) -> c_int;
  pub fn ffpkt_set_stream_index(pkt: *mut AVPacket, stream_index: c_int);
}

// ============================================================================
// Codec Flags
// ============================================================================

pub mod codec_flag {
  use std::os::raw::c_int;

  /// Place global headers in extradata instead of every keyframe
  pub const GLOBAL_HEADER: c_int = 1 << 22;
}
