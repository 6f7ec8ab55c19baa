//! Demuxer context wrapper for FFmpeg libavformat
//!
//! Provides RAII wrapper around AVFormatContext for demuxing operations.

use super::{CodecError, CodecResult, Packet};
use crate::ffi::accessors::{
  ffcodecpar_get_codec_id, ffcodecpar_get_codec_type, ffcodecpar_get_format,
  ffcodecpar_get_height, ffcodecpar_get_width, fffmt_get_nb_streams, fffmt_get_stream,
  ffstream_get_codecpar_const, ffstream_get_index, ffstream_get_r_frame_rate,
  ffstream_get_time_base,
};
use crate::ffi::avformat::{
  av_find_best_stream, av_read_frame, avformat_close_input, avformat_find_stream_info,
  avformat_open_input, media_type, AVCodecParameters, AVFormatContext,
};
use crate::ffi::{AVCodecID, AVPixelFormat, AVRational, FFmpegError};
use std::ffi::CString;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::path::Path;
use std::ptr::{self, NonNull};

/// Media type for stream identification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
  /// Video stream
  Video,
  /// Audio stream
  Audio,
  /// Subtitle stream
  Subtitle,
  /// Data stream
  Data,
}

impl MediaType {
  /// Convert to FFmpeg media type constant
  fn ffmpeg_type(&self) -> c_int {
    match self {
      MediaType::Video => media_type::VIDEO,
      MediaType::Audio => media_type::AUDIO,
      MediaType::Subtitle => media_type::SUBTITLE,
      MediaType::Data => media_type::DATA,
    }
  }

  /// Convert from FFmpeg media type constant
  fn from_ffmpeg(value: c_int) -> Option<Self> {
    match value {
      x if x == media_type::VIDEO => Some(MediaType::Video),
      x if x == media_type::AUDIO => Some(MediaType::Audio),
      x if x == media_type::SUBTITLE => Some(MediaType::Subtitle),
      x if x == media_type::DATA => Some(MediaType::Data),
      _ => None,
    }
  }
}

/// Information about a stream in the container
#[derive(Debug, Clone)]
pub struct StreamInfo {
  /// Stream index
  pub index: i32,
  /// Media type (Video, Audio, etc.)
  pub media_type: MediaType,
  /// Codec ID
  pub codec_id: AVCodecID,
  /// Video width (if video)
  pub width: Option<u32>,
  /// Video height (if video)
  pub height: Option<u32>,
  /// Video pixel format (if video)
  pub pixel_format: Option<AVPixelFormat>,
  /// Stream time base
  pub time_base: AVRational,
  /// Container-stated frame rate (the fallback when the decoder can't
  /// derive one itself)
  pub frame_rate: AVRational,
}

/// Borrowed view of a stream's codec parameters
///
/// The pointer stays valid only while the demuxer is alive, which the
/// lifetime enforces.
pub struct CodecParameters<'a> {
  ptr: NonNull<AVCodecParameters>,
  _demuxer: PhantomData<&'a DemuxerContext>,
}

impl CodecParameters<'_> {
  /// Codec identifier carried by the stream
  pub fn codec_id(&self) -> AVCodecID {
    AVCodecID::from_raw(unsafe { ffcodecpar_get_codec_id(self.ptr.as_ptr()) })
  }

  /// Get raw pointer (for FFmpeg API calls)
  pub(crate) fn as_ptr(&self) -> *const AVCodecParameters {
    self.ptr.as_ptr()
  }
}

/// Demuxer context wrapper
///
/// Provides RAII wrapper around AVFormatContext for demuxing operations.
pub struct DemuxerContext {
  /// Pointer to AVFormatContext
  ptr: NonNull<AVFormatContext>,
  /// Cached stream information (empty until probe_streams)
  streams: Vec<StreamInfo>,
}

impl DemuxerContext {
  /// Open a file for demuxing
  ///
  /// Only opens the container; call `probe_streams` afterwards to read
  /// stream metadata. The two steps fail for different reasons (unreadable
  /// path/unknown format vs. undeterminable parameters) and callers report
  /// them differently.
  pub fn open(path: &Path) -> CodecResult<Self> {
    let c_path = path_to_cstring(path)?;

    let mut ctx_ptr: *mut AVFormatContext = ptr::null_mut();
    let ret =
      unsafe { avformat_open_input(&mut ctx_ptr, c_path.as_ptr(), ptr::null(), ptr::null_mut()) };

    if ret < 0 || ctx_ptr.is_null() {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    Ok(Self {
      ptr: unsafe { NonNull::new_unchecked(ctx_ptr) },
      streams: Vec::new(),
    })
  }

  /// Read enough of the file to determine codec parameters for every stream
  pub fn probe_streams(&mut self) -> CodecResult<()> {
    let ret = unsafe { avformat_find_stream_info(self.ptr.as_ptr(), ptr::null_mut()) };

    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    self.parse_streams();
    Ok(())
  }

  /// Parse stream information from format context
  fn parse_streams(&mut self) {
    let nb_streams = unsafe { fffmt_get_nb_streams(self.ptr.as_ptr()) };

    self.streams.clear();
    self.streams.reserve(nb_streams as usize);

    for i in 0..nb_streams {
      let stream = unsafe { fffmt_get_stream(self.ptr.as_ptr(), i) };
      if stream.is_null() {
        continue;
      }

      let codecpar = unsafe { ffstream_get_codecpar_const(stream) };
      if codecpar.is_null() {
        continue;
      }

      let codec_type_raw = unsafe { ffcodecpar_get_codec_type(codecpar) };
      let media_type = match MediaType::from_ffmpeg(codec_type_raw) {
        Some(t) => t,
        None => continue, // Skip unknown stream types
      };

      let index = unsafe { ffstream_get_index(stream) };
      let codec_id = AVCodecID::from_raw(unsafe { ffcodecpar_get_codec_id(codecpar) });

      let mut time_base = AVRational::default();
      let mut frame_rate = AVRational::default();
      unsafe {
        ffstream_get_time_base(stream, &mut time_base.num, &mut time_base.den);
        ffstream_get_r_frame_rate(stream, &mut frame_rate.num, &mut frame_rate.den);
      }

      let (width, height, pixel_format) = if media_type == MediaType::Video {
        let w = unsafe { ffcodecpar_get_width(codecpar) };
        let h = unsafe { ffcodecpar_get_height(codecpar) };
        let fmt = unsafe { ffcodecpar_get_format(codecpar) };
        (
          Some(w as u32),
          Some(h as u32),
          Some(AVPixelFormat::from_raw(fmt)),
        )
      } else {
        (None, None, None)
      };

      self.streams.push(StreamInfo {
        index,
        media_type,
        codec_id,
        width,
        height,
        pixel_format,
        time_base,
        frame_rate,
      });
    }
  }

  /// Get all streams
  pub fn streams(&self) -> &[StreamInfo] {
    &self.streams
  }

  /// Find the best stream of a given type using libavformat's ranking
  /// heuristic (resolution/bitrate based)
  pub fn find_best_stream(&self, media_type: MediaType) -> Option<&StreamInfo> {
    let stream_index = unsafe {
      av_find_best_stream(
        self.ptr.as_ptr(),
        media_type.ffmpeg_type(),
        -1,
        -1,
        ptr::null_mut(),
        0,
      )
    };

    if stream_index < 0 {
      return None;
    }

    self.streams.iter().find(|s| s.index == stream_index)
  }

  /// Borrow the codec parameters of a stream
  pub fn codec_parameters(&self, stream_index: i32) -> Option<CodecParameters<'_>> {
    let nb_streams = unsafe { fffmt_get_nb_streams(self.ptr.as_ptr()) };
    if stream_index < 0 || stream_index as u32 >= nb_streams {
      return None;
    }

    let stream = unsafe { fffmt_get_stream(self.ptr.as_ptr(), stream_index as u32) };
    if stream.is_null() {
      return None;
    }

    let codecpar = unsafe { ffstream_get_codecpar_const(stream) };
    NonNull::new(codecpar.cast_mut()).map(|ptr| CodecParameters {
      ptr,
      _demuxer: PhantomData,
    })
  }

  /// Read the next packet from the container
  ///
  /// Returns `Ok(Some(packet))` if a packet was read, `Ok(None)` on end of
  /// input, or `Err` on a read error.
  pub fn read_packet(&mut self) -> CodecResult<Option<Packet>> {
    let mut packet = Packet::new()?;

    let ret = unsafe { av_read_frame(self.ptr.as_ptr(), packet.as_mut_ptr()) };

    if ret == crate::ffi::error::AVERROR_EOF {
      return Ok(None);
    }

    if ret < 0 {
      return Err(CodecError::Ffmpeg(FFmpegError::from_code(ret)));
    }

    Ok(Some(packet))
  }
}

impl Drop for DemuxerContext {
  fn drop(&mut self) {
    // avformat_close_input frees the context and closes the file handle
    let mut ptr = self.ptr.as_ptr();
    unsafe {
      avformat_close_input(&mut ptr);
    }
  }
}

// SAFETY: DemuxerContext owns all its resources and can be safely sent between threads
unsafe impl Send for DemuxerContext {}

pub(crate) fn path_to_cstring(path: &Path) -> CodecResult<CString> {
  CString::new(path.to_string_lossy().as_bytes())
    .map_err(|_| CodecError::InvalidConfig("path contains NUL byte".to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_media_type_conversion() {
    assert_eq!(MediaType::Video.ffmpeg_type(), media_type::VIDEO);
    assert_eq!(MediaType::Audio.ffmpeg_type(), media_type::AUDIO);

    assert_eq!(
      MediaType::from_ffmpeg(media_type::VIDEO),
      Some(MediaType::Video)
    );
    assert_eq!(
      MediaType::from_ffmpeg(media_type::AUDIO),
      Some(MediaType::Audio)
    );
    assert_eq!(MediaType::from_ffmpeg(-1), None);
  }

  #[test]
  fn test_open_missing_file_fails() {
    let result = DemuxerContext::open(Path::new("/nonexistent/input.mp4"));
    assert!(result.is_err());
  }
}
