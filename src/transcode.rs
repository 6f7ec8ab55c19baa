//! The video conversion pipeline
//!
//! Composes the codec wrappers into a single blocking operation: demux the
//! input, decode its best video stream, convert each frame to the encoder's
//! layout, encode to HEVC, and mux into an MP4 file. Every native resource
//! lives in an RAII wrapper, so an error at any of the initialization steps
//! or inside the per-frame loop tears down exactly the resources acquired up
//! to that point.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::codec::{
  CodecContext, CodecError, DemuxerContext, EncoderSettings, Frame, MediaType, MuxerContext,
  ScaleAlgorithm, Scaler,
};
use crate::ffi::{AVCodecID, AVPixelFormat, AVRational};

// ============================================================================
// Fixed pipeline configuration
// ============================================================================

/// Output container format short name
pub const OUTPUT_CONTAINER: &str = "mp4";

/// Output video codec
pub const OUTPUT_CODEC: AVCodecID = AVCodecID::HEVC;

/// Pixel format fed to the encoder
pub const OUTPUT_PIXEL_FORMAT: AVPixelFormat = AVPixelFormat::YUV420P;

/// Encoder speed/quality preset
pub const ENCODER_PRESET: &str = "medium";

/// Resampling filter used for pixel format/resolution conversion
pub const SCALE_ALGORITHM: ScaleAlgorithm = ScaleAlgorithm::Bicubic;

// ============================================================================
// Error Taxonomy
// ============================================================================

/// Conversion failure, one variant per pipeline step
///
/// Every error is terminal for the conversion: there is no retry anywhere in
/// the pipeline, and all failure paths release their resources on the way
/// out.
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
  #[error("could not open input file '{path}'")]
  OpenInput {
    path: PathBuf,
    #[source]
    source: CodecError,
  },

  #[error("failed to retrieve input stream information")]
  StreamProbe(#[source] CodecError),

  #[error("no video stream in input file '{path}'")]
  NoVideoStream { path: PathBuf },

  #[error("no decoder available for codec {0:?}")]
  DecoderNotFound(AVCodecID),

  #[error("failed to initialize decoder")]
  DecoderInit(#[source] CodecError),

  #[error("could not create output context for '{path}'")]
  OutputAlloc {
    path: PathBuf,
    #[source]
    source: CodecError,
  },

  #[error("HEVC encoder not available in this FFmpeg build")]
  EncoderNotFound,

  #[error("failed allocating output stream")]
  StreamAlloc(#[source] CodecError),

  #[error("failed to allocate or configure the encoder context")]
  EncoderAlloc(#[source] CodecError),

  #[error("cannot open video encoder")]
  EncoderOpen(#[source] CodecError),

  #[error("failed to copy encoder parameters to output stream")]
  ParameterCopy(#[source] CodecError),

  #[error("could not open output file '{path}'")]
  OutputIo {
    path: PathBuf,
    #[source]
    source: CodecError,
  },

  #[error("error writing container header")]
  HeaderWrite(#[source] CodecError),

  #[error("could not initialize the pixel conversion context")]
  ScalerInit(#[source] CodecError),

  #[error("could not allocate converted frame buffer")]
  FrameBufferAlloc(#[source] CodecError),

  #[error("error sending packet for decoding")]
  DecodeSubmit(#[source] CodecError),

  #[error("error during decoding")]
  DecodeReceive(#[source] CodecError),

  #[error("error converting decoded frame")]
  FrameConvert(#[source] CodecError),

  #[error("error sending frame for encoding")]
  EncodeSubmit(#[source] CodecError),

  #[error("error during encoding")]
  EncodeReceive(#[source] CodecError),

  #[error("error writing output packet")]
  Write(#[source] CodecError),
}

// ============================================================================
// Pipeline Stages
// ============================================================================

/// The opened input side: demuxer, selected stream, and its decoder
struct Source {
  demuxer: DemuxerContext,
  stream_index: i32,
  /// Frame rate stated by the container, the fallback when the decoder
  /// does not detect one
  stream_frame_rate: AVRational,
  decoder: CodecContext,
}

/// The opened output side: muxer with one configured stream and its encoder
struct Sink {
  muxer: MuxerContext,
  stream_index: i32,
  encoder: CodecContext,
}

/// Convert a video file into an H.265/HEVC-encoded MP4 file
///
/// Blocks until the conversion completes or fails. `thread_count` is passed
/// through to the encoder's internal threading (0 lets the encoder decide);
/// the pipeline itself is single-threaded.
///
/// On fatal mid-stream errors the partially written output file is left on
/// disk without a trailer; it is not deleted.
pub fn convert_to_h265(
  input: impl AsRef<Path>,
  output: impl AsRef<Path>,
  thread_count: u32,
) -> Result<(), TranscodeError> {
  let mut source = open_source(input.as_ref())?;
  let mut sink = build_sink(output.as_ref(), &source, thread_count)?;
  let (scaler, mut converted) = build_converter(&source.decoder, &sink.encoder)?;

  run_transcode_loop(&mut source, &mut sink, &scaler, &mut converted)?;

  // Finalizes duration and index metadata; only reached on clean input
  // exhaustion
  sink.muxer.write_trailer().map_err(TranscodeError::Write)?;

  Ok(())
}

/// Open the input container, select its best video stream, and open a
/// matching decoder
fn open_source(path: &Path) -> Result<Source, TranscodeError> {
  let mut demuxer = DemuxerContext::open(path).map_err(|source| TranscodeError::OpenInput {
    path: path.to_path_buf(),
    source,
  })?;
  demuxer.probe_streams().map_err(TranscodeError::StreamProbe)?;

  let stream = demuxer
    .find_best_stream(MediaType::Video)
    .ok_or_else(|| TranscodeError::NoVideoStream {
      path: path.to_path_buf(),
    })?;
  let stream_index = stream.index;
  let stream_frame_rate = stream.frame_rate;
  let codec_id = stream.codec_id;
  debug!(
    stream = stream_index,
    codec = codec_id.name(),
    "selected video stream"
  );

  let mut decoder = CodecContext::new_decoder(codec_id).map_err(|err| match err {
    CodecError::DecoderNotFound(id) => TranscodeError::DecoderNotFound(id),
    other => TranscodeError::DecoderInit(other),
  })?;

  {
    let par = demuxer.codec_parameters(stream_index).ok_or_else(|| {
      TranscodeError::DecoderInit(CodecError::InvalidState(
        "selected stream has no codec parameters".into(),
      ))
    })?;
    decoder
      .apply_parameters(&par)
      .map_err(TranscodeError::DecoderInit)?;
  }
  decoder.open().map_err(TranscodeError::DecoderInit)?;

  Ok(Source {
    demuxer,
    stream_index,
    stream_frame_rate,
    decoder,
  })
}

/// Allocate the MP4 output, open the HEVC encoder seeded from the decoder,
/// bind the output stream, and write the container header
fn build_sink(path: &Path, source: &Source, thread_count: u32) -> Result<Sink, TranscodeError> {
  let mut muxer =
    MuxerContext::create(path, OUTPUT_CONTAINER).map_err(|source| TranscodeError::OutputAlloc {
      path: path.to_path_buf(),
      source,
    })?;

  let mut encoder = CodecContext::new_encoder(OUTPUT_CODEC).map_err(|err| match err {
    CodecError::EncoderNotFound(_) => TranscodeError::EncoderNotFound,
    other => TranscodeError::EncoderAlloc(other),
  })?;

  let stream_index = muxer.new_stream().map_err(TranscodeError::StreamAlloc)?;

  let frame_rate = derive_frame_rate(source.decoder.frame_rate(), source.stream_frame_rate);
  let settings = EncoderSettings {
    width: source.decoder.width(),
    height: source.decoder.height(),
    sample_aspect_ratio: source.decoder.sample_aspect_ratio(),
    pixel_format: OUTPUT_PIXEL_FORMAT,
    time_base: frame_rate.inverse(),
    preset: Some(ENCODER_PRESET),
    thread_count,
    global_header: muxer.needs_global_header(),
  };
  debug!(
    width = settings.width,
    height = settings.height,
    time_base = ?settings.time_base,
    threads = thread_count,
    "configuring encoder"
  );
  encoder
    .configure_encoder(&settings)
    .map_err(TranscodeError::EncoderAlloc)?;
  encoder.open().map_err(TranscodeError::EncoderOpen)?;

  // Stream time base must only be adopted after the encoder is open
  muxer
    .configure_stream(stream_index, &encoder)
    .map_err(TranscodeError::ParameterCopy)?;

  muxer.open_io().map_err(|source| TranscodeError::OutputIo {
    path: path.to_path_buf(),
    source,
  })?;
  muxer.write_header().map_err(TranscodeError::HeaderWrite)?;

  Ok(Sink {
    muxer,
    stream_index,
    encoder,
  })
}

/// Frame rate the encoder time base is derived from: what the decoder
/// detected, else what the container states
fn derive_frame_rate(decoder_rate: AVRational, stream_rate: AVRational) -> AVRational {
  if decoder_rate.is_zero() {
    stream_rate
  } else {
    decoder_rate
  }
}

/// Build the pixel converter between the negotiated formats, plus the
/// reusable destination frame
fn build_converter(
  decoder: &CodecContext,
  encoder: &CodecContext,
) -> Result<(Scaler, Frame), TranscodeError> {
  let scaler = Scaler::new(
    decoder.width(),
    decoder.height(),
    decoder.pixel_format(),
    encoder.width(),
    encoder.height(),
    encoder.pixel_format(),
    SCALE_ALGORITHM,
  )
  .map_err(TranscodeError::ScalerInit)?;

  let converted = Frame::new_video(scaler.dst_width(), scaler.dst_height(), scaler.dst_format())
    .map_err(TranscodeError::FrameBufferAlloc)?;

  Ok((scaler, converted))
}

/// The read → decode → convert → encode → write state machine
fn run_transcode_loop(
  source: &mut Source,
  sink: &mut Sink,
  scaler: &Scaler,
  converted: &mut Frame,
) -> Result<(), TranscodeError> {
  loop {
    let packet = match source.demuxer.read_packet() {
      Ok(Some(packet)) => packet,
      Ok(None) => break,
      Err(err) => {
        // Mid-stream read errors end the conversion like a normal EOF;
        // whatever was decodable has been written
        warn!(error = %err, "read error, treating as end of input");
        break;
      }
    };

    if packet.stream_index() != source.stream_index {
      continue;
    }

    source
      .decoder
      .send_packet(Some(&packet))
      .map_err(TranscodeError::DecodeSubmit)?;
    drain_decoder(&mut source.decoder, sink, scaler, converted)?;
  }

  // Input exhausted: flush the decoder, then the encoder, so frames still
  // buffered inside either codec reach the output
  source
    .decoder
    .send_packet(None)
    .map_err(TranscodeError::DecodeSubmit)?;
  drain_decoder(&mut source.decoder, sink, scaler, converted)?;

  sink
    .encoder
    .send_frame(None)
    .map_err(TranscodeError::EncodeSubmit)?;
  drain_encoder(sink)?;

  Ok(())
}

/// Pull every frame the decoder is ready to emit, convert it, and feed it to
/// the encoder
fn drain_decoder(
  decoder: &mut CodecContext,
  sink: &mut Sink,
  scaler: &Scaler,
  converted: &mut Frame,
) -> Result<(), TranscodeError> {
  while let Some(decoded) = decoder
    .receive_frame()
    .map_err(TranscodeError::DecodeReceive)?
  {
    // The encoder may still hold a reference to the previous contents
    converted
      .make_writable()
      .map_err(TranscodeError::FrameConvert)?;
    scaler
      .scale(&decoded, converted)
      .map_err(TranscodeError::FrameConvert)?;

    // Timestamp passes through unchanged; rescaling happens only on output
    // packets
    converted.set_pts(decoded.pts());

    sink
      .encoder
      .send_frame(Some(converted))
      .map_err(TranscodeError::EncodeSubmit)?;
    drain_encoder(sink)?;
  }

  Ok(())
}

/// Pull every packet the encoder is ready to emit and write it to the output
fn drain_encoder(sink: &mut Sink) -> Result<(), TranscodeError> {
  while let Some(mut packet) = sink
    .encoder
    .receive_packet()
    .map_err(TranscodeError::EncodeReceive)?
  {
    // Exact rational rescale from encoder time base to the stream time base
    // the muxer settled on at header time
    packet.rescale_ts(
      sink.encoder.time_base(),
      sink.muxer.stream_time_base(sink.stream_index),
    );
    packet.set_stream_index(sink.stream_index);

    sink
      .muxer
      .write_packet(&mut packet)
      .map_err(TranscodeError::Write)?;
  }

  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn fixed_configuration() {
    // The pipeline's non-configurable choices, pinned down
    assert_eq!(OUTPUT_CONTAINER, "mp4");
    assert_eq!(OUTPUT_CODEC, AVCodecID::HEVC);
    assert_eq!(OUTPUT_PIXEL_FORMAT, AVPixelFormat::YUV420P);
    assert_eq!(ENCODER_PRESET, "medium");
    assert_eq!(SCALE_ALGORITHM, ScaleAlgorithm::Bicubic);
    assert_eq!(crate::codec::frame::FRAME_BUFFER_ALIGNMENT, 32);
  }

  #[test]
  fn frame_rate_prefers_decoder_value() {
    let decoder_rate = AVRational::new(30000, 1001);
    let stream_rate = AVRational::new(25, 1);
    assert_eq!(derive_frame_rate(decoder_rate, stream_rate), decoder_rate);
  }

  #[test]
  fn frame_rate_falls_back_to_stream_value() {
    let stream_rate = AVRational::new(25, 1);
    assert_eq!(
      derive_frame_rate(AVRational::new(0, 1), stream_rate),
      stream_rate
    );
  }

  #[test]
  fn encoder_time_base_is_inverse_frame_rate() {
    let frame_rate = AVRational::new(30, 1);
    assert_eq!(frame_rate.inverse(), AVRational::new(1, 30));
  }
}
