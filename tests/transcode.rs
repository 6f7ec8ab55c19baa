//! End-to-end tests for the conversion pipeline.
//!
//! Inputs are synthesized with the crate's own wrappers, encoded with MPEG-4
//! part 2 (present in every FFmpeg build). Tests that need an HEVC encoder
//! skip themselves when the local FFmpeg build lacks one.

use std::fs;
use std::path::{Path, PathBuf};

use hevconv::codec::{
  CodecContext, DemuxerContext, EncoderSettings, Frame, MediaType, MuxerContext,
};
use hevconv::ffi::{AVCodecID, AVPixelFormat, AVRational};
use hevconv::transcode::{convert_to_h265, TranscodeError};

fn temp_path(name: &str) -> PathBuf {
  let path = std::env::temp_dir().join(format!("hevconv-test-{}-{name}", std::process::id()));
  let _ = fs::remove_file(&path);
  path
}

fn hevc_available() -> bool {
  CodecContext::new_encoder(AVCodecID::HEVC).is_ok()
}

/// Fill a YUV 4:2:0 frame with a per-frame gradient so consecutive frames
/// differ
fn fill_frame(frame: &mut Frame, index: usize) {
  let width = frame.width() as usize;
  let height = frame.height() as usize;
  let shift = (index * 7) as u8;

  let linesize = frame.linesize(0) as usize;
  let luma = frame.plane_data_mut(0).unwrap();
  for y in 0..height {
    for x in 0..width {
      luma[y * linesize + x] = (x as u8).wrapping_add(shift);
    }
  }

  for plane in 1..=2 {
    let linesize = frame.linesize(plane) as usize;
    let chroma = frame.plane_data_mut(plane).unwrap();
    for y in 0..height / 2 {
      for x in 0..width / 2 {
        chroma[y * linesize + x] = 128;
      }
    }
  }
}

/// Encode `frames` synthetic frames into an MP4 file at `path`
fn write_sample_input(path: &Path, frames: usize, width: u32, height: u32) {
  let mut muxer = MuxerContext::create(path, "mp4").unwrap();

  let mut encoder = CodecContext::new_encoder(AVCodecID::MPEG4).unwrap();
  let settings = EncoderSettings {
    width,
    height,
    sample_aspect_ratio: AVRational::new(1, 1),
    pixel_format: AVPixelFormat::YUV420P,
    time_base: AVRational::new(1, 30),
    preset: None,
    thread_count: 1,
    global_header: muxer.needs_global_header(),
  };
  encoder.configure_encoder(&settings).unwrap();
  encoder.open().unwrap();

  let stream_index = muxer.new_stream().unwrap();
  muxer.configure_stream(stream_index, &encoder).unwrap();
  muxer.open_io().unwrap();
  muxer.write_header().unwrap();

  let mut frame = Frame::new_video(width, height, AVPixelFormat::YUV420P).unwrap();
  for i in 0..frames {
    frame.make_writable().unwrap();
    fill_frame(&mut frame, i);
    frame.set_pts(i as i64);
    encoder.send_frame(Some(&frame)).unwrap();
    write_pending(&mut encoder, &mut muxer, stream_index);
  }

  encoder.send_frame(None).unwrap();
  write_pending(&mut encoder, &mut muxer, stream_index);
  muxer.write_trailer().unwrap();
}

fn write_pending(encoder: &mut CodecContext, muxer: &mut MuxerContext, stream_index: i32) {
  while let Some(mut packet) = encoder.receive_packet().unwrap() {
    packet.rescale_ts(encoder.time_base(), muxer.stream_time_base(stream_index));
    packet.set_stream_index(stream_index);
    muxer.write_packet(&mut packet).unwrap();
  }
}

/// Decode the best video stream of `path`, returning the presentation
/// timestamps in decode-output (presentation) order
fn decoded_frame_pts(path: &Path) -> Vec<i64> {
  let mut demuxer = DemuxerContext::open(path).unwrap();
  demuxer.probe_streams().unwrap();

  let stream = demuxer.find_best_stream(MediaType::Video).unwrap();
  let stream_index = stream.index;
  let codec_id = stream.codec_id;

  let mut decoder = CodecContext::new_decoder(codec_id).unwrap();
  {
    let par = demuxer.codec_parameters(stream_index).unwrap();
    decoder.apply_parameters(&par).unwrap();
  }
  decoder.open().unwrap();

  let mut pts = Vec::new();
  while let Some(packet) = demuxer.read_packet().unwrap() {
    if packet.stream_index() != stream_index {
      continue;
    }
    decoder.send_packet(Some(&packet)).unwrap();
    while let Some(frame) = decoder.receive_frame().unwrap() {
      pts.push(frame.pts());
    }
  }
  decoder.send_packet(None).unwrap();
  while let Some(frame) = decoder.receive_frame().unwrap() {
    pts.push(frame.pts());
  }

  pts
}

/// Minimal 16-bit mono PCM WAV file (audio-only input)
fn wav_bytes() -> Vec<u8> {
  let samples: u32 = 256;
  let data_len = samples * 2;

  let mut bytes = Vec::new();
  bytes.extend_from_slice(b"RIFF");
  bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
  bytes.extend_from_slice(b"WAVE");
  bytes.extend_from_slice(b"fmt ");
  bytes.extend_from_slice(&16u32.to_le_bytes());
  bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
  bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
  bytes.extend_from_slice(&8000u32.to_le_bytes()); // sample rate
  bytes.extend_from_slice(&16000u32.to_le_bytes()); // byte rate
  bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
  bytes.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
  bytes.extend_from_slice(b"data");
  bytes.extend_from_slice(&data_len.to_le_bytes());
  bytes.resize(bytes.len() + data_len as usize, 0);
  bytes
}

#[test]
fn converts_synthetic_video_to_hevc_mp4() {
  if !hevc_available() {
    eprintln!("skipping: no HEVC encoder in this FFmpeg build");
    return;
  }

  let input = temp_path("roundtrip-in.mp4");
  let output = temp_path("roundtrip-out.mp4");
  write_sample_input(&input, 10, 1280, 720);

  convert_to_h265(&input, &output, 0).unwrap();

  let mut demuxer = DemuxerContext::open(&output).unwrap();
  demuxer.probe_streams().unwrap();
  assert_eq!(demuxer.streams().len(), 1, "exactly one output stream");
  let stream = demuxer.find_best_stream(MediaType::Video).unwrap();
  assert_eq!(stream.codec_id, AVCodecID::HEVC);
  assert_eq!(stream.width, Some(1280));
  assert_eq!(stream.height, Some(720));
  drop(demuxer);

  let pts = decoded_frame_pts(&output);
  assert!(
    (9..=11).contains(&pts.len()),
    "expected 10 frames (within flush tolerance), got {}",
    pts.len()
  );
  assert!(
    pts.windows(2).all(|w| w[0] <= w[1]),
    "output pts must be monotonically non-decreasing: {pts:?}"
  );

  let _ = fs::remove_file(&input);
  let _ = fs::remove_file(&output);
}

#[test]
fn audio_only_input_fails_with_no_video_stream() {
  let input = temp_path("audio-only.wav");
  let output = temp_path("audio-only-out.mp4");
  fs::write(&input, wav_bytes()).unwrap();

  let err = convert_to_h265(&input, &output, 0).unwrap_err();
  assert!(
    matches!(err, TranscodeError::NoVideoStream { .. }),
    "unexpected error: {err:?}"
  );
  assert!(!output.exists(), "no output file may be created");

  let _ = fs::remove_file(&input);
}

#[test]
fn missing_input_fails_with_open_input() {
  let output = temp_path("missing-out.mp4");
  let err = convert_to_h265("/nonexistent/input.mp4", &output, 0).unwrap_err();
  assert!(
    matches!(err, TranscodeError::OpenInput { .. }),
    "unexpected error: {err:?}"
  );
  assert!(!output.exists());
}

#[test]
fn unwritable_output_fails_with_output_io() {
  if !hevc_available() {
    eprintln!("skipping: no HEVC encoder in this FFmpeg build");
    return;
  }

  let input = temp_path("unwritable-in.mp4");
  write_sample_input(&input, 2, 320, 240);

  let err = convert_to_h265(&input, "/nonexistent-dir/out.mp4", 0).unwrap_err();
  assert!(
    matches!(err, TranscodeError::OutputIo { .. }),
    "unexpected error: {err:?}"
  );

  // All input-side resources were released on the failure path; the file is
  // free to delete
  fs::remove_file(&input).unwrap();
}

#[test]
fn zero_frame_video_stream_converts_cleanly() {
  if !hevc_available() {
    eprintln!("skipping: no HEVC encoder in this FFmpeg build");
    return;
  }

  // A Y4M stream header declares geometry and pixel format up front, so a
  // video stream with zero frames is still fully described
  let input = temp_path("zero-frames-in.y4m");
  let output = temp_path("zero-frames-out.mp4");
  fs::write(&input, b"YUV4MPEG2 W320 H240 F30:1 Ip A1:1 C420\n").unwrap();

  convert_to_h265(&input, &output, 0).unwrap();

  assert!(output.exists(), "trailer-finalized output must exist");
  let pts = decoded_frame_pts(&output);
  assert!(pts.is_empty(), "no frames expected, got {pts:?}");

  let _ = fs::remove_file(&input);
  let _ = fs::remove_file(&output);
}
