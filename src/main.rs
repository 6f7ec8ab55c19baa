//! Command-line front end for the conversion pipeline.

use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hevconv::convert_to_h265;
use hevconv::ffi::avutil::{log_level, set_native_log_level};

/// Convert a video file to an H.265/HEVC MP4 file
#[derive(Parser, Debug)]
#[command(name = "hevconv")]
#[command(version)]
#[command(about = "Convert a video file to an H.265/HEVC MP4 file")]
struct Args {
  /// Input video file
  input: PathBuf,

  /// Output MP4 file
  output: PathBuf,

  /// Number of encoder threads (0 lets the encoder decide)
  #[arg(short, long, default_value_t = 0)]
  threads: u32,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  // Keep libav's own stderr output down to real errors; our tracing layer
  // reports everything else
  set_native_log_level(log_level::ERROR);

  let args = Args::parse();

  match convert_to_h265(&args.input, &args.output, args.threads) {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err}");
      let mut cause = err.source();
      while let Some(source) = cause {
        eprintln!("  caused by: {source}");
        cause = source.source();
      }
      ExitCode::FAILURE
    }
  }
}
