// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Encodes a raw PCM file (signed 16-bit little-endian, interleaved) to MP3.
//!
//! ```text
//! cargo run --example pcm_to_mp3 -- --input voice.pcm --output voice.mp3 \
//!     --sample-rate 8000 --channels 1 --bitrate 32
//! ```

mod common;

use std::{fs::File, io::BufReader, io::BufWriter, path::PathBuf};

use clap::Parser;
use lame_session::{EncoderConfig, LameCodec, StreamEncoder, config, load_api};
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(version, about = "Encode raw PCM to MP3 with libmp3lame")]
struct Opts {
    /// Raw PCM input file.
    #[arg(short, long)]
    input: PathBuf,

    /// MP3 output file.
    #[arg(short, long)]
    output: PathBuf,

    /// Input sample rate in Hz.
    #[arg(long, default_value_t = 44100)]
    sample_rate: u32,

    /// Channels in the input and the encoded stream (1 or 2).
    #[arg(long, default_value_t = 2)]
    channels: u32,

    /// Output sample rate in Hz (defaults to the input rate).
    #[arg(long)]
    out_sample_rate: Option<u32>,

    /// Output bitrate in kbps.
    #[arg(long, default_value_t = 128)]
    bitrate: u32,

    /// Quality, 0 (best) to 9 (fastest).
    #[arg(long, default_value_t = config::DEFAULT_QUALITY)]
    quality: u32,

    /// JSON encoder configuration; overrides the individual options.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to libmp3lame.
    #[arg(long, env = config::LIBRARY_PATH_ENV)]
    library: Option<PathBuf>,
}

fn main() {
    common::setup_logging();
    let opts = Opts::parse();
    if let Err(err) = run(opts) {
        error!("Encoding failed: {}", err);
        std::process::exit(1);
    }
}

fn run(opts: Opts) -> Result<(), lame_session::Error> {
    let encoder_config = match &opts.config {
        Some(path) => EncoderConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => EncoderConfig::new(
            opts.sample_rate,
            opts.channels,
            opts.out_sample_rate.unwrap_or(opts.sample_rate),
            opts.bitrate,
        )
        .with_quality(opts.quality),
    };

    let api = load_api(opts.library.unwrap_or_else(config::default_library_path))?;
    info!("Loaded LAME {}", api.version().unwrap_or_default());

    let source = BufReader::new(File::open(&opts.input)?);
    let sink = BufWriter::new(File::create(&opts.output)?);

    let mut encoder = StreamEncoder::new(LameCodec::new(api), encoder_config);
    let stats = encoder.run(source, sink)?;
    info!(
        "Wrote {} byte(s) to {} ({} sample(s) per channel)",
        stats.bytes_written,
        opts.output.display(),
        stats.samples
    );
    Ok(())
}
