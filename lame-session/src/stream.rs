// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Encoding a PCM byte stream end to end.
//!
//! [`StreamEncoder`] drives one [`EncoderSession`] over any [`Read`] of
//! interleaved signed 16-bit little-endian PCM and writes the compressed
//! stream to any [`Write`]. The session is closed when the run ends, whether
//! it succeeded or not.

use std::{
    io::{self, Read, Write},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use tracing::{info, warn};

use crate::{
    Codec, EncoderConfig, EncoderSession, Result, SampleChunk,
    bridge::{FLUSH_CAPACITY, recommended_capacity},
};

/// Samples per channel read per chunk unless configured otherwise
/// (four MPEG-1 Layer III frames).
pub const DEFAULT_CHUNK_SAMPLES: usize = 4 * 1152;

const BYTES_PER_SAMPLE: usize = 2;

/// Requests that a running [`StreamEncoder`] stop after the current chunk.
///
/// Cheap to clone and safe to trigger from another thread. A stopped run still
/// flushes and closes its session. Each run starts by clearing the request, so
/// a stop only ends the run in progress.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    /// Asks the encoder to stop.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Returns `true` once [`Self::stop`] was called during the current run.
    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    fn reset(&self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Totals of one [`StreamEncoder::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks submitted to the codec.
    pub chunks: u64,
    /// Samples per channel submitted to the codec.
    pub samples: u64,
    /// Compressed bytes written to the sink, flush output included.
    pub bytes_written: u64,
}

/// Reads PCM, encodes it chunk by chunk and writes the result.
///
/// The input's channel count is the configured `out_channels`. Mono input is
/// handed to the codec as the same slice for both channels.
///
/// # Examples
///
/// ```no_run
/// use lame_session::{EncoderConfig, LameCodec, StreamEncoder, config, load_api};
///
/// # fn main() -> Result<(), lame_session::Error> {
/// let api = load_api(config::default_library_path())?;
/// let pcm = std::fs::File::open("voice.pcm")?;
/// let mp3 = std::fs::File::create("voice.mp3")?;
///
/// let mut encoder = StreamEncoder::new(LameCodec::new(api), EncoderConfig::new(8000, 1, 8000, 32));
/// let stats = encoder.run(pcm, mp3)?;
/// println!("{} bytes", stats.bytes_written);
/// # Ok(())
/// # }
/// ```
pub struct StreamEncoder<C: Codec> {
    session: EncoderSession<C>,
    config: EncoderConfig,
    chunk_samples: usize,
    stop: StopHandle,
}

impl<C: Codec> StreamEncoder<C> {
    /// Creates an encoder that opens a session with `config` on every run.
    pub fn new(codec: C, config: EncoderConfig) -> Self {
        Self {
            session: EncoderSession::new(codec),
            config,
            chunk_samples: DEFAULT_CHUNK_SAMPLES,
            stop: StopHandle::default(),
        }
    }

    /// Sets how many samples per channel are read per chunk (at least one).
    pub fn with_chunk_samples(mut self, chunk_samples: usize) -> Self {
        self.chunk_samples = chunk_samples.max(1);
        self
    }

    /// Returns a handle that stops the run in progress.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// The session used for runs; closed between runs.
    pub fn session(&self) -> &EncoderSession<C> {
        &self.session
    }

    /// Encodes `source` into `sink` until end of input or a stop request.
    ///
    /// A trailing partial sample frame at end of input is dropped.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::InitializationFailed`] if the session cannot be opened
    /// - [`crate::Error::Io`] if reading or writing fails
    /// - [`crate::Error::EncodeFailed`] / [`crate::Error::FlushFailed`] from the codec
    ///
    /// The session is closed before any error is returned. Encoding stops at
    /// the first error and the trailing flush is skipped.
    pub fn run<R: Read, W: Write>(&mut self, mut source: R, mut sink: W) -> Result<StreamStats> {
        self.stop.reset();
        self.session.open(self.config)?;
        let result = self
            .pump(&mut source, &mut sink)
            .and_then(|stats| self.finish(&mut sink, stats));
        self.session.close();

        if let Ok(stats) = &result {
            info!(
                "Encoded {} sample(s) in {} chunk(s) into {} byte(s)",
                stats.samples, stats.chunks, stats.bytes_written
            );
        }
        result
    }

    fn pump<R: Read, W: Write>(&mut self, source: &mut R, sink: &mut W) -> Result<StreamStats> {
        let channels = self.config.out_channels as usize;
        let frame_bytes = channels * BYTES_PER_SAMPLE;
        let mut pcm = vec![0u8; self.chunk_samples * frame_bytes];
        let mut left = vec![0i16; self.chunk_samples];
        let mut right = vec![0i16; if channels == 2 { self.chunk_samples } else { 0 }];
        let mut out = vec![0u8; recommended_capacity(self.chunk_samples)];
        let mut stats = StreamStats::default();

        while !self.stop.is_stopped() {
            let filled = fill(source, &mut pcm)?;
            let frames = filled / frame_bytes;
            if filled % frame_bytes != 0 {
                warn!(
                    "Dropping {} trailing byte(s) of an incomplete sample frame",
                    filled % frame_bytes
                );
            }

            if frames > 0 {
                let chunk = if channels == 2 {
                    for (i, frame) in pcm[..frames * frame_bytes].chunks_exact(4).enumerate() {
                        left[i] = i16::from_le_bytes([frame[0], frame[1]]);
                        right[i] = i16::from_le_bytes([frame[2], frame[3]]);
                    }
                    SampleChunk::new(&left, &right, frames)?
                } else {
                    for (i, sample) in pcm[..frames * frame_bytes].chunks_exact(2).enumerate() {
                        left[i] = i16::from_le_bytes([sample[0], sample[1]]);
                    }
                    SampleChunk::mono(&left, frames)?
                };

                let written = self.session.encode(&chunk, &mut out)?;
                if written > 0 {
                    sink.write_all(&out[..written])?;
                }
                stats.chunks += 1;
                stats.samples += frames as u64;
                stats.bytes_written += written as u64;
            }

            if filled < pcm.len() {
                break;
            }
        }
        if self.stop.is_stopped() {
            info!("Stream encoding stopped on request");
        }
        Ok(stats)
    }

    fn finish<W: Write>(&mut self, sink: &mut W, mut stats: StreamStats) -> Result<StreamStats> {
        let mut tail = vec![0u8; FLUSH_CAPACITY];
        let written = self.session.flush(&mut tail)?;
        if written > 0 {
            sink.write_all(&tail[..written])?;
        }
        sink.flush()?;
        stats.bytes_written += written as u64;
        Ok(stats)
    }
}

/// Reads until `buf` is full or the source is exhausted.
fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
            Err(error) => return Err(error),
        }
    }
    Ok(filled)
}
