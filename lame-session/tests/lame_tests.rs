// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Tests against the real `libmp3lame`.
//!
//! # Requirements
//!
//! - `libmp3lame` must be loadable from `config::default_library_path()`
//!   (set `LAME_LIBRARY_PATH` to point elsewhere)
//!
//! Each test logs a warning and returns early when the library is missing.

mod common;

use common::setup_logging;
use lame_session::{
    EncoderConfig, EncoderSession, Error, LameCodec, SampleChunk, SessionState, bridge, config,
    load_api,
};
use tracing::{info, warn};

/// Bytes in one 128 kbps, 44.1 kHz MPEG-1 Layer III frame (without padding).
const FRAME_BYTES_128K: usize = 417;

fn setup_test() -> Option<EncoderSession<LameCodec>> {
    setup_logging();
    match load_api(config::default_library_path()) {
        Ok(api) => {
            info!("Using LAME {}", api.version().unwrap_or_default());
            Some(EncoderSession::new(LameCodec::new(api)))
        }
        Err(error) => {
            warn!("Skipping test, libmp3lame not available: {}", error);
            None
        }
    }
}

/// Encodes one frame of silence, flushes and closes.
#[test]
fn silent_stereo_frame_roundtrip() {
    let Some(mut session) = setup_test() else {
        return;
    };
    session
        .open(EncoderConfig::new(44100, 2, 44100, 128).with_quality(2))
        .unwrap();

    let silence = vec![0i16; 1152];
    let chunk = SampleChunk::new(&silence, &silence, 1152).unwrap();
    let mut out = vec![0u8; 2 * FRAME_BYTES_128K + 2];
    let written = session.encode(&chunk, &mut out).unwrap();
    assert!(written <= out.len());

    let mut tail = vec![0u8; bridge::FLUSH_CAPACITY];
    let flushed = session.flush(&mut tail).unwrap();
    assert!(flushed <= tail.len());
    assert!(written + flushed > 0);

    session.close();
    assert_eq!(session.state(), SessionState::Closed);
}

/// Output size follows the bitrate of the most recent open.
#[test]
fn reopen_with_lower_bitrate_shrinks_output() {
    let Some(mut session) = setup_test() else {
        return;
    };
    let tone: Vec<i16> = (0..44100)
        .map(|i| ((i as f32 * 0.0627).sin() * 12000.0) as i16)
        .collect();

    let mut encode_all = |bitrate: u32| -> usize {
        session
            .open(EncoderConfig::new(44100, 2, 44100, bitrate))
            .unwrap();
        let mut total = 0;
        let mut out = vec![0u8; bridge::recommended_capacity(4608)];
        for block in tone.chunks(4608) {
            let chunk = SampleChunk::mono(block, block.len()).unwrap();
            total += session.encode(&chunk, &mut out).unwrap();
        }
        total += session.flush(&mut out).unwrap();
        total
    };

    let high = encode_all(192);
    let low = encode_all(64);
    assert!(low < high, "64 kbps produced {low} bytes, 192 kbps {high}");
}

/// A buffer far below one frame is rejected with a negative code and the
/// session keeps working.
#[test]
fn tiny_buffer_reports_codec_code() {
    let Some(mut session) = setup_test() else {
        return;
    };
    session
        .open(EncoderConfig::new(44100, 1, 44100, 128))
        .unwrap();
    let pcm = vec![0i16; 1152 * 8];
    let chunk = SampleChunk::mono(&pcm, pcm.len()).unwrap();

    let mut tiny = [0u8; 1];
    match session.encode(&chunk, &mut tiny) {
        Ok(written) => assert!(written <= 1),
        Err(error) => assert!(error.codec_code().is_some_and(|code| code < 0)),
    }
    assert!(session.is_open());

    let mut tail = vec![0u8; bridge::recommended_capacity(pcm.len())];
    let flushed = session.flush(&mut tail).unwrap();
    assert!(flushed <= tail.len());
}

/// Encodes into the first `capacity` bytes of a larger buffer and checks that
/// nothing past the declared capacity was touched.
fn encode_bounded(
    session: &mut EncoderSession<LameCodec>,
    chunk: &SampleChunk<'_>,
    capacity: usize,
) -> Result<usize, Error> {
    const SENTINEL: u8 = 0xA5;
    let mut region = vec![SENTINEL; capacity + 4096];
    let result = session.encode(chunk, &mut region[..capacity]);
    if let Ok(written) = &result {
        assert!(*written <= capacity);
    }
    assert!(
        region[capacity..].iter().all(|&byte| byte == SENTINEL),
        "bytes written past a capacity of {capacity}"
    );
    result
}

/// An empty output buffer is refused before LAME sees it.
#[test]
fn zero_capacity_is_rejected() {
    let Some(mut session) = setup_test() else {
        return;
    };
    session
        .open(EncoderConfig::new(44100, 2, 44100, 128))
        .unwrap();
    let pcm = vec![0i16; 1152 * 8];
    let chunk = SampleChunk::mono(&pcm, pcm.len()).unwrap();

    let result = encode_bounded(&mut session, &chunk, 0);
    assert!(matches!(result, Err(Error::EncodeFailed(-1))), "{result:?}");
    assert!(matches!(session.flush(&mut []), Err(Error::FlushFailed(-1))));
    assert!(session.is_open());
}

/// Around one frame of capacity LAME either fits its output or reports a
/// negative code, and never writes past the end.
#[test]
fn capacity_around_one_frame_is_respected() {
    let Some(mut session) = setup_test() else {
        return;
    };
    let tone: Vec<i16> = (0..1152 * 8)
        .map(|i| ((i as f32 * 0.0627).sin() * 12000.0) as i16)
        .collect();
    let chunk = SampleChunk::mono(&tone, tone.len()).unwrap();

    for capacity in [
        FRAME_BYTES_128K - 1,
        FRAME_BYTES_128K,
        FRAME_BYTES_128K + 1,
    ] {
        session
            .open(EncoderConfig::new(44100, 2, 44100, 128))
            .unwrap();
        match encode_bounded(&mut session, &chunk, capacity) {
            Ok(written) => assert!(written <= capacity),
            Err(error) => assert!(error.codec_code().is_some_and(|code| code < 0)),
        }
        assert!(session.is_open());
    }
    session.close();
}

/// A shared object that is not LAME is refused at load time.
#[cfg(target_os = "linux")]
#[test]
fn foreign_library_is_rejected() {
    setup_logging();
    match load_api("libc.so.6") {
        Err(Error::InitializationFailed(msg)) => assert!(msg.contains("lame_init"), "{msg}"),
        Err(Error::LibLoading(error)) => warn!("Skipping test, libc.so.6 not loadable: {}", error),
        Err(other) => panic!("unexpected error {other:?}"),
        Ok(_) => panic!("libc.so.6 accepted as LAME"),
    }
}
