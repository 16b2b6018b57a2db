// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Shared test fixtures: logging setup and a recording in-memory codec.

#![allow(dead_code)]

use std::{
    os::raw::c_int,
    sync::{Arc, Mutex},
};

use lame_session::{Codec, EncoderConfig, Error, OutputBuffer, Result, SampleChunk};

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

/// Initializes a tracing subscriber that respects `RUST_LOG`.
pub fn setup_logging() {
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .init();
    });
}

/// Samples per channel in one emitted frame.
pub const FRAME_SAMPLES: usize = 1152;

/// One call the codec received.
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Open { handle: u32, config: EncoderConfig },
    Finalize { handle: u32 },
    Encode { handle: u32, samples: usize, shared: bool, capacity: usize },
    Flush { handle: u32, capacity: usize },
    Close { handle: u32 },
}

impl Call {
    pub fn handle(&self) -> u32 {
        match self {
            Call::Open { handle, .. }
            | Call::Finalize { handle }
            | Call::Encode { handle, .. }
            | Call::Flush { handle, .. }
            | Call::Close { handle } => *handle,
        }
    }
}

/// Knobs for making the fake codec fail.
#[derive(Clone, Debug, Default)]
pub struct Faults {
    pub open: bool,
    pub finalize: bool,
    pub encode_code: Option<c_int>,
    pub flush_code: Option<c_int>,
}

#[derive(Default)]
struct Shared {
    calls: Vec<Call>,
    next_handle: u32,
    faults: Faults,
}

/// A codec that emits fixed-size frames whose size depends on bitrate, output
/// sample rate and channel count, and records every call it receives.
///
/// Input is buffered until a full frame of [`FRAME_SAMPLES`] is available, like
/// a real frame-based encoder. A frame that does not fit the output buffer
/// yields `-1` and nothing is written. An empty output buffer is rejected with
/// `-1` up front, as `LameCodec` does.
#[derive(Clone, Default)]
pub struct FakeCodec {
    shared: Arc<Mutex<Shared>>,
}

pub struct FakeHandle {
    id: u32,
    config: EncoderConfig,
    pending: usize,
    finalized: bool,
}

impl FakeCodec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_faults(&self, faults: Faults) {
        self.shared.lock().unwrap().faults = faults;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.shared.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    /// Handles opened but not yet closed.
    pub fn live_handles(&self) -> Vec<u32> {
        let calls = self.calls();
        let mut live = Vec::new();
        for call in &calls {
            match call {
                Call::Open { handle, .. } => live.push(*handle),
                Call::Close { handle } => live.retain(|h| h != handle),
                _ => {}
            }
        }
        live
    }

    fn record(&self, call: Call) {
        self.shared.lock().unwrap().calls.push(call);
    }

    fn faults(&self) -> Faults {
        self.shared.lock().unwrap().faults.clone()
    }
}

/// Bytes per emitted frame for `config`.
pub fn frame_bytes(config: &EncoderConfig) -> usize {
    let stereo = (144_000 * config.out_bitrate / config.out_sample_rate) as usize;
    stereo * config.out_channels as usize / 2
}

fn emit(handle: &FakeHandle, frames: usize, out: &mut OutputBuffer<'_>) -> c_int {
    let bytes = frames * frame_bytes(&handle.config);
    if bytes > out.capacity() {
        return -1;
    }
    for (i, byte) in out.as_mut_slice()[..bytes].iter_mut().enumerate() {
        *byte = (handle.id as usize + i) as u8;
    }
    bytes as c_int
}

impl Codec for FakeCodec {
    type Handle = FakeHandle;

    fn open(&self, config: &EncoderConfig) -> Result<FakeHandle> {
        if self.faults().open {
            return Err(Error::InitializationFailed("fake open failure".to_string()));
        }
        let id = {
            let mut shared = self.shared.lock().unwrap();
            shared.next_handle += 1;
            shared.next_handle
        };
        self.record(Call::Open {
            handle: id,
            config: *config,
        });
        Ok(FakeHandle {
            id,
            config: *config,
            pending: 0,
            finalized: false,
        })
    }

    fn finalize_params(&self, handle: &mut FakeHandle) -> Result<()> {
        self.record(Call::Finalize { handle: handle.id });
        if self.faults().finalize {
            return Err(Error::InitializationFailed(
                "fake finalize failure".to_string(),
            ));
        }
        handle.finalized = true;
        Ok(())
    }

    fn encode(
        &self,
        handle: &mut FakeHandle,
        chunk: &SampleChunk<'_>,
        out: &mut OutputBuffer<'_>,
    ) -> c_int {
        self.record(Call::Encode {
            handle: handle.id,
            samples: chunk.samples(),
            shared: chunk.is_shared(),
            capacity: out.capacity(),
        });
        if let Some(code) = self.faults().encode_code {
            return code;
        }
        if !handle.finalized {
            return -3;
        }
        if out.capacity() == 0 {
            return -1;
        }
        let total = handle.pending + chunk.samples();
        let frames = total / FRAME_SAMPLES;
        let written = emit(handle, frames, out);
        if written >= 0 {
            handle.pending = total % FRAME_SAMPLES;
        }
        written
    }

    fn flush(&self, handle: &mut FakeHandle, out: &mut OutputBuffer<'_>) -> c_int {
        self.record(Call::Flush {
            handle: handle.id,
            capacity: out.capacity(),
        });
        if let Some(code) = self.faults().flush_code {
            return code;
        }
        if !handle.finalized {
            return -3;
        }
        if out.capacity() == 0 {
            return -1;
        }
        let frames = usize::from(handle.pending > 0);
        let written = emit(handle, frames, out);
        if written >= 0 {
            handle.pending = 0;
        }
        written
    }

    fn close(&self, handle: FakeHandle) {
        self.record(Call::Close { handle: handle.id });
    }
}
