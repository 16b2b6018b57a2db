// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! The codec boundary and its LAME implementation.
//!
//! [`Codec`] is everything an [`crate::EncoderSession`] needs from a
//! compression engine. Streaming calls return the engine's raw integer result
//! (byte count or negative code); interpreting it is the session's job.

use std::{os::raw::c_int, ptr::NonNull};

use tracing::{debug, warn};

use crate::{EncoderConfig, Error, LameApiHandle, OutputBuffer, Result, SampleChunk};

/// A streaming encoder engine treated as a black box.
///
/// Implementations must bound every write by [`OutputBuffer::capacity`] and
/// must not keep references to chunks or output buffers after returning. A
/// zero capacity means no room at all: `encode` and `flush` must return a
/// negative code for it rather than writing.
pub trait Codec {
    /// Per-stream engine state, exclusively owned by one session.
    type Handle;

    /// Creates a handle and applies every setting in `config`.
    ///
    /// Must not finalize parameters; the session calls
    /// [`Codec::finalize_params`] separately.
    fn open(&self, config: &EncoderConfig) -> Result<Self::Handle>;

    /// Completes configuration. Called exactly once per handle, after
    /// [`Codec::open`] and before any encode or flush.
    fn finalize_params(&self, handle: &mut Self::Handle) -> Result<()>;

    /// Encodes `chunk`, returning bytes written to `out` or a negative code.
    fn encode(
        &self,
        handle: &mut Self::Handle,
        chunk: &SampleChunk<'_>,
        out: &mut OutputBuffer<'_>,
    ) -> c_int;

    /// Emits buffered trailing data, returning bytes written or a negative code.
    fn flush(&self, handle: &mut Self::Handle, out: &mut OutputBuffer<'_>) -> c_int;

    /// Releases the handle.
    fn close(&self, handle: Self::Handle);
}

/// Owned `lame_global_flags` pointer.
///
/// Only reachable through [`LameCodec`]; never null.
pub struct LameHandle {
    flags: NonNull<lame_sys::lame_global_flags>,
}

// Safety: LAME state is not shared between handles; a handle moved to another
// thread is used from that thread only, and sessions serialize calls on it.
unsafe impl Send for LameHandle {}

/// [`Codec`] backed by a runtime-loaded `libmp3lame`.
///
/// # Examples
///
/// ```no_run
/// use lame_session::{EncoderConfig, EncoderSession, LameCodec, SampleChunk, load_api};
///
/// # fn main() -> Result<(), lame_session::Error> {
/// let api = load_api("libmp3lame.so.0")?;
/// let mut session = EncoderSession::new(LameCodec::new(api));
/// session.open(EncoderConfig::new(44100, 2, 44100, 128))?;
///
/// let silence = [0i16; 1152];
/// let mut mp3 = vec![0u8; 16 * 1024];
/// let written = session.encode(&SampleChunk::mono(&silence, 1152)?, &mut mp3)?;
/// println!("{written} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LameCodec {
    api: LameApiHandle,
}

impl LameCodec {
    /// Creates a codec over a loaded library.
    pub fn new(api: LameApiHandle) -> Self {
        Self { api }
    }

    /// The library this codec calls into.
    pub fn api(&self) -> &LameApiHandle {
        &self.api
    }

    fn apply_settings(
        &self,
        flags: *mut lame_sys::lame_global_flags,
        config: &EncoderConfig,
    ) -> Result<()> {
        let raw = self.api.raw();
        // Ranges were validated by the session, so the casts cannot wrap.
        let in_rate = config.in_sample_rate as c_int;
        let channels = config.out_channels as c_int;
        let out_rate = config.out_sample_rate as c_int;
        let bitrate = config.out_bitrate as c_int;
        let quality = config.quality as c_int;
        let setters: [(&str, &dyn Fn() -> c_int); 5] = [
            ("input sample rate", &|| unsafe {
                raw.lame_set_in_samplerate(flags, in_rate)
            }),
            ("channel count", &|| unsafe {
                raw.lame_set_num_channels(flags, channels)
            }),
            ("output sample rate", &|| unsafe {
                raw.lame_set_out_samplerate(flags, out_rate)
            }),
            ("bitrate", &|| unsafe { raw.lame_set_brate(flags, bitrate) }),
            ("quality", &|| unsafe { raw.lame_set_quality(flags, quality) }),
        ];
        apply_in_order(&setters)
    }
}

/// Calls each setter in turn and stops at the first one that does not return
/// `LAME_OKAY`; later setters never run on a rejected handle.
fn apply_in_order(setters: &[(&str, &dyn Fn() -> c_int)]) -> Result<()> {
    for (name, set) in setters {
        let status = set();
        if status != lame_sys::LAME_OKAY {
            return Err(Error::InitializationFailed(format!(
                "setting {name} was rejected with code {status}"
            )));
        }
    }
    Ok(())
}

impl Codec for LameCodec {
    type Handle = LameHandle;

    fn open(&self, config: &EncoderConfig) -> Result<LameHandle> {
        let flags = NonNull::new(unsafe { self.api.raw().lame_init() }).ok_or_else(|| {
            Error::InitializationFailed("lame_init returned no handle".to_string())
        })?;
        let handle = LameHandle { flags };
        if let Err(error) = self.apply_settings(handle.flags.as_ptr(), config) {
            self.close(handle);
            return Err(error);
        }
        debug!(
            "LAME handle configured ({})",
            self.api.version().unwrap_or_else(|| "unknown version".to_string())
        );
        Ok(handle)
    }

    fn finalize_params(&self, handle: &mut LameHandle) -> Result<()> {
        let status = unsafe { self.api.raw().lame_init_params(handle.flags.as_ptr()) };
        if status < 0 {
            return Err(Error::InitializationFailed(format!(
                "lame_init_params failed with code {status}"
            )));
        }
        Ok(())
    }

    fn encode(
        &self,
        handle: &mut LameHandle,
        chunk: &SampleChunk<'_>,
        out: &mut OutputBuffer<'_>,
    ) -> c_int {
        // LAME reads a size of 0 as "unbounded".
        if out.capacity() == 0 {
            return lame_sys::LAME_GENERICERROR;
        }
        let capacity = out.capacity_c_int();
        unsafe {
            self.api.raw().lame_encode_buffer(
                handle.flags.as_ptr(),
                chunk.left().as_ptr(),
                chunk.right().as_ptr(),
                chunk.samples_c_int(),
                out.as_mut_ptr(),
                capacity,
            )
        }
    }

    fn flush(&self, handle: &mut LameHandle, out: &mut OutputBuffer<'_>) -> c_int {
        if out.capacity() == 0 {
            return lame_sys::LAME_GENERICERROR;
        }
        let capacity = out.capacity_c_int();
        unsafe {
            self.api
                .raw()
                .lame_encode_flush(handle.flags.as_ptr(), out.as_mut_ptr(), capacity)
        }
    }

    fn close(&self, handle: LameHandle) {
        let status = unsafe { self.api.raw().lame_close(handle.flags.as_ptr()) };
        if status != lame_sys::LAME_OKAY {
            warn!("lame_close returned {}", status);
        }
    }
}
