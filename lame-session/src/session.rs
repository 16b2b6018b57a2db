// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Encoder session lifecycle.
//!
//! [`EncoderSession`] owns at most one codec handle and moves between two
//! states:
//!
//! ```text
//!            open(ok)                    open(ok): close old, open new
//!  Closed ─────────────► Open ◄───────┐
//!    ▲  │                  │  └────────┘
//!    │  └─ close (no-op)   │ close
//!    └─────────────────────┘
//! ```
//!
//! `encode` and `flush` are only defined on `Open` and return
//! [`Error::InvalidStateUse`] otherwise, without reaching the codec.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::{
    Codec, EncoderConfig, Error, OutputBuffer, Result, SampleChunk, bridge,
    error::describe_code,
};

/// Observable state of an [`EncoderSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No codec handle is held.
    Closed,
    /// A configured codec handle is held and accepts encode/flush calls.
    Open,
}

/// Everything that only exists while a session is open.
struct OpenStream<H> {
    handle: H,
    config: EncoderConfig,
    id: Uuid,
}

/// A single encoder stream from `open` to `close`.
///
/// The session exclusively owns its codec handle; the handle is created by
/// [`EncoderSession::open`] and released by [`EncoderSession::close`], by a
/// later `open`, or when the session is dropped. Sample chunks and output
/// buffers are borrowed for the duration of one call.
///
/// Calls are synchronous and take `&mut self`. Use [`SharedSession`] when
/// several owners need to drive the same stream.
///
/// # Examples
///
/// ```no_run
/// use lame_session::{
///     EncoderConfig, EncoderSession, LameCodec, SampleChunk, bridge, config, load_api,
/// };
///
/// # fn main() -> Result<(), lame_session::Error> {
/// let api = load_api(config::default_library_path())?;
/// let mut session = EncoderSession::new(LameCodec::new(api));
/// session.open(EncoderConfig::new(44100, 2, 44100, 128).with_quality(2))?;
///
/// let left = vec![0i16; 1152];
/// let right = vec![0i16; 1152];
/// let mut mp3 = vec![0u8; bridge::recommended_capacity(1152)];
/// let chunk = SampleChunk::new(&left, &right, 1152)?;
/// let n = session.encode(&chunk, &mut mp3)?;
/// // write &mp3[..n] somewhere
///
/// let mut tail = vec![0u8; bridge::FLUSH_CAPACITY];
/// let n = session.flush(&mut tail)?;
/// // write &tail[..n] somewhere
///
/// session.close();
/// # Ok(())
/// # }
/// ```
pub struct EncoderSession<C: Codec> {
    codec: C,
    stream: Option<OpenStream<C::Handle>>,
}

impl<C: Codec> EncoderSession<C> {
    /// Creates a closed session over `codec`.
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            stream: None,
        }
    }

    /// Opens the session with `config`.
    ///
    /// A currently open handle is closed first. The new handle gets every
    /// setting applied and is then finalized exactly once before it becomes
    /// usable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailed`] if the configuration is out of
    /// range or the codec cannot create or finalize a handle. The session is
    /// `Closed` afterwards in either case.
    pub fn open(&mut self, config: EncoderConfig) -> Result<()> {
        if let Some(previous) = &self.stream {
            info!(
                "Replacing open encoder session {} with a new one",
                previous.id
            );
            self.close();
        }

        config.validate()?;
        let mut handle = self.codec.open(&config)?;
        if let Err(error) = self.codec.finalize_params(&mut handle) {
            self.codec.close(handle);
            return Err(error);
        }

        let id = Uuid::new_v4();
        info!(
            "Opened encoder session {}: {} Hz -> {} Hz, {} channel(s), {} kbps, quality {}",
            id,
            config.in_sample_rate,
            config.out_sample_rate,
            config.out_channels,
            config.out_bitrate,
            config.quality
        );
        self.stream = Some(OpenStream { handle, config, id });
        Ok(())
    }

    /// Encodes one chunk into `out`, returning the number of bytes written.
    ///
    /// Zero is a normal result: the codec buffers input until it has enough
    /// for a frame.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStateUse`] if the session is closed
    /// - [`Error::EncodeFailed`] with the codec's raw code; the session stays
    ///   open and `out` holds no valid output
    pub fn encode(&mut self, chunk: &SampleChunk<'_>, out: &mut [u8]) -> Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::InvalidStateUse {
                operation: "encode",
            });
        };
        let mut out = OutputBuffer::new(out);
        let code = self.codec.encode(&mut stream.handle, chunk, &mut out);
        match bridge::bytes_written(code, out.capacity()) {
            Ok(written) => {
                trace!(
                    "Session {}: encoded {} sample(s) into {} byte(s)",
                    stream.id,
                    chunk.samples(),
                    written
                );
                Ok(written)
            }
            Err(code) => {
                warn!(
                    "Session {}: encode failed with code {} ({})",
                    stream.id,
                    code,
                    describe_code(code)
                );
                Err(Error::EncodeFailed(code))
            }
        }
    }

    /// Writes any buffered trailing data into `out`, returning the number of
    /// bytes written.
    ///
    /// Meant to be called once at the end of a stream, before [`Self::close`].
    /// Calling it with nothing pending is allowed.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStateUse`] if the session is closed
    /// - [`Error::FlushFailed`] with the codec's raw code; the session stays open
    pub fn flush(&mut self, out: &mut [u8]) -> Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::InvalidStateUse { operation: "flush" });
        };
        let mut out = OutputBuffer::new(out);
        let code = self.codec.flush(&mut stream.handle, &mut out);
        match bridge::bytes_written(code, out.capacity()) {
            Ok(written) => {
                debug!("Session {}: flushed {} byte(s)", stream.id, written);
                Ok(written)
            }
            Err(code) => {
                warn!(
                    "Session {}: flush failed with code {} ({})",
                    stream.id,
                    code,
                    describe_code(code)
                );
                Err(Error::FlushFailed(code))
            }
        }
    }

    /// Releases the codec handle. Closing a closed session does nothing.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            self.codec.close(stream.handle);
            info!("Closed encoder session {}", stream.id);
        }
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        if self.stream.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    /// Returns `true` while a handle is held.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Configuration of the open stream.
    pub fn config(&self) -> Option<&EncoderConfig> {
        self.stream.as_ref().map(|stream| &stream.config)
    }

    /// Identifier of the open stream, as used in log messages.
    pub fn session_id(&self) -> Option<Uuid> {
        self.stream.as_ref().map(|stream| stream.id)
    }

    /// The codec this session drives.
    pub fn codec(&self) -> &C {
        &self.codec
    }
}

impl<C: Codec> Drop for EncoderSession<C> {
    /// Releases a still-open handle.
    fn drop(&mut self) {
        self.close();
    }
}

/// An [`EncoderSession`] behind a mutex, cloneable across owners and threads.
///
/// Every call holds the lock until it returns, so open/encode/flush/close
/// never overlap on the same handle.
pub struct SharedSession<C: Codec> {
    inner: Arc<Mutex<EncoderSession<C>>>,
}

impl<C: Codec> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C: Codec> SharedSession<C> {
    /// Creates a closed shared session over `codec`.
    pub fn new(codec: C) -> Self {
        Self::from_session(EncoderSession::new(codec))
    }

    /// Wraps an existing session.
    pub fn from_session(session: EncoderSession<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, EncoderSession<C>>> {
        self.inner
            .lock()
            .map_err(|_| Error::Other("Encoder session lock is poisoned.".to_string()))
    }

    /// See [`EncoderSession::open`].
    pub fn open(&self, config: EncoderConfig) -> Result<()> {
        self.lock()?.open(config)
    }

    /// See [`EncoderSession::encode`].
    pub fn encode(&self, chunk: &SampleChunk<'_>, out: &mut [u8]) -> Result<usize> {
        self.lock()?.encode(chunk, out)
    }

    /// See [`EncoderSession::flush`].
    pub fn flush(&self, out: &mut [u8]) -> Result<usize> {
        self.lock()?.flush(out)
    }

    /// See [`EncoderSession::close`]. Also releases the handle if another
    /// holder panicked while owning the lock.
    pub fn close(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .close();
    }

    /// See [`EncoderSession::state`].
    pub fn state(&self) -> SessionState {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .state()
    }

    /// Runs `f` with exclusive access to the session.
    pub fn with<R>(&self, f: impl FnOnce(&mut EncoderSession<C>) -> R) -> Result<R> {
        let mut session = self.lock()?;
        Ok(f(&mut session))
    }
}
