// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! # lame-session
//!
//! A streaming MP3 encoder session over `libmp3lame`, loaded at runtime.
//!
//! ## Overview
//!
//! The crate wraps a stream-based codec in a small stateful API: open,
//! encode a chunk, flush, close. It owns the codec handle, enforces the order
//! of calls, and defines how caller-owned sample and output buffers cross
//! into the codec for exactly one call.
//!
//! ### Key Concepts
//!
//! - **Session**: one encoder stream from open to close ([`EncoderSession`])
//! - **Codec**: the compression engine behind the session ([`Codec`], with
//!   [`LameCodec`] as the production implementation)
//! - **Chunk**: one batch of 16-bit PCM per channel ([`SampleChunk`])
//! - **Output buffer**: caller memory the codec writes into ([`OutputBuffer`])
//! - **Flush**: emission of buffered trailing data at the end of a stream
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌────────────┐
//! │ StreamEncoder│ ──► │ EncoderSession │ ──► │ impl Codec │ ──► libmp3lame
//! └──────────────┘     └────────────────┘     └────────────┘
//!                         SampleChunk / OutputBuffer (borrowed per call)
//! ```
//!
//! ## Examples
//!
//! ```no_run
//! use lame_session::{EncoderConfig, EncoderSession, LameCodec, SampleChunk, bridge, load_api};
//!
//! # fn main() -> Result<(), lame_session::Error> {
//! let api = load_api(lame_session::config::default_library_path())?;
//! let mut session = EncoderSession::new(LameCodec::new(api));
//!
//! session.open(EncoderConfig::new(8000, 1, 8000, 32))?;
//! let pcm = vec![0i16; 800];
//! let mut mp3 = vec![0u8; bridge::recommended_capacity(pcm.len())];
//! let n = session.encode(&SampleChunk::mono(&pcm, pcm.len())?, &mut mp3)?;
//! let mut tail = vec![0u8; bridge::FLUSH_CAPACITY];
//! let m = session.flush(&mut tail)?;
//! session.close();
//! # let _ = (n, m);
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! - [`EncoderSession`] is `Send` for [`LameCodec`] but takes `&mut self` for
//!   every call
//! - [`SharedSession`] serializes calls from several owners with a mutex
//! - Independent sessions have independent handles and can run in parallel

mod api;
mod codec;
mod error;
mod session;

pub mod bridge;
pub mod config;
pub mod stream;

pub use api::{LameApi, LameApiHandle, load_api};
pub use bridge::{OutputBuffer, SampleChunk};
pub use codec::{Codec, LameCodec, LameHandle};
pub use config::EncoderConfig;
pub use error::{Error, Result, describe_code};
pub use session::{EncoderSession, SessionState, SharedSession};
pub use stream::{StopHandle, StreamEncoder, StreamStats};
