// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Encoder configuration and library path resolution.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable overriding the location of `libmp3lame`.
pub const LIBRARY_PATH_ENV: &str = "LAME_LIBRARY_PATH";

/// Quality used when none is given: fast with acceptable quality.
pub const DEFAULT_QUALITY: u32 = 7;

/// Highest (worst, fastest) quality ordinal the codec accepts.
pub const MAX_QUALITY: u32 = 9;

/// Returns the path to the LAME shared library.
///
/// Uses `LAME_LIBRARY_PATH` when set, otherwise the platform's library name so
/// the dynamic loader searches its default locations.
///
/// # Examples
///
/// ```no_run
/// use lame_session::{config::default_library_path, load_api};
///
/// # fn main() -> Result<(), lame_session::Error> {
/// let api = load_api(default_library_path())?;
/// # Ok(())
/// # }
/// ```
pub fn default_library_path() -> PathBuf {
    if let Some(path) = std::env::var_os(LIBRARY_PATH_ENV) {
        return path.into();
    }
    if cfg!(target_os = "macos") {
        "libmp3lame.dylib".into()
    } else if cfg!(target_os = "windows") {
        "libmp3lame.dll".into()
    } else {
        "libmp3lame.so.0".into()
    }
}

fn default_quality() -> u32 {
    DEFAULT_QUALITY
}

/// Parameters applied to a codec handle when a session is opened.
///
/// Values are plain integers so that configurations can come from anywhere
/// (command line, JSON); [`EncoderConfig::validate`] runs on every open.
///
/// # Examples
///
/// ```
/// use lame_session::EncoderConfig;
///
/// let config = EncoderConfig::new(44100, 2, 44100, 128).with_quality(2);
/// assert!(config.validate().is_ok());
///
/// let json = r#"{"in_sample_rate": 8000, "out_channels": 1,
///                "out_sample_rate": 8000, "out_bitrate": 32}"#;
/// let config = EncoderConfig::from_json(json).unwrap();
/// assert_eq!(config.quality, 7);
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Input sample rate in Hz.
    pub in_sample_rate: u32,
    /// Channel count of the encoded stream (1 = mono, 2 = stereo).
    pub out_channels: u32,
    /// Output sample rate in Hz.
    pub out_sample_rate: u32,
    /// Output bitrate in kbps.
    pub out_bitrate: u32,
    /// Codec quality ordinal, 0 (best, slowest) to 9 (worst, fastest).
    #[serde(default = "default_quality")]
    pub quality: u32,
}

impl EncoderConfig {
    /// Creates a configuration with [`DEFAULT_QUALITY`].
    pub fn new(
        in_sample_rate: u32,
        out_channels: u32,
        out_sample_rate: u32,
        out_bitrate: u32,
    ) -> Self {
        Self {
            in_sample_rate,
            out_channels,
            out_sample_rate,
            out_bitrate,
            quality: DEFAULT_QUALITY,
        }
    }

    /// Returns a copy with the given quality ordinal.
    pub fn with_quality(mut self, quality: u32) -> Self {
        self.quality = quality;
        self
    }

    /// Parses a configuration from JSON.
    ///
    /// Only the syntax is checked here; the values are validated when the
    /// configuration is used to open a session.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serializes the configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Returns `true` when the stream is encoded as a single channel.
    pub fn is_mono(&self) -> bool {
        self.out_channels == 1
    }

    /// Checks every field against the ranges the codec accepts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InitializationFailed`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(Error::InitializationFailed(msg));
        if self.in_sample_rate == 0 || self.in_sample_rate > i32::MAX as u32 {
            return fail(format!("invalid input sample rate {}", self.in_sample_rate));
        }
        if !(1..=2).contains(&self.out_channels) {
            return fail(format!(
                "invalid channel count {} (expected 1 or 2)",
                self.out_channels
            ));
        }
        if self.out_sample_rate == 0 || self.out_sample_rate > i32::MAX as u32 {
            return fail(format!(
                "invalid output sample rate {}",
                self.out_sample_rate
            ));
        }
        if self.out_bitrate == 0 || self.out_bitrate > i32::MAX as u32 {
            return fail(format!("invalid bitrate {}", self.out_bitrate));
        }
        if self.quality > MAX_QUALITY {
            return fail(format!(
                "invalid quality {} (expected 0..={MAX_QUALITY})",
                self.quality
            ));
        }
        Ok(())
    }
}
