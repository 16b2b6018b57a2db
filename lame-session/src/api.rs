// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Runtime loading of the LAME shared library.

use std::{ffi::CStr, sync::Arc};

use tracing::debug;

use crate::{Error, Result};

/// Shared handle to a loaded LAME library.
pub type LameApiHandle = Arc<LameApi>;

/// A loaded `libmp3lame` symbol table.
///
/// The library stays mapped for as long as any [`LameApiHandle`] is alive, so
/// codecs and sessions created from it can never outlive the code they call.
pub struct LameApi {
    raw: lame_sys::LameApi,
}

impl LameApi {
    pub(crate) fn raw(&self) -> &lame_sys::LameApi {
        &self.raw
    }

    /// Returns the library's version string, if it exports one.
    pub fn version(&self) -> Option<String> {
        self.raw.get_lame_version.as_ref().ok()?;
        let version = unsafe { self.raw.get_lame_version() };
        if version.is_null() {
            return None;
        }
        Some(
            unsafe { CStr::from_ptr(version) }
                .to_string_lossy()
                .into_owned(),
        )
    }
}

/// Loads `libmp3lame` from `path` and resolves the encoder symbols.
///
/// # Errors
///
/// - [`crate::Error::LibLoading`] if the library cannot be opened
/// - [`crate::Error::InitializationFailed`] if it opens but lacks a symbol
///   the encoder calls (for instance a library other than LAME)
///
/// # Examples
///
/// ```no_run
/// use lame_session::{config::default_library_path, load_api};
///
/// # fn main() -> Result<(), lame_session::Error> {
/// let api = load_api(default_library_path())?;
/// println!("LAME {}", api.version().unwrap_or_default());
/// # Ok(())
/// # }
/// ```
pub fn load_api<P: AsRef<std::ffi::OsStr>>(path: P) -> Result<LameApiHandle> {
    let path = path.as_ref();
    let raw = unsafe { lame_sys::LameApi::new(path)? };
    if let Some((name, error)) = missing_symbol(&raw) {
        return Err(Error::InitializationFailed(format!(
            "{} does not export {}: {}",
            path.to_string_lossy(),
            name,
            error
        )));
    }
    debug!("Loaded LAME from {}", path.to_string_lossy());
    Ok(Arc::new(LameApi { raw }))
}

/// First encoder symbol the library failed to resolve. `get_lame_version` is
/// optional and not checked.
fn missing_symbol(raw: &lame_sys::LameApi) -> Option<(&'static str, &libloading::Error)> {
    [
        ("lame_init", raw.lame_init.as_ref().err()),
        ("lame_set_in_samplerate", raw.lame_set_in_samplerate.as_ref().err()),
        ("lame_set_num_channels", raw.lame_set_num_channels.as_ref().err()),
        ("lame_set_out_samplerate", raw.lame_set_out_samplerate.as_ref().err()),
        ("lame_set_brate", raw.lame_set_brate.as_ref().err()),
        ("lame_set_quality", raw.lame_set_quality.as_ref().err()),
        ("lame_init_params", raw.lame_init_params.as_ref().err()),
        ("lame_encode_buffer", raw.lame_encode_buffer.as_ref().err()),
        ("lame_encode_flush", raw.lame_encode_flush.as_ref().err()),
        ("lame_close", raw.lame_close.as_ref().err()),
    ]
    .into_iter()
    .find_map(|(name, error)| error.map(|error| (name, error)))
}
