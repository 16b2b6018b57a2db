// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! # lame-sys: Raw FFI bindings to libmp3lame
//!
//! This crate exposes the small subset of the LAME C API needed to drive a
//! streaming encoder: handle creation, parameter setters, parameter
//! finalization, buffer encoding, flushing and teardown.
//!
//! The library is loaded at runtime through `libloading`, so nothing links
//! against `libmp3lame` at build time. [`LameApi`] is a table of resolved
//! symbols; a missing symbol only fails when it is called.
//!
//! ## Usage
//!
//! **Most users should NOT use this crate directly.** Use the safe
//! `lame-session` crate instead, which provides:
//! - An explicit open/encode/flush/close state machine
//! - Checked sample and output buffer handling
//! - Rust-idiomatic error handling with `Result`
//!
//! ## Safety
//!
//! All functions in this crate are `unsafe` and require the caller to uphold
//! LAME's invariants:
//! - `lame_init_params` must be called once after all setters and before encoding
//! - A handle must not be used after `lame_close`
//! - A handle is not thread-safe; calls on one handle must be serialized
//! - Buffer pointers must be valid for the sizes passed alongside them

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

extern crate libloading;

use std::os::raw::{c_char, c_int, c_short, c_uchar};

pub const LAME_OKAY: c_int = 0;
pub const LAME_NOERROR: c_int = 0;
pub const LAME_GENERICERROR: c_int = -1;
pub const LAME_NOMEM: c_int = -10;
pub const LAME_BADBITRATE: c_int = -11;
pub const LAME_BADSAMPFREQ: c_int = -12;
pub const LAME_INTERNALERROR: c_int = -13;

/// Opaque encoder state owned by the library.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct lame_global_struct {
    _unused: [u8; 0],
}
pub type lame_global_flags = lame_global_struct;
pub type lame_t = *mut lame_global_flags;

pub struct LameApi {
    __library: ::libloading::Library,
    pub get_lame_version: Result<unsafe extern "C" fn() -> *const c_char, ::libloading::Error>,
    pub lame_init: Result<unsafe extern "C" fn() -> *mut lame_global_flags, ::libloading::Error>,
    pub lame_set_in_samplerate: Result<
        unsafe extern "C" fn(arg1: *mut lame_global_flags, arg2: c_int) -> c_int,
        ::libloading::Error,
    >,
    pub lame_set_num_channels: Result<
        unsafe extern "C" fn(arg1: *mut lame_global_flags, arg2: c_int) -> c_int,
        ::libloading::Error,
    >,
    pub lame_set_out_samplerate: Result<
        unsafe extern "C" fn(arg1: *mut lame_global_flags, arg2: c_int) -> c_int,
        ::libloading::Error,
    >,
    pub lame_set_brate: Result<
        unsafe extern "C" fn(arg1: *mut lame_global_flags, arg2: c_int) -> c_int,
        ::libloading::Error,
    >,
    pub lame_set_quality: Result<
        unsafe extern "C" fn(arg1: *mut lame_global_flags, arg2: c_int) -> c_int,
        ::libloading::Error,
    >,
    pub lame_init_params:
        Result<unsafe extern "C" fn(gfp: *mut lame_global_flags) -> c_int, ::libloading::Error>,
    pub lame_encode_buffer: Result<
        unsafe extern "C" fn(
            gfp: *mut lame_global_flags,
            buffer_l: *const c_short,
            buffer_r: *const c_short,
            nsamples: c_int,
            mp3buf: *mut c_uchar,
            mp3buf_size: c_int,
        ) -> c_int,
        ::libloading::Error,
    >,
    pub lame_encode_flush: Result<
        unsafe extern "C" fn(
            gfp: *mut lame_global_flags,
            mp3buf: *mut c_uchar,
            size: c_int,
        ) -> c_int,
        ::libloading::Error,
    >,
    pub lame_close:
        Result<unsafe extern "C" fn(arg1: *mut lame_global_flags) -> c_int, ::libloading::Error>,
}

impl LameApi {
    pub unsafe fn new<P>(path: P) -> Result<Self, ::libloading::Error>
    where
        P: AsRef<::std::ffi::OsStr>,
    {
        let library = ::libloading::Library::new(path)?;
        Self::from_library(library)
    }

    pub unsafe fn from_library<L>(library: L) -> Result<Self, ::libloading::Error>
    where
        L: Into<::libloading::Library>,
    {
        let __library = library.into();
        let get_lame_version = __library.get(b"get_lame_version\0").map(|sym| *sym);
        let lame_init = __library.get(b"lame_init\0").map(|sym| *sym);
        let lame_set_in_samplerate = __library.get(b"lame_set_in_samplerate\0").map(|sym| *sym);
        let lame_set_num_channels = __library.get(b"lame_set_num_channels\0").map(|sym| *sym);
        let lame_set_out_samplerate = __library
            .get(b"lame_set_out_samplerate\0")
            .map(|sym| *sym);
        let lame_set_brate = __library.get(b"lame_set_brate\0").map(|sym| *sym);
        let lame_set_quality = __library.get(b"lame_set_quality\0").map(|sym| *sym);
        let lame_init_params = __library.get(b"lame_init_params\0").map(|sym| *sym);
        let lame_encode_buffer = __library.get(b"lame_encode_buffer\0").map(|sym| *sym);
        let lame_encode_flush = __library.get(b"lame_encode_flush\0").map(|sym| *sym);
        let lame_close = __library.get(b"lame_close\0").map(|sym| *sym);
        Ok(LameApi {
            __library,
            get_lame_version,
            lame_init,
            lame_set_in_samplerate,
            lame_set_num_channels,
            lame_set_out_samplerate,
            lame_set_brate,
            lame_set_quality,
            lame_init_params,
            lame_encode_buffer,
            lame_encode_flush,
            lame_close,
        })
    }

    pub unsafe fn get_lame_version(&self) -> *const c_char {
        (self
            .get_lame_version
            .as_ref()
            .expect("Expected function, got error."))()
    }

    pub unsafe fn lame_init(&self) -> *mut lame_global_flags {
        (self.lame_init.as_ref().expect("Expected function, got error."))()
    }

    pub unsafe fn lame_set_in_samplerate(&self, arg1: *mut lame_global_flags, arg2: c_int) -> c_int {
        (self
            .lame_set_in_samplerate
            .as_ref()
            .expect("Expected function, got error."))(arg1, arg2)
    }

    pub unsafe fn lame_set_num_channels(&self, arg1: *mut lame_global_flags, arg2: c_int) -> c_int {
        (self
            .lame_set_num_channels
            .as_ref()
            .expect("Expected function, got error."))(arg1, arg2)
    }

    pub unsafe fn lame_set_out_samplerate(
        &self,
        arg1: *mut lame_global_flags,
        arg2: c_int,
    ) -> c_int {
        (self
            .lame_set_out_samplerate
            .as_ref()
            .expect("Expected function, got error."))(arg1, arg2)
    }

    pub unsafe fn lame_set_brate(&self, arg1: *mut lame_global_flags, arg2: c_int) -> c_int {
        (self
            .lame_set_brate
            .as_ref()
            .expect("Expected function, got error."))(arg1, arg2)
    }

    pub unsafe fn lame_set_quality(&self, arg1: *mut lame_global_flags, arg2: c_int) -> c_int {
        (self
            .lame_set_quality
            .as_ref()
            .expect("Expected function, got error."))(arg1, arg2)
    }

    pub unsafe fn lame_init_params(&self, gfp: *mut lame_global_flags) -> c_int {
        (self
            .lame_init_params
            .as_ref()
            .expect("Expected function, got error."))(gfp)
    }

    pub unsafe fn lame_encode_buffer(
        &self,
        gfp: *mut lame_global_flags,
        buffer_l: *const c_short,
        buffer_r: *const c_short,
        nsamples: c_int,
        mp3buf: *mut c_uchar,
        mp3buf_size: c_int,
    ) -> c_int {
        (self
            .lame_encode_buffer
            .as_ref()
            .expect("Expected function, got error."))(
            gfp, buffer_l, buffer_r, nsamples, mp3buf, mp3buf_size,
        )
    }

    pub unsafe fn lame_encode_flush(
        &self,
        gfp: *mut lame_global_flags,
        mp3buf: *mut c_uchar,
        size: c_int,
    ) -> c_int {
        (self
            .lame_encode_flush
            .as_ref()
            .expect("Expected function, got error."))(gfp, mp3buf, size)
    }

    pub unsafe fn lame_close(&self, arg1: *mut lame_global_flags) -> c_int {
        (self.lame_close.as_ref().expect("Expected function, got error."))(arg1)
    }
}
