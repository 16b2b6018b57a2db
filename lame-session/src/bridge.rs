// SPDX-FileCopyrightText: 2025 Contributors to the lame-session project.
// SPDX-License-Identifier: Apache-2.0

//! Borrowed sample and output buffers handed to the codec for one call.
//!
//! Both [`SampleChunk`] and [`OutputBuffer`] only borrow caller memory. Their
//! lifetimes end with the call they are passed to, so a session cannot keep a
//! reference to them afterwards.

use std::os::raw::c_int;

use crate::{Error, Result};

/// Output capacity that always holds the trailing data of a flush.
pub const FLUSH_CAPACITY: usize = 7200;

/// Returns an output capacity that holds the encoded form of `samples`
/// samples per channel in the worst case: `7200 + 1.25 * samples`, rounded up.
///
/// # Examples
///
/// ```
/// use lame_session::bridge::recommended_capacity;
///
/// assert_eq!(recommended_capacity(0), 7200);
/// assert_eq!(recommended_capacity(1152), 7200 + 1440);
/// ```
pub fn recommended_capacity(samples: usize) -> usize {
    FLUSH_CAPACITY + samples + samples.div_ceil(4)
}

/// One batch of 16-bit PCM submitted to `encode`.
///
/// Holds a left and a right channel plus the number of samples per channel the
/// codec should read. Each channel may be longer than the count; only the
/// first `samples` elements are read.
///
/// Mono input is expressed by passing the same slice for both channels (see
/// [`SampleChunk::mono`]). Whether the codec treats the input as mono or
/// stereo is decided by the session's configured channel count, never by the
/// shape of the chunk.
///
/// # Examples
///
/// ```
/// use lame_session::SampleChunk;
///
/// let left = [0i16; 1152];
/// let right = [0i16; 1200];
/// let chunk = SampleChunk::new(&left, &right, 1152).unwrap();
/// assert_eq!(chunk.samples(), 1152);
///
/// assert!(SampleChunk::new(&left, &right, 1153).is_err());
/// ```
#[derive(Clone, Copy, Debug)]
pub struct SampleChunk<'a> {
    left: &'a [i16],
    right: &'a [i16],
    samples: usize,
}

impl<'a> SampleChunk<'a> {
    /// Creates a chunk of `samples` samples per channel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidChunk`] if either channel is shorter than
    /// `samples` or the count exceeds what the codec can address.
    pub fn new(left: &'a [i16], right: &'a [i16], samples: usize) -> Result<Self> {
        if left.len() < samples || right.len() < samples {
            return Err(Error::InvalidChunk(format!(
                "sample count {} exceeds channel lengths (left {}, right {})",
                samples,
                left.len(),
                right.len()
            )));
        }
        if c_int::try_from(samples).is_err() {
            return Err(Error::InvalidChunk(format!(
                "sample count {samples} exceeds the codec limit"
            )));
        }
        Ok(Self {
            left,
            right,
            samples,
        })
    }

    /// Creates a mono chunk by passing `data` as both channels.
    pub fn mono(data: &'a [i16], samples: usize) -> Result<Self> {
        Self::new(data, data, samples)
    }

    /// Creates a chunk covering the shorter of the two channels.
    pub fn from_slices(left: &'a [i16], right: &'a [i16]) -> Result<Self> {
        Self::new(left, right, left.len().min(right.len()))
    }

    /// Number of samples per channel the codec will read.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Returns `true` if the chunk carries no samples.
    pub fn is_empty(&self) -> bool {
        self.samples == 0
    }

    /// The part of the left channel the codec reads.
    pub fn left(&self) -> &'a [i16] {
        &self.left[..self.samples]
    }

    /// The part of the right channel the codec reads.
    pub fn right(&self) -> &'a [i16] {
        &self.right[..self.samples]
    }

    /// Returns `true` if both channels are the same memory.
    pub fn is_shared(&self) -> bool {
        std::ptr::eq(self.left.as_ptr(), self.right.as_ptr())
    }

    /// Sample count as the codec's C integer type (checked at construction).
    pub fn samples_c_int(&self) -> c_int {
        self.samples as c_int
    }
}

/// Caller-owned region the codec writes compressed bytes into.
///
/// The capacity is the length of the borrowed slice and is passed to the codec
/// unchanged, so the codec can bound its own writes. If a call fails the
/// contents are unspecified and no prefix is valid output.
#[derive(Debug)]
pub struct OutputBuffer<'a> {
    data: &'a mut [u8],
}

impl<'a> OutputBuffer<'a> {
    /// Wraps a caller buffer.
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data }
    }

    /// Declared capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Capacity as the codec's C integer type.
    ///
    /// Buffers larger than the type can express are declared at its maximum,
    /// which only understates the real space.
    pub fn capacity_c_int(&self) -> c_int {
        c_int::try_from(self.data.len()).unwrap_or(c_int::MAX)
    }

    /// Base pointer handed to the codec.
    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        self.data.as_mut_ptr()
    }

    /// Mutable view of the whole region, for codecs implemented in Rust.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut *self.data
    }
}

impl<'a> From<&'a mut [u8]> for OutputBuffer<'a> {
    fn from(data: &'a mut [u8]) -> Self {
        Self::new(data)
    }
}

/// Interprets a codec return value: non-negative is a byte count, negative is
/// a failure code returned unchanged.
pub(crate) fn bytes_written(code: c_int, capacity: usize) -> core::result::Result<usize, i32> {
    if code < 0 {
        return Err(code);
    }
    let written = code as usize;
    debug_assert!(
        written <= capacity,
        "codec reported {written} bytes for a {capacity} byte buffer"
    );
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_rejects_short_channel() {
        let left = [0i16; 10];
        let right = [0i16; 5];
        assert!(matches!(
            SampleChunk::new(&left, &right, 6),
            Err(Error::InvalidChunk(_))
        ));
        let chunk = SampleChunk::new(&left, &right, 5).unwrap();
        assert_eq!(chunk.left().len(), 5);
        assert_eq!(chunk.right().len(), 5);
        assert!(!chunk.is_shared());
    }

    #[test]
    fn mono_chunk_shares_memory() {
        let data = [1i16, 2, 3, 4];
        let chunk = SampleChunk::mono(&data, 3).unwrap();
        assert!(chunk.is_shared());
        assert_eq!(chunk.left(), &[1, 2, 3]);
        assert_eq!(chunk.samples_c_int(), 3);
    }

    #[test]
    fn from_slices_uses_shorter_channel() {
        let left = [0i16; 7];
        let right = [0i16; 4];
        let chunk = SampleChunk::from_slices(&left, &right).unwrap();
        assert_eq!(chunk.samples(), 4);
        assert!(SampleChunk::from_slices(&[], &[]).unwrap().is_empty());
    }

    #[test]
    fn output_capacity_is_slice_length() {
        let mut data = vec![0u8; 4096];
        let out = OutputBuffer::new(&mut data);
        assert_eq!(out.capacity(), 4096);
        assert_eq!(out.capacity_c_int(), 4096);
    }

    #[test]
    fn negative_codes_pass_through() {
        assert_eq!(bytes_written(0, 10), Ok(0));
        assert_eq!(bytes_written(10, 10), Ok(10));
        assert_eq!(bytes_written(-1, 10), Err(-1));
        assert_eq!(bytes_written(-42, 10), Err(-42));
    }

    #[test]
    fn recommended_capacity_rounds_up() {
        assert_eq!(recommended_capacity(1), 7202);
        assert_eq!(recommended_capacity(4), 7205);
        assert_eq!(recommended_capacity(40000), 7200 + 50000);
    }
}
