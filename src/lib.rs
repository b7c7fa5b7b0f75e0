// Portamento
// Copyright (c) 2026 The Project Portamento Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

#![warn(rust_2018_idioms)]
#![forbid(unsafe_code)]

//! # Project Portamento
//!
//! Portamento is a 100% pure Rust audio sample rate converter. It consumes a stream of
//! multi-channel interleaved signed 16-bit PCM frames at one rate and produces a stream of frames
//! at another rate, suppressing frequencies above a configurable cutoff so that downsampling does
//! not alias. The conversion is a convolution with a Lanczos-windowed sinc kernel evaluated
//! entirely in 16.16 fixed-point arithmetic, making the output bit-exact reproducible for a given
//! input and configuration.
//!
//! Two engines are provided:
//!
//! * [`resample::Resampler`] is the low-level engine. It is ideal when the entirety of the input
//!   is available at once. The caller supplies a single input region padded with one kernel
//!   radius of context on each side.
//! * [`stream::StreamResampler`] wraps the low-level engine with an internal buffer and pulls
//!   input on demand from a producer callback, which makes it suitable for input that arrives
//!   piece by piece.
//!
//! Both engines push output frames to a consumer callback as unclamped 32-bit accumulators. A
//! consumer that wants 16-bit samples clamps them itself. Neither engine allocates after
//! construction, and a single [`kernel::KernelTable`] may be shared by any number of engines.
//!
//! # Usage
//!
//! ```
//! use portamento::kernel::KernelTable;
//! use portamento::resample::Termination;
//! use portamento::stream::StreamResampler;
//!
//! // A second of mono input at 48kHz, resampled to 44.1kHz.
//! let input: Vec<i16> = (0..48000).map(|i| (i % 128) as i16).collect();
//! let mut consumed = 0;
//!
//! let table = KernelTable::new();
//! let mut stream = StreamResampler::new(1, 48000, 44100, 44100).unwrap();
//!
//! let mut output: Vec<i16> = Vec::new();
//!
//! let producer = |buf: &mut [i16]| {
//!     let len = buf.len().min(input.len() - consumed);
//!     buf[..len].copy_from_slice(&input[consumed..consumed + len]);
//!     consumed += len;
//!     len
//! };
//!
//! let consumer = |frame: &[i32]| {
//!     // Samples are unclamped; clamp to the output width here.
//!     output.extend(frame.iter().map(|&s| s.clamp(-0x8000, 0x7fff) as i16));
//!     true
//! };
//!
//! let termination = stream.resample(&table, producer, consumer);
//! assert_eq!(termination, Termination::InputExhausted);
//! ```
//!
//! After the producer reaches end-of-stream, call [`stream::StreamResampler::finish`] once to
//! drain the final partial window.

pub mod errors;
pub mod fixed;
pub mod kernel;
pub mod resample;
pub mod stream;
