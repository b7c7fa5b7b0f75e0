// Portamento
// Copyright (c) 2026 The Project Portamento Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `errors` module defines the common error type.

use std::error;
use std::fmt;
use std::result;

/// `Error` enumerates the configuration violations reported by Portamento.
///
/// Running out of input, or the consumer refusing further output, are not errors. They are the
/// two ordinary reasons a resample call returns and are reported by
/// [`Termination`][crate::resample::Termination].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The channel count is zero or exceeds [`MAX_CHANNELS`][crate::kernel::MAX_CHANNELS].
    UnsupportedChannelCount,
    /// The input rate, output rate, or low-pass rate is zero.
    DegenerateRate,
    /// A rate is too large, or the resampling ratio too extreme, for 16.16 fixed point.
    ExcessiveRatio,
    /// An adjustment requires a larger kernel radius than the stream was created with.
    RadiusExceedsMaximum,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Error::UnsupportedChannelCount => {
                write!(f, "channel count is zero or above the compiled maximum")
            }
            Error::DegenerateRate => {
                write!(f, "a sample rate or the low-pass rate is zero")
            }
            Error::ExcessiveRatio => {
                write!(f, "rate or rate ratio does not fit 16.16 fixed point")
            }
            Error::RadiusExceedsMaximum => {
                write!(f, "kernel radius exceeds the maximum the stream was created with")
            }
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;
