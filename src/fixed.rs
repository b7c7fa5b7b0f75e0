// Portamento
// Copyright (c) 2026 The Project Portamento Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `fixed` module provides the 16.16 fixed-point arithmetic the resampler is built on.
//!
//! A 16.16 value stores an integer multiplied by 2^16 plus a 16-bit fractional part, reducing the
//! multiplications and divisions of the hot path to shifts. Unsigned 16.16 values are held in
//! `u32`. The output normalizer is the one exception: it is a signed 17.15 value held in `i32`,
//! trading one fractional bit for one bit of dynamic range (see
//! [`Resampler`][crate::resample::Resampler]).

/// Number of fractional bits in a 16.16 fixed-point value.
pub const FRACTIONAL_BITS: u32 = 16;

/// One in 16.16 fixed point.
pub const ONE: u32 = 1 << FRACTIONAL_BITS;

/// Converts an integer into 16.16 fixed point.
#[inline(always)]
pub fn to_fixed(value: u32) -> u32 {
    debug_assert!(value < 1 << 16);
    value << FRACTIONAL_BITS
}

/// The integer part of a 16.16 value, rounding towards negative infinity.
#[inline(always)]
pub fn floor(value: u32) -> u32 {
    value >> FRACTIONAL_BITS
}

/// The integer part of a 16.16 value, rounding towards positive infinity.
#[inline(always)]
pub fn ceil(value: u32) -> u32 {
    debug_assert!(value <= u32::MAX - (ONE - 1));
    (value + (ONE - 1)) >> FRACTIONAL_BITS
}

/// Multiplies two unsigned 16.16 values through a 64-bit intermediate.
#[inline(always)]
pub fn mul(a: u32, b: u32) -> u32 {
    ((u64::from(a) * u64::from(b)) >> FRACTIONAL_BITS) as u32
}

/// Multiplies a signed integer by a signed 16.16 value, truncating towards zero.
///
/// The product must fit `i32`. This holds on the convolution hot path where `a` is a 16-bit
/// sample and `b` a kernel value of magnitude at most one.
#[inline(always)]
pub fn mul_i32(a: i32, b: i32) -> i32 {
    (a * b) / (1 << FRACTIONAL_BITS)
}

/// Computes the 16.16 ratio `a * 2^16 / b` by schoolbook long division in chunks, so that no
/// intermediate value needs more than 32 bits.
///
/// If either operand is zero the result is zero. Fed back in as a rate increment, a zero ratio
/// makes an engine stand still rather than divide by zero; the public engine constructors reject
/// zero rates up front so this is purely defensive.
///
/// The divisor must be below 2^24 and the true ratio must fit 16.16. Both bounds are far beyond
/// any audio sample rate and are `debug_assert!`ed.
pub fn ratio(a: u32, b: u32) -> u32 {
    if a == 0 || b == 0 {
        return 0;
    }

    debug_assert!(b < 1 << 24, "divisor too large for the 8-bit fractional steps");
    debug_assert!(a / b < 1 << 16, "ratio does not fit 16.16");

    // The base-2^16 digits of a·2^16 are [a >> 16, a & 0xFFFF, 0]. Divide digit by digit,
    // carrying the remainder. The leading quotient digit has weight 2^32 and is dropped: it is
    // non-zero only when the ratio overflows 16.16.
    let remainder = (a >> 16) % b;

    let dividend = (remainder << 16) | (a & 0xFFFF);
    let integer = dividend / b;
    let remainder = dividend % b;

    // Bring down the 16 fractional zero bits in two 8-bit steps; a full 16-bit step would shift
    // the remainder out of 32 bits whenever the divisor exceeds 16 bits.
    let dividend = remainder << 8;
    let upper = dividend / b;
    let remainder = dividend % b;

    let lower = (remainder << 8) / b;

    (integer << 16) | (upper << 8) | lower
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio_wide(a: u32, b: u32) -> u32 {
        ((u64::from(a) << 16) / u64::from(b)) as u32
    }

    #[test]
    fn verify_ratio_common_rates() {
        let rates = [8000, 11025, 16000, 22050, 32000, 44100, 48000, 88200, 96000, 192000];

        for &a in &rates {
            for &b in &rates {
                assert_eq!(ratio(a, b), ratio_wide(a, b), "ratio({}, {})", a, b);
            }
        }
    }

    #[test]
    fn verify_ratio_edges() {
        assert_eq!(ratio(1, 1), ONE);
        assert_eq!(ratio(1, 0xff_ffff), 0);
        assert_eq!(ratio(0xffff, 1), 0xffff << 16);
        assert_eq!(ratio(0xff_ffff, 0xff_ffff), ONE);
        assert_eq!(ratio(0xff_fffe, 0xff_ffff), ratio_wide(0xff_fffe, 0xff_ffff));
    }

    #[test]
    fn verify_ratio_zero_operands() {
        assert_eq!(ratio(0, 48000), 0);
        assert_eq!(ratio(48000, 0), 0);
        assert_eq!(ratio(0, 0), 0);
    }

    #[test]
    fn verify_ratio_random_operands() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        let mut rng = SmallRng::seed_from_u64(0x5eed);

        for _ in 0..100_000 {
            let a = rng.random_range(1..1 << 24);
            let b = rng.random_range(1..1 << 24);

            // Skip pairs whose true ratio does not fit 16.16.
            if a / b >= 1 << 16 {
                continue;
            }

            assert_eq!(ratio(a, b), ratio_wide(a, b), "ratio({}, {})", a, b);
        }
    }

    #[test]
    fn verify_rounding() {
        assert_eq!(floor(0x0001_8000), 1);
        assert_eq!(floor(0x0001_ffff), 1);
        assert_eq!(ceil(0x0001_8000), 2);
        assert_eq!(ceil(0x0002_0000), 2);
        assert_eq!(ceil(0), 0);
        assert_eq!(mul(ONE, ONE), ONE);
        assert_eq!(mul_i32(-0x8000, 0x10000), -0x8000);
        assert_eq!(mul_i32(-3, 0x8000), -1);
    }
}
