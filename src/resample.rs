// Portamento
// Copyright (c) 2026 The Project Portamento Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `resample` module implements the low-level resampling engine: a stateful positional
//! convolver that steps through a caller-padded input region at a fixed-point rate and emits one
//! convolved frame per step.
//!
//! This engine has the least overhead but requires pre-processed input: the region handed to
//! [`Resampler::resample`] must carry [`Resampler::padding_frames`] frames of context before and
//! after the logical input. When the logical input is a chunk of a longer stream the context is
//! the neighbouring audio; for a standalone buffer it is silence. The
//! [`stream`][crate::stream] module automates this bookkeeping.

use log::debug;

use crate::errors::{Error, Result};
use crate::fixed;
use crate::kernel::{KernelTable, KERNEL_RADIUS, KERNEL_RESOLUTION, KERNEL_TABLE_LEN, MAX_CHANNELS};

/// The reason a resample call returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Termination {
    /// The logical input region was consumed. Any fractional position overshoot is carried into
    /// the next call.
    InputExhausted,
    /// The consumer callback returned `false`. The engine position is saved so that the next
    /// call resumes where this one stopped.
    ConsumerHalted,
}

/// Parameters derived from a rate configuration, recomputed whole by `new` and `adjust`.
#[derive(Copy, Clone, Debug)]
struct Geometry {
    /// 16.16 input frames to advance per output frame: `input_rate / output_rate`.
    increment: u32,
    /// 16.16 kernel radius in input frames after stretching: `R · scale`.
    stretched_kernel_radius: u32,
    /// `stretched_kernel_radius` rounded up to whole frames. This is the padding the caller owes
    /// on each side of the input region.
    integer_stretched_kernel_radius: usize,
    /// 16.16 gap between the integer and exact radius, in `[0, 1)`.
    stretched_kernel_radius_delta: u32,
    /// 16.16 kernel table steps per input frame: `N · (cutoff / input_rate)`.
    kernel_step_size: u32,
    /// 17.15 multiplier restoring unity DC gain after kernel stretching.
    sample_normaliser: i32,
}

impl Geometry {
    fn derive(input_rate: u32, output_rate: u32, low_pass_rate: u32) -> Result<Geometry> {
        if input_rate == 0 || output_rate == 0 || low_pass_rate == 0 {
            return Err(Error::DegenerateRate);
        }

        // Division domain of `fixed::ratio`.
        if input_rate >= 1 << 24 || output_rate >= 1 << 24 || low_pass_rate >= 1 << 24 {
            return Err(Error::ExcessiveRatio);
        }

        // Everything above the lowest of the three rates must be rejected: the output rate to
        // prevent aliasing, the low-pass rate because the caller asked for it.
        let cutoff = input_rate.min(output_rate).min(low_pass_rate);

        // The stretch ratio must fit 16.16, and the increment must be non-zero or the engine
        // could never advance.
        if input_rate / cutoff >= 1 << 16 {
            return Err(Error::ExcessiveRatio);
        }

        let increment = fixed::ratio(input_rate, output_rate);

        if increment == 0 {
            return Err(Error::ExcessiveRatio);
        }

        // The kernel is stretched during downsampling, never compressed.
        let kernel_scale = fixed::ratio(input_rate, cutoff).max(fixed::ONE);

        let stretched_kernel_radius = (KERNEL_RADIUS as u32)
            .checked_mul(kernel_scale)
            .filter(|&radius| radius <= u32::MAX - (fixed::ONE - 1))
            .ok_or(Error::ExcessiveRatio)?;

        let integer_stretched_kernel_radius = fixed::ceil(stretched_kernel_radius) as usize;

        let stretched_kernel_radius_delta =
            fixed::to_fixed(integer_stretched_kernel_radius as u32) - stretched_kernel_radius;

        // The inverse of the stretch. Never exceeds N in 16.16 because the cutoff never exceeds
        // the input rate, so stepping the table once per input frame cannot escape it.
        let kernel_step_size = (KERNEL_RESOLUTION as u32) * fixed::ratio(cutoff, input_rate);

        // Re-expressed from 16.16 to 17.15. The spare bit keeps the normalisation multiply
        // inside 32 bits when kernel ripple pushes an accumulator past full scale.
        let sample_normaliser = (fixed::ratio(cutoff, input_rate) >> 1) as i32;

        Ok(Geometry {
            increment,
            stretched_kernel_radius,
            integer_stretched_kernel_radius,
            stretched_kernel_radius_delta,
            kernel_step_size,
            sample_normaliser,
        })
    }
}

/// A low-level streaming resampler over caller-padded input regions.
#[derive(Debug)]
pub struct Resampler {
    channels: usize,
    /// Frame index into the logical input at which the next output frame is centered.
    position_integer: usize,
    /// 16.16 fractional offset within that frame.
    position_fractional: u32,
    geometry: Geometry,
}

impl Resampler {
    /// Creates a resampler converting `input_rate` to `output_rate` while rejecting content
    /// above `low_pass_rate`.
    ///
    /// The effective cutoff is the lowest of the three rates, so a `low_pass_rate` at or above
    /// the others is a no-op.
    pub fn new(
        channels: usize,
        input_rate: u32,
        output_rate: u32,
        low_pass_rate: u32,
    ) -> Result<Resampler> {
        if channels < 1 || channels > MAX_CHANNELS {
            return Err(Error::UnsupportedChannelCount);
        }

        let resampler = Resampler {
            channels,
            position_integer: 0,
            position_fractional: 0,
            geometry: Geometry::derive(input_rate, output_rate, low_pass_rate)?,
        };

        resampler.log_geometry();

        Ok(resampler)
    }

    /// Changes the conversion rates in place.
    ///
    /// The stream position carries over, so a mid-stream rate change neither repeats nor skips
    /// an output frame. On error the resampler is left unchanged.
    pub fn adjust(&mut self, input_rate: u32, output_rate: u32, low_pass_rate: u32) -> Result<()> {
        self.geometry = Geometry::derive(input_rate, output_rate, low_pass_rate)?;
        self.log_geometry();
        Ok(())
    }

    /// The padding the caller must supply: the number of frames of real or silent context
    /// required on each side of the logical input region.
    pub fn padding_frames(&self) -> usize {
        self.geometry.integer_stretched_kernel_radius
    }

    /// The number of interleaved channels per frame.
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// The kernel padding a configuration would require, without building a resampler.
    ///
    /// Useful for sizing input buffers up front, and for probing whether an [`adjust`]
    /// would be accepted. Fails for the same configurations `new` fails for.
    ///
    /// [`adjust`]: Resampler::adjust
    pub fn required_padding(input_rate: u32, output_rate: u32, low_pass_rate: u32) -> Result<usize> {
        Ok(Geometry::derive(input_rate, output_rate, low_pass_rate)?.integer_stretched_kernel_radius)
    }

    fn log_geometry(&self) {
        debug!(
            "geometry: increment={:#x} radius={:#x} (integer={}) kernel_step={:#x} normaliser={:#x}",
            self.geometry.increment,
            self.geometry.stretched_kernel_radius,
            self.geometry.integer_stretched_kernel_radius,
            self.geometry.kernel_step_size,
            self.geometry.sample_normaliser,
        );
    }

    /// Resamples a padded input region, pushing output frames to `consumer` until the logical
    /// input is exhausted or the consumer returns `false`.
    ///
    /// `input` must hold `(*total_input_frames + 2 · padding_frames()) · channels()` interleaved
    /// samples: the logical input starts at frame offset `padding_frames()` and is surrounded on
    /// both sides by that many frames of context. On return, `*total_input_frames` holds the
    /// number of logical frames not yet consumed; zero when the input was exhausted.
    ///
    /// `consumer` receives each output frame as one unclamped accumulated `i32` per channel.
    /// Values outside the 16-bit range are possible and clamping is the consumer's
    /// responsibility.
    pub fn resample<C>(
        &mut self,
        table: &KernelTable,
        input: &[i16],
        total_input_frames: &mut usize,
        mut consumer: C,
    ) -> Termination
    where
        C: FnMut(&[i32]) -> bool,
    {
        let channels = self.channels;
        let radius = self.geometry.integer_stretched_kernel_radius;

        debug_assert!(input.len() >= (*total_input_frames + 2 * radius) * channels);

        let mut frame = [0i32; MAX_CHANNELS];
        let frame = &mut frame[..channels];

        loop {
            // Past the end of the logical region. The overshoot is the carry into the next
            // chunk of a longer stream.
            if self.position_integer >= *total_input_frames {
                self.position_integer -= *total_input_frames;
                *total_input_frames = 0;
                return Termination::InputExhausted;
            }

            // Frame bounds of the convolution window. `min_relative` is the first frame offset
            // past the left edge of the stretched kernel; the window then runs to the last
            // offset short of the right edge.
            let min_relative = fixed::ceil(
                self.position_fractional + self.geometry.stretched_kernel_radius_delta,
            ) as usize;
            let max_relative = fixed::floor(
                self.position_fractional + self.geometry.stretched_kernel_radius,
            ) as usize;

            let min = (self.position_integer + min_relative) * channels;
            let max = (self.position_integer + radius + max_relative) * channels;

            debug_assert!(max <= (*total_input_frames + 2 * radius) * channels);

            // Table position of the window's first frame: its distance from the exact center,
            // in kernel steps.
            let mut kernel_position = fixed::mul(
                self.geometry.kernel_step_size,
                fixed::to_fixed(min_relative as u32) - self.position_fractional,
            );

            frame.fill(0);

            let mut sample = min;
            while sample < max {
                debug_assert!(fixed::floor(kernel_position) < KERNEL_TABLE_LEN as u32);

                let kernel_value = table.value_at(kernel_position);

                for (channel, accumulator) in frame.iter_mut().enumerate() {
                    *accumulator +=
                        fixed::mul_i32(i32::from(input[sample + channel]), kernel_value);
                }

                sample += channels;
                kernel_position += self.geometry.kernel_step_size;
            }

            // Restore unity gain lost to kernel stretching.
            for accumulator in frame.iter_mut() {
                *accumulator = (*accumulator * self.geometry.sample_normaliser) / (1 << 15);
            }

            self.position_fractional += self.geometry.increment;
            self.position_integer += fixed::floor(self.position_fractional) as usize;
            self.position_fractional &= fixed::ONE - 1;

            if !consumer(frame) {
                // Turn the consumed whole frames into caller bookkeeping and stop.
                self.position_integer = self.position_integer.min(*total_input_frames);
                *total_input_frames -= self.position_integer;
                self.position_integer = 0;
                return Termination::ConsumerHalted;
            }
        }
    }
}
