// Portamento
// Copyright (c) 2026 The Project Portamento Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `stream` module implements the high-level resampling engine: a wrapper around
//! [`Resampler`] that owns the padded input buffer and pulls audio on demand from a producer
//! callback, stitching fixed-size chunks into an apparently endless input.
//!
//! The wrapper maintains three zones inside its buffer: a leading padding zone holding the
//! convolution history, the unconsumed input region, and a look-ahead zone holding the most
//! recently pulled kernel radius of audio, withheld so the convolver never reads past real data.
//! When the unconsumed region empties, the history and the look-ahead slide to the front of the
//! buffer and the producer refills the space behind them.

use log::debug;

use crate::errors::{Error, Result};
use crate::kernel::KernelTable;
use crate::resample::{Resampler, Termination};

/// Frames of fresh audio requested from the producer per refill, on top of the padding zones.
const BATCH_FRAMES: usize = 0x1000;

/// A high-level streaming resampler that pulls input from a producer callback.
///
/// Create one per logical stream. After the producer signals end-of-stream, call
/// [`finish`][StreamResampler::finish] once to drain the frames still held in the look-ahead
/// zone.
pub struct StreamResampler {
    resampler: Resampler,
    buffer: Box<[i16]>,
    /// Sample offset of the first unconsumed input frame.
    start: usize,
    /// Sample offset one past the last unconsumed input frame.
    end: usize,
    /// Samples withheld beyond `end` as the convolver's look-ahead; one kernel radius once the
    /// stream is primed.
    lookahead: usize,
    /// The kernel radius at creation time. Adjustments may shrink the radius but never exceed
    /// this, and the buffer keeps this much history across refills.
    maximum_integer_stretched_kernel_radius: usize,
    /// Frames of look-ahead still to be primed before the first convolution.
    leading_padding_frames_needed: usize,
    /// Frames of silence [`finish`][StreamResampler::finish] has yet to push through.
    trailing_padding_frames_remaining: usize,
}

impl StreamResampler {
    /// Creates a streaming resampler converting `input_rate` to `output_rate` while rejecting
    /// content above `low_pass_rate`.
    pub fn new(
        channels: usize,
        input_rate: u32,
        output_rate: u32,
        low_pass_rate: u32,
    ) -> Result<StreamResampler> {
        let resampler = Resampler::new(channels, input_rate, output_rate, low_pass_rate)?;

        let radius = resampler.padding_frames();

        // Two radii of padding zones plus a usable refill window. Zeroing the whole buffer
        // establishes the silent leading padding.
        let buffer = vec![0; (2 * radius + BATCH_FRAMES) * channels].into_boxed_slice();

        Ok(StreamResampler {
            resampler,
            buffer,
            start: radius * channels,
            end: radius * channels,
            lookahead: 0,
            maximum_integer_stretched_kernel_radius: radius,
            leading_padding_frames_needed: radius,
            trailing_padding_frames_remaining: radius,
        })
    }

    /// Changes the conversion rates mid-stream.
    ///
    /// The new configuration may not require a larger kernel radius than the stream was created
    /// with. On error the stream is left unchanged. Buffered audio carries over: a rate change
    /// neither repeats nor skips any input.
    pub fn adjust(&mut self, input_rate: u32, output_rate: u32, low_pass_rate: u32) -> Result<()> {
        let radius = Resampler::required_padding(input_rate, output_rate, low_pass_rate)?;

        if radius > self.maximum_integer_stretched_kernel_radius {
            return Err(Error::RadiusExceedsMaximum);
        }

        self.resampler.adjust(input_rate, output_rate, low_pass_rate)?;

        debug!(
            "stream adjust: radius={} lookahead={} unconsumed={}",
            radius,
            self.lookahead,
            self.end - self.start
        );

        // Re-balance the look-ahead zone against the new radius. Surplus frames return to the
        // unconsumed region; a deficit is borrowed back from its tail, and whatever cannot be
        // borrowed is topped up by the next refill before anything more is convolved.
        let channels = self.resampler.channels();
        let target = radius * channels;

        if self.lookahead > target {
            self.end += self.lookahead - target;
            self.lookahead = target;
        }
        else if self.lookahead < target {
            let borrowed = (target - self.lookahead).min(self.end - self.start);
            self.end -= borrowed;
            self.lookahead += borrowed;
        }

        if self.leading_padding_frames_needed > 0 {
            self.leading_padding_frames_needed = (target - self.lookahead) / channels;
        }

        if self.trailing_padding_frames_remaining > 0 {
            self.trailing_padding_frames_remaining = radius;
        }

        Ok(())
    }

    /// The number of interleaved channels per frame.
    pub fn channels(&self) -> usize {
        self.resampler.channels()
    }

    /// The number of input frames the stream buffers before sound emerges: the current kernel
    /// radius.
    pub fn latency_frames(&self) -> usize {
        self.resampler.padding_frames()
    }

    /// Resamples until the producer runs out of input or the consumer returns `false`.
    ///
    /// `producer` fills the given buffer with up to its length in whole interleaved frames and
    /// returns the number of frames written; zero signals end-of-stream. `consumer` receives one
    /// unclamped `i32` frame at a time and returns whether to keep going.
    ///
    /// Both termination reasons leave the stream consistent: more input arriving later simply
    /// resumes, and after a consumer halt the next call picks up with the following frame.
    pub fn resample<P, C>(
        &mut self,
        table: &KernelTable,
        mut producer: P,
        mut consumer: C,
    ) -> Termination
    where
        P: FnMut(&mut [i16]) -> usize,
        C: FnMut(&[i32]) -> bool,
    {
        let channels = self.resampler.channels();
        let maximum_radius_samples = self.maximum_integer_stretched_kernel_radius * channels;

        loop {
            let radius_samples = self.resampler.padding_frames() * channels;

            // Prime the look-ahead zone with the opening frames of the stream. Until it is
            // full, the first convolution window would read past real data.
            while self.leading_padding_frames_needed > 0 {
                let needed = self.leading_padding_frames_needed;
                let offset = self.end + self.lookahead;

                let written = producer(&mut self.buffer[offset..offset + needed * channels]);
                if written == 0 {
                    return Termination::InputExhausted;
                }

                debug_assert!(written <= needed);
                let written = written.min(needed);

                self.lookahead += written * channels;
                self.leading_padding_frames_needed -= written;
            }

            // Refill an empty unconsumed region.
            if self.start == self.end {
                // Slide the convolution history and the withheld look-ahead to the front, then
                // pull fresh audio in behind them.
                let keep = self.end - maximum_radius_samples..self.end + self.lookahead;
                let keep_len = keep.len();

                self.buffer.copy_within(keep, 0);
                self.start = maximum_radius_samples;
                self.end = self.start;

                let offset = keep_len;
                let written =
                    producer(&mut self.buffer[offset..offset + BATCH_FRAMES * channels]);
                if written == 0 {
                    return Termination::InputExhausted;
                }

                debug_assert!(written <= BATCH_FRAMES);
                let written = written.min(BATCH_FRAMES);

                // Withhold the final kernel radius of what is now buffered as the new
                // look-ahead; everything before it becomes consumable.
                let available = self.lookahead + written * channels;
                self.lookahead = available.min(radius_samples);
                self.end = self.start + (available - self.lookahead);

                if self.start == self.end {
                    // The pull was too short to cover the look-ahead; pull again.
                    continue;
                }
            }

            // Hand the padded region to the convolver. By this point the look-ahead zone is
            // exactly one kernel radius deep, so the region is fully backed by real samples.
            debug_assert!(self.lookahead == radius_samples);

            let mut frames = (self.end - self.start) / channels;
            let consumed_before = frames;

            let region = &self.buffer[self.start - radius_samples..self.end + radius_samples];
            let termination = self.resampler.resample(table, region, &mut frames, &mut consumer);

            self.start += (consumed_before - frames) * channels;

            if termination == Termination::ConsumerHalted {
                return Termination::ConsumerHalted;
            }
        }
    }

    /// Drains the stream after end-of-input by pushing one kernel radius of silence through the
    /// pipeline, flushing the frames held in the look-ahead zone.
    ///
    /// Call once after [`resample`][StreamResampler::resample] has returned
    /// [`Termination::InputExhausted`] for the final time. If the consumer halts mid-drain the
    /// call may be repeated to finish the job.
    pub fn finish<C>(&mut self, table: &KernelTable, consumer: C) -> Termination
    where
        C: FnMut(&[i32]) -> bool,
    {
        let channels = self.resampler.channels();
        let mut remaining = self.trailing_padding_frames_remaining;

        let termination = self.resample(
            table,
            |buffer: &mut [i16]| {
                let frames = (buffer.len() / channels).min(remaining);
                buffer[..frames * channels].fill(0);
                remaining -= frames;
                frames
            },
            consumer,
        );

        self.trailing_padding_frames_remaining = remaining;
        termination
    }
}
