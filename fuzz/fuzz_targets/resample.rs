#![no_main]

use libfuzzer_sys::fuzz_target;

use portamento::kernel::KernelTable;
use portamento::stream::StreamResampler;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    // Derive a configuration from the head of the input; the tail is the audio.
    let channels = 1 + usize::from(data[0] % 4);
    let input_rate = 1000 + u32::from_le_bytes([data[1], data[2], 0, 0]) * 3;
    let output_rate = 1000 + u32::from_le_bytes([data[3], data[4], 0, 0]) * 3;
    let low_pass_rate = 1000 + u32::from_le_bytes([data[5], data[6], 0, 0]) * 3;
    let chunk_frames = 1 + usize::from(data[7] % 64);

    let samples: Vec<i16> = data[8..]
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    let frames = samples.len() / channels;
    let input = &samples[..frames * channels];

    let table = KernelTable::new();

    let Ok(mut stream) = StreamResampler::new(channels, input_rate, output_rate, low_pass_rate)
    else {
        return;
    };

    let mut consumed = 0;

    stream.resample(
        &table,
        |buffer: &mut [i16]| {
            let frames =
                (buffer.len() / channels).min(chunk_frames).min((input.len() - consumed) / channels);
            buffer[..frames * channels]
                .copy_from_slice(&input[consumed..consumed + frames * channels]);
            consumed += frames * channels;
            frames
        },
        |_frame: &[i32]| true,
    );

    stream.finish(&table, |_frame: &[i32]| true);
});
