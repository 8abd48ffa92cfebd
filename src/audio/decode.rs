use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::signal::Signal;
use crate::error::{EqError, Result};

/// Magnitude of `i16::MIN`; symphonia maps integer PCM onto [-1, 1) by this
/// power of two, so multiplying back is exact for 16-bit input.
const INT16_SCALE: f64 = 32768.0;

/// Decode an in-memory waveform container.
pub fn decode_waveform(bytes: Vec<u8>, extension: Option<&str>) -> Result<Signal> {
    decode_source(Box::new(Cursor::new(bytes)), extension)
}

/// Decode samples into signed 16-bit scale, downmixing to mono.
///
/// Deeper PCM keeps its extra resolution as the fractional part.
pub fn decode_source(source: Box<dyn MediaSource>, extension: Option<&str>) -> Result<Signal> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or(EqError::NoAudioTrack)?;

    let track_id = track.id;
    let channels = track.codec_params.channels.map_or(1, |c| c.count());
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(EqError::UnknownSampleRate)?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())?;

    let mut all_samples: Vec<f64> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        let num_frames = decoded.frames();

        let mut sample_buf = SampleBuffer::<f64>::new(num_frames as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);

        let samples = sample_buf.samples();

        if channels == 1 {
            all_samples.extend(samples.iter().map(|&s| s * INT16_SCALE));
        } else {
            for frame_samples in samples.chunks(channels) {
                let mono = frame_samples.iter().sum::<f64>() * INT16_SCALE / channels as f64;
                all_samples.push(mono);
            }
        }
    }

    if all_samples.is_empty() {
        return Err(EqError::EmptySignal);
    }

    log::info!(
        "Decoded waveform: {} samples, {}Hz, {:.2}s",
        all_samples.len(),
        sample_rate,
        all_samples.len() as f64 / sample_rate as f64
    );

    Ok(Signal::from_samples(all_samples, sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[i16], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn decodes_pcm16_unscaled() {
        let samples: Vec<i16> = vec![0, 1000, -1000, 32767, -32768, 5];
        let signal = decode_waveform(wav_bytes(&samples, 8000, 1), Some("wav")).unwrap();
        assert_eq!(signal.sample_rate, 8000);
        let expected: Vec<f64> = samples.iter().map(|&s| s as f64).collect();
        assert_eq!(signal.samples, expected);
        assert_eq!(signal.time.len(), samples.len());
    }

    #[test]
    fn downmixes_stereo() {
        let interleaved: Vec<i16> = vec![100, 300, -200, -400];
        let signal = decode_waveform(wav_bytes(&interleaved, 44100, 2), Some("wav")).unwrap();
        assert_eq!(signal.samples, vec![200.0, -300.0]);
    }

    #[test]
    fn keeps_24_bit_resolution() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 24,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for s in [256_000i32, 256_000 + 128, -(256_000 + 64), 1] {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        let signal = decode_waveform(cursor.into_inner(), Some("wav")).unwrap();
        assert_eq!(signal.samples, vec![1000.0, 1000.5, -1000.25, 1.0 / 256.0]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_waveform(b"definitely not a wav".to_vec(), Some("wav")).is_err());
    }
}
