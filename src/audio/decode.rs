// Decode - audio files to mono f32 waveforms
//
// WAV files are read with hound, MP3 files with symphonia. Multichannel
// audio is averaged down to one channel and kept at its native sample
// rate. Integer PCM is scaled by 2^(bits - 1) into [-1, 1).

use std::fs::File;
use std::path::Path;

use serde::Serialize;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::config::InputConfig;
use crate::error::AudioProcessingError;

/// Decoded mono recording
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waveform {
    pub samples: Vec<f32>,
    /// Native sample rate in Hz
    pub sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds (0 for a zero sample rate)
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Validate and decode an audio file
///
/// The extension must be in `config.allowed_extensions` and the file no
/// larger than `config.max_file_bytes`; both are checked before any
/// decoding starts.
///
/// # Errors
/// - `UnsupportedFormat` for extensions outside the allowed set, or
///   without a decoder
/// - `FileTooLarge` when the size limit is exceeded
/// - `Decode` for unreadable files and malformed audio
pub fn load<P: AsRef<Path>>(path: P, config: &InputConfig) -> Result<Waveform, AudioProcessingError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if !config.allows_extension(&extension) {
        return Err(AudioProcessingError::UnsupportedFormat { extension });
    }

    let size = std::fs::metadata(path)
        .map_err(|err| AudioProcessingError::Decode {
            reason: format!("cannot read {}: {}", path.display(), err),
        })?
        .len();
    if size > config.max_file_bytes {
        return Err(AudioProcessingError::FileTooLarge {
            size,
            limit: config.max_file_bytes,
        });
    }

    let waveform = match extension.as_str() {
        "wav" => decode_wav(path)?,
        "mp3" => decode_mp3(path)?,
        _ => return Err(AudioProcessingError::UnsupportedFormat { extension }),
    };

    log::info!(
        "Decoded {} samples @ {}Hz ({:.2}s) from {}",
        waveform.samples.len(),
        waveform.sample_rate,
        waveform.duration_secs(),
        path.display()
    );
    Ok(waveform)
}

/// Decode a PCM or IEEE-float WAV file
pub fn decode_wav(path: &Path) -> Result<Waveform, AudioProcessingError> {
    let decode_error = |err: hound::Error| AudioProcessingError::Decode {
        reason: format!("{}: {}", path.display(), err),
    };

    let mut reader = hound::WavReader::open(path).map_err(decode_error)?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels);

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<f32>, _>>()
            .map_err(decode_error)?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample == 0 || spec.bits_per_sample > 32 {
                return Err(AudioProcessingError::Decode {
                    reason: format!(
                        "unsupported bits per sample {} in {}",
                        spec.bits_per_sample,
                        path.display()
                    ),
                });
            }
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect::<Result<Vec<f32>, _>>()
                .map_err(decode_error)?
        }
    };

    Ok(Waveform::new(downmix(&interleaved, channels), spec.sample_rate))
}

/// Decode an MP3 file
///
/// Corrupt frames are skipped with a warning; a file without a decodable
/// audio track is an error.
pub fn decode_mp3(path: &Path) -> Result<Waveform, AudioProcessingError> {
    let decode_error = |context: &str, err: SymphoniaError| AudioProcessingError::Decode {
        reason: format!("{} {}: {}", context, path.display(), err),
    };

    let file = File::open(path).map_err(|err| AudioProcessingError::Decode {
        reason: format!("cannot open {}: {}", path.display(), err),
    })?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    hint.with_extension("mp3");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|err| decode_error("probing", err))?;
    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| AudioProcessingError::Decode {
            reason: format!("no audio track in {}", path.display()),
        })?;
    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|err| decode_error("creating decoder for", err))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;
    let mut buffer_spec = None;
    let mut max_frames = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref err))
                if err.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(err) => return Err(decode_error("reading", err)),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                log::warn!("Skipping corrupt MP3 frame in {}: {}", path.display(), reason);
                continue;
            }
            Err(err) => return Err(decode_error("decoding", err)),
        };

        let spec = *decoded.spec();
        if sample_rate.is_none() {
            sample_rate = Some(spec.rate);
        }
        let frames = decoded.capacity();
        // reallocate only when a packet outgrows the buffer or the layout changes
        if buffer_spec != Some(spec) || frames > max_frames {
            sample_buf = Some(SampleBuffer::<f32>::new(frames as u64, spec));
            buffer_spec = Some(spec);
            max_frames = frames;
        }
        let Some(buf) = sample_buf.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);
        samples.extend(downmix(buf.samples(), spec.channels.count()));
    }

    let sample_rate = sample_rate.ok_or_else(|| AudioProcessingError::Decode {
        reason: format!("unknown sample rate in {}", path.display()),
    })?;
    Ok(Waveform::new(samples, sample_rate))
}

/// Average interleaved frames down to one channel
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_wav(dir: &TempDir, name: &str, channels: u16, frames: &[Vec<i16>]) -> PathBuf {
        let path = dir.path().join(name);
        let spec = hound::WavSpec {
            channels,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for frame in frames {
            for &sample in frame {
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
        path
    }

    #[test]
    fn test_decode_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(&dir, "mono.wav", 1, &[vec![0], vec![16_384], vec![-32_768]]);

        let waveform = load(&path, &InputConfig::default()).unwrap();
        assert_eq!(waveform.sample_rate, 16_000);
        assert_eq!(waveform.samples, vec![0.0, 0.5, -1.0]);
    }

    #[test]
    fn test_stereo_is_downmixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(
            &dir,
            "stereo.wav",
            2,
            &[vec![16_384, -16_384], vec![16_384, 0], vec![8_192, 8_192]],
        );

        let waveform = decode_wav(&path).unwrap();
        assert_eq!(waveform.samples, vec![0.0, 0.25, 0.25]);
    }

    #[test]
    fn test_decode_float_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for sample in [0.25f32, -0.75, 1.0] {
            writer.write_sample(sample).unwrap();
        }
        writer.finalize().unwrap();

        let waveform = decode_wav(&path).unwrap();
        assert_eq!(waveform.sample_rate, 22_050);
        assert_eq!(waveform.samples, vec![0.25, -0.75, 1.0]);
    }

    #[test]
    fn test_uppercase_extension_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(&dir, "LOUD.WAV", 1, &[vec![100]]);
        assert!(load(&path, &InputConfig::default()).is_ok());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.flac");
        std::fs::write(&path, b"fLaC").unwrap();

        let err = load(&path, &InputConfig::default()).unwrap_err();
        assert_eq!(
            err,
            AudioProcessingError::UnsupportedFormat {
                extension: "flac".to_string()
            }
        );
    }

    #[test]
    fn test_missing_extension() {
        let err = load("no_extension", &InputConfig::default()).unwrap_err();
        assert!(matches!(err, AudioProcessingError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_allowed_extension_without_decoder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("speech.ogg");
        std::fs::write(&path, b"OggS").unwrap();
        let config = InputConfig {
            allowed_extensions: vec!["ogg".to_string()],
            ..InputConfig::default()
        };

        let err = load(&path, &config).unwrap_err();
        assert!(matches!(err, AudioProcessingError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_file_too_large() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_wav(&dir, "big.wav", 1, &vec![vec![0i16]; 64]);
        let config = InputConfig {
            max_file_bytes: 32,
            ..InputConfig::default()
        };

        let err = load(&path, &config).unwrap_err();
        assert!(matches!(
            err,
            AudioProcessingError::FileTooLarge { limit: 32, .. }
        ));
    }

    #[test]
    fn test_missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(dir.path().join("absent.wav"), &InputConfig::default()).unwrap_err();
        assert!(matches!(err, AudioProcessingError::Decode { .. }));
    }

    #[test]
    fn test_corrupt_files_are_decode_errors() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["broken.wav", "broken.mp3"] {
            let path = dir.path().join(name);
            std::fs::write(&path, b"definitely not audio").unwrap();
            let err = load(&path, &InputConfig::default()).unwrap_err();
            assert!(
                matches!(err, AudioProcessingError::Decode { .. }),
                "{} gave {:?}",
                name,
                err
            );
        }
    }

    #[test]
    fn test_duration() {
        let waveform = Waveform::new(vec![0.0; 8_000], 16_000);
        assert!((waveform.duration_secs() - 0.5).abs() < 1e-12);
        assert_eq!(Waveform::new(vec![0.0; 10], 0).duration_secs(), 0.0);
    }
}
