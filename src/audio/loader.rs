use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::audio::types::{AudioData, AudioFormat};
use crate::error::{AudioError, Result};

/// Audio file loader supporting multiple formats
pub struct AudioLoader;

impl AudioLoader {
    /// Load an audio file and return decoded samples
    ///
    /// A missing file is reported as [`AudioError::NotFound`] before any
    /// decoding is attempted.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<AudioData> {
        let path = path.as_ref();
        Self::ensure_exists(path)?;

        let extension = Self::detect_format(path).unwrap_or_default();
        if !Self::is_format_supported(&extension) {
            return Err(AudioError::UnsupportedFormat { format: extension }.into());
        }

        let audio = match extension.as_str() {
            "wav" => Self::load_wav(path)?,
            _ => Self::load_with_symphonia(path)?,
        };

        if audio.samples.is_empty() {
            return Err(AudioError::AnalysisFailed {
                reason: format!("{} decoded to zero samples", path.display()),
            }
            .into());
        }

        tracing::debug!(
            "Decoded {}: {} samples, {} Hz, {} channels",
            path.display(),
            audio.samples.len(),
            audio.sample_rate,
            audio.channels
        );
        Ok(audio)
    }

    /// Fail with [`AudioError::NotFound`] unless `path` is an existing file
    pub fn ensure_exists(path: &Path) -> Result<()> {
        if path.is_file() {
            Ok(())
        } else {
            Err(AudioError::NotFound { path: path.display().to_string() }.into())
        }
    }

    fn load_failed(path: &Path) -> AudioError {
        AudioError::LoadFailed { path: path.display().to_string() }
    }

    /// WAV files go through hound
    fn load_wav(path: &Path) -> Result<AudioData> {
        let reader = hound::WavReader::open(path).map_err(|_| Self::load_failed(path))?;

        let spec = reader.spec();
        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| Self::load_failed(path))?,
            hound::SampleFormat::Int => reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|s| Self::int_to_float(s, spec.bits_per_sample)))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|_| Self::load_failed(path))?,
        };

        Ok(AudioData {
            duration: Self::duration_of(samples.len(), spec.sample_rate, spec.channels),
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            file_path: path.to_path_buf(),
            format: AudioFormat {
                extension: "wav".to_string(),
                bit_depth: Some(spec.bits_per_sample),
                compression: None,
            },
        })
    }

    /// Compressed formats go through symphonia
    fn load_with_symphonia(path: &Path) -> Result<AudioData> {
        let file = File::open(path).map_err(|_| Self::load_failed(path))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|_| Self::load_failed(path))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| Self::load_failed(path))?;

        let track_id = track.id;
        let codec_params = track.codec_params.clone();

        let sample_rate = codec_params.sample_rate.ok_or_else(|| AudioError::InvalidParameters {
            details: "No sample rate found".to_string(),
        })?;
        let channels = codec_params
            .channels
            .ok_or_else(|| AudioError::InvalidParameters {
                details: "No channel information found".to_string(),
            })?
            .count() as u16;

        let mut decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|_| Self::load_failed(path))?;

        let mut samples = Vec::new();
        let mut sample_buffer: Option<SampleBuffer<f32>> = None;

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                // End of stream
                Err(SymphoniaError::IoError(_)) => break,
                Err(e) => {
                    tracing::warn!("Stopping decode of {} early: {}", path.display(), e);
                    break;
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(decoded) => {
                    let buffer = sample_buffer.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec())
                    });
                    if buffer.capacity() < decoded.capacity() * decoded.spec().channels.count() {
                        *buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
                    }
                    buffer.copy_interleaved_ref(decoded);
                    samples.extend_from_slice(buffer.samples());
                }
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::debug!("Skipping undecodable packet: {}", e);
                    continue;
                }
                Err(SymphoniaError::IoError(_)) => break,
                Err(_) => return Err(Self::load_failed(path).into()),
            }
        }

        Ok(AudioData {
            duration: Self::duration_of(samples.len(), sample_rate, channels),
            samples,
            sample_rate,
            channels,
            file_path: path.to_path_buf(),
            format: AudioFormat {
                extension: Self::detect_format(path).unwrap_or_else(|| "unknown".to_string()),
                bit_depth: codec_params.bits_per_sample.map(|b| b as u16),
                compression: Some(format!("{:?}", codec_params.codec)),
            },
        })
    }

    fn duration_of(sample_count: usize, sample_rate: u32, channels: u16) -> f64 {
        let per_second = sample_rate as u64 * channels.max(1) as u64;
        if per_second == 0 {
            return 0.0;
        }
        sample_count as f64 / per_second as f64
    }

    /// Convert integer sample to float (-1.0 to 1.0)
    fn int_to_float(sample: i32, bit_depth: u16) -> f32 {
        match bit_depth {
            8 => sample as f32 / 128.0,
            16 => sample as f32 / 32768.0,
            24 => sample as f32 / 8388608.0,
            32 => sample as f32 / 2147483648.0,
            _ => sample as f32 / 32768.0,
        }
    }

    /// Detect audio format from file extension
    pub fn detect_format<P: AsRef<Path>>(path: P) -> Option<String> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file format is supported
    pub fn is_format_supported(extension: &str) -> bool {
        matches!(
            extension.to_lowercase().as_str(),
            "wav" | "mp3" | "flac" | "ogg" | "m4a" | "aac"
        )
    }
}
