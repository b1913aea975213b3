use std::path::{Path, PathBuf};

use log::info;
use tokio::{runtime::Handle, sync::oneshot};

use super::AudioError;

#[derive(Clone, Debug)]
pub struct DecodedAudio {
    /// Mono samples in [-1, 1].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl DecodedAudio {
    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate.max(1) as f32
    }
}

pub fn load_wav(path: &Path) -> Result<DecodedAudio, AudioError> {
    let decode_err = |source| AudioError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = hound::WavReader::open(path).map_err(decode_err)?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(decode_err)?,
        hound::SampleFormat::Int => {
            let full_scale = (1u64 << (spec.bits_per_sample.max(1) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / full_scale))
                .collect::<Result<_, _>>()
                .map_err(decode_err)?
        }
    };

    let channels = spec.channels.max(1);
    let samples: Vec<f32> = interleaved
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect();
    if samples.is_empty() {
        return Err(AudioError::Empty(path.to_path_buf()));
    }
    Ok(DecodedAudio {
        samples,
        sample_rate: spec.sample_rate,
        channels,
    })
}

/// Decodes on the blocking pool; the frame loop polls the receiver.
pub fn spawn_load(
    runtime: &Handle,
    path: PathBuf,
) -> oneshot::Receiver<Result<DecodedAudio, AudioError>> {
    let (tx, rx) = oneshot::channel();
    runtime.spawn_blocking(move || {
        info!("decoding {}", path.display());
        let result = load_wav(&path);
        if let Ok(audio) = &result {
            info!(
                "decoded {} ({:.1}s, {} Hz, {} ch)",
                path.display(),
                audio.duration_secs(),
                audio.sample_rate,
                audio.channels
            );
        }
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_wav(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("{name}-{}.wav", std::process::id()))
    }

    #[test]
    fn decodes_stereo_int_wav_to_mono() {
        let path = temp_wav("decode-stereo");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for _ in 0..4 {
            writer.write_sample(i16::MAX).expect("left");
            writer.write_sample(0i16).expect("right");
        }
        writer.finalize().expect("finalize");

        let audio = load_wav(&path).expect("decode");
        let _ = std::fs::remove_file(&path);
        assert_eq!(audio.samples.len(), 4);
        assert_eq!(audio.sample_rate, 8000);
        assert_eq!(audio.channels, 2);
        for sample in audio.samples {
            assert!((sample - 0.5).abs() < 1e-3);
        }
    }

    #[test]
    fn decodes_float_wav() {
        let path = temp_wav("decode-float");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).expect("create wav");
        for value in [0.25f32, -0.5, 1.0] {
            writer.write_sample(value).expect("sample");
        }
        writer.finalize().expect("finalize");

        let audio = load_wav(&path).expect("decode");
        let _ = std::fs::remove_file(&path);
        assert_eq!(audio.samples, vec![0.25, -0.5, 1.0]);
    }

    #[test]
    fn missing_file_is_a_decode_error() {
        let err = load_wav(Path::new("no/such/track.wav")).unwrap_err();
        assert!(matches!(err, AudioError::Decode { .. }));
    }

    #[test]
    fn spawned_load_delivers_result() {
        let runtime = tokio::runtime::Runtime::new().expect("runtime");
        let rx = spawn_load(runtime.handle(), PathBuf::from("no/such/track.wav"));
        let result = runtime.block_on(rx).expect("decode task finished");
        assert!(result.is_err());
    }
}
