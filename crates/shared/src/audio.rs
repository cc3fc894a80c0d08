use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Sample rate adopted by empty segments until real audio gives them one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// A mono PCM audio clip held in memory.
///
/// All assembly operations (concatenation, overlay, repetition,
/// truncation, gain) work on this representation; MP3 is only touched at
/// the load/export boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl AudioSegment {
    /// A zero-length segment. Appending it to real audio is a no-op;
    /// appending real audio to it adopts that audio's sample rate.
    pub fn empty() -> Self {
        Self {
            samples: Vec::new(),
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }

    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// A silent segment of the given duration.
    pub fn silence(duration_ms: u64, sample_rate: u32) -> Self {
        let len = (duration_ms * sample_rate as u64 / 1000) as usize;
        Self {
            samples: vec![0.0; len],
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn duration_ms(&self) -> u64 {
        if self.samples.is_empty() {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate as u64
    }

    /// Append another segment after this one. A rate mismatch is
    /// resolved by resampling the appended audio to this segment's rate.
    pub fn append(&mut self, other: &AudioSegment) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            self.sample_rate = other.sample_rate;
            self.samples.extend_from_slice(&other.samples);
            return;
        }

        if other.sample_rate == self.sample_rate {
            self.samples.extend_from_slice(&other.samples);
        } else {
            let resampled = other.resampled(self.sample_rate);
            self.samples.extend_from_slice(&resampled.samples);
        }
    }

    /// Mix another segment onto this one sample-wise (additive, clamped
    /// to full scale). The result keeps this segment's duration; the
    /// overlaid audio is resampled to this segment's rate if needed.
    pub fn overlay(&self, other: &AudioSegment) -> AudioSegment {
        if self.is_empty() || other.is_empty() {
            return self.clone();
        }

        let other = if other.sample_rate == self.sample_rate {
            other.clone()
        } else {
            other.resampled(self.sample_rate)
        };

        let mut mixed = self.samples.clone();
        for (base, over) in mixed.iter_mut().zip(other.samples.iter()) {
            *base = (*base + *over).clamp(-1.0, 1.0);
        }

        AudioSegment {
            samples: mixed,
            sample_rate: self.sample_rate,
        }
    }

    /// This segment repeated back to back `times` times.
    pub fn repeated(&self, times: usize) -> AudioSegment {
        let mut samples = Vec::with_capacity(self.samples.len() * times);
        for _ in 0..times {
            samples.extend_from_slice(&self.samples);
        }
        AudioSegment {
            samples,
            sample_rate: self.sample_rate,
        }
    }

    /// The first `duration_ms` of this segment. Asking for more than the
    /// segment holds returns the whole segment.
    pub fn truncated_ms(&self, duration_ms: u64) -> AudioSegment {
        let keep = (duration_ms * self.sample_rate as u64 / 1000) as usize;
        AudioSegment {
            samples: self.samples[..keep.min(self.samples.len())].to_vec(),
            sample_rate: self.sample_rate,
        }
    }

    /// Apply a gain in decibels; negative values attenuate.
    pub fn with_gain_db(&self, gain_db: f32) -> AudioSegment {
        let factor = 10f32.powf(gain_db / 20.0);
        AudioSegment {
            samples: self.samples.iter().map(|s| s * factor).collect(),
            sample_rate: self.sample_rate,
        }
    }

    /// Linear-interpolation resample to the target rate.
    pub fn resampled(&self, target_rate: u32) -> AudioSegment {
        if self.sample_rate == target_rate || self.samples.is_empty() {
            return AudioSegment {
                samples: self.samples.clone(),
                sample_rate: target_rate,
            };
        }

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = (self.samples.len() as f64 / ratio).round() as usize;
        let mut out = Vec::with_capacity(out_len);
        for i in 0..out_len {
            let src = i as f64 * ratio;
            let idx = (src.floor() as usize).min(self.samples.len() - 1);
            let frac = (src - idx as f64) as f32;
            let a = self.samples[idx];
            let b = if idx + 1 < self.samples.len() {
                self.samples[idx + 1]
            } else {
                a
            };
            out.push(a + (b - a) * frac);
        }

        AudioSegment {
            samples: out,
            sample_rate: target_rate,
        }
    }

    /// Decode an MP3 file into a mono segment. Multi-channel input is
    /// downmixed by averaging channels.
    pub fn from_mp3(path: &Path) -> Result<AudioSegment> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .with_context(|| format!("Unrecognized audio format: {}", path.display()))?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| anyhow!("No supported audio tracks found in {}", path.display()))?;

        let dec_opts: DecoderOptions = Default::default();
        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &dec_opts)
            .map_err(|e| anyhow!("Unsupported codec in {}: {}", path.display(), e))?;

        let track_id = track.id;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| anyhow!("Audio track reports no sample rate: {}", path.display()))?;

        let mut samples = Vec::new();
        while let Ok(packet) = format.next_packet() {
            while !format.metadata().is_latest() {
                format.metadata().pop();
            }

            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet)? {
                AudioBufferRef::F32(buf) => downmix(&mut samples, buf),
                AudioBufferRef::F64(buf) => downmix(&mut samples, buf),
                AudioBufferRef::U8(buf) => downmix(&mut samples, buf),
                AudioBufferRef::U16(buf) => downmix(&mut samples, buf),
                AudioBufferRef::U24(buf) => downmix(&mut samples, buf),
                AudioBufferRef::U32(buf) => downmix(&mut samples, buf),
                AudioBufferRef::S8(buf) => downmix(&mut samples, buf),
                AudioBufferRef::S16(buf) => downmix(&mut samples, buf),
                AudioBufferRef::S24(buf) => downmix(&mut samples, buf),
                AudioBufferRef::S32(buf) => downmix(&mut samples, buf),
            }
        }

        Ok(AudioSegment {
            samples,
            sample_rate,
        })
    }

    /// Encode this segment as MP3 and write it to `path`.
    pub fn export_mp3(&self, path: &Path) -> Result<()> {
        let mp3 = self.to_mp3_bytes()?;
        std::fs::write(path, mp3)
            .with_context(|| format!("Failed to write audio file: {}", path.display()))?;
        Ok(())
    }

    /// Encode this segment as MP3 and return the bytes.
    pub fn to_mp3_bytes(&self) -> Result<Vec<u8>> {
        use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, MonoPcm, Quality};

        let pcm: Vec<i16> = self
            .samples
            .iter()
            .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect();

        let mut builder = Builder::new().ok_or_else(|| anyhow!("Failed to create MP3 encoder"))?;
        builder
            .set_num_channels(1)
            .map_err(|e| anyhow!("Failed to set encoder channels: {:?}", e))?;
        builder
            .set_sample_rate(self.sample_rate)
            .map_err(|e| anyhow!("Failed to set encoder sample rate: {:?}", e))?;
        builder
            .set_brate(Bitrate::Kbps128)
            .map_err(|e| anyhow!("Failed to set encoder bitrate: {:?}", e))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| anyhow!("Failed to set encoder quality: {:?}", e))?;
        let mut encoder = builder
            .build()
            .map_err(|e| anyhow!("Failed to build MP3 encoder: {:?}", e))?;

        let mut mp3 = Vec::new();
        mp3.reserve(mp3lame_encoder::max_required_buffer_size(pcm.len()));

        let written = encoder
            .encode(MonoPcm(&pcm), mp3.spare_capacity_mut())
            .map_err(|e| anyhow!("MP3 encoding failed: {:?}", e))?;
        // SAFETY: the encoder initialized `written` bytes of the spare capacity
        unsafe { mp3.set_len(mp3.len() + written) };

        let written = encoder
            .flush::<FlushNoGap>(mp3.spare_capacity_mut())
            .map_err(|e| anyhow!("MP3 encoder flush failed: {:?}", e))?;
        // SAFETY: as above, for the flushed tail
        unsafe { mp3.set_len(mp3.len() + written) };

        Ok(mp3)
    }
}

fn downmix<T>(samples: &mut Vec<f32>, buf: std::borrow::Cow<AudioBuffer<T>>)
where
    T: symphonia::core::sample::Sample,
    f32: FromSample<T>,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    if channels == 1 {
        samples.extend(buf.chan(0).iter().map(|v| f32::from_sample(*v)));
        return;
    }
    for frame in 0..frames {
        let mut acc = 0.0f32;
        for ch in 0..channels {
            acc += f32::from_sample(buf.chan(ch)[frame]);
        }
        samples.push(acc / channels as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: f32, len: usize, rate: u32) -> AudioSegment {
        AudioSegment::from_samples(vec![value; len], rate)
    }

    // ==================== Duration Tests ====================

    #[test]
    fn test_duration_from_samples_and_rate() {
        let seg = constant(0.0, 24_000, 24_000);
        assert_eq!(seg.duration_ms(), 1000);
    }

    #[test]
    fn test_empty_segment_has_zero_duration() {
        assert_eq!(AudioSegment::empty().duration_ms(), 0);
    }

    #[test]
    fn test_silence_has_requested_duration() {
        let seg = AudioSegment::silence(250, 24_000);
        assert_eq!(seg.duration_ms(), 250);
    }

    // ==================== Append Tests ====================

    #[test]
    fn test_append_adds_durations_exactly() {
        let mut a = constant(0.1, 2400, 24_000);
        let b = constant(0.2, 4800, 24_000);
        a.append(&b);
        assert_eq!(a.duration_ms(), 300);
        assert_eq!(a.samples().len(), 7200);
    }

    #[test]
    fn test_append_to_empty_adopts_other_rate() {
        let mut a = AudioSegment::empty();
        let b = constant(0.5, 441, 44_100);
        a.append(&b);
        assert_eq!(a.sample_rate(), 44_100);
        assert_eq!(a.samples().len(), 441);
    }

    #[test]
    fn test_appending_empty_is_a_noop() {
        let mut a = constant(0.5, 100, 24_000);
        a.append(&AudioSegment::empty());
        assert_eq!(a.samples().len(), 100);
    }

    #[test]
    fn test_append_resamples_rate_mismatch() {
        let mut a = constant(0.1, 24_000, 24_000);
        let b = constant(0.2, 48_000, 48_000);
        a.append(&b);
        // One second plus one second, at the base rate
        assert_eq!(a.sample_rate(), 24_000);
        assert_eq!(a.duration_ms(), 2000);
    }

    // ==================== Overlay Tests ====================

    #[test]
    fn test_overlay_keeps_base_duration() {
        let base = constant(0.1, 1000, 24_000);
        let longer = constant(0.1, 5000, 24_000);
        let mixed = base.overlay(&longer);
        assert_eq!(mixed.samples().len(), 1000);
    }

    #[test]
    fn test_overlay_is_additive() {
        let base = constant(0.25, 10, 24_000);
        let over = constant(0.25, 10, 24_000);
        let mixed = base.overlay(&over);
        for s in mixed.samples() {
            assert!((s - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_overlay_clamps_at_full_scale() {
        let base = constant(0.9, 10, 24_000);
        let over = constant(0.9, 10, 24_000);
        let mixed = base.overlay(&over);
        for s in mixed.samples() {
            assert!((s - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_overlay_with_shorter_segment_leaves_tail_untouched() {
        let base = constant(0.25, 20, 24_000);
        let over = constant(0.25, 10, 24_000);
        let mixed = base.overlay(&over);
        assert!((mixed.samples()[5] - 0.5).abs() < 1e-6);
        assert!((mixed.samples()[15] - 0.25).abs() < 1e-6);
    }

    // ==================== Repeat / Truncate Tests ====================

    #[test]
    fn test_repeated_tiles_back_to_back() {
        let seg = constant(0.3, 100, 24_000);
        let tiled = seg.repeated(4);
        assert_eq!(tiled.samples().len(), 400);
    }

    #[test]
    fn test_repeated_zero_times_is_empty() {
        let seg = constant(0.3, 100, 24_000);
        assert!(seg.repeated(0).is_empty());
    }

    #[test]
    fn test_truncated_to_shorter_duration() {
        let seg = constant(0.3, 24_000, 24_000);
        let cut = seg.truncated_ms(250);
        assert_eq!(cut.duration_ms(), 250);
        assert_eq!(cut.samples().len(), 6000);
    }

    #[test]
    fn test_truncated_beyond_length_returns_whole_segment() {
        let seg = constant(0.3, 2400, 24_000);
        let cut = seg.truncated_ms(10_000);
        assert_eq!(cut.samples().len(), 2400);
    }

    // ==================== Gain / Resample Tests ====================

    #[test]
    fn test_negative_gain_attenuates() {
        let seg = constant(0.8, 10, 24_000);
        let quieter = seg.with_gain_db(-6.0);
        // -6 dB is almost exactly half amplitude
        for s in quieter.samples() {
            assert!((s - 0.8 * 0.501187).abs() < 1e-3);
        }
    }

    #[test]
    fn test_zero_gain_is_identity() {
        let seg = constant(0.4, 10, 24_000);
        let same = seg.with_gain_db(0.0);
        assert_eq!(seg, same);
    }

    #[test]
    fn test_resample_preserves_duration() {
        let seg = constant(0.2, 48_000, 48_000);
        let down = seg.resampled(24_000);
        assert_eq!(down.sample_rate(), 24_000);
        assert_eq!(down.duration_ms(), 1000);
        assert_eq!(down.samples().len(), 24_000);
    }

    // ==================== Codec Round Trip ====================

    #[test]
    fn test_mp3_export_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.mp3");

        // 500 ms of a soft ramp so the encoder has real content
        let samples: Vec<f32> = (0..12_000).map(|i| (i % 100) as f32 / 400.0).collect();
        let seg = AudioSegment::from_samples(samples, 24_000);
        seg.export_mp3(&path).unwrap();

        let reloaded = AudioSegment::from_mp3(&path).unwrap();
        assert_eq!(reloaded.sample_rate(), 24_000);
        // The encoder pads to frame boundaries; duration survives within
        // a small tolerance
        let delta = reloaded.duration_ms() as i64 - 500;
        assert!(delta.abs() < 150, "duration drifted by {} ms", delta);
    }
}
