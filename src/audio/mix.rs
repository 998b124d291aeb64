use std::path::Path;

use crate::assets::media::AudioPcm;
use crate::foundation::error::{PipelineError, PipelineResult};
use crate::foundation::math::db_to_gain;

/// Scale every sample by a gain in decibels.
pub fn apply_gain_db(pcm: &mut AudioPcm, gain_db: f32) {
    let gain = db_to_gain(gain_db);
    for s in &mut pcm.interleaved_f32 {
        *s *= gain;
    }
}

/// Append silence until `pcm` holds at least `frames` sample frames.
pub fn pad_with_silence(pcm: &mut AudioPcm, frames: usize) {
    let want = frames * usize::from(pcm.channels);
    if pcm.interleaved_f32.len() < want {
        pcm.interleaved_f32.resize(want, 0.0);
    }
}

/// Merge a foreground track over an attenuated background track, both starting at 0.
///
/// The shorter track is padded with silence so the result spans the longer one. Sums are
/// clamped to `[-1, 1]`.
pub fn overlay_merge(
    foreground: &AudioPcm,
    background: &AudioPcm,
    background_gain_db: f32,
) -> PipelineResult<AudioPcm> {
    if foreground.sample_rate != background.sample_rate
        || foreground.channels != background.channels
    {
        return Err(PipelineError::validation(format!(
            "cannot overlay {} Hz/{} ch audio onto {} Hz/{} ch audio",
            foreground.sample_rate,
            foreground.channels,
            background.sample_rate,
            background.channels
        )));
    }

    let mut out = background.clone();
    apply_gain_db(&mut out, background_gain_db);
    let frames = foreground.frames().max(background.frames());
    pad_with_silence(&mut out, frames);

    for (dst, src) in out
        .interleaved_f32
        .iter_mut()
        .zip(foreground.interleaved_f32.iter())
    {
        *dst += *src;
    }
    for s in &mut out.interleaved_f32 {
        *s = s.clamp(-1.0, 1.0);
    }
    Ok(out)
}

/// Resample `pcm` so it plays `speed` times faster (pitch follows speed).
///
/// Uses linear interpolation between neighbouring source frames.
pub fn change_speed(pcm: &AudioPcm, speed: f64) -> PipelineResult<AudioPcm> {
    if !speed.is_finite() || speed <= 0.0 {
        return Err(PipelineError::validation(
            "playback speed must be finite and > 0",
        ));
    }
    if (speed - 1.0).abs() < f64::EPSILON {
        return Ok(pcm.clone());
    }

    let ch = usize::from(pcm.channels);
    let src_frames = pcm.frames();
    if src_frames == 0 {
        return Ok(pcm.clone());
    }
    let out_frames = ((src_frames as f64) / speed).floor().max(1.0) as usize;
    let src = &pcm.interleaved_f32;
    let mut out = Vec::with_capacity(out_frames * ch);

    for i in 0..out_frames {
        let src_pos = (i as f64) * speed;
        let f0 = (src_pos.floor() as usize).min(src_frames - 1);
        let f1 = (f0 + 1).min(src_frames - 1);
        let frac = (src_pos - f0 as f64).clamp(0.0, 1.0) as f32;
        for c in 0..ch {
            let v0 = src[f0 * ch + c];
            let v1 = src[f1 * ch + c];
            out.push(v0 + (v1 - v0) * frac);
        }
    }

    Ok(AudioPcm {
        sample_rate: pcm.sample_rate,
        channels: pcm.channels,
        interleaved_f32: out,
    })
}

/// Write interleaved `f32` PCM samples to raw little-endian `.f32le` file.
pub fn write_pcm_to_f32le_file(samples_interleaved: &[f32], out_path: &Path) -> PipelineResult<()> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            PipelineError::Other(anyhow::anyhow!(
                "failed to create audio output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        PipelineError::Other(anyhow::anyhow!(
            "failed to write mixed audio file '{}': {e}",
            out_path.display()
        ))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
