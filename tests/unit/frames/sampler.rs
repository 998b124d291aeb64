use super::*;

fn sine(seconds: f64, rate: u32) -> Waveform {
    let n = (seconds * f64::from(rate)) as usize;
    let samples = (0..n)
        .map(|i| 0.5 * (i as f32 * 440.0 * std::f32::consts::TAU / rate as f32).sin())
        .collect();
    Waveform::new(samples, rate).unwrap()
}

#[test]
fn ten_seconds_at_24fps_is_240_frames() {
    let wf = sine(10.0, 44_100);
    let sampler = FrameSampler::new(&wf, wf.duration_sec(), Fps::default()).unwrap();
    assert_eq!(sampler.frame_count(), 240);
    // 44100 / 24 = 1837.5, rounded half up.
    assert_eq!(sampler.samples_per_frame(), 1838);
    assert_eq!(sampler.windows().len(), 240);
}

#[test]
fn last_window_is_truncated_not_padded() {
    let wf = sine(10.0, 44_100);
    let sampler = FrameSampler::new(&wf, wf.duration_sec(), Fps::default()).unwrap();
    let last = sampler.windows().last().unwrap();
    assert_eq!(last.index, FrameIndex(239));
    assert_eq!(last.end, wf.sample_count());
    // 239 * 1838 = 439282, so only 1718 of 1838 samples remain.
    assert_eq!(last.start, 439_282);
    assert_eq!(last.len(), 1_718);
    assert!(sampler.windows().all(|w| w.end <= wf.sample_count()));
}

#[test]
fn windows_past_buffer_end_are_empty() {
    let wf = Waveform::new(vec![0.1; 100], 100).unwrap();
    // Ask for 3 s of video from 1 s of samples.
    let sampler = FrameSampler::new(&wf, 3.0, Fps::whole(2).unwrap()).unwrap();
    assert_eq!(sampler.frame_count(), 6);
    let windows: Vec<_> = sampler.windows().collect();
    assert_eq!(windows[1].range(), 50..100);
    assert!(windows[2..].iter().all(|w| w.is_empty() && w.end == 100));
    assert!(windows[5].samples(&wf).is_empty());
}

#[test]
fn scale_is_global_and_shared() {
    let mut samples = vec![0.1f32; 1_000];
    samples[900] = -0.8;
    let wf = Waveform::new(samples, 1_000).unwrap();
    let sampler = FrameSampler::new(&wf, 1.0, Fps::whole(10).unwrap()).unwrap();
    assert_eq!(sampler.scale(), 0.8);
    assert!(sampler.windows().all(|w| w.scale == 0.8));
}

#[test]
fn silent_waveform_scale_is_coerced_to_one() {
    let wf = Waveform::new(vec![0.0; 480], 48).unwrap();
    let sampler = FrameSampler::new(&wf, wf.duration_sec(), Fps::default()).unwrap();
    assert_eq!(sampler.scale(), 1.0);
    assert_eq!(sampler.frame_count(), 240);
}

#[test]
fn iteration_is_restartable() {
    let wf = sine(1.0, 8_000);
    let sampler = FrameSampler::new(&wf, 1.0, Fps::default()).unwrap();
    let a: Vec<_> = sampler.windows().collect();
    let b: Vec<_> = sampler.windows().collect();
    assert_eq!(a, b);
    assert_eq!(sampler.window(FrameIndex(24)), None);
}

#[test]
fn rejects_impossible_durations() {
    let wf = sine(1.0, 8_000);
    assert!(FrameSampler::new(&wf, 0.0, Fps::default()).is_err());
    assert!(FrameSampler::new(&wf, f64::NAN, Fps::default()).is_err());
}
