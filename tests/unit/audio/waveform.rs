use super::*;

#[test]
fn stereo_is_downmixed_by_mean() {
    let pcm = AudioPcm {
        sample_rate: 4,
        channels: 2,
        interleaved_f32: vec![1.0, 0.0, -0.5, -0.5, 0.25, 0.75],
    };
    let wf = Waveform::from_pcm(&pcm).unwrap();
    assert_eq!(wf.samples(), &[0.5, -0.5, 0.5]);
    assert_eq!(wf.sample_rate(), 4);
    assert!((wf.duration_sec() - 0.75).abs() < 1e-12);
}

#[test]
fn mono_passes_through() {
    let pcm = AudioPcm {
        sample_rate: 8_000,
        channels: 1,
        interleaved_f32: vec![0.1, -0.9, 0.3],
    };
    let wf = Waveform::from_pcm(&pcm).unwrap();
    assert_eq!(wf.sample_count(), 3);
    assert!((wf.peak() - 0.9).abs() < 1e-6);
}

#[test]
fn empty_or_rateless_audio_is_a_decode_error() {
    assert!(matches!(
        Waveform::new(Vec::new(), 44_100),
        Err(PipelineError::Decode(_))
    ));
    assert!(matches!(
        Waveform::new(vec![0.0], 0),
        Err(PipelineError::Decode(_))
    ));
    let pcm = AudioPcm::silence(44_100, 2, 0);
    assert!(matches!(
        Waveform::from_pcm(&pcm),
        Err(PipelineError::Decode(_))
    ));
}
