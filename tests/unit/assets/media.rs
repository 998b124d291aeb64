use super::*;

#[test]
fn accepted_audio_extensions_are_case_insensitive() {
    assert!(is_accepted_audio(Path::new("talk.WAV")));
    assert!(is_accepted_audio(Path::new("dir/voice.webm")));
    assert!(!is_accepted_audio(Path::new("cover.png")));
    assert!(!is_accepted_audio(Path::new("no_extension")));
}

#[test]
fn f32le_bytes_decode_and_reject_misaligned() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0.5f32.to_le_bytes());
    bytes.extend_from_slice(&(-1.0f32).to_le_bytes());
    assert_eq!(f32le_bytes_to_samples(&bytes).unwrap(), vec![0.5, -1.0]);
    assert!(f32le_bytes_to_samples(&bytes[..3]).is_err());
}

#[test]
fn pcm_frames_and_duration() {
    let pcm = AudioPcm::silence(48_000, 2, 96_000);
    assert_eq!(pcm.interleaved_f32.len(), 192_000);
    assert_eq!(pcm.frames(), 96_000);
    assert!((pcm.duration_sec() - 2.0).abs() < 1e-12);
}

#[test]
fn decoding_with_missing_decoder_reports_encoder_not_found() {
    let tools = ToolPaths {
        ffmpeg: "/nonexistent/ffmpeg".into(),
        ffprobe: "/nonexistent/ffprobe".into(),
    };
    let err = decode_audio_f32(
        &tools,
        Path::new("missing.wav"),
        DecodeOpts::default(),
        &Watchdog::unbounded(),
    )
    .unwrap_err();
    assert!(err.is_encoder_not_found());
}
