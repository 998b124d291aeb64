use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PipelineError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(PipelineError::decode("x").to_string().contains("decode error:"));
    assert!(PipelineError::encode("x").to_string().contains("encode error:"));
    assert!(PipelineError::cancelled("x").to_string().contains("cancelled:"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PipelineError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn stage_context_wraps_once_and_root_unwraps() {
    let err = PipelineError::decode("empty")
        .at(Stage::Decoding)
        .at(Stage::Muxing);
    assert_eq!(err.stage(), Some(Stage::Decoding));
    assert!(matches!(err.root(), PipelineError::Decode(_)));
    assert!(err.to_string().starts_with("decoding failed:"));
}

#[test]
fn encoder_not_found_is_distinguished_through_stage() {
    let err = PipelineError::from(MuxError::EncoderNotFound {
        binary: "ffmpeg".to_owned(),
    })
    .at(Stage::Compositing);
    assert!(err.is_encoder_not_found());
    assert!(err.user_message().contains("FFmpeg is not installed"));

    let other = PipelineError::encode("no frames").at(Stage::Encoding);
    assert!(!other.is_encoder_not_found());
    assert!(other.user_message().starts_with("Video generation failed:"));
}
