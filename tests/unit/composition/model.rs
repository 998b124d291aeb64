use super::*;

#[test]
fn default_spec_is_valid() {
    let spec = CompositionSpec::default();
    spec.validate().unwrap();
    assert_eq!(spec.background, BackgroundSpec::SolidColor(Rgb8::BLACK));
    assert_eq!(spec.text(), None);
}

#[test]
fn ranges_are_enforced() {
    let bad_speeds = [0.05, 5.5, f64::NAN];
    for speed in bad_speeds {
        let spec = CompositionSpec {
            playback_speed: speed,
            ..CompositionSpec::default()
        };
        assert!(matches!(spec.validate(), Err(PipelineError::Validation(_))));
    }
    for speed in [0.1, 5.0] {
        let spec = CompositionSpec {
            playback_speed: speed,
            ..CompositionSpec::default()
        };
        spec.validate().unwrap();
    }
    let spec = CompositionSpec {
        background_opacity: 1.01,
        ..CompositionSpec::default()
    };
    assert!(spec.validate().is_err());
}

#[test]
fn background_image_extension_is_checked() {
    let spec = CompositionSpec {
        background: BackgroundSpec::StillImage(PathBuf::from("cover.bmp")),
        ..CompositionSpec::default()
    };
    assert!(spec.validate().is_err());
    let spec = CompositionSpec {
        background: BackgroundSpec::StillImage(PathBuf::from("cover.JPG")),
        ..CompositionSpec::default()
    };
    spec.validate().unwrap();
}

#[test]
fn blank_text_is_omitted() {
    let spec = CompositionSpec {
        text_overlay: Some("   ".to_owned()),
        ..CompositionSpec::default()
    };
    assert_eq!(spec.text(), None);
    let spec = CompositionSpec {
        text_overlay: Some(" Episode 12 ".to_owned()),
        ..CompositionSpec::default()
    };
    assert_eq!(spec.text(), Some("Episode 12"));
}

#[test]
fn explicit_image_overrides_background() {
    let spec = CompositionSpec::default();
    assert_eq!(spec.resolved_background(None), spec.background);
    assert_eq!(
        spec.resolved_background(Some(Path::new("bg.png"))),
        BackgroundSpec::StillImage(PathBuf::from("bg.png"))
    );
}

#[test]
fn spec_deserializes_with_defaults() {
    let spec: CompositionSpec = serde_json::from_str(
        r##"{"style":"frequency-bars","waveform_color":"#f00","background":{"kind":"solid_color","value":"#000000"},"audio_codec":"mp3"}"##,
    )
    .unwrap();
    assert_eq!(spec.style, RenderStyle::FrequencyBars);
    assert_eq!(spec.waveform_color, Rgb8::new(255, 0, 0));
    assert_eq!(spec.audio_codec, AudioCodec::Mp3);
    assert_eq!(spec.playback_speed, 1.0);
}
