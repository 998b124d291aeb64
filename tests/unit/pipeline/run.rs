use super::*;
use crate::composition::model::BackgroundSpec;
use crate::encode::ffmpeg::ToolPaths;
use crate::foundation::error::MuxError;

fn scratch_root(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("wavecast_runtest_{tag}_{}", unique_token()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn config_in(root: &Path) -> RunConfig {
    RunConfig {
        temp_root: Some(root.to_path_buf()),
        ..RunConfig::default()
    }
}

fn is_empty_dir(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn output_names_are_fresh_mp4s() {
    let a = output_file_name();
    let b = output_file_name();
    assert!(a.starts_with("waveform_video_") && a.ends_with(".mp4"));
    assert_ne!(a, b);
}

#[test]
fn states_map_to_stages() {
    assert_eq!(RunState::Muxing.stage(), Some(Stage::Muxing));
    assert_eq!(RunState::Done.stage(), None);
    assert!(RunState::Failed.is_terminal());
    assert!(!RunState::Rendering.is_terminal());
    assert_eq!(RunState::Compositing.to_string(), "compositing");
}

#[test]
fn invalid_inputs_fail_before_any_workspace_exists() {
    let root = scratch_root("invalid");
    let cfg = config_in(&root);
    let out = root.join("out.mp4");
    let spec = CompositionSpec::default();

    let none: [&Path; 0] = [];
    let three = [Path::new("a.wav"), Path::new("b.wav"), Path::new("c.wav")];
    let cases: Vec<(CompositionSpec, Vec<&Path>)> = vec![
        (spec.clone(), none.to_vec()),
        (spec.clone(), three.to_vec()),
        (spec.clone(), vec![Path::new("notes.txt")]),
        (
            CompositionSpec {
                playback_speed: 9.0,
                ..spec.clone()
            },
            vec![Path::new("a.wav")],
        ),
        (
            CompositionSpec {
                background: BackgroundSpec::StillImage(PathBuf::from("bg.tiff")),
                ..spec.clone()
            },
            vec![Path::new("a.wav")],
        ),
    ];

    for (spec, audio) in cases {
        let err = generate_with(&spec, audio.as_slice(), None, &out, &cfg, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Validated));
        assert!(matches!(err.root(), PipelineError::Validation(_)), "{err}");
    }
    assert!(is_empty_dir(&root));
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn missing_encoder_is_reported_and_leaves_no_residue() {
    let root = scratch_root("noenc");
    let cfg = RunConfig {
        tools: ToolPaths {
            ffmpeg: PathBuf::from("wavecast-missing-ffmpeg"),
            ffprobe: PathBuf::from("wavecast-missing-ffprobe"),
        },
        ..config_in(&root)
    };
    let out = root.join("video.mp4");
    let err = generate_with(
        &CompositionSpec::default(),
        &[Path::new("voice.wav")],
        None,
        &out,
        &cfg,
        &CancelToken::new(),
    )
    .unwrap_err();

    assert!(err.is_encoder_not_found());
    assert!(matches!(
        err.root(),
        PipelineError::Mux(MuxError::EncoderNotFound { binary }) if binary == "wavecast-missing-ffmpeg"
    ));
    assert!(err.user_message().contains("FFmpeg is not installed"));
    assert!(!out.exists());
    assert!(is_empty_dir(&root));
    std::fs::remove_dir_all(&root).unwrap();
}

#[test]
fn unrepresentable_timeout_fails_validation() {
    let root = scratch_root("timeout");
    let cfg = RunConfig {
        timeout_secs: Some(1e20),
        ..config_in(&root)
    };
    let out = root.join("video.mp4");
    let err = generate_with(
        &CompositionSpec::default(),
        &[Path::new("voice.wav")],
        None,
        &out,
        &cfg,
        &CancelToken::new(),
    )
    .unwrap_err();

    assert_eq!(err.stage(), Some(Stage::Validated));
    assert!(matches!(err.root(), PipelineError::Validation(_)), "{err}");
    assert!(is_empty_dir(&root));
    std::fs::remove_dir_all(&root).unwrap();
}
