use super::*;

fn scratch(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "wavecast_seq_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0)
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn half_red(canvas: Canvas) -> RasterFrame {
    let data = [128u8, 0, 0, 128].repeat(canvas.width as usize * canvas.height as usize);
    RasterFrame::from_premul(canvas, data).unwrap()
}

#[test]
fn writes_numbered_straight_alpha_pngs() {
    let dir = scratch("ok");
    let canvas = Canvas::new(8, 4).unwrap();
    let frames = vec![half_red(canvas); 3];
    let clip = PngSequenceEncoder::encode_all(&dir, Fps::default(), frames).unwrap();

    assert_eq!(clip.frame_count, 3);
    assert_eq!(clip.canvas, canvas);
    assert!((clip.duration_sec() - 0.125).abs() < 1e-12);
    assert_eq!(clip.pattern(), dir.join("frame_%06d.png"));

    let last = clip.frame_path(FrameIndex(2));
    assert!(last.ends_with("frame_000002.png"));
    let img = image::open(&last).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (8, 4));
    assert_eq!(img.get_pixel(0, 0).0, [255, 0, 0, 128]);
    assert!(!clip.frame_path(FrameIndex(3)).exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn empty_sequence_is_an_encode_error() {
    let dir = scratch("empty");
    let err = PngSequenceEncoder::encode_all(&dir, Fps::default(), Vec::new()).unwrap_err();
    assert!(matches!(err, PipelineError::Encode(_)));

    let mut enc = PngSequenceEncoder::new(&dir).unwrap();
    enc.begin(SinkConfig {
        canvas: Canvas::new(2, 2).unwrap(),
        fps: Fps::default(),
        frame_count: 0,
    })
    .unwrap();
    assert!(matches!(enc.end(), Err(PipelineError::Encode(_))));
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inconsistent_dimensions_are_rejected() {
    let dir = scratch("dims");
    let frames = vec![
        half_red(Canvas::new(8, 4).unwrap()),
        half_red(Canvas::new(4, 4).unwrap()),
    ];
    let err = PngSequenceEncoder::encode_all(&dir, Fps::default(), frames).unwrap_err();
    assert!(matches!(err, PipelineError::Encode(_)));
    // Validation runs before any file is written.
    assert!(!dir.join("frame_000000.png").exists());
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn short_sequence_fails_at_end() {
    let dir = scratch("short");
    let canvas = Canvas::new(2, 2).unwrap();
    let mut enc = PngSequenceEncoder::new(&dir).unwrap();
    enc.begin(SinkConfig {
        canvas,
        fps: Fps::default(),
        frame_count: 2,
    })
    .unwrap();
    enc.push_frame(FrameIndex(0), RasterFrame::transparent(canvas))
        .unwrap();
    assert_eq!(enc.frames_written(), 1);
    assert!(enc.end().is_err());
    assert!(enc.into_clip().is_err());
    let _ = std::fs::remove_dir_all(&dir);
}
