use super::*;

#[test]
fn fps_validation_and_conversions() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(24, 0).is_err());

    let fps = Fps::whole(24).unwrap();
    assert_eq!(fps.secs_to_frames_floor(10.0), 240);
    assert_eq!(fps.secs_to_frames_floor(9.99), 239);
    assert_eq!(fps.secs_to_frames_floor(-1.0), 0);
    assert!((fps.frames_to_secs(240) - 10.0).abs() < 1e-12);
    assert_eq!(fps.ffmpeg_rate(), "24/1");
}

#[test]
fn samples_per_frame_rounds_to_nearest() {
    let fps = Fps::whole(24).unwrap();
    // 44100 / 24 = 1837.5
    assert_eq!(fps.samples_per_frame(44_100), 1838);
    assert_eq!(fps.samples_per_frame(48_000), 2000);
    // 30000/1001 at 48 kHz = 1601.6
    assert_eq!(Fps::new(30_000, 1001).unwrap().samples_per_frame(48_000), 1602);
}

#[test]
fn canvas_rejects_odd_and_zero_sizes() {
    assert!(Canvas::new(0, 720).is_err());
    assert!(Canvas::new(1279, 720).is_err());
    assert!(Canvas::new(70_000, 720).is_err());
    let c = Canvas::default();
    assert_eq!((c.width, c.height), (1280, 720));
    assert_eq!(c.rgba_len(), 1280 * 720 * 4);
    assert_eq!(c.ffmpeg_size(), "1280x720");
}

#[test]
fn rgb_formats() {
    let c = Rgb8::new(255, 0, 16);
    assert_eq!(c.to_hex(), "#FF0010");
    assert_eq!(c.to_ffmpeg(), "0xFF0010");
}
