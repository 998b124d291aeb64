use super::*;
use crate::foundation::core::Fps;

fn clip() -> VideoClip {
    VideoClip {
        dir: PathBuf::from("/run/frames"),
        frame_count: 240,
        fps: Fps::default(),
        canvas: Canvas::default(),
    }
}

fn joined(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn solid_background_uses_color_source() {
    let comp = Compositor::new(ToolPaths::default(), 18, "medium");
    let line = joined(&comp.args(
        &clip(),
        &BackgroundLayer::Solid(Rgb8::new(0, 0, 0)),
        None,
        Path::new("/run/composited.mp4"),
    ));
    assert!(line.starts_with("-y -f lavfi -i color=c=0x000000:s=1280x720:r=24/1"));
    assert!(line.contains("-framerate 24/1 -start_number 0 -i /run/frames/frame_%06d.png"));
    assert!(line.contains("[0:v][1:v]overlay=0:0:format=auto[wave];[wave]format=yuv420p[vout]"));
    assert!(line.contains("-frames:v 240"));
    assert!(line.contains("-c:v libx264 -preset medium -crf 18 -pix_fmt yuv420p -an"));
    assert!(line.ends_with("/run/composited.mp4"));
}

#[test]
fn image_background_and_text_stack_in_order() {
    let comp = Compositor::new(ToolPaths::default(), 23, "veryfast");
    let line = joined(&comp.args(
        &clip(),
        &BackgroundLayer::Image(PathBuf::from("/run/background.png")),
        Some(Path::new("/run/text.png")),
        Path::new("/run/out.mp4"),
    ));
    assert!(line.starts_with("-y -loop 1 -framerate 24/1 -i /run/background.png"));
    let wave = line.find("frame_%06d.png").unwrap();
    let text = line.find("/run/text.png").unwrap();
    assert!(wave < text);
    assert!(line.contains(
        "[0:v][1:v]overlay=0:0:format=auto[wave];[wave][2:v]overlay=0:0:format=auto[titled];[titled]format=yuv420p[vout]"
    ));
}

#[test]
fn solid_background_needs_no_files() {
    let dir = std::env::temp_dir().join("wavecast_bg_never_created");
    let layer = prepare_background(
        &BackgroundSpec::SolidColor(Rgb8::WHITE),
        0.3,
        Canvas::default(),
        &dir,
    )
    .unwrap();
    assert_eq!(layer, BackgroundLayer::Solid(Rgb8::WHITE));
    assert!(!dir.exists());
}

#[test]
fn missing_text_means_no_layer() {
    let dir = std::env::temp_dir();
    let layer = prepare_text_layer(None, &TextStyle::default(), Canvas::default(), &dir).unwrap();
    assert_eq!(layer, None);
}

#[test]
fn image_background_is_scaled_into_run_dir() {
    let dir = std::env::temp_dir().join(format!("wavecast_bg_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let source = dir.join("source.png");
    image::RgbaImage::from_pixel(3, 5, image::Rgba([10, 20, 30, 255]))
        .save(&source)
        .unwrap();

    let canvas = Canvas::new(64, 36).unwrap();
    let layer = prepare_background(
        &BackgroundSpec::StillImage(source.clone()),
        1.0,
        canvas,
        &dir,
    )
    .unwrap();
    let BackgroundLayer::Image(png) = layer else {
        panic!("expected an image layer");
    };
    let scaled = image::open(&png).unwrap();
    assert_eq!((scaled.width(), scaled.height()), (64, 36));
    std::fs::remove_dir_all(&dir).unwrap();
}
