use super::*;

fn joined(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn download_formats_map_to_codecs() {
    assert_eq!(AudioCodec::from_download_format("aac").unwrap(), AudioCodec::Aac);
    assert_eq!(AudioCodec::from_download_format("MP3").unwrap(), AudioCodec::Mp3);
    assert_eq!(AudioCodec::from_download_format("webm").unwrap(), AudioCodec::Opus);
    assert!("flac".parse::<AudioCodec>().is_err());
    assert_eq!(AudioCodec::Mp3.ffmpeg_encoder(), "libmp3lame");
    assert_eq!(AudioCodec::default(), AudioCodec::Aac);
}

#[test]
fn codec_serde_uses_lowercase_names() {
    assert_eq!(serde_json::to_string(&AudioCodec::Opus).unwrap(), "\"opus\"");
    let c: AudioCodec = serde_json::from_str("\"mp3\"").unwrap();
    assert_eq!(c, AudioCodec::Mp3);
}

#[test]
fn mux_args_copy_video_and_encode_raw_audio() {
    let muxer = Muxer::new(ToolPaths::default(), "192k");
    let audio = AudioInput {
        path: PathBuf::from("/run/audio.f32le"),
        sample_rate: 48_000,
        channels: 2,
    };
    let args = muxer.args(
        Path::new("/run/composited.mp4"),
        &audio,
        AudioCodec::Aac,
        Path::new("/run/final.mp4"),
    );
    let line = joined(&args);
    assert!(line.starts_with("-y -i /run/composited.mp4 -f f32le -ar 48000 -ac 2 -i /run/audio.f32le"));
    assert!(line.contains("-c:v copy -c:a aac -b:a 192k"));
    assert!(line.contains("-shortest"));
    assert!(line.contains("-movflags +faststart"));
    assert!(!line.contains("-strict"));
    assert_eq!(args.last().unwrap(), "/run/final.mp4");
}

#[test]
fn opus_enables_experimental_mp4_muxing() {
    let muxer = Muxer::new(ToolPaths::default(), "128k");
    let audio = AudioInput {
        path: PathBuf::from("a.f32le"),
        sample_rate: 48_000,
        channels: 1,
    };
    let line = joined(&muxer.args(Path::new("v.mp4"), &audio, AudioCodec::Opus, Path::new("o.mp4")));
    assert!(line.contains("-c:a libopus -b:a 128k -strict experimental"));
}

#[test]
fn missing_ffmpeg_is_encoder_not_found() {
    let tools = ToolPaths {
        ffmpeg: PathBuf::from("wavecast-no-such-ffmpeg"),
        ffprobe: PathBuf::from("wavecast-no-such-ffprobe"),
    };
    let muxer = Muxer::new(tools, "192k");
    let audio = AudioInput {
        path: PathBuf::from("a.f32le"),
        sample_rate: 48_000,
        channels: 2,
    };
    let out = std::env::temp_dir().join("wavecast_mux_missing.mp4");
    let err = muxer
        .mux(Path::new("v.mp4"), &audio, AudioCodec::Aac, &out, &Watchdog::unbounded())
        .unwrap_err();
    assert!(err.is_encoder_not_found());
    assert!(!out.exists());
}
