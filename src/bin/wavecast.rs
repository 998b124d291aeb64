use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use wavecast::assets::media::{DecodeOpts, decode_audio_f32};
use wavecast::audio::mix::change_speed;
use wavecast::{
    AudioCodec, BackgroundSpec, CancelToken, CompositionSpec, FrameIndex, FrameSampler,
    PipelineError, RenderStyle, Rgb8, RunConfig, Watchdog, Waveform, WaveformRenderer,
    decode_waveform, generate_with, render_preview_frame,
};

#[derive(Parser, Debug)]
#[command(name = "wavecast", version, about = "Render audio waveform videos")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a waveform video (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single waveform frame as a PNG.
    Frame(FrameArgs),
    /// Print decoded facts about an audio file.
    Probe(ProbeArgs),
}

#[derive(Args, Debug)]
struct LookArgs {
    /// Waveform style: bars, lines, circles, frequency-bars, smooth-lines.
    #[arg(long, default_value = "bars")]
    style: String,

    /// Waveform color as #RGB or #RRGGBB.
    #[arg(long, default_value = "#FFFFFF")]
    color: String,

    /// Playback speed multiplier in [0.1, 5.0].
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Run config JSON (canvas, fps, styling constants, tool paths).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Audio source; pass twice to mix a background track under the first.
    #[arg(long = "audio", required = true)]
    audio: Vec<PathBuf>,

    /// Still image (png, jpg, jpeg, gif) used instead of the background color.
    #[arg(long)]
    background_image: Option<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    look: LookArgs,

    /// Background color as #RGB or #RRGGBB.
    #[arg(long, default_value = "#000000")]
    background_color: String,

    /// Background opacity in [0, 1].
    #[arg(long, default_value_t = 1.0)]
    opacity: f32,

    /// Text drawn near the top of the video.
    #[arg(long)]
    text: Option<String>,

    /// Audio codec or download format: aac, mp3, webm.
    #[arg(long, default_value = "aac")]
    audio_codec: String,

    /// Wall-clock budget in seconds.
    #[arg(long)]
    timeout: Option<f64>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Audio source.
    #[arg(long)]
    audio: PathBuf,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    look: LookArgs,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    /// Audio source.
    #[arg(long)]
    audio: PathBuf,

    /// Run config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let res = match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Probe(args) => cmd_probe(args),
    };
    match res {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<PipelineError>() {
                Some(pe) => eprintln!("{}", pe.user_message()),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<RunConfig> {
    match path {
        Some(p) => Ok(RunConfig::from_path(p)?),
        None => Ok(RunConfig::default()),
    }
}

fn parse_color(s: &str) -> anyhow::Result<Rgb8> {
    Ok(s.parse::<Rgb8>()?)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = load_config(args.look.config.as_deref())?;
    if args.timeout.is_some() {
        cfg.timeout_secs = args.timeout;
    }

    let spec = CompositionSpec {
        style: RenderStyle::from_name(&args.look.style),
        waveform_color: parse_color(&args.look.color)?,
        background: BackgroundSpec::SolidColor(parse_color(&args.background_color)?),
        background_opacity: args.opacity,
        playback_speed: args.look.speed,
        text_overlay: args.text,
        audio_codec: args.audio_codec.parse::<AudioCodec>()?,
    };
    spec.validate()?;

    let out = generate_with(
        &spec,
        args.audio.as_slice(),
        args.background_image.as_deref(),
        &args.out,
        &cfg,
        &CancelToken::new(),
    )?;
    eprintln!(
        "wrote {} ({} frames, {:.3}s, {}x{})",
        out.path.display(),
        out.frame_count,
        out.duration_sec,
        out.canvas.width,
        out.canvas.height
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.look.config.as_deref())?;
    let spec = CompositionSpec {
        style: RenderStyle::from_name(&args.look.style),
        waveform_color: parse_color(&args.look.color)?,
        playback_speed: args.look.speed,
        ..CompositionSpec::default()
    };
    spec.validate()?;

    let watchdog = Watchdog::new(CancelToken::new(), cfg.timeout());
    let pcm = decode_audio_f32(
        &cfg.tools,
        &args.audio,
        DecodeOpts {
            sample_rate: Some(cfg.mix_sample_rate),
            channels: Some(cfg.mix_channels),
        },
        &watchdog,
    )?;
    let waveform = Waveform::from_pcm(&change_speed(&pcm, spec.playback_speed)?)?;
    let sampler = FrameSampler::new(&waveform, waveform.duration_sec(), cfg.fps)?;
    let renderer =
        WaveformRenderer::new(cfg.canvas, spec.style, spec.waveform_color, cfg.style.clone())?;
    let frame = render_preview_frame(&renderer, &waveform, &sampler, FrameIndex(args.index))?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    frame
        .to_straight_image()?
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let waveform = decode_waveform(&cfg.tools, &args.audio, &Watchdog::unbounded())?;
    let sampler = FrameSampler::new(&waveform, waveform.duration_sec(), cfg.fps)?;
    println!("sample_rate: {}", waveform.sample_rate());
    println!("samples: {}", waveform.sample_count());
    println!("duration_sec: {:.3}", waveform.duration_sec());
    println!("peak: {:.4}", waveform.peak());
    println!("fps: {}", cfg.fps.ffmpeg_rate());
    println!("frames: {}", sampler.frame_count());
    println!("samples_per_frame: {}", sampler.samples_per_frame());
    Ok(())
}
