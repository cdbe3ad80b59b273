use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "skyfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single pipeline frame as a PNG.
    Frame(FrameArgs),
    /// Run the render loop headlessly and write every presented frame as a PNG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame index (0-based).
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Effect config JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color grade backend.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Directory receiving `frame_NNNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Effect config JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Color grade backend.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,

    /// Simulated pointer position `X,Y`, inside the image for the whole run.
    #[arg(long, value_parser = parse_point)]
    pointer: Option<(i32, i32)>,

    /// Seed for the scatter overlay.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Gpu,
    Auto,
}

impl From<BackendChoice> for skyfx::BackendKind {
    fn from(c: BackendChoice) -> Self {
        match c {
            BackendChoice::Cpu => skyfx::BackendKind::Cpu,
            BackendChoice::Gpu => skyfx::BackendKind::Gpu,
            BackendChoice::Auto => skyfx::BackendKind::Auto,
        }
    }
}

fn parse_point(s: &str) -> Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok((x, y))
}

fn main() -> anyhow::Result<()> {
    initialise_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_config(path: Option<&Path>) -> anyhow::Result<skyfx::EffectConfig> {
    match path {
        Some(p) => Ok(skyfx::EffectConfig::from_json_path(p)?),
        None => Ok(skyfx::EffectConfig::default()),
    }
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let loader = skyfx::FsImageLoader::default();
    let base = skyfx::ImageLoader::load(&loader, &skyfx::ImageSource::Path(args.in_path.clone()))
        .with_context(|| format!("load image '{}'", args.in_path.display()))?;

    let mut pipeline = skyfx::EffectPipeline::with_backend(args.backend.into())?;
    let counter = skyfx::FrameCounter::starting_at(args.frame);
    let frame = pipeline.try_render(&base, counter.phase(config.cycle_period), &config)?;

    write_png(&args.out, &frame)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let config = read_config(args.config.as_deref())?;
    let pipeline = skyfx::EffectPipeline::with_backend(args.backend.into())?;
    let scatter = match args.seed {
        Some(seed) => skyfx::ScatterOverlay::seeded(seed),
        None => skyfx::ScatterOverlay::from_os_rng(),
    };

    let mut lp = skyfx::RenderLoop::new(
        skyfx::InMemorySurface::new(),
        skyfx::ManualScheduler::new(),
        config,
    )?
    .with_pipeline(pipeline)
    .with_scatter(scatter)
    .with_loader(Arc::new(skyfx::FsImageLoader::default()));

    lp.set_source(skyfx::ImageSource::Path(args.in_path.clone()))?;
    lp.block_on_load();
    if let Some(failure) = lp.load_error() {
        anyhow::bail!("load image '{}': {}", args.in_path.display(), failure.message);
    }
    if let Some((x, y)) = args.pointer {
        lp.pointer_enter(x, y);
    }

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    for i in 0..args.frames {
        if !lp.pump() {
            break;
        }
        let path = args.out_dir.join(format!("frame_{i:05}.png"));
        write_png(&path, lp.surface().frame())?;
    }

    let stats = lp.stats();
    lp.teardown();
    eprintln!(
        "wrote {} frames to {} (rendered {}, frozen {}, idle {})",
        args.frames,
        args.out_dir.display(),
        stats.rendered,
        stats.frozen,
        stats.idle
    );
    Ok(())
}

fn write_png(path: &Path, frame: &skyfx::PixelBuffer) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        path,
        frame.as_bytes(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}
