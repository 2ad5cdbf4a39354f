//! tessera CLI: generate AR image targets and rate how trackable they are.

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use tessera_core::color::shade_ramp;
use tessera_core::config::{DetectorConfig, MarkerRequest};
use tessera_core::{generate, FeatureScorer, Readiness, Rgb, DEFAULT_EXPORT_NAME};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Generate randomized AR image targets and count their trackable keypoints")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a marker and write it as PNG.
    Generate(CliGenerateArgs),

    /// Print the 15-color palette derived from three base colors.
    Palette(CliColorArgs),

    /// Count keypoints in an existing image.
    Score {
        /// Path to the image.
        image: PathBuf,

        /// Keypoint cap the count saturates at.
        #[arg(long, default_value = "5000")]
        max_features: usize,
    },
}

#[derive(Debug, Clone, Args)]
struct CliColorArgs {
    /// First base color (#rrggbb).
    #[arg(long, default_value = "#ff0000")]
    color1: String,

    /// Second base color (#rrggbb).
    #[arg(long, default_value = "#00ff00")]
    color2: String,

    /// Third base color (#rrggbb).
    #[arg(long, default_value = "#0000ff")]
    color3: String,
}

#[derive(Debug, Clone, Args)]
struct CliGenerateArgs {
    /// Aspect ratio: 4:3, 16:9 or 1:1.
    #[arg(long, default_value = "4:3")]
    aspect: String,

    /// Which side the dimension constrains: width or height.
    #[arg(long, default_value = "width")]
    axis: String,

    /// Target size in pixels of the constrained side.
    #[arg(long, default_value = "1024")]
    dimension: u32,

    /// Pattern: mosaic, chaos or dotmatrix.
    #[arg(long)]
    pattern: Option<String>,

    /// Background color (#rgb or #rrggbb).
    #[arg(long, default_value = "#ffffff")]
    background: String,

    /// Border: none, white or black.
    #[arg(long, default_value = "none")]
    border: String,

    #[command(flatten)]
    colors: CliColorArgs,

    /// Replace the base colors with random ones.
    #[arg(long)]
    reroll: bool,

    /// Seed for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Output PNG path.
    #[arg(long, default_value = DEFAULT_EXPORT_NAME)]
    out: PathBuf,

    /// Skip keypoint scoring.
    #[arg(long)]
    no_score: bool,
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => run_generate(&args),
        Commands::Palette(args) => run_palette(&args),
        Commands::Score {
            image,
            max_features,
        } => run_score(&image, max_features),
    }
}

// ── generate ───────────────────────────────────────────────────────────

fn run_generate(args: &CliGenerateArgs) -> CliResult<()> {
    // The detector builds while the marker is painted.
    let (readiness, init) = if args.no_score {
        (None, None)
    } else {
        let (readiness, handle) = Readiness::spawn(DetectorConfig::default());
        (Some(readiness), Some(handle))
    };

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };

    let colors: [String; 3] = if args.reroll {
        let rolled = [(); 3].map(|()| Rgb::random(&mut rng).to_hex());
        tracing::info!("Rerolled base colors: {}", rolled.join(" "));
        rolled
    } else {
        [
            args.colors.color1.clone(),
            args.colors.color2.clone(),
            args.colors.color3.clone(),
        ]
    };

    let request = MarkerRequest {
        aspect_ratio: &args.aspect,
        axis: &args.axis,
        dimension: args.dimension,
        pattern: args.pattern.as_deref(),
        background: &args.background,
        border: &args.border,
        colors: [&colors[0], &colors[1], &colors[2]],
    };
    let params = request.validate()?;

    let marker = generate(&params, &mut rng)?;
    tracing::info!(
        "Generated {} marker: {}x{}",
        params.pattern,
        marker.width(),
        marker.height()
    );

    marker.write_png(&args.out)?;
    tracing::info!("Marker written to {}", args.out.display());

    if let Some(readiness) = readiness {
        let mut scorer = FeatureScorer::new(readiness);
        let count = scorer.score_when_ready(marker.image())?;
        println!("Keypoints: {count}");
    }
    if let Some(handle) = init {
        handle
            .join()
            .map_err(|_| "detector initialization thread panicked")?;
    }

    Ok(())
}

// ── palette ────────────────────────────────────────────────────────────

fn run_palette(args: &CliColorArgs) -> CliResult<()> {
    for hex in [&args.color1, &args.color2, &args.color3] {
        let base = Rgb::parse_strict(hex)?;
        let ramp = shade_ramp(base);
        let shades: Vec<String> = ramp.iter().map(|c| c.to_hex()).collect();
        println!("{}: {}", base.to_hex(), shades.join(" "));
    }
    Ok(())
}

// ── score ──────────────────────────────────────────────────────────────

fn run_score(path: &std::path::Path, max_features: usize) -> CliResult<()> {
    tracing::info!("Loading image: {}", path.display());
    let img = image::open(path)?.to_rgba8();
    let (w, h) = img.dimensions();
    tracing::info!("Image size: {}x{}", w, h);

    let config = DetectorConfig::builder().max_features(max_features).build();
    let mut scorer = FeatureScorer::new(Readiness::ready(config));
    let count = scorer.score(&img)?;
    println!("Keypoints: {count}");
    Ok(())
}
