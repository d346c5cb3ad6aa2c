use clap::{Args, Parser, Subcommand};
use pixmill::config::{self, Config};
use pixmill::imaging::{
    Extent, Gravity, LoadOptions, Loader, Orientation, PixelEngine, ResizeIntent, SaveOptions,
};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pixmill")]
#[command(version, about = "Load, transform and save images")]
#[command(long_about = "\
Load, transform and save images

Transformations run in a fixed order: resize, turn, rotate, flip, flop,
sharpen, blur, brighten, contrast, gamma, filter.

The output codec is picked from --format, then the output file extension,
then the input's format, then JPEG.

Run 'pixmill gen-config' to generate a documented pixmill.toml.")]
struct Cli {
    /// Config file
    #[arg(long, default_value = "pixmill.toml", global = true)]
    config: PathBuf,

    /// Log debug output (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print dimensions, format and EXIF orientation
    Info {
        file: PathBuf,
    },
    /// Transform an image and save the result
    Convert(ConvertArgs),
    /// Print a stock pixmill.toml with all options documented
    GenConfig,
}

#[derive(Args)]
struct ConvertArgs {
    input: PathBuf,
    output: PathBuf,

    /// Apply EXIF orientation on load
    #[arg(long, conflicts_with = "no_autorotate")]
    autorotate: bool,
    /// Keep stored pixel orientation
    #[arg(long)]
    no_autorotate: bool,

    #[command(flatten)]
    resize: ResizeArgs,

    /// Clockwise quarter turns (negative turns counter-clockwise)
    #[arg(long, allow_hyphen_values = true)]
    turn: Option<i32>,
    /// Rotate by degrees, enlarging the canvas to fit
    #[arg(long, allow_hyphen_values = true)]
    rotate: Option<f64>,
    /// Mirror top to bottom
    #[arg(long)]
    flip: bool,
    /// Mirror left to right
    #[arg(long)]
    flop: bool,
    /// Unsharp-mask radius
    #[arg(long)]
    sharpen: Option<f64>,
    /// Blur radius
    #[arg(long)]
    blur: Option<f64>,
    /// Brightness offset, -1 to 1
    #[arg(long, allow_hyphen_values = true)]
    brighten: Option<f64>,
    /// Contrast factor, 1 leaves the image unchanged
    #[arg(long)]
    contrast: Option<f64>,
    /// Gamma correction factor
    #[arg(long)]
    gamma: Option<f64>,
    /// Raw filter expression, e.g. "colormod(brightness=0.1);"
    #[arg(long)]
    filter: Option<String>,

    /// Output codec, e.g. png or webp
    #[arg(long)]
    format: Option<String>,
    /// Lossy encoding quality, 0-100
    #[arg(long)]
    quality: Option<u32>,
}

#[derive(Args)]
struct ResizeArgs {
    /// Scale factor between 0 and 1
    #[arg(long, conflicts_with_all = ["width", "height"])]
    scale: Option<f64>,
    /// Box width in pixels, or "auto"
    #[arg(long)]
    width: Option<Extent>,
    /// Box height in pixels, or "auto"
    #[arg(long)]
    height: Option<Extent>,
    /// Stretch to the exact box
    #[arg(long)]
    skew: bool,
    /// Fill the exact box, cropping at the given gravity (e.g. center, top_left, 0.5,0.2)
    #[arg(long)]
    crop: Option<Gravity>,
}

impl ResizeArgs {
    fn intent(&self) -> pixmill::Result<Option<ResizeIntent>> {
        let intent = match (self.scale, self.width, self.height) {
            (Some(factor), _, _) => ResizeIntent::scale(factor)?,
            (None, None, None) => {
                if self.skew || self.crop.is_some() {
                    return Err(pixmill::Error::InvalidArgument(
                        "--skew and --crop need --width and --height".into(),
                    ));
                }
                return Ok(None);
            }
            (None, width, height) => ResizeIntent::fit(
                width.unwrap_or(Extent::Auto),
                height.unwrap_or(Extent::Auto),
            )?,
        };
        let intent = if self.skew { intent.skew()? } else { intent };
        let intent = match self.crop {
            Some(gravity) => intent.crop(gravity)?,
            None => intent,
        };
        Ok(Some(intent))
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Info { file } => {
            let config = config::load_config(&cli.config)?;
            info(&Loader::from_config(&config), &file)?;
        }
        Command::Convert(args) => {
            let config = config::load_config(&cli.config)?;
            convert(&config, &args)?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn info(loader: &Loader, file: &Path) -> pixmill::Result<()> {
    let image = loader.load(file, LoadOptions::autorotate(false))?;
    println!("{}", file.display());
    println!("  Size:        {} x {}", image.width(), image.height());
    println!(
        "  Format:      {}",
        image.format().as_deref().unwrap_or("unknown")
    );
    match loader.engine().read_orientation(file) {
        Some(code) => match Orientation::from_exif(code) {
            Some(orientation) => {
                println!("  Orientation: {} ({:?})", orientation.to_exif(), orientation);
                if orientation.swaps_dimensions() {
                    println!(
                        "  Upright:     {} x {}",
                        image.height(),
                        image.width()
                    );
                }
            }
            None => println!("  Orientation: {code} (invalid)"),
        },
        None => println!("  Orientation: none"),
    }
    Ok(())
}

fn convert(config: &Config, args: &ConvertArgs) -> pixmill::Result<()> {
    let loader = Loader::from_config(config);
    let load_options = if args.autorotate {
        LoadOptions::autorotate(true)
    } else if args.no_autorotate {
        LoadOptions::autorotate(false)
    } else {
        LoadOptions::default()
    };

    let mut image = loader.load(&args.input, load_options)?;
    debug!("Converting {:?}", image);

    if let Some(intent) = args.resize.intent()? {
        image.resize(&intent)?;
    }
    if let Some(steps) = args.turn {
        image.turn(steps);
    }
    if let Some(degrees) = args.rotate {
        image.rotate(degrees);
    }
    if args.flip {
        image.flip();
    }
    if args.flop {
        image.flop();
    }
    if let Some(radius) = args.sharpen {
        image.sharpen(radius)?;
    }
    if let Some(radius) = args.blur {
        image.blur(radius)?;
    }
    if let Some(value) = args.brighten {
        image.brighten(value)?;
    }
    if let Some(value) = args.contrast {
        image.contrast(value)?;
    }
    if let Some(value) = args.gamma {
        image.gamma(value)?;
    }
    if let Some(expression) = &args.filter {
        image.filter(expression)?;
    }

    let requested = SaveOptions {
        format: args.format.clone(),
        quality: args.quality,
    };
    let options = config.save_options(requested, Some(&args.output));
    image.save(&args.output, &options)?;
    println!(
        "{} -> {} ({} x {})",
        args.input.display(),
        args.output.display(),
        image.width(),
        image.height()
    );
    Ok(())
}
