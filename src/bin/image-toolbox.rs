use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use image_toolbox::{
    default_output_path, process_directory, process_file, FillOptions, InpaintMode,
    InpaintOptions, Interpolation, Operation, ProcessOptions, ProcessResult, Region,
    UpscaleOptions, WatermarkOptions,
};

#[derive(Parser)]
#[command(
    name = "image-toolbox",
    about = "Remove watermarks by inpainting and upscale images with Lanczos resampling",
    version,
    after_help = "Watermark regions are placed by a fixed heuristic (corners and bands);\n\
                  no content analysis is performed. Use --region to target a known spot."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output file or directory (default: {name}_cleaned.{ext} / {name}_x{scale}.{ext})
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Inpaint corner and band regions (or one explicit region)
    RemoveWatermark {
        /// Input image file or directory
        input: String,

        /// Explicit region as x,y,width,height
        #[arg(long, value_parser = parse_region)]
        region: Option<Region>,

        #[command(flatten)]
        fill: FillArgs,
    },
    /// Inpaint the thinner text-mark regions, including a top band
    RemoveText {
        /// Input image file or directory
        input: String,

        #[command(flatten)]
        fill: FillArgs,
    },
    /// Upscale with Lanczos resampling, sharpening and edge enhancement
    Upscale {
        /// Input image file or directory
        input: String,

        /// Scale factor
        #[arg(short, long, default_value = "2")]
        scale: f64,

        /// Skip the sharpen pass
        #[arg(long)]
        no_sharpen: bool,

        /// Skip the edge-enhancement pass
        #[arg(long)]
        no_edges: bool,

        /// Use bilinear instead of Lanczos interpolation
        #[arg(long)]
        bilinear: bool,
    },
}

#[derive(Args)]
struct FillArgs {
    /// Sampling radius around each repaired pixel
    #[arg(long)]
    radius: Option<u32>,

    /// Number of fill passes
    #[arg(long)]
    iterations: Option<u32>,

    /// Use the cheap uniform-mean fill (radius 5, one pass)
    #[arg(long)]
    uniform: bool,

    /// Skip the final smoothing pass
    #[arg(long)]
    no_smooth: bool,
}

impl FillArgs {
    fn watermark_options(&self, region: Option<Region>) -> WatermarkOptions {
        let mut inpaint = if self.uniform {
            InpaintOptions::uniform()
        } else {
            InpaintOptions::default()
        };
        if let Some(r) = self.radius {
            inpaint.radius = r;
        }
        if let Some(n) = self.iterations {
            inpaint.iterations = n;
        }
        WatermarkOptions {
            region,
            fill: FillOptions {
                inpaint,
                smooth: !self.no_smooth,
            },
        }
    }
}

fn parse_region(s: &str) -> Result<Region, String> {
    let parts: Vec<i32> = s
        .split(',')
        .map(|p| p.trim().parse::<i32>().map_err(|e| format!("'{p}': {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[x, y, w, h] if w > 0 && h > 0 => Ok(Region::new(x, y, w, h)),
        &[_, _, _, _] => Err("width and height must be positive".to_string()),
        _ => Err("expected x,y,width,height".to_string()),
    }
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.quiet {
        "image_toolbox=error"
    } else if cli.verbose {
        "image_toolbox=info"
    } else {
        "image_toolbox=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let (input, opts) = match &cli.command {
        Command::RemoveWatermark {
            input,
            region,
            fill,
        } => (
            input,
            ProcessOptions {
                operation: Operation::RemoveWatermark,
                watermark: fill.watermark_options(*region),
                ..ProcessOptions::default()
            },
        ),
        Command::RemoveText { input, fill } => (
            input,
            ProcessOptions {
                operation: Operation::RemoveTextWatermark,
                watermark: fill.watermark_options(None),
                ..ProcessOptions::default()
            },
        ),
        Command::Upscale {
            input,
            scale,
            no_sharpen,
            no_edges,
            bilinear,
        } => {
            if !scale.is_finite() || *scale <= 0.0 {
                eprintln!("Error: Scale must be a positive number");
                process::exit(1);
            }
            (
                input,
                ProcessOptions {
                    operation: Operation::Upscale(*scale),
                    upscale: UpscaleOptions {
                        interpolation: if *bilinear {
                            Interpolation::Bilinear
                        } else {
                            Interpolation::Lanczos3
                        },
                        sharpen: !no_sharpen,
                        enhance_edges: !no_edges,
                        ..UpscaleOptions::default()
                    },
                    ..ProcessOptions::default()
                },
            )
        }
    };

    let input_path = Path::new(input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {input}");
        process::exit(1);
    }

    if !cli.quiet && cli.verbose {
        describe(&opts);
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: image-toolbox <command> <input_dir> -o <output_dir>");
            process::exit(1);
        };
        process_directory(input_path, &output_dir, &opts)
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path, opts.operation),
        };
        vec![process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, cli.quiet, cli.verbose);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn describe(opts: &ProcessOptions) {
    match opts.operation {
        Operation::Upscale(scale) => eprintln!(
            "Upscale x{scale} ({:?}, sharpen: {}, edges: {})",
            opts.upscale.interpolation, opts.upscale.sharpen, opts.upscale.enhance_edges
        ),
        Operation::RemoveWatermark | Operation::RemoveTextWatermark => {
            let fill = &opts.watermark.fill.inpaint;
            let mode = match fill.mode {
                InpaintMode::Weighted => "weighted",
                InpaintMode::Uniform => "uniform",
            };
            eprintln!(
                "Inpaint: {mode}, radius {}, {} pass(es), smoothing {}",
                fill.radius,
                fill.iterations,
                if opts.watermark.fill.smooth { "on" } else { "off" }
            );
        }
    }
    eprintln!();
}

fn print_result(result: &ProcessResult, quiet: bool, verbose: bool) {
    if quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        match result.output_size {
            Some((w, h)) if verbose => eprintln!("[OK] {filename} ({w}x{h})"),
            _ => eprintln!("[OK] {filename}"),
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }

    if verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
