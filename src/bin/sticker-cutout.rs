use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use sticker_cutout::{
    BackgroundThresholds, DetectOptions, ExtractOptions, ProcessResult, SheetOptions,
    StickerEngine,
};

#[derive(Parser)]
#[command(
    name = "sticker-cutout",
    about = "Cut a sheet of drawn icons into outlined, transparent-background stickers",
    version,
    after_help = "Simple usage: sticker-cutout sheet.png -o stickers/\n\n\
                  Each detected icon is cropped, its white background removed,\n\
                  and a uniform white outline stamped around the artwork."
)]
struct Cli {
    /// Input sheet image or directory of sheets
    input: String,

    /// Output directory for the cut stickers (default: {name}_stickers)
    #[arg(short, long)]
    output: Option<String>,

    /// Merge rectangles closer than this many pixels on both axes
    #[arg(long, default_value = "15")]
    gap: u32,

    /// Outline thickness in pixels
    #[arg(long, default_value = "6")]
    stroke: u32,

    /// Crop padding in pixels
    #[arg(long, default_value = "2")]
    padding: u32,

    /// Angular offsets used to stamp the outline
    #[arg(long, default_value = "24")]
    steps: u32,

    /// Discard regions with at most this many pixels
    #[arg(long, default_value = "50")]
    min_pixels: u32,

    /// Discard regions whose width or height is at most this
    #[arg(long, default_value = "5")]
    min_extent: u32,

    /// Channel value above which a pixel counts as near-white (0-255)
    #[arg(long, default_value = "240")]
    white_threshold: u8,

    /// Alpha value below which a pixel counts as transparent (0-255)
    #[arg(long, default_value = "20")]
    alpha_threshold: u8,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.steps == 0 {
        eprintln!("Error: --steps must be at least 1");
        process::exit(1);
    }

    let options = SheetOptions {
        background: BackgroundThresholds {
            max_alpha: cli.alpha_threshold,
            min_white: cli.white_threshold,
        },
        detect: DetectOptions {
            min_pixels: cli.min_pixels,
            min_extent: cli.min_extent,
        },
        merge_gap: cli.gap,
        extract: ExtractOptions {
            padding: cli.padding,
            stroke_width: cli.stroke,
            stamp_steps: cli.steps,
        },
    };
    let engine = StickerEngine::with_options(options);

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: sticker-cutout <input_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir)
    } else {
        let output_dir = cli
            .output
            .as_ref()
            .map_or_else(|| default_output_dir(input_path), PathBuf::from);

        let verbose = cli.verbose && !cli.quiet;
        let mut progress = |status: &str| {
            if verbose {
                eprintln!("  {status}");
            }
        };
        vec![engine.process_file(input_path, &output_dir, &mut progress)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;
    let mut sticker_total = 0usize;

    for r in &results {
        print_result(r, cli.quiet);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
            sticker_total += r.sticker_count;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Sheets: {success_count}, Stickers: {sticker_total}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

/// Default output directory for one sheet: `{stem}_stickers` next to it.
fn default_output_dir(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_stickers"))
}

fn print_result(result: &ProcessResult, quiet: bool) {
    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !quiet {
            eprintln!("[OK] {filename}: {}", result.message);
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }
}
