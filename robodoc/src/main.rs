use anyhow::{bail, Context, Result};
use clap::Parser;
use robodoc::{fit_to_display, InjurySession};
use robodoc_common::{
    AnalysisParams, CropRect, DisplayRect, ImageSize, DEFAULT_DISPLAY_LIMIT, LINE_STEP_MAX,
    LINE_STEP_MIN, THRESHOLD_MAX, THRESHOLD_MIN,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Highlight a skin injury by differencing a photo against a healthy control region
#[derive(Parser, Debug)]
#[command(name = "robodoc")]
#[command(about = "Segment injured skin against a healthy control region", long_about = None)]
struct Args {
    /// Injury photo (PNG, JPEG, BMP or TIFF)
    #[arg(short, long)]
    input: PathBuf,

    /// Healthy control region as x,y,width,height
    #[arg(short, long, value_parser = parse_rect, allow_hyphen_values = true)]
    control: [i32; 4],

    /// Size of the preview the control region was drawn on, as WIDTHxHEIGHT.
    /// Without it the control region is taken in original pixels.
    #[arg(short, long, value_parser = parse_size)]
    display: Option<ImageSize>,

    /// The control region was drawn on the input shrunk to fit 800x600
    #[arg(long, conflicts_with = "display")]
    preview: bool,

    /// Segmentation threshold; lower values are more sensitive
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(i64::from(THRESHOLD_MIN)..=i64::from(THRESHOLD_MAX)))]
    threshold: Option<u8>,

    /// Draw every Nth scan line
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(i64::from(LINE_STEP_MIN)..=i64::from(LINE_STEP_MAX)))]
    line_step: Option<u32>,

    /// JSON file with analysis parameters; explicit flags take precedence
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Composite output path
    #[arg(short, long, default_value = "robodoc_injury_analysis.png")]
    output: PathBuf,

    /// Also export the contour-masked region as a transparent PNG
    #[arg(short = 'm', long)]
    export_mask: Option<PathBuf>,

    /// Also dump the contour set as JSON
    #[arg(long)]
    contours_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let params = resolve_params(&args)?;

    println!("RoboDoc - Injury Segmentation");
    println!("=============================");
    println!("Input: {}", args.input.display());
    println!("Output: {}", args.output.display());
    println!("Parameters: {}", params);
    println!();

    let mut session = InjurySession::new(params);

    // Step 1: Load the injury photo
    println!("Step 1: Loading injury image...");
    session
        .load_subject_from_path(&args.input)
        .with_context(|| format!("Could not load {}", args.input.display()))?;

    // Step 2: Select the control region
    println!("\nStep 2: Selecting control region...");
    let [x, y, w, h] = args.control;
    let original = session
        .subject()
        .map(|s| ImageSize::new(s.width(), s.height()))
        .context("No injury image loaded")?;
    match selection_display(&args, original) {
        Some(display) => {
            println!("Selection display: {}", display);
            let picked = session
                .select_control_from_display(DisplayRect::new(x, y, w, h), display)
                .context("Invalid control region")?;
            if !picked {
                bail!("The control selection is empty. Please select a region to crop.");
            }
        }
        None => {
            if x < 0 || y < 0 || w < 0 || h < 0 {
                bail!("Control region must not have negative values without --display");
            }
            session
                .select_control(CropRect::new(x as u32, y as u32, w as u32, h as u32))
                .context("Invalid control region")?;
        }
    }
    if let Some(rect) = session.control_rect() {
        println!("Control region: {}", rect);
    }

    // Step 3: Analyze
    println!("\nStep 3: Analyzing...");
    let result = session.analyze().context("Failed to process images")?;
    println!("Detected {} contour region(s)", result.contour_count());
    println!("  Masked pixels: {}", result.masked_pixels);
    println!("  Scan lines drawn: {}", result.scan_lines_drawn);

    if let Some(path) = &args.contours_json {
        write_contours_json(path, &result.contours)?;
        println!("Saved contours to: {}", path.display());
    }

    // Step 4: Export
    println!("\nStep 4: Exporting...");
    session
        .save_result(&args.output)
        .context("Failed to save the analysis results")?;
    println!("Saved analysis results to: {}", args.output.display());

    if let Some(path) = &args.export_mask {
        session
            .save_contours(path)
            .context("Failed to export contours")?;
        println!("Saved masked region to: {}", path.display());
    }

    Ok(())
}

fn resolve_params(args: &Args) -> Result<AnalysisParams> {
    let mut params = match &args.params {
        Some(path) => {
            let data = fs::read_to_string(path)
                .with_context(|| format!("Failed to read params {}", path.display()))?;
            serde_json::from_str::<AnalysisParams>(&data)
                .with_context(|| format!("Failed to parse params {}", path.display()))?
        }
        None => AnalysisParams::default(),
    };
    if let Some(threshold) = args.threshold {
        params.threshold = threshold;
    }
    if let Some(line_step) = args.line_step {
        params.line_step = line_step;
    }
    Ok(params.clamped())
}

/// Size of the image the control rectangle was drawn on, if not original pixels
fn selection_display(args: &Args, original: ImageSize) -> Option<ImageSize> {
    if args.preview {
        Some(fit_to_display(original, DEFAULT_DISPLAY_LIMIT))
    } else {
        args.display
    }
}

fn write_contours_json(path: &Path, contours: &[robodoc_common::Contour]) -> Result<()> {
    let json = serde_json::to_string_pretty(contours).context("Failed to serialize contours")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn parse_rect(s: &str) -> std::result::Result<[i32; 4], String> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<i32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("expected x,y,width,height: {e}"))?;
    <[i32; 4]>::try_from(values)
        .map_err(|v| format!("expected 4 comma-separated values, got {}", v.len()))
}

fn parse_size(s: &str) -> std::result::Result<ImageSize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s}"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok(ImageSize::new(width, height))
}
