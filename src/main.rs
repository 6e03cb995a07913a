use print_segmenter::image::io::{load_grayscale_image, save_grayscale_u8, write_json_file};
use print_segmenter::image::{downscale_box, GrayBuffer};
use print_segmenter::{SegmentInfo, SegmentationReport, Segmenter, SegmenterParams, StageSnapshots};
use rayon::prelude::*;
use std::env;
use std::path::{Path, PathBuf};

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let program = env::args()
        .next()
        .unwrap_or_else(|| "print-segmenter".to_string());
    let config = parse_args(&program)?;

    // One segmenter per image; the core itself is single-threaded.
    let mut outcomes: Vec<(PathBuf, Result<SegmentationReport, String>)> = config
        .inputs
        .par_iter()
        .map(|path| (path.clone(), process_image(path, &config)))
        .collect();
    outcomes.sort_by(|a, b| a.0.cmp(&b.0));

    let mut failures = 0usize;
    for (path, outcome) in &outcomes {
        match outcome {
            Ok(report) => emit_report(path, report, &config)?,
            Err(err) => {
                eprintln!("{}: {err}", path.display());
                failures += 1;
            }
        }
    }

    if failures > 0 {
        Err(format!("{failures} input(s) failed"))
    } else {
        Ok(())
    }
}

fn process_image(path: &Path, config: &CliConfig) -> Result<SegmentationReport, String> {
    let source = load_grayscale_image(path)?;
    let mut segmenter = Segmenter::new(source.w, source.h, config.params);
    let working = downscale_box(&source, segmenter.scale());
    if working.w != segmenter.working_width() || working.h != segmenter.working_height() {
        return Err(format!(
            "Downscale produced {}x{}, segmenter expects {}x{}",
            working.w,
            working.h,
            segmenter.working_width(),
            segmenter.working_height()
        ));
    }
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());

    let report = if let Some(dir) = &config.debug_dir {
        let (report, snapshots) = segmenter.extract_with_snapshots(working.as_slice());
        dump_stage_images(dir, &stem, &snapshots, working.w, working.h)?;
        report
    } else {
        segmenter.extract_with_diagnostics(working.as_slice())
    };

    if let Some(dir) = &config.crops_dir {
        for (index, segment) in report.result.segments.iter().enumerate() {
            let crop = render_crop(&source, segment);
            let out = dir.join(format!("{stem}_{index}.png"));
            save_grayscale_u8(&crop, &out)?;
        }
    }

    Ok(report)
}

/// Write the intermediate pipeline buffers as grayscale PNGs; stages that
/// never ran (empty snapshots) are skipped.
fn dump_stage_images(
    dir: &Path,
    stem: &str,
    snapshots: &StageSnapshots,
    width: usize,
    height: usize,
) -> Result<(), String> {
    let stages = [
        ("min_filter", &snapshots.min_filtered),
        ("denoise", &snapshots.denoised),
        ("binarize", &snapshots.binarized),
    ];
    for (name, data) in stages {
        if data.is_empty() {
            continue;
        }
        let buffer = GrayBuffer::from_raw(width, height, data.clone())
            .ok_or_else(|| format!("Stage buffer size mismatch for {name}"))?;
        save_grayscale_u8(&buffer, &dir.join(format!("{stem}_{name}.png")))?;
    }
    if !snapshots.labels.is_empty() {
        let buffer = GrayBuffer::from_raw(width, height, label_map_to_gray(&snapshots.labels))
            .ok_or_else(|| "Stage buffer size mismatch for labels".to_string())?;
        save_grayscale_u8(&buffer, &dir.join(format!("{stem}_labels.png")))?;
    }
    Ok(())
}

/// Spread dense label ids over the gray range so components are tellable
/// apart by eye; background stays black.
fn label_map_to_gray(labels: &[u16]) -> Vec<u8> {
    let max = labels.iter().copied().max().unwrap_or(0).max(1) as u32;
    labels
        .iter()
        .map(|&l| {
            if l == 0 {
                0
            } else {
                (l as u32 * 255 / max) as u8
            }
        })
        .collect()
}

fn emit_report(path: &Path, report: &SegmentationReport, config: &CliConfig) -> Result<(), String> {
    if config.format.includes_text() {
        print_text_summary(path, report);
    }
    if config.format.includes_json() {
        match &config.json_out {
            Some(target) if config.inputs.len() > 1 => {
                let stem = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "report".to_string());
                let out = target.join(format!("{stem}.json"));
                write_json_file(&out, report)?;
                println!("JSON report written to {}", out.display());
            }
            Some(target) => {
                write_json_file(target, report)?;
                println!("JSON report written to {}", target.display());
            }
            None => {
                let json = serde_json::to_string_pretty(report)
                    .map_err(|e| format!("Failed to serialize JSON: {e}"))?;
                println!("{json}");
            }
        }
    }
    Ok(())
}

/// Render a de-rotated crop of one segment from the original-resolution
/// source: translate to the centroid, rotate by the reported angle, and
/// sample a `size.0 × size.1` rectangle with Catmull-Rom bicubic
/// interpolation. The long axis of the fingerprint maps to the crop's
/// vertical axis.
fn render_crop(source: &GrayBuffer, segment: &SegmentInfo) -> GrayBuffer {
    let w = segment.size.0.max(1) as usize;
    let h = segment.size.1.max(1) as usize;
    let theta = (segment.rotation as f64).to_radians();
    let (sin, cos) = theta.sin_cos();
    let (cx, cy) = (segment.centroid.0 as f64, segment.centroid.1 as f64);

    let mut crop = GrayBuffer::filled(w, h, 255);
    for v in 0..h {
        let dv = v as f64 - h as f64 / 2.0;
        for u in 0..w {
            let du = u as f64 - w as f64 / 2.0;
            // Crop height runs along the segment's long axis (cos, sin),
            // crop width along the perpendicular.
            let sx = cx + du * sin + dv * cos;
            let sy = cy - du * cos + dv * sin;
            crop.data[v * w + u] = sample_bicubic(source, sx, sy);
        }
    }
    crop
}

/// Catmull-Rom bicubic sample with clamp-to-edge addressing.
fn sample_bicubic(img: &GrayBuffer, x: f64, y: f64) -> u8 {
    let xi = x.floor() as i64;
    let yi = y.floor() as i64;
    let fx = x - xi as f64;
    let fy = y - yi as f64;

    let mut acc = 0.0f64;
    for n in -1i64..=2 {
        let wy = catmull_rom(n as f64 - fy);
        if wy == 0.0 {
            continue;
        }
        let sy = (yi + n).clamp(0, img.h as i64 - 1) as usize;
        let row = img.row(sy);
        for m in -1i64..=2 {
            let wx = catmull_rom(m as f64 - fx);
            if wx == 0.0 {
                continue;
            }
            let sx = (xi + m).clamp(0, img.w as i64 - 1) as usize;
            acc += wx * wy * row[sx] as f64;
        }
    }
    acc.round().clamp(0.0, 255.0) as u8
}

fn catmull_rom(t: f64) -> f64 {
    const A: f64 = -0.5;
    let t = t.abs();
    if t <= 1.0 {
        (A + 2.0) * t * t * t - (A + 3.0) * t * t + 1.0
    } else if t < 2.0 {
        A * t * t * t - 5.0 * A * t * t + 8.0 * A * t - 4.0 * A
    } else {
        0.0
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Both,
}

impl OutputFormat {
    fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "both" => Ok(Self::Both),
            other => Err(format!("Unknown format '{other}'. Use text|json|both.")),
        }
    }

    fn includes_text(&self) -> bool {
        matches!(self, Self::Text | Self::Both)
    }

    fn includes_json(&self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

struct CliConfig {
    inputs: Vec<PathBuf>,
    params: SegmenterParams,
    format: OutputFormat,
    json_out: Option<PathBuf>,
    crops_dir: Option<PathBuf>,
    debug_dir: Option<PathBuf>,
}

fn parse_args(program: &str) -> Result<CliConfig, String> {
    let mut args = env::args().skip(1);
    let mut inputs: Vec<PathBuf> = Vec::new();
    let mut params = SegmenterParams::default();
    let mut format = OutputFormat::Json;
    let mut json_out: Option<PathBuf> = None;
    let mut crops_dir: Option<PathBuf> = None;
    let mut debug_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{}", usage(program));
                std::process::exit(0);
            }
            "--format" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--format expects a value\n{}", usage(program)))?;
                format = OutputFormat::from_str(&value)?;
            }
            "--json-out" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--json-out expects a path\n{}", usage(program)))?;
                json_out = Some(PathBuf::from(value));
            }
            "--crops-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--crops-dir expects a path\n{}", usage(program)))?;
                crops_dir = Some(PathBuf::from(value));
            }
            "--debug-dir" => {
                let value = args
                    .next()
                    .ok_or_else(|| format!("--debug-dir expects a path\n{}", usage(program)))?;
                debug_dir = Some(PathBuf::from(value));
            }
            "--working-size" => {
                params.working_size_hint = parse_flag(&mut args, "--working-size", program)?;
            }
            "--denoise-steps" => {
                params.denoise_steps = parse_flag(&mut args, "--denoise-steps", program)?;
            }
            "--area-threshold" => {
                let t: f64 = parse_flag(&mut args, "--area-threshold", program)?;
                params.area_threshold = t.max(0.0);
            }
            "--size-threshold" => {
                let t: f64 = parse_flag(&mut args, "--size-threshold", program)?;
                params.size_threshold = t.max(0.0);
            }
            _ if arg.starts_with('-') => {
                return Err(format!("Unknown option '{arg}'\n{}", usage(program)));
            }
            _ => inputs.push(PathBuf::from(arg)),
        }
    }

    if inputs.is_empty() {
        return Err(usage(program));
    }
    Ok(CliConfig {
        inputs,
        params,
        format,
        json_out,
        crops_dir,
        debug_dir,
    })
}

fn parse_flag<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &str,
    program: &str,
) -> Result<T, String> {
    let value = args
        .next()
        .ok_or_else(|| format!("{flag} expects a value\n{}", usage(program)))?;
    value
        .parse()
        .map_err(|_| format!("Invalid value '{value}' for {flag}"))
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} <image.png> [more images...] [--format text|json|both] \\\n         [--json-out path] [--crops-dir dir] [--debug-dir dir] [--working-size n] \\\n         [--denoise-steps n] [--area-threshold t] [--size-threshold t]\n\n\
Segments fingerprint regions out of scanned impression cards and reports an\n\
oriented bounding box per region. With --crops-dir, de-rotated crops are\n\
rendered from the original-resolution source. With --debug-dir, the\n\
intermediate pipeline buffers (min filter, denoise, binarize, label map)\n\
are dumped as PNGs. With several inputs, --json-out names a directory\n\
receiving one report per image.\n\
Examples:\n  {program} card.png --format both --json-out card_report.json\n  {program} scans/*.png --json-out reports/ --crops-dir crops/ --debug-dir debug/\n"
    )
}

fn print_text_summary(path: &Path, report: &SegmentationReport) {
    let res = &report.result;
    println!("{}", path.display());
    println!("  ok: {}", res.ok);
    println!("  segments: {}", res.segments.len());
    println!("  latency_ms: {:.3}", res.latency_ms);
    for (i, s) in res.segments.iter().enumerate() {
        println!(
            "  [{i}] centroid=({}, {}) size={}x{} rotation={:.1}°",
            s.centroid.0, s.centroid.1, s.size.0, s.size.1, s.rotation
        );
    }
    let input = &report.trace.input;
    println!(
        "  working: {}x{} (scale {}, min-filter radius {})",
        input.working_width, input.working_height, input.scale, input.min_filter_radius
    );
    if let Some(b) = &report.trace.binarize {
        println!(
            "  binarize: otsu_level={} threshold={:.1} foreground={}",
            b.otsu_level, b.threshold, b.foreground_pixels
        );
    }
    if let Some(l) = &report.trace.labeling {
        if l.overflow {
            println!("  labeling: overflow (more than 255 provisional labels)");
        } else {
            println!(
                "  labeling: provisional={} merged_components={}",
                l.provisional_labels, l.merged_components
            );
        }
    }
    if let Some(c) = &report.trace.collect {
        println!("  collect: candidates={} kept={}", c.candidates, c.kept);
    }
    for stage in &report.trace.timings.stages {
        println!("  {}_ms: {:.3}", stage.name, stage.elapsed_ms);
    }
}
