use clap::Parser;
use rolling_stats::Stats;
use serde::Serialize;
use std::path::{Path, PathBuf};

use qrsbeat::config::{EcgConfig, SampleRate};
use qrsbeat::processing::EcgProcessor;
use qrsbeat::source::{SampleSource, TextFileSource, WavFileSource};

#[derive(Parser, Debug)]
#[command(name = "analyze_ecg")]
#[command(about = "Heart-rate statistics for ECG capture files", long_about = None)]
struct Args {
    /// Capture files to analyze (text or WAV)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Sample rate of text captures (e.g., "500", "2ms")
    #[arg(short = 'r', long)]
    sample_rate: Option<SampleRate>,

    /// Ignore beats before this many seconds
    #[arg(long, default_value = "0")]
    skip_secs: f32,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Csv,
    Json,
}

#[derive(Debug, Clone, Serialize)]
struct StatsSummary {
    count: usize,
    mean: f32,
    std_dev: f32,
    min: f32,
    max: f32,
}

impl StatsSummary {
    fn from_stats(stats: &Stats<f32>) -> Option<Self> {
        if stats.count == 0 {
            return None;
        }
        Some(Self {
            count: stats.count,
            mean: stats.mean,
            std_dev: stats.std_dev,
            min: stats.min,
            max: stats.max,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
struct FileAnalysis {
    filename: String,
    sample_rate_hz: f32,
    sample_count: usize,
    duration_secs: f32,
    beats: usize,
    bpm: Option<StatsSummary>,
    rr_ms: Option<StatsSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let base_config = match &args.config {
        Some(path) => Some(EcgConfig::load(path)?),
        None => None,
    };

    let results: Vec<FileAnalysis> = args
        .files
        .iter()
        .map(|path| analyze_file(path, base_config.as_ref(), &args))
        .collect();

    match args.format {
        OutputFormat::Text => print_text(&results),
        OutputFormat::Csv => print_csv(&results),
        OutputFormat::Json => print_json(&results)?,
    }

    Ok(())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn analyze_file(path: &Path, base_config: Option<&EcgConfig>, args: &Args) -> FileAnalysis {
    match analyze_file_impl(path, base_config, args) {
        Ok(analysis) => analysis,
        Err(e) => FileAnalysis {
            filename: file_name(path),
            sample_rate_hz: 0.0,
            sample_count: 0,
            duration_secs: 0.0,
            beats: 0,
            bpm: None,
            rr_ms: None,
            error: Some(e.to_string()),
        },
    }
}

fn analyze_file_impl(
    path: &Path,
    base_config: Option<&EcgConfig>,
    args: &Args,
) -> anyhow::Result<FileAnalysis> {
    const CHUNK_SIZE: usize = 500;

    let is_wav = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

    let adc_bits = base_config.map_or(qrsbeat::constants::ADC_BITS, |c| c.sampling.adc_bits);
    let mut source: Box<dyn SampleSource> = if is_wav {
        Box::new(WavFileSource::new(path, adc_bits, CHUNK_SIZE)?)
    } else {
        let rate = args
            .sample_rate
            .or(base_config.map(|c| c.sampling.sample_rate))
            .unwrap_or_default();
        Box::new(TextFileSource::new(path, rate, adc_bits, CHUNK_SIZE)?)
    };

    let sample_rate = source.sample_rate();
    let config = match base_config {
        Some(c) => c.clone(),
        None => EcgConfig::for_sample_rate(sample_rate),
    };
    config.validate()?;

    let mut processor = EcgProcessor::new(&config);
    let period_ms = sample_rate.period_ms();
    let skip_ticks = (args.skip_secs * sample_rate.as_hz()) as u64;

    let mut bpm_stats: Stats<f32> = Stats::new();
    let mut rr_stats: Stats<f32> = Stats::new();
    let mut beats = 0usize;
    let mut sample_count = 0usize;

    while let Some(buffer) = source.next_buffer()? {
        sample_count += buffer.len();
        for event in processor.process_buffer(&buffer) {
            if event.tick < skip_ticks {
                continue;
            }
            beats += 1;
            if let Some(bpm) = event.bpm {
                bpm_stats.update(bpm);
                rr_stats.update(qrsbeat::constants::MS_PER_MINUTE / bpm);
            }
        }
    }

    log::info!("{}: {} beats in {} samples", path.display(), beats, sample_count);

    Ok(FileAnalysis {
        filename: file_name(path),
        sample_rate_hz: sample_rate.as_hz(),
        sample_count,
        duration_secs: sample_count as f32 * period_ms / 1000.0,
        beats,
        bpm: StatsSummary::from_stats(&bpm_stats),
        rr_ms: StatsSummary::from_stats(&rr_stats),
        error: None,
    })
}

fn print_text(results: &[FileAnalysis]) {
    println!(
        "{:<40} {:>8} {:>6} {:>8} {:>7} {:>8} {:>8}",
        "File", "Secs", "Beats", "BPM", "Std", "RR ms", "RR std"
    );
    println!("{}", "-".repeat(91));

    for result in results {
        if let Some(ref err) = result.error {
            println!("{:<40} ERROR: {}", result.filename, err);
            continue;
        }

        let bpm_mean = result
            .bpm
            .as_ref()
            .map(|s| format!("{:.1}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        let bpm_std = result
            .bpm
            .as_ref()
            .map(|s| format!("{:.2}", s.std_dev))
            .unwrap_or_else(|| "-".to_string());
        let rr_mean = result
            .rr_ms
            .as_ref()
            .map(|s| format!("{:.0}", s.mean))
            .unwrap_or_else(|| "-".to_string());
        let rr_std = result
            .rr_ms
            .as_ref()
            .map(|s| format!("{:.1}", s.std_dev))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<40} {:>8.1} {:>6} {:>8} {:>7} {:>8} {:>8}",
            result.filename, result.duration_secs, result.beats, bpm_mean, bpm_std, rr_mean, rr_std
        );
    }

    for result in results {
        if let Some(ref bpm) = result.bpm {
            eprintln!();
            eprintln!("Heart rate for {}:", result.filename);
            eprintln!("  Mean: {:.1} bpm", bpm.mean);
            eprintln!("  Std dev: {:.2} bpm", bpm.std_dev);
            eprintln!("  Min: {:.1} bpm", bpm.min);
            eprintln!("  Max: {:.1} bpm", bpm.max);
        }
    }
}

fn print_csv(results: &[FileAnalysis]) {
    println!(
        "filename,sample_rate_hz,sample_count,duration_secs,beats,bpm_mean,bpm_std,bpm_min,bpm_max,rr_mean_ms,rr_std_ms,error"
    );
    for result in results {
        let bpm = |f: fn(&StatsSummary) -> f32| {
            result
                .bpm
                .as_ref()
                .map(|s| format!("{:.2}", f(s)))
                .unwrap_or_default()
        };
        let rr = |f: fn(&StatsSummary) -> f32| {
            result
                .rr_ms
                .as_ref()
                .map(|s| format!("{:.1}", f(s)))
                .unwrap_or_default()
        };
        let error = result.error.as_deref().unwrap_or("");

        println!(
            "{},{},{},{:.3},{},{},{},{},{},{},{},{}",
            result.filename,
            result.sample_rate_hz,
            result.sample_count,
            result.duration_secs,
            result.beats,
            bpm(|s| s.mean),
            bpm(|s| s.std_dev),
            bpm(|s| s.min),
            bpm(|s| s.max),
            rr(|s| s.mean),
            rr(|s| s.std_dev),
            error
        );
    }
}

fn print_json(results: &[FileAnalysis]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}
