use anyhow::{Context, Result};
use clap::Parser;
use qrsbeat::simulation::{EcgWaveform, NoiseConfig, apply_noise, generate_ecg, quantize};
use qrsbeat::source::write_samples;
use qrsbeat::wav::save_samples_wav;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "generate_ecg")]
#[command(about = "Generate synthetic ECG captures with configurable noise for detector testing")]
struct Args {
    /// TOML file with optional [waveform] and [noise] tables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "data/synthetic")]
    output_dir: PathBuf,

    /// Heart rates in bpm: comma-separated (e.g., "60,72,90") or range (e.g., "50-120:10")
    #[arg(short = 'b', long, default_value = "60,72,90")]
    rates: String,

    /// Number of trials per heart rate
    #[arg(short, long, default_value_t = 3)]
    trials: u32,

    /// Base seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Capture duration in seconds
    #[arg(short, long, default_value_t = 10.0)]
    duration: f32,

    /// Sample rate in Hz
    #[arg(long, default_value_t = 500)]
    sample_rate: u32,

    /// R-peak height above baseline in ADC counts (CLI override)
    #[arg(long)]
    qrs_amplitude: Option<f32>,

    /// Output file format
    #[arg(short, long, value_enum, default_value = "text")]
    format: FileFormat,

    /// Output filename prefix
    #[arg(long, default_value = "synth")]
    prefix: String,

    /// Generate manifest.json
    #[arg(long)]
    manifest: bool,

    /// Gaussian noise standard deviation in ADC counts (CLI override)
    #[arg(long)]
    noise_std: Option<f32>,

    /// Baseline wander amplitude in ADC counts at 0.3 Hz (CLI override)
    #[arg(long)]
    wander: Option<f32>,

    /// 50 Hz mains amplitude in ADC counts (CLI override)
    #[arg(long)]
    mains: Option<f32>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum FileFormat {
    Text,
    Wav,
}

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    waveform: Option<EcgWaveform>,
    noise: Option<NoiseConfig>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    file: String,
    heart_rate_bpm: f32,
    trial: u32,
    seed: u64,
}

#[derive(Debug, Serialize)]
struct Manifest {
    sample_rate: u32,
    duration: f32,
    waveform: EcgWaveform,
    noise: NoiseConfig,
    files: Vec<ManifestEntry>,
}

fn parse_rates(s: &str) -> Result<Vec<f32>> {
    if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let step: f32 = parts[1].parse().context("Invalid step value")?;
        if step <= 0.0 {
            anyhow::bail!("Step must be positive");
        }
        let range_parts: Vec<&str> = parts[0].split('-').collect();
        if range_parts.len() != 2 {
            anyhow::bail!("Invalid range format. Use 'start-end:step'");
        }
        let start: f32 = range_parts[0].parse().context("Invalid start value")?;
        let end: f32 = range_parts[1].parse().context("Invalid end value")?;

        let mut rates = Vec::new();
        let mut r = start;
        while r <= end {
            rates.push(r);
            r += step;
        }
        Ok(rates)
    } else {
        s.split(',')
            .map(|p| p.trim().parse::<f32>().context("Invalid heart rate value"))
            .collect()
    }
}

fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_noise_config(toml: &TomlConfig, args: &Args) -> NoiseConfig {
    let mut config = toml.noise.clone().unwrap_or_default();

    if let Some(std_dev) = args.noise_std {
        config = config.with_awgn(std_dev);
    }
    if let Some(amplitude) = args.wander {
        config = config.with_baseline_wander(amplitude, 0.3);
    }
    if let Some(amplitude) = args.mains {
        config = config.with_mains(amplitude, 50.0);
    }

    config
}

fn write_capture(path: &Path, samples: &[u16], format: FileFormat, sample_rate: u32) -> Result<()> {
    match format {
        FileFormat::Text => {
            let file = File::create(path).context("Failed to create capture file")?;
            write_samples(BufWriter::new(file), samples, 16)?;
        }
        FileFormat::Wav => {
            save_samples_wav(path, samples, sample_rate).context("Failed to write WAV file")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    fs::create_dir_all(&args.output_dir).context("Failed to create output directory")?;

    let toml_config = match args.config {
        Some(ref config_path) => load_toml_config(config_path)?,
        None => TomlConfig::default(),
    };

    let mut waveform = toml_config.waveform.clone().unwrap_or_default();
    if let Some(amplitude) = args.qrs_amplitude {
        waveform.qrs_amplitude = amplitude;
    }
    let noise_template = build_noise_config(&toml_config, &args);

    let rates = parse_rates(&args.rates)?;
    let base_seed = args.seed.or(noise_template.seed).unwrap_or(0);
    let extension = match args.format {
        FileFormat::Text => "txt",
        FileFormat::Wav => "wav",
    };

    let mut manifest_entries = Vec::new();
    let total_files = rates.len() * args.trials as usize;
    let mut file_count = 0;

    for &rate in &rates {
        let beat = waveform.clone().with_heart_rate(rate);
        let clean = generate_ecg(&beat, args.duration, args.sample_rate as f32);

        for trial in 0..args.trials {
            let seed = base_seed + trial as u64 * 1000 + rate as u64;
            let noise_config = noise_template.clone().with_seed(seed);
            let samples = quantize(&apply_noise(&clean, &noise_config, args.sample_rate as f32));

            let filename = format!(
                "{}_bpm{:03}_t{:02}.{}",
                args.prefix, rate as i32, trial, extension
            );
            let filepath = args.output_dir.join(&filename);
            write_capture(&filepath, &samples, args.format, args.sample_rate)?;

            manifest_entries.push(ManifestEntry {
                file: filename,
                heart_rate_bpm: rate,
                trial,
                seed,
            });

            file_count += 1;
            eprint!("\rGenerating: {}/{}", file_count, total_files);
        }
    }
    eprintln!();

    if args.manifest {
        let manifest = Manifest {
            sample_rate: args.sample_rate,
            duration: args.duration,
            waveform,
            noise: noise_template,
            files: manifest_entries,
        };
        let manifest_path = args.output_dir.join("manifest.json");
        let manifest_json =
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        fs::write(&manifest_path, manifest_json).context("Failed to write manifest")?;
        eprintln!("Manifest written to: {}", manifest_path.display());
    }

    eprintln!(
        "Generated {} files in {}",
        total_files,
        args.output_dir.display()
    );
    Ok(())
}
