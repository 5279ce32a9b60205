use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};

use qrsbeat::config::{EcgConfig, SampleRate};
use qrsbeat::indicator::SevenSegmentDisplay;
use qrsbeat::output::{BeatOutput, OutputFormat, PlotRecorder, create_formatter, gnuplot_script};
use qrsbeat::processing::EcgProcessor;
use qrsbeat::source::{PacedSource, SampleSource, TextFileSource, WavFileSource};

#[derive(Parser, Debug)]
#[command(name = "qrsbeat")]
#[command(about = "Detect heartbeats in a single-lead ECG capture", long_about = None)]
struct Args {
    /// Capture file: comma-separated ADC counts, or a mono WAV file
    input: PathBuf,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// TOML configuration file
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Sample rate of text captures (e.g., "500", "2ms"); tick counts are
    /// rescaled to it. A config file carries its own rate instead.
    #[arg(short = 'r', long, conflicts_with = "config")]
    sample_rate: Option<SampleRate>,

    /// Replay at the sampling rate instead of as fast as possible
    #[arg(short = 'p', long)]
    paced: bool,

    /// Restart the capture when it ends (implies --paced)
    #[arg(long = "loop")]
    looping: bool,

    /// Samples handed to the detector per buffer
    #[arg(long, default_value = "50")]
    chunk_size: usize,

    /// Write raw/filtered plot data here, plus a gnuplot script next to it
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Dump raw (left) and filtered (right) series to a WAV file
    #[arg(long)]
    dump_wav: Option<PathBuf>,

    /// Send the heart rate to a serial 7-segment display (device or file)
    #[arg(long)]
    display: Option<PathBuf>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
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

    let mut config = match (&args.config, args.sample_rate) {
        (Some(path), _) => EcgConfig::load(path)?,
        (None, Some(rate)) => EcgConfig::for_sample_rate(rate),
        (None, None) => EcgConfig::default(),
    };

    let mut source = open_source(&args, &mut config)?;
    if args.paced || args.looping {
        source = Box::new(PacedSource::new(source, args.chunk_size)?);
    }

    println!("=== QRS beat detector ===");
    println!("Input: {}", args.input.display());
    println!(
        "Sample rate: {} ({:.1} ms per tick)",
        config.sampling.sample_rate,
        config.sampling.sample_rate.period_ms()
    );
    println!(
        "Window: {} ticks, refractory: {} ticks, startup: {} ticks",
        config.detector.window_size,
        config.detector.refractory_ticks,
        config.detector.startup_ignore_ticks
    );
    println!();

    run(source.as_mut(), &config, &args)
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
}

fn open_source(args: &Args, config: &mut EcgConfig) -> anyhow::Result<Box<dyn SampleSource>> {
    let bits = config.sampling.adc_bits;

    if is_wav(&args.input) {
        let source = WavFileSource::new(&args.input, bits, args.chunk_size)?;
        let file_rate = source.sample_rate();
        if (file_rate.as_hz() - config.sampling.sample_rate.as_hz()).abs() > f32::EPSILON {
            if args.config.is_some() {
                log::warn!(
                    "WAV rate {} differs from configured {}; tick counts are not rescaled",
                    file_rate,
                    config.sampling.sample_rate
                );
            } else {
                log::info!("Rescaling tick counts for {}", file_rate);
                *config = EcgConfig::for_sample_rate(file_rate);
            }
        }
        if args.looping {
            anyhow::bail!("--loop is only supported for text captures");
        }
        Ok(Box::new(source))
    } else {
        let source = TextFileSource::new(
            &args.input,
            config.sampling.sample_rate,
            bits,
            args.chunk_size,
        )?
        .looping(args.looping);
        Ok(Box::new(source))
    }
}

fn run(source: &mut dyn SampleSource, config: &EcgConfig, args: &Args) -> anyhow::Result<()> {
    let mut processor = EcgProcessor::new(config);
    let formatter = create_formatter(args.format, args.verbose > 0);
    let period_ms = config.sampling.sample_rate.period_ms();

    let mut plot = match &args.plot {
        Some(path) => {
            let script_path = path.with_extension("gp");
            std::fs::write(&script_path, gnuplot_script(&path.to_string_lossy()))?;
            log::info!("Wrote gnuplot script to {}", script_path.display());
            Some(PlotRecorder::create(path)?)
        }
        None => None,
    };

    let mut display = match &args.display {
        Some(path) => Some(SevenSegmentDisplay::new(
            File::options().write(true).create(true).truncate(false).open(path)?,
        )),
        None => None,
    };

    let mut dump: Option<(Vec<u16>, Vec<i32>)> = args.dump_wav.as_ref().map(|_| Default::default());

    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let mut beat_count = 0usize;
    while let Some(buffer) = source.next_buffer()? {
        let events = processor.process_buffer(&buffer);

        if let Some(ref mut recorder) = plot {
            for output in processor.outputs() {
                recorder.record(output.tick, output.raw, output.filtered)?;
            }
        }

        if let Some((ref mut raw, ref mut filtered)) = dump {
            raw.extend_from_slice(&buffer);
            filtered.extend(processor.outputs().iter().map(|o| o.filtered));
        }

        for event in &events {
            beat_count += 1;
            println!("{}", formatter.format(&BeatOutput::from_event(event, period_ms)));

            if let (Some(display), Some(bpm)) = (display.as_mut(), event.bpm) {
                display.show_bpm(bpm)?;
            }
        }
    }

    if let Some(recorder) = plot {
        let lines = recorder.lines();
        recorder.finish()?;
        log::info!("Wrote {} plot lines", lines);
    }

    if let (Some(path), Some((raw, filtered))) = (&args.dump_wav, dump) {
        let rate = config.sampling.sample_rate.as_hz().round() as u32;
        qrsbeat::save_wav(path, &raw, &filtered, rate)?;
        log::info!("Dumped {} samples to {}", raw.len(), path.display());
    }

    eprintln!();
    eprintln!(
        "{} beats in {} ticks ({:.1} s)",
        beat_count,
        processor.detector().ticks(),
        processor.detector().ticks() as f32 * period_ms / 1000.0
    );
    if let Some(bpm) = processor.bpm() {
        eprintln!("Last heart rate: {:.1} bpm", bpm);
    }

    Ok(())
}
