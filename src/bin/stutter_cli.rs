use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use stutter_detector::analysis::{analyze_with, classify, remedies_for_label, Category, FeatureExtractor};
use stutter_detector::audio;
use stutter_detector::config::AppConfig;
use stutter_detector::fixtures::{ExpectationDiff, FixtureCatalog, FixtureProcessor};
use stutter_detector::report::AnalysisReport;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "stutter_cli",
    about = "Speech disfluency analysis and deterministic fixture harness"
)]
struct Cli {
    /// Override directory containing fixture assets (defaults to the crate fixtures/)
    #[arg(long, global = true)]
    fixtures_dir: Option<PathBuf>,
    /// JSON configuration file; missing fields use defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a recording, classify it and print the analysis report
    Analyze {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Classify a JSON feature vector (file path or `-` for stdin)
    Classify {
        #[arg(long)]
        features: String,
    },
    /// Print the remedy suggestions for a category label
    Remedies {
        #[arg(long)]
        category: String,
    },
    /// Analyze a fixture and optionally compare against expectations
    Fixture {
        #[arg(long)]
        name: String,
        #[arg(long)]
        expect: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List available fixtures on disk
    DumpFixtures,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli
        .config
        .as_deref()
        .map(AppConfig::load_from_file)
        .unwrap_or_default();
    let catalog = cli
        .fixtures_dir
        .map(FixtureCatalog::new)
        .unwrap_or_default()
        .with_input_config(config.input.clone());

    match cli.command {
        Commands::Analyze { input, output } => run_analyze(&config, &input, output),
        Commands::Classify { features } => run_classify(&features),
        Commands::Remedies { category } => run_remedies(&category),
        Commands::Fixture {
            name,
            expect,
            output,
        } => run_fixture(&catalog, config, &name, expect, output),
        Commands::DumpFixtures => run_dump(&catalog),
    }
}

fn run_analyze(config: &AppConfig, input: &Path, output_path: Option<PathBuf>) -> Result<ExitCode> {
    let waveform = audio::load(input, &config.input)
        .with_context(|| format!("loading {}", input.display()))?;
    let extractor = FeatureExtractor::with_config(waveform.sample_rate, &config.features)?;
    let analysis = analyze_with(&extractor, &waveform.samples)
        .with_context(|| format!("analyzing {}", input.display()))?;

    let filename = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let report = AnalysisReport::new(filename, &waveform, &analysis);
    emit_json(&report, output_path)?;
    Ok(ExitCode::from(0))
}

/// Accepts a bare array or any object carrying a `features` array
#[derive(Deserialize)]
#[serde(untagged)]
enum FeaturesInput {
    Vector(Vec<f64>),
    Report { features: Vec<f64> },
}

fn run_classify(source: &str) -> Result<ExitCode> {
    let json = if source == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("reading features from stdin")?;
        buffer
    } else {
        fs::read_to_string(source).with_context(|| format!("reading {source}"))?
    };

    let input: FeaturesInput =
        serde_json::from_str(&json).context("parsing feature vector JSON")?;
    let features = match input {
        FeaturesInput::Vector(values) | FeaturesInput::Report { features: values } => values,
    };

    let result = classify(&features).context("classifying feature vector")?;
    emit_json(&result, None)?;
    Ok(ExitCode::from(0))
}

fn run_remedies(label: &str) -> Result<ExitCode> {
    let category = label.parse::<Category>().unwrap_or(Category::None);
    let payload = RemediesPayload {
        category,
        remedies: remedies_for_label(label),
    };
    emit_json(&payload, None)?;
    Ok(ExitCode::from(0))
}

fn run_fixture(
    catalog: &FixtureCatalog,
    config: AppConfig,
    fixture: &str,
    override_expect: Option<PathBuf>,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let processor = FixtureProcessor::new(config);
    let data = catalog.load(fixture, override_expect)?;
    let analysis = processor
        .run(&data)
        .with_context(|| format!("processing fixture {}", fixture))?;

    let report = AnalysisReport::new(data.metadata.name.clone(), &data.waveform, &analysis);
    emit_json(&report, output_path)?;

    if let Some(expectations) = data.expectations {
        match expectations.verify(&analysis.classification) {
            Ok(()) => Ok(ExitCode::from(0)),
            Err(diff) => {
                emit_diff(&diff)?;
                Ok(ExitCode::from(2))
            }
        }
    } else {
        Ok(ExitCode::from(0))
    }
}

fn run_dump(catalog: &FixtureCatalog) -> Result<ExitCode> {
    let fixtures = catalog.discover()?;
    if fixtures.is_empty() {
        println!("No fixtures found under {}", catalog.root().display());
        return Ok(ExitCode::from(0));
    }

    for metadata in fixtures {
        if let Some(expect) = metadata.expect_path {
            println!("{} -> {}", metadata.name, expect.display());
        } else {
            println!("{}", metadata.name);
        }
    }
    Ok(ExitCode::from(0))
}

fn emit_json<T: Serialize>(value: &T, output_path: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(())
}

fn emit_diff(diff: &ExpectationDiff) -> Result<()> {
    let json = serde_json::to_string_pretty(&diff.to_json())?;
    eprintln!("{json}");
    Ok(())
}

#[derive(Serialize)]
struct RemediesPayload {
    category: Category,
    remedies: &'static [&'static str],
}
