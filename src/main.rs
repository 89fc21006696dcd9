use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spoken_evaluate::audio::AudioLoader;
use spoken_evaluate::config::AppConfig;
use spoken_evaluate::pronunciation::{
    AudioEvaluator, EvaluationMode, EvaluationResponse, ScoringConfig,
};
use spoken_evaluate::transcription::{recognizer_from_config, transcribe_best_effort};

/// Spoken-evaluate - pronunciation scoring against a reference recording
///
/// Aligns the learner's recording with the reference, scores every character
/// (word mode) or word (sentence mode), and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "spoken-evaluate")]
#[command(version)]
#[command(about = "Score a spoken recording against a reference", long_about = None)]
struct Args {
    /// Reference text the speaker was asked to say
    #[arg(long)]
    text: String,

    /// Reference (teacher) recording
    #[arg(long, value_name = "FILE")]
    reference: PathBuf,

    /// Learner recording
    #[arg(long, value_name = "FILE")]
    user: PathBuf,

    /// Evaluation mode: word or sentence
    #[arg(long, default_value = "word")]
    mode: String,

    /// Analysis sample rate in Hz (overrides SPOKEN_EVALUATE_SAMPLE_RATE)
    #[arg(long, value_name = "HZ")]
    sample_rate: Option<u32>,

    /// JSON file overriding scoring constants (overrides SPOKEN_EVALUATE_SCORING)
    #[arg(long, value_name = "JSON")]
    scoring_config: Option<PathBuf>,

    /// Attach a best-effort transcript of the learner recording
    #[arg(long)]
    transcribe: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn validate(&self) -> Result<()> {
        for (label, path) in [("Reference", &self.reference), ("User", &self.user)] {
            if !path.exists() {
                bail!("{label} file does not exist: {:?}", path);
            }
            if !path.is_file() {
                bail!("{label} path is not a file: {:?}", path);
            }
        }

        if let Some(rate) = self.sample_rate {
            if rate == 0 {
                bail!("Sample rate must be positive, got: {rate}");
            }
        }

        if let Some(path) = &self.scoring_config {
            if !path.is_file() {
                bail!("Scoring config file does not exist: {:?}", path);
            }
        }

        Ok(())
    }

    fn mode(&self) -> Result<EvaluationMode> {
        self.mode
            .parse()
            .with_context(|| format!("Invalid --mode {:?}", self.mode))
    }

    fn app_config(&self) -> Result<AppConfig> {
        let mut config = AppConfig::from_env().context("Invalid environment configuration")?;
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(path) = &self.scoring_config {
            config.scoring_path = Some(path.clone());
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let args = Args::parse();
    args.validate()
        .context("Failed to validate command-line arguments")?;
    let mode = args.mode()?;
    let config = args.app_config()?;
    let scoring: ScoringConfig = config.scoring()?;

    let loader = AudioLoader::new(config.sample_rate)?;
    let reference = loader
        .load_file(&args.reference)
        .context("Failed to load reference audio")?;
    let user = loader
        .load_file(&args.user)
        .context("Failed to load user audio")?;
    info!(
        reference_secs = reference.duration_secs(),
        user_secs = user.duration_secs(),
        sample_rate = config.sample_rate,
        "loaded recordings"
    );

    let evaluator = AudioEvaluator::new()
        .with_scoring(scoring)
        .context("Invalid scoring configuration")?;
    let result = evaluator
        .evaluate(&args.text, &reference, &user, mode)
        .context("Evaluation failed")?;

    let transcript = if args.transcribe {
        let recognizer = recognizer_from_config(&config);
        transcribe_best_effort(recognizer.as_ref(), &user)
    } else {
        None
    };
    let response = EvaluationResponse::from(result).with_transcript(transcript);

    let json = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    }
    .context("Failed to serialize evaluation result")?;
    println!("{json}");
    Ok(())
}
