//! cpmentor-admin - Operator commands
//!
//! Usage:
//!   cpmentor-admin migrate
//!   cpmentor-admin embed-problems
//!   cpmentor-admin generate-data --n-submissions 2000 --seed 42
//!   cpmentor-admin train-models
//!   cpmentor-admin init-user-predictions --user-id <UUID>
//!
//! Database commands read `DATABASE_URL` and the rest of the server
//! configuration from the environment; the offline training commands do not.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

use cpmentor::{
    config::Config,
    constants::{
        DEFAULT_DIFFICULTY_MODEL_PATH, DEFAULT_HINT_TIMING_MODEL_PATH,
        DEFAULT_SYNTHETIC_SEED, DEFAULT_SYNTHETIC_SUBMISSIONS, DEFAULT_TRAINING_DATA_PATH,
    },
    db, embeddings,
    ml::{
        ModelRegistry,
        training::{Dataset, LogisticTrainer, TrainingData, accuracy, generate_training_data},
    },
    services::{PredictionService, ProblemService},
    telemetry,
};

/// cpmentor-admin command-line arguments
#[derive(Parser)]
#[command(name = "cpmentor-admin")]
#[command(about = "Operator commands for the CP Mentor backend")]
#[command(version)]
struct Args {
    /// Log level filter when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply database migrations
    Migrate,

    /// Compute and store embeddings for every problem
    EmbedProblems,

    /// Generate a synthetic training set
    GenerateData {
        #[arg(long, default_value_t = DEFAULT_SYNTHETIC_SUBMISSIONS)]
        n_submissions: usize,

        #[arg(long, default_value_t = DEFAULT_SYNTHETIC_SEED)]
        seed: u64,

        #[arg(long, env = "TRAINING_DATA_PATH", default_value = DEFAULT_TRAINING_DATA_PATH)]
        output: PathBuf,
    },

    /// Fit both classifiers and write their artifacts
    TrainModels {
        #[arg(long, env = "TRAINING_DATA_PATH", default_value = DEFAULT_TRAINING_DATA_PATH)]
        data: PathBuf,

        #[arg(long, env = "DIFFICULTY_MODEL_PATH", default_value = DEFAULT_DIFFICULTY_MODEL_PATH)]
        difficulty_model: PathBuf,

        #[arg(long, env = "HINT_TIMING_MODEL_PATH", default_value = DEFAULT_HINT_TIMING_MODEL_PATH)]
        hint_timing_model: PathBuf,

        #[arg(long, default_value_t = 500)]
        epochs: usize,
    },

    /// Create a profile for the user and compute predictions for every problem
    InitUserPredictions {
        #[arg(long)]
        user_id: Uuid,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    telemetry::init_tracing(&args.log_level, false);

    match args.command {
        Command::Migrate => {
            let config = Config::from_env()?;
            let pool = db::create_pool(&config.database).await?;
            db::run_migrations(&pool).await?;
            println!("✓ Database migrated");
        }
        Command::EmbedProblems => {
            let config = Config::from_env()?;
            let pool = db::create_pool(&config.database).await?;
            let embedder = embeddings::from_config(&config.embedding)
                .await
                .context("Failed to construct embedder")?;

            let report = ProblemService::embed_all(&pool, embedder.as_ref()).await?;
            println!(
                "✓ Embedded {} problems ({} failed)",
                report.embedded, report.failed
            );
        }
        Command::GenerateData {
            n_submissions,
            seed,
            output,
        } => {
            let data = generate_training_data(&mut StdRng::seed_from_u64(seed), n_submissions);
            data.save(&output)?;
            println!("✓ Synthetic data saved to {}", output.display());
        }
        Command::TrainModels {
            data,
            difficulty_model,
            hint_timing_model,
            epochs,
        } => {
            let data = load_or_generate(&data)?;
            let trainer = LogisticTrainer {
                epochs,
                ..LogisticTrainer::default()
            };

            train_one(&trainer, "difficulty", &data.difficulty, &difficulty_model)?;
            train_one(&trainer, "hint timing", &data.hint_timing, &hint_timing_model)?;
            println!("✓ All models trained");
        }
        Command::InitUserPredictions { user_id } => {
            let config = Config::from_env()?;
            let pool = db::create_pool(&config.database).await?;
            let models = ModelRegistry::load(&config.models)?;

            let rows = PredictionService::init_for_user(&pool, &models, &user_id).await?;
            println!("✓ {} predictions computed for user {}", rows, user_id);
        }
    }

    Ok(())
}

fn load_or_generate(path: &Path) -> Result<TrainingData> {
    if path.exists() {
        return TrainingData::load(path).context("Failed to load training data");
    }

    println!("Synthetic data not found at {}. Generating...", path.display());
    let data = generate_training_data(
        &mut StdRng::seed_from_u64(DEFAULT_SYNTHETIC_SEED),
        DEFAULT_SYNTHETIC_SUBMISSIONS,
    );
    data.save(path)?;
    Ok(data)
}

fn train_one(trainer: &LogisticTrainer, name: &str, data: &Dataset, output: &Path) -> Result<()> {
    let classifier = trainer
        .fit(data)
        .with_context(|| format!("Failed to train {} model", name))?;
    let train_accuracy = accuracy(&classifier, data)?;
    classifier.save(output)?;

    println!(
        "✓ {} model ({} rows, training accuracy {:.3}) saved to {}",
        name,
        data.len(),
        train_accuracy,
        output.display()
    );
    Ok(())
}
