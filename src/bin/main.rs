//! RSMO Command Line Interface
//!
//! Trains two-class SMO models from dense vector files, scores vectors with a
//! saved model and prints model summaries.

use clap::{Args, Parser, Subcommand, ValueEnum};
use env_logger::Env;
use log::{error, info};
use rsmo::api::{quick, Svm};
use rsmo::core::{Result, SVMError, WorkingSetStrategy};
use rsmo::data::load_vectors;
use rsmo::{KernelFunction, KernelType, SvmClassifier};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "rsmo")]
#[command(about = "Two-class SVM training with Sequential Minimal Optimization")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a new model
    Train(TrainArgs),
    /// Score vectors with a trained model
    Predict(PredictArgs),
    /// Display model information
    Info(InfoArgs),
}

#[derive(Args)]
struct TrainArgs {
    /// Positive examples, one vector per line
    #[arg(long)]
    pos: PathBuf,

    /// Negative examples, one vector per line
    #[arg(long)]
    neg: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Convergence tolerance on the duality gap
    #[arg(short, long, default_value = "0.0001")]
    epsilon: f64,

    /// Kernel function
    #[arg(short, long, default_value = "linear")]
    kernel: CliKernel,

    /// Kernel coefficient for poly, rbf and sigmoid
    #[arg(short, long, default_value = "1.0")]
    gamma: f64,

    /// Independent term for poly and sigmoid
    #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
    coef0: f64,

    /// Polynomial degree
    #[arg(long, default_value = "1.0")]
    degree: f64,

    /// Worker threads (defaults to all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Abort if not converged after this many iterations
    #[arg(short, long)]
    max_iterations: Option<usize>,

    /// Choose the second index by maximal objective gain
    #[arg(long)]
    second_order: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    Linear,
    Poly,
    Rbf,
    Sigmoid,
}

impl From<CliKernel> for KernelType {
    fn from(kernel: CliKernel) -> Self {
        match kernel {
            CliKernel::Linear => KernelType::Linear,
            CliKernel::Poly => KernelType::Poly,
            CliKernel::Rbf => KernelType::Rbf,
            CliKernel::Sigmoid => KernelType::Sigmoid,
        }
    }
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Vectors to score, one per line
    #[arg(long)]
    data: PathBuf,

    /// Output scores file (optional, prints to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

/// Validate kernel parameters before building the kernel, whose
/// constructors assert on them
fn make_kernel(args: &TrainArgs) -> Result<KernelFunction> {
    let params = rsmo::SvmParams::from_parts(
        args.c,
        args.epsilon,
        args.kernel.into(),
        args.gamma,
        args.coef0,
        args.degree,
    )?;
    Ok(params.make_kernel())
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Loading positives from {:?}", args.pos);
    let pos = load_vectors(&args.pos)?;
    info!("Loading negatives from {:?}", args.neg);
    let neg = load_vectors(&args.neg)?;
    info!("Loaded {} positive and {} negative examples", pos.len(), neg.len());

    let mut svm = Svm::new()
        .with_cost(args.c)
        .with_epsilon(args.epsilon)
        .with_kernel(make_kernel(&args)?);
    if let Some(threads) = args.threads {
        svm = svm.with_threads(threads);
    }
    if let Some(max_iterations) = args.max_iterations {
        svm = svm.with_max_iterations(max_iterations);
    }
    if args.second_order {
        svm = svm.with_working_set_strategy(WorkingSetStrategy::SecondOrder);
    }

    let outcome = svm.train_detailed(&pos, &neg)?.ok_or_else(|| {
        SVMError::InvalidDataset("Both positive and negative examples are required".to_string())
    })?;
    let model = outcome.classifier;

    info!(
        "Training completed in {} iterations ({} ms)",
        outcome.iterations,
        outcome.elapsed.as_millis()
    );
    info!("Support vectors: {}", model.num_support_vectors());
    info!("Threshold: {:.6}", model.threshold());

    model.save(&args.output)?;
    info!("Model saved to: {:?}", args.output);

    let accuracy = quick::accuracy(&model, &pos, &neg);
    info!("Training accuracy: {:.2}%", accuracy * 100.0);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = SvmClassifier::load(&args.model)?;

    info!("Loading vectors from: {:?}", args.data);
    let vectors = load_vectors(&args.data)?;
    // Rows share one length, so checking the first covers the file
    if let Some(first) = vectors.first() {
        model.checked_predict(first)?;
    }
    let scores = model.predict_batch(&vectors);

    match args.output {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(&path)?);
            write_scores(&mut writer, &scores)?;
            writer.flush()?;
            info!("Scores saved to: {path:?}");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_scores(&mut writer, &scores)?;
        }
    }

    Ok(())
}

fn write_scores<W: Write>(writer: &mut W, scores: &[f64]) -> Result<()> {
    for score in scores {
        writeln!(writer, "{score}")?;
    }
    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from: {:?}", args.model);
    let model = SvmClassifier::load(&args.model)?;
    let summary = model.summary();

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| SVMError::ParseError(e.to_string()))?;
        println!("{json}");
        return Ok(());
    }

    println!("=== Model Summary ===");
    println!("Kernel: {}", summary.kernel);
    println!("  C: {}", summary.cost);
    println!("  Epsilon: {}", summary.eps);
    if summary.kernel != KernelType::Linear {
        println!("  Gamma: {}", summary.gamma);
        println!("  Coef0: {}", summary.coef0);
        println!("  Degree: {}", summary.degree);
    }
    println!("Threshold: {:.6}", summary.threshold);
    println!("Training examples: {} positive, {} negative", summary.num_pos, summary.num_neg);
    println!("Support vectors: {}", summary.num_support_vectors);
    match summary.dims {
        Some(dims) => println!("Dimensions: {dims}"),
        None => println!("Dimensions: unknown"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_train() {
        let cli = Cli::try_parse_from([
            "rsmo", "train", "--pos", "p.txt", "--neg", "n.txt", "-o", "m.model", "--kernel",
            "rbf", "--gamma", "0.5", "--coef0", "-1", "--second-order",
        ])
        .expect("valid arguments");

        match cli.command {
            Commands::Train(args) => {
                assert!(matches!(args.kernel, CliKernel::Rbf));
                assert_eq!(args.gamma, 0.5);
                assert_eq!(args.coef0, -1.0);
                assert!(args.second_order);
                assert_eq!(args.c, 1.0);
                assert_eq!(args.epsilon, 1e-4);
                let kernel = make_kernel(&args).expect("valid kernel");
                assert_eq!(kernel.kernel_type(), KernelType::Rbf);
            }
            _ => panic!("expected train command"),
        }
    }

    #[test]
    fn test_make_kernel_rejects_bad_gamma() {
        let cli = Cli::try_parse_from([
            "rsmo", "train", "--pos", "p", "--neg", "n", "-o", "m", "--kernel", "poly",
            "--gamma", "0",
        ])
        .expect("valid arguments");
        match cli.command {
            Commands::Train(args) => {
                assert!(matches!(make_kernel(&args), Err(SVMError::InvalidParameter(_))));
            }
            _ => panic!("expected train command"),
        }
    }
}
