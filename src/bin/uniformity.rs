use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use uniformityvalidator::{
    evaluate, render_suite_summary, Evaluation, Sample, UniformityTest, DEFAULT_SIGNIFICANCE_LEVEL,
};

/// Check whether a `#`-separated sequence of numbers looks uniform on [0,1]
#[derive(Debug, Parser)]
#[command(name = "uniformity", version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")"))]
struct Cli {
    /// Sample file (`.num`): numbers separated by `#`
    file: PathBuf,

    /// Run a single test instead of the whole suite
    /// (means, variance, ks, chi2, poker)
    #[arg(short, long, value_parser = str::parse::<UniformityTest>)]
    test: Option<UniformityTest>,

    /// Significance level
    #[arg(short, long, default_value_t = DEFAULT_SIGNIFICANCE_LEVEL)]
    alpha: f64,

    /// Print the reports as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "uniformityvalidator=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let evaluation = match Sample::load(&cli.file)
        .and_then(|sample| evaluate(&sample, cli.test, cli.alpha))
    {
        Ok(evaluation) => evaluation,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if cli.json {
        match serde_json::to_string_pretty(evaluation.reports()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    match &evaluation {
        Evaluation::Single(report) => println!("{}", report.summary),
        Evaluation::Suite { results, reports } => {
            println!("{}", render_suite_summary(results));
            for report in reports {
                println!("{}\n", report.summary);
            }
        }
    }

    ExitCode::SUCCESS
}
