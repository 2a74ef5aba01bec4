//! backbeat CLI entry point

use backbeat::config::{Cli, Settings};
use backbeat::pipeline::{self, NullProgress, ProgressSink, Step};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(&cli);

    // Validate inputs
    if let Err(e) = validate_inputs(&cli) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    // Build settings from CLI
    let settings = Settings::from_cli(&cli);

    let progress: Box<dyn ProgressSink> = if settings.show_progress {
        Box::new(BarProgress::new())
    } else {
        Box::new(NullProgress)
    };

    // Run the pipeline
    match pipeline::run(&settings, progress.as_ref()) {
        Ok(result) => {
            println!();
            if result.skipped {
                println!(
                    "Output up to date ({} files, {:.1} BPM). Use --force to regenerate.",
                    result.artifacts.len(),
                    result.tempo_bpm
                );
            } else {
                println!(
                    "Generated {} files at {:.1} BPM in {}",
                    result.artifacts.len(),
                    result.tempo_bpm,
                    settings.output.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = if cli.quiet { "error" } else { filter };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

fn validate_inputs(cli: &Cli) -> Result<(), String> {
    // Check input exists
    if !cli.input.exists() {
        return Err(format!(
            "Input file does not exist: {}\n\n  Tip: Check the path is correct and accessible.\n  Examples:\n    backbeat -i ./song.mp3 -o ./output --stems --exclude drums\n    backbeat -i ./song.wav --tempo 120 --add-start-beat",
            cli.input.display()
        ));
    }

    // Check output parent directory exists (we'll create the output dir itself)
    if let Some(parent) = cli.output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(format!(
                "Output parent directory does not exist: {}\n\n  Tip: The output directory will be created automatically,\n  but its parent directory must exist.\n  Example: mkdir -p {}",
                parent.display(),
                parent.display()
            ));
        }
    }

    if cli.include_beat && cli.exclude.is_none() {
        return Err(
            "--include-beat only applies to backing tracks; pass --exclude <stem> as well"
                .to_string(),
        );
    }

    Ok(())
}

/// Progress sink backed by an indicatif step bar
struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Self {
        let bar = ProgressBar::new(Step::ALL.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { bar }
    }
}

impl ProgressSink for BarProgress {
    fn on_step(&self, step: Step, detail: &str) {
        self.bar.set_position(step.index() as u64);
        if detail.is_empty() {
            self.bar.set_message(step.label().to_string());
        } else {
            self.bar.set_message(format!("{} ({})", step.label(), detail));
        }
    }
}
