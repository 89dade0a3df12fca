mod commands;
mod logging;
mod progress;

use std::fs;
use std::io::{self, Write};
use std::process;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use progress::CliReporter;
use simcheck_core::progress::ProgressFile;
use simcheck_core::{highlight, intake, score};
use simcheck_core::{AppConfig, CompareEngine, Error};
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match simcheck_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Upload { files }) => {
            if let Err(err) = run_upload(&config, &files) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Run) => {
            if let Err(err) = run_pipeline(&config) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Highlight { file_a, file_b }) => {
            if let Err(err) = run_highlight(&config, &file_a, &file_b) {
                error!("Error: {}", err);
                process::exit(1);
            }
        }
        Some(Commands::Progress) => {
            show_progress(&config);
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
        }
        Some(Commands::Clear) => {
            match prompt_confirm(
                "Are you SURE you want to delete all uploads, artifacts and results?",
                Some(false),
            ) {
                Ok(true) => {
                    if let Err(err) = run_clear(&config) {
                        error!("Error clearing data: {}", err);
                        process::exit(1);
                    }
                    println!("All run data cleared");
                }
                _ => {
                    process::exit(0);
                }
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_upload(config: &AppConfig, paths: &[std::path::PathBuf]) -> Result<(), Error> {
    intake::initialize_directories(config)?;

    let mut batch = Vec::with_capacity(paths.len());
    for path in paths {
        let data = fs::read(path)?;
        batch.push(intake::UploadFile {
            name: path.to_string_lossy().into_owned(),
            data,
        });
    }

    let stored = intake::store_batch(&batch, &config.upload_dir, config.max_file_size_bytes())?;
    info!(
        "Uploaded {} files to {}",
        stored.len(),
        config.upload_dir.display()
    );
    Ok(())
}

fn run_pipeline(config: &AppConfig) -> Result<(), Error> {
    let engine = CompareEngine::new(config.clone());
    let reporter = CliReporter::new();
    let report = engine.run(&reporter)?;

    println!();
    info!(
        "Preprocess: {}, Compare: {}, Save: {}",
        format!("{:.2}s", report.preprocess_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.score_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.persist_duration.as_secs_f64()).green(),
    );
    info!(
        "{} files in, {} normalized, {} pairs scored",
        format!("{}", report.files_in).cyan(),
        format!("{}", report.files_normalized).cyan(),
        format!("{}", report.pair_count).cyan(),
    );
    info!(
        "CPU: {} across {} cores",
        format!("{:.2}%", report.cpu_usage_percent).cyan(),
        format!("{}", report.cpu_cores).cyan(),
    );
    info!("Results written to {}", report.results_path.display());

    Ok(())
}

fn run_highlight(config: &AppConfig, file_a: &str, file_b: &str) -> Result<(), Error> {
    let name_a = intake::sanitize_file_name(file_a)?;
    let name_b = intake::sanitize_file_name(file_b)?;

    let result = score::score_pair(&config.preprocessed_dir, &name_a, &name_b, true)?;
    let Some(detail) = result.detail else {
        return Ok(());
    };
    let (segments_a, segments_b) =
        highlight::aligned_segments(&detail.text_a, &detail.text_b, &detail.blocks);

    println!(
        "{} vs {}: {}",
        name_a.cyan(),
        name_b.cyan(),
        format!("{:.2}%", result.score).yellow(),
    );
    println!("--- {}", name_a);
    println!("{}", highlight::to_html(&segments_a));
    println!("--- {}", name_b);
    println!("{}", highlight::to_html(&segments_b));

    Ok(())
}

fn show_progress(config: &AppConfig) {
    match ProgressFile::new(config.progress_path.clone()).read() {
        Some(snapshot) => {
            println!("Stage:    {}", snapshot.stage);
            println!(
                "Progress: {}/{}",
                snapshot.completed_pairs, snapshot.total_pairs
            );
            println!("Elapsed:  {:.2}s", snapshot.elapsed_time_seconds);
            println!(
                "CPU:      {:.2}% across {} cores",
                snapshot.cpu_usage_percent, snapshot.cpu_cores_used
            );
            println!("Updated:  {}", snapshot.updated_at);
        }
        None => println!("No run has started."),
    }
}

fn run_clear(config: &AppConfig) -> Result<(), Error> {
    intake::clear_directory(&config.upload_dir)?;
    intake::clear_directory(&config.preprocessed_dir)?;
    for path in [&config.results_path, &config.progress_path] {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
