use clap::Parser;
use papersift::{Cli, OutputFormatter, OutputMode, PaperSift, SiftError, UserFriendlyError};
use std::path::PathBuf;
use std::process;

#[tokio::main]
async fn main() {
    let exit_code = run().await;
    process::exit(exit_code);
}

async fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create PaperSift instance
    let papersift = match PaperSift::from_cli(&cli) {
        Ok(papersift) => papersift,
        Err(e) => {
            print_startup_error(&e);
            return exit_code_for(&e);
        }
    };

    // Handle dry run mode
    if cli.dry_run {
        return handle_dry_run(&papersift).await;
    }

    // Execute main corpus-building workflow
    match papersift.build_corpus().await {
        Ok(_report) => 0,
        Err(e) => {
            papersift.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

/// Map error types to appropriate exit codes, one per failure family so
/// shell scripts can branch on what went wrong.
fn exit_code_for(error: &SiftError) -> i32 {
    match error {
        SiftError::Cancelled => 130, // Interrupted (SIGINT)
        SiftError::InputDirNotFound { .. } => 2,
        SiftError::NoDocumentsFound { .. } => 3,
        SiftError::Config { .. } | SiftError::RulePattern { .. } => 4,
        SiftError::OutputWrite { .. } => 5,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("papersift.toml"));

    match PaperSift::generate_sample_config(&config_path) {
        Ok(()) => {
            println!(
                "Generated sample configuration file: {}",
                config_path.display()
            );
            println!("\nTo use this configuration:");
            println!("  papersift --config {}", config_path.display());
            println!("\nEdit the rule patterns and directories to match your corpus.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

async fn handle_dry_run(papersift: &PaperSift) -> i32 {
    match papersift.dry_run().await {
        Ok(()) => 0,
        Err(e) => {
            papersift.handle_error(&e);
            exit_code_for(&e)
        }
    }
}

fn print_startup_error(error: &SiftError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
