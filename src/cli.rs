use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "papersift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract and filter research-article metadata from scraped HTML pages")]
#[command(
    long_about = "PaperSift walks a directory of saved article pages, pulls out title, \
                       abstract and body text through a chain of HTML fallbacks, and keeps \
                       the articles whose text matches the configured keyword rule sets."
)]
#[command(before_help = "🔬 PaperSift - Article Corpus Builder")]
#[command(after_help = "EXAMPLES:\n  \
    papersift\n  \
    papersift --input HTMLfiles --output OUTPUT --format both\n  \
    papersift -i scraped_pages -f jsonl -vv\n  \
    papersift --config my-rules.toml --threads 8\n\n\
    For more information, visit: https://github.com/user/papersift")]
pub struct Cli {
    /// Directory containing the scraped .html/.htm pages
    #[arg(short, long, help = "Input directory of saved article pages")]
    pub input: Option<PathBuf>,

    /// Directory for the generated reports
    #[arg(short, long, help = "Directory the report files are written to")]
    pub output: Option<PathBuf>,

    /// Which matched-article reports to write
    #[arg(short, long, value_parser = ["csv", "jsonl", "both"])]
    pub format: Option<String>,

    /// Field extraction strategy
    #[arg(long, value_parser = ["auto", "citation", "generic"],
          help = "HTML parser to use (auto probes for the citation parser)")]
    pub parser: Option<String>,

    /// Worker threads for the parse stage (0 = number of CPUs)
    #[arg(short = 'j', long, help = "Worker threads, 0 sizes the pool automatically")]
    pub threads: Option<usize>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print a per-file verdict line (same as -vv)
    #[arg(long, help = "Print primary/secondary match flags for every file")]
    pub debug: bool,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (validate configuration and show the discovery plan)
    #[arg(long, help = "Show what would be processed without parsing anything")]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        let overrides = self.create_cli_overrides();
        config.merge_with_cli_args(&overrides);
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_input_dir(self.input.clone())
            .with_output_dir(self.output.clone())
            .with_format(self.format.clone())
            .with_parser(self.parser.clone())
            .with_threads(self.threads)
    }

    pub fn should_use_colors(&self) -> bool {
        !self.quiet && console::Term::stdout().features().colors_supported()
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity_level() > 0
    }

    /// Effective verbosity: --debug is shorthand for -vv, quiet wins over both.
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else if self.debug {
            self.verbose.max(2)
        } else {
            self.verbose
        }
    }
}
