use crate::classifier::{default_primary_rules, default_secondary_rules, RuleSet, RuleSpec};
use crate::error::{Result, SiftError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const OUTPUT_FORMATS: &[&str] = &["csv", "jsonl", "both"];
pub const PARSER_KINDS: &[&str] = &["auto", "citation", "generic"];

const MAX_THREADS: usize = 512;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiscoveryConfig {
    pub input_dir: PathBuf,
    pub extensions: Vec<String>,
    pub exclude_prefixes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    pub parser: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RulesConfig {
    pub primary: Vec<RuleSpec>,
    pub secondary: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    pub threads: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            extraction: ExtractionConfig::default(),
            rules: RulesConfig::default(),
            pipeline: PipelineConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("HTMLfiles"),
            extensions: vec!["html".to_string(), "htm".to_string()],
            exclude_prefixes: vec!["saved_resource".to_string()],
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            parser: "auto".to_string(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_rules(),
            secondary: default_secondary_rules(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threads: 0, // 0 = size the pool from the CPU count
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("OUTPUT"),
            format: "both".to_string(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(SiftError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| SiftError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| SiftError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                // Try to load from default locations
                let default_paths = ["papersift.toml", "papersift.config.toml", ".papersift.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                // If no config file found, use defaults
                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref input_dir) = cli_args.input_dir {
            self.discovery.input_dir = input_dir.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }

        if let Some(ref format) = cli_args.format {
            self.output.format = format.trim().to_lowercase();
        }

        if let Some(ref parser) = cli_args.parser {
            self.extraction.parser = parser.trim().to_lowercase();
        }

        if let Some(threads) = cli_args.threads {
            self.pipeline.threads = threads;
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| SiftError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| SiftError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.discovery.extensions.is_empty() {
            return Err(SiftError::Config {
                message: "At least one file extension must be specified".to_string(),
            });
        }

        if !OUTPUT_FORMATS.contains(&self.output.format.as_str()) {
            return Err(SiftError::Config {
                message: format!(
                    "Unknown output format '{}' (expected one of: {})",
                    self.output.format,
                    OUTPUT_FORMATS.join(", ")
                ),
            });
        }

        if !PARSER_KINDS.contains(&self.extraction.parser.as_str()) {
            return Err(SiftError::Config {
                message: format!(
                    "Unknown parser '{}' (expected one of: {})",
                    self.extraction.parser,
                    PARSER_KINDS.join(", ")
                ),
            });
        }

        if self.pipeline.threads > MAX_THREADS {
            return Err(SiftError::Config {
                message: format!("Thread count must be at most {}", MAX_THREADS),
            });
        }

        if self.rules.primary.is_empty() || self.rules.secondary.is_empty() {
            return Err(SiftError::Config {
                message: "Both [rules] sets need at least one rule".to_string(),
            });
        }

        // Compile every rule now so a broken pattern fails before any
        // documents are processed.
        RuleSet::compile(&self.rules.primary)?;
        RuleSet::compile(&self.rules.secondary)?;

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<String>,
    pub parser: Option<String>,
    pub threads: Option<usize>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input_dir(mut self, input_dir: Option<PathBuf>) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn with_format(mut self, format: Option<String>) -> Self {
        self.format = format;
        self
    }

    pub fn with_parser(mut self, parser: Option<String>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads;
        self
    }
}
