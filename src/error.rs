use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiftError {
    #[error("Input directory not found: {path}")]
    InputDirNotFound { path: String },

    #[error("No HTML documents found under: {path}")]
    NoDocumentsFound {
        path: String,
        extensions: Vec<String>,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid pattern for rule '{label}'")]
    RulePattern {
        label: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to write output file: {path}")]
    OutputWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse document {file}: {message}")]
    DocumentParse { file: String, message: String },

    #[error("Worker pool setup failed: {message}")]
    ThreadPool { message: String },

    #[error("Operation was cancelled by user")]
    Cancelled,
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for SiftError {
    fn user_message(&self) -> String {
        match self {
            SiftError::InputDirNotFound { path } => {
                format!("Input directory not found: {}", path)
            }
            SiftError::NoDocumentsFound { path, extensions } => {
                format!(
                    "No files with extensions {} found under '{}' (including subfolders)",
                    extensions.join("/"),
                    path
                )
            }
            SiftError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            SiftError::RulePattern { label, source } => {
                format!("Rule '{}' has an invalid pattern: {}", label, source)
            }
            SiftError::OutputWrite { path, source } => {
                format!("Could not write {}: {}", path, source)
            }
            SiftError::DocumentParse { file, message } => {
                format!("Could not parse {}: {}", file, message)
            }
            SiftError::ThreadPool { message } => {
                format!("Worker pool setup failed: {}", message)
            }
            SiftError::Cancelled => "Operation was cancelled by user".to_string(),
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            SiftError::InputDirNotFound { .. } => Some(
                "Point --input at the directory containing your saved article pages, or create it and add .html files.".to_string()
            ),
            SiftError::NoDocumentsFound { .. } => Some(
                "Check that the directory contains .html/.htm files. Files whose names start with 'saved_resource' are ignored as browser artifacts.".to_string()
            ),
            SiftError::Config { .. } => Some(
                "Check your configuration file syntax and ensure all required fields are present.".to_string()
            ),
            SiftError::RulePattern { .. } => Some(
                "Fix the regular expression under [rules] in your configuration file, or remove the rule to fall back to the built-in defaults.".to_string()
            ),
            SiftError::OutputWrite { .. } => Some(
                "Ensure the output directory is writable and has enough free space.".to_string()
            ),
            SiftError::ThreadPool { .. } => Some(
                "Try a lower --threads value, or 0 to size the pool automatically.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for SiftError {
    fn from(error: toml::de::Error) -> Self {
        SiftError::Config {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiftError>;
