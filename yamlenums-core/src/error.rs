//! Typed error handling for yamlenums.
//!
//! Every failure the generator can hit is a variant here, so callers (the CLI,
//! tests, other build tools) can match on what went wrong and where.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for yamlenums operations.
#[derive(Error, Debug)]
pub enum YamlenumsError {
    /// Bad or missing command-line input
    #[error("usage: {message}")]
    Usage { message: String },

    /// I/O error when reading or writing files
    #[error("I/O error at {path}: {message}")]
    Io {
        path: PathBuf,
        message: String,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Syntax error when lexing or parsing Go source
    #[error("parse error in {path}{}: {message}", location(.line, .column))]
    Parse {
        path: PathBuf,
        message: String,
        /// Line number (1-indexed) if available
        line: Option<usize>,
        /// Column number (1-indexed) if available
        column: Option<usize>,
    },

    /// The directory declares more than one package
    #[error("multiple packages in {dir}: {first} ({first_file}) and {second} ({second_file})")]
    MixedPackages {
        dir: PathBuf,
        first: String,
        first_file: PathBuf,
        second: String,
        second_file: PathBuf,
    },

    /// The directory holds no Go source files
    #[error("no buildable Go source files in {dir}")]
    NoSourceFiles { dir: PathBuf },

    /// No constants of the requested type exist
    #[error("no values defined for type {type_name}")]
    TypeNotFound { type_name: String },

    /// The requested type is not backed by an integer
    #[error("can't handle non-integer type {type_name} (underlying {underlying})")]
    NonIntegerType {
        type_name: String,
        underlying: String,
    },

    /// A constant's value expression is outside the supported subset
    #[error("constant {name}: unsupported expression: {detail}")]
    UnsupportedExpression { name: String, detail: String },

    /// A typed constant does not fit its type, or arithmetic is undefined
    #[error("constant {name}: {detail}")]
    Overflow { name: String, detail: String },

    /// Constants refer to each other in a loop
    #[error("constant {name} is defined in terms of itself")]
    Cycle { name: String },

    /// Configuration file errors
    #[error("config error at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Rendering or formatting of generated source failed
    #[error("format error: {message}")]
    Format { message: String },
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (*line, *column) {
        (Some(l), Some(c)) => format!(":{}:{}", l, c),
        (Some(l), None) => format!(":{}", l),
        _ => String::new(),
    }
}

impl YamlenumsError {
    /// Create a usage error.
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
            source: Some(err),
        }
    }

    /// Create a parse error without location.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// Create a parse error with line/column info.
    pub fn parse_at(
        path: impl Into<PathBuf>,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
            line: Some(line),
            column: Some(column),
        }
    }

    /// Create an unsupported-expression error for the named constant.
    pub fn unsupported(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedExpression {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Create an overflow / undefined-arithmetic error for the named constant.
    pub fn overflow(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Overflow {
            name: name.into(),
            detail: detail.into(),
        }
    }

    /// Create a config error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the error comes from loading the package rather than from
    /// analyzing a particular type.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            Self::Parse { .. } | Self::MixedPackages { .. } | Self::NoSourceFiles { .. }
        )
    }

    /// Get the path associated with this error, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::Io { path, .. } => Some(path),
            Self::Parse { path, .. } => Some(path),
            Self::Config { path, .. } => Some(path),
            Self::MixedPackages { dir, .. } | Self::NoSourceFiles { dir } => Some(dir),
            _ => None,
        }
    }
}

/// Convenience type alias for yamlenums results.
pub type YamlenumsResult<T> = Result<T, YamlenumsError>;

/// Extension trait for converting std::io::Error with path context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    fn with_path(self, path: impl Into<PathBuf>) -> YamlenumsResult<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> YamlenumsResult<T> {
        self.map_err(|e| YamlenumsError::io(path, e))
    }
}
