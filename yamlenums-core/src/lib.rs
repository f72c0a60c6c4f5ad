//! yamlenums-core: YAML marshalling code generation for Go integer enums
//!
//! Given a directory holding one Go package and the name of an integer type
//! with named constants, this library finds the constants, evaluates their
//! values (iota, shifts, references to other constants, conversions),
//! collapses aliases into one canonical name per value, and writes a Go file
//! with `MarshalYAML` / `UnmarshalYAML` methods for the type.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use yamlenums_core::prelude::*;
//!
//! let report = Yamlenums::new("./painkiller")
//!     .types(["Pill"])
//!     .generate()?;
//!
//! // painkiller/pill_yamlenums.go
//! println!("{}", report.files[0].path.display());
//! ```
//!
//! # Module Organization
//!
//! - [`syntax`]: Go lexer (with semicolon insertion) and declaration parser
//! - [`scan`]: Package source file discovery
//! - [`package`]: Package loading and type resolution
//! - [`constants`]: Constant extraction, dependency order, evaluation, value tables
//! - [`render`]: Go source template
//! - [`format`]: Optional gofmt pass
//! - [`generate`]: Per-type generation driver and output sink
//! - [`builder`]: Fluent builder API
//! - [`config`]: `yamlenums.toml` loading
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `gofmt` (default): Pipe generated code through `gofmt` when available

pub mod builder;
pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod generate;
pub mod logging;
pub mod package;
pub mod prelude;
pub mod render;
pub mod report;
pub mod scan;
pub mod syntax;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{IoResultExt, YamlenumsError, YamlenumsResult};

// Builder API
pub use builder::{GenerationReport, Yamlenums};

// Configuration
pub use config::{load_config, GenerateOptions, YamlenumsConfig, CONFIG_FILE, DEFAULT_SUFFIX};

// Constants
pub use constants::{
    extract_constants, resolve_values, AliasPolicy, ConstEntry, ConstGraph, ConstValue,
    IntKind, ResolvedConstant, TypeLookup, TypeResolution, ValueEntry, ValueTable,
};

// Formatting
pub use format::{gofmt, FormatOutcome};

// Generation
pub use generate::{
    output_file_name, parse_type_list, FsSink, GeneratedFile, Generator, OutputSink,
};

// Logging
pub use logging::{init_structured_logging, log_error, log_warn};

// Package loading
pub use package::{parse_package, parse_package_with, FsReader, Package, SourceReader};

// Rendering
pub use render::{GoTemplate, NamedValue, RenderContext, SourceRenderer, TypeValues};

// Reporting
pub use report::{print_json, summary_json};

// File scanning
pub use scan::{gather_go_files, is_package_source};

// Syntax
pub use syntax::{parse_file, SourceFile};
