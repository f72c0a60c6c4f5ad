//! Builder pattern API for running the generator.
//!
//! Provides a fluent interface over config loading, package parsing and
//! per-type generation:
//!
//! ```rust,ignore
//! use yamlenums_core::prelude::*;
//!
//! let report = Yamlenums::new("./painkiller")
//!     .types(["Pill"])
//!     .suffix("_yaml")
//!     .alias(AliasPolicy::FirstDeclared)
//!     .generate()?;
//!
//! for file in &report.files {
//!     println!("wrote {}", file.path.display());
//! }
//! ```

use std::path::PathBuf;

use serde::Serialize;

use crate::config::{load_config, YamlenumsConfig};
use crate::constants::AliasPolicy;
use crate::error::{YamlenumsError, YamlenumsResult};
use crate::generate::{FsSink, GeneratedFile, Generator, OutputSink};
use crate::package::{parse_package_with, FsReader, SourceReader};
use crate::render::{GoTemplate, SourceRenderer};

/// Builder for one generator run over a package directory.
#[derive(Debug, Clone)]
pub struct Yamlenums {
    /// Directory holding the package
    dir: PathBuf,

    /// Types to generate, in order
    types: Vec<String>,

    /// Values given explicitly; these beat yamlenums.toml
    overrides: YamlenumsConfig,

    /// Text for the generated header
    command: String,
}

impl Yamlenums {
    /// Create a new builder for the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            types: Vec::new(),
            overrides: YamlenumsConfig::default(),
            command: String::new(),
        }
    }

    /// Types to generate code for.
    pub fn types(mut self, types: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.types.extend(types.into_iter().map(Into::into));
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.overrides.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.overrides.suffix = Some(suffix.into());
        self
    }

    /// Canonical-name policy for values with several names.
    pub fn alias(mut self, policy: AliasPolicy) -> Self {
        self.overrides.alias = Some(policy);
        self
    }

    /// Enable or disable the gofmt pass.
    pub fn gofmt(mut self, enabled: bool) -> Self {
        self.overrides.gofmt = Some(enabled);
        self
    }

    /// Command line recorded in the `Code generated by` header.
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Run with the filesystem reader, the Go template and the filesystem sink.
    pub fn generate(&self) -> YamlenumsResult<GenerationReport> {
        self.generate_with(&mut FsReader, &GoTemplate, &mut FsSink)
    }

    /// Run with custom collaborators.
    pub fn generate_with(
        &self,
        reader: &mut dyn SourceReader,
        renderer: &dyn SourceRenderer,
        sink: &mut dyn OutputSink,
    ) -> YamlenumsResult<GenerationReport> {
        if self.types.is_empty() {
            return Err(YamlenumsError::usage("the flag -type must be set"));
        }

        // 1. Settings: flags > yamlenums.toml > defaults
        let file_config = load_config(&self.dir)?.unwrap_or_default();
        let options = file_config.resolve(&self.overrides);

        // 2. Parse the package once for all types
        let package = parse_package_with(&self.dir, reader)?;

        // 3. Generate each type, stopping at the first failure
        let command = if self.command.is_empty() {
            format!("-type={}", self.types.join(","))
        } else {
            self.command.clone()
        };
        let files = Generator::new(&package, &options, &command, renderer, sink).run(&self.types)?;

        Ok(GenerationReport {
            package: package.name,
            dir: package.dir,
            files,
        })
    }
}

/// Result of a generator run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    /// Go package name
    pub package: String,

    /// Directory the files were written to
    pub dir: PathBuf,

    /// One entry per generated type, in request order
    pub files: Vec<GeneratedFile>,
}

impl GenerationReport {
    /// Paths of all written files.
    pub fn paths(&self) -> Vec<&PathBuf> {
        self.files.iter().map(|f| &f.path).collect()
    }
}
