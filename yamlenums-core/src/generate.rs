//! Generation driver: one output file per requested type.
//!
//! Types are processed in the order given. The first failure aborts the
//! run; files written for earlier types are left in place.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::GenerateOptions;
use crate::constants::ValueTable;
use crate::error::{IoResultExt, YamlenumsError, YamlenumsResult};
use crate::format::{gofmt, FormatOutcome};
use crate::logging::log_warn;
use crate::package::Package;
use crate::render::{RenderContext, SourceRenderer, TypeValues};

/// Destination for generated files.
pub trait OutputSink {
    fn write(&mut self, path: &Path, contents: &[u8]) -> YamlenumsResult<()>;
}

/// Writes straight to the filesystem, replacing existing files.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsSink;

impl OutputSink for FsSink {
    fn write(&mut self, path: &Path, contents: &[u8]) -> YamlenumsResult<()> {
        fs::write(path, contents).with_path(path)
    }
}

/// `lowercase(prefix + type + suffix) + ".go"`
pub fn output_file_name(prefix: &str, type_name: &str, suffix: &str) -> String {
    format!("{}{}{}.go", prefix, type_name, suffix).to_lowercase()
}

/// Split a `-type` value into type names, keeping first occurrences in order.
pub fn parse_type_list(raw: &str) -> YamlenumsResult<Vec<String>> {
    if raw.trim().is_empty() {
        return Err(YamlenumsError::usage("the flag -type must be set"));
    }
    let mut types: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let name = part.trim();
        if name.is_empty() {
            return Err(YamlenumsError::usage(format!(
                "empty type name in -type={}",
                raw
            )));
        }
        if !types.iter().any(|t| t == name) {
            types.push(name.to_string());
        }
    }
    Ok(types)
}

/// What was written for one type.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedFile {
    pub type_name: String,
    pub path: PathBuf,
    pub table: ValueTable,
    /// Whether gofmt processed the output
    pub formatted: bool,
}

pub struct Generator<'a> {
    package: &'a Package,
    options: &'a GenerateOptions,
    command: &'a str,
    renderer: &'a dyn SourceRenderer,
    sink: &'a mut dyn OutputSink,
}

impl<'a> Generator<'a> {
    pub fn new(
        package: &'a Package,
        options: &'a GenerateOptions,
        command: &'a str,
        renderer: &'a dyn SourceRenderer,
        sink: &'a mut dyn OutputSink,
    ) -> Self {
        Self {
            package,
            options,
            command,
            renderer,
            sink,
        }
    }

    /// Generate every type in order, stopping at the first error.
    pub fn run(&mut self, types: &[String]) -> YamlenumsResult<Vec<GeneratedFile>> {
        let mut written = Vec::with_capacity(types.len());
        for type_name in types {
            written.push(self.generate_one(type_name)?);
        }
        Ok(written)
    }

    pub fn generate_one(&mut self, type_name: &str) -> YamlenumsResult<GeneratedFile> {
        let table = self.package.value_table(type_name, self.options.alias)?;
        debug!(type_name, values = table.len(), "resolved value table");

        let ctx = RenderContext {
            command: self.command.to_string(),
            package_name: self.package.name.clone(),
            types_and_values: vec![TypeValues::from(&table)],
        };
        let rendered = self.renderer.render(&ctx)?;
        let (source, formatted) = self.format(type_name, rendered);

        let path = self.package.dir.join(output_file_name(
            &self.options.prefix,
            type_name,
            &self.options.suffix,
        ));
        self.sink.write(&path, source.as_bytes())?;
        info!(type_name, path = %path.display(), "wrote generated file");

        Ok(GeneratedFile {
            type_name: type_name.to_string(),
            path,
            table,
            formatted,
        })
    }

    fn format(&self, type_name: &str, rendered: String) -> (String, bool) {
        if !self.options.gofmt {
            return (rendered, false);
        }
        match gofmt(&rendered) {
            FormatOutcome::Formatted(text) => (text, true),
            FormatOutcome::Unavailable(reason) => {
                debug!(%reason, "gofmt unavailable, keeping rendered text");
                (rendered, false)
            }
            FormatOutcome::Rejected(message) => {
                log_warn(&format!(
                    "invalid Go generated for {}: {}; compile the package to analyze the error",
                    type_name, message
                ));
                (rendered, false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("", "Pill", "_yamlenums"), "pill_yamlenums.go");
        assert_eq!(output_file_name("x", "Pill", "_y"), "xpill_y.go");
        assert_eq!(output_file_name("Gen_", "HTTPCode", ""), "gen_httpcode.go");
    }

    #[test]
    fn test_parse_type_list() {
        assert_eq!(parse_type_list("Pill").unwrap(), vec!["Pill"]);
        assert_eq!(
            parse_type_list("Pill, Color,Pill").unwrap(),
            vec!["Pill", "Color"]
        );
    }

    #[test]
    fn test_parse_type_list_errors() {
        assert!(matches!(
            parse_type_list(""),
            Err(YamlenumsError::Usage { .. })
        ));
        assert!(matches!(
            parse_type_list("Pill,,Color"),
            Err(YamlenumsError::Usage { .. })
        ));
    }

    #[test]
    fn test_fs_sink_reports_path() {
        let path = std::env::temp_dir()
            .join("yamlenums_no_such_dir")
            .join("out.go");
        let err = FsSink.write(&path, b"package p\n").unwrap_err();
        assert_eq!(err.path(), Some(&path));
    }
}
