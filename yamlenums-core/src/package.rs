//! Package loading: one directory, one Go package, parsed once.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::{
    extract_constants, resolve_values, AliasPolicy, ConstEntry, IntKind, TypeLookup,
    TypeResolution, ValueTable,
};
use crate::error::{IoResultExt, YamlenumsError, YamlenumsResult};
use crate::scan::gather_go_files;
use crate::syntax::{parse_file, SourceFile, TypeExpr, TypeName, TypeSpec};

/// Source of file contents for [`parse_package_with`].
pub trait SourceReader {
    fn read(&mut self, path: &Path) -> YamlenumsResult<String>;
}

/// Reads files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read(&mut self, path: &Path) -> YamlenumsResult<String> {
        fs::read_to_string(path).with_path(path)
    }
}

/// Declarations of one Go package.
#[derive(Debug, Clone)]
pub struct Package {
    /// Package clause name
    pub name: String,
    /// Directory the package was loaded from
    pub dir: PathBuf,
    /// Files that took part, sorted by name
    pub files: Vec<PathBuf>,
    entries: Vec<ConstEntry>,
    types: HashMap<String, TypeSpec>,
}

/// Load the package in `dir` from disk.
pub fn parse_package(dir: &Path) -> YamlenumsResult<Package> {
    parse_package_with(dir, &mut FsReader)
}

/// Load the package in `dir`, reading each file through `reader` exactly once.
pub fn parse_package_with(dir: &Path, reader: &mut dyn SourceReader) -> YamlenumsResult<Package> {
    let mut parsed: Vec<SourceFile> = Vec::new();

    for path in gather_go_files(dir)? {
        let source = reader.read(&path)?;
        if is_build_ignored(&source) {
            debug!(file = %path.display(), "skipping build-ignored file");
            continue;
        }
        let file = parse_file(&path, &source)?;

        if let Some(first) = parsed.first() {
            if first.package.name != file.package.name {
                return Err(YamlenumsError::MixedPackages {
                    dir: dir.to_path_buf(),
                    first: first.package.name.clone(),
                    first_file: first.path.clone(),
                    second: file.package.name.clone(),
                    second_file: file.path.clone(),
                });
            }
        }
        parsed.push(file);
    }

    let Some(first) = parsed.first() else {
        return Err(YamlenumsError::NoSourceFiles {
            dir: dir.to_path_buf(),
        });
    };
    let name = first.package.name.clone();

    let entries = extract_constants(&parsed)?;

    let mut types = HashMap::new();
    for file in &parsed {
        for spec in &file.types {
            if let Some(prev) = types.insert(spec.name.name.clone(), spec.clone()) {
                return Err(YamlenumsError::parse_at(
                    &file.path,
                    format!("{} redeclared in this block", prev.name.name),
                    spec.name.pos.line,
                    spec.name.pos.column,
                ));
            }
        }
    }

    debug!(
        package = %name,
        files = parsed.len(),
        constants = entries.len(),
        types = types.len(),
        "parsed package"
    );

    Ok(Package {
        name,
        dir: dir.to_path_buf(),
        files: parsed.into_iter().map(|f| f.path).collect(),
        entries,
        types,
    })
}

/// `//go:build ignore` (or the legacy `// +build ignore`) ahead of the
/// package clause keeps a file out of the build.
fn is_build_ignored(source: &str) -> bool {
    for line in source.lines() {
        let line = line.trim();
        if line.starts_with("package ") {
            return false;
        }
        let constraint = line
            .strip_prefix("//go:build ")
            .or_else(|| line.strip_prefix("// +build "));
        if let Some(expr) = constraint {
            if expr.trim() == "ignore" {
                return true;
            }
        }
    }
    false
}

impl Package {
    /// All named constants of the package in declaration order.
    pub fn entries(&self) -> &[ConstEntry] {
        &self.entries
    }

    /// Resolve the value table of `type_name`.
    pub fn value_table(&self, type_name: &str, policy: AliasPolicy) -> YamlenumsResult<ValueTable> {
        resolve_values(&self.entries, self, type_name, policy)
    }

    /// `(canonical name, value)` pairs of `type_name`, lexically smallest name per value.
    pub fn values_of_type(&self, type_name: &str) -> YamlenumsResult<Vec<(String, i128)>> {
        let table = self.value_table(type_name, AliasPolicy::default())?;
        Ok(table.pairs().map(|(n, v)| (n.to_string(), v)).collect())
    }

    fn resolve_local(&self, name: &str, depth: usize) -> TypeResolution {
        let Some(spec) = self.types.get(name) else {
            return match IntKind::from_basic(name) {
                Some(kind) => TypeResolution::Integer(kind),
                None => TypeResolution::Undeclared,
            };
        };
        if depth > self.types.len() {
            return TypeResolution::Other(format!("invalid recursive type {}", name));
        }
        match &spec.underlying {
            TypeExpr::Named(TypeName::Local(next)) => match self.resolve_local(next, depth + 1) {
                TypeResolution::Undeclared => TypeResolution::Other(next.clone()),
                resolved => resolved,
            },
            TypeExpr::Named(qualified) => TypeResolution::Other(qualified.to_string()),
            TypeExpr::Composite(shape) => TypeResolution::Other(shape.clone()),
        }
    }
}

impl TypeLookup for Package {
    fn resolve_type(&self, name: &str) -> TypeResolution {
        self.resolve_local(name, 0)
    }
}
