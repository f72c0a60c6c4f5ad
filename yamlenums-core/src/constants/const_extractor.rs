//! Flatten parsed `const` declarations into per-name entries.
//!
//! Applies Go's const-block elision rule: a spec without an expression list
//! repeats the type and expression list of the nearest preceding spec in its
//! group that had an expression list, evaluated with its own `iota`. A spec
//! that has an expression list but no type is untyped, whatever precedes it.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::{YamlenumsError, YamlenumsResult};
use crate::syntax::{Expr, Pos, SourceFile, TypeName};

/// One named constant with everything needed to evaluate it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstEntry {
    /// Name of the constant
    pub name: String,
    /// Source file path
    pub file: PathBuf,
    /// Position of the name in the file
    pub pos: Pos,
    /// Explicit type, or the type repeated with an omitted expression list
    pub declared_type: Option<TypeName>,
    /// Value expression after implicit repetition
    pub expr: Expr,
    /// Position of the spec inside its group
    pub iota: u32,
    /// Package-wide declaration order
    pub index: usize,
}

/// Extract every non-blank constant from the files of one package, in
/// declaration order (files in the given order, then source order).
pub fn extract_constants(files: &[SourceFile]) -> YamlenumsResult<Vec<ConstEntry>> {
    let mut entries = Vec::with_capacity(32);
    let mut seen: HashMap<String, (PathBuf, Pos)> = HashMap::new();

    for file in files {
        for decl in &file.consts {
            let mut repeated: Option<(Option<&TypeName>, &[Expr])> = None;

            for spec in &decl.specs {
                if !spec.values.is_empty() {
                    repeated = Some((spec.ty.as_ref(), spec.values.as_slice()));
                }

                let first = &spec.names[0];
                let (ty, values) = repeated.ok_or_else(|| {
                    YamlenumsError::parse_at(
                        &file.path,
                        "missing init expr for const declaration",
                        first.pos.line,
                        first.pos.column,
                    )
                })?;
                if values.len() != spec.names.len() {
                    let message = if values.len() < spec.names.len() {
                        "missing init expr for const declaration"
                    } else {
                        "extra init expr"
                    };
                    return Err(YamlenumsError::parse_at(
                        &file.path,
                        message,
                        first.pos.line,
                        first.pos.column,
                    ));
                }

                for (ident, expr) in spec.names.iter().zip(values) {
                    if ident.is_blank() {
                        continue;
                    }
                    if let Some((prev_file, prev_pos)) = seen.get(&ident.name) {
                        return Err(YamlenumsError::parse_at(
                            &file.path,
                            format!(
                                "{} redeclared in this block (previous declaration at {}:{})",
                                ident.name,
                                prev_file.display(),
                                prev_pos
                            ),
                            ident.pos.line,
                            ident.pos.column,
                        ));
                    }
                    seen.insert(ident.name.clone(), (file.path.clone(), ident.pos));

                    entries.push(ConstEntry {
                        name: ident.name.clone(),
                        file: file.path.clone(),
                        pos: ident.pos,
                        declared_type: ty.cloned(),
                        expr: expr.clone(),
                        iota: spec.iota,
                        index: entries.len(),
                    });
                }
            }
        }
    }

    Ok(entries)
}
