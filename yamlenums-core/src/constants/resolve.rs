//! Value resolution for one enum type.
//!
//! ```text
//! entries ──► ConstGraph ──► evaluation order
//!    │                              │
//!    └─► targets (declared type == T)
//!                  │                │
//!   closure of targets ─────────────┴─► Evaluator ──► ValueTable
//! ```

use std::collections::HashMap;

use tracing::debug;

use crate::error::{YamlenumsError, YamlenumsResult};
use crate::syntax::TypeName;

use super::const_extractor::ConstEntry;
use super::const_graph::ConstGraph;
use super::eval::{convert, ConstValue, EvalScope, Evaluator};
use super::int_kind::{IntKind, TypeResolution};
use super::value_table::{AliasPolicy, ResolvedConstant, ValueTable};

/// Answers what a type name stands for in the package being processed.
pub trait TypeLookup {
    fn resolve_type(&self, name: &str) -> TypeResolution;
}

/// Evaluate every constant of `type_name` and collapse them into a table.
///
/// Only constants whose declared type (explicit, or repeated with an omitted
/// expression list) is `type_name` are members. Untyped constants are
/// evaluated when a member refers to them but never join the table, even
/// when their value is a conversion to `type_name`.
pub fn resolve_values(
    entries: &[ConstEntry],
    types: &dyn TypeLookup,
    type_name: &str,
    policy: AliasPolicy,
) -> YamlenumsResult<ValueTable> {
    let graph = ConstGraph::new(entries);
    let order = graph.evaluation_order()?;

    let kind = match types.resolve_type(type_name) {
        TypeResolution::Integer(kind) => kind,
        TypeResolution::Other(underlying) => {
            return Err(YamlenumsError::NonIntegerType {
                type_name: type_name.to_string(),
                underlying,
            });
        }
        TypeResolution::Undeclared => {
            return Err(YamlenumsError::TypeNotFound {
                type_name: type_name.to_string(),
            });
        }
    };

    let targets: Vec<usize> = (0..entries.len())
        .filter(|&i| entries[i].declared_type.as_ref().and_then(TypeName::local) == Some(type_name))
        .collect();
    if targets.is_empty() {
        return Err(YamlenumsError::TypeNotFound {
            type_name: type_name.to_string(),
        });
    }

    let needed = graph.closure(targets.iter().copied());
    debug!(
        type_name,
        targets = targets.len(),
        evaluated = needed.len(),
        "resolving constants"
    );

    let mut values: HashMap<usize, ConstValue> = HashMap::with_capacity(needed.len());
    for &i in order.iter().filter(|i| needed.contains(i)) {
        let entry = &entries[i];
        let value = {
            let scope = PassScope {
                graph: &graph,
                values: &values,
                types,
            };
            let raw = Evaluator::new(&scope, &entry.name, entry.iota).eval(&entry.expr)?;
            match entry.declared_type.as_ref().and_then(|t| integer_kind(types, t)) {
                Some(kind) => convert(&entry.name, raw.value, kind)?,
                None => raw,
            }
        };
        values.insert(i, value);
    }

    let resolved = targets
        .iter()
        .map(|&i| ResolvedConstant {
            name: entries[i].name.clone(),
            value: values.get(&i).map(|v| v.value).unwrap_or_default(),
            index: entries[i].index,
        })
        .collect();

    Ok(ValueTable::build(type_name, kind, resolved, policy))
}

fn integer_kind(types: &dyn TypeLookup, ty: &TypeName) -> Option<IntKind> {
    match types.resolve_type(ty.local()?) {
        TypeResolution::Integer(kind) => Some(kind),
        _ => None,
    }
}

struct PassScope<'s, 'g> {
    graph: &'s ConstGraph<'g>,
    values: &'s HashMap<usize, ConstValue>,
    types: &'s dyn TypeLookup,
}

impl EvalScope for PassScope<'_, '_> {
    fn constant(&self, name: &str) -> Option<ConstValue> {
        self.graph
            .lookup(name)
            .and_then(|i| self.values.get(&i).copied())
    }

    fn resolve_type(&self, name: &str) -> TypeResolution {
        self.types.resolve_type(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::extract_constants;
    use crate::syntax::parse_file;
    use std::path::Path;

    /// Types declared by the test package, plus Go's basic integer types.
    struct Types(Vec<(&'static str, TypeResolution)>);

    impl TypeLookup for Types {
        fn resolve_type(&self, name: &str) -> TypeResolution {
            if let Some((_, res)) = self.0.iter().find(|(n, _)| *n == name) {
                return res.clone();
            }
            IntKind::from_basic(name)
                .map(TypeResolution::Integer)
                .unwrap_or(TypeResolution::Undeclared)
        }
    }

    fn pill_types() -> Types {
        Types(vec![
            ("Pill", TypeResolution::Integer(IntKind::Int)),
            ("Flag", TypeResolution::Integer(IntKind::Uint8)),
            ("Color", TypeResolution::Other("string".into())),
        ])
    }

    fn resolve(src: &str, ty: &str, policy: AliasPolicy) -> YamlenumsResult<ValueTable> {
        let file = parse_file(Path::new("r.go"), src).unwrap();
        let entries = extract_constants(&[file]).unwrap();
        resolve_values(&entries, &pill_types(), ty, policy)
    }

    fn pairs(table: &ValueTable) -> Vec<(String, i128)> {
        table.pairs().map(|(n, v)| (n.to_string(), v)).collect()
    }

    const PILLS: &str = "package painkiller\n\
        const (\n\
        \tPlacebo Pill = iota\n\
        \tAspirin\n\
        \tIbuprofen\n\
        \tParacetamol\n\
        \tAcetaminophen = Paracetamol\n\
        )\n";

    #[test]
    fn test_pill_scenario() {
        let table = resolve(PILLS, "Pill", AliasPolicy::default()).unwrap();
        assert_eq!(
            pairs(&table),
            vec![
                ("Placebo".to_string(), 0),
                ("Aspirin".to_string(), 1),
                ("Ibuprofen".to_string(), 2),
                ("Paracetamol".to_string(), 3),
            ]
        );
        assert_eq!(table.kind, IntKind::Int);
    }

    #[test]
    fn test_pill_alias_with_expression_is_not_a_pill() {
        for policy in [AliasPolicy::Lexical, AliasPolicy::FirstDeclared] {
            let table = resolve(PILLS, "Pill", policy).unwrap();
            assert_eq!(table.name_of(3), Some("Paracetamol"));
            assert_eq!(table.value_of("Acetaminophen"), None);
            assert_eq!(table.len(), 4);
        }
    }

    #[test]
    fn test_first_declared_policy() {
        let src = "package p\nconst (\n\tZed Pill = 1\n\tAlpha Pill = 1\n)\n";
        let table = resolve(src, "Pill", AliasPolicy::FirstDeclared).unwrap();
        assert_eq!(pairs(&table), vec![("Zed".to_string(), 1)]);
    }

    #[test]
    fn test_untyped_constants_are_not_members() {
        let src = "package p\nconst (\n\tA Pill = iota\n\tB\n)\nconst Zz = 5\nconst C = B + Zz\nconst D = B\nconst Extra = Pill(9)\n";
        let table = resolve(src, "Pill", AliasPolicy::Lexical).unwrap();
        assert_eq!(
            pairs(&table),
            vec![("A".to_string(), 0), ("B".to_string(), 1)]
        );
        assert!(table.entries()[1].aliases.is_empty());
        for name in ["C", "D", "Extra", "Zz"] {
            assert_eq!(table.value_of(name), None);
        }
    }

    #[test]
    fn test_conversion_evaluated_for_members() {
        let src = "package p\nconst Base = 40\nconst Answer Pill = Pill(Base + 2)\n";
        let table = resolve(src, "Pill", AliasPolicy::Lexical).unwrap();
        assert_eq!(pairs(&table), vec![("Answer".to_string(), 42)]);
    }

    #[test]
    fn test_only_untyped_constants_means_type_not_found() {
        let src = "package p\nconst Extra = Pill(9)\n";
        assert!(matches!(
            resolve(src, "Pill", AliasPolicy::Lexical),
            Err(YamlenumsError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn test_typed_aliases_pick_lexical_name_by_default() {
        let src = "package p\nconst (\n\tZed Pill = 1\n\tAlpha Pill = 1\n\tMid Pill = 2\n)\n";
        let table = resolve(src, "Pill", AliasPolicy::default()).unwrap();
        assert_eq!(
            pairs(&table),
            vec![("Alpha".to_string(), 1), ("Mid".to_string(), 2)]
        );
        assert_eq!(table.entries()[0].aliases, vec!["Zed".to_string()]);
    }

    #[test]
    fn test_bit_flags() {
        let src = "package p\nconst (\n\tRead Flag = 1 << iota\n\tWrite\n\tExec\n\tAll Flag = Read | Write | Exec\n)\n";
        let table = resolve(src, "Flag", AliasPolicy::Lexical).unwrap();
        let values: Vec<i128> = table.pairs().map(|(_, v)| v).collect();
        assert_eq!(values, vec![1, 2, 4, 7]);
    }

    #[test]
    fn test_typed_overflow_is_an_error() {
        let src = "package p\nconst (\n\tA Flag = 128 << iota\n\tB\n)\n";
        let err = resolve(src, "Flag", AliasPolicy::FirstDeclared).unwrap_err();
        assert!(matches!(err, YamlenumsError::Overflow { ref name, .. } if name == "B"));
    }

    #[test]
    fn test_unrelated_broken_constant_is_ignored() {
        let src = "package p\nconst A Pill = 1\nconst Ratio = 1.5\n";
        assert!(resolve(src, "Pill", AliasPolicy::FirstDeclared).is_ok());
    }

    #[test]
    fn test_unsupported_target_names_the_entry() {
        let src = "package p\nconst A Pill = 1\nconst B Pill = len(\"xy\")\n";
        let err = resolve(src, "Pill", AliasPolicy::FirstDeclared).unwrap_err();
        assert!(matches!(err, YamlenumsError::UnsupportedExpression { ref name, .. } if name == "B"));
    }

    #[test]
    fn test_type_errors() {
        let src = "package p\nconst A Pill = 1\nconst Red Color = \"red\"\n";
        assert!(matches!(
            resolve(src, "Missing", AliasPolicy::FirstDeclared),
            Err(YamlenumsError::TypeNotFound { .. })
        ));
        assert!(matches!(
            resolve(src, "Color", AliasPolicy::FirstDeclared),
            Err(YamlenumsError::NonIntegerType { .. })
        ));
        // Declared integer type with no constants at all.
        assert!(matches!(
            resolve(src, "Flag", AliasPolicy::FirstDeclared),
            Err(YamlenumsError::TypeNotFound { .. })
        ));
    }

    #[test]
    fn test_forward_reference_across_groups() {
        let src = "package p\nconst Last Pill = First + 2\nconst First Pill = 10\n";
        let table = resolve(src, "Pill", AliasPolicy::FirstDeclared).unwrap();
        assert_eq!(
            pairs(&table),
            vec![("Last".to_string(), 12), ("First".to_string(), 10)]
        );
    }
}
