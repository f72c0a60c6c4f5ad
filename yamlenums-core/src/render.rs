//! Go source generation for YAML marshalling of enum types.
//!
//! The output is built with `std::fmt::Write` into a pre-allocated buffer
//! and is already laid out the way gofmt would print it (tabs, aligned
//! map literals), so the formatter pass is a no-op in the common case.

use std::fmt::Write;

use serde::Serialize;

use crate::constants::ValueTable;
use crate::error::{YamlenumsError, YamlenumsResult};

/// One constant name to emit. The value is informational only: generated
/// code refers to constants by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: i128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeValues {
    pub type_name: String,
    pub values: Vec<NamedValue>,
}

impl From<&ValueTable> for TypeValues {
    fn from(table: &ValueTable) -> Self {
        Self {
            type_name: table.type_name.clone(),
            values: table
                .pairs()
                .map(|(name, value)| NamedValue {
                    name: name.to_string(),
                    value,
                })
                .collect(),
        }
    }
}

/// Everything a renderer needs to produce one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderContext {
    /// Command-line arguments, space separated, for the header
    pub command: String,
    pub package_name: String,
    pub types_and_values: Vec<TypeValues>,
}

/// Turns a render context into source text.
pub trait SourceRenderer {
    fn render(&self, ctx: &RenderContext) -> YamlenumsResult<String>;
}

/// The built-in Go template.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoTemplate;

impl SourceRenderer for GoTemplate {
    fn render(&self, ctx: &RenderContext) -> YamlenumsResult<String> {
        // ~1.5 KiB of fixed text per type plus ~120 bytes per constant
        let constants: usize = ctx.types_and_values.iter().map(|t| t.values.len()).sum();
        let mut out = String::with_capacity(256 + ctx.types_and_values.len() * 1536 + constants * 120);

        write_file(&mut out, ctx).map_err(|e| YamlenumsError::Format {
            message: format!("rendering {}: {}", ctx.package_name, e),
        })?;
        Ok(out)
    }
}

fn write_file(out: &mut String, ctx: &RenderContext) -> std::fmt::Result {
    writeln!(
        out,
        "// Code generated by \"yamlenums {}\"; DO NOT EDIT.",
        ctx.command
    )?;
    writeln!(out)?;
    writeln!(out, "package {}", ctx.package_name)?;
    writeln!(out)?;
    writeln!(out, "import (")?;
    writeln!(out, "\t\"fmt\"")?;
    writeln!(out)?;
    writeln!(out, "\t\"gopkg.in/yaml.v3\"")?;
    writeln!(out, ")")?;

    for tv in &ctx.types_and_values {
        writeln!(out)?;
        write_type(out, tv)?;
    }
    Ok(())
}

fn write_type(out: &mut String, tv: &TypeValues) -> std::fmt::Result {
    let t = tv.type_name.as_str();
    let names: Vec<&str> = tv.values.iter().map(|v| v.name.as_str()).collect();

    writeln!(out, "var (")?;
    writeln!(out, "\t_{}NameToValue = map[string]{}{{", t, t)?;
    let quoted: Vec<String> = names.iter().map(|n| format!("\"{}\"", n)).collect();
    write_aligned(out, "\t\t", quoted.iter().map(String::as_str).zip(names.iter().copied()))?;
    writeln!(out, "\t}}")?;
    writeln!(out)?;
    writeln!(out, "\t_{}ValueToName = map[{}]string{{", t, t)?;
    write_aligned(out, "\t\t", names.iter().copied().zip(quoted.iter().map(String::as_str)))?;
    writeln!(out, "\t}}")?;
    writeln!(out, ")")?;
    writeln!(out)?;

    writeln!(out, "func init() {{")?;
    writeln!(out, "\tvar v {}", t)?;
    writeln!(out, "\tif _, ok := interface{{}}(v).(fmt.Stringer); ok {{")?;
    writeln!(out, "\t\t_{}NameToValue = map[string]{}{{", t, t)?;
    let stringers: Vec<String> = names
        .iter()
        .map(|n| format!("interface{{}}({}).(fmt.Stringer).String()", n))
        .collect();
    write_aligned(out, "\t\t\t", stringers.iter().map(String::as_str).zip(names.iter().copied()))?;
    writeln!(out, "\t\t}}")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "// MarshalYAML is generated so {} satisfies yaml.Marshaler.", t)?;
    writeln!(out, "func (r {}) MarshalYAML() (interface{{}}, error) {{", t)?;
    writeln!(out, "\tif s, ok := interface{{}}(r).(fmt.Stringer); ok {{")?;
    writeln!(out, "\t\treturn s.String(), nil")?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\ts, ok := _{}ValueToName[r]", t)?;
    writeln!(out, "\tif !ok {{")?;
    writeln!(out, "\t\treturn nil, fmt.Errorf(\"invalid {}: %d\", r)", t)?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\treturn s, nil")?;
    writeln!(out, "}}")?;
    writeln!(out)?;

    writeln!(out, "// UnmarshalYAML is generated so {} satisfies yaml.Unmarshaler.", t)?;
    writeln!(out, "func (r *{}) UnmarshalYAML(value *yaml.Node) error {{", t)?;
    writeln!(out, "\tvar s string")?;
    writeln!(out, "\tif err := value.Decode(&s); err != nil {{")?;
    writeln!(out, "\t\treturn fmt.Errorf(\"{} should be a string, got %s\", value.Value)", t)?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\tv, ok := _{}NameToValue[s]", t)?;
    writeln!(out, "\tif !ok {{")?;
    writeln!(out, "\t\treturn fmt.Errorf(\"invalid {} %q\", s)", t)?;
    writeln!(out, "\t}}")?;
    writeln!(out, "\t*r = v")?;
    writeln!(out, "\treturn nil")?;
    writeln!(out, "}}")?;
    Ok(())
}

/// Key/value lines of a map literal, values aligned one space past the
/// longest `key:`.
fn write_aligned<'a>(
    out: &mut String,
    indent: &str,
    pairs: impl Iterator<Item = (&'a str, &'a str)> + Clone,
) -> std::fmt::Result {
    let width = pairs.clone().map(|(k, _)| k.chars().count()).max().unwrap_or(0) + 1;
    for (key, value) in pairs {
        let label = format!("{}:", key);
        writeln!(out, "{}{:<width$} {},", indent, label, value, width = width)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pill_context() -> RenderContext {
        let values = [("Placebo", 0), ("Aspirin", 1), ("Ibuprofen", 2), ("Paracetamol", 3)]
            .iter()
            .map(|(n, v)| NamedValue {
                name: n.to_string(),
                value: *v,
            })
            .collect();
        RenderContext {
            command: "-type=Pill".into(),
            package_name: "painkiller".into(),
            types_and_values: vec![TypeValues {
                type_name: "Pill".into(),
                values,
            }],
        }
    }

    #[test]
    fn test_header_and_package() {
        let src = GoTemplate.render(&pill_context()).unwrap();
        assert!(src.starts_with(
            "// Code generated by \"yamlenums -type=Pill\"; DO NOT EDIT.\n\npackage painkiller\n"
        ));
        assert!(src.contains("\t\"gopkg.in/yaml.v3\"\n"));
    }

    #[test]
    fn test_maps_are_aligned() {
        let src = GoTemplate.render(&pill_context()).unwrap();
        assert!(src.contains("\t\t\"Placebo\":     Placebo,\n"));
        assert!(src.contains("\t\t\"Paracetamol\": Paracetamol,\n"));
        assert!(src.contains("\t\tPlacebo:     \"Placebo\",\n"));
        assert!(src.contains("\t\tParacetamol: \"Paracetamol\",\n"));
    }

    #[test]
    fn test_methods_present() {
        let src = GoTemplate.render(&pill_context()).unwrap();
        assert!(src.contains("func (r Pill) MarshalYAML() (interface{}, error) {"));
        assert!(src.contains("func (r *Pill) UnmarshalYAML(value *yaml.Node) error {"));
        assert!(src.contains("fmt.Errorf(\"invalid Pill: %d\", r)"));
        assert!(src.contains("fmt.Errorf(\"invalid Pill %q\", s)"));
        assert!(src.contains("interface{}(Paracetamol).(fmt.Stringer).String(): Paracetamol,"));
        assert!(src.contains("interface{}(Aspirin).(fmt.Stringer).String():     Aspirin,"));
    }

    #[test]
    fn test_each_name_emitted_once_per_map() {
        let src = GoTemplate.render(&pill_context()).unwrap();
        assert_eq!(src.matches("\"Aspirin\":").count(), 1);
        assert!(!src.contains("Acetaminophen"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let ctx = pill_context();
        assert_eq!(GoTemplate.render(&ctx).unwrap(), GoTemplate.render(&ctx).unwrap());
    }
}
