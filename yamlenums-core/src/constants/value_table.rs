//! Canonical value tables: one name per distinct value of an enum type.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::int_kind::IntKind;

/// How a canonical name is picked when several constants share a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AliasPolicy {
    /// The lexicographically smallest name wins, whatever the order.
    #[default]
    #[serde(rename = "lexical")]
    Lexical,
    /// The name declared first in the package wins.
    #[serde(rename = "first")]
    FirstDeclared,
}

impl AliasPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lexical => "lexical",
            Self::FirstDeclared => "first",
        }
    }
}

impl fmt::Display for AliasPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AliasPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lexical" => Ok(Self::Lexical),
            "first" => Ok(Self::FirstDeclared),
            other => Err(format!(
                "unknown alias policy '{}' (expected 'lexical' or 'first')",
                other
            )),
        }
    }
}

/// A constant of the requested type with its final value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConstant {
    pub name: String,
    pub value: i128,
    /// Package-wide declaration index
    pub index: usize,
}

/// One distinct value and the name chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueEntry {
    pub name: String,
    pub value: i128,
    /// Other names sharing the value, in declaration order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Value table for a single enum type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueTable {
    pub type_name: String,
    pub kind: IntKind,
    entries: Vec<ValueEntry>,
}

impl ValueTable {
    /// Collapse resolved constants into one entry per value.
    ///
    /// Entries are ordered by the first declaration of each value; the
    /// canonical name follows `policy`.
    pub fn build(
        type_name: impl Into<String>,
        kind: IntKind,
        mut constants: Vec<ResolvedConstant>,
        policy: AliasPolicy,
    ) -> Self {
        constants.sort_by_key(|c| c.index);

        let mut slot_of: HashMap<i128, usize> = HashMap::new();
        let mut groups: Vec<(i128, Vec<String>)> = Vec::new();
        for c in constants {
            match slot_of.get(&c.value) {
                Some(&slot) => groups[slot].1.push(c.name),
                None => {
                    slot_of.insert(c.value, groups.len());
                    groups.push((c.value, vec![c.name]));
                }
            }
        }

        let entries = groups
            .into_iter()
            .map(|(value, mut names)| {
                let pick = match policy {
                    AliasPolicy::FirstDeclared => 0,
                    AliasPolicy::Lexical => names
                        .iter()
                        .enumerate()
                        .min_by(|a, b| a.1.cmp(b.1))
                        .map(|(i, _)| i)
                        .unwrap_or(0),
                };
                let name = names.remove(pick);
                ValueEntry {
                    name,
                    value,
                    aliases: names,
                }
            })
            .collect();

        Self {
            type_name: type_name.into(),
            kind,
            entries,
        }
    }

    pub fn entries(&self) -> &[ValueEntry] {
        &self.entries
    }

    /// `(canonical name, value)` pairs in output order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, i128)> + '_ {
        self.entries.iter().map(|e| (e.name.as_str(), e.value))
    }

    pub fn name_of(&self, value: i128) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.value == value)
            .map(|e| e.name.as_str())
    }

    /// Value of a canonical name. Aliases that lost the election are not
    /// names the generated code accepts.
    pub fn value_of(&self, name: &str) -> Option<i128> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(items: &[(&str, i128)]) -> Vec<ResolvedConstant> {
        items
            .iter()
            .enumerate()
            .map(|(index, (name, value))| ResolvedConstant {
                name: name.to_string(),
                value: *value,
                index,
            })
            .collect()
    }

    fn pills() -> Vec<ResolvedConstant> {
        resolved(&[
            ("Placebo", 0),
            ("Aspirin", 1),
            ("Ibuprofen", 2),
            ("Paracetamol", 3),
            ("Acetaminophen", 3),
        ])
    }

    #[test]
    fn test_first_declared_keeps_earliest_name() {
        let table = ValueTable::build("Pill", IntKind::Int, pills(), AliasPolicy::FirstDeclared);
        let pairs: Vec<_> = table.pairs().collect();
        assert_eq!(
            pairs,
            vec![("Placebo", 0), ("Aspirin", 1), ("Ibuprofen", 2), ("Paracetamol", 3)]
        );
        assert_eq!(table.entries()[3].aliases, vec!["Acetaminophen".to_string()]);
    }

    #[test]
    fn test_lexical_picks_smallest_name() {
        let table = ValueTable::build("Pill", IntKind::Int, pills(), AliasPolicy::Lexical);
        assert_eq!(table.name_of(3), Some("Acetaminophen"));
        assert_eq!(table.entries()[3].aliases, vec!["Paracetamol".to_string()]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_order_follows_first_declaration_of_value() {
        // Input order is shuffled; the index decides.
        let mut items = resolved(&[("B", 5), ("A", 1), ("C", 5), ("D", 0)]);
        items.reverse();
        let table = ValueTable::build("T", IntKind::Uint8, items, AliasPolicy::Lexical);
        let pairs: Vec<_> = table.pairs().collect();
        assert_eq!(pairs, vec![("B", 5), ("A", 1), ("D", 0)]);
    }

    #[test]
    fn test_value_of_ignores_losing_aliases() {
        let table = ValueTable::build("Pill", IntKind::Int, pills(), AliasPolicy::FirstDeclared);
        assert_eq!(table.value_of("Paracetamol"), Some(3));
        assert_eq!(table.value_of("Acetaminophen"), None);
        assert_eq!(table.value_of("Unknown"), None);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("first".parse::<AliasPolicy>(), Ok(AliasPolicy::FirstDeclared));
        assert_eq!("lexical".parse::<AliasPolicy>(), Ok(AliasPolicy::Lexical));
        assert!("alphabetic".parse::<AliasPolicy>().is_err());
        assert_eq!(AliasPolicy::default(), AliasPolicy::Lexical);
    }

    #[test]
    fn test_empty_table() {
        let table = ValueTable::build("T", IntKind::Int, Vec::new(), AliasPolicy::Lexical);
        assert!(table.is_empty());
        assert_eq!(table.name_of(0), None);
    }
}
