//! Dependency graph between package constants.
//!
//! Nodes are indices into the entry list; an edge `a -> b` means the
//! expression of `b` refers to `a`. A topological order therefore evaluates
//! every constant after the constants it depends on.
//!
//! Performance characteristics:
//! - Graph build: O(|C| + |R|) where C = constants, R = references
//! - Ordering and closure: O(|C| + |R|)

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;

use crate::error::{YamlenumsError, YamlenumsResult};

use super::const_extractor::ConstEntry;

pub struct ConstGraph<'a> {
    entries: &'a [ConstEntry],
    by_name: HashMap<&'a str, usize>,
    graph: DiGraphMap<usize, ()>,
}

impl<'a> ConstGraph<'a> {
    pub fn new(entries: &'a [ConstEntry]) -> Self {
        let by_name: HashMap<&str, usize> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.as_str(), i))
            .collect();

        let mut graph = DiGraphMap::with_capacity(entries.len(), entries.len());
        for i in 0..entries.len() {
            graph.add_node(i);
        }
        for (i, entry) in entries.iter().enumerate() {
            for name in entry.expr.referenced_idents() {
                if let Some(&dep) = by_name.get(name) {
                    graph.add_edge(dep, i, ());
                }
            }
        }

        Self {
            entries,
            by_name,
            graph,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Every constant, dependencies first.
    ///
    /// Ties are broken by declaration order so the result is stable.
    pub fn evaluation_order(&self) -> YamlenumsResult<Vec<usize>> {
        let order = toposort(&self.graph, None).map_err(|cycle| YamlenumsError::Cycle {
            name: self.entries[cycle.node_id()].name.clone(),
        })?;

        // Kahn's walk with a sorted frontier, for a stable order.
        let mut indegree: Vec<usize> = (0..self.entries.len())
            .map(|n| {
                self.graph
                    .neighbors_directed(n, Direction::Incoming)
                    .count()
            })
            .collect();
        let mut ready: BTreeSet<usize> =
            order.iter().copied().filter(|&n| indegree[n] == 0).collect();
        let mut out = Vec::with_capacity(order.len());
        while let Some(n) = ready.pop_first() {
            out.push(n);
            for next in self.graph.neighbors_directed(n, Direction::Outgoing) {
                indegree[next] -= 1;
                if indegree[next] == 0 {
                    ready.insert(next);
                }
            }
        }
        Ok(out)
    }

    /// The given constants plus everything they transitively depend on.
    pub fn closure(&self, roots: impl IntoIterator<Item = usize>) -> HashSet<usize> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        for root in roots {
            if visited.insert(root) {
                queue.push_back(root);
            }
        }
        while let Some(node) = queue.pop_front() {
            for dep in self.graph.neighbors_directed(node, Direction::Incoming) {
                if visited.insert(dep) {
                    queue.push_back(dep);
                }
            }
        }
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::extract_constants;
    use crate::syntax::parse_file;
    use std::path::Path;

    fn entries(src: &str) -> Vec<ConstEntry> {
        let file = parse_file(Path::new("g.go"), src).unwrap();
        extract_constants(&[file]).unwrap()
    }

    fn names(entries: &[ConstEntry], order: &[usize]) -> Vec<String> {
        order.iter().map(|&i| entries[i].name.clone()).collect()
    }

    #[test]
    fn test_forward_reference_evaluated_first() {
        let es = entries("package p\nconst (\n\tA = B + 1\n\tC = 3\n\tB = C * 2\n)\n");
        let graph = ConstGraph::new(&es);
        let order = graph.evaluation_order().unwrap();
        assert_eq!(names(&es, &order), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_independent_constants_keep_declaration_order() {
        let es = entries("package p\nconst (\n\tX = 1\n\tY = 2\n\tZ = 3\n)\n");
        let order = ConstGraph::new(&es).evaluation_order().unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_is_reported() {
        let es = entries("package p\nconst (\n\tA = B\n\tB = A\n)\n");
        let err = ConstGraph::new(&es).evaluation_order().unwrap_err();
        assert!(matches!(err, YamlenumsError::Cycle { .. }));
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let es = entries("package p\nconst A = A + 1\n");
        let err = ConstGraph::new(&es).evaluation_order().unwrap_err();
        assert!(err.to_string().contains("constant A"));
    }

    #[test]
    fn test_closure_follows_dependencies_only() {
        let es = entries("package p\nconst (\n\tBase = 10\n\tA = Base + 1\n\tOther = 5\n)\n");
        let graph = ConstGraph::new(&es);
        let a = graph.lookup("A").unwrap();
        let closure = graph.closure([a]);
        assert!(closure.contains(&graph.lookup("Base").unwrap()));
        assert!(!closure.contains(&graph.lookup("Other").unwrap()));
        assert_eq!(closure.len(), 2);
    }
}
