//! Graphviz rendering of a QMDD.

use std::collections::BTreeMap;

use hashbrown::HashSet;

use crate::edge::Edge;
use crate::qmdd::Qmdd;
use crate::types::{NodeId, WeightId};

impl Qmdd {
    /// Render the diagram reachable from `root` as a Graphviz `digraph`.
    ///
    /// Internal nodes are labelled with their variable's name, the terminal
    /// with `1`; each internal node shows its four outgoing edges labelled
    /// with the pretty-printed weight, zero edges dotted. A separate stub
    /// carries the root weight.
    pub fn to_dot(&self, root: Edge, names: &[String]) -> Result<String, std::fmt::Error> {
        use std::fmt::Write as _;

        assert_eq!(
            names.len(),
            self.num_vars() as usize,
            "one name per variable is required"
        );

        let mut dot = String::new();
        writeln!(dot, "digraph qmdd {{")?;
        writeln!(dot, "node [shape=circle, fixedsize=true];")?;

        // Terminal
        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "{} [shape=square, label=\"1\"];", self.terminal().index())?;
        writeln!(dot, "}}")?;

        let nodes = self.reachable(root);

        // Nodes per level
        let mut levels = BTreeMap::<u32, Vec<NodeId>>::new();
        for &id in nodes.iter() {
            if self.is_terminal(id) {
                continue;
            }
            levels.entry(self.node_level(id)).or_default().push(id);
        }
        for (&level, ids) in levels.iter() {
            writeln!(dot, "{{ rank=same")?;
            for &id in ids.iter() {
                writeln!(dot, "{} [label=\"{}\"];", id.index(), names[level as usize])?;
            }
            writeln!(dot, "}}")?;
        }

        // Edges
        for &id in nodes.iter() {
            if self.is_terminal(id) {
                continue;
            }
            let children = self.node_children(id);
            let weights = self.node_weights(id);
            for i in 0..4 {
                let style = if weights[i] == WeightId::ZERO {
                    ", style=dotted"
                } else {
                    ""
                };
                writeln!(
                    dot,
                    "{} -> {} [label=\"{}\"{}];",
                    id.index(),
                    children[i].index(),
                    self.weight_value(weights[i]),
                    style
                )?;
            }
        }

        // Root stub
        writeln!(dot, "{{ rank=source")?;
        writeln!(
            dot,
            "r [shape=rect, label=\"{}\"];",
            self.weight_value(root.weight)
        )?;
        writeln!(dot, "}}")?;
        writeln!(dot, "r -> {};", root.node.index())?;

        writeln!(dot, "}}")?;
        Ok(dot)
    }

    /// All nodes reachable from `root`, terminal included.
    pub fn reachable(&self, root: Edge) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut stack = vec![root.node];
        let mut order = Vec::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            if !self.is_terminal(id) {
                for child in self.node_children(id) {
                    stack.push(child);
                }
            }
        }

        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::Primitive;

    #[test]
    fn test_reachable_counts() {
        let mut dd = Qmdd::new(2);
        let cnot = dd.gate_matrix(Primitive::Not, &[0], 1);
        // Root node, identity-on-b, X-on-b, terminal.
        assert_eq!(dd.reachable(cnot).len(), 4);
    }

    #[test]
    fn test_dot_output_shape() {
        let mut dd = Qmdd::new(2);
        let cnot = dd.gate_matrix(Primitive::Not, &[0], 1);
        let names = vec!["a".to_string(), "b".to_string()];
        let dot = dd.to_dot(cnot, &names).unwrap();
        assert!(dot.starts_with("digraph qmdd {"));
        assert!(dot.contains("label=\"a\""));
        assert!(dot.contains("label=\"b\""));
        assert!(dot.contains("shape=square, label=\"1\""));
        assert!(dot.trim_end().ends_with('}'));
    }
}
