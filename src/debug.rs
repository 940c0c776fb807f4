//! Inspection helpers: structure dumps and exact matrix expansion.
//!
//! These are primarily useful in tests: the matrix expansion turns an edge
//! back into the full 2ⁿ×2ⁿ array of exact values it denotes, which is the
//! ground truth every canonical-form shortcut must agree with. Expansion is
//! exponential in the number of variables, so keep it to small circuits.

use std::fmt::Write;

use crate::edge::Edge;
use crate::qmdd::Qmdd;
use crate::types::NodeId;
use crate::value::Value;

impl Qmdd {
    /// The full 2ⁿ×2ⁿ matrix denoted by an edge, row-major.
    pub fn matrix(&self, e: Edge) -> Vec<Vec<Value>> {
        self.matrix_from(e, 0)
    }

    /// The matrix denoted by an edge over the variable suffix
    /// `level .. num_vars`.
    pub fn matrix_from(&self, e: Edge, level: u32) -> Vec<Vec<Value>> {
        self.expand(self.weight_value(e.weight), e.node, level)
    }

    fn expand(&self, weight: Value, node: NodeId, level: u32) -> Vec<Vec<Value>> {
        if level == self.num_vars() {
            return vec![vec![weight]];
        }

        let quadrant = |i: usize| -> (Value, NodeId) {
            if self.node_level(node) == level {
                let w = self.weight_value(self.node_weights(node)[i]);
                (weight * w, self.node_children(node)[i])
            } else {
                // A skipped level repeats the whole sub-matrix in all four
                // quadrants.
                (weight, node)
            }
        };

        let blocks: Vec<Vec<Vec<Value>>> = (0..4)
            .map(|i| {
                let (w, child) = quadrant(i);
                self.expand(w, child, level + 1)
            })
            .collect();

        let half = blocks[0].len();
        let mut rows = Vec::with_capacity(2 * half);
        for r in 0..half {
            let mut row = blocks[0][r].clone();
            row.extend_from_slice(&blocks[1][r]);
            rows.push(row);
        }
        for r in 0..half {
            let mut row = blocks[2][r].clone();
            row.extend_from_slice(&blocks[3][r]);
            rows.push(row);
        }
        rows
    }

    /// A compact listing of the diagram reachable from `root`.
    pub fn debug_string(&self, root: Edge) -> String {
        let mut out = String::new();
        let nodes = self.reachable(root);
        writeln!(&mut out, "qmdd {} ({} nodes):", root, nodes.len()).unwrap();
        for &id in nodes.iter() {
            if self.is_terminal(id) {
                writeln!(&mut out, "  {} = terminal", id).unwrap();
                continue;
            }
            let children = self.node_children(id);
            let weights = self.node_weights(id);
            write!(&mut out, "  {} = (level {};", id, self.node_level(id)).unwrap();
            for i in 0..4 {
                write!(
                    &mut out,
                    " {}·{}",
                    self.weight_value(weights[i]),
                    children[i]
                )
                .unwrap();
            }
            writeln!(&mut out, ")").unwrap();
        }
        out
    }
}
