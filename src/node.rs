use crate::types::{NodeId, WeightId};

/// A QMDD node: one level of the block decomposition of a matrix.
///
/// # Fields
///
/// - `level`: position in the variable order (0 is topmost; the terminal
///   sits at `num_vars`)
/// - `children`: the four quadrant targets, row-major `[00, 01, 10, 11]`
/// - `weights`: the four outgoing edge weights, same order
///
/// # Structure
///
/// Each node represents a 2×2 block decomposition:
///
/// ```text
/// M = [ w00·M00  w01·M01 ]
///     [ w10·M10  w11·M11 ]
/// ```
///
/// A live node is always canonical: its weight vector is normalized (the
/// first non-zero weight is 1) and its four edges are not all identical.
/// The terminal node points at itself in all four slots with weight 1,
/// which lets the recursion base cases avoid branching.
#[derive(Debug, Copy, Clone)]
pub struct Node {
    pub level: u32,
    pub children: [NodeId; 4],
    pub weights: [WeightId; 4],
    /// Precomputed content hash for fast table probing.
    hash: u64,
}

impl Node {
    pub fn new(level: u32, children: [NodeId; 4], weights: [WeightId; 4]) -> Self {
        // Cheap wrapping sum over the numeric components; the unique table
        // masks it down to its size.
        let mut hash = level as u64;
        for c in &children {
            hash = hash.wrapping_add(c.index() as u64);
        }
        for w in &weights {
            hash = hash.wrapping_add(w.index() as u64);
        }
        Self {
            level,
            children,
            weights,
            hash,
        }
    }

    /// The content hash computed at construction.
    pub fn hash(&self) -> u64 {
        self.hash
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.level == other.level
            && self.children == other.children
            && self.weights == other.weights
    }
}

impl Eq for Node {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_content_equal_hash() {
        let c = [NodeId::new(0); 4];
        let w = [
            WeightId::ONE,
            WeightId::ZERO,
            WeightId::ZERO,
            WeightId::ONE,
        ];
        let a = Node::new(1, c, w);
        let b = Node::new(1, c, w);
        assert_eq!(a, b);
        assert_eq!(a.hash(), b.hash());
    }

    #[test]
    fn test_distinct_content() {
        let c = [NodeId::new(0); 4];
        let a = Node::new(0, c, [WeightId::ONE; 4]);
        let b = Node::new(1, c, [WeightId::ONE; 4]);
        assert_ne!(a, b);
    }
}
