//! Type-safe handles for nodes and weights.
//!
//! All cross-component references in the engine are small integer handles:
//! a [`NodeId`] indexes the node arena, a [`WeightId`] indexes the weight
//! table. Handles are stable for the lifetime of the engine, since the arena and
//! the weight table are append-only.

use std::fmt;

/// A handle to an interned node in the arena.
///
/// # Invariants
///
/// - Handle 0 is the terminal node (allocated first at engine startup).
/// - A handle, once minted, permanently denotes the same node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Sentinel for empty hash-table and cache slots. Never a live node.
    pub const INVALID: Self = NodeId(u32::MAX);

    pub const fn new(id: u32) -> Self {
        NodeId(id)
    }

    /// Returns the raw arena index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// A handle to an interned weight value.
///
/// Two handles are reserved: [`WeightId::ZERO`] for the value 0 and
/// [`WeightId::ONE`] for the value 1. Two equal values always share one
/// handle, so handle equality is value equality.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct WeightId(u32);

impl WeightId {
    /// The weight 0.
    pub const ZERO: Self = WeightId(0);
    /// The weight 1.
    pub const ONE: Self = WeightId(1);
    /// Sentinel for empty cache slots. Never minted by the weight table.
    pub const INVALID: Self = WeightId(u32::MAX);

    pub const fn new(id: u32) -> Self {
        WeightId(id)
    }

    /// Returns the raw table index.
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for WeightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let n = NodeId::new(7);
        assert_eq!(n.index(), 7);
        assert_eq!(n.to_string(), "n7");
        assert_ne!(n, NodeId::INVALID);
    }

    #[test]
    fn test_weight_sentinels() {
        assert_eq!(WeightId::ZERO.index(), 0);
        assert_eq!(WeightId::ONE.index(), 1);
        assert_ne!(WeightId::ZERO, WeightId::ONE);
        assert_eq!(WeightId::new(1), WeightId::ONE);
    }
}
