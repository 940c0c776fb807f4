//! The unique node table: arena storage plus content-keyed lookup.
//!
//! Every node lives in a single monotone arena of fixed capacity; nodes are
//! never freed, so arena indices ([`NodeId`]s) stay valid for the life of
//! the engine. An open-addressed hash table of handles, sized equal to the
//! arena, resolves lookup by content: the table can therefore never
//! overflow before the arena does, and arena exhaustion is the one hard
//! capacity bound.

use crate::node::Node;
use crate::types::{NodeId, WeightId};

pub struct UniqueTable {
    /// Node arena; a `NodeId` is an index into this pool.
    pool: Vec<Node>,
    /// Open-addressed table of handles, `INVALID` marks an empty slot.
    table: Vec<NodeId>,
    capacity: usize,
    bitmask: u64,
    terminal: NodeId,
}

impl UniqueTable {
    /// Create a table with a `2^bits`-slot arena and install the terminal
    /// node at level `num_vars`, its four child slots referencing itself
    /// with weight 1.
    pub fn new(bits: usize, num_vars: u32) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let capacity = 1 << bits;
        let terminal = NodeId::new(0);
        let mut pool = Vec::with_capacity(capacity);
        pool.push(Node::new(num_vars, [terminal; 4], [WeightId::ONE; 4]));

        Self {
            pool,
            table: vec![NodeId::INVALID; capacity],
            capacity,
            bitmask: (capacity - 1) as u64,
            terminal,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live nodes, terminal included.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn terminal(&self) -> NodeId {
        self.terminal
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.pool[id.index()]
    }

    pub fn level(&self, id: NodeId) -> u32 {
        self.node(id).level
    }

    pub fn child(&self, id: NodeId, i: usize) -> NodeId {
        self.node(id).children[i]
    }

    pub fn weight(&self, id: NodeId, i: usize) -> WeightId {
        self.node(id).weights[i]
    }

    pub fn children(&self, id: NodeId) -> [NodeId; 4] {
        self.node(id).children
    }

    pub fn weights(&self, id: NodeId) -> [WeightId; 4] {
        self.node(id).weights
    }

    /// Look up a node by content, inserting it on a miss.
    ///
    /// Probes linearly from the content hash until an equal node or an
    /// empty slot is found. The caller is responsible for canonicity (no
    /// redundant nodes, normalized weights); the table only deduplicates.
    pub fn put(&mut self, node: Node) -> NodeId {
        let mut p = (node.hash() & self.bitmask) as usize;

        loop {
            let slot = self.table[p];
            if slot == NodeId::INVALID {
                let id = self.alloc(node);
                self.table[p] = id;
                return id;
            }
            if *self.node(slot) == node {
                // The node already exists.
                return slot;
            }
            p = (p + 1) & self.bitmask as usize;
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if self.pool.len() >= self.capacity {
            panic!("node arena is full");
        }
        let id = NodeId::new(self.pool.len() as u32);
        self.pool.push(node);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some_node(level: u32, seed: u32) -> Node {
        Node::new(
            level,
            [NodeId::new(0); 4],
            [
                WeightId::ONE,
                WeightId::new(seed),
                WeightId::ZERO,
                WeightId::ZERO,
            ],
        )
    }

    #[test]
    fn test_terminal_installed_first() {
        let table = UniqueTable::new(4, 3);
        let t = table.terminal();
        assert_eq!(t.index(), 0);
        assert_eq!(table.level(t), 3);
        assert_eq!(table.children(t), [t; 4]);
        assert_eq!(table.weights(t), [WeightId::ONE; 4]);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_put_dedup() {
        let mut table = UniqueTable::new(4, 2);
        let a = table.put(some_node(0, 2));
        let b = table.put(some_node(0, 2));
        let c = table.put(some_node(1, 2));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_probe_past_collisions() {
        // 8 slots; sum-based hashes collide easily, every node must still
        // get its own handle.
        let mut table = UniqueTable::new(3, 2);
        let ids: Vec<_> = (2..8).map(|s| table.put(some_node(0, s))).collect();
        for (i, &id) in ids.iter().enumerate() {
            for &other in &ids[i + 1..] {
                assert_ne!(id, other);
            }
            assert_eq!(table.put(some_node(0, i as u32 + 2)), id);
        }
    }

    #[test]
    #[should_panic(expected = "node arena is full")]
    fn test_arena_exhaustion() {
        let mut table = UniqueTable::new(2, 2);
        for s in 0..4 {
            table.put(some_node(0, s + 2));
        }
    }
}
