//! The QMDD manager and its recursive matrix operators.
//!
//! A [`Qmdd`] owns everything: the weight table, the node arena with its
//! unique table, both operation caches, and the identity-subtree cache.
//! All operations go through the manager, which is what enforces the
//! canonical form: two sub-circuits computing the same matrix always end up
//! as the same `(weight, node)` pair.
//!
//! The three edge operators [`add`](Qmdd::add), [`mul`](Qmdd::mul), and
//! [`kro`](Qmdd::kro) recurse over the four matrix quadrants of their
//! operands, memoizing every non-base result in the edge cache. Scalar
//! arithmetic goes through [`apply_value`](Qmdd::apply_value), which
//! memoizes in the weight cache. Node construction goes through
//! [`mk_node`](Qmdd::mk_node), which normalizes the weight vector, drops
//! redundant nodes, and deduplicates through the unique table.

use log::debug;

use crate::cache::{EdgeOp, EdgeOpCache, ValOp, ValOpCache};
use crate::edge::Edge;
use crate::gate::Primitive;
use crate::node::Node;
use crate::table::UniqueTable;
use crate::types::{NodeId, WeightId};
use crate::value::Value;
use crate::weight::WeightTable;

/// Default arena size: 2^20 node slots.
pub const DEFAULT_STORAGE_BITS: usize = 20;
/// Default operation cache size: 2^10 slots each.
pub const DEFAULT_CACHE_BITS: usize = 10;

pub struct Qmdd {
    num_vars: u32,
    weights: WeightTable,
    table: UniqueTable,
    edge_cache: EdgeOpCache,
    value_cache: ValOpCache,
    /// `identity[k]` is the identity matrix over variables `k .. num_vars`.
    identity: Vec<Edge>,
}

impl Qmdd {
    /// Create an engine for `num_vars` circuit variables with the default
    /// capacities.
    pub fn new(num_vars: u32) -> Self {
        Self::with_bits(num_vars, DEFAULT_STORAGE_BITS, DEFAULT_CACHE_BITS)
    }

    /// Create an engine with a `2^storage_bits` node arena and
    /// `2^cache_bits` operation caches.
    pub fn with_bits(num_vars: u32, storage_bits: usize, cache_bits: usize) -> Self {
        let mut dd = Self {
            num_vars,
            weights: WeightTable::new(),
            table: UniqueTable::new(storage_bits, num_vars),
            edge_cache: EdgeOpCache::new(cache_bits),
            value_cache: ValOpCache::new(cache_bits),
            identity: Vec::new(),
        };

        // Fold the identity subtrees bottom-up; the controlled-gate builder
        // leans on these at every level.
        let mut identity = vec![dd.terminal_edge(); num_vars as usize + 1];
        for level in (0..num_vars).rev() {
            let prim = dd.primitive(level, Primitive::Identity);
            let below = identity[level as usize + 1];
            identity[level as usize] = dd.kro(prim, below);
        }
        dd.identity = identity;

        dd
    }

    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of live nodes, terminal included.
    pub fn num_nodes(&self) -> usize {
        self.table.len()
    }

    /// Number of distinct weight values interned so far.
    pub fn num_weights(&self) -> usize {
        self.weights.len()
    }

    pub fn terminal(&self) -> NodeId {
        self.table.terminal()
    }

    /// The identity on the empty variable suffix: `(1, terminal)`.
    pub fn terminal_edge(&self) -> Edge {
        Edge::new(WeightId::ONE, self.table.terminal())
    }

    /// The canonical zero edge: `(0, terminal)`.
    pub fn zero_edge(&self) -> Edge {
        Edge::new(WeightId::ZERO, self.table.terminal())
    }

    /// The cached identity matrix over variables `level .. num_vars`.
    pub fn identity(&self, level: u32) -> Edge {
        self.identity[level as usize]
    }

    pub fn is_terminal(&self, node: NodeId) -> bool {
        node == self.table.terminal()
    }

    /// Level of the node an edge targets (`num_vars` for the terminal).
    pub fn level_of(&self, e: Edge) -> u32 {
        self.table.level(e.node)
    }

    pub fn node_level(&self, id: NodeId) -> u32 {
        self.table.level(id)
    }

    pub fn node_children(&self, id: NodeId) -> [NodeId; 4] {
        self.table.children(id)
    }

    pub fn node_weights(&self, id: NodeId) -> [WeightId; 4] {
        self.table.weights(id)
    }

    /// The exact value behind a weight handle.
    pub fn weight_value(&self, id: WeightId) -> Value {
        self.weights.value(id)
    }

    /// Intern a weight value.
    pub fn put_weight(&mut self, value: Value) -> WeightId {
        self.weights.put(value)
    }
}

// Scalar arithmetic over weight handles.
impl Qmdd {
    /// Apply a scalar operator to two weight handles, memoized.
    ///
    /// Value-preserving shortcuts (x+0, x·0, x·1, 0÷x, x÷1) skip the cache
    /// and keep the weight table small. Division of a non-zero weight by
    /// zero panics; a zero numerator yields zero without touching the
    /// divisor.
    pub fn apply_value(&mut self, a: WeightId, b: WeightId, op: ValOp) -> WeightId {
        match op {
            ValOp::Add => {
                if a == WeightId::ZERO {
                    return b;
                }
                if b == WeightId::ZERO {
                    return a;
                }
            }
            ValOp::Sub => {
                if b == WeightId::ZERO {
                    return a;
                }
            }
            ValOp::Mul => {
                if a == WeightId::ZERO || b == WeightId::ZERO {
                    return WeightId::ZERO;
                }
                if a == WeightId::ONE {
                    return b;
                }
                if b == WeightId::ONE {
                    return a;
                }
            }
            ValOp::Div => {
                if a == WeightId::ZERO {
                    return WeightId::ZERO;
                }
                if b == WeightId::ONE {
                    return a;
                }
            }
        }

        if let Some(w) = self.value_cache.get(a, b, op) {
            return w;
        }

        let x = self.weights.value(a);
        let y = self.weights.value(b);
        let v = match op {
            ValOp::Add => x + y,
            ValOp::Sub => x - y,
            ValOp::Mul => x * y,
            ValOp::Div => x / y,
        };
        let w = self.weights.put(v);
        self.value_cache.insert(a, b, op, w);
        w
    }
}

// Node construction.
impl Qmdd {
    /// Normalize a quadrant weight vector in place.
    ///
    /// Scans indices 0..4 for the first non-zero weight; that weight
    /// becomes 1, every later non-zero weight is divided by it, and the
    /// divided-out scalar is returned for the caller to push onto the
    /// incoming edge. Returns the zero weight when all four are zero.
    fn normalize(&mut self, weights: &mut [WeightId; 4]) -> WeightId {
        let Some(k) = weights.iter().position(|&w| w != WeightId::ZERO) else {
            return WeightId::ZERO;
        };
        let s = weights[k];
        weights[k] = WeightId::ONE;
        for j in (k + 1)..4 {
            if weights[j] != WeightId::ZERO {
                weights[j] = self.apply_value(weights[j], s, ValOp::Div);
            }
        }
        s
    }

    /// Build (or find) the canonical node for the given quadrants and
    /// return the edge referencing it.
    ///
    /// Enforces all three canonicity rules: zero quadrants target the
    /// terminal, the weight vector is normalized with the common factor
    /// pushed onto the returned edge, a node whose four edges are all
    /// identical collapses to its child, and everything else deduplicates
    /// through the unique table. An all-zero weight vector yields the zero
    /// edge.
    pub fn mk_node(
        &mut self,
        level: u32,
        mut children: [NodeId; 4],
        mut weights: [WeightId; 4],
    ) -> Edge {
        assert!(level < self.num_vars, "node level out of range");

        let t = self.table.terminal();
        for i in 0..4 {
            if weights[i] == WeightId::ZERO {
                children[i] = t;
            }
        }

        let factor = self.normalize(&mut weights);
        if factor == WeightId::ZERO {
            debug!("mk_node(level = {}): all quadrants zero", level);
            return self.zero_edge();
        }

        if children.iter().all(|&c| c == children[0]) && weights.iter().all(|&w| w == weights[0]) {
            // Redundant: the parent edge references the common child
            // directly.
            debug!("mk_node(level = {}): redundant, collapsing", level);
            return Edge::new(factor, children[0]);
        }

        let id = self.table.put(Node::new(level, children, weights));
        debug!("mk_node(level = {}) -> {}", level, id);
        Edge::new(factor, id)
    }
}

// The recursive edge operators.
impl Qmdd {
    /// Quadrant `i` of an edge at `level`.
    ///
    /// If the edge's node sits exactly at `level`, this is the child edge
    /// with the incoming weight multiplied in; a node below `level` (or the
    /// terminal) stands for all four of its quadrants at once and passes
    /// through whole.
    fn cofactor(&mut self, e: Edge, level: u32, i: usize) -> Edge {
        if self.table.level(e.node) != level {
            return e;
        }
        let child = self.table.child(e.node, i);
        let w = self.table.weight(e.node, i);
        let w = self.apply_value(e.weight, w, ValOp::Mul);
        Edge::new(w, child)
    }

    /// Matrix addition of two edges.
    pub fn add(&mut self, e0: Edge, e1: Edge) -> Edge {
        debug!("add(e0 = {}, e1 = {})", e0, e1);

        // Base cases against the terminal.
        if self.is_terminal(e0.node) {
            if e0.weight == WeightId::ZERO {
                return e1;
            }
            if self.is_terminal(e1.node) {
                let w = self.apply_value(e0.weight, e1.weight, ValOp::Add);
                return Edge::new(w, e1.node);
            }
        }
        if self.is_terminal(e1.node) && e1.weight == WeightId::ZERO {
            return e0;
        }

        // Canonical operand order: the higher operand first.
        let (e0, e1) = if self.level_of(e0) <= self.level_of(e1) {
            (e0, e1)
        } else {
            (e1, e0)
        };

        if let Some(res) = self.edge_cache.get(e0, e1, EdgeOp::Add) {
            return res;
        }

        let level = self.level_of(e0);
        let mut children = [self.table.terminal(); 4];
        let mut weights = [WeightId::ZERO; 4];
        for i in 0..4 {
            let q0 = self.cofactor(e0, level, i);
            let q1 = self.cofactor(e1, level, i);
            let z = self.add(q0, q1);
            children[i] = z.node;
            weights[i] = z.weight;
        }

        let res = self.mk_node(level, children, weights);
        debug!("computed: add(e0 = {}, e1 = {}) -> {}", e0, e1, res);
        self.edge_cache.insert(e0, e1, EdgeOp::Add, res);
        res
    }

    /// Matrix multiplication of two edges: `e0 · e1`.
    pub fn mul(&mut self, e0: Edge, e1: Edge) -> Edge {
        debug!("mul(e0 = {}, e1 = {})", e0, e1);

        // A terminal left operand is a scalar factor.
        if self.is_terminal(e0.node) {
            if e0.weight == WeightId::ZERO {
                return self.zero_edge();
            }
            if e0.weight == WeightId::ONE {
                return e1;
            }
            let w = self.apply_value(e0.weight, e1.weight, ValOp::Mul);
            return Edge::new(w, e1.node);
        }

        if let Some(res) = self.edge_cache.get(e0, e1, EdgeOp::Mul) {
            return res;
        }

        // Align at the topmost level of either operand; the lower operand
        // passes through whole in every quadrant it skips.
        let level = self.level_of(e0).min(self.level_of(e1));
        let mut children = [self.table.terminal(); 4];
        let mut weights = [WeightId::ZERO; 4];
        for i in 0..2 {
            for j in 0..2 {
                // Block row i of e0 times block column j of e1.
                let mut z = self.zero_edge();
                for k in 0..2 {
                    let a = self.cofactor(e0, level, 2 * i + k);
                    let b = self.cofactor(e1, level, 2 * k + j);
                    let p = self.mul(a, b);
                    z = self.add(z, p);
                }
                children[2 * i + j] = z.node;
                weights[2 * i + j] = z.weight;
            }
        }

        let res = self.mk_node(level, children, weights);
        debug!("computed: mul(e0 = {}, e1 = {}) -> {}", e0, e1, res);
        self.edge_cache.insert(e0, e1, EdgeOp::Mul, res);
        res
    }

    /// Kronecker product of two edges: `e0 ⊗ e1`.
    ///
    /// The left operand must sit strictly above the right one in the
    /// variable order; the caller is responsible for that precondition.
    pub fn kro(&mut self, e0: Edge, e1: Edge) -> Edge {
        debug!("kro(e0 = {}, e1 = {})", e0, e1);

        if self.is_terminal(e0.node) {
            if e0.weight == WeightId::ZERO {
                return self.zero_edge();
            }
            if e0.weight == WeightId::ONE {
                return e1;
            }
            let w = self.apply_value(e0.weight, e1.weight, ValOp::Mul);
            return Edge::new(w, e1.node);
        }

        assert!(
            self.level_of(e0) < self.level_of(e1),
            "kronecker operands out of level order"
        );

        if let Some(res) = self.edge_cache.get(e0, e1, EdgeOp::Kro) {
            return res;
        }

        let level = self.level_of(e0);
        let mut children = [self.table.terminal(); 4];
        let mut weights = [WeightId::ZERO; 4];
        for i in 0..4 {
            let c = Edge::new(self.table.weight(e0.node, i), self.table.child(e0.node, i));
            let z = self.kro(c, e1);
            children[i] = z.node;
            weights[i] = z.weight;
        }

        let mut res = self.mk_node(level, children, weights);
        // The incoming weight of e0 was left out of the recursion; fold it
        // into the extracted factor.
        res.weight = self.apply_value(e0.weight, res.weight, ValOp::Mul);
        debug!("computed: kro(e0 = {}, e1 = {}) -> {}", e0, e1, res);
        self.edge_cache.insert(e0, e1, EdgeOp::Kro, res);
        res
    }
}

// The gate compiler.
impl Qmdd {
    /// The edge for a level-local 2×2 primitive.
    pub fn primitive(&mut self, level: u32, p: Primitive) -> Edge {
        let t = self.table.terminal();
        let weights = p.weights().map(|v| self.weights.put(v));
        self.mk_node(level, [t; 4], weights)
    }

    /// Build the full 2ⁿ×2ⁿ matrix of a primitive applied to `target`,
    /// conditional on every variable in `controls` being 1.
    ///
    /// Walks the variable order bottom-up with two running edges: `active`
    /// is the gate's action conditional on all controls seen so far,
    /// `inactive` the identity branch taken when some seen control is 0.
    /// Below the target the two are carried separately; at the target they
    /// merge; above it only `active` remains.
    pub fn gate_matrix(&mut self, prim: Primitive, controls: &[u32], target: u32) -> Edge {
        assert!(target < self.num_vars, "gate target out of range");
        let mut is_control = vec![false; self.num_vars as usize];
        for &c in controls {
            assert!(c < self.num_vars, "gate control out of range");
            assert_ne!(c, target, "gate control equals its target");
            is_control[c as usize] = true;
        }

        let mut active = self.terminal_edge();
        let mut inactive = self.zero_edge();

        for level in (0..self.num_vars).rev() {
            if level > target {
                if is_control[level as usize] {
                    let p0 = self.primitive(level, Primitive::Proj0);
                    let p1 = self.primitive(level, Primitive::Proj1);
                    let below = self.identity[level as usize + 1];
                    active = self.kro(p1, active);
                    let skip = self.kro(p0, below);
                    let pass = self.kro(p1, inactive);
                    inactive = self.add(skip, pass);
                } else {
                    let ident = self.primitive(level, Primitive::Identity);
                    active = self.kro(ident, active);
                    inactive = self.kro(ident, inactive);
                }
            } else if level == target {
                let ident = self.primitive(level, Primitive::Identity);
                let g = self.primitive(level, prim);
                let idle = self.kro(ident, inactive);
                let act = self.kro(g, active);
                active = self.add(idle, act);
            } else if is_control[level as usize] {
                let p0 = self.primitive(level, Primitive::Proj0);
                let p1 = self.primitive(level, Primitive::Proj1);
                let below = self.identity[level as usize + 1];
                let skip = self.kro(p0, below);
                let pass = self.kro(p1, active);
                active = self.add(skip, pass);
            } else {
                let ident = self.primitive(level, Primitive::Identity);
                active = self.kro(ident, active);
            }
        }

        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Irrational;
    use num_traits::Zero;

    use test_log::test;

    #[test]
    fn test_terminal_and_zero_edges() {
        let dd = Qmdd::new(2);
        assert_eq!(dd.terminal_edge().node, dd.terminal());
        assert!(dd.zero_edge().is_zero());
        assert_eq!(dd.level_of(dd.terminal_edge()), 2);
    }

    #[test]
    fn test_identity_cache() {
        let dd = Qmdd::new(3);
        // Bottom entry is the empty-suffix identity.
        assert_eq!(dd.identity(3), dd.terminal_edge());
        // Every other entry is a weight-1 edge to a diagonal node.
        for level in 0..3 {
            let e = dd.identity(level);
            assert_eq!(e.weight, WeightId::ONE);
            assert_eq!(dd.level_of(e), level);
            let w = dd.node_weights(e.node);
            assert_eq!(w, [WeightId::ONE, WeightId::ZERO, WeightId::ZERO, WeightId::ONE]);
            let c = dd.node_children(e.node);
            assert_eq!(c[0], c[3]);
            assert_eq!(c[0], dd.identity(level + 1).node);
        }
    }

    #[test]
    fn test_mk_node_normalizes() {
        let mut dd = Qmdd::new(1);
        let t = dd.terminal();
        let h = Primitive::Hadamard.weights().map(|v| dd.put_weight(v));
        let e = dd.mk_node(0, [t; 4], h);
        // Root factor 1/√2, internal weights [1, 1, 1, -1].
        let half_sqrt2 = Value::new(Irrational::sqrt2_ratio(1, 2), Irrational::zero());
        assert_eq!(dd.weight_value(e.weight), half_sqrt2);
        let minus_one = dd.put_weight(Value::from_integer(-1));
        assert_eq!(
            dd.node_weights(e.node),
            [WeightId::ONE, WeightId::ONE, WeightId::ONE, minus_one]
        );
    }

    #[test]
    fn test_mk_node_collapses_zero_and_redundant() {
        let mut dd = Qmdd::new(2);
        let t = dd.terminal();
        let zero = dd.mk_node(0, [t; 4], [WeightId::ZERO; 4]);
        assert_eq!(zero, dd.zero_edge());

        // All four edges identical: the node must not exist.
        let two = dd.put_weight(Value::from_integer(2));
        let sub = dd.primitive(1, Primitive::Not);
        let red = dd.mk_node(0, [sub.node; 4], [two; 4]);
        assert_eq!(red.node, sub.node);
        assert_eq!(dd.weight_value(red.weight), Value::from_integer(2));
    }

    #[test]
    fn test_mk_node_unique() {
        let mut dd = Qmdd::new(2);
        let a = dd.primitive(0, Primitive::Not);
        let b = dd.primitive(0, Primitive::Not);
        assert_eq!(a, b);
        let c = dd.primitive(0, Primitive::PauliZ);
        assert_ne!(a, c);
    }

    #[test]
    fn test_add_zero_is_neutral() {
        let mut dd = Qmdd::new(2);
        let e = dd.identity(0);
        let zero = dd.zero_edge();
        assert_eq!(dd.add(zero, e), e);
        assert_eq!(dd.add(e, zero), e);
    }

    #[test]
    fn test_add_self_doubles() {
        let mut dd = Qmdd::new(2);
        let e = dd.identity(0);
        let doubled = dd.add(e, e);
        assert_eq!(doubled.node, e.node);
        assert_eq!(dd.weight_value(doubled.weight), Value::from_integer(2));
    }

    #[test]
    fn test_add_cancels_negation() {
        let mut dd = Qmdd::new(2);
        let e = dd.gate_matrix(Primitive::Hadamard, &[], 1);
        let minus_one = dd.put_weight(Value::from_integer(-1));
        let neg = dd.mul(Edge::new(minus_one, dd.terminal()), e);
        assert_eq!(dd.add(e, neg), dd.zero_edge());
    }

    #[test]
    fn test_mul_identity_is_neutral() {
        let mut dd = Qmdd::new(2);
        let ident = dd.identity(0);
        let e = dd.gate_matrix(Primitive::Not, &[0], 1);
        assert_eq!(dd.mul(ident, e), e);
        assert_eq!(dd.mul(e, ident), e);
    }

    #[test]
    fn test_mul_scalar_base() {
        let mut dd = Qmdd::new(1);
        let x = dd.primitive(0, Primitive::Not);
        let two = dd.put_weight(Value::from_integer(2));
        let scaled = dd.mul(Edge::new(two, dd.terminal()), x);
        assert_eq!(scaled.node, x.node);
        assert_eq!(dd.weight_value(scaled.weight), Value::from_integer(2));
    }

    #[test]
    fn test_kro_terminal_base() {
        let mut dd = Qmdd::new(2);
        let e = dd.primitive(1, Primitive::Not);
        assert_eq!(dd.kro(dd.terminal_edge(), e), e);
        assert_eq!(dd.kro(dd.zero_edge(), e), dd.zero_edge());
    }

    #[test]
    #[should_panic(expected = "kronecker operands out of level order")]
    fn test_kro_precondition() {
        let mut dd = Qmdd::new(2);
        let lo = dd.primitive(1, Primitive::Not);
        let hi = dd.primitive(0, Primitive::Not);
        dd.kro(lo, hi);
    }

    #[test]
    fn test_cnot_structure() {
        let mut dd = Qmdd::new(2);
        let cnot = dd.gate_matrix(Primitive::Not, &[0], 1);

        assert_eq!(cnot.weight, WeightId::ONE);
        assert_eq!(dd.level_of(cnot), 0);
        let w = dd.node_weights(cnot.node);
        assert_eq!(w, [WeightId::ONE, WeightId::ZERO, WeightId::ZERO, WeightId::ONE]);

        // Diagonal blocks: identity on b, then X on b.
        let c = dd.node_children(cnot.node);
        assert_eq!(c[0], dd.identity(1).node);
        let x = dd.primitive(1, Primitive::Not);
        assert_eq!(c[3], x.node);
        assert_ne!(c[0], c[3]);
    }

    #[test]
    fn test_hadamard_pair_is_identity() {
        let mut dd = Qmdd::new(2);
        let h = dd.gate_matrix(Primitive::Hadamard, &[], 0);
        let hh = dd.mul(h, h);
        assert_eq!(hh, dd.identity(0));
    }

    #[test]
    fn test_controls_commute() {
        let mut dd = Qmdd::new(3);
        let a = dd.gate_matrix(Primitive::Not, &[0, 1], 2);
        let b = dd.gate_matrix(Primitive::Not, &[1, 0], 2);
        assert_eq!(a, b);
    }

    #[test]
    fn test_gate_inverse_pairs() {
        let mut dd = Qmdd::new(2);
        let pairs = [
            (Primitive::Not, Primitive::Not),
            (Primitive::PauliY, Primitive::PauliY),
            (Primitive::PauliZ, Primitive::PauliZ),
            (Primitive::Hadamard, Primitive::Hadamard),
            (Primitive::SqrtNot, Primitive::SqrtNotInv),
            (Primitive::Quarter, Primitive::QuarterInv),
        ];
        for (g, ginv) in pairs {
            let a = dd.gate_matrix(g, &[0], 1);
            let b = dd.gate_matrix(ginv, &[0], 1);
            let prod = dd.mul(a, b);
            assert_eq!(prod, dd.identity(0), "{:?} · {:?} is not the identity", g, ginv);
        }
    }

    #[test]
    fn test_same_matrix_same_handles() {
        // Canonicity: two construction paths for the same matrix yield the
        // same (weight, node) pair.
        let mut dd = Qmdd::new(2);
        let via_gate = dd.gate_matrix(Primitive::Not, &[], 1);
        let x = dd.primitive(1, Primitive::Not);
        let ident = dd.primitive(0, Primitive::Identity);
        let via_kro = dd.kro(ident, x);
        assert_eq!(via_gate, via_kro);
    }
}
