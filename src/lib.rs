//! # qmdd-rs: Quantum Multiple-valued Decision Diagrams in Rust
//!
//! **`qmdd-rs`** simulates reversible and quantum circuits by building a
//! **QMDD**, a canonical, edge-weighted DAG representation of the
//! circuit's overall unitary matrix. Weights are exact elements of
//! ℚ[√2, i]; no floating point is involved anywhere.
//!
//! ## What is a QMDD?
//!
//! A Quantum Multiple-valued Decision Diagram represents a 2ⁿ×2ⁿ complex
//! matrix as a DAG: each node splits the matrix into its four quadrants,
//! each edge carries a complex weight. With shared sub-structure,
//! deduplicated nodes, and a fixed weight-normalization rule the
//! representation is **canonical**: two sub-circuits computing the same
//! matrix produce the same node handle, so equivalence checking is a
//! handle comparison.
//!
//! ## Key Features
//!
//! - **Manager-centric architecture**: all operations go through the
//!   [`Qmdd`][crate::qmdd::Qmdd] manager, which owns the node arena, the
//!   weight table, and the operation caches, and maintains the canonical
//!   form invariant.
//! - **Exact arithmetic**: weights live in ℚ[√2, i] as pairs of rational
//!   components, so gate algebra (Hadamard, √Not, π/4 rotations, …) is
//!   computed without rounding.
//! - **Memoized operators**: matrix addition, multiplication, and the
//!   Kronecker product are recursive over quadrants with computed-table
//!   caching.
//! - **Textual front end**: circuits are read from a line-oriented format
//!   with declared variables, designated inputs/outputs, constant inputs,
//!   and a `BEGIN`/`END` gate list (Toffoli and Fredkin families plus
//!   single-qubit rotations).
//!
//! ## Basic Usage
//!
//! ```rust
//! use qmdd_rs::decode::decode;
//! use qmdd_rs::program::parse;
//!
//! let src = "\
//! .v a,b
//! .i a,b
//! .o a,b
//! BEGIN
//! t2 a,b
//! END
//! ";
//! let program = parse(src).unwrap();
//! let (dd, root) = decode(&program);
//!
//! // The CNOT's root: weight 1, two distinct diagonal blocks below.
//! assert_eq!(dd.weight_value(root.weight), qmdd_rs::value::Value::one());
//! assert_eq!(dd.level_of(root), 0);
//! ```
//!
//! ## Core Components
//!
//! - **[`value`]**: the exact weight algebra over ℚ[√2, i].
//! - **[`qmdd`]**: the manager and the recursive edge operators.
//! - **[`program`]**: the textual circuit parser.
//! - **[`decode`]**: gate-stream evaluation, including macro expansion.
//! - **[`dot`]**: Graphviz visualization.

pub mod cache;
pub mod debug;
pub mod decode;
pub mod dot;
pub mod edge;
pub mod gate;
pub mod node;
pub mod program;
pub mod qmdd;
pub mod table;
pub mod types;
pub mod value;
pub mod weight;
