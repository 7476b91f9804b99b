//! Hash-consed term engine for a bit-vector theory solver.
//!
//! This crate is the core term-management layer of a bit-vector theory
//! plugin embedded in an SMT framework: it ingests bit-vector expressions
//! (constants, polynomials, power products, bit arrays, conditionals, and
//! the eight standard bit-vector binary operators), canonicalizes and
//! hash-conses them into a persistent term DAG, tracks an equivalence
//! relation over the resulting variables, and exposes equality/inequality
//! atoms to a surrounding Boolean satisfiability core.
//!
//! [`solver::BvSolver`] is the entry point: it owns the variable table
//! ([`vars`]), the atom table ([`atoms`]), the merge table ([`merge`]), and
//! the checkpoint trail ([`trail`]), and routes every construction through
//! the algebraic simplifier ([`simplify`]) and the bound ([`bounds`]) and
//! disequality ([`diseq`]) reasoners before anything is allocated.
//!
//! The surrounding SAT core, E-graph, and bit-blaster are modeled as the
//! narrow trait interfaces in [`facade`]; this crate is a client of all
//! three and is usable standalone (e.g. in tests) against
//! [`facade::NullFacade`].

pub mod atoms;
pub mod bounds;
pub mod diseq;
pub mod error;
pub mod facade;
pub mod intern;
pub mod merge;
pub mod ops;
pub mod poly;
pub mod simplify;
pub mod solver;
pub mod trail;
pub mod vars;
pub mod width;

pub use atoms::{Atom, AtomId, AtomTable};
pub use error::{Error, Fatal};
pub use merge::MergeTable;
pub use ops::{AtomKind, BinOp, Lit, TriBool};
pub use solver::{BvSolver, Config, FinalCheckResult, PropagateResult};
pub use trail::{Frame, Trail};
pub use vars::{Var, VarDef, VarId, VarKind, VarTable};
pub use width::Width;
