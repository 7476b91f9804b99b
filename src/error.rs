//! Error types for the term engine.
//!
//! Two distinct failure modes are recognized (see spec §7):
//!
//! - [`Error`] is returned from fallible public entry points where a caller
//!   could plausibly pass a malformed id (e.g. after a `pop` the caller
//!   still holds a stale [`crate::vars::VarId`]). These are ordinary
//!   `Result`s, no different from the teacher's [`crate::read`]-style
//!   errors.
//! - [`Fatal`] models the single unrecoverable condition this engine can
//!   hit: table growth past the configured ceiling. The original C engine
//!   handles this with a `longjmp` out of the current solve attempt; Rust
//!   has no equivalent control-transfer primitive, so `panic!(Fatal::..)`
//!   is used instead, on the expectation that the embedding framework
//!   wraps a solve attempt in `std::panic::catch_unwind`.
use std::{error, fmt};

/// Recoverable errors from the public API.
///
/// Width mismatches and non-root merge operands are *not* represented here:
/// per spec §7 ("precondition violations... are programming errors caught
/// by internal assertions"), those are caller bugs against a well-typed
/// elaborator and are caught with `debug_assert!` at the call site
/// (`vars.rs`'s binary constructors, `merge.rs`'s `merge`), not surfaced as
/// `Result`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A variable or atom id was out of range for the current table size,
    /// typically because it was allocated before a `pop` truncated the
    /// table past it.
    InvalidVariable(u32),
    /// An atom id was out of range, as above but for the atom table.
    InvalidAtom(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidVariable(id) => write!(f, "variable {id} does not exist"),
            Self::InvalidAtom(id) => write!(f, "atom {id} does not exist"),
        }
    }
}

impl error::Error for Error {}

/// The single unrecoverable condition in this engine: a table tried to grow
/// past its configured `MAX` ceiling (spec §4.B, §6 "Sizes").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fatal {
    /// The variable table could not grow past `max`.
    VarTableFull { max: u32 },
    /// The atom table could not grow past `max`.
    AtomTableFull { max: u32 },
}

impl fmt::Display for Fatal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VarTableFull { max } => write!(f, "out of memory: variable table full (max {max})"),
            Self::AtomTableFull { max } => write!(f, "out of memory: atom table full (max {max})"),
        }
    }
}

impl error::Error for Fatal {}
