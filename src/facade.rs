//! External collaborator facades (spec §4.I, §1 "Out of scope"). The
//! surrounding SMT framework owns the SAT core, the E-graph, and the
//! bit-blaster; this crate only needs a narrow interface onto each, and
//! default-implements every method as a no-op so term construction and
//! atom hash-consing are fully usable without any of the three wired up,
//! the same role the teacher's `BitStreamVisitor` trait plays, with
//! default method bodies a caller overrides only for the records it
//! actually cares about.

use crate::vars::VarId;
use crate::ops::Lit;

/// Fresh Boolean variable allocation, clause emission, and atom-to-variable
/// binding. The solver is strictly a client of this interface (spec §4.I).
pub trait SatCoreFacade {
    /// Allocate and return a fresh positive SAT-core variable id.
    fn fresh_bool_var(&mut self) -> i32;

    /// Emit a unit clause asserting `lit`. Default: no-op (a host with no
    /// bit-blaster wired up simply does not see the assertion).
    fn add_unit_clause(&mut self, _lit: Lit) {}

    /// Emit the empty clause (spec §7 "static contradiction at assertion
    /// time"), flagging unsatisfiability to the enclosing core.
    fn add_empty_clause(&mut self) {}
}

/// Congruence-closure bridge (spec §4.I "E-graph façade", §6 "E-graph
/// interface"). At most one E-term id is attached per variable; the
/// remaining methods mirror the full function table spec §6 names
/// (assert-equal, assert-diseq, assert-distinct, check-disequality,
/// reconcile-model, select-eq-polarity, value-in-model, fresh-value) so a
/// caller wiring up a real E-graph has one trait to implement against, even
/// though congruence closure itself is out of scope here (spec §1).
pub trait EGraphFacade {
    fn attach_eterm(&mut self, _var: VarId, _eterm: u32) {}

    /// Returns `None` when no E-term has been attached (spec §4.I "returns
    /// the sentinel when none").
    fn eterm_of(&self, _var: VarId) -> Option<u32> {
        None
    }

    /// Report a theory-level equality to the E-graph. Default: no-op.
    fn assert_equal(&mut self, _a: u32, _b: u32) {}

    /// Report a theory-level disequality to the E-graph. Default: no-op.
    fn assert_diseq(&mut self, _a: u32, _b: u32) {}

    /// Report that a group of E-terms are pairwise distinct. Default: no-op.
    fn assert_distinct(&mut self, _eterms: &[u32]) {}

    /// Ask the E-graph whether it already knows two terms must differ.
    /// Default: "not known", the same conservative default
    /// [`super::diseq::must_differ`] uses when it cannot prove one itself.
    fn check_disequality(&self, _a: u32, _b: u32) -> bool {
        false
    }

    /// Reconcile a candidate model between the two theories. Default: no-op.
    fn reconcile_model(&mut self) {}

    /// Choose which polarity of an undecided equality to propagate first.
    /// Default: `true` (favor asserting equal), matching the bias
    /// `solver.rs`'s `assert_eq` already has towards merging on a positive
    /// assertion.
    fn select_eq_polarity(&self, _a: u32, _b: u32) -> bool {
        true
    }

    /// The concrete value an E-term holds in the current model, if any.
    fn value_in_model(&self, _eterm: u32) -> Option<u64> {
        None
    }

    /// Request a fresh model value distinct from every value already
    /// assigned to the given E-term's equivalence class.
    fn fresh_value(&mut self, _eterm: u32) -> u64 {
        0
    }

    /// The E-graph's own term count after it has truncated itself back to
    /// the checkpoint being popped to (spec §4.I: "on pop, clear E-term
    /// slots whose ids lie beyond the E-graph's truncated term count").
    /// `solver.rs`'s `pop` queries this and clears every attached eterm at
    /// or beyond it via [`crate::vars::VarTable::clear_eterms_beyond`].
    /// Default `u32::MAX`: with no real E-graph wired up, nothing is ever
    /// beyond it, so no slot is cleared.
    fn eterm_count(&self) -> u32 {
        u32::MAX
    }
}

/// Lazy bit-blaster lifecycle (spec §4.I "Bit-blaster façade"). Full
/// bit-blasting is out of scope; only the teardown hook matters here.
pub trait BitBlasterFacade {
    fn teardown(&mut self) {}
}

/// A facade that does nothing beyond handing out monotonically increasing
/// variable ids: enough to exercise term and atom construction in tests, or
/// to run this crate standalone before a real bit-blaster is wired in.
#[derive(Default)]
pub struct NullFacade {
    next_var: i32,
}

impl SatCoreFacade for NullFacade {
    fn fresh_bool_var(&mut self) -> i32 {
        self.next_var += 1;
        self.next_var
    }
}

impl EGraphFacade for NullFacade {}
impl BitBlasterFacade for NullFacade {}
