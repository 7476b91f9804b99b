//! The top-level coordinator (spec §6 "Control interface", "State
//! machine"): owns the variable table, atom table, merge table, and trail,
//! and exposes the constructors and assertions a well-typed elaborator
//! calls into. Generic over a facade type so a caller can plug in a real
//! SAT core / E-graph / bit-blaster, or run with [`crate::facade::NullFacade`]
//! for anything that only exercises term construction.

use crate::atoms::{AtomId, AtomKind, AtomTable};
use crate::bounds;
use crate::diseq;
use crate::facade::{BitBlasterFacade, EGraphFacade, SatCoreFacade};
use crate::merge::MergeTable;
use crate::ops::{BinOp, Lit, TriBool};
use crate::simplify;
use crate::trail::Trail;
use crate::vars::{VarId, VarTable};
use crate::width::Width;

/// Result of [`BvSolver::propagate`] (spec §6: "returns 'no conflict'" in
/// this core design; the real decision procedure lives in the bit-blaster).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagateResult {
    NoConflict,
}

/// Result of [`BvSolver::final_check`] (spec §6: "returns 'satisfiable'").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalCheckResult {
    Satisfiable,
}

/// Table sizing (spec §6 "Sizes": "start at implementation-chosen
/// defaults and grow geometrically... a `MAX` ceiling triggers fatal
/// OOM"). There is no file- or environment-based configuration in this
/// crate, this struct is the entire "configuration" surface, constructed
/// programmatically.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub max_vars: u32,
    pub max_atoms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_vars: u32::MAX / 2,
            max_atoms: u32::MAX / 2,
        }
    }
}

pub struct BvSolver<F> {
    vars: VarTable,
    atoms: AtomTable,
    merge: MergeTable,
    trail: Trail,
    facade: F,
    base_level: u32,
    decision_level: u32,
    /// Equalities reported to the E-graph but not yet reconciled; drained
    /// on `backtrack` (spec §4 "State machine").
    pending_e_assertions: Vec<(VarId, VarId)>,
}

impl<F: SatCoreFacade + EGraphFacade + BitBlasterFacade> BvSolver<F> {
    /// Construct with [`Config::default`]'s table ceilings.
    pub fn new(facade: F) -> Self {
        Self::with_config(Config::default(), facade)
    }

    pub fn with_config(config: Config, facade: F) -> Self {
        Self {
            vars: VarTable::new(config.max_vars),
            atoms: AtomTable::new(config.max_atoms),
            merge: MergeTable::new(),
            trail: Trail::new(),
            facade,
            base_level: 0,
            decision_level: 0,
            pending_e_assertions: Vec::new(),
        }
    }

    pub fn vars(&self) -> &VarTable {
        &self.vars
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn merge(&self) -> &MergeTable {
        &self.merge
    }

    fn track(&mut self, id: VarId) -> VarId {
        self.merge.register(id);
        id
    }

    // -- Term constructors (spec §6 "Term constructors") --------------

    pub fn mk_var(&mut self, bits: u32) -> VarId {
        let id = self.vars.mk_var(bits);
        self.track(id)
    }

    pub fn mk_const(&mut self, bits: u32, value: Width) -> VarId {
        let id = self.vars.mk_const(bits, value);
        self.track(id)
    }

    pub fn mk_bit_array(&mut self, lits: Vec<Lit>) -> VarId {
        let id = simplify::mk_bit_array(&mut self.vars, lits);
        self.track(id)
    }

    pub fn mk_add(&mut self, bits: u32, x: VarId, y: VarId) -> VarId {
        let id = simplify::mk_add(&mut self.vars, &self.merge, bits, x, y);
        self.track(id)
    }

    pub fn mk_sub(&mut self, bits: u32, x: VarId, y: VarId) -> VarId {
        let id = simplify::mk_sub(&mut self.vars, &self.merge, bits, x, y);
        self.track(id)
    }

    pub fn mk_neg(&mut self, bits: u32, x: VarId) -> VarId {
        let id = simplify::mk_neg(&mut self.vars, &self.merge, bits, x);
        self.track(id)
    }

    pub fn mk_mul(&mut self, bits: u32, x: VarId, y: VarId) -> VarId {
        let id = simplify::mk_mul(&mut self.vars, &self.merge, bits, x, y);
        self.track(id)
    }

    pub fn mk_binop(&mut self, bits: u32, op: BinOp, x: VarId, y: VarId) -> VarId {
        let id = simplify::mk_binop(&mut self.vars, &self.merge, bits, op, x, y);
        self.track(id)
    }

    pub fn mk_ite(&mut self, bits: u32, cond: Lit, then_branch: VarId, else_branch: VarId) -> VarId {
        let id = simplify::mk_ite(&mut self.vars, &self.merge, bits, cond, then_branch, else_branch);
        self.track(id)
    }

    pub fn select_bit(&mut self, x: VarId, i: u32) -> Lit {
        simplify::select_bit(&mut self.vars, &self.merge, &mut self.facade, x, i)
    }

    pub fn attach_eterm(&mut self, x: VarId, eterm: u32) {
        self.vars.attach_eterm(x, eterm);
        self.facade.attach_eterm(x, eterm);
    }

    pub fn eterm_of(&self, x: VarId) -> Option<u32> {
        self.vars.eterm_of(x)
    }

    // -- Atom constructors (spec §6 "Atom constructors") ---------------

    /// `eq(x, y)` (spec §4.F/§4.G driving atom creation): folds to a
    /// Boolean constant when the merge table already equates the operands
    /// or the disequality reasoner rules them out; otherwise hash-conses
    /// (and lazily externalizes) an `EQ` atom.
    pub fn mk_eq(&mut self, x: VarId, y: VarId) -> Lit {
        let rx = self.merge.root(x);
        let ry = self.merge.root(y);
        if rx == ry {
            return Lit::True;
        }
        if diseq::must_differ(&self.vars, rx, ry) {
            return Lit::False;
        }
        let id = self.atoms.mk_atom(AtomKind::Eq, rx, ry);
        self.lit_for_atom(id)
    }

    /// `uge(x, y)` (spec §4.F "check_uge" driving atom creation).
    pub fn mk_uge(&mut self, x: VarId, y: VarId) -> Lit {
        let rx = self.merge.root(x);
        let ry = self.merge.root(y);
        match bounds::check_uge(&self.vars, rx, ry) {
            TriBool::True => Lit::True,
            TriBool::False => Lit::False,
            TriBool::Unknown => {
                let id = self.atoms.mk_atom(AtomKind::Uge, rx, ry);
                self.lit_for_atom(id)
            }
        }
    }

    /// `sge(x, y)` (spec §4.F "check_sge" driving atom creation).
    pub fn mk_sge(&mut self, x: VarId, y: VarId) -> Lit {
        let rx = self.merge.root(x);
        let ry = self.merge.root(y);
        match bounds::check_sge(&self.vars, rx, ry) {
            TriBool::True => Lit::True,
            TriBool::False => Lit::False,
            TriBool::Unknown => {
                let id = self.atoms.mk_atom(AtomKind::Sge, rx, ry);
                self.lit_for_atom(id)
            }
        }
    }

    /// Bind a fresh Boolean literal on first externalization (spec §4.C).
    fn lit_for_atom(&mut self, id: AtomId) -> Lit {
        let existing = self.atoms.get(id).expect("valid atom id").lit;
        if existing != Lit::Unbound {
            return existing;
        }
        let lit = Lit::Var(self.facade.fresh_bool_var());
        self.atoms.bind_lit(id, lit);
        lit
    }

    /// Emit the clause corresponding to `lit` under `polarity` (spec §7):
    /// a concrete truth is silent (or contradictory, emitting the empty
    /// clause), anything else becomes a unit clause.
    fn assert_lit(&mut self, lit: Lit, polarity: bool) {
        let effective = if polarity { lit } else { lit.negate() };
        match effective {
            Lit::True => {}
            Lit::False => self.facade.add_empty_clause(),
            other => self.facade.add_unit_clause(other),
        }
    }

    /// Assert `eq(x, y)` under `polarity` (spec §8 scenario 2). A positive
    /// assertion additionally merges the two classes, so that the
    /// contradiction in a later negative assertion of the same equality is
    /// caught immediately rather than needing a fresh atom.
    pub fn assert_eq(&mut self, x: VarId, y: VarId, polarity: bool) {
        let rx = self.merge.root(x);
        let ry = self.merge.root(y);
        let lit = self.mk_eq(x, y);
        self.assert_lit(lit, polarity);
        if polarity && rx != ry {
            let rank_x = self.vars.get(rx).expect("valid id").kind.rank();
            let rank_y = self.vars.get(ry).expect("valid id").kind.rank();
            self.merge.merge(rx, ry, rank_x, rank_y);
        }
    }

    pub fn assert_uge(&mut self, x: VarId, y: VarId, polarity: bool) {
        let lit = self.mk_uge(x, y);
        self.assert_lit(lit, polarity);
    }

    pub fn assert_sge(&mut self, x: VarId, y: VarId, polarity: bool) {
        let lit = self.mk_sge(x, y);
        self.assert_lit(lit, polarity);
    }

    // -- Control interface (spec §6) -----------------------------------

    pub fn start_internalization(&mut self) {}

    pub fn start_search(&mut self) {}

    /// Stubbed: the real decision procedure delegates to bit-blasting,
    /// out of scope here (spec §6, §9 "Open question").
    pub fn propagate(&mut self) -> PropagateResult {
        PropagateResult::NoConflict
    }

    /// Stubbed: see [`Self::propagate`].
    pub fn final_check(&mut self) -> FinalCheckResult {
        FinalCheckResult::Satisfiable
    }

    /// Stubbed (spec §6: "`assert_atom`/`select_polarity`/
    /// `expand_explanation` are stubs — the real workflow delegates to
    /// bit-blasting"). Real propagation of an already-hash-consed atom into
    /// the bit-blaster happens outside this crate; here the atom is simply
    /// acknowledged as known to the theory.
    pub fn assert_atom(&mut self, _atom: AtomId, _polarity: bool) {}

    /// Stubbed: see [`Self::assert_atom`]. A real implementation would ask
    /// the bit-blaster which polarity to branch on first; absent one, any
    /// choice is as good as another.
    pub fn select_polarity(&mut self, _atom: AtomId) -> bool {
        true
    }

    /// Stubbed: see [`Self::assert_atom`]. Explanation generation belongs to
    /// the bit-blaster once it exists; this crate has nothing to add to a
    /// conflict beyond the atom itself.
    pub fn expand_explanation(&mut self, atom: AtomId) -> Vec<AtomId> {
        vec![atom]
    }

    pub fn increase_decision_level(&mut self) {
        self.decision_level += 1;
    }

    /// Adjust `decision_level` alone and drain the E-assertion queue
    /// (spec §4 "State machine").
    pub fn backtrack(&mut self, level: u32) {
        debug_assert!(level <= self.decision_level, "cannot backtrack above the current decision level");
        self.decision_level = level;
        self.pending_e_assertions.clear();
    }

    /// Increment both `base_level` and `decision_level` and checkpoint the
    /// variable table, atom table, and merge table (spec §4 "State
    /// machine", §4.E).
    pub fn push(&mut self) {
        self.trail.push(self.vars.len(), self.atoms.len());
        self.merge.push();
        self.base_level += 1;
        self.decision_level += 1;
    }

    /// Requires `decision_level == base_level`; truncates every table back
    /// to the top trail frame and decrements both levels (spec §4 "State
    /// machine", §8 scenario 5).
    pub fn pop(&mut self) {
        debug_assert_eq!(self.decision_level, self.base_level, "pop requires decision_level == base_level");
        let frame = self.trail.pop().expect("pop without matching push");
        self.vars.truncate_to(frame.nvars);
        self.atoms.truncate_to(frame.natoms);
        self.merge.pop();
        // spec §4.I: clear eterm slots the E-graph's own truncation left
        // dangling beyond its post-pop term count.
        self.vars.clear_eterms_beyond(self.facade.eterm_count());
        self.base_level -= 1;
        self.decision_level -= 1;
    }

    pub fn reset(&mut self) {
        self.vars.reset();
        self.atoms.reset();
        self.merge.reset();
        self.trail.reset();
        self.facade.teardown();
        self.base_level = 0;
        self.decision_level = 0;
        self.pending_e_assertions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facade::NullFacade;

    fn solver() -> BvSolver<NullFacade> {
        BvSolver::new(NullFacade::default())
    }

    #[test]
    fn scenario_add_constants() {
        let mut s = solver();
        let a = s.mk_const(8, Width::from_u64(8, 0x05));
        let b = s.mk_const(8, Width::from_u64(8, 0x0A));
        let sum = s.mk_add(8, a, b);
        assert_eq!(sum, s.mk_const(8, Width::from_u64(8, 0x0F)));
    }

    #[test]
    fn scenario_eq_then_diseq_emits_empty_clause() {
        #[derive(Default)]
        struct Recording {
            empty_clauses: u32,
            unit_clauses: u32,
            next_var: i32,
        }
        impl SatCoreFacade for Recording {
            fn fresh_bool_var(&mut self) -> i32 {
                self.next_var += 1;
                self.next_var
            }
            fn add_unit_clause(&mut self, _lit: Lit) {
                self.unit_clauses += 1;
            }
            fn add_empty_clause(&mut self) {
                self.empty_clauses += 1;
            }
        }
        impl EGraphFacade for Recording {}
        impl BitBlasterFacade for Recording {}

        let mut s = BvSolver::new(Recording::default());
        let x = s.mk_var(8);
        let y = s.mk_var(8);
        s.assert_eq(x, y, true);
        assert_eq!(s.facade.empty_clauses, 0);
        s.assert_eq(x, y, false);
        assert_eq!(s.facade.empty_clauses, 1);
    }

    #[test]
    fn scenario_ashr_all_ones_fixed_point() {
        let mut s = solver();
        let x = s.mk_const(8, Width::all_ones(8));
        let y = s.mk_var(8);
        let r = s.mk_binop(8, BinOp::Ashr, x, y);
        assert_eq!(r, x);
    }

    #[test]
    fn scenario_bit_array_uge_resolves_without_an_atom() {
        let mut s = solver();
        // One bit left unbound so this stays a BIT_ARRAY (an array with
        // every literal known would fold straight to a CONST, per §4.H.6),
        // while the known bits alone already settle the comparison.
        let x = s.mk_bit_array(vec![Lit::True, Lit::False, Lit::True, Lit::Unbound]);
        let zero = s.mk_const(4, Width::zero(4));
        let natoms_before = s.atoms().len();
        let result = s.mk_uge(x, zero);
        assert_eq!(result, Lit::True);
        assert_eq!(s.atoms().len(), natoms_before);
    }

    #[test]
    fn scenario_push_pop_restores_var_count() {
        let mut s = solver();
        let nvars = s.vars().len();
        s.push();
        s.mk_var(8);
        s.mk_var(8);
        s.mk_var(8);
        s.pop();
        assert_eq!(s.vars().len(), nvars);
        // the three ids are gone from the intern table too: constructing a
        // const that would have collided with their hashes still works.
        let c = s.mk_const(8, Width::from_u64(8, 1));
        assert_eq!(c.0, nvars);
    }

    #[test]
    fn scenario_polynomial_hash_consed_regardless_of_order() {
        let mut s = solver();
        let a = s.mk_var(8);
        let b = s.mk_var(8);
        let two = s.mk_const(8, Width::from_u64(8, 2));
        let three = s.mk_const(8, Width::from_u64(8, 3));
        let two_a = s.mk_mul(8, a, two);
        let three_b = s.mk_mul(8, b, three);
        let lhs = s.mk_add(8, two_a, three_b);
        let rhs = s.mk_add(8, three_b, two_a);
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn pop_clears_eterms_beyond_the_egraph_truncation() {
        #[derive(Default)]
        struct FixedEterms {
            next_var: i32,
            truncated_to: u32,
        }
        impl SatCoreFacade for FixedEterms {
            fn fresh_bool_var(&mut self) -> i32 {
                self.next_var += 1;
                self.next_var
            }
        }
        impl EGraphFacade for FixedEterms {
            fn eterm_count(&self) -> u32 {
                self.truncated_to
            }
        }
        impl BitBlasterFacade for FixedEterms {}

        // Both variables are allocated before the checkpoint so neither is
        // removed by the variable-table truncation itself; only the
        // E-graph-driven eterm clearing is under test here.
        let mut s = BvSolver::new(FixedEterms::default());
        let low = s.mk_var(8);
        let high = s.mk_var(8);
        s.attach_eterm(low, 0);
        s.attach_eterm(high, 5);
        s.push();
        s.mk_var(8);
        // The E-graph reports that popping truncated it back to 1 term: eterm
        // ids `>= 1` must be cleared, `0` must survive.
        s.facade.truncated_to = 1;
        s.pop();
        assert_eq!(s.eterm_of(low), Some(0));
        assert_eq!(s.eterm_of(high), None);
    }

    #[test]
    fn control_interface_stubs_are_inert() {
        let mut s = solver();
        let x = s.mk_var(8);
        let y = s.mk_var(8);
        let atom_lit = s.mk_uge(x, y);
        assert!(matches!(atom_lit, Lit::Var(_)));
        // The stubs exist and don't panic; they carry no real decision
        // procedure (spec §6, §9).
        s.start_internalization();
        s.start_search();
        assert_eq!(s.propagate(), PropagateResult::NoConflict);
        assert_eq!(s.final_check(), FinalCheckResult::Satisfiable);
        let atom_id = crate::atoms::AtomId(0);
        s.assert_atom(atom_id, true);
        assert!(s.select_polarity(atom_id));
        assert_eq!(s.expand_explanation(atom_id), vec![atom_id]);
    }
}
