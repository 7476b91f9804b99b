//! The bound reasoner (spec §4.F): cheap, purely structural unsigned and
//! signed range bounds per variable kind, plus the three-valued
//! `check_uge`/`check_sge` decision procedure built on top of them. Grounded
//! on the same "kind dictates the cheap answer, fall back to the wide case"
//! dispatch shape `vars.rs`'s `VarKind::rank` already uses for the merge
//! table.
//!
//! `CONST`/`CONST64` variables know their value exactly, so both bounds
//! collapse to it. `BIT_ARRAY` variables know some bits exactly and others
//! not at all, so the bound is built bit by bit from whichever literals are
//! statically `true`/`false`. Every other kind (`VAR`, polynomials, power
//! products, `ITE`, the eight binop kinds) gets no structural information at
//! all and falls back to the full range for its width.

use crate::ops::TriBool;
use crate::vars::{VarDef, VarId, VarTable};
use crate::width::Width;

/// Unsigned or signed lower bound for `x` (spec §4.F "Lower/Upper bound").
pub fn lower_bound(vars: &VarTable, x: VarId, signed: bool) -> Width {
    bound(vars, x, signed, false)
}

/// Unsigned or signed upper bound for `x`.
pub fn upper_bound(vars: &VarTable, x: VarId, signed: bool) -> Width {
    bound(vars, x, signed, true)
}

fn bound(vars: &VarTable, x: VarId, signed: bool, upper: bool) -> Width {
    let v = vars.get(x).expect("bound reasoner called on a live variable id");
    let bits = v.bit_size;
    match &v.def {
        VarDef::Const(w) => w.clone(),
        VarDef::BitArray(lits) => bitarray_bound(lits, signed, upper),
        _ => match (signed, upper) {
            (false, false) => Width::zero(bits),
            (false, true) => Width::all_ones(bits),
            (true, false) => Width::signed_min(bits),
            (true, true) => Width::signed_max(bits),
        },
    }
}

/// Build a bit-array bound bit by bit (spec §4.F "BIT_ARRAY"). Unsigned
/// bounds treat every bit the same way: an upper bound starts all-ones and
/// clears bit `i` whenever `a[i]` is statically `false`; a lower bound
/// starts at zero and sets bit `i` whenever `a[i]` is statically `true`.
/// Signed bounds apply that same rule to every bit except the sign bit,
/// then handle the sign bit specially: the signed upper bound clears it
/// unless it is statically `true`, and the signed lower bound sets it
/// unless it is statically `false`.
fn bitarray_bound(lits: &[crate::ops::Lit], signed: bool, upper: bool) -> Width {
    use crate::ops::Lit;

    let n = lits.len() as u32;
    let mut result = if upper { Width::all_ones(n) } else { Width::zero(n) };
    let sign_index = n - 1;

    for (i, lit) in lits.iter().enumerate() {
        let i = i as u32;
        if signed && i == sign_index {
            continue;
        }
        match (upper, lit) {
            (true, Lit::False) => result.set_bit(n, i, false),
            (false, Lit::True) => result.set_bit(n, i, true),
            _ => {}
        }
    }

    if signed {
        let sign_lit = lits[sign_index as usize];
        match (upper, sign_lit) {
            (true, Lit::True) => {}
            (true, _) => result.set_bit(n, sign_index, false),
            (false, Lit::False) => {}
            (false, _) => result.set_bit(n, sign_index, true),
        }
    }

    result
}

/// Three-valued unsigned `x >= y` (spec §4.F "check_uge"):
/// 1. `x == y` (same variable id) → `True`.
/// 2. `lo(x) >= up(y)` → `True`.
/// 3. `up(x) < lo(y)` → `False`.
/// 4. Otherwise → `Unknown`.
pub fn check_uge(vars: &VarTable, x: VarId, y: VarId) -> TriBool {
    if x == y {
        return TriBool::True;
    }
    let lo_x = lower_bound(vars, x, false);
    let up_y = upper_bound(vars, y, false);
    if !lo_x.ult(&up_y) {
        return TriBool::True;
    }
    let up_x = upper_bound(vars, x, false);
    let lo_y = lower_bound(vars, y, false);
    if up_x.ult(&lo_y) {
        return TriBool::False;
    }
    TriBool::Unknown
}

/// Three-valued signed `x >= y`, the same four-step shape as [`check_uge`]
/// but using signed bounds and signed comparison (spec §4.F "check_sge").
pub fn check_sge(vars: &VarTable, x: VarId, y: VarId) -> TriBool {
    if x == y {
        return TriBool::True;
    }
    let bits = vars.get(x).expect("live variable id").bit_size;
    let lo_x = lower_bound(vars, x, true);
    let up_y = upper_bound(vars, y, true);
    if !lo_x.slt(&up_y, bits) {
        return TriBool::True;
    }
    let up_x = upper_bound(vars, x, true);
    let lo_y = lower_bound(vars, y, true);
    if up_x.slt(&lo_y, bits) {
        return TriBool::False;
    }
    TriBool::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Lit;

    #[test]
    fn const_bounds_collapse_to_the_value() {
        let mut t = VarTable::new(1024);
        let c = t.mk_const(8, Width::from_u64(8, 42));
        assert_eq!(lower_bound(&t, c, false), Width::from_u64(8, 42));
        assert_eq!(upper_bound(&t, c, false), Width::from_u64(8, 42));
    }

    #[test]
    fn unconstrained_var_gets_full_range() {
        let mut t = VarTable::new(1024);
        let x = t.mk_var(8);
        assert_eq!(lower_bound(&t, x, false), Width::zero(8));
        assert_eq!(upper_bound(&t, x, false), Width::all_ones(8));
        assert_eq!(lower_bound(&t, x, true), Width::signed_min(8));
        assert_eq!(upper_bound(&t, x, true), Width::signed_max(8));
    }

    #[test]
    fn bit_array_unsigned_bound_is_pinned_where_known() {
        let mut t = VarTable::new(1024);
        // bits (lsb..msb): true, unbound, false, unbound -> lo=0b0001, up=0b1011
        let x = t.mk_bit_array(vec![Lit::True, Lit::Unbound, Lit::False, Lit::Unbound]);
        assert_eq!(lower_bound(&t, x, false), Width::from_u64(4, 0b0001));
        assert_eq!(upper_bound(&t, x, false), Width::from_u64(4, 0b1011));
    }

    #[test]
    fn bit_array_signed_bound_handles_sign_bit_separately() {
        let mut t = VarTable::new(1024);
        // Sign bit (index 3) left unbound: signed upper clears it, signed
        // lower sets it, regardless of what the unsigned rule would do.
        let x = t.mk_bit_array(vec![Lit::True, Lit::Unbound, Lit::Unbound, Lit::Unbound]);
        assert_eq!(upper_bound(&t, x, true), Width::from_u64(4, 0b0111));
        assert_eq!(lower_bound(&t, x, true), Width::from_u64(4, 0b1001));
    }

    #[test]
    fn bit_array_sign_bit_statically_known_is_respected() {
        let mut t = VarTable::new(1024);
        let neg = t.mk_bit_array(vec![Lit::Unbound, Lit::Unbound, Lit::Unbound, Lit::True]);
        assert_eq!(lower_bound(&t, neg, true), Width::signed_min(4));
        let pos = t.mk_bit_array(vec![Lit::Unbound, Lit::Unbound, Lit::Unbound, Lit::False]);
        assert_eq!(upper_bound(&t, pos, true), Width::from_u64(4, 0b0111));
    }

    #[test]
    fn check_uge_reflexive() {
        let mut t = VarTable::new(1024);
        let x = t.mk_var(8);
        assert_eq!(check_uge(&t, x, x), TriBool::True);
    }

    #[test]
    fn check_uge_decides_from_disjoint_bounds() {
        let mut t = VarTable::new(1024);
        let small = t.mk_const(8, Width::from_u64(8, 3));
        let big = t.mk_const(8, Width::from_u64(8, 200));
        assert_eq!(check_uge(&t, big, small), TriBool::True);
        assert_eq!(check_uge(&t, small, big), TriBool::False);
    }

    #[test]
    fn check_uge_unknown_when_ranges_overlap() {
        let mut t = VarTable::new(1024);
        let x = t.mk_var(8);
        let y = t.mk_var(8);
        assert_eq!(check_uge(&t, x, y), TriBool::Unknown);
    }

    #[test]
    fn check_sge_uses_signed_bounds() {
        let mut t = VarTable::new(1024);
        // all-ones, 8 bits, is -1 signed but 255 unsigned.
        let neg_one = t.mk_const(8, Width::all_ones(8));
        let one = t.mk_const(8, Width::from_u64(8, 1));
        assert_eq!(check_sge(&t, one, neg_one), TriBool::True);
        assert_eq!(check_sge(&t, neg_one, one), TriBool::False);
    }
}
