//! The disequality reasoner (spec §4.G): cheap, purely structural proofs
//! that two variables can *never* be equal, used to avoid creating and
//! asserting an `EQ` atom the theory can already refute for free. A `false`
//! result only ever means "not proven", it is never itself a proof of
//! equality, the same asymmetry `bounds::check_uge`/`check_sge` have with
//! `TriBool::Unknown`.

use crate::poly::{Monomial, PolyBuffer};
use crate::vars::{VarDef, VarId, VarTable};
use crate::width::{arith, Width};

/// Can `x` and `y` be proven structurally unequal without consulting the
/// merge table or bound reasoner?
pub fn must_differ(vars: &VarTable, x: VarId, y: VarId) -> bool {
    if x == y {
        return false;
    }
    let vx = vars.get(x).expect("live variable id");
    let vy = vars.get(y).expect("live variable id");

    match (&vx.def, &vy.def) {
        // Hash-consing guarantees two distinct Const ids never carry the
        // same value (spec §3 invariant 1), so distinct ids alone prove it.
        (VarDef::Const(_), VarDef::Const(_)) => true,

        (VarDef::Poly(a), VarDef::Poly(b)) => poly_diff_is_nonzero_constant(vx.bit_size, a, b),

        (VarDef::BitArray(a), VarDef::BitArray(b)) => bit_arrays_conflict(a, b),

        (VarDef::Const(c), VarDef::BitArray(lits)) | (VarDef::BitArray(lits), VarDef::Const(c)) => {
            const_conflicts_with_bit_array(c, lits)
        }

        (VarDef::Poly(terms), _) => poly_reduces_to_other_plus_nonzero_const(vx.bit_size, terms, y),
        (_, VarDef::Poly(terms)) => poly_reduces_to_other_plus_nonzero_const(vy.bit_size, terms, x),

        _ => false,
    }
}

/// `a - b`, reduced to canonical monomial form.
fn poly_difference(bits: u32, a: &[Monomial], b: &[Monomial]) -> Vec<Monomial> {
    let mut buf = PolyBuffer::new(bits);
    for m in a {
        buf.add_term(m.var, m.coeff.clone());
    }
    for m in b {
        buf.add_term(m.var, arith::neg(bits, &m.coeff));
    }
    buf.drain_sorted()
}

/// Two polynomials must differ if their difference collapses to a single
/// non-zero constant term: then one is provably the other plus a non-zero
/// offset, which can never be zero.
fn poly_diff_is_nonzero_constant(bits: u32, a: &[Monomial], b: &[Monomial]) -> bool {
    match poly_difference(bits, a, b).as_slice() {
        [Monomial { var: None, coeff }] => !coeff.is_zero(),
        _ => false,
    }
}

/// A polynomial `x = c + 1*y` (a single non-zero constant term plus `y`
/// with unit coefficient) must differ from `y` itself, since `x - y = c`
/// never vanishes.
fn poly_reduces_to_other_plus_nonzero_const(bits: u32, terms: &[Monomial], other: VarId) -> bool {
    let (mut constant, mut unit_var, mut other_terms) = (None, None, 0);
    for m in terms {
        match m.var {
            None => constant = Some(&m.coeff),
            Some(v) if v == other => {
                if m.coeff == Width::from_u64(bits, 1) {
                    unit_var = Some(v);
                } else {
                    other_terms += 1;
                }
            }
            Some(_) => other_terms += 1,
        }
    }
    other_terms == 0 && unit_var == Some(other) && constant.is_some_and(|c| !c.is_zero())
}

/// Same-kind bit array disequality (spec §4.G): any position whose two
/// literals are statically known to be negations of one another proves the
/// arrays differ there.
fn bit_arrays_conflict(a: &[crate::ops::Lit], b: &[crate::ops::Lit]) -> bool {
    a.iter().zip(b.iter()).any(|(&la, &lb)| la.is_negation_of(lb))
}

/// Constant vs bit array: any position where the constant's bit disagrees
/// with a statically known literal proves them unequal.
fn const_conflicts_with_bit_array(c: &Width, lits: &[crate::ops::Lit]) -> bool {
    use crate::ops::Lit;
    lits.iter().enumerate().any(|(i, lit)| match lit {
        Lit::True => !c.bit(i as u32),
        Lit::False => c.bit(i as u32),
        _ => false,
    })
}
