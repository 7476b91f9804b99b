//! The algebraic simplifier and term constructors (spec §4.H), the
//! largest module in the crate. Every high-level constructor here runs the
//! same four-stage pipeline before it ever touches the variable table:
//! substitute operands by their merge-table root, fold if everything left
//! is constant, absorb the structural identities the arithmetic admits,
//! and otherwise build through a polynomial or power-product buffer so the
//! result lands in canonical form. Grounded on the same
//! "substitute, then dispatch on what's left" shape as `vars.rs`'s
//! `find`-then-`push_var` pattern, just one level up: here the substitution
//! is semantic (through the merge table) rather than purely structural.

use crate::facade::SatCoreFacade;
use crate::merge::MergeTable;
use crate::ops::{BinOp, Lit};
use crate::poly::{Monomial, PolyBuffer, PowerProductBuffer};
use crate::vars::{VarDef, VarId, VarTable};
use crate::width::{arith, Width};

/// Substitution step, full form (spec §4.H.1): replace an operand by the
/// root of its merge-table class.
fn substitute_root(merge: &MergeTable, id: VarId) -> VarId {
    merge.root(id)
}

/// Substitution step, constant-only form (spec §4.H.1 "for arithmetic
/// operators, replace it by the class root only if that root is a
/// constant"): keeps the original id whenever the root isn't a constant,
/// so a non-constant root doesn't get silently substituted into arithmetic
/// that a caller may still want expressed over the original term.
fn substitute_const_root(vars: &VarTable, merge: &MergeTable, id: VarId) -> VarId {
    let root = merge.root(id);
    match as_const(vars, root) {
        Some(_) => root,
        None => id,
    }
}

fn as_const(vars: &VarTable, id: VarId) -> Option<&Width> {
    match &vars.get(id).expect("live variable id").def {
        VarDef::Const(w) => Some(w),
        _ => None,
    }
}

/// `bv_add` (spec §4.H.2, §4.H.4). Folds to a constant when both operands
/// do; otherwise flattens into a polynomial buffer and returns the
/// buffer's canonical decay (spec §8 scenario 1).
pub fn mk_add(vars: &mut VarTable, merge: &MergeTable, bits: u32, x: VarId, y: VarId) -> VarId {
    let x = substitute_const_root(vars, merge, x);
    let y = substitute_const_root(vars, merge, y);
    if let (Some(a), Some(b)) = (as_const(vars, x), as_const(vars, y)) {
        let folded = arith::add(bits, a, b);
        return vars.mk_const(bits, folded);
    }
    let mut buf = PolyBuffer::new(bits);
    flatten_add(vars, &mut buf, bits, x);
    flatten_add(vars, &mut buf, bits, y);
    finish_poly(vars, bits, &mut buf)
}

/// `bv_sub`, same shape as `mk_add`, with the second operand's
/// contribution negated before it reaches the polynomial buffer.
pub fn mk_sub(vars: &mut VarTable, merge: &MergeTable, bits: u32, x: VarId, y: VarId) -> VarId {
    let x = substitute_const_root(vars, merge, x);
    let y = substitute_const_root(vars, merge, y);
    if let (Some(a), Some(b)) = (as_const(vars, x), as_const(vars, y)) {
        let folded = arith::sub(bits, a, b);
        return vars.mk_const(bits, folded);
    }
    let mut buf = PolyBuffer::new(bits);
    flatten_add(vars, &mut buf, bits, x);
    flatten_sub(vars, &mut buf, bits, y);
    finish_poly(vars, bits, &mut buf)
}

/// `bv_neg`, `0 - x`, expressed directly rather than via `mk_sub` so a
/// negated constant never round-trips through an extra polynomial lookup.
pub fn mk_neg(vars: &mut VarTable, merge: &MergeTable, bits: u32, x: VarId) -> VarId {
    let x = substitute_const_root(vars, merge, x);
    if let Some(a) = as_const(vars, x) {
        let folded = arith::neg(bits, a);
        return vars.mk_const(bits, folded);
    }
    let mut buf = PolyBuffer::new(bits);
    flatten_sub(vars, &mut buf, bits, x);
    finish_poly(vars, bits, &mut buf)
}

/// Add `id`'s contribution to a running polynomial sum: a constant term, a
/// flattened copy of an existing polynomial's terms, or (for anything
/// else) a single unit-coefficient monomial over `id` itself.
fn flatten_add(vars: &VarTable, buf: &mut PolyBuffer, bits: u32, id: VarId) {
    match &vars.get(id).expect("live variable id").def {
        VarDef::Const(w) => buf.add_term(None, w.clone()),
        VarDef::Poly(terms) => {
            for m in terms {
                buf.add_term(m.var, m.coeff.clone());
            }
        }
        _ => buf.add_term(Some(id), Width::from_u64(bits, 1)),
    }
}

/// Same as [`flatten_add`], with every coefficient negated first.
fn flatten_sub(vars: &VarTable, buf: &mut PolyBuffer, bits: u32, id: VarId) {
    match &vars.get(id).expect("live variable id").def {
        VarDef::Const(w) => buf.add_term(None, arith::neg(bits, w)),
        VarDef::Poly(terms) => {
            for m in terms {
                buf.add_term(m.var, arith::neg(bits, &m.coeff));
            }
        }
        _ => buf.add_term(Some(id), arith::neg(bits, &Width::from_u64(bits, 1))),
    }
}

/// Polynomial decay rules (spec §4.H.4): empty sum is zero, a single unit
/// monomial is just the variable, a single constant monomial is the
/// constant, otherwise hash-cons the `POLY`/`POLY64`.
fn finish_poly(vars: &mut VarTable, bits: u32, buf: &mut PolyBuffer) -> VarId {
    let terms = buf.drain_sorted();
    match terms.as_slice() {
        [] => vars.mk_const(bits, Width::zero(bits)),
        [Monomial { coeff, var: None }] => vars.mk_const(bits, coeff.clone()),
        [Monomial { coeff, var: Some(v) }] if *coeff == Width::from_u64(bits, 1) => *v,
        _ => vars.mk_poly(bits, terms),
    }
}

/// `bv_mul` (spec §4.H.2, §4.H.5). Folds to a constant when both operands
/// do; otherwise builds a power product, folding constant factors into a
/// running coefficient as it goes.
pub fn mk_mul(vars: &mut VarTable, merge: &MergeTable, bits: u32, x: VarId, y: VarId) -> VarId {
    let x = substitute_const_root(vars, merge, x);
    let y = substitute_const_root(vars, merge, y);
    if let (Some(a), Some(b)) = (as_const(vars, x), as_const(vars, y)) {
        let folded = arith::mul(bits, a, b);
        return vars.mk_const(bits, folded);
    }
    let mut coeff = Width::from_u64(bits, 1);
    let mut buf = PowerProductBuffer::new();
    flatten_mul(vars, &mut buf, &mut coeff, bits, x);
    flatten_mul(vars, &mut buf, &mut coeff, bits, y);
    finish_power_product(vars, bits, &mut buf, coeff)
}

/// Multiply `id`'s contribution into a running power product: a constant
/// factor gets folded into `coeff`; an existing power product's factors
/// are merged in directly; anything else contributes itself to the first
/// power.
fn flatten_mul(vars: &VarTable, buf: &mut PowerProductBuffer, coeff: &mut Width, bits: u32, id: VarId) {
    match &vars.get(id).expect("live variable id").def {
        VarDef::Const(w) => *coeff = arith::mul(bits, coeff, w),
        VarDef::Pprod(factors) => {
            for f in factors {
                buf.mul_base(f.base, f.exponent);
            }
        }
        _ => buf.mul_base(id, 1),
    }
}

/// Power-product decay rules (spec §4.H.5): coefficient zero collapses to
/// zero regardless of the factors; an empty product is just the
/// coefficient; a single base raised to the first power is that base
/// itself, not a one-factor `PPROD` (mirrors the original's `map_product`,
/// `examples/original_source/src/bvsolver.c:2624-2626`: `n == 1 && exp ==
/// 1` returns the bare variable); coefficient one returns the bare product;
/// otherwise wrap `coeff * product` as a single-monomial polynomial.
fn finish_power_product(vars: &mut VarTable, bits: u32, buf: &mut PowerProductBuffer, coeff: Width) -> VarId {
    if coeff.is_zero() {
        return vars.mk_const(bits, Width::zero(bits));
    }
    let factors = buf.drain_sorted();
    let product = match factors.as_slice() {
        [] => return vars.mk_const(bits, coeff),
        [f] if f.exponent == 1 => f.base,
        _ => vars.mk_pprod(bits, factors),
    };
    if coeff == Width::from_u64(bits, 1) {
        return product;
    }
    vars.mk_poly(bits, vec![Monomial { coeff, var: Some(product) }])
}

/// The eight binary operator forms (spec §4.H.2, §4.H.3), sharing one
/// pipeline: constant fold, then absorb, then fall back to hash-consing
/// the operator node.
pub fn mk_binop(vars: &mut VarTable, merge: &MergeTable, bits: u32, op: BinOp, x: VarId, y: VarId) -> VarId {
    let x = substitute_const_root(vars, merge, x);
    let y = substitute_const_root(vars, merge, y);
    if let (Some(a), Some(b)) = (as_const(vars, x), as_const(vars, y)) {
        let folded = eval_binop(bits, op, a, b);
        return vars.mk_const(bits, folded);
    }
    if let Some(absorbed) = absorb_binop(vars, bits, op, x) {
        return absorbed;
    }
    vars.mk_binop(bits, op, x, y)
}

fn eval_binop(bits: u32, op: BinOp, a: &Width, b: &Width) -> Width {
    match op {
        BinOp::Udiv => arith::udiv(bits, a, b),
        BinOp::Urem => arith::urem(bits, a, b),
        BinOp::Sdiv => arith::sdiv(bits, a, b),
        BinOp::Srem => arith::srem(bits, a, b),
        BinOp::Smod => arith::smod(bits, a, b),
        BinOp::Shl => arith::shl(bits, a, b),
        BinOp::Lshr => arith::lshr(bits, a, b),
        BinOp::Ashr => arith::ashr(bits, a, b),
    }
}

/// Structural absorption (spec §4.H.3): `SHL`/`LSHR` of zero is a fixed
/// point; `ASHR` is additionally a fixed point on all-ones (spec §8
/// scenario 3). Division and remainder forms get no structural absorption
/// beyond constant folding.
fn absorb_binop(vars: &VarTable, bits: u32, op: BinOp, x: VarId) -> Option<VarId> {
    match op {
        BinOp::Shl | BinOp::Lshr => as_const(vars, x).filter(|a| a.is_zero()).map(|_| x),
        BinOp::Ashr => as_const(vars, x)
            .filter(|a| a.is_zero() || a.is_all_ones(bits))
            .map(|_| x),
        _ => None,
    }
}

/// `bv_ite` (spec §4.H.3). A literal "true"/"false" condition folds away
/// immediately; a negated condition is normalized by swapping branches
/// (spec §3 "ITE" invariant) rather than ever being hash-consed negated.
pub fn mk_ite(
    vars: &mut VarTable,
    merge: &MergeTable,
    bits: u32,
    cond: Lit,
    then_branch: VarId,
    else_branch: VarId,
) -> VarId {
    let then_branch = substitute_root(merge, then_branch);
    let else_branch = substitute_root(merge, else_branch);
    match cond {
        Lit::True => then_branch,
        Lit::False => else_branch,
        Lit::Var(v) if v < 0 => vars.mk_ite(bits, Lit::Var(-v), else_branch, then_branch),
        _ => vars.mk_ite(bits, cond, then_branch, else_branch),
    }
}

/// Bit-array constant detection (spec §4.H.6): if every literal is
/// statically `true`/`false`, fold the array into the matching constant.
pub fn mk_bit_array(vars: &mut VarTable, lits: Vec<Lit>) -> VarId {
    let bits = lits.len() as u32;
    if let Some(value) = static_bit_array_value(bits, &lits) {
        return vars.mk_const(bits, value);
    }
    vars.mk_bit_array(lits)
}

fn static_bit_array_value(bits: u32, lits: &[Lit]) -> Option<Width> {
    let mut value = Width::zero(bits);
    for (i, lit) in lits.iter().enumerate() {
        match lit {
            Lit::True => value.set_bit(bits, i as u32, true),
            Lit::False => {}
            _ => return None,
        }
    }
    Some(value)
}

/// Bit selection (spec §4.H "Bit selection"). Constants and bit arrays
/// answer directly from their own descriptor; every other kind consults
/// (and lazily populates) the per-variable pseudo-literal map, allocating
/// a fresh Boolean variable through the SAT-core façade on first use.
pub fn select_bit(
    vars: &mut VarTable,
    merge: &MergeTable,
    sat: &mut dyn SatCoreFacade,
    x: VarId,
    i: u32,
) -> Lit {
    let x = merge.root(x);
    match &vars.get(x).expect("live variable id").def {
        VarDef::Const(w) => return if w.bit(i) { Lit::True } else { Lit::False },
        VarDef::BitArray(lits) => return lits[i as usize],
        _ => {}
    }
    let existing = vars.ensure_pseudo_map(x)[i as usize];
    if existing != Lit::Unbound {
        return existing;
    }
    let fresh = Lit::Var(sat.fresh_bool_var());
    vars.ensure_pseudo_map(x)[i as usize] = fresh;
    fresh
}
