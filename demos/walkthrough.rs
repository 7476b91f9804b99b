//! A small worked walkthrough of the public `BvSolver` API, analogous in
//! spirit to the teacher's `examples/parse_records.rs`: a short `main` that
//! drives the library end to end and prints what happened, rather than a
//! test asserting it silently.

use bv_theory::facade::NullFacade;
use bv_theory::{BinOp, BvSolver, Lit, Width};

fn main() {
    let mut s = BvSolver::new(NullFacade::default());

    // Constant folding through the polynomial path (spec §8 scenario 1).
    let five = s.mk_const(8, Width::from_u64(8, 0x05));
    let ten = s.mk_const(8, Width::from_u64(8, 0x0A));
    let sum = s.mk_add(8, five, ten);
    println!("0x05 + 0x0A folds to {:?}", s.vars().get(sum).unwrap().def);

    // Two uninterpreted variables, asserted equal, then the merge table
    // catches the contradiction in a negative assertion of the same
    // equality for free (spec §8 scenario 2).
    let x = s.mk_var(8);
    let y = s.mk_var(8);
    s.assert_eq(x, y, true);
    println!("after asserting x == y: root(x) == root(y) = {}", s.merge().root(x) == s.merge().root(y));

    // A bit array with some bits pinned decides an unsigned inequality
    // without ever allocating an atom (spec §8 scenario 4).
    let bits = s.mk_bit_array(vec![Lit::True, Lit::False, Lit::True, Lit::False]);
    let zero = s.mk_const(4, Width::zero(4));
    let natoms_before = s.atoms().len();
    let result = s.mk_uge(bits, zero);
    println!(
        "uge([T,F,T,F], 0) = {result:?} ({} new atoms)",
        s.atoms().len() - natoms_before
    );

    // Arithmetic shift right of all-ones is a fixed point (spec §8 scenario 3).
    let all_ones = s.mk_const(8, Width::all_ones(8));
    let shift = s.mk_var(8);
    let shifted = s.mk_binop(8, BinOp::Ashr, all_ones, shift);
    println!("0xFF ashr anything == 0xFF: {}", shifted == all_ones);

    // Push a checkpoint, build some scratch variables, then pop: the table
    // sizes (and their intern records) return to exactly where they were
    // (spec §8 scenario 5).
    let nvars_before = s.vars().len();
    s.push();
    s.mk_var(8);
    s.mk_var(8);
    s.mk_var(8);
    s.pop();
    println!("push/pop round-trips variable count: {}", s.vars().len() == nvars_before);
}
