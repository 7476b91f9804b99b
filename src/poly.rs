//! Polynomial and power-product scratch buffers (spec §4.H.4, §4.H.5).
//!
//! These are reusable accumulators, owned by [`crate::simplify::Simplifier`]
//! and reset between constructions (spec §5 "Polynomial and power-product
//! *buffers* are scratch space owned by the solver instance and reused
//! across constructions"), the same role `expr_core::Store::add`/`::mul`
//! play when they flatten and fold a term list before interning, this
//! module is the canonicalizing accumulator, `simplify.rs` is the
//! constant-folding caller that drives it.

use crate::vars::VarId;
use crate::width::Width;
use std::collections::BTreeMap;

/// One term of a polynomial: `coeff * var`, or (when `var` is `None`) a
/// bare constant term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Monomial {
    pub coeff: Width,
    pub var: Option<VarId>,
}

/// Accumulates monomials in canonical order (spec §3: "the operand list is
/// in canonical order... and every monomial with non-zero coefficient
/// appears exactly once"). Canonical order here is ascending by variable
/// id, with the constant term (`var = None`) always sorting first: `None
/// < Some(_)` is exactly Rust's derived `Ord` for `Option`, so a
/// `BTreeMap<Option<VarId>, Width>` gives the right order for free.
pub struct PolyBuffer {
    bits: u32,
    terms: BTreeMap<Option<VarId>, Width>,
}

impl PolyBuffer {
    pub fn new(bits: u32) -> Self {
        Self {
            bits,
            terms: BTreeMap::new(),
        }
    }

    /// Add `coeff * var` (or, if `var` is `None`, the constant `coeff`) to
    /// the running sum, combining with any existing like term.
    pub fn add_term(&mut self, var: Option<VarId>, coeff: Width) {
        use crate::width::arith;
        match self.terms.remove(&var) {
            Some(existing) => {
                let sum = arith::add(self.bits, &existing, &coeff);
                if !sum.is_zero() {
                    self.terms.insert(var, sum);
                }
            }
            None => {
                if !coeff.is_zero() {
                    self.terms.insert(var, coeff);
                }
            }
        }
    }

    /// Drain the buffer into its canonical monomial list, emptying it for
    /// reuse on the next construction.
    pub fn drain_sorted(&mut self) -> Vec<Monomial> {
        std::mem::take(&mut self.terms)
            .into_iter()
            .map(|(var, coeff)| Monomial { coeff, var })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A single `base^exponent` factor of a power product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PowerFactor {
    pub base: VarId,
    pub exponent: u32,
}

/// Accumulates non-constant bases of a power product `∏ vᵢ^eᵢ` in
/// canonical (ascending variable id) order. Constant-factor folding into a
/// running coefficient is the caller's job (`simplify.rs`), since deciding
/// "is this operand constant" requires the variable table; this buffer
/// only ever sees already-non-constant bases.
pub struct PowerProductBuffer {
    factors: BTreeMap<VarId, u32>,
}

impl PowerProductBuffer {
    pub fn new() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    pub fn mul_base(&mut self, base: VarId, exponent: u32) {
        *self.factors.entry(base).or_insert(0) += exponent;
    }

    pub fn drain_sorted(&mut self) -> Vec<PowerFactor> {
        std::mem::take(&mut self.factors)
            .into_iter()
            .map(|(base, exponent)| PowerFactor { base, exponent })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

impl Default for PowerProductBuffer {
    fn default() -> Self {
        Self::new()
    }
}
