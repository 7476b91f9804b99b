//! Generic hash-cons intern table (spec §4.A).
//!
//! Grounded on two shapes already present in the pack: the arena +
//! `HashMap<NodeKey, ExprId>` interner in `expr_core::Store` (structural
//! key hashed and compared wholesale) and the teacher's own
//! `HashMap<u32, Vec<Arc<Abbreviation>>>` bucketed registries in
//! `src/read.rs::BitStreamReader` (several candidates share a key, resolved
//! by a linear scan of the bucket). This table takes the bucketed shape,
//! because spec §9 explicitly forbids a single process-wide "hash object"
//! singleton per kind, every call site builds its own transient
//! descriptor on the stack and asks this table to find-or-build against
//! it, so the key type itself is never stored: only the `u64` hash and a
//! caller-supplied equality check against an *already built* id.

use std::collections::HashMap;

/// A transient descriptor for a candidate compound term or atom: it knows
/// its own hash and how to compare itself against an id that may already
/// be resident in the owning table (spec §4.A "a hash function, an
/// equality predicate against an existing id, and a builder").
pub trait HashObj {
    /// Kind-specific structural hash (Jenkins-style mixes of operand ids,
    /// coefficients and bit-width per spec §4.B).
    fn hash(&self) -> u64;
    /// Structural equality against the descriptor already stored at `id`
    /// in the owning table.
    fn equals(&self, id: u32) -> bool;
}

/// Maps `hash -> [ids with that hash]`. Lookup hashes then linearly scans
/// the (usually one-element) bucket calling `equals`: amortized O(1) as
/// required by spec §4.A.
#[derive(Debug, Default, Clone)]
pub struct InternTable {
    buckets: HashMap<u64, Vec<u32>>,
}

impl InternTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// `find`, no insertion, used for speculative lookups (spec §4.A).
    pub fn find(&self, obj: &dyn HashObj) -> Option<u32> {
        self.buckets
            .get(&obj.hash())
            .and_then(|bucket| bucket.iter().copied().find(|&id| obj.equals(id)))
    }

    /// Find-or-build: on a hit, returns the existing id; on a miss, calls
    /// `build` (which allocates the new variable/atom slot) and inserts the
    /// resulting id keyed by `obj`'s hash.
    pub fn get_or_insert_with(&mut self, obj: &dyn HashObj, build: impl FnOnce() -> u32) -> u32 {
        if let Some(id) = self.find(obj) {
            return id;
        }
        let id = build();
        self.buckets.entry(obj.hash()).or_default().push(id);
        id
    }

    /// Records a freshly built id under `hash` without probing first:
    /// used by callers (`vars.rs`, `atoms.rs`) that must build the new
    /// entry themselves because the builder needs a mutable borrow of the
    /// same table the lookup key borrows immutably (see `VarTable::find`).
    pub fn note(&mut self, hash: u64, id: u32) {
        self.buckets.entry(hash).or_default().push(id);
    }

    /// Removes a `(hash, id)` pair without disturbing the rest of the
    /// table, used during `pop` to erase ids beyond the trail checkpoint
    /// (spec §4.A, §4.B "Pop").
    pub fn erase(&mut self, hash: u64, id: u32) {
        if let Some(bucket) = self.buckets.get_mut(&hash) {
            bucket.retain(|&x| x != id);
            if bucket.is_empty() {
                self.buckets.remove(&hash);
            }
        }
    }
}
