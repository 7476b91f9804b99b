//! The merge table: a checkpointable union-find over theory variables
//! (spec §4.D). No path compression is performed, per the REDESIGN FLAGS
//! note, compression is unsound across `pop` unless every compression is
//! itself recorded for undo, and the original avoids that complexity by
//! always aiming parent pointers at the "simplest" representative in the
//! first place. What *is* recorded, for checkpointing, is an undo log of
//! every parent pointer this table has ever overwritten since the last
//! `push`, replayed in reverse on `pop`, the standard rollback-union-find
//! shape, analogous to how the teacher's `BlockIter` threads an explicit
//! stack of `(block_local_abbrevs, ...)` frames through nested blocks
//! rather than mutating one shared structure destructively.

use crate::vars::VarId;

pub struct MergeTable {
    parent: Vec<VarId>,
    undo_log: Vec<Vec<(VarId, VarId)>>,
}

impl Default for MergeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MergeTable {
    pub fn new() -> Self {
        Self {
            parent: Vec::new(),
            undo_log: vec![Vec::new()],
        }
    }

    fn ensure(&mut self, id: VarId) {
        while self.parent.len() <= id.0 as usize {
            let i = self.parent.len() as u32;
            self.parent.push(VarId(i));
        }
    }

    /// Registers a newly allocated variable as its own (root) class. Must
    /// be called once per variable before `root`/`merge` ever see it;
    /// `solver.rs` does this right after `VarTable` hands back a fresh id.
    pub fn register(&mut self, id: VarId) {
        self.ensure(id);
    }

    /// Walk parent links to the fixed point (spec §4.D "root").
    pub fn root(&self, mut x: VarId) -> VarId {
        loop {
            let p = self.parent[x.0 as usize];
            if p == x {
                return x;
            }
            x = p;
        }
    }

    pub fn equiv(&self, x: VarId, y: VarId) -> bool {
        self.root(x) == self.root(y)
    }

    /// Merge the classes of two roots. `rank_of` ranks each side using the
    /// merge-table rank table (spec §4.D: `{CONST = 0, BIT_ARRAY = 1,
    /// other-compound = 2, VAR = 3}`, lower wins); ties break on the lower
    /// variable id, for determinism.
    ///
    /// Preconditions (debug-checked): `x != y`, and both `x` and `y` are
    /// already roots.
    pub fn merge(&mut self, x: VarId, y: VarId, rank_x: u8, rank_y: u8) {
        debug_assert_ne!(x, y, "merge requires distinct classes");
        debug_assert_eq!(self.root(x), x, "merge requires x to be a root");
        debug_assert_eq!(self.root(y), y, "merge requires y to be a root");
        let (winner, loser) = match rank_x.cmp(&rank_y) {
            std::cmp::Ordering::Less => (x, y),
            std::cmp::Ordering::Greater => (y, x),
            std::cmp::Ordering::Equal => {
                if x.0 <= y.0 {
                    (x, y)
                } else {
                    (y, x)
                }
            }
        };
        let old = self.parent[loser.0 as usize];
        self.undo_log.last_mut().expect("push always maintains a frame").push((loser, old));
        self.parent[loser.0 as usize] = winner;
    }

    /// Save the current mapping exactly (spec §4.D, §4.E).
    pub fn push(&mut self) {
        self.undo_log.push(Vec::new());
    }

    /// Restore the mapping to the prior checkpoint exactly (spec §4.D,
    /// invariant 4 "Push/pop idempotence").
    pub fn pop(&mut self) {
        let frame = self.undo_log.pop().expect("pop without matching push");
        for (x, old_parent) in frame.into_iter().rev() {
            self.parent[x.0 as usize] = old_parent;
        }
    }

    pub fn reset(&mut self) {
        self.parent.clear();
        self.undo_log = vec![Vec::new()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh(t: &mut MergeTable, n: u32) -> Vec<VarId> {
        (0..n)
            .map(|i| {
                let id = VarId(i);
                t.register(id);
                id
            })
            .collect()
    }

    #[test]
    fn root_of_root_is_itself() {
        let mut t = MergeTable::new();
        let vs = fresh(&mut t, 3);
        t.merge(vs[0], vs[1], 0, 3);
        let r = t.root(vs[1]);
        assert_eq!(t.root(r), r);
    }

    #[test]
    fn simpler_kind_becomes_root() {
        let mut t = MergeTable::new();
        let vs = fresh(&mut t, 2);
        // rank 0 (CONST) beats rank 3 (VAR).
        t.merge(vs[0], vs[1], 0, 3);
        assert_eq!(t.root(vs[1]), vs[0]);
    }

    #[test]
    fn push_pop_restores_mapping_exactly() {
        let mut t = MergeTable::new();
        let vs = fresh(&mut t, 4);
        t.merge(vs[0], vs[1], 0, 3);
        let before = (0..4).map(|i| t.root(vs[i])).collect::<Vec<_>>();
        t.push();
        t.merge(vs[2], vs[3], 2, 3);
        t.merge(t.root(vs[2]), t.root(vs[0]), 2, 0);
        t.pop();
        let after = (0..4).map(|i| t.root(vs[i])).collect::<Vec<_>>();
        assert_eq!(before, after);
    }

    #[test]
    fn equiv_reflects_merges() {
        let mut t = MergeTable::new();
        let vs = fresh(&mut t, 2);
        assert!(!t.equiv(vs[0], vs[1]));
        t.merge(vs[0], vs[1], 1, 3);
        assert!(t.equiv(vs[0], vs[1]));
    }
}
