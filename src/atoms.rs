//! The atom table (spec §4.C): hash-consed Boolean facts over bit-vector
//! terms. Structurally identical in shape to `vars.rs` but much smaller
//! (three kinds, no payload beyond the two operands), the way the
//! teacher's `BlockInfoCode` (a three-variant enum, `bitstream.rs`) sits
//! next to its much larger `Abbreviation`/`Operand` machinery.

use crate::error::Error;
use crate::intern::{HashObj, InternTable};
use crate::ops::{fnv_mix, AtomKind, Lit};
use crate::vars::VarId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(pub u32);

#[derive(Debug, Clone, Copy)]
pub struct Atom {
    pub kind: AtomKind,
    pub left: VarId,
    pub right: VarId,
    /// The sentinel `Lit::Unbound` until first externalization (spec §4.C
    /// "lit is the sentinel 'unbound'").
    pub lit: Lit,
}

pub struct AtomTable {
    atoms: Vec<Atom>,
    intern: InternTable,
    max: u32,
}

impl AtomTable {
    pub fn new(max: u32) -> Self {
        Self {
            atoms: Vec::new(),
            intern: InternTable::new(),
            max,
        }
    }

    pub fn len(&self) -> u32 {
        self.atoms.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn get(&self, id: AtomId) -> Result<&Atom, Error> {
        self.atoms.get(id.0 as usize).ok_or(Error::InvalidAtom(id.0))
    }

    /// Hash-consed atom construction. For `EQ`, operands are normalized to
    /// ascending id order first (spec §3 "Atom": commutative
    /// normalization); `UGE`/`SGE` are not symmetric and are never
    /// swapped.
    pub fn mk_atom(&mut self, kind: AtomKind, left: VarId, right: VarId) -> AtomId {
        let (left, right) = if kind == AtomKind::Eq && left > right {
            (right, left)
        } else {
            (left, right)
        };
        let hash = hash_atom(kind, left, right);
        if let Some(id) = self.find(hash, kind, left, right) {
            return id;
        }
        let atom_id = self.atoms.len() as u32;
        if atom_id >= self.max {
            panic!("{}", crate::error::Fatal::AtomTableFull { max: self.max });
        }
        if self.atoms.len() == self.atoms.capacity() {
            let extra = (self.atoms.capacity().max(2)) / 2;
            self.atoms.reserve(extra);
        }
        self.atoms.push(Atom { kind, left, right, lit: Lit::Unbound });
        self.intern.note(hash, atom_id);
        AtomId(atom_id)
    }

    fn find(&self, hash: u64, kind: AtomKind, left: VarId, right: VarId) -> Option<AtomId> {
        struct Probe<'a> {
            atoms: &'a [Atom],
            hash: u64,
            kind: AtomKind,
            left: VarId,
            right: VarId,
        }
        impl HashObj for Probe<'_> {
            fn hash(&self) -> u64 {
                self.hash
            }
            fn equals(&self, id: u32) -> bool {
                let a = &self.atoms[id as usize];
                a.kind == self.kind && a.left == self.left && a.right == self.right
            }
        }
        self.intern
            .find(&Probe { atoms: &self.atoms, hash, kind, left, right })
            .map(AtomId)
    }

    /// Bind the fresh Boolean literal a caller allocated for this atom on
    /// first externalization (spec §4.C).
    pub fn bind_lit(&mut self, id: AtomId, lit: Lit) {
        let slot = &mut self.atoms[id.0 as usize].lit;
        debug_assert_eq!(*slot, Lit::Unbound, "atom literal already bound");
        *slot = lit;
    }

    /// Pop support (spec §4.C "Pop"): erase intern records for every atom
    /// id `>= natoms`, then truncate.
    pub fn truncate_to(&mut self, natoms: u32) {
        for id in (natoms..self.len()).rev() {
            let a = self.atoms[id as usize];
            let hash = hash_atom(a.kind, a.left, a.right);
            self.intern.erase(hash, id);
        }
        self.atoms.truncate(natoms as usize);
    }

    pub fn reset(&mut self) {
        self.atoms.clear();
        self.intern = InternTable::new();
    }
}

fn hash_atom(kind: AtomKind, left: VarId, right: VarId) -> u64 {
    let seed = match kind {
        AtomKind::Eq => 0x2389_a23f,
        AtomKind::Uge => 0x237b_c32f,
        AtomKind::Sge => 0x9afe_2ab2,
    };
    fnv_mix(fnv_mix(seed, left.0 as u64), right.0 as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eq_atom_normalizes_operand_order() {
        let mut t = AtomTable::new(1024);
        let x = VarId(5);
        let y = VarId(2);
        let a = t.mk_atom(AtomKind::Eq, x, y);
        let b = t.mk_atom(AtomKind::Eq, y, x);
        assert_eq!(a, b);
        assert_eq!(t.get(a).unwrap().left, y);
        assert_eq!(t.get(a).unwrap().right, x);
    }

    #[test]
    fn uge_atom_is_not_commutative() {
        let mut t = AtomTable::new(1024);
        let x = VarId(1);
        let y = VarId(2);
        let a = t.mk_atom(AtomKind::Uge, x, y);
        let b = t.mk_atom(AtomKind::Uge, y, x);
        assert_ne!(a, b);
    }

    #[test]
    fn pop_erases_intern_record() {
        let mut t = AtomTable::new(1024);
        let x = VarId(1);
        let y = VarId(2);
        let natoms = t.len();
        let _ = t.mk_atom(AtomKind::Eq, x, y);
        t.truncate_to(natoms);
        let again = t.mk_atom(AtomKind::Eq, x, y);
        assert_eq!(again.0, natoms);
    }
}
