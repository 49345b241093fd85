//! Code labels and the two way bookkeeping behind address words.
//!
//! Decoding turns addresses into `LABEL_n` names handed out in discovery
//! order, so a given binary always lists the same way. Encoding runs the
//! other way: address words are written as zero placeholders the moment
//! a name is referenced and patched once its definition fixes the real
//! address.

use std::collections::HashMap;
use std::fmt;

use log::warn;
use thiserror::Error;

use crate::bytecode::io::patch_u32_le;

/// A code label, displayed as `LABEL_n`.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
pub struct LabelId(pub usize);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LABEL_{}", self.0)
    }
}

/// Addresses that decode as labels, numbered in discovery order.
#[derive(Debug, Default)]
pub struct LabelMap {
    // Address and whether its definition line has been listed yet.
    entries: Vec<(u32, bool)>,
}

impl LabelMap {
    /// Label for `address`, allocating the next number when new.
    pub fn id_for(&mut self, address: u32) -> LabelId {
        if let Some(at) = self.entries.iter().position(|(a, _)| *a == address) {
            return LabelId(at);
        }
        self.entries.push((address, false));
        LabelId(self.entries.len() - 1)
    }

    /// Label already allocated for `address`, if any.
    pub fn lookup(&self, address: u32) -> Option<LabelId> {
        self.entries
            .iter()
            .position(|(a, _)| *a == address)
            .map(LabelId)
    }

    pub fn mark_listed(&mut self, address: u32) {
        if let Some(at) = self.entries.iter().position(|(a, _)| *a == address) {
            self.entries[at].1 = true;
        }
    }

    /// First label, in allocation order, whose definition has not been
    /// listed yet. Drives the sweep over runs nothing jumped to yet.
    pub fn first_unlisted(&self) -> Option<(u32, LabelId)> {
        self.entries
            .iter()
            .position(|(_, listed)| !listed)
            .map(|at| (self.entries[at].0, LabelId(at)))
    }

    /// Lowest address any label points at.
    pub fn min_address(&self) -> Option<u32> {
        self.entries.iter().map(|(a, _)| *a).min()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RefError {
    #[error("slot {slot:#x} for {name} lies outside the assembled file")]
    SlotOutOfRange { name: String, slot: u32 },
}

/// Pending and resolved address words while a file is assembled.
#[derive(Debug, Default)]
pub struct RefTable {
    label_pending: HashMap<String, Vec<usize>>,
    label_addrs: HashMap<String, u32>,
    text_pending: HashMap<usize, Vec<usize>>,
    text_addrs: HashMap<usize, u32>,
}

impl RefTable {
    /// Appends the address word for `name` at the end of `out`: the real
    /// address when known, otherwise a placeholder to patch later.
    pub fn label_ref_here(&mut self, out: &mut Vec<u8>, name: &str) {
        let at = out.len();
        out.extend_from_slice(&[0; 4]);
        match self.label_addrs.get(name) {
            Some(addr) => patch_u32_le(out, at, *addr),
            None => self
                .label_pending
                .entry(name.to_string())
                .or_default()
                .push(at),
        }
    }

    /// Binds the address word for `name` to an existing `slot`, used for
    /// the handler and trigger words inside the header.
    pub fn label_ref_at(&mut self, out: &mut [u8], name: &str, slot: u32) -> Result<(), RefError> {
        let at = slot as usize;
        if at + 4 > out.len() {
            return Err(RefError::SlotOutOfRange {
                name: name.to_string(),
                slot,
            });
        }
        match self.label_addrs.get(name) {
            Some(addr) => patch_u32_le(out, at, *addr),
            None => {
                patch_u32_le(out, at, 0);
                self.label_pending
                    .entry(name.to_string())
                    .or_default()
                    .push(at);
            }
        }
        Ok(())
    }

    /// Appends the address word for text `id`, placeholder or real.
    pub fn text_ref_here(&mut self, out: &mut Vec<u8>, id: usize) {
        let at = out.len();
        out.extend_from_slice(&[0; 4]);
        match self.text_addrs.get(&id) {
            Some(addr) => patch_u32_le(out, at, *addr),
            None => self.text_pending.entry(id).or_default().push(at),
        }
    }

    /// Fixes `name` to the current end of `out` and patches every
    /// placeholder waiting on it.
    pub fn define_label(&mut self, out: &mut Vec<u8>, name: &str) {
        let addr = out.len() as u32;
        match self.label_pending.remove(name) {
            Some(slots) => {
                for at in slots {
                    patch_u32_le(out, at, addr);
                }
            }
            None => warn!("label {name} is defined but nothing references it"),
        }
        self.label_addrs.insert(name.to_string(), addr);
    }

    /// Fixes text `id` to the current end of `out`.
    pub fn define_text(&mut self, out: &mut Vec<u8>, id: usize) {
        let addr = out.len() as u32;
        match self.text_pending.remove(&id) {
            Some(slots) => {
                for at in slots {
                    patch_u32_le(out, at, addr);
                }
            }
            None => warn!("text {id} is listed but nothing references it"),
        }
        self.text_addrs.insert(id, addr);
    }

    /// Address a label was defined at, once known.
    pub fn label_address(&self, name: &str) -> Option<u32> {
        self.label_addrs.get(name).copied()
    }

    /// Names still waiting on a definition, sorted for reporting.
    pub fn undefined_labels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.label_pending.keys().cloned().collect();
        names.sort();
        names
    }

    /// Text ids still waiting on a definition, sorted for reporting.
    pub fn undefined_texts(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.text_pending.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_number_in_discovery_order() {
        let mut labels = LabelMap::default();
        let a = labels.id_for(0x500);
        let b = labels.id_for(0x408);
        assert_eq!(a.to_string(), "LABEL_0");
        assert_eq!(b.to_string(), "LABEL_1");
        assert_eq!(labels.id_for(0x500), a);
        assert_eq!(labels.lookup(0x408), Some(b));
        assert_eq!(labels.min_address(), Some(0x408));
    }

    #[test]
    fn unlisted_sweep_follows_allocation_order() {
        let mut labels = LabelMap::default();
        labels.id_for(0x500);
        labels.id_for(0x408);
        assert_eq!(labels.first_unlisted(), Some((0x500, LabelId(0))));
        labels.mark_listed(0x500);
        assert_eq!(labels.first_unlisted(), Some((0x408, LabelId(1))));
        labels.mark_listed(0x408);
        assert_eq!(labels.first_unlisted(), None);
    }

    #[test]
    fn forward_reference_is_patched_at_definition() {
        let mut refs = RefTable::default();
        let mut out = vec![0xAAu8; 4];
        refs.label_ref_here(&mut out, "LABEL_0");
        assert_eq!(&out[4..], [0, 0, 0, 0]);
        out.extend_from_slice(&[0xBB; 4]);

        refs.define_label(&mut out, "LABEL_0");
        assert_eq!(&out[4..8], [12, 0, 0, 0]);
        assert_eq!(refs.label_address("LABEL_0"), Some(12));
        assert!(refs.undefined_labels().is_empty());
    }

    #[test]
    fn backward_reference_writes_the_known_address() {
        let mut refs = RefTable::default();
        let mut out = vec![0u8; 8];
        refs.define_label(&mut out, "LABEL_0");
        refs.label_ref_here(&mut out, "LABEL_0");
        assert_eq!(&out[8..], [8, 0, 0, 0]);
    }

    #[test]
    fn header_slots_are_zeroed_until_defined() {
        let mut refs = RefTable::default();
        let mut out = vec![0xCCu8; 16];
        refs.label_ref_at(&mut out, "LABEL_0", 4).unwrap();
        assert_eq!(&out[4..8], [0, 0, 0, 0]);
        assert_eq!(&out[8..12], [0xCC; 4]);

        refs.define_label(&mut out, "LABEL_0");
        assert_eq!(&out[4..8], [16, 0, 0, 0]);

        assert!(matches!(
            refs.label_ref_at(&mut out, "LABEL_1", 14),
            Err(RefError::SlotOutOfRange { .. })
        ));
    }

    #[test]
    fn text_refs_mirror_label_refs() {
        let mut refs = RefTable::default();
        let mut out = Vec::new();
        refs.text_ref_here(&mut out, 0);
        refs.text_ref_here(&mut out, 0);
        assert_eq!(refs.undefined_texts(), [0]);

        refs.define_text(&mut out, 0);
        assert_eq!(&out[0..4], [8, 0, 0, 0]);
        assert_eq!(&out[4..8], [8, 0, 0, 0]);
        assert!(refs.undefined_texts().is_empty());
    }

    #[test]
    fn leftovers_are_reported_sorted() {
        let mut refs = RefTable::default();
        let mut out = Vec::new();
        refs.label_ref_here(&mut out, "LABEL_1");
        refs.label_ref_here(&mut out, "LABEL_0");
        refs.text_ref_here(&mut out, 3);
        refs.text_ref_here(&mut out, 1);
        assert_eq!(refs.undefined_labels(), ["LABEL_0", "LABEL_1"]);
        assert_eq!(refs.undefined_texts(), [1, 3]);
    }
}
