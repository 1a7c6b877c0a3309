use std::collections::HashSet;

use crate::bytecode::{checksum, Emit, OpCode};

/// The trailing table mapping hashes back to the names they were computed
/// from, in order of first use.
#[derive(Debug, Default)]
pub struct NameTable {
    entries: Vec<(u32, String)>,
    seen: HashSet<u32>,
}

impl NameTable {
    pub fn new() -> NameTable {
        NameTable::default()
    }

    /// Hashes `name`, recording it unless its hash is already known. Names
    /// differing only in case share a hash and keep the first spelling.
    pub fn insert(&mut self, name: &str) -> u32 {
        let hash = checksum(name);
        if self.seen.insert(hash) {
            self.entries.push((hash, name.to_owned()));
        }
        hash
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(hash, name)| (*hash, name.as_str()))
    }

    pub fn write(&self, code: &mut Vec<u8>) {
        for (hash, name) in self.iter() {
            code.op(OpCode::NameTableEntry);
            code.u32(hash);
            code.c_str(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_spelling_in_first_use_order() {
        let mut names = NameTable::new();
        let b = names.insert("Beta");
        let a = names.insert("alpha");
        assert_eq!(names.insert("BETA"), b);
        assert_eq!(names.insert("alpha"), a);

        let entries: Vec<_> = names.iter().collect();
        assert_eq!(entries, [(b, "Beta"), (a, "alpha")]);
    }

    #[test]
    fn writes_entries() {
        let mut names = NameTable::new();
        let hash = names.insert("x");
        let mut code = Vec::new();
        names.write(&mut code);

        let mut expected = vec![0x2B];
        expected.extend_from_slice(&hash.to_le_bytes());
        expected.extend_from_slice(b"x\0");
        assert_eq!(code, expected);
    }
}
