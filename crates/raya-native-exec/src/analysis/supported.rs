//! Opcode sets a native backend can compile

use crate::ops::Opcode;

/// Membership table over all 256 opcode bytes
#[derive(Clone, PartialEq, Eq)]
pub struct SupportedOpcodes {
    table: [bool; 256],
}

impl SupportedOpcodes {
    /// A set with nothing in it
    pub const fn empty() -> Self {
        SupportedOpcodes { table: [false; 256] }
    }

    /// The integer subset an x86-64 baseline backend compiles: 64-bit
    /// constants, local reads and writes, `i64.eqz`, and the binary i64
    /// arithmetic, comparison, bitwise, shift and division opcodes.
    pub fn baseline() -> Self {
        [
            Opcode::I64Const,
            Opcode::GetLocal,
            Opcode::SetLocal,
            Opcode::I64Eqz,
            Opcode::I64Eq,
            Opcode::I64Ne,
            Opcode::I64LtU,
            Opcode::I64GtU,
            Opcode::I64LeU,
            Opcode::I64GeU,
            Opcode::I64Shl,
            Opcode::I64ShrU,
            Opcode::I64ShrS,
            Opcode::I64DivU,
            Opcode::I64RemU,
            Opcode::I64DivS,
            Opcode::I64RemS,
            Opcode::I64Add,
            Opcode::I64Sub,
            Opcode::I64Mul,
            Opcode::I64And,
            Opcode::I64Or,
            Opcode::I64Xor,
        ]
        .into_iter()
        .collect()
    }

    /// Mark an opcode byte as compilable
    pub fn insert(&mut self, op: u8) {
        self.table[op as usize] = true;
    }

    /// Remove an opcode byte from the set
    pub fn remove(&mut self, op: u8) {
        self.table[op as usize] = false;
    }

    /// Whether the backend can compile `op`
    #[inline]
    pub fn contains(&self, op: u8) -> bool {
        self.table[op as usize]
    }

    /// Number of opcode bytes in the set
    pub fn len(&self) -> usize {
        self.table.iter().filter(|&&b| b).count()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        !self.table.iter().any(|&b| b)
    }

    /// Opcode bytes in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&op| self.contains(op))
    }
}

impl Default for SupportedOpcodes {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for SupportedOpcodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set()
            .entries(self.iter().map(|op| format!("{op:#04x}")))
            .finish()
    }
}

impl FromIterator<u8> for SupportedOpcodes {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = SupportedOpcodes::empty();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl FromIterator<Opcode> for SupportedOpcodes {
    fn from_iter<I: IntoIterator<Item = Opcode>>(iter: I) -> Self {
        iter.into_iter().map(Opcode::to_u8).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let set = SupportedOpcodes::empty();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
        assert!(!set.contains(Opcode::I64Add as u8));
    }

    #[test]
    fn test_baseline_contents() {
        let set = SupportedOpcodes::baseline();
        assert_eq!(set.len(), 23);
        assert!(set.contains(Opcode::I64Const as u8));
        assert!(set.contains(Opcode::SetLocal as u8));
        assert!(set.contains(Opcode::I64RemS as u8));
        assert!(!set.contains(Opcode::Call as u8));
        assert!(!set.contains(Opcode::I64LtS as u8));
        assert!(!set.contains(Opcode::F64Add as u8));
    }

    #[test]
    fn test_insert_remove() {
        let mut set = SupportedOpcodes::empty();
        set.insert(0xFF);
        assert!(set.contains(0xFF));
        set.remove(0xFF);
        assert!(!set.contains(0xFF));
    }

    #[test]
    fn test_iter_is_sorted() {
        let set: SupportedOpcodes = [0x7Cu8, 0x20, 0x42].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0x20, 0x42, 0x7C]);
    }
}
