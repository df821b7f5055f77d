//! Stack-machine opcodes seen by the native execution path
//!
//! Byte values follow the WebAssembly MVP binary encoding. Only the opcodes the
//! scanner's metrics table and the native backends care about are named here;
//! every other byte is still a valid `InstructionMetadata::op` and simply has no
//! `Opcode` counterpart.

/// Bytecode opcode enumeration (subset)
///
/// Opcodes are grouped the way the encoding groups them:
/// - 0x00-0x11: Control flow
/// - 0x1A-0x24: Parametric & variable access
/// - 0x28-0x3E: Memory access
/// - 0x41-0x44: Constants
/// - 0x50-0x5A: i64 comparison
/// - 0x7C-0x8A: i64 arithmetic, bitwise & shifts
/// - 0xA0-0xA3: f64 arithmetic
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // ===== Control Flow =====
    /// Trap unconditionally
    Unreachable = 0x00,
    /// No operation
    Nop = 0x01,
    /// Begin a block
    Block = 0x02,
    /// Begin a loop (branch target at its head)
    Loop = 0x03,
    /// Begin an if/else construct
    If = 0x04,
    /// Begin the else arm
    Else = 0x05,
    /// End a block, loop, if, or function body
    End = 0x0B,
    /// Unconditional branch
    Br = 0x0C,
    /// Conditional branch
    BrIf = 0x0D,
    /// Table branch
    BrTable = 0x0E,
    /// Return from the function
    Return = 0x0F,
    /// Direct call (operand: function index)
    Call = 0x10,
    /// Indirect call through a table
    CallIndirect = 0x11,

    // ===== Parametric & Variables =====
    /// Pop and discard the top of stack
    Drop = 0x1A,
    /// Select one of two operands
    Select = 0x1B,
    /// Push a local variable (operand: local index)
    GetLocal = 0x20,
    /// Pop into a local variable (operand: local index)
    SetLocal = 0x21,
    /// Store top of stack into a local without popping
    TeeLocal = 0x22,
    /// Push a global variable
    GetGlobal = 0x23,
    /// Pop into a global variable
    SetGlobal = 0x24,

    // ===== Memory =====
    /// Load 64-bit integer from linear memory
    I64Load = 0x29,
    /// Store 64-bit integer to linear memory
    I64Store = 0x37,

    // ===== Constants =====
    /// Push 32-bit integer constant
    I32Const = 0x41,
    /// Push 64-bit integer constant
    I64Const = 0x42,
    /// Push 32-bit float constant
    F32Const = 0x43,
    /// Push 64-bit float constant
    F64Const = 0x44,

    // ===== i64 Comparison =====
    /// Compare with zero
    I64Eqz = 0x50,
    /// Equal
    I64Eq = 0x51,
    /// Not equal
    I64Ne = 0x52,
    /// Less than (signed)
    I64LtS = 0x53,
    /// Less than (unsigned)
    I64LtU = 0x54,
    /// Greater than (signed)
    I64GtS = 0x55,
    /// Greater than (unsigned)
    I64GtU = 0x56,
    /// Less or equal (signed)
    I64LeS = 0x57,
    /// Less or equal (unsigned)
    I64LeU = 0x58,
    /// Greater or equal (signed)
    I64GeS = 0x59,
    /// Greater or equal (unsigned)
    I64GeU = 0x5A,

    // ===== i64 Arithmetic =====
    /// Add
    I64Add = 0x7C,
    /// Subtract
    I64Sub = 0x7D,
    /// Multiply
    I64Mul = 0x7E,
    /// Divide (signed)
    I64DivS = 0x7F,
    /// Divide (unsigned)
    I64DivU = 0x80,
    /// Remainder (signed)
    I64RemS = 0x81,
    /// Remainder (unsigned)
    I64RemU = 0x82,
    /// Bitwise and
    I64And = 0x83,
    /// Bitwise or
    I64Or = 0x84,
    /// Bitwise xor
    I64Xor = 0x85,
    /// Shift left
    I64Shl = 0x86,
    /// Shift right (arithmetic)
    I64ShrS = 0x87,
    /// Shift right (logical)
    I64ShrU = 0x88,
    /// Rotate left
    I64Rotl = 0x89,
    /// Rotate right
    I64Rotr = 0x8A,

    // ===== f64 Arithmetic =====
    /// Add
    F64Add = 0xA0,
    /// Subtract
    F64Sub = 0xA1,
    /// Multiply
    F64Mul = 0xA2,
    /// Divide
    F64Div = 0xA3,
}

impl Opcode {
    /// Decode an opcode byte, returning `None` for bytes this table does not name
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Unreachable),
            0x01 => Some(Self::Nop),
            0x02 => Some(Self::Block),
            0x03 => Some(Self::Loop),
            0x04 => Some(Self::If),
            0x05 => Some(Self::Else),
            0x0B => Some(Self::End),
            0x0C => Some(Self::Br),
            0x0D => Some(Self::BrIf),
            0x0E => Some(Self::BrTable),
            0x0F => Some(Self::Return),
            0x10 => Some(Self::Call),
            0x11 => Some(Self::CallIndirect),

            0x1A => Some(Self::Drop),
            0x1B => Some(Self::Select),
            0x20 => Some(Self::GetLocal),
            0x21 => Some(Self::SetLocal),
            0x22 => Some(Self::TeeLocal),
            0x23 => Some(Self::GetGlobal),
            0x24 => Some(Self::SetGlobal),

            0x29 => Some(Self::I64Load),
            0x37 => Some(Self::I64Store),

            0x41 => Some(Self::I32Const),
            0x42 => Some(Self::I64Const),
            0x43 => Some(Self::F32Const),
            0x44 => Some(Self::F64Const),

            0x50 => Some(Self::I64Eqz),
            0x51 => Some(Self::I64Eq),
            0x52 => Some(Self::I64Ne),
            0x53 => Some(Self::I64LtS),
            0x54 => Some(Self::I64LtU),
            0x55 => Some(Self::I64GtS),
            0x56 => Some(Self::I64GtU),
            0x57 => Some(Self::I64LeS),
            0x58 => Some(Self::I64LeU),
            0x59 => Some(Self::I64GeS),
            0x5A => Some(Self::I64GeU),

            0x7C => Some(Self::I64Add),
            0x7D => Some(Self::I64Sub),
            0x7E => Some(Self::I64Mul),
            0x7F => Some(Self::I64DivS),
            0x80 => Some(Self::I64DivU),
            0x81 => Some(Self::I64RemS),
            0x82 => Some(Self::I64RemU),
            0x83 => Some(Self::I64And),
            0x84 => Some(Self::I64Or),
            0x85 => Some(Self::I64Xor),
            0x86 => Some(Self::I64Shl),
            0x87 => Some(Self::I64ShrS),
            0x88 => Some(Self::I64ShrU),
            0x89 => Some(Self::I64Rotl),
            0x8A => Some(Self::I64Rotr),

            0xA0 => Some(Self::F64Add),
            0xA1 => Some(Self::F64Sub),
            0xA2 => Some(Self::F64Mul),
            0xA3 => Some(Self::F64Div),

            _ => None,
        }
    }

    /// Convert opcode to its byte value
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Text-format mnemonic, used in log output
    pub fn name(self) -> &'static str {
        match self {
            Self::Unreachable => "unreachable",
            Self::Nop => "nop",
            Self::Block => "block",
            Self::Loop => "loop",
            Self::If => "if",
            Self::Else => "else",
            Self::End => "end",
            Self::Br => "br",
            Self::BrIf => "br_if",
            Self::BrTable => "br_table",
            Self::Return => "return",
            Self::Call => "call",
            Self::CallIndirect => "call_indirect",
            Self::Drop => "drop",
            Self::Select => "select",
            Self::GetLocal => "get_local",
            Self::SetLocal => "set_local",
            Self::TeeLocal => "tee_local",
            Self::GetGlobal => "get_global",
            Self::SetGlobal => "set_global",
            Self::I64Load => "i64.load",
            Self::I64Store => "i64.store",
            Self::I32Const => "i32.const",
            Self::I64Const => "i64.const",
            Self::F32Const => "f32.const",
            Self::F64Const => "f64.const",
            Self::I64Eqz => "i64.eqz",
            Self::I64Eq => "i64.eq",
            Self::I64Ne => "i64.ne",
            Self::I64LtS => "i64.lt_s",
            Self::I64LtU => "i64.lt_u",
            Self::I64GtS => "i64.gt_s",
            Self::I64GtU => "i64.gt_u",
            Self::I64LeS => "i64.le_s",
            Self::I64LeU => "i64.le_u",
            Self::I64GeS => "i64.ge_s",
            Self::I64GeU => "i64.ge_u",
            Self::I64Add => "i64.add",
            Self::I64Sub => "i64.sub",
            Self::I64Mul => "i64.mul",
            Self::I64DivS => "i64.div_s",
            Self::I64DivU => "i64.div_u",
            Self::I64RemS => "i64.rem_s",
            Self::I64RemU => "i64.rem_u",
            Self::I64And => "i64.and",
            Self::I64Or => "i64.or",
            Self::I64Xor => "i64.xor",
            Self::I64Shl => "i64.shl",
            Self::I64ShrS => "i64.shr_s",
            Self::I64ShrU => "i64.shr_u",
            Self::I64Rotl => "i64.rotl",
            Self::I64Rotr => "i64.rotr",
            Self::F64Add => "f64.add",
            Self::F64Sub => "f64.sub",
            Self::F64Mul => "f64.mul",
            Self::F64Div => "f64.div",
        }
    }

    /// Check if this opcode can transfer control to another offset
    pub fn is_branch(self) -> bool {
        matches!(self, Self::Br | Self::BrIf | Self::BrTable)
    }

    /// Check if this opcode is a call instruction
    pub fn is_call(self) -> bool {
        matches!(self, Self::Call | Self::CallIndirect)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
