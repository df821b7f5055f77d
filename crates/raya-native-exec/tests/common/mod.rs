//! Hand-assembled native routines for the host, following the trampoline's
//! register convention (stack base in r10/x9, locals base in r11/x10).

#![allow(dead_code)]

/// Which frame buffer an instruction addresses
#[derive(Clone, Copy)]
pub enum Frame {
    Stack,
    Locals,
}

/// Minimal emitter for `buf[index] += imm` sequences ending in `ret`
#[derive(Default)]
pub struct Emitter {
    code: Vec<u8>,
}

impl Emitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// `frame[index] += imm` on a 64-bit word
    #[cfg(target_arch = "x86_64")]
    pub fn add_word(&mut self, frame: Frame, index: u8, imm: u8) -> &mut Self {
        assert!(index < 16 && imm < 0x80);
        let rm = match frame {
            Frame::Stack => 0b010,  // r10
            Frame::Locals => 0b011, // r11
        };
        // REX.W+B, add r/m64 imm8, [reg + disp8]
        self.code.extend_from_slice(&[0x49, 0x83, 0x40 | rm, index * 8, imm]);
        self
    }

    #[cfg(target_arch = "aarch64")]
    pub fn add_word(&mut self, frame: Frame, index: u8, imm: u8) -> &mut Self {
        let base: u32 = match frame {
            Frame::Stack => 9,
            Frame::Locals => 10,
        };
        let idx = index as u32;
        let tmp = 11u32;
        let ldr = 0xF940_0000 | (idx << 10) | (base << 5) | tmp;
        let add = 0x9100_0000 | ((imm as u32) << 10) | (tmp << 5) | tmp;
        let str_ = 0xF900_0000 | (idx << 10) | (base << 5) | tmp;
        for word in [ldr, add, str_] {
            self.code.extend_from_slice(&word.to_le_bytes());
        }
        self
    }

    #[cfg(target_arch = "x86_64")]
    pub fn ret(&mut self) -> Vec<u8> {
        self.code.push(0xC3);
        std::mem::take(&mut self.code)
    }

    #[cfg(target_arch = "aarch64")]
    pub fn ret(&mut self) -> Vec<u8> {
        self.code.extend_from_slice(&0xD65F_03C0u32.to_le_bytes());
        std::mem::take(&mut self.code)
    }
}
