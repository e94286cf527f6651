//! # CP Opcodes
//!
//! Type-7 opcodes and the constant payload values that go with them.

// =============================================================================
// OPCODES
// =============================================================================

/// Type-7 packet opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Opcode {
    /// Skip the payload; also used to carry identifiers
    Nop              = 0x10,
    /// Wait for the CP micro engine to drain its own queue
    WaitForMe        = 0x13,
    /// Wait for the GPU pipeline to go idle
    WaitForIdle      = 0x26,
    /// Poll a register or memory location until it matches
    WaitRegMem       = 0x3c,
    /// Write payload words to memory
    MemWrite         = 0x3d,
    /// Jump to an indirect buffer, stalling the prefetch parser
    IndirectBufferPfe = 0x3f,
    /// Program draw state groups
    SetDrawState     = 0x43,
    /// Fire a pipeline event
    EventWrite       = 0x46,
    /// Switch TTBR0/CONTEXTIDR of a SMMU context bank
    SmmuTableUpdate  = 0x53,
}

impl Opcode {
    /// Get the raw opcode
    #[inline]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Look up an opcode from its raw value
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x10 => Some(Self::Nop),
            0x13 => Some(Self::WaitForMe),
            0x26 => Some(Self::WaitForIdle),
            0x3c => Some(Self::WaitRegMem),
            0x3d => Some(Self::MemWrite),
            0x3f => Some(Self::IndirectBufferPfe),
            0x43 => Some(Self::SetDrawState),
            0x46 => Some(Self::EventWrite),
            0x53 => Some(Self::SmmuTableUpdate),
            _ => None,
        }
    }
}

// =============================================================================
// PAYLOAD CONSTANTS
// =============================================================================

/// `CP_EVENT_WRITE` event: invalidate UCHE
pub const CACHE_INVALIDATE: u32 = 0x31;

/// `CP_SET_DRAW_STATE` flag word: disable all groups and drop cached base
/// pointers
pub const SET_DRAW_STATE_DISABLE_ALL: u32 = 0x40000;

/// `CP_WAIT_REG_MEM` function: compare for equality, poll a register
pub const WAIT_REG_MEM_EQ_REGISTER: u32 = 0x3;

/// Identifier written ahead of the memstore context update
pub const CONTEXT_TO_MEM_IDENTIFIER: u32 = 0x2EAD_BEEF;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opcode_roundtrip() {
        for op in [
            Opcode::Nop,
            Opcode::WaitForMe,
            Opcode::WaitForIdle,
            Opcode::SmmuTableUpdate,
        ] {
            assert_eq!(Opcode::from_raw(op.raw()), Some(op));
        }
        assert_eq!(Opcode::from_raw(0x7f), None);
    }
}
