//! # Packet Headers
//!
//! Header word construction for type-4 and type-7 packets.

use crate::opcodes::Opcode;

// =============================================================================
// HEADER LAYOUT
// =============================================================================

/// Packet type in bits 31:28 of a type-4 header
pub const CP_TYPE4_PKT: u32 = 4 << 28;

/// Packet type in bits 31:28 of a type-7 header
pub const CP_TYPE7_PKT: u32 = 7 << 28;

/// Words used by a 64-bit GPU address in a packet payload
pub const GPUADDR_WORDS: u32 = 2;

/// Largest payload a type-4 header can describe
pub const TYPE4_MAX_COUNT: u32 = 0x7f;

/// Largest payload a type-7 header can describe
pub const TYPE7_MAX_COUNT: u32 = 0x3fff;

/// Odd parity bit over the nibbles of `val`
///
/// Returns 1 when `val` has an even number of set bits, so that the field
/// plus its parity bit always has odd parity.
#[inline]
pub const fn odd_parity_bit(val: u32) -> u32 {
    let folded = val
        ^ (val >> 4)
        ^ (val >> 8)
        ^ (val >> 12)
        ^ (val >> 16)
        ^ (val >> 20)
        ^ (val >> 24)
        ^ (val >> 28);
    (0x9669 >> (folded & 0xf)) & 1
}

/// Raw type-7 header
///
/// `count` is truncated to [`TYPE7_MAX_COUNT`] so it never spills into the
/// parity or opcode bits.
#[inline]
pub const fn type7_packet(opcode: u32, count: u32) -> u32 {
    let count = count & TYPE7_MAX_COUNT;
    CP_TYPE7_PKT
        | count
        | (odd_parity_bit(count) << 15)
        | ((opcode & 0x7f) << 16)
        | (odd_parity_bit(opcode) << 23)
}

/// Raw type-4 header
///
/// `count` is truncated to [`TYPE4_MAX_COUNT`].
#[inline]
pub const fn type4_packet(reg: u32, count: u32) -> u32 {
    let count = count & TYPE4_MAX_COUNT;
    CP_TYPE4_PKT
        | count
        | (odd_parity_bit(count) << 7)
        | ((reg & 0x3ffff) << 8)
        | (odd_parity_bit(reg) << 27)
}

// =============================================================================
// HEADER HELPERS
// =============================================================================

/// Header for an opcode packet followed by `payload_words` words
#[inline]
pub const fn packet_header(opcode: Opcode, payload_words: u32) -> u32 {
    type7_packet(opcode.raw(), payload_words)
}

/// Header for a write of `value_words` consecutive registers starting at `reg`
#[inline]
pub const fn register_write(reg: u32, value_words: u32) -> u32 {
    type4_packet(reg, value_words)
}

/// Header for a packet whose payload starts with GPU addresses
///
/// `addr_words` is the number of words taken by the addresses
/// ([`GPUADDR_WORDS`] per address), `payload_words` the words after them.
#[inline]
pub const fn mem_packet_header(opcode: Opcode, payload_words: u32, addr_words: u32) -> u32 {
    type7_packet(opcode.raw(), payload_words + addr_words)
}
