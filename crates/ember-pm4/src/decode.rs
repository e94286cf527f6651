//! # Packet Decoder
//!
//! Splits a command word stream back into packets. Used for debug dumps of
//! internal submissions and to check generated sequences.

use ember_core::{Error, Result};

use crate::opcodes::Opcode;
use crate::packet::{odd_parity_bit, TYPE4_MAX_COUNT, TYPE7_MAX_COUNT};
use crate::registers::extract_field;

// =============================================================================
// PACKET
// =============================================================================

/// A decoded packet borrowing its payload from the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Packet<'a> {
    /// Register write
    Type4 {
        /// First register written
        reg: u32,
        /// Values, one per consecutive register
        values: &'a [u32],
    },
    /// Opcode packet
    Type7 {
        /// Raw opcode
        opcode: u32,
        /// Payload words
        payload: &'a [u32],
    },
}

impl<'a> Packet<'a> {
    /// Total words including the header
    pub fn len(&self) -> usize {
        match self {
            Packet::Type4 { values, .. } => 1 + values.len(),
            Packet::Type7 { payload, .. } => 1 + payload.len(),
        }
    }

    /// Opcode of a type-7 packet
    pub fn opcode(&self) -> Option<Opcode> {
        match self {
            Packet::Type7 { opcode, .. } => Opcode::from_raw(*opcode),
            Packet::Type4 { .. } => None,
        }
    }

    /// Check for a type-7 packet with the given opcode
    pub fn is(&self, op: Opcode) -> bool {
        self.opcode() == Some(op)
    }

    /// Check for a type-4 write to `register`
    pub fn writes(&self, register: u32) -> bool {
        matches!(self, Packet::Type4 { reg, .. } if *reg == register)
    }

    /// Payload (type-7) or register values (type-4)
    pub fn payload(&self) -> &'a [u32] {
        match self {
            Packet::Type4 { values, .. } => *values,
            Packet::Type7 { payload, .. } => *payload,
        }
    }
}

// =============================================================================
// ITERATOR
// =============================================================================

/// Iterator over the packets of a command stream
///
/// Yields `(word offset, packet)`. A malformed header ends iteration after
/// one `Err(Error::InvalidCommand)`.
#[derive(Debug, Clone)]
pub struct PacketIter<'a> {
    words: &'a [u32],
    pos: usize,
}

/// Decode `words` packet by packet
pub fn decode(words: &[u32]) -> PacketIter<'_> {
    PacketIter { words, pos: 0 }
}

impl<'a> PacketIter<'a> {
    fn parse(&self, header: u32) -> Option<(usize, bool)> {
        match header >> 28 {
            4 => {
                let count = header & TYPE4_MAX_COUNT;
                let reg = extract_field(header, 8, 25);
                let ok = extract_field(header, 7, 7) == odd_parity_bit(count)
                    && extract_field(header, 27, 27) == odd_parity_bit(reg);
                Some((count as usize, ok))
            }
            7 => {
                let count = header & TYPE7_MAX_COUNT;
                let opcode = extract_field(header, 16, 22);
                let ok = extract_field(header, 15, 15) == odd_parity_bit(count)
                    && extract_field(header, 23, 23) == odd_parity_bit(opcode)
                    && extract_field(header, 24, 27) == 0;
                Some((count as usize, ok))
            }
            _ => None,
        }
    }
}

impl<'a> Iterator for PacketIter<'a> {
    type Item = Result<(usize, Packet<'a>)>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.pos;
        let header = *self.words.get(offset)?;

        let Some((count, parity_ok)) = self.parse(header) else {
            self.pos = self.words.len();
            return Some(Err(Error::InvalidCommand));
        };

        let start = offset + 1;
        let end = start + count;
        if !parity_ok || end > self.words.len() {
            self.pos = self.words.len();
            return Some(Err(Error::InvalidCommand));
        }

        let body = &self.words[start..end];
        self.pos = end;

        let packet = if header >> 28 == 4 {
            Packet::Type4 {
                reg: extract_field(header, 8, 25),
                values: body,
            }
        } else {
            Packet::Type7 {
                opcode: extract_field(header, 16, 22),
                payload: body,
            }
        };

        Some(Ok((offset, packet)))
    }
}
