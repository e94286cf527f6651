//! # Command Stream
//!
//! Append-only, bounded writer over caller-owned command word storage.

use ember_core::{Error, GpuAddr, Result};

use crate::opcodes::Opcode;
use crate::packet::{GPUADDR_WORDS, mem_packet_header};

// =============================================================================
// COMMAND STREAM
// =============================================================================

/// Bounded command word writer
///
/// Every append checks the remaining capacity before touching storage, so a
/// write either lands completely or the stream is left untouched and
/// [`Error::SequenceTooLarge`] is returned.
#[derive(Debug)]
pub struct CommandStream<'a> {
    /// Backing storage
    words: &'a mut [u32],
    /// Words written so far
    len: usize,
}

impl<'a> CommandStream<'a> {
    /// Create an empty stream over `words`
    pub fn new(words: &'a mut [u32]) -> Self {
        Self { words, len: 0 }
    }

    /// Number of words written
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing has been written
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total capacity in words
    #[inline]
    pub fn capacity(&self) -> usize {
        self.words.len()
    }

    /// Words still available
    #[inline]
    pub fn remaining(&self) -> usize {
        self.words.len() - self.len
    }

    /// Words written so far
    pub fn as_slice(&self) -> &[u32] {
        &self.words[..self.len]
    }

    /// Fail unless `count` more words fit
    pub fn reserve(&self, count: usize) -> Result<()> {
        let needed = self.len + count;
        if needed > self.words.len() {
            return Err(Error::SequenceTooLarge {
                needed,
                capacity: self.words.len(),
            });
        }
        Ok(())
    }

    /// Append a complete packet
    pub fn emit(&mut self, packet: &[u32]) -> Result<usize> {
        self.reserve(packet.len())?;
        self.words[self.len..self.len + packet.len()].copy_from_slice(packet);
        self.len += packet.len();
        Ok(packet.len())
    }

    /// Append a single word
    #[inline]
    pub fn push(&mut self, word: u32) -> Result<usize> {
        self.emit(&[word])
    }

    /// Append a GPU address as a low/high word pair
    #[inline]
    pub fn push_gpuaddr(&mut self, addr: GpuAddr) -> Result<usize> {
        self.emit(&[addr.lower_32_bits(), addr.upper_32_bits()])
    }

    /// Append a memory packet: header, target address, then `payload`
    ///
    /// Room for the whole packet is checked up front.
    pub fn emit_mem_packet(
        &mut self,
        opcode: Opcode,
        addr: GpuAddr,
        payload: &[u32],
    ) -> Result<usize> {
        self.reserve(1 + GPUADDR_WORDS as usize + payload.len())?;

        let mut count = self.push(mem_packet_header(opcode, payload.len() as u32, GPUADDR_WORDS))?;
        count += self.push_gpuaddr(addr)?;
        count += self.emit(payload)?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_capacity() {
        let mut storage = [0u32; 4];
        let mut stream = CommandStream::new(&mut storage);

        assert!(stream.is_empty());
        assert_eq!(stream.push(0xdead).unwrap(), 1);
        assert_eq!(stream.push_gpuaddr(GpuAddr::new(0x1_0000_2000)).unwrap(), 2);
        assert_eq!(stream.as_slice(), &[0xdead, 0x2000, 0x1]);
        assert_eq!(stream.remaining(), 1);
    }

    #[test]
    fn test_overflow_leaves_stream_untouched() {
        let mut storage = [0u32; 3];
        let mut stream = CommandStream::new(&mut storage);
        stream.push(1).unwrap();

        let err = stream.emit(&[2, 3, 4]).unwrap_err();
        assert_eq!(err, Error::SequenceTooLarge {
            needed: 4,
            capacity: 3
        });
        assert_eq!(stream.as_slice(), &[1]);
        drop(stream);
        assert_eq!(storage, [1, 0, 0]);
    }

    #[test]
    fn test_mem_packet_is_all_or_nothing() {
        let mut storage = [0u32; 5];
        let mut stream = CommandStream::new(&mut storage);

        assert!(stream
            .emit_mem_packet(Opcode::MemWrite, GpuAddr::new(0x1000), &[1, 2, 3])
            .is_err());
        assert!(stream.is_empty());

        let written = stream
            .emit_mem_packet(Opcode::MemWrite, GpuAddr::new(0x1000), &[7, 8])
            .unwrap();
        assert_eq!(written, 5);
        assert_eq!(&stream.as_slice()[1..], &[0x1000, 0, 7, 8]);
    }
}
