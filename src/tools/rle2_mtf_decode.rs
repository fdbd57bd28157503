use crate::error::Bz2Error;

use super::tables::{RUNA, RUNB};

/// Undoes the RLE2 and Move-To-Front transforms. Symbols are fed in one at a time as the huffman
/// stage decodes them; bytes go to the BWT output buffer and are counted for the BWT decode.
pub struct MtfDecoder {
    /// Byte values in move-to-front order
    mtf_index: [u8; 256],
    n_in_use: usize,
    eob: u16,
    /// Pending zero run
    zeros: u64,
    bit_multiplier: u64,
    /// Largest block we will accept
    limit: usize,
    /// How many times each byte value has been output
    pub counts: [u32; 256],
}

impl MtfDecoder {
    /// Start a block. `symbols` is the ascending list of byte values in use.
    pub fn new(symbols: &[u8], limit: usize) -> Self {
        let mut mtf_index = [0_u8; 256];
        mtf_index[..symbols.len()].copy_from_slice(symbols);
        Self {
            mtf_index,
            n_in_use: symbols.len(),
            eob: symbols.len() as u16 + 1,
            zeros: 0,
            bit_multiplier: 1,
            limit,
            counts: [0; 256],
        }
    }

    /// Decode one symbol into `out`. Returns Ok(true) once the end-of-block symbol is seen.
    #[inline(always)]
    pub fn push(&mut self, symbol: u16, out: &mut Vec<u8>) -> Result<bool, Bz2Error> {
        match symbol {
            RUNA | RUNB => {
                self.zeros += self.bit_multiplier << symbol;
                self.bit_multiplier <<= 1;
                if self.zeros > self.limit as u64 {
                    return Err(Bz2Error::Data("zero run too long"));
                }
                Ok(false)
            }
            n => {
                self.flush_zeros(out)?;
                if n == self.eob {
                    return Ok(true);
                }
                let mut loc = n as usize - 1;
                if loc >= self.n_in_use {
                    return Err(Bz2Error::Data("move-to-front index out of range"));
                }
                if out.len() >= self.limit {
                    return Err(Bz2Error::Data("block overrun"));
                }
                let byte = self.mtf_index[loc];
                out.push(byte);
                self.counts[byte as usize] += 1;

                // Shift everything in front of it back one place, then put it at the front
                while loc > 0 {
                    self.mtf_index[loc] = self.mtf_index[loc - 1];
                    loc -= 1;
                }
                self.mtf_index[0] = byte;
                Ok(false)
            }
        }
    }

    /// Output any pending run of the front byte.
    fn flush_zeros(&mut self, out: &mut Vec<u8>) -> Result<(), Bz2Error> {
        if self.zeros > 0 {
            let zeros = self.zeros as usize;
            if out.len() + zeros > self.limit {
                return Err(Bz2Error::Data("block overrun"));
            }
            let byte = self.mtf_index[0];
            out.resize(out.len() + zeros, byte);
            self.counts[byte as usize] += zeros as u32;
            self.zeros = 0;
            self.bit_multiplier = 1;
        }
        Ok(())
    }
}
