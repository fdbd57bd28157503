//! Reads the huffman section of a block: the symbol map, the coding tables and the selectors, and then
//! hands out the block's symbols one at a time.

use std::io::Read;

use log::trace;

use crate::bitstream::bitreader::BitReader;
use crate::error::Bz2Error;
use crate::tools::symbol_map::decode_sym_map;
use crate::tools::tables::{
    GROUP_SIZE, MAX_ALPHA_SIZE, MAX_CODE_LEN, MAX_DECODE_LEN, MAX_GROUPS, MAX_SELECTORS, MIN_GROUPS,
};

/// Canonical decoding table for one huffman table.
#[derive(Debug, Clone)]
pub struct DecodeTable {
    /// Largest code value of each length
    limit: [i32; MAX_DECODE_LEN],
    /// Offset from a code value to its place in perm, per length
    base: [i32; MAX_DECODE_LEN],
    /// Symbols in code order
    perm: [u16; MAX_ALPHA_SIZE],
    min_len: u32,
    alpha_size: usize,
}

impl DecodeTable {
    /// Build the table from code lengths, each in 1..=20.
    pub fn new(lens: &[u8]) -> Self {
        let min_len = lens.iter().copied().min().unwrap_or(1) as u32;
        let max_len = lens.iter().copied().max().unwrap_or(1) as u32;
        let mut table = DecodeTable {
            limit: [0; MAX_DECODE_LEN],
            base: [0; MAX_DECODE_LEN],
            perm: [0; MAX_ALPHA_SIZE],
            min_len,
            alpha_size: lens.len(),
        };
        hb_create_decode_tables(
            &mut table.limit,
            &mut table.base,
            &mut table.perm,
            lens,
            min_len,
            max_len,
        );
        table
    }

    /// Decode one symbol from the bitstream.
    #[inline(always)]
    pub fn decode<R: Read>(&self, br: &mut BitReader<R>) -> Result<u16, Bz2Error> {
        let mut zn = self.min_len;
        let mut zvec = br.bint(zn)? as i32;
        while zvec > self.limit[zn as usize] {
            zn += 1;
            if zn > MAX_CODE_LEN {
                return Err(Bz2Error::Data("huffman code too long"));
            }
            zvec = (zvec << 1) | br.bit()? as i32;
        }
        let idx = zvec - self.base[zn as usize];
        if idx < 0 || idx as usize >= self.alpha_size {
            return Err(Bz2Error::Data("huffman code out of range"));
        }
        Ok(self.perm[idx as usize])
    }
}

/// Fill in limit, base and perm for canonical codes with the given lengths.
pub fn hb_create_decode_tables(
    limit: &mut [i32; MAX_DECODE_LEN],
    base: &mut [i32; MAX_DECODE_LEN],
    perm: &mut [u16; MAX_ALPHA_SIZE],
    lens: &[u8],
    min_len: u32,
    max_len: u32,
) {
    let mut pp = 0;
    for i in min_len..=max_len {
        for (sym, &len) in lens.iter().enumerate() {
            if len as u32 == i {
                perm[pp] = sym as u16;
                pp += 1;
            }
        }
    }

    // Count the codes of each length, then make the counts cumulative
    base.fill(0);
    for &len in lens {
        base[len as usize + 1] += 1;
    }
    for i in 1..MAX_DECODE_LEN {
        base[i] += base[i - 1];
    }

    limit.fill(0);
    let mut vec = 0;
    for i in min_len as usize..=max_len as usize {
        vec += base[i + 1] - base[i];
        limit[i] = vec - 1;
        vec <<= 1;
    }
    for i in min_len as usize + 1..=max_len as usize {
        base[i] = ((limit[i - 1] + 1) << 1) - base[i];
    }
}

/// The decoding state of one block: the byte values in use, the tables, the selectors, and
/// how far through them we are.
#[derive(Debug)]
pub struct HuffmanDecoder {
    /// Byte values in use, ascending
    pub symbols: Vec<u8>,
    tables: Vec<DecodeTable>,
    selectors: Vec<u8>,
    /// Next selector to use
    next_group: usize,
    /// Symbols left in the current group
    group_pos: usize,
}

impl HuffmanDecoder {
    /// Read the symbol map, tables and selectors that start every block.
    pub fn read_tables<R: Read>(br: &mut BitReader<R>) -> Result<Self, Bz2Error> {
        // Symbol map: a 16 bit index, then a 16 bit map for each group of 16 byte values in use
        trace!("\r\x1b[43mReading symbol maps at {}.     \x1b[0m", br.loc());
        let mut sym_map = vec![br.bint(16)? as u16];
        for group in 0..16 {
            if sym_map[0] & (0x8000 >> group) != 0 {
                sym_map.push(br.bint(16)? as u16);
            }
        }
        let symbols = decode_sym_map(&sym_map);
        if symbols.is_empty() {
            return Err(Bz2Error::Data("no symbols in use"));
        }
        let alpha_size = symbols.len() + 2;

        let table_count = br.bint(3)? as usize;
        if !(MIN_GROUPS..=MAX_GROUPS).contains(&table_count) {
            return Err(Bz2Error::Data("bad table count"));
        }
        let selector_count = br.bint(15)? as usize;
        if !(1..=MAX_SELECTORS).contains(&selector_count) {
            return Err(Bz2Error::Data("bad selector count"));
        }

        // Selectors arrive Move-To-Front coded, each as a run of 1 bits ended by a 0
        trace!("\r\x1b[43mReading {} selectors at {}.     \x1b[0m", selector_count, br.loc());
        let mut table_idx = [0_u8, 1, 2, 3, 4, 5];
        let mut selectors = Vec::with_capacity(selector_count);
        for _ in 0..selector_count {
            let mut idx = 0;
            while br.bool_bit()? {
                idx += 1;
                if idx >= table_count {
                    return Err(Bz2Error::Data("selector out of range"));
                }
            }
            let selector = table_idx[idx];
            table_idx.copy_within(0..idx, 1);
            table_idx[0] = selector;
            selectors.push(selector);
        }

        // Each table is a 5 bit starting length, then a delta for each symbol
        let mut tables = Vec::with_capacity(table_count);
        let mut lens = [0_u8; MAX_ALPHA_SIZE];
        for t in 0..table_count {
            trace!("\r\x1b[43mReading huffman map {} at {}.   \x1b[0m", t, br.loc());
            let mut curr = br.bint(5)?;
            for len in lens.iter_mut().take(alpha_size) {
                loop {
                    if !(1..=MAX_CODE_LEN).contains(&curr) {
                        return Err(Bz2Error::Data("code length out of range"));
                    }
                    if !br.bool_bit()? {
                        break;
                    }
                    if br.bool_bit()? {
                        curr -= 1;
                    } else {
                        curr += 1;
                    }
                }
                *len = curr as u8;
            }
            tables.push(DecodeTable::new(&lens[..alpha_size]));
        }

        Ok(Self {
            symbols,
            tables,
            selectors,
            next_group: 0,
            group_pos: 0,
        })
    }

    /// Decode the next symbol, switching tables every 50 symbols.
    #[inline(always)]
    pub fn next_symbol<R: Read>(&mut self, br: &mut BitReader<R>) -> Result<u16, Bz2Error> {
        if self.group_pos == 0 {
            if self.next_group >= self.selectors.len() {
                return Err(Bz2Error::Data("ran out of selectors"));
            }
            self.next_group += 1;
            self.group_pos = GROUP_SIZE;
        }
        self.group_pos -= 1;
        let table = self.selectors[self.next_group - 1] as usize;
        self.tables[table].decode(br)
    }
}

#[cfg(test)]
mod test {
    use super::DecodeTable;
    use crate::bitstream::bitreader::BitReader;
    use crate::bitstream::bitwriter::BitWriter;
    use crate::huffman_coding::huffman_code_from_weights::{
        hb_assign_codes, improve_code_len_from_weights,
    };

    #[test]
    fn decode_table_test() {
        // Lengths [2, 2, 1] give codes 10, 11, 0
        let table = DecodeTable::new(&[2, 2, 1]);
        let data = [0b0101_1000_u8];
        let mut br = BitReader::new(&data[..]);
        assert_eq!(table.decode(&mut br).unwrap(), 2);
        assert_eq!(table.decode(&mut br).unwrap(), 0);
        assert_eq!(table.decode(&mut br).unwrap(), 1);
        assert_eq!(table.decode(&mut br).unwrap(), 2);
    }

    #[test]
    fn codes_round_trip_test() {
        let freqs = (0..40).map(|i| (i * 37 % 11) as u32).collect::<Vec<u32>>();
        let mut lens = [0_u8; 40];
        improve_code_len_from_weights(&mut lens, &freqs, 40, 20);
        let min = *lens.iter().min().unwrap() as u32;
        let max = *lens.iter().max().unwrap() as u32;
        let mut codes = [0_u32; 40];
        hb_assign_codes(&mut codes, &lens, min, max, 40);

        let mut out = vec![];
        {
            let mut bw = BitWriter::new(&mut out);
            for sym in (0..40).rev().chain(0..40) {
                bw.out24((lens[sym] as u32) << 24 | codes[sym]);
            }
            bw.finish().unwrap();
        }

        let table = DecodeTable::new(&lens);
        let mut br = BitReader::new(&out[..]);
        for sym in (0..40).rev().chain(0..40) {
            assert_eq!(table.decode(&mut br).unwrap(), sym as u16);
        }
    }

    #[test]
    fn bad_code_test() {
        // Lengths [1, 2] leave code 11 unused
        let table = DecodeTable::new(&[1, 2]);
        let data = [0b1100_0000_u8];
        let mut br = BitReader::new(&data[..]);
        assert!(table.decode(&mut br).is_err());
    }
}
