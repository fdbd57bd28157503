//! CRC32 checksums for the Rust version of the standard BZIP2 library.
//!
//! BZIP2 uses the non-reflected CRC32 (polynomial 0x04c11db7) with an initial value of all ones
//! and a final complement. Each block carries the CRC of its uncompressed bytes, and the stream
//! footer carries a combination of all the block CRCs.

const POLY: u32 = 0x04c1_1db7;

/// Lookup table, built at compile time.
static CRC32_TABLE: [u32; 256] = make_table();

const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut c = (i as u32) << 24;
        let mut k = 0;
        while k < 8 {
            c = if c & 0x8000_0000 != 0 {
                (c << 1) ^ POLY
            } else {
                c << 1
            };
            k += 1;
        }
        table[i] = c;
        i += 1;
    }
    table
}

/// Running CRC for one block.
#[derive(Debug, Clone, Copy)]
pub struct Crc32 {
    crc: u32,
}

impl Crc32 {
    pub fn new() -> Self {
        Self { crc: 0xffff_ffff }
    }

    #[inline(always)]
    pub fn update(&mut self, byte: u8) {
        self.crc = (self.crc << 8) ^ CRC32_TABLE[((self.crc >> 24) as u8 ^ byte) as usize];
    }

    pub fn update_slice(&mut self, data: &[u8]) {
        data.iter().for_each(|&b| self.update(b));
    }

    /// Fold `count` copies of `byte` into the crc.
    pub fn update_run(&mut self, byte: u8, count: usize) {
        (0..count).for_each(|_| self.update(byte));
    }

    /// Finished crc value. The accumulator is left untouched.
    pub fn value(&self) -> u32 {
        !self.crc
    }

    pub fn reset(&mut self) {
        self.crc = 0xffff_ffff;
    }
}

impl Default for Crc32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Return the finished crc of a whole slice.
pub fn do_crc(data: &[u8]) -> u32 {
    let mut crc = Crc32::new();
    crc.update_slice(data);
    crc.value()
}

/// Fold a block crc into the stream crc.
#[inline(always)]
pub fn do_stream_crc(stream_crc: u32, block_crc: u32) -> u32 {
    ((stream_crc << 1) | (stream_crc >> 31)) ^ block_crc
}
