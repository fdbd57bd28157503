//! BitReader: A module for the Rust version of the standard BZIP2 library.
//!
//! Reads a packed bitstream for the block-oriented deconstruction of BZIP2 compressed files.
//! Bytes are pulled from the source only when the bits are actually needed.
//!
//! NOTE: This module can read from any I/O source that supports the read() call.
//!

use crate::error::Bz2Error;

const BUFFER_SIZE: usize = 64 * 1024;

/// Reads a binary Bzip2 stream.
#[derive(Debug)]
pub struct BitReader<R> {
    buffer: Vec<u8>,
    /// Next unread byte in the buffer
    cursor: usize,
    /// Valid bytes in the buffer
    filled: usize,
    /// Bits waiting to be handed out, right aligned.
    acc: u64,
    acc_bits: u32,
    /// Bytes taken out of the buffer so far
    consumed: u64,
    source: R,
}

impl<R: std::io::Read> BitReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            buffer: vec![0; BUFFER_SIZE],
            cursor: 0,
            filled: 0,
            acc: 0,
            acc_bits: 0,
            consumed: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns Ok(true) if we have data, Ok(false) if there is no more.
    fn have_data(&mut self) -> Result<bool, Bz2Error> {
        // Only try to read more data when the cursor has reached the end of what we have
        while self.cursor == self.filled {
            match self.source.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(size) => {
                    self.filled = size;
                    self.cursor = 0;
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(true)
    }

    /// Make sure at least n bits are in the accumulator.
    #[inline(always)]
    fn need(&mut self, n: u32) -> Result<(), Bz2Error> {
        while self.acc_bits < n {
            if !self.have_data()? {
                return Err(Bz2Error::UnexpectedEof);
            }
            self.acc = self.acc << 8 | self.buffer[self.cursor] as u64;
            self.cursor += 1;
            self.consumed += 1;
            self.acc_bits += 8;
        }
        Ok(())
    }

    /// Return the next n bits (n <= 32) as a u32.
    #[inline(always)]
    pub fn bint(&mut self, n: u32) -> Result<u32, Bz2Error> {
        if n == 0 {
            return Ok(0);
        }
        self.need(n)?;
        self.acc_bits -= n;
        Ok(((self.acc >> self.acc_bits) & (u64::MAX >> (64 - n))) as u32)
    }

    /// Return the next bit (1 or 0).
    #[inline(always)]
    pub fn bit(&mut self) -> Result<u32, Bz2Error> {
        self.bint(1)
    }

    /// Return *true* if the next bit is 1, *false* if 0, consuming the bit.
    pub fn bool_bit(&mut self) -> Result<bool, Bz2Error> {
        self.bit().map(|bit| bit == 1)
    }

    /// Returns the next 8 bits as a byte.
    pub fn byte(&mut self) -> Result<u8, Bz2Error> {
        self.bint(8).map(|byte| byte as u8)
    }

    /// Returns the next n bytes.
    pub fn bytes(&mut self, n: usize) -> Result<Vec<u8>, Bz2Error> {
        (0..n).map(|_| self.byte()).collect()
    }

    /// Returns the next 48 bits, used for block magic.
    pub fn magic(&mut self) -> Result<u64, Bz2Error> {
        let hi = self.bint(24)? as u64;
        let lo = self.bint(24)? as u64;
        Ok(hi << 24 | lo)
    }

    /// Hands back the source. Bytes already buffered are lost.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Debugging function. Report current position as [bytes.bits] consumed.
    pub fn loc(&self) -> String {
        let bits = self.consumed * 8 - self.acc_bits as u64;
        format!("[{}.{}]", bits / 8, bits % 8)
    }
}

#[cfg(test)]
mod test {
    use super::BitReader;
    use crate::error::Bz2Error;

    #[test]
    fn basic_test() {
        let x = [0b10000001_u8].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bit().unwrap(), 1);
        for _ in 0..6 {
            assert_eq!(br.bit().unwrap(), 0);
        }
        assert_eq!(br.bit().unwrap(), 1);
        assert!(matches!(br.bit(), Err(Bz2Error::UnexpectedEof)));
    }

    #[test]
    fn bint_test() {
        let x = [0b00011011].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bint(5).unwrap(), 3);
        assert_eq!(br.bint(1).unwrap(), 0);
        assert_eq!(br.bint(2).unwrap(), 3);
    }

    #[test]
    fn bint_across_bytes_test() {
        let x = [0xde, 0xad, 0xbe, 0xef, 0x80].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.bint(4).unwrap(), 0xd);
        assert_eq!(br.bint(32).unwrap(), 0xeadb_eef8);
        assert_eq!(br.bint(4).unwrap(), 0);
        assert!(br.bint(1).is_err());
    }

    #[test]
    fn bytes_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        assert_eq!(br.byte().unwrap(), b'H');
        assert_eq!(br.bytes(4).unwrap(), "ello".as_bytes().to_vec());
    }

    #[test]
    fn loc_test() {
        let x = "Hello, world!".as_bytes();
        let mut br = BitReader::new(x);
        br.bytes(5).unwrap();
        br.bit().unwrap();
        assert_eq!(br.loc(), "[5.1]");
    }

    #[test]
    fn magic_test() {
        let x = [0x31, 0x41, 0x59, 0x26, 0x53, 0x59, 0xff].as_slice();
        let mut br = BitReader::new(x);
        assert_eq!(br.magic().unwrap(), 0x3141_5926_5359);
        assert!(br.bool_bit().unwrap());
    }

    #[test]
    fn truncated_test() {
        let x = [0x31, 0x41].as_slice();
        let mut br = BitReader::new(x);
        assert!(matches!(br.magic(), Err(Bz2Error::UnexpectedEof)));
    }
}
