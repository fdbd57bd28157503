use std::io::{self, Write};

use log::{debug, info};

use crate::bitstream::bitwriter::BitWriter;
use crate::bwt_algorithms::main_sort::OVERSHOOT;
use crate::error::Bz2Error;
use crate::tools::crc::{do_stream_crc, Crc32};
use crate::tools::rle1::{write_run, Rle1Encoder};
use crate::tools::tables::{BLOCK_UNIT, DEFAULT_WORK_FACTOR, FOOTER_MAGIC, MAX_ALPHA_SIZE};

use super::compress_block::compress_block;

/*
    The encoder is responsible for the bitstream writer, the block data passed to the block
    compression routine, and the stream crc.

    Input is run-length encoded (RLE1) straight into the block as it arrives. When a run does not
    fit, the block is passed to compress_block.rs for the BWT, MTF, RLE2 and huffman stages, and a
    fresh block is started with that run.
*/

/// Working storage for one block. Allocated once, from the block size, and reused for every block.
pub struct Block {
    /// RLE1 data, 1-based: the byte at position p is data[p + 1]. data[0] holds a copy of the last
    /// byte and the bytes after the end hold a copy of the start while sorting.
    pub data: Vec<u8>,
    pub quadrant: Vec<i32>,
    /// Sorted rotation start positions
    pub zptr: Vec<i32>,
    /// Two byte bucket table for the sort
    pub ftab: Vec<i32>,
    /// MTF/RLE2 symbols, ending with EOB
    pub rle2: Vec<u16>,
    pub freqs: [u32; MAX_ALPHA_SIZE],
    pub in_use: [bool; 256],
    /// Index of the last byte in the block, -1 when empty
    pub last: i32,
    /// The block takes no new runs once last reaches end
    pub end: i32,
    /// Sorted position of the unrotated data
    pub key: i32,
    pub eob: u16,
    /// Block number in the stream, from 1
    pub seq: u32,
    pub crc: Crc32,
    pub randomised: bool,
    pub work_factor: u32,
}

impl Block {
    /// Create a block for the given block size (1-9) and work factor.
    pub fn new(block_size: u32, work_factor: u32) -> Self {
        let n = block_size as usize * BLOCK_UNIT;
        Block {
            data: vec![0; n + OVERSHOOT + 2],
            quadrant: vec![0; n + OVERSHOOT],
            zptr: vec![0; n],
            ftab: vec![0; 65537],
            rle2: Vec::with_capacity(n + 1),
            freqs: [0; MAX_ALPHA_SIZE],
            in_use: [false; 256],
            last: -1,
            // Leave room for the longest run (5 bytes) and the end of block overshoot
            end: n as i32 - 20,
            key: 0,
            eob: 0,
            seq: 1,
            crc: Crc32::new(),
            randomised: false,
            work_factor,
        }
    }

    /// Empty the block ready for the next one.
    pub fn reset(&mut self) {
        self.last = -1;
        self.in_use = [false; 256];
        self.crc.reset();
        self.randomised = false;
        self.seq += 1;
    }

    /// Bytes of RLE1 data in the block.
    pub fn len(&self) -> usize {
        (self.last + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.last < 0
    }
}

/// Compresses everything written to it into a bzip2 stream on the inner writer.
///
/// The stream header goes out at construction. Blocks are written as they fill, and the last
/// block and the stream footer are written by `finish`. Dropping an unfinished encoder finishes
/// the stream, ignoring any error.
pub struct BzEncoder<W: Write> {
    bw: Option<BitWriter<W>>,
    block: Block,
    rle: Rle1Encoder,
    stream_crc: u32,
    blocks_randomised: u32,
    done: bool,
}

impl<W: Write> BzEncoder<W> {
    /// Start a stream with blocks of block_size * 100k bytes, block_size in 1..=9.
    pub fn new(writer: W, block_size: u32) -> Result<Self, Bz2Error> {
        if !(1..=9).contains(&block_size) {
            return Err(Bz2Error::InvalidBlockSize(block_size));
        }
        let mut bw = BitWriter::new(writer);

        // Put the header onto the bit stream
        bw.out8(b'B');
        bw.out8(b'Z');
        bw.out8(b'h');
        bw.out8(block_size as u8 + b'0');

        Ok(BzEncoder {
            bw: Some(bw),
            block: Block::new(block_size, DEFAULT_WORK_FACTOR),
            rle: Rle1Encoder::new(),
            stream_crc: 0,
            blocks_randomised: 0,
            done: false,
        })
    }

    /// Set how hard the sort tries before randomising a repetitive block, 1..=250.
    pub fn with_work_factor(mut self, work_factor: u32) -> Result<Self, Bz2Error> {
        if !(1..=250).contains(&work_factor) {
            return Err(Bz2Error::InvalidWorkFactor(work_factor));
        }
        self.block.work_factor = work_factor;
        Ok(self)
    }

    /// Compress a slice of input.
    pub fn write_data(&mut self, buf: &[u8]) -> Result<(), Bz2Error> {
        if self.done {
            return Err(Bz2Error::Internal("write after finish"));
        }
        for &byte in buf {
            if let Some((ch, run_length)) = self.rle.push(byte) {
                self.put_run(ch, run_length)?;
            }
        }
        Ok(())
    }

    /// Put a run into the current block, closing the block first if it is full.
    fn put_run(&mut self, ch: u8, run_length: u32) -> Result<(), Bz2Error> {
        if !write_run(&mut self.block, ch, run_length) {
            self.end_block()?;
            self.block.reset();
            if !write_run(&mut self.block, ch, run_length) {
                return Err(Bz2Error::Internal("run does not fit in an empty block"));
            }
        }
        Ok(())
    }

    /// Compress and write out the current block, if it has anything in it.
    fn end_block(&mut self) -> Result<(), Bz2Error> {
        if self.block.is_empty() {
            return Ok(());
        }
        let bw = self
            .bw
            .as_mut()
            .ok_or(Bz2Error::Internal("encoder has no writer"))?;

        let block_crc = self.block.crc.value();
        self.stream_crc = do_stream_crc(self.stream_crc, block_crc);
        info!(
            "Starting block {}: {} bytes after RLE1, crc {:#010x}",
            self.block.seq,
            self.block.len(),
            block_crc
        );

        compress_block(bw, &mut self.block)?;
        if self.block.randomised {
            self.blocks_randomised += 1;
        }
        bw.drain()?;
        debug!("    stream crc is now {:#010x}", self.stream_crc);
        Ok(())
    }

    /// Write the last block and the stream footer. Further calls do nothing.
    pub fn try_finish(&mut self) -> Result<(), Bz2Error> {
        if self.done {
            return Ok(());
        }
        if let Some((ch, run_length)) = self.rle.take() {
            self.put_run(ch, run_length)?;
        }
        self.end_block()?;

        let bw = self
            .bw
            .as_mut()
            .ok_or(Bz2Error::Internal("encoder has no writer"))?;
        bw.out48(FOOTER_MAGIC);
        bw.out32(self.stream_crc);
        bw.finish()?;
        self.done = true;
        info!(
            "Wrote {} blocks, {} bytes. Stream crc is {:#010x}.",
            self.block.seq - self.block.is_empty() as u32,
            bw.bytes_out(),
            self.stream_crc
        );
        Ok(())
    }

    /// Finish the stream and hand back the writer.
    pub fn finish(mut self) -> Result<W, Bz2Error> {
        self.try_finish()?;
        self.bw
            .take()
            .map(BitWriter::into_inner)
            .ok_or(Bz2Error::Internal("encoder has no writer"))
    }

    /// Compressed bytes handed to the writer so far.
    pub fn total_out(&self) -> u64 {
        self.bw.as_ref().map_or(0, BitWriter::bytes_out)
    }

    /// How many blocks were too repetitive to sort directly and were randomised.
    pub fn blocks_randomised(&self) -> u32 {
        self.blocks_randomised
    }

    /// The inner writer. None only after the writer has been handed back by finish.
    pub fn get_ref(&self) -> Option<&W> {
        self.bw.as_ref().map(BitWriter::get_ref)
    }
}

impl<W: Write> Write for BzEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_data(buf)?;
        Ok(buf.len())
    }

    /// Flushes the inner writer. Input still in the current block stays there until the block
    /// fills or the stream is finished.
    fn flush(&mut self) -> io::Result<()> {
        match self.bw.as_mut() {
            Some(bw) => bw.get_mut().flush(),
            None => Ok(()),
        }
    }
}

impl<W: Write> Drop for BzEncoder<W> {
    fn drop(&mut self) {
        if self.bw.is_some() {
            let _ = self.try_finish();
        }
    }
}

/// Compress a slice into a complete bzip2 stream.
pub fn compress(data: &[u8], block_size: u32) -> Result<Vec<u8>, Bz2Error> {
    let mut encoder = BzEncoder::new(Vec::new(), block_size)?;
    encoder.write_data(data)?;
    encoder.finish()
}

#[cfg(test)]
mod test {
    use super::{compress, Block, BzEncoder};
    use crate::error::ErrorKind;
    use crate::tools::rle1::write_run;
    use std::io::Write;

    #[test]
    fn empty_stream_test() {
        assert_eq!(
            compress(b"", 9).unwrap(),
            vec![0x42, 0x5a, 0x68, 0x39, 0x17, 0x72, 0x45, 0x38, 0x50, 0x90, 0, 0, 0, 0]
        );
    }

    #[test]
    fn block_size_test() {
        assert_eq!(
            BzEncoder::new(Vec::new(), 0).err().map(|e| e.kind()),
            Some(ErrorKind::Configuration)
        );
        assert!(BzEncoder::new(Vec::new(), 10).is_err());
        assert!(BzEncoder::new(Vec::new(), 1).unwrap().with_work_factor(0).is_err());
        assert!(BzEncoder::new(Vec::new(), 1).unwrap().with_work_factor(251).is_err());
    }

    #[test]
    fn header_test() {
        let out = compress(b"hello", 3).unwrap();
        assert_eq!(&out[..4], b"BZh3");
        assert_eq!(&out[4..10], &[0x31, 0x41, 0x59, 0x26, 0x53, 0x59]);
    }

    #[test]
    fn drop_finishes_test() {
        let mut out = vec![];
        {
            let mut enc = BzEncoder::new(&mut out, 1).unwrap();
            enc.write_all(b"dropped without finish").unwrap();
        }
        assert_eq!(out, compress(b"dropped without finish", 1).unwrap());
    }

    #[test]
    fn block_capacity_test() {
        // Single bytes fill a level 1 block up to 100000 - 19 bytes
        let mut block = Block::new(1, 50);
        let mut written = 0;
        while write_run(&mut block, (written % 2) as u8, 1) {
            written += 1;
        }
        assert_eq!(written, 99_981);
        assert_eq!(block.len(), 99_981);

        // A full length run still fits when the block is one short of closing
        let mut block = Block::new(1, 50);
        block.last = block.end - 1;
        assert!(write_run(&mut block, b'a', 255));
        assert_eq!(block.len(), 100_000 - 15);
        assert!(!write_run(&mut block, b'b', 1));
    }

    #[test]
    fn block_reset_test() {
        let mut block = Block::new(1, 50);
        assert!(block.is_empty());
        block.last = 10;
        block.in_use[7] = true;
        block.reset();
        assert!(block.is_empty());
        assert!(!block.in_use[7]);
        assert_eq!(block.seq, 2);
    }
}
