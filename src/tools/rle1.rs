//! Run-Length-Encoding phase 1. Runs of 4-255 identical bytes become four copies of the byte
//! followed by a count byte (0-251). Runs never cross a block boundary.

use crate::compression::compress::Block;

/// Longest run the encoder collects before flushing.
const MAX_RUN: u32 = 255;

/// Tracks the run of identical input bytes the encoder is currently collecting.
#[derive(Debug, Default)]
pub struct Rle1Encoder {
    run_char: Option<u8>,
    run_length: u32,
}

impl Rle1Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a byte. Returns a completed run (byte, length) when one is ready to be written.
    #[inline(always)]
    pub fn push(&mut self, byte: u8) -> Option<(u8, u32)> {
        match self.run_char {
            Some(c) if c == byte => {
                self.run_length += 1;
                if self.run_length >= MAX_RUN {
                    return self.take();
                }
                None
            }
            Some(c) => {
                let run = (c, self.run_length);
                self.run_char = Some(byte);
                self.run_length = 1;
                Some(run)
            }
            None => {
                self.run_char = Some(byte);
                self.run_length = 1;
                None
            }
        }
    }

    /// Return whatever run is pending and start over.
    pub fn take(&mut self) -> Option<(u8, u32)> {
        let run = self.run_char.take().map(|c| (c, self.run_length));
        self.run_length = 0;
        run
    }
}

/// Put one run into the block, updating the block crc and in-use flags. Returns false, writing
/// nothing, if the block is already full.
pub fn write_run(block: &mut Block, ch: u8, run_length: u32) -> bool {
    if block.last >= block.end {
        return false;
    }
    block.in_use[ch as usize] = true;
    block.crc.update_run(ch, run_length as usize);

    let literals = run_length.min(4);
    for _ in 0..literals {
        block.last += 1;
        block.data[(block.last + 1) as usize] = ch;
    }
    if run_length >= 4 {
        let count = (run_length - 4) as u8;
        block.in_use[count as usize] = true;
        block.last += 1;
        block.data[(block.last + 1) as usize] = count;
    }
    true
}

/// Expands RLE1 data one byte at a time. Bytes are pulled from the inverse BWT on demand.
#[derive(Debug, Default)]
pub struct Rle1Decoder {
    prev: Option<u8>,
    count: u8,
    repeat: u8,
}

impl Rle1Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Next decoded byte, or None once `pull` runs dry.
    #[inline(always)]
    pub fn next<F: FnMut() -> Option<u8>>(&mut self, mut pull: F) -> Option<u8> {
        loop {
            if self.repeat > 0 {
                self.repeat -= 1;
                return self.prev;
            }
            let byte = pull()?;
            // After four identical bytes, the next byte is a repeat count
            if self.count == 4 {
                self.repeat = byte;
                self.count = 0;
                continue;
            }
            if Some(byte) == self.prev {
                self.count += 1;
            } else {
                self.prev = Some(byte);
                self.count = 1;
            }
            return Some(byte);
        }
    }
}
