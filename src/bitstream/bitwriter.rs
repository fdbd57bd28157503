use std::io::Write;

/// Size at which buffered output is handed to the writer.
const DRAIN_SIZE: usize = 64 * 1024;

/// Writes a bitstream for output. Bits are queued most-significant first, complete bytes are moved
/// into an output buffer, and the buffer is handed to the underlying writer whenever it grows past
/// DRAIN_SIZE or on request.
pub struct BitWriter<W: Write> {
    /// Output buffer used to write the bitstream.
    output: Vec<u8>,
    /// Private queue to hold bits that are waiting to be put as bytes into the output buffer.
    queue: u64,
    /// Count of valid bits in the queue.
    q_bits: u8,
    /// Bytes handed to the writer so far.
    bytes_out: u64,
    /// Handle to the output stream
    writer: W,
}

impl<W: Write> BitWriter<W> {
    /// Create a new BitWriter wrapping the writer.
    pub fn new(writer: W) -> Self {
        Self {
            output: Vec::with_capacity(DRAIN_SIZE + 8),
            queue: 0,
            q_bits: 0,
            bytes_out: 0,
            writer,
        }
    }

    /// Move every complete byte in the queue to the output buffer.
    #[inline(always)]
    fn push_queue(&mut self) {
        while self.q_bits > 7 {
            let byte = (self.queue >> (self.q_bits - 8)) as u8;
            self.output.push(byte); //push the packed byte out
            self.q_bits -= 8; //adjust the count of bits left in the queue
        }
    }

    /// Put up to 24 bits on the stream. The bit count is in the top byte, the data in the low 24 bits.
    #[inline(always)]
    pub fn out24(&mut self, data: u32) {
        let depth = (data >> 24) as u8;
        self.queue <<= depth;
        self.queue |= (data & (0x00ff_ffff >> (24 - depth as u32))) as u64;
        self.q_bits += depth;
        self.push_queue();
    }

    /// Put the low `n` bits of `value` on the stream, n <= 32.
    pub fn write_bits(&mut self, n: u8, value: u32) {
        if n > 24 {
            self.out24(((n as u32 - 16) << 24) | (value >> 16) & (u32::MAX >> (48 - n as u32)));
            self.out24(16 << 24 | (value & 0xffff));
        } else if n > 0 {
            self.out24((n as u32) << 24 | (value & (u32::MAX >> (32 - n as u32))));
        }
    }

    /// Put a single bit on the stream.
    pub fn out_bool(&mut self, bit: bool) {
        self.out24(0x01_000000 | bit as u32);
    }

    /// Put a byte on the stream.
    pub fn out8(&mut self, data: u8) {
        self.out24(0x08_000000 | data as u32);
    }

    /// Put a 16 bit word on the stream.
    pub fn out16(&mut self, data: u16) {
        self.out24(0x10_000000 | data as u32);
    }

    /// Put a 32 bit word on the stream.
    pub fn out32(&mut self, data: u32) {
        self.write_bits(32, data);
    }

    /// Put a 48 bit magic number on the stream.
    pub fn out48(&mut self, data: u64) {
        self.out24(0x18_000000 | (data >> 24) as u32 & 0x00ff_ffff);
        self.out24(0x18_000000 | data as u32 & 0x00ff_ffff);
    }

    /// Hand the buffered bytes to the writer if the buffer is large enough.
    pub fn drain(&mut self) -> std::io::Result<()> {
        if self.output.len() >= DRAIN_SIZE {
            self.write_output()?;
        }
        Ok(())
    }

    fn write_output(&mut self) -> std::io::Result<()> {
        self.writer.write_all(&self.output)?;
        self.bytes_out += self.output.len() as u64;
        self.output.clear();
        Ok(())
    }

    /// Flushes the remaining bits (1-7) from the queue, padding with 0s in the least
    /// signficant bits, then writes everything out and flushes the writer.
    pub fn finish(&mut self) -> std::io::Result<()> {
        self.push_queue();
        if self.q_bits > 0 {
            let byte = (self.queue << (8 - self.q_bits)) as u8;
            self.output.push(byte);
            self.q_bits = 0;
        }
        self.write_output()?;
        self.writer.flush()
    }

    /// Bytes handed to the writer so far.
    pub fn bytes_out(&self) -> u64 {
        self.bytes_out
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Debugging function. Report current position in the stream as [bytes.bits].
    pub fn loc(&self) -> String {
        format!(
            "[{}.{}]",
            self.bytes_out + self.output.len() as u64,
            self.q_bits
        )
    }
}
