use std::io::{self, Read};

use log::{error, info, trace};

use crate::bitstream::bitreader::BitReader;
use crate::bwt_algorithms::bwt_decode::BwtDecoder;
use crate::error::Bz2Error;
use crate::huffman_coding::huffman_decode::HuffmanDecoder;
use crate::tools::crc::{do_stream_crc, Crc32};
use crate::tools::rle1::Rle1Decoder;
use crate::tools::rle2_mtf_decode::MtfDecoder;
use crate::tools::tables::{BLOCK_MAGIC, BLOCK_UNIT, FOOTER_MAGIC};

/// Where the decoder is in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Nothing read yet
    StreamHeader,
    /// Expecting a block magic or the footer
    BlockHeader,
    /// Handing out the bytes of a block
    Block,
    /// Footer read, or an error was returned
    Done,
}

/// Decompresses a bzip2 stream read from the inner reader.
///
/// Blocks are decoded as they are needed. Each block's crc is checked as its last byte is handed
/// out, and the stream crc once the footer is read. The first error ends the stream: later reads
/// return end of stream.
pub struct BzDecoder<R: Read> {
    br: BitReader<R>,
    state: DecodeState,
    block_size: u32,
    bwt: BwtDecoder,
    rle: Rle1Decoder,
    crc: Crc32,
    stored_block_crc: u32,
    combined_crc: u32,
    block_no: u32,
    /// Error held back so the bytes before it can be returned by Read first
    pending: Option<Bz2Error>,
}

impl<R: Read> BzDecoder<R> {
    pub fn new(reader: R) -> Self {
        BzDecoder {
            br: BitReader::new(reader),
            state: DecodeState::StreamHeader,
            block_size: 0,
            bwt: BwtDecoder::default(),
            rle: Rle1Decoder::new(),
            crc: Crc32::new(),
            stored_block_crc: 0,
            combined_crc: 0,
            block_no: 0,
            pending: None,
        }
    }

    /// The next decompressed byte, or None at the end of the stream.
    pub fn read_byte(&mut self) -> Result<Option<u8>, Bz2Error> {
        match self.step() {
            Ok(byte) => Ok(byte),
            Err(e) => {
                self.state = DecodeState::Done;
                Err(e)
            }
        }
    }

    fn step(&mut self) -> Result<Option<u8>, Bz2Error> {
        loop {
            match self.state {
                DecodeState::StreamHeader => self.read_stream_header()?,
                DecodeState::BlockHeader => self.read_block_header()?,
                DecodeState::Block => {
                    let bwt = &mut self.bwt;
                    match self.rle.next(|| bwt.next_byte()) {
                        Some(byte) => {
                            self.crc.update(byte);
                            return Ok(Some(byte));
                        }
                        None => self.end_block()?,
                    }
                }
                DecodeState::Done => return Ok(None),
            }
        }
    }

    /// Look for a valid signature and the block size.
    fn read_stream_header(&mut self) -> Result<(), Bz2Error> {
        if self.br.bytes(3)? != b"BZh" {
            return Err(Bz2Error::BadStreamHeader);
        }
        let level = self.br.byte()?;
        if !(b'1'..=b'9').contains(&level) {
            return Err(Bz2Error::BadStreamHeader);
        }
        self.block_size = (level - b'0') as u32;
        self.bwt = BwtDecoder::new(self.block_size as usize * BLOCK_UNIT);
        info!("Found a valid bzip2 signature, block size {}00k.", self.block_size);
        self.state = DecodeState::BlockHeader;
        Ok(())
    }

    /// Read a block header and decode the whole block ready to hand out, or read the footer.
    fn read_block_header(&mut self) -> Result<(), Bz2Error> {
        trace!("\r\x1b[43mLooking for block magic at {}.    \x1b[0m", self.br.loc());
        let magic = self.br.magic()?;
        if magic == FOOTER_MAGIC {
            let stored = self.br.bint(32)?;
            if stored != self.combined_crc {
                error!(
                    "Stream crc error: stored {:#010x}, computed {:#010x}",
                    stored, self.combined_crc
                );
                return Err(Bz2Error::StreamCrc {
                    stored,
                    computed: self.combined_crc,
                });
            }
            info!("End of stream after {} blocks.", self.block_no);
            self.state = DecodeState::Done;
            return Ok(());
        }
        if magic != BLOCK_MAGIC {
            return Err(Bz2Error::BadBlockHeader);
        }

        self.block_no += 1;
        self.stored_block_crc = self.br.bint(32)?;
        let randomised = self.br.bool_bit()?;
        let key = self.br.bint(24)? as usize;

        // Huffman decode into the MTF stage, which fills the BWT buffer
        let mut huf = HuffmanDecoder::read_tables(&mut self.br)?;
        let mut mtf = MtfDecoder::new(&huf.symbols, self.block_size as usize * BLOCK_UNIT);
        self.bwt.ll8.clear();
        loop {
            let symbol = huf.next_symbol(&mut self.br)?;
            if mtf.push(symbol, &mut self.bwt.ll8)? {
                break;
            }
        }
        info!(
            "Block {}: {} bytes before RLE1, key {}{}",
            self.block_no,
            self.bwt.ll8.len(),
            key,
            if randomised { ", randomised" } else { "" }
        );

        self.bwt.start(&mtf.counts, key, randomised)?;
        self.rle.reset();
        self.crc.reset();
        self.state = DecodeState::Block;
        Ok(())
    }

    /// Check the crc of the block just handed out.
    fn end_block(&mut self) -> Result<(), Bz2Error> {
        let computed = self.crc.value();
        if computed != self.stored_block_crc {
            error!(
                "Block {} crc error: stored {:#010x}, computed {:#010x}",
                self.block_no, self.stored_block_crc, computed
            );
            return Err(Bz2Error::BlockCrc {
                block: self.block_no,
                stored: self.stored_block_crc,
                computed,
            });
        }
        self.combined_crc = do_stream_crc(self.combined_crc, computed);
        self.state = DecodeState::BlockHeader;
        Ok(())
    }

    /// Block size (1-9) from the stream header, 0 until the header has been read.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Stream crc of the blocks decoded so far.
    pub fn combined_crc(&self) -> u32 {
        self.combined_crc
    }

    /// Hands back the source. Input already buffered past the stream footer is not returned.
    pub fn into_inner(self) -> R {
        self.br.into_inner()
    }
}

impl<R: Read> Read for BzDecoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if let Some(e) = self.pending.take() {
            return Err(e.into());
        }
        for (i, slot) in buf.iter_mut().enumerate() {
            match self.read_byte() {
                Ok(Some(byte)) => *slot = byte,
                Ok(None) => return Ok(i),
                Err(e) if i == 0 => return Err(e.into()),
                Err(e) => {
                    self.pending = Some(e);
                    return Ok(i);
                }
            }
        }
        Ok(buf.len())
    }
}

/// Decompress a complete bzip2 stream held in a slice.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, Bz2Error> {
    let mut decoder = BzDecoder::new(data);
    let mut out = Vec::with_capacity(data.len() * 4);
    while let Some(byte) = decoder.read_byte()? {
        out.push(byte);
    }
    Ok(out)
}
