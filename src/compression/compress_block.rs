use std::io::Write;

use log::{debug, trace};

use crate::bitstream::bitwriter::BitWriter;
use crate::bwt_algorithms::block_sort::block_sort;
use crate::compression::compress::Block;
use crate::error::Bz2Error;
use crate::huffman_coding::huffman::huf_encode;
use crate::tools::rle2_mtf::rle2_mtf_encode;
use crate::tools::tables::BLOCK_MAGIC;

#[allow(clippy::unusual_byte_groupings)]
/// Called by the encoder, this handles one block and writes it to the output stream.
pub fn compress_block<W: Write>(bw: &mut BitWriter<W>, block: &mut Block) -> Result<(), Bz2Error> {
    // For each block, write the block header:
    // Six bytes of magic, 4 bytes of crc data, 1 bit for Randomized flag.
    trace!(
        "\r\x1b[43mWriting magic and CRC at {}.    \x1b[0m",
        bw.loc()
    );
    bw.out48(BLOCK_MAGIC);
    bw.out32(block.crc.value());

    block_sort(block)?;

    trace!(
        "\r\x1b[43mWriting randomize bit at {}.    \x1b[0m",
        bw.loc()
    );
    bw.out_bool(block.randomised);

    // Now that we have the key, we can write the 24bit BWT key
    trace!("\r\x1b[43mWriting key at {}.    \x1b[0m", bw.loc());
    bw.out24(0x18_000000 | block.key as u32);

    rle2_mtf_encode(block);

    // Now for the compression - the Huffman encoding (which also writes out data)
    huf_encode(bw, block)?;

    debug!(
        "         {} bytes in block, {} after MTF & RLE2 coding, {} syms in use",
        block.len(),
        block.rle2.len(),
        block.eob + 1,
    );
    debug!("         Bit stream now at {}", bw.loc());
    Ok(())
}
