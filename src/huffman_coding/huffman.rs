use std::cmp::Ordering;
use std::io::Write;

use log::{debug, trace};

use super::huffman_code_from_weights::{hb_assign_codes, improve_code_len_from_weights};
use crate::bitstream::bitwriter::BitWriter;
use crate::compression::compress::Block;
use crate::error::Bz2Error;
use crate::tools::symbol_map::encode_sym_map;
use crate::tools::tables::{GROUP_SIZE, MAX_ALPHA_SIZE, MAX_CODE_LEN, MAX_GROUPS, MAX_SELECTORS, N_ITERS};

/// Initial cost of a symbol inside a table's band, and outside it.
const LESSER_ICOST: u8 = 0;
const GREATER_ICOST: u8 = 15;

#[allow(clippy::unusual_byte_groupings)]
/// Encode the MTF/RLE2 data in block.rle2 using Julian's multi-table system, writing the symbol map,
/// tables, selectors and coded symbols to the bitstream.
pub fn huf_encode<W: Write>(bw: &mut BitWriter<W>, block: &mut Block) -> Result<(), Bz2Error> {
    let alpha_size = block.eob as usize + 1;
    let n_mtf = block.rle2.len();

    // We can have 2-6 coding tables depending on how much data we have coming in.
    let table_count: usize = match n_mtf {
        0..=199 => 2,
        200..=599 => 3,
        600..=1199 => 4,
        1200..=2399 => 5,
        _ => 6,
    };

    // Each symbol in each table starts as a 0 or a 15, by frequency band
    let mut tables = init_tables(&block.freqs, table_count, alpha_size, n_mtf);

    let selector_count = (n_mtf + GROUP_SIZE - 1) / GROUP_SIZE;
    let mut selectors = vec![0_u8; selector_count];

    /*
     Now we move through the input 50 symbols at a time. For each group we find the table with
     the lowest cost, record it as the selector, and count the group's symbols against that table.
     The counts are then used to rebuild the tables, and we go around again.
    */
    for iter in 0..N_ITERS {
        // How many times each table was chosen, for reporting only
        let mut favorites = [0; MAX_GROUPS];
        let mut total_cost = 0;
        let mut rfreq = [[0_u32; MAX_ALPHA_SIZE]; MAX_GROUPS];

        for (chunk, selector) in block.rle2.chunks(GROUP_SIZE).zip(selectors.iter_mut()) {
            let mut cost = [0_u32; MAX_GROUPS];
            for &symbol in chunk {
                for (c, table) in cost.iter_mut().zip(tables.iter()).take(table_count) {
                    *c += table[symbol as usize] as u32;
                }
            }

            // The first table with the strictly lowest cost wins
            let mut bt = 0;
            for t in 1..table_count {
                if cost[t] < cost[bt] {
                    bt = t;
                }
            }
            total_cost += cost[bt];
            favorites[bt] += 1;
            *selector = bt as u8;

            chunk
                .iter()
                .for_each(|&symbol| rfreq[bt][symbol as usize] += 1);
        }

        debug!(
            "      pass {}: best cost is {}, grp uses are {:?}",
            iter + 1,
            total_cost / 8,
            &favorites[..table_count]
        );

        (0..table_count).for_each(|t| {
            improve_code_len_from_weights(&mut tables[t], &rfreq[t], alpha_size, MAX_CODE_LEN);
        });
    }

    if selector_count >= 32768 || selector_count > MAX_SELECTORS {
        return Err(Bz2Error::Internal("too many selectors"));
    }

    // Write out the the symbol maps, 16 bit L1 + 0-16 words of 16 bit L2 maps.
    trace!("\r\x1b[43mSymbol maps written at {}.     \x1b[0m", bw.loc());
    for word in encode_sym_map(&block.in_use) {
        bw.out16(word);
    }

    // Symbol maps are followed by a 3 bit number of Huffman trees that exist
    bw.out24((3 << 24) | table_count as u32);

    // Then a 15 bit number indicating the how many selectors are used
    trace!(
        "\r\x1b[43mSelector count written at {}.     \x1b[0m",
        bw.loc()
    );
    bw.out24((15 << 24) | selector_count as u32);

    // The selectors are written after a Move-To-Front transform, as runs of 1 bits ended by a 0
    let mut table_idx = [0_u8, 1, 2, 3, 4, 5];
    for &selector in &selectors {
        let mut idx = 0;
        let mut tmp = table_idx[0];
        while tmp != selector {
            idx += 1;
            std::mem::swap(&mut tmp, &mut table_idx[idx]);
        }
        table_idx[0] = tmp;
        bw.out24(((idx as u32 + 1) << 24) | ((1 << (idx + 1)) - 2));
    }

    // Create the codes for each table and write out the code lengths as deltas
    let mut codes = [[0_u32; MAX_ALPHA_SIZE]; MAX_GROUPS];
    for t in 0..table_count {
        let lens = &tables[t][..alpha_size];
        let min_len = lens.iter().copied().min().unwrap_or(1) as u32;
        let max_len = lens.iter().copied().max().unwrap_or(1) as u32;
        if max_len > MAX_CODE_LEN || min_len < 1 {
            return Err(Bz2Error::Internal("code length out of range"));
        }
        hb_assign_codes(&mut codes[t], lens, min_len, max_len, alpha_size);

        trace!(
            "\r\x1b[43mWriting origin {} for huffman map {} at {}.   \x1b[0m",
            lens[0],
            t,
            bw.loc()
        );
        // The origin is a five bit int, then each length is written as ±1 steps from the last
        let mut origin = lens[0];
        bw.out24((5 << 24) | origin as u32);
        for &len in lens {
            loop {
                match len.cmp(&origin) {
                    // if the length is greater, write 0x10
                    Ordering::Greater => {
                        bw.out24(0x02_000002);
                        origin += 1;
                    }
                    // if the length is less, write 0x11
                    Ordering::Less => {
                        bw.out24(0x02_000003);
                        origin -= 1;
                    }
                    Ordering::Equal => break,
                }
            }
            // a single 0 bit ends this symbol's length
            bw.out24(0x01_000000);
        }
    }

    // Finally write the data, changing tables every 50 symbols
    trace!("\r\x1b[43mWriting data at {}.     \x1b[0m", bw.loc());
    for (chunk, &selector) in block.rle2.chunks(GROUP_SIZE).zip(selectors.iter()) {
        let (lens, codes) = (&tables[selector as usize], &codes[selector as usize]);
        for &symbol in chunk {
            bw.write_bits(lens[symbol as usize], codes[symbol as usize]);
        }
    }
    Ok(())
}

/// Build the starting tables: each table gets a band of symbols with roughly equal total frequency.
/// Symbols in the band cost 0, all others 15.
fn init_tables(
    freqs: &[u32; MAX_ALPHA_SIZE],
    table_count: usize,
    alpha_size: usize,
    n_mtf: usize,
) -> [[u8; MAX_ALPHA_SIZE]; MAX_GROUPS] {
    let mut tables = [[GREATER_ICOST; MAX_ALPHA_SIZE]; MAX_GROUPS];
    let mut remaining_freq = n_mtf as i64;
    let mut gs = 0_i64;
    let mut n_part = table_count;

    while n_part > 0 {
        let target = remaining_freq / n_part as i64;
        let mut ge = gs - 1;
        let mut a_freq = 0_i64;
        while a_freq < target && ge < alpha_size as i64 - 1 {
            ge += 1;
            a_freq += freqs[ge as usize] as i64;
        }

        // Alternate bands give back their last symbol, so the bands don't all lean the same way
        if ge > gs && n_part != table_count && n_part != 1 && (table_count - n_part) % 2 == 1 {
            a_freq -= freqs[ge as usize] as i64;
            ge -= 1;
        }

        for (v, cost) in tables[n_part - 1].iter_mut().enumerate().take(alpha_size) {
            let v = v as i64;
            *cost = if v >= gs && v <= ge {
                LESSER_ICOST
            } else {
                GREATER_ICOST
            };
        }

        n_part -= 1;
        gs = ge + 1;
        remaining_freq -= a_freq;
    }
    tables
}

#[cfg(test)]
mod test {
    use super::init_tables;

    #[test]
    fn init_tables_test() {
        // Six symbols with equal frequency, split between two tables
        let mut freqs = [0; 258];
        freqs[..6].iter_mut().for_each(|f| *f = 10);
        let tables = init_tables(&freqs, 2, 6, 60);
        assert_eq!(&tables[1][..6], &[0, 0, 0, 15, 15, 15]);
        assert_eq!(&tables[0][..6], &[15, 15, 15, 0, 0, 0]);
    }

    #[test]
    fn step_back_test() {
        // With three tables the middle band gives back its last symbol
        let mut freqs = [0; 258];
        freqs[..9].iter_mut().for_each(|f| *f = 10);
        let tables = init_tables(&freqs, 3, 9, 90);
        assert_eq!(&tables[2][..9], &[0, 0, 0, 15, 15, 15, 15, 15, 15]);
        assert_eq!(&tables[1][..9], &[15, 15, 15, 0, 0, 15, 15, 15, 15]);
        assert_eq!(&tables[0][..9], &[15, 15, 15, 15, 15, 0, 0, 0, 0]);
    }
}
