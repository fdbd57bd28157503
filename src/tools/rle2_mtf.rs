//! Perform run-length-encoding and move-to-front transforms for the Rust version of the standard BZIP2 library.
//!
//! The move-to-front transform will increase the frequency of lower byte values. The result of this is that
//! the huffman codes can more efficiently compress those high frequency bytes.
//!
//! The run-length-encoding will compress runs of the zero byte irregardless of the number of zeros found. The
//! number of zeros found is written in bijective base 2 using the RUNA and RUNB symbols. Since the move-to-front
//! transform will increase the frequency of the zero bytes, the run-length-encoding will reduce the byte count
//! significantly for most data.
//!
//! Encoding also returns the frequency table used during the huffman stage.
//!
use crate::compression::compress::Block;

use super::tables::{RUNA, RUNB};

/// Does the Move-To-Front transform and Run-Length-Encoding 2 on the sorted block, prior to the huffman
/// stage. Fills block.rle2 (terminated by EOB), block.freqs and block.eob.
pub fn rle2_mtf_encode(block: &mut Block) {
    // Map each byte value in use to its sequence number
    let mut unseq_to_seq = [0_u8; 256];
    let mut n_in_use = 0;
    for (b, _) in block.in_use.iter().enumerate().filter(|(_, u)| **u) {
        unseq_to_seq[b] = n_in_use as u8;
        n_in_use += 1;
    }

    let last = block.last as usize;
    let (data, zptr) = (&block.data, &block.zptr);
    let seq = zptr[..=last]
        .iter()
        .map(|&z| unseq_to_seq[data[z as usize] as usize]);

    block.eob = mtf_encode_into(seq, n_in_use, &mut block.rle2, &mut block.freqs);
}

/// Move-To-Front and zero run encode a stream of sequence numbers (each < n_in_use) into `out`,
/// counting symbol frequencies into `freqs`. Returns the EOB symbol, which ends the output.
pub fn mtf_encode_into<I: Iterator<Item = u8>>(
    seq: I,
    n_in_use: usize,
    out: &mut Vec<u16>,
    freqs: &mut [u32; 258],
) -> u16 {
    let eob = n_in_use as u16 + 1;
    out.clear();
    freqs.fill(0);

    // Initialize the MTF index in ascending order
    let mut mtf_index = [0_u8; 256];
    mtf_index
        .iter_mut()
        .enumerate()
        .for_each(|(i, m)| *m = i as u8);

    let mut zeros = 0_u32;
    for sym in seq {
        // Find the symbol, shifting everything in front of it back one place as we go
        let mut idx = 0;
        let mut tmp = mtf_index[0];
        while tmp != sym {
            idx += 1;
            std::mem::swap(&mut tmp, &mut mtf_index[idx]);
        }
        mtf_index[0] = tmp;

        if idx == 0 {
            zeros += 1;
            continue;
        }
        // Not a zero, so output any pending zeros first
        if zeros > 0 {
            push_zero_run(zeros, out, freqs);
            zeros = 0;
        }
        out.push(idx as u16 + 1);
        freqs[idx + 1] += 1;
    }
    // Write any trailing zeros
    if zeros > 0 {
        push_zero_run(zeros, out, freqs);
    }
    out.push(eob);
    freqs[eob as usize] += 1;
    eob
}

/// Write a run of n zeros as RUNA/RUNB digits, least significant first.
fn push_zero_run(mut n: u32, out: &mut Vec<u16>, freqs: &mut [u32; 258]) {
    n -= 1;
    loop {
        let sym = if n & 1 == 0 { RUNA } else { RUNB };
        out.push(sym);
        freqs[sym as usize] += 1;
        if n < 2 {
            break;
        }
        n = (n - 2) >> 1;
    }
}

#[cfg(test)]
mod test {
    use super::mtf_encode_into;

    fn encode(seq: &[u8], n_in_use: usize) -> Vec<u16> {
        let mut out = vec![];
        let mut freqs = [0; 258];
        mtf_encode_into(seq.iter().copied(), n_in_use, &mut out, &mut freqs);
        out
    }

    #[test]
    fn zero_runs_test() {
        // Runs of 1..=6 zeros: A, B, AA, BA, AB, BB
        assert_eq!(encode(&[0], 1), vec![0, 2]);
        assert_eq!(encode(&[0, 0], 1), vec![1, 2]);
        assert_eq!(encode(&[0, 0, 0], 1), vec![0, 0, 2]);
        assert_eq!(encode(&[0; 4], 1), vec![1, 0, 2]);
        assert_eq!(encode(&[0; 5], 1), vec![0, 1, 2]);
        assert_eq!(encode(&[0; 6], 1), vec![1, 1, 2]);
    }

    #[test]
    fn mtf_test() {
        // MTF ranks 1 0 1 2 0 give symbols 2 A 2 3 A, then EOB = 4
        assert_eq!(encode(&[1, 1, 0, 2, 2], 3), vec![2, 0, 2, 3, 0, 4]);
    }

    #[test]
    fn freqs_test() {
        let mut out = vec![];
        let mut freqs = [0; 258];
        let eob = mtf_encode_into([0, 1, 1, 1, 0].into_iter(), 2, &mut out, &mut freqs);
        assert_eq!(eob, 3);
        assert_eq!(out, vec![0, 2, 1, 2, 3]);
        assert_eq!(&freqs[..4], &[1, 1, 2, 1]);
    }
}
