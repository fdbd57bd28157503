//! This helper function is part of the huffman encoding system.
//!
//! The main huffman encoding function generates frequency weight tables for each group of 50 symbols. This helper
//! function generates huffman code lengths from those frequency weights. The BZIP2 standard limits code lengths
//! to 20 bits. If the weights supplied create longer codes, the weights are flattened and another attempt is made.
//!
//! The tree is built with a binary heap of node indices rather than boxed nodes. Each node weight carries the
//! frequency in the top 24 bits and the depth of the subtree in the low 8 bits, so that among equal frequencies
//! the shallower subtree is merged first.

use crate::tools::tables::MAX_ALPHA_SIZE;

const NODES: usize = MAX_ALPHA_SIZE * 2;

/// Fill `lens[..alpha_size]` with huffman code lengths for `freqs[..alpha_size]`, none longer than max_len.
/// Unused symbols are treated as having a frequency of 1 so that every symbol gets a code.
pub fn improve_code_len_from_weights(lens: &mut [u8], freqs: &[u32], alpha_size: usize, max_len: u32) {
    let mut heap = [0_usize; MAX_ALPHA_SIZE + 2];
    let mut weight = [0_u32; NODES];
    let mut parent = [0_i32; NODES];

    // Node 0 is a sentinel with weight 0 that sits at heap[0]; leaves are nodes 1..=alpha_size
    for (w, &f) in weight[1..=alpha_size].iter_mut().zip(freqs.iter()) {
        *w = f.max(1) << 8;
    }

    loop {
        let mut n_nodes = alpha_size;
        let mut n_heap = 0;
        heap[0] = 0;
        weight[0] = 0;
        parent[0] = -2;

        for i in 1..=alpha_size {
            parent[i] = -1;
            n_heap += 1;
            heap[n_heap] = i;
            up_heap(&mut heap, &weight, n_heap);
        }

        // Merge the two lightest nodes until only the root is left
        while n_heap > 1 {
            let n1 = heap[1];
            heap[1] = heap[n_heap];
            n_heap -= 1;
            down_heap(&mut heap, &weight, n_heap, 1);
            let n2 = heap[1];
            heap[1] = heap[n_heap];
            n_heap -= 1;
            down_heap(&mut heap, &weight, n_heap, 1);

            n_nodes += 1;
            parent[n1] = n_nodes as i32;
            parent[n2] = n_nodes as i32;
            weight[n_nodes] = add_weights(weight[n1], weight[n2]);
            parent[n_nodes] = -1;
            n_heap += 1;
            heap[n_heap] = n_nodes;
            up_heap(&mut heap, &weight, n_heap);
        }

        // The code length of a leaf is its distance from the root
        let mut too_long = false;
        for i in 1..=alpha_size {
            let mut depth = 0;
            let mut k = i;
            while parent[k] >= 0 {
                k = parent[k] as usize;
                depth += 1;
            }
            lens[i - 1] = depth as u8;
            if depth > max_len {
                too_long = true;
            }
        }

        if !too_long {
            break;
        }

        // Flatten the weights by halving them (plus one) and try again
        for w in weight[1..=alpha_size].iter_mut() {
            let j = 1 + ((*w >> 8) / 2);
            *w = j << 8;
        }
    }
}

/// Sift the node at heap[z] up towards the root.
#[inline(always)]
fn up_heap(heap: &mut [usize], weight: &[u32], mut z: usize) {
    let tmp = heap[z];
    while weight[tmp] < weight[heap[z >> 1]] {
        heap[z] = heap[z >> 1];
        z >>= 1;
    }
    heap[z] = tmp;
}

/// Sift the node at heap[z] down into a heap of n_heap nodes.
#[inline(always)]
fn down_heap(heap: &mut [usize], weight: &[u32], n_heap: usize, mut z: usize) {
    let tmp = heap[z];
    loop {
        let mut yy = z << 1;
        if yy > n_heap {
            break;
        }
        if yy < n_heap && weight[heap[yy + 1]] < weight[heap[yy]] {
            yy += 1;
        }
        if weight[tmp] < weight[heap[yy]] {
            break;
        }
        heap[z] = heap[yy];
        z = yy;
    }
    heap[z] = tmp;
}

/// Julian's version of weight adding for parent nodes
#[inline(always)]
fn add_weights(a: u32, b: u32) -> u32 {
    let weight_mask: u32 = 0xffffff00;
    let depth_mask: u32 = 0x000000ff;
    ((a & weight_mask) + (b & weight_mask)) | (1 + (a & depth_mask).max(b & depth_mask))
}

/// Assign canonical codes from code lengths: shorter codes first, and within a length in symbol order.
pub fn hb_assign_codes(codes: &mut [u32], lens: &[u8], min_len: u32, max_len: u32, alpha_size: usize) {
    let mut vec = 0_u32;
    for n in min_len..=max_len {
        for (code, &len) in codes.iter_mut().zip(lens.iter()).take(alpha_size) {
            if len as u32 == n {
                *code = vec;
                vec += 1;
            }
        }
        vec <<= 1;
    }
}

#[cfg(test)]
mod test {
    use super::{hb_assign_codes, improve_code_len_from_weights};

    /// Sum of 2^-len scaled to 2^max. A complete prefix code sums to exactly 2^max.
    fn kraft(lens: &[u8], max: u32) -> u64 {
        lens.iter().map(|&l| 1_u64 << (max - l as u32)).sum()
    }

    #[test]
    fn small_tree_test() {
        let mut lens = [0_u8; 3];
        improve_code_len_from_weights(&mut lens, &[1, 1, 2], 3, 20);
        assert_eq!(lens, [2, 2, 1]);

        let mut codes = [0_u32; 3];
        hb_assign_codes(&mut codes, &lens, 1, 2, 3);
        assert_eq!(codes, [2, 3, 0]);
    }

    #[test]
    fn unused_symbols_get_codes_test() {
        let mut lens = [0_u8; 6];
        improve_code_len_from_weights(&mut lens, &[100, 0, 0, 0, 0, 5], 6, 20);
        assert!(lens.iter().all(|&l| l >= 1));
        assert_eq!(kraft(&lens, 20), 1 << 20);
        assert!(lens[0] <= lens[1]);
    }

    #[test]
    fn fibonacci_limit_test() {
        // Fibonacci weights would give a 29 deep tree without the limit
        let mut freqs = vec![1_u32, 1];
        while freqs.len() < 30 {
            let n = freqs.len();
            freqs.push(freqs[n - 1] + freqs[n - 2]);
        }
        let mut lens = [0_u8; 30];
        improve_code_len_from_weights(&mut lens, &freqs, 30, 20);
        assert!(lens.iter().all(|&l| (1..=20).contains(&l)));
        assert_eq!(kraft(&lens, 20), 1 << 20);
    }

    #[test]
    fn skewed_test() {
        // One huge symbol and a long tail of rare ones
        let mut freqs = vec![1_u32; 258];
        freqs[0] = 500_000;
        freqs[1] = 10_000;
        let mut lens = [0_u8; 258];
        improve_code_len_from_weights(&mut lens, &freqs, 258, 20);
        assert!(lens.iter().all(|&l| (1..=20).contains(&l)));
        assert_eq!(kraft(&lens, 20), 1 << 20);
        assert_eq!(lens[0], 1);
    }
}
