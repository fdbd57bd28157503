use log::{trace, warn};

use crate::compression::compress::Block;
use crate::error::Bz2Error;
use crate::tools::tables::Randomiser;

use super::main_sort::main_sort;

/// Primary entry into the BWT sorting system. Sorts the rotations of the block into block.zptr
/// and sets block.key to the position of the unrotated data.
///
/// The first attempt is limited to work_factor * last units of comparison work. If that runs
/// out, the data is too repetitive: the block is randomised and sorted again with no limit.
pub fn block_sort(block: &mut Block) -> Result<(), Bz2Error> {
    block.randomised = false;

    if !main_sort(block, true)? {
        warn!("    too repetitive; randomising block {}", block.seq);
        randomise_block(block);
        block.randomised = true;
        main_sort(block, false)?;
    }

    let last = block.last as usize;
    block.key = block.zptr[..=last]
        .iter()
        .position(|&z| z == 0)
        .ok_or(Bz2Error::Internal("no original pointer after sort"))? as i32;
    trace!("\r\x1b[43mKey is {}.    \x1b[0m", block.key);
    Ok(())
}

/// Flip the low bit of the block bytes picked out by the random number table, and rebuild
/// the in-use flags to match.
pub fn randomise_block(block: &mut Block) {
    let mut rand = Randomiser::new();
    block.in_use = [false; 256];
    for byte in block.data[1..=(block.last + 1) as usize].iter_mut() {
        *byte ^= rand.next_mask();
        block.in_use[*byte as usize] = true;
    }
}

#[cfg(test)]
mod test {
    use super::{block_sort, randomise_block};
    use crate::compression::compress::Block;

    fn load(data: &[u8]) -> Block {
        let mut block = Block::new(1, 50);
        block.data[1..=data.len()].copy_from_slice(data);
        block.last = data.len() as i32 - 1;
        data.iter().for_each(|&b| block.in_use[b as usize] = true);
        block
    }

    /// BWT output, the byte before each sorted rotation.
    fn bwt(block: &Block) -> Vec<u8> {
        (0..=block.last as usize)
            .map(|i| block.data[block.zptr[i] as usize])
            .collect()
    }

    #[test]
    fn banana_test() {
        let mut block = load(b"banana");
        block_sort(&mut block).unwrap();
        assert_eq!(bwt(&block), b"nnbaaa".to_vec());
        assert_eq!(block.key, 3);
        assert!(!block.randomised);
    }

    #[test]
    fn main_sort_matches_naive_test() {
        // Long enough for the bucket sort
        let mut seed = 7_u32;
        let data = (0..20_000)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                b"the quick brown fox"[(seed >> 16) as usize % 19]
            })
            .collect::<Vec<u8>>();
        let mut block = load(&data);
        block_sort(&mut block).unwrap();
        assert!(!block.randomised);

        let rotation = |i: i32| [&data[i as usize..], &data[..i as usize]].concat();
        let zptr = &block.zptr[..data.len()];
        assert!(zptr.windows(2).all(|w| rotation(w[0]) < rotation(w[1])));
        assert_eq!(zptr[block.key as usize], 0);
    }

    #[test]
    fn repetitive_block_is_randomised_test() {
        let data = b"abcde".repeat(2000);
        let mut block = load(&data);
        block_sort(&mut block).unwrap();
        assert!(block.randomised);
        assert_eq!(block.zptr[block.key as usize], 0);
        let mut seen = block.zptr[..data.len()].to_vec();
        seen.sort_unstable();
        assert!(seen.iter().enumerate().all(|(i, &z)| z == i as i32));
    }

    #[test]
    fn randomise_test() {
        let mut block = load(&[0_u8; 1000]);
        randomise_block(&mut block);
        // The first flipped byte is at 617, the next at 1337
        assert_eq!(block.data[618], 1);
        assert_eq!(block.data[1..=1000].iter().filter(|&&b| b == 1).count(), 1);
        assert!(block.in_use[0] && block.in_use[1]);
    }
}
