use log::{debug, trace};

use crate::compression::compress::Block;
use crate::error::Bz2Error;

use super::{main_q_sort3::main_q_sort3, main_simple_sort::main_simple_sort};

/// Extra bytes past the end of the block holding a copy of its start.
pub const OVERSHOOT: usize = 20;
/// Marks a two-byte bucket as sorted.
const SETMASK: i32 = 1 << 21;
const CLEARMASK: i32 = !SETMASK;
/// Blocks shorter than this are shell sorted directly.
const SIMPLE_SORT_LIMIT: i32 = 4000;

/// The arrays and counters shared by the sort routines.
pub struct QsortData<'a> {
    /// Block bytes, 1-based, with the overshoot filled in.
    pub block: &'a [u8],
    pub quadrant: &'a mut [i32],
    pub zptr: &'a mut [i32],
    /// Index of the last byte in the block.
    pub last: i32,
    pub work_done: u64,
    pub work_limit: u64,
    pub first_attempt: bool,
}

impl<'a> QsortData<'a> {
    /// Create sort data with no work budget.
    pub fn new(block: &'a [u8], quadrant: &'a mut [i32], zptr: &'a mut [i32], last: i32) -> Self {
        Self {
            block,
            quadrant,
            zptr,
            last,
            work_done: 0,
            work_limit: 0,
            first_attempt: false,
        }
    }

    /// True when a budgeted first attempt has used up its budget.
    #[inline(always)]
    pub fn exhausted(&self) -> bool {
        self.first_attempt && self.work_done > self.work_limit
    }

    /// The byte d places after the rotation at zptr[idx].
    #[inline(always)]
    pub fn byte_at(&self, idx: i32, d: i32) -> u8 {
        self.block[(self.zptr[idx as usize] + d + 1) as usize]
    }
}

/// Sort the rotations of the block into block.zptr. A first attempt gives up once it has done
/// more than work_factor * last units of comparison work and returns Ok(false).
pub fn main_sort(block: &mut Block, first_attempt: bool) -> Result<bool, Bz2Error> {
    let last = block.last;
    let lst = last as usize;

    // Set up the overshoot area and clear the quadrants
    for i in 0..OVERSHOOT {
        block.data[lst + i + 2] = block.data[(i % (lst + 1)) + 1];
    }
    block.quadrant[..=lst + OVERSHOOT].fill(0);
    block.data[0] = block.data[lst + 1];

    let work_limit = block.work_factor as u64 * last as u64;
    let mut qs = QsortData::new(&block.data, &mut block.quadrant, &mut block.zptr, last);
    qs.work_limit = work_limit;
    qs.first_attempt = first_attempt;

    if last < SIMPLE_SORT_LIMIT {
        debug!("    simple sort of {} bytes", last + 1);
        qs.zptr[..=lst]
            .iter_mut()
            .enumerate()
            .for_each(|(i, z)| *z = i as i32);
        qs.first_attempt = false;
        main_simple_sort(&mut qs, 0, last, 0);
        return Ok(true);
    }

    let ftab = &mut block.ftab;
    let mut running_order = [0_usize; 256];
    let mut copy = [0_i32; 256];
    let mut big_done = [false; 256];
    let mut num_q_sorted = 0;

    // Count the two-byte pairs, then turn the counts into bucket starts
    ftab.fill(0);
    let mut c1 = qs.block[0] as usize;
    for i in 0..=lst {
        let c2 = qs.block[i + 1] as usize;
        ftab[(c1 << 8) + c2] += 1;
        c1 = c2;
    }
    for i in 1..=65536 {
        ftab[i] += ftab[i - 1];
    }

    // Drop every position into its bucket
    let mut c1 = qs.block[1] as usize;
    for i in 0..lst {
        let c2 = qs.block[i + 2] as usize;
        let j = (c1 << 8) + c2;
        c1 = c2;
        ftab[j] -= 1;
        qs.zptr[ftab[j] as usize] = i as i32;
    }
    let j = ((qs.block[lst + 1] as usize) << 8) + qs.block[1] as usize;
    ftab[j] -= 1;
    qs.zptr[ftab[j] as usize] = last;

    // Order the big buckets from smallest to largest
    fn big_size(ftab: &[i32], b: usize) -> i32 {
        ftab[(b + 1) << 8] - ftab[b << 8]
    }
    running_order
        .iter_mut()
        .enumerate()
        .for_each(|(i, r)| *r = i);
    let mut h = 1;
    while h <= 256 {
        h = 3 * h + 1;
    }
    loop {
        h /= 3;
        for i in h..256 {
            let vv = running_order[i];
            let mut j = i;
            while big_size(ftab, running_order[j - h]) > big_size(ftab, vv) {
                running_order[j] = running_order[j - h];
                j -= h;
                if j < h {
                    break;
                }
            }
            running_order[j] = vv;
        }
        if h == 1 {
            break;
        }
    }

    for i in 0..256 {
        let ss = running_order[i];

        // Quicksort any small bucket [ss, j] not already put in order by an earlier scan
        for j in 0..256 {
            let sb = (ss << 8) + j;
            if ftab[sb] & SETMASK == 0 {
                let lo = ftab[sb] & CLEARMASK;
                let hi = (ftab[sb + 1] & CLEARMASK) - 1;
                if hi > lo {
                    main_q_sort3(&mut qs, lo, hi, 2)?;
                    num_q_sorted += hi - lo + 1;
                    if qs.exhausted() {
                        trace!("    work budget spent after {} sorted", num_q_sorted);
                        return Ok(false);
                    }
                }
                ftab[sb] |= SETMASK;
            }
        }

        // Big bucket ss is done. Record quadrant values for it, including the overshoot copies.
        big_done[ss] = true;
        if i < 255 {
            let bb_start = ftab[ss << 8] & CLEARMASK;
            let bb_size = (ftab[(ss + 1) << 8] & CLEARMASK) - bb_start;
            let mut shifts = 0;
            while (bb_size >> shifts) > 65534 {
                shifts += 1;
            }
            for j in 0..bb_size {
                let a2update = qs.zptr[(bb_start + j) as usize] as usize;
                let q_val = j >> shifts;
                qs.quadrant[a2update] = q_val;
                if a2update < OVERSHOOT {
                    qs.quadrant[a2update + lst + 1] = q_val;
                }
            }
            if (bb_size - 1) >> shifts > 65535 {
                return Err(Bz2Error::Internal("quadrant value out of range"));
            }
        }

        // Scan big bucket ss to put small buckets [t, ss] in order for every t not yet done
        for j in 0..256 {
            copy[j] = ftab[(j << 8) + ss] & CLEARMASK;
        }
        for j in (ftab[ss << 8] & CLEARMASK)..(ftab[(ss + 1) << 8] & CLEARMASK) {
            let z = qs.zptr[j as usize];
            let c1 = qs.block[z as usize] as usize;
            if !big_done[c1] {
                qs.zptr[copy[c1] as usize] = if z == 0 { last } else { z - 1 };
                copy[c1] += 1;
            }
        }
        for j in 0..256 {
            ftab[(j << 8) + ss] |= SETMASK;
        }
    }

    debug!(
        "    {} pointers, {} sorted by quicksort, work {}",
        last + 1,
        num_q_sorted,
        qs.work_done
    );
    Ok(true)
}

#[cfg(test)]
mod test {
    use super::main_sort;
    use crate::compression::compress::Block;

    fn load(data: &[u8], work_factor: u32) -> Block {
        let mut block = Block::new(1, work_factor);
        block.data[1..=data.len()].copy_from_slice(data);
        block.last = data.len() as i32 - 1;
        block
    }

    #[test]
    fn budget_spent_test() {
        let mut block = load(&b"abcde".repeat(2000), 1);
        assert!(!main_sort(&mut block, true).unwrap());
    }

    #[test]
    fn sorted_within_budget_test() {
        let mut seed = 99_u32;
        let data = (0..6_000)
            .map(|_| {
                seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
                (seed >> 16) as u8
            })
            .collect::<Vec<u8>>();
        let mut block = load(&data, 50);
        assert!(main_sort(&mut block, true).unwrap());

        let rotation = |i: i32| [&data[i as usize..], &data[..i as usize]].concat();
        let zptr = &block.zptr[..data.len()];
        assert!(zptr.windows(2).all(|w| rotation(w[0]) < rotation(w[1])));
    }
}
