use crate::error::Bz2Error;

use super::{main_simple_sort::main_simple_sort, main_sort::QsortData};

/// Fixed depth of the explicit quicksort stack.
const QSORT_STACK_SIZE: usize = 1000;
/// Partitions smaller than this go to the shell sort.
const SMALL_THRESH: i32 = 20;
/// Partitions deeper than this go to the shell sort. On short-period data every rotation in such
/// a partition shares a long prefix, so the shell sort compares are slow there.
const DEPTH_THRESH: i32 = 10;

/// Three-way radix quicksort of zptr[lo..=hi], starting at depth d. Uses an explicit stack
/// rather than recursion; running out of stack is reported as an internal error.
pub fn main_q_sort3(qs: &mut QsortData<'_>, lo_st: i32, hi_st: i32, d_st: i32) -> Result<(), Bz2Error> {
    let mut stack: Vec<(i32, i32, i32)> = Vec::with_capacity(QSORT_STACK_SIZE);
    stack.push((lo_st, hi_st, d_st));

    while let Some((lo, hi, d)) = stack.pop() {
        if hi - lo < SMALL_THRESH || d > DEPTH_THRESH {
            main_simple_sort(qs, lo, hi, d);
            if qs.exhausted() {
                return Ok(());
            }
            continue;
        }

        let med = med3(
            qs.byte_at(lo, d),
            qs.byte_at(hi, d),
            qs.byte_at((lo + hi) >> 1, d),
        ) as i32;

        let (mut un_lo, mut lt_lo) = (lo, lo);
        let (mut un_hi, mut gt_hi) = (hi, hi);

        loop {
            // Move bytes equal to the median to the left end
            while un_lo <= un_hi {
                let n = qs.byte_at(un_lo, d) as i32 - med;
                if n == 0 {
                    qs.zptr.swap(un_lo as usize, lt_lo as usize);
                    lt_lo += 1;
                    un_lo += 1;
                    continue;
                }
                if n > 0 {
                    break;
                }
                un_lo += 1;
            }
            // ... and to the right end
            while un_lo <= un_hi {
                let n = qs.byte_at(un_hi, d) as i32 - med;
                if n == 0 {
                    qs.zptr.swap(un_hi as usize, gt_hi as usize);
                    gt_hi -= 1;
                    un_hi -= 1;
                    continue;
                }
                if n < 0 {
                    break;
                }
                un_hi -= 1;
            }
            if un_lo > un_hi {
                break;
            }
            qs.zptr.swap(un_lo as usize, un_hi as usize);
            un_lo += 1;
            un_hi -= 1;
        }

        // Everything matched the median, so look one byte deeper
        if gt_hi < lt_lo {
            stack.push((lo, hi, d + 1));
            continue;
        }

        // Swap the equal runs from the ends into the middle
        let n = (lt_lo - lo).min(un_lo - lt_lo);
        vswap(qs.zptr, lo, un_lo - n, n);
        let m = (hi - gt_hi).min(gt_hi - un_hi);
        vswap(qs.zptr, un_lo, hi - m + 1, m);

        let n = lo + un_lo - lt_lo - 1;
        let m = hi - (gt_hi - un_hi) + 1;

        if stack.len() + 3 > QSORT_STACK_SIZE {
            return Err(Bz2Error::Internal("block sort stack overflow"));
        }
        stack.push((lo, n, d));
        stack.push((n + 1, m - 1, d + 1));
        stack.push((m, hi, d));
    }
    Ok(())
}

/// Swap n elements starting at p1 with n elements starting at p2.
fn vswap(zptr: &mut [i32], p1: i32, p2: i32, n: i32) {
    for k in 0..n {
        zptr.swap((p1 + k) as usize, (p2 + k) as usize);
    }
}

/// Median of three bytes.
fn med3(mut a: u8, mut b: u8, c: u8) -> u8 {
    if a > b {
        std::mem::swap(&mut a, &mut b);
    }
    if b > c {
        b = c;
    }
    if a > b {
        b = a;
    }
    b
}
