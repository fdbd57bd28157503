use super::{main_gtu::main_gtu, main_sort::QsortData};

/// Knuth's increments for the shell sort.
const INCS: [i32; 14] = [
    1, 4, 13, 40, 121, 364, 1093, 3280, 9841, 29524, 88573, 265720, 797161, 2391484,
];

/// Shell sort of zptr[lo..=hi], comparing rotations from depth d. Used for small buckets,
/// deep quicksort partitions, and whole blocks under 4000 bytes.
/// Bails out early once the work budget of a first attempt is spent.
pub fn main_simple_sort(qs: &mut QsortData<'_>, lo: i32, hi: i32, d: i32) {
    let big_n = hi - lo + 1;
    if big_n < 2 {
        return;
    }

    // Start with the largest increment smaller than the range
    let top_incr = INCS.iter().position(|&i| i >= big_n).unwrap_or(INCS.len());

    for &h in INCS[..top_incr].iter().rev() {
        let mut i = lo + h;
        while i <= hi {
            let v = qs.zptr[i as usize];
            let mut j = i;
            loop {
                let prev = (qs.zptr[(j - h) as usize] + d) as usize;
                if !main_gtu(qs, prev, (v + d) as usize) {
                    break;
                }
                qs.zptr[j as usize] = qs.zptr[(j - h) as usize];
                j -= h;
                if j <= lo + h - 1 {
                    break;
                }
            }
            qs.zptr[j as usize] = v;
            i += 1;

            // Check the budget every third element
            if (i - lo - h) % 3 == 0 && qs.exhausted() {
                return;
            }
        }
    }
}
