use super::main_sort::QsortData;

/// Returns true if the rotation starting at i1 sorts after the rotation starting at i2.
/// Positions are 0-based; the byte for position p lives at block[p + 1]. Each pass of the
/// quadrant loop costs one unit of work.
#[inline(always)]
pub fn main_gtu(qs: &mut QsortData<'_>, mut i1: usize, mut i2: usize) -> bool {
    let block = qs.block;

    // The first bytes are compared without consulting the quadrants
    for _ in 0..6 {
        let (c1, c2) = (block[i1 + 1], block[i2 + 1]);
        if c1 != c2 {
            return c1 > c2;
        }
        i1 += 1;
        i2 += 1;
    }

    let last = qs.last as usize;
    let mut k = qs.last + 1;
    loop {
        for _ in 0..4 {
            let (c1, c2) = (block[i1 + 1], block[i2 + 1]);
            if c1 != c2 {
                return c1 > c2;
            }
            let (s1, s2) = (qs.quadrant[i1], qs.quadrant[i2]);
            if s1 != s2 {
                return s1 > s2;
            }
            i1 += 1;
            i2 += 1;
        }
        // Wrap around the end of the block
        if i1 > last {
            i1 -= last + 1;
        }
        if i2 > last {
            i2 -= last + 1;
        }
        k -= 4;
        qs.work_done += 1;
        if k < 0 {
            break;
        }
    }
    // The rotations are identical
    false
}
