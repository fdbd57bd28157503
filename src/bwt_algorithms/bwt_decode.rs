use crate::error::Bz2Error;
use crate::tools::tables::Randomiser;

/// Reverses the Burrow-Wheeler Transform of one block, a byte at a time.
///
/// The MTF stage fills `ll8` with the BWT output and counts each byte value. `start` then links
/// every position to the position that follows it in the original data, and `next_byte` walks
/// those links from the original pointer.
#[derive(Debug, Default)]
pub struct BwtDecoder {
    /// BWT output of the current block
    pub ll8: Vec<u8>,
    tt: Vec<u32>,
    t_pos: u32,
    remaining: usize,
    rand: Option<Randomiser>,
}

impl BwtDecoder {
    /// Create a decoder for blocks of up to max_block bytes.
    pub fn new(max_block: usize) -> Self {
        Self {
            ll8: Vec::with_capacity(max_block),
            tt: Vec::with_capacity(max_block),
            ..Default::default()
        }
    }

    /// Build the links for the block now in ll8. `counts` holds how many times each byte value
    /// occurs in ll8.
    pub fn start(&mut self, counts: &[u32; 256], key: usize, randomised: bool) -> Result<(), Bz2Error> {
        let end = self.ll8.len();
        if key >= end {
            return Err(Bz2Error::Data("original pointer out of range"));
        }

        // Get the cumulative sum of the counts
        let mut cftab = [0_u32; 256];
        let mut sum = 0;
        for (c, &n) in cftab.iter_mut().zip(counts.iter()) {
            *c = sum;
            sum += n;
        }
        if sum as usize != end {
            return Err(Bz2Error::Data("byte counts do not match block length"));
        }

        self.tt.clear();
        self.tt.resize(end, 0);
        for (i, &byte) in self.ll8.iter().enumerate() {
            self.tt[cftab[byte as usize] as usize] = i as u32;
            cftab[byte as usize] += 1;
        }

        self.t_pos = self.tt[key];
        self.remaining = end;
        self.rand = randomised.then(Randomiser::new);
        Ok(())
    }

    /// Next byte of the block, or None at the end of the block.
    #[inline(always)]
    pub fn next_byte(&mut self) -> Option<u8> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let mut byte = self.ll8[self.t_pos as usize];
        self.t_pos = self.tt[self.t_pos as usize];
        if let Some(rand) = self.rand.as_mut() {
            byte ^= rand.next_mask();
        }
        Some(byte)
    }
}

#[cfg(test)]
mod test {
    use super::BwtDecoder;

    fn counts(data: &[u8]) -> [u32; 256] {
        let mut counts = [0; 256];
        data.iter().for_each(|&b| counts[b as usize] += 1);
        counts
    }

    #[test]
    fn banana_test() {
        let mut bwt = BwtDecoder::new(10);
        bwt.ll8.extend_from_slice(b"nnbaaa");
        bwt.start(&counts(b"nnbaaa"), 3, false).unwrap();
        let out = std::iter::from_fn(|| bwt.next_byte()).collect::<Vec<u8>>();
        assert_eq!(out, b"banana".to_vec());
    }

    #[test]
    fn bad_key_test() {
        let mut bwt = BwtDecoder::new(10);
        bwt.ll8.extend_from_slice(b"nnbaaa");
        assert!(bwt.start(&counts(b"nnbaaa"), 6, false).is_err());
    }

    #[test]
    fn single_byte_test() {
        let mut bwt = BwtDecoder::new(10);
        bwt.ll8.push(b'z');
        bwt.start(&counts(b"z"), 0, false).unwrap();
        assert_eq!(bwt.next_byte(), Some(b'z'));
        assert_eq!(bwt.next_byte(), None);
    }
}
