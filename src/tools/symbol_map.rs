const BIT_MASK: u16 = 0x8000;

/// Builds the bzip2 symbol map from the in-use flags: one u16 index word followed by a u16 bit map
/// for every group of 16 byte values that has at least one member in use.
pub fn encode_sym_map(in_use: &[bool; 256]) -> Vec<u16> {
    let mut maps = vec![0_u16];
    for (group, chunk) in in_use.chunks(16).enumerate() {
        if chunk.iter().any(|&u| u) {
            // Mark the group in the index, then record which bytes in the group were present
            maps[0] |= BIT_MASK >> group;
            maps.push(
                chunk
                    .iter()
                    .enumerate()
                    .filter(|(_, u)| **u)
                    .fold(0, |map, (j, _)| map | BIT_MASK >> j),
            );
        }
    }
    maps
}

/// Takes the unique bzip2 symbol map and returns a sorted vec of all
/// u8s used in the input.
pub fn decode_sym_map(symbol_map: &[u16]) -> Vec<u8> {
    /*
    Symbol_map[0] is a map of the presense/absense of blocks of u8s in the input data.
    For example, if the first bit of maps[0] is a zero, then none of the u8s from 0-15 were
    present in the input file, AND there would be no u16 needed to mark any of those.
    If the second bit of maps[0] is a one, then at least one u8 from the range of 16-31 was present
    in the input. That means the next u16 would be a bit map for this block of u8s.
    */
    let mut symbols: Vec<u8> = Vec::with_capacity(256);
    // Set a counter for the number of maps
    let mut map_idx = 0;

    for block in 0..16 {
        if (symbol_map[0] & (BIT_MASK >> block)) > 0 {
            map_idx += 1;
            let Some(&map) = symbol_map.get(map_idx) else {
                break;
            };
            for byte_idx in 0..16_u8 {
                if (map & (BIT_MASK >> byte_idx)) > 0 {
                    // block * 16 + byte_idx = u8 value we found
                    symbols.push((block << 4) + byte_idx);
                };
            }
        }
    }
    symbols
}

#[cfg(test)]
mod test {
    use super::{decode_sym_map, encode_sym_map};

    fn in_use_of(data: &[u8]) -> [bool; 256] {
        let mut in_use = [false; 256];
        data.iter().for_each(|&b| in_use[b as usize] = true);
        in_use
    }

    #[test]
    fn encode_symbol_map_test() {
        let maps = encode_sym_map(&in_use_of("Making a silly test.".as_bytes()));
        assert_eq!(maps, vec![11008, 32770, 4, 17754, 6208]);
    }

    #[test]
    fn decode_symbol_map_test() {
        let maps = vec![11008, 32770, 4, 17754, 6208];
        let mut compare = "Making a silly test.".as_bytes().to_vec();
        compare.sort_unstable();
        compare.dedup();
        assert_eq!(compare, decode_sym_map(&maps));
    }

    #[test]
    fn decode_symbol_map_full_test() {
        let maps = vec![0xffff; 17];
        let compare = (0..=255).collect::<Vec<u8>>();
        assert_eq!(compare, decode_sym_map(&maps));
        assert_eq!(encode_sym_map(&[true; 256]), maps);
    }
}
