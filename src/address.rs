/// The three fields of a 64-bit address under a given cache geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFields {
    pub tag: u64,
    pub set_index: u64,
    pub block_offset: u64,
}

impl AddressFields {
    /// Put the fields back at their original bit positions.
    pub fn compose(&self, set_bits: u32, block_bits: u32) -> u64 {
        let set = self.set_index.checked_shl(block_bits).unwrap_or(0);
        let tag = self.tag.checked_shl(set_bits + block_bits).unwrap_or(0);
        tag | set | self.block_offset
    }

    pub fn print(&self) -> String {
        format!(
            "tag: {:x}, set_index: {:x}, block_offset: {:x}",
            self.tag, self.set_index, self.block_offset
        )
    }
}

/// Mask covering the low `bits` bits. `bits >= 64` gives all ones.
pub fn low_mask(bits: u32) -> u64 {
    match 1u64.checked_shl(bits) {
        Some(bit) => bit - 1,
        None => u64::MAX,
    }
}

/// Split `address` into tag, set index and block offset.
///
/// The block offset is the low `block_bits` bits, the set index the next
/// `set_bits` bits, and the tag whatever is left above them. Callers must
/// keep `set_bits + block_bits <= 64`; [`crate::Geometry`] enforces this.
pub fn decompose(address: u64, set_bits: u32, block_bits: u32) -> AddressFields {
    debug_assert!(
        set_bits.checked_add(block_bits).map_or(false, |bits| bits <= 64),
        "set and block fields wider than the address"
    );
    AddressFields {
        tag: address.checked_shr(set_bits + block_bits).unwrap_or(0),
        set_index: address.checked_shr(block_bits).unwrap_or(0) & low_mask(set_bits),
        block_offset: address & low_mask(block_bits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn splits_fields_at_bit_positions() {
        // s = 4, b = 4: 0x110 -> tag 1, set 1, offset 0
        let fields = decompose(0x110, 4, 4);
        assert_eq!(fields.tag, 1);
        assert_eq!(fields.set_index, 1);
        assert_eq!(fields.block_offset, 0);

        let fields = decompose(0xdead_beef, 8, 12);
        assert_eq!(fields.block_offset, 0xeef);
        assert_eq!(fields.set_index, 0xdb);
        assert_eq!(fields.tag, 0xdea);
    }

    #[test]
    fn zero_width_fields_are_zero() {
        let fields = decompose(0xffff_ffff_ffff_ffff, 0, 0);
        assert_eq!(fields.tag, u64::MAX);
        assert_eq!(fields.set_index, 0);
        assert_eq!(fields.block_offset, 0);
    }

    #[test]
    fn full_width_fields_do_not_overflow() {
        let address = 0x0123_4567_89ab_cdef;

        let fields = decompose(address, 0, 64);
        assert_eq!(fields.block_offset, address);
        assert_eq!((fields.tag, fields.set_index), (0, 0));

        let fields = decompose(address, 64, 0);
        assert_eq!(fields.set_index, address);
        assert_eq!((fields.tag, fields.block_offset), (0, 0));

        let fields = decompose(address, 32, 32);
        assert_eq!(fields.tag, 0);
        assert_eq!(fields.set_index, 0x0123_4567);
        assert_eq!(fields.block_offset, 0x89ab_cdef);
    }

    #[test]
    fn fields_partition_the_address() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..2_000 {
            let address: u64 = rng.gen();
            let set_bits = rng.gen_range(0..=64);
            let block_bits = rng.gen_range(0..=64 - set_bits);
            let fields = decompose(address, set_bits, block_bits);

            assert!(fields.block_offset <= low_mask(block_bits));
            assert!(fields.set_index <= low_mask(set_bits));
            assert!(fields.tag <= low_mask(64 - set_bits - block_bits));
            assert_eq!(fields.compose(set_bits, block_bits), address);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "set and block fields wider than the address")]
    fn oversized_fields_fail_the_width_check() {
        decompose(0x10, u32::MAX, 1);
    }

    #[test]
    fn low_mask_edges() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(4), 0xf);
        assert_eq!(low_mask(63), u64::MAX >> 1);
        assert_eq!(low_mask(64), u64::MAX);
    }
}
