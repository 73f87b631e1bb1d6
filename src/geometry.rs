use std::fmt;
use std::mem;

use crate::address::{self, AddressFields};
use crate::cache::{CacheLine, CacheSet};
use crate::error::GeometryError;

/// Cache shape: `2^set_bits` sets of `associativity` lines, each line
/// covering a `2^block_bits` byte block.
///
/// Only constructible through [`Geometry::new`], so every value in
/// circulation satisfies `set_bits + block_bits <= 64`,
/// `associativity >= 1`, and a tag store no larger than `isize::MAX` bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    set_bits: u32,
    associativity: usize,
    block_bits: u32,
}

impl Geometry {
    pub fn new(set_bits: u32, associativity: usize, block_bits: u32) -> Result<Geometry, GeometryError> {
        if associativity == 0 {
            return Err(GeometryError::ZeroAssociativity);
        }
        if set_bits.checked_add(block_bits).map_or(true, |bits| bits > 64) {
            return Err(GeometryError::AddressOverflow { set_bits, block_bits });
        }
        // a Vec or boxed slice may not exceed isize::MAX bytes
        let bytes = mem::size_of::<CacheLine>()
            .checked_mul(associativity)
            .and_then(|lines| lines.checked_add(mem::size_of::<CacheSet>()))
            .and_then(|per_set| 1usize.checked_shl(set_bits)?.checked_mul(per_set));
        if bytes.map_or(true, |bytes| bytes > isize::MAX as usize) {
            return Err(GeometryError::TooLarge { set_bits, associativity });
        }

        Ok(Geometry {
            set_bits,
            associativity,
            block_bits,
        })
    }

    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    pub fn associativity(&self) -> usize {
        self.associativity
    }

    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    pub fn tag_bits(&self) -> u32 {
        64 - self.set_bits - self.block_bits
    }

    pub fn set_count(&self) -> usize {
        1 << self.set_bits
    }

    /// Block size in bytes, saturating when the block spans the whole address space.
    pub fn block_size(&self) -> u64 {
        1u64.checked_shl(self.block_bits).unwrap_or(u64::MAX)
    }

    pub fn decompose(&self, address: u64) -> AddressFields {
        address::decompose(address, self.set_bits, self.block_bits)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "s={} E={} b={} ({} sets, {}-byte blocks)",
            self.set_bits,
            self.associativity,
            self.block_bits,
            self.set_count(),
            self.block_size()
        )
    }
}
