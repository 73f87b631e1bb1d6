use std::fmt;
use std::io;
use std::io::Write;

use tracing::debug;

use crate::address::AddressFields;
use crate::geometry::Geometry;

/// Result of a single cache access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Hit,
    /// Miss filled into a free way.
    Miss,
    /// Miss that displaced the least recently used way.
    MissWithEviction,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Hit => f.write_str("hit"),
            Outcome::Miss => f.write_str("miss"),
            Outcome::MissWithEviction => f.write_str("miss eviction"),
        }
    }
}

/// One way of a set. Only the tag is modelled, never the block contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    /// Meaningless while `valid` is false.
    pub tag: u64,
    pub last_used: u64,
}

impl CacheLine {
    pub const INVALID_TAG: u64 = u64::MAX;

    pub fn new() -> CacheLine {
        CacheLine {
            valid: false,
            tag: CacheLine::INVALID_TAG,
            last_used: 0,
        }
    }

    fn holds(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }

    fn fill(&mut self, tag: u64, time: u64) {
        self.valid = true;
        self.tag = tag;
        self.last_used = time;
    }

    pub fn print(&self) -> String {
        format!(
            "valid: {}, tag: {:x}, last_used: {}",
            self.valid, self.tag, self.last_used
        )
    }
}

impl Default for CacheLine {
    fn default() -> Self {
        CacheLine::new()
    }
}

/// Fixed number of ways, indexed from 0. Scans always run from way 0 upwards.
#[derive(Debug, Clone)]
pub struct CacheSet {
    lines: Box<[CacheLine]>,
}

impl CacheSet {
    fn new(ways: usize) -> CacheSet {
        CacheSet {
            lines: vec![CacheLine::new(); ways].into_boxed_slice(),
        }
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    /// Tags of every valid way, in way order.
    pub fn resident_tags(&self) -> Vec<u64> {
        self.lines
            .iter()
            .filter(|line| line.valid)
            .map(|line| line.tag)
            .collect()
    }

    fn find(&mut self, tag: u64) -> Option<&mut CacheLine> {
        self.lines.iter_mut().find(|line| line.holds(tag))
    }

    fn first_free(&mut self) -> Option<&mut CacheLine> {
        self.lines.iter_mut().find(|line| !line.valid)
    }

    /// Way with the strictly smallest `last_used`; the lowest index wins ties.
    fn lru_victim(&mut self) -> &mut CacheLine {
        let mut victim = 0;
        for (way, line) in self.lines.iter().enumerate() {
            if line.last_used < self.lines[victim].last_used {
                victim = way;
            }
        }
        &mut self.lines[victim]
    }

    /// Look `tag` up in this set, filling or evicting on a miss.
    fn access(&mut self, tag: u64, time: u64) -> Outcome {
        if let Some(line) = self.find(tag) {
            line.last_used = time;
            return Outcome::Hit;
        }

        if let Some(line) = self.first_free() {
            line.fill(tag, time);
            return Outcome::Miss;
        }

        let victim = self.lru_victim();
        debug!(evicted_tag = victim.tag, last_used = victim.last_used, "evicting");
        victim.fill(tag, time);
        Outcome::MissWithEviction
    }
}

/// Tag store of a set-associative cache with LRU replacement.
#[derive(Debug, Clone)]
pub struct CacheModel {
    geometry: Geometry,
    sets: Vec<CacheSet>,
}

impl CacheModel {
    pub fn new(geometry: Geometry) -> CacheModel {
        let sets = (0..geometry.set_count())
            .map(|_| CacheSet::new(geometry.associativity()))
            .collect();
        CacheModel { geometry, sets }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn set(&self, set_index: usize) -> Option<&CacheSet> {
        self.sets.get(set_index)
    }

    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    /// Access `address` at logical time `time`.
    ///
    /// `time` is the recency stamp written into the touched line, so callers
    /// must supply non-decreasing values for LRU order to be meaningful.
    pub fn access(&mut self, address: u64, time: u64) -> Outcome {
        self.access_fields(self.geometry.decompose(address), time)
    }

    /// Same as [`CacheModel::access`] for an address that is already decomposed.
    pub fn access_fields(&mut self, fields: AddressFields, time: u64) -> Outcome {
        // set_index < 2^set_bits, which Geometry guarantees fits a usize
        let outcome = self.sets[fields.set_index as usize].access(fields.tag, time);
        debug!(
            tag = fields.tag,
            set = fields.set_index,
            offset = fields.block_offset,
            time,
            %outcome,
            "cache access"
        );
        outcome
    }

    /// Write every valid line, grouped by set.
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let resident: usize = self
            .sets
            .iter()
            .map(|set| set.lines.iter().filter(|line| line.valid).count())
            .sum();

        writeln!(
            out,
            "---The cache status: {}, valid lines: {}",
            self.geometry, resident
        )?;

        for (index, set) in self.sets.iter().enumerate() {
            if set.lines.iter().all(|line| !line.valid) {
                continue;
            }
            writeln!(out, "*CacheSet index: {:x}", index)?;
            for (way, line) in set.lines.iter().enumerate() {
                writeln!(out, "  way {}: {}", way, line.print())?;
            }
        }

        Ok(())
    }
}
