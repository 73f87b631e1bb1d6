use std::fmt;

use tracing::{debug, info};

use crate::address::AddressFields;
use crate::cache::{CacheModel, Outcome};
use crate::error::TraceError;
use crate::geometry::Geometry;
use crate::trace::{AccessKind, TraceOp};

/// Hit, miss and eviction tallies for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl Counters {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Hit => self.hits += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::MissWithEviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// The store half of a modify, which always hits the line its load just touched.
    pub fn record_store_hit(&mut self) {
        self.hits += 1;
    }

    /// Number of data accesses tallied so far.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    pub fn miss_ratio(&self) -> f64 {
        if self.accesses() == 0 {
            return 0.0;
        }
        self.misses as f64 / self.accesses() as f64
    }
}

impl fmt::Display for Counters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

/// What one trace record did to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub op: TraceOp,
    /// `None` for instruction fetches, which never reach the cache.
    pub fields: Option<AddressFields>,
    pub outcome: Option<Outcome>,
    /// Set for modify records, whose store half is tallied as a hit.
    pub store_hit: bool,
}

impl Step {
    pub fn is_data_access(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Renders like the reference simulator's verbose output: `M 20,1 miss hit`.
impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.op)?;
        if let Some(outcome) = self.outcome {
            write!(f, " {}", outcome)?;
        }
        if self.store_hit {
            write!(f, " {}", Outcome::Hit)?;
        }
        Ok(())
    }
}

/// Replays trace records against a [`CacheModel`], one logical tick per record.
#[derive(Debug, Clone)]
pub struct Simulator {
    cache: CacheModel,
    counters: Counters,
    time: u64,
}

impl Simulator {
    pub fn new(geometry: Geometry) -> Simulator {
        info!(%geometry, "building cache");
        Simulator {
            cache: CacheModel::new(geometry),
            counters: Counters::default(),
            time: 0,
        }
    }

    pub fn cache(&self) -> &CacheModel {
        &self.cache
    }

    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Logical time the next record will be stamped with.
    pub fn time(&self) -> u64 {
        self.time
    }

    pub fn step(&mut self, op: &TraceOp) -> Step {
        let mut step = Step {
            op: *op,
            fields: None,
            outcome: None,
            store_hit: false,
        };

        match op.kind {
            AccessKind::InstructionFetch => {}
            AccessKind::Load | AccessKind::Store | AccessKind::Modify => {
                let fields = self.cache.geometry().decompose(op.address);
                let outcome = self.cache.access_fields(fields, self.time);
                self.counters.record(outcome);
                step.fields = Some(fields);
                step.outcome = Some(outcome);

                if op.kind == AccessKind::Modify {
                    self.counters.record_store_hit();
                    step.store_hit = true;
                }
            }
        }

        self.time += 1;
        step
    }

    /// Run every record of `trace`, calling `observe` after each one.
    ///
    /// Stops at the first trace error; counters then cover only the records
    /// before it.
    pub fn run_with<I, F>(&mut self, trace: I, mut observe: F) -> Result<Counters, TraceError>
    where
        I: IntoIterator<Item = Result<TraceOp, TraceError>>,
        F: FnMut(&Step),
    {
        for item in trace {
            let step = self.step(&item?);
            observe(&step);
        }

        debug!(records = self.time, "trace exhausted");
        info!(
            hits = self.counters.hits,
            misses = self.counters.misses,
            evictions = self.counters.evictions,
            miss_ratio = self.counters.miss_ratio(),
            "simulation finished"
        );
        Ok(self.counters)
    }

    pub fn run<I>(&mut self, trace: I) -> Result<Counters, TraceError>
    where
        I: IntoIterator<Item = Result<TraceOp, TraceError>>,
    {
        self.run_with(trace, |_| {})
    }
}
