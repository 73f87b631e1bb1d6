use std::io;

use thiserror::Error;

/// Rejected cache geometry. Raised once, before the model is built.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("associativity must be at least 1")]
    ZeroAssociativity,

    #[error("set index bits ({set_bits}) plus block bits ({block_bits}) exceed the 64-bit address")]
    AddressOverflow { set_bits: u32, block_bits: u32 },

    #[error("a cache with 2^{set_bits} sets of {associativity} lines cannot be allocated")]
    TooLarge { set_bits: u32, associativity: usize },
}

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("cannot read trace: {0}")]
    Io(#[from] io::Error),

    #[error("cannot read trace: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed trace line {line}: {reason}")]
    Parse { line: u64, reason: String },
}

/// Everything that can abort a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Trace(#[from] TraceError),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),

    #[error("cannot write results to {path}: {source}")]
    Results { path: String, source: io::Error },
}
