use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::TraceError;

/// Operation letter of a valgrind trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    /// `I`: instruction fetch, ignored by the data cache.
    InstructionFetch,
    /// `L`
    Load,
    /// `S`
    Store,
    /// `M`: a load followed by a store to the same address.
    Modify,
}

impl AccessKind {
    pub fn from_char(op: char) -> Option<AccessKind> {
        match op {
            'I' => Some(AccessKind::InstructionFetch),
            'L' => Some(AccessKind::Load),
            'S' => Some(AccessKind::Store),
            'M' => Some(AccessKind::Modify),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            AccessKind::InstructionFetch => 'I',
            AccessKind::Load => 'L',
            AccessKind::Store => 'S',
            AccessKind::Modify => 'M',
        }
    }
}

impl TryFrom<char> for AccessKind {
    type Error = char;

    fn try_from(op: char) -> Result<Self, Self::Error> {
        AccessKind::from_char(op).ok_or(op)
    }
}

/// One parsed trace record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceOp {
    pub kind: AccessKind,
    pub address: u64,
    /// Bytes touched. Carried for display only; the simulator ignores it.
    pub size: u32,
}

impl TraceOp {
    pub fn new(kind: AccessKind, address: u64, size: u32) -> TraceOp {
        TraceOp {
            kind,
            address,
            size,
        }
    }

    fn from_record(record: &StringRecord) -> Result<TraceOp, String> {
        if record.len() != 2 {
            return Err(format!(
                "expected `<op> <address>,<size>`, found {} comma-separated fields",
                record.len()
            ));
        }

        let mut head = record[0].split_whitespace();
        let (op, address) = match (head.next(), head.next(), head.next()) {
            (Some(op), Some(address), None) => (op, address),
            _ => return Err(format!("expected `<op> <address>`, found `{}`", &record[0])),
        };

        let mut letters = op.chars();
        let kind = match (letters.next(), letters.next()) {
            (Some(letter), None) => AccessKind::try_from(letter)
                .map_err(|letter| format!("unknown operation `{}`", letter))?,
            _ => return Err(format!("unknown operation `{}`", op)),
        };
        let address = u64::from_str_radix(address, 16)
            .map_err(|e| format!("bad address `{}`: {}", address, e))?;
        let size = record[1]
            .parse::<u32>()
            .map_err(|e| format!("bad size `{}`: {}", &record[1], e))?;

        Ok(TraceOp::new(kind, address, size))
    }
}

impl fmt::Display for TraceOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind.as_char(), self.address, self.size)
    }
}

/// Lazily parsed valgrind trace, one [`TraceOp`] per non-blank line.
pub struct Trace<R> {
    reader: csv::Reader<R>,
    record: StringRecord,
    failed: bool,
}

impl Trace<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self, TraceError> {
        let file = File::open(file_path)?;
        Ok(Trace::from_reader(BufReader::new(file)))
    }
}

impl<R: io::Read> Trace<R> {
    pub fn from_reader(input: R) -> Trace<R> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .trim(Trim::All)
            .from_reader(input);
        Trace {
            reader,
            record: StringRecord::new(),
            failed: false,
        }
    }
}

impl<R: io::Read> Iterator for Trace<R> {
    type Item = Result<TraceOp, TraceError>;

    /// Stops after the first error.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        loop {
            match self.reader.read_record(&mut self.record) {
                Ok(false) => return None,
                Ok(true) => {}
                Err(e) => {
                    self.failed = true;
                    return Some(Err(e.into()));
                }
            }

            if self.record.iter().all(str::is_empty) {
                continue;
            }

            let line = self.record.position().map_or(0, |pos| pos.line());
            return Some(TraceOp::from_record(&self.record).map_err(|reason| {
                self.failed = true;
                TraceError::Parse { line, reason }
            }));
        }
    }
}
