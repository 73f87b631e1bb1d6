use std::path::PathBuf;

use csim::{Counters, Geometry, Outcome, Simulator, Trace, TraceError};

fn trace_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("traces").join(name)
}

fn replay(name: &str, set_bits: u32, associativity: usize, block_bits: u32) -> Counters {
    let geometry = Geometry::new(set_bits, associativity, block_bits).unwrap();
    let trace = Trace::open(trace_path(name)).unwrap();
    Simulator::new(geometry).run(trace).unwrap()
}

fn counters(hits: u64, misses: u64, evictions: u64) -> Counters {
    Counters {
        hits,
        misses,
        evictions,
    }
}

#[test]
fn reference_traces() {
    let cases = [
        ("yi.trace", 4, 1, 4, counters(4, 5, 3)),
        ("yi.trace", 1, 1, 1, counters(2, 7, 5)),
        ("yi2.trace", 1, 1, 1, counters(9, 8, 6)),
        ("yi2.trace", 2, 2, 2, counters(13, 4, 0)),
        ("dave.trace", 1, 1, 4, counters(2, 3, 1)),
        ("dave.trace", 0, 2, 4, counters(2, 3, 1)),
        ("mixed.trace", 2, 1, 4, counters(5, 4, 1)),
        ("mixed.trace", 0, 2, 3, counters(2, 7, 5)),
        ("mixed.trace", 1, 4, 2, counters(5, 4, 0)),
    ];

    for (name, s, e, b, expected) in cases {
        assert_eq!(
            replay(name, s, e, b),
            expected,
            "{} with s={} E={} b={}",
            name,
            s,
            e,
            b
        );
    }
}

#[test]
fn verbose_lines_match_reference_output() {
    let geometry = Geometry::new(4, 1, 4).unwrap();
    let trace = Trace::open(trace_path("yi.trace")).unwrap();
    let mut lines = Vec::new();
    let counters = Simulator::new(geometry)
        .run_with(trace, |step| {
            if step.is_data_access() {
                lines.push(step.to_string());
            }
        })
        .unwrap();

    assert_eq!(
        lines,
        vec![
            "L 10,1 miss",
            "M 20,1 miss hit",
            "L 22,1 hit",
            "S 18,1 hit",
            "L 110,1 miss eviction",
            "L 210,1 miss eviction",
            "M 12,1 miss eviction hit",
        ]
    );
    assert_eq!(counters.to_string(), "hits:4 misses:5 evictions:3");
}

#[test]
fn instruction_fetches_advance_the_clock_only() {
    let geometry = Geometry::new(0, 2, 0).unwrap();
    let mut simulator = Simulator::new(geometry);
    let trace = Trace::from_reader(" L 1,1\nI 2,4\n L 2,1\nI 3,4\n".as_bytes());
    let result = simulator.run(trace).unwrap();

    assert_eq!(result, counters(0, 2, 0));
    assert_eq!(simulator.time(), 4);
    let lines = simulator.cache().set(0).unwrap().lines();
    assert_eq!((lines[0].tag, lines[0].last_used), (1, 0));
    assert_eq!((lines[1].tag, lines[1].last_used), (2, 2));
}

#[test]
fn lru_victim_follows_recency_not_insertion() {
    // one set, two ways, one-byte blocks: each address is its own tag
    let geometry = Geometry::new(0, 2, 0).unwrap();
    let mut simulator = Simulator::new(geometry);
    let trace = Trace::from_reader(" L 1,1\n L 2,1\n L 1,1\n L 3,1\n L 1,1\n L 2,1\n".as_bytes());

    let mut outcomes = Vec::new();
    simulator
        .run_with(trace, |step| outcomes.push(step.outcome.unwrap()))
        .unwrap();

    assert_eq!(
        outcomes,
        vec![
            Outcome::Miss,
            Outcome::Miss,
            Outcome::Hit,
            Outcome::MissWithEviction,
            Outcome::Hit,
            Outcome::MissWithEviction,
        ]
    );
    let mut tags = simulator.cache().set(0).unwrap().resident_tags();
    tags.sort();
    assert_eq!(tags, vec![1, 2]);
}

#[test]
fn malformed_trace_fails_fast() {
    let geometry = Geometry::new(1, 1, 1).unwrap();
    let mut simulator = Simulator::new(geometry);
    let trace = Trace::from_reader(" L 10,1\n S 20,1\n Q 30,1\n L 10,1\n".as_bytes());

    match simulator.run(trace) {
        Err(TraceError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected a parse error, got {:?}", other),
    }
    assert_eq!(simulator.counters().accesses(), 2);
}

#[test]
fn fresh_models_replay_identically() {
    let first = replay("mixed.trace", 1, 2, 3);
    let second = replay("mixed.trace", 1, 2, 3);
    assert_eq!(first, second);
}
