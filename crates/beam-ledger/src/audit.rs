//! Cross-row consistency checks over a set of stored records.

use std::{collections::BTreeMap, fmt};

use beam_store::Record;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "violation", rename_all = "snake_case")]
pub enum Violation {
    TotalUnits {
        pool: String,
        recorded: String,
        actual: String,
    },
    BeamCount {
        pool: String,
        recorded: u64,
        actual: u64,
    },
    OrphanBeam {
        beam: String,
        pool: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::TotalUnits {
                pool,
                recorded,
                actual,
            } => write!(f, "pool {pool}: total units {recorded}, beams sum to {actual}"),
            Violation::BeamCount {
                pool,
                recorded,
                actual,
            } => write!(f, "pool {pool}: beam count {recorded}, {actual} beams hold units"),
            Violation::OrphanBeam { beam, pool } => {
                write!(f, "beam {beam} points at missing pool {pool}")
            }
        }
    }
}

#[derive(Default)]
struct Tally {
    units: u128,
    active: u64,
}

/// Checks `total_units` and `beam_count` of every pool against its beams and
/// flags beams whose pool is missing. Violations are ordered by pool key.
pub fn audit<'a>(records: impl IntoIterator<Item = &'a Record>) -> Vec<Violation> {
    let mut pools = BTreeMap::new();
    let mut tallies: BTreeMap<&str, Tally> = BTreeMap::new();
    let mut beams = Vec::new();

    for record in records {
        match record {
            Record::Pool(pool) => {
                pools.insert(pool.id.as_str(), pool);
            }
            Record::Beam(beam) => beams.push(beam),
            Record::User(_) | Record::Account(_) => {}
        }
    }

    let mut violations = Vec::new();
    for beam in beams {
        if !pools.contains_key(beam.pool.as_str()) {
            violations.push(Violation::OrphanBeam {
                beam: beam.id.clone(),
                pool: beam.pool.clone(),
            });
            continue;
        }
        let tally = tallies.entry(beam.pool.as_str()).or_default();
        tally.units = tally.units.saturating_add(beam.units);
        if beam.units > 0 {
            tally.active += 1;
        }
    }

    for (id, pool) in pools {
        let tally = tallies.remove(id).unwrap_or_default();
        if pool.total_units != tally.units {
            violations.push(Violation::TotalUnits {
                pool: id.to_string(),
                recorded: pool.total_units.to_string(),
                actual: tally.units.to_string(),
            });
        }
        if pool.beam_count != tally.active {
            violations.push(Violation::BeamCount {
                pool: id.to_string(),
                recorded: pool.beam_count,
                actual: tally.active,
            });
        }
    }

    violations
}
