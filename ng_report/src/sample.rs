use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

/// Read mate of a pair-end sample.  Anything other than R1 or R2
/// (or absence) is rejected when the job description is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairEnd {
    R1,
    R2,
}

impl FromStr for PairEnd {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "R1" => Ok(Self::R1),
            "R2" => Ok(Self::R2),
            _ => Err(anyhow!("Unexpected pair-end type: {}", s)),
        }
    }
}

impl fmt::Display for PairEnd {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::R1 => write!(f, "R1"),
            Self::R2 => write!(f, "R2"),
        }
    }
}

impl Serialize for PairEnd {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

/// Sample
///
/// One sequencing read set from a job.  A pair-end sample appears as two
/// entries sharing the same name, distinguished by pair_end.
///
/// name - base sample name (mates share this)
/// pair_end - which mate this read set is, if pair-end
/// stranded - whether the library is strand specific, if known
/// full_name - derived name carrying the pair-end suffix; this names the
///             per-sample result directory
///
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    name: String,
    pair_end: Option<PairEnd>,
    stranded: Option<bool>,
    full_name: String,
}

impl Sample {
    pub fn new(name: String, pair_end: Option<PairEnd>, stranded: Option<bool>) -> Self {
        let full_name = match pair_end {
            Some(pe) => format!("{}_{}", name, pe),
            None => name.clone(),
        };
        trace!("New sample {} created", full_name);
        Self {
            name,
            pair_end,
            stranded,
            full_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pair_end(&self) -> Option<PairEnd> {
        self.pair_end
    }

    pub fn stranded(&self) -> Option<bool> {
        self.stranded
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}
