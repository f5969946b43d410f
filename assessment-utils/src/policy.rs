use std::{collections::BTreeMap, fmt, path::Path};

use question_bank::Stratum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;

pub const STANDARD_QUESTION_LIMIT: usize = 18;

/// Questions drawn from each stratum of an adaptive set.
pub const ADAPTIVE_PER_STRATUM: usize = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Standard,
    Adaptive,
}

impl Mode {
    /// Parses the `type` query parameter. Missing or unrecognized values mean standard.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some(p) if p.eq_ignore_ascii_case("adaptive") => Mode::Adaptive,
            Some(p) if p.is_empty() || p.eq_ignore_ascii_case("standard") => Mode::Standard,
            Some(other) => {
                debug!(test_type = other, "unrecognized test type, using standard");
                Mode::Standard
            }
            None => Mode::Standard,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Standard => write!(f, "standard"),
            Mode::Adaptive => write!(f, "adaptive"),
        }
    }
}

/// Selection policy for question sets.
///
/// `adaptive` maps each assessment type eligible for adaptive sets to its strata. Types
/// missing from the map always get a standard set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssemblyPolicy {
    #[serde(default = "default_standard_limit")]
    pub standard_limit: usize,
    #[serde(default)]
    pub adaptive: BTreeMap<i64, Vec<Stratum>>,
}

fn default_standard_limit() -> usize {
    STANDARD_QUESTION_LIMIT
}

impl Default for AssemblyPolicy {
    /// Assessment types 1 (General) and 2 (Nursing), each drawing from the Foundational (1)
    /// and Industrial (2) sections at every level.
    fn default() -> Self {
        let strata: Vec<Stratum> = [1, 2]
            .into_iter()
            .flat_map(|section_id| {
                ["Basic", "Intermediate", "Advanced"]
                    .into_iter()
                    .map(move |level| Stratum::new(section_id, level))
            })
            .collect();

        Self {
            standard_limit: STANDARD_QUESTION_LIMIT,
            adaptive: BTreeMap::from([(1, strata.clone()), (2, strata)]),
        }
    }
}

impl AssemblyPolicy {
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let policy: AssemblyPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Strata for an assessment type, if it is eligible for adaptive sets.
    pub fn strata_for(&self, assessment_type_id: i64) -> Option<&[Stratum]> {
        self.adaptive
            .get(&assessment_type_id)
            .map(Vec::as_slice)
            .filter(|strata| !strata.is_empty())
    }

    /// A policy is valid when the standard limit is non-zero and no assessment type lists the
    /// same stratum twice.
    pub fn validate(&self) -> Result<(), Error> {
        if self.standard_limit == 0 {
            return Err(Error::InvalidPolicy(
                "standard_limit must be greater than 0".into(),
            ));
        }

        for (assessment_type_id, strata) in &self.adaptive {
            let mut seen: Vec<&Stratum> = vec![];
            for stratum in strata {
                if seen.contains(&stratum) {
                    return Err(Error::InvalidPolicy(format!(
                        "assessment type {assessment_type_id} lists stratum ({}, {}) more than once",
                        stratum.section_id, stratum.level
                    )));
                }
                seen.push(stratum);
            }
        }

        Ok(())
    }
}
