use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::errors::{PsaError, PsaResult};

/// One trajectory: a sampling method name plus its run number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimulationIdentity {
    name: String,
    run: u32,
}

impl SimulationIdentity {
    pub fn new(name: impl Into<String>, run: u32) -> Self {
        Self {
            name: name.into(),
            run,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn run(&self) -> u32 {
        self.run
    }

    /// Heat map style label, e.g. `DIMS(1)`.
    pub fn label(&self) -> String {
        format!("{}({})", self.name, self.run)
    }
}

impl fmt::Display for SimulationIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.run)
    }
}

impl FromStr for SimulationIdentity {
    type Err = PsaError;

    /// Accepts `DIMS 1`, `DIMS(1)` or a bare `LinInt`, which means run 1.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PsaError::InvalidIdentity(s.to_string());
        let s_trim = s.trim();
        let (name, run) = if let Some(head) = s_trim.strip_suffix(')') {
            let (name, run) = head.rsplit_once('(').ok_or_else(invalid)?;
            (name.trim_end(), run.trim())
        } else if let Some((name, run)) = s_trim.rsplit_once(char::is_whitespace) {
            (name.trim_end(), run)
        } else {
            (s_trim, "1")
        };
        if name.is_empty() || name.contains(['(', ')']) {
            return Err(invalid());
        }
        let run = run.parse::<u32>().map_err(|_| invalid())?;
        Ok(Self::new(name, run))
    }
}

/// Unordered pair of two distinct simulations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    first: SimulationIdentity,
    second: SimulationIdentity,
}

impl PairKey {
    pub fn new(a: SimulationIdentity, b: SimulationIdentity) -> PsaResult<Self> {
        if a == b {
            return Err(PsaError::InvalidPair(a));
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        Ok(Self { first, second })
    }

    pub fn first(&self) -> &SimulationIdentity {
        &self.first
    }

    pub fn second(&self) -> &SimulationIdentity {
        &self.second
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.first, self.second)
    }
}
