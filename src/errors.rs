use thiserror::Error;

use crate::identity::SimulationIdentity;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PsaError {
    #[error("simulation {0} is already registered")]
    DuplicateIdentity(SimulationIdentity),

    #[error("simulation {0} is not registered")]
    UnknownIdentity(SimulationIdentity),

    #[error("simulation {0} cannot be compared with itself")]
    InvalidPair(SimulationIdentity),

    #[error("catalog is sealed, unable to register {0}")]
    CatalogSealed(SimulationIdentity),

    #[error("invalid simulation identity {0:?}, expected \"NAME RUN\" or \"NAME(RUN)\"")]
    InvalidIdentity(String),

    #[error("line {line}: invalid distance value {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error(
        "{found} distance values do not fit {simulations} simulations \
         (expected condensed or square layout)"
    )]
    DistanceCount { simulations: usize, found: usize },

    #[error("distance matrix is not symmetric at ({i}, {j})")]
    AsymmetricMatrix { i: usize, j: usize },

    #[error("method {0:?} has no runs")]
    EmptyMethod(String),

    #[error("method {0:?} keeps its trajectory in the method directory and allows a single run")]
    FlatMethodRuns(String),

    #[error("method {0:?} is listed more than once")]
    DuplicateMethod(String),

    #[error("reference selection {0:?} is set without a reference structure")]
    MissingReference(String),
}

pub type PsaResult<T> = Result<T, PsaError>;
