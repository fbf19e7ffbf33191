mod config;
mod distance_vector;
mod errors;
mod identity;
mod manifest;
mod pair_indexer;
mod simulation;

pub use config::{Linkage, MethodSpec, Metric, PsaConfig};
pub use distance_vector::DistanceVector;
pub use errors::{PsaError, PsaResult};
pub use identity::{PairKey, SimulationIdentity};
pub use manifest::{ManifestEntry, RunManifest};
pub use pair_indexer::{condensed_index, condensed_len, PairIndexer};
pub use simulation::{Simulation, SimulationFiles, SimulationSet};
