use anyhow::Result;
use log::{debug, info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};
use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::{
    config::PsaConfig,
    errors::{PsaError, PsaResult},
    identity::SimulationIdentity,
    pair_indexer::PairIndexer,
};

/// Topology/trajectory file pair handed to the trajectory loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationFiles {
    pub topology: PathBuf,
    pub trajectory: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub identity: SimulationIdentity,
    pub label: String,
    pub files: SimulationFiles,
}

/// All simulations of one analysis, in catalog order, together with the
/// catalog that indexes their comparisons.
#[derive(Debug, Default)]
pub struct SimulationSet {
    root: PathBuf,
    indexer: PairIndexer,
    simulations: Vec<Simulation>,
}

impl SimulationSet {
    /// Lays out `root/<methods_dir>/<method>/<run:03>/<trajectory>` for every
    /// catalog entry, with the topology shared per method directory.
    pub fn from_config(config: &PsaConfig, root: &Path) -> PsaResult<Self> {
        info!("Building collection of simulations...");
        config.validate()?;
        let indexer = config.indexer()?;
        let methods = config
            .methods
            .iter()
            .map(|method| (method.name.as_str(), method))
            .collect::<HashMap<_, _>>();
        let methods_dir = root.join(&config.methods_dir);
        let simulations = indexer
            .identities()
            .iter()
            .filter_map(|identity| {
                let method = methods.get(identity.name())?;
                let method_dir = methods_dir.join(&method.name);
                let (label, trajectory) = if method.flat {
                    (method.name.clone(), method_dir.join(&config.trajectory))
                } else {
                    (
                        identity.label(),
                        method_dir
                            .join(format!("{:03}", identity.run()))
                            .join(&config.trajectory),
                    )
                };
                Some(Simulation {
                    identity: identity.clone(),
                    label,
                    files: SimulationFiles {
                        topology: method_dir.join(method.topology_name()),
                        trajectory,
                    },
                })
            })
            .collect::<Vec<_>>();
        debug!("{} simulations", simulations.len());
        Ok(Self {
            root: root.to_path_buf(),
            indexer,
            simulations,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn indexer(&self) -> &PairIndexer {
        &self.indexer
    }

    /// Display label of a registered simulation, `LinInt` for flat methods.
    pub fn label(&self, identity: &SimulationIdentity) -> PsaResult<&str> {
        self.indexer
            .position(identity)
            .map(|i| self.simulations[i].label.as_str())
            .ok_or_else(|| PsaError::UnknownIdentity(identity.clone()))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.simulations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.simulations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Simulation> {
        self.simulations.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.simulations.iter().map(|s| s.label.as_str()).collect()
    }

    /// Files referenced by the set that do not exist, checked on a pool of
    /// `threads` workers.
    pub fn missing_files(&self, threads: usize) -> Result<Vec<PathBuf>> {
        let tp = ThreadPoolBuilder::new().num_threads(threads).build()?;
        let mut paths = self
            .simulations
            .iter()
            .flat_map(|s| [&s.files.topology, &s.files.trajectory])
            .collect::<Vec<_>>();
        paths.sort();
        paths.dedup();
        let missing = tp.install(|| {
            paths
                .into_par_iter()
                .filter(|p| !p.is_file())
                .map(|p| p.to_path_buf())
                .collect::<Vec<_>>()
        });
        missing
            .iter()
            .for_each(|p| warn!("missing file: {}", p.to_string_lossy()));
        Ok(missing)
    }
}
