use anyhow::{Context, Result};
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt, fs, path::Path, path::PathBuf};

use crate::{
    errors::{PsaError, PsaResult},
    identity::SimulationIdentity,
    pair_indexer::PairIndexer,
};

const DEFAULT_METHODS: [&str; 10] = [
    "DIMS", "FRODA", "MAP", "iENM", "MENM-SP", "MENM-SD", "MDdMD", "GOdMD", "Morph", "ANMP",
];
const LINEAR_INTERPOLATION: &str = "LinInt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    #[value(name = "discrete_frechet")]
    DiscreteFrechet,
    Hausdorff,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::DiscreteFrechet => write!(f, "discrete_frechet"),
            Metric::Hausdorff => write!(f, "hausdorff"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Linkage {
    #[default]
    Ward,
    Single,
    Complete,
    Weighted,
    Average,
}

impl fmt::Display for Linkage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Linkage::Ward => "ward",
            Linkage::Single => "single",
            Linkage::Complete => "complete",
            Linkage::Weighted => "weighted",
            Linkage::Average => "average",
        };
        write!(f, "{s}")
    }
}

fn default_runs() -> Vec<u32> {
    vec![1, 2, 3]
}

/// One sampling method and the runs it contributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSpec {
    pub name: String,

    #[serde(default = "default_runs")]
    pub runs: Vec<u32>,

    /// Topology file name inside the method directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topology: Option<String>,

    /// Trajectory sits directly in the method directory, no run subdirectory
    #[serde(default)]
    pub flat: bool,
}

impl MethodSpec {
    pub fn new(name: &str, runs: &[u32]) -> Self {
        Self {
            name: name.to_string(),
            runs: runs.to_vec(),
            topology: None,
            flat: false,
        }
    }

    /// CHARMM-style methods ship a PSF topology, everything else a PDB.
    pub fn topology_name(&self) -> &str {
        match &self.topology {
            Some(topology) => topology.as_str(),
            None if self.name.contains("DIMS") || self.name.contains("TMD") => "top.psf",
            None => "top.pdb",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PsaConfig {
    pub methods_dir: PathBuf,
    pub trajectory: String,
    pub metric: Metric,
    pub linkage: Linkage,
    pub plot: String,
    pub path_select: String,
    /// Structure every trajectory is superimposed onto, relative to the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_select: Option<String>,
    /// Align trajectories to the reference before comparing
    pub align: bool,
    /// Keep the aligned trajectories on disk
    pub store: bool,
    pub methods: Vec<MethodSpec>,
}

impl Default for PsaConfig {
    fn default() -> Self {
        let mut methods = DEFAULT_METHODS
            .iter()
            .map(|name| MethodSpec::new(name, &default_runs()))
            .collect::<Vec<_>>();
        methods.push(MethodSpec {
            flat: true,
            ..MethodSpec::new(LINEAR_INTERPOLATION, &[1])
        });
        Self {
            methods_dir: PathBuf::from("methods"),
            trajectory: "fitted_path.dcd".to_string(),
            metric: Metric::default(),
            linkage: Linkage::default(),
            plot: "df_ward_psa-short.pdf".to_string(),
            path_select: "name CA".to_string(),
            reference: None,
            ref_select: None,
            align: false,
            store: false,
            methods,
        }
    }
}

impl PsaConfig {
    /// Reads a TOML config, or falls back to the built-in method set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                info!("Reading config {}", path.to_string_lossy());
                let s = fs::read_to_string(path)
                    .with_context(|| format!("Reading {}", path.to_string_lossy()))?;
                Self::from_toml(&s).with_context(|| format!("Parsing {}", path.to_string_lossy()))?
            }
            None => Self::default(),
        };
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PsaResult<()> {
        if let (None, Some(ref_select)) = (&self.reference, &self.ref_select) {
            return Err(PsaError::MissingReference(ref_select.clone()));
        }
        let mut names = HashSet::new();
        for method in &self.methods {
            if method.runs.is_empty() {
                return Err(PsaError::EmptyMethod(method.name.clone()));
            }
            let mut runs = method.runs.clone();
            runs.sort_unstable();
            if let Some(run) = runs.windows(2).find(|w| w[0] == w[1]).map(|w| w[0]) {
                return Err(PsaError::DuplicateIdentity(SimulationIdentity::new(
                    &method.name,
                    run,
                )));
            }
            if method.flat && method.runs.len() > 1 {
                return Err(PsaError::FlatMethodRuns(method.name.clone()));
            }
            if !names.insert(method.name.as_str()) {
                return Err(PsaError::DuplicateMethod(method.name.clone()));
            }
        }
        Ok(())
    }

    /// Catalog in method order, matching the order simulations are handed to
    /// the comparator.
    pub fn indexer(&self) -> PsaResult<PairIndexer> {
        self.methods
            .iter()
            .try_fold(PairIndexer::new(), |mut indexer, method| {
                indexer.register(&method.name, &method.runs)?;
                Ok(indexer)
            })
    }
}
