use itertools::Itertools;
use log::debug;
use std::{
    collections::HashMap,
    sync::atomic::{AtomicBool, Ordering},
};

use crate::{
    errors::{PsaError, PsaResult},
    identity::{PairKey, SimulationIdentity},
};

/// Number of unique pairs among `n` items.
#[inline]
#[must_use]
pub fn condensed_len(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Index of the pair `(i, j)` in the condensed upper-triangular vector of `n`
/// items, enumerated row by row: (0,1), (0,2), ..., (0,n-1), (1,2), ...
#[must_use]
pub fn condensed_index(n: usize, i: usize, j: usize) -> Option<usize> {
    if i == j || i >= n || j >= n {
        return None;
    }
    let (i, j) = (i.min(j), i.max(j));
    Some(n * i - i * (i + 1) / 2 + (j - i - 1))
}

/// Ordered catalog of simulations, registered once and then queried for the
/// position of each comparison in the condensed distance vector.
///
/// Registration needs `&mut self`, queries only `&self`. The first query
/// seals the catalog, any later `register` call fails.
#[derive(Debug, Default)]
pub struct PairIndexer {
    identities: Vec<SimulationIdentity>,
    positions: HashMap<SimulationIdentity, usize>,
    sealed: AtomicBool,
}

impl PairIndexer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` once per run, runs in ascending order. Nothing is
    /// registered if any of the identities is rejected.
    pub fn register(&mut self, name: &str, runs: &[u32]) -> PsaResult<()> {
        let mut runs = runs.to_vec();
        runs.sort_unstable();
        if self.is_sealed() {
            let run = runs.first().copied().unwrap_or_default();
            return Err(PsaError::CatalogSealed(SimulationIdentity::new(name, run)));
        }
        if let Some(run) = runs.iter().tuple_windows().find(|(a, b)| a == b).map(|(a, _)| *a) {
            return Err(PsaError::DuplicateIdentity(SimulationIdentity::new(name, run)));
        }
        let new_ids = runs
            .into_iter()
            .map(|run| SimulationIdentity::new(name, run))
            .collect::<Vec<_>>();
        if let Some(id) = new_ids.iter().find(|id| self.positions.contains_key(*id)) {
            return Err(PsaError::DuplicateIdentity(id.clone()));
        }
        for id in new_ids {
            debug!("registered {} at position {}", id, self.identities.len());
            self.positions.insert(id.clone(), self.identities.len());
            self.identities.push(id);
        }
        Ok(())
    }

    /// Closes the registration phase without querying.
    pub fn seal(&self) {
        self.sealed.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }

    #[must_use]
    pub fn identities(&self) -> &[SimulationIdentity] {
        &self.identities
    }

    #[must_use]
    pub fn position(&self, id: &SimulationIdentity) -> Option<usize> {
        self.positions.get(id).copied()
    }

    fn require_position(&self, id: &SimulationIdentity) -> PsaResult<usize> {
        self.position(id)
            .ok_or_else(|| PsaError::UnknownIdentity(id.clone()))
    }

    /// Index of the comparison between `a` and `b` in the condensed distance
    /// vector. Symmetric in its arguments.
    pub fn pair_index(&self, a: &SimulationIdentity, b: &SimulationIdentity) -> PsaResult<usize> {
        self.seal();
        let i = self.require_position(a)?;
        let j = self.require_position(b)?;
        condensed_index(self.len(), i, j).ok_or_else(|| PsaError::InvalidPair(a.clone()))
    }

    pub fn pair_key_index(&self, key: &PairKey) -> PsaResult<usize> {
        self.pair_index(key.first(), key.second())
    }

    /// Every comparison in condensed vector order, paired with its index.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, &SimulationIdentity, &SimulationIdentity)> {
        self.seal();
        self.identities
            .iter()
            .tuple_combinations()
            .enumerate()
            .map(|(k, (a, b))| (k, a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn id(name: &str, run: u32) -> SimulationIdentity {
        SimulationIdentity::new(name, run)
    }

    fn sample_indexer() -> PairIndexer {
        let mut indexer = PairIndexer::new();
        indexer.register("DIMS", &[1, 2, 3]).unwrap();
        indexer.register("FRODA", &[1, 2, 3]).unwrap();
        indexer.register("LinInt", &[1]).unwrap();
        indexer
    }

    fn numbered_indexer(n: usize) -> PairIndexer {
        let mut indexer = PairIndexer::new();
        let runs = (1..=n as u32).collect::<Vec<_>>();
        indexer.register("sim", &runs).unwrap();
        indexer
    }

    #[test]
    fn test_condensed_len() {
        assert_eq!(condensed_len(0), 0);
        assert_eq!(condensed_len(1), 0);
        assert_eq!(condensed_len(2), 1);
        assert_eq!(condensed_len(7), 21);
        assert_eq!(condensed_len(31), 465);
    }

    #[test]
    fn test_condensed_index_bounds() {
        assert_eq!(condensed_index(4, 0, 1), Some(0));
        assert_eq!(condensed_index(4, 2, 3), Some(5));
        assert_eq!(condensed_index(4, 3, 2), Some(5));
        assert_eq!(condensed_index(4, 1, 1), None);
        assert_eq!(condensed_index(4, 1, 4), None);
    }

    #[test]
    fn test_scenario() {
        let indexer = sample_indexer();
        assert_eq!(indexer.len(), 7);
        assert_eq!(indexer.position(&id("FRODA", 1)), Some(3));
        assert_eq!(indexer.pair_index(&id("DIMS", 1), &id("DIMS", 2)), Ok(0));
        assert_eq!(indexer.pair_index(&id("FRODA", 2), &id("LinInt", 1)), Ok(19));
        assert_eq!(indexer.pair_index(&id("LinInt", 1), &id("FRODA", 2)), Ok(19));
        assert_eq!(indexer.pair_index(&id("FRODA", 3), &id("LinInt", 1)), Ok(20));
    }

    #[test]
    fn test_runs_registered_ascending() {
        let mut indexer = PairIndexer::new();
        indexer.register("MAP", &[3, 1, 2]).unwrap();
        assert_eq!(indexer.identities(), &[id("MAP", 1), id("MAP", 2), id("MAP", 3)]);
    }

    #[test]
    fn test_duplicate_identity() {
        let mut indexer = sample_indexer();
        assert_eq!(
            indexer.register("FRODA", &[4, 2]),
            Err(PsaError::DuplicateIdentity(id("FRODA", 2)))
        );
        assert_eq!(indexer.len(), 7);
        assert_eq!(indexer.position(&id("FRODA", 4)), None);
        assert_eq!(
            indexer.register("Morph", &[1, 2, 1]),
            Err(PsaError::DuplicateIdentity(id("Morph", 1)))
        );
        assert_eq!(indexer.len(), 7);
    }

    #[test]
    fn test_unknown_identity() {
        let indexer = sample_indexer();
        assert_eq!(
            indexer.pair_index(&id("DIMS", 1), &id("DIMS", 4)),
            Err(PsaError::UnknownIdentity(id("DIMS", 4)))
        );
        assert_eq!(
            indexer.pair_index(&id("rTMD-F", 3), &id("rTMD-F", 3)),
            Err(PsaError::UnknownIdentity(id("rTMD-F", 3)))
        );
    }

    #[test]
    fn test_invalid_pair() {
        let indexer = sample_indexer();
        assert_eq!(
            indexer.pair_index(&id("DIMS", 3), &id("DIMS", 3)),
            Err(PsaError::InvalidPair(id("DIMS", 3)))
        );
    }

    #[test]
    fn test_sealed_after_query() {
        let mut indexer = sample_indexer();
        assert!(!indexer.is_sealed());
        indexer.pair_index(&id("DIMS", 1), &id("DIMS", 2)).unwrap();
        assert!(indexer.is_sealed());
        assert_eq!(
            indexer.register("MAP", &[2, 1]),
            Err(PsaError::CatalogSealed(id("MAP", 1)))
        );
        assert_eq!(indexer.len(), 7);
    }

    #[test]
    fn test_sealed_explicitly() {
        let mut indexer = PairIndexer::new();
        indexer.seal();
        assert!(matches!(
            indexer.register("DIMS", &[1]),
            Err(PsaError::CatalogSealed(_))
        ));
    }

    #[test]
    fn test_order_sensitivity() {
        let mut indexer = PairIndexer::new();
        indexer.register("LinInt", &[1]).unwrap();
        indexer.register("FRODA", &[1, 2, 3]).unwrap();
        indexer.register("DIMS", &[1, 2, 3]).unwrap();
        assert_eq!(indexer.pair_index(&id("FRODA", 2), &id("LinInt", 1)), Ok(1));
        assert_eq!(indexer.pair_index(&id("DIMS", 1), &id("DIMS", 2)), Ok(18));
    }

    #[test]
    fn test_pairs_enumeration() {
        let indexer = sample_indexer();
        let pairs = indexer.pairs().collect::<Vec<_>>();
        assert_eq!(pairs.len(), condensed_len(7));
        for (k, a, b) in pairs {
            assert_eq!(indexer.pair_index(a, b), Ok(k));
        }
        let key = PairKey::new(id("LinInt", 1), id("DIMS", 1)).unwrap();
        assert_eq!(indexer.pair_key_index(&key), Ok(5));
    }

    #[test]
    fn test_shared_queries() {
        let indexer = std::sync::Arc::new(sample_indexer());
        let handles = (0..4)
            .map(|_| {
                let indexer = indexer.clone();
                std::thread::spawn(move || indexer.pair_index(&id("FRODA", 2), &id("LinInt", 1)))
            })
            .collect::<Vec<_>>();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(19));
        }
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_closed_form(n in 2usize..40) {
            let indexer = numbered_indexer(n);
            let ids = indexer.identities().to_vec();
            for i in 0..n {
                for j in (i + 1)..n {
                    let ab = indexer.pair_index(&ids[i], &ids[j]).unwrap();
                    let ba = indexer.pair_index(&ids[j], &ids[i]).unwrap();
                    prop_assert_eq!(ab, ba);
                    prop_assert_eq!(ab, n * i - i * (i + 1) / 2 + (j - i - 1));
                }
            }
        }

        #[test]
        fn prop_bijection(n in 2usize..40) {
            let indexer = numbered_indexer(n);
            let ids = indexer.identities().to_vec();
            let indices = ids
                .iter()
                .tuple_combinations()
                .map(|(a, b)| indexer.pair_index(a, b).unwrap())
                .collect::<HashSet<_>>();
            prop_assert_eq!(indices, (0..condensed_len(n)).collect::<HashSet<_>>());
        }
    }
}
