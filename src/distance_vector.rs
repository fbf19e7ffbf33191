use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};
use nalgebra::DMatrix;
use std::{
    fs,
    io::{self, Write},
    path::Path,
};

use crate::{
    errors::{PsaError, PsaResult},
    identity::SimulationIdentity,
    pair_indexer::{condensed_index, condensed_len, PairIndexer},
};

const SYMMETRY_TOLERANCE: f64 = 1e-6;

/// Pairwise distances between `size` simulations, stored as the condensed
/// upper triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceVector {
    size: usize,
    values: Vec<f64>,
}

impl DistanceVector {
    pub fn from_condensed(size: usize, values: Vec<f64>) -> PsaResult<Self> {
        if values.len() != condensed_len(size) {
            return Err(PsaError::DistanceCount {
                simulations: size,
                found: values.len(),
            });
        }
        Ok(Self { size, values })
    }

    /// Takes the upper triangle of a row-major `size` x `size` matrix.
    pub fn from_square(size: usize, values: &[f64]) -> PsaResult<Self> {
        if values.len() != size * size {
            return Err(PsaError::DistanceCount {
                simulations: size,
                found: values.len(),
            });
        }
        let mut condensed = Vec::with_capacity(condensed_len(size));
        for (i, j) in (0..size).tuple_combinations() {
            let (upper, lower) = (values[i * size + j], values[j * size + i]);
            let scale = upper.abs().max(lower.abs()).max(1.0);
            if !((upper - lower).abs() <= SYMMETRY_TOLERANCE * scale) {
                return Err(PsaError::AsymmetricMatrix { i, j });
            }
            condensed.push(upper);
        }
        Ok(Self {
            size,
            values: condensed,
        })
    }

    /// Whitespace separated numbers, `#` lines are comments. The layout is
    /// picked from the number of values: C(size, 2) is condensed, size^2 is a
    /// full matrix.
    pub fn from_text(s: &str, size: usize) -> PsaResult<Self> {
        let values = iter_tokens(s)
            .map(|(line, token)| {
                token.parse::<f64>().map_err(|_| PsaError::InvalidNumber {
                    line,
                    token: token.to_string(),
                })
            })
            .collect::<PsaResult<Vec<_>>>()?;
        debug!("{} distance values for {} simulations", values.len(), size);
        if values.len() == condensed_len(size) {
            Self::from_condensed(size, values)
        } else {
            Self::from_square(size, &values)
        }
    }

    pub fn read(path: &Path, size: usize) -> Result<Self> {
        info!("Reading distances {}", path.to_string_lossy());
        let s = fs::read_to_string(path)
            .with_context(|| format!("Reading {}", path.to_string_lossy()))?;
        let distances = Self::from_text(&s, size)
            .with_context(|| format!("Parsing {}", path.to_string_lossy()))?;
        Ok(distances)
    }

    /// Writes the condensed vector, one value per line.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let f = fs::File::create(path)?;
        let mut w = io::BufWriter::new(f);
        for value in &self.values {
            writeln!(w, "{value}")?;
        }
        w.flush()
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Distance between catalog positions `i` and `j`, zero on the diagonal.
    pub fn at(&self, i: usize, j: usize) -> Option<f64> {
        if i == j && i < self.size {
            return Some(0.0);
        }
        condensed_index(self.size, i, j).map(|k| self.values[k])
    }

    fn check_catalog(&self, indexer: &PairIndexer) -> PsaResult<()> {
        if indexer.len() != self.size {
            return Err(PsaError::DistanceCount {
                simulations: indexer.len(),
                found: self.values.len(),
            });
        }
        Ok(())
    }

    pub fn distance(
        &self,
        indexer: &PairIndexer,
        a: &SimulationIdentity,
        b: &SimulationIdentity,
    ) -> PsaResult<f64> {
        self.check_catalog(indexer)?;
        let k = indexer.pair_index(a, b)?;
        Ok(self.values[k])
    }

    /// Every other simulation ordered by its distance to `a`, closest first.
    pub fn nearest<'a>(
        &self,
        indexer: &'a PairIndexer,
        a: &SimulationIdentity,
    ) -> PsaResult<Vec<(&'a SimulationIdentity, f64)>> {
        self.check_catalog(indexer)?;
        indexer
            .position(a)
            .ok_or_else(|| PsaError::UnknownIdentity(a.clone()))?;
        let mut neighbors = indexer
            .identities()
            .iter()
            .filter(|b| *b != a)
            .map(|b| -> PsaResult<_> { Ok((b, self.values[indexer.pair_index(a, b)?])) })
            .collect::<PsaResult<Vec<_>>>()?;
        neighbors.sort_by(|x, y| x.1.total_cmp(&y.1));
        Ok(neighbors)
    }

    /// Full symmetric matrix with a zero diagonal.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_fn(self.size, self.size, |i, j| {
            self.at(i, j).unwrap_or(f64::NAN)
        })
    }

    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .minmax_by(|a, b| a.total_cmp(b))
            .into_option()
    }
}

fn iter_tokens(s: &str) -> impl Iterator<Item = (usize, &str)> {
    s.lines()
        .zip(1..)
        .filter(|(l, _)| !l.trim_start().starts_with('#'))
        .flat_map(|(l, line)| l.split_whitespace().map(move |token| (line, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_float_eq::assert_f64_near;

    fn id(name: &str, run: u32) -> SimulationIdentity {
        SimulationIdentity::new(name, run)
    }

    fn indexer() -> PairIndexer {
        let mut indexer = PairIndexer::new();
        indexer.register("DIMS", &[1, 2]).unwrap();
        indexer.register("LinInt", &[1]).unwrap();
        indexer.register("MAP", &[1]).unwrap();
        indexer
    }

    const CONDENSED: &str = "# discrete_frechet\n1.5 2.0 4.0\n3.0 2.5\n0.5\n";
    const SQUARE: &str = "\
0.0 1.5 2.0 4.0
1.5 0.0 3.0 2.5
2.0 3.0 0.0 0.5
4.0 2.5 0.5 0.0
";

    #[test]
    fn test_condensed_and_square_agree() {
        let condensed = DistanceVector::from_text(CONDENSED, 4).unwrap();
        let square = DistanceVector::from_text(SQUARE, 4).unwrap();
        assert_eq!(condensed, square);
        assert_eq!(condensed.len(), 6);
        let indexer = indexer();
        let d = condensed
            .distance(&indexer, &id("LinInt", 1), &id("DIMS", 2))
            .unwrap();
        assert_f64_near!(d, 3.0);
        assert_f64_near!(condensed.at(3, 2).unwrap(), 0.5);
        assert_f64_near!(condensed.at(1, 1).unwrap(), 0.0);
        assert!(condensed.at(1, 4).is_none());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            DistanceVector::from_text("1.0 2.0\n3.0 x\n", 3),
            Err(PsaError::InvalidNumber {
                line: 2,
                token: "x".to_string()
            })
        );
        assert_eq!(
            DistanceVector::from_text("1.0 2.0", 3),
            Err(PsaError::DistanceCount {
                simulations: 3,
                found: 2
            })
        );
        assert_eq!(
            DistanceVector::from_text("0 1 2\n1 0 3\n2 3.5 0\n", 3),
            Err(PsaError::AsymmetricMatrix { i: 1, j: 2 })
        );
    }

    #[test]
    fn test_catalog_mismatch() {
        let distances = DistanceVector::from_condensed(3, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            distances.distance(&indexer(), &id("DIMS", 1), &id("DIMS", 2)),
            Err(PsaError::DistanceCount {
                simulations: 4,
                found: 3
            })
        );
    }

    #[test]
    fn test_nearest() {
        let distances = DistanceVector::from_text(CONDENSED, 4).unwrap();
        let indexer = indexer();
        let nearest = distances.nearest(&indexer, &id("MAP", 1)).unwrap();
        let names = nearest.iter().map(|(s, _)| s.to_string()).collect::<Vec<_>>();
        assert_eq!(names, vec!["LinInt 1", "DIMS 2", "DIMS 1"]);
        assert_f64_near!(nearest[0].1, 0.5);
        assert_eq!(
            distances.nearest(&indexer, &id("MAP", 2)),
            Err(PsaError::UnknownIdentity(id("MAP", 2)))
        );
    }

    #[test]
    fn test_to_matrix() {
        let distances = DistanceVector::from_text(CONDENSED, 4).unwrap();
        let m = distances.to_matrix();
        assert_eq!(m.shape(), (4, 4));
        assert_eq!(m, m.transpose());
        (0..4).for_each(|i| assert_f64_near!(m[(i, i)], 0.0));
        assert_f64_near!(m[(0, 3)], 4.0);
        let (min, max) = distances.min_max().unwrap();
        assert_f64_near!(min, 0.5);
        assert_f64_near!(max, 4.0);
    }

    #[test]
    fn test_read_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let square_path = dir.path().join("discrete_frechet.dat");
        fs::write(&square_path, SQUARE).unwrap();
        let distances = DistanceVector::read(&square_path, 4).unwrap();
        let condensed_path = dir.path().join("condensed.dat");
        distances.save(&condensed_path).unwrap();
        assert_eq!(DistanceVector::read(&condensed_path, 4).unwrap(), distances);
        assert!(DistanceVector::read(&dir.path().join("missing.dat"), 4).is_err());
    }
}
