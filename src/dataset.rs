//! Dataset loading, splitting, and batch encoding
//!
//! Raw data lives as tab-separated files under a data directory, one sample
//! per line: `PI_SEQ\tM_SEQ\tLABEL` with the label in {0, 1}. Lines starting
//! with `#` and blank lines are skipped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use burn::prelude::*;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::info;

use crate::encoding::seq_to_labels;
use crate::error::{Result, SeqPairError};

/// One labelled sample: a pi-sequence, an m-sequence, and a binary label.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplePair {
    pub pi: String,
    pub m: String,
    pub label: f32,
}

/// Deterministic seeded partition of the dataset.
#[derive(Debug, Clone)]
pub struct DataSplit {
    pub train: Vec<SamplePair>,
    pub validation: Vec<SamplePair>,
    pub test: Vec<SamplePair>,
}

/// Load all `.tsv` files under `dir`.
///
/// Files are read in sorted order so the sample order is stable across runs.
/// A missing directory, an unparsable line, a label outside {0, 1}, or
/// inconsistent per-column sequence lengths are all fatal.
pub fn load_pairs(dir: &Path) -> Result<Vec<SamplePair>> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .filter(|path| path.extension().map(|ext| ext == "tsv").unwrap_or(false))
        .collect();
    paths.sort();

    if paths.is_empty() {
        return Err(SeqPairError::Dataset(format!(
            "no .tsv files found under {}",
            dir.display()
        )));
    }

    let mut samples = Vec::new();
    for path in &paths {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split('\t');
            let (pi, m, label) = match (fields.next(), fields.next(), fields.next()) {
                (Some(pi), Some(m), Some(label)) => (pi, m, label),
                _ => {
                    return Err(SeqPairError::Dataset(format!(
                        "{}:{}: expected PI\\tM\\tLABEL",
                        path.display(),
                        i + 1
                    )))
                }
            };
            let label: f32 = label.trim().parse().map_err(|_| {
                SeqPairError::Dataset(format!(
                    "{}:{}: unparsable label '{}'",
                    path.display(),
                    i + 1,
                    label
                ))
            })?;
            if label != 0.0 && label != 1.0 {
                return Err(SeqPairError::Dataset(format!(
                    "{}:{}: label must be 0 or 1, got {}",
                    path.display(),
                    i + 1,
                    label
                )));
            }
            samples.push(SamplePair {
                pi: pi.to_string(),
                m: m.to_string(),
                label,
            });
        }
    }

    if samples.is_empty() {
        return Err(SeqPairError::Dataset(format!(
            "no samples found under {}",
            dir.display()
        )));
    }

    // Sequence lengths are fixed by the dataset; enforce per-column consistency.
    let pi_len = samples[0].pi.len();
    let m_len = samples[0].m.len();
    for (idx, sample) in samples.iter().enumerate() {
        if sample.pi.len() != pi_len || sample.m.len() != m_len {
            return Err(SeqPairError::Dataset(format!(
                "sample {} has lengths ({}, {}), expected ({}, {})",
                idx,
                sample.pi.len(),
                sample.m.len(),
                pi_len,
                m_len
            )));
        }
    }

    info!(
        "Loaded {} samples from {} file(s) under {}",
        samples.len(),
        paths.len(),
        dir.display()
    );
    Ok(samples)
}

/// Split samples into train/validation/test partitions.
///
/// The shuffle is driven entirely by `seed`: the same seed and input always
/// yield identical partitions, which are pairwise disjoint and together cover
/// the input.
pub fn split(
    mut samples: Vec<SamplePair>,
    seed: u64,
    train_fraction: f64,
    validation_fraction: f64,
) -> DataSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    samples.shuffle(&mut rng);

    let n = samples.len();
    let n_train = (n as f64 * train_fraction).floor() as usize;
    let n_validation = (n as f64 * validation_fraction).floor() as usize;

    let test = samples.split_off((n_train + n_validation).min(n));
    let validation = samples.split_off(n_train.min(samples.len()));
    let train = samples;

    DataSplit {
        train,
        validation,
        test,
    }
}

/// A partition encoded into flat integer-label buffers, ready for tensor
/// construction.
#[derive(Debug, Clone)]
pub struct EncodedSet {
    pi: Vec<i64>,
    m: Vec<i64>,
    labels: Vec<f32>,
    pub pi_len: usize,
    pub m_len: usize,
}

impl EncodedSet {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[f32] {
        &self.labels
    }

    /// Tensors for the full partition: (pi, m, labels, integer labels).
    pub fn tensors<B: Backend>(
        &self,
        device: &B::Device,
    ) -> (
        Tensor<B, 2, Int>,
        Tensor<B, 2, Int>,
        Tensor<B, 1>,
        Tensor<B, 1, Int>,
    ) {
        let indices: Vec<usize> = (0..self.len()).collect();
        self.batch(&indices, device)
    }

    /// Tensors for a subset of rows, in the given order.
    pub fn batch<B: Backend>(
        &self,
        indices: &[usize],
        device: &B::Device,
    ) -> (
        Tensor<B, 2, Int>,
        Tensor<B, 2, Int>,
        Tensor<B, 1>,
        Tensor<B, 1, Int>,
    ) {
        let n = indices.len();
        let mut pi = Vec::with_capacity(n * self.pi_len);
        let mut m = Vec::with_capacity(n * self.m_len);
        let mut labels = Vec::with_capacity(n);
        for &idx in indices {
            pi.extend_from_slice(&self.pi[idx * self.pi_len..(idx + 1) * self.pi_len]);
            m.extend_from_slice(&self.m[idx * self.m_len..(idx + 1) * self.m_len]);
            labels.push(self.labels[idx]);
        }
        let label_ints: Vec<i64> = labels.iter().map(|&y| y as i64).collect();

        (
            Tensor::from_data(TensorData::new(pi, [n, self.pi_len]), device),
            Tensor::from_data(TensorData::new(m, [n, self.m_len]), device),
            Tensor::from_data(TensorData::new(labels, [n]), device),
            Tensor::from_data(TensorData::new(label_ints, [n]), device),
        )
    }
}

/// Encode a partition into integer-label form, labels cast to f32.
pub fn encode_set(samples: &[SamplePair]) -> Result<EncodedSet> {
    if samples.is_empty() {
        return Err(SeqPairError::Dataset("empty partition".to_string()));
    }

    let pi_len = samples[0].pi.len();
    let m_len = samples[0].m.len();
    let mut pi = Vec::with_capacity(samples.len() * pi_len);
    let mut m = Vec::with_capacity(samples.len() * m_len);
    let mut labels = Vec::with_capacity(samples.len());

    for sample in samples {
        pi.extend(seq_to_labels(&sample.pi)?.into_iter().map(i64::from));
        m.extend(seq_to_labels(&sample.m)?.into_iter().map(i64::from));
        labels.push(sample.label);
    }

    Ok(EncodedSet {
        pi,
        m,
        labels,
        pi_len,
        m_len,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn toy_samples(n: usize) -> Vec<SamplePair> {
        let bases = ['A', 'T', 'C', 'G'];
        (0..n)
            .map(|i| SamplePair {
                // Distinct pi per sample so reorderings are detectable.
                pi: (0..4).map(|k| bases[(i >> (2 * k)) & 3]).collect(),
                m: if i % 2 == 0 { "AATT" } else { "GGCC" }.to_string(),
                label: (i % 2) as f32,
            })
            .collect()
    }

    #[test]
    fn test_split_is_deterministic() {
        let a = split(toy_samples(50), 7, 0.8, 0.1);
        let b = split(toy_samples(50), 7, 0.8, 0.1);
        assert_eq!(a.train, b.train);
        assert_eq!(a.validation, b.validation);
        assert_eq!(a.test, b.test);

        let c = split(toy_samples(50), 8, 0.8, 0.1);
        assert_ne!(a.train, c.train);
    }

    #[test]
    fn test_split_partitions_cover_input() {
        let samples = toy_samples(100);
        let parts = split(samples.clone(), 0, 0.8, 0.1);
        assert_eq!(parts.train.len(), 80);
        assert_eq!(parts.validation.len(), 10);
        assert_eq!(parts.test.len(), 10);

        let mut recombined: Vec<SamplePair> = parts
            .train
            .into_iter()
            .chain(parts.validation)
            .chain(parts.test)
            .collect();
        assert_eq!(recombined.len(), samples.len());

        // Same multiset of samples, just reordered.
        let key = |s: &SamplePair| (s.pi.clone(), s.m.clone(), s.label as i64);
        let mut expected = samples;
        recombined.sort_by_key(key);
        expected.sort_by_key(key);
        assert_eq!(recombined, expected);
    }

    #[test]
    fn test_load_pairs_parses_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("pairs.tsv")).unwrap();
        writeln!(file, "# pi\tm\tlabel").unwrap();
        writeln!(file, "ATCG\tGGCC\t1").unwrap();
        writeln!(file, "GCTA\tAATT\t0").unwrap();
        drop(file);

        let samples = load_pairs(dir.path()).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].pi, "ATCG");
        assert_eq!(samples[0].label, 1.0);
    }

    #[test]
    fn test_load_pairs_rejects_bad_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("pairs.tsv")).unwrap();
        writeln!(file, "ATCG\tGGCC\t2").unwrap();
        drop(file);

        assert!(load_pairs(dir.path()).is_err());
    }

    #[test]
    fn test_load_pairs_rejects_ragged_lengths() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = File::create(dir.path().join("pairs.tsv")).unwrap();
        writeln!(file, "ATCG\tGGCC\t1").unwrap();
        writeln!(file, "AT\tGGCC\t0").unwrap();
        drop(file);

        assert!(load_pairs(dir.path()).is_err());
    }

    #[test]
    fn test_load_pairs_missing_dir_is_fatal() {
        assert!(load_pairs(Path::new("/nonexistent/seqpair-data")).is_err());
    }

    #[test]
    fn test_encode_set_shapes() {
        let set = encode_set(&toy_samples(6)).unwrap();
        assert_eq!(set.len(), 6);
        assert_eq!(set.pi_len, 4);
        assert_eq!(set.m_len, 4);
        assert_eq!(set.labels(), &[0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_encode_set_surfaces_unknown_symbol() {
        let mut samples = toy_samples(2);
        samples[1].m = "ANTT".to_string();
        assert!(encode_set(&samples).is_err());
    }
}
