//! Sequence encoding
//!
//! Maps DNA sequences over {A, T, C, G} to the integer-label and one-hot
//! representations the models consume. An unmapped character is a fatal input
//! error, never silently defaulted.

use crate::error::{Result, SeqPairError};

/// One-hot rows in base order A, T, C, G.
const ONE_HOT: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

const BASES: [char; 4] = ['A', 'T', 'C', 'G'];

fn base_index(symbol: char, position: usize) -> Result<usize> {
    match symbol {
        'A' => Ok(0),
        'T' => Ok(1),
        'C' => Ok(2),
        'G' => Ok(3),
        _ => Err(SeqPairError::UnknownSymbol { symbol, position }),
    }
}

/// Encode a sequence as integer labels: A→0, T→1, C→2, G→3.
pub fn seq_to_labels(seq: &str) -> Result<Vec<u8>> {
    seq.chars()
        .enumerate()
        .map(|(i, c)| base_index(c, i).map(|idx| idx as u8))
        .collect()
}

/// Encode a sequence as one-hot rows: A→(1,0,0,0), T→(0,1,0,0), C→(0,0,1,0),
/// G→(0,0,0,1).
pub fn seq_to_one_hot(seq: &str) -> Result<Vec<[f32; 4]>> {
    seq.chars()
        .enumerate()
        .map(|(i, c)| base_index(c, i).map(|idx| ONE_HOT[idx]))
        .collect()
}

/// Decode one-hot rows back to a sequence.
///
/// Rows must match the canonical unit vectors exactly; anything else (a
/// near-one float, an all-zero row) is rejected rather than snapped to the
/// nearest base.
pub fn one_hot_to_seq(rows: &[[f32; 4]]) -> Result<String> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| {
            ONE_HOT
                .iter()
                .position(|candidate| candidate == row)
                .map(|idx| BASES[idx])
                .ok_or_else(|| {
                    SeqPairError::Dataset(format!("unrecognized one-hot row {row:?} at position {i}"))
                })
        })
        .collect()
}
