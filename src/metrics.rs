//! Evaluation metrics
//!
//! Stateless pure functions over (true labels, predicted probabilities).
//! Every value is recomputed from the passed-in slices, so there is no shared
//! metric state to leak between runs. Classification metrics threshold at 0.5;
//! degenerate denominators yield 0.0 rather than NaN.

/// Metric names in report order, matching the original metric set.
pub const METRIC_NAMES: [&str; 7] = [
    "acc",
    "precision",
    "recall",
    "specificity",
    "f1",
    "auc",
    "mcc",
];

const THRESHOLD: f32 = 0.5;
const EPS: f64 = 1e-7;

/// Confusion-matrix cells (tp, fp, tn, fn) at the 0.5 threshold.
fn confusion(y_true: &[f32], y_prob: &[f32]) -> (f64, f64, f64, f64) {
    let mut tp = 0.0;
    let mut fp = 0.0;
    let mut tn = 0.0;
    let mut fr = 0.0;
    for (&truth, &prob) in y_true.iter().zip(y_prob) {
        let predicted = prob >= THRESHOLD;
        let actual = truth >= THRESHOLD;
        match (actual, predicted) {
            (true, true) => tp += 1.0,
            (false, true) => fp += 1.0,
            (false, false) => tn += 1.0,
            (true, false) => fr += 1.0,
        }
    }
    (tp, fp, tn, fr)
}

pub fn accuracy(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let (tp, fp, tn, fr) = confusion(y_true, y_prob);
    let total = tp + fp + tn + fr;
    if total > 0.0 {
        (tp + tn) / total
    } else {
        0.0
    }
}

pub fn precision(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let (tp, fp, _, _) = confusion(y_true, y_prob);
    if tp + fp > 0.0 {
        tp / (tp + fp)
    } else {
        0.0
    }
}

pub fn recall(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let (tp, _, _, fr) = confusion(y_true, y_prob);
    if tp + fr > 0.0 {
        tp / (tp + fr)
    } else {
        0.0
    }
}

pub fn specificity(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let (_, fp, tn, _) = confusion(y_true, y_prob);
    if tn + fp > 0.0 {
        tn / (tn + fp)
    } else {
        0.0
    }
}

pub fn f1(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let p = precision(y_true, y_prob);
    let r = recall(y_true, y_prob);
    if p + r > 0.0 {
        2.0 * p * r / (p + r)
    } else {
        0.0
    }
}

/// Matthews correlation coefficient, in [-1, 1].
pub fn mcc(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let (tp, fp, tn, fr) = confusion(y_true, y_prob);
    let denom = ((tp + fp) * (tp + fr) * (tn + fp) * (tn + fr)).sqrt();
    if denom > 0.0 {
        (tp * tn - fp * fr) / denom
    } else {
        0.0
    }
}

/// Area under the ROC curve via the rank-sum (Mann-Whitney) estimate, with
/// average ranks for tied probabilities.
pub fn auc(y_true: &[f32], y_prob: &[f32]) -> f64 {
    let n = y_true.len();
    let positives = y_true.iter().filter(|&&y| y >= THRESHOLD).count();
    let negatives = n - positives;
    if positives == 0 || negatives == 0 {
        return 0.0;
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        y_prob[a]
            .partial_cmp(&y_prob[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Sum of positive-class ranks, averaging ranks within tie groups.
    let mut rank_sum = 0.0f64;
    let mut i = 0;
    while i < n {
        let mut j = i;
        while j + 1 < n && y_prob[order[j + 1]] == y_prob[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            if y_true[idx] >= THRESHOLD {
                rank_sum += avg_rank;
            }
        }
        i = j + 1;
    }

    let p = positives as f64;
    let q = negatives as f64;
    (rank_sum - p * (p + 1.0) / 2.0) / (p * q)
}

/// Binary cross-entropy of probabilities against {0, 1} labels, clamped away
/// from log(0).
pub fn log_loss(y_true: &[f32], y_prob: &[f32]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let sum: f64 = y_true
        .iter()
        .zip(y_prob)
        .map(|(&y, &p)| {
            let p = (p as f64).clamp(EPS, 1.0 - EPS);
            let y = y as f64;
            -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
        })
        .sum();
    sum / y_true.len() as f64
}

/// The full metric set, evaluated identically for training monitoring and
/// final evaluation.
pub struct MetricSet;

impl MetricSet {
    /// Evaluate loss plus every metric, in a fixed order.
    pub fn evaluate(y_true: &[f32], y_prob: &[f32]) -> Vec<(String, f64)> {
        let mut out = Vec::with_capacity(METRIC_NAMES.len() + 1);
        out.push(("loss".to_string(), log_loss(y_true, y_prob)));
        for name in METRIC_NAMES {
            let value = match name {
                "acc" => accuracy(y_true, y_prob),
                "precision" => precision(y_true, y_prob),
                "recall" => recall(y_true, y_prob),
                "specificity" => specificity(y_true, y_prob),
                "f1" => f1(y_true, y_prob),
                "auc" => auc(y_true, y_prob),
                "mcc" => mcc(y_true, y_prob),
                _ => unreachable!(),
            };
            out.push((name.to_string(), value));
        }
        out
    }
}

/// One row of the results table: an insertion-ordered metric-name→value map.
///
/// Insertion order is preserved so CSV columns come out `va_*` then `te_*`;
/// inserting an existing key replaces its value (test wins on collision).
#[derive(Debug, Clone, Default)]
pub struct MetricsReport {
    values: Vec<(String, f64)>,
}

impl MetricsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, value: f64) {
        if let Some(entry) = self.values.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.values.push((key, value));
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Map a raw metric key to its reported form: the portion before the first
/// underscore, prefixed with the partition tag (`va_` or `te_`).
pub fn rename_metric(prefix: &str, raw: &str) -> String {
    let stem = raw.split('_').next().unwrap_or(raw);
    format!("{prefix}_{stem}")
}
