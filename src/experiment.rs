//! Experiment orchestration
//!
//! One full run: load and split the dataset, encode it, fit a model (or load
//! an existing checkpoint), evaluate on the validation and test partitions,
//! and return the renamed, merged metrics. The batch driver repeats this
//! across seeds and writes the results table. Runs are independent, but a
//! failing seed aborts the whole batch: there is no per-iteration isolation
//! and no partial-results recovery.

use burn::module::AutodiffModule;
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use tracing::info;

use crate::config::ExperimentConfig;
use crate::dataset::{self, EncodedSet};
use crate::error::{Result, SeqPairError};
use crate::metrics::{rename_metric, MetricSet, MetricsReport};
use crate::model::{self, PairClassifier};
use crate::report;
use crate::training::{Checkpointer, Trainer};

/// Evaluate a model against one partition with the full metric set.
pub fn evaluate<B: Backend>(
    model: &PairClassifier<B>,
    set: &EncodedSet,
    device: &B::Device,
) -> Result<Vec<(String, f64)>> {
    let (pi, m, _, _) = set.tensors::<B>(device);
    let probs = model
        .predict(pi, m)
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| SeqPairError::Numeric(format!("{e:?}")))?;
    Ok(MetricSet::evaluate(set.labels(), &probs))
}

/// Run one full experiment and return the merged `va_*`/`te_*` metrics.
///
/// With `save` set, an existing checkpoint named `<model_name>_seed_<seed>`
/// is loaded instead of retraining, and a freshly fitted model is persisted
/// under that name. With `save` unset no checkpoint file is read or written.
pub fn train_and_eval<B: AutodiffBackend>(
    cfg: &ExperimentConfig,
    model_name: &str,
    seed: u64,
    save: bool,
) -> Result<MetricsReport> {
    let device = B::Device::default();
    let run_name = format!("{model_name}_seed_{seed}");

    let samples = dataset::load_pairs(&cfg.data_dir)?;
    let parts = dataset::split(
        samples,
        seed,
        cfg.split.train_fraction,
        cfg.split.validation_fraction,
    );
    let train = dataset::encode_set(&parts.train)?;
    let validation = dataset::encode_set(&parts.validation)?;
    let test = dataset::encode_set(&parts.test)?;

    let model: PairClassifier<B> = if save {
        let checkpointer = Checkpointer::new(&cfg.model_dir)?;
        if checkpointer.exists(&run_name) {
            info!("load model: `{run_name}` ...");
            checkpointer.load::<B>(&run_name, &device)?
        } else {
            let fresh = model::build::<B>(&cfg.model, train.pi_len, train.m_len, &device);
            let (fitted, _) =
                Trainer::new(cfg.training.clone()).fit(fresh, &train, &validation, seed, &device)?;
            checkpointer.save(&fitted, &run_name, &cfg.model, train.pi_len, train.m_len)?;
            fitted
        }
    } else {
        let fresh = model::build::<B>(&cfg.model, train.pi_len, train.m_len, &device);
        let (fitted, _) =
            Trainer::new(cfg.training.clone()).fit(fresh, &train, &validation, seed, &device)?;
        fitted
    };

    let eval_model = model.valid();
    let va = evaluate(&eval_model, &validation, &device)?;
    let te = evaluate(&eval_model, &test, &device)?;

    // Keys become `<split>_<portion before first underscore>`; the merge lets
    // test values win on collision, though in practice prefixes differ.
    let mut merged = MetricsReport::new();
    for (key, value) in va {
        merged.insert(rename_metric("va", &key), value);
    }
    for (key, value) in te {
        merged.insert(rename_metric("te", &key), value);
    }
    Ok(merged)
}

/// Run `train_and_eval` across seeds `0..cfg.seed_count`, print the results
/// table, and write it as CSV.
pub fn run_batch<B: AutodiffBackend>(
    cfg: &ExperimentConfig,
    model_name: &str,
    save: bool,
) -> Result<Vec<MetricsReport>> {
    let mut results = Vec::with_capacity(cfg.seed_count as usize);
    for seed in 0..cfg.seed_count {
        info!(
            "Running `{model_name}` seed {} ({}/{})",
            seed,
            seed + 1,
            cfg.seed_count
        );
        results.push(train_and_eval::<B>(cfg, model_name, seed, save)?);
    }

    report::print_table(&results);
    let path = report::csv_path(&cfg.output_dir, model_name, cfg.seed_count);
    report::write_csv(&path, &results)?;
    Ok(results)
}
