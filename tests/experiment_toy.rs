//! End-to-end experiment runs against a small synthetic dataset.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use seqpair::{
    run_batch, train_and_eval, DefaultAutodiffBackend, ExperimentConfig, ModelSettings,
    TrainingConfig,
};

/// Write a balanced 100-sample paired-sequence dataset.
fn write_toy_dataset(dir: &Path) {
    let mut file = File::create(dir.join("pairs.tsv")).unwrap();
    writeln!(file, "# pi\tm\tlabel").unwrap();
    for i in 0..100 {
        let (pi, m, label) = if i % 2 == 0 {
            ("GGGGATCG", if i % 4 == 0 { "CCCCTAGC" } else { "CCCCTTGC" }, 1)
        } else {
            ("AAAAATCG", if i % 4 == 1 { "TTTTTAGC" } else { "TTTTTTGC" }, 0)
        };
        writeln!(file, "{pi}\t{m}\t{label}").unwrap();
    }
}

fn toy_config(root: &Path) -> ExperimentConfig {
    ExperimentConfig {
        data_dir: root.join("data"),
        model_dir: root.join("models"),
        output_dir: root.join("outputs"),
        seed_count: 2,
        training: TrainingConfig {
            batch_size: 32,
            max_epochs: 2,
            patience: 5,
            base_lr: 1e-3,
        },
        model: ModelSettings {
            d_model: 8,
            n_heads: 2,
            ff_dim: 8,
            hidden_dim: 8,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn expected_keys() -> Vec<String> {
    let names = [
        "loss",
        "acc",
        "precision",
        "recall",
        "specificity",
        "f1",
        "auc",
        "mcc",
    ];
    let mut keys: Vec<String> = names.iter().map(|n| format!("va_{n}")).collect();
    keys.extend(names.iter().map(|n| format!("te_{n}")));
    keys
}

#[test]
fn train_and_eval_returns_full_metric_set() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("data")).unwrap();
    write_toy_dataset(&root.path().join("data"));
    let cfg = toy_config(root.path());

    let report = train_and_eval::<DefaultAutodiffBackend>(&cfg, "toy_transformer", 0, false)
        .unwrap();

    let keys: Vec<&str> = report.keys().collect();
    assert_eq!(keys, expected_keys());

    for (key, value) in report.iter() {
        assert!(value.is_finite(), "{key} is not finite");
        if key.ends_with("_loss") {
            assert!(value >= 0.0, "{key} = {value}");
        } else if key.ends_with("_mcc") {
            assert!((-1.0..=1.0).contains(&value), "{key} = {value}");
        } else {
            assert!((0.0..=1.0).contains(&value), "{key} = {value}");
        }
    }
}

#[test]
fn save_false_never_touches_checkpoints() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("data")).unwrap();
    write_toy_dataset(&root.path().join("data"));
    let cfg = toy_config(root.path());

    train_and_eval::<DefaultAutodiffBackend>(&cfg, "toy_transformer", 1, false).unwrap();

    // Not even the checkpoint directory is created.
    assert!(!cfg.model_dir.exists());
}

#[test]
fn save_true_reuses_existing_checkpoint() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("data")).unwrap();
    write_toy_dataset(&root.path().join("data"));
    let cfg = toy_config(root.path());

    let first =
        train_and_eval::<DefaultAutodiffBackend>(&cfg, "toy_transformer", 0, true).unwrap();

    let weights = cfg.model_dir.join("toy_transformer_seed_0.mpk");
    let sidecar = cfg.model_dir.join("toy_transformer_seed_0.json");
    assert!(weights.exists());
    assert!(sidecar.exists());
    let saved_at = weights.metadata().unwrap().modified().unwrap();

    std::thread::sleep(Duration::from_millis(20));
    let second =
        train_and_eval::<DefaultAutodiffBackend>(&cfg, "toy_transformer", 0, true).unwrap();

    // The checkpoint was loaded, not rewritten by a retrain.
    assert_eq!(weights.metadata().unwrap().modified().unwrap(), saved_at);

    // Same weights, same deterministic split: identical evaluation.
    for (key, value) in first.iter() {
        assert_eq!(second.get(key), Some(value), "{key} changed across reload");
    }
}

#[test]
fn run_batch_writes_one_row_per_seed() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(root.path().join("data")).unwrap();
    write_toy_dataset(&root.path().join("data"));
    let mut cfg = toy_config(root.path());
    cfg.training.max_epochs = 1;

    let results = run_batch::<DefaultAutodiffBackend>(&cfg, "toy_transformer", false).unwrap();
    assert_eq!(results.len(), 2);

    let csv = cfg.output_dir.join("toy_transformer_2_times.csv");
    let content = std::fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], expected_keys().join(","));
}
