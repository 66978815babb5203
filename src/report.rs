//! Results table output
//!
//! Renders the per-seed metric rows for the console and writes them as a
//! delimited file, one row per seed, columns taken from the first row's keys.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tabled::builder::Builder;
use tracing::info;

use crate::error::Result;
use crate::metrics::MetricsReport;

/// Output file path, e.g. `./outputs/transformer_30_times.csv`.
pub fn csv_path(output_dir: &Path, model_name: &str, seed_count: u64) -> PathBuf {
    output_dir.join(format!("{model_name}_{seed_count}_times.csv"))
}

/// Print the results table to stdout, one row per seed.
pub fn print_table(rows: &[MetricsReport]) {
    let Some(first) = rows.first() else {
        println!("(no results)");
        return;
    };

    let mut builder = Builder::default();
    let mut header = vec!["seed".to_string()];
    header.extend(first.keys().map(str::to_string));
    builder.push_record(header);

    for (seed, row) in rows.iter().enumerate() {
        let mut record = vec![seed.to_string()];
        record.extend(
            first
                .keys()
                .map(|key| row.get(key).map(|v| format!("{v:.4}")).unwrap_or_default()),
        );
        builder.push_record(record);
    }

    println!("{}", builder.build());
}

/// Write the results as CSV.
pub fn write_csv(path: &Path, rows: &[MetricsReport]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;

    let Some(first) = rows.first() else {
        return Ok(());
    };
    let header: Vec<&str> = first.keys().collect();
    writeln!(file, "{}", header.join(","))?;

    for row in rows {
        let record: Vec<String> = header
            .iter()
            .map(|key| row.get(key).map(|v| format!("{v:.6}")).unwrap_or_default())
            .collect();
        writeln!(file, "{}", record.join(","))?;
    }

    info!("Wrote results table to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_row(acc: f64) -> MetricsReport {
        let mut row = MetricsReport::new();
        row.insert("va_acc".to_string(), acc);
        row.insert("te_acc".to_string(), acc - 0.1);
        row
    }

    #[test]
    fn test_csv_path_matches_original_naming() {
        let path = csv_path(Path::new("./outputs"), "transformer", 30);
        assert_eq!(path, PathBuf::from("./outputs/transformer_30_times.csv"));
    }

    #[test]
    fn test_write_csv_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/report.csv");
        write_csv(&path, &[toy_row(0.9), toy_row(0.8)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "va_acc,te_acc");
        assert_eq!(lines[1], "0.900000,0.800000");
    }

    #[test]
    fn test_write_csv_empty_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_csv(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
