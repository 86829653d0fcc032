//! Export derived series to CSV or JSON.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::domain::{MONTH_LABELS, RateSeries};
use crate::error::AppError;

/// Write one row per month: `kind,year,month,label,value` (empty value when absent).
pub fn write_series_csv(path: &Path, series: &RateSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    let mut file = BufWriter::new(file);

    writeln!(file, "kind,year,month,label,value")
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for bucket in &series.buckets {
        for (i, v) in bucket.values.iter().enumerate() {
            writeln!(
                file,
                "{},{},{},{},{}",
                series.kind.id(),
                bucket.year,
                i + 1,
                MONTH_LABELS[i],
                v.map(|v| format!("{v:.4}")).unwrap_or_default(),
            )
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
        }
    }

    file.flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the full series (label, source, year buckets) as pretty JSON.
pub fn write_series_json(path: &Path, series: &RateSeries) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, series)
        .map_err(|e| AppError::new(2, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DataSource, SeriesKind, YearBucket};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("ecb-lens-{}-{name}", std::process::id()))
    }

    fn series() -> RateSeries {
        let mut bucket = YearBucket::empty(2025);
        bucket.values[0] = Some(2.75);
        bucket.values[1] = Some(-0.5);
        RateSeries {
            kind: SeriesKind::DepositFacility,
            label: SeriesKind::DepositFacility.label().to_string(),
            buckets: vec![bucket],
            source: DataSource::Static,
        }
    }

    #[test]
    fn csv_has_one_row_per_month() {
        let path = temp_path("series.csv");
        write_series_csv(&path, &series()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "kind,year,month,label,value");
        assert_eq!(lines[1], "deposit,2025,1,Jan,2.7500");
        assert_eq!(lines[2], "deposit,2025,2,Feb,-0.5000");
        assert_eq!(lines[12], "deposit,2025,12,Dec,");
    }

    #[test]
    fn json_export_deserializes_identically() {
        let path = temp_path("series.json");
        let written = series();
        write_series_json(&path, &written).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded: RateSeries = serde_json::from_str(&text).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded, written);
        assert!(text.contains("\"kind\": \"deposit\""));
        assert!(text.contains("\"source\": \"static\""));
    }

    #[test]
    fn unwritable_path_is_a_usage_error() {
        let err = write_series_csv(Path::new("/nonexistent-dir/x/y.csv"), &series()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
