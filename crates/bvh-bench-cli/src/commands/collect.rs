use anyhow::{Context, Result};
use bvh_bench::reporting::{collect_archive, write_timeseries};
use bvh_bench::SweepConfig;
use std::path::{Path, PathBuf};

/// Rebuild the time series from `statistics/` and return where it was written
/// together with the number of rows.
///
/// An empty `models` selects every archived model.
pub fn handle_collect(
    config: &SweepConfig,
    models: &[String],
    output: &Path,
) -> Result<(PathBuf, usize)> {
    let statistics_root = config.statistics_root();
    let records = collect_archive(&statistics_root, models, &config.totaltime_filename)
        .with_context(|| format!("Failed to read archive at {}", statistics_root.display()))?;

    let output = config.base_dir.join(output);
    write_timeseries(&records, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok((output, records.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_writes_under_base_dir() {
        let dir = TempDir::new().unwrap();
        for (model, run, total) in [("Cow", "001", "t,150\n"), ("Cow", "002", "t,151\n")] {
            let run_dir = dir.path().join("statistics").join(model).join(run);
            fs::create_dir_all(&run_dir).unwrap();
            fs::write(run_dir.join("totaltime.csv"), total).unwrap();
        }
        let config = SweepConfig {
            base_dir: dir.path().to_path_buf(),
            ..SweepConfig::default()
        };

        let (path, rows) = handle_collect(&config, &[], Path::new("timeseries.csv")).unwrap();

        assert_eq!(path, dir.path().join("timeseries.csv"));
        assert_eq!(rows, 2);
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "Index,Model,Construction Time(us)\n1,Cow,150\n2,Cow,151\n"
        );
    }

    #[test]
    fn test_collect_without_archive_fails() {
        let dir = TempDir::new().unwrap();
        let config = SweepConfig {
            base_dir: dir.path().to_path_buf(),
            ..SweepConfig::default()
        };
        assert!(handle_collect(&config, &[], Path::new("timeseries.csv")).is_err());
    }
}
