use crate::errors::{BenchError, BenchResult};
use crate::reporting::types::SummaryRecord;
use crate::runners::result_extractor::extract_last_value;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Rebuild a time series from the per-run archive.
///
/// Walks `<statistics_root>/<model>/<index>/<totaltime_filename>` for the
/// given models (every model directory, sorted, when `models` is empty) and
/// returns one record per archived run that still yields a timing value.
/// Directories whose name is not a run index are ignored.
pub fn collect_archive(
    statistics_root: &Path,
    models: &[String],
    totaltime_filename: &str,
) -> BenchResult<Vec<SummaryRecord>> {
    if !statistics_root.is_dir() {
        return Err(BenchError::FileNotFound(statistics_root.to_path_buf()));
    }

    let models = if models.is_empty() {
        list_model_dirs(statistics_root)?
    } else {
        models.to_vec()
    };

    let mut records = Vec::new();
    for model in models {
        let model_dir = statistics_root.join(&model);
        if !model_dir.is_dir() {
            warn!(model = %model, "no archived runs for model");
            continue;
        }
        for (index, run_dir) in list_run_dirs(&model_dir)? {
            let totaltime = run_dir.join(totaltime_filename);
            match extract_last_value(&totaltime) {
                Some(value) => records.push(SummaryRecord::new(index, &model, &value)),
                None => warn!(
                    model = %model,
                    index,
                    path = %totaltime.display(),
                    "archived run has no valid time value"
                ),
            }
        }
    }
    Ok(records)
}

/// Write records with the summary header to `path`.
pub fn write_timeseries(records: &[SummaryRecord], path: &Path) -> BenchResult<()> {
    let mut writer = Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(crate::reporting::SUMMARY_HEADER)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = records.len(), "wrote time series");
    Ok(())
}

fn list_model_dirs(statistics_root: &Path) -> BenchResult<Vec<String>> {
    let mut models: Vec<String> = fs::read_dir(statistics_root)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if path.is_dir() {
                Some(path.file_name()?.to_string_lossy().to_string())
            } else {
                None
            }
        })
        .collect();
    models.sort();
    Ok(models)
}

fn list_run_dirs(model_dir: &Path) -> BenchResult<Vec<(usize, PathBuf)>> {
    let mut runs: Vec<(usize, PathBuf)> = fs::read_dir(model_dir)?
        .filter_map(|entry| {
            let path = entry.ok()?.path();
            if !path.is_dir() {
                return None;
            }
            let name = path.file_name()?.to_str()?;
            if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let index = name.parse().ok()?;
            Some((index, path))
        })
        .collect();
    runs.sort_by_key(|(index, _)| *index);
    Ok(runs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::summary_appender::read_summary;
    use tempfile::TempDir;

    fn archive_run(root: &Path, model: &str, run: &str, totaltime: &str) {
        let dir = root.join(model).join(run);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("totaltime.csv"), totaltime).unwrap();
    }

    #[test]
    fn test_collect_orders_by_model_then_index() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("statistics");
        archive_run(&root, "Dragon", "002", "t,920\n");
        archive_run(&root, "Dragon", "010", "t,915\n");
        archive_run(&root, "Dragon", "001", "t,930\n");
        archive_run(&root, "Cow", "001", "t,150\n");
        archive_run(&root, "Cow", "002", "");
        fs::create_dir_all(root.join("Cow").join("notes")).unwrap();
        fs::write(root.join("Cow").join("runtime.csv"), "ignored").unwrap();

        let records = collect_archive(&root, &[], "totaltime.csv").unwrap();

        assert_eq!(
            records,
            vec![
                SummaryRecord::new(1, "Cow", "150"),
                SummaryRecord::new(1, "Dragon", "930"),
                SummaryRecord::new(2, "Dragon", "920"),
                SummaryRecord::new(10, "Dragon", "915"),
            ]
        );
    }

    #[test]
    fn test_collect_respects_model_selection() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("statistics");
        archive_run(&root, "Cow", "001", "t,150\n");
        archive_run(&root, "Face", "001", "t,40\n");

        let models = vec!["Face".to_string(), "Car".to_string(), "Cow".to_string()];
        let records = collect_archive(&root, &models, "totaltime.csv").unwrap();

        assert_eq!(
            records,
            vec![
                SummaryRecord::new(1, "Face", "40"),
                SummaryRecord::new(1, "Cow", "150"),
            ]
        );
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = collect_archive(&dir.path().join("statistics"), &[], "totaltime.csv");
        assert!(matches!(err, Err(BenchError::FileNotFound(_))));
    }

    #[test]
    fn test_write_timeseries() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timeseries.csv");
        let records = vec![
            SummaryRecord::new(1, "Cow", "150"),
            SummaryRecord::new(2, "Cow", "151"),
        ];
        write_timeseries(&records, &path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Index,Model,Construction Time(us)\n1,Cow,150\n2,Cow,151\n"
        );
        assert_eq!(read_summary(&path).unwrap(), records);
    }

    #[test]
    fn test_write_empty_timeseries_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timeseries.csv");
        write_timeseries(&[], &path).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Index,Model,Construction Time(us)\n"
        );
        assert!(read_summary(&path).unwrap().is_empty());
    }
}
