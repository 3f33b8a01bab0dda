use crate::errors::util::{ensure_file_exists, summary_error};
use crate::errors::BenchResult;
use crate::reporting::types::SummaryRecord;
use csv::WriterBuilder;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

pub const SUMMARY_HEADER: [&str; 3] = ["Index", "Model", "Construction Time(us)"];

/// Owns the runtime summary file for the sweep.
pub struct SummaryAppender {
    path: PathBuf,
}

impl SummaryAppender {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the summary and write the header for a fresh model sweep.
    pub fn start_model_summary(&self, model: &str) -> BenchResult<ModelSummary> {
        let file = File::create(&self.path).map_err(summary_error(&self.path))?;
        write_and_sync(&file, &self.path, |writer| writer.write_record(SUMMARY_HEADER))?;
        Ok(ModelSummary {
            path: self.path.clone(),
            model: model.to_string(),
            rows: 0,
        })
    }
}

/// Handle for one model's section of the summary.
#[derive(Debug)]
pub struct ModelSummary {
    path: PathBuf,
    model: String,
    rows: usize,
}

impl ModelSummary {
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Append one row and sync it to disk before returning.
    ///
    /// The file is reopened for every row so nothing stays buffered between calls.
    pub fn append_row(&mut self, index: usize, model: &str, value: &str) -> BenchResult<()> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(summary_error(&self.path))?;
        let record = SummaryRecord::new(index, model, value);
        write_and_sync(&file, &self.path, |writer| writer.serialize(&record))?;
        self.rows += 1;
        Ok(())
    }
}

fn write_and_sync<F>(file: &File, path: &Path, write: F) -> BenchResult<()>
where
    F: FnOnce(&mut csv::Writer<&File>) -> csv::Result<()>,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
    write(&mut writer)?;
    writer.flush().map_err(summary_error(path))?;
    drop(writer);
    file.sync_data().map_err(summary_error(path))
}

/// Read a summary or time-series file back into records.
pub fn read_summary(path: &Path) -> BenchResult<Vec<SummaryRecord>> {
    ensure_file_exists(path)?;
    let mut reader = csv::Reader::from_path(path)?;
    let records = reader
        .deserialize()
        .collect::<Result<Vec<SummaryRecord>, csv::Error>>()?;
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BenchError;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_header_then_rows() {
        let dir = TempDir::new().unwrap();
        let appender = SummaryAppender::new(dir.path().join("runtime.csv"));

        let mut summary = appender.start_model_summary("Cow").unwrap();
        summary.append_row(1, "Cow", "150").unwrap();
        summary.append_row(3, "Cow", "162").unwrap();

        assert_eq!(summary.rows(), 2);
        assert_eq!(summary.model(), "Cow");
        assert_eq!(
            fs::read_to_string(appender.path()).unwrap(),
            "Index,Model,Construction Time(us)\n1,Cow,150\n3,Cow,162\n"
        );
    }

    #[test]
    fn test_restart_truncates_previous_model() {
        let dir = TempDir::new().unwrap();
        let appender = SummaryAppender::new(dir.path().join("runtime.csv"));

        let mut cow = appender.start_model_summary("Cow").unwrap();
        cow.append_row(1, "Cow", "150").unwrap();
        let mut dragon = appender.start_model_summary("Dragon").unwrap();
        dragon.append_row(1, "Dragon", "900").unwrap();

        let rows = read_summary(appender.path()).unwrap();
        assert_eq!(rows, vec![SummaryRecord::new(1, "Dragon", "900")]);
        let contents = fs::read_to_string(appender.path()).unwrap();
        assert_eq!(contents.matches("Index,Model").count(), 1);
    }

    #[test]
    fn test_values_with_delimiters_are_quoted() {
        let dir = TempDir::new().unwrap();
        let appender = SummaryAppender::new(dir.path().join("runtime.csv"));
        let mut summary = appender.start_model_summary("Car").unwrap();
        summary.append_row(2, "Car", "1,5").unwrap();

        let rows = read_summary(appender.path()).unwrap();
        assert_eq!(rows, vec![SummaryRecord::new(2, "Car", "1,5")]);
    }

    #[test]
    fn test_append_after_removal_fails() {
        let dir = TempDir::new().unwrap();
        let appender = SummaryAppender::new(dir.path().join("runtime.csv"));
        let mut summary = appender.start_model_summary("Face").unwrap();
        fs::remove_file(appender.path()).unwrap();

        let err = summary.append_row(1, "Face", "10").unwrap_err();
        assert!(matches!(err, BenchError::SummaryError { .. }));
        assert_eq!(summary.rows(), 0);
    }

    #[test]
    fn test_unwritable_location_fails_to_start() {
        let dir = TempDir::new().unwrap();
        let appender = SummaryAppender::new(dir.path().join("missing").join("runtime.csv"));
        assert!(appender.start_model_summary("Cow").is_err());
    }
}
