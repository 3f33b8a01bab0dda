use crate::errors::util::archive_error;
use crate::errors::{BenchError, BenchResult};
use std::fs::{self, File, FileTimes};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The two artifacts a benchmark invocation leaves behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFiles {
    pub oncetime: PathBuf,
    pub totaltime: PathBuf,
}

impl ResultFiles {
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [self.oncetime.as_path(), self.totaltime.as_path()].into_iter()
    }
}

/// Copies each run's result files into `<root>/<model>/<index:03>`.
pub struct ArchiveWriter {
    root: PathBuf,
}

impl ArchiveWriter {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        ArchiveWriter { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn model_dir(&self, model: &str) -> PathBuf {
        self.root.join(model)
    }

    pub fn run_dir(&self, model: &str, index: usize) -> PathBuf {
        self.model_dir(model).join(format!("{:03}", index))
    }

    /// Archive both result files for one run and return the run directory.
    ///
    /// Calling this again for the same run overwrites the copies with the
    /// current sources. Both files are attempted even if the first fails; the
    /// first failure is returned.
    pub fn archive(
        &self,
        model: &str,
        index: usize,
        sources: &ResultFiles,
    ) -> BenchResult<PathBuf> {
        let target_dir = self.run_dir(model, index);
        fs::create_dir_all(&target_dir).map_err(archive_error(&target_dir))?;

        let mut first_error: Option<BenchError> = None;
        for source in sources.iter() {
            if let Err(e) = copy_into(source, &target_dir) {
                debug!(source = %source.display(), error = %e, "archive copy failed");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(target_dir),
        }
    }

    /// Copy a single file (e.g. a finished model summary) into the model directory.
    pub fn archive_model_file(&self, model: &str, source: &Path) -> BenchResult<PathBuf> {
        let target_dir = self.model_dir(model);
        fs::create_dir_all(&target_dir).map_err(archive_error(&target_dir))?;
        copy_into(source, &target_dir)
    }
}

fn copy_into(source: &Path, target_dir: &Path) -> BenchResult<PathBuf> {
    let file_name = source.file_name().ok_or_else(|| BenchError::ArchiveError {
        path: source.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "source has no file name"),
    })?;
    let target = target_dir.join(file_name);
    copy_preserving_metadata(source, &target).map_err(archive_error(source))?;
    Ok(target)
}

/// `fs::copy` carries permissions; timestamps are applied afterwards on a
/// best-effort basis. The copy is reopened read-only first, so a copy of a
/// read-only source still gets its times where the platform allows it.
fn copy_preserving_metadata(source: &Path, target: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    if !metadata.is_file() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "source is not a regular file",
        ));
    }
    fs::copy(source, target)?;

    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Err(e) = File::open(target)
        .and_then(|file| file.set_times(times))
        .or_else(|_| {
            File::options()
                .write(true)
                .open(target)
                .and_then(|file| file.set_times(times))
        })
    {
        debug!(target = %target.display(), error = %e, "could not copy timestamps");
    }
    Ok(())
}
