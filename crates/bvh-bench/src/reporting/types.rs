use crate::bench_config::SweepConfig;
use crate::errors::BenchResult;
use crate::runners::invoker::InvocationOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// One row of a runtime summary or time-series report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "Index")]
    pub index: usize,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Construction Time(us)")]
    pub value: String,
}

impl SummaryRecord {
    pub fn new(index: usize, model: &str, value: &str) -> Self {
        Self {
            index,
            model: model.to_string(),
            value: value.to_string(),
        }
    }
}

/// Something that went wrong during a single run. None of these stop the sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunFault {
    Invocation { outcome: InvocationOutcome },
    Archive { path: PathBuf, error: String },
    ExtractionNotFound { path: PathBuf },
    Summary { error: String },
}

impl fmt::Display for RunFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunFault::Invocation { outcome } => write!(f, "benchmark {}", outcome),
            RunFault::Archive { path, error } => {
                write!(f, "archiving {} failed: {}", path.display(), error)
            }
            RunFault::ExtractionNotFound { path } => {
                write!(f, "no valid time value in {}", path.display())
            }
            RunFault::Summary { error } => write!(f, "summary row not written: {}", error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    pub model: String,
    pub index: usize,
    pub value: Option<String>,
    pub archive_dir: Option<PathBuf>,
    pub faults: Vec<RunFault>,
    pub elapsed_ms: u64,
}

impl RunRecord {
    pub fn new(model: &str, index: usize) -> Self {
        Self {
            model: model.to_string(),
            index,
            value: None,
            archive_dir: None,
            faults: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn add_fault(&mut self, fault: RunFault) {
        self.faults.push(fault);
    }

    pub fn succeeded(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Per-model tally used for the closing summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelTally {
    pub model: String,
    pub succeeded: usize,
    pub failed: usize,
}

/// Everything that happened during one sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub runs_per_model: usize,
    pub models: Vec<String>,
    pub runs: Vec<RunRecord>,
}

impl SweepReport {
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            runs_per_model: config.runs,
            models: config.models.clone(),
            runs: Vec::new(),
        }
    }

    pub fn add_run(&mut self, run: RunRecord) {
        self.runs.push(run);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn failed_runs(&self) -> impl Iterator<Item = &RunRecord> {
        self.runs.iter().filter(|run| !run.succeeded())
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_runs().next().is_none()
    }

    pub fn runs_for<'a>(&'a self, model: &'a str) -> impl Iterator<Item = &'a RunRecord> + 'a {
        self.runs.iter().filter(move |run| run.model == model)
    }

    pub fn tallies(&self) -> Vec<ModelTally> {
        self.models
            .iter()
            .map(|model| {
                let total = self.runs_for(model).count();
                let succeeded = self.runs_for(model).filter(|run| run.succeeded()).count();
                ModelTally {
                    model: model.clone(),
                    succeeded,
                    failed: total - succeeded,
                }
            })
            .collect()
    }

    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for tally in self.tallies() {
            lines.push(format!(
                "{}: {}/{} runs succeeded",
                tally.model, tally.succeeded, self.runs_per_model
            ));
        }
        for run in self.failed_runs() {
            for fault in &run.faults {
                lines.push(format!("  {} round {:03}: {}", run.model, run.index, fault));
            }
        }
        lines.join("\n")
    }

    pub fn save(&self, path: &Path) -> BenchResult<()> {
        let output = serde_json::to_string_pretty(self)?;
        std::fs::write(path, output)?;
        Ok(())
    }
}
