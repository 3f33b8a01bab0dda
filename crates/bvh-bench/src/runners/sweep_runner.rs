use crate::archive_writer::{ArchiveWriter, ResultFiles};
use crate::bench_config::SweepConfig;
use crate::reporting::{ModelSummary, RunFault, RunRecord, SummaryAppender, SweepReport};
use crate::runners::invoker::BenchmarkInvoker;
use crate::runners::result_extractor::extract_last_value;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info, warn};

/// Where the sweep's progress and diagnostic lines go.
pub trait SweepConsole {
    fn progress(&mut self, line: &str);
    fn diagnostic(&mut self, line: &str);
}

/// Progress on stdout, diagnostics on stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdConsole;

impl SweepConsole for StdConsole {
    fn progress(&mut self, line: &str) {
        println!("{}", line);
    }

    fn diagnostic(&mut self, line: &str) {
        eprintln!("{}", line);
    }
}

pub fn progress_line(model: &str, index: usize, runs: usize) -> String {
    format!("model {}: round {} in total {}", model, index, runs)
}

pub fn missing_value_line(path: &Path, index: usize, model: &str) -> String {
    format!(
        "ERROR: can't get valid time value from {}(round {}, model {})",
        path.display(),
        index,
        model
    )
}

pub fn discarded_value_line(value: &str, index: usize, model: &str) -> String {
    format!(
        "ERROR: benchmark failed, discarding time value {}(round {}, model {})",
        value, index, model
    )
}

/// Drives a full sweep: every configured model, runs `1..=runs` each, strictly
/// one after another.
///
/// Per run the benchmark is invoked, its result files are archived, the
/// timing value is extracted and, if there is one, appended to the runtime
/// summary. A run that goes wrong is recorded in the report and the sweep
/// moves on.
pub struct SweepRunner<I: BenchmarkInvoker, C: SweepConsole = StdConsole> {
    config: SweepConfig,
    invoker: I,
    console: C,
    archive: ArchiveWriter,
    summary: SummaryAppender,
}

impl<I: BenchmarkInvoker> SweepRunner<I> {
    pub fn new(config: SweepConfig, invoker: I) -> Self {
        Self::with_console(config, invoker, StdConsole)
    }
}

impl<I: BenchmarkInvoker, C: SweepConsole> SweepRunner<I, C> {
    pub fn with_console(config: SweepConfig, invoker: I, console: C) -> Self {
        let archive = ArchiveWriter::new(config.statistics_root());
        let summary = SummaryAppender::new(config.summary_path());
        Self {
            config,
            invoker,
            console,
            archive,
            summary,
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn invoker(&self) -> &I {
        &self.invoker
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    fn result_files(&self) -> ResultFiles {
        ResultFiles {
            oncetime: self.config.oncetime_path(),
            totaltime: self.config.totaltime_path(),
        }
    }

    /// Run the whole sweep. Always completes; failures are in the report.
    pub fn run(&mut self) -> SweepReport {
        let mut report = SweepReport::new(&self.config);
        info!(
            models = ?self.config.models,
            runs = self.config.runs,
            "starting sweep"
        );

        let models = self.config.models.clone();
        for model in &models {
            self.run_model(model, &mut report);
        }

        report.finish();
        info!(
            failed = report.failed_runs().count(),
            total = report.runs.len(),
            "sweep finished"
        );
        report
    }

    fn run_model(&mut self, model: &str, report: &mut SweepReport) {
        let mut summary = match self.summary.start_model_summary(model) {
            Ok(summary) => Some(summary),
            Err(e) => {
                error!(model, error = %e, "could not reset runtime summary");
                None
            }
        };

        for index in 1..=self.config.runs {
            let started = Instant::now();
            let mut record = self.run_once(model, index, summary.as_mut());
            record.elapsed_ms = started.elapsed().as_millis() as u64;
            report.add_run(record);
        }

        if self.config.keep_model_summaries && summary.is_some() {
            if let Err(e) = self.archive.archive_model_file(model, self.summary.path()) {
                warn!(model, error = %e, "could not keep a copy of the runtime summary");
            }
        }
    }

    fn run_once(
        &mut self,
        model: &str,
        index: usize,
        summary: Option<&mut ModelSummary>,
    ) -> RunRecord {
        let mut record = RunRecord::new(model, index);

        let outcome = self.invoker.invoke(model, index);
        let invoked = outcome.is_success();
        if !invoked {
            record.add_fault(RunFault::Invocation { outcome });
        }

        // Archived whatever the outcome, even if the files are stale.
        let sources = self.result_files();
        match self.archive.archive(model, index, &sources) {
            Ok(run_dir) => record.archive_dir = Some(run_dir),
            Err(e) => {
                error!(model, index, error = %e, "archiving run failed");
                record.add_fault(RunFault::Archive {
                    path: self.archive.run_dir(model, index),
                    error: e.to_string(),
                });
            }
        }

        let value = match extract_last_value(&sources.totaltime) {
            Some(value) => value,
            None => {
                // shown relative to the base directory
                let shown = sources
                    .totaltime
                    .strip_prefix(&self.config.base_dir)
                    .unwrap_or(sources.totaltime.as_path());
                self.console.diagnostic(&missing_value_line(shown, index, model));
                record.add_fault(RunFault::ExtractionNotFound {
                    path: sources.totaltime,
                });
                return record;
            }
        };

        if !invoked {
            self.console.diagnostic(&discarded_value_line(&value, index, model));
            return record;
        }

        match summary {
            Some(summary) => {
                if let Err(e) = summary.append_row(index, model, &value) {
                    error!(model, index, error = %e, "appending summary row failed");
                    record.add_fault(RunFault::Summary {
                        error: e.to_string(),
                    });
                }
            }
            None => record.add_fault(RunFault::Summary {
                error: "runtime summary unavailable".to_string(),
            }),
        }
        record.value = Some(value);

        self.console.progress(&progress_line(model, index, self.config.runs));
        record
    }
}
