pub mod archive_report;
pub mod summary_appender;
pub mod types;

pub use archive_report::{collect_archive, write_timeseries};
pub use summary_appender::{read_summary, ModelSummary, SummaryAppender, SUMMARY_HEADER};
pub use types::{ModelTally, RunFault, RunRecord, SummaryRecord, SweepReport};
