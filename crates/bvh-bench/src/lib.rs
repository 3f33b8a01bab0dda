pub mod archive_writer;
pub mod bench_config;
pub mod config_manager;
pub mod errors;
pub mod reporting;
pub mod runners;

// Re-export main components for easier use
pub use archive_writer::{ArchiveWriter, ResultFiles};
pub use bench_config::{LauncherConfig, SweepConfig};
pub use config_manager::ConfigManager;
pub use errors::{BenchError, BenchResult};
pub use reporting::{SummaryAppender, SweepReport};
pub use runners::{
    BenchmarkInvoker, InvocationOutcome, ScriptInvoker, SweepConsole, SweepRunner,
};
