pub mod invoker;
pub mod result_extractor;
pub mod sweep_runner;

// Re-export for easier usage
pub use invoker::{BenchmarkInvoker, InvocationOutcome, ScriptInvoker};
pub use result_extractor::extract_last_value;
pub use sweep_runner::{StdConsole, SweepConsole, SweepRunner};
