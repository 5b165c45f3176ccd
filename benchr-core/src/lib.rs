pub mod benchmark;
mod error;
pub mod hooks;
pub mod http;
pub mod input;
pub mod pool;
pub mod report;
pub mod stats;
pub mod wait_group;

pub use benchmark::{Benchmark, ProgressFn, ProgressUpdate};
pub use error::{Error, Result};
pub use hooks::{NoHooks, RequestHooks};
pub use http::{HttpClient, RequestMethod, RequestOptions};
pub use input::{BenchmarkItem, RequestSpec, load_batch_file, parse_batch};
pub use report::RoundReport;
pub use stats::{Stats, StatsSnapshot};
