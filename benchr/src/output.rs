use benchr_core::{ProgressFn, RoundReport};

use crate::cli::OutputFormat;

mod human;
mod json;

pub(crate) trait OutputFormatter: Send + Sync {
    /// Callback for in-flight progress of the next round, if this format shows progress.
    fn progress(&self) -> Option<ProgressFn>;
    fn print_report(&self, report: &RoundReport) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput::new()),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
