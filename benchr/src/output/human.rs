use std::io::Write as _;
use std::sync::Arc;

use benchr_core::{ProgressFn, RoundReport};

mod format;
mod progress;
mod summary;

use progress::HumanProgress;
use summary::render;

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn progress(&self) -> Option<ProgressFn> {
        let progress = self.progress.clone();
        Some(Arc::new(move |u| progress.update(&u)))
    }

    fn print_report(&self, report: &RoundReport) -> anyhow::Result<()> {
        self.progress.finish();

        let mut out = std::io::stdout().lock();
        out.write_all(render(report).as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
