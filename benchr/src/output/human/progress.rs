use std::sync::Mutex;
use std::time::Duration;

use benchr_core::ProgressUpdate;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// One bar per round, created on the first update and cleared before the report prints.
pub(crate) struct HumanProgress {
    bar: Mutex<Option<ProgressBar>>,
}

impl HumanProgress {
    pub(crate) fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    pub(crate) fn update(&self, u: &ProgressUpdate) {
        let mut bar = self
            .bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let pb = bar.get_or_insert_with(|| {
            let pb = ProgressBar::with_draw_target(
                Some(u.total),
                ProgressDrawTarget::stderr_with_hz(5),
            );
            pb.set_style(bar_style());
            pb.set_prefix(format!("round {}", u.round));
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });

        pb.set_length(u.total);
        pb.set_position(u.completed.min(u.total));
        pb.set_message(format!(
            "elapsed={}",
            humantime::format_duration(Duration::from_millis(
                u64::try_from(u.elapsed.as_millis()).unwrap_or(u64::MAX)
            ))
        ));
    }

    pub(crate) fn finish(&self) {
        let mut bar = self
            .bar
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(pb) = bar.take() {
            pb.finish_and_clear();
        }
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{prefix} {spinner} [ {bar:20.cyan/blue} ] {pos}/{len} reqs {msg}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
    .progress_chars("█░")
}
